use crate::field::{Choice, FieldId};

pub const SENTINEL: &str = "Custom";

pub const ENVIRONMENTS: &[&str] = &["Web", "iOS", "Android", "Desktop"];

const WEB: &[&str] = &[
    "1920x1080 (Full HD)",
    "1366x768 (Laptop)",
    "1440x900 (Desktop)",
    "1536x864 (Desktop)",
    "1280x720 (HD)",
    "2560x1440 (2K)",
    "3840x2160 (4K)",
];

const IOS: &[&str] = &[
    "375x667 (iPhone SE)",
    "390x844 (iPhone 13/14)",
    "393x852 (iPhone 14 Pro)",
    "428x926 (iPhone 14 Plus)",
    "430x932 (iPhone 14 Pro Max)",
    "744x1133 (iPad Mini)",
    "810x1080 (iPad)",
    "834x1194 (iPad Pro 11\")",
    "1024x1366 (iPad Pro 12.9\")",
];

const ANDROID: &[&str] = &[
    "360x640 (Small Phone)",
    "360x800 (Medium Phone)",
    "412x915 (Pixel 7)",
    "384x854 (Samsung Galaxy)",
    "360x780 (Standard)",
    "768x1024 (Tablet)",
    "800x1280 (Tablet 10\")",
];

const DESKTOP: &[&str] = &[
    "1920x1080 (Full HD)",
    "1366x768 (Standard)",
    "1440x900 (MacBook)",
    "1536x864 (Surface)",
    "1680x1050 (Wide)",
    "2560x1440 (2K QHD)",
    "3840x2160 (4K UHD)",
    "5120x2880 (5K)",
];

/// Resolutions offered for an environment. Unknown environments get none.
pub fn resolutions_for(environment: &str) -> &'static [&'static str] {
    match environment {
        "Web" => WEB,
        "iOS" => IOS,
        "Android" => ANDROID,
        "Desktop" => DESKTOP,
        _ => &[],
    }
}

/// `dependent`'s options are rebuilt from `lookup(driver value)` whenever
/// `driver` changes.
#[derive(Clone, Copy)]
pub struct DependentFieldRule {
    pub driver: FieldId,
    pub dependent: FieldId,
    pub lookup: fn(&str) -> &'static [&'static str],
}

impl DependentFieldRule {
    pub fn options_for(&self, value: &str) -> Vec<Choice> {
        (self.lookup)(value).iter().map(|v| Choice::plain(v)).collect()
    }
}

/// Choosing `sentinel` on `parent` makes `auxiliary` visible and required.
#[derive(Debug, Clone, Copy)]
pub struct CustomOverride {
    pub parent: FieldId,
    pub sentinel: &'static str,
    pub auxiliary: FieldId,
    pub missing_message: &'static str,
}

pub const DEPENDENT_RULES: &[DependentFieldRule] = &[DependentFieldRule {
    driver: FieldId::Environment,
    dependent: FieldId::Resolution,
    lookup: resolutions_for,
}];

pub const CUSTOM_OVERRIDES: &[CustomOverride] = &[
    CustomOverride {
        parent: FieldId::Browser,
        sentinel: SENTINEL,
        auxiliary: FieldId::CustomBrowser,
        missing_message: "Please enter custom browser name",
    },
    CustomOverride {
        parent: FieldId::TesterLevel,
        sentinel: SENTINEL,
        auxiliary: FieldId::CustomTester,
        missing_message: "Please enter custom tester level",
    },
    CustomOverride {
        parent: FieldId::Language,
        sentinel: SENTINEL,
        auxiliary: FieldId::CustomLanguage,
        missing_message: "Please enter custom language",
    },
];

/// Select fields that must be set before submission, in check order.
pub const REQUIRED_SELECTS: &[FieldId] = &[
    FieldId::Environment,
    FieldId::Resolution,
    FieldId::Browser,
    FieldId::TesterLevel,
    FieldId::Language,
];

pub fn dependents_of(driver: FieldId) -> impl Iterator<Item = &'static DependentFieldRule> {
    DEPENDENT_RULES.iter().filter(move |r| r.driver == driver)
}

pub fn override_for(parent: FieldId) -> Option<&'static CustomOverride> {
    CUSTOM_OVERRIDES.iter().find(|o| o.parent == parent)
}

/// Option sets that never change after startup.
pub fn static_options(field: FieldId) -> Vec<Choice> {
    match field {
        FieldId::Environment => ENVIRONMENTS.iter().map(|e| Choice::plain(e)).collect(),
        FieldId::Browser => vec![
            Choice::new("Chrome", "Google Chrome"),
            Choice::new("Firefox", "Mozilla Firefox"),
            Choice::new("Safari", "Safari"),
            Choice::new("Edge", "Microsoft Edge"),
            Choice::new("Opera", "Opera"),
            Choice::new(SENTINEL, "Custom / Others"),
        ],
        FieldId::TesterLevel => vec![
            Choice::new("Beginner", "Beginner"),
            Choice::new("Intermediate", "Intermediate"),
            Choice::new("Advanced", "Advanced"),
            Choice::new("Expert", "Expert"),
            Choice::new(SENTINEL, "Custom"),
        ],
        FieldId::Language => vec![
            Choice::new("English", "English"),
            Choice::new("Spanish", "Spanish"),
            Choice::new("French", "French"),
            Choice::new("German", "German"),
            Choice::new("Japanese", "Japanese"),
            Choice::new("Chinese", "Chinese"),
            Choice::new(SENTINEL, "Custom"),
        ],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sizes() {
        assert_eq!(resolutions_for("Web").len(), 7);
        assert_eq!(resolutions_for("iOS").len(), 9);
        assert_eq!(resolutions_for("Android").len(), 7);
        assert_eq!(resolutions_for("Desktop").len(), 8);
        assert!(resolutions_for("Smart TV").is_empty());
        assert!(resolutions_for("").is_empty());
    }

    #[test]
    fn test_every_override_parent_offers_the_sentinel() {
        for rule in CUSTOM_OVERRIDES {
            let options = static_options(rule.parent);
            assert!(
                options.iter().any(|c| c.value == rule.sentinel),
                "{} lacks the sentinel option",
                rule.parent
            );
        }
    }

    #[test]
    fn test_lookup_helpers() {
        assert_eq!(dependents_of(FieldId::Environment).count(), 1);
        assert_eq!(dependents_of(FieldId::Browser).count(), 0);
        assert_eq!(
            override_for(FieldId::TesterLevel).map(|o| o.auxiliary),
            Some(FieldId::CustomTester)
        );
        assert!(override_for(FieldId::Environment).is_none());
    }
}
