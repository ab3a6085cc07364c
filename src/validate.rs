use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::field::FieldId;
use crate::rules::{CUSTOM_OVERRIDES, REQUIRED_SELECTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlStatus {
    /// Nothing typed yet, no styling.
    Empty,
    Valid,
    Invalid,
}

/// Advisory check for the URL field. Never blocks typing.
pub fn validate_url(text: &str) -> UrlStatus {
    let text = text.trim();
    if text.is_empty() {
        return UrlStatus::Empty;
    }
    match Url::parse(text) {
        Ok(_) => UrlStatus::Valid,
        Err(_) => UrlStatus::Invalid,
    }
}

/// Field values at the moment of submission.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormSnapshot {
    pub values: BTreeMap<FieldId, String>,
    #[serde(skip)]
    pub hidden: BTreeSet<FieldId>,
}

impl FormSnapshot {
    pub fn get(&self, field: FieldId) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn is_hidden(&self, field: FieldId) -> bool {
        self.hidden.contains(&field)
    }

    /// The value to report for a field with a custom override: the
    /// auxiliary text when the sentinel was chosen, the value otherwise.
    pub fn effective(&self, field: FieldId) -> &str {
        let value = self.get(field);
        for rule in CUSTOM_OVERRIDES.iter().filter(|r| r.parent == field) {
            let custom = self.get(rule.auxiliary).trim();
            if value == rule.sentinel && !custom.is_empty() {
                return custom;
            }
        }
        value
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a URL")]
    MissingUrl,
    #[error("Please enter a valid URL (e.g., https://example.com)")]
    InvalidUrl,
    #[error("Please select {}", select_phrase(.0))]
    MissingSelection(FieldId),
    #[error("{message}")]
    MissingCustomValue {
        field: FieldId,
        message: &'static str,
    },
}

impl ValidationError {
    /// The field the user should correct.
    pub fn field(&self) -> FieldId {
        match self {
            ValidationError::MissingUrl | ValidationError::InvalidUrl => FieldId::Url,
            ValidationError::MissingSelection(field) => *field,
            ValidationError::MissingCustomValue { field, .. } => *field,
        }
    }
}

fn select_phrase(field: &FieldId) -> String {
    match field {
        FieldId::Resolution => "a resolution".to_string(),
        other => other.key().replace('_', " "),
    }
}

/// Checks a snapshot and reports the first problem found.
pub fn validate_submission(snapshot: &FormSnapshot) -> Result<(), ValidationError> {
    match validate_url(snapshot.get(FieldId::Url)) {
        UrlStatus::Empty => return Err(ValidationError::MissingUrl),
        UrlStatus::Invalid => return Err(ValidationError::InvalidUrl),
        UrlStatus::Valid => {}
    }

    for &field in REQUIRED_SELECTS {
        if snapshot.is_hidden(field) {
            continue;
        }
        if snapshot.get(field).is_empty() {
            return Err(ValidationError::MissingSelection(field));
        }
    }

    for rule in CUSTOM_OVERRIDES {
        if snapshot.get(rule.parent) == rule.sentinel
            && snapshot.get(rule.auxiliary).trim().is_empty()
        {
            return Err(ValidationError::MissingCustomValue {
                field: rule.auxiliary,
                message: rule.missing_message,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> FormSnapshot {
        let mut snapshot = FormSnapshot::default();
        for (field, value) in [
            (FieldId::Url, "https://example.com"),
            (FieldId::TestDate, "2024-05-01"),
            (FieldId::Environment, "Web"),
            (FieldId::Resolution, "1920x1080 (Full HD)"),
            (FieldId::Browser, "Chrome"),
            (FieldId::TesterLevel, "Expert"),
            (FieldId::Language, "English"),
        ] {
            snapshot.values.insert(field, value.to_string());
        }
        snapshot
    }

    #[test]
    fn test_validate_url() {
        assert_eq!(validate_url(""), UrlStatus::Empty);
        assert_eq!(validate_url("   "), UrlStatus::Empty);
        assert_eq!(validate_url("not a url"), UrlStatus::Invalid);
        assert_eq!(validate_url("example.com"), UrlStatus::Invalid);
        assert_eq!(validate_url("https://example.com"), UrlStatus::Valid);
        assert_eq!(validate_url("  http://localhost:8080/x  "), UrlStatus::Valid);
    }

    #[test]
    fn test_complete_snapshot_passes() {
        assert_eq!(validate_submission(&complete()), Ok(()));
    }

    #[test]
    fn test_url_checked_first() {
        let mut snapshot = FormSnapshot::default();
        assert_eq!(validate_submission(&snapshot), Err(ValidationError::MissingUrl));

        snapshot.values.insert(FieldId::Url, "nope".to_string());
        let err = validate_submission(&snapshot).unwrap_err();
        assert_eq!(err, ValidationError::InvalidUrl);
        assert_eq!(err.field(), FieldId::Url);
    }

    #[test]
    fn test_required_fields_in_declaration_order() {
        let mut snapshot = complete();
        snapshot.values.remove(&FieldId::Browser);
        snapshot.values.remove(&FieldId::Language);
        let err = validate_submission(&snapshot).unwrap_err();
        assert_eq!(err, ValidationError::MissingSelection(FieldId::Browser));
        assert_eq!(err.to_string(), "Please select browser");

        let mut snapshot = complete();
        snapshot.values.remove(&FieldId::TesterLevel);
        assert_eq!(
            validate_submission(&snapshot).unwrap_err().to_string(),
            "Please select tester level"
        );
    }

    #[test]
    fn test_hidden_resolution_is_not_required() {
        let mut snapshot = complete();
        snapshot.values.remove(&FieldId::Resolution);
        assert_eq!(
            validate_submission(&snapshot).unwrap_err().to_string(),
            "Please select a resolution"
        );

        snapshot.hidden.insert(FieldId::Resolution);
        assert_eq!(validate_submission(&snapshot), Ok(()));
    }

    #[test]
    fn test_custom_browser_requires_text() {
        let mut snapshot = complete();
        snapshot.values.insert(FieldId::Browser, "Custom".to_string());
        snapshot.values.insert(FieldId::CustomBrowser, "  ".to_string());

        let err = validate_submission(&snapshot).unwrap_err();
        assert_eq!(err.field(), FieldId::CustomBrowser);
        assert_eq!(err.to_string(), "Please enter custom browser name");

        snapshot
            .values
            .insert(FieldId::CustomBrowser, "Brave".to_string());
        assert_eq!(validate_submission(&snapshot), Ok(()));
        assert_eq!(snapshot.effective(FieldId::Browser), "Brave");
    }

    #[test]
    fn test_custom_values_checked_in_order() {
        let mut snapshot = complete();
        snapshot.values.insert(FieldId::TesterLevel, "Custom".to_string());
        snapshot.values.insert(FieldId::Language, "Custom".to_string());
        assert_eq!(
            validate_submission(&snapshot).unwrap_err().field(),
            FieldId::CustomTester
        );
        snapshot
            .values
            .insert(FieldId::CustomTester, "QA lead".to_string());
        assert_eq!(
            validate_submission(&snapshot).unwrap_err().to_string(),
            "Please enter custom language"
        );
    }

    #[test]
    fn test_effective_ignores_custom_text_without_sentinel() {
        let mut snapshot = complete();
        snapshot
            .values
            .insert(FieldId::CustomBrowser, "Brave".to_string());
        assert_eq!(snapshot.effective(FieldId::Browser), "Chrome");
        assert_eq!(snapshot.effective(FieldId::Environment), "Web");
    }
}
