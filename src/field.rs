use serde::Serialize;

/// Every input on the first wizard page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    Url,
    TestDate,
    Environment,
    Resolution,
    Browser,
    TesterLevel,
    Language,
    CustomBrowser,
    CustomTester,
    CustomLanguage,
}

impl FieldId {
    /// Page order, also the order fields are drawn in.
    pub const ALL: [FieldId; 10] = [
        FieldId::Url,
        FieldId::TestDate,
        FieldId::Environment,
        FieldId::Resolution,
        FieldId::Browser,
        FieldId::CustomBrowser,
        FieldId::TesterLevel,
        FieldId::CustomTester,
        FieldId::Language,
        FieldId::CustomLanguage,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            FieldId::Url => "url",
            FieldId::TestDate => "test_date",
            FieldId::Environment => "environment",
            FieldId::Resolution => "resolution",
            FieldId::Browser => "browser",
            FieldId::TesterLevel => "tester_level",
            FieldId::Language => "language",
            FieldId::CustomBrowser => "custom_browser",
            FieldId::CustomTester => "custom_tester",
            FieldId::CustomLanguage => "custom_language",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            FieldId::Url => "Website URL",
            FieldId::TestDate => "Test Date",
            FieldId::Environment => "Environment",
            FieldId::Resolution => "Resolution",
            FieldId::Browser => "Browser",
            FieldId::TesterLevel => "Tester Level",
            FieldId::Language => "Language",
            FieldId::CustomBrowser => "Custom Browser",
            FieldId::CustomTester => "Custom Tester Level",
            FieldId::CustomLanguage => "Custom Language",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            FieldId::Url => "https://example.com",
            FieldId::TestDate => "YYYY-MM-DD",
            FieldId::Environment => "Select Environment",
            FieldId::Resolution => "Select Resolution",
            FieldId::Browser => "Select Browser",
            FieldId::TesterLevel => "Select Tester Level",
            FieldId::Language => "Select Language",
            FieldId::CustomBrowser => "Enter browser name",
            FieldId::CustomTester => "Describe the tester level",
            FieldId::CustomLanguage => "Enter language",
        }
    }
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// One selectable entry of a dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Entries whose label is the value itself, like the resolution table.
    pub fn plain(value: &str) -> Self {
        Self::new(value, value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    /// Shown, but the reveal transition has not landed yet.
    Revealing,
    Shown,
}

impl Visibility {
    pub fn is_visible(&self) -> bool {
        !matches!(self, Visibility::Hidden)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Select,
}

#[derive(Debug, Clone)]
pub struct FieldState {
    pub id: FieldId,
    pub kind: FieldKind,
    pub value: String,
    /// Label of the chosen option; `None` shows the placeholder.
    pub label: Option<String>,
    pub required: bool,
    pub visibility: Visibility,
    pub options: Vec<Choice>,
}

impl FieldState {
    pub fn text(id: FieldId, required: bool) -> Self {
        Self {
            id,
            kind: FieldKind::Text,
            value: String::new(),
            label: None,
            required,
            visibility: Visibility::Shown,
            options: Vec::new(),
        }
    }

    pub fn select(id: FieldId, options: Vec<Choice>) -> Self {
        Self {
            id,
            kind: FieldKind::Select,
            value: String::new(),
            label: None,
            required: true,
            visibility: Visibility::Shown,
            options,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visibility = Visibility::Hidden;
        self
    }

    pub fn is_select(&self) -> bool {
        self.kind == FieldKind::Select
    }

    pub fn is_unset(&self) -> bool {
        self.value.is_empty()
    }

    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|c| c.value == value)
    }

    /// Index of the option matching the stored value. Only this one renders
    /// as selected.
    pub fn selected_index(&self) -> Option<usize> {
        if self.value.is_empty() {
            return None;
        }
        self.options.iter().position(|c| c.value == self.value)
    }

    pub fn display(&self) -> &str {
        match self.kind {
            FieldKind::Select => self.label.as_deref().unwrap_or(self.id.placeholder()),
            FieldKind::Text => &self.value,
        }
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.label = None;
    }
}
