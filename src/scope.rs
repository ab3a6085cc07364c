use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Checklist {
    TestScope,
    UiChecklist,
    UxFlows,
}

impl Checklist {
    pub const ALL: [Checklist; 3] = [
        Checklist::TestScope,
        Checklist::UiChecklist,
        Checklist::UxFlows,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Checklist::TestScope => "Test Scope",
            Checklist::UiChecklist => "UI Consistency Checklist",
            Checklist::UxFlows => "UX Flow & Usability",
        }
    }

    pub fn items(&self) -> &'static [&'static str] {
        match self {
            Checklist::TestScope => &[
                "Functional Testing",
                "Performance Testing",
                "Responsive Design",
                "Accessibility",
                "Cross-browser Compatibility",
                "SEO Basics",
                "Security Headers",
            ],
            Checklist::UiChecklist => &[
                "Typography Consistency",
                "Color Scheme",
                "Button Styles",
                "Spacing & Alignment",
                "Icons & Imagery",
                "Form Elements",
            ],
            Checklist::UxFlows => &[
                "Navigation Flow",
                "Form Submission",
                "Search Functionality",
                "Checkout Process",
                "Error Handling",
                "Onboarding",
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomList {
    Ui,
    Ux,
}

impl CustomList {
    pub fn title(&self) -> &'static str {
        match self {
            CustomList::Ui => "Custom UI Requirements",
            CustomList::Ux => "Custom UX Flows",
        }
    }

    pub fn name_placeholder(&self) -> &'static str {
        match self {
            CustomList::Ui => "Requirement Name",
            CustomList::Ux => "Flow Name",
        }
    }

    pub fn description_placeholder(&self) -> &'static str {
        match self {
            CustomList::Ui => "AI Description (e.g., 'Check header logo alignment on mobile')",
            CustomList::Ux => {
                "AI Description (e.g., 'Test checkout process from cart to confirmation')"
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CustomRow {
    pub name: String,
    pub description: String,
}

impl CustomRow {
    fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.description.trim().is_empty()
    }
}

/// Editable rows that always keep one blank row to type into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomRows {
    rows: Vec<CustomRow>,
}

impl Default for CustomRows {
    fn default() -> Self {
        Self {
            rows: vec![CustomRow::default()],
        }
    }
}

impl CustomRows {
    pub fn rows(&self) -> &[CustomRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sets a row name, appending a fresh row once every name is filled.
    pub fn set_name(&mut self, index: usize, name: &str) {
        let Some(row) = self.rows.get_mut(index) else {
            return;
        };
        row.name = name.to_string();

        let last_filled = self
            .rows
            .last()
            .map(|r| !r.name.trim().is_empty())
            .unwrap_or(false);
        let has_blank = self.rows.iter().any(|r| r.name.trim().is_empty());
        if last_filled && !has_blank {
            self.rows.push(CustomRow::default());
        }
    }

    pub fn set_description(&mut self, index: usize, description: &str) {
        if let Some(row) = self.rows.get_mut(index) {
            row.description = description.to_string();
        }
    }

    /// Removes a row. The last remaining row cannot be removed.
    pub fn remove(&mut self, index: usize) -> bool {
        if self.rows.len() <= 1 || index >= self.rows.len() {
            return false;
        }
        self.rows.remove(index);
        true
    }

    pub fn can_remove(&self) -> bool {
        self.rows.len() > 1
    }

    pub fn has_named(&self) -> bool {
        self.rows.iter().any(|r| !r.name.trim().is_empty())
    }

    /// Rows worth submitting, trimmed.
    pub fn complete(&self) -> Vec<CustomRow> {
        self.rows
            .iter()
            .filter(|r| r.is_complete())
            .map(|r| CustomRow {
                name: r.name.trim().to_string(),
                description: r.description.trim().to_string(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("Please select at least one test option or add a custom requirement/flow")]
    NothingSelected,
}

#[derive(Debug, Clone)]
pub struct ScopeSelection {
    checked: [Vec<bool>; 3],
    pub custom_ui: CustomRows,
    pub custom_ux: CustomRows,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScopeSnapshot {
    pub test_scope: Vec<String>,
    pub ui_checklist: Vec<String>,
    pub custom_ui: Vec<CustomRow>,
    pub ux_flows: Vec<String>,
    pub custom_ux: Vec<CustomRow>,
}

impl ScopeSnapshot {
    pub fn total(&self) -> usize {
        self.test_scope.len()
            + self.ui_checklist.len()
            + self.custom_ui.len()
            + self.ux_flows.len()
            + self.custom_ux.len()
    }
}

impl ScopeSelection {
    pub fn new() -> Self {
        Self {
            checked: Checklist::ALL.map(|list| vec![false; list.items().len()]),
            custom_ui: CustomRows::default(),
            custom_ux: CustomRows::default(),
        }
    }

    fn slot(list: Checklist) -> usize {
        match list {
            Checklist::TestScope => 0,
            Checklist::UiChecklist => 1,
            Checklist::UxFlows => 2,
        }
    }

    pub fn is_checked(&self, list: Checklist, index: usize) -> bool {
        self.checked[Self::slot(list)]
            .get(index)
            .copied()
            .unwrap_or(false)
    }

    pub fn toggle(&mut self, list: Checklist, index: usize) {
        if let Some(flag) = self.checked[Self::slot(list)].get_mut(index) {
            *flag = !*flag;
        }
    }

    pub fn rows(&self, list: CustomList) -> &CustomRows {
        match list {
            CustomList::Ui => &self.custom_ui,
            CustomList::Ux => &self.custom_ux,
        }
    }

    pub fn rows_mut(&mut self, list: CustomList) -> &mut CustomRows {
        match list {
            CustomList::Ui => &mut self.custom_ui,
            CustomList::Ux => &mut self.custom_ux,
        }
    }

    fn checked_items(&self, list: Checklist) -> Vec<String> {
        list.items()
            .iter()
            .enumerate()
            .filter(|(i, _)| self.is_checked(list, *i))
            .map(|(_, item)| item.to_string())
            .collect()
    }

    pub fn validate(&self) -> Result<(), ScopeError> {
        let any_checked = self.checked.iter().flatten().any(|c| *c);
        if any_checked || self.custom_ui.has_named() || self.custom_ux.has_named() {
            Ok(())
        } else {
            Err(ScopeError::NothingSelected)
        }
    }

    pub fn snapshot(&self) -> ScopeSnapshot {
        ScopeSnapshot {
            test_scope: self.checked_items(Checklist::TestScope),
            ui_checklist: self.checked_items(Checklist::UiChecklist),
            custom_ui: self.custom_ui.complete(),
            ux_flows: self.checked_items(Checklist::UxFlows),
            custom_ux: self.custom_ux.complete(),
        }
    }
}
