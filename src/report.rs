use chrono::NaiveDateTime;
use serde::Serialize;

use crate::field::FieldId;
use crate::scope::{CustomRow, ScopeSnapshot};
use crate::validate::FormSnapshot;

/// Everything the wizard hands over once both pages validate.
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub form: FormSnapshot,
    pub scope: ScopeSnapshot,
}

const RULE_WIDTH: usize = 60;

fn or_na(value: &str) -> &str {
    if value.is_empty() {
        "N/A"
    } else {
        value
    }
}

fn push_items(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("{}:\n", title));
    for item in items {
        out.push_str(&format!("  ✓ {}\n", item));
    }
    out.push('\n');
}

fn push_rows(out: &mut String, title: &str, rows: &[CustomRow]) {
    if rows.is_empty() {
        return;
    }
    out.push_str(&format!("{}:\n", title));
    for row in rows {
        out.push_str(&format!("  ✓ {}\n", row.name));
        out.push_str(&format!("    Description: {}\n", row.description));
    }
    out.push('\n');
}

/// Plain-text summary of a submission.
pub fn render_report(submission: &Submission, generated: NaiveDateTime) -> String {
    let form = &submission.form;
    let scope = &submission.scope;
    let rule = "=".repeat(RULE_WIDTH);

    let mut out = String::new();
    out.push_str("QB Bot - Website Test Configuration\n");
    out.push_str(&format!("{}\n\n", rule));
    out.push_str(&format!("URL: {}\n", or_na(form.get(FieldId::Url).trim())));
    out.push_str(&format!("Test Date: {}\n", or_na(form.get(FieldId::TestDate))));
    out.push_str(&format!(
        "Environment: {}\n",
        or_na(form.get(FieldId::Environment))
    ));
    out.push_str(&format!(
        "Resolution: {}\n",
        or_na(form.get(FieldId::Resolution))
    ));
    out.push_str(&format!(
        "Browser: {}\n",
        or_na(form.effective(FieldId::Browser))
    ));
    out.push_str(&format!(
        "Tester Level: {}\n",
        or_na(form.effective(FieldId::TesterLevel))
    ));
    out.push_str(&format!(
        "Language: {}\n",
        or_na(form.effective(FieldId::Language))
    ));
    out.push_str(&format!("\n{}\n\n", rule));

    push_items(&mut out, "TEST SCOPE", &scope.test_scope);
    push_items(&mut out, "UI CONSISTENCY CHECKLIST", &scope.ui_checklist);
    push_rows(&mut out, "CUSTOM UI REQUIREMENTS", &scope.custom_ui);
    push_items(&mut out, "UX FLOW & USABILITY", &scope.ux_flows);
    push_rows(&mut out, "CUSTOM UX FLOWS", &scope.custom_ux);

    out.push_str(&format!("{}\n", rule));
    out.push_str(&format!(
        "Generated on: {}\n",
        generated.format("%Y-%m-%d %H:%M:%S")
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn generated() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn submission() -> Submission {
        let mut form = FormSnapshot::default();
        for (field, value) in [
            (FieldId::Url, "https://example.com"),
            (FieldId::TestDate, "2024-05-01"),
            (FieldId::Environment, "Android"),
            (FieldId::Resolution, "412x915 (Pixel 7)"),
            (FieldId::Browser, "Custom"),
            (FieldId::CustomBrowser, "Samsung Internet"),
            (FieldId::TesterLevel, "Expert"),
            (FieldId::CustomTester, ""),
            (FieldId::Language, "English"),
        ] {
            form.values.insert(field, value.to_string());
        }
        let scope = ScopeSnapshot {
            test_scope: vec!["Accessibility".to_string()],
            custom_ux: vec![CustomRow {
                name: "Checkout".to_string(),
                description: "Cart to confirmation".to_string(),
            }],
            ..ScopeSnapshot::default()
        };
        Submission { form, scope }
    }

    #[test]
    fn test_report_substitutes_custom_text() {
        let report = render_report(&submission(), generated());
        assert!(report.starts_with("QB Bot - Website Test Configuration\n"));
        assert!(report.contains("Browser: Samsung Internet\n"));
        assert!(report.contains("Tester Level: Expert\n"));
        assert!(report.contains("Resolution: 412x915 (Pixel 7)\n"));
    }

    #[test]
    fn test_report_sections() {
        let report = render_report(&submission(), generated());
        assert!(report.contains("TEST SCOPE:\n  ✓ Accessibility\n"));
        assert!(report.contains("CUSTOM UX FLOWS:\n  ✓ Checkout\n    Description: Cart to confirmation\n"));
        assert!(!report.contains("UI CONSISTENCY CHECKLIST"));
        assert!(report.ends_with("Generated on: 2024-05-01 09:30:00\n"));
        assert!(report.contains(&"=".repeat(60)));
    }

    #[test]
    fn test_missing_values_render_na() {
        let empty = Submission {
            form: FormSnapshot::default(),
            scope: ScopeSnapshot::default(),
        };
        let report = render_report(&empty, generated());
        assert!(report.contains("URL: N/A\n"));
        assert!(report.contains("Resolution: N/A\n"));
    }

    #[test]
    fn test_json_uses_field_keys() {
        let json = serde_json::to_value(submission()).unwrap();
        assert_eq!(json["form"]["values"]["custom_browser"], "Samsung Internet");
        assert_eq!(json["scope"]["test_scope"][0], "Accessibility");
        assert!(json["form"].get("hidden").is_none());
    }
}
