//! State of the first wizard page.
//!
//! The controller owns every field, the single "open dropdown" slot and one
//! reveal generation per field. Transitions mutate the state in place and
//! return the [`Effect`]s the rendering side has to carry out (scheduling a
//! reveal, moving focus). Nothing here knows how fields are drawn.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::field::{FieldId, FieldState, Visibility};
use crate::rules::{self, DependentFieldRule};
use crate::validate::FormSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Finish revealing `field` later, unless its generation moved on.
    Reveal { field: FieldId, generation: u64 },
    Focus(FieldId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("unknown field {0}")]
    UnknownField(FieldId),
    #[error("{field} is not a dropdown")]
    NotSelect { field: FieldId },
    #[error("{field} is not a text field")]
    NotText { field: FieldId },
    #[error("{field} is hidden")]
    Hidden { field: FieldId },
    #[error("{value:?} is not an option of {field}")]
    UnknownOption { field: FieldId, value: String },
}

#[derive(Debug, Clone)]
pub struct Controller {
    fields: BTreeMap<FieldId, FieldState>,
    open: Option<FieldId>,
    generations: BTreeMap<FieldId, u64>,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    pub fn new() -> Self {
        let mut fields = BTreeMap::new();
        let mut insert = |state: FieldState| {
            fields.insert(state.id, state);
        };

        insert(FieldState::text(FieldId::Url, true));
        insert(FieldState::text(FieldId::TestDate, false));
        insert(FieldState::select(
            FieldId::Environment,
            rules::static_options(FieldId::Environment),
        ));
        insert(FieldState::select(FieldId::Resolution, Vec::new()).hidden());
        for parent in [FieldId::Browser, FieldId::TesterLevel, FieldId::Language] {
            insert(FieldState::select(parent, rules::static_options(parent)));
        }
        for rule in rules::CUSTOM_OVERRIDES {
            insert(FieldState::text(rule.auxiliary, false).hidden());
        }

        Self {
            fields,
            open: None,
            generations: BTreeMap::new(),
        }
    }

    pub fn field(&self, id: FieldId) -> Option<&FieldState> {
        self.fields.get(&id)
    }

    pub fn value(&self, id: FieldId) -> &str {
        self.fields.get(&id).map(|f| f.value.as_str()).unwrap_or("")
    }

    pub fn is_visible(&self, id: FieldId) -> bool {
        self.fields
            .get(&id)
            .map(|f| f.visibility.is_visible())
            .unwrap_or(false)
    }

    /// Visible fields in page order.
    pub fn visible_fields(&self) -> Vec<&FieldState> {
        FieldId::ALL
            .iter()
            .filter_map(|id| self.fields.get(id))
            .filter(|f| f.visibility.is_visible())
            .collect()
    }

    pub fn open_field(&self) -> Option<FieldId> {
        self.open
    }

    pub fn is_open(&self, id: FieldId) -> bool {
        self.open == Some(id)
    }

    fn field_mut(&mut self, id: FieldId) -> Result<&mut FieldState, ControllerError> {
        self.fields
            .get_mut(&id)
            .ok_or(ControllerError::UnknownField(id))
    }

    fn openable(&self, id: FieldId) -> Result<(), ControllerError> {
        let field = self.fields.get(&id).ok_or(ControllerError::UnknownField(id))?;
        if !field.is_select() {
            return Err(ControllerError::NotSelect { field: id });
        }
        if !field.visibility.is_visible() {
            return Err(ControllerError::Hidden { field: id });
        }
        Ok(())
    }

    /// Opens `id`, closing whatever else was open.
    pub fn open(&mut self, id: FieldId) -> Result<(), ControllerError> {
        self.openable(id)?;
        self.open = Some(id);
        Ok(())
    }

    pub fn toggle(&mut self, id: FieldId) -> Result<(), ControllerError> {
        self.openable(id)?;
        let was_open = self.is_open(id);
        self.close_all();
        if !was_open {
            self.open = Some(id);
        }
        Ok(())
    }

    pub fn close_all(&mut self) {
        self.open = None;
    }

    /// Picks `value` on dropdown `id` and cascades to dependent fields.
    pub fn select(
        &mut self,
        id: FieldId,
        value: &str,
        label: &str,
    ) -> Result<Vec<Effect>, ControllerError> {
        let field = self.field_mut(id)?;
        if !field.is_select() {
            return Err(ControllerError::NotSelect { field: id });
        }
        if !field.has_option(value) {
            return Err(ControllerError::UnknownOption {
                field: id,
                value: value.to_string(),
            });
        }

        field.value = value.to_string();
        field.label = Some(label.to_string());
        if self.is_open(id) {
            self.open = None;
        }
        log::debug!("selected {} = {:?}", id, value);

        Ok(self.on_field_changed(id, value))
    }

    /// Applies every rule driven by `id`.
    pub fn on_field_changed(&mut self, id: FieldId, value: &str) -> Vec<Effect> {
        let mut effects = Vec::new();

        let dependents: Vec<&'static DependentFieldRule> = rules::dependents_of(id).collect();
        for rule in dependents {
            effects.extend(self.rebuild_dependent(rule, value));
        }

        if let Some(rule) = rules::override_for(id) {
            let generation = self.bump(rule.auxiliary);
            let Some(aux) = self.fields.get_mut(&rule.auxiliary) else {
                return effects;
            };
            if value == rule.sentinel {
                aux.required = true;
                if aux.visibility != Visibility::Shown {
                    aux.visibility = Visibility::Revealing;
                    effects.push(Effect::Reveal {
                        field: rule.auxiliary,
                        generation,
                    });
                }
                effects.push(Effect::Focus(rule.auxiliary));
            } else {
                aux.visibility = Visibility::Hidden;
                aux.required = false;
                aux.clear();
            }
        }

        effects
    }

    fn rebuild_dependent(&mut self, rule: &DependentFieldRule, value: &str) -> Vec<Effect> {
        let options = rule.options_for(value);
        let generation = self.bump(rule.dependent);
        if self.is_open(rule.dependent) {
            self.open = None;
        }

        let Some(dependent) = self.fields.get_mut(&rule.dependent) else {
            return Vec::new();
        };
        dependent.clear();
        let mut effects = Vec::new();
        if options.is_empty() {
            dependent.options.clear();
            dependent.visibility = Visibility::Hidden;
        } else {
            dependent.options = options;
            dependent.visibility = Visibility::Revealing;
            effects.push(Effect::Reveal {
                field: rule.dependent,
                generation,
            });
        }
        log::debug!(
            "{} -> {:?}: {} now offers {} options",
            rule.driver,
            value,
            rule.dependent,
            dependent.options.len()
        );

        effects.extend(self.on_field_changed(rule.dependent, ""));
        effects
    }

    /// Edits a visible text field.
    pub fn set_text(&mut self, id: FieldId, text: &str) -> Result<(), ControllerError> {
        let field = self.field_mut(id)?;
        if field.is_select() {
            return Err(ControllerError::NotText { field: id });
        }
        if !field.visibility.is_visible() {
            return Err(ControllerError::Hidden { field: id });
        }
        field.value = text.to_string();
        Ok(())
    }

    fn bump(&mut self, id: FieldId) -> u64 {
        let generation = self.generations.entry(id).or_insert(0);
        *generation += 1;
        *generation
    }

    pub fn generation(&self, id: FieldId) -> u64 {
        self.generations.get(&id).copied().unwrap_or(0)
    }

    pub fn is_current(&self, id: FieldId, generation: u64) -> bool {
        self.generation(id) == generation
    }

    /// Lands a scheduled reveal. Returns false for stale ones.
    pub fn finish_reveal(&mut self, id: FieldId, generation: u64) -> bool {
        if !self.is_current(id, generation) {
            return false;
        }
        match self.fields.get_mut(&id) {
            Some(field) if field.visibility == Visibility::Revealing => {
                field.visibility = Visibility::Shown;
                true
            }
            _ => false,
        }
    }

    pub fn snapshot(&self) -> FormSnapshot {
        let mut snapshot = FormSnapshot::default();
        for field in self.fields.values() {
            snapshot.values.insert(field.id, field.value.clone());
            if !field.visibility.is_visible() {
                snapshot.hidden.insert(field.id);
            }
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_submission;

    fn pick(controller: &mut Controller, id: FieldId, value: &str) -> Vec<Effect> {
        let label = controller
            .field(id)
            .and_then(|f| f.options.iter().find(|c| c.value == value))
            .map(|c| c.label.clone())
            .unwrap();
        controller.select(id, value, &label).unwrap()
    }

    fn open_count(controller: &Controller) -> usize {
        FieldId::ALL
            .iter()
            .filter(|id| controller.is_open(**id))
            .count()
    }

    #[test]
    fn test_select_round_trip() {
        let mut c = Controller::new();
        c.open(FieldId::Browser).unwrap();
        c.select(FieldId::Browser, "Firefox", "Mozilla Firefox").unwrap();

        let browser = c.field(FieldId::Browser).unwrap();
        assert_eq!(browser.value, "Firefox");
        assert_eq!(browser.display(), "Mozilla Firefox");
        assert_eq!(browser.selected_index(), Some(1));
        assert_eq!(c.open_field(), None);
    }

    #[test]
    fn test_select_rejects_unknown_option() {
        let mut c = Controller::new();
        pick(&mut c, FieldId::Browser, "Chrome");

        let err = c.select(FieldId::Browser, "Netscape", "Netscape").unwrap_err();
        assert!(matches!(err, ControllerError::UnknownOption { .. }));
        assert_eq!(c.value(FieldId::Browser), "Chrome");
        assert_eq!(c.field(FieldId::Browser).unwrap().display(), "Google Chrome");
    }

    #[test]
    fn test_at_most_one_open() {
        let mut c = Controller::new();
        c.close_all();
        assert_eq!(open_count(&c), 0);

        c.open(FieldId::Environment).unwrap();
        c.open(FieldId::Browser).unwrap();
        assert_eq!(c.open_field(), Some(FieldId::Browser));
        c.open(FieldId::Browser).unwrap();
        assert_eq!(open_count(&c), 1);

        c.toggle(FieldId::Language).unwrap();
        assert_eq!(c.open_field(), Some(FieldId::Language));
        c.toggle(FieldId::Language).unwrap();
        assert_eq!(open_count(&c), 0);

        c.toggle(FieldId::TesterLevel).unwrap();
        c.toggle(FieldId::Environment).unwrap();
        assert_eq!(c.open_field(), Some(FieldId::Environment));
        assert_eq!(open_count(&c), 1);

        c.close_all();
        c.close_all();
        assert_eq!(open_count(&c), 0);
    }

    #[test]
    fn test_cannot_open_text_or_hidden_fields() {
        let mut c = Controller::new();
        assert!(matches!(
            c.open(FieldId::Url),
            Err(ControllerError::NotSelect { .. })
        ));
        assert!(matches!(
            c.toggle(FieldId::Resolution),
            Err(ControllerError::Hidden { .. })
        ));
        assert_eq!(c.open_field(), None);
    }

    #[test]
    fn test_environment_rebuilds_resolution() {
        let mut c = Controller::new();
        assert!(!c.is_visible(FieldId::Resolution));

        let effects = pick(&mut c, FieldId::Environment, "Web");
        assert_eq!(c.field(FieldId::Resolution).unwrap().options.len(), 7);
        pick(&mut c, FieldId::Resolution, "1280x720 (HD)");

        let effects_ios = pick(&mut c, FieldId::Environment, "iOS");
        let resolution = c.field(FieldId::Resolution).unwrap();
        assert_eq!(resolution.options.len(), 9);
        assert_eq!(resolution.options[0].value, "375x667 (iPhone SE)");
        assert!(resolution.is_unset());
        assert_eq!(resolution.display(), "Select Resolution");
        assert!(resolution.visibility.is_visible());

        assert!(effects.contains(&Effect::Reveal {
            field: FieldId::Resolution,
            generation: 1
        }));
        assert!(effects_ios.contains(&Effect::Reveal {
            field: FieldId::Resolution,
            generation: 2
        }));
    }

    #[test]
    fn test_unknown_environment_hides_resolution() {
        let mut c = Controller::new();
        pick(&mut c, FieldId::Environment, "Android");
        pick(&mut c, FieldId::Resolution, "412x915 (Pixel 7)");

        let rule = rules::DEPENDENT_RULES[0];
        let effects = c.on_field_changed(rule.driver, "Smart TV");
        assert!(effects.is_empty());
        let resolution = c.field(FieldId::Resolution).unwrap();
        assert!(!resolution.visibility.is_visible());
        assert!(resolution.options.is_empty());
        assert!(resolution.is_unset());
        assert!(c.snapshot().is_hidden(FieldId::Resolution));
    }

    #[test]
    fn test_open_dependent_closes_on_rebuild() {
        let mut c = Controller::new();
        pick(&mut c, FieldId::Environment, "Desktop");
        c.open(FieldId::Resolution).unwrap();
        c.on_field_changed(FieldId::Environment, "Web");
        assert_eq!(c.open_field(), None);
    }

    #[test]
    fn test_stale_reveal_is_a_no_op() {
        let mut c = Controller::new();
        let first = pick(&mut c, FieldId::Environment, "Web");
        let Some(Effect::Reveal { generation: old, .. }) = first.first().copied() else {
            panic!("expected a reveal");
        };
        pick(&mut c, FieldId::Environment, "Android");

        assert!(!c.finish_reveal(FieldId::Resolution, old));
        assert_eq!(
            c.field(FieldId::Resolution).unwrap().visibility,
            Visibility::Revealing
        );
        let current = c.generation(FieldId::Resolution);
        assert!(c.finish_reveal(FieldId::Resolution, current));
        assert_eq!(
            c.field(FieldId::Resolution).unwrap().visibility,
            Visibility::Shown
        );
        assert!(!c.finish_reveal(FieldId::Resolution, current));
    }

    #[test]
    fn test_custom_override_reveals_and_focuses() {
        let mut c = Controller::new();
        let effects = pick(&mut c, FieldId::Browser, "Custom");

        let aux = c.field(FieldId::CustomBrowser).unwrap();
        assert!(aux.visibility.is_visible());
        assert!(aux.required);
        assert!(effects.contains(&Effect::Focus(FieldId::CustomBrowser)));
    }

    #[test]
    fn test_leaving_custom_tester_clears_text() {
        let mut c = Controller::new();
        pick(&mut c, FieldId::TesterLevel, "Custom");
        c.set_text(FieldId::CustomTester, "Accessibility specialist")
            .unwrap();

        pick(&mut c, FieldId::TesterLevel, "Advanced");
        let aux = c.field(FieldId::CustomTester).unwrap();
        assert!(aux.value.is_empty());
        assert!(!aux.required);
        assert!(!aux.visibility.is_visible());
    }

    #[test]
    fn test_hidden_aux_rejects_text() {
        let mut c = Controller::new();
        assert_eq!(
            c.set_text(FieldId::CustomLanguage, "Klingon"),
            Err(ControllerError::Hidden {
                field: FieldId::CustomLanguage
            })
        );
        assert!(c.value(FieldId::CustomLanguage).is_empty());
        assert!(matches!(
            c.set_text(FieldId::Language, "Klingon"),
            Err(ControllerError::NotText { .. })
        ));
    }

    #[test]
    fn test_custom_browser_snapshot_validation() {
        let mut c = Controller::new();
        c.set_text(FieldId::Url, "https://example.com").unwrap();
        pick(&mut c, FieldId::Environment, "iOS");
        pick(&mut c, FieldId::Resolution, "810x1080 (iPad)");
        pick(&mut c, FieldId::Browser, "Custom");
        pick(&mut c, FieldId::TesterLevel, "Beginner");
        pick(&mut c, FieldId::Language, "English");

        let err = validate_submission(&c.snapshot()).unwrap_err();
        assert_eq!(err.field(), FieldId::CustomBrowser);

        c.set_text(FieldId::CustomBrowser, "Vivaldi").unwrap();
        assert_eq!(validate_submission(&c.snapshot()), Ok(()));
    }

    #[test]
    fn test_visible_fields_follow_page_order() {
        let mut c = Controller::new();
        pick(&mut c, FieldId::Environment, "Web");
        pick(&mut c, FieldId::Language, "Custom");
        let ids: Vec<FieldId> = c.visible_fields().iter().map(|f| f.id).collect();
        assert_eq!(
            ids,
            vec![
                FieldId::Url,
                FieldId::TestDate,
                FieldId::Environment,
                FieldId::Resolution,
                FieldId::Browser,
                FieldId::TesterLevel,
                FieldId::Language,
                FieldId::CustomLanguage,
            ]
        );
    }
}
