use super::error::CatalogError;

/// Field-level diff of a sparse update payload against stored state.
///
/// Each eligible field is evaluated independently: an absent field keeps the
/// stored value, a supplied field equal to the stored value is recorded as
/// offending, a supplied differing field becomes part of the changeset.
/// `finish` then enforces the two terminal rules: a payload with no supplied
/// fields at all is rejected, and any field that matched the stored value
/// fails the whole update.
#[derive(Debug, Default)]
pub struct Differ {
    unchanged: Vec<&'static str>,
    changed: usize,
}

impl Differ {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff a required scalar field. Returns the value the record should
    /// hold after the update.
    pub fn field<T: PartialEq + Clone>(&mut self, name: &'static str, stored: &T, patch: Option<&T>) -> T {
        match patch {
            None => stored.clone(),
            Some(v) if v == stored => {
                self.unchanged.push(name);
                stored.clone()
            }
            Some(v) => {
                self.changed += 1;
                v.clone()
            }
        }
    }

    /// Diff a nullable scalar field. A stored `None` can only be overwritten
    /// with a supplied value; there is no way to clear it through a sparse
    /// payload, since absent already means "keep".
    pub fn optional_field<T: PartialEq + Clone>(
        &mut self,
        name: &'static str,
        stored: &Option<T>,
        patch: Option<&T>,
    ) -> Option<T> {
        match patch {
            None => stored.clone(),
            Some(v) if stored.as_ref() == Some(v) => {
                self.unchanged.push(name);
                stored.clone()
            }
            Some(v) => {
                self.changed += 1;
                Some(v.clone())
            }
        }
    }

    /// Record that a relation id list was supplied. Relation lists replace
    /// the whole stored set, so a supplied list always counts as a change.
    pub fn relation(&mut self) {
        self.changed += 1;
    }

    /// True when at least one field differs from the stored value so far.
    pub fn has_changes(&self) -> bool {
        self.changed > 0
    }

    pub fn finish(self) -> Result<(), CatalogError> {
        if self.changed == 0 && self.unchanged.is_empty() {
            return Err(CatalogError::NoUpdatesRequested);
        }
        if !self.unchanged.is_empty() {
            return Err(CatalogError::FieldsNotDifferent(self.unchanged));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_is_rejected() {
        let mut differ = Differ::new();
        let title = differ.field::<String>("title", &"Push-up".into(), None);
        let description = differ.optional_field::<String>("description", &None, None);
        assert_eq!(title, "Push-up");
        assert_eq!(description, None);
        assert_eq!(differ.finish(), Err(CatalogError::NoUpdatesRequested));
    }

    #[test]
    fn equal_field_is_rejected_even_among_real_changes() {
        let mut differ = Differ::new();
        differ.field::<String>("title", &"Push-up".into(), Some(&"Pull-up".into()));
        differ.field("needs_equipment", &true, Some(&true));
        assert_eq!(differ.finish(), Err(CatalogError::FieldsNotDifferent(vec!["needs_equipment"])));
    }

    #[test]
    fn all_equal_fields_are_reported_together() {
        let mut differ = Differ::new();
        differ.field::<String>("title", &"Push-up".into(), Some(&"Push-up".into()));
        differ.optional_field::<String>("description", &Some("Basic".into()), Some(&"Basic".into()));
        assert_eq!(
            differ.finish(),
            Err(CatalogError::FieldsNotDifferent(vec!["title", "description"]))
        );
    }

    #[test]
    fn differing_fields_build_a_changeset() {
        let mut differ = Differ::new();
        let title = differ.field::<String>("title", &"Push-up".into(), Some(&"Pull-up".into()));
        let description = differ.optional_field::<String>("description", &None, Some(&"Upper body".into()));
        let needs_equipment = differ.field("needs_equipment", &false, None);
        assert_eq!(title, "Pull-up");
        assert_eq!(description, Some("Upper body".to_string()));
        assert!(!needs_equipment);
        assert!(differ.has_changes());
        assert_eq!(differ.finish(), Ok(()));
    }

    #[test]
    fn string_comparison_is_exact() {
        let mut differ = Differ::new();
        // Case and whitespace matter; this counts as a change.
        differ.field::<String>("title", &"Push-up".into(), Some(&"push-up ".into()));
        assert_eq!(differ.finish(), Ok(()));
    }

    #[test]
    fn supplied_relation_list_counts_as_change() {
        let mut differ = Differ::new();
        differ.relation();
        assert_eq!(differ.finish(), Ok(()));
    }
}
