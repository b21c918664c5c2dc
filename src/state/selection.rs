//! Ordered selection of item ids
//!
//! Used for the multi-select lists that feed bulk operations. Ids keep the
//! order in which they were selected.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the id if absent, deselect it if present
    pub fn toggle(&mut self, id: &str) {
        match self.ids.iter().position(|selected| selected == id) {
            Some(index) => {
                self.ids.remove(index);
            }
            None => self.ids.push(id.to_string()),
        }
    }

    /// Select every visible id, or clear when all of them are already selected
    pub fn toggle_all<'a, I>(&mut self, visible: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let visible: Vec<&str> = visible.into_iter().collect();
        let all_selected = !visible.is_empty()
            && visible.len() == self.ids.len()
            && visible.iter().all(|id| self.contains(id));

        if all_selected {
            self.ids.clear();
        } else {
            self.ids = visible.into_iter().map(str::to_string).collect();
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|selected| selected == id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}

impl FromIterator<String> for Selection {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        let mut selection = Selection::new();
        for id in iter {
            if !selection.contains(&id) {
                selection.ids.push(id);
            }
        }
        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let mut selection = Selection::new();
        selection.toggle("a");
        selection.toggle("b");
        selection.toggle("a");
        assert_eq!(selection.ids(), ["b".to_string()]);
    }

    #[test]
    fn test_toggle_all() {
        let mut selection = Selection::new();
        selection.toggle("b");

        selection.toggle_all(["a", "b", "c"]);
        assert_eq!(selection.len(), 3);

        selection.toggle_all(["a", "b", "c"]);
        assert!(selection.is_empty());

        // nothing visible never counts as "all selected"
        selection.toggle_all(Vec::<&str>::new());
        assert!(selection.is_empty());
    }

    #[test]
    fn test_from_iter_dedups() {
        let selection: Selection = vec!["x".to_string(), "y".to_string(), "x".to_string()].into_iter().collect();
        assert_eq!(selection.len(), 2);
    }
}
