use std::collections::HashSet;

use crate::ir::ServiceCategory;

/// Visible categories. Starts with every category present in the graph.
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    categories: Vec<ServiceCategory>,
    active: HashSet<ServiceCategory>,
}

impl CategoryFilter {
    /// Keeps categories in order of first appearance.
    pub fn new<'a>(categories: impl IntoIterator<Item = &'a ServiceCategory>) -> Self {
        let mut ordered = Vec::new();
        for category in categories {
            if !ordered.contains(category) {
                ordered.push(category.clone());
            }
        }
        let active = ordered.iter().cloned().collect();
        Self {
            categories: ordered,
            active,
        }
    }

    pub fn categories(&self) -> &[ServiceCategory] {
        &self.categories
    }

    pub fn is_active(&self, category: &ServiceCategory) -> bool {
        self.active.contains(category)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Flips one category. Returns its new state; unknown categories stay off.
    pub fn toggle(&mut self, category: &ServiceCategory) -> bool {
        if !self.categories.contains(category) {
            return false;
        }
        if self.active.remove(category) {
            false
        } else {
            self.active.insert(category.clone());
            true
        }
    }

    pub fn show_all(&mut self) {
        self.active = self.categories.iter().cloned().collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_and_reset() {
        let cats = [
            ServiceCategory::Compute,
            ServiceCategory::Network,
            ServiceCategory::Compute,
        ];
        let mut filter = CategoryFilter::new(&cats);
        assert_eq!(filter.categories().len(), 2);
        assert!(!filter.toggle(&ServiceCategory::Network));
        assert!(!filter.is_active(&ServiceCategory::Network));
        assert!(filter.toggle(&ServiceCategory::Network));
        filter.toggle(&ServiceCategory::Compute);
        filter.toggle(&ServiceCategory::Network);
        assert_eq!(filter.active_count(), 0);
        filter.show_all();
        assert_eq!(filter.active_count(), 2);
    }

    #[test]
    fn absent_category_cannot_be_enabled() {
        let mut filter = CategoryFilter::new(&[ServiceCategory::Storage]);
        assert!(!filter.toggle(&ServiceCategory::Ai));
        assert!(!filter.is_active(&ServiceCategory::Ai));
    }
}
