use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOverlay {
    pub query: String,
    pub matches: HashSet<usize>,
}

/// What the graph currently emphasises.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Highlight<'a> {
    None,
    /// A node and its one-hop neighbourhood.
    Neighborhood(usize),
    Search(&'a HashSet<usize>),
}

/// Hover, selection and search are tracked separately and only combined
/// in [`HighlightState::effective`].
#[derive(Debug, Clone, Default)]
pub struct HighlightState {
    hovered: Option<usize>,
    selected: Option<usize>,
    search: Option<SearchOverlay>,
}

impl HighlightState {
    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn search(&self) -> Option<&SearchOverlay> {
        self.search.as_ref()
    }

    pub fn hover_enter(&mut self, node: usize) {
        self.hovered = Some(node);
        self.search = None;
    }

    pub fn hover_leave(&mut self) {
        self.hovered = None;
    }

    pub fn select(&mut self, node: usize) {
        self.selected = Some(node);
        self.search = None;
    }

    pub fn deselect(&mut self) {
        self.selected = None;
        self.search = None;
    }

    pub fn set_search(&mut self, overlay: Option<SearchOverlay>) {
        self.search = overlay;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn effective(&self) -> Highlight<'_> {
        if let Some(node) = self.hovered {
            return Highlight::Neighborhood(node);
        }
        if let Some(search) = &self.search {
            return Highlight::Search(&search.matches);
        }
        match self.selected {
            Some(node) => Highlight::Neighborhood(node),
            None => Highlight::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlay(matches: &[usize]) -> SearchOverlay {
        SearchOverlay {
            query: "q".to_string(),
            matches: matches.iter().copied().collect(),
        }
    }

    #[test]
    fn selection_survives_hover_out() {
        let mut state = HighlightState::default();
        state.select(2);
        state.hover_enter(5);
        assert_eq!(state.effective(), Highlight::Neighborhood(5));
        state.hover_leave();
        assert_eq!(state.effective(), Highlight::Neighborhood(2));
        state.deselect();
        assert_eq!(state.effective(), Highlight::None);
    }

    #[test]
    fn search_overlay_is_transient() {
        let mut state = HighlightState::default();
        state.select(1);
        state.set_search(Some(overlay(&[3, 4])));
        assert!(matches!(state.effective(), Highlight::Search(m) if m.len() == 2));
        state.hover_enter(0);
        state.hover_leave();
        assert!(state.search().is_none());
        assert_eq!(state.effective(), Highlight::Neighborhood(1));
    }

    #[test]
    fn no_interaction_means_no_highlight() {
        let mut state = HighlightState::default();
        assert_eq!(state.effective(), Highlight::None);
        state.hover_enter(1);
        state.hover_leave();
        assert_eq!(state.effective(), Highlight::None);
    }
}
