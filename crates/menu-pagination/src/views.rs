//! Per-category view state
//!
//! Category sections can be collapsed by the user. A category drag collapses
//! every section and restores each one to what it was when the drag ends.

use crate::types::CategoryId;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategoryView {
    pub collapsed: bool,
    /// State before the current drag collapsed it
    pub remembered: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryViews {
    views: HashMap<CategoryId, CategoryView>,
}

impl CategoryViews {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: CategoryId) -> CategoryView {
        self.views.get(&category).copied().unwrap_or_default()
    }

    pub fn is_collapsed(&self, category: CategoryId) -> bool {
        self.get(category).collapsed
    }

    pub fn set_collapsed(&mut self, category: CategoryId, collapsed: bool) {
        self.views.entry(category).or_default().collapsed = collapsed;
    }

    /// Flip the collapsed flag and return the new value
    pub fn toggle(&mut self, category: CategoryId) -> bool {
        let view = self.views.entry(category).or_default();
        view.collapsed = !view.collapsed;
        view.collapsed
    }

    /// Collapse every category, remembering the current state. Already
    /// remembered states are kept so a nested collapse cannot lose them.
    pub fn collapse_all(&mut self, categories: impl IntoIterator<Item = CategoryId>) {
        for category in categories {
            let view = self.views.entry(category).or_default();
            if view.remembered.is_none() {
                view.remembered = Some(view.collapsed);
            }
            view.collapsed = true;
        }
    }

    /// Put every remembered state back
    pub fn restore_all(&mut self) {
        for view in self.views.values_mut() {
            if let Some(collapsed) = view.remembered.take() {
                view.collapsed = collapsed;
            }
        }
    }

    pub fn remove(&mut self, category: CategoryId) {
        self.views.remove(&category);
    }
}
