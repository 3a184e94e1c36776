//! Drag-and-drop reassignment
//!
//! This module handles dragging categories between pages and items between
//! categories:
//! - Tagged drag entities and drop targets (no id-string conventions)
//! - Hit-testing against candidate drop zones
//! - The live-mutating drag state machine

mod collision;
mod machine;

pub use collision::*;
pub use machine::*;

use crate::types::{CategoryId, ItemId, PageId};

/// What is being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragEntity {
    Category(CategoryId),
    Item(ItemId),
}

/// Where the pointer currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropTarget {
    /// A category header or card
    Category(CategoryId),
    /// The items container inside a category
    CategoryItems(CategoryId),
    Item(ItemId),
    /// The "drop here" zone of a page
    Page(PageId),
    /// The pool of categories no page references
    Unassigned,
}

impl DropTarget {
    /// Collapse composite zones onto the entity that owns them
    pub fn owner(self) -> Self {
        match self {
            DropTarget::CategoryItems(category) => DropTarget::Category(category),
            other => other,
        }
    }

    /// Whether a dragged category may resolve against this target
    pub fn accepts_category(self) -> bool {
        matches!(
            self.owner(),
            DropTarget::Category(_) | DropTarget::Page(_) | DropTarget::Unassigned
        )
    }
}
