//! The drag state machine
//!
//! `Idle` → `Dragging` on start, back to `Idle` on drop or cancel. Hover
//! changes mutate the document immediately so the on-screen position during
//! the drag always matches the result of dropping there. Cancelling never
//! reverts what hovering already did.

use super::{DragEntity, DropTarget};
use crate::document::Document;
use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        active: DragEntity,
        hover: Option<DropTarget>,
        /// The current hover target already moved the entity
        settled: bool,
    },
}

/// Work the owner of the machine has to carry out after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEffect {
    /// Collapse every category section, remembering its state
    CollapseCategories,
    /// Restore category sections to their state before the drag
    RestoreCategories,
    /// The document was mutated
    DocumentChanged,
    /// Check the page holding this category for overflow after the settle delay
    CheckOverflow(CategoryId),
}

#[derive(Debug, Clone, Default)]
pub struct DragMachine {
    state: DragState,
    starts: u64,
}

impl DragMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn active(&self) -> Option<DragEntity> {
        match self.state {
            DragState::Dragging { active, .. } => Some(active),
            DragState::Idle => None,
        }
    }

    pub fn hover_target(&self) -> Option<DropTarget> {
        match self.state {
            DragState::Dragging { hover, .. } => hover,
            DragState::Idle => None,
        }
    }

    /// Number of drags started so far
    pub fn starts(&self) -> u64 {
        self.starts
    }

    /// Begin dragging `entity`. Any drag still in progress is abandoned.
    pub fn start(&mut self, document: &Document, entity: DragEntity) -> Vec<DragEffect> {
        self.state = DragState::Idle;

        let exists = match entity {
            DragEntity::Category(id) => document.has_category(id),
            DragEntity::Item(id) => document.item(id).is_some(),
        };
        if !exists {
            log::warn!("Ignoring drag start for missing {entity:?}");
            return Vec::new();
        }

        self.state = DragState::Dragging {
            active: entity,
            hover: None,
            settled: false,
        };
        self.starts += 1;
        log::debug!("Drag started: {entity:?}");

        match entity {
            DragEntity::Category(_) => vec![DragEffect::CollapseCategories],
            DragEntity::Item(_) => Vec::new(),
        }
    }

    /// The pointer moved over `target` (or over nothing)
    pub fn hover(
        &mut self,
        document: &mut Document,
        target: Option<DropTarget>,
    ) -> Vec<DragEffect> {
        let DragState::Dragging { active, hover, .. } = self.state else {
            return Vec::new();
        };
        let target = target.map(DropTarget::owner);
        if target == hover {
            return Vec::new();
        }

        let moved = match (active, target) {
            (_, None) => false,
            (DragEntity::Category(category), Some(target)) => {
                hover_category(document, category, target)
            }
            (DragEntity::Item(item), Some(target)) => hover_item(document, item, target),
        };

        self.state = DragState::Dragging {
            active,
            hover: target,
            settled: moved,
        };

        if moved {
            vec![DragEffect::DocumentChanged]
        } else {
            Vec::new()
        }
    }

    /// Release over the current hover target
    pub fn drop(&mut self, document: &mut Document) -> Vec<DragEffect> {
        let DragState::Dragging {
            active,
            hover,
            settled,
        } = std::mem::take(&mut self.state)
        else {
            return Vec::new();
        };
        log::debug!("Drag dropped: {active:?} over {hover:?}");

        match active {
            DragEntity::Category(category) => vec![
                DragEffect::RestoreCategories,
                DragEffect::CheckOverflow(category),
            ],
            DragEntity::Item(item) => match hover {
                Some(DropTarget::Item(over)) if !settled => {
                    if reorder_within_category(document, item, over) {
                        vec![DragEffect::DocumentChanged]
                    } else {
                        Vec::new()
                    }
                }
                _ => Vec::new(),
            },
        }
    }

    /// Abort the drag; live mutations stay in place
    pub fn cancel(&mut self) -> Vec<DragEffect> {
        let DragState::Dragging { active, .. } = std::mem::take(&mut self.state) else {
            return Vec::new();
        };
        log::debug!("Drag cancelled: {active:?}");

        match active {
            DragEntity::Category(category) => vec![
                DragEffect::RestoreCategories,
                DragEffect::CheckOverflow(category),
            ],
            DragEntity::Item(_) => Vec::new(),
        }
    }
}

/// Apply a category hover. Returns whether the document changed.
fn hover_category(document: &mut Document, category: CategoryId, target: DropTarget) -> bool {
    match target {
        DropTarget::Page(page) => {
            let Some(target_page) = document.page(page) else {
                log::warn!("Ignoring hover over missing {page}");
                return false;
            };
            if target_page.contains(category) {
                return false;
            }
            document.assign_category(category, Some(page)).is_ok()
        }
        DropTarget::Unassigned => {
            if document.locate_category(category).is_none() {
                return false;
            }
            document.assign_category(category, None).is_ok()
        }
        DropTarget::Category(over) | DropTarget::CategoryItems(over) => {
            if over == category {
                return false;
            }
            if !document.has_category(over) {
                log::warn!("Ignoring hover over missing {over}");
                return false;
            }

            match (
                document.locate_category(category),
                document.locate_category(over),
            ) {
                (Some((from_page, from)), Some((to_page, to))) if from_page == to_page => {
                    let page = document.pages()[from_page].id;
                    from != to && document.move_category_within_page(page, from, to).is_ok()
                }
                (_, Some((to_page, to))) => {
                    let page = document.pages()[to_page].id;
                    document.insert_category(category, page, to).is_ok()
                }
                // Hovering a pooled category sends the dragged one to the pool
                (Some(_), None) => document.assign_category(category, None).is_ok(),
                (None, None) => false,
            }
        }
        DropTarget::Item(_) => false,
    }
}

/// Apply an item hover. Only moves across categories; reordering inside one
/// category waits for the drop.
fn hover_item(document: &mut Document, item: ItemId, target: DropTarget) -> bool {
    let Some((source, _)) = document.locate_item(item) else {
        return false;
    };

    match target {
        DropTarget::Item(over) => {
            if over == item {
                return false;
            }
            match document.locate_item(over) {
                Some((destination, index)) if destination != source => {
                    document.move_item(item, destination, index).is_ok()
                }
                _ => false,
            }
        }
        DropTarget::Category(destination) | DropTarget::CategoryItems(destination) => {
            if destination == source || !document.has_category(destination) {
                return false;
            }
            document.move_item(item, destination, usize::MAX).is_ok()
        }
        DropTarget::Page(_) | DropTarget::Unassigned => false,
    }
}

/// Array-move `item` onto `over`'s position when both share a category
fn reorder_within_category(document: &mut Document, item: ItemId, over: ItemId) -> bool {
    match (document.locate_item(item), document.locate_item(over)) {
        (Some((category, from)), Some((over_category, to)))
            if category == over_category && from != to =>
        {
            // Same-category move_item is an array move
            document.move_item(item, category, to).is_ok()
        }
        _ => false,
    }
}
