//! Hit-testing for drop targets
//!
//! Targets are chosen by the closest-corners rule: the candidate whose four
//! corners are, summed, nearest to the dragged element's four corners wins.

use super::{DragEntity, DropTarget};

/// Rectangle in screen space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Top-left, top-right, bottom-left, bottom-right
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.x, self.y),
            (self.right(), self.y),
            (self.x, self.bottom()),
            (self.right(), self.bottom()),
        ]
    }
}

/// A registered drop zone and where it currently is on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub target: DropTarget,
    pub rect: Rect,
}

impl Candidate {
    pub fn new(target: DropTarget, rect: Rect) -> Self {
        Self { target, rect }
    }
}

/// Sum of distances between corresponding corners of two rectangles
pub fn corner_distance(a: &Rect, b: &Rect) -> f64 {
    a.corners()
        .iter()
        .zip(b.corners().iter())
        .map(|((ax, ay), (bx, by))| (ax - bx).hypot(ay - by))
        .sum()
}

/// Pick the drop target for `entity` dragged at `dragged`.
///
/// Category drags only consider pages, the unassigned pool and other
/// categories; item drags consider every candidate. Composite zones resolve
/// to their owning entity. Ties go to the earlier candidate.
pub fn resolve_collision(
    entity: DragEntity,
    dragged: &Rect,
    candidates: &[Candidate],
) -> Option<DropTarget> {
    candidates
        .iter()
        .filter(|candidate| match entity {
            DragEntity::Category(id) => {
                candidate.target.accepts_category()
                    && candidate.target.owner() != DropTarget::Category(id)
            }
            DragEntity::Item(id) => candidate.target != DropTarget::Item(id),
        })
        .map(|candidate| (candidate.target.owner(), corner_distance(dragged, &candidate.rect)))
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(target, _)| target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CategoryId, ItemId, PageId};

    #[test]
    fn test_corner_distance_of_identical_rects_is_zero() {
        let rect = Rect::new(10.0, 20.0, 100.0, 40.0);
        assert_eq!(corner_distance(&rect, &rect), 0.0);

        let shifted = Rect::new(13.0, 24.0, 100.0, 40.0);
        assert_eq!(corner_distance(&rect, &shifted), 20.0);
    }

    #[test]
    fn test_category_drag_ignores_items() {
        let dragged = Rect::new(0.0, 0.0, 100.0, 20.0);
        let candidates = [
            Candidate::new(DropTarget::Item(ItemId(7)), Rect::new(0.0, 0.0, 100.0, 20.0)),
            Candidate::new(DropTarget::Page(PageId(2)), Rect::new(0.0, 300.0, 100.0, 20.0)),
        ];

        let target = resolve_collision(DragEntity::Category(CategoryId(1)), &dragged, &candidates);
        assert_eq!(target, Some(DropTarget::Page(PageId(2))));

        let target = resolve_collision(DragEntity::Item(ItemId(9)), &dragged, &candidates);
        assert_eq!(target, Some(DropTarget::Item(ItemId(7))));
    }

    #[test]
    fn test_items_container_resolves_to_category() {
        let dragged = Rect::new(0.0, 0.0, 100.0, 20.0);
        let candidates = [Candidate::new(
            DropTarget::CategoryItems(CategoryId(4)),
            Rect::new(0.0, 5.0, 100.0, 20.0),
        )];

        let target = resolve_collision(DragEntity::Category(CategoryId(1)), &dragged, &candidates);
        assert_eq!(target, Some(DropTarget::Category(CategoryId(4))));
    }

    #[test]
    fn test_category_never_targets_itself() {
        let dragged = Rect::new(0.0, 0.0, 100.0, 20.0);
        let candidates = [
            Candidate::new(DropTarget::Category(CategoryId(1)), dragged),
            Candidate::new(DropTarget::Unassigned, Rect::new(500.0, 0.0, 100.0, 20.0)),
        ];

        let target = resolve_collision(DragEntity::Category(CategoryId(1)), &dragged, &candidates);
        assert_eq!(target, Some(DropTarget::Unassigned));
    }

    #[test]
    fn test_no_candidates() {
        let dragged = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(resolve_collision(DragEntity::Item(ItemId(1)), &dragged, &[]), None);
    }
}
