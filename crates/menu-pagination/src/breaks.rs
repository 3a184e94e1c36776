//! # Break Planning
//!
//! Greedy-fit rules for where pages and columns break. Whole categories are
//! the unit of pagination; a category is never split across pages. Inside a
//! page body, headings and items flow through the columns and honor the
//! category's break hints.

use crate::types::*;

/// What to do with the next block given the space left on the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakDecision {
    /// Put the block on the current frame
    Place,
    /// Start a new frame with this block
    MoveToNextPage,
}

/// Decide whether a block of `block_height` goes on the current frame.
///
/// A break hint only matters when the frame already has content. A block
/// taller than a whole frame is placed on an empty one anyway and overflows.
pub fn decide_fit(
    remaining: f64,
    block_height: f64,
    page_is_empty: bool,
    break_before: bool,
) -> BreakDecision {
    if page_is_empty {
        return BreakDecision::Place;
    }
    if break_before || block_height > remaining {
        return BreakDecision::MoveToNextPage;
    }
    BreakDecision::Place
}

/// A category measured for pagination
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    pub category: CategoryId,
    pub height: f64,
    pub break_before: bool,
}

/// Distribute `blocks` over pages of `page_height`, in order.
pub fn plan_pages(blocks: &[Block], page_height: f64) -> Vec<Vec<CategoryId>> {
    let mut pages: Vec<Vec<CategoryId>> = Vec::new();
    let mut current: Vec<CategoryId> = Vec::new();
    let mut remaining = page_height;

    for block in blocks {
        match decide_fit(remaining, block.height, current.is_empty(), block.break_before) {
            BreakDecision::Place => {}
            BreakDecision::MoveToNextPage => {
                pages.push(std::mem::take(&mut current));
                remaining = page_height;
            }
        }
        if block.height > page_height {
            log::debug!(
                "{} ({:.0}) is taller than a page ({page_height:.0})",
                block.category,
                block.height
            );
        }
        current.push(block.category);
        remaining -= block.height;
    }

    if !current.is_empty() {
        pages.push(current);
    }
    pages
}

// =============================================================================
// Column flow
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Heading(CategoryId),
    Item(ItemId),
}

/// One line-up unit inside a page body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowEntry {
    pub kind: FlowKind,
    pub height: f64,
    /// Start a new column with this entry
    pub break_before: bool,
}

/// Flatten a category into flow entries, applying its break mode
pub fn category_entries(
    category: &Category,
    heading_height: f64,
    item_height: impl Fn(&Item) -> f64,
) -> Vec<FlowEntry> {
    let mode = category.effective_break_mode();
    let mut entries = Vec::with_capacity(category.items.len() + 1);
    entries.push(FlowEntry {
        kind: FlowKind::Heading(category.id),
        height: heading_height,
        break_before: mode == BreakMode::Category && category.break_before,
    });
    entries.extend(category.items.iter().map(|item| FlowEntry {
        kind: FlowKind::Item(item.id),
        height: item_height(item),
        break_before: mode == BreakMode::Item && item.break_before,
    }));
    entries
}

/// Entries assigned to one column
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Column {
    pub entries: Vec<FlowKind>,
    pub height: f64,
}

/// Flow `entries` into at most `columns` columns of `column_height`.
///
/// A heading is kept with the entry after it. The last column takes
/// whatever is left, so its height is how far the body overflows.
pub fn flow_columns(entries: &[FlowEntry], columns: u32, column_height: f64) -> Vec<Column> {
    let columns = columns.max(1) as usize;
    let mut flowed = vec![Column::default()];

    for (index, entry) in entries.iter().enumerate() {
        let current = flowed.len() - 1;
        let needed = match (entry.kind, entries.get(index + 1)) {
            (FlowKind::Heading(_), Some(next)) if matches!(next.kind, FlowKind::Item(_)) => {
                entry.height + next.height
            }
            _ => entry.height,
        };

        let column = &flowed[current];
        let decision = decide_fit(
            column_height - column.height,
            needed,
            column.entries.is_empty(),
            entry.break_before,
        );
        if decision == BreakDecision::MoveToNextPage && current + 1 < columns {
            flowed.push(Column::default());
        }

        let Some(column) = flowed.last_mut() else {
            continue;
        };
        column.entries.push(entry.kind);
        column.height += entry.height;
    }

    flowed
}
