use crate::document::Document;
use crate::overflow::OverflowMap;
use crate::types::*;

/// Calculate summary statistics for a document and its latest overflow map
pub fn calculate_statistics(document: &Document, overflow: &OverflowMap) -> DocumentStatistics {
    let unassigned = document.unassigned().len();
    let categories = document.categories().len();

    let mut items = 0;
    let mut featured_items = 0;
    for category in document.categories() {
        items += category.items.len();
        featured_items += category.items.iter().filter(|item| item.featured).count();
    }

    DocumentStatistics {
        pages: document.pages().len(),
        categories,
        assigned: categories - unassigned,
        unassigned,
        items,
        featured_items,
        overflowing_pages: overflow.keys().copied().collect(),
    }
}
