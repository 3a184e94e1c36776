//! Measurement adapter seam
//!
//! The pagination core never renders. It asks a [`Measure`] implementation
//! for the rendered content height of a page and does the arithmetic itself.

use crate::document::Document;
use crate::template::Template;
use crate::types::*;
use std::collections::{HashMap, HashSet};

/// Everything a renderer needs to produce a page
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub document: &'a Document,
    pub template: &'a Template,
}

impl<'a> RenderContext<'a> {
    pub fn new(document: &'a Document, template: &'a Template) -> Self {
        Self { document, template }
    }
}

/// Reads the rendered content extent of a page
pub trait Measure {
    /// Content height of the page at `page_index` in rendering units, or
    /// `None` when the page is not renderable yet.
    fn content_height(&self, ctx: &RenderContext<'_>, page_index: usize) -> Option<f64>;
}

impl<M: Measure + ?Sized> Measure for Box<M> {
    fn content_height(&self, ctx: &RenderContext<'_>, page_index: usize) -> Option<f64> {
        (**self).content_height(ctx, page_index)
    }
}

/// Measurer that stacks fixed heights: a per-page base plus a height per
/// category and per item. Stands in for a renderer when heights are known.
#[derive(Debug, Clone, Default)]
pub struct StackedHeights {
    pub base: f64,
    pub per_item: f64,
    category_heights: HashMap<CategoryId, f64>,
    unavailable: HashSet<PageId>,
}

impl StackedHeights {
    pub fn new(base: f64, per_item: f64) -> Self {
        Self {
            base,
            per_item,
            ..Default::default()
        }
    }

    /// Height of the category block excluding its items
    pub fn set_category(&mut self, category: CategoryId, height: f64) {
        self.category_heights.insert(category, height);
    }

    /// Report `page` as not yet rendered
    pub fn set_unavailable(&mut self, page: PageId, unavailable: bool) {
        if unavailable {
            self.unavailable.insert(page);
        } else {
            self.unavailable.remove(&page);
        }
    }
}

impl Measure for StackedHeights {
    fn content_height(&self, ctx: &RenderContext<'_>, page_index: usize) -> Option<f64> {
        let page = ctx.document.pages().get(page_index)?;
        if self.unavailable.contains(&page.id) {
            return None;
        }

        let content: f64 = ctx
            .document
            .page_categories(page_index)
            .iter()
            .map(|category| {
                self.category_heights.get(&category.id).copied().unwrap_or(0.0)
                    + self.per_item * category.items.len() as f64
            })
            .sum();
        Some(self.base + content)
    }
}
