//! Typographic height estimates
//!
//! [`EstimatingMeasurer`] stands in for a renderer. It lays a page out from
//! the template's fonts and spacing using an average glyph width, which is
//! close enough to drive pagination from the command line and in tests.

use crate::breaks::{Block, FlowEntry, category_entries, flow_columns};
use crate::measure::{Measure, RenderContext};
use crate::overflow::mm_to_px;
use crate::template::{HighlightPosition, LayoutVariant, Template};
use crate::types::*;

/// Average glyph advance as a fraction of the font size
pub const DEFAULT_GLYPH_WIDTH: f64 = 0.5;

/// Height of a divider rule under a category heading
const DIVIDER_PX: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatingMeasurer {
    pub glyph_width: f64,
}

impl Default for EstimatingMeasurer {
    fn default() -> Self {
        Self {
            glyph_width: DEFAULT_GLYPH_WIDTH,
        }
    }
}

/// Page geometry for one variant, in rendering units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyFrame {
    /// Everything above the body: margin, header, top highlight
    pub top: f64,
    /// Everything below the body: bottom highlight, margin
    pub bottom: f64,
    pub column_width: f64,
    pub column_height: f64,
    pub columns: u32,
}

impl BodyFrame {
    pub fn for_variant(template: &Template, variant: &LayoutVariant) -> Self {
        let (width_mm, height_mm) = template.dimensions_mm();
        let spacing = &template.style.spacing;
        let margin = mm_to_px(spacing.page_margin_mm);

        let mut top = margin;
        let mut bottom = margin;
        if variant.header.shown {
            top += mm_to_px(variant.header.height_mm);
        }
        if variant.highlight.shown {
            let band = mm_to_px(variant.highlight.height_mm);
            match variant.highlight.position {
                HighlightPosition::Top => top += band,
                HighlightPosition::Bottom => bottom += band,
            }
        }

        let columns = variant.body.columns.max(1);
        let gaps = f64::from(spacing.column_gap_px) * f64::from(columns - 1);
        let column_width = (mm_to_px(width_mm) - 2.0 * margin - gaps) / f64::from(columns);

        Self {
            top,
            bottom,
            column_width: column_width.max(1.0),
            column_height: (mm_to_px(height_mm) - top - bottom).max(0.0),
            columns,
        }
    }

    /// Room for content when every column is filled
    pub fn capacity(&self) -> f64 {
        self.column_height * f64::from(self.columns)
    }
}

impl EstimatingMeasurer {
    pub fn new(glyph_width: f64) -> Self {
        Self { glyph_width }
    }

    fn line_height(template: &Template, font_px: f32) -> f64 {
        f64::from(font_px) * f64::from(template.style.spacing.line_height)
    }

    /// Lines needed for `chars` glyphs of `font_px` in `width`
    fn wrapped_lines(&self, chars: usize, font_px: f32, width: f64) -> f64 {
        if chars == 0 {
            return 0.0;
        }
        let text_width = chars as f64 * self.glyph_width * f64::from(font_px);
        (text_width / width).ceil().max(1.0)
    }

    fn heading_height(template: &Template, variant: &LayoutVariant) -> f64 {
        let mut height = Self::line_height(template, template.style.fonts.heading_px);
        if variant.body.dividers {
            height += DIVIDER_PX;
        }
        height
    }

    /// Height of one item row including the gap after it
    pub fn item_height(
        &self,
        template: &Template,
        variant: &LayoutVariant,
        frame: &BodyFrame,
        item: &Item,
    ) -> f64 {
        let fonts = &template.style.fonts;
        let body = &variant.body;

        let mut name_chars = item.name.chars().count();
        if body.show_prices {
            // Leader dots and price share the name line
            name_chars += format!("{:.2}", item.price).len() + 2;
        }
        let name_lines = self.wrapped_lines(name_chars, fonts.item_px, frame.column_width);
        let mut height = name_lines.max(1.0) * Self::line_height(template, fonts.item_px);

        if body.show_descriptions && !item.description.is_empty() {
            let lines = self.wrapped_lines(
                item.description.chars().count(),
                fonts.description_px,
                frame.column_width,
            );
            height += lines * Self::line_height(template, fonts.description_px);
        }

        height + f64::from(template.style.spacing.item_gap_px)
    }

    /// Flow entries for the categories of one page
    fn page_entries(
        &self,
        template: &Template,
        variant: &LayoutVariant,
        frame: &BodyFrame,
        categories: &[&Category],
    ) -> Vec<FlowEntry> {
        let heading = Self::heading_height(template, variant);
        let gap = f64::from(template.style.spacing.category_gap_px);

        let mut entries = Vec::new();
        for (index, category) in categories.iter().enumerate() {
            let heading_height = if index == 0 { heading } else { heading + gap };
            entries.extend(category_entries(category, heading_height, |item| {
                self.item_height(template, variant, frame, item)
            }));
        }
        entries
    }

    /// Stacked height of each category in a single column of `variant`,
    /// for whole-category pagination
    pub fn blocks(
        &self,
        template: &Template,
        variant: &LayoutVariant,
        categories: &[&Category],
    ) -> Vec<Block> {
        let frame = BodyFrame::for_variant(template, variant);
        let heading = Self::heading_height(template, variant);
        let gap = f64::from(template.style.spacing.category_gap_px);

        categories
            .iter()
            .map(|category| {
                let items: f64 = category
                    .items
                    .iter()
                    .map(|item| self.item_height(template, variant, &frame, item))
                    .sum();
                Block {
                    category: category.id,
                    height: heading + gap + items,
                    break_before: category.break_before,
                }
            })
            .collect()
    }
}

impl Measure for EstimatingMeasurer {
    fn content_height(&self, ctx: &RenderContext<'_>, page_index: usize) -> Option<f64> {
        let page = ctx.document.pages().get(page_index)?;
        let layout = ctx.template.resolve(&page.variant_id)?;
        let variant = layout.variant;
        let frame = BodyFrame::for_variant(ctx.template, variant);

        if !variant.body.shown {
            return Some(frame.top + frame.bottom);
        }

        let categories = ctx.document.page_categories(page_index);
        let entries = self.page_entries(ctx.template, variant, &frame, &categories);
        let body = flow_columns(&entries, frame.columns, frame.column_height)
            .iter()
            .map(|column| column.height)
            .fold(0.0, f64::max);

        Some(frame.top + body + frame.bottom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    #[test]
    fn test_empty_page_fits() {
        let template = Template::classic();
        let doc = Document::for_template(&template).unwrap();
        let ctx = RenderContext::new(&doc, &template);

        let height = EstimatingMeasurer::default()
            .content_height(&ctx, 0)
            .unwrap();
        assert!(height < template.page_height_px());
        assert_eq!(EstimatingMeasurer::default().content_height(&ctx, 1), None);
    }

    #[test]
    fn test_unknown_variant_is_unavailable() {
        let template = Template::classic();
        let mut doc = Document::new("classic");
        doc.create_page_with_variant(VariantId::from("gone"));
        let ctx = RenderContext::new(&doc, &template);
        assert_eq!(EstimatingMeasurer::default().content_height(&ctx, 0), None);
    }

    #[test]
    fn test_descriptions_add_height() {
        let template = Template::classic();
        let variant = &template.variants[1];
        let frame = BodyFrame::for_variant(&template, variant);
        let measurer = EstimatingMeasurer::default();

        let plain = Item {
            id: ItemId(1),
            name: "Soup".into(),
            price: 6.5,
            description: String::new(),
            featured: false,
            break_before: false,
        };
        let described = Item {
            description: "Roasted tomato, basil oil and sourdough croutons".into(),
            ..plain.clone()
        };

        assert!(
            measurer.item_height(&template, variant, &frame, &described)
                > measurer.item_height(&template, variant, &frame, &plain)
        );
    }

    #[test]
    fn test_many_items_overflow() {
        let template = Template::classic();
        let mut doc = Document::for_template(&template).unwrap();
        let page = doc.pages()[0].id;
        let category = doc.create_category("Everything");
        doc.assign_category(category, Some(page)).unwrap();
        for i in 0..80 {
            doc.add_item(category, NewItem::new(format!("Dish {i}"), 10.0))
                .unwrap();
        }

        let ctx = RenderContext::new(&doc, &template);
        let height = EstimatingMeasurer::default()
            .content_height(&ctx, 0)
            .unwrap();
        assert!(height > template.page_height_px());
    }

    #[test]
    fn test_two_columns_double_capacity() {
        let template = Template::bistro();
        let frame = BodyFrame::for_variant(&template, &template.variants[1]);
        assert_eq!(frame.columns, 2);
        assert_eq!(frame.capacity(), frame.column_height * 2.0);
    }
}
