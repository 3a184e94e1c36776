//! Overflow resolution
//!
//! After a category lands on a page (dropped there, or created on the active
//! page) the page it ended up on is measured once more. If it overflows past
//! the action threshold the user picks one of three outcomes: keep the
//! overflow, move the category to another existing page, or move it to a
//! freshly created page.

use crate::document::Document;
use crate::measure::{Measure, RenderContext};
use crate::overflow::{OverflowThresholds, measure_overflow};
use crate::template::Template;
use crate::types::*;

/// A page the offending category can be moved to
#[derive(Debug, Clone, PartialEq)]
pub struct TargetPage {
    /// 1-based position in the document
    pub page_number: usize,
    pub page_id: PageId,
    pub variant_name: String,
}

/// Payload shown to the user while a resolution is pending
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionPrompt {
    pub category_id: CategoryId,
    pub category_name: String,
    pub page_id: PageId,
    /// 1-based number of the overflowing page
    pub page_number: usize,
    /// Overflow rounded to whole rendering units
    pub overflow_amount: u64,
    /// Every other page, in document order
    pub available_target_pages: Vec<TargetPage>,
}

/// The user's answer to a [`ResolutionPrompt`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionChoice {
    /// Leave the page overflowing
    Keep,
    /// Move the category to the page with this 1-based number
    MoveTo { page_number: usize },
    /// Create a page and make the category its only content
    CreateNewAndMove,
}

/// What applying a choice changed
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionOutcome {
    pub choice: ResolutionChoice,
    /// Page the category now lives on, if it moved
    pub destination: Option<PageId>,
    /// New active page index, when the choice changes it
    pub active_page: Option<usize>,
}

/// Build the prompt for `category` overflowing page `page_index` by
/// `overflow` units.
pub fn build_prompt(
    document: &Document,
    template: &Template,
    category: CategoryId,
    page_index: usize,
    overflow: f64,
) -> Option<ResolutionPrompt> {
    let category = document.category(category)?;
    let page = document.pages().get(page_index)?;

    let available_target_pages = document
        .pages()
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != page_index)
        .map(|(index, candidate)| TargetPage {
            page_number: index + 1,
            page_id: candidate.id,
            variant_name: template
                .variant(&candidate.variant_id)
                .map(|variant| variant.name.clone())
                .unwrap_or_else(|| candidate.variant_id.to_string()),
        })
        .collect();

    Some(ResolutionPrompt {
        category_id: category.id,
        category_name: category.name.clone(),
        page_id: page.id,
        page_number: page_index + 1,
        overflow_amount: overflow.round() as u64,
        available_target_pages,
    })
}

/// Re-measure only the page currently holding `category` and return a
/// prompt if it overflows past the action threshold.
pub fn check_category<M: Measure + ?Sized>(
    ctx: &RenderContext<'_>,
    measurer: &M,
    category: CategoryId,
    thresholds: OverflowThresholds,
) -> Option<ResolutionPrompt> {
    let (page_index, _) = ctx.document.locate_category(category)?;
    let overflow = measure_overflow(ctx, measurer, page_index)?;
    if overflow <= thresholds.action() {
        return None;
    }

    log::debug!(
        "{category} overflows page {} by {overflow:.1}",
        page_index + 1
    );
    build_prompt(ctx.document, ctx.template, category, page_index, overflow)
}

/// Apply the user's choice for `prompt`
pub fn apply_choice(
    document: &mut Document,
    template: &Template,
    prompt: &ResolutionPrompt,
    choice: ResolutionChoice,
) -> Result<ResolutionOutcome> {
    let category = prompt.category_id;
    if !document.has_category(category) {
        return Err(MenuError::UnknownCategory(category));
    }

    match choice {
        ResolutionChoice::Keep => Ok(ResolutionOutcome {
            choice,
            destination: None,
            active_page: None,
        }),
        ResolutionChoice::MoveTo { page_number } => {
            let target = page_number
                .checked_sub(1)
                .and_then(|index| document.pages().get(index))
                .map(|page| page.id)
                .ok_or_else(|| {
                    MenuError::InvalidTarget(format!("page {page_number} does not exist"))
                })?;
            if target == prompt.page_id {
                return Err(MenuError::InvalidTarget(format!(
                    "page {page_number} is the overflowing page"
                )));
            }

            document.assign_category(category, Some(target))?;
            log::info!("Moved {category} to page {page_number}");
            Ok(ResolutionOutcome {
                choice,
                destination: Some(target),
                active_page: None,
            })
        }
        ResolutionChoice::CreateNewAndMove => {
            let page = document.create_page(template)?;
            document.assign_category(category, Some(page))?;
            let index = document.pages().len() - 1;
            log::info!("Moved {category} to new page {}", index + 1);
            Ok(ResolutionOutcome {
                choice,
                destination: Some(page),
                active_page: Some(index),
            })
        }
    }
}
