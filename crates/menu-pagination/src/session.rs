//! Editing session controller
//!
//! [`EditingSession`] owns everything one open menu needs: the document, its
//! template, the active page, drag state, category views, the overflow map,
//! the measure scheduler and any pending resolution prompt. Every mutation
//! goes through it so that measurement is scheduled consistently.
//!
//! The session has no clock. Drivers call [`EditingSession::poll`] with the
//! current time and a measurer; overflow passes and resolution checks run
//! there.

use crate::breaks::plan_pages;
use crate::document::{Document, NormalizeReport};
use crate::drag::{
    Candidate, DragEffect, DragEntity, DragMachine, DragState, DropTarget, Rect, resolve_collision,
};
use crate::estimate::{BodyFrame, EstimatingMeasurer};
use crate::measure::{Measure, RenderContext};
use crate::overflow::{OverflowDetector, OverflowMap, OverflowThresholds};
use crate::resolution::{
    ResolutionChoice, ResolutionOutcome, ResolutionPrompt, apply_choice, check_category,
};
use crate::scheduler::{MeasureScheduler, ScheduledPass, SchedulerConfig};
use crate::stats::calculate_statistics;
use crate::template::Template;
use crate::types::*;
use crate::views::CategoryViews;
use std::time::Instant;

/// Tunables for a session
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionOptions {
    pub thresholds: OverflowThresholds,
    pub scheduler: SchedulerConfig,
}

/// What a call to [`EditingSession::poll`] did
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionEvents {
    /// Number of full overflow passes that ran
    pub full_passes: usize,
    /// The overflow map differs from before the poll
    pub overflow_changed: bool,
    /// A resolution prompt was raised
    pub prompt: Option<ResolutionPrompt>,
}

impl SessionEvents {
    pub fn is_empty(&self) -> bool {
        self.full_passes == 0 && self.prompt.is_none()
    }
}

#[derive(Debug)]
pub struct EditingSession {
    document: Document,
    template: Template,
    active_page: usize,
    drag: DragMachine,
    views: CategoryViews,
    detector: OverflowDetector,
    scheduler: MeasureScheduler,
    pending: Option<ResolutionPrompt>,
    dirty: bool,
    revision: u64,
}

impl EditingSession {
    /// Open `document` with `template`. The document is normalized against
    /// the template first, and always ends up with at least one page.
    pub fn new(
        mut document: Document,
        template: Template,
        options: SessionOptions,
    ) -> Result<Self> {
        let report = document.normalize(&template)?;
        if !report.is_clean() {
            log::info!("Repaired document on open: {report:?}");
        }
        if document.pages().is_empty() {
            document.create_page(&template)?;
        }

        let mut scheduler = MeasureScheduler::new(options.scheduler);
        scheduler.note_mutation();

        Ok(Self {
            document,
            template,
            active_page: 0,
            drag: DragMachine::new(),
            views: CategoryViews::new(),
            detector: OverflowDetector::new(options.thresholds),
            scheduler,
            pending: None,
            dirty: !report.is_clean(),
            revision: 0,
        })
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn active_page(&self) -> usize {
        self.active_page
    }

    pub fn active_page_id(&self) -> Option<PageId> {
        self.document.pages().get(self.active_page).map(|page| page.id)
    }

    pub fn set_active_page(&mut self, index: usize) -> Result<()> {
        if index >= self.document.pages().len() {
            return Err(MenuError::InvalidTarget(format!(
                "page {} does not exist",
                index + 1
            )));
        }
        self.active_page = index;
        Ok(())
    }

    pub fn views(&self) -> &CategoryViews {
        &self.views
    }

    pub fn views_mut(&mut self) -> &mut CategoryViews {
        &mut self.views
    }

    pub fn overflow(&self) -> &OverflowMap {
        self.detector.map()
    }

    pub fn thresholds(&self) -> OverflowThresholds {
        self.detector.thresholds()
    }

    pub fn pending_resolution(&self) -> Option<&ResolutionPrompt> {
        self.pending.as_ref()
    }

    pub fn statistics(&self) -> DocumentStatistics {
        calculate_statistics(&self.document, self.detector.map())
    }

    /// Unsaved changes exist
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Incremented on every successful mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// A snapshot taken at `revision` was persisted
    pub fn mark_saved(&mut self, revision: u64) {
        if revision == self.revision {
            self.dirty = false;
        }
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    fn mutated(&mut self) {
        self.dirty = true;
        self.revision += 1;
        self.scheduler.note_mutation();
    }

    fn clamp_active_page(&mut self) {
        let pages = self.document.pages().len();
        if self.active_page >= pages {
            self.active_page = pages.saturating_sub(1);
        }
    }

    // =========================================================================
    // Timers
    // =========================================================================

    /// Start the interval pass
    pub fn start_timers(&mut self, now: Instant) {
        self.scheduler.start(now);
    }

    /// Stop every timer; the session is being closed
    pub fn stop_timers(&mut self) {
        self.scheduler.stop();
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Run whatever overflow work is due at `now`
    pub fn poll<M: Measure + ?Sized>(&mut self, now: Instant, measurer: &M) -> SessionEvents {
        let mut events = SessionEvents::default();

        for pass in self.scheduler.due(now) {
            let ctx = RenderContext::new(&self.document, &self.template);
            match pass {
                ScheduledPass::Full => {
                    let before = self.detector.map().clone();
                    let after = self.detector.recompute(&ctx, measurer);
                    events.overflow_changed |= &before != after;
                    events.full_passes += 1;
                }
                ScheduledPass::Check(category) => {
                    if self.pending.is_some() {
                        log::debug!("Skipping check for {category}: a prompt is already pending");
                        continue;
                    }
                    if let Some(prompt) =
                        check_category(&ctx, measurer, category, self.detector.thresholds())
                    {
                        self.pending = Some(prompt.clone());
                        events.prompt = Some(prompt);
                    }
                }
            }
        }

        events
    }

    /// Run a full pass immediately, outside the schedule
    pub fn recompute_overflow<M: Measure + ?Sized>(&mut self, measurer: &M) -> &OverflowMap {
        let ctx = RenderContext::new(&self.document, &self.template);
        self.detector.recompute(&ctx, measurer)
    }

    // =========================================================================
    // Categories and items
    // =========================================================================

    /// Create a category in the unassigned pool. A document emptied of pages
    /// gets a fresh one, since categories need somewhere to go.
    pub fn create_category(&mut self, name: impl Into<String>) -> Result<CategoryId> {
        if self.document.pages().is_empty() {
            self.document.create_page(&self.template)?;
            self.active_page = 0;
        }
        let id = self.document.create_category(name);
        self.mutated();
        Ok(id)
    }

    /// Create a category at the end of the active page and check that page
    pub fn create_category_on_active_page(
        &mut self,
        name: impl Into<String>,
    ) -> Result<CategoryId> {
        if self.document.pages().is_empty() {
            self.document.create_page(&self.template)?;
            self.active_page = 0;
        }
        let page = self
            .active_page_id()
            .ok_or_else(|| MenuError::InvalidTarget("no active page".to_string()))?;

        let id = self.document.create_category(name);
        self.document.assign_category(id, Some(page))?;
        self.mutated();
        self.scheduler.note_check(id);
        Ok(id)
    }

    pub fn rename_category(&mut self, id: CategoryId, name: impl Into<String>) -> Result<()> {
        self.document.rename_category(id, name)?;
        self.mutated();
        Ok(())
    }

    pub fn delete_category(&mut self, id: CategoryId) -> Result<Category> {
        let category = self.document.delete_category(id)?;
        self.views.remove(id);
        self.mutated();
        Ok(category)
    }

    pub fn set_category_breaks(
        &mut self,
        id: CategoryId,
        break_before: bool,
        break_mode: Option<BreakMode>,
    ) -> Result<()> {
        self.document.set_category_breaks(id, break_before, break_mode)?;
        self.mutated();
        Ok(())
    }

    pub fn set_category_column(&mut self, id: CategoryId, column: Option<u32>) -> Result<()> {
        self.document.set_category_column(id, column)?;
        self.mutated();
        Ok(())
    }

    /// Add an item; a category that sits on a page gets its page checked
    pub fn add_item(&mut self, category: CategoryId, item: NewItem) -> Result<ItemId> {
        let id = self.document.add_item(category, item)?;
        self.mutated();
        if self.document.locate_category(category).is_some() {
            self.scheduler.note_check(category);
        }
        Ok(id)
    }

    pub fn remove_item(&mut self, id: ItemId) -> Result<Item> {
        let item = self.document.remove_item(id)?;
        self.mutated();
        Ok(item)
    }

    pub fn update_item(&mut self, id: ItemId, update: ItemUpdate) -> Result<()> {
        self.document.update_item(id, update)?;
        self.mutated();
        Ok(())
    }

    pub fn move_item(&mut self, item: ItemId, target: CategoryId, index: usize) -> Result<()> {
        self.document.move_item(item, target, index)?;
        self.mutated();
        Ok(())
    }

    // =========================================================================
    // Pages
    // =========================================================================

    pub fn create_page(&mut self) -> Result<PageId> {
        let page = self.document.create_page(&self.template)?;
        self.mutated();
        Ok(page)
    }

    pub fn create_page_with_variant(&mut self, variant: VariantId) -> Result<PageId> {
        if !self.template.has_variant(&variant) {
            return Err(MenuError::UnknownVariant(variant));
        }
        let page = self.document.create_page_with_variant(variant);
        self.mutated();
        Ok(page)
    }

    /// Delete a page; its categories move to the neighbouring page
    pub fn delete_page(&mut self, page: PageId) -> Result<()> {
        let index = self
            .document
            .page_index(page)
            .ok_or(MenuError::UnknownPage(page))?;
        let heir = self.document.delete_page(page)?;

        if self.active_page == index {
            self.active_page = heir.unwrap_or(0);
        } else if self.active_page > index {
            self.active_page -= 1;
        }
        self.clamp_active_page();
        self.mutated();
        Ok(())
    }

    pub fn set_page_variant(&mut self, page: PageId, variant: VariantId) -> Result<()> {
        if !self.template.has_variant(&variant) {
            return Err(MenuError::UnknownVariant(variant));
        }
        self.document.set_page_variant(page, variant)?;
        self.mutated();
        Ok(())
    }

    pub fn assign_category(&mut self, category: CategoryId, page: Option<PageId>) -> Result<()> {
        self.document.assign_category(category, page)?;
        self.mutated();
        Ok(())
    }

    pub fn insert_category(
        &mut self,
        category: CategoryId,
        page: PageId,
        index: usize,
    ) -> Result<()> {
        self.document.insert_category(category, page, index)?;
        self.mutated();
        Ok(())
    }

    pub fn move_category_within_page(
        &mut self,
        page: PageId,
        from: usize,
        to: usize,
    ) -> Result<()> {
        self.document.move_category_within_page(page, from, to)?;
        self.mutated();
        Ok(())
    }

    // =========================================================================
    // Template
    // =========================================================================

    /// Switch to another template (or an edited version of the current one)
    pub fn replace_template(&mut self, template: Template) -> Result<NormalizeReport> {
        let mut document = self.document.clone();
        let report = document.normalize(&template)?;
        if document.pages().is_empty() {
            document.create_page(&template)?;
        }

        self.document = document;
        self.template = template;
        self.detector.clear();
        self.clamp_active_page();
        self.mutated();
        log::info!("Switched to template '{}'", self.template.id);
        Ok(report)
    }

    /// Reflow every category, in reading order, onto pages by estimated
    /// height. Existing pages are reused in order and keep their variants;
    /// missing pages get the default variant. Returns the pages in use.
    pub fn auto_paginate(&mut self) -> Result<usize> {
        let variant = self.template.default_variant().ok_or_else(|| {
            MenuError::Config(format!("Template '{}' has no layout variants", self.template.id))
        })?;

        let order = self.document.reading_order();
        let categories: Vec<&Category> = order
            .iter()
            .filter_map(|id| self.document.category(*id))
            .collect();
        let blocks = EstimatingMeasurer::default().blocks(&self.template, variant, &categories);
        let capacity = BodyFrame::for_variant(&self.template, variant).capacity();
        let plan = plan_pages(&blocks, capacity);
        let used = plan.len();
        let variant_id = variant.id.clone();

        self.document.apply_page_plan(plan, &variant_id);
        self.clamp_active_page();
        self.mutated();
        log::info!("Paginated {} categories onto {used} pages", order.len());
        Ok(used)
    }

    // =========================================================================
    // Dragging
    // =========================================================================

    pub fn drag_state(&self) -> DragState {
        self.drag.state()
    }

    fn apply_drag_effects(&mut self, effects: Vec<DragEffect>) {
        for effect in effects {
            match effect {
                DragEffect::CollapseCategories => {
                    let ids: Vec<CategoryId> =
                        self.document.categories().iter().map(|c| c.id).collect();
                    self.views.collapse_all(ids);
                }
                DragEffect::RestoreCategories => self.views.restore_all(),
                DragEffect::DocumentChanged => self.mutated(),
                DragEffect::CheckOverflow(category) => self.scheduler.note_check(category),
            }
        }
    }

    pub fn start_drag(&mut self, entity: DragEntity) {
        let effects = self.drag.start(&self.document, entity);
        self.apply_drag_effects(effects);
    }

    pub fn drag_over(&mut self, target: Option<DropTarget>) {
        let effects = self.drag.hover(&mut self.document, target);
        self.apply_drag_effects(effects);
    }

    /// Hit-test `dragged` against `candidates` and hover the winner
    pub fn drag_over_rect(
        &mut self,
        dragged: &Rect,
        candidates: &[Candidate],
    ) -> Option<DropTarget> {
        let entity = self.drag.active()?;
        let target = resolve_collision(entity, dragged, candidates);
        self.drag_over(target);
        target
    }

    pub fn drop_drag(&mut self) {
        let effects = self.drag.drop(&mut self.document);
        self.apply_drag_effects(effects);
    }

    pub fn cancel_drag(&mut self) {
        let effects = self.drag.cancel();
        self.apply_drag_effects(effects);
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Apply the user's answer to the pending prompt
    pub fn resolve(&mut self, choice: ResolutionChoice) -> Result<ResolutionOutcome> {
        let prompt = self.pending.take().ok_or(MenuError::NoPendingResolution)?;

        let outcome = match apply_choice(&mut self.document, &self.template, &prompt, choice) {
            Ok(outcome) => outcome,
            Err(err) => {
                if matches!(err, MenuError::InvalidTarget(_)) {
                    self.pending = Some(prompt);
                }
                return Err(err);
            }
        };

        if let Some(index) = outcome.active_page {
            self.active_page = index;
        }
        if outcome.destination.is_some() {
            self.mutated();
        } else {
            self.scheduler.note_mutation();
        }
        Ok(outcome)
    }

    /// Close the pending prompt without acting on it
    pub fn dismiss_resolution(&mut self) -> bool {
        let dismissed = self.pending.take().is_some();
        if dismissed {
            self.scheduler.note_mutation();
        }
        dismissed
    }
}
