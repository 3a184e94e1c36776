//! The menu document: categories with their items, and the pages that
//! reference categories by id.
//!
//! All structural mutations go through methods on [`Document`]. They keep
//! the single-ownership invariant: a category id is listed by at most one
//! page at a time.

use crate::template::Template;
use crate::types::*;
use std::collections::HashSet;

/// Ordered categories and pages of one menu
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Document {
    template_id: String,
    #[cfg_attr(feature = "serde", serde(default))]
    categories: Vec<Category>,
    #[cfg_attr(feature = "serde", serde(default))]
    pages: Vec<Page>,
    /// Next value handed out by the id allocator; shared by all id kinds
    #[cfg_attr(feature = "serde", serde(default))]
    next_id: u64,
}

/// What [`Document::normalize`] had to repair
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizeReport {
    /// Page references to categories that do not exist
    pub dangling_removed: usize,
    /// Category ids listed by more than one page (first listing wins)
    pub duplicates_removed: usize,
    /// Pages whose variant no longer exists in the template
    pub remapped_pages: Vec<PageId>,
    /// A page had to be created because categories existed without any page
    pub created_page: bool,
}

impl NormalizeReport {
    pub fn is_clean(&self) -> bool {
        self.dangling_removed == 0
            && self.duplicates_removed == 0
            && self.remapped_pages.is_empty()
            && !self.created_page
    }
}

/// Move the element at `from` so it ends up at `to`, shifting the elements
/// in between.
pub(crate) fn array_move<T>(list: &mut Vec<T>, from: usize, to: usize) {
    if from >= list.len() || from == to {
        return;
    }
    let element = list.remove(from);
    let to = to.min(list.len());
    list.insert(to, element);
}

impl Document {
    /// Empty document: no pages and no categories
    pub fn new(template_id: impl Into<String>) -> Self {
        Self {
            template_id: template_id.into(),
            categories: Vec::new(),
            pages: Vec::new(),
            next_id: 1,
        }
    }

    /// Document with a single empty page using the template's default variant
    pub fn for_template(template: &Template) -> Result<Self> {
        let mut document = Self::new(template.id.clone());
        document.create_page(template)?;
        Ok(document)
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn has_category(&self, id: CategoryId) -> bool {
        self.category(id).is_some()
    }

    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.iter().find(|page| page.id == id)
    }

    pub fn page_index(&self, id: PageId) -> Option<usize> {
        self.pages.iter().position(|page| page.id == id)
    }

    /// Page index and position of the page that lists `category`
    pub fn locate_category(&self, category: CategoryId) -> Option<(usize, usize)> {
        self.pages.iter().enumerate().find_map(|(page_index, page)| {
            page.position_of(category)
                .map(|position| (page_index, position))
        })
    }

    /// Owning category and position of `item`
    pub fn locate_item(&self, item: ItemId) -> Option<(CategoryId, usize)> {
        self.categories.iter().find_map(|category| {
            category
                .item_position(item)
                .map(|position| (category.id, position))
        })
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.categories.iter().find_map(|category| category.item(id))
    }

    /// Categories that no page references, in category order
    pub fn unassigned(&self) -> Vec<CategoryId> {
        let assigned: HashSet<CategoryId> = self
            .pages
            .iter()
            .flat_map(|page| page.category_ids.iter().copied())
            .collect();
        self.categories
            .iter()
            .map(|category| category.id)
            .filter(|id| !assigned.contains(id))
            .collect()
    }

    /// Every category in the order a reader meets it: page by page, then the
    /// unassigned pool.
    pub fn reading_order(&self) -> Vec<CategoryId> {
        let mut order: Vec<CategoryId> = self
            .pages
            .iter()
            .flat_map(|page| page.category_ids.iter().copied())
            .collect();
        order.extend(self.unassigned());
        order
    }

    /// Categories of the page at `page_index`, resolved in page order
    pub fn page_categories(&self, page_index: usize) -> Vec<&Category> {
        self.pages
            .get(page_index)
            .map(|page| {
                page.category_ids
                    .iter()
                    .filter_map(|id| self.category(*id))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn category_mut(&mut self, id: CategoryId) -> Result<&mut Category> {
        self.categories
            .iter_mut()
            .find(|category| category.id == id)
            .ok_or(MenuError::UnknownCategory(id))
    }

    fn page_mut(&mut self, id: PageId) -> Result<&mut Page> {
        self.pages
            .iter_mut()
            .find(|page| page.id == id)
            .ok_or(MenuError::UnknownPage(id))
    }

    // =========================================================================
    // Categories and items
    // =========================================================================

    /// Create an unassigned category
    pub fn create_category(&mut self, name: impl Into<String>) -> CategoryId {
        let id = CategoryId(self.allocate_id());
        self.categories.push(Category {
            id,
            name: name.into(),
            items: Vec::new(),
            break_before: false,
            break_mode: None,
            column: None,
        });
        id
    }

    pub fn rename_category(&mut self, id: CategoryId, name: impl Into<String>) -> Result<()> {
        self.category_mut(id)?.name = name.into();
        Ok(())
    }

    /// Delete a category and every page reference to it
    pub fn delete_category(&mut self, id: CategoryId) -> Result<Category> {
        let index = self
            .categories
            .iter()
            .position(|category| category.id == id)
            .ok_or(MenuError::UnknownCategory(id))?;
        self.detach_category(id);
        Ok(self.categories.remove(index))
    }

    pub fn set_category_breaks(
        &mut self,
        id: CategoryId,
        break_before: bool,
        break_mode: Option<BreakMode>,
    ) -> Result<()> {
        let category = self.category_mut(id)?;
        category.break_before = break_before;
        category.break_mode = break_mode;
        Ok(())
    }

    pub fn set_category_column(&mut self, id: CategoryId, column: Option<u32>) -> Result<()> {
        self.category_mut(id)?.column = column;
        Ok(())
    }

    fn validate_price(price: f64) -> Result<()> {
        if price.is_finite() && price >= 0.0 {
            Ok(())
        } else {
            Err(MenuError::InvalidPrice(price))
        }
    }

    pub fn add_item(&mut self, category: CategoryId, item: NewItem) -> Result<ItemId> {
        Self::validate_price(item.price)?;
        if !self.has_category(category) {
            return Err(MenuError::UnknownCategory(category));
        }
        let id = ItemId(self.allocate_id());
        self.category_mut(category)?.items.push(Item {
            id,
            name: item.name,
            price: item.price,
            description: item.description,
            featured: item.featured,
            break_before: item.break_before,
        });
        Ok(id)
    }

    pub fn remove_item(&mut self, id: ItemId) -> Result<Item> {
        let (category, position) = self.locate_item(id).ok_or(MenuError::UnknownItem(id))?;
        Ok(self.category_mut(category)?.items.remove(position))
    }

    /// Replace the fields set in `update`
    pub fn update_item(&mut self, id: ItemId, update: ItemUpdate) -> Result<()> {
        if let Some(price) = update.price {
            Self::validate_price(price)?;
        }
        let (category, position) = self.locate_item(id).ok_or(MenuError::UnknownItem(id))?;
        let item = &mut self.category_mut(category)?.items[position];

        if let Some(name) = update.name {
            item.name = name;
        }
        if let Some(price) = update.price {
            item.price = price;
        }
        if let Some(description) = update.description {
            item.description = description;
        }
        if let Some(featured) = update.featured {
            item.featured = featured;
        }
        if let Some(break_before) = update.break_before {
            item.break_before = break_before;
        }
        Ok(())
    }

    /// Move an item to `index` in `target`; a move inside the same category
    /// is an array move, a move across categories inserts at `index`.
    pub fn move_item(&mut self, item: ItemId, target: CategoryId, index: usize) -> Result<()> {
        let (source, position) = self.locate_item(item).ok_or(MenuError::UnknownItem(item))?;
        if !self.has_category(target) {
            return Err(MenuError::UnknownCategory(target));
        }

        if source == target {
            let items = &mut self.category_mut(source)?.items;
            let last = items.len().saturating_sub(1);
            array_move(items, position, index.min(last));
            return Ok(());
        }

        let moved = self.category_mut(source)?.items.remove(position);
        let items = &mut self.category_mut(target)?.items;
        let index = index.min(items.len());
        items.insert(index, moved);
        Ok(())
    }

    // =========================================================================
    // Pages
    // =========================================================================

    /// Append a page using the template's default variant
    pub fn create_page(&mut self, template: &Template) -> Result<PageId> {
        let variant = template
            .default_variant()
            .ok_or_else(|| {
                MenuError::Config(format!("Template '{}' has no layout variants", template.id))
            })?
            .id
            .clone();
        Ok(self.create_page_with_variant(variant))
    }

    pub fn create_page_with_variant(&mut self, variant_id: VariantId) -> PageId {
        let id = PageId(self.allocate_id());
        self.pages.push(Page {
            id,
            variant_id,
            category_ids: Vec::new(),
        });
        id
    }

    /// Delete a page, handing its categories to the previous page (or to the
    /// new first page when the first page is deleted).
    ///
    /// Returns the index of the page that received the categories, if any
    /// page remains.
    pub fn delete_page(&mut self, id: PageId) -> Result<Option<usize>> {
        let index = self.page_index(id).ok_or(MenuError::UnknownPage(id))?;
        if self.pages.len() == 1 && !self.categories.is_empty() {
            return Err(MenuError::LastPage);
        }

        let removed = self.pages.remove(index);
        if self.pages.is_empty() {
            return Ok(None);
        }

        let heir = index.saturating_sub(1);
        self.pages[heir].category_ids.extend(removed.category_ids);
        Ok(Some(heir))
    }

    pub fn set_page_variant(&mut self, page: PageId, variant_id: VariantId) -> Result<()> {
        self.page_mut(page)?.variant_id = variant_id;
        Ok(())
    }

    /// Remove `category` from every page that lists it
    ///
    /// Returns where it was first found.
    pub(crate) fn detach_category(&mut self, category: CategoryId) -> Option<(usize, usize)> {
        let found = self.locate_category(category);
        for page in &mut self.pages {
            page.category_ids.retain(|id| *id != category);
        }
        found
    }

    /// Make `page` the owner of `category`, appending it to the page's list.
    /// `None` leaves the category unassigned.
    pub fn assign_category(&mut self, category: CategoryId, page: Option<PageId>) -> Result<()> {
        if !self.has_category(category) {
            return Err(MenuError::UnknownCategory(category));
        }
        if let Some(page) = page {
            if self.page(page).is_none() {
                return Err(MenuError::UnknownPage(page));
            }
        }

        self.detach_category(category);
        if let Some(page) = page {
            self.page_mut(page)?.category_ids.push(category);
        }
        Ok(())
    }

    /// Make `page` the owner of `category`, inserting at `index`
    pub fn insert_category(
        &mut self,
        category: CategoryId,
        page: PageId,
        index: usize,
    ) -> Result<()> {
        if !self.has_category(category) {
            return Err(MenuError::UnknownCategory(category));
        }
        if self.page(page).is_none() {
            return Err(MenuError::UnknownPage(page));
        }

        self.detach_category(category);
        let ids = &mut self.page_mut(page)?.category_ids;
        let index = index.min(ids.len());
        ids.insert(index, category);
        Ok(())
    }

    /// Reorder the categories of one page
    pub fn move_category_within_page(
        &mut self,
        page: PageId,
        from: usize,
        to: usize,
    ) -> Result<()> {
        let ids = &mut self.page_mut(page)?.category_ids;
        if from >= ids.len() {
            return Err(MenuError::InvalidTarget(format!(
                "position {from} is outside {page}"
            )));
        }
        let last = ids.len() - 1;
        array_move(ids, from, to.min(last));
        Ok(())
    }

    /// Replace the category lists of all pages, keeping each page's variant.
    /// Extra plans create pages with `variant_id`.
    pub(crate) fn apply_page_plan(&mut self, plan: Vec<Vec<CategoryId>>, variant_id: &VariantId) {
        for page in &mut self.pages {
            page.category_ids.clear();
        }
        for (index, ids) in plan.into_iter().enumerate() {
            if index == self.pages.len() {
                self.create_page_with_variant(variant_id.clone());
            }
            self.pages[index].category_ids = ids;
        }
    }

    // =========================================================================
    // Repair
    // =========================================================================

    /// Bring a loaded or externally edited document back to a valid state for
    /// `template`. Never drops a category.
    pub fn normalize(&mut self, template: &Template) -> Result<NormalizeReport> {
        template.validate()?;
        let mut report = NormalizeReport::default();

        let known: HashSet<CategoryId> = self.categories.iter().map(|c| c.id).collect();
        let mut seen = HashSet::new();
        for page in &mut self.pages {
            page.category_ids.retain(|id| {
                if !known.contains(id) {
                    report.dangling_removed += 1;
                    false
                } else if !seen.insert(*id) {
                    report.duplicates_removed += 1;
                    false
                } else {
                    true
                }
            });
        }

        // Template has at least one variant after validate()
        let fallback = template.variants[0].id.clone();
        for page in &mut self.pages {
            if !template.has_variant(&page.variant_id) {
                log::debug!(
                    "Remapping {} from missing variant '{}' to '{}'",
                    page.id,
                    page.variant_id,
                    fallback
                );
                page.variant_id = fallback.clone();
                report.remapped_pages.push(page.id);
            }
        }

        if self.pages.is_empty() && !self.categories.is_empty() {
            self.create_page(template)?;
            report.created_page = true;
        }

        let max_id = self
            .categories
            .iter()
            .flat_map(|c| std::iter::once(c.id.0).chain(c.items.iter().map(|item| item.id.0)))
            .chain(self.pages.iter().map(|page| page.id.0))
            .max()
            .unwrap_or(0);
        self.next_id = self.next_id.max(max_id + 1);

        self.template_id = template.id.clone();
        Ok(report)
    }

    /// Check the single-ownership invariant
    pub fn is_consistent(&self) -> bool {
        let mut seen = HashSet::new();
        self.pages
            .iter()
            .flat_map(|page| page.category_ids.iter())
            .all(|id| self.has_category(*id) && seen.insert(*id))
    }
}
