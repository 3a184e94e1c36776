use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MenuError {
    #[error("Unknown category: {0}")]
    UnknownCategory(CategoryId),
    #[error("Unknown item: {0}")]
    UnknownItem(ItemId),
    #[error("Unknown page: {0}")]
    UnknownPage(PageId),
    #[error("Unknown layout variant: {0}")]
    UnknownVariant(VariantId),
    #[error("Cannot delete the last page of a document that still has categories")]
    LastPage,
    #[error("Invalid price {0}: prices must be finite and non-negative")]
    InvalidPrice(f64),
    #[error("Invalid move target: {0}")]
    InvalidTarget(String),
    #[error("No overflow resolution is pending")]
    NoPendingResolution,
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV row {row}: {message}")]
    CsvRow { row: usize, message: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, MenuError>;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a category, unique for the lifetime of its document
    CategoryId,
    "category"
);
numeric_id!(
    /// Identifier of a menu item, unique for the lifetime of its document
    ItemId,
    "item"
);
numeric_id!(
    /// Identifier of a page, unique for the lifetime of its document
    PageId,
    "page"
);

/// Identifier of a layout variant within a template
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct VariantId(pub String);

impl VariantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VariantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where explicit break hints inside a category are honored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BreakMode {
    /// Only the category's own break-before flag starts a new column
    Category,
    /// Break-before flags on individual items start a new column
    Item,
}

/// A single priced menu entry
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub price: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub featured: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub break_before: bool,
}

/// Field values for an item that has not been added yet
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewItem {
    pub name: String,
    pub price: f64,
    pub description: String,
    pub featured: bool,
    pub break_before: bool,
}

impl NewItem {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn featured(mut self) -> Self {
        self.featured = true;
        self
    }
}

/// Partial update of an item; `None` fields are left untouched
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub featured: Option<bool>,
    pub break_before: Option<bool>,
}

/// Named, ordered group of items
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub items: Vec<Item>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub break_before: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub break_mode: Option<BreakMode>,
    /// Fixed column for multi-column layouts that are not paged
    #[cfg_attr(feature = "serde", serde(default))]
    pub column: Option<u32>,
}

impl Category {
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn item_position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// Break mode with the category-level default applied
    pub fn effective_break_mode(&self) -> BreakMode {
        self.break_mode.unwrap_or(BreakMode::Category)
    }
}

/// One physical output page
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Page {
    pub id: PageId,
    pub variant_id: VariantId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub category_ids: Vec<CategoryId>,
}

impl Page {
    pub fn contains(&self, category: CategoryId) -> bool {
        self.category_ids.contains(&category)
    }

    pub fn position_of(&self, category: CategoryId) -> Option<usize> {
        self.category_ids.iter().position(|id| *id == category)
    }
}

/// Summary numbers for a document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentStatistics {
    pub pages: usize,
    pub categories: usize,
    /// Categories referenced by a page
    pub assigned: usize,
    /// Categories in the unassigned pool
    pub unassigned: usize,
    pub items: usize,
    pub featured_items: usize,
    /// Page indices currently flagged as overflowing
    pub overflowing_pages: Vec<usize>,
}
