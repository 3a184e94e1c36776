//! CSV import
//!
//! Rows are `category,name,price,description,featured` with a header row.
//! Columns are matched by header name; `description` and `featured` are
//! optional.

use crate::document::Document;
use crate::types::*;
use std::path::Path;

/// A category read from CSV, not yet part of any document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImportedCategory {
    pub name: String,
    pub items: Vec<NewItem>,
}

/// Result of [`import_into`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImportSummary {
    /// Categories that did not exist before the import
    pub created: Vec<CategoryId>,
    /// Existing categories that received items
    pub extended: Vec<CategoryId>,
    pub items: usize,
}

struct Columns {
    category: usize,
    name: usize,
    price: usize,
    description: Option<usize>,
    featured: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |wanted: &str| {
            headers
                .iter()
                .position(|header| header.trim().eq_ignore_ascii_case(wanted))
        };
        let required = |wanted: &str| {
            find(wanted).ok_or_else(|| MenuError::CsvRow {
                row: 1,
                message: format!("missing '{wanted}' column"),
            })
        };

        Ok(Self {
            category: required("category")?,
            name: required("name")?,
            price: required("price")?,
            description: find("description"),
            featured: find("featured"),
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "x"
    )
}

/// Parse CSV text into categories, in first-seen order
pub fn parse_csv(contents: &str) -> Result<Vec<ImportedCategory>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(contents.as_bytes());
    let columns = Columns::from_headers(reader.headers()?)?;

    let mut categories: Vec<ImportedCategory> = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row = record
            .position()
            .map(|position| position.line() as usize)
            .unwrap_or_default();
        let field = |index: usize| record.get(index).unwrap_or("").trim();

        let category = field(columns.category);
        let name = field(columns.name);
        if category.is_empty() && name.is_empty() {
            continue;
        }
        if category.is_empty() || name.is_empty() {
            return Err(MenuError::CsvRow {
                row,
                message: "category and name are required".to_string(),
            });
        }

        let price_text = field(columns.price);
        let price: f64 = price_text.parse().map_err(|_| MenuError::CsvRow {
            row,
            message: format!("invalid price '{price_text}'"),
        })?;
        if !(price.is_finite() && price >= 0.0) {
            return Err(MenuError::CsvRow {
                row,
                message: format!("invalid price '{price_text}'"),
            });
        }

        let mut item = NewItem::new(name, price);
        if let Some(index) = columns.description {
            item.description = field(index).to_string();
        }
        if let Some(index) = columns.featured {
            item.featured = parse_flag(field(index));
        }

        match categories.iter_mut().find(|existing| existing.name == category) {
            Some(existing) => existing.items.push(item),
            None => categories.push(ImportedCategory {
                name: category.to_string(),
                items: vec![item],
            }),
        }
    }

    Ok(categories)
}

/// Read and parse a CSV file
pub async fn load_from_csv(path: impl AsRef<Path>) -> Result<Vec<ImportedCategory>> {
    let path = path.as_ref().to_owned();
    let contents = tokio::fs::read_to_string(&path).await?;

    let categories = tokio::task::spawn_blocking(move || parse_csv(&contents)).await??;
    log::debug!(
        "Read {} categories from {}",
        categories.len(),
        path.display()
    );
    Ok(categories)
}

/// Add imported categories to `document`. Items go into an existing category
/// with the same name when there is one; new categories are appended to
/// `page`, or left unassigned.
pub fn import_into(
    document: &mut Document,
    categories: Vec<ImportedCategory>,
    page: Option<PageId>,
) -> Result<ImportSummary> {
    if let Some(page) = page {
        if document.page(page).is_none() {
            return Err(MenuError::UnknownPage(page));
        }
    }

    let mut summary = ImportSummary::default();
    for imported in categories {
        let existing = document
            .categories()
            .iter()
            .find(|category| category.name == imported.name)
            .map(|category| category.id);

        let id = match existing {
            Some(id) => {
                summary.extended.push(id);
                id
            }
            None => {
                let id = document.create_category(imported.name);
                if page.is_some() {
                    document.assign_category(id, page)?;
                }
                summary.created.push(id);
                id
            }
        };

        for item in imported.items {
            document.add_item(id, item)?;
            summary.items += 1;
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_groups_by_category() {
        let csv = "category,name,price,description,featured\n\
                   Starters,Soup,6.5,Tomato,\n\
                   Mains,Steak,24,,yes\n\
                   Starters,Bread,3,,\n";
        let categories = parse_csv(csv).unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "Starters");
        assert_eq!(categories[0].items.len(), 2);
        assert_eq!(categories[0].items[0].description, "Tomato");
        assert!(categories[1].items[0].featured);
    }

    #[test]
    fn test_bad_price_reports_row() {
        let csv = "category,name,price\nStarters,Soup,6.5\nMains,Steak,lots\n";
        match parse_csv(csv) {
            Err(MenuError::CsvRow { row, message }) => {
                assert_eq!(row, 3);
                assert!(message.contains("lots"));
            }
            other => panic!("expected row error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_column() {
        let csv = "category,title,price\nStarters,Soup,6.5\n";
        assert!(matches!(parse_csv(csv), Err(MenuError::CsvRow { row: 1, .. })));
    }

    #[test]
    fn test_negative_price_rejected() {
        let csv = "name,category,price\nSoup,Starters,-2\n";
        assert!(parse_csv(csv).is_err());
    }
}
