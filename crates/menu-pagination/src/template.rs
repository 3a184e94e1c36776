//! Templates and their layout variants
//!
//! A template fixes the physical page format and the typography of a menu.
//! Pages pick one of the template's layout variants by id; the variant
//! decides which structural sections (header, body, highlight image) the
//! page shows.

use crate::types::*;
use std::collections::{BTreeMap, HashSet};

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Height > width
    #[default]
    Portrait,
    /// Width > height
    Landscape,
}

/// Physical page formats a menu can be printed on
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "PageFormatRepr", into = "PageFormatRepr")
)]
pub enum PageFormat {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
    /// DL leaflet (1/3 A4), common for takeaway menus
    Dl,
    Custom { width_mm: f32, height_mm: f32 },
}

impl PageFormat {
    /// Base dimensions, always portrait
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PageFormat::A3 => (297.0, 420.0),
            PageFormat::A4 => (210.0, 297.0),
            PageFormat::A5 => (148.0, 210.0),
            PageFormat::Letter => (215.9, 279.4),
            PageFormat::Legal => (215.9, 355.6),
            PageFormat::Tabloid => (279.4, 431.8),
            PageFormat::Dl => (99.0, 210.0),
            PageFormat::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }

    /// Dimensions with orientation applied
    pub fn dimensions_with_orientation(self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PageFormat::A3 => "A3",
            PageFormat::A4 => "A4",
            PageFormat::A5 => "A5",
            PageFormat::Letter => "Letter",
            PageFormat::Legal => "Legal",
            PageFormat::Tabloid => "Tabloid",
            PageFormat::Dl => "DL",
            PageFormat::Custom { .. } => "Custom",
        }
    }

    /// Look up a named format; `"DL"` and `"dl"` both work
    pub fn from_name(name: &str) -> Option<Self> {
        [
            PageFormat::A3,
            PageFormat::A4,
            PageFormat::A5,
            PageFormat::Letter,
            PageFormat::Legal,
            PageFormat::Tabloid,
            PageFormat::Dl,
        ]
        .into_iter()
        .find(|format| format.name().eq_ignore_ascii_case(name))
    }
}

/// Header band at the top of a page (restaurant name, logo, tagline)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HeaderSection {
    pub shown: bool,
    pub show_logo: bool,
    pub show_tagline: bool,
    pub height_mm: f32,
}

impl Default for HeaderSection {
    fn default() -> Self {
        Self {
            shown: true,
            show_logo: true,
            show_tagline: false,
            height_mm: 30.0,
        }
    }
}

/// Main content area holding the page's categories
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BodySection {
    pub shown: bool,
    pub columns: u32,
    pub show_descriptions: bool,
    pub show_prices: bool,
    pub dividers: bool,
}

impl Default for BodySection {
    fn default() -> Self {
        Self {
            shown: true,
            columns: 1,
            show_descriptions: true,
            show_prices: true,
            dividers: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HighlightPosition {
    #[default]
    Top,
    Bottom,
}

/// Full-width highlight image band
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HighlightSection {
    pub shown: bool,
    pub position: HighlightPosition,
    pub height_mm: f32,
}

impl Default for HighlightSection {
    fn default() -> Self {
        Self {
            shown: false,
            position: HighlightPosition::Top,
            height_mm: 60.0,
        }
    }
}

/// Named page layout within a template
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutVariant {
    pub id: VariantId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub header: HeaderSection,
    #[cfg_attr(feature = "serde", serde(default))]
    pub body: BodySection,
    #[cfg_attr(feature = "serde", serde(default))]
    pub highlight: HighlightSection,
}

impl LayoutVariant {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: VariantId::new(id),
            name: name.into(),
            header: HeaderSection::default(),
            body: BodySection::default(),
            highlight: HighlightSection::default(),
        }
    }

    /// Variant showing only the body, used for continuation pages
    pub fn body_only(id: impl Into<String>, name: impl Into<String>, columns: u32) -> Self {
        let mut variant = Self::new(id, name);
        variant.header.shown = false;
        variant.body.columns = columns;
        variant
    }

    /// Whether pages created by the editor should prefer this variant
    pub fn is_continuation(&self) -> bool {
        self.body.shown && !self.header.shown
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Colors {
    pub background: String,
    pub text: String,
    pub accent: String,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#1f1f1f".to_string(),
            accent: "#9b2c2c".to_string(),
        }
    }
}

/// Font families and sizes in rendering units (px)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Fonts {
    pub heading_family: String,
    pub body_family: String,
    pub title_px: f32,
    pub heading_px: f32,
    pub item_px: f32,
    pub description_px: f32,
}

impl Default for Fonts {
    fn default() -> Self {
        Self {
            heading_family: "Playfair Display".to_string(),
            body_family: "Lato".to_string(),
            title_px: 32.0,
            heading_px: 22.0,
            item_px: 15.0,
            description_px: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Spacing {
    pub page_margin_mm: f32,
    pub category_gap_px: f32,
    pub item_gap_px: f32,
    pub column_gap_px: f32,
    /// Line height as a multiple of the font size
    pub line_height: f32,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            page_margin_mm: 12.0,
            category_gap_px: 24.0,
            item_gap_px: 8.0,
            column_gap_px: 24.0,
            line_height: 1.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TemplateStyle {
    pub colors: Colors,
    pub fonts: Fonts,
    pub spacing: Spacing,
}

/// Named bundle of page format, style and layout variants
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Template {
    pub id: String,
    pub name: String,
    pub format: PageFormat,
    #[cfg_attr(feature = "serde", serde(default))]
    pub orientation: Orientation,
    pub variants: Vec<LayoutVariant>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub style: TemplateStyle,
}

/// A variant together with the physical size of the page it lays out
#[derive(Debug, Clone, Copy)]
pub struct ResolvedLayout<'a> {
    pub variant: &'a LayoutVariant,
    pub width_mm: f32,
    pub height_mm: f32,
}

impl Template {
    /// Single-column A4 menu with a cover variant and a continuation variant
    pub fn classic() -> Self {
        let mut cover = LayoutVariant::new("cover", "Cover with header");
        cover.header.show_tagline = true;
        Self {
            id: "classic".to_string(),
            name: "Classic".to_string(),
            format: PageFormat::A4,
            orientation: Orientation::Portrait,
            variants: vec![cover, LayoutVariant::body_only("body", "Body only", 1)],
            style: TemplateStyle::default(),
        }
    }

    /// Two-column A4 landscape menu with a highlight image variant
    pub fn bistro() -> Self {
        let mut feature = LayoutVariant::new("feature", "Header and highlight");
        feature.body.columns = 2;
        feature.highlight.shown = true;
        feature.highlight.position = HighlightPosition::Bottom;
        feature.highlight.height_mm = 45.0;

        let mut style = TemplateStyle::default();
        style.fonts.heading_family = "Cormorant Garamond".to_string();
        style.colors.accent = "#2f5d50".to_string();

        Self {
            id: "bistro".to_string(),
            name: "Bistro".to_string(),
            format: PageFormat::A4,
            orientation: Orientation::Landscape,
            variants: vec![
                feature,
                LayoutVariant::body_only("two-column", "Two columns", 2),
            ],
            style,
        }
    }

    /// Page dimensions in millimeters with orientation applied
    pub fn dimensions_mm(&self) -> (f32, f32) {
        self.format.dimensions_with_orientation(self.orientation)
    }

    /// Physical page height in rendering units
    pub fn page_height_px(&self) -> f64 {
        crate::overflow::mm_to_px(self.dimensions_mm().1)
    }

    pub fn variant(&self, id: &VariantId) -> Option<&LayoutVariant> {
        self.variants.iter().find(|variant| &variant.id == id)
    }

    pub fn has_variant(&self, id: &VariantId) -> bool {
        self.variant(id).is_some()
    }

    /// Resolve a variant id to its section configuration and the page size
    pub fn resolve(&self, id: &VariantId) -> Option<ResolvedLayout<'_>> {
        let (width_mm, height_mm) = self.dimensions_mm();
        self.variant(id).map(|variant| ResolvedLayout {
            variant,
            width_mm,
            height_mm,
        })
    }

    /// Variant assigned to newly created pages: a body without header if the
    /// template has one, otherwise the first variant.
    pub fn default_variant(&self) -> Option<&LayoutVariant> {
        self.variants
            .iter()
            .find(|variant| variant.is_continuation())
            .or_else(|| self.variants.first())
    }

    /// Validate the template
    pub fn validate(&self) -> Result<()> {
        if self.variants.is_empty() {
            return Err(MenuError::Config(format!(
                "Template '{}' has no layout variants",
                self.id
            )));
        }

        let mut seen = HashSet::new();
        for variant in &self.variants {
            if !seen.insert(&variant.id) {
                return Err(MenuError::Config(format!(
                    "Duplicate layout variant id '{}'",
                    variant.id
                )));
            }
            if variant.body.columns == 0 {
                return Err(MenuError::Config(format!(
                    "Layout variant '{}' must have at least one column",
                    variant.id
                )));
            }
        }

        let (width_mm, height_mm) = self.dimensions_mm();
        if !(width_mm > 0.0 && height_mm > 0.0) {
            return Err(MenuError::Config(
                "Page dimensions must be positive".to_string(),
            ));
        }

        let margin = self.style.spacing.page_margin_mm;
        if margin < 0.0 || margin * 2.0 >= width_mm.min(height_mm) {
            return Err(MenuError::Config(format!(
                "Page margin of {margin}mm does not fit a {width_mm}x{height_mm}mm page"
            )));
        }

        let fonts = &self.style.fonts;
        if [
            fonts.title_px,
            fonts.heading_px,
            fonts.item_px,
            fonts.description_px,
            self.style.spacing.line_height,
        ]
        .iter()
        .any(|value| *value <= 0.0)
        {
            return Err(MenuError::Config(
                "Font sizes and line height must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Templates available to an editor, keyed by id
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    templates: BTreeMap<String, Template>,
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library preloaded with the built-in templates
    pub fn builtin() -> Self {
        let mut library = Self::new();
        for template in [Template::classic(), Template::bistro()] {
            library.templates.insert(template.id.clone(), template);
        }
        library
    }

    /// Add or replace a template after validating it
    pub fn insert(&mut self, template: Template) -> Result<Option<Template>> {
        template.validate()?;
        Ok(self.templates.insert(template.id.clone(), template))
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// On-disk shape of a [`PageFormat`]: a format name such as `"A4"`, or an
/// explicit `{ "width_mm", "height_mm" }` pair
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
enum PageFormatRepr {
    Named(String),
    Custom { width_mm: f32, height_mm: f32 },
}

#[cfg(feature = "serde")]
impl TryFrom<PageFormatRepr> for PageFormat {
    type Error = MenuError;

    fn try_from(repr: PageFormatRepr) -> Result<Self> {
        match repr {
            PageFormatRepr::Named(name) => PageFormat::from_name(&name)
                .ok_or_else(|| MenuError::Config(format!("Unknown page format '{name}'"))),
            PageFormatRepr::Custom {
                width_mm,
                height_mm,
            } => {
                if !(width_mm > 0.0 && height_mm > 0.0) {
                    return Err(MenuError::Config(format!(
                        "Custom page size must be positive, got {width_mm}x{height_mm}mm"
                    )));
                }
                Ok(PageFormat::Custom {
                    width_mm,
                    height_mm,
                })
            }
        }
    }
}

#[cfg(feature = "serde")]
impl From<PageFormat> for PageFormatRepr {
    fn from(format: PageFormat) -> Self {
        match format {
            PageFormat::Custom {
                width_mm,
                height_mm,
            } => PageFormatRepr::Custom {
                width_mm,
                height_mm,
            },
            named => PageFormatRepr::Named(named.name().to_string()),
        }
    }
}
