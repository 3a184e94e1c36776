//! Overflow detection
//!
//! Compares each page's rendered content height with the template's
//! physical page height. Every pass rebuilds the whole map; nothing is
//! patched incrementally, so repeated or overlapping passes cannot drift.

use crate::measure::{Measure, RenderContext};
use crate::types::*;
use std::collections::BTreeMap;

/// Overflow below this is treated as rounding noise and not reported
pub const DISPLAY_THRESHOLD_PX: f64 = 4.0;

/// Overflow above this makes the editor ask the user how to resolve it
pub const ACTION_THRESHOLD_PX: f64 = 10.0;

/// Rendering units per inch
pub const PX_PER_INCH: f64 = 96.0;

/// Page index → overflow in rendering units, only for overflowing pages
pub type OverflowMap = BTreeMap<usize, f64>;

/// Convert millimeters to whole rendering units (96 per inch)
pub fn mm_to_px(mm: f32) -> f64 {
    (f64::from(mm) / 25.4 * PX_PER_INCH).round()
}

/// Noise and action thresholds for overflow
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverflowThresholds {
    display: f64,
    action: f64,
}

impl Default for OverflowThresholds {
    fn default() -> Self {
        Self {
            display: DISPLAY_THRESHOLD_PX,
            action: ACTION_THRESHOLD_PX,
        }
    }
}

impl OverflowThresholds {
    /// The display threshold must be below the action threshold, so that any
    /// overflow worth a prompt is also visible in the overflow map.
    pub fn new(display: f64, action: f64) -> Result<Self> {
        if !(display >= 0.0 && display < action) {
            return Err(MenuError::Config(format!(
                "Display threshold ({display}) must be non-negative and below the action threshold ({action})"
            )));
        }
        Ok(Self { display, action })
    }

    pub fn display(&self) -> f64 {
        self.display
    }

    pub fn action(&self) -> f64 {
        self.action
    }
}

/// Raw overflow of one page: `max(0, content - page height)`.
///
/// `None` when the measurer cannot see the page yet.
pub fn measure_overflow<M: Measure + ?Sized>(
    ctx: &RenderContext<'_>,
    measurer: &M,
    page_index: usize,
) -> Option<f64> {
    let content = measurer.content_height(ctx, page_index)?;
    let page_height = ctx.template.page_height_px();
    Some((content - page_height).max(0.0))
}

/// Holds the latest overflow map
#[derive(Debug, Clone, Default)]
pub struct OverflowDetector {
    thresholds: OverflowThresholds,
    map: OverflowMap,
    passes: u64,
}

impl OverflowDetector {
    pub fn new(thresholds: OverflowThresholds) -> Self {
        Self {
            thresholds,
            map: OverflowMap::new(),
            passes: 0,
        }
    }

    pub fn thresholds(&self) -> OverflowThresholds {
        self.thresholds
    }

    /// Measure every page and replace the map
    pub fn recompute<M: Measure + ?Sized>(
        &mut self,
        ctx: &RenderContext<'_>,
        measurer: &M,
    ) -> &OverflowMap {
        let mut map = OverflowMap::new();
        for page_index in 0..ctx.document.pages().len() {
            match measure_overflow(ctx, measurer, page_index) {
                Some(overflow) if overflow > self.thresholds.display => {
                    map.insert(page_index, overflow);
                }
                Some(_) => {}
                None => {
                    log::debug!("Page {page_index} not measurable yet, counting as no overflow");
                }
            }
        }

        self.map = map;
        self.passes += 1;
        &self.map
    }

    pub fn map(&self) -> &OverflowMap {
        &self.map
    }

    pub fn overflow(&self, page_index: usize) -> Option<f64> {
        self.map.get(&page_index).copied()
    }

    pub fn is_overflowing(&self, page_index: usize) -> bool {
        self.map.contains_key(&page_index)
    }

    /// Number of completed full passes
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Forget the map, e.g. when a different document is loaded
    pub fn clear(&mut self) {
        self.map.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mm_to_px() {
        assert_eq!(mm_to_px(25.4), 96.0);
        assert_eq!(mm_to_px(297.0), 1123.0);
        assert_eq!(mm_to_px(210.0), 794.0);
        assert_eq!(mm_to_px(0.0), 0.0);
    }

    #[test]
    fn test_thresholds_must_be_ordered() {
        assert!(OverflowThresholds::new(10.0, 4.0).is_err());
        assert!(OverflowThresholds::new(4.0, 4.0).is_err());
        assert!(OverflowThresholds::new(-1.0, 4.0).is_err());
        let thresholds = OverflowThresholds::default();
        assert!(thresholds.display() < thresholds.action());
    }
}
