pub mod breaks;
mod document;
pub mod drag;
mod estimate;
mod import;
#[cfg(feature = "serde")]
pub mod io;
mod measure;
mod overflow;
mod resolution;
mod scheduler;
mod session;
mod stats;
mod template;
mod types;
mod views;

pub use document::{Document, NormalizeReport};
pub use estimate::{BodyFrame, EstimatingMeasurer};
pub use import::{ImportSummary, ImportedCategory, import_into, load_from_csv, parse_csv};
pub use measure::*;
pub use overflow::*;
pub use resolution::*;
pub use scheduler::*;
pub use session::{EditingSession, SessionEvents, SessionOptions};
pub use stats::calculate_statistics;
pub use template::*;
pub use types::*;
pub use views::{CategoryView, CategoryViews};
