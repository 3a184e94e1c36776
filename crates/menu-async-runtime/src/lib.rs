use thiserror::Error;

mod logger;
mod store;
mod worker;

pub use logger::{AppLogger, LogEntry};
pub use store::{DocumentStore, JsonDirStore, MemoryStore};
pub use worker::{open_session, spawn_editor, worker_task};

// Re-export types from the pagination library
pub use menu_pagination::drag::{Candidate, DragEntity, DropTarget, Rect};
pub use menu_pagination::{
    BreakMode, CategoryId, Document, DocumentStatistics, EditingSession, ItemId, ItemUpdate,
    MenuError, NewItem, OverflowMap, PageId, ResolutionChoice, ResolutionOutcome,
    ResolutionPrompt, SessionOptions, Template, VariantId,
};

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Menu(#[from] MenuError),
    #[error("Store error: {0}")]
    Store(String),
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Invalid document id: {0:?}")]
    InvalidId(String),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Commands sent from UI to worker
#[derive(Debug)]
pub enum EditorCommand {
    CreateCategory {
        name: String,
        /// Append to the active page instead of the unassigned pool
        on_active_page: bool,
    },
    RenameCategory {
        id: CategoryId,
        name: String,
    },
    DeleteCategory {
        id: CategoryId,
    },
    SetCategoryBreaks {
        id: CategoryId,
        break_before: bool,
        break_mode: Option<BreakMode>,
    },
    AddItem {
        category: CategoryId,
        item: NewItem,
    },
    UpdateItem {
        id: ItemId,
        update: ItemUpdate,
    },
    RemoveItem {
        id: ItemId,
    },
    MoveItem {
        item: ItemId,
        category: CategoryId,
        index: usize,
    },
    /// `None` uses the template's default variant
    CreatePage {
        variant: Option<VariantId>,
    },
    DeletePage {
        id: PageId,
    },
    SetPageVariant {
        page: PageId,
        variant: VariantId,
    },
    SetActivePage {
        index: usize,
    },
    AssignCategory {
        category: CategoryId,
        page: Option<PageId>,
    },
    StartDrag {
        entity: DragEntity,
    },
    DragOver {
        target: Option<DropTarget>,
    },
    /// Pointer moved; hit-test against the current drop zones
    DragMove {
        dragged: Rect,
        candidates: Vec<Candidate>,
    },
    Drop,
    CancelDrag,
    Resolve {
        choice: ResolutionChoice,
    },
    DismissResolution,
    ReplaceTemplate {
        template: Template,
    },
    AutoPaginate,
    CalculateStats,
    /// Persist now, even if no pass is due
    Save,
    Shutdown,
}

/// Updates sent from worker to UI
#[derive(Debug, Clone)]
pub enum EditorUpdate {
    DocumentChanged {
        revision: u64,
        document: Document,
        active_page: usize,
    },
    OverflowChanged {
        overflow: OverflowMap,
    },
    ResolutionRequired {
        prompt: ResolutionPrompt,
    },
    ResolutionApplied {
        outcome: ResolutionOutcome,
    },
    StatsCalculated {
        stats: DocumentStatistics,
    },
    Saved {
        revision: u64,
    },
    Error {
        message: String,
    },
    Closed,
}
