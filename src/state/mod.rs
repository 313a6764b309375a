mod editor_state;
pub mod persistence;
mod workspace;

pub use editor_state::EditorState;
pub use persistence::{
    MemoryStore,
    PersistenceError,
    PersistenceResult,
    StoredWorkspace,
};
pub use workspace::{parse_dimensions, validate_dimensions, PendingResize, SizeChange, Workspace};
