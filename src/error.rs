use thiserror::Error;

/// Errors from user-initiated workspace operations.
///
/// Every variant is shown to the user as a notice; none of them change state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkspaceError {
    #[error("Please enter a valid width and height (positive whole numbers)")]
    InvalidDimensions,

    #[error("Canvas sides are limited to {max} cells, got {width}x{height}")]
    DimensionsTooLarge {
        width: usize,
        height: usize,
        max: usize,
    },

    #[error("The gallery is empty, draw and save an image first")]
    EmptyGallery,

    #[error("The gallery is already empty")]
    GalleryAlreadyEmpty,

    #[error("Drawing is {found:?} but the gallery holds {expected:?} images")]
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
}

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
