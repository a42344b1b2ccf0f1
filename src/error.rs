use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::path::PathBuf;
use thiserror::Error;

/// Failure to build the roster at startup.
///
/// Every variant is fatal: the server refuses to start without a dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read workbook {}: {source}", path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("unsupported file extension: {0}")]
    UnsupportedFormat(String),

    #[error("{} contains no rows", .0.display())]
    Empty(PathBuf),

    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),

    #[error("duplicate roll number `{0}`")]
    DuplicateIdentifier(String),

    #[error("row {row}: mark `{value}` in column `{column}` is not a number")]
    InvalidMark {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}: {message}")]
    Malformed { row: usize, message: String },
}

/// Failure to list a directory under the browse root.
#[derive(Debug, Error)]
pub enum BrowseError {
    #[error("path not found: {0}")]
    NotFound(String),

    #[error("path escapes the browse root: {0}")]
    OutsideRoot(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("failed to list {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl IntoResponse for BrowseError {
    fn into_response(self) -> Response {
        log::warn!("browse rejected: {}", self);
        match self {
            // Escapes look exactly like misses so the root's surroundings stay opaque.
            BrowseError::NotFound(_) | BrowseError::OutsideRoot(_) => {
                (StatusCode::NOT_FOUND, "Path not found").into_response()
            }
            BrowseError::NotADirectory(_) => {
                (StatusCode::NOT_FOUND, "Not a directory").into_response()
            }
            BrowseError::Io { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to list directory").into_response()
            }
        }
    }
}

/// Errors surfaced while serving a request.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Browse(#[from] BrowseError),

    #[error("template rendering failed: {0}")]
    Render(#[from] handlebars::RenderError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Browse(e) => e.into_response(),
            AppError::Render(e) => {
                log::error!("template rendering failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Rendering error").into_response()
            }
        }
    }
}
