//! Error type for invoice export.

use std::path::PathBuf;

use thiserror::Error;

use crate::form::FormError;
use crate::profile::ProfileError;
use crate::richtext::ParseError;

/// Result alias for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Errors that can occur while producing an invoice PDF.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Another export on the same exporter has not finished yet.
    #[error("an export is already in progress")]
    Busy,

    #[error("invalid form")]
    Form(#[from] FormError),

    #[error("invalid hotel profile")]
    Profile(#[from] ProfileError),

    #[error("invalid markup in profile text `{text}`")]
    Markup {
        text: String,
        #[source]
        source: ParseError,
    },

    #[error("failed to render invoice")]
    Render(#[from] genpdf::error::Error),

    #[error("failed to decode raster image {path}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("raster image has no pixels")]
    EmptyImage,

    #[error("failed to assemble raster PDF: {0}")]
    RasterPdf(String),

    #[error("failed to write {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
