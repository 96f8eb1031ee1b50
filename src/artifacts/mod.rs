//! Artifact naming, location and presence scanning
//!
//! Every file the ingestion pipeline produces is described by an
//! [`ArtifactKind`]: a symbolic location, a filename template with one date
//! placeholder, and whether it is a monthly full snapshot or a daily update.
//! The [`ArtifactLocator`] turns kinds into paths and lists which datestamps
//! are present on disk.

pub mod catalog;
pub mod kind;
pub mod locator;
pub mod template;

pub use kind::{Artifact, ArtifactKind, Fullness, Location};
pub use locator::ArtifactLocator;
pub use template::{FilenameTemplate, Placeholder};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("no directory configured for location {0}")]
    UnknownLocation(Location),

    #[error("invalid filename template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("failed to list {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
