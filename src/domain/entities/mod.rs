//! Domain entity definitions.

mod image;
mod photo;
mod session;

pub use image::{ImageSource, ImageState, LoadedImage};
pub use photo::{PhotoKey, PhotoKind, PhotoRef, PropertyManifest};
pub use session::{DownloadReport, DownloadSession};
