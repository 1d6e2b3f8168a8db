//! Vignette Processing Library
//!
//! The thumbnail transform: decode an uploaded image, resize it to the
//! configured bounding box preserving aspect ratio, and re-encode as JPEG.

pub mod thumbnail;

pub use thumbnail::{ThumbnailError, ThumbnailSpec, Thumbnailer};
