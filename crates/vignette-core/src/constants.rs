//! Shared constants.

/// Key prefix under which every thumbnail is written. The derivative key for
/// an original is always `THUMBNAIL_KEY_PREFIX + original_storage_key`, so a
/// re-run of the same job overwrites the same object.
pub const THUMBNAIL_KEY_PREFIX: &str = "thumbnails/";

/// Content type of every generated thumbnail (thumbnails are re-encoded as JPEG).
pub const THUMBNAIL_CONTENT_TYPE: &str = "image/jpeg";
