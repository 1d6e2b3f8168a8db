pub mod derivative;
pub mod file;

pub use derivative::{thumbnail_key, DerivativeRecord, DerivativeStatus, ThumbnailResponse};
pub use file::{
    ConfirmUploadResponse, FileRecord, FileResponse, FileStatus, PresignUploadRequest,
    PresignUploadResponse,
};
