use std::borrow::Cow;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("Record corruption detected: {0}")]
    RecordCorruption(Cow<'static, str>),
    #[error("Storage error: {0}")]
    StorageError(Cow<'static, str>),
    #[error(transparent)]
    AnchorCoreError(#[from] did_anchor_core::Error),
}

pub fn error_not_found<E: std::fmt::Display>(e: E) -> Error {
    Error::NotFound(e.to_string().into())
}

pub fn error_record_corruption<E: std::fmt::Display>(e: E) -> Error {
    Error::RecordCorruption(e.to_string().into())
}

pub fn error_storage_error<E: std::fmt::Display>(e: E) -> Error {
    Error::StorageError(e.to_string().into())
}
