use std::borrow::Cow;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed: {0}")]
    Malformed(Cow<'static, str>),
    #[error("Not found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("Storage error: {0}")]
    StorageError(Cow<'static, str>),
    #[error(transparent)]
    AnchorCoreError(#[from] did_anchor_core::Error),
}

pub fn error_malformed<E: std::fmt::Display>(e: E) -> Error {
    Error::Malformed(e.to_string().into())
}

pub fn error_not_found<E: std::fmt::Display>(e: E) -> Error {
    Error::NotFound(e.to_string().into())
}

pub fn error_storage_error<E: std::fmt::Display>(e: E) -> Error {
    Error::StorageError(e.to_string().into())
}
