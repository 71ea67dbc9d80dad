use did_anchor_core::GraphAddress;
use std::borrow::Cow;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "Anchor reference conflict for DID {did}: expected {expected_o:?}, found {found_o:?}"
    )]
    Conflict {
        did: String,
        expected_o: Option<GraphAddress>,
        found_o: Option<GraphAddress>,
    },
    #[error("Internal error: {0}")]
    InternalError(Cow<'static, str>),
    #[error("Not found: {0}")]
    NotFound(Cow<'static, str>),
}

pub fn error_internal_error<E: std::fmt::Display>(e: E) -> Error {
    Error::InternalError(e.to_string().into())
}

pub fn error_not_found<E: std::fmt::Display>(e: E) -> Error {
    Error::NotFound(e.to_string().into())
}
