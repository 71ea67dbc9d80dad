use did_anchor_core::OperationType;
use std::borrow::Cow;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("previous did transaction reference not found for {operation_type} operation for did[{did}]")]
    ReferenceNotFound {
        did: String,
        operation_type: OperationType,
    },
    #[error("failed to build anchor credential: {0}")]
    Build(Cow<'static, str>),
    #[error("failed to submit anchor credential for witnessing: {0}")]
    Submission(Cow<'static, str>),
    #[error("Storage error: {0}")]
    Storage(Cow<'static, str>),
    #[error("Persistence error: {0}")]
    Persistence(Cow<'static, str>),
    #[error("Index error: {0}")]
    Index(Cow<'static, str>),
    #[error("Anchor reference conflict: {0}")]
    ReferenceConflict(Cow<'static, str>),
    #[error("Anchor abandoned: {0}")]
    Abandoned(Cow<'static, str>),
    #[error("Notification queue closed")]
    QueueClosed,
    #[error("Notification cursor {cursor} precedes the oldest retained notification (cursor {oldest_cursor}); the entries in between were already acknowledged")]
    CursorExpired { cursor: i64, oldest_cursor: u64 },
    #[error("Notification cursor {cursor} is past the newest notification (next cursor is {next_cursor})")]
    CursorAhead { cursor: i64, next_cursor: u64 },
}

impl From<did_anchor_graph::Error> for Error {
    fn from(err: did_anchor_graph::Error) -> Self {
        Self::Storage(err.to_string().into())
    }
}

impl From<did_anchor_vc_store::Error> for Error {
    fn from(err: did_anchor_vc_store::Error) -> Self {
        Self::Persistence(err.to_string().into())
    }
}

impl From<did_anchor_ref_index::Error> for Error {
    fn from(err: did_anchor_ref_index::Error) -> Self {
        match err {
            did_anchor_ref_index::Error::Conflict { .. } => {
                Self::ReferenceConflict(err.to_string().into())
            }
            _ => Self::Index(err.to_string().into()),
        }
    }
}

pub fn error_build<E: std::fmt::Display>(e: E) -> Error {
    Error::Build(e.to_string().into())
}

pub fn error_submission<E: std::fmt::Display>(e: E) -> Error {
    Error::Submission(e.to_string().into())
}
