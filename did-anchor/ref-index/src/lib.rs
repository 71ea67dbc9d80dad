mod did_anchor_ref_index;
mod did_anchor_ref_index_mem;
mod error;

pub use crate::{
    did_anchor_ref_index::DIDAnchorRefIndex,
    did_anchor_ref_index_mem::DIDAnchorRefIndexMem,
    error::{error_internal_error, error_not_found, Error},
};
pub type Result<T> = std::result::Result<T, Error>;
