mod error;
mod vc_record;
mod vc_storage;
mod vc_store;

pub use crate::{
    error::{error_not_found, error_record_corruption, error_storage_error, Error},
    vc_record::VCRecord,
    vc_storage::VCStorage,
    vc_store::VCStore,
};
pub type Result<T> = std::result::Result<T, Error>;
