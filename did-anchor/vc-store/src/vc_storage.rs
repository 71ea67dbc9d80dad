use crate::{Result, VCRecord};

/// Durable storage for finalized anchor credentials, keyed by credential id.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait VCStorage: Send + Sync {
    /// Store the record, replacing any existing record with the same id.
    async fn put_vc_record(&self, vc_record: VCRecord) -> Result<()>;
    /// Must return Error::NotFound if there is no record with the given id.
    async fn get_vc_record(&self, id: &str) -> Result<VCRecord>;
}
