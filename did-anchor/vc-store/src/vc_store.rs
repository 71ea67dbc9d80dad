use crate::{error_record_corruption, Result, VCRecord, VCStorage};
use did_anchor_core::AnchorCredential;
use std::sync::Arc;

#[derive(Clone)]
pub struct VCStore {
    vc_storage_a: Arc<dyn VCStorage>,
}

impl VCStore {
    /// Create a new VCStore using the given VCStorage implementation.
    pub fn new(vc_storage_a: Arc<dyn VCStorage>) -> Self {
        Self { vc_storage_a }
    }
    /// Persist the canonical serialization of the credential under its id.
    pub async fn put_anchor_credential(&self, anchor_credential: &AnchorCredential) -> Result<()> {
        let vc_record = VCRecord {
            id: anchor_credential.id.clone(),
            added_at: time::OffsetDateTime::now_utc(),
            credential_jcs: anchor_credential.serialize_canonically()?,
        };
        tracing::trace!("VCStore::put_anchor_credential; id: {}", vc_record.id);
        self.vc_storage_a.put_vc_record(vc_record).await
    }
    pub async fn get_anchor_credential(&self, id: &str) -> Result<AnchorCredential> {
        let vc_record = self.vc_storage_a.get_vc_record(id).await?;
        let anchor_credential =
            AnchorCredential::parse_canonical_bytes(vc_record.credential_jcs.as_bytes())
                .map_err(error_record_corruption)?;
        if anchor_credential.id != vc_record.id {
            return Err(error_record_corruption(format!(
                "record id {} doesn't match credential id {}",
                vc_record.id, anchor_credential.id
            )));
        }
        Ok(anchor_credential)
    }
}
