use crate::{error_storage_error, AnchorGraphT, CASClient, Error, Result};
use did_anchor_core::{AnchorCredential, GraphAddress};
use std::sync::Arc;

/// The transaction graph.  Each anchor credential is stored once, in canonical form, in
/// content-addressable storage.  There is no separate adjacency structure; the DAG's edges are
/// the `previousTransactions` entries inside each credential.
#[derive(Clone)]
pub struct AnchorGraph {
    cas_client_a: Arc<dyn CASClient>,
}

impl AnchorGraph {
    pub fn new(cas_client_a: Arc<dyn CASClient>) -> Self {
        Self { cas_client_a }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl AnchorGraphT for AnchorGraph {
    async fn add(&self, anchor_credential: &AnchorCredential) -> Result<GraphAddress> {
        let anchor_credential_jcs = anchor_credential
            .serialize_canonically()
            .map_err(error_storage_error)?;
        let address = self
            .cas_client_a
            .put(anchor_credential_jcs.as_bytes())
            .await
            .map_err(|e| match e {
                Error::StorageError(_) => e,
                other => Error::StorageError(other.to_string().into()),
            })?;
        tracing::debug!(
            "AnchorGraph::add; anchor credential {} stored at {}",
            anchor_credential.id,
            address
        );
        Ok(address)
    }
    async fn get(&self, address: &str) -> Result<AnchorCredential> {
        let anchor_credential_jcs = self.cas_client_a.get(address).await?;
        if !GraphAddress::from(address).addresses(anchor_credential_jcs.as_slice()) {
            return Err(Error::Malformed(
                format!("content stored at {} doesn't hash to that address", address).into(),
            ));
        }
        let anchor_credential =
            AnchorCredential::parse_canonical_bytes(anchor_credential_jcs.as_slice())?;
        tracing::trace!(
            "AnchorGraph::get({}); anchor credential {}",
            address,
            anchor_credential.id
        );
        Ok(anchor_credential)
    }
}
