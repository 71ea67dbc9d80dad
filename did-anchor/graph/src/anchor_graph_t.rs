use crate::{Error, Result};
use did_anchor_core::{AnchorCredential, GraphAddress};
use std::collections::HashSet;

/// Object-safe access to the transaction graph, so that the anchor writer can be handed
/// alternate implementations.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait AnchorGraphT: Send + Sync {
    /// Append the credential to the graph, returning its address.  Appending a credential whose
    /// canonical form is already present returns the existing address.
    async fn add(&self, anchor_credential: &AnchorCredential) -> Result<GraphAddress>;
    /// Resolve a previously appended credential.
    async fn get(&self, address: &str) -> Result<AnchorCredential>;
    /// Walk the anchors of the given DID backwards from `address` by following each credential's
    /// `previousTransactions` entry for that DID.  The result is ordered newest first and ends
    /// with the first anchor that has no previous entry for the DID (normally its creation).
    async fn get_did_anchors(
        &self,
        address: &str,
        did: &str,
    ) -> Result<Vec<(GraphAddress, AnchorCredential)>> {
        let mut anchor_v = Vec::new();
        let mut visited_s = HashSet::new();
        let mut address = GraphAddress::from(address);
        loop {
            if !visited_s.insert(address.clone()) {
                return Err(Error::Malformed(
                    format!("cycle in transaction graph at {} for DID {}", address, did).into(),
                ));
            }
            let anchor_credential = self.get(address.as_str()).await?;
            let previous_address_o = anchor_credential
                .credential_subject
                .previous_address_o(did)
                .cloned();
            anchor_v.push((address, anchor_credential));
            match previous_address_o {
                Some(previous_address) => address = previous_address,
                None => break,
            }
        }
        tracing::trace!(
            "AnchorGraphT::get_did_anchors; DID {} has {} anchor(s)",
            did,
            anchor_v.len()
        );
        Ok(anchor_v)
    }
}
