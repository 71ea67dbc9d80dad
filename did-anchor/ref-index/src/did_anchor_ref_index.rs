use crate::Result;
use did_anchor_core::GraphAddress;
use std::collections::BTreeMap;

/// Maps each DID to the address of its most recently committed anchor.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait DIDAnchorRefIndex: Send + Sync {
    /// Set the latest anchor address of each of the given DIDs, overwriting any prior value.
    /// Calls whose DID sets overlap must take effect one at a time.
    async fn add(&self, did_v: &[String], address: &GraphAddress) -> Result<()>;
    /// Return the latest anchor address of the DID, or Error::NotFound if it was never anchored.
    async fn last(&self, did: &str) -> Result<GraphAddress>;
    /// Atomically check that every DID in `expected_m` currently maps to the given value
    /// (None meaning "never anchored"), and if so set all of them to `address`.  If any DID
    /// doesn't match, nothing is changed and Error::Conflict is returned.
    async fn compare_and_add(
        &self,
        expected_m: &BTreeMap<String, Option<GraphAddress>>,
        address: &GraphAddress,
    ) -> Result<()>;
}
