use crate::Result;
use did_anchor_core::GraphAddress;

/// Content-addressable storage.  Implementations must derive the address deterministically from
/// the bytes, so that putting the same bytes twice yields the same address.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait CASClient: Send + Sync {
    /// Store the given bytes, returning their content address.  Storing bytes that are already
    /// present is not an error.
    async fn put(&self, content: &[u8]) -> Result<GraphAddress>;
    /// Retrieve the bytes stored at the given address.  Must return Error::NotFound if the
    /// address is unknown.
    async fn get(&self, address: &str) -> Result<Vec<u8>>;
}
