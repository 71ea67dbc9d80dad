use did_anchor_core::GraphAddress;
use did_anchor_graph::{Error, Result};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, RwLock,
    },
};

/// Purely in-memory content-addressable storage.  Addresses are computed with
/// GraphAddress::of_canonical_bytes.  Can be switched into a failing mode to simulate an
/// unreachable backend.
#[derive(Clone, Default)]
pub struct CASClientMock {
    content_ml: Arc<RwLock<HashMap<GraphAddress, Vec<u8>>>>,
    unavailable_a: Arc<AtomicBool>,
}

impl CASClientMock {
    pub fn new() -> Self {
        Self::default()
    }
    /// While unavailable, every put and get fails with Error::StorageError.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable_a.store(unavailable, Ordering::SeqCst);
    }
    /// Replace the bytes stored at an address without recomputing it, as a corrupted backend would.
    pub fn overwrite(&self, address: &GraphAddress, content: &[u8]) {
        self.content_ml
            .write()
            .unwrap()
            .insert(address.clone(), content.to_vec());
    }
    pub fn len(&self) -> usize {
        self.content_ml.read().unwrap().len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn check_available(&self) -> Result<()> {
        if self.unavailable_a.load(Ordering::SeqCst) {
            Err(Error::StorageError("CAS backend unreachable".into()))
        } else {
            Ok(())
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl did_anchor_graph::CASClient for CASClientMock {
    async fn put(&self, content: &[u8]) -> Result<GraphAddress> {
        self.check_available()?;
        let address = GraphAddress::of_canonical_bytes(content);
        tracing::debug!("CASClientMock::put; {} bytes at {}", content.len(), address);
        let mut content_mg = self.content_ml.write().unwrap();
        content_mg
            .entry(address.clone())
            .or_insert_with(|| content.to_vec());
        Ok(address)
    }
    async fn get(&self, address: &str) -> Result<Vec<u8>> {
        self.check_available()?;
        tracing::debug!("CASClientMock::get({})", address);
        let content_mg = self.content_ml.read().unwrap();
        content_mg
            .get(address)
            .cloned()
            .ok_or_else(|| Error::NotFound(address.to_string().into()))
    }
}
