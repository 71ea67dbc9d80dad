use crate::{DIDAnchorRefIndex, Error, Result};
use did_anchor_core::GraphAddress;
use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, PoisonError, RwLock},
};

/// In-memory anchor reference index.  A single lock guards the whole map, which linearizes
/// all updates, including those touching overlapping DID sets.
#[derive(Clone, Default)]
pub struct DIDAnchorRefIndexMem {
    latest_address_ml: Arc<RwLock<HashMap<String, GraphAddress>>>,
}

impl DIDAnchorRefIndexMem {
    pub fn new() -> Self {
        Self::default()
    }
    /// Number of DIDs that have been anchored at least once.
    pub fn len(&self) -> usize {
        self.latest_address_ml
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl DIDAnchorRefIndex for DIDAnchorRefIndexMem {
    async fn add(&self, did_v: &[String], address: &GraphAddress) -> Result<()> {
        tracing::debug!(
            "DIDAnchorRefIndexMem::add; {} DID(s) -> {}",
            did_v.len(),
            address
        );
        let mut latest_address_mg = self
            .latest_address_ml
            .write()
            .map_err(|_| Error::InternalError("anchor reference index lock poisoned".into()))?;
        for did in did_v {
            latest_address_mg.insert(did.clone(), address.clone());
        }
        Ok(())
    }
    async fn last(&self, did: &str) -> Result<GraphAddress> {
        let latest_address_mg = self
            .latest_address_ml
            .read()
            .map_err(|_| Error::InternalError("anchor reference index lock poisoned".into()))?;
        latest_address_mg
            .get(did)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("anchor reference for DID {}", did).into()))
    }
    async fn compare_and_add(
        &self,
        expected_m: &BTreeMap<String, Option<GraphAddress>>,
        address: &GraphAddress,
    ) -> Result<()> {
        let mut latest_address_mg = self
            .latest_address_ml
            .write()
            .map_err(|_| Error::InternalError("anchor reference index lock poisoned".into()))?;
        for (did, expected_o) in expected_m {
            let found_o = latest_address_mg.get(did);
            if found_o != expected_o.as_ref() {
                return Err(Error::Conflict {
                    did: did.clone(),
                    expected_o: expected_o.clone(),
                    found_o: found_o.cloned(),
                });
            }
        }
        for did in expected_m.keys() {
            latest_address_mg.insert(did.clone(), address.clone());
        }
        tracing::debug!(
            "DIDAnchorRefIndexMem::compare_and_add; {} DID(s) -> {}",
            expected_m.len(),
            address
        );
        Ok(())
    }
}
