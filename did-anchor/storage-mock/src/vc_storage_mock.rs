use did_anchor_vc_store::{Error, Result, VCRecord};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, RwLock,
    },
};

#[derive(Clone, Default)]
pub struct VCStorageMock {
    vc_record_ml: Arc<RwLock<HashMap<String, VCRecord>>>,
    /// Number of upcoming put_vc_record calls that will fail.
    failing_put_count_a: Arc<AtomicUsize>,
}

impl VCStorageMock {
    pub fn new() -> Self {
        Self::default()
    }
    /// Make the next `count` calls to put_vc_record fail with Error::StorageError.
    pub fn fail_next_puts(&self, count: usize) {
        self.failing_put_count_a.store(count, Ordering::SeqCst);
    }
    pub fn contains(&self, id: &str) -> bool {
        self.vc_record_ml.read().unwrap().contains_key(id)
    }
    pub fn len(&self) -> usize {
        self.vc_record_ml.read().unwrap().len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl did_anchor_vc_store::VCStorage for VCStorageMock {
    async fn put_vc_record(&self, vc_record: VCRecord) -> Result<()> {
        tracing::debug!("VCStorageMock::put_vc_record(id: {})", vc_record.id);
        let should_fail = self
            .failing_put_count_a
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
                count.checked_sub(1)
            })
            .is_ok();
        if should_fail {
            return Err(Error::StorageError("error put".into()));
        }
        let mut vc_record_mg = self.vc_record_ml.write().unwrap();
        vc_record_mg.insert(vc_record.id.clone(), vc_record);
        Ok(())
    }
    async fn get_vc_record(&self, id: &str) -> Result<VCRecord> {
        tracing::debug!("VCStorageMock::get_vc_record({})", id);
        let vc_record_mg = self.vc_record_ml.read().unwrap();
        vc_record_mg
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string().into()))
    }
}
