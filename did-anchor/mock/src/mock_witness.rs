use did_anchor_core::{AnchorCredential, Proof};
use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, RwLock,
    },
    time::Duration,
};
use tokio::sync::mpsc;

/// How MockWitness treats a request for proofs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WitnessMode {
    /// Attach one proof per witness and deliver the credential on the completion channel.
    Deliver,
    /// Attach proofs but hold the credential until `release` is called.
    Hold,
    /// Refuse the request.
    Reject,
}

/// In-memory stand-in for the witness hand-off.  Every witness "signs" instantly with a proof
/// whose jws is "mock-jws:{witness}".
#[derive(Clone)]
pub struct MockWitness {
    completion_tx: mpsc::Sender<AnchorCredential>,
    latency_o: Option<Duration>,
    mode_ml: Arc<RwLock<WitnessMode>>,
    held_ml: Arc<RwLock<BTreeMap<String, AnchorCredential>>>,
    request_count_a: Arc<AtomicUsize>,
}

impl MockWitness {
    pub fn new(completion_tx: mpsc::Sender<AnchorCredential>) -> Self {
        Self {
            completion_tx,
            latency_o: None,
            mode_ml: Arc::new(RwLock::new(WitnessMode::Deliver)),
            held_ml: Arc::new(RwLock::new(BTreeMap::new())),
            request_count_a: Arc::new(AtomicUsize::new(0)),
        }
    }
    /// Delay each delivery by the given duration.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency_o = Some(latency);
        self
    }
    pub fn set_mode(&self, mode: WitnessMode) {
        *self.mode_ml.write().unwrap() = mode;
    }
    /// Number of accepted requests.
    pub fn request_count(&self) -> usize {
        self.request_count_a.load(Ordering::SeqCst)
    }
    /// Ids of the witnessed credentials being held, in id order.
    pub fn held_ids(&self) -> Vec<String> {
        self.held_ml.read().unwrap().keys().cloned().collect()
    }
    /// Deliver a held credential.  Returns false if no credential with that id is held.
    pub async fn release(&self, id: &str) -> bool {
        let anchor_credential_o = self.held_ml.write().unwrap().remove(id);
        match anchor_credential_o {
            Some(anchor_credential) => {
                deliver(self.completion_tx.clone(), anchor_credential).await;
                true
            }
            None => false,
        }
    }
    /// Drop a held credential without delivering it, as if its witnesses never answered.
    pub fn forget(&self, id: &str) -> bool {
        self.held_ml.write().unwrap().remove(id).is_some()
    }
}

fn witness_proof(witness: &str) -> Proof {
    Proof {
        proof_type: "Ed25519Signature2018".to_string(),
        created: did_anchor_core::now_utc_milliseconds(),
        verification_method: format!("{}#key-1", witness),
        proof_purpose: "assertionMethod".to_string(),
        domain_o: Some(witness.to_string()),
        jws: format!("mock-jws:{}", witness),
    }
}

async fn deliver(
    completion_tx: mpsc::Sender<AnchorCredential>,
    anchor_credential: AnchorCredential,
) {
    let id = anchor_credential.id.clone();
    if completion_tx.send(anchor_credential).await.is_err() {
        tracing::warn!(
            "MockWitness; completion channel closed, witnessed anchor credential {} dropped",
            id
        );
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl did_anchor_writer::ProofHandler for MockWitness {
    async fn request_proofs(
        &self,
        anchor_credential: AnchorCredential,
        witness_v: &[String],
    ) -> anyhow::Result<()> {
        let mode = *self.mode_ml.read().unwrap();
        if mode == WitnessMode::Reject {
            anyhow::bail!("witnesses rejected anchor credential {}", anchor_credential.id);
        }
        self.request_count_a.fetch_add(1, Ordering::SeqCst);

        let witnessed = witness_v
            .iter()
            .fold(anchor_credential, |anchor_credential, witness| {
                anchor_credential.with_proof(witness_proof(witness))
            });
        tracing::debug!(
            "MockWitness::request_proofs; {} witnessed by {:?} ({:?})",
            witnessed.id,
            witness_v,
            mode
        );
        if mode == WitnessMode::Hold {
            self.held_ml
                .write()
                .unwrap()
                .insert(witnessed.id.clone(), witnessed);
            return Ok(());
        }

        let completion_tx = self.completion_tx.clone();
        let latency_o = self.latency_o;
        tokio::task::spawn(async move {
            if let Some(latency) = latency_o {
                tokio::time::sleep(latency).await;
            }
            deliver(completion_tx, witnessed).await;
        });
        Ok(())
    }
}
