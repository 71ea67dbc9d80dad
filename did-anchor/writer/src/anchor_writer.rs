use crate::{
    anchor_tracker::PendingAnchor, error_build, error_submission, AnchorStatus, AnchorTracker,
    AnchorWriterConfig, Error, NotificationQueue, Providers, Result,
};
use did_anchor_core::{AnchorCredential, AnchorPayload, GraphAddress, NotificationEntry, OperationRef};
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

/// Builds anchor credentials for batches of DID operations, hands them to the witnesses, and
/// commits them once witnessed.
///
/// Committing happens on a task that consumes the completion channel given to AnchorWriter::new;
/// the proof handler sends every fully-witnessed credential on the other end of that channel.
/// Committed anchors are published to a bounded notification queue, paged through with
/// AnchorWriter::read and released with AnchorWriter::acknowledge.
pub struct AnchorWriter {
    inner_a: Arc<AnchorWriterInner>,
    shutdown_tx_o: Option<oneshot::Sender<()>>,
    commit_loop_jh_o: Option<JoinHandle<()>>,
    sweeper_jh_o: Option<JoinHandle<()>>,
}

struct AnchorWriterInner {
    config: AnchorWriterConfig,
    providers: Providers,
    anchor_tracker_ml: Mutex<AnchorTracker>,
    notification_queue: NotificationQueue,
}

impl AnchorWriter {
    /// Create the channel on which the proof handler delivers witnessed anchor credentials.
    pub fn completion_channel(
        config: &AnchorWriterConfig,
    ) -> (
        mpsc::Sender<AnchorCredential>,
        mpsc::Receiver<AnchorCredential>,
    ) {
        mpsc::channel(config.completion_channel_capacity.max(1))
    }
    /// Create an anchor writer and start its commit loop and witness-timeout sweeper.  Must be
    /// called from within a tokio runtime.
    pub fn new(
        config: AnchorWriterConfig,
        providers: Providers,
        completion_rx: mpsc::Receiver<AnchorCredential>,
    ) -> Self {
        let notification_queue =
            NotificationQueue::new(config.notification_queue_capacity, config.read_batch_size);
        let inner_a = Arc::new(AnchorWriterInner {
            anchor_tracker_ml: Mutex::new(AnchorTracker::new(config.status_retention)),
            config,
            providers,
            notification_queue,
        });
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let commit_loop_jh = tokio::task::spawn(run_commit_loop(
            inner_a.clone(),
            completion_rx,
            shutdown_rx,
        ));
        let sweeper_jh = tokio::task::spawn(run_sweeper(Arc::downgrade(&inner_a)));
        tracing::info!(
            "AnchorWriter started; namespace: {}, witnesses: {:?}",
            inner_a.config.namespace,
            inner_a.config.witness_v
        );
        Self {
            inner_a,
            shutdown_tx_o: Some(shutdown_tx),
            commit_loop_jh_o: Some(commit_loop_jh),
            sweeper_jh_o: Some(sweeper_jh),
        }
    }
    pub fn config(&self) -> &AnchorWriterConfig {
        &self.inner_a.config
    }
    /// Build an anchor credential for the given batch of operations and submit it for witnessing.
    ///
    /// Every non-creation operation must reference a DID that already has a committed anchor.
    /// Returns once the witnesses have accepted the credential; the anchor is committed later,
    /// when the witnessed credential arrives on the completion channel.
    pub async fn write_anchor(
        &self,
        anchor_string: &str,
        operation_ref_v: &[OperationRef],
        version: u64,
    ) -> Result<()> {
        self.inner_a
            .write_anchor(anchor_string, operation_ref_v, version)
            .await
    }
    /// Read notifications of committed anchors strictly after `since_cursor`, each paired with
    /// its cursor, and whether more remain.  Pass -1 to read from the start.  Reading doesn't
    /// consume anything; several readers can page through the notifications independently.
    ///
    /// Fails with Error::CursorExpired if entries after `since_cursor` were already acknowledged,
    /// and with Error::CursorAhead if `since_cursor` is past the newest notification.
    pub fn read(&self, since_cursor: i64) -> Result<(bool, Vec<(u64, NotificationEntry)>)> {
        self.inner_a.notification_queue.read(since_cursor)
    }
    /// Release the notifications at or before `through_cursor`, making room for new ones.  Once
    /// the queue is full, commits wait until notifications are acknowledged.  Returns the number
    /// of notifications released.
    pub fn acknowledge(&self, through_cursor: u64) -> Result<usize> {
        let released_count = self
            .inner_a
            .notification_queue
            .acknowledge(through_cursor)?;
        tracing::trace!(
            "AnchorWriter::acknowledge({}); released {} notification(s)",
            through_cursor,
            released_count
        );
        Ok(released_count)
    }
    /// Status of the anchor credential with the given id, if it was submitted by this writer or
    /// committed through it.
    pub fn status(&self, anchor_credential_id: &str) -> Option<AnchorStatus> {
        self.inner_a.anchor_tracker().status(anchor_credential_id)
    }
    /// Number of anchors submitted for witnessing that are neither committed nor abandoned.
    pub fn pending_count(&self) -> usize {
        self.inner_a.anchor_tracker().pending_count()
    }
    /// Commit a witnessed anchor credential directly, bypassing the completion channel.
    #[cfg(test)]
    pub(crate) async fn handle(&self, anchor_credential: AnchorCredential) {
        self.inner_a.handle(anchor_credential).await
    }
    /// Stop the witness-timeout sweeper, commit every witnessed credential already delivered on
    /// the completion channel, and wait for the commit loop to finish.  The notification queue is
    /// closed first, so commits from then on are not published.
    pub async fn shutdown(mut self) {
        if let Some(sweeper_jh) = self.sweeper_jh_o.take() {
            sweeper_jh.abort();
        }
        self.inner_a.notification_queue.close();
        if let Some(shutdown_tx) = self.shutdown_tx_o.take() {
            // The commit loop may already have exited if every sender was dropped.
            let _ = shutdown_tx.send(());
        }
        if let Some(commit_loop_jh) = self.commit_loop_jh_o.take() {
            if let Err(err) = commit_loop_jh.await {
                tracing::error!("AnchorWriter commit loop terminated abnormally: {}", err);
            }
        }
        tracing::info!("AnchorWriter shut down");
    }
}

impl Drop for AnchorWriter {
    fn drop(&mut self) {
        // Dropping shutdown_tx_o makes the commit loop drain and exit on its own; closing the
        // queue keeps it from waiting for acknowledgements that can no longer come.
        if let Some(sweeper_jh) = self.sweeper_jh_o.take() {
            sweeper_jh.abort();
        }
        self.inner_a.notification_queue.close();
    }
}

impl AnchorWriterInner {
    fn anchor_tracker(&self) -> MutexGuard<'_, AnchorTracker> {
        self.anchor_tracker_ml
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
    async fn write_anchor(
        &self,
        anchor_string: &str,
        operation_ref_v: &[OperationRef],
        version: u64,
    ) -> Result<()> {
        tracing::debug!(
            "AnchorWriter::write_anchor; anchor_string: {}, {} operation(s), version: {}",
            anchor_string,
            operation_ref_v.len(),
            version
        );

        let mut previous_transaction_m = BTreeMap::new();
        let mut expected_m = BTreeMap::new();
        for operation_ref in operation_ref_v.iter() {
            if !operation_ref.operation_type.requires_previous_anchor() {
                expected_m.entry(operation_ref.did.clone()).or_insert(None);
                continue;
            }
            if previous_transaction_m.contains_key(&operation_ref.did) {
                continue;
            }
            let previous_address = match self
                .providers
                .did_anchor_ref_index_a
                .last(&operation_ref.did)
                .await
            {
                Ok(address) => address,
                Err(did_anchor_ref_index::Error::NotFound(_)) => {
                    return Err(Error::ReferenceNotFound {
                        did: operation_ref.did.clone(),
                        operation_type: operation_ref.operation_type,
                    });
                }
                Err(err) => return Err(err.into()),
            };
            tracing::trace!(
                "AnchorWriter::write_anchor; DID {} ({}) links to previous anchor {}",
                operation_ref.did,
                operation_ref.operation_type,
                previous_address
            );
            previous_transaction_m.insert(operation_ref.did.clone(), previous_address.clone());
            expected_m.insert(operation_ref.did.clone(), Some(previous_address));
        }

        let anchor_payload = AnchorPayload::new(
            self.config.namespace.clone(),
            version,
            anchor_string.to_string(),
            operation_ref_v,
            previous_transaction_m,
        );
        let anchor_credential = self
            .providers
            .anchor_credential_builder_a
            .build(anchor_payload)
            .await
            .map_err(error_build)?;
        let id = anchor_credential.id.clone();

        // Registered before submitting, since witnessing may complete before request_proofs returns.
        self.anchor_tracker().register(
            &id,
            PendingAnchor {
                expected_m,
                submitted_at: tokio::time::Instant::now(),
            },
        )?;
        if let Err(err) = self
            .providers
            .proof_handler_a
            .request_proofs(anchor_credential, &self.config.witness_v)
            .await
        {
            self.anchor_tracker().cancel(&id);
            return Err(error_submission(err));
        }

        tracing::info!(
            "anchor credential {} submitted for witnessing by {} witness(es)",
            id,
            self.config.witness_v.len()
        );
        Ok(())
    }
    async fn handle(&self, anchor_credential: AnchorCredential) {
        let id = anchor_credential.id.clone();
        let anchor_status = match self.commit(anchor_credential).await {
            Ok(Some(anchor_status)) => anchor_status,
            Ok(None) => {
                return;
            }
            Err(err @ Error::ReferenceConflict(_)) => {
                tracing::error!("anchor credential {} not committed: {}", id, err);
                AnchorStatus::Conflict {
                    reason: err.to_string(),
                }
            }
            Err(err) => {
                tracing::error!("failed to commit anchor credential {}: {}", id, err);
                AnchorStatus::Failed {
                    reason: err.to_string(),
                }
            }
        };
        self.anchor_tracker().set_status(&id, anchor_status);
    }
    /// Returns the Committed status, or None if the credential was discarded.
    async fn commit(&self, anchor_credential: AnchorCredential) -> Result<Option<AnchorStatus>> {
        let id = anchor_credential.id.as_str();
        let pending_anchor_o = self.anchor_tracker().take_pending(id);
        let (did_v, expected_mo) = match pending_anchor_o {
            Some(pending_anchor) => (
                pending_anchor.expected_m.keys().cloned().collect::<Vec<_>>(),
                Some(pending_anchor.expected_m),
            ),
            None => {
                let anchor_status_o = self.anchor_tracker().status(id);
                if anchor_status_o == Some(AnchorStatus::Abandoned) {
                    tracing::warn!(
                        "discarding witnessed anchor credential {}; it was abandoned after the witness timeout",
                        id
                    );
                    return Ok(None);
                }
                tracing::warn!(
                    "anchor credential {} was not submitted by this writer; committing it without reference checks",
                    id
                );
                (
                    anchor_credential
                        .credential_subject
                        .referenced_did_s()
                        .into_iter()
                        .collect::<Vec<_>>(),
                    None,
                )
            }
        };

        // Nothing is written if the references this anchor was built against are already stale.
        if let Some(expected_m) = expected_mo.as_ref() {
            self.check_references(expected_m).await?;
        }

        let persisted = match self
            .providers
            .vc_store
            .put_anchor_credential(&anchor_credential)
            .await
        {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(
                    "failed to store anchor credential {}; committing anyway: {}",
                    id,
                    err
                );
                false
            }
        };

        let address = self
            .providers
            .anchor_graph_a
            .add(&anchor_credential)
            .await?;

        match expected_mo.as_ref() {
            Some(expected_m) => {
                self.providers
                    .did_anchor_ref_index_a
                    .compare_and_add(expected_m, &address)
                    .await?
            }
            None => {
                self.providers
                    .did_anchor_ref_index_a
                    .add(&did_v, &address)
                    .await?
            }
        }

        tracing::info!("anchor credential {} committed at {}", id, address);

        let published = match self
            .notification_queue
            .push(NotificationEntry::new(
                did_v.into_iter().collect(),
                address.clone(),
            ))
            .await
        {
            Ok(cursor) => {
                tracing::debug!(
                    "AnchorWriter::commit; anchor credential {} published with cursor {}",
                    id,
                    cursor
                );
                true
            }
            Err(Error::QueueClosed) => {
                tracing::warn!(
                    "anchor credential {} committed at {}, but the notification queue was closed before it could be published",
                    id,
                    address
                );
                false
            }
            Err(err) => return Err(err),
        };

        Ok(Some(AnchorStatus::Committed {
            address,
            persisted,
            published,
        }))
    }
    async fn check_references(
        &self,
        expected_m: &BTreeMap<String, Option<GraphAddress>>,
    ) -> Result<()> {
        for (did, expected_o) in expected_m.iter() {
            let found_o = match self.providers.did_anchor_ref_index_a.last(did).await {
                Ok(address) => Some(address),
                Err(did_anchor_ref_index::Error::NotFound(_)) => None,
                Err(err) => return Err(err.into()),
            };
            if found_o != *expected_o {
                return Err(Error::ReferenceConflict(
                    format!(
                        "DID {} was anchored against {:?}, but its latest anchor is now {:?}",
                        did, expected_o, found_o
                    )
                    .into(),
                ));
            }
        }
        Ok(())
    }
    fn abandon_expired(&self) {
        let witness_timeout = self.config.witness_timeout();
        let abandoned_id_v = self
            .anchor_tracker()
            .abandon_expired(tokio::time::Instant::now(), witness_timeout);
        for id in abandoned_id_v {
            let err = Error::Abandoned(
                format!(
                    "anchor credential {} was not witnessed within {:?}",
                    id, witness_timeout
                )
                .into(),
            );
            tracing::warn!("{}", err);
        }
    }
}

async fn run_commit_loop(
    inner_a: Arc<AnchorWriterInner>,
    mut completion_rx: mpsc::Receiver<AnchorCredential>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    tracing::debug!("AnchorWriter commit loop started");
    loop {
        tokio::select! {
            anchor_credential_o = completion_rx.recv() => match anchor_credential_o {
                Some(anchor_credential) => inner_a.handle(anchor_credential).await,
                None => break,
            },
            _ = &mut shutdown_rx => {
                completion_rx.close();
                while let Some(anchor_credential) = completion_rx.recv().await {
                    inner_a.handle(anchor_credential).await;
                }
                break;
            }
        }
    }
    tracing::debug!("AnchorWriter commit loop finished");
}

async fn run_sweeper(inner_w: Weak<AnchorWriterInner>) {
    let sweep_interval = match inner_w.upgrade() {
        Some(inner_a) => inner_a.config.sweep_interval(),
        None => return,
    };
    let mut interval = tokio::time::interval(sweep_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        match inner_w.upgrade() {
            Some(inner_a) => inner_a.abandon_expired(),
            None => break,
        }
    }
}
