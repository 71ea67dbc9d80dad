#[derive(clap::Args, Clone, Debug)]
pub struct AnchorWriterConfig {
    /// Namespace recorded in every anchor payload, e.g. "did:sidetree".
    #[arg(env = "DID_ANCHOR_NAMESPACE", long, default_value = "did:sidetree")]
    pub namespace: String,
    /// Comma-separated list of the witnesses whose proofs are requested for every anchor.
    #[arg(
        name = "witness",
        env = "DID_ANCHOR_WITNESSES",
        long,
        value_delimiter = ','
    )]
    pub witness_v: Vec<String>,
    /// Capacity of the channel on which witnessed anchor credentials are delivered.
    #[arg(
        env = "DID_ANCHOR_COMPLETION_CHANNEL_CAPACITY",
        long,
        default_value = "100"
    )]
    pub completion_channel_capacity: usize,
    /// Maximum number of unread notifications.  When full, committing blocks until readers catch up.
    #[arg(
        env = "DID_ANCHOR_NOTIFICATION_QUEUE_CAPACITY",
        long,
        default_value = "1000"
    )]
    pub notification_queue_capacity: usize,
    /// Maximum number of notifications returned by a single read.
    #[arg(env = "DID_ANCHOR_READ_BATCH_SIZE", long, default_value = "100")]
    pub read_batch_size: usize,
    /// Milliseconds after submission at which an anchor that has not been witnessed is abandoned.
    #[arg(env = "DID_ANCHOR_WITNESS_TIMEOUT_MILLIS", long, default_value = "60000")]
    pub witness_timeout_millis: u64,
    /// How often pending anchors are checked against the witness timeout, in milliseconds.
    #[arg(env = "DID_ANCHOR_SWEEP_INTERVAL_MILLIS", long, default_value = "5000")]
    pub sweep_interval_millis: u64,
    /// Number of committed, conflicting, failed or abandoned anchors whose status is kept for
    /// AnchorWriter::status.  The oldest are forgotten first.
    #[arg(env = "DID_ANCHOR_STATUS_RETENTION", long, default_value = "10000")]
    pub status_retention: usize,
}

impl AnchorWriterConfig {
    pub fn witness_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.witness_timeout_millis)
    }
    pub fn sweep_interval(&self) -> std::time::Duration {
        // A zero period would make tokio::time::interval panic.
        std::time::Duration::from_millis(self.sweep_interval_millis.max(1))
    }
}

impl Default for AnchorWriterConfig {
    fn default() -> Self {
        Self {
            namespace: "did:sidetree".to_string(),
            witness_v: Vec::new(),
            completion_channel_capacity: 100,
            notification_queue_capacity: 1000,
            read_batch_size: 100,
            witness_timeout_millis: 60_000,
            sweep_interval_millis: 5000,
            status_retention: 10_000,
        }
    }
}
