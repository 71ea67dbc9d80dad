use did_anchor_core::GraphAddress;

/// Where an anchor credential is in its lifecycle, as seen by the anchor writer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AnchorStatus {
    /// Accepted for witnessing; not yet durable.
    Submitted,
    /// Appended to the transaction graph and recorded as the latest anchor of its DIDs.
    /// `persisted` is false if the copy in the final-credential store could not be written.
    /// `published` is false if the writer shut down before the notification could be queued.
    Committed {
        address: GraphAddress,
        persisted: bool,
        published: bool,
    },
    /// The anchor was built against references that are no longer the latest.
    Conflict { reason: String },
    /// Witnessing did not complete within the configured timeout.
    Abandoned,
    /// Committing the witnessed anchor failed.
    Failed { reason: String },
}

impl AnchorStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AnchorStatus::Submitted)
    }
}
