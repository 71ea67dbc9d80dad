use crate::{GraphAddress, OperationRef};
use std::collections::{BTreeMap, BTreeSet};

/// The subject of an anchor credential.  `previous_transaction_m` holds, for every DID in the
/// batch whose operation is not a creation, the address of that DID's previous anchor.  These
/// entries are the edges of the transaction DAG.
#[serde_with::serde_as]
#[derive(Clone, Debug, serde::Deserialize, Eq, PartialEq, serde::Serialize)]
pub struct AnchorPayload {
    #[serde(rename = "operationCount", default)]
    pub operation_count: u64,
    #[serde(rename = "namespace")]
    pub namespace: String,
    /// Protocol version.  Accepted as a JSON number or a numeric string.
    #[serde(rename = "version")]
    #[serde_as(as = "serde_with::PickFirst<(_, serde_with::DisplayFromStr)>")]
    pub version: u64,
    #[serde(rename = "anchorString")]
    pub anchor_string: String,
    #[serde(rename = "previousTransactions", default)]
    pub previous_transaction_m: BTreeMap<String, GraphAddress>,
}

impl AnchorPayload {
    /// Assemble a payload for the given batch.  The caller is responsible for having resolved
    /// `previous_transaction_m` so that it has exactly one entry per non-creation DID.
    pub fn new(
        namespace: String,
        version: u64,
        anchor_string: String,
        operation_ref_v: &[OperationRef],
        previous_transaction_m: BTreeMap<String, GraphAddress>,
    ) -> Self {
        Self {
            operation_count: operation_ref_v.len() as u64,
            namespace,
            version,
            anchor_string,
            previous_transaction_m,
        }
    }
    pub fn previous_address_o(&self, did: &str) -> Option<&GraphAddress> {
        self.previous_transaction_m.get(did)
    }
    /// The DIDs that this payload links to a previous anchor.
    pub fn referenced_did_s(&self) -> BTreeSet<String> {
        self.previous_transaction_m.keys().cloned().collect()
    }
}
