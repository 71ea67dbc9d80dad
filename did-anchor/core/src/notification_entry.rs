use crate::GraphAddress;
use std::collections::BTreeSet;

/// Published once per committed anchor: the DIDs it covers and its address in the graph.
#[derive(Clone, Debug, serde::Deserialize, Eq, PartialEq, serde::Serialize)]
pub struct NotificationEntry {
    #[serde(rename = "identifiers")]
    pub did_s: BTreeSet<String>,
    #[serde(rename = "address")]
    pub address: GraphAddress,
}

impl NotificationEntry {
    pub fn new(did_s: BTreeSet<String>, address: GraphAddress) -> Self {
        Self { did_s, address }
    }
}
