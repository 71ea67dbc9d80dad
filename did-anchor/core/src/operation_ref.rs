use crate::OperationType;

/// Reference to a single DID operation included in an anchor batch.
#[derive(Clone, Debug, serde::Deserialize, Eq, Hash, PartialEq, serde::Serialize)]
pub struct OperationRef {
    /// The DID (or its unique suffix) that the operation applies to.
    #[serde(rename = "uniqueSuffix")]
    pub did: String,
    #[serde(rename = "type")]
    pub operation_type: OperationType,
}

impl OperationRef {
    pub fn new(did: impl Into<String>, operation_type: OperationType) -> Self {
        Self {
            did: did.into(),
            operation_type,
        }
    }
    pub fn create(did: impl Into<String>) -> Self {
        Self::new(did, OperationType::Create)
    }
    pub fn update(did: impl Into<String>) -> Self {
        Self::new(did, OperationType::Update)
    }
}
