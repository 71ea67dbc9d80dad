use crate::{
    error_malformed, error_serialization, AnchorPayload, GraphAddress, Proof, Result,
    CONTEXT_ANCHOR_V1, CONTEXT_CREDENTIALS_V1, TYPE_ANCHOR_CREDENTIAL, TYPE_VERIFIABLE_CREDENTIAL,
};

/// A verifiable credential whose subject is an anchor payload.
///
/// The `@context`, `type` and `proof` fields may each appear on the wire as either a single value
/// or a list; they are always held as lists here.  A credential accumulates one proof per witness
/// before it is committed to the transaction graph.
///
/// Use serialize_canonically to produce the bytes that are stored and content-addressed; the
/// ordinary serde_json serializers do not produce canonical JSON.
#[serde_with::serde_as]
#[derive(Clone, Debug, serde::Deserialize, Eq, PartialEq, serde::Serialize)]
pub struct AnchorCredential {
    #[serde(rename = "@context")]
    #[serde_as(as = "serde_with::OneOrMany<_>")]
    pub context_v: Vec<String>,
    #[serde(rename = "id")]
    pub id: String,
    #[serde(rename = "type")]
    #[serde_as(as = "serde_with::OneOrMany<_>")]
    pub type_v: Vec<String>,
    #[serde(rename = "issuer")]
    pub issuer: String,
    #[serde(rename = "issuanceDate")]
    #[serde(with = "time::serde::rfc3339")]
    pub issuance_date: time::OffsetDateTime,
    #[serde(rename = "credentialSubject")]
    pub credential_subject: AnchorPayload,
    #[serde(rename = "proof")]
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    #[serde_as(as = "serde_with::OneOrMany<_>")]
    pub proof_v: Vec<Proof>,
}

impl AnchorCredential {
    /// Create a credential carrying the standard anchor credential contexts and types, with no proofs.
    pub fn new_unsigned(
        id: String,
        issuer: String,
        issuance_date: time::OffsetDateTime,
        credential_subject: AnchorPayload,
    ) -> Self {
        Self {
            context_v: vec![
                CONTEXT_CREDENTIALS_V1.to_string(),
                CONTEXT_ANCHOR_V1.to_string(),
            ],
            id,
            type_v: vec![
                TYPE_VERIFIABLE_CREDENTIAL.to_string(),
                TYPE_ANCHOR_CREDENTIAL.to_string(),
            ],
            issuer,
            issuance_date,
            credential_subject,
            proof_v: Vec::new(),
        }
    }
    pub fn has_type(&self, type_name: &str) -> bool {
        self.type_v.iter().any(|t| t == type_name)
    }
    pub fn with_proof(mut self, proof: Proof) -> Self {
        self.proof_v.push(proof);
        self
    }
    /// Serialize this credential using JCS (JSON Canonicalization Scheme).
    pub fn serialize_canonically(&self) -> Result<String> {
        serde_json_canonicalizer::to_string(self).map_err(error_serialization)
    }
    /// Parse a credential from JSON.  The input need not be canonical.
    pub fn parse(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(error_malformed)
    }
    /// Parse a credential from stored bytes, which are expected to be its canonical serialization.
    pub fn parse_canonical_bytes(canonical_bytes: &[u8]) -> Result<Self> {
        let credential: Self = serde_json::from_slice(canonical_bytes).map_err(error_malformed)?;
        if credential.serialize_canonically()?.as_bytes() != canonical_bytes {
            return Err(crate::Error::Malformed(
                "anchor credential bytes are not in canonical form".into(),
            ));
        }
        Ok(credential)
    }
    /// The address this credential will have in the transaction graph.
    pub fn content_address(&self) -> Result<GraphAddress> {
        let canonical = self.serialize_canonically()?;
        Ok(GraphAddress::of_canonical_bytes(canonical.as_bytes()))
    }
}
