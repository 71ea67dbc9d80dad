/// A linked-data proof attached to an anchor credential, either by its issuer or by a witness.
#[derive(Clone, Debug, serde::Deserialize, Eq, PartialEq, serde::Serialize)]
pub struct Proof {
    #[serde(rename = "type")]
    pub proof_type: String,
    #[serde(rename = "created")]
    #[serde(with = "time::serde::rfc3339")]
    pub created: time::OffsetDateTime,
    #[serde(rename = "verificationMethod")]
    pub verification_method: String,
    #[serde(rename = "proofPurpose")]
    pub proof_purpose: String,
    #[serde(rename = "domain")]
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub domain_o: Option<String>,
    #[serde(rename = "jws")]
    pub jws: String,
}
