#[derive(Clone, Debug)]
pub struct VCRecord {
    /// The credential's `id` field.
    pub id: String,
    pub added_at: time::OffsetDateTime,
    /// JCS serialization of the fully witnessed credential.
    pub credential_jcs: String,
}
