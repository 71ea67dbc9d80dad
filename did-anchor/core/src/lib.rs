mod anchor_credential;
mod anchor_payload;
mod error;
mod graph_address;
mod notification_entry;
mod operation_ref;
mod operation_type;
mod proof;

pub use crate::{
    anchor_credential::AnchorCredential,
    anchor_payload::AnchorPayload,
    error::{error_malformed, error_serialization, Error},
    graph_address::GraphAddress,
    notification_entry::NotificationEntry,
    operation_ref::OperationRef,
    operation_type::OperationType,
    proof::Proof,
};

pub type Result<T> = std::result::Result<T, Error>;

/// JSON-LD context of the W3C verifiable credentials data model.
pub const CONTEXT_CREDENTIALS_V1: &str = "https://www.w3.org/2018/credentials/v1";
/// JSON-LD context defining the anchor credential vocabulary.
pub const CONTEXT_ANCHOR_V1: &str = "https://w3id.org/did-anchor/v1";
pub const TYPE_VERIFIABLE_CREDENTIAL: &str = "VerifiableCredential";
pub const TYPE_ANCHOR_CREDENTIAL: &str = "AnchorCredential";

/// This function returns the current time in UTC with millisecond precision, which is the
/// precision that survives a round trip through the RFC 3339 strings used in credentials.
pub fn now_utc_milliseconds() -> time::OffsetDateTime {
    let now = time::OffsetDateTime::now_utc();
    now.replace_nanosecond(now.nanosecond() / 1_000_000 * 1_000_000)
        .unwrap_or(now)
}
