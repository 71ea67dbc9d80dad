mod anchor_credential_builder;
mod anchor_status;
mod anchor_tracker;
mod anchor_writer;
mod anchor_writer_config;
mod error;
mod notification_queue;
mod proof_handler;
mod providers;

pub(crate) use crate::{anchor_tracker::AnchorTracker, notification_queue::NotificationQueue};
pub use crate::{
    anchor_credential_builder::AnchorCredentialBuilder,
    anchor_status::AnchorStatus,
    anchor_writer::AnchorWriter,
    anchor_writer_config::AnchorWriterConfig,
    error::{error_build, error_submission, Error},
    proof_handler::ProofHandler,
    providers::Providers,
};
pub type Result<T> = std::result::Result<T, Error>;
