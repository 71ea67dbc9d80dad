use did_anchor_core::{AnchorCredential, AnchorPayload};

/// Builds unsigned anchor credentials with random ids of the form "{issuer}/vc/{uuid}".
#[derive(Clone, Debug)]
pub struct MockCredentialBuilder {
    issuer: String,
    error_o: Option<String>,
}

impl MockCredentialBuilder {
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            error_o: None,
        }
    }
    /// A builder for which every build fails with the given message.
    pub fn failing(issuer: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            error_o: Some(error.into()),
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl did_anchor_writer::AnchorCredentialBuilder for MockCredentialBuilder {
    async fn build(&self, anchor_payload: AnchorPayload) -> anyhow::Result<AnchorCredential> {
        if let Some(error) = self.error_o.as_ref() {
            anyhow::bail!("{}", error);
        }
        let id = format!("{}/vc/{}", self.issuer, uuid::Uuid::new_v4());
        tracing::debug!("MockCredentialBuilder::build; id: {}", id);
        Ok(AnchorCredential::new_unsigned(
            id,
            self.issuer.clone(),
            did_anchor_core::now_utc_milliseconds(),
            anchor_payload,
        ))
    }
}
