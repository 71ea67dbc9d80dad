use did_anchor_core::{AnchorCredential, AnchorPayload};

/// Builds a signed anchor credential whose subject is the given payload.  The returned credential
/// must carry an id that is unique among all credentials built by this builder.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait AnchorCredentialBuilder: Send + Sync {
    async fn build(&self, anchor_payload: AnchorPayload) -> anyhow::Result<AnchorCredential>;
}
