use did_anchor_core::AnchorCredential;

/// Gathers witness proofs for an anchor credential.
///
/// `request_proofs` must return as soon as the request has been accepted; it must not wait for
/// the witnesses.  For every accepted request, exactly one credential carrying the collected
/// proofs (and the same id as the submitted one) is later sent on the completion channel that
/// was handed to AnchorWriter::new, unless the request is abandoned.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait ProofHandler: Send + Sync {
    async fn request_proofs(
        &self,
        anchor_credential: AnchorCredential,
        witness_v: &[String],
    ) -> anyhow::Result<()>;
}
