use crate::{AnchorCredentialBuilder, ProofHandler};
use did_anchor_graph::AnchorGraphT;
use did_anchor_ref_index::DIDAnchorRefIndex;
use did_anchor_vc_store::VCStore;
use std::sync::Arc;

/// The collaborators of the anchor writer.
#[derive(Clone)]
pub struct Providers {
    pub anchor_graph_a: Arc<dyn AnchorGraphT>,
    pub did_anchor_ref_index_a: Arc<dyn DIDAnchorRefIndex>,
    pub anchor_credential_builder_a: Arc<dyn AnchorCredentialBuilder>,
    pub proof_handler_a: Arc<dyn ProofHandler>,
    pub vc_store: VCStore,
}
