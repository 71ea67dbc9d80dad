mod anchor_graph;
mod anchor_graph_t;
mod cas_client;
mod error;

pub use crate::{
    anchor_graph::AnchorGraph,
    anchor_graph_t::AnchorGraphT,
    cas_client::CASClient,
    error::{error_malformed, error_not_found, error_storage_error, Error},
};
pub type Result<T> = std::result::Result<T, Error>;
