mod mock_credential_builder;
mod mock_witness;

pub use crate::{
    mock_credential_builder::MockCredentialBuilder,
    mock_witness::{MockWitness, WitnessMode},
};
