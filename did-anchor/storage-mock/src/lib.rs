mod cas_client_mock;
mod vc_storage_mock;

pub use crate::{cas_client_mock::CASClientMock, vc_storage_mock::VCStorageMock};
