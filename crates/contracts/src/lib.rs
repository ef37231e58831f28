//! Bindings for the contracts deployed by this workspace and the lookup of
//! their compiled artifacts.
pub mod alloy;
pub mod artifacts;

pub use artifacts::{Artifacts, ContractFactory, LookupError};
