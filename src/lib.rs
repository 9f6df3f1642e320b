///! Test-beam readout channel mapping
///
/// Static mapping tables for the H2 test-beam patch of
/// the calorimeter, with schema validation and lookup
/// helpers for the configuration framework.
///

pub mod constants;
pub mod errors;
pub mod mapping;

#[macro_use] extern crate log;

pub use crate::mapping::{
  TBChannelMapping,
  ChannelMappingRow,
  TowerControlEntry,
  TowerStripChMapping,
};
pub use crate::errors::MappingError;
