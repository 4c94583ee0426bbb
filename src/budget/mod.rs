//! Privacy accounting of a source configuration: how many outputs it can
//! produce, and what that costs.

pub mod config;
pub mod limits;
pub mod state_space;
pub mod traits;
