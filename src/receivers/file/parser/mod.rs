// SPDX-License-Identifier: Apache-2.0

//! Log line parsing.
//!
//! - [`VehicleLogParser`] - fixed grammar vehicle location and timepoint lines
//! - [`fields`] - token helpers the grammars are built from

mod error;
pub mod fields;
mod traits;
mod vehicle;

pub use error::InvalidLine;
pub use traits::Parser;
pub use vehicle::{LOCATION_DISCRIMINATOR, TIMEPOINT_DISCRIMINATOR, VehicleLogParser};
