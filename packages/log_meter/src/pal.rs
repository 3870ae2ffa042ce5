//! Platform abstraction layer for time and system metrics.
//!
//! Meters read the clock and sample system status through this layer, which allows tests to
//! substitute a fake platform with fully controlled time.

mod abstractions;
mod facade;
#[cfg(test)]
mod fake;
mod real;

pub(crate) use abstractions::*;
pub(crate) use facade::*;
#[cfg(test)]
pub(crate) use fake::*;
pub(crate) use real::*;
