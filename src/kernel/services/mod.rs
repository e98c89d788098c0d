//! Services layer (ports + adapters).
//!
//! - `ports`: contracts and data types the kernel depends on.
//! - `adapters`: network, filesystem and async implementations.

pub mod adapters;
pub mod ports;
