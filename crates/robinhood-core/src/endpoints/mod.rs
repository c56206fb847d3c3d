//! Endpoint functions built on the transport and the response shaper.
//!
//! Each one builds a URL and query, calls `Transport::get`, then narrows the
//! result with `shape::extract` when an `info` field is given.

pub mod account;
pub mod markets;
pub mod stocks;

pub use stocks::PriceType;
