//! REST transport for the Robinhood API.
//!
//! `Transport` owns the HTTP client and the shared session headers and
//! exposes the three primitives every endpoint function is built on:
//! `get` (with a [`GetMode`] shaping the body), `post` and `delete`.

pub mod transport;

pub use transport::{GetMode, PostResponse, Transport, ACCEPTED_POST_STATUSES};
