//! # robinhood-core
//!
//! Client for Robinhood's private REST API.
//!
//! The request pipeline is small:
//!
//! - [`api::Transport`] issues GET/POST/DELETE with the shared session
//!   headers. GET bodies are shaped by a [`GetMode`]; pagination follows
//!   `next` cursors.
//! - [`auth::Authenticator`] logs in with a stored token when it is still
//!   valid, otherwise with a password grant, handling MFA and SMS/email
//!   challenges.
//! - [`auth::CredentialStore`] keeps one token file per profile.
//! - [`shape::extract`] narrows a response to one field.
//!
//! ```no_run
//! use robinhood_core::{ClientConfig, LoginOptions, RobinhoodClient};
//!
//! # async fn example() -> robinhood_core::Result<()> {
//! let client = RobinhoodClient::new(ClientConfig::default())?;
//! client.login(&LoginOptions::with_credentials("me@example.com", "hunter2")).await?;
//! let prices = client.get_quotes(&["AAPL", "MSFT"], Some("last_trade_price")).await;
//! println!("{:?}", prices);
//! client.logout().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod shape;
pub mod urls;
pub mod utils;

pub use api::{GetMode, PostResponse, Transport};
pub use auth::{CredentialStore, DeviceToken, LoginOptions, LoginResponse, LoginSource, Prompter, TokenSet};
pub use client::RobinhoodClient;
pub use config::ClientConfig;
pub use endpoints::PriceType;
pub use error::{Error, Result};
