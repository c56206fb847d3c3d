//! Authentication module for managing sessions and stored tokens.
//!
//! This module provides:
//! - `Session`: headers and login flag shared by every request
//! - `Authenticator`: login (stored token, password grant, MFA, challenge) and logout
//! - `CredentialStore`: one token file per profile
//! - `DeviceToken`: the device identity sent with password grants
//! - `Prompter`: where usernames, passwords and codes are read from

pub mod credentials;
pub mod device;
pub mod login;
pub mod prompt;
pub mod session;

pub use credentials::{CredentialStore, TokenSet};
pub use device::DeviceToken;
pub use login::{Authenticator, LoginOptions, LoginResponse, LoginSource};
pub use prompt::{Prompter, TerminalPrompter};
pub use session::Session;
