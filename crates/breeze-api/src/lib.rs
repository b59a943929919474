//! # breeze-api – Session client for the Breeze/Connect XML web-service API
//!
//! Logs in once, keeps the `BREEZESESSION` token, and drives the
//! `xml?action=…` API for users, groups, folders, meetings and meeting
//! permissions.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │  ConnectService  (service.rs)                    │
//! │  └── id → (ConnectSessionInfo, ConnectClient)    │
//! ├──────────────────────────────────────────────────┤
//! │  ConnectClient  (client.rs)                      │
//! │  ├── login / invoke / single-flight lock         │
//! │  └── users · groups · folders · meetings         │
//! │      permissions · sco                           │
//! ├──────────────────────────────────────────────────┤
//! │  ActionResponse (response.rs) ← xml.rs           │
//! │  └── status check, path lookups                  │
//! ├──────────────────────────────────────────────────┤
//! │  ConnectTransport (transport.rs)                 │
//! │  └── HttpTransport: reqwest GET + session cookie │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use breeze_api::{ConnectClient, ConnectConfig, Permission};
//!
//! # async fn run() -> breeze_api::ConnectResult<()> {
//! let config = ConnectConfig::new("https://meet.example.com/api/")
//!     .with_credentials("admin@example.com", "secret")
//!     .with_root_folder("11002");
//! let mut client = ConnectClient::new(config)?;
//! client.login(None).await?;
//!
//! let folder = match client.check_folder("Team A").await? {
//!     Some(id) => id,
//!     None => client.create_folder("Team A", "team-a").await?,
//! };
//! let meeting = client
//!     .create_meeting(&folder, "Weekly sync", "2024-01-01 10:00", "2024-01-01 11:00", "weekly")
//!     .await?;
//! client
//!     .add_user_to_meeting(&meeting, "ada@example.com", Permission::Host)
//!     .await?;
//! # Ok(())
//! # }
//! ```

// ── Sub-modules ─────────────────────────────────────────────────────────

pub mod error;
pub mod config;
pub mod types;
pub mod xml;
pub mod dates;
pub mod response;
pub mod transport;
pub mod client;

// Domain operations
pub mod users;
pub mod groups;
pub mod folders;
pub mod meetings;
pub mod permissions;
pub mod sco;

pub mod service;

#[cfg(test)]
pub(crate) mod test_utils;

// ── Re-exports for ergonomic access ─────────────────────────────────────

pub use client::ConnectClient;
pub use config::{ConnectConfig, Credentials, SESSION_COOKIE};
pub use error::{ConnectError, ConnectResult};
pub use response::ActionResponse;
pub use service::{ConnectService, ConnectServiceState};
pub use transport::{ConnectTransport, HttpTransport, TransportRequest, TransportResponse};
pub use types::{
    ActionParams, ActionRequest, ConnectSession, ConnectSessionInfo, MeetingUpdate, NewUser,
    Permission, Principal,
};
