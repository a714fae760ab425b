//! # unifi-stations
//!
//! A Rust client library for the Ubiquiti UniFi Controller's client-station
//! (user) management API.
//!
//! This crate provides a type-safe, async interface for enumerating,
//! creating, updating, and commanding (block, unblock, forget) client-station
//! records on a managed site, hiding the controller's inconsistent endpoint
//! shapes behind one interface.
//!
//! ## Features
//!
//! - 🔐 Secure authentication with UniFi controllers
//! - 📋 Station record management (lookup by MAC or id, list, create, update)
//! - 🚫 Station commands: block, unblock, forget
//! - 🔄 Async API with Tokio runtime support
//! - 🛡️ Comprehensive error handling
//!
//! ## Example
//!
//! ```rust,no_run
//! use unifi_stations::UniFiClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a client
//!     let client = UniFiClient::builder()
//!         .controller_url("https://unifi.example.com:8443")
//!         .username("admin")
//!         .password_from_env("UNIFI_PASSWORD")
//!         .site("default")
//!         .verify_ssl(false)
//!         .build()
//!         .await?;
//!
//!     // Updates pick their wire protocol from the controller version.
//!     client.refresh_controller_version().await?;
//!
//!     // Look up a station by MAC and block it.
//!     let user = client.users().get_by_mac("00:11:22:33:44:55").await?;
//!     println!("Blocking {} ({})", user.mac, user.name.as_deref().unwrap_or("unnamed"));
//!     client.users().block(&user.mac).await?;
//!
//!     Ok(())
//! }
//! ```

mod api;
mod client;
mod error;
mod models;
mod version;

pub use api::user::UserApi;
#[cfg(feature = "default-client")]
pub use client::{initialize, instance};
pub use client::{UniFiClient, UniFiClientBuilder};
pub use error::{UniFiError, UniFiResult};
pub use models::api_response::{ApiMeta, ApiResponse, EmptyResponse};
pub use models::auth::LoginRequest;
pub use models::user::{StationCommand, User};
pub use version::UpdateStrategy;
