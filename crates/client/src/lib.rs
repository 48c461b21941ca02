//! Appetit Client - Typed REST client for the food-ordering backend.
//!
//! # Architecture
//!
//! - [`dispatcher`] - The single request path: URL, body, bearer header,
//!   uniform errors
//! - [`api`] - Per-area endpoint wrappers and their schemas
//! - [`session`] - Bearer token and role, passed explicitly to each call
//! - [`store`] - Durable key/value state (session, analytics preset)
//! - [`notify`] - Transient notices and the `surface` combinator
//! - [`config`] - Environment-driven configuration
//!
//! # Example
//!
//! ```rust,no_run
//! use appetit_client::{ApiClient, ClientConfig, LoginRequest};
//! use appetit_core::Contact;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(&ClientConfig::from_env()?)?;
//! let token = client
//!     .login(&LoginRequest {
//!         email_or_phone: Contact::parse("admin@appetit.kz")?,
//!         password: "secret".to_owned().into(),
//!     })
//!     .await?;
//!
//! let session = token.session();
//! let cart = client.get_cart(Some(&session)).await?;
//! println!("subtotal {}", cart.subtotal());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod notify;
pub mod preset;
pub mod session;
pub mod store;

pub use api::*;
pub use config::{ClientConfig, ConfigError};
pub use dispatcher::{ApiClient, Request};
pub use error::ClientError;
pub use notify::{MemoryNotifier, Notice, NoticeLevel, Notifier, surface};
pub use preset::{AnalyticsFilterPreset, load_preset, save_preset};
pub use session::{AuthStatus, Session, SessionStore};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
