//! # scgapi - Syniverse SCG REST client core
//!
//! An async Rust client core for the Syniverse SCG REST APIs. This library
//! handles sessions, bearer authentication with automatic token refresh,
//! generic resource access, and lazy forward-only pagination, so entity
//! definitions reduce to plain serde structs plus a small schema
//! descriptor.
//!
//! ## Features
//!
//! - One process-wide client with pooled connections; cheap per-task
//!   sessions created with [`Scg::connect`]
//! - Generic [`Resource`] engine: list, get, create, update, delete and
//!   custom verbs for any entity implementing [`DataObject`]
//! - Lazy [`ForwardList`] pagination that fetches a page only when the
//!   previous one is exhausted
//! - Automatic token refresh on unauthorized replies, bounded by the
//!   credential's retry budget, with transparent replay
//! - Read-only fields stripped and wire names remapped on writes, driven
//!   by the entity's schema descriptor
//! - Detailed error taxonomy with the API's error body attached
//!
//! ## Basic Usage
//!
//! ```no_run
//! use scgapi::{AuthInfo, DataObject, ObjectBinding, Resource, Scg};
//! use serde::{Deserialize, Serialize};
//! use std::sync::Arc;
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct Contact {
//!     #[serde(default)]
//!     id: String,
//!     #[serde(default)]
//!     first_name: String,
//!     #[serde(default)]
//!     primary_mdn: String,
//!     #[serde(skip)]
//!     binding: ObjectBinding,
//! }
//!
//! impl DataObject for Contact {
//!     fn resource_path() -> &'static str {
//!         "scg-external-api/api/v1/contacts"
//!     }
//!     fn read_only_fields() -> &'static [&'static str] {
//!         &["id"]
//!     }
//!     fn id(&self) -> &str {
//!         &self.id
//!     }
//!     fn binding(&self) -> &ObjectBinding {
//!         &self.binding
//!     }
//!     fn binding_mut(&mut self) -> &mut ObjectBinding {
//!         &mut self.binding
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), scgapi::Error> {
//!     let auth = Arc::new(AuthInfo::new("consumer-key", "consumer-secret", "token"));
//!     let scg = Scg::new();
//!
//!     let names = scg
//!         .connect("https://api.syniverse.com", auth, |session| async move {
//!             let contacts = Resource::<Contact>::new(&session);
//!             let mut listing = contacts.list(None, None);
//!             let mut names = Vec::new();
//!             while let Some(contact) = listing.next().await? {
//!                 names.push(contact.first_name);
//!             }
//!             Ok(names)
//!         })
//!         .await?;
//!
//!     println!("{} contacts", names.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Authentication
//!
//! Credentials live in an [`AuthInfo`] shared between sessions as an
//! `Arc`. When a request comes back unauthorized, the engine refreshes the
//! access token with the consumer key/secret and replays the request; the
//! refreshed token is stored in the holder, so every session sharing it
//! benefits. The refresh budget bounds how many refreshes a single request
//! may spend.
//!
//! ```no_run
//! use scgapi::AuthInfo;
//!
//! // programmatic
//! let auth = AuthInfo::new("consumer-key", "consumer-secret", "initial-token")
//!     .with_retries(5);
//!
//! // or from a JSON credentials file
//! let auth = AuthInfo::from_file("scg-credentials.json")?;
//! # Ok::<(), scgapi::Error>(())
//! ```

pub mod auth;
pub mod client;
pub mod data;
pub mod error;
pub mod list;
pub mod resource;
pub mod rest;
pub mod session;
pub mod time;

// Re-export main types for convenience
pub use auth::AuthInfo;
pub use client::{Config, Scg, UnitOfWork};
pub use data::{DataObject, ObjectBinding, ObjectOps};
pub use error::{ApiError, Error, Result};
pub use list::ForwardList;
pub use resource::{Filter, GenericReply, Resource};
pub use rest::ListParameters;
pub use session::Session;
pub use time::Timestamp;
