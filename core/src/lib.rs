//! Data-access facade for a json-server style store.
//!
//! # Overview
//! Translates application calls ("get user by id", "create item") into
//! single HTTP requests against a JSON store exposing `/users` and `/items`,
//! and normalizes the responses.
//!
//! # Design
//! - `DbClient` is stateless and does no I/O: `build_*` produces an
//!   `HttpRequest`, `parse_*` consumes an `HttpResponse`.
//! - `handle` is the one shared response rule: 2xx is data, 404 is `None`,
//!   anything else is `DbError::Status`.
//! - `Db` wires a client to a `Transport` (blocking `ureq` by default) and a
//!   `Clock`, and exposes one method per operation.
//! - The base address is a `DbConfig` value passed in, never a global.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{handle, DbClient};
pub use config::DbConfig;
pub use db::{Clock, Db, SystemClock};
pub use error::{DbError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{Attributes, Item, User};
