//! Synchronous client core for the Redmine REST API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses transport outcomes without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, or plugs a [`Transport`] into a
//! [`RedmineManager`] for one-call operations.
//!
//! # Design
//! - [`registry`] maps every entity kind to its endpoint; [`urls`] turns a
//!   kind and an operation into a URL, failing fast on missing owners.
//! - [`serialization`] reads and writes both wire formats through one
//!   format-neutral node tree and per-kind field tables.
//! - [`response`] turns transport failures and HTTP statuses into
//!   [`RedmineError`] values; only 2xx bodies are decoded.
//! - `RedmineClient` is immutable and holds only the host, format and
//!   credentials.

pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod http;
pub mod manager;
pub mod params;
pub mod registry;
pub mod response;
pub mod serialization;
pub mod types;
pub mod urls;

pub use client::RedmineClient;
pub use config::ClientConfig;
pub use error::{ErrorKind, RedmineError, RedmineResult};
pub use format::MimeFormat;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError, TransportOutcome};
pub use manager::RedmineManager;
pub use params::Parameters;
pub use registry::{EntityDescriptor, EntityKind, ParentScope};
pub use response::ResponseTranslator;
pub use serialization::{decode, decode_list, encode, Entity, PagedList, WriteMode};
pub use urls::{Endpoint, Operation, UrlResolver};
