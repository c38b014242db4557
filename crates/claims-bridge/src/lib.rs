//! Claims Bridge Library
//!
//! Binds an application's account repository to a stateless token transport.
//! Issued tokens carry identity claims; every presented token is re-checked
//! against the repository before a principal is bound to the session.
//!
//! # Modules
//!
//! - `claims` - Claim paths, values, claim sets and their JSON wire shape
//! - `config` - Service configuration
//! - `crypto` - Token signing and verification
//! - `errors` - Error types
//! - `hooks` - Lifecycle hooks tying the claim phases to the transport
//! - `handlers` / `routes` / `middleware` - HTTP surface
//! - `models` - Data models
//! - `repositories` - Account lookup
//! - `services` - Issuance, validation and principal resolution

pub mod claims;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod hooks;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
