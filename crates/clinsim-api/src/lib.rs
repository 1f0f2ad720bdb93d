//! Clinical case simulator HTTP API.
//!
//! Exposes the case repository and case sessions over JSON. The binary in
//! `main.rs` wires configuration, logging and the listener around
//! [`routes::app`].

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
