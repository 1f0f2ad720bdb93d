//! Application layer for the Case Repository.

pub mod query_handlers;
