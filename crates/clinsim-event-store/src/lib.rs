//! Event storage for case sessions.
//!
//! Sessions live only as long as the process; the store keeps every stream in
//! memory and enforces optimistic concurrency on append.

pub mod memory_event_repository;

pub use memory_event_repository::InMemoryEventRepository;
