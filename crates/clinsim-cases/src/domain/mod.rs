//! Domain model for the Case Repository.

pub mod step;
pub mod step_ref;
pub mod table;
