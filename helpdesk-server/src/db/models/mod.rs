//! Database records
//!
//! Records are read with `record::id(id) AS id`, so ids are bare keys and
//! references (owner, authors) are stored as bare user keys.

pub mod ticket;
pub mod user;

pub use ticket::*;
pub use user::*;
