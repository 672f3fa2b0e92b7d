//! Domain logic for the campus learning-management backend.
//!
//! Nothing in this crate touches the network or the database. The `db` crate
//! feeds persisted rows into these functions and writes back whatever they
//! plan, which keeps the ordering and slug rules testable in isolation.

pub mod activity;
pub mod error;
pub mod history;
pub mod ordering;
pub mod pagination;
pub mod roles;
pub mod slug;
pub mod text;
pub mod types;
