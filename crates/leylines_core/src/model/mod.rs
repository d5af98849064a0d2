//! Board domain model.
//!
//! # Responsibility
//! - Define the records persisted by the store (`Article`, `PostIt`, `Tag`).
//! - Define explicit create/partial-update inputs for each record kind.
//!
//! # Invariants
//! - Every record is identified by a store-generated UUID.
//! - Partial updates are named optional fields, never open-ended maps.

pub mod article;
pub mod id;
pub mod page;
pub mod postit;
pub mod tag;
