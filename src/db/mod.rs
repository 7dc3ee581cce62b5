//! Persistence layer: runtime-checked sqlx queries over PostgreSQL.
//!
//! Multi-statement invariants (order transitions, review aggregates) run
//! inside explicit transactions; everything else is a single round trip.

pub mod orders;
pub mod products;
pub mod users;
