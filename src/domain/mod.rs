//! Pure business rules, free of HTTP and database concerns.
//!
//! Everything here is deterministic and synchronous so the interesting
//! order/stock semantics can be tested without a running database; the
//! `db` layer only applies what these functions decide.

pub mod authz;
pub mod fulfillment;
pub mod ratings;

pub use authz::is_authorized;
pub use fulfillment::{plan_transition, StatusGroup, StockAdjustment, StockDirection, TransitionPlan};
pub use ratings::{recompute_aggregate, ReviewAggregate};
