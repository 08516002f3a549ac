//! Core business logic - framework-agnostic budgeting operations.
//!
//! Everything in here takes an explicit `owner_id` and a database handle;
//! there is no ambient session state. The calculator and reconciler are pure
//! reads over the ledger, the pocket module owns the template/instance
//! lifecycle, and the rollover engine is the only writer of instances.

/// Derived balance calculation for pocket instances
pub mod calculator;
/// Ledger append/remove operations
pub mod ledger;
/// `YYYY-MM` parsing and month-boundary arithmetic
pub mod month;
/// Pocket template/instance lifecycle and queries
pub mod pocket;
/// Credit card balance reconciliation from the ledger
pub mod reconciler;
/// Scheduled monthly rollover batch
pub mod rollover;
