//! View state for the three dashboard pages.
//!
//! Each view is independent: it owns its own request tokens and shares no
//! mutable state with the others.

pub mod customers;
pub mod dashboard;
pub mod profile;
