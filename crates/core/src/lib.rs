//! Fleet domain core.
//!
//! Pure types and rules shared by every other crate: the [`vehicle::Vehicle`]
//! record, the validation layer, change events, and the error taxonomy. This
//! crate performs no I/O.

pub mod change;
pub mod error;
pub mod seed;
pub mod types;
pub mod validation;
pub mod vehicle;
