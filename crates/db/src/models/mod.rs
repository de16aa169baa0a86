//! Database row types.

pub mod vehicle;
