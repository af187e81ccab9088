//! Command implementations

pub mod lint;
