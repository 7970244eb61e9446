//! SCIM list filters compiled to parameterized SQL
//!
//! [`filter`] holds the compiler; [`core`] and the binary wrap it with
//! configuration, CLI parsing and logging.

mod app;
pub mod core;
pub mod filter;
