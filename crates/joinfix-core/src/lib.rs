//! Core types and the repair engine for unidirectional join tables.
//!
//! This crate is deliberately free of database dependencies. Storage
//! backends implement [`store::RelationalStore`]; the engine in [`repair`]
//! drives any [`cleaner::Cleaner`] over every unidirectional relation the
//! [`schema::Schema`] declares.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod cleaner;
pub mod error;
pub mod metadata;
pub mod owner;
pub mod policy;
pub mod repair;
pub mod schema;
pub mod store;

pub use error::{Error, Result};
