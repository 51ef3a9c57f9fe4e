//! # pollcast-core
//!
//! Poll state, results rendering, configuration, and the traits every
//! host platform and integration implements.

pub mod config;
pub mod error;
pub mod event;
pub mod marker;
pub mod poll;
pub mod report;
pub mod traits;
