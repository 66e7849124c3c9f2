//! Data models for the OneView REST API.
//!
//! This module contains the untyped resource representation, the collection
//! envelope, the PATCH body, and typed views over task resources.

mod common;
mod task;

pub use common::*;
pub use task::*;
