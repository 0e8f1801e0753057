//! Backend integration
//!
//! HTTP contract client and resolution polling against the arena backend.

pub mod api;
pub mod poller;
