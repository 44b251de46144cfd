//! HTTP surface for the mediashelf library service.

pub mod api;
pub mod metrics;
pub mod state;
