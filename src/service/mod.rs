//! Service layer: relay orchestration.
//!
//! [`RelayService`] funnels every mutation of the relay topology through a
//! single lock and finishes each one with a full-state broadcast.

pub mod relay_service;

pub use relay_service::RelayService;
