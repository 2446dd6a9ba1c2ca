//! Application services: the engine's use cases.

pub mod benchmark;
pub mod bulk;
pub mod cache_service;
pub mod queue_builder;
pub mod status;
pub mod sync;
