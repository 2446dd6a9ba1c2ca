//! Infrastructure: persistence, configuration, transport, and observability.

pub mod api_client;
pub mod cache_store;
pub mod config;
pub mod database_connection;
pub mod logging;
pub mod memory;
pub mod queue_store;
pub mod work_queue;
