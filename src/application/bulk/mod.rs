//! Asynchronous bulk pipeline: publisher, consumer, and the worker loop.

pub mod consumer;
pub mod publisher;
pub mod worker;

pub use consumer::BulkSyncConsumer;
pub use publisher::BulkPublisher;
pub use worker::BulkWorker;
