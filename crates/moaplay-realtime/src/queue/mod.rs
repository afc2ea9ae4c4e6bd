//! Per-user delivery queues.

pub mod delivery_queue;
pub mod registry;

pub use delivery_queue::DeliveryQueue;
pub use registry::{DeliveryQueueRegistry, RegistryStats};
