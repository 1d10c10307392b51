//! Default collaborator implementations.
//!
//! Enough to run the dispatcher without a host: stores for trigger
//! properties and a job catalog. Hosts replace them with adapters over
//! their own configuration and job registry.

pub mod file_property_store;
pub mod in_memory_catalog;
pub mod in_memory_property_store;

pub use file_property_store::FilePropertyStore;
pub use in_memory_catalog::InMemoryJobCatalog;
pub use in_memory_property_store::InMemoryPropertyStore;
