//! Value types shared between the host and the dispatch core.
//!
//! Events and references are `Serialize + Deserialize` so a host can hand
//! them across a process or channel boundary unchanged.

pub mod event;
pub mod property;

pub use event::*;
pub use property::*;
