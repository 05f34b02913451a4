//! Shopping cart state owned by the storefront.
//!
//! # Architecture
//!
//! - [`CartStore`] owns the [`Cart`](quality_bearings_core::Cart) and is the
//!   only way to change it
//! - [`CartStorage`] is the durable slot the store hydrates from at startup
//!   and rewrites after every mutation
//! - Views read the store, and the header badge follows [`CartSummary`]
//!   updates
//!
//! The web server shares one store behind a mutex in `AppState` and keeps the
//! file slot locked while it runs. The CLI opens the slot only when no server
//! holds it.

mod storage;
mod store;

pub use storage::{CartStorage, JsonFileStorage, MemoryStorage, StorageError};
pub use store::{CartStore, CartSummary, Persistence};
