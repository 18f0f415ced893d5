#![warn(missing_docs)]

//! Arena match tracking: incremental sync of a player's Arena games from the Riot API
//! into a SQL store, and reconciliation of user-owned champion checklists with the
//! refreshed champion list.
//!
//! Storage and the Riot API are reached through the [`store::Store`] and
//! [`upstream::GameApi`] traits; `at_worker` provides the Cloudflare D1 and `riven`
//! implementations.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod identity;
pub mod memory;
pub mod model;
pub mod progress;
pub mod reference;
pub mod sequencer;
pub mod stats;
pub mod store;
pub mod sync;
pub mod upstream;
pub mod watermark;

pub use config::SyncConfig;
pub use error::{Error, Result};
pub use sync::{Reconciler, SyncOptions, SyncReport};
