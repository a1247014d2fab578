//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The conversion service depends on these traits, not concrete implementations.

mod cache;
mod provider;
mod store;

pub use cache::RateCache;
pub use provider::RateProvider;
pub use store::{ProviderStatusStore, RateHistoryStore, RateRepository};
