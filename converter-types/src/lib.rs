//! # Converter Types
//!
//! Domain types and port traits for the currency conversion service.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (CurrencyCode, quotes, provider records)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain, provider, store and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    CacheEntry, ConversionResult, CurrencyCode, ProviderDescriptor, ProviderStatusRecord,
    RateHistoryRecord, RateQuote, RateSnapshot, RateSource, cache_key,
};
pub use dto::*;
pub use error::{AppError, ConversionError, DomainError, ProviderError, StoreError};
pub use ports::{ProviderStatusStore, RateCache, RateHistoryStore, RateProvider, RateRepository};
