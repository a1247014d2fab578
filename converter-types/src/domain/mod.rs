//! Domain models for the conversion service.

pub mod currency;
pub mod history;
pub mod provider;
pub mod rate;

pub use currency::CurrencyCode;
pub use history::RateHistoryRecord;
pub use provider::{ProviderDescriptor, ProviderStatusRecord};
pub use rate::{
    CacheEntry, ConversionResult, RateQuote, RateSnapshot, RateSource, cache_key,
};
