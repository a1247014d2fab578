//! # Converter Hex
//!
//! Application service layer and HTTP adapter for the currency converter.
//!
//! ## Architecture
//!
//! - `service` - Conversion orchestrator (cache, providers, fallback)
//! - `inbound/` - HTTP adapter (Axum server)
//! - `openapi` - Generated API description
//!
//! The service is generic over `R: RateRepository`, allowing
//! different store implementations to be injected.

pub mod inbound;
pub mod openapi;
pub mod service;


pub use service::{ConversionService, SideEffect};
