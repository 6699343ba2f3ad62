//! SMS dispatch with provider fallback for vehicle-detection alerts.
//!
//! A domain layer of strong types (phone normalization, message text, results), a
//! transport layer for each vendor's wire format (Arkesel JSON, Twilio form), and a client
//! layer that picks a provider, falls back along the chain, and paces bulk sends.
//!
//! ```rust,no_run
//! use smsdispatch::{ProviderConfig, SmsDispatcher};
//!
//! #[tokio::main]
//! async fn main() {
//!     let dispatcher = SmsDispatcher::new(&ProviderConfig::from_env());
//!     println!("sending via {}", dispatcher.provider_name());
//!
//!     let result = dispatcher
//!         .send_sms("024 123 4567", "Vehicle GR-1234-20 detected at the gate")
//!         .await;
//!     println!("{result:?}");
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod domain;
mod transport;

pub use client::{
    DEFAULT_BULK_PACING, DEFAULT_SIMULATED_LATENCY, FailurePolicy, SmsDispatcher,
    SmsDispatcherBuilder, SmsError,
};
pub use config::{ArkeselCredentials, ProviderConfig, TwilioCredentials, select_provider};
pub use domain::{
    AccountSid, ApiKey, AuthToken, BulkSendResult, MessageText, NormalizedPhone,
    PhoneValidation, ProviderName, Region, SIMULATED_ID_PREFIX, SendResult, SenderId,
    ValidationError, is_valid, normalize, normalize_in,
};
