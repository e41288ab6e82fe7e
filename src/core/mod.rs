//! Core quotation logic, independent of the terminal

pub mod clipboard;
pub mod config;
pub mod debounce;
pub mod log;
pub mod poller;
pub mod quotation;
pub mod quote;
pub mod spread;
pub mod url_state;

// Re-export main types for cleaner imports
pub use quotation::{Quotation, QuotationState};
pub use quote::{Quote, QuoteProvider};
