//! Payment gateway implementations
//!
//! Concrete implementations of the PaymentGateway trait.

pub mod http;

pub use http::HttpGateway;
