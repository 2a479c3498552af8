//! Payment orchestration and verification
//!
//! This module normalizes payment requests, routes them to the hosted
//! checkout (Chapa) or to one of the inline mobile-money channels
//! (telebirr, M-Pesa, CBE Birr, E-Birr), and confirms the result.

pub mod providers;
pub mod reference;
pub mod router;
pub mod settlement;
pub mod traits;
pub mod types;
pub mod validation;
pub mod verification;
