//! Educational ATM simulator: card, biometric and PIN verification, withdrawals
//! and deposits under a fraud limit, an admin surface, and a JSON HTTP API.

pub mod api;
pub mod app;
pub mod config;
pub mod domain;
pub mod engine;
pub mod io;
pub mod prelude;
pub mod session;
pub mod storage;
