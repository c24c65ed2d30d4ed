//! HTTP middleware.

pub mod timing;

pub use timing::log_requests;
