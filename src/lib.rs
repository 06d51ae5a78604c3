pub mod config;
pub mod error;
pub mod message;
pub mod routes;
pub mod services;
pub mod state;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
