pub mod client;
pub mod error;
pub mod job;

pub use client::ApiClient;
pub use error::ApiError;
