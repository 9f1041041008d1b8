pub mod auth;
pub mod client;
pub mod error;
pub mod models;

pub use client::{ApiClient, Auth};
pub use error::ApiError;
