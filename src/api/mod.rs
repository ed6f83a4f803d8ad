pub mod client;
pub mod models;

pub use client::{ApiError, GalleryClient, Result};
pub use models::ClientConfig;
