//! # UlazAI SDK for Rust
//!
//! Async client for the [UlazAI](https://ulazai.com) image and video
//! generation API. Discover models, start generations, poll them until they
//! finish, and browse your history.
//!
//! Responses are returned as [`serde_json::Value`]: the API's payload shapes
//! vary between endpoints and models, so the SDK only reads the handful of
//! fields it needs for polling.
//!
//! ## Quick start
//!
//! ```no_run
//! use ulazai::{Client, ImageRequest};
//!
//! #[tokio::main]
//! async fn main() -> ulazai::Result<()> {
//!     let client = Client::new("ulz_live_your_api_key")?;
//!
//!     let created = client
//!         .generate_image(
//!             &ImageRequest::new("a lighthouse at dusk", "nano-banana-pro")
//!                 .size("16:9")
//!                 .google_search(true),
//!         )
//!         .await?;
//!
//!     let id = created["generation_id"].as_str().unwrap_or_default();
//!     let done = client.wait_for_image(id, None).await?;
//!     println!("status: {}", ulazai::image_status(&done));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Builder pattern
//!
//! ```no_run
//! use ulazai::ClientBuilder;
//! use std::time::Duration;
//!
//! # fn example() -> ulazai::Result<()> {
//! let shared = reqwest::Client::new();
//! let client = ClientBuilder::new()
//!     .api_key("ulz_live_your_api_key")
//!     .base_url("https://ulazai.com")
//!     .timeout(Duration::from_secs(60))
//!     .http_client(shared.clone())
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod client;
mod errors;
mod models;
mod poll;

pub use client::{Client, ClientBuilder};
pub use errors::{Result, UlazAiError};
pub use models::{
    image_status, is_terminal_status, video_status, ImageRequest, VideoRequest, WaitOptions,
    TERMINAL_STATUSES,
};
