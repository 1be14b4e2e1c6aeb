//! Gemini API client for Museboxd AI features
//!
//! Thin wrapper over the `generateContent` REST endpoint with connection
//! pooling and retry on transient failures.
//!
//! # Thread Safety
//!
//! `GeminiClient` is `Clone + Send + Sync` and shares one HTTP connection
//! pool between clones.
//!
//! # Example
//!
//! ```no_run
//! use museboxd_gemini_client::GeminiClient;
//! use museboxd_shared_config::GeminiConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GeminiConfig::default().with_api_key("your-api-key");
//! let client = GeminiClient::new(&config)?;
//!
//! let text = client.generate("Suggest three songs like Teardrop by Massive Attack").await?;
//! println!("{}", text);
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod models;

pub use client::GeminiClient;
pub use error::{GeminiError, GeminiResult};
pub use models::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
};
