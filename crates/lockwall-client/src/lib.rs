//! HTTP client for the remote video generation service.
//!
//! Three concerns, all bounded in time:
//! - submitting a generation job (`POST /generateVideo`)
//! - polling its status until a terminal state or a wall-clock budget
//!   (`GET /status/{jobId}`)
//! - downloading and staging the produced asset with media-type validation

pub mod error;
pub mod fetch;
pub mod generate;

pub use error::{ClientError, ClientResult};
pub use fetch::AssetFetcher;
pub use generate::{GenerateClient, PollConfig, StatusResponse};
