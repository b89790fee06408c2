//! Relay for the chat assistant, wrapped in capped exponential backoff.

mod client;
mod retry;

pub use client::{AssistantClient, AssistantConfig};
pub use retry::RetryPolicy;
