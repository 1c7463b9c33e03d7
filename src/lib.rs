//! Recroute - LLM recommendation proxy for parent-guided math tutoring
//!
//! This library routes tutoring-session requests to hosted LLM backends,
//! renders templated prompts from structured session data, and validates
//! model replies against a delimited three-recommendation format with a
//! retry-then-fallback policy.

pub mod catalog;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod normalize;
pub mod prompt;
pub mod router;
pub mod telemetry;
