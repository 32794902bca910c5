//! Fact-checking pipeline: classify free text, search the web for evidence,
//! and have a language model adjudicate the claim against that evidence.

pub mod checkpoint;
pub mod classify;
pub mod config;
pub mod error;
pub mod evidence;
pub mod llm;
pub mod pipeline;
pub mod retrieve;
pub mod runner;
pub mod schema;
pub mod search;
pub mod server;
pub mod types;
pub mod verification;

pub use error::{Error, Result};
pub use pipeline::{ClaimPipeline, PipelineSettings, Stage};
pub use runner::PipelineRunner;
pub use types::*;
