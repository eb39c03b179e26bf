//! Gepetto - run plain-language task scripts against a reasoning agent
//!
//! A task is an ordered list of natural-language steps. Each step has its
//! `${NAME}` placeholders substituted from the configuration and is handed to
//! an agent session, which acts until it reports SUCCESS, FAILED or ERROR.
//! The first step that does not succeed stops the run.

pub mod agent;
pub mod config;
pub mod domain;
pub mod error;
pub mod id;
pub mod llm;
pub mod project;
pub mod report;
pub mod runner;
pub mod task;
pub mod variables;

pub use error::{GepettoError, Result};
