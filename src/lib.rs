//! TDS Solver
//!
//! Answers graded-assignment questions over HTTP. An optional uploaded file
//! is unpacked and read; a CSV that already holds the answer short-circuits
//! the model, otherwise the question and file content go to a remote
//! completion endpoint and the reply is trimmed down to the answer.

pub mod config;
pub mod gateway;
pub mod intake;
pub mod llm;
pub mod solver;

pub use config::Config;
pub use solver::{Answer, AnswerSource, Solver};
