//! aeoscope - Answer Engine Optimization auditor.
//!
//! Audits web pages and whole domains for how likely an AI answer engine
//! is to extract, cite, or reuse the content, producing a deterministic
//! 0-100 score with per-category breakdown and brand-level GEO readiness.

pub mod cli;
pub mod config;
pub mod domain;
pub mod extract;
pub mod fetch;
pub mod jobs;
pub mod llm;
pub mod models;
pub mod parse;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod server;
pub mod utils;
