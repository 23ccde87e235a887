//! Template lookup and materialization
//!
//! This module provides:
//! - Template sources (built-in set or a local directory)
//! - `$placeholder` rendering
//! - Skip-on-exists file materialization jobs

pub mod materializer;
pub mod source;

pub use materializer::{render, Materializer, TemplateJob};
pub use source::TemplateSource;
