//! Prompt Engine — keyword-driven random prompt generation.
//!
//! A keyword picks a pool of templates from a [`core::library::TemplateLibrary`];
//! one is drawn at random and every `?{keyword}` wildcard inside it is
//! expanded recursively. Failures never escape: a node that cannot expand
//! is replaced by its keyword in upper case.

pub mod core;

pub use crate::core::engine::{EngineConfig, EngineError, PromptEngine};
pub use crate::core::expander::{generate, generate_with, ExpansionLimits};
pub use crate::core::library::TemplateLibrary;
pub use crate::core::selector::Pool;
