pub mod engine;
pub mod expander;
pub mod library;
pub mod lint;
pub mod selector;
pub mod wildcard;
