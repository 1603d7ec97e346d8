//! Utility functions for code generation, URL processing, and request handling.
//!
//! - [`code_generator`] - Short code generation and custom slug validation
//! - [`url_normalizer`] - Long URL validation
//! - [`extract_domain`] - Hosting authority extraction from HTTP headers

pub mod code_generator;
pub mod extract_domain;
pub mod url_normalizer;
