//! Core module - Contains the fundamental data structures and utilities
//!
//! This module provides:
//! - Search hit model (LineHit)
//! - Rendering of usage trees in different output formats
//! - Path normalization utilities
//! - Common utilities

pub mod model;
pub mod paths;
pub mod render;
pub mod util;
