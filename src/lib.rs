//! usage-tree - incremental grouping of search usages
//!
//! The [`tree`] module holds the grouping tree itself. [`usages`] supplies the
//! usages it groups (source lines with read/write classification) and the
//! rules that group them, and [`backends`] produces the hits they are built
//! from.

pub mod backends;
pub mod core;
pub mod error;
pub mod tree;
pub mod usages;
