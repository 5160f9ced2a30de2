//! Usages module - What the tree groups and how it is classified
//!
//! Provides:
//! - Usage / UsageGroup / GroupingRule capabilities
//! - Read/write access classification
//! - Hit-to-usage conversion with target descriptors
//! - Source line usages and their grouping rules
//! - The search-to-tree pipeline

pub mod access;
pub mod convert;
pub mod find;
pub mod rules;
pub mod source;
pub mod usage;
