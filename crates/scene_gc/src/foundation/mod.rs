//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the collector:
//! - Math types and pose comparisons
//! - Stable arena handles for nodes and components
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod logging;
