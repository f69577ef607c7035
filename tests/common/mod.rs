//! Common test utilities for passport-maps.
//!
//! This module provides shared utilities for the end-to-end tests.

pub mod assertions;
pub mod image_utils;
pub mod test_data;
