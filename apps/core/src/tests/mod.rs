//! Test Module
//!
//! Cross-module test suite for the analysis core.
//!
//! ## Test Categories
//! - `theme_tests`: keyword partition, cluster overlay, fallback behaviour
//! - `pipeline_tests`: end-to-end pipeline runs against mock classifiers

pub mod theme_tests;
