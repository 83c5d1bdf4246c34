//! networth-terms library
//!
//! This module exposes the fetch, reshape and chart pipeline for use by the binary
//! and in integration tests.

pub mod app;
pub mod cache;
pub mod chart;
pub mod cli;
pub mod data;
pub mod reshape;
