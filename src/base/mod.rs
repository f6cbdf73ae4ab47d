//! Core components, types, and utilities for nebula-api.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - System prompts for triage.
//! - Domain records, request payloads and their validation.

pub mod config;
pub mod prompts;
pub mod types;
