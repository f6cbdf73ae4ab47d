//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for various services used by nebula-api:
//! - Database services (e.g., SurrealDB)
//! - LLM services (e.g., OpenAI)
//! - Notification services (e.g., a scheduling webhook)
//! - The HTTP surface that exposes them
//!
//! Each client module defines both a generic trait and a concrete implementation,
//! allowing for extensibility and easy testing.

pub mod db;
pub mod http;
pub mod llm;
pub mod notify;
