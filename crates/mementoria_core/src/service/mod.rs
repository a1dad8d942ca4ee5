//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate library store calls into editing use-cases.
//! - Keep clients decoupled from storage details.

pub mod editor_service;
pub mod media_registry;
