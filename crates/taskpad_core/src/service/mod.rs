//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate persisted stores into use-case level APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod id_generator;
pub mod task_service;
pub mod theme_service;
