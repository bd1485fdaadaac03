//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Own the recompute-on-mutation contract for habit streaks.
//! - Keep UI/host layers decoupled from storage details.

pub mod habit_service;
pub mod journal_service;
pub mod vision_service;
