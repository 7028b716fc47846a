//! Catalog use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into presentation-ready results.
//! - Keep presentation layers decoupled from storage details.

pub mod catalog_service;
