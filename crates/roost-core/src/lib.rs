//! Business logic and repository trait definitions for Roost.
//!
//! This crate defines the "ports" (repository, directory and identity
//! traits) that the infrastructure layer implements, and the
//! `MessagingService` that orchestrates them. It depends only on
//! `roost-types` -- never on `roost-infra` or any database/IO crate.

pub mod repository;
pub mod service;
