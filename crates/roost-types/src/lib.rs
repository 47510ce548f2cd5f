//! Shared domain types for Roost.
//!
//! This crate contains the core domain types used across the Roost backend:
//! users as seen by the messaging layer, two-party chats, messages, server
//! configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod user;
