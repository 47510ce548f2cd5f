//! Infrastructure layer for Roost.
//!
//! Contains implementations of the ports defined in `roost-core`: SQLite
//! storage for chats, messages, users and access tokens, plus the
//! data-directory and `config.toml` loader.

pub mod config;
pub mod sqlite;
