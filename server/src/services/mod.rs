//! Domain services used by the HTTP and websocket routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own validation, persistence, and fan-out so route handlers
//! stay focused on protocol translation and auth plumbing.

pub mod account;
pub mod chatbot;
pub mod memory;
pub mod message;
pub mod relay;
pub mod store;
pub mod token;
