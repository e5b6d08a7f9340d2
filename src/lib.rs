//! Propulsa — the AI worker behind a proposal SaaS for educational-marketing
//! agencies.
//!
//! An uploaded program PDF moves through a two-stage extraction pipeline
//! (catalog scan, then deep extraction of one selected program) that writes
//! a structured briefing onto the document row; proposal generation turns a
//! briefing into block-based content, and chat-driven edits rewrite those
//! blocks in place. All coordination happens through the persistent store:
//! triggers acknowledge immediately and callers subscribe to row changes.

pub mod api;
pub mod config;
pub mod pipeline;
pub mod store;
