//! PhotoFE — the edit-history and state-synchronization core of a photo
//! editor.
//!
//! A [`session::SessionController`] orchestrates four collaborators:
//! a [`canvas::CanvasSurface`] (the drawing surface), a bounded
//! [`components::history::EditHistory`] of PNG-encoded snapshots, a
//! [`gateway::FilterGateway`] adapting raw RGBA buffers to the filter
//! collaborator, and a durable [`store::SnapshotStore`] that persists
//! snapshots across sessions.

pub mod canvas;
pub mod cli;
pub mod components;
pub mod error;
pub mod gateway;
pub mod logger;
pub mod ops;
pub mod session;
pub mod store;
