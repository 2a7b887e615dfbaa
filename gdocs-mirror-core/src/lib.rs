#![doc = "gdocs-mirror-core: core logic library for gdocs-mirror."]

//! This crate contains the data model and the two halves of a mirror run:
//! reading a remote folder tree through the [`contract::DriveApi`] trait and
//! writing it to the local filesystem as markdown files.
//! HTTP transport and OAuth live in the `gdocs-mirror` crate.
//!
//! # Usage
//! Implement [`contract::DriveApi`] for a transport, then hand it to
//! [`synchronise::synchronise`] together with the configured roots.

pub mod config;
pub mod contract;
pub mod error;
pub mod model;
pub mod reader;
pub mod synchronise;
pub mod writer;

pub use error::{Result, SyncError};
