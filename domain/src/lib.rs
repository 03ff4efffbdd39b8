//! Client-side controllers for transcript administration.
//!
//! Consumers of the `domain` crate do not need to depend on `entity` directly: the record
//! types are re-exported here.
pub use entity::{language, transcript_status, transcripts, Id};

pub mod creation;
pub mod editor;
pub mod error;
pub mod gateway;
pub mod generation;
pub mod store;
