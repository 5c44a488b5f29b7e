//! Upload side of the relay.
//!
//! This module provides:
//! - The publisher seam
//! - Caption and link text building
//! - Staging of downloaded files with size checks
//! - The per-group upload state machine and batcher

pub mod caption;
pub mod publisher;
pub mod staging;
pub mod uploader;

pub use caption::{build_caption, build_link_text};
pub use publisher::{MessageId, Publisher};
pub use staging::StagedMedia;
pub use uploader::Uploader;
