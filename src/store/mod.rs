//! Persisted work queue of content items.
//!
//! This module provides:
//! - The content item record and its outcome envelopes
//! - Wholesale JSON load/save of the item sequence
//! - Stable grouping of items by originating post

pub mod file;
pub mod group;
pub mod item;
pub mod outcome;
pub mod timestamp;

pub use file::ItemStore;
pub use group::{group_by_post, PostGroup};
pub use item::{Author, ContentItem, MediaKind};
pub use outcome::{BlockingCondition, DownloadOutcome, FailureKind, UploadOutcome};
