//! Failure classification and outward alerts.
//!
//! This module provides:
//! - The alert channel seam and its Lark webhook implementation
//! - Classification of publish errors into stored failure kinds
//! - The notifier gate that keeps terminal-condition alerts to one per item

pub mod channel;
pub mod classify;
pub mod gate;
pub mod lark;

pub use channel::{AlertChannel, DisabledAlerts};
pub use classify::classify;
pub use gate::NotifierGate;
pub use lark::LarkNotifier;
