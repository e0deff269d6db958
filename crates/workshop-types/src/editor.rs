//! Editor view types

use serde::{Deserialize, Serialize};

/// Scroll offset of an open document, tracked independently of content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollPosition {
    pub top: f64,
    pub left: f64,
}
