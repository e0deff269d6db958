//! Artifact types — the actions grouped under one assistant turn

use serde::{Deserialize, Serialize};

/// Presentational state of one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSummary {
    /// The originating message identifier.
    pub id: String,
    pub title: String,
    pub closed: bool,
}

/// Partial patch for an artifact; fields left `None` keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed: Option<bool>,
}

impl ArtifactUpdate {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            closed: None,
        }
    }

    pub fn closed(closed: bool) -> Self {
        Self {
            title: None,
            closed: Some(closed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_skips_absent_fields() {
        let update = ArtifactUpdate::closed(true);
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"closed":true}"#);

        let parsed: ArtifactUpdate = serde_json::from_str(r#"{"title":"Todo App"}"#).unwrap();
        assert_eq!(parsed.title.as_deref(), Some("Todo App"));
        assert_eq!(parsed.closed, None);
    }
}
