use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickRequest {
    #[serde(default)]
    pub button_type: String,
}

/// Running total for one tracked call-to-action button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickCount {
    pub button_type: String,
    pub count: i64,
}
