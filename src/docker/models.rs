use serde_json::Value;

use crate::container::{self, ContainerDescriptor, ContainerID};

/// One entry of the `GET /containers/json` listing.
///
/// Only the fields needed here are decoded; everything else is ignored.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerSummary {
    pub id: String,
    pub image: String,
    #[serde(default)]
    pub names: Value,
}

impl ContainerSummary {
    /// # Errors
    ///
    /// Returns [`container::Error::InvalidContainerID`] if `Id` is not a usable id.
    pub fn into_descriptor(self) -> container::Result<ContainerDescriptor> {
        let id = ContainerID::new(&self.id)?;
        Ok(ContainerDescriptor::new(render_names(&self.names), id))
    }
}

/// Renders the `Names` field as text.
///
/// A string is kept verbatim. An array is rendered as a list literal,
/// `['/a', '/b']`. Other values use their compact JSON form.
pub fn render_names(names: &Value) -> String {
    match names {
        Value::String(name) => name.clone(),
        Value::Array(items) => {
            let items: Vec<String> = items
                .iter()
                .map(|item| match item {
                    Value::String(name) => format!("'{name}'"),
                    other => other.to_string(),
                })
                .collect();
            format!("[{}]", items.join(", "))
        }
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// One resource-usage snapshot, delivered as the runtime sent it.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    label: String,
    id: ContainerID,
    body: Value,
}

impl StatsSnapshot {
    pub fn new(label: impl Into<String>, id: ContainerID, body: Value) -> Self {
        Self {
            label: label.into(),
            id,
            body,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn id(&self) -> &ContainerID {
        &self.id
    }

    /// The uninterpreted stats document.
    pub fn body(&self) -> &Value {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_render_names() {
        let string = json!("['/nova_api']");
        assert_eq!(render_names(&string), "['/nova_api']");

        let single = json!(["/nova_api"]);
        assert_eq!(render_names(&single), "['/nova_api']");

        let pair = json!(["/nova_api", "/nova"]);
        assert_eq!(render_names(&pair), "['/nova_api', '/nova']");

        assert_eq!(render_names(&json!([])), "[]");
        assert_eq!(render_names(&Value::Null), "");
        assert_eq!(render_names(&json!(7)), "7");
    }

    #[test]
    fn test_summary_ignores_unknown_fields() {
        let raw = r#"{"Id":"abc123","Names":["/nova_api"],"Image":"kolla/nova","State":"running","Labels":{}}"#;
        let summary: ContainerSummary = serde_json::from_str(raw).unwrap();
        let descriptor = summary.into_descriptor().unwrap();
        assert_eq!(descriptor.name(), "['/nova_api']");
        assert_eq!(descriptor.id().as_str(), "abc123");
    }

    #[test]
    fn test_summary_without_names() {
        let summary: ContainerSummary =
            serde_json::from_str(r#"{"Id":"abc123","Image":"kolla/nova"}"#).unwrap();
        assert_eq!(summary.into_descriptor().unwrap().name(), "");
    }

    #[test]
    fn test_summary_with_invalid_id() {
        let summary: ContainerSummary =
            serde_json::from_str(r#"{"Id":"../../images","Image":"kolla/nova"}"#).unwrap();
        assert!(matches!(
            summary.into_descriptor(),
            Err(container::Error::InvalidContainerID(_))
        ));
    }
}
