use serde::{Deserialize, Serialize};

/// A project that groups related tasks.
///
/// `completed` is derived from the member tasks and is recomputed by
/// [`super::TaskBoard`] after every change that can affect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default = "default_expanded")]
    pub expanded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        let id = uuid::Uuid::new_v4();
        Self {
            color: color_for(id.as_bytes()),
            id: id.to_string(),
            name: name.into(),
            expanded: true,
            folder_id: None,
            completed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub name: String,
    #[serde(default = "default_expanded")]
    pub expanded: bool,
}

impl Folder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            expanded: true,
        }
    }
}

fn default_expanded() -> bool {
    true
}

/// Pseudo-random hue with fixed saturation and lightness.
fn color_for(seed: &[u8]) -> String {
    let hue = u16::from_be_bytes([seed[0], seed[1]]) % 360;
    format!("hsl({hue}, 60%, 50%)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_project_is_expanded_and_open() {
        let p = Project::new("Thesis");
        assert!(p.expanded);
        assert!(!p.completed);
        assert!(p.color.starts_with("hsl("));
        assert!(p.color.ends_with(", 60%, 50%)"));
    }

    #[test]
    fn older_project_documents_load() {
        let p: Project =
            serde_json::from_str(r#"{"id":"1","name":"Home","color":"hsl(10, 60%, 50%)"}"#)
                .unwrap();
        assert!(p.expanded);
        assert!(p.folder_id.is_none());
        assert!(!p.completed);
    }
}
