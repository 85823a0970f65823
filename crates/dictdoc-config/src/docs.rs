use serde::{Deserialize, Serialize};

fn default_drive_url() -> String {
    "https://www.googleapis.com/drive/v3".to_string()
}

fn default_docs_url() -> String {
    "https://docs.googleapis.com/v1".to_string()
}

fn default_document_name() -> String {
    "My Dictionary".to_string()
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DocsConfig {
    /// File search lives on the Drive API
    #[serde(default = "default_drive_url")]
    pub drive_url: String,
    #[serde(default = "default_docs_url")]
    pub docs_url: String,
    /// Title of the document every save is appended to
    #[serde(default = "default_document_name")]
    pub document_name: String,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            drive_url: default_drive_url(),
            docs_url: default_docs_url(),
            document_name: default_document_name(),
        }
    }
}

impl DocsConfig {
    pub(crate) fn apply_env(&mut self) {
        if let Some(url) = crate::env_string("DICTDOC_DRIVE_URL") {
            self.drive_url = url;
        }
        if let Some(url) = crate::env_string("DICTDOC_DOCS_URL") {
            self.docs_url = url;
        }
        if let Some(name) = crate::env_string("DICTDOC_DOCUMENT_NAME") {
            self.document_name = name;
        }
    }
}
