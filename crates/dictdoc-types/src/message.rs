use serde::{Deserialize, Serialize};

/// Request sent from the overlay to the background save service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum HostMessage {
    #[serde(rename = "saveToGoogleDocs")]
    SaveToGoogleDocs { content: String, word: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveReceipt {
    pub success: bool,
    #[serde(rename = "docId")]
    pub doc_id: String,
}

/// Reply to a [`HostMessage`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<SaveReceipt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SaveResponse {
    pub fn saved(doc_id: impl Into<String>) -> Self {
        Self {
            success: true,
            result: Some(SaveReceipt {
                success: true,
                doc_id: doc_id.into(),
            }),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }

    pub fn into_result(self) -> Result<SaveReceipt, String> {
        match (self.success, self.result, self.error) {
            (true, Some(receipt), _) => Ok(receipt),
            (_, _, Some(error)) => Err(error),
            _ => Err("save service returned no result".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_save_request_wire_shape() {
        let message = HostMessage::SaveToGoogleDocs {
            content: "Word: test".to_string(),
            word: "test".to_string(),
        };
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(
            value,
            json!({ "action": "saveToGoogleDocs", "content": "Word: test", "word": "test" })
        );
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let parsed = serde_json::from_value::<HostMessage>(json!({
            "action": "deleteEverything",
            "content": "",
            "word": ""
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_success_response_shape() {
        let value = serde_json::to_value(SaveResponse::saved("doc-1")).unwrap();
        assert_eq!(
            value,
            json!({ "success": true, "result": { "success": true, "docId": "doc-1" } })
        );
    }

    #[test]
    fn test_failure_response_into_result() {
        let response: SaveResponse =
            serde_json::from_value(json!({ "success": false, "error": "boom" })).unwrap();
        assert_eq!(response.into_result(), Err("boom".to_string()));
    }
}
