use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Body of the email to reply to
    pub email_content: String,
    /// Desired tone of the reply, e.g. "formal" or "friendly"
    pub tone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_camel_case_fields() {
        let request: GenerationRequest =
            serde_json::from_str(r#"{"emailContent":"Hi","tone":"formal"}"#).unwrap();
        assert_eq!(request.email_content, "Hi");
        assert_eq!(request.tone.as_deref(), Some("formal"));
    }

    #[test]
    fn tone_is_optional() {
        let request: GenerationRequest =
            serde_json::from_str(r#"{"emailContent":"Hi"}"#).unwrap();
        assert!(request.tone.is_none());

        let request: GenerationRequest =
            serde_json::from_str(r#"{"emailContent":"Hi","tone":null}"#).unwrap();
        assert!(request.tone.is_none());
    }
}
