use crate::{
    client::{GeminiClient, RemoteCallError, response},
    dto::GenerationRequest,
};

const INSTRUCTION: &str = "Generate a professional email reply for the following email content. \
                           Please don't generate a subject line.";

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Server error: {0}")]
    Remote(#[from] RemoteCallError),

    #[error("Error processing request:{0}")]
    Parse(#[from] response::ResponseParseError),
}

pub fn build_prompt(request: &GenerationRequest) -> String {
    let mut prompt = String::from(INSTRUCTION);

    if let Some(tone) = request
        .tone
        .as_deref()
        .map(str::trim)
        .filter(|tone| !tone.is_empty())
    {
        prompt.push_str(" Use a ");
        prompt.push_str(tone);
        prompt.push_str(" tone.");
    }

    prompt.push_str("\nOriginal email:\n");
    prompt.push_str(&request.email_content);
    prompt
}

#[derive(Clone)]
pub struct ReplyService {
    client: GeminiClient,
}

impl ReplyService {
    pub const fn new(client: GeminiClient) -> Self {
        Self { client }
    }

    pub async fn try_generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<String, GenerationError> {
        let prompt = build_prompt(request);
        let raw = self.client.invoke(&prompt).await?;
        Ok(response::extract_text(&raw)?)
    }

    /// Never fails: errors come back as their message text, indistinguishable
    /// from a reply without inspecting the string.
    pub async fn generate(&self, request: &GenerationRequest) -> String {
        let prompt = build_prompt(request);
        match self.client.invoke(&prompt).await {
            Ok(raw) => response::extract_text_or_message(&raw),
            Err(e) => {
                tracing::warn!("Gemini API call failed: {e}");
                GenerationError::Remote(e).to_string()
            }
        }
    }
}
