//! Chat gateway: relays a user message to the completion API, with the
//! current document as system context when one is loaded.

use crate::document::DocumentContext;
use crate::llm::{ChatMessage, CompletionClient, LlmError};

pub const ASSISTANT_PERSONA: &str = "You are a helpful assistant.";

/// System prompt for a chat turn, embedding `document` verbatim if present.
pub fn system_prompt(document: Option<&str>) -> String {
    match document {
        Some(text) if !text.is_empty() => format!(
            "{ASSISTANT_PERSONA} You have access to the following document content: \n\n{text}\n\nPlease use this content to help answer questions when relevant."
        ),
        _ => ASSISTANT_PERSONA.to_string(),
    }
}

/// Sends one system + user exchange and returns the reply.
pub async fn ask(
    client: &dyn CompletionClient,
    documents: &DocumentContext,
    message: &str,
) -> Result<String, LlmError> {
    let doc = documents.current();
    let messages = [
        ChatMessage::system(system_prompt(doc.as_deref().map(|d| d.text.as_str()))),
        ChatMessage::user(message),
    ];
    tracing::debug!(
        model = client.model_name(),
        with_document = doc.is_some(),
        "sending chat request"
    );
    client.complete(&messages).await
}
