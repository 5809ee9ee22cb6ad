//! Audience-targeted question generation over the current document.
//!
//! The model's reply is free text; [`parse_questions`] turns it into a
//! list on a best-effort basis. Lines that do not end in `?` are dropped,
//! so the result may be shorter than requested or empty.

use crate::document::DocumentContext;
use crate::llm::{ChatMessage, CompletionClient, LlmError};

pub const EXPERT_PERSONA: &str = "You are an expert at analyzing documents and generating relevant questions from different audience perspectives.";

#[derive(Debug, thiserror::Error)]
pub enum QuestionError {
    #[error("No PDF content available. Please upload a PDF first.")]
    NoDocument,
    #[error("Please provide an audience description.")]
    MissingAudience,
    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// User prompt asking for 5-7 questions `audience` would have about `document`.
pub fn build_prompt(audience: &str, document: &str) -> String {
    format!(
        "You are an expert at understanding different audiences and their needs.\n\
         Given the following document content and target audience, generate 5-7 important questions that this audience would likely have about the content.\n\
         Make the questions specific to both the content and the audience's perspective.\n\
         \n\
         Target Audience: {audience}\n\
         \n\
         Document Content:\n\
         {document}\n\
         \n\
         Generate specific, relevant questions that this audience would ask about this document."
    )
}

/// Splits a model reply into questions.
///
/// Blank lines are skipped, a leading `1)` / `1.` marker is stripped, and
/// only lines ending in `?` are kept.
pub fn parse_questions(reply: &str) -> Vec<String> {
    reply
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| strip_enumeration(line).trim())
        .filter(|line| line.ends_with('?'))
        .map(str::to_string)
        .collect()
}

/// Removes a `<digits><')' or '.'><whitespace>*` prefix, if present.
fn strip_enumeration(line: &str) -> &str {
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return line;
    }
    let rest = &line[digits..];
    match rest.strip_prefix(')').or_else(|| rest.strip_prefix('.')) {
        Some(after) => after.trim_start(),
        None => line,
    }
}

/// Generates questions about the current document for `audience`.
pub async fn generate_questions(
    client: &dyn CompletionClient,
    documents: &DocumentContext,
    audience: Option<&str>,
) -> Result<Vec<String>, QuestionError> {
    let doc = documents.current().ok_or(QuestionError::NoDocument)?;
    let audience = audience
        .filter(|a| !a.is_empty())
        .ok_or(QuestionError::MissingAudience)?;

    let messages = [
        ChatMessage::system(EXPERT_PERSONA),
        ChatMessage::user(build_prompt(audience, &doc.text)),
    ];
    let reply = client.complete(&messages).await?;
    let questions = parse_questions(&reply);
    tracing::debug!(count = questions.len(), "parsed generated questions");
    Ok(questions)
}
