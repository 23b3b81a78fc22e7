//! Optional text-generation clients.
//!
//! Two thin proxies: `analyze` submits a seven-day productivity digest
//! and gets back a short natural-language insight; `decompose` submits a
//! single task's text and gets back a checklist to append to its note.
//! Both are strictly best-effort enhancements - callers surface a
//! placeholder string on any failure and task data is never touched.

use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::stats::TaskSummary;

/// Gemini-style content-generation endpoint used by `analyze`.
const ANALYZE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent";

/// OpenAI-compatible chat endpoint used by `decompose`.
const DECOMPOSE_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

const ANALYZE_KEY_VAR: &str = "GEMINI_API_KEY";
const DECOMPOSE_KEY_VAR: &str = "GROQ_API_KEY";

const DECOMPOSE_MODEL: &str = "llama-3.3-70b-versatile";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shown to the user when an insight cannot be produced.
pub const INSIGHT_PLACEHOLDER: &str = "Unable to generate insight";

/// Shown to the user when a task cannot be decomposed.
pub const DECOMPOSE_PLACEHOLDER: &str = "Could not decompose task.";

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("{0} is not set")]
    NotConfigured(&'static str),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

pub struct InsightClient {
    client: Client,
    analyze_key: Option<String>,
    decompose_key: Option<String>,
}

impl InsightClient {
    pub fn from_env() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            analyze_key: std::env::var(ANALYZE_KEY_VAR).ok().filter(|k| !k.is_empty()),
            decompose_key: std::env::var(DECOMPOSE_KEY_VAR).ok().filter(|k| !k.is_empty()),
        })
    }

    /// Ask for 2-3 sentences of insight about the summarized week.
    pub async fn analyze(&self, summary: &TaskSummary) -> Result<String, InsightError> {
        let key = self
            .analyze_key
            .as_deref()
            .ok_or(InsightError::NotConfigured(ANALYZE_KEY_VAR))?;

        let prompt = analyze_prompt(summary);
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        debug!("requesting productivity insight");
        let response = self
            .client
            .post(format!("{}?key={}", ANALYZE_URL, key))
            .json(&body)
            .send()
            .await?;
        let response = check_response(response).await?;

        let parsed: GenerateContentResponse = response.json().await?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.is_empty());

        Ok(text.unwrap_or_else(|| INSIGHT_PLACEHOLDER.to_string()))
    }

    /// Break one task into a checklist of 5-7 sub-tasks.
    pub async fn decompose(&self, task_text: &str) -> Result<String, InsightError> {
        let key = self
            .decompose_key
            .as_deref()
            .ok_or(InsightError::NotConfigured(DECOMPOSE_KEY_VAR))?;

        let body = serde_json::json!({
            "model": DECOMPOSE_MODEL,
            "messages": [{ "role": "user", "content": decompose_prompt(task_text) }],
            "temperature": 0.5,
            "max_tokens": 200,
        });

        debug!("requesting task breakdown");
        let response = self
            .client
            .post(DECOMPOSE_URL)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?;
        let response = check_response(response).await?;

        let parsed: ChatCompletionResponse = response.json().await?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|t| !t.is_empty());

        Ok(text.unwrap_or_else(|| DECOMPOSE_PLACEHOLDER.to_string()))
    }
}

async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, InsightError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let preview: String = body.chars().take(200).collect();
        Err(InsightError::InvalidResponse(format!(
            "Status {}: {}",
            status, preview
        )))
    }
}

fn analyze_prompt(summary: &TaskSummary) -> String {
    let [high, medium, low] = &summary.priorities;
    format!(
        "Analyze this task completion data and provide 2-3 sentences of actionable insights. \
Be specific about patterns and recommendations.\n\n\
Last 7 Days Summary:\n\
- Total Tasks: {}\n\
- Completed: {}\n\
- Missed: {}\n\
- Completion Rate: {}%\n\n\
Priority Breakdown:\n\
- High Priority: {} created, {} done ({}%)\n\
- Medium Priority: {} created, {} done ({}%)\n\
- Low Priority: {} created, {} done ({}%)\n\n\
Daily Performance:\n{}\n\n\
Provide actionable, specific insights about productivity patterns and recommendations.",
        summary.total_tasks,
        summary.completed,
        summary.missed,
        summary.completion_rate,
        high.total,
        high.completed,
        high.completion_rate,
        medium.total,
        medium.completed,
        medium.completion_rate,
        low.total,
        low.completed,
        low.completion_rate,
        summary.daily_performance.join("\n"),
    )
}

fn decompose_prompt(task_text: &str) -> String {
    format!(
        "Break down the task \"{}\" into a checklist of 5-7 actionable, concise sub-tasks. \
Return ONLY the list items (starting with \"- \"), no introductory text, no numbering.",
        task_text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_response_extraction() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"Do more in the morning."}]}}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(json).expect("parse");
        let text = parsed.candidates[0].content.parts[0].text.clone();
        assert_eq!(text, "Do more in the morning.");
    }

    #[test]
    fn test_chat_response_extraction() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"- step one"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(json).expect("parse");
        assert_eq!(parsed.choices[0].message.content, "- step one");
    }

    #[test]
    fn test_empty_candidates_parse_cleanly() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").expect("parse");
        assert!(parsed.candidates.is_empty());
    }

    #[test]
    fn test_analyze_prompt_contains_summary_numbers() {
        let summary = TaskSummary {
            total_tasks: 9,
            completed: 6,
            missed: 3,
            completion_rate: 67,
            priorities: crate::stats::priority_stats(&[]),
            daily_performance: vec!["Mon (2024-03-04): 2/3 completed".to_string()],
        };
        let prompt = analyze_prompt(&summary);
        assert!(prompt.contains("Total Tasks: 9"));
        assert!(prompt.contains("Completion Rate: 67%"));
        assert!(prompt.contains("Mon (2024-03-04): 2/3 completed"));
    }

    #[test]
    fn test_decompose_prompt_embeds_task_text() {
        let prompt = decompose_prompt("clean the garage");
        assert!(prompt.contains("\"clean the garage\""));
        assert!(prompt.contains("5-7"));
    }
}
