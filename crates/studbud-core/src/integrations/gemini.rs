//! Google Gemini `generateContent` client.
//!
//! The model is asked for a bare JSON array of sessions, but replies are
//! free text, so the first `[{ ... }]` span is cut out of the reply and
//! every entry is checked against the local subjects before use.

use std::sync::OnceLock;
use std::time::Duration;

use indoc::formatdoc;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::traits::{validate_remote_session, PlanGenerator, PlanOutcome, PlanRequest};
use crate::error::{CoreError, Result};
use crate::storage::GeneratorConfig;
use crate::study::Subject;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Session as the model writes it. Only the fields we trust are read.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteSession {
    subject: RemoteSubject,
    day: String,
    start_time: String,
    end_time: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RemoteSubject {
    Named(String),
    Object {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        name: Option<String>,
    },
}

pub struct GeminiGenerator {
    http_client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiGenerator {
    /// Generator against the public endpoint with the default model.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http_client: Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    /// Build from the `[generator]` config section.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CoreError::Custom(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: config.resolved_api_key(),
        })
    }

    /// Generator for the orchestrator, or `None` when it cannot be used.
    ///
    /// A missing key or a client that fails to build both leave the
    /// orchestrator on its allocator fallback instead of aborting.
    pub fn configured(config: &GeneratorConfig) -> Option<Self> {
        Self::usable(Self::from_config(config))
    }

    fn usable(built: Result<Self>) -> Option<Self> {
        match built {
            Ok(generator) if generator.has_api_key() => Some(generator),
            Ok(_) => {
                tracing::debug!("No Gemini API key configured");
                None
            }
            Err(e) => {
                tracing::warn!("Gemini generator unavailable: {}", e);
                None
            }
        }
    }

    /// Point at a different base URL (e.g. a local mock server).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn request_url(&self, api_key: &str) -> std::result::Result<Url, url::ParseError> {
        let base = format!(
            "{}/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        );
        Url::parse_with_params(&base, &[("key", api_key)])
    }

    async fn call(&self, prompt: &str) -> std::result::Result<String, PlanOutcome> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| PlanOutcome::NetworkFailure("no API key configured".to_string()))?;
        let url = self
            .request_url(api_key)
            .map_err(|e| PlanOutcome::NetworkFailure(format!("invalid endpoint: {e}")))?;

        let body = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
        };

        let resp = self
            .http_client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PlanOutcome::NetworkFailure(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(PlanOutcome::NetworkFailure(format!(
                "Gemini API error (HTTP {status}): {text}"
            )));
        }

        let data: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| PlanOutcome::ParseFailure(format!("unreadable response body: {e}")))?;

        data.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| PlanOutcome::ParseFailure("response has no candidate text".to_string()))
    }
}

impl PlanGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn request_plan(&self, request: &PlanRequest<'_>) -> PlanOutcome {
        let prompt = build_prompt(request);
        match self.call(&prompt).await {
            Ok(text) => parse_sessions(&text, request.subjects),
            Err(outcome) => outcome,
        }
    }
}

/// Natural-language prompt describing the goal, subjects and slots.
pub fn build_prompt(request: &PlanRequest<'_>) -> String {
    let goal = if request.goal_details.trim().is_empty() {
        request.goal.to_string()
    } else {
        format!("{} - {}", request.goal, request.goal_details.trim())
    };
    let subjects = request
        .subjects
        .iter()
        .map(|s| format!("- {} ({})", s.name, s.difficulty))
        .collect::<Vec<_>>()
        .join("\n");
    let slots = request
        .time_slots
        .iter()
        .map(|s| format!("- {}: {} to {}", s.day, s.start_time, s.end_time))
        .collect::<Vec<_>>()
        .join("\n");

    formatdoc! {r#"
        Generate an optimized study plan based on the following information:

        Study Goal: {goal}

        Subjects (with difficulty levels):
        {subjects}

        Available Time Slots:
        {slots}

        Create a detailed study schedule that:
        1. Allocates more time to difficult subjects
        2. Distributes subjects across available time slots
        3. Includes appropriate breaks
        4. Optimizes learning efficiency

        Return the response as a structured JSON array of study sessions with the following format:
        [
          {{
            "subject": {{"id": "subject-id", "name": "subject name", "difficulty": "difficulty level"}},
            "day": "day of week",
            "startTime": "HH:MM",
            "endTime": "HH:MM",
            "duration": minutes
          }}
        ]

        Only return the JSON array, no other text.
    "#}
}

fn json_array_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)\[\s*\{.*\}\s*\]").expect("static pattern compiles"))
}

/// First `[ { ... } ]` span in free text, spanning to the last closing `} ]`.
pub fn extract_json_array(text: &str) -> Option<&str> {
    json_array_pattern().find(text).map(|m| m.as_str())
}

/// Turn a model reply into sessions bound to the local subjects.
pub fn parse_sessions(text: &str, subjects: &[Subject]) -> PlanOutcome {
    let Some(array) = extract_json_array(text) else {
        // A bare "[]" carries no objects and is not matched above.
        if text.trim() == "[]" {
            return PlanOutcome::EmptyResult;
        }
        tracing::warn!("Could not find a JSON array in generator response");
        return PlanOutcome::ParseFailure("no JSON array in response".to_string());
    };

    let entries: Vec<serde_json::Value> = match serde_json::from_str(array) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Failed to parse generator response: {}", e);
            return PlanOutcome::ParseFailure(e.to_string());
        }
    };
    if entries.is_empty() {
        return PlanOutcome::EmptyResult;
    }

    let total = entries.len();
    let sessions: Vec<_> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let remote: RemoteSession = match serde_json::from_value(entry) {
                Ok(remote) => remote,
                Err(e) => {
                    tracing::warn!("Dropping generated session {}: {}", index, e);
                    return None;
                }
            };
            let (id, name) = match &remote.subject {
                RemoteSubject::Named(name) => (None, Some(name.as_str())),
                RemoteSubject::Object { id, name } => (id.as_deref(), name.as_deref()),
            };
            validate_remote_session(
                id,
                name,
                &remote.day,
                &remote.start_time,
                &remote.end_time,
                subjects,
            )
            .map_err(|reason| tracing::warn!("Dropping generated session {}: {}", index, reason))
            .ok()
        })
        .collect();

    tracing::info!("Accepted {} of {} generated sessions", sessions.len(), total);
    if sessions.is_empty() {
        PlanOutcome::EmptyResult
    } else {
        PlanOutcome::Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ClockTime, Day};
    use crate::study::{Difficulty, StudyGoal, TimeSlot};

    fn subjects() -> Vec<Subject> {
        vec![
            Subject {
                id: "subject-math".to_string(),
                name: "Math".to_string(),
                difficulty: Difficulty::Tough,
            },
            Subject {
                id: "subject-history".to_string(),
                name: "History".to_string(),
                difficulty: Difficulty::Easy,
            },
        ]
    }

    #[test]
    fn usable_requires_key_and_client() {
        assert!(GeminiGenerator::usable(Ok(GeminiGenerator::new(Some("k".to_string())))).is_some());
        assert!(GeminiGenerator::usable(Ok(GeminiGenerator::new(None))).is_none());
        let failed = Err(CoreError::Custom("failed to build HTTP client".to_string()));
        assert!(GeminiGenerator::usable(failed).is_none());
    }

    #[test]
    fn configured_with_key_yields_generator() {
        let config = GeneratorConfig {
            api_key: Some("from-config".to_string()),
            ..GeneratorConfig::default()
        };
        let generator = GeminiGenerator::configured(&config).unwrap();
        assert!(generator.has_api_key());
    }

    #[test]
    fn extracts_array_from_surrounding_prose() {
        let text = "Sure! Here is your plan:\n```json\n[\n  {\"a\": 1},\n  {\"b\": 2}\n]\n```\nGood luck!";
        assert_eq!(extract_json_array(text), Some("[\n  {\"a\": 1},\n  {\"b\": 2}\n]"));
        assert_eq!(extract_json_array("no json here"), None);
    }

    #[test]
    fn parse_accepts_valid_sessions_and_assigns_ids() {
        let text = r#"[
            {"id": "x", "subject": {"id": "subject-math", "name": "Math", "difficulty": "tough"},
             "day": "Monday", "startTime": "09:00", "endTime": "10:30", "duration": 999},
            {"subject": "history", "day": "Tuesday", "startTime": "18:00", "endTime": "18:45"}
        ]"#;

        let PlanOutcome::Ok(sessions) = parse_sessions(text, &subjects()) else {
            panic!("expected sessions");
        };
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].duration, 90);
        assert_ne!(sessions[0].id, "x");
        assert!(sessions[0].id.starts_with("session-"));
        assert_eq!(sessions[1].subject.id, "subject-history");
        assert_eq!(sessions[1].day, Day::Tuesday);
    }

    #[test]
    fn parse_drops_invalid_entries() {
        let text = r#"[
            {"subject": {"name": "Chemistry"}, "day": "Monday", "startTime": "09:00", "endTime": "10:00"},
            {"subject": {"name": "Math"}, "day": "Monday", "startTime": "11:00", "endTime": "10:00"},
            {"subject": {"name": "Math"}, "day": "Monday", "startTime": "12:00", "endTime": "13:00"}
        ]"#;

        let PlanOutcome::Ok(sessions) = parse_sessions(text, &subjects()) else {
            panic!("expected sessions");
        };
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].start_time, ClockTime::parse("12:00").unwrap());
    }

    #[test]
    fn parse_failure_modes() {
        assert!(matches!(
            parse_sessions("I cannot help with that.", &subjects()),
            PlanOutcome::ParseFailure(_)
        ));
        assert!(matches!(
            parse_sessions("[{\"subject\": }]", &subjects()),
            PlanOutcome::ParseFailure(_)
        ));
        assert_eq!(parse_sessions("[]", &subjects()), PlanOutcome::EmptyResult);
        assert_eq!(
            parse_sessions(
                r#"[{"subject": "Art", "day": "Monday", "startTime": "09:00", "endTime": "10:00"}]"#,
                &subjects()
            ),
            PlanOutcome::EmptyResult
        );
    }

    #[test]
    fn prompt_mentions_every_input() {
        let subjects = subjects();
        let slots = vec![TimeSlot::new(
            Day::Monday,
            ClockTime::parse("09:00").unwrap(),
            ClockTime::parse("11:00").unwrap(),
        )
        .unwrap()];
        let request = PlanRequest {
            goal: StudyGoal::Exam,
            goal_details: "Finals",
            subjects: &subjects,
            time_slots: &slots,
        };

        let prompt = build_prompt(&request);
        assert!(prompt.contains("Study Goal: exam - Finals"));
        assert!(prompt.contains("- Math (tough)"));
        assert!(prompt.contains("- History (easy)"));
        assert!(prompt.contains("- Monday: 09:00 to 11:00"));
        assert!(prompt.contains("Only return the JSON array"));
    }

    #[test]
    fn request_url_carries_key() {
        let generator = GeminiGenerator::new(Some("secret".to_string()))
            .with_endpoint("http://localhost:9999/models/");
        let url = generator.request_url("secret").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9999/models/gemini-2.0-flash:generateContent?key=secret"
        );
    }

    #[test]
    fn blank_key_counts_as_missing() {
        assert!(!GeminiGenerator::new(Some("  ".to_string())).has_api_key());
        assert!(GeminiGenerator::new(Some("k".to_string())).has_api_key());
    }
}
