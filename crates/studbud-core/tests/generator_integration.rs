//! Integration tests for the Gemini generator and AI fallback, against a mock HTTP server.

use mockito::{Matcher, Server};
use serde_json::json;
use studbud_core::storage::GeneratorConfig;
use studbud_core::{
    Allocator, AppState, ClockTime, Day, Difficulty, FallbackReason, GeminiGenerator,
    PlanGenerator, PlanOrchestrator, PlanOutcome, PlanRequest, PlanSource, StudyGoal, Subject,
    TimeSlot,
};

const PATH: &str = "/gemini-2.0-flash:generateContent";

fn gemini_body(text: &str) -> String {
    json!({
        "candidates": [
            { "content": { "parts": [ { "text": text } ], "role": "model" } }
        ]
    })
    .to_string()
}

fn state() -> AppState {
    let math = Subject {
        id: "subject-math".to_string(),
        name: "Math".to_string(),
        difficulty: Difficulty::Tough,
    };
    let history = Subject {
        id: "subject-history".to_string(),
        name: "History".to_string(),
        difficulty: Difficulty::Easy,
    };
    let slot = TimeSlot::new(
        Day::Monday,
        ClockTime::parse("09:00").unwrap(),
        ClockTime::parse("11:00").unwrap(),
    )
    .unwrap();
    AppState::default()
        .with_goal(StudyGoal::Exam)
        .with_goal_details("Finals")
        .add_subject(math)
        .unwrap()
        .add_subject(history)
        .unwrap()
        .add_time_slot(slot)
        .unwrap()
}

fn generator(server: &Server) -> GeminiGenerator {
    GeminiGenerator::new(Some("test-key".to_string())).with_endpoint(server.url())
}

fn request(state: &AppState) -> PlanRequest<'_> {
    PlanRequest {
        goal: state.goal,
        goal_details: &state.goal_details,
        subjects: &state.subjects,
        time_slots: &state.time_slots,
    }
}

#[tokio::test]
async fn test_generator_parses_sessions_from_prose() {
    let mut server = Server::new_async().await;
    let reply = r#"Here is an optimized plan:
[
  {"id": "ignored", "subject": {"id": "subject-math", "name": "Math", "difficulty": "tough"},
   "day": "Monday", "startTime": "09:00", "endTime": "10:15", "duration": 75},
  {"subject": {"name": "History"}, "day": "Monday", "startTime": "10:30", "endTime": "11:00", "duration": 30}
]
Let me know if you need changes."#;
    let mock = server
        .mock("POST", PATH)
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .match_body(Matcher::Regex("Math \\(tough\\)".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(gemini_body(reply))
        .create_async()
        .await;

    let state = state();
    let outcome = generator(&server).request_plan(&request(&state)).await;
    mock.assert_async().await;

    let PlanOutcome::Ok(sessions) = outcome else {
        panic!("expected sessions, got {outcome:?}");
    };
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].subject, state.subjects[0]);
    assert_eq!(sessions[0].duration, 75);
    assert_ne!(sessions[0].id, "ignored");
    assert_eq!(sessions[1].start_time.to_string(), "10:30");
}

#[tokio::test]
async fn test_generator_reports_http_errors_as_network_failure() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("overloaded")
        .create_async()
        .await;

    let state = state();
    let outcome = generator(&server).request_plan(&request(&state)).await;
    match outcome {
        PlanOutcome::NetworkFailure(msg) => assert!(msg.contains("503")),
        other => panic!("expected network failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_generator_without_key_makes_no_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let state = state();
    let generator = GeminiGenerator::new(None).with_endpoint(server.url());
    let outcome = generator.request_plan(&request(&state)).await;

    assert!(matches!(outcome, PlanOutcome::NetworkFailure(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_generator_reports_prose_only_reply_as_parse_failure() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(gemini_body("I'm sorry, I can't make a schedule right now."))
        .create_async()
        .await;

    let state = state();
    let outcome = generator(&server).request_plan(&request(&state)).await;
    assert!(matches!(outcome, PlanOutcome::ParseFailure(_)));
}

#[tokio::test]
async fn test_generator_reports_missing_candidates_as_parse_failure() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"candidates": []}"#)
        .create_async()
        .await;

    let state = state();
    let outcome = generator(&server).request_plan(&request(&state)).await;
    assert!(matches!(outcome, PlanOutcome::ParseFailure(_)));
}

#[tokio::test]
async fn test_orchestrator_uses_remote_plan() {
    let mut server = Server::new_async().await;
    let reply = r#"[{"subject": "Math", "day": "Monday", "startTime": "09:00", "endTime": "11:00"}]"#;
    let _mock = server
        .mock("POST", PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(gemini_body(reply))
        .create_async()
        .await;

    let orchestrator = PlanOrchestrator::new(Allocator::new(), Some(generator(&server)));
    let generation = orchestrator.generate_ai(&state()).await.unwrap();

    assert_eq!(generation.source, PlanSource::Ai);
    assert_eq!(generation.state.study_plan.len(), 1);
    assert_eq!(generation.state.study_plan[0].duration, 120);
    assert!(!orchestrator.is_busy());
}

#[tokio::test]
async fn test_orchestrator_falls_back_on_empty_array() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(gemini_body("[]"))
        .create_async()
        .await;

    let base = state();
    let orchestrator = PlanOrchestrator::new(Allocator::new(), Some(generator(&server)));
    let generation = orchestrator.generate_ai(&base).await.unwrap();

    assert_eq!(generation.source, PlanSource::Fallback(FallbackReason::EmptyResult));
    let windows: Vec<(String, String)> = generation
        .state
        .study_plan
        .iter()
        .map(|s| (s.start_time.to_string(), s.end_time.to_string()))
        .collect();
    assert_eq!(
        windows,
        vec![
            ("09:00".to_string(), "10:40".to_string()),
            ("10:40".to_string(), "11:00".to_string()),
        ]
    );
    assert_eq!(generation.state.subjects, base.subjects);
}

#[tokio::test]
async fn test_orchestrator_falls_back_when_server_unreachable() {
    let server = Server::new_async().await;
    let url = server.url();
    drop(server);

    let config = GeneratorConfig {
        endpoint: url,
        api_key: Some("test-key".to_string()),
        timeout_secs: 2,
        ..GeneratorConfig::default()
    };
    let orchestrator = PlanOrchestrator::new(
        Allocator::new(),
        Some(GeminiGenerator::from_config(&config).unwrap()),
    );
    let generation = orchestrator.generate_ai(&state()).await.unwrap();

    assert!(matches!(
        generation.source,
        PlanSource::Fallback(FallbackReason::NetworkFailure(_))
    ));
    assert_eq!(generation.state.study_plan.len(), 2);
}
