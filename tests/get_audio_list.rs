//! End-to-end tests for `GetAudioList` against an in-memory store that
//! records every query it is asked to run.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use foundaudio::{
    Config, Filter, GetAudioList, OrderBy, QueryFilters, RecordStore, Rows, SelectQuery,
    StoreConnector, StoreCredentials, StoreError, Tool, ToolContext, ToolError,
};

// =============================================================================
// TEST DOUBLES
// =============================================================================
type Response = Result<Rows, String>;

#[derive(Default)]
struct Recorder {
    connects: Mutex<Vec<StoreCredentials>>,
    queries: Mutex<Vec<SelectQuery>>,
    responses: Mutex<HashMap<String, Response>>,
}

struct RecordingStore(Arc<Recorder>);

#[async_trait]
impl RecordStore for RecordingStore {
    async fn execute(&self, query: &SelectQuery) -> Result<Rows, StoreError> {
        self.0.queries.lock().unwrap().push(query.clone());
        match self.0.responses.lock().unwrap().get(&query.table) {
            Some(Ok(rows)) => Ok(rows.clone()),
            Some(Err(message)) => Err(StoreError::Network(message.clone())),
            None => Ok(Some(vec![])),
        }
    }
}

struct RecordingConnector(Arc<Recorder>);

impl StoreConnector for RecordingConnector {
    fn connect(&self, credentials: &StoreCredentials) -> Result<Arc<dyn RecordStore>, StoreError> {
        self.0.connects.lock().unwrap().push(credentials.clone());
        Ok(Arc::new(RecordingStore(self.0.clone())))
    }
}

struct Harness {
    recorder: Arc<Recorder>,
    tool: GetAudioList,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(Config {
            store_url: "https://test.supabase.co".to_string(),
            ..Config::default()
        })
    }

    fn with_config(config: Config) -> Self {
        let recorder = Arc::new(Recorder::default());
        let tool = GetAudioList::new(&config, Arc::new(RecordingConnector(recorder.clone())));
        Self { recorder, tool }
    }

    fn respond(&self, table: &str, response: Response) {
        self.recorder
            .responses
            .lock()
            .unwrap()
            .insert(table.to_string(), response);
    }

    fn queries(&self) -> Vec<SelectQuery> {
        self.recorder.queries.lock().unwrap().clone()
    }

    fn connect_count(&self) -> usize {
        self.recorder.connects.lock().unwrap().len()
    }

    async fn run(&self, args: Value) -> Result<Value, ToolError> {
        self.tool.execute(args, &context()).await
    }
}

fn context() -> ToolContext {
    ToolContext::new().with_secret("SUPABASE_ANON_KEY", "test-secret-key")
}

fn row(id: &str, title: &str, genres: &[&str], created_at: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": format!("{} description", title),
        "duration": 180.5,
        "genres": genres,
        "user_id": "user123",
        "created_at": created_at,
        "updated_at": created_at,
    })
}

fn desc_created_at() -> Option<OrderBy> {
    Some(OrderBy {
        column: "created_at".to_string(),
        descending: true,
    })
}

// =============================================================================
// HAPPY PATHS
// =============================================================================
#[tokio::test]
async fn test_basic_listing_with_defaults() {
    let harness = Harness::new();
    harness.respond(
        "audio_files",
        Ok(Some(vec![
            row("2", "Newer Track", &["electronic"], "2024-01-02T00:00:00Z"),
            row("1", "Test Track", &["electronic"], "2024-01-01T00:00:00Z"),
        ])),
    );

    let result = harness.run(json!({})).await.unwrap();

    assert_eq!(result["count"], 2);
    assert_eq!(result["limit"], 20);
    assert_eq!(result["search"], Value::Null);
    assert_eq!(result["genre"], Value::Null);
    assert_eq!(result["username"], Value::Null);

    let files = result["audio_files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["title"], "Newer Track");
    assert_eq!(files[1]["genres"], json!(["electronic"]));
    assert_eq!(files[1]["updated_at"], "2024-01-01T00:00:00Z");
    assert_eq!(files[1]["duration"], 180.5);

    let queries = harness.queries();
    assert_eq!(queries.len(), 1);
    let query = &queries[0];
    assert_eq!(query.table, "audio_files");
    assert!(query.filters.is_empty());
    assert_eq!(query.order, desc_created_at());
    assert_eq!(query.limit, Some(20));
}

#[tokio::test]
async fn test_credentials_come_from_context_and_config() {
    let harness = Harness::new();
    harness.run(json!({})).await.unwrap();

    let connects = harness.recorder.connects.lock().unwrap();
    assert_eq!(connects.len(), 1);
    assert_eq!(connects[0].url, "https://test.supabase.co");
    assert_eq!(connects[0].api_key, "test-secret-key");
}

#[tokio::test]
async fn test_search_and_genre_filters() {
    let harness = Harness::new();
    harness.respond(
        "audio_files",
        Ok(Some(vec![row("456", "House Track", &["house"], "2024-01-02T00:00:00Z")])),
    );

    let result = harness
        .run(json!({"limit": 10, "search": "dance", "genre": "house"}))
        .await
        .unwrap();

    assert_eq!(result["count"], 1);
    assert_eq!(result["limit"], 10);
    assert_eq!(result["search"], "dance");
    assert_eq!(result["genre"], "house");
    assert_eq!(result["audio_files"][0]["title"], "House Track");

    let queries = harness.queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(
        queries[0].filters,
        vec![
            Filter::AnyContainsIgnoreCase {
                columns: vec!["title".to_string(), "description".to_string()],
                needle: "dance".to_string(),
            },
            Filter::ArrayContains {
                column: "genres".to_string(),
                values: vec!["house".to_string()],
            },
        ]
    );
    assert_eq!(queries[0].order, desc_created_at());
    assert_eq!(queries[0].limit, Some(10));
}

#[tokio::test]
async fn test_blank_search_applies_no_filter() {
    for search in ["", "   "] {
        let harness = Harness::new();
        let result = harness.run(json!({"search": search, "genre": "  "})).await.unwrap();

        assert_eq!(result["search"], Value::Null);
        assert_eq!(result["genre"], Value::Null);
        assert!(harness.queries()[0].filters.is_empty());
    }
}

#[tokio::test]
async fn test_null_arguments_use_defaults() {
    let harness = Harness::new();
    let result = harness
        .run(json!({"limit": null, "search": null, "genre": null, "username": null}))
        .await
        .unwrap();

    assert_eq!(result["limit"], 20);
    assert_eq!(harness.queries().len(), 1);
}

#[tokio::test]
async fn test_null_result_set_is_empty_envelope() {
    let harness = Harness::new();
    harness.respond("audio_files", Ok(None));

    let result = harness.run(json!({})).await.unwrap();

    assert_eq!(result["audio_files"], json!([]));
    assert_eq!(result["count"], 0);
}

#[tokio::test]
async fn test_url_is_derived_from_id() {
    for site in ["https://foundaudio.club", "http://localhost:5173"] {
        let harness = Harness::with_config(Config {
            site_url: site.to_string(),
            ..Config::default()
        });
        harness.respond(
            "audio_files",
            Ok(Some(vec![row("abc123", "Any", &[], "2024-01-01T00:00:00Z")])),
        );

        let result = harness.run(json!({})).await.unwrap();
        assert_eq!(result["audio_files"][0]["url"], format!("{}/audio/abc123", site));
    }
}

#[tokio::test]
async fn test_stored_url_column_is_ignored() {
    let harness = Harness::new();
    let mut stored = row("abc123", "Any", &[], "2024-01-01T00:00:00Z");
    stored["url"] = json!("https://elsewhere.example/abc123");
    harness.respond("audio_files", Ok(Some(vec![stored])));

    let result = harness.run(json!({})).await.unwrap();
    assert_eq!(result["audio_files"][0]["url"], "https://foundaudio.club/audio/abc123");
}

// =============================================================================
// USERNAME RESOLUTION
// =============================================================================
#[tokio::test]
async fn test_username_resolves_to_owner_filter() {
    let harness = Harness::new();
    harness.respond("profiles", Ok(Some(vec![json!({"id": "owner-42"})])));
    harness.respond(
        "audio_files",
        Ok(Some(vec![row("9", "Disco Inferno", &["disco"], "2024-03-01T00:00:00Z")])),
    );

    let result = harness.run(json!({"username": "discodude"})).await.unwrap();
    assert_eq!(result["username"], "discodude");
    assert_eq!(result["count"], 1);

    let queries = harness.queries();
    assert_eq!(queries.len(), 2);

    assert_eq!(queries[0].table, "profiles");
    assert_eq!(
        queries[0].filters,
        vec![Filter::Eq {
            column: "username".to_string(),
            value: "discodude".to_string(),
        }]
    );

    assert_eq!(queries[1].table, "audio_files");
    assert_eq!(
        queries[1].filters,
        vec![Filter::Eq {
            column: "user_id".to_string(),
            value: "owner-42".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_unknown_username_is_retryable() {
    for profiles in [Some(vec![]), None] {
        let harness = Harness::new();
        harness.respond("profiles", Ok(profiles));

        let err = harness.run(json!({"username": "nosuchuser"})).await.unwrap_err();

        assert!(err.is_retryable());
        assert!(err.to_string().contains("not found"));
        assert!(err.guidance().is_some());
        // the main query never runs
        assert_eq!(harness.queries().len(), 1);
    }
}

#[tokio::test]
async fn test_blank_username_is_retryable_before_connecting() {
    let harness = Harness::new();

    let err = harness.run(json!({"username": ""})).await.unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(harness.connect_count(), 0);
    assert!(harness.queries().is_empty());
}

#[tokio::test]
async fn test_profile_lookup_failure_is_fatal() {
    let harness = Harness::new();
    harness.respond("profiles", Err("connection reset".to_string()));

    let err = harness.run(json!({"username": "discodude"})).await.unwrap_err();

    assert!(!err.is_retryable());
    assert!(err.to_string().contains("connection reset"));
}

#[tokio::test]
async fn test_ambiguous_username_is_fatal() {
    let harness = Harness::new();
    harness.respond(
        "profiles",
        Ok(Some(vec![json!({"id": "a"}), json!({"id": "b"})])),
    );

    let err = harness.run(json!({"username": "twin"})).await.unwrap_err();
    assert!(matches!(err, ToolError::Execution { .. }));
}

#[tokio::test]
async fn test_profile_without_id_is_fatal() {
    for profile in [json!({"username": "discodude"}), json!({"id": 42}), json!({"id": null})] {
        let harness = Harness::new();
        harness.respond("profiles", Ok(Some(vec![profile])));

        let err = harness.run(json!({"username": "discodude"})).await.unwrap_err();
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("has no id"));
        // the main query never runs
        assert_eq!(harness.queries().len(), 1);
    }
}

// =============================================================================
// VALIDATION AND FAILURES
// =============================================================================
#[tokio::test]
async fn test_invalid_limit_is_retryable_before_connecting() {
    for limit in [0, 101, -5] {
        let harness = Harness::new();

        let err = harness.run(json!({"limit": limit})).await.unwrap_err();

        assert!(err.is_retryable(), "limit {} should be retryable", limit);
        assert!(err.to_string().contains("Invalid limit parameter"));
        assert_eq!(harness.connect_count(), 0);
    }
}

#[tokio::test]
async fn test_every_limit_in_range_is_accepted() {
    let harness = Harness::new();
    for limit in 1..=100 {
        harness.run(json!({"limit": limit})).await.unwrap();
    }
    let limits: Vec<Option<usize>> = harness.queries().iter().map(|q| q.limit).collect();
    assert_eq!(limits, (1..=100).map(Some).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_wrong_argument_type_is_retryable() {
    let harness = Harness::new();
    let err = harness.run(json!({"limit": "ten"})).await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(harness.connect_count(), 0);
}

#[tokio::test]
async fn test_missing_secret_is_fatal() {
    let harness = Harness::new();
    let contexts = [
        ToolContext::new(),
        ToolContext::new().with_secret("SUPABASE_ANON_KEY", ""),
    ];

    for ctx in contexts {
        for args in [json!({}), json!({"search": "jazz", "username": "discodude"})] {
            let err = harness.tool.execute(args, &ctx).await.unwrap_err();

            assert!(!err.is_retryable());
            let message = err.to_string();
            assert!(message.starts_with("Error in execution of GetAudioList"));
            assert!(message.contains("SUPABASE_ANON_KEY"));
        }
    }
    assert_eq!(harness.connect_count(), 0);
}

#[tokio::test]
async fn test_main_query_failure_is_fatal_and_keeps_message() {
    let harness = Harness::new();
    harness.respond("audio_files", Err("upstream unavailable".to_string()));

    let err = harness.run(json!({})).await.unwrap_err();

    assert!(!err.is_retryable());
    assert!(err.to_string().contains("upstream unavailable"));
}

#[tokio::test]
async fn test_row_missing_required_field_is_fatal() {
    let harness = Harness::new();
    let mut broken = row("1", "No Owner", &[], "2024-01-01T00:00:00Z");
    broken.as_object_mut().unwrap().remove("user_id");
    harness.respond("audio_files", Ok(Some(vec![broken])));

    let err = harness.run(json!({})).await.unwrap_err();

    assert!(!err.is_retryable());
    assert!(err.to_string().contains("user_id"));
}

#[tokio::test]
async fn test_list_with_typed_filters() {
    let harness = Harness::new();
    harness.respond(
        "audio_files",
        Ok(Some(vec![row("7", "Jazz Night", &["jazz"], "2024-02-01T00:00:00Z")])),
    );

    let filters = QueryFilters::new(Some(3), Some("jazz".to_string()), None, None).unwrap();
    let envelope = harness.tool.list(filters, &context()).await.unwrap();

    assert_eq!(envelope.count, 1);
    assert_eq!(envelope.limit, 3);
    assert_eq!(envelope.search.as_deref(), Some("jazz"));
    assert_eq!(envelope.audio_files[0].genres, vec!["jazz".to_string()]);
    assert_eq!(envelope.audio_files[0].user_id, "user123");
}

#[tokio::test]
async fn test_identical_requests_return_identical_envelopes() {
    let harness = Harness::new();
    harness.respond(
        "audio_files",
        Ok(Some(vec![row("1", "Loop", &["ambient"], "2024-01-01T00:00:00Z")])),
    );

    let first = harness.run(json!({"genre": "ambient"})).await.unwrap();
    let second = harness.run(json!({"genre": "ambient"})).await.unwrap();

    assert_eq!(first, second);
    let queries = harness.queries();
    assert_eq!(queries[0], queries[1]);
}
