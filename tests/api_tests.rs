// tests/api_tests.rs

use std::{fs, path::Path, sync::Arc};

use async_trait::async_trait;

use forum::{
    config::Config,
    error::AppError,
    models::{forum::ForumConfig, session::SessionState, template::QuestionTemplate},
    routes,
    state::AppState,
    storage::{
        results::JsonDirSink,
        sessions::{MemorySessionStore, SessionStore},
    },
    survey::inventory::AudioInventory,
};
use serde_json::{Value, json};
use tempfile::TempDir;
use uuid::Uuid;

struct TestApp {
    address: String,
    audio_dir: TempDir,
    results_dir: TempDir,
    client: reqwest::Client,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    async fn register(&self) -> String {
        let resp: Value = self
            .client
            .post(self.url("/api/participant"))
            .json(&json!({ "age": "30", "hearing": "normal" }))
            .send()
            .await
            .expect("Register failed")
            .json()
            .await
            .expect("Failed to parse participant json");
        resp["token"].as_str().expect("Token not found").to_string()
    }

    fn result_files(&self) -> Vec<std::path::PathBuf> {
        forum::storage::results::list_result_files(self.results_dir.path()).unwrap()
    }
}

fn write_audio(root: &Path, subfolder: &str, names: &[&str]) {
    let dir = root.join(subfolder);
    fs::create_dir_all(&dir).unwrap();
    for name in names {
        fs::write(dir.join(name), b"ID3").unwrap();
    }
}

fn test_config() -> Config {
    Config {
        forum_config: "unused.json".into(),
        results_dir: "unused".into(),
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        session_ttl: 600,
        bind_addr: "127.0.0.1:0".to_string(),
        cors_origins: vec!["http://localhost:3000".to_string()],
        rust_log: "error".to_string(),
        log_dir: "logs".to_string(),
    }
}

fn templates() -> Vec<QuestionTemplate> {
    serde_json::from_value(json!([
        {
            "id": "q1",
            "title": "Vocoder comparison",
            "audioSubfolder": "set1",
            "models": ["gt", "methodA", "methodB"],
            "metrics": [{ "name": "quality", "description": "Overall quality" }],
            "nToPresent": 5
        },
        {
            "id": "q2",
            "audioSubfolder": "set2",
            "models": ["x"],
            "nToPresent": 1
        }
    ]))
    .unwrap()
}

/// Session store whose `clear` always fails.
struct StickySessionStore(MemorySessionStore);

#[async_trait]
impl SessionStore for StickySessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<SessionState>, AppError> {
        self.0.load(id).await
    }

    async fn save(&self, id: Uuid, state: &SessionState) -> Result<(), AppError> {
        self.0.save(id, state).await
    }

    async fn clear(&self, _id: Uuid) -> Result<(), AppError> {
        Err(AppError::InternalServerError("database is locked".to_string()))
    }

    async fn purge_older_than(&self, cutoff: i64) -> Result<u64, AppError> {
        self.0.purge_older_than(cutoff).await
    }
}

/// Spawns the app on a random port with an in-memory session store.
async fn spawn_app_with(questions: Vec<QuestionTemplate>, results_subdir: Option<&str>) -> TestApp {
    spawn_app_with_store(questions, results_subdir, Arc::new(MemorySessionStore::new())).await
}

async fn spawn_app_with_store(
    questions: Vec<QuestionTemplate>,
    results_subdir: Option<&str>,
    sessions: Arc<dyn SessionStore>,
) -> TestApp {
    let audio_dir = tempfile::tempdir().unwrap();
    write_audio(
        audio_dir.path(),
        "set1",
        &[
            "001_prompt.mp3",
            "001_gt.mp3",
            "001_methodA.mp3",
            "001_methodB.mp3",
            "002_prompt.mp3",
            "002_gt.mp3",
            "002_methodA.mp3",
        ],
    );
    write_audio(
        audio_dir.path(),
        "set2",
        &["a_prompt.mp3", "a_x.mp3", "b_prompt.mp3", "b_x.mp3", "c_prompt.mp3", "c_x.mp3"],
    );

    let results_dir = tempfile::tempdir().unwrap();
    let sink_dir = match results_subdir {
        Some(sub) => results_dir.path().join(sub),
        None => results_dir.path().to_path_buf(),
    };

    let forum = ForumConfig {
        participant_fields: serde_json::from_value(json!([
            { "key": "age", "label": "Age", "required": true },
            { "key": "hearing", "label": "Hearing" }
        ]))
        .unwrap(),
        audio_root: audio_dir.path().to_path_buf(),
        questions,
        ..ForumConfig::default()
    };

    let state = AppState {
        config: test_config(),
        inventory: Arc::new(AudioInventory::scan(&forum.audio_root)),
        forum: Arc::new(forum),
        sessions,
        results: Arc::new(JsonDirSink::new(sink_dir)),
    };

    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        audio_dir,
        results_dir,
        client: reqwest::Client::new(),
    }
}

async fn spawn_app() -> TestApp {
    spawn_app_with(templates(), None).await
}

#[tokio::test]
async fn health_check_404() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/random_path_that_does_not_exist"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn forum_info_and_heartbeat() {
    let app = spawn_app().await;

    let info: Value = app
        .client
        .get(app.url("/api/forum"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(info["branding"]["title"], "Listening Survey");
    assert_eq!(info["participant_fields"][0]["key"], "age");
    assert_eq!(info["templates"], 2);

    let beat: Value = app
        .client
        .get(app.url("/api/heartbeat"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(beat["timestamp"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn participant_requires_configured_fields() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api/participant"))
        .json(&json!({ "hearing": "normal" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("Age"));
}

#[tokio::test]
async fn session_routes_require_token() {
    let app = spawn_app().await;

    let no_token = app
        .client
        .post(app.url("/api/save"))
        .json(&json!({ "originalQuestionId": "q1", "questionIndex": 0, "answers": {} }))
        .send()
        .await
        .unwrap();
    assert_eq!(no_token.status().as_u16(), 401);

    let bad_token = app
        .client
        .post(app.url("/api/session/begin"))
        .header("Authorization", "Bearer not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(bad_token.status().as_u16(), 401);
}

#[tokio::test]
async fn test_full_listening_flow() {
    let app = spawn_app().await;
    let token = app.register().await;
    let auth = format!("Bearer {}", token);

    // 1. Questions are not available before the test begins
    let early = app
        .client
        .get(app.url("/api/questions/0"))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();
    assert_eq!(early.status().as_u16(), 409);

    // 2. Begin: q1 has one valid prompt (002 lacks methodB), q2 samples one
    let begin: Value = app
        .client
        .post(app.url("/api/session/begin"))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(begin["total_questions"], 2);

    let first_view: Value = app
        .client
        .get(app.url("/api/questions/0"))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // 3. Begin again: same sequence, no re-randomization
    let again: Value = app
        .client
        .post(app.url("/api/session/begin"))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(again["total_questions"], 2);

    let second_view: Value = app
        .client
        .get(app.url("/api/questions/0"))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first_view["question"], second_view["question"]);
    assert_eq!(first_view["is_last"], false);
    assert!(first_view["audio"]["prompt"].as_str().unwrap().starts_with("/audio/"));

    // 4. Audio referenced by the question is served
    let prompt_url = first_view["audio"]["prompt"].as_str().unwrap();
    let audio = app.client.get(app.url(prompt_url)).send().await.unwrap();
    assert_eq!(audio.status().as_u16(), 200);

    let out_of_range = app
        .client
        .get(app.url("/api/questions/2"))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();
    assert_eq!(out_of_range.status().as_u16(), 404);

    // 5. Save only index 0; a missing index is rejected
    let template_id = first_view["question"]["original_template_id"].as_str().unwrap();
    let missing = app
        .client
        .post(app.url("/api/save"))
        .header("Authorization", &auth)
        .json(&json!({ "originalQuestionId": template_id, "answers": { "gt_quality": 4 } }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 400);

    for rating in [2, 4] {
        let saved = app
            .client
            .post(app.url("/api/save"))
            .header("Authorization", &auth)
            .json(&json!({
                "originalQuestionId": template_id,
                "questionIndex": 0,
                "answers": { "gt_quality": rating },
                "timeSpent": 12.5
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(saved.status().as_u16(), 200);
    }

    let status: Value = app
        .client
        .get(app.url("/api/session"))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["phase"], "assembled");
    assert_eq!(status["answered"], json!([0]));

    // 6. Finish writes one record with every presented index
    let finish: Value = app
        .client
        .post(app.url("/api/finish"))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(finish["success"], true);

    let files = app.result_files();
    assert_eq!(files.len(), 1);
    assert_eq!(
        files[0].file_name().unwrap().to_str().unwrap(),
        finish["resultFile"].as_str().unwrap()
    );

    let record: Value = serde_json::from_str(&fs::read_to_string(&files[0]).unwrap()).unwrap();
    assert_eq!(record["participant"]["age"], "30");
    assert_eq!(record["answers"].as_object().unwrap().len(), 2);
    assert_eq!(record["answers"]["0"]["metrics_rated"]["gt_quality"], 4.0);
    assert_eq!(record["answers"]["0"]["time_spent_on_question"], 12.5);
    assert!(record["answers"]["1"]["metrics_rated"].is_null());
    assert!(record["uuid"].is_string());

    // 7. Session is gone after finishing
    let after = app
        .client
        .get(app.url("/api/session"))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();
    assert_eq!(after.status().as_u16(), 401);

    assert!(app.audio_dir.path().exists());
}

#[tokio::test]
async fn begin_fails_when_no_question_can_be_built() {
    let questions: Vec<QuestionTemplate> = serde_json::from_value(json!([
        { "id": "q1", "audioSubfolder": "missing", "models": ["gt"], "nToPresent": 3 },
        { "id": "q2", "audioSubfolder": "set1", "models": ["methodZ"], "nToPresent": 3 }
    ]))
    .unwrap();
    let app = spawn_app_with(questions, None).await;
    let token = app.register().await;

    let response = app
        .client
        .post(app.url("/api/session/begin"))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 503);

    let status: Value = app
        .client
        .get(app.url("/api/session"))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["phase"], "uninitialized");
}

#[tokio::test]
async fn persistence_failure_keeps_session() {
    // The sink directory sits under a regular file, so it can never be created.
    let app = spawn_app_with(templates(), Some("blocker/results")).await;
    fs::write(app.results_dir.path().join("blocker"), b"not a directory").unwrap();

    let token = app.register().await;
    let auth = format!("Bearer {}", token);

    app.client
        .post(app.url("/api/session/begin"))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();

    let finish = app
        .client
        .post(app.url("/api/finish"))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();
    assert_eq!(finish.status().as_u16(), 500);

    let status = app
        .client
        .get(app.url("/api/session"))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();
    assert_eq!(status.status().as_u16(), 200);
    let status: Value = status.json().await.unwrap();
    assert_eq!(status["phase"], "assembled");
}

#[tokio::test]
async fn answers_rejected_before_begin() {
    let app = spawn_app().await;
    let token = app.register().await;
    let auth = format!("Bearer {}", token);

    let early = app
        .client
        .post(app.url("/api/save"))
        .header("Authorization", &auth)
        .json(&json!({
            "originalQuestionId": "bogus",
            "questionIndex": 0,
            "answers": { "gt_quality": 1 }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(early.status().as_u16(), 409);

    app.client
        .post(app.url("/api/session/begin"))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();

    let status: Value = app
        .client
        .get(app.url("/api/session"))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["answered"], json!([]));

    app.client
        .post(app.url("/api/finish"))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();

    let files = app.result_files();
    assert_eq!(files.len(), 1);
    let record: Value = serde_json::from_str(&fs::read_to_string(&files[0]).unwrap()).unwrap();
    for entry in record["answers"].as_object().unwrap().values() {
        assert_ne!(entry["original_template_id"], "bogus");
        assert!(entry["metrics_rated"].is_null());
    }
}

#[tokio::test]
async fn finish_is_not_repeated_when_clear_fails() {
    let sessions = Arc::new(StickySessionStore(MemorySessionStore::new()));
    let app = spawn_app_with_store(templates(), None, sessions).await;
    let token = app.register().await;
    let auth = format!("Bearer {}", token);

    app.client
        .post(app.url("/api/session/begin"))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();

    let first = app
        .client
        .post(app.url("/api/finish"))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();
    assert_eq!(first.status().as_u16(), 200);

    let retry = app
        .client
        .post(app.url("/api/finish"))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();
    assert_eq!(retry.status().as_u16(), 409);

    let late_save = app
        .client
        .post(app.url("/api/save"))
        .header("Authorization", &auth)
        .json(&json!({ "originalQuestionId": "q1", "questionIndex": 0, "answers": {} }))
        .send()
        .await
        .unwrap();
    assert_eq!(late_save.status().as_u16(), 409);

    let status: Value = app
        .client
        .get(app.url("/api/session"))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["phase"], "finalized");

    assert_eq!(app.result_files().len(), 1);
}
