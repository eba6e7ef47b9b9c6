use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDate};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    Agenda, ChatBackend, ChatMessage, ChatSession, PersistenceError, Planner, PlannerError,
    PlannerStore, Preferences, SchoolDay, Slot, StudentProfile, Task, TaskDraft, Timetable,
    TimetableError, WeekBoard, WeekBuckets, WeekWindow, WeekWindowError, bucketize_dates,
    chat::ChatError, timetable::compress_from, BASE_HOUR,
};

#[derive(Clone)]
pub struct AppState {
    planners: Arc<RwLock<HashMap<String, Planner>>>,
    store: Option<Arc<dyn PlannerStore>>,
    chat: Option<Arc<dyn ChatBackend>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// In-memory planners, no chat backend.
    pub fn new() -> Self {
        Self {
            planners: Arc::new(RwLock::new(HashMap::new())),
            store: None,
            chat: None,
        }
    }

    /// Write every planner change through to `store` and load unknown users from it.
    pub fn with_store(mut self, store: Arc<dyn PlannerStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_chat(mut self, chat: Arc<dyn ChatBackend>) -> Self {
        self.chat = Some(chat);
        self
    }

    fn load(&self, user_id: &str) -> Result<Planner, ApiError> {
        match &self.store {
            Some(store) => Ok(store.load_planner(user_id)?.unwrap_or_default()),
            None => Ok(Planner::new()),
        }
    }

    /// Unknown users are read from a transient planner; only [`Self::write`]
    /// adds entries to the map.
    fn read<R>(&self, user_id: &str, f: impl FnOnce(&Planner) -> R) -> Result<R, ApiError> {
        {
            let guard = self.planners.read();
            if let Some(planner) = guard.get(user_id) {
                return Ok(f(planner));
            }
        }
        let planner = self.load(user_id)?;
        Ok(f(&planner))
    }


    /// Apply `f` and persist the result; the change is kept only when saving succeeds.
    fn write<R>(
        &self,
        user_id: &str,
        f: impl FnOnce(&mut Planner) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        let mut guard = self.planners.write();
        let mut planner = match guard.get(user_id) {
            Some(planner) => planner.clone(),
            None => self.load(user_id)?,
        };
        let result = f(&mut planner)?;
        if let Some(store) = &self.store {
            store.save_planner(user_id, &planner)?;
        }
        guard.insert(user_id.to_string(), planner);
        Ok(result)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    BadGateway(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }
}

impl From<PlannerError> for ApiError {
    fn from(value: PlannerError) -> Self {
        match value {
            PlannerError::TaskNotFound(_) => ApiError::NotFound(value.to_string()),
            PlannerError::DuplicateTask(_) => ApiError::Conflict(value.to_string()),
            PlannerError::Validation(_) => ApiError::Invalid(value.to_string()),
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(value: PersistenceError) -> Self {
        tracing::error!(error = %value, "planner store failure");
        ApiError::Internal(value.to_string())
    }
}

impl From<WeekWindowError> for ApiError {
    fn from(value: WeekWindowError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl From<TimetableError> for ApiError {
    fn from(value: TimetableError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl From<ChatError> for ApiError {
    fn from(value: ChatError) -> Self {
        match value {
            ChatError::EmptyMessage => ApiError::Invalid(value.to_string()),
            other => ApiError::BadGateway(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::BadGateway(message) => (StatusCode::BAD_GATEWAY, "bad_gateway", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/timetable/compress", post(compress_periods))
        .route("/week/bucketize", post(bucketize_week))
        .route("/users/:user_id/tasks", get(list_tasks).post(create_task))
        .route(
            "/users/:user_id/tasks/:task_id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/users/:user_id/tasks/:task_id/toggle", post(toggle_task))
        .route("/users/:user_id/week", get(week_board))
        .route("/users/:user_id/agenda", get(agenda))
        .route(
            "/users/:user_id/timetable",
            get(get_timetable)
                .put(put_timetable)
                .delete(reset_timetable),
        )
        .route("/users/:user_id/timetable/:day/slots", get(day_slots))
        .route("/users/:user_id/timetable/:day/subjects", get(day_subjects))
        .route(
            "/users/:user_id/profile",
            get(get_profile).put(put_profile),
        )
        .route(
            "/users/:user_id/preferences",
            get(get_preferences).put(put_preferences),
        )
        .route("/users/:user_id/chat", post(chat))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompressPayload {
    periods: Vec<String>,
    #[serde(default)]
    base_hour: Option<u32>,
}

async fn compress_periods(
    Json(payload): Json<CompressPayload>,
) -> Result<Json<Vec<Slot>>, ApiError> {
    let base_hour = payload.base_hour.unwrap_or(BASE_HOUR);
    Ok(Json(compress_from(&payload.periods, base_hour)?))
}

#[derive(Debug, Deserialize)]
struct BucketizePayload {
    #[serde(default)]
    tasks: Vec<Task>,
    dates: Vec<NaiveDate>,
}

async fn bucketize_week(
    Json(payload): Json<BucketizePayload>,
) -> Result<Json<WeekBuckets>, ApiError> {
    Ok(Json(bucketize_dates(&payload.tasks, &payload.dates)?))
}

async fn list_tasks(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = state.read(&user_id, |planner| planner.tasks().to_vec())?;
    Ok(Json(tasks))
}

async fn get_task(
    State(state): State<AppState>,
    Path((user_id, task_id)): Path<(String, String)>,
) -> Result<Json<Task>, ApiError> {
    let task = state.read(&user_id, |planner| planner.find_task(&task_id).cloned())?;
    match task {
        Some(task) => Ok(Json(task)),
        None => Err(ApiError::not_found(format!("task {task_id} not found"))),
    }
}

async fn create_task(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(draft): Json<TaskDraft>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let created = state.write(&user_id, |planner| Ok(planner.add_task(draft)?))?;
    tracing::info!(%user_id, task_id = %created.id, "task created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_task(
    State(state): State<AppState>,
    Path((user_id, task_id)): Path<(String, String)>,
    Json(draft): Json<TaskDraft>,
) -> Result<Json<Task>, ApiError> {
    let updated = state.write(&user_id, |planner| {
        Ok(planner.update_task(&task_id, draft)?)
    })?;
    Ok(Json(updated))
}

async fn delete_task(
    State(state): State<AppState>,
    Path((user_id, task_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.write(&user_id, |planner| {
        if planner.delete_task(&task_id) {
            Ok(())
        } else {
            Err(ApiError::not_found(format!("task {task_id} not found")))
        }
    })?;
    tracing::info!(%user_id, %task_id, "task deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_task(
    State(state): State<AppState>,
    Path((user_id, task_id)): Path<(String, String)>,
) -> Result<Json<Task>, ApiError> {
    let task = state.write(&user_id, |planner| Ok(planner.toggle_completed(&task_id)?))?;
    Ok(Json(task))
}

#[derive(Debug, Default, Deserialize)]
struct WeekQuery {
    date: Option<NaiveDate>,
    today: Option<NaiveDate>,
}

async fn week_board(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<WeekBoard>, ApiError> {
    let today = query.today.unwrap_or_else(local_today);
    let week = WeekWindow::containing(query.date.unwrap_or(today))?;
    let board = state.read(&user_id, |planner| planner.week_board(&week, today))?;
    Ok(Json(board))
}

#[derive(Debug, Default, Deserialize)]
struct AgendaQuery {
    today: Option<NaiveDate>,
}

async fn agenda(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<AgendaQuery>,
) -> Result<Json<Agenda>, ApiError> {
    let today = query.today.unwrap_or_else(local_today);
    let agenda = state.read(&user_id, |planner| planner.agenda(today))?;
    Ok(Json(agenda))
}

async fn get_timetable(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Timetable>, ApiError> {
    let timetable = state.read(&user_id, |planner| planner.timetable().clone())?;
    Ok(Json(timetable))
}

async fn put_timetable(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(timetable): Json<Timetable>,
) -> Result<Json<Timetable>, ApiError> {
    let saved = state.write(&user_id, |planner| {
        planner.set_timetable(timetable);
        Ok(planner.timetable().clone())
    })?;
    tracing::info!(%user_id, "timetable saved");
    Ok(Json(saved))
}

async fn reset_timetable(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Timetable>, ApiError> {
    let timetable = state.write(&user_id, |planner| {
        planner.reset_timetable();
        Ok(planner.timetable().clone())
    })?;
    Ok(Json(timetable))
}

async fn day_slots(
    State(state): State<AppState>,
    Path((user_id, day)): Path<(String, String)>,
) -> Result<Json<Vec<Slot>>, ApiError> {
    let day: SchoolDay = day.parse()?;
    let slots = state.read(&user_id, |planner| planner.timetable().slots(day))?;
    Ok(Json(slots))
}

/// Subject suggestions for the task form: the day's distinct lessons.
async fn day_subjects(
    State(state): State<AppState>,
    Path((user_id, day)): Path<(String, String)>,
) -> Result<Json<Vec<String>>, ApiError> {
    let day: SchoolDay = day.parse()?;
    let subjects = state.read(&user_id, |planner| planner.timetable().suggested_subjects(day))?;
    Ok(Json(subjects))
}

async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<StudentProfile>, ApiError> {
    let profile = state.read(&user_id, |planner| planner.profile().clone())?;
    Ok(Json(profile))
}

async fn put_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(profile): Json<StudentProfile>,
) -> Result<Json<StudentProfile>, ApiError> {
    let saved = state.write(&user_id, |planner| {
        planner.set_profile(profile);
        Ok(planner.profile().clone())
    })?;
    tracing::info!(%user_id, "profile saved");
    Ok(Json(saved))
}

async fn get_preferences(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Preferences>, ApiError> {
    let preferences = state.read(&user_id, |planner| planner.preferences())?;
    Ok(Json(preferences))
}

async fn put_preferences(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(preferences): Json<Preferences>,
) -> Result<Json<Preferences>, ApiError> {
    let saved = state.write(&user_id, |planner| {
        planner.set_preferences(preferences);
        Ok(planner.preferences())
    })?;
    Ok(Json(saved))
}

#[derive(Debug, Deserialize)]
struct ChatPayload {
    #[serde(default)]
    history: Vec<ChatMessage>,
    message: String,
}

#[derive(Debug, Serialize)]
struct ChatReply {
    reply: ChatMessage,
    messages: Vec<ChatMessage>,
}

async fn chat(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<ChatPayload>,
) -> Result<Json<ChatReply>, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(ChatError::EmptyMessage.into());
    }
    let Some(backend) = state.chat.clone() else {
        return Err(ChatError::MissingApiKey.into());
    };
    let mut session = ChatSession::with_history(payload.history);
    let reply = session
        .send(&payload.message, backend.as_ref())
        .await?
        .clone();
    tracing::debug!(%user_id, history = session.messages().len(), "chat reply sent");
    Ok(Json(ChatReply {
        reply,
        messages: session.messages().to_vec(),
    }))
}
