use crate::todo::{CreateTodo, InvalidTodoId, Todo, TodoId, TodoServiceError, TodoState, UpdateTodo};
use axum::{
    Router,
    extract::{FromRequestParts, Path, Query, State},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// JSON representation of a Todo for API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodoJson {
    /// Unique identifier assigned on creation
    id: Uuid,
    /// Short summary of the todo
    title: String,
    /// Optional longer description
    description: Option<String>,
    /// Whether the todo has been completed
    completed: bool,
    /// When the todo was created
    created_at: DateTime<Utc>,
    /// When the todo was last modified
    updated_at: DateTime<Utc>,
}

impl From<Todo> for TodoJson {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id().as_uuid(),
            title: todo.title().to_string(),
            description: todo.description().map(str::to_string),
            completed: todo.completed(),
            created_at: todo.created_at(),
            updated_at: todo.updated_at(),
        }
    }
}

/// Request body for creating a todo.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTodoRequest {
    /// Required, surrounding whitespace is trimmed
    title: Option<String>,
    description: Option<String>,
    /// Defaults to `false`
    completed: Option<bool>,
}

impl From<CreateTodoRequest> for CreateTodo {
    fn from(request: CreateTodoRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            completed: request.completed,
        }
    }
}

/// Request body for a partial update. Omitted fields keep their current value.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTodoRequest {
    title: Option<String>,
    /// `null` removes the current description
    #[serde(default, deserialize_with = "present_field")]
    #[schema(value_type = Option<String>, nullable)]
    description: Option<Option<String>>,
    completed: Option<bool>,
}

/// Marks a field as present even when its value is `null`.
fn present_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl From<UpdateTodoRequest> for UpdateTodo {
    fn from(request: UpdateTodoRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            completed: request.completed,
        }
    }
}

/// Query parameters for listing todos.
#[derive(Debug, Deserialize)]
pub struct TodosQuery {
    /// `true` lists completed todos, any other value lists incomplete ones.
    completed: Option<String>,
}

/// JSON response for API errors
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: String) -> Self {
        Self {
            error: error.to_string(),
            message,
        }
    }
}

/// Error type for todo API handlers.
#[derive(Debug, thiserror::Error)]
pub enum TodoApiError {
    /// The `:id` path segment is not a well-formed identifier.
    #[error(transparent)]
    InvalidId(#[from] InvalidTodoId),
    /// Represents a todo service error.
    #[error(transparent)]
    Service(#[from] TodoServiceError),
}

impl IntoResponse for TodoApiError {
    fn into_response(self) -> Response {
        let (status_code, error, message) = match self {
            TodoApiError::InvalidId(err) => (StatusCode::BAD_REQUEST, "INVALID_ID", err.to_string()),
            TodoApiError::Service(TodoServiceError::Validation(err)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
            }
            TodoApiError::Service(err @ TodoServiceError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
            }
            TodoApiError::Service(TodoServiceError::Database(err)) => {
                tracing::error!("Todo persistence failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An unexpected error occurred while processing your request. Please try again later."
                        .to_string(),
                )
            }
        };

        (status_code, Json(ErrorResponse::new(error, message))).into_response()
    }
}

/// Path extractor that rejects malformed identifiers before any handler runs.
#[derive(Debug)]
pub struct ValidTodoId(String);

impl ValidTodoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for ValidTodoId
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;
        if let Err(err) = id.parse::<TodoId>() {
            tracing::debug!("Rejected malformed todo id {}", id);
            return Err(TodoApiError::from(err).into_response());
        }
        Ok(Self(id))
    }
}

/// Handler for POST /todos - Creates a todo.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/todos",
    request_body = CreateTodoRequest,
    responses(
        (status = 201, description = "Todo created", body = TodoJson),
        (status = 400, description = "Missing or empty title", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn create_todo_handler(
    State(state): State<TodoState>,
    Json(payload): Json<CreateTodoRequest>,
) -> Result<(StatusCode, Json<TodoJson>), TodoApiError> {
    let todo = state.service.create(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(TodoJson::from(todo))))
}

/// Handler for GET /todos - Lists todos, optionally filtered by completion.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/todos",
    params(
        ("completed" = Option<String>, Query, description = "`true` for completed todos, any other value for incomplete ones")
    ),
    responses(
        (status = 200, description = "Successfully retrieved todos", body = [TodoJson]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn list_todos_handler(
    State(state): State<TodoState>,
    Query(query): Query<TodosQuery>,
) -> Result<Json<Vec<TodoJson>>, TodoApiError> {
    let todos = match query.completed {
        Some(completed) => state.service.find_by_completed(completed == "true").await?,
        None => state.service.find_all().await?,
    };
    Ok(Json(todos.into_iter().map(TodoJson::from).collect()))
}

/// Handler for GET /todos/{id} - Returns a single todo.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/todos/{id}",
    params(
        ("id" = String, Path, description = "Todo identifier")
    ),
    responses(
        (status = 200, description = "Successfully retrieved todo", body = TodoJson),
        (status = 400, description = "Malformed identifier", body = ErrorResponse),
        (status = 404, description = "Todo not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn get_todo_handler(
    State(state): State<TodoState>,
    id: ValidTodoId,
) -> Result<Json<TodoJson>, TodoApiError> {
    let todo = state.service.find_one(id.as_str()).await?;
    Ok(Json(TodoJson::from(todo)))
}

/// Handler for PATCH /todos/{id} - Applies a partial update.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    patch,
    path = "/todos/{id}",
    params(
        ("id" = String, Path, description = "Todo identifier")
    ),
    request_body = UpdateTodoRequest,
    responses(
        (status = 200, description = "Todo updated", body = TodoJson),
        (status = 400, description = "Malformed identifier or empty title", body = ErrorResponse),
        (status = 404, description = "Todo not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn update_todo_handler(
    State(state): State<TodoState>,
    id: ValidTodoId,
    Json(payload): Json<UpdateTodoRequest>,
) -> Result<Json<TodoJson>, TodoApiError> {
    let todo = state.service.update(id.as_str(), payload.into()).await?;
    Ok(Json(TodoJson::from(todo)))
}

/// Handler for DELETE /todos/{id} - Deletes a todo.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/todos/{id}",
    params(
        ("id" = String, Path, description = "Todo identifier")
    ),
    responses(
        (status = 204, description = "Todo deleted"),
        (status = 400, description = "Malformed identifier", body = ErrorResponse),
        (status = 404, description = "Todo not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn delete_todo_handler(
    State(state): State<TodoState>,
    id: ValidTodoId,
) -> Result<StatusCode, TodoApiError> {
    state.service.remove(id.as_str()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Creates and returns the todos API router.
pub fn create_api_router(state: TodoState) -> Router {
    Router::new()
        .route("/todos", get(list_todos_handler).post(create_todo_handler))
        .route(
            "/todos/{id}",
            get(get_todo_handler)
                .patch(update_todo_handler)
                .delete(delete_todo_handler),
        )
        .with_state(state)
}
