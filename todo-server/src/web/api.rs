use crate::todo::TodoState;
use crate::todo::api::v1;
use axum::{Json, Router, routing::get};
use utoipa::OpenApi;

/// OpenAPI description of the JSON API.
#[derive(OpenApi)]
#[openapi(
    paths(
        v1::create_todo_handler,
        v1::list_todos_handler,
        v1::get_todo_handler,
        v1::update_todo_handler,
        v1::delete_todo_handler
    ),
    components(schemas(
        v1::TodoJson,
        v1::CreateTodoRequest,
        v1::UpdateTodoRequest,
        v1::ErrorResponse
    )),
    tags((name = "Todos", description = "Create, list, update and delete todos"))
)]
pub struct ApiDoc;

/// Handler for GET /api-docs/openapi.json.
#[tracing::instrument]
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Creates the API routes for JSON API endpoints.
pub fn create_api_router(todo_state: TodoState) -> Router {
    let todos_router = v1::create_api_router(todo_state);
    Router::new()
        .route("/api-docs/openapi.json", get(openapi_handler))
        .merge(todos_router)
}
