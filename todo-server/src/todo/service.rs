use crate::todo::{CreateTodo, Todo, TodoFilter, TodoId, TodoStore, UpdateTodo, ValidationError};
use std::sync::Arc;

/// Error type for TodoService operations.
#[derive(Debug, thiserror::Error)]
pub enum TodoServiceError {
    /// The request payload failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    /// No todo exists with the given identifier, or the identifier is malformed.
    #[error("Todo with ID {0} not found")]
    NotFound(String),
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

pub struct TodoService {
    store: Arc<dyn TodoStore>,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    /// Creates a new todo.
    ///
    /// # Arguments
    ///
    /// * `input` - The title, optional description and optional completion flag.
    ///
    /// # Returns
    ///
    /// A `Result` containing the stored `Todo`, or `Validation` if the title is missing or blank.
    #[tracing::instrument(skip(self))]
    pub async fn create(&self, input: CreateTodo) -> Result<Todo, TodoServiceError> {
        let new_todo = input.validate()?;
        let created = self.store.insert(new_todo).await?;
        tracing::info!("Created todo {}", created.id());
        Ok(created)
    }

    /// Retrieves all todos in insertion order.
    #[tracing::instrument(skip(self))]
    pub async fn find_all(&self) -> Result<Vec<Todo>, TodoServiceError> {
        Ok(self.store.find_many(TodoFilter::default()).await?)
    }

    /// Retrieves the todos whose completion flag equals `completed`.
    #[tracing::instrument(skip(self))]
    pub async fn find_by_completed(
        &self,
        completed: bool,
    ) -> Result<Vec<Todo>, TodoServiceError> {
        Ok(self
            .store
            .find_many(TodoFilter::by_completed(completed))
            .await?)
    }

    /// Retrieves a todo by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the todo to retrieve.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Todo`, or `NotFound` if the ID is malformed or unknown.
    #[tracing::instrument(skip(self))]
    pub async fn find_one(&self, id: &str) -> Result<Todo, TodoServiceError> {
        let todo_id = parse_id(id)?;
        self.store
            .find_by_id(todo_id)
            .await?
            .ok_or_else(|| TodoServiceError::NotFound(id.to_string()))
    }

    /// Applies a partial update to a todo.
    ///
    /// Fields left as `None` in `input` are not touched. The update timestamp is always refreshed.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the todo to update.
    /// * `input` - The fields to change.
    ///
    /// # Returns
    ///
    /// A `Result` containing the updated `Todo`, `Validation` if a provided title is blank,
    /// or `NotFound` if the ID is malformed or unknown.
    #[tracing::instrument(skip(self))]
    pub async fn update(&self, id: &str, input: UpdateTodo) -> Result<Todo, TodoServiceError> {
        let todo_id = parse_id(id)?;
        let changes = input.validate()?;
        self.store
            .update_by_id(todo_id, changes)
            .await?
            .ok_or_else(|| TodoServiceError::NotFound(id.to_string()))
    }

    /// Deletes a todo by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the todo to delete.
    ///
    /// # Returns
    ///
    /// An empty `Result` on success, or `NotFound` if the ID is malformed or unknown.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, id: &str) -> Result<(), TodoServiceError> {
        let todo_id = parse_id(id)?;
        match self.store.delete_by_id(todo_id).await? {
            Some(_) => {
                tracing::info!("Deleted todo {}", todo_id);
                Ok(())
            }
            None => Err(TodoServiceError::NotFound(id.to_string())),
        }
    }
}

/// Malformed identifiers cannot name a stored todo, so they are reported as not found.
fn parse_id(id: &str) -> Result<TodoId, TodoServiceError> {
    id.parse().map_err(|_| TodoServiceError::NotFound(id.to_string()))
}
