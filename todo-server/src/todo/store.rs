//! Persistence for todos.
//!
//! [`TodoStore`] is the document-style interface the service is written
//! against; [`SeaOrmTodoStore`] backs it with a sea-orm database connection.

use crate::entities::todo;
use crate::todo::{NewTodo, Todo, TodoChanges, TodoFilter, TodoId};
use async_trait::async_trait;
use sea_orm::*;
use std::sync::Arc;

/// Document operations the todo service needs from storage.
///
/// Lookups by identifier return `Ok(None)` when no todo has that identifier.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Stores a new todo, assigning its identifier and timestamps.
    async fn insert(&self, new_todo: NewTodo) -> Result<Todo, DbErr>;

    /// Returns every todo matching `filter`, oldest first.
    async fn find_many(&self, filter: TodoFilter) -> Result<Vec<Todo>, DbErr>;

    async fn find_by_id(&self, id: TodoId) -> Result<Option<Todo>, DbErr>;

    /// Applies `changes` and refreshes `updated_at`. `Some(None)` for the
    /// description clears it.
    async fn update_by_id(&self, id: TodoId, changes: TodoChanges)
    -> Result<Option<Todo>, DbErr>;

    /// Removes the todo and returns it as it was before deletion.
    async fn delete_by_id(&self, id: TodoId) -> Result<Option<Todo>, DbErr>;
}

#[derive(Clone, Debug)]
pub struct SeaOrmTodoStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmTodoStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TodoStore for SeaOrmTodoStore {
    #[tracing::instrument(skip(self))]
    async fn insert(&self, new_todo: NewTodo) -> Result<Todo, DbErr> {
        let now = chrono::Utc::now();
        let active_model = todo::ActiveModel {
            id: ActiveValue::Set(uuid::Uuid::new_v4()),
            title: ActiveValue::Set(new_todo.title),
            description: ActiveValue::Set(new_todo.description),
            completed: ActiveValue::Set(new_todo.completed),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };
        let created_model = active_model.insert(self.db.as_ref()).await?;
        Ok(Todo::from(created_model))
    }

    #[tracing::instrument(skip(self))]
    async fn find_many(&self, filter: TodoFilter) -> Result<Vec<Todo>, DbErr> {
        let mut query = todo::Entity::find();
        if let Some(completed) = filter.completed {
            query = query.filter(todo::Column::Completed.eq(completed));
        }
        let todos = query
            .order_by_asc(todo::Column::CreatedAt)
            .order_by_asc(todo::Column::Id)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(Todo::from)
            .collect();
        Ok(todos)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: TodoId) -> Result<Option<Todo>, DbErr> {
        let model = todo::Entity::find_by_id(id.as_uuid())
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Todo::from))
    }

    #[tracing::instrument(skip(self))]
    async fn update_by_id(
        &self,
        id: TodoId,
        changes: TodoChanges,
    ) -> Result<Option<Todo>, DbErr> {
        let Some(todo_to_update) = todo::Entity::find_by_id(id.as_uuid())
            .one(self.db.as_ref())
            .await?
        else {
            return Ok(None);
        };

        let mut active_model: todo::ActiveModel = todo_to_update.into();
        if let Some(title) = changes.title {
            active_model.title = ActiveValue::Set(title);
        }
        if let Some(description) = changes.description {
            active_model.description = ActiveValue::Set(description);
        }
        if let Some(completed) = changes.completed {
            active_model.completed = ActiveValue::Set(completed);
        }
        active_model.updated_at = ActiveValue::Set(chrono::Utc::now());

        match active_model.update(self.db.as_ref()).await {
            Ok(updated_model) => Ok(Some(Todo::from(updated_model))),
            // Deleted between the lookup and the write.
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(err) => Err(err),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn delete_by_id(&self, id: TodoId) -> Result<Option<Todo>, DbErr> {
        let Some(todo_to_delete) = todo::Entity::find_by_id(id.as_uuid())
            .one(self.db.as_ref())
            .await?
        else {
            return Ok(None);
        };

        let result = todo::Entity::delete_by_id(id.as_uuid())
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Ok(None);
        }
        Ok(Some(Todo::from(todo_to_delete)))
    }
}
