use crate::entities::todo;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

pub mod api;
pub mod service;
pub mod store;

pub use service::{TodoService, TodoServiceError};
pub use store::{SeaOrmTodoStore, TodoStore};

/// Shared state for the todo routes.
#[derive(Clone)]
pub struct TodoState {
    pub service: Arc<TodoService>,
}

impl TodoState {
    pub fn new(service: TodoService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Length of a canonical hyphenated UUID, e.g. `67e55044-10b1-426f-9247-bb680e5fe0c8`.
const TODO_ID_LENGTH: usize = 36;

/// Identifier assigned to a todo by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TodoId(Uuid);

impl TodoId {
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

/// Returned when a string is not a structurally valid todo identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a valid todo identifier")]
pub struct InvalidTodoId(pub String);

impl FromStr for TodoId {
    type Err = InvalidTodoId;

    /// Accepts only the canonical hyphenated form (8-4-4-4-12 hex digits).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != TODO_ID_LENGTH {
            return Err(InvalidTodoId(s.to_string()));
        }
        Uuid::try_parse(s)
            .map(TodoId)
            .map_err(|_| InvalidTodoId(s.to_string()))
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Todo {
    id: TodoId,
    title: String,
    description: Option<String>,
    completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Todo {
    pub fn new(
        id: TodoId,
        title: String,
        description: Option<String>,
        completed: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            description,
            completed,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> TodoId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Returns when the todo was first stored.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the todo was last written.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl From<todo::Model> for Todo {
    fn from(model: todo::Model) -> Self {
        Todo::new(
            TodoId::new(model.id),
            model.title,
            model.description,
            model.completed,
            model.created_at,
            model.updated_at,
        )
    }
}

/// Reasons a create or update payload is rejected before it reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("title is required")]
    TitleRequired,
    #[error("title must not be empty")]
    EmptyTitle,
}

/// Unvalidated input for creating a todo.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CreateTodo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl CreateTodo {
    /// Trims text fields, applies defaults and checks that a title is present.
    pub fn validate(self) -> Result<NewTodo, ValidationError> {
        let title = self.title.ok_or(ValidationError::TitleRequired)?;
        Ok(NewTodo {
            title: normalize_title(&title)?,
            description: self.description.map(|d| d.trim().to_string()),
            completed: self.completed.unwrap_or(false),
        })
    }
}

/// Unvalidated partial update. `None` fields are left untouched.
///
/// `description` is doubly optional: `Some(None)` clears the stored description.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
}

impl UpdateTodo {
    /// Trims the provided text fields and rejects a blank title.
    pub fn validate(self) -> Result<TodoChanges, ValidationError> {
        Ok(TodoChanges {
            title: self.title.as_deref().map(normalize_title).transpose()?,
            description: self
                .description
                .map(|d| d.map(|d| d.trim().to_string())),
            completed: self.completed,
        })
    }
}

fn normalize_title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

/// A validated todo ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

/// Validated field changes for an existing todo.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
}

/// Filter for listing todos. The default matches every todo.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TodoFilter {
    pub completed: Option<bool>,
}

impl TodoFilter {
    pub fn by_completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod todo_id_tests {
        use super::*;

        #[test]
        fn can_parse_hyphenated_uuid() {
            let id: TodoId = "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap();

            assert_eq!(id.to_string(), "67e55044-10b1-426f-9247-bb680e5fe0c8");
        }

        #[test]
        fn can_parse_uppercase_uuid() {
            let id: TodoId = "67E55044-10B1-426F-9247-BB680E5FE0C8".parse().unwrap();

            assert_eq!(id.to_string(), "67e55044-10b1-426f-9247-bb680e5fe0c8");
        }

        #[test]
        fn rejects_malformed_identifiers() {
            let malformed = [
                "",
                "not-an-id",
                "12345",
                "507f1f77bcf86cd799439011",
                "67e5504410b1426f9247bb680e5fe0c8",
                "{67e55044-10b1-426f-9247-bb680e5fe0c8}",
                "67e55044-10b1-426f-9247-bb680e5fe0cz",
                "67e55044-10b1-426f-9247-bb680e5fe0c8 ",
            ];

            for candidate in malformed {
                assert_eq!(
                    candidate.parse::<TodoId>(),
                    Err(InvalidTodoId(candidate.to_string())),
                    "expected '{candidate}' to be rejected"
                );
            }
        }
    }

    mod validation_tests {
        use super::*;

        #[test]
        fn create_trims_fields_and_defaults_completed_to_false() {
            let input = CreateTodo {
                title: Some("  Buy milk  ".to_string()),
                description: Some("\t2 liters\n".to_string()),
                completed: None,
            };

            let new_todo = input.validate().unwrap();

            assert_eq!(
                new_todo,
                NewTodo {
                    title: "Buy milk".to_string(),
                    description: Some("2 liters".to_string()),
                    completed: false,
                }
            );
        }

        #[test]
        fn create_keeps_explicit_completed_flag() {
            let input = CreateTodo {
                title: Some("Done already".to_string()),
                completed: Some(true),
                ..Default::default()
            };

            assert!(input.validate().unwrap().completed);
        }

        #[test]
        fn create_requires_title() {
            let input = CreateTodo {
                description: Some("no title".to_string()),
                ..Default::default()
            };

            assert_eq!(input.validate(), Err(ValidationError::TitleRequired));
        }

        #[test]
        fn create_rejects_blank_title() {
            for title in ["", "   ", "\n\t"] {
                let input = CreateTodo {
                    title: Some(title.to_string()),
                    ..Default::default()
                };

                assert_eq!(input.validate(), Err(ValidationError::EmptyTitle));
            }
        }

        #[test]
        fn update_only_carries_provided_fields() {
            let input = UpdateTodo {
                completed: Some(true),
                ..Default::default()
            };

            assert_eq!(
                input.validate().unwrap(),
                TodoChanges {
                    title: None,
                    description: None,
                    completed: Some(true),
                }
            );
        }

        #[test]
        fn update_trims_title_and_description() {
            let input = UpdateTodo {
                title: Some(" Walk dog ".to_string()),
                description: Some(Some(" around the block ".to_string())),
                completed: None,
            };

            let changes = input.validate().unwrap();

            assert_eq!(changes.title.as_deref(), Some("Walk dog"));
            assert_eq!(
                changes.description,
                Some(Some("around the block".to_string()))
            );
        }

        #[test]
        fn update_keeps_explicit_description_removal() {
            let input = UpdateTodo {
                description: Some(None),
                ..Default::default()
            };

            assert_eq!(
                input.validate().unwrap(),
                TodoChanges {
                    title: None,
                    description: Some(None),
                    completed: None,
                }
            );
        }

        #[test]
        fn update_rejects_blank_title() {
            let input = UpdateTodo {
                title: Some("   ".to_string()),
                ..Default::default()
            };

            assert_eq!(input.validate(), Err(ValidationError::EmptyTitle));
        }
    }
}
