#![allow(dead_code)]

use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;
use testcontainers_modules::testcontainers::runners::AsyncRunner;
use testcontainers_modules::{postgres, testcontainers};
use todo_server::todo::{SeaOrmTodoStore, TodoService};

pub struct TestContext {
    // container is kept to ensure it's not dropped
    pub container: testcontainers::ContainerAsync<postgres::Postgres>,
    pub db: Arc<DatabaseConnection>,
}

impl TestContext {
    pub fn todo_service(&self) -> TodoService {
        TodoService::new(Arc::new(SeaOrmTodoStore::new(self.db.clone())))
    }
}

pub async fn setup_container() -> anyhow::Result<testcontainers::ContainerAsync<postgres::Postgres>>
{
    let container = postgres::Postgres::default().start().await?;
    Ok(container)
}

pub async fn setup_db(
    container: &testcontainers::ContainerAsync<postgres::Postgres>,
) -> anyhow::Result<DatabaseConnection> {
    let host = container.get_host().await?;
    let port = container.get_host_port_ipv4(5432).await?;
    let db_url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);
    let db = Database::connect(&db_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub async fn setup() -> anyhow::Result<TestContext> {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .try_init();
    let container = setup_container().await?;
    let db = setup_db(&container).await?;
    Ok(TestContext {
        container,
        db: Arc::new(db),
    })
}
