use anyhow::{Context, Result};
use log::{debug, info};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait};

use crate::config::StorageConfig;
use crate::entities::{list, task};

/// Schema statements, executed one by one and safe to repeat.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS "list" (
        "id" integer NOT NULL PRIMARY KEY AUTOINCREMENT,
        "remote_id" bigint NULL,
        "name" varchar(32) NOT NULL,
        "description" varchar(256) NULL,
        "created_at" text NOT NULL DEFAULT (datetime('now')),
        "updated_at" text NOT NULL DEFAULT (datetime('now')),
        "sync_state" text NOT NULL DEFAULT 'synced'
    )
    "#,
    r#"CREATE INDEX IF NOT EXISTS "list_name_index" ON "list" ("name")"#,
    r#"CREATE UNIQUE INDEX IF NOT EXISTS "list_remote_id_index" ON "list" ("remote_id")"#,
    r#"
    CREATE TRIGGER IF NOT EXISTS "list_auto_now" AFTER INSERT
    ON "list" FOR EACH ROW
    BEGIN
        UPDATE "list" SET "created_at" = datetime('now'), "updated_at" = datetime('now') WHERE "id" = NEW.id;
    END
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS "list_updated_at_auto_now" AFTER UPDATE
    ON "list" FOR EACH ROW
    BEGIN
        UPDATE "list" SET "updated_at" = datetime('now') WHERE "id" = NEW.id;
    END
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "task" (
        "id" integer NOT NULL PRIMARY KEY AUTOINCREMENT,
        "remote_id" bigint NULL,
        "list_id" bigint NOT NULL REFERENCES "list" ("id") ON DELETE CASCADE,
        "title" varchar(32) NOT NULL,
        "description" varchar(256) NULL,
        "starred" boolean NOT NULL DEFAULT 0,
        "completed" boolean NOT NULL DEFAULT 0,
        "deadline" text NULL,
        "completion_rate" integer NOT NULL DEFAULT 0 CHECK ("completion_rate" BETWEEN 0 AND 100),
        "created_at" text NOT NULL DEFAULT (datetime('now')),
        "updated_at" text NOT NULL DEFAULT (datetime('now')),
        "sync_state" text NOT NULL DEFAULT 'synced'
    )
    "#,
    r#"CREATE INDEX IF NOT EXISTS "task_title_index" ON "task" ("title")"#,
    r#"CREATE INDEX IF NOT EXISTS "task_list_id_index" ON "task" ("list_id")"#,
    r#"CREATE UNIQUE INDEX IF NOT EXISTS "task_remote_id_index" ON "task" ("remote_id")"#,
    r#"
    CREATE TRIGGER IF NOT EXISTS "task_auto_now" AFTER INSERT
    ON "task" FOR EACH ROW
    BEGIN
        UPDATE "task" SET "created_at" = datetime('now'), "updated_at" = datetime('now') WHERE "id" = NEW.id;
    END
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS "task_updated_at_auto_now" AFTER UPDATE
    ON "task" FOR EACH ROW
    BEGIN
        UPDATE "task" SET "updated_at" = datetime('now') WHERE "id" = NEW.id;
    END
    "#,
];

/// Local storage manager for lists and tasks
pub struct LocalStorage {
    pub conn: DatabaseConnection,
}

impl LocalStorage {
    /// Open the database described by the storage configuration and
    /// initialize its schema.
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        let database_url = if config.in_memory {
            "sqlite::memory:".to_string()
        } else {
            let path = config.resolve_database_path()?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
            }
            format!("sqlite://{}?mode=rwc", path.display())
        };

        Self::connect(&database_url).await
    }

    /// Fresh in-memory database with the schema applied
    pub async fn in_memory() -> Result<Self> {
        Self::new(&StorageConfig::in_memory()).await
    }

    async fn connect(database_url: &str) -> Result<Self> {
        // A single connection keeps in-memory databases alive and makes the
        // foreign key pragma apply to every statement.
        let mut options = ConnectOptions::new(database_url.to_string());
        options.max_connections(1).min_connections(1).sqlx_logging(false);

        let conn = Database::connect(options)
            .await
            .with_context(|| format!("Failed to open database: {}", database_url))?;

        info!("💾 Opened local database: {}", database_url);

        let storage = Self { conn };
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Initialize database schema
    pub async fn init_schema(&self) -> Result<()> {
        self.conn.execute_unprepared("PRAGMA foreign_keys = ON").await?;

        for statement in SCHEMA {
            self.conn
                .execute_unprepared(statement)
                .await
                .context("Failed to initialize database schema")?;
        }

        debug!("Database schema ready ({} statements)", SCHEMA.len());
        Ok(())
    }

    /// Check if the database has any data
    pub async fn has_data(&self) -> Result<bool> {
        let count = list::Entity::find().count(&self.conn).await?;
        Ok(count > 0)
    }

    /// Clear all data from the database
    pub async fn clear_all_data(&self) -> Result<()> {
        task::Entity::delete_many().exec(&self.conn).await?;
        list::Entity::delete_many().exec(&self.conn).await?;
        Ok(())
    }
}
