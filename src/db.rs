use std::{
    io::{BufRead, Write},
    path::Path,
};

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::models::{q, schema, CatalogRecord};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Create a SQLite connection pool.
pub async fn init(db_path: &str, max_conns: u32, read_only: bool) -> Result<SqlitePool, Error> {
    let mode = if read_only { "ro" } else { "rwc" };
    let db = SqlitePoolOptions::new()
        .max_connections(max_conns.max(1))
        .connect(&format!("sqlite://{}?mode={}", db_path, mode))
        .await?;

    if !read_only {
        sqlx::query(&schema.pragma.query).execute(&db).await?;
    }

    Ok(db)
}

/// Install database schema.
pub async fn install_schema(db_path: &str, prompt: bool) -> Result<(), Error> {
    if prompt {
        println!("\n** Initialize new database at '{}'? **\n", db_path);
        print!("continue (y/n)?  ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().lock().read_line(&mut input)?;
        if input.trim().to_lowercase() != "y" {
            println!("install cancelled");
            return Ok(());
        }
    }

    let db = init(db_path, 1, false).await?;
    create_schema(&db).await?;

    log::info!("successfully installed schema");
    Ok(())
}

/// Create the catalog tables if they don't exist.
pub async fn create_schema(db: &SqlitePool) -> Result<(), Error> {
    sqlx::query(&schema.schema.query).execute(db).await?;
    Ok(())
}

/// Load the full catalog in table order. A NULL name loads as an empty title.
pub async fn load_catalog(db: &SqlitePool) -> Result<Vec<CatalogRecord>, Error> {
    let records: Vec<CatalogRecord> = sqlx::query_as(&q.get_catalog.query)
        .fetch_all(db)
        .await?;

    let (untitled,): (i64,) = sqlx::query_as(&q.count_untitled.query)
        .fetch_one(db)
        .await?;
    if untitled > 0 {
        log::warn!("{} rows without a name will not be indexed", untitled);
    }

    log::info!("loaded {} records", records.len());
    Ok(records)
}

/// Check if the DB file exists and exit with error message if not.
pub fn exists(path: &Path) {
    if !path.exists() {
        log::error!(
            "database '{}' not found. Run `install` to create a new one.",
            path.display()
        );
        std::process::exit(1);
    }
}
