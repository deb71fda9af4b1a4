use std::path::{Path, PathBuf};

use sqlx::SqlitePool;

use crate::{
    catalog::{Catalog, Opts},
    config, db,
    models::Config,
};

const DEFAULT_CONFIG: &str = "config.toml";
const DEFAULT_DB: &str = "games.db";

/// Initialize logger.
pub fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .format(|buf, record| {
            use std::io::Write;
            let level = if record.level() != log::Level::Info {
                format!("[{}] ", record.level())
            } else {
                String::new()
            };
            writeln!(
                buf,
                "{} {}:{} {}{}",
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                level,
                record.args()
            )
        })
        .init();
}

/// Load and merge config files. A missing default config.toml means built-in defaults.
pub fn init_config(paths: &[PathBuf]) -> Config {
    if let [p] = paths {
        if p == Path::new(DEFAULT_CONFIG) && !p.exists() {
            log::info!("{} not found. Using default config", DEFAULT_CONFIG);
            return Config::default();
        }
    }

    config::load_all(paths).unwrap_or_else(|e| {
        log::error!("error loading config: {}", e);
        std::process::exit(1);
    })
}

/// Resolve the DB path: --db flag, then config, then the default.
pub fn db_path(flag: Option<&Path>, config: &Config) -> PathBuf {
    match flag {
        Some(p) => p.to_path_buf(),
        None if !config.db.path.is_empty() => PathBuf::from(&config.db.path),
        None => PathBuf::from(DEFAULT_DB),
    }
}

/// Load the catalog and build the in-memory index.
pub async fn init_catalog(db: &SqlitePool, config: &Config) -> Result<Catalog, db::Error> {
    let records = db::load_catalog(db).await?;
    let opts = Opts::from(&config.app);
    Ok(Catalog::new(records, opts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_path() {
        let mut cfg = Config::default();
        assert_eq!(db_path(None, &cfg), PathBuf::from(DEFAULT_DB));

        cfg.db.path = "cfg.db".to_string();
        assert_eq!(db_path(None, &cfg), PathBuf::from("cfg.db"));
        assert_eq!(
            db_path(Some(Path::new("flag.db")), &cfg),
            PathBuf::from("flag.db")
        );
    }

    #[tokio::test]
    async fn test_init_catalog() {
        let db = db::tests::memory_db().await;
        sqlx::query("INSERT INTO steam_apps (appid, name, price) VALUES (1, 'Celeste', 19.99)")
            .execute(&db)
            .await
            .unwrap();

        let c = init_catalog(&db, &Config::default()).await.unwrap();
        assert_eq!(c.stats().records, 1);
        assert_eq!(c.search("cel", None)[0].id, 1);
    }

    #[tokio::test]
    async fn test_untitled_rows_are_selectable() {
        let db = db::tests::memory_db().await;
        sqlx::query(
            "INSERT INTO steam_apps (appid, name, price) VALUES (1, 'Portal', 9.99), (2, NULL, 59.99)",
        )
        .execute(&db)
        .await
        .unwrap();

        let c = init_catalog(&db, &Config::default()).await.unwrap();
        let ids: Vec<i64> = c.top("price", true, Some(10)).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1]);

        // Not indexed for autocomplete.
        let s = c.stats();
        assert_eq!((s.records, s.indexed_titles), (2, 1));
        let ids: Vec<i64> = c.search("", None).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1]);
    }
}
