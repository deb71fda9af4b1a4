mod autocomplete;
mod catalog;
mod cli;
mod config;
mod db;
mod importer;
mod init;
mod models;
mod normalize;
mod topn;

#[cfg(target_env = "musl")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::Parser;
use serde::Serialize;

use cli::Commands;

#[tokio::main]
async fn main() {
    init::init_logger();

    let cli = cli::Cli::parse();

    // Commands that don't need a config or database.
    if let Commands::NewConfig { path } = &cli.command {
        match config::generate_sample(path) {
            Ok(_) => log::info!("config file generated: {}", path.display()),
            Err(e) => {
                log::error!("error generating config: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let config = init::init_config(&cli.config);
    let db_file = init::db_path(cli.db_path.as_deref(), &config);
    let db_path = db_file.to_string_lossy().to_string();

    match cli.command {
        Commands::NewConfig { .. } => {}

        // Create a new SQLite database with schema.
        Commands::Install { yes } => {
            if db_file.exists() {
                log::error!("database '{}' already exists", db_file.display());
                std::process::exit(1);
            }
            if let Err(e) = db::install_schema(&db_path, !yes).await {
                log::error!("error installing schema: {}", e);
                std::process::exit(1);
            }
        }

        // Import catalog rows from a CSV file.
        Commands::Import { file } => {
            db::exists(&db_file);

            let db = match db::init(&db_path, 1, false).await {
                Ok(db) => db,
                Err(e) => {
                    log::error!("error connecting to database: {}", e);
                    std::process::exit(1);
                }
            };

            if let Err(e) = importer::import_csv(&file, &db).await {
                log::error!("error importing: {}", e);
                std::process::exit(1);
            }
        }

        // Query commands load the whole catalog and build the index first.
        cmd @ (Commands::Search { .. } | Commands::Top { .. } | Commands::Stats) => {
            db::exists(&db_file);

            let db = match db::init(&db_path, config.db.max_conns, true).await {
                Ok(db) => db,
                Err(e) => {
                    log::error!("error connecting to database: {}", e);
                    std::process::exit(1);
                }
            };

            let catalog = match init::init_catalog(&db, &config).await {
                Ok(c) => c,
                Err(e) => {
                    log::error!("error loading catalog: {}", e);
                    std::process::exit(1);
                }
            };
            db.close().await;

            match cmd {
                Commands::Search {
                    query,
                    limit,
                    exact,
                } => {
                    if exact {
                        print_json(&catalog.exact(&query, limit));
                    } else {
                        print_json(&catalog.search(&query, limit));
                    }
                }
                Commands::Top { by, desc, limit } => {
                    let by = by.unwrap_or_else(|| catalog.opts().default_sort.to_string());
                    print_json(&catalog.top(&by, desc, limit));
                }
                _ => print_json(&catalog.stats()),
            }
        }
    }
}

/// Print a value as pretty JSON to stdout.
fn print_json<T: Serialize + ?Sized>(v: &T) {
    match serde_json::to_string_pretty(v) {
        Ok(s) => println!("{}", s),
        Err(e) => {
            log::error!("error encoding results: {}", e);
            std::process::exit(1);
        }
    }
}
