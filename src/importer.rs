use std::{io::Read, path::Path};

use regex::Regex;
use sqlx::SqlitePool;

use crate::models::q;

const INSERT_BATCH_SIZE: usize = 5000;

const COL_APPID: &str = "appid";
const COL_NAME: &str = "name";
const COL_PRICE: &str = "price";
const COL_SCORE: &str = "score";
const COL_RELEASE_DATE: &str = "release_date";

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Validation(String),
}

/// App row from CSV.
#[derive(Debug, PartialEq)]
struct App {
    appid: i64,
    name: String,
    price: Option<f64>,
    score: Option<f64>,
    release_date: Option<String>,
}

/// Column positions from the header row.
struct Cols {
    appid: usize,
    name: usize,
    price: Option<usize>,
    score: Option<usize>,
    release_date: Option<usize>,
}

impl Cols {
    fn from_headers(h: &csv::StringRecord) -> Result<Self, ImportError> {
        let find = |name: &str| h.iter().position(|c| c.trim().eq_ignore_ascii_case(name));
        let require = |name: &str| {
            find(name).ok_or_else(|| {
                ImportError::Validation(format!("line 1: missing required column '{}'", name))
            })
        };

        Ok(Self {
            appid: require(COL_APPID)?,
            name: require(COL_NAME)?,
            price: find(COL_PRICE),
            score: find(COL_SCORE),
            release_date: find(COL_RELEASE_DATE),
        })
    }
}

/// Import a CSV file into the database. Returns the number of rows imported.
pub async fn import_csv(file_path: &Path, db: &SqlitePool) -> Result<usize, ImportError> {
    log::info!("importing data from {} ...", file_path.display());

    let file = std::fs::File::open(file_path)?;
    import_reader(file, db).await
}

/// Import CSV rows with a header from any reader.
pub async fn import_reader<R: Read>(r: R, db: &SqlitePool) -> Result<usize, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(r);

    let cols = Cols::from_headers(reader.headers()?)?;
    let re_spaces = Regex::new(r"\s+").map_err(|e| ImportError::Validation(e.to_string()))?;

    let mut apps: Vec<App> = Vec::with_capacity(INSERT_BATCH_SIZE);
    let mut num = 0;

    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);

        apps.push(read_app(&record, line, &cols, &re_spaces)?);

        if apps.len() >= INSERT_BATCH_SIZE {
            insert_apps(db, &apps).await?;
            num += apps.len();
            apps.clear();
            log::info!("imported {} apps", num);
        }
    }

    // Flush any remaining rows.
    if !apps.is_empty() {
        insert_apps(db, &apps).await?;
        num += apps.len();
    }

    log::info!("finished. imported {} apps", num);
    Ok(num)
}

fn read_app(
    record: &csv::StringRecord,
    line: usize,
    cols: &Cols,
    re_spaces: &Regex,
) -> Result<App, ImportError> {
    let get = |i: usize| record.get(i).unwrap_or("").trim();
    let get_opt = |i: Option<usize>| i.map(get).filter(|s| !s.is_empty());

    let raw_id = get(cols.appid);
    let appid: i64 = raw_id.parse().map_err(|_| {
        ImportError::Validation(format!("line {}: invalid appid '{}'", line, raw_id))
    })?;

    let name = clean_string(get(cols.name), re_spaces);
    if name.is_empty() {
        return Err(ImportError::Validation(format!(
            "line {}: empty name for appid {}",
            line, appid
        )));
    }

    Ok(App {
        appid,
        name,
        price: get_opt(cols.price).and_then(|s| parse_number(s, line, COL_PRICE)),
        score: get_opt(cols.score).and_then(|s| parse_number(s, line, COL_SCORE)),
        release_date: get_opt(cols.release_date).map(|s| clean_string(s, re_spaces)),
    })
}

/// Parse an optional numeric column. Invalid values are stored as NULL.
fn parse_number(s: &str, line: usize, col: &str) -> Option<f64> {
    match s.trim_start_matches('$').parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            log::debug!("line {}: non-numeric {} '{}'", line, col, s);
            None
        }
    }
}

async fn insert_apps(db: &SqlitePool, apps: &[App]) -> Result<(), ImportError> {
    let mut tx = db.begin().await?;

    for a in apps {
        sqlx::query(&q.insert_app.query)
            .bind(a.appid)
            .bind(&a.name)
            .bind(a.price)
            .bind(a.score)
            .bind(&a.release_date)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}

fn clean_string(s: &str, re_spaces: &Regex) -> String {
    re_spaces.replace_all(s.trim(), " ").to_string()
}
