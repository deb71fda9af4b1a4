use std::{fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Catalog row loaded from the `steam_apps` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
pub struct CatalogRecord {
    pub id: i64,
    pub title: String,
    pub price: Option<f64>,
    pub score: Option<f64>,
    /// Display date, eg: "Nov 1, 2000".
    pub release_date: Option<String>,
}

/// Autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub id: i64,
    pub title: Arc<str>,
}

/// Record attribute used to rank top-N selections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Price,
    Score,
    ReleaseDate,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Price => "price",
            SortKey::Score => "score",
            SortKey::ReleaseDate => "release_date",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown sort key: {0}")]
pub struct UnknownSortKey(pub String);

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "price" => Ok(SortKey::Price),
            "score" | "rating" => Ok(SortKey::Score),
            "release_date" | "releasedate" | "date" => Ok(SortKey::ReleaseDate),
            _ => Err(UnknownSortKey(s.to_string())),
        }
    }
}

/// Catalog and index statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats {
    pub records: usize,
    pub indexed_titles: usize,
    pub trie_nodes: usize,
    pub max_top: usize,
}

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub db: DbConfig,
}

/// Query settings. Unset values fall back to the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Capacity of each trie node's suggestion cache.
    #[serde(default)]
    pub max_top: Option<usize>,
    #[serde(default)]
    pub default_limit: Option<usize>,
    #[serde(default)]
    pub max_limit: Option<usize>,
    #[serde(default)]
    pub default_sort: Option<String>,
    #[serde(default)]
    pub fold_accents: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DbConfig {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub max_conns: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("price".parse::<SortKey>().unwrap(), SortKey::Price);
        assert_eq!(" Score ".parse::<SortKey>().unwrap(), SortKey::Score);
        assert_eq!("releaseDate".parse::<SortKey>().unwrap(), SortKey::ReleaseDate);
        assert_eq!("release_date".parse::<SortKey>().unwrap(), SortKey::ReleaseDate);
        assert!("popularity".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_record_json() {
        let r = CatalogRecord {
            id: 400,
            title: "Portal".to_string(),
            price: Some(9.99),
            score: None,
            release_date: Some("Oct 10, 2007".to_string()),
        };
        assert_eq!(
            serde_json::to_string(&r).unwrap(),
            r#"{"id":400,"title":"Portal","price":9.99,"score":null,"release_date":"Oct 10, 2007"}"#
        );
        assert_eq!(SortKey::ReleaseDate.to_string(), "release_date");
    }

    #[test]
    fn test_suggestion_json() {
        let s = Suggestion {
            id: 70,
            title: Arc::from("Half-Life"),
        };
        assert_eq!(
            serde_json::to_string(&s).unwrap(),
            r#"{"id":70,"title":"Half-Life"}"#
        );
    }
}
