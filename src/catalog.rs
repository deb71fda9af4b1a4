use crate::{
    autocomplete::{TrieIndex, DEFAULT_MAX_TOP},
    models::{AppConfig, CatalogRecord, SortKey, Stats, Suggestion},
    topn,
};

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 100;

/// Query settings resolved from config.
#[derive(Debug, Clone, PartialEq)]
pub struct Opts {
    pub max_top: usize,
    pub default_limit: usize,
    pub max_limit: usize,
    pub default_sort: SortKey,
    pub fold_accents: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            max_top: DEFAULT_MAX_TOP,
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
            default_sort: SortKey::Price,
            fold_accents: true,
        }
    }
}

impl From<&AppConfig> for Opts {
    fn from(c: &AppConfig) -> Self {
        let def = Opts::default();

        let default_sort = match c.default_sort.as_deref() {
            None | Some("") => def.default_sort,
            Some(s) => s.parse().unwrap_or_else(|e| {
                log::warn!("{}. Using '{}'", e, def.default_sort);
                def.default_sort
            }),
        };

        let max_limit = c.max_limit.filter(|&n| n > 0).unwrap_or(def.max_limit);
        Self {
            max_top: c.max_top.filter(|&n| n > 0).unwrap_or(def.max_top),
            default_limit: c
                .default_limit
                .unwrap_or(def.default_limit)
                .min(max_limit),
            max_limit,
            default_sort,
            fold_accents: c.fold_accents.unwrap_or(def.fold_accents),
        }
    }
}

/// Immutable catalog snapshot with its autocomplete index. Built once at startup
/// and shared read-only by every query.
pub struct Catalog {
    records: Vec<CatalogRecord>,
    trie: TrieIndex,
    opts: Opts,
}

impl Catalog {
    pub fn new(records: Vec<CatalogRecord>, opts: Opts) -> Self {
        let mut trie = TrieIndex::new(opts.max_top).with_folding(opts.fold_accents);
        trie.build(records.iter().map(|r| (r.id, r.title.as_str())));

        Self {
            records,
            trie,
            opts,
        }
    }

    fn limit(&self, limit: Option<usize>) -> usize {
        limit
            .unwrap_or(self.opts.default_limit)
            .min(self.opts.max_limit)
    }

    /// Autocomplete suggestions for a partial title.
    pub fn search(&self, prefix: &str, limit: Option<usize>) -> Vec<Suggestion> {
        let limit = self.limit(limit);
        let out = self.trie.search(prefix, limit);
        log::debug!("search '{}' limit={}: {} results", prefix, limit, out.len());
        out
    }

    /// Best records by a named sort key. Unknown names use the configured default key.
    pub fn top(
        &self,
        sort_key: &str,
        descending: bool,
        limit: Option<usize>,
    ) -> Vec<&CatalogRecord> {
        let key: SortKey = sort_key.parse().unwrap_or_else(|_| {
            log::debug!(
                "unknown sort key '{}', using '{}'",
                sort_key,
                self.opts.default_sort
            );
            self.opts.default_sort
        });
        topn::select(&self.records, key, descending, self.limit(limit))
    }

    /// Titles with a word sequence matching `text` exactly, in id order.
    pub fn exact(&self, text: &str, limit: Option<usize>) -> Vec<Suggestion> {
        self.trie.exact(text, self.limit(limit))
    }

    pub fn opts(&self) -> &Opts {
        &self.opts
    }

    pub fn stats(&self) -> Stats {
        Stats {
            records: self.records.len(),
            indexed_titles: self.trie.len(),
            trie_nodes: self.trie.node_count(),
            max_top: self.trie.max_top(),
        }
    }
}
