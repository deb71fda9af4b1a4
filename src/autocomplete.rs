use std::{
    collections::{BTreeSet, HashMap, HashSet},
    sync::Arc,
};

use crate::{
    models::Suggestion,
    normalize::{normalize, word_starts},
};

/// Default capacity of each node's suggestion cache.
pub const DEFAULT_MAX_TOP: usize = 10;

/// Arena index of the root node.
const ROOT: usize = 0;

#[derive(Debug, Default, Clone, PartialEq)]
struct Node {
    /// Child arena indices, kept sorted by byte so lookups can binary search
    /// and traversal order is stable.
    children: Vec<(u8, usize)>,

    /// Ids of titles with a word-suffix that ends exactly here.
    end_ids: BTreeSet<i64>,

    /// First `max_top` suggestions that passed through this node, in insertion order.
    top: Vec<Suggestion>,
    top_ids: HashSet<i64>,
}

impl Node {
    fn child(&self, b: u8) -> Option<usize> {
        self.children
            .binary_search_by_key(&b, |&(c, _)| c)
            .ok()
            .map(|i| self.children[i].1)
    }

    /// Append a suggestion unless it's already cached or the cache is full.
    fn offer(&mut self, id: i64, title: &Arc<str>, max_top: usize) {
        if self.top.len() >= max_top || self.top_ids.contains(&id) {
            return;
        }
        self.top.push(Suggestion {
            id,
            title: Arc::clone(title),
        });
        self.top_ids.insert(id);
    }
}

/// In-memory prefix trie over normalized titles for autocomplete.
///
/// Every word of a title is indexed as its own suffix path, so "life" finds
/// "Half-Life". Each node caches the first `max_top` suggestions that reached it,
/// which answers popular prefixes without walking the subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct TrieIndex {
    nodes: Vec<Node>,
    max_top: usize,
    fold: bool,
    seen: HashSet<i64>,
    titles: HashMap<i64, Arc<str>>,
}

impl Default for TrieIndex {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TOP)
    }
}

impl TrieIndex {
    pub fn new(max_top: usize) -> Self {
        Self {
            nodes: vec![Node::default()],
            max_top,
            fold: true,
            seen: HashSet::new(),
            titles: HashMap::new(),
        }
    }

    /// Toggle accent folding for both indexing and querying.
    pub fn with_folding(mut self, fold: bool) -> Self {
        self.fold = fold;
        self
    }

    /// Index a title. Repeated ids and titles that normalize to nothing are ignored.
    pub fn insert(&mut self, id: i64, title: &str) {
        if self.seen.contains(&id) {
            return;
        }

        let norm = normalize(title, self.fold);
        if norm.is_empty() {
            return;
        }

        let title: Arc<str> = Arc::from(title);
        for pos in word_starts(&norm) {
            self.insert_suffix(&norm.as_bytes()[pos..], id, &title);
        }

        self.seen.insert(id);
        self.titles.insert(id, title);
    }

    /// Index rows in order. Earlier rows win the cache slots of shared prefixes.
    pub fn build<'a, I>(&mut self, rows: I) -> &mut Self
    where
        I: IntoIterator<Item = (i64, &'a str)>,
    {
        for (id, title) in rows {
            self.insert(id, title);
        }
        log::info!(
            "indexed {} titles into {} trie nodes",
            self.titles.len(),
            self.nodes.len()
        );
        self
    }

    fn insert_suffix(&mut self, suffix: &[u8], id: i64, title: &Arc<str>) {
        let max_top = self.max_top;
        let mut cur = ROOT;
        self.nodes[cur].offer(id, title, max_top);

        for &b in suffix {
            cur = match self.nodes[cur].children.binary_search_by_key(&b, |&(c, _)| c) {
                Ok(i) => self.nodes[cur].children[i].1,
                Err(i) => {
                    let next = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[cur].children.insert(i, (b, next));
                    next
                }
            };
            self.nodes[cur].offer(id, title, max_top);
        }

        self.nodes[cur].end_ids.insert(id);
    }

    /// Find the node for a prefix. An empty normalized prefix lands on the root.
    fn walk(&self, prefix: &str) -> Option<usize> {
        let norm = normalize(prefix, self.fold);
        norm.bytes()
            .try_fold(ROOT, |cur, b| self.nodes[cur].child(b))
    }

    /// Return up to `limit` suggestions for titles with a word starting with `prefix`.
    /// A blank prefix returns the root's suggestions, i.e. the earliest indexed titles.
    pub fn search(&self, prefix: &str, limit: usize) -> Vec<Suggestion> {
        if prefix.trim().is_empty() {
            return self.nodes[ROOT].top.iter().take(limit).cloned().collect();
        }

        let Some(idx) = self.walk(prefix) else {
            return Vec::new();
        };

        let node = &self.nodes[idx];
        if node.top.len() >= limit {
            return node.top[..limit].to_vec();
        }

        // The node's cache is short. Merge caches from the whole subtree,
        // depth first with children in byte order.
        let mut out = node.top.clone();
        let mut seen = node.top_ids.clone();
        let mut stack: Vec<usize> = node.children.iter().rev().map(|&(_, c)| c).collect();

        while let Some(cur) = stack.pop() {
            if out.len() >= limit {
                break;
            }

            let n = &self.nodes[cur];
            for s in &n.top {
                if seen.insert(s.id) {
                    out.push(s.clone());
                    if out.len() >= limit {
                        break;
                    }
                }
            }
            stack.extend(n.children.iter().rev().map(|&(_, c)| c));
        }

        out.truncate(limit);
        out
    }

    /// Titles containing a word sequence that ends exactly at `text`, in id order.
    pub fn exact(&self, text: &str, limit: usize) -> Vec<Suggestion> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let Some(idx) = self.walk(text) else {
            return Vec::new();
        };

        self.nodes[idx]
            .end_ids
            .iter()
            .filter_map(|id| {
                self.titles.get(id).map(|t| Suggestion {
                    id: *id,
                    title: Arc::clone(t),
                })
            })
            .take(limit)
            .collect()
    }

    /// Number of indexed titles.
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn max_top(&self) -> usize {
        self.max_top
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(res: &[Suggestion]) -> Vec<i64> {
        res.iter().map(|s| s.id).collect()
    }

    fn sample() -> TrieIndex {
        let mut t = TrieIndex::default();
        t.build([(1, "Half-Life"), (2, "Half-Life 2"), (3, "Portal")]);
        t
    }

    #[test]
    fn test_multi_word_match() {
        let t = sample();
        assert_eq!(ids(&t.search("half", 10)), vec![1, 2]);
        assert_eq!(ids(&t.search("life", 10)), vec![1, 2]);
        assert_eq!(ids(&t.search("2", 10)), vec![2]);
        assert_eq!(ids(&t.search("Half Li", 10)), vec![1, 2]);
        assert!(t.search("zz", 10).is_empty());
        assert!(t.search("portals", 10).is_empty());
    }

    #[test]
    fn test_result_carries_original_title() {
        let t = sample();
        let res = t.search("port", 10);
        assert_eq!(res.len(), 1);
        assert_eq!(&*res[0].title, "Portal");
        assert_eq!(&*t.exact("half life 2", 10)[0].title, "Half-Life 2");
    }

    #[test]
    fn test_idempotent_insert() {
        let mut once = TrieIndex::default();
        once.build([(1, "Half-Life")]);

        let mut twice = TrieIndex::default();
        twice.build([(1, "Half-Life")]);
        twice.insert(1, "Half-Life");
        assert_eq!(once, twice);

        // A repeated id keeps the first title even if the text differs.
        twice.insert(1, "Portal");
        assert_eq!(once, twice);
        assert!(twice.search("portal", 10).is_empty());
    }

    #[test]
    fn test_accent_folding() {
        let mut t = sample();
        t.insert(4, "Pokémon");
        assert_eq!(ids(&t.search("pokemon", 10)), vec![4]);
        assert_eq!(ids(&t.search("POKÉ", 10)), vec![4]);
    }

    #[test]
    fn test_empty_title_not_indexed() {
        let mut t = TrieIndex::default();
        t.build([(1, "!!!"), (2, "東方"), (3, "Celeste")]);
        assert_eq!(t.len(), 1);
        assert_eq!(ids(&t.search("", 10)), vec![3]);
        assert!(t.exact("", 10).is_empty());
    }

    #[test]
    fn test_prefix_normalizing_to_nothing_lands_on_root() {
        let mut t = TrieIndex::new(2);
        t.build([(1, "abc"), (2, "abd"), (3, "xyz")]);

        // Short cache at the root, so the whole trie is walked in byte order.
        assert_eq!(ids(&t.search("!!!", 10)), vec![1, 2, 3]);
        assert_eq!(ids(&t.search("東方", 10)), vec![1, 2, 3]);
        assert_eq!(ids(&t.search("!!!", 2)), ids(&t.search("", 2)));
        assert!(t.exact("!!!", 10).is_empty());
    }

    #[test]
    fn test_blank_prefix_is_root_view() {
        let mut t = TrieIndex::new(3);
        t.build([(1, "a"), (2, "b"), (3, "c"), (4, "d")]);

        assert_eq!(ids(&t.search("", 10)), vec![1, 2, 3]);
        assert_eq!(ids(&t.search("   ", 2)), vec![1, 2]);
        let root: Vec<i64> = t.nodes[ROOT].top.iter().map(|s| s.id).collect();
        assert_eq!(ids(&t.search("", 3)), root);
    }

    #[test]
    fn test_first_seen_wins_cache() {
        let mut t = TrieIndex::new(2);
        t.build([(1, "dark souls"), (2, "dark souls 2"), (3, "dark souls 3")]);

        let node = &t.nodes[t.walk("dark").unwrap()];
        assert_eq!(node.top.len(), 2);
        assert_eq!(ids(&node.top), vec![1, 2]);

        // The fast path serves the cache as-is.
        assert_eq!(ids(&t.search("dark", 2)), vec![1, 2]);
    }

    #[test]
    fn test_fallback_traversal_fills_past_cache() {
        let mut t = TrieIndex::new(1);
        t.build([(1, "abc"), (2, "abd"), (3, "abe"), (4, "ab")]);

        // Node "ab" only cached id 1. Children are visited in byte order c, d, e.
        assert_eq!(ids(&t.search("ab", 10)), vec![1, 2, 3]);
        assert_eq!(ids(&t.search("ab", 2)), vec![1, 2]);
        assert_eq!(ids(&t.search("abe", 5)), vec![3]);
    }

    #[test]
    fn test_bounded_and_unique() {
        let mut t = TrieIndex::new(4);
        let titles = [
            "Stardew Valley",
            "Star Wars Battlefront",
            "Starbound",
            "Star Trek Online",
            "Stellaris",
            "Star Wars Jedi",
            "StarCraft",
            "Slay the Spire",
        ];
        t.build(titles.iter().enumerate().map(|(i, s)| (i as i64, *s)));

        for p in ["", "s", "st", "star", "star w", "wars", "x"] {
            for limit in 0..12 {
                let res = t.search(p, limit);
                assert!(res.len() <= limit, "prefix {:?} limit {}", p, limit);

                let uniq: HashSet<i64> = res.iter().map(|s| s.id).collect();
                assert_eq!(uniq.len(), res.len(), "prefix {:?} limit {}", p, limit);
            }
        }
        assert_eq!(t.search("star", 10).len(), 6);
        assert!(t.search("star", 0).is_empty());
    }

    #[test]
    fn test_exact() {
        let t = sample();
        assert_eq!(ids(&t.exact("life", 10)), vec![1]);
        assert_eq!(ids(&t.exact("Life-2", 10)), vec![2]);
        assert!(t.exact("hal", 10).is_empty());
        assert!(t.exact("", 10).is_empty());
        assert!(t.exact("life", 0).is_empty());
    }

    #[test]
    fn test_empty_index() {
        let t = TrieIndex::default();
        assert!(t.is_empty());
        assert!(t.search("", 10).is_empty());
        assert!(t.search("a", 10).is_empty());
        assert_eq!(t.node_count(), 1);
    }

    #[test]
    fn test_without_folding() {
        let mut t = TrieIndex::default().with_folding(false);
        t.insert(1, "Pokémon");
        assert!(t.search("pokemon", 10).is_empty());
        assert_eq!(ids(&t.search("mon", 10)), vec![1]);
    }
}
