use unicode_normalization::{char::canonical_combining_class, UnicodeNormalization};

/// Normalize a title or query for trie lookups: lowercase, optionally strip accents,
/// collapse every run of non `[a-z0-9]` characters into a single space and trim.
pub fn normalize(raw: &str, fold: bool) -> String {
    let lower = raw.to_lowercase();

    let folded: String = if fold {
        lower
            .nfkd()
            .filter(|c| canonical_combining_class(*c) == 0)
            .collect()
    } else {
        lower
    };

    let mut out = String::with_capacity(folded.len());
    let mut pending_space = false;
    for c in folded.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }

    out
}

/// Byte offsets where each space-delimited word of a normalized string begins.
pub fn word_starts(s: &str) -> Vec<usize> {
    let b = s.as_bytes();
    if b.is_empty() {
        return Vec::new();
    }

    let mut out = vec![0];
    for i in 1..b.len() {
        if b[i - 1] == b' ' && b[i] != b' ' {
            out.push(i);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_punctuation() {
        assert_eq!(normalize("Half-Life 2", true), "half life 2");
        assert_eq!(normalize("  Tom Clancy's   Rainbow Six®  ", true), "tom clancy s rainbow six");
        assert_eq!(normalize("---", true), "");
        assert_eq!(normalize("", true), "");
    }

    #[test]
    fn test_normalize_folding() {
        assert_eq!(normalize("Pokémon", true), "pokemon");
        assert_eq!(normalize("Ōkami HD", true), "okami hd");
        assert_eq!(normalize("Ｆｕｌｌ　Ｗｉｄｔｈ", true), "full width");

        // Spacing marks have combining class 0 and are kept, so they separate words.
        assert_eq!(normalize("a\u{0903}b", true), "a b");
    }

    #[test]
    fn test_normalize_without_folding() {
        // Accented letters fall outside [a-z0-9] and become separators.
        assert_eq!(normalize("Pokémon", false), "pok mon");
    }

    #[test]
    fn test_normalize_non_latin() {
        assert_eq!(normalize("東方 Project", true), "project");
        assert_eq!(normalize("東方", true), "");
    }

    #[test]
    fn test_word_starts() {
        assert_eq!(word_starts("half life 2"), vec![0, 5, 10]);
        assert_eq!(word_starts("portal"), vec![0]);
        assert!(word_starts("").is_empty());
    }
}
