//! Cache key generation using SHA-256 hashes

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use crate::client::Variables;

/// Reserved prefix for every cache entry in the local store.
pub const CACHE_PREFIX: &str = "anilist_";

/// Generate a deterministic cache key for a GraphQL request.
///
/// The key is the reserved prefix followed by a SHA-256 hash of the
/// whitespace-normalised query text and the variables as canonical JSON with
/// sorted names. Two requests with the same variables given in a different
/// order get the same key. The query is length-prefixed so no query/variables
/// split can collide with another.
pub fn fingerprint(query: &str, variables: &Variables) -> String {
    let mut hasher = Sha256::new();

    let query = normalize_query(query);
    hasher.update((query.len() as u64).to_be_bytes());
    hasher.update(query.as_bytes());

    // BTreeMap serializes names in sorted order with JSON-escaped keys
    let sorted: BTreeMap<&str, &serde_json::Value> = variables.iter().collect();
    let canonical = serde_json::to_string(&sorted).unwrap_or_default();
    hasher.update(canonical.as_bytes());

    format!("{}{:x}", CACHE_PREFIX, hasher.finalize())
}

/// Collapse whitespace runs between tokens to one space.
///
/// Text inside string literals is kept verbatim.
fn normalize_query(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut pending_space = false;

    for c in query.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        if c == '"' {
            in_string = true;
        }
        out.push(c);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_ignores_variable_order() {
        let v1 = Variables::new().with("a", 1).with("b", 2);
        let v2 = Variables::new().with("b", 2).with("a", 1);

        assert_eq!(fingerprint("Q", &v1), fingerprint("Q", &v2));
    }

    #[test]
    fn test_fingerprint_many_orderings() {
        let names = ["search", "page", "perPage", "season"];
        let base = fingerprint(
            "query",
            &names.iter().fold(Variables::new(), |v, n| v.with(*n, *n)),
        );

        for rotation in 1..names.len() {
            let mut rotated = names.to_vec();
            rotated.rotate_left(rotation);
            let vars = rotated.iter().fold(Variables::new(), |v, n| v.with(*n, *n));
            assert_eq!(fingerprint("query", &vars), base);
        }
    }

    #[test]
    fn test_fingerprint_has_prefix() {
        let key = fingerprint("Q", &Variables::new());
        assert!(key.starts_with(CACHE_PREFIX));
        assert_eq!(key.len(), CACHE_PREFIX.len() + 64);
    }

    #[test]
    fn test_fingerprint_different_queries() {
        let vars = Variables::new().with("page", 1);
        assert_ne!(
            fingerprint("query { trending }", &vars),
            fingerprint("query { popular }", &vars)
        );
    }

    #[test]
    fn test_fingerprint_different_values() {
        let k1 = fingerprint("Q", &Variables::new().with("page", 1));
        let k2 = fingerprint("Q", &Variables::new().with("page", 2));
        assert_ne!(k1, k2);
    }

    #[test]
    fn test_fingerprint_string_and_number_differ() {
        let k1 = fingerprint("Q", &Variables::new().with("year", 2024));
        let k2 = fingerprint("Q", &Variables::new().with("year", "2024"));
        assert_ne!(k1, k2);
    }

    #[test]
    fn test_fingerprint_normalises_whitespace() {
        let vars = Variables::new();
        assert_eq!(
            fingerprint("query {\n  Page { id }\n}", &vars),
            fingerprint("query { Page { id } }", &vars)
        );
    }

    #[test]
    fn test_fingerprint_keeps_whitespace_inside_string_literals() {
        let vars = Variables::new();
        assert_ne!(
            fingerprint(r#"query { Page(genre_in: ["Slice  of Life"]) { id } }"#, &vars),
            fingerprint(r#"query { Page(genre_in: ["Slice of Life"]) { id } }"#, &vars)
        );
        assert_eq!(
            normalize_query("query {\n  Page(search: \"a \\\"  b\") { id }\n}"),
            "query { Page(search: \"a \\\"  b\") { id } }"
        );
    }

    #[test]
    fn test_fingerprint_variable_names_cannot_forge_separators() {
        let split = Variables::new().with("a", 1).with("b", 2);
        let forged = Variables::new().with("a=1&b", 2);
        assert_ne!(fingerprint("Q", &split), fingerprint("Q", &forged));
    }

    #[test]
    fn test_fingerprint_query_and_variables_do_not_run_together() {
        let k1 = fingerprint("Q {\"a\":1}", &Variables::new());
        let k2 = fingerprint("Q", &Variables::new().with("a", 1));
        assert_ne!(k1, k2);
    }
}
