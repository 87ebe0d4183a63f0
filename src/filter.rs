//! Schema visibility filter shared by every namespace-scoped catalog query
//!
//! The excluded set matches the long-standing Greenplum dump tooling so that
//! the same schemas are considered "user" schemas everywhere.

/// One excluded system-schema name pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemSchemaPattern {
    /// Excludes names matching a `LIKE 'prefix%'` pattern (`_` is a single-char wildcard)
    Prefix(&'static str),
    /// Excludes exactly this name
    Exact(&'static str),
}

/// Schemas that are never extracted
pub const SYSTEM_SCHEMA_PATTERNS: &[SystemSchemaPattern] = &[
    SystemSchemaPattern::Prefix("pg_temp_"),
    SystemSchemaPattern::Prefix("pg_toast"),
    SystemSchemaPattern::Exact("gp_toolkit"),
    SystemSchemaPattern::Exact("information_schema"),
    SystemSchemaPattern::Exact("pg_aoseg"),
    SystemSchemaPattern::Exact("pg_bitmapindex"),
    SystemSchemaPattern::Exact("pg_catalog"),
];

impl SystemSchemaPattern {
    /// Whether `schema_name` is excluded by this pattern, with the same
    /// semantics the server applies to the rendered predicate
    pub fn matches(&self, schema_name: &str) -> bool {
        match self {
            SystemSchemaPattern::Exact(name) => schema_name == *name,
            SystemSchemaPattern::Prefix(prefix) => {
                let mut chars = schema_name.chars();
                prefix.chars().all(|p| match chars.next() {
                    Some(c) => p == '_' || p == c,
                    None => false,
                })
            }
        }
    }
}

/// Returns true when `schema_name` belongs to the system and is never extracted
pub fn is_system_schema(schema_name: &str) -> bool {
    SYSTEM_SCHEMA_PATTERNS.iter().any(|p| p.matches(schema_name))
}

/// Build the predicate excluding system schemas for the namespace aliased as `alias`
///
/// `alias` must be the non-empty alias of a `pg_namespace` row in the
/// surrounding query.
///
/// ```
/// use catalog_extract::filter::non_user_schema_filter;
///
/// let clause = non_user_schema_filter("n");
/// assert!(clause.starts_with("n.nspname NOT LIKE 'pg_temp_%'"));
/// ```
pub fn non_user_schema_filter(alias: &str) -> String {
    debug_assert!(!alias.is_empty(), "schema filter alias must not be empty");

    let mut clauses = Vec::new();
    let mut exact = Vec::new();
    for pattern in SYSTEM_SCHEMA_PATTERNS {
        match pattern {
            SystemSchemaPattern::Prefix(prefix) => {
                clauses.push(format!("{alias}.nspname NOT LIKE '{prefix}%'"));
            }
            SystemSchemaPattern::Exact(name) => exact.push(format!("'{name}'")),
        }
    }
    if !exact.is_empty() {
        clauses.push(format!("{alias}.nspname NOT IN ({})", exact.join(", ")));
    }
    clauses.join(" AND ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_clause_shape() {
        assert_eq!(
            non_user_schema_filter("n"),
            "n.nspname NOT LIKE 'pg_temp_%' AND n.nspname NOT LIKE 'pg_toast%' AND \
             n.nspname NOT IN ('gp_toolkit', 'information_schema', 'pg_aoseg', 'pg_bitmapindex', 'pg_catalog')"
        );
    }

    #[test]
    fn test_filter_uses_alias_everywhere() {
        let clause = non_user_schema_filter("cls_ns");
        assert_eq!(clause.matches("cls_ns.nspname").count(), 3);
        assert!(!clause.contains(" n.nspname"));
    }

    #[test]
    fn test_system_schema_matching() {
        assert!(is_system_schema("pg_catalog"));
        assert!(is_system_schema("information_schema"));
        assert!(is_system_schema("pg_toast"));
        assert!(is_system_schema("pg_toast_temp_1"));
        assert!(is_system_schema("pg_temp_12"));
        assert!(!is_system_schema("public"));
        assert!(!is_system_schema("pg_temp"));
        assert!(!is_system_schema("gp_toolkit_extra"));
    }

    #[test]
    fn test_prefix_underscore_is_single_char_wildcard() {
        // LIKE 'pg_temp_%' also matches "pgXtempY..." on the server
        assert!(SystemSchemaPattern::Prefix("pg_temp_").matches("pgxtempy"));
        assert!(!SystemSchemaPattern::Prefix("pg_temp_").matches("pgxtemp"));
    }
}
