//! Identifier quoting and fully-qualified names
//!
//! Mirrors the server's `quote_ident`: a name is emitted bare only when it
//! would be read back unchanged, i.e. it is all lowercase ASCII letters,
//! digits and underscores, does not start with a digit, and is not a keyword
//! outside the grammar's unreserved category.
//!
//! The keyword set follows the Greenplum 6 grammar (PostgreSQL 9.4 keyword
//! list plus Greenplum's reserved additions). Constraint and conversion names
//! are quoted by the server itself, so this set has to agree with it for
//! sequence names to render the same way.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Keywords in the reserved, type/function-name and column-name categories
static RESERVED_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // reserved
        "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric", "both",
        "case", "cast", "check", "collate", "column", "constraint", "create", "current_catalog",
        "current_date", "current_role", "current_time", "current_timestamp", "current_user",
        "default", "deferrable", "desc", "distinct", "do", "else", "end", "except", "false",
        "fetch", "for", "foreign", "from", "grant", "group", "having", "in", "initially",
        "intersect", "into", "lateral", "leading", "limit", "localtime", "localtimestamp", "not",
        "null", "offset", "on", "only", "or", "order", "placing", "primary", "references",
        "returning", "select", "session_user", "some", "symmetric", "table", "then", "to",
        "trailing", "true", "union", "unique", "user", "using", "variadic", "when", "where",
        "window", "with",
        // usable as function or type names only
        "authorization", "binary", "collation", "concurrently", "cross", "current_schema",
        "freeze", "full", "ilike", "inner", "is", "isnull", "join", "left", "like", "natural",
        "notnull", "outer", "over", "overlaps", "right", "similar", "verbose",
        // usable as column names only
        "between", "bigint", "bit", "boolean", "char", "character", "coalesce", "dec", "decimal",
        "exists", "extract", "float", "greatest", "inout", "int", "integer", "interval", "least",
        "national", "nchar", "none", "nullif", "numeric", "out", "overlay", "position",
        "precision", "real", "row", "setof", "smallint", "substring", "time", "timestamp",
        "treat", "trim", "values", "varchar", "xmlattributes", "xmlconcat", "xmlelement",
        "xmlexists", "xmlforest", "xmlparse", "xmlpi", "xmlroot", "xmlserialize",
        // Greenplum reserved additions
        "distributed", "exclude", "following", "partition", "preceding", "scatter", "unbounded",
    ]
    .into_iter()
    .collect()
});

/// Whether `word` is a reserved keyword (case-insensitive)
pub fn is_reserved_keyword(word: &str) -> bool {
    RESERVED_KEYWORDS.contains(word.to_ascii_lowercase().as_str())
}

fn is_safe_bare(ident: &str) -> bool {
    let mut chars = ident.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_lowercase() || first == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !is_reserved_keyword(ident)
}

/// Quote an identifier if it would otherwise be case-folded or parsed as a keyword
///
/// ```
/// use catalog_extract::ident::quote_ident;
///
/// assert_eq!(quote_ident("orders"), "orders");
/// assert_eq!(quote_ident("Orders"), "\"Orders\"");
/// assert_eq!(quote_ident("select"), "\"select\"");
/// assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
/// ```
pub fn quote_ident(ident: &str) -> String {
    if is_safe_bare(ident) {
        ident.to_string()
    } else {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }
}

/// Schema-qualified name with both parts quoted as needed
pub fn make_fqn(schema: &str, name: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(name))
}
