//! Encoding conversions

use super::CatalogReader;
use crate::error::{CatalogError, CatalogKind, ExtractError};
use crate::executor::CatalogExecutor;
use crate::filter::non_user_schema_filter;
use crate::row::{CatalogRow, FromCatalogRow, Oid};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversion {
    pub oid: Oid,
    pub schema: String,
    pub name: String,
    pub for_encoding: String,
    pub to_encoding: String,
    /// Quoted FQN of the conversion function
    pub conversion_function: String,
    pub is_default: bool,
}

impl FromCatalogRow for Conversion {
    fn from_row<R: CatalogRow>(row: &R) -> Result<Self, CatalogError> {
        Ok(Self {
            oid: row.get_oid("oid")?,
            schema: row.get_string("nspname")?,
            name: row.get_string("conname")?,
            for_encoding: row.get_string("forencoding")?,
            to_encoding: row.get_string("toencoding")?,
            conversion_function: row.get_string("conversionfunction")?,
            is_default: row.get_bool("condefault")?,
        })
    }
}

pub(crate) fn conversions_query() -> String {
    format!(
        "
SELECT
	c.oid,
	n.nspname,
	c.conname,
	pg_encoding_to_char(c.conforencoding) AS forencoding,
	pg_encoding_to_char(c.contoencoding) AS toencoding,
	quote_ident(fn.nspname) || '.' || quote_ident(p.proname) AS conversionfunction,
	c.condefault
FROM pg_conversion c
JOIN pg_namespace n ON c.connamespace = n.oid
JOIN pg_proc p ON c.conproc = p.oid
JOIN pg_namespace fn ON p.pronamespace = fn.oid
WHERE {}
ORDER BY n.nspname, c.conname;",
        non_user_schema_filter("n")
    )
}

impl<E: CatalogExecutor> CatalogReader<E> {
    /// Conversions in user schemas, ordered by schema then name
    ///
    /// # Errors
    ///
    /// Returns `ExtractError` for [`CatalogKind::Conversions`].
    pub fn conversions(&self) -> Result<Vec<Conversion>, ExtractError> {
        self.fetch_all(CatalogKind::Conversions, &conversions_query())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{MockExecutor, MockRow};

    #[test]
    fn test_conversions_mapping() {
        let mock = MockExecutor::new().respond(
            "FROM pg_conversion c",
            vec![MockRow::new()
                .oid("oid", 16600)
                .text("nspname", "public")
                .text("conname", "latin1_to_utf8")
                .text("forencoding", "LATIN1")
                .text("toencoding", "UTF8")
                .text("conversionfunction", "pg_catalog.iso8859_1_to_utf8")
                .bool("condefault", false)],
        );
        let conversions = CatalogReader::new(&mock).conversions().unwrap();
        assert_eq!(conversions.len(), 1);
        assert_eq!(conversions[0].for_encoding, "LATIN1");
        assert_eq!(conversions[0].conversion_function, "pg_catalog.iso8859_1_to_utf8");
        assert!(!conversions[0].is_default);
    }

    #[test]
    fn test_conversions_filter_applies_to_conversion_schema() {
        let sql = conversions_query();
        assert!(sql.contains(&non_user_schema_filter("n")));
        assert!(!sql.contains("fn.nspname NOT"));
    }
}
