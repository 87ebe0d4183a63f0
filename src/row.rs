//! Row access and record mapping
//!
//! [`CatalogRow`] is the narrow, column-name-addressed view of a result row the
//! record mappings need. It is implemented for `may_postgres::Row` and for the
//! scripted [`crate::test_helpers::MockRow`], so every mapping is exercised
//! without a server.

use crate::error::CatalogError;
use may_postgres::types::FromSql;
use may_postgres::Row;

/// Object identifier, the primary key of a catalog row
pub type Oid = u32;

/// Typed getters over a single catalog result row
///
/// Every getter fails with [`CatalogError::Decode`] naming the column when the
/// column is missing, has an incompatible type, or is NULL.
pub trait CatalogRow {
    fn get_oid(&self, column: &str) -> Result<Oid, CatalogError>;
    fn get_string(&self, column: &str) -> Result<String, CatalogError>;
    fn get_bool(&self, column: &str) -> Result<bool, CatalogError>;
    fn get_i16(&self, column: &str) -> Result<i16, CatalogError>;
    fn get_i64(&self, column: &str) -> Result<i64, CatalogError>;
}

/// Explicit, field-by-field mapping from a catalog row to a record
pub trait FromCatalogRow: Sized {
    /// # Errors
    ///
    /// Returns `CatalogError::Decode` if any expected column cannot be read.
    fn from_row<R: CatalogRow>(row: &R) -> Result<Self, CatalogError>;
}

fn get_typed<'a, T>(row: &'a Row, column: &str) -> Result<T, CatalogError>
where
    T: FromSql<'a>,
{
    row.try_get::<&str, T>(column)
        .map_err(|e| CatalogError::decode(column, e.to_string()))
}

impl CatalogRow for Row {
    fn get_oid(&self, column: &str) -> Result<Oid, CatalogError> {
        get_typed(self, column)
    }

    fn get_string(&self, column: &str) -> Result<String, CatalogError> {
        get_typed(self, column)
    }

    fn get_bool(&self, column: &str) -> Result<bool, CatalogError> {
        get_typed(self, column)
    }

    fn get_i16(&self, column: &str) -> Result<i16, CatalogError> {
        get_typed(self, column)
    }

    fn get_i64(&self, column: &str) -> Result<i64, CatalogError> {
        get_typed(self, column)
    }
}

/// Map every row, stopping at the first decode failure
pub(crate) fn map_rows<T, R>(rows: &[R]) -> Result<Vec<T>, CatalogError>
where
    T: FromCatalogRow,
    R: CatalogRow,
{
    rows.iter().map(T::from_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::MockRow;

    #[derive(Debug, PartialEq)]
    struct Pair {
        oid: Oid,
        name: String,
    }

    impl FromCatalogRow for Pair {
        fn from_row<R: CatalogRow>(row: &R) -> Result<Self, CatalogError> {
            Ok(Self {
                oid: row.get_oid("oid")?,
                name: row.get_string("name")?,
            })
        }
    }

    #[test]
    fn test_map_rows_preserves_order() {
        let rows = vec![
            MockRow::new().oid("oid", 2).text("name", "b"),
            MockRow::new().oid("oid", 1).text("name", "a"),
        ];
        let mapped: Vec<Pair> = map_rows(&rows).unwrap();
        assert_eq!(mapped[0].oid, 2);
        assert_eq!(mapped[1].name, "a");
    }

    #[test]
    fn test_map_rows_fails_on_first_bad_row() {
        let rows = vec![
            MockRow::new().oid("oid", 1).text("name", "a"),
            MockRow::new().oid("oid", 2),
        ];
        let err = map_rows::<Pair, _>(&rows).unwrap_err();
        assert!(matches!(err, CatalogError::Decode { ref column, .. } if column == "name"));
    }

    #[test]
    fn test_empty_rows_map_to_empty_vec() {
        let rows: Vec<MockRow> = Vec::new();
        let mapped: Vec<Pair> = map_rows(&rows).unwrap();
        assert!(mapped.is_empty());
    }
}
