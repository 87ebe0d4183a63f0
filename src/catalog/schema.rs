//! User schemas

use super::CatalogReader;
use crate::error::{CatalogError, CatalogKind, ExtractError};
use crate::executor::CatalogExecutor;
use crate::filter::non_user_schema_filter;
use crate::row::{CatalogRow, FromCatalogRow, Oid};
use serde::Serialize;

/// A namespace that holds user objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub oid: Oid,
    pub name: String,
}

impl FromCatalogRow for Schema {
    fn from_row<R: CatalogRow>(row: &R) -> Result<Self, CatalogError> {
        Ok(Self {
            oid: row.get_oid("oid")?,
            name: row.get_string("name")?,
        })
    }
}

pub(crate) fn schemas_query() -> String {
    format!(
        "
SELECT
	oid,
	nspname AS name
FROM pg_namespace n
WHERE {}
ORDER BY name;",
        non_user_schema_filter("n")
    )
}

impl<E: CatalogExecutor> CatalogReader<E> {
    /// All user schemas, ordered by name
    ///
    /// # Errors
    ///
    /// Returns `ExtractError` for [`CatalogKind::Schemas`] if the query or any
    /// row mapping fails.
    pub fn schemas(&self) -> Result<Vec<Schema>, ExtractError> {
        self.fetch_all(CatalogKind::Schemas, &schemas_query())
    }
}
