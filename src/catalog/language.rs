//! Procedural languages

use super::CatalogReader;
use crate::error::{CatalogError, CatalogKind, ExtractError};
use crate::executor::CatalogExecutor;
use crate::row::{CatalogRow, FromCatalogRow, Oid};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProceduralLanguage {
    pub oid: Oid,
    pub name: String,
    pub owner: String,
    pub is_pl: bool,
    pub pl_trusted: bool,
    /// Call handler function; 0 when absent
    pub handler: Oid,
    /// Inline (`DO` block) handler; 0 when absent
    pub inline: Oid,
    pub validator: Oid,
}

impl FromCatalogRow for ProceduralLanguage {
    fn from_row<R: CatalogRow>(row: &R) -> Result<Self, CatalogError> {
        Ok(Self {
            oid: row.get_oid("oid")?,
            name: row.get_string("lanname")?,
            owner: row.get_string("owner")?,
            is_pl: row.get_bool("lanispl")?,
            pl_trusted: row.get_bool("lanpltrusted")?,
            handler: row.get_oid("lanplcallfoid")?,
            inline: row.get_oid("laninline")?,
            validator: row.get_oid("lanvalidator")?,
        })
    }
}

pub(crate) const PROCEDURAL_LANGUAGES_QUERY: &str = "
SELECT
	l.oid,
	l.lanname,
	pg_get_userbyid(l.lanowner) AS owner,
	l.lanispl,
	l.lanpltrusted,
	l.lanplcallfoid::regprocedure::oid AS lanplcallfoid,
	l.laninline::regprocedure::oid AS laninline,
	l.lanvalidator::regprocedure::oid AS lanvalidator
FROM pg_language l
WHERE l.lanispl = 't'
ORDER BY l.lanname, l.oid;";

impl<E: CatalogExecutor> CatalogReader<E> {
    /// Procedural (non-internal) languages, ordered by name
    ///
    /// # Errors
    ///
    /// Returns `ExtractError` for [`CatalogKind::ProceduralLanguages`].
    pub fn procedural_languages(&self) -> Result<Vec<ProceduralLanguage>, ExtractError> {
        self.fetch_all(CatalogKind::ProceduralLanguages, PROCEDURAL_LANGUAGES_QUERY)
    }
}
