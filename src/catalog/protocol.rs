//! External table protocols

use super::CatalogReader;
use crate::error::{CatalogError, CatalogKind, ExtractError};
use crate::executor::CatalogExecutor;
use crate::row::{CatalogRow, FromCatalogRow, Oid};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalProtocol {
    pub oid: Oid,
    pub name: String,
    pub owner: String,
    pub trusted: bool,
    pub read_function: Oid,
    pub write_function: Oid,
    pub validator: Oid,
}

impl FromCatalogRow for ExternalProtocol {
    fn from_row<R: CatalogRow>(row: &R) -> Result<Self, CatalogError> {
        Ok(Self {
            oid: row.get_oid("oid")?,
            name: row.get_string("ptcname")?,
            owner: row.get_string("owner")?,
            trusted: row.get_bool("ptctrusted")?,
            read_function: row.get_oid("ptcreadfn")?,
            write_function: row.get_oid("ptcwritefn")?,
            validator: row.get_oid("ptcvalidatorfn")?,
        })
    }
}

pub(crate) const EXTERNAL_PROTOCOLS_QUERY: &str = "
SELECT
	p.oid,
	p.ptcname,
	pg_get_userbyid(p.ptcowner) AS owner,
	p.ptctrusted,
	p.ptcreadfn,
	p.ptcwritefn,
	p.ptcvalidatorfn
FROM pg_extprotocol p
ORDER BY p.ptcname, p.oid;";

impl<E: CatalogExecutor> CatalogReader<E> {
    /// User-defined external table protocols, ordered by name
    ///
    /// # Errors
    ///
    /// Returns `ExtractError` for [`CatalogKind::ExternalProtocols`].
    pub fn external_protocols(&self) -> Result<Vec<ExternalProtocol>, ExtractError> {
        self.fetch_all(CatalogKind::ExternalProtocols, EXTERNAL_PROTOCOLS_QUERY)
    }
}
