//! Table and domain constraints

use super::CatalogReader;
use crate::error::{CatalogError, CatalogKind, ExtractError};
use crate::executor::CatalogExecutor;
use crate::filter::non_user_schema_filter;
use crate::row::{CatalogRow, FromCatalogRow, Oid};
use serde::Serialize;

/// Constraint kind, decoded from `pg_constraint.contype`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConstraintType {
    Check,
    ForeignKey,
    PrimaryKey,
    Unique,
    Exclusion,
    Trigger,
    Other(String),
}

impl ConstraintType {
    pub fn from_code(code: &str) -> Self {
        match code {
            "c" => ConstraintType::Check,
            "f" => ConstraintType::ForeignKey,
            "p" => ConstraintType::PrimaryKey,
            "u" => ConstraintType::Unique,
            "x" => ConstraintType::Exclusion,
            "t" => ConstraintType::Trigger,
            other => ConstraintType::Other(other.to_string()),
        }
    }

    /// The single-letter catalog code
    pub fn code(&self) -> &str {
        match self {
            ConstraintType::Check => "c",
            ConstraintType::ForeignKey => "f",
            ConstraintType::PrimaryKey => "p",
            ConstraintType::Unique => "u",
            ConstraintType::Exclusion => "x",
            ConstraintType::Trigger => "t",
            ConstraintType::Other(code) => code.as_str(),
        }
    }
}

/// A constraint on a table or a domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Constraint {
    pub oid: Oid,
    pub name: String,
    pub con_type: ConstraintType,
    /// Output of `pg_get_constraintdef`
    pub definition: String,
    /// Quoted FQN of the owning table, or of the domain for domain constraints
    pub owning_object: String,
    pub is_domain_constraint: bool,
    pub is_partition_parent: bool,
}

impl FromCatalogRow for Constraint {
    fn from_row<R: CatalogRow>(row: &R) -> Result<Self, CatalogError> {
        Ok(Self {
            oid: row.get_oid("oid")?,
            name: row.get_string("conname")?,
            con_type: ConstraintType::from_code(&row.get_string("contype")?),
            definition: row.get_string("condef")?,
            owning_object: row.get_string("owningobject")?,
            is_domain_constraint: row.get_bool("isdomainconstraint")?,
            is_partition_parent: row.get_bool("ispartitionparent")?,
        })
    }
}

// Constraints inherited by partition children are dumped with their parent,
// so children are excluded and parents flagged.
pub(crate) fn constraints_query() -> String {
    format!(
        "
SELECT
	c.oid,
	c.conname,
	c.contype::text AS contype,
	pg_get_constraintdef(c.oid, TRUE) AS condef,
	CASE
		WHEN r.relname IS NULL THEN quote_ident(n.nspname) || '.' || quote_ident(t.typname)
		ELSE quote_ident(n.nspname) || '.' || quote_ident(r.relname)
	END AS owningobject,
	r.relname IS NULL AS isdomainconstraint,
	EXISTS (SELECT 1 FROM pg_partition pt WHERE pt.parrelid = c.conrelid) AS ispartitionparent
FROM pg_constraint c
LEFT JOIN pg_class r
	ON c.conrelid = r.oid
LEFT JOIN pg_type t
	ON c.contypid = t.oid
JOIN pg_namespace n
	ON n.oid = c.connamespace
WHERE {}
AND NOT EXISTS (SELECT 1 FROM pg_partition_rule pr WHERE pr.parchildrelid = c.conrelid)
ORDER BY c.conname, c.oid;",
        non_user_schema_filter("n")
    )
}

impl<E: CatalogExecutor> CatalogReader<E> {
    /// All constraints in user schemas, ordered by constraint name
    ///
    /// # Errors
    ///
    /// Returns `ExtractError` for [`CatalogKind::Constraints`] if the query or
    /// any row mapping fails.
    pub fn constraints(&self) -> Result<Vec<Constraint>, ExtractError> {
        self.fetch_all(CatalogKind::Constraints, &constraints_query())
    }
}
