//! Sequences: relation listing, per-sequence state and owning columns

use super::CatalogReader;
use crate::error::{CatalogError, CatalogKind, ExtractError};
use crate::executor::CatalogExecutor;
use crate::filter::non_user_schema_filter;
use crate::ident::{make_fqn, quote_ident};
use crate::row::{CatalogRow, FromCatalogRow, Oid};
use serde::Serialize;
use std::collections::BTreeMap;

/// A relation and the schema that contains it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relation {
    pub schema_oid: Oid,
    pub relation_oid: Oid,
    pub schema_name: String,
    pub relation_name: String,
}

impl Relation {
    /// Quoted, schema-qualified name
    pub fn fqn(&self) -> String {
        make_fqn(&self.schema_name, &self.relation_name)
    }
}

impl FromCatalogRow for Relation {
    fn from_row<R: CatalogRow>(row: &R) -> Result<Self, CatalogError> {
        Ok(Self {
            schema_oid: row.get_oid("schemaoid")?,
            relation_oid: row.get_oid("relationoid")?,
            schema_name: row.get_string("schemaname")?,
            relation_name: row.get_string("relationname")?,
        })
    }
}

/// Current numeric state of one sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceDefinition {
    pub name: String,
    pub last_value: i64,
    pub increment: i64,
    pub max_value: i64,
    pub min_value: i64,
    pub cache_value: i64,
    pub log_count: i64,
    pub is_cycled: bool,
    pub is_called: bool,
}

impl FromCatalogRow for SequenceDefinition {
    fn from_row<R: CatalogRow>(row: &R) -> Result<Self, CatalogError> {
        Ok(Self {
            name: row.get_string("sequence_name")?,
            last_value: row.get_i64("last_value")?,
            increment: row.get_i64("increment_by")?,
            max_value: row.get_i64("max_value")?,
            min_value: row.get_i64("min_value")?,
            cache_value: row.get_i64("cache_value")?,
            log_count: row.get_i64("log_cnt")?,
            is_cycled: row.get_bool("is_cycled")?,
            is_called: row.get_bool("is_called")?,
        })
    }
}

/// One sequence-to-column dependency row
struct SequenceOwner {
    schema_name: String,
    sequence_name: String,
    table_schema: String,
    table_name: String,
    column_name: String,
}

impl FromCatalogRow for SequenceOwner {
    fn from_row<R: CatalogRow>(row: &R) -> Result<Self, CatalogError> {
        Ok(Self {
            schema_name: row.get_string("schemaname")?,
            sequence_name: row.get_string("sequencename")?,
            table_schema: row.get_string("tableschema")?,
            table_name: row.get_string("tablename")?,
            column_name: row.get_string("columnname")?,
        })
    }
}

impl SequenceOwner {
    fn sequence_fqn(&self) -> String {
        make_fqn(&self.schema_name, &self.sequence_name)
    }

    fn column_fqn(&self) -> String {
        format!(
            "{}.{}",
            make_fqn(&self.table_schema, &self.table_name),
            quote_ident(&self.column_name)
        )
    }
}

pub(crate) fn sequence_relations_query() -> String {
    format!(
        "
SELECT
	n.oid AS schemaoid,
	c.oid AS relationoid,
	n.nspname AS schemaname,
	c.relname AS relationname
FROM pg_class c
JOIN pg_namespace n
	ON c.relnamespace = n.oid
WHERE c.relkind = 'S'
AND {}
ORDER BY schemaname, relationname;",
        non_user_schema_filter("n")
    )
}

pub(crate) fn sequence_definition_query(sequence_fqn: &str) -> String {
    format!(
        "SELECT sequence_name, last_value, increment_by, max_value, min_value, cache_value, \
         log_cnt, is_cycled, is_called FROM {sequence_fqn}"
    )
}

pub(crate) fn sequence_owners_query() -> String {
    format!(
        "
SELECT
	n.nspname AS schemaname,
	s.relname AS sequencename,
	tn.nspname AS tableschema,
	t.relname AS tablename,
	a.attname AS columnname
FROM pg_depend d
JOIN pg_attribute a
	ON a.attrelid = d.refobjid AND a.attnum = d.refobjsubid
JOIN pg_class s
	ON s.oid = d.objid
JOIN pg_class t
	ON t.oid = d.refobjid
JOIN pg_namespace n
	ON n.oid = s.relnamespace
JOIN pg_namespace tn
	ON tn.oid = t.relnamespace
WHERE s.relkind = 'S'
AND {}
ORDER BY n.nspname, s.relname, tn.nspname, t.relname, a.attname;",
        non_user_schema_filter("n")
    )
}

impl<E: CatalogExecutor> CatalogReader<E> {
    /// Every sequence in a user schema, ordered by schema then sequence name
    ///
    /// # Errors
    ///
    /// Returns `ExtractError` for [`CatalogKind::SequenceRelations`].
    pub fn sequence_relations(&self) -> Result<Vec<Relation>, ExtractError> {
        self.fetch_all(CatalogKind::SequenceRelations, &sequence_relations_query())
    }

    /// Current state of the single sequence `sequence`
    ///
    /// There is no batch form; callers iterate the output of
    /// [`CatalogReader::sequence_relations`].
    ///
    /// # Errors
    ///
    /// Returns `ExtractError` for [`CatalogKind::SequenceDefinition`].
    pub fn sequence_definition(
        &self,
        sequence: &Relation,
    ) -> Result<SequenceDefinition, ExtractError> {
        self.fetch_one(
            CatalogKind::SequenceDefinition,
            &sequence_definition_query(&sequence.fqn()),
        )
    }

    /// Map from sequence FQN to the FQN of the column it backs
    ///
    /// A sequence linked to more than one column keeps the last row in
    /// query order; earlier links are overwritten.
    ///
    /// # Errors
    ///
    /// Returns `ExtractError` for [`CatalogKind::SequenceOwners`].
    pub fn sequence_column_owners(&self) -> Result<BTreeMap<String, String>, ExtractError> {
        let owners: Vec<SequenceOwner> =
            self.fetch_all(CatalogKind::SequenceOwners, &sequence_owners_query())?;

        let mut map = BTreeMap::new();
        for owner in owners {
            let sequence = owner.sequence_fqn();
            if let Some(previous) = map.insert(sequence, owner.column_fqn()) {
                log::debug!(
                    "sequence {} is linked to more than one column; dropping {previous}",
                    owner.sequence_fqn()
                );
            }
        }
        Ok(map)
    }
}
