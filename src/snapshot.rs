//! A complete extraction pass over every catalog kind
//!
//! [`CatalogSnapshot::extract`] reads each kind exactly once, in a fixed order,
//! on the reader's single connection. The first failure aborts the pass; a
//! partially read catalog is never returned because it could describe objects
//! inconsistently. [`CatalogSnapshot::extract_consistent`] wraps the same pass
//! in a serializable read-only transaction so every query sees one catalog
//! state.

use crate::catalog::{
    CatalogReader, Constraint, Conversion, ExternalProtocol, Operator, OperatorClass,
    OperatorFamily, ProceduralLanguage, Relation, Schema, SequenceDefinition, SessionSettings,
};
use crate::error::{CatalogKind, ExtractError};
use crate::executor::CatalogExecutor;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;

/// Opens the transaction a consistent snapshot is read in
pub const BEGIN_SNAPSHOT: &str = "BEGIN ISOLATION LEVEL SERIALIZABLE READ ONLY";

/// A sequence with its current state and, when recorded, the column it backs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sequence {
    pub relation: Relation,
    pub definition: SequenceDefinition,
    /// Quoted `schema.table.column` of the owning column
    pub owning_column: Option<String>,
}

/// Everything the DDL stage needs from the catalog, read in one pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogSnapshot {
    pub session: SessionSettings,
    pub schemas: Vec<Schema>,
    pub procedural_languages: Vec<ProceduralLanguage>,
    pub external_protocols: Vec<ExternalProtocol>,
    pub sequences: Vec<Sequence>,
    pub sequence_owners: BTreeMap<String, String>,
    pub constraints: Vec<Constraint>,
    pub operators: Vec<Operator>,
    pub operator_families: Vec<OperatorFamily>,
    pub operator_classes: Vec<OperatorClass>,
    pub conversions: Vec<Conversion>,
}

impl CatalogSnapshot {
    /// Read every catalog kind through `reader`
    ///
    /// All reads should happen inside one transaction snapshot opened by the
    /// caller; this function does not open one.
    ///
    /// # Errors
    ///
    /// Returns the first `ExtractError`, naming the kind that failed.
    pub fn extract<E: CatalogExecutor>(reader: &CatalogReader<E>) -> Result<Self, ExtractError> {
        let start = Instant::now();

        let session = reader.session_settings()?;
        let schemas = reader.schemas()?;
        let procedural_languages = reader.procedural_languages()?;
        let external_protocols = reader.external_protocols()?;

        let sequence_owners = reader.sequence_column_owners()?;
        let mut sequences = Vec::new();
        for relation in reader.sequence_relations()? {
            let definition = reader.sequence_definition(&relation)?;
            let owning_column = sequence_owners.get(&relation.fqn()).cloned();
            sequences.push(Sequence {
                relation,
                definition,
                owning_column,
            });
        }

        let constraints = reader.constraints()?;
        let operators = reader.operators()?;
        let operator_families = reader.operator_families()?;
        let operator_classes = reader.operator_classes()?;
        let conversions = reader.conversions()?;

        let snapshot = Self {
            session,
            schemas,
            procedural_languages,
            external_protocols,
            sequences,
            sequence_owners,
            constraints,
            operators,
            operator_families,
            operator_classes,
            conversions,
        };
        log::info!(
            "extracted catalog snapshot in {:?}: {} schemas, {} sequences, {} constraints, \
             {} operators, {} operator classes",
            start.elapsed(),
            snapshot.schemas.len(),
            snapshot.sequences.len(),
            snapshot.constraints.len(),
            snapshot.operators.len(),
            snapshot.operator_classes.len(),
        );
        Ok(snapshot)
    }

    /// Read every catalog kind inside one serializable, read-only transaction
    ///
    /// The connection must not already be in a transaction. The transaction is
    /// committed after a successful pass and rolled back after a failed one.
    ///
    /// # Errors
    ///
    /// Returns the extraction's `ExtractError`, or one for
    /// [`CatalogKind::Snapshot`] if the transaction cannot be opened or
    /// committed.
    pub fn extract_consistent<E: CatalogExecutor>(
        reader: &CatalogReader<E>,
    ) -> Result<Self, ExtractError> {
        let executor = reader.executor();
        executor
            .query_all(BEGIN_SNAPSHOT)
            .map_err(|e| e.during(CatalogKind::Snapshot))?;

        match Self::extract(reader) {
            Ok(snapshot) => {
                executor
                    .query_all("COMMIT")
                    .map_err(|e| e.during(CatalogKind::Snapshot))?;
                Ok(snapshot)
            }
            Err(e) => {
                if let Err(rollback) = executor.query_all("ROLLBACK") {
                    log::warn!("rollback after failed extraction failed: {rollback}");
                }
                Err(e)
            }
        }
    }

    /// Per-kind record counts, in extraction order
    pub fn counts(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("schemas", self.schemas.len()),
            ("procedural languages", self.procedural_languages.len()),
            ("external protocols", self.external_protocols.len()),
            ("sequences", self.sequences.len()),
            ("constraints", self.constraints.len()),
            ("operators", self.operators.len()),
            ("operator families", self.operator_families.len()),
            ("operator classes", self.operator_classes.len()),
            ("conversions", self.conversions.len()),
        ]
    }
}
