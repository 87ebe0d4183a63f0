//! Catalog queries, one per object kind
//!
//! [`CatalogReader`] holds the connection handle and exposes one method per
//! catalog kind. Each method issues its query (or queries), maps every row
//! explicitly, and returns the complete ordered result or an [`ExtractError`]
//! naming the kind. Nothing is cached between calls.
//!
//! Cross-query references (an operator class and its members) are only
//! coherent when every call runs inside one snapshot; opening that snapshot is
//! the caller's responsibility.

mod assemble;
mod constraint;
mod conversion;
mod language;
mod operator;
mod protocol;
mod schema;
mod sequence;
mod session;

pub use assemble::{attach_members, group_by_owner};
pub use constraint::{Constraint, ConstraintType};
pub use conversion::Conversion;
pub use language::ProceduralLanguage;
pub use operator::{
    Operator, OperatorClass, OperatorClassFunction, OperatorClassOperator, OperatorFamily,
};
pub use protocol::ExternalProtocol;
pub use schema::Schema;
pub use sequence::{Relation, SequenceDefinition};
pub use session::SessionSettings;

use crate::error::{CatalogKind, ExtractError};
use crate::executor::CatalogExecutor;
use crate::row::{map_rows, FromCatalogRow};

/// Read-only access to the system catalog over a single connection
pub struct CatalogReader<E> {
    executor: E,
}

impl<E: CatalogExecutor> CatalogReader<E> {
    /// Create a reader over `executor`
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Get a reference to the underlying executor
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Consume the reader and return the underlying executor
    pub fn into_executor(self) -> E {
        self.executor
    }

    /// Run `sql` and map every row, failing the whole kind on the first error
    fn fetch_all<T: FromCatalogRow>(
        &self,
        kind: CatalogKind,
        sql: &str,
    ) -> Result<Vec<T>, ExtractError> {
        let rows = self.executor.query_all(sql).map_err(|e| e.during(kind))?;
        let records = map_rows(&rows).map_err(|e| e.during(kind))?;
        log::debug!("read {} {kind}", records.len());
        Ok(records)
    }

    /// Run `sql`, which must produce exactly one row, and map it
    fn fetch_one<T: FromCatalogRow>(
        &self,
        kind: CatalogKind,
        sql: &str,
    ) -> Result<T, ExtractError> {
        let row = self.executor.query_one(sql).map_err(|e| e.during(kind))?;
        T::from_row(&row).map_err(|e| e.during(kind))
    }
}
