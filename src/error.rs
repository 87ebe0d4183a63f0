//! Error types for catalog extraction
//!
//! Three failure families surface from the connection: transport/auth failures
//! ([`CatalogError::Connection`]), query failures ([`CatalogError::Query`]) and
//! row shape mismatches ([`CatalogError::Decode`]). Every public extraction
//! operation wraps them in an [`ExtractError`] that names the catalog kind
//! being read, so the process-level diagnostic always says what failed.

use crate::connection::ConnectionError;
use std::fmt;

/// Low-level failure while talking to the catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Transport or authentication failure
    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),
    /// Malformed query or catalog-version incompatibility
    #[error("query error: {0}")]
    Query(String),
    /// A result row did not have the shape the record mapping expects
    #[error("decode error in column `{column}`: {message}")]
    Decode { column: String, message: String },
}

impl CatalogError {
    /// Build a decode error for `column`
    pub fn decode(column: &str, message: impl Into<String>) -> Self {
        CatalogError::Decode {
            column: column.to_string(),
            message: message.into(),
        }
    }

    /// Attach the catalog kind that was being read when this error occurred
    #[must_use]
    pub fn during(self, kind: CatalogKind) -> ExtractError {
        ExtractError { kind, source: self }
    }
}

/// Which side of the connection a driver failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailureOrigin {
    /// The socket closed or failed underneath the query
    Transport,
    /// The server answered with an error, or the client rejected the reply
    Server,
}

impl FailureOrigin {
    /// A closed connection is always transport; an I/O failure is transport
    /// unless the server attached a SQLSTATE to it
    pub(crate) fn classify(closed: bool, has_sqlstate: bool, io_failure: bool) -> Self {
        if closed || (io_failure && !has_sqlstate) {
            FailureOrigin::Transport
        } else {
            FailureOrigin::Server
        }
    }
}

impl From<may_postgres::Error> for CatalogError {
    fn from(err: may_postgres::Error) -> Self {
        let io_failure = std::error::Error::source(&err)
            .is_some_and(|source| source.is::<std::io::Error>());
        match FailureOrigin::classify(err.is_closed(), err.code().is_some(), io_failure) {
            FailureOrigin::Transport if err.is_closed() => {
                CatalogError::Connection(ConnectionError::Closed)
            }
            FailureOrigin::Transport => {
                CatalogError::Connection(ConnectionError::PostgresError(err))
            }
            FailureOrigin::Server => CatalogError::Query(err.to_string()),
        }
    }
}

/// Catalog object kinds, one per extraction operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    Schemas,
    Constraints,
    SequenceRelations,
    SequenceDefinition,
    SequenceOwners,
    SessionSettings,
    ProceduralLanguages,
    ExternalProtocols,
    Operators,
    OperatorFamilies,
    OperatorClasses,
    OperatorClassOperators,
    OperatorClassFunctions,
    Conversions,
    /// The transaction a consistent snapshot is read in
    Snapshot,
}

impl CatalogKind {
    /// Human-readable name used in diagnostics and log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::Schemas => "schemas",
            CatalogKind::Constraints => "constraints",
            CatalogKind::SequenceRelations => "sequence relations",
            CatalogKind::SequenceDefinition => "sequence definition",
            CatalogKind::SequenceOwners => "sequence owners",
            CatalogKind::SessionSettings => "session settings",
            CatalogKind::ProceduralLanguages => "procedural languages",
            CatalogKind::ExternalProtocols => "external protocols",
            CatalogKind::Operators => "operators",
            CatalogKind::OperatorFamilies => "operator families",
            CatalogKind::OperatorClasses => "operator classes",
            CatalogKind::OperatorClassOperators => "operator class operators",
            CatalogKind::OperatorClassFunctions => "operator class functions",
            CatalogKind::Conversions => "conversions",
            CatalogKind::Snapshot => "catalog snapshot",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extraction of one catalog kind failed
///
/// Extraction is all-or-nothing per kind: when this is returned no records of
/// `kind` were produced.
#[derive(Debug, thiserror::Error)]
#[error("failed to extract {kind}: {source}")]
pub struct ExtractError {
    pub kind: CatalogKind,
    #[source]
    pub source: CatalogError,
}
