//! Session settings that affect how dumped DDL must be replayed

use super::CatalogReader;
use crate::error::{CatalogKind, ExtractError};
use crate::executor::CatalogExecutor;
use crate::row::CatalogRow;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSettings {
    pub client_encoding: String,
    pub standard_conforming_strings: String,
    pub default_with_oids: String,
}

impl<E: CatalogExecutor> CatalogReader<E> {
    /// Current `client_encoding`, `standard_conforming_strings` and
    /// `default_with_oids`, one `SHOW` statement each
    ///
    /// # Errors
    ///
    /// Returns `ExtractError` for [`CatalogKind::SessionSettings`] if any of
    /// the three statements fails.
    pub fn session_settings(&self) -> Result<SessionSettings, ExtractError> {
        Ok(SessionSettings {
            client_encoding: self.show("client_encoding")?,
            standard_conforming_strings: self.show("standard_conforming_strings")?,
            default_with_oids: self.show("default_with_oids")?,
        })
    }

    fn show(&self, setting: &str) -> Result<String, ExtractError> {
        let kind = CatalogKind::SessionSettings;
        let row = self
            .executor
            .query_one(&format!("SHOW {setting};"))
            .map_err(|e| e.during(kind))?;
        row.get_string(setting).map_err(|e| e.during(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{MockExecutor, MockRow};

    #[test]
    fn test_session_settings_reads_each_setting() {
        let mock = MockExecutor::new()
            .respond("SHOW client_encoding", vec![MockRow::new().text("client_encoding", "UTF8")])
            .respond(
                "SHOW standard_conforming_strings",
                vec![MockRow::new().text("standard_conforming_strings", "on")],
            )
            .respond(
                "SHOW default_with_oids",
                vec![MockRow::new().text("default_with_oids", "off")],
            );

        let settings = CatalogReader::new(&mock).session_settings().unwrap();
        assert_eq!(
            settings,
            SessionSettings {
                client_encoding: "UTF8".to_string(),
                standard_conforming_strings: "on".to_string(),
                default_with_oids: "off".to_string(),
            }
        );
        assert_eq!(mock.executed().len(), 3);
    }

    #[test]
    fn test_session_settings_unknown_setting_fails() {
        let mock = MockExecutor::new()
            .respond("SHOW client_encoding", vec![MockRow::new().text("client_encoding", "UTF8")])
            .respond(
                "SHOW standard_conforming_strings",
                vec![MockRow::new().text("standard_conforming_strings", "on")],
            )
            .fail("SHOW default_with_oids", "unrecognized configuration parameter");

        let err = CatalogReader::new(&mock).session_settings().unwrap_err();
        assert_eq!(err.kind, CatalogKind::SessionSettings);
        assert!(err.to_string().contains("unrecognized configuration parameter"));
    }
}
