//! Operators, operator families and operator classes

use super::assemble::{attach_members, group_by_owner};
use super::CatalogReader;
use crate::error::{CatalogError, CatalogKind, ExtractError};
use crate::executor::CatalogExecutor;
use crate::filter::non_user_schema_filter;
use crate::row::{CatalogRow, FromCatalogRow, Oid};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operator {
    pub oid: Oid,
    pub schema: String,
    pub name: String,
    pub procedure_name: String,
    /// Left operand type, `-` for prefix operators
    pub left_arg_type: String,
    /// Right operand type, `-` for postfix operators
    pub right_arg_type: String,
    /// `0` when there is no commutator
    pub commutator_op: String,
    /// `0` when there is no negator
    pub negator_op: String,
    pub restrict_function: String,
    pub join_function: String,
    pub can_hash: bool,
    pub can_merge: bool,
}

impl FromCatalogRow for Operator {
    fn from_row<R: CatalogRow>(row: &R) -> Result<Self, CatalogError> {
        Ok(Self {
            oid: row.get_oid("oid")?,
            schema: row.get_string("schemaname")?,
            name: row.get_string("name")?,
            procedure_name: row.get_string("procedurename")?,
            left_arg_type: row.get_string("leftargtype")?,
            right_arg_type: row.get_string("rightargtype")?,
            commutator_op: row.get_string("commutatorop")?,
            negator_op: row.get_string("negatorop")?,
            restrict_function: row.get_string("restrictfunction")?,
            join_function: row.get_string("joinfunction")?,
            can_hash: row.get_bool("canhash")?,
            can_merge: row.get_bool("canmerge")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorFamily {
    pub oid: Oid,
    pub schema: String,
    pub name: String,
    pub index_method: String,
}

impl FromCatalogRow for OperatorFamily {
    fn from_row<R: CatalogRow>(row: &R) -> Result<Self, CatalogError> {
        Ok(Self {
            oid: row.get_oid("oid")?,
            schema: row.get_string("schemaname")?,
            name: row.get_string("name")?,
            index_method: row.get_string("indexmethod")?,
        })
    }
}

/// An operator class together with its member operators and support functions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorClass {
    pub oid: Oid,
    pub class_schema: String,
    pub class_name: String,
    pub family_schema: String,
    pub family_name: String,
    pub index_method: String,
    pub type_name: String,
    pub is_default: bool,
    /// `-` when the stored key type is the indexed type
    pub storage_type: String,
    /// Ordered by strategy number
    pub operators: Vec<OperatorClassOperator>,
    /// Ordered by support number
    pub functions: Vec<OperatorClassFunction>,
}

impl FromCatalogRow for OperatorClass {
    fn from_row<R: CatalogRow>(row: &R) -> Result<Self, CatalogError> {
        Ok(Self {
            oid: row.get_oid("oid")?,
            class_schema: row.get_string("classschema")?,
            class_name: row.get_string("classname")?,
            family_schema: row.get_string("familyschema")?,
            family_name: row.get_string("familyname")?,
            index_method: row.get_string("indexmethod")?,
            type_name: row.get_string("type")?,
            is_default: row.get_bool("isdefault")?,
            storage_type: row.get_string("storagetype")?,
            operators: Vec::new(),
            functions: Vec::new(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorClassOperator {
    pub class_oid: Oid,
    pub strategy_number: i16,
    /// Operator with argument types, e.g. `=(integer,integer)`
    pub operator: String,
    pub recheck: bool,
}

impl FromCatalogRow for OperatorClassOperator {
    fn from_row<R: CatalogRow>(row: &R) -> Result<Self, CatalogError> {
        Ok(Self {
            class_oid: row.get_oid("classoid")?,
            strategy_number: row.get_i16("strategynumber")?,
            operator: row.get_string("operator")?,
            recheck: row.get_bool("recheck")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorClassFunction {
    pub class_oid: Oid,
    pub support_number: i16,
    /// Function with argument types, e.g. `btint4cmp(integer,integer)`
    pub function_name: String,
}

impl FromCatalogRow for OperatorClassFunction {
    fn from_row<R: CatalogRow>(row: &R) -> Result<Self, CatalogError> {
        Ok(Self {
            class_oid: row.get_oid("classoid")?,
            support_number: row.get_i16("supportnumber")?,
            function_name: row.get_string("functionname")?,
        })
    }
}

pub(crate) fn operators_query() -> String {
    format!(
        "
SELECT
	o.oid,
	n.nspname AS schemaname,
	o.oprname AS name,
	o.oprcode::regproc::text AS procedurename,
	o.oprleft::regtype::text AS leftargtype,
	o.oprright::regtype::text AS rightargtype,
	o.oprcom::regoper::text AS commutatorop,
	o.oprnegate::regoper::text AS negatorop,
	o.oprrest::regproc::text AS restrictfunction,
	o.oprjoin::regproc::text AS joinfunction,
	o.oprcanmerge AS canmerge,
	o.oprcanhash AS canhash
FROM pg_operator o
JOIN pg_namespace n ON n.oid = o.oprnamespace
WHERE {} AND o.oprcode != 0
ORDER BY n.nspname, o.oprname, o.oid;",
        non_user_schema_filter("n")
    )
}

pub(crate) fn operator_families_query() -> String {
    format!(
        "
SELECT
	o.oid,
	n.nspname AS schemaname,
	o.opfname AS name,
	(SELECT amname FROM pg_am WHERE oid = o.opfmethod) AS indexmethod
FROM pg_opfamily o
JOIN pg_namespace n ON n.oid = o.opfnamespace
WHERE {}
ORDER BY n.nspname, o.opfname, o.oid;",
        non_user_schema_filter("n")
    )
}

pub(crate) fn operator_classes_query() -> String {
    format!(
        "
SELECT
	c.oid,
	cls_ns.nspname AS classschema,
	c.opcname AS classname,
	fam_ns.nspname AS familyschema,
	f.opfname AS familyname,
	(SELECT amname FROM pg_catalog.pg_am WHERE oid = c.opcmethod) AS indexmethod,
	c.opcintype::pg_catalog.regtype::pg_catalog.text AS type,
	c.opcdefault AS isdefault,
	c.opckeytype::pg_catalog.regtype::pg_catalog.text AS storagetype
FROM pg_catalog.pg_opclass c
LEFT JOIN pg_catalog.pg_opfamily f ON f.oid = c.opcfamily
JOIN pg_catalog.pg_namespace cls_ns ON cls_ns.oid = c.opcnamespace
JOIN pg_catalog.pg_namespace fam_ns ON fam_ns.oid = f.opfnamespace
WHERE {}
ORDER BY cls_ns.nspname, c.opcname, c.oid;",
        non_user_schema_filter("cls_ns")
    )
}

pub(crate) const OPERATOR_CLASS_OPERATORS_QUERY: &str = "
SELECT
	d.refobjid AS classoid,
	ao.amopstrategy AS strategynumber,
	ao.amopopr::pg_catalog.regoperator::pg_catalog.text AS operator,
	ao.amopreqcheck AS recheck
FROM pg_catalog.pg_amop ao, pg_catalog.pg_depend d
WHERE d.refclassid = 'pg_catalog.pg_opclass'::pg_catalog.regclass
AND d.classid = 'pg_catalog.pg_amop'::pg_catalog.regclass
AND d.objid = ao.oid
ORDER BY ao.amopstrategy, ao.oid;";

pub(crate) const OPERATOR_CLASS_FUNCTIONS_QUERY: &str = "
SELECT
	d.refobjid AS classoid,
	ap.amprocnum AS supportnumber,
	ap.amproc::pg_catalog.regprocedure::pg_catalog.text AS functionname
FROM pg_catalog.pg_amproc ap, pg_catalog.pg_depend d
WHERE d.refclassid = 'pg_catalog.pg_opclass'::pg_catalog.regclass
AND d.classid = 'pg_catalog.pg_amproc'::pg_catalog.regclass
AND d.objid = ap.oid
ORDER BY ap.amprocnum, ap.oid;";

impl<E: CatalogExecutor> CatalogReader<E> {
    /// User-defined operators backed by a function, ordered by schema, name, oid
    ///
    /// # Errors
    ///
    /// Returns `ExtractError` for [`CatalogKind::Operators`].
    pub fn operators(&self) -> Result<Vec<Operator>, ExtractError> {
        self.fetch_all(CatalogKind::Operators, &operators_query())
    }

    /// # Errors
    ///
    /// Returns `ExtractError` for [`CatalogKind::OperatorFamilies`].
    pub fn operator_families(&self) -> Result<Vec<OperatorFamily>, ExtractError> {
        self.fetch_all(CatalogKind::OperatorFamilies, &operator_families_query())
    }

    /// Operator classes in user schemas with their member operators and
    /// support functions attached
    ///
    /// Issues the class query, then the member-operator and member-function
    /// queries, and assembles them by class oid. Class order is the class
    /// query's order; member order is strategy / support number.
    ///
    /// # Errors
    ///
    /// Returns `ExtractError` for whichever of [`CatalogKind::OperatorClasses`],
    /// [`CatalogKind::OperatorClassOperators`] or
    /// [`CatalogKind::OperatorClassFunctions`] failed first. No classes are
    /// returned in that case.
    pub fn operator_classes(&self) -> Result<Vec<OperatorClass>, ExtractError> {
        let mut classes: Vec<OperatorClass> =
            self.fetch_all(CatalogKind::OperatorClasses, &operator_classes_query())?;

        let operators = self.operator_class_operators()?;
        let orphaned = attach_members(&mut classes, operators, |c| c.oid, |c| &mut c.operators);
        if orphaned > 0 {
            log::debug!(
                "{orphaned} operator class operators belong to classes outside user schemas"
            );
        }

        let functions = self.operator_class_functions()?;
        let orphaned = attach_members(&mut classes, functions, |c| c.oid, |c| &mut c.functions);
        if orphaned > 0 {
            log::debug!(
                "{orphaned} operator class functions belong to classes outside user schemas"
            );
        }

        Ok(classes)
    }

    /// Member operators of every operator class, grouped by class oid
    ///
    /// # Errors
    ///
    /// Returns `ExtractError` for [`CatalogKind::OperatorClassOperators`].
    pub fn operator_class_operators(
        &self,
    ) -> Result<HashMap<Oid, Vec<OperatorClassOperator>>, ExtractError> {
        let rows = self.fetch_all(
            CatalogKind::OperatorClassOperators,
            OPERATOR_CLASS_OPERATORS_QUERY,
        )?;
        Ok(group_by_owner(rows, |op: &OperatorClassOperator| op.class_oid))
    }

    /// Support functions of every operator class, grouped by class oid
    ///
    /// # Errors
    ///
    /// Returns `ExtractError` for [`CatalogKind::OperatorClassFunctions`].
    pub fn operator_class_functions(
        &self,
    ) -> Result<HashMap<Oid, Vec<OperatorClassFunction>>, ExtractError> {
        let rows = self.fetch_all(
            CatalogKind::OperatorClassFunctions,
            OPERATOR_CLASS_FUNCTIONS_QUERY,
        )?;
        Ok(group_by_owner(rows, |f: &OperatorClassFunction| f.class_oid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{MockExecutor, MockRow};

    fn class_row(oid: Oid, name: &str) -> MockRow {
        MockRow::new()
            .oid("oid", oid)
            .text("classschema", "public")
            .text("classname", name)
            .text("familyschema", "public")
            .text("familyname", name)
            .text("indexmethod", "btree")
            .text("type", "integer")
            .bool("isdefault", false)
            .text("storagetype", "-")
    }

    fn class_operator_row(class_oid: Oid, strategy: i64, operator: &str) -> MockRow {
        MockRow::new()
            .oid("classoid", class_oid)
            .int("strategynumber", strategy)
            .text("operator", operator)
            .bool("recheck", false)
    }

    fn class_function_row(class_oid: Oid, support: i64, function: &str) -> MockRow {
        MockRow::new()
            .oid("classoid", class_oid)
            .int("supportnumber", support)
            .text("functionname", function)
    }

    #[test]
    fn test_operator_mapping() {
        let mock = MockExecutor::new().respond(
            "FROM pg_operator o",
            vec![MockRow::new()
                .oid("oid", 16700)
                .text("schemaname", "public")
                .text("name", "##")
                .text("procedurename", "public.path_inter")
                .text("leftargtype", "path")
                .text("rightargtype", "path")
                .text("commutatorop", "public.##")
                .text("negatorop", "0")
                .text("restrictfunction", "-")
                .text("joinfunction", "-")
                .bool("canhash", false)
                .bool("canmerge", true)],
        );
        let operators = CatalogReader::new(&mock).operators().unwrap();
        assert_eq!(operators.len(), 1);
        assert_eq!(operators[0].name, "##");
        assert_eq!(operators[0].commutator_op, "public.##");
        assert!(operators[0].can_merge);
        assert!(!operators[0].can_hash);
    }

    #[test]
    fn test_operator_family_mapping() {
        let mock = MockExecutor::new().respond(
            "FROM pg_opfamily o",
            vec![MockRow::new()
                .oid("oid", 16800)
                .text("schemaname", "public")
                .text("name", "complex_abs_ops")
                .text("indexmethod", "btree")],
        );
        let families = CatalogReader::new(&mock).operator_families().unwrap();
        assert_eq!(
            families,
            vec![OperatorFamily {
                oid: 16800,
                schema: "public".to_string(),
                name: "complex_abs_ops".to_string(),
                index_method: "btree".to_string(),
            }]
        );
    }

    #[test]
    fn test_operator_class_assembly() {
        let mock = MockExecutor::new()
            .respond(
                "FROM pg_catalog.pg_opclass c",
                vec![class_row(100, "int_ops"), class_row(200, "empty_ops")],
            )
            .respond(
                "FROM pg_catalog.pg_amop ao",
                vec![
                    class_operator_row(100, 1, "<(integer,integer)"),
                    class_operator_row(100, 3, "=(integer,integer)"),
                ],
            )
            .respond(
                "FROM pg_catalog.pg_amproc ap",
                vec![class_function_row(100, 1, "btint4cmp(integer,integer)")],
            );

        let classes = CatalogReader::new(&mock).operator_classes().unwrap();
        assert_eq!(classes.len(), 2);

        let int_ops = &classes[0];
        assert_eq!(int_ops.oid, 100);
        let strategies: Vec<i16> = int_ops.operators.iter().map(|o| o.strategy_number).collect();
        assert_eq!(strategies, vec![1, 3]);
        assert_eq!(int_ops.functions.len(), 1);
        assert_eq!(int_ops.functions[0].support_number, 1);

        assert!(classes[1].operators.is_empty());
        assert!(classes[1].functions.is_empty());
        assert_eq!(mock.executed().len(), 3);
    }

    #[test]
    fn test_operator_class_members_only_from_owning_class() {
        let mock = MockExecutor::new()
            .respond(
                "FROM pg_catalog.pg_opclass c",
                vec![class_row(100, "a_ops"), class_row(101, "b_ops")],
            )
            .respond(
                "FROM pg_catalog.pg_amop ao",
                vec![
                    class_operator_row(101, 1, "<(text,text)"),
                    class_operator_row(100, 1, "<(int4,int4)"),
                    class_operator_row(403, 1, "<(oid,oid)"),
                    class_operator_row(100, 5, ">(int4,int4)"),
                ],
            )
            .respond("FROM pg_catalog.pg_amproc ap", vec![]);

        let classes = CatalogReader::new(&mock).operator_classes().unwrap();
        for class in &classes {
            assert!(class.operators.iter().all(|o| o.class_oid == class.oid));
            let strategies: Vec<i16> = class.operators.iter().map(|o| o.strategy_number).collect();
            let mut sorted = strategies.clone();
            sorted.sort_unstable();
            assert_eq!(strategies, sorted);
        }
        assert_eq!(classes[0].operators.len(), 2);
        assert_eq!(classes[1].operators.len(), 1);
    }

    #[test]
    fn test_operator_class_child_failure_returns_no_classes() {
        let mock = MockExecutor::new()
            .respond("FROM pg_catalog.pg_opclass c", vec![class_row(100, "int_ops")])
            .respond("FROM pg_catalog.pg_amop ao", vec![])
            .fail("FROM pg_catalog.pg_amproc ap", "column \"amprocnum\" does not exist");

        let err = CatalogReader::new(&mock).operator_classes().unwrap_err();
        assert_eq!(err.kind, CatalogKind::OperatorClassFunctions);
    }

    #[test]
    fn test_operator_class_query_filters_class_schema() {
        let sql = operator_classes_query();
        assert!(sql.contains(&non_user_schema_filter("cls_ns")));
        assert!(!sql.contains("fam_ns.nspname NOT"));
    }
}
