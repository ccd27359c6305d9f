//! Lowering of [`Predicate`] trees into Sea-ORM conditions.

use sea_orm::{
    ColumnTrait, Condition, DbErr,
    sea_query::{BinOper, Expr, Func, SimpleExpr},
};

use super::predicate::{CompareOp, FieldKind, FieldValue, Predicate};

/// Escape LIKE wildcards so user input only ever matches literally.
///
/// The backslash is escaped first, then `%` and `_`; the generated pattern
/// declares `\` as its escape character.
pub(crate) fn escape_like_wildcards(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Lower `predicate` into a [`Condition`] over the columns `lookup` resolves.
///
/// `lookup` maps a wire field name to its column and declared kind.
///
/// # Errors
///
/// Returns [`DbErr::Custom`] when a leaf names a field `lookup` does not know
/// or carries a value of the wrong kind.
pub fn lower_predicate<C, F>(predicate: &Predicate, lookup: F) -> Result<Condition, DbErr>
where
    C: ColumnTrait + Copy,
    F: Fn(&str) -> Option<(C, FieldKind)>,
{
    let mut condition = Condition::all();
    for leaf in predicate.leaves() {
        condition = condition.add(lower_leaf(leaf, &lookup)?);
    }
    Ok(condition)
}

fn resolve<C, F>(field: &str, lookup: &F) -> Result<(C, FieldKind), DbErr>
where
    F: Fn(&str) -> Option<(C, FieldKind)>,
{
    lookup(field).ok_or_else(|| DbErr::Custom(format!("unknown filter field '{field}'")))
}

fn check_kind(field: &str, expected: FieldKind, value: &FieldValue) -> Result<(), DbErr> {
    if value.kind() == expected {
        Ok(())
    } else {
        Err(DbErr::Custom(format!(
            "field '{field}' is {expected:?}, got a {:?} value",
            value.kind()
        )))
    }
}

fn lower_leaf<C, F>(leaf: &Predicate, lookup: &F) -> Result<SimpleExpr, DbErr>
where
    C: ColumnTrait + Copy,
    F: Fn(&str) -> Option<(C, FieldKind)>,
{
    match leaf {
        Predicate::Compare { field, op, value } => {
            let (col, kind) = resolve(field, lookup)?;
            check_kind(field, kind, value)?;
            let value = value.clone();
            Ok(match op {
                CompareOp::Eq => col.eq(value),
                CompareOp::Ne => col.ne(value),
                CompareOp::Gt => col.gt(value),
                CompareOp::Gte => col.gte(value),
                CompareOp::Lt => col.lt(value),
                CompareOp::Lte => col.lte(value),
            })
        }
        Predicate::InList {
            field,
            values,
            negated,
        } => {
            let (col, kind) = resolve(field, lookup)?;
            for value in values {
                check_kind(field, kind, value)?;
            }
            match (values.is_empty(), negated) {
                // IN () never matches, NOT IN () never excludes
                (true, false) => Ok(Expr::val(1).eq(0)),
                (true, true) => Ok(Expr::val(1).eq(1)),
                (false, false) => Ok(col.is_in(values.iter().cloned())),
                (false, true) => Ok(col.is_not_in(values.iter().cloned())),
            }
        }
        Predicate::Null { field, is_null } => {
            let (col, _) = resolve(field, lookup)?;
            Ok(if *is_null {
                col.is_null()
            } else {
                col.is_not_null()
            })
        }
        Predicate::Contains {
            field,
            needle,
            negated,
        } => {
            let (col, kind) = resolve(field, lookup)?;
            if !kind.is_textual() {
                return Err(DbErr::Custom(format!(
                    "substring match is not supported on field '{field}'"
                )));
            }
            // the store's UPPER on both sides
            let column: SimpleExpr = Func::upper(Expr::col((col.entity_name(), col))).into();
            let needle: SimpleExpr =
                Func::upper(Expr::val(format!("%{}%", escape_like_wildcards(needle)))).into();
            let pattern = SimpleExpr::Binary(
                Box::new(needle),
                BinOper::Escape,
                Box::new(SimpleExpr::Constant('\\'.into())),
            );
            let op = if *negated {
                BinOper::NotLike
            } else {
                BinOper::Like
            };
            Ok(SimpleExpr::Binary(Box::new(column), op, Box::new(pattern)))
        }
        Predicate::And(_) => Err(DbErr::Custom(
            "nested conjunction reached the leaf lowering".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    mod probe {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
        #[sea_orm(table_name = "probe")]
        pub struct Model {
            #[sea_orm(primary_key)]
            pub id: i64,
            pub label: Option<String>,
            pub weight: Option<f64>,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    fn lookup(name: &str) -> Option<(probe::Column, FieldKind)> {
        match name {
            "id" => Some((probe::Column::Id, FieldKind::Long)),
            "label" => Some((probe::Column::Label, FieldKind::Text)),
            "weight" => Some((probe::Column::Weight, FieldKind::Double)),
            _ => None,
        }
    }

    fn sql_for(predicate: &Predicate) -> String {
        let condition = lower_predicate(predicate, lookup).unwrap();
        probe::Entity::find()
            .filter(condition)
            .build(DbBackend::Sqlite)
            .to_string()
    }

    #[test]
    fn test_wildcard_escaping() {
        assert_eq!(escape_like_wildcards("test"), "test");
        assert_eq!(escape_like_wildcards("100%"), "100\\%");
        assert_eq!(escape_like_wildcards("a_b"), "a\\_b");
        assert_eq!(escape_like_wildcards("\\%"), "\\\\\\%");
    }

    #[test]
    fn test_always_true_adds_no_constraint() {
        let sql = sql_for(&Predicate::always());
        assert!(
            !sql.contains("WHERE") || sql.ends_with("WHERE TRUE"),
            "{sql}"
        );
    }

    #[test]
    fn test_range_and_equality() {
        let sql = sql_for(&Predicate::and([
            Predicate::Compare {
                field: "id",
                op: CompareOp::Gte,
                value: FieldValue::Long(2),
            },
            Predicate::Compare {
                field: "weight",
                op: CompareOp::Lt,
                value: FieldValue::Double(3.5),
            },
        ]));
        assert!(sql.contains(r#""probe"."id" >= 2"#), "{sql}");
        assert!(sql.contains(r#""probe"."weight" < 3.5"#), "{sql}");
        assert!(sql.contains(" AND "), "{sql}");
    }

    #[test]
    fn test_contains_is_case_insensitive_and_escaped() {
        let sql = sql_for(&Predicate::Contains {
            field: "label",
            needle: "to%y".into(),
            negated: false,
        });
        assert!(sql.contains(r#"UPPER("probe"."label") LIKE UPPER('%to"#), "{sql}");
        assert!(sql.contains("%y%')"), "{sql}");
        assert!(sql.contains("ESCAPE"), "{sql}");
    }

    #[test]
    fn test_contains_folds_needle_in_the_store() {
        let sql = sql_for(&Predicate::Contains {
            field: "label",
            needle: "öl".into(),
            negated: true,
        });
        assert!(
            sql.contains(r#"UPPER("probe"."label") NOT LIKE UPPER('%öl%')"#),
            "{sql}"
        );
    }

    #[test]
    fn test_null_checks() {
        let sql = sql_for(&Predicate::Null {
            field: "label",
            is_null: false,
        });
        assert!(sql.contains(r#""probe"."label" IS NOT NULL"#), "{sql}");
    }

    #[test]
    fn test_unknown_field_is_an_error() {
        let err = lower_predicate(
            &Predicate::Null {
                field: "colour",
                is_null: true,
            },
            lookup,
        )
        .unwrap_err();
        assert!(matches!(err, DbErr::Custom(_)));
    }

    #[test]
    fn test_kind_mismatch_is_an_error() {
        let predicate = Predicate::Compare {
            field: "id",
            op: CompareOp::Eq,
            value: FieldValue::Text("1".into()),
        };
        assert!(lower_predicate(&predicate, lookup).is_err());
    }

    #[test]
    fn test_empty_in_list_matches_nothing() {
        let sql = sql_for(&Predicate::InList {
            field: "id",
            values: vec![],
            negated: false,
        });
        assert!(sql.contains("1 = 0"), "{sql}");
    }
}
