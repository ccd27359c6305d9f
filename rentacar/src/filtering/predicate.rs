//! Store-agnostic predicate tree.
//!
//! A [`Predicate`] is what a criteria object compiles into: a conjunction of
//! leaf comparisons over named fields. It carries no knowledge of SQL or of
//! any particular persistence layer; [`super::conditions`] lowers it into a
//! Sea-ORM `Condition`.

use chrono::{DateTime, Utc};
use std::fmt;

/// Scalar type of a filterable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// 64-bit integer (identifiers and foreign keys)
    Long,
    /// 64-bit float
    Double,
    /// Free text
    Text,
    /// UTC timestamp
    Timestamp,
}

impl FieldKind {
    /// Whether range operators (`greaterThan`, ...) apply to this kind.
    #[must_use]
    pub const fn is_ordered(self) -> bool {
        !matches!(self, Self::Text)
    }

    /// Whether substring operators (`contains`, ...) apply to this kind.
    #[must_use]
    pub const fn is_textual(self) -> bool {
        matches!(self, Self::Text)
    }
}

/// A typed value carried by a predicate leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Long(i64),
    Double(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Long(_) => FieldKind::Long,
            Self::Double(_) => FieldKind::Double,
            Self::Text(_) => FieldKind::Text,
            Self::Timestamp(_) => FieldKind::Timestamp,
        }
    }
}

impl From<FieldValue> for sea_orm::Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Long(v) => v.into(),
            FieldValue::Double(v) => v.into(),
            FieldValue::Text(v) => v.into(),
            FieldValue::Timestamp(v) => v.into(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
            Self::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
        }
    }
}

/// Binary comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

/// Boolean condition over an entity's fields.
///
/// Only conjunction is expressible: there is no `Or` node.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// All children must hold. An empty conjunction is always true.
    And(Vec<Predicate>),
    /// `field <op> value`
    Compare {
        field: &'static str,
        op: CompareOp,
        value: FieldValue,
    },
    /// `field IN (values)`, or `NOT IN` when negated.
    InList {
        field: &'static str,
        values: Vec<FieldValue>,
        negated: bool,
    },
    /// `field IS NULL`, or `IS NOT NULL` when `is_null` is false.
    Null { field: &'static str, is_null: bool },
    /// ASCII case-insensitive substring match, or its negation.
    Contains {
        field: &'static str,
        needle: String,
        negated: bool,
    },
}

impl Predicate {
    /// The predicate that matches every record.
    #[must_use]
    pub const fn always() -> Self {
        Self::And(Vec::new())
    }

    /// Conjunction of `parts`, flattening nested conjunctions.
    #[must_use]
    pub fn and(parts: impl IntoIterator<Item = Predicate>) -> Self {
        let mut flat = Vec::new();
        for part in parts {
            match part {
                Self::And(children) => flat.extend(children),
                leaf => flat.push(leaf),
            }
        }
        Self::And(flat)
    }

    #[must_use]
    pub fn is_always_true(&self) -> bool {
        matches!(self, Self::And(children) if children.iter().all(Self::is_always_true))
    }

    /// Leaf predicates in evaluation order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&Predicate> {
        match self {
            Self::And(children) => children.iter().flat_map(Self::leaves).collect(),
            leaf => vec![leaf],
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And(children) if children.is_empty() => write!(f, "TRUE"),
            Self::And(children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " AND ")?;
                    }
                    write!(f, "{child}")?;
                }
                Ok(())
            }
            Self::Compare { field, op, value } => write!(f, "{field} {} {value}", op.symbol()),
            Self::InList {
                field,
                values,
                negated,
            } => {
                let list: Vec<String> = values.iter().map(ToString::to_string).collect();
                let not = if *negated { "NOT " } else { "" };
                write!(f, "{field} {not}IN ({})", list.join(", "))
            }
            Self::Null { field, is_null } => {
                write!(f, "{field} IS {}NULL", if *is_null { "" } else { "NOT " })
            }
            Self::Contains {
                field,
                needle,
                negated,
            } => {
                let not = if *negated { "NOT " } else { "" };
                write!(f, "{field} {not}CONTAINS {needle:?}")
            }
        }
    }
}
