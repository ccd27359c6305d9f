//! Per-field filters.
//!
//! A [`Filter<T>`] is the set of constraints a caller places on one field.
//! Every sub-field that is set must hold; a filter with nothing set matches
//! every record.
//!
//! On the wire each sub-field is addressed as `field.operator=value`:
//!
//! ```text
//! GET /api/cars?brandId.greaterThanOrEqual=5&description.contains=diesel
//! GET /api/cars?id.in=1,2,3&modelYear.specified=true
//! ```

use chrono::{DateTime, Utc};

use super::criteria::CriteriaError;
use super::predicate::{CompareOp, FieldKind, FieldValue, Predicate};

/// A scalar type that can be filtered on.
pub trait FilterScalar: Clone + PartialEq + std::fmt::Debug + Send + Sync + 'static {
    const KIND: FieldKind;

    /// Parse a raw query-string value.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when `raw` is not a valid value.
    fn parse(raw: &str) -> Result<Self, String>;

    fn into_field_value(self) -> FieldValue;
}

impl FilterScalar for i64 {
    const KIND: FieldKind = FieldKind::Long;

    fn parse(raw: &str) -> Result<Self, String> {
        raw.trim().parse().map_err(|e| format!("{e}"))
    }

    fn into_field_value(self) -> FieldValue {
        FieldValue::Long(self)
    }
}

impl FilterScalar for f64 {
    const KIND: FieldKind = FieldKind::Double;

    fn parse(raw: &str) -> Result<Self, String> {
        let value: f64 = raw.trim().parse().map_err(|e| format!("{e}"))?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err("value must be finite".to_string())
        }
    }

    fn into_field_value(self) -> FieldValue {
        FieldValue::Double(self)
    }
}

impl FilterScalar for String {
    const KIND: FieldKind = FieldKind::Text;

    fn parse(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }

    fn into_field_value(self) -> FieldValue {
        FieldValue::Text(self)
    }
}

impl FilterScalar for DateTime<Utc> {
    const KIND: FieldKind = FieldKind::Timestamp;

    fn parse(raw: &str) -> Result<Self, String> {
        DateTime::parse_from_rfc3339(raw.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| format!("expected an RFC 3339 timestamp: {e}"))
    }

    fn into_field_value(self) -> FieldValue {
        FieldValue::Timestamp(self)
    }
}

/// Constraints on a single field. All set sub-fields are combined with AND.
///
/// `specified` is the null check: `Some(true)` keeps only records where the
/// field is non-null, `Some(false)` only those where it is null.
///
/// Range bounds only take effect on ordered kinds (numbers, timestamps) and
/// `contains` / `does_not_contain` only on text.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter<T> {
    pub equals: Option<T>,
    pub not_equals: Option<T>,
    pub r#in: Option<Vec<T>>,
    pub not_in: Option<Vec<T>>,
    pub specified: Option<bool>,
    pub greater_than: Option<T>,
    pub greater_than_or_equal: Option<T>,
    pub less_than: Option<T>,
    pub less_than_or_equal: Option<T>,
    pub contains: Option<String>,
    pub does_not_contain: Option<String>,
}

pub type LongFilter = Filter<i64>;
pub type DoubleFilter = Filter<f64>;
pub type StringFilter = Filter<String>;
pub type TimestampFilter = Filter<DateTime<Utc>>;

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Self {
            equals: None,
            not_equals: None,
            r#in: None,
            not_in: None,
            specified: None,
            greater_than: None,
            greater_than_or_equal: None,
            less_than: None,
            less_than_or_equal: None,
            contains: None,
            does_not_contain: None,
        }
    }
}

impl<T: FilterScalar> Filter<T> {
    /// A filter requiring `field = value`.
    #[must_use]
    pub fn equal_to(value: T) -> Self {
        Self {
            equals: Some(value),
            ..Self::default()
        }
    }

    /// A filter on the field's presence.
    #[must_use]
    pub fn is_specified(specified: bool) -> Self {
        Self {
            specified: Some(specified),
            ..Self::default()
        }
    }

    /// True when no sub-field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Set one sub-field from its wire form.
    ///
    /// `in` / `notIn` take comma-separated values and accumulate across
    /// repeated parameters.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::UnknownOperator`] for operators that do not
    /// exist or do not apply to `T`, and [`CriteriaError::InvalidValue`] when
    /// `raw` cannot be parsed.
    pub fn apply(&mut self, field: &str, operator: &str, raw: &str) -> Result<(), CriteriaError> {
        let parse = |raw: &str| {
            T::parse(raw).map_err(|reason| CriteriaError::InvalidValue {
                field: field.to_string(),
                operator: operator.to_string(),
                value: raw.to_string(),
                reason,
            })
        };
        let parse_list = |raw: &str| -> Result<Vec<T>, CriteriaError> {
            raw.split(',').filter(|s| !s.trim().is_empty()).map(parse).collect()
        };

        match operator {
            "equals" => self.equals = Some(parse(raw)?),
            "notEquals" => self.not_equals = Some(parse(raw)?),
            "in" => self.r#in.get_or_insert_with(Vec::new).extend(parse_list(raw)?),
            "notIn" => self.not_in.get_or_insert_with(Vec::new).extend(parse_list(raw)?),
            "specified" => {
                let specified = raw.trim().parse::<bool>().map_err(|e| CriteriaError::InvalidValue {
                    field: field.to_string(),
                    operator: operator.to_string(),
                    value: raw.to_string(),
                    reason: e.to_string(),
                })?;
                self.specified = Some(specified);
            }
            "greaterThan" if T::KIND.is_ordered() => self.greater_than = Some(parse(raw)?),
            "greaterThanOrEqual" if T::KIND.is_ordered() => {
                self.greater_than_or_equal = Some(parse(raw)?);
            }
            "lessThan" if T::KIND.is_ordered() => self.less_than = Some(parse(raw)?),
            "lessThanOrEqual" if T::KIND.is_ordered() => {
                self.less_than_or_equal = Some(parse(raw)?);
            }
            "contains" if T::KIND.is_textual() => self.contains = Some(raw.to_string()),
            "doesNotContain" if T::KIND.is_textual() => {
                self.does_not_contain = Some(raw.to_string());
            }
            _ => {
                return Err(CriteriaError::UnknownOperator {
                    field: field.to_string(),
                    operator: operator.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Leaf predicates for every set sub-field, in a fixed order.
    #[must_use]
    pub fn to_predicates(&self, field: &'static str) -> Vec<Predicate> {
        let compare = |op, value: &T| Predicate::Compare {
            field,
            op,
            value: value.clone().into_field_value(),
        };
        let list = |values: &[T], negated| Predicate::InList {
            field,
            values: values.iter().cloned().map(FilterScalar::into_field_value).collect(),
            negated,
        };

        let mut out = Vec::new();
        if let Some(v) = &self.equals {
            out.push(compare(CompareOp::Eq, v));
        }
        if let Some(v) = &self.not_equals {
            out.push(compare(CompareOp::Ne, v));
        }
        if let Some(values) = &self.r#in {
            out.push(list(values, false));
        }
        if let Some(values) = &self.not_in {
            out.push(list(values, true));
        }
        if let Some(specified) = self.specified {
            out.push(Predicate::Null {
                field,
                is_null: !specified,
            });
        }
        if T::KIND.is_ordered() {
            if let Some(v) = &self.greater_than {
                out.push(compare(CompareOp::Gt, v));
            }
            if let Some(v) = &self.greater_than_or_equal {
                out.push(compare(CompareOp::Gte, v));
            }
            if let Some(v) = &self.less_than {
                out.push(compare(CompareOp::Lt, v));
            }
            if let Some(v) = &self.less_than_or_equal {
                out.push(compare(CompareOp::Lte, v));
            }
        }
        if T::KIND.is_textual() {
            if let Some(needle) = &self.contains {
                out.push(Predicate::Contains {
                    field,
                    needle: needle.clone(),
                    negated: false,
                });
            }
            if let Some(needle) = &self.does_not_contain {
                out.push(Predicate::Contains {
                    field,
                    needle: needle.clone(),
                    negated: true,
                });
            }
        }
        out
    }
}
