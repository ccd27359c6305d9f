//! Criteria objects: one optional [`Filter`](super::Filter) per filterable
//! field of an entity.
//!
//! Criteria types are declared with the [`criteria!`](crate::criteria) macro,
//! which generates the struct, typed accessors and the [`Criteria`] impl that
//! maps wire names (`brandId`, `dailyPrice`, ...) to fields.

use thiserror::Error;

use super::predicate::{FieldKind, Predicate};

/// Errors raised while building criteria or paging parameters from a query
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CriteriaError {
    #[error("unknown filter field '{0}'")]
    UnknownField(String),

    #[error("operator '{operator}' is not supported on field '{field}'")]
    UnknownOperator { field: String, operator: String },

    #[error("invalid value '{value}' for {field}.{operator}: {reason}")]
    InvalidValue {
        field: String,
        operator: String,
        value: String,
        reason: String,
    },

    #[error("invalid value '{value}' for parameter '{name}'")]
    InvalidParameter { name: String, value: String },
}

/// The filterable view of an entity.
///
/// Cloning a criteria object yields a deep copy: the two never share filter
/// state.
pub trait Criteria: Clone + Default + std::fmt::Debug + PartialEq + Send + Sync + 'static {
    /// Wire names and kinds of every filterable field.
    const FIELDS: &'static [(&'static str, FieldKind)];

    /// Conjunction of the predicates of every set filter.
    fn to_predicate(&self) -> Predicate;

    /// Set `field.operator = raw`.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::UnknownField`] when `field` is not one of
    /// [`Self::FIELDS`], or the error of the underlying filter.
    fn set_filter(&mut self, field: &str, operator: &str, raw: &str) -> Result<(), CriteriaError>;

    /// Build criteria from decoded query pairs.
    ///
    /// Keys without a `.` (paging, sorting, anything else) are ignored.
    ///
    /// # Errors
    ///
    /// Returns the first [`CriteriaError`] encountered.
    fn from_query_pairs<'a, I>(pairs: I) -> Result<Self, CriteriaError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut criteria = Self::default();
        for (key, value) in pairs {
            if let Some((field, operator)) = key.split_once('.') {
                criteria.set_filter(field, operator, value)?;
            }
        }
        Ok(criteria)
    }
}

/// Declare a criteria struct.
///
/// ```rust,ignore
/// criteria! {
///     pub struct BrandCriteria {
///         id: i64 => "id",
///         brand_name: String => "brandName",
///     }
/// }
/// ```
#[macro_export]
macro_rules! criteria {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $field:ident : $scalar:ty => $wire:literal ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        $vis struct $name {
            $( pub $field: Option<$crate::filtering::Filter<$scalar>>, )*
        }

        impl $name {
            $(
                /// Filter on this field, created empty on first access.
                pub fn $field(&mut self) -> &mut $crate::filtering::Filter<$scalar> {
                    self.$field.get_or_insert_with(Default::default)
                }
            )*
        }

        impl $crate::filtering::Criteria for $name {
            const FIELDS: &'static [(&'static str, $crate::filtering::FieldKind)] = &[
                $( ($wire, <$scalar as $crate::filtering::FilterScalar>::KIND), )*
            ];

            fn to_predicate(&self) -> $crate::filtering::Predicate {
                let mut parts = Vec::new();
                $(
                    if let Some(filter) = &self.$field {
                        parts.extend(filter.to_predicates($wire));
                    }
                )*
                $crate::filtering::Predicate::and(parts)
            }

            fn set_filter(
                &mut self,
                field: &str,
                operator: &str,
                raw: &str,
            ) -> Result<(), $crate::filtering::CriteriaError> {
                match field {
                    $( $wire => self.$field().apply(field, operator, raw), )*
                    _ => Err($crate::filtering::CriteriaError::UnknownField(field.to_string())),
                }
            }
        }
    };
}
