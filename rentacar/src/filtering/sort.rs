use sea_orm::{ColumnTrait, sea_query::Order};

/// Direction of one sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn as_order(self) -> Order {
        match self {
            Self::Asc => Order::Asc,
            Self::Desc => Order::Desc,
        }
    }
}

/// One `sort=field,direction` request parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub field: String,
    pub direction: SortDirection,
}

impl SortOrder {
    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Parse `field` or `field,asc|desc`. The direction is case-insensitive
    /// and anything but `desc` sorts ascending. Returns `None` for an empty
    /// field name.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let (field, direction) = match raw.split_once(',') {
            Some((field, dir)) if dir.trim().eq_ignore_ascii_case("desc") => {
                (field, SortDirection::Desc)
            }
            Some((field, _)) => (field, SortDirection::Asc),
            None => (raw, SortDirection::Asc),
        };
        let field = field.trim();
        if field.is_empty() {
            None
        } else {
            Some(Self {
                field: field.to_string(),
                direction,
            })
        }
    }

    /// Wire form, `field,asc` or `field,desc`.
    #[must_use]
    pub fn to_param(&self) -> String {
        let dir = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        format!("{},{dir}", self.field)
    }
}

/// Resolve requested sort keys to columns, appending `id ASC` as a tiebreak
/// unless the caller already sorts on id.
///
/// Keys naming unknown fields are dropped.
pub fn resolve_sort<C, F>(sort: &[SortOrder], id_column: C, lookup: F) -> Vec<(C, Order)>
where
    C: ColumnTrait + Copy,
    F: Fn(&str) -> Option<C>,
{
    let mut resolved = Vec::with_capacity(sort.len() + 1);
    let mut sorts_on_id = false;
    for order in sort {
        if order.field == "id" {
            sorts_on_id = true;
            resolved.push((id_column, order.direction.as_order()));
        } else if let Some(col) = lookup(&order.field) {
            resolved.push((col, order.direction.as_order()));
        } else {
            tracing::debug!(field = %order.field, "ignoring sort on unknown field");
        }
    }
    if !sorts_on_id {
        resolved.push((id_column, Order::Asc));
    }
    resolved
}
