use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, FromQueryResult, IntoActiveModel, ModelTrait, Order, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use serde::{Serialize, de::DeserializeOwned};

use crate::filtering::{Criteria, FieldKind};

/// One filterable or sortable field: its JSON name, its column and its kind.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor<C> {
    pub name: &'static str,
    pub column: C,
    pub kind: FieldKind,
}

impl<C> FieldDescriptor<C> {
    pub const fn new(name: &'static str, column: C, kind: FieldKind) -> Self {
        Self { name, column, kind }
    }
}

/// DTO identity: equal iff both identifiers are present and equal.
#[must_use]
pub fn same_identity(a: Option<i64>, b: Option<i64>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}

/// A resource exposed over the API: the DTO of one entity, with the mapping
/// to and from its Sea-ORM model and the primary-store operations every
/// service builds on.
#[async_trait]
pub trait CrudResource:
    Clone + Serialize + DeserializeOwned + std::fmt::Debug + Send + Sync + 'static
{
    type EntityType: EntityTrait<Column = Self::ColumnType, Model = Self::ModelType> + Sync;
    type ColumnType: ColumnTrait + Copy + Send + Sync;
    type ModelType: ModelTrait<Entity = Self::EntityType>
        + FromQueryResult
        + IntoActiveModel<Self::ActiveModelType>
        + Clone
        + Send
        + Sync;
    type ActiveModelType: ActiveModelTrait<Entity = Self::EntityType>
        + ActiveModelBehavior
        + Send
        + Sync;

    const ID_COLUMN: Self::ColumnType;
    const RESOURCE_NAME_SINGULAR: &'static str;
    const RESOURCE_NAME_PLURAL: &'static str;

    /// Fields usable for sorting (and, for filterable resources, filtering).
    /// The identifier is implicit.
    const FIELDS: &'static [FieldDescriptor<Self::ColumnType>];

    fn id(&self) -> Option<i64>;

    fn from_model(model: Self::ModelType) -> Self;

    /// Full replacement: every field is written, the identifier only when
    /// present.
    fn into_active_model(self) -> Self::ActiveModelType;

    /// Merge-patch onto `existing`: only fields that are `Some` are written.
    fn merge_into_active_model(self, existing: Self::ModelType) -> Self::ActiveModelType;

    #[must_use]
    fn field(name: &str) -> Option<&'static FieldDescriptor<Self::ColumnType>> {
        Self::FIELDS.iter().find(|f| f.name == name)
    }

    /// Column and kind for a JSON field name, the identifier included.
    #[must_use]
    fn lookup_field(name: &str) -> Option<(Self::ColumnType, FieldKind)> {
        if name == "id" {
            return Some((Self::ID_COLUMN, FieldKind::Long));
        }
        Self::field(name).map(|f| (f.column, f.kind))
    }

    async fn find_model(
        db: &DatabaseConnection,
        id: i64,
    ) -> Result<Option<Self::ModelType>, DbErr> {
        Self::EntityType::find()
            .filter(Self::ID_COLUMN.eq(id))
            .one(db)
            .await
    }

    async fn get_one(db: &DatabaseConnection, id: i64) -> Result<Option<Self>, DbErr> {
        Ok(Self::find_model(db, id).await?.map(Self::from_model))
    }

    async fn get_all(
        db: &DatabaseConnection,
        condition: &Condition,
        order: &[(Self::ColumnType, Order)],
        offset: u64,
        limit: Option<u64>,
    ) -> Result<Vec<Self>, DbErr> {
        let mut query = Self::EntityType::find().filter(condition.clone());
        for (column, direction) in order {
            query = query.order_by(*column, direction.clone());
        }
        if offset > 0 {
            query = query.offset(offset);
        }
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        let models = query.all(db).await?;
        Ok(models.into_iter().map(Self::from_model).collect())
    }

    async fn total_count(db: &DatabaseConnection, condition: &Condition) -> Result<u64, DbErr> {
        let query = Self::EntityType::find().filter(condition.clone());
        PaginatorTrait::count(query, db).await
    }

    async fn insert(db: &DatabaseConnection, active: Self::ActiveModelType) -> Result<Self, DbErr> {
        let model = active.insert(db).await?;
        Ok(Self::from_model(model))
    }

    async fn update(db: &DatabaseConnection, active: Self::ActiveModelType) -> Result<Self, DbErr> {
        let model = active.update(db).await?;
        Ok(Self::from_model(model))
    }

    /// Delete by id, returning the number of rows removed.
    async fn delete(db: &DatabaseConnection, id: i64) -> Result<u64, DbErr> {
        let res = Self::EntityType::delete_many()
            .filter(Self::ID_COLUMN.eq(id))
            .exec(db)
            .await?;
        Ok(res.rows_affected)
    }
}

/// A resource that can be listed and counted through a criteria object.
pub trait Filterable: CrudResource {
    type Criteria: Criteria;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_identity() {
        assert!(same_identity(Some(1), Some(1)));
        assert!(!same_identity(Some(1), Some(2)));
        assert!(!same_identity(None, Some(1)));
        assert!(!same_identity(None, None));
    }
}
