use std::collections::{BTreeSet, HashMap};

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};

use crate::entity::user;
use crate::models::shared::UserProjection;

/// Load owner projections for a result set in one query.
///
/// Missing, soft-deleted or `NULL` owners are simply absent from the map.
pub async fn load_owners<C, I>(db: &C, owner_ids: I) -> Result<HashMap<i32, UserProjection>, DbErr>
where
    C: ConnectionTrait,
    I: IntoIterator<Item = Option<i32>>,
{
    let ids: BTreeSet<i32> = owner_ids.into_iter().flatten().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(ids))
        .filter(user::Column::DeletedAt.is_null())
        .all(db)
        .await?;

    Ok(users
        .into_iter()
        .map(|u| (u.id, UserProjection::from(u)))
        .collect())
}

/// Single-row variant of [`load_owners`].
pub async fn load_owner<C: ConnectionTrait>(
    db: &C,
    owner_id: Option<i32>,
) -> Result<Option<UserProjection>, DbErr> {
    Ok(load_owners(db, [owner_id]).await?.into_values().next())
}
