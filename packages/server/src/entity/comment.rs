use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub message: String,

    /// The author; not necessarily the photo's owner.
    pub user_id: Option<i32>,
    #[sea_orm(belongs_to, from = "user_id", to = "id", on_update = "Cascade", on_delete = "SetNull")]
    pub user: HasOne<super::user::Entity>,

    pub photo_id: Option<i32>,
    #[sea_orm(belongs_to, from = "photo_id", to = "id", on_update = "Cascade", on_delete = "SetNull")]
    pub photo: HasOne<super::photo::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
