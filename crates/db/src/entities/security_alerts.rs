//! `SeaORM` Entity for the security_alerts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "security_alerts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    /// Session the alert relates to, when there is one.
    pub session_id: Option<Uuid>,
    pub alert_type: String,
    pub severity: String,
    pub title: String,
    pub description: String,
    /// Typed metadata bag (`AlertMetadata` serialized as JSON).
    pub metadata: Json,
    /// Channels scheduled for delivery, recorded as intent only.
    pub channels_scheduled: Json,
    pub status: String,
    /// Append-only list of user actions: `{action, at, notes}`.
    pub actions: Json,
    pub read_at: Option<DateTimeWithTimeZone>,
    pub resolved_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
