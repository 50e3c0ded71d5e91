//! `SeaORM` Entity for the sessions table.
//!
//! One row per login lineage: refresh-token rotation updates the row in
//! place rather than inserting a new one.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    /// Rotation lineage identifier, unique per session.
    pub refresh_token_family: Uuid,
    pub refresh_token_hash: String,
    // Device fingerprint.
    pub device_type: String,
    pub device_os: String,
    pub device_app: String,
    pub device_raw: String,
    // Location fingerprint.
    pub ip_address: String,
    pub country: String,
    pub country_code: String,
    pub region: String,
    pub city: String,
    pub timezone: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub network_operator: String,
    // Security flags.
    pub is_vpn: bool,
    pub is_proxy: bool,
    pub is_tor: bool,
    pub risk_score: i16,
    pub risk_level: String,
    pub requires_verification: bool,
    pub verified_at: Option<DateTimeWithTimeZone>,
    // Lifecycle.
    pub is_active: bool,
    pub login_method: String,
    pub total_duration_secs: i64,
    pub refresh_count: i32,
    pub created_at: DateTimeWithTimeZone,
    pub last_active_at: DateTimeWithTimeZone,
    pub expires_at: DateTimeWithTimeZone,
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
