//! Database seeder for CiviTrack development and testing.
//!
//! Seeds one user per role for local development. Every seeded account
//! uses the password `password123`.
//!
//! Usage: cargo run --bin seeder

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use civitrack_core::auth::{UserRole, hash_password};
use civitrack_db::entities::users;

/// Test citizen ID (consistent for all seeds)
const CITIZEN_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Test department staff ID (consistent for all seeds)
const DEPARTMENT_ID: &str = "00000000-0000-0000-0000-000000000002";
/// Test admin ID (consistent for all seeds)
const ADMIN_ID: &str = "00000000-0000-0000-0000-000000000003";

/// Password for every seeded account.
const SEED_PASSWORD: &str = "password123";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = civitrack_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding users...");
    seed_user(&db, CITIZEN_ID, "citizen@civitrack.dev", "Cita Zen", UserRole::Citizen).await;
    seed_user(
        &db,
        DEPARTMENT_ID,
        "roads@civitrack.dev",
        "Road Works Staff",
        UserRole::Department,
    )
    .await;
    seed_user(&db, ADMIN_ID, "admin@civitrack.dev", "City Admin", UserRole::Admin).await;

    println!("Seeding complete!");
}

/// Seeds one user, skipping it when the fixed id already exists.
async fn seed_user(db: &DatabaseConnection, id: &str, email: &str, name: &str, role: UserRole) {
    let user_id = Uuid::parse_str(id).expect("seed id is a valid uuid");

    if users::Entity::find_by_id(user_id)
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  {email} already exists, skipping...");
        return;
    }

    let password_hash = hash_password(SEED_PASSWORD).expect("Failed to hash seed password");

    let user = users::ActiveModel {
        id: Set(user_id),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        full_name: Set(name.to_string()),
        role: Set(role.to_string()),
        ..Default::default()
    };
    user.insert(db).await.expect("Failed to seed user");

    println!("  Seeded {email} ({role})");
}
