//! Sessions migration.
//!
//! Creates the sessions table: one row per login lineage with the device/
//! location fingerprint and risk assessment captured at creation.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(SESSIONS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS sessions CASCADE;")
            .await?;
        Ok(())
    }
}

const SESSIONS_SQL: &str = r"
-- Sessions table for login tracking and refresh token management
CREATE TABLE sessions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    refresh_token_family UUID NOT NULL UNIQUE,
    refresh_token_hash VARCHAR(64) NOT NULL,

    -- Device fingerprint
    device_type VARCHAR(10) NOT NULL DEFAULT 'unknown'
        CHECK (device_type IN ('mobile', 'tablet', 'desktop', 'web', 'unknown')),
    device_os VARCHAR(64) NOT NULL DEFAULT 'Unknown',
    device_app VARCHAR(64) NOT NULL DEFAULT 'Unknown',
    device_raw VARCHAR(256) NOT NULL DEFAULT '',

    -- Location fingerprint
    ip_address VARCHAR(45) NOT NULL,
    country VARCHAR(64) NOT NULL DEFAULT 'Unknown',
    country_code VARCHAR(2) NOT NULL DEFAULT '--',
    region VARCHAR(64) NOT NULL DEFAULT 'Unknown',
    city VARCHAR(64) NOT NULL DEFAULT 'Unknown',
    timezone VARCHAR(64) NOT NULL DEFAULT 'UTC',
    latitude DOUBLE PRECISION,
    longitude DOUBLE PRECISION,
    network_operator VARCHAR(128) NOT NULL DEFAULT '',

    -- Security flags
    is_vpn BOOLEAN NOT NULL DEFAULT false,
    is_proxy BOOLEAN NOT NULL DEFAULT false,
    is_tor BOOLEAN NOT NULL DEFAULT false,
    risk_score SMALLINT NOT NULL DEFAULT 0
        CHECK (risk_score >= 0 AND risk_score <= 100),
    risk_level VARCHAR(10) NOT NULL DEFAULT 'low'
        CHECK (risk_level IN ('low', 'medium', 'high')),
    requires_verification BOOLEAN NOT NULL DEFAULT false,
    verified_at TIMESTAMPTZ,

    -- Lifecycle
    is_active BOOLEAN NOT NULL DEFAULT true,
    login_method VARCHAR(10) NOT NULL DEFAULT 'password'
        CHECK (login_method IN ('password', 'otp', 'social', 'biometric')),
    total_duration_secs BIGINT NOT NULL DEFAULT 0,
    refresh_count INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    last_active_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    expires_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT chk_expires_future CHECK (expires_at > created_at)
);

-- Index for refresh token lookup (most common operation)
CREATE INDEX idx_sessions_token_hash ON sessions(refresh_token_hash) WHERE is_active;

-- Index for a user's active sessions ordered by recency
CREATE INDEX idx_sessions_user_active ON sessions(user_id, last_active_at DESC) WHERE is_active;

-- Index for cleanup of expired and stale sessions
CREATE INDEX idx_sessions_expires ON sessions(expires_at);
CREATE INDEX idx_sessions_stale ON sessions(last_active_at) WHERE NOT is_active;
";
