//! Security alerts migration.
//!
//! Creates the security_alerts table: the durable log of security-relevant
//! events with per-user read/acknowledge/dismiss state.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(SECURITY_ALERTS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS security_alerts CASCADE;")
            .await?;
        Ok(())
    }
}

const SECURITY_ALERTS_SQL: &str = r"
-- Security alerts: durable log of security-relevant events
CREATE TABLE security_alerts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    session_id UUID,
    alert_type VARCHAR(40) NOT NULL,
    severity VARCHAR(10) NOT NULL
        CHECK (severity IN ('low', 'medium', 'high', 'critical')),
    title VARCHAR(255) NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
    channels_scheduled JSONB NOT NULL DEFAULT '[]'::jsonb,
    status VARCHAR(10) NOT NULL DEFAULT 'unread'
        CHECK (status IN ('unread', 'read', 'dismissed', 'resolved')),
    actions JSONB NOT NULL DEFAULT '[]'::jsonb,
    read_at TIMESTAMPTZ,
    resolved_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Index for a user's alert feed, newest first
CREATE INDEX idx_alerts_user_created ON security_alerts(user_id, created_at DESC);

-- Index for unread counts
CREATE INDEX idx_alerts_user_unread ON security_alerts(user_id) WHERE status = 'unread';

-- Index for the retention sweep (unread rows are never purged)
CREATE INDEX idx_alerts_purge ON security_alerts(created_at) WHERE status <> 'unread';
";
