//! Postgres-backed store.
//!
//! Part rows go through [`PartRecord`] so null thresholds and negative
//! quantities are normalized on the way in. Requisitions are stored as a JSON
//! snapshot next to a `version` column used for optimistic concurrency.
//! Service scope steps are a JSONB array of `{id, text}` objects.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | Database, code `23505` (unique violation) | `Conflict` |
//! | Row decode / column type mismatch | `Malformed` |
//! | Anything else (pool closed, IO, TLS) | `Unavailable` |

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::instrument;
use uuid::Uuid;

use sparekeep_auth::{AccountStatus, StoredProfile};
use sparekeep_core::{
    ExpectedVersion, MovementId, NotificationId, PartId, RequisitionId, ServiceScopeId, UserId,
};
use sparekeep_inventory::{Movement, Part, PartRecord};
use sparekeep_requisitions::{Notification, RequisitionCategory, RequisitionSnapshot, ServiceScope};

use super::{PartStore, StoreError, StoreResult};

/// Tables used by [`PostgresStore`]. Idempotent.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS parts (
    id              UUID PRIMARY KEY,
    sku             TEXT NOT NULL,
    name            TEXT NOT NULL,
    category        TEXT NOT NULL,
    quantity        BIGINT NOT NULL DEFAULT 0,
    min_quantity    BIGINT,
    location        TEXT NOT NULL DEFAULT '',
    unit            TEXT NOT NULL DEFAULT 'UN',
    unit_cost_cents BIGINT NOT NULL DEFAULT 0,
    supplier        TEXT NOT NULL DEFAULT '',
    lead_time_days  BIGINT NOT NULL DEFAULT 0,
    manufacturer    TEXT NOT NULL DEFAULT '',
    model           TEXT NOT NULL DEFAULT '',
    specs           JSONB NOT NULL DEFAULT '{}'::jsonb,
    image_url       TEXT,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS part_movements (
    id          UUID PRIMARY KEY,
    part_id     UUID NOT NULL REFERENCES parts(id),
    occurred_at TIMESTAMPTZ NOT NULL,
    kind        TEXT NOT NULL,
    quantity    BIGINT NOT NULL,
    responsible TEXT NOT NULL DEFAULT '',
    reference   TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS profiles (
    id         UUID PRIMARY KEY,
    full_name  TEXT,
    username   TEXT,
    email      TEXT,
    role       TEXT,
    status     TEXT,
    department TEXT,
    avatar_url TEXT
);

CREATE TABLE IF NOT EXISTS requisitions (
    id           UUID PRIMARY KEY,
    category     TEXT NOT NULL,
    requested_by UUID NOT NULL,
    status       TEXT NOT NULL,
    submitted_at TIMESTAMPTZ NOT NULL,
    version      BIGINT NOT NULL,
    body         JSONB NOT NULL
);

CREATE TABLE IF NOT EXISTS notifications (
    id         UUID PRIMARY KEY,
    user_id    UUID NOT NULL,
    title      TEXT NOT NULL,
    message    TEXT NOT NULL,
    kind       TEXT NOT NULL,
    read       BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS service_scopes (
    id            UUID PRIMARY KEY,
    title         TEXT NOT NULL,
    date          DATE,
    location      TEXT NOT NULL DEFAULT '',
    service_type  TEXT NOT NULL,
    suppliers     TEXT NOT NULL DEFAULT '',
    steps         JSONB NOT NULL DEFAULT '[]'::jsonb,
    safety_norms  TEXT NOT NULL DEFAULT '',
    documentation TEXT NOT NULL DEFAULT '',
    user_id       UUID NOT NULL,
    status        TEXT NOT NULL,
    created_at    TIMESTAMPTZ NOT NULL
);
"#;

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create missing tables.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

const PART_COLUMNS: &str = "id, sku, name, category, quantity, min_quantity, location, unit, \
    unit_cost_cents, supplier, lead_time_days, manufacturer, model, specs, image_url";

#[async_trait]
impl PartStore for PostgresStore {
    #[instrument(skip(self), err)]
    async fn fetch_parts(&self) -> StoreResult<Vec<Part>> {
        let rows = sqlx::query(&format!(
            "SELECT {PART_COLUMNS} FROM parts ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("fetch_parts", e))?;

        rows.iter()
            .map(|row| part_record(row).map(PartRecord::into_part))
            .collect()
    }

    #[instrument(skip(self), fields(part_id = %id), err)]
    async fn fetch_part(&self, id: PartId) -> StoreResult<Option<Part>> {
        let row = sqlx::query(&format!("SELECT {PART_COLUMNS} FROM parts WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("fetch_part", e))?;

        row.as_ref()
            .map(|row| part_record(row).map(PartRecord::into_part))
            .transpose()
    }

    #[instrument(skip(self), fields(part_id = %part_id), err)]
    async fn fetch_movements(&self, part_id: PartId) -> StoreResult<Vec<Movement>> {
        let rows = sqlx::query(
            r#"
            SELECT id, part_id, occurred_at, kind, quantity, responsible, reference
            FROM part_movements
            WHERE part_id = $1
            ORDER BY occurred_at DESC
            "#,
        )
        .bind(part_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("fetch_movements", e))?;

        rows.iter()
            .map(|row| {
                let quantity: i64 = row.try_get("quantity").map_err(malformed)?;
                Ok(Movement {
                    id: MovementId::from_uuid(row.try_get("id").map_err(malformed)?),
                    part_id: PartId::from_uuid(row.try_get("part_id").map_err(malformed)?),
                    occurred_at: row.try_get("occurred_at").map_err(malformed)?,
                    kind: from_text(row.try_get("kind").map_err(malformed)?)?,
                    quantity: u32::try_from(quantity.max(0)).unwrap_or(u32::MAX),
                    responsible: row.try_get("responsible").map_err(malformed)?,
                    reference: row.try_get("reference").map_err(malformed)?,
                })
            })
            .collect()
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn fetch_profile(&self, id: UserId) -> StoreResult<Option<StoredProfile>> {
        let row = sqlx::query(
            r#"
            SELECT id, full_name, username, email, role, status, department, avatar_url
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("fetch_profile", e))?;

        row.as_ref().map(profile_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list_profiles(&self) -> StoreResult<Vec<StoredProfile>> {
        let rows = sqlx::query(
            r#"
            SELECT id, full_name, username, email, role, status, department, avatar_url
            FROM profiles
            ORDER BY id
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_profiles", e))?;

        rows.iter().map(profile_row).collect()
    }

    #[instrument(skip(self), fields(user_id = %id, status = status.as_str()), err)]
    async fn set_profile_status(&self, id: UserId, status: AccountStatus) -> StoreResult<()> {
        let result = sqlx::query("UPDATE profiles SET status = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(status.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_profile_status", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn list_requisitions(
        &self,
        category: Option<RequisitionCategory>,
    ) -> StoreResult<Vec<RequisitionSnapshot>> {
        let rows = sqlx::query(
            r#"
            SELECT body
            FROM requisitions
            WHERE $1::text IS NULL OR category = $1
            ORDER BY submitted_at DESC, id DESC
            "#,
        )
        .bind(category.map(to_text).transpose()?)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_requisitions", e))?;

        rows.iter().map(requisition_body).collect()
    }

    #[instrument(skip(self), fields(requisition_id = %id), err)]
    async fn load_requisition(&self, id: RequisitionId) -> StoreResult<Option<RequisitionSnapshot>> {
        let row = sqlx::query("SELECT body FROM requisitions WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("load_requisition", e))?;

        row.as_ref().map(requisition_body).transpose()
    }

    #[instrument(
        skip(self, snapshot),
        fields(requisition_id = %snapshot.id, version = snapshot.version, expected = ?expected),
        err
    )]
    async fn save_requisition(
        &self,
        snapshot: RequisitionSnapshot,
        expected: ExpectedVersion,
    ) -> StoreResult<()> {
        let body = serde_json::to_value(&snapshot)
            .map_err(|e| StoreError::Malformed(format!("requisition serialization failed: {e}")))?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let current: Option<i64> = sqlx::query("SELECT version FROM requisitions WHERE id = $1 FOR UPDATE")
            .bind(snapshot.id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("check_version", e))?
            .map(|row| row.try_get::<i64, _>("version"))
            .transpose()
            .map_err(malformed)?;

        let current = current.unwrap_or(0).max(0) as u64;
        if let Err(e) = expected.check(current) {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::Conflict(e.to_string()));
        }

        sqlx::query(
            r#"
            INSERT INTO requisitions (id, category, requested_by, status, submitted_at, version, body)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE
            SET status = EXCLUDED.status, version = EXCLUDED.version, body = EXCLUDED.body
            "#,
        )
        .bind(snapshot.id.as_uuid())
        .bind(to_text(snapshot.category())?)
        .bind(snapshot.requested_by.as_uuid())
        .bind(to_text(snapshot.status)?)
        .bind(snapshot.submitted_at)
        .bind(snapshot.version as i64)
        .bind(&body)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("save_requisition", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(())
    }

    #[instrument(skip(self, notification), fields(user_id = %notification.user_id), err)]
    async fn insert_notification(&self, notification: Notification) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, title, message, kind, read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(notification.id.as_uuid())
        .bind(notification.user_id.as_uuid())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(to_text(notification.kind)?)
        .bind(notification.read)
        .bind(notification.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_notification", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %user_id), err)]
    async fn list_notifications(&self, user_id: UserId) -> StoreResult<Vec<Notification>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, title, message, kind, read, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_notifications", e))?;

        rows.iter()
            .map(|row| {
                let created_at: DateTime<Utc> = row.try_get("created_at").map_err(malformed)?;
                Ok(Notification {
                    id: NotificationId::from_uuid(row.try_get("id").map_err(malformed)?),
                    user_id: UserId::from_uuid(row.try_get("user_id").map_err(malformed)?),
                    title: row.try_get("title").map_err(malformed)?,
                    message: row.try_get("message").map_err(malformed)?,
                    kind: from_text(row.try_get("kind").map_err(malformed)?)?,
                    read: row.try_get("read").map_err(malformed)?,
                    created_at,
                })
            })
            .collect()
    }

    #[instrument(skip(self), fields(user_id = %user_id, notification_id = %id), err)]
    async fn mark_notification_read(&self, user_id: UserId, id: NotificationId) -> StoreResult<()> {
        let result = sqlx::query("UPDATE notifications SET read = true WHERE id = $1 AND user_id = $2")
            .bind(id.as_uuid())
            .bind(user_id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("mark_notification_read", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self, scope), fields(scope_id = %scope.id), err)]
    async fn insert_service_scope(&self, scope: ServiceScope) -> StoreResult<()> {
        let steps = serde_json::to_value(&scope.steps)
            .map_err(|e| StoreError::Malformed(format!("scope steps serialization failed: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO service_scopes
                (id, title, date, location, service_type, suppliers, steps,
                 safety_norms, documentation, user_id, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(scope.id.as_uuid())
        .bind(&scope.title)
        .bind(scope.date)
        .bind(&scope.location)
        .bind(to_text(scope.service_type)?)
        .bind(&scope.suppliers)
        .bind(&steps)
        .bind(&scope.safety_norms)
        .bind(&scope.documentation)
        .bind(scope.created_by.as_uuid())
        .bind(to_text(scope.status)?)
        .bind(scope.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_service_scope", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn list_service_scopes(&self) -> StoreResult<Vec<ServiceScope>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, date, location, service_type, suppliers, steps,
                   safety_norms, documentation, user_id, status, created_at
            FROM service_scopes
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_service_scopes", e))?;

        rows.iter().map(scope_row).collect()
    }
}

fn scope_row(row: &PgRow) -> StoreResult<ServiceScope> {
    let steps: serde_json::Value = row.try_get("steps").map_err(malformed)?;
    Ok(ServiceScope {
        id: ServiceScopeId::from_uuid(row.try_get("id").map_err(malformed)?),
        title: row.try_get("title").map_err(malformed)?,
        date: row.try_get("date").map_err(malformed)?,
        location: row.try_get("location").map_err(malformed)?,
        service_type: from_text(row.try_get("service_type").map_err(malformed)?)?,
        suppliers: row.try_get("suppliers").map_err(malformed)?,
        steps: serde_json::from_value(steps)
            .map_err(|e| StoreError::Malformed(format!("scope steps: {e}")))?,
        safety_norms: row.try_get("safety_norms").map_err(malformed)?,
        documentation: row.try_get("documentation").map_err(malformed)?,
        created_by: UserId::from_uuid(row.try_get("user_id").map_err(malformed)?),
        status: from_text(row.try_get("status").map_err(malformed)?)?,
        created_at: row.try_get("created_at").map_err(malformed)?,
    })
}

fn part_record(row: &PgRow) -> StoreResult<PartRecord> {
    let specs: serde_json::Value = row.try_get("specs").map_err(malformed)?;
    let specs: BTreeMap<String, String> = serde_json::from_value(specs)
        .map_err(|e| StoreError::Malformed(format!("part specs: {e}")))?;
    let category: String = row.try_get("category").map_err(malformed)?;

    Ok(PartRecord {
        id: PartId::from_uuid(row.try_get::<Uuid, _>("id").map_err(malformed)?),
        sku: row.try_get("sku").map_err(malformed)?,
        name: row.try_get("name").map_err(malformed)?,
        category: category
            .parse()
            .map_err(|e| StoreError::Malformed(format!("part category: {e}")))?,
        quantity: row.try_get("quantity").map_err(malformed)?,
        min_quantity: row.try_get("min_quantity").map_err(malformed)?,
        location: row.try_get("location").map_err(malformed)?,
        unit: row.try_get("unit").map_err(malformed)?,
        unit_cost_cents: row.try_get("unit_cost_cents").map_err(malformed)?,
        supplier: row.try_get("supplier").map_err(malformed)?,
        lead_time_days: row.try_get("lead_time_days").map_err(malformed)?,
        manufacturer: row.try_get("manufacturer").map_err(malformed)?,
        model: row.try_get("model").map_err(malformed)?,
        specs,
        image_url: row.try_get("image_url").map_err(malformed)?,
    })
}

fn profile_row(row: &PgRow) -> StoreResult<StoredProfile> {
    Ok(StoredProfile {
        id: UserId::from_uuid(row.try_get("id").map_err(malformed)?),
        full_name: row.try_get("full_name").map_err(malformed)?,
        username: row.try_get("username").map_err(malformed)?,
        email: row.try_get("email").map_err(malformed)?,
        role: row.try_get("role").map_err(malformed)?,
        status: row.try_get("status").map_err(malformed)?,
        department: row.try_get("department").map_err(malformed)?,
        avatar_url: row.try_get("avatar_url").map_err(malformed)?,
    })
}

fn requisition_body(row: &PgRow) -> StoreResult<RequisitionSnapshot> {
    let body: serde_json::Value = row.try_get("body").map_err(malformed)?;
    serde_json::from_value(body).map_err(|e| StoreError::Malformed(format!("requisition body: {e}")))
}

/// Snake-case text form of a unit enum, as stored in text columns.
fn to_text<T: Serialize>(value: T) -> StoreResult<String> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => Ok(s),
        Ok(other) => Err(StoreError::Malformed(format!("expected string enum, got {other}"))),
        Err(e) => Err(StoreError::Malformed(e.to_string())),
    }
}

fn from_text<T: DeserializeOwned>(text: String) -> StoreResult<T> {
    serde_json::from_value(serde_json::Value::String(text))
        .map_err(|e| StoreError::Malformed(e.to_string()))
}

fn malformed(err: sqlx::Error) -> StoreError {
    StoreError::Malformed(err.to_string())
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {operation}: {}", db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                _ => StoreError::Unavailable(msg),
            }
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_) | sqlx::Error::Decode(_) => {
            StoreError::Malformed(format!("decode error in {operation}: {err}"))
        }
        sqlx::Error::RowNotFound => StoreError::NotFound,
        _ => StoreError::Unavailable(format!("sqlx error in {operation}: {err}")),
    }
}
