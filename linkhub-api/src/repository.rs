use chrono::{DateTime, Utc};
use linkhub_core::config::CoreConfig;
use linkhub_core::db::DatabasePool;
use linkhub_core::errors::{LinkHubError, Result};
use linkhub_protocol::hub::Hub;
use linkhub_protocol::link::Link;
use linkhub_protocol::visit::Visit;
use linkhub_rules::{Rule, RuleAction, RuleCondition};
use serde_json::Value;
use sqlx::FromRow;
use tracing::warn;
use uuid::Uuid;

/// Database-backed repository for users, hubs, links, rules and telemetry.
#[derive(Clone)]
pub struct HubRepository {
    pool: DatabasePool,
}

/// Registered account owning hubs.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Everything a public request needs, fetched in one bounded shape before
/// the engine runs: the hub, its owner's username, non-deleted links in
/// position order and active rules in priority order.
#[derive(Debug, Clone)]
pub struct PublicHubData {
    pub hub: Hub,
    pub owner_username: String,
    pub links: Vec<Link>,
    pub rules: Vec<Rule>,
}

impl HubRepository {
    /// Connects to the database using the supplied configuration and ensures
    /// migrations ran.
    pub async fn from_config(config: &CoreConfig) -> Result<Self> {
        let pool = DatabasePool::connect(config).await?;
        Self::from_pool(pool).await
    }

    /// Builds the repository from an existing database pool.
    pub async fn from_pool(pool: DatabasePool) -> Result<Self> {
        sqlx::migrate!()
            .run(pool.inner())
            .await
            .map_err(|err| LinkHubError::DatabaseError(err.to_string()))?;
        Ok(Self { pool })
    }

    // ── users ───────────────────────────────────────────────────────────

    /// Inserts a new user. A taken username or email maps to a conflict.
    pub async fn create_user(
        &self,
        username: &str,
        email: Option<&str>,
        password_hash: &str,
    ) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(self.pool.inner())
        .await
        .map_err(|err| conflict_or(err, "username already registered"))?;

        Ok(user)
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(user)
    }

    // ── hubs ────────────────────────────────────────────────────────────

    /// Inserts a new hub for the owner. A taken slug maps to a conflict.
    pub async fn create_hub(
        &self,
        user_id: Uuid,
        slug: &str,
        title: &str,
        description: Option<&str>,
        theme: Value,
    ) -> Result<Hub> {
        let row = sqlx::query_as::<_, HubRow>(
            r#"
            INSERT INTO hubs (id, user_id, slug, title, description, theme)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, slug, title, description, theme, is_active,
                      created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(slug)
        .bind(title)
        .bind(description)
        .bind(theme)
        .fetch_one(self.pool.inner())
        .await
        .map_err(|err| conflict_or(err, "slug already in use"))?;

        Ok(row.into())
    }

    pub async fn list_hubs_for_user(&self, user_id: Uuid) -> Result<Vec<Hub>> {
        let rows = sqlx::query_as::<_, HubRow>(
            r#"
            SELECT id, user_id, slug, title, description, theme, is_active,
                   created_at, updated_at
            FROM hubs WHERE user_id = $1 ORDER BY created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool.inner())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get_hub(&self, id: Uuid) -> Result<Option<Hub>> {
        let row = sqlx::query_as::<_, HubRow>(
            r#"
            SELECT id, user_id, slug, title, description, theme, is_active,
                   created_at, updated_at
            FROM hubs WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(row.map(Into::into))
    }

    /// Persists the mutable fields of a hub.
    pub async fn update_hub(&self, hub: &Hub) -> Result<Hub> {
        let row = sqlx::query_as::<_, HubRow>(
            r#"
            UPDATE hubs
            SET slug = $2, title = $3, description = $4, theme = $5,
                is_active = $6, updated_at = now()
            WHERE id = $1
            RETURNING id, user_id, slug, title, description, theme, is_active,
                      created_at, updated_at
            "#,
        )
        .bind(hub.id)
        .bind(&hub.slug)
        .bind(&hub.title)
        .bind(&hub.description)
        .bind(&hub.theme)
        .bind(hub.is_active)
        .fetch_one(self.pool.inner())
        .await
        .map_err(|err| conflict_or(err, "slug already in use"))?;

        Ok(row.into())
    }

    /// Deletes a hub; links and rules cascade at the storage layer.
    pub async fn delete_hub(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM hubs WHERE id = $1")
            .bind(id)
            .execute(self.pool.inner())
            .await?;
        Ok(())
    }

    /// Fetches the full public evaluation shape for a slug. Rules whose
    /// stored payloads fail to lift into typed form contribute no effect;
    /// they are logged and skipped here, at the data-store boundary.
    pub async fn find_public_hub(&self, slug: &str) -> Result<Option<PublicHubData>> {
        let Some(row) = sqlx::query_as::<_, PublicHubRow>(
            r#"
            SELECT h.id, h.user_id, h.slug, h.title, h.description, h.theme,
                   h.is_active, h.created_at, h.updated_at,
                   u.username AS owner_username
            FROM hubs h
            JOIN users u ON u.id = h.user_id
            WHERE h.slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(self.pool.inner())
        .await?
        else {
            return Ok(None);
        };

        let links = self.list_links(row.id).await?;
        let rules = self.list_active_rules(row.id).await?;

        Ok(Some(PublicHubData {
            owner_username: row.owner_username.clone(),
            hub: row.into(),
            links,
            rules,
        }))
    }

    // ── links ───────────────────────────────────────────────────────────

    /// Non-deleted links of a hub, position ascending (creation order on
    /// ties).
    pub async fn list_links(&self, hub_id: Uuid) -> Result<Vec<Link>> {
        let rows = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, hub_id, title, url, icon, style, is_active, position,
                   click_count, deleted_at, created_at
            FROM links
            WHERE hub_id = $1 AND deleted_at IS NULL
            ORDER BY position, created_at
            "#,
        )
        .bind(hub_id)
        .fetch_all(self.pool.inner())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Inserts a link at the end of the hub (max position + 1).
    pub async fn create_link(
        &self,
        hub_id: Uuid,
        title: &str,
        url: &str,
        icon: Option<&str>,
        style: Option<Value>,
        is_active: bool,
    ) -> Result<Link> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO links (id, hub_id, title, url, icon, style, is_active, position)
            VALUES (
                $1, $2, $3, $4, $5, $6, $7,
                (SELECT COALESCE(MAX(position) + 1, 0)
                 FROM links WHERE hub_id = $2 AND deleted_at IS NULL)
            )
            RETURNING id, hub_id, title, url, icon, style, is_active, position,
                      click_count, deleted_at, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(hub_id)
        .bind(title)
        .bind(url)
        .bind(icon)
        .bind(style)
        .bind(is_active)
        .fetch_one(self.pool.inner())
        .await?;

        Ok(row.into())
    }

    /// Fetches a non-deleted link by id.
    pub async fn get_link(&self, id: Uuid) -> Result<Option<Link>> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, hub_id, title, url, icon, style, is_active, position,
                   click_count, deleted_at, created_at
            FROM links WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(row.map(Into::into))
    }

    /// Persists the mutable fields of a link.
    pub async fn update_link(&self, link: &Link) -> Result<Link> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            UPDATE links
            SET title = $2, url = $3, icon = $4, style = $5, is_active = $6
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, hub_id, title, url, icon, style, is_active, position,
                      click_count, deleted_at, created_at
            "#,
        )
        .bind(link.id)
        .bind(&link.title)
        .bind(&link.url)
        .bind(&link.icon)
        .bind(&link.style)
        .bind(link.is_active)
        .fetch_one(self.pool.inner())
        .await?;

        Ok(row.into())
    }

    /// Soft-deletes a link. Click and visit history referencing it remains.
    pub async fn soft_delete_link(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE links SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(self.pool.inner())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Overwrites positions for the given (id, position) pairs in one
    /// transaction. Every referenced link must belong to the target hub;
    /// a batch touching any foreign or deleted link is rejected whole.
    pub async fn reorder_links(&self, hub_id: Uuid, pairs: &[(Uuid, i32)]) -> Result<()> {
        if pairs.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.inner().begin().await?;

        let ids: Vec<Uuid> = pairs.iter().map(|(id, _)| *id).collect();
        let owned: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM links WHERE hub_id = $1 AND deleted_at IS NULL AND id = ANY($2)",
        )
        .bind(hub_id)
        .bind(&ids)
        .fetch_one(&mut *tx)
        .await?;

        if owned as usize != ids.len() {
            return Err(LinkHubError::Forbidden(
                "reorder batch references links outside the hub".to_string(),
            ));
        }

        for (id, position) in pairs {
            sqlx::query("UPDATE links SET position = $2 WHERE id = $1")
                .bind(id)
                .bind(position)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    // ── rules ───────────────────────────────────────────────────────────

    /// Inserts a rule with already-validated condition/action payloads.
    pub async fn create_rule(
        &self,
        hub_id: Uuid,
        name: &str,
        priority: i32,
        is_active: bool,
        conditions: &[RuleCondition],
        actions: &[RuleAction],
    ) -> Result<Rule> {
        let conditions_json = serde_json::to_value(conditions)?;
        let actions_json = serde_json::to_value(actions)?;

        let row = sqlx::query_as::<_, RuleRow>(
            r#"
            INSERT INTO rules (id, hub_id, name, priority, is_active, conditions, actions)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, hub_id, name, priority, is_active, conditions, actions, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(hub_id)
        .bind(name)
        .bind(priority)
        .bind(is_active)
        .bind(conditions_json)
        .bind(actions_json)
        .fetch_one(self.pool.inner())
        .await?;

        row.into_rule()
            .map_err(|err| LinkHubError::DeserializationError(err.to_string()))
    }

    /// All rules of a hub (including inactive), priority descending, for the
    /// owner view. Malformed rows are skipped with a warning.
    pub async fn list_rules(&self, hub_id: Uuid) -> Result<Vec<Rule>> {
        let rows = sqlx::query_as::<_, RuleRow>(
            r#"
            SELECT id, hub_id, name, priority, is_active, conditions, actions, created_at
            FROM rules WHERE hub_id = $1
            ORDER BY priority DESC, created_at, id
            "#,
        )
        .bind(hub_id)
        .fetch_all(self.pool.inner())
        .await?;

        Ok(lift_rules(rows))
    }

    /// Active rules of a hub in evaluation order. Malformed rows are skipped
    /// with a warning and contribute no effect to public pages.
    pub async fn list_active_rules(&self, hub_id: Uuid) -> Result<Vec<Rule>> {
        let rows = sqlx::query_as::<_, RuleRow>(
            r#"
            SELECT id, hub_id, name, priority, is_active, conditions, actions, created_at
            FROM rules WHERE hub_id = $1 AND is_active
            ORDER BY priority DESC, created_at, id
            "#,
        )
        .bind(hub_id)
        .fetch_all(self.pool.inner())
        .await?;

        Ok(lift_rules(rows))
    }

    pub async fn get_rule(&self, id: Uuid) -> Result<Option<Rule>> {
        let row = sqlx::query_as::<_, RuleRow>(
            r#"
            SELECT id, hub_id, name, priority, is_active, conditions, actions, created_at
            FROM rules WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.inner())
        .await?;

        match row {
            Some(row) => {
                let rule = row
                    .into_rule()
                    .map_err(|err| LinkHubError::DeserializationError(err.to_string()))?;
                Ok(Some(rule))
            }
            None => Ok(None),
        }
    }

    /// Persists the mutable fields of a rule.
    pub async fn update_rule(&self, rule: &Rule) -> Result<Rule> {
        let conditions_json = serde_json::to_value(&rule.conditions)?;
        let actions_json = serde_json::to_value(&rule.actions)?;

        let row = sqlx::query_as::<_, RuleRow>(
            r#"
            UPDATE rules
            SET name = $2, priority = $3, is_active = $4, conditions = $5, actions = $6
            WHERE id = $1
            RETURNING id, hub_id, name, priority, is_active, conditions, actions, created_at
            "#,
        )
        .bind(rule.id)
        .bind(&rule.name)
        .bind(rule.priority)
        .bind(rule.is_active)
        .bind(conditions_json)
        .bind(actions_json)
        .fetch_one(self.pool.inner())
        .await?;

        row.into_rule()
            .map_err(|err| LinkHubError::DeserializationError(err.to_string()))
    }

    pub async fn delete_rule(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM rules WHERE id = $1")
            .bind(id)
            .execute(self.pool.inner())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ── telemetry ───────────────────────────────────────────────────────

    /// Appends a visit record. Callers fire this without awaiting the
    /// response path; failures are theirs to log and drop.
    pub async fn record_visit(&self, visit: &Visit) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO visits (id, hub_id, ip_address, user_agent, country, device_type, visited_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(visit.id)
        .bind(visit.hub_id)
        .bind(&visit.ip_address)
        .bind(&visit.user_agent)
        .bind(&visit.country)
        .bind(visit.device_type.as_str())
        .bind(visit.visited_at)
        .execute(self.pool.inner())
        .await?;

        Ok(())
    }

    /// Appends a click and bumps the link's counter atomically. Returns
    /// false when the link is unknown or soft-deleted.
    pub async fn record_click(&self, link_id: Uuid) -> Result<bool> {
        let mut tx = self.pool.inner().begin().await?;

        let updated = sqlx::query(
            "UPDATE links SET click_count = click_count + 1 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(link_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("INSERT INTO clicks (id, link_id) VALUES ($1, $2)")
            .bind(Uuid::new_v4())
            .bind(link_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}

fn lift_rules(rows: Vec<RuleRow>) -> Vec<Rule> {
    rows.into_iter()
        .filter_map(|row| {
            let rule_id = row.id;
            match row.into_rule() {
                Ok(rule) => Some(rule),
                Err(err) => {
                    warn!(%rule_id, %err, "skipping rule with malformed stored payload");
                    None
                }
            }
        })
        .collect()
}

fn conflict_or(err: sqlx::Error, message: &str) -> LinkHubError {
    match &err {
        sqlx::Error::Database(db)
            if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
        {
            LinkHubError::Conflict(message.to_string())
        }
        _ => err.into(),
    }
}

#[derive(FromRow)]
struct HubRow {
    id: Uuid,
    user_id: Uuid,
    slug: String,
    title: String,
    description: Option<String>,
    theme: Value,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<HubRow> for Hub {
    fn from(row: HubRow) -> Self {
        Hub {
            id: row.id,
            user_id: row.user_id,
            slug: row.slug,
            title: row.title,
            description: row.description,
            theme: row.theme,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct PublicHubRow {
    id: Uuid,
    user_id: Uuid,
    slug: String,
    title: String,
    description: Option<String>,
    theme: Value,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    owner_username: String,
}

impl From<PublicHubRow> for Hub {
    fn from(row: PublicHubRow) -> Self {
        Hub {
            id: row.id,
            user_id: row.user_id,
            slug: row.slug,
            title: row.title,
            description: row.description,
            theme: row.theme,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct LinkRow {
    id: Uuid,
    hub_id: Uuid,
    title: String,
    url: String,
    icon: Option<String>,
    style: Option<Value>,
    is_active: bool,
    position: i32,
    click_count: i64,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(row: LinkRow) -> Self {
        Link {
            id: row.id,
            hub_id: row.hub_id,
            title: row.title,
            url: row.url,
            icon: row.icon,
            style: row.style,
            is_active: row.is_active,
            position: row.position,
            click_count: row.click_count,
            deleted_at: row.deleted_at,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct RuleRow {
    id: Uuid,
    hub_id: Uuid,
    name: String,
    priority: i32,
    is_active: bool,
    conditions: Value,
    actions: Value,
    created_at: DateTime<Utc>,
}

impl RuleRow {
    fn into_rule(self) -> std::result::Result<Rule, linkhub_rules::RuleError> {
        Rule::from_stored(
            self.id,
            self.hub_id,
            self.name,
            self.priority,
            self.is_active,
            self.conditions,
            self.actions,
            self.created_at,
        )
    }
}
