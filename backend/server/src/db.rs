//! Database layer — migrations, queries, and the pledge projection.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use oshiome_core::normalize::{NewCampaign, NewContribution};
use oshiome_core::types::{Campaign, CampaignStatus, Contribution, PaymentStatus, Pledge};

use crate::errors::Result;

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    // Make sure the file is created if it doesn't exist yet.
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };

    let options = SqliteConnectOptions::from_str(&url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────
// Row shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, sqlx::FromRow)]
struct CampaignRow {
    id: i64,
    title: String,
    description: String,
    goal_amount: i64,
    deadline: i64,
    creator_id: i64,
    status: String,
    image_url: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl From<CampaignRow> for Campaign {
    fn from(row: CampaignRow) -> Self {
        Campaign {
            id: row.id,
            title: row.title,
            description: row.description,
            goal_amount: row.goal_amount,
            deadline: row.deadline,
            creator_id: row.creator_id,
            status: CampaignStatus::from_str_loose(&row.status),
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ContributionRow {
    id: i64,
    campaign_id: i64,
    supporter_id: i64,
    amount: i64,
    message: Option<String>,
    payment_status: String,
    checkout_session_id: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl From<ContributionRow> for Contribution {
    fn from(row: ContributionRow) -> Self {
        Contribution {
            id: row.id,
            campaign_id: row.campaign_id,
            supporter_id: row.supporter_id,
            amount: row.amount,
            message: row.message,
            payment_status: PaymentStatus::from_str_loose(&row.payment_status),
            checkout_session_id: row.checkout_session_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const CAMPAIGN_COLS: &str = "id, title, description, goal_amount, deadline, creator_id, \
                             status, image_url, created_at, updated_at";
const CONTRIBUTION_COLS: &str = "id, campaign_id, supporter_id, amount, message, \
                                 payment_status, checkout_session_id, created_at, updated_at";

// ─────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────

pub async fn create_user(pool: &SqlitePool, email: &str, name: &str) -> Result<i64> {
    let result = sqlx::query("INSERT INTO users (email, name) VALUES (?1, ?2)")
        .bind(email)
        .bind(name)
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

// ─────────────────────────────────────────────────────────
// Campaigns
// ─────────────────────────────────────────────────────────

/// Insert a campaign in `draft` status and return the stored record.
pub async fn insert_campaign(pool: &SqlitePool, input: &NewCampaign) -> Result<Campaign> {
    let result = sqlx::query(
        r#"
        INSERT INTO campaigns (title, description, goal_amount, deadline, creator_id, image_url)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&input.title)
    .bind(&input.description)
    .bind(input.goal_amount)
    .bind(input.deadline)
    .bind(input.creator_id)
    .bind(&input.image_url)
    .execute(pool)
    .await?;

    let row: CampaignRow =
        sqlx::query_as(&format!("SELECT {CAMPAIGN_COLS} FROM campaigns WHERE id = ?1"))
            .bind(result.last_insert_rowid())
            .fetch_one(pool)
            .await?;
    Ok(row.into())
}

pub async fn get_campaign(pool: &SqlitePool, id: i64) -> Result<Option<Campaign>> {
    let row: Option<CampaignRow> =
        sqlx::query_as(&format!("SELECT {CAMPAIGN_COLS} FROM campaigns WHERE id = ?1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(Campaign::from))
}

/// Fetch campaigns with the given status, newest first.
pub async fn list_campaigns(pool: &SqlitePool, status: CampaignStatus) -> Result<Vec<Campaign>> {
    let rows: Vec<CampaignRow> = sqlx::query_as(&format!(
        "SELECT {CAMPAIGN_COLS} FROM campaigns WHERE status = ?1 ORDER BY created_at DESC, id DESC"
    ))
    .bind(status.as_str())
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Campaign::from).collect())
}

/// Move a campaign to a new lifecycle status.
///
/// Compare-and-set on the expected current status: two moderators racing
/// on the same campaign cannot both win, so a terminal state is never
/// exited by a write validated against a stale read. Returns whether
/// this call performed the update.
pub async fn update_campaign_status(
    pool: &SqlitePool,
    id: i64,
    from: CampaignStatus,
    to: CampaignStatus,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE campaigns
        SET    status = ?1, updated_at = unixepoch()
        WHERE  id = ?2 AND status = ?3
        "#,
    )
    .bind(to.as_str())
    .bind(id)
    .bind(from.as_str())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Campaigns the user organizes, every status included — the creator
/// sees their own drafts.
pub async fn list_campaigns_by_creator(
    pool: &SqlitePool,
    creator_id: i64,
) -> Result<Vec<Campaign>> {
    let rows: Vec<CampaignRow> = sqlx::query_as(&format!(
        "SELECT {CAMPAIGN_COLS} FROM campaigns WHERE creator_id = ?1 \
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(creator_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Campaign::from).collect())
}

/// Campaigns the user has at least one succeeded contribution to.
pub async fn list_supported_campaigns(pool: &SqlitePool, user_id: i64) -> Result<Vec<Campaign>> {
    let rows: Vec<CampaignRow> = sqlx::query_as(&format!(
        r#"
        SELECT DISTINCT c.id, c.title, c.description, c.goal_amount, c.deadline,
               c.creator_id, c.status, c.image_url, c.created_at, c.updated_at
        FROM   campaigns c
        JOIN   contributions ct ON ct.campaign_id = c.id
        WHERE  ct.supporter_id = ?1 AND ct.payment_status = '{}'
        ORDER  BY c.created_at DESC, c.id DESC
        "#,
        PaymentStatus::Succeeded.as_str()
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Campaign::from).collect())
}

// ─────────────────────────────────────────────────────────
// Contributions
// ─────────────────────────────────────────────────────────

/// Insert a contribution in `pending` status and return the stored record.
pub async fn insert_contribution(
    pool: &SqlitePool,
    campaign_id: i64,
    input: &NewContribution,
) -> Result<Contribution> {
    let result = sqlx::query(
        r#"
        INSERT INTO contributions (campaign_id, supporter_id, amount, message)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(campaign_id)
    .bind(input.supporter_id)
    .bind(input.amount)
    .bind(&input.message)
    .execute(pool)
    .await?;

    let row: ContributionRow = sqlx::query_as(&format!(
        "SELECT {CONTRIBUTION_COLS} FROM contributions WHERE id = ?1"
    ))
    .bind(result.last_insert_rowid())
    .fetch_one(pool)
    .await?;
    Ok(row.into())
}

/// Attach the hosted-checkout session id to a fresh contribution.
pub async fn set_contribution_session(
    pool: &SqlitePool,
    contribution_id: i64,
    session_id: &str,
) -> Result<()> {
    sqlx::query(
        "UPDATE contributions SET checkout_session_id = ?1, updated_at = unixepoch() WHERE id = ?2",
    )
    .bind(session_id)
    .bind(contribution_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_contribution(pool: &SqlitePool, id: i64) -> Result<Option<Contribution>> {
    let row: Option<ContributionRow> = sqlx::query_as(&format!(
        "SELECT {CONTRIBUTION_COLS} FROM contributions WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Contribution::from))
}

pub async fn get_contribution_by_session(
    pool: &SqlitePool,
    session_id: &str,
) -> Result<Option<Contribution>> {
    let row: Option<ContributionRow> = sqlx::query_as(&format!(
        "SELECT {CONTRIBUTION_COLS} FROM contributions WHERE checkout_session_id = ?1"
    ))
    .bind(session_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Contribution::from))
}

/// Move a pending contribution to a terminal payment status.
///
/// The `WHERE payment_status = 'pending'` guard makes settlement
/// idempotent: a contribution already settled (by the webhook or by the
/// one-shot verification, whichever lands first) is left untouched.
/// Returns whether this call performed the settlement.
pub async fn settle_contribution(
    pool: &SqlitePool,
    contribution_id: i64,
    status: PaymentStatus,
) -> Result<bool> {
    debug_assert!(status.is_terminal());
    let result = sqlx::query(
        r#"
        UPDATE contributions
        SET    payment_status = ?1, updated_at = unixepoch()
        WHERE  id = ?2 AND payment_status = 'pending'
        "#,
    )
    .bind(status.as_str())
    .bind(contribution_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Succeeded contributions for a campaign, oldest first.
pub async fn list_succeeded_contributions(
    pool: &SqlitePool,
    campaign_id: i64,
) -> Result<Vec<Contribution>> {
    let rows: Vec<ContributionRow> = sqlx::query_as(&format!(
        r#"
        SELECT {CONTRIBUTION_COLS}
        FROM   contributions
        WHERE  campaign_id = ?1 AND payment_status = ?2
        ORDER  BY created_at ASC, id ASC
        "#
    ))
    .bind(campaign_id)
    .bind(PaymentStatus::Succeeded.as_str())
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Contribution::from).collect())
}

/// Project a campaign's contributions down to the `{amount,
/// payment_status, supporter_id}` shape the aggregator consumes.
/// Status filtering stays in the aggregator, not in SQL, so unrecognised
/// stored values flow through as `Unknown` and are excluded there.
pub async fn get_pledges_for_campaign(
    pool: &SqlitePool,
    campaign_id: i64,
) -> Result<Vec<Pledge>> {
    let rows: Vec<(i64, String, i64)> = sqlx::query_as(
        "SELECT amount, payment_status, supporter_id FROM contributions WHERE campaign_id = ?1",
    )
    .bind(campaign_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(amount, status, supporter_id)| {
            Pledge::new(
                amount,
                PaymentStatus::from_str_loose(&status),
                supporter_id.to_string(),
            )
        })
        .collect())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
