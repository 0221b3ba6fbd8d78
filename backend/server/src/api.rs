//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{error, info, warn};

use oshiome_core::types::{Campaign, CampaignStatus, Contribution};
use oshiome_core::{aggregate, lifecycle, normalize, DomainError};

use crate::config::Config;
use crate::db;
use crate::errors::ServerError;
use crate::gateway;

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
    pub config: Config,
    pub client: Client,
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

/// A campaign together with its derived funding metrics.
///
/// `progress_percent` is the true, uncapped percentage; the clamped
/// `progress_bar_percent` is supplied alongside for bounded visuals so
/// clients never clamp (or forget to clamp) on their own.
#[derive(Serialize)]
pub struct CampaignWithProgress {
    #[serde(flatten)]
    pub campaign: Campaign,
    pub current_amount: i64,
    pub supporters_count: u64,
    pub progress_percent: i64,
    pub progress_bar_percent: i64,
}

#[derive(Serialize)]
pub struct CampaignsResponse {
    pub count: usize,
    pub campaigns: Vec<CampaignWithProgress>,
}

#[derive(Serialize)]
pub struct ContributionsResponse {
    pub campaign_id: i64,
    pub count: usize,
    pub contributions: Vec<Contribution>,
}

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub contribution_id: i64,
    pub session_id: String,
    pub checkout_url: Option<String>,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    pub session_id: String,
    pub payment_status: String,
    /// Whether this request performed the settlement (false when the
    /// webhook already did, or the session is still open).
    pub settled: bool,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn reply_error(status: StatusCode, error: impl ToString) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

fn internal_error(e: ServerError) -> Response {
    error!("Request failed: {e}");
    reply_error(StatusCode::INTERNAL_SERVER_ERROR, e)
}

/// Moderation endpoints require the shared admin token.
fn require_admin(headers: &HeaderMap, config: &Config) -> Result<(), Response> {
    let supplied = headers
        .get("x-admin-token")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if supplied == config.admin_token {
        Ok(())
    } else {
        Err(reply_error(StatusCode::UNAUTHORIZED, "Admin token required"))
    }
}

/// Attach derived funding metrics to a campaign.
///
/// Recomputed from the contribution ledger on every call; nothing is
/// cached or persisted (the ledger is the source of truth).
async fn with_progress(
    pool: &SqlitePool,
    campaign: Campaign,
) -> Result<CampaignWithProgress, ServerError> {
    let pledges = db::get_pledges_for_campaign(pool, campaign.id).await?;
    let progress = aggregate(campaign.goal_amount, &pledges)?;
    Ok(CampaignWithProgress {
        campaign,
        current_amount: progress.current_amount,
        supporters_count: progress.supporters_count,
        progress_percent: progress.progress_percent,
        progress_bar_percent: progress.clamped_percent(),
    })
}

// ─────────────────────────────────────────────────────────
// Health
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ─────────────────────────────────────────────────────────
// Campaigns
// ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
}

/// `GET /campaigns[?status=...]`
///
/// Defaults to active campaigns. Each entry carries its computed funding
/// progress.
pub async fn list_campaigns(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<ListParams>,
) -> Response {
    let status = match params.status.as_deref() {
        None => CampaignStatus::Active,
        Some(raw) => match CampaignStatus::from_str_loose(raw) {
            CampaignStatus::Unknown => {
                return reply_error(
                    StatusCode::BAD_REQUEST,
                    format!("Unknown campaign status: {raw}"),
                )
            }
            parsed => parsed,
        },
    };

    let campaigns = match db::list_campaigns(&state.pool, status).await {
        Ok(campaigns) => campaigns,
        Err(e) => return internal_error(e),
    };

    let mut enriched = Vec::with_capacity(campaigns.len());
    for campaign in campaigns {
        match with_progress(&state.pool, campaign).await {
            Ok(c) => enriched.push(c),
            Err(e) => return internal_error(e),
        }
    }

    (
        StatusCode::OK,
        Json(CampaignsResponse {
            count: enriched.len(),
            campaigns: enriched,
        }),
    )
        .into_response()
}

/// `GET /campaigns/:id`
pub async fn get_campaign(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i64>,
) -> Response {
    match db::get_campaign(&state.pool, id).await {
        Ok(Some(campaign)) => match with_progress(&state.pool, campaign).await {
            Ok(c) => (StatusCode::OK, Json(c)).into_response(),
            Err(e) => internal_error(e),
        },
        Ok(None) => reply_error(StatusCode::NOT_FOUND, format!("Campaign {id} not found")),
        Err(e) => internal_error(e),
    }
}

/// `POST /campaigns`
///
/// Registers a campaign in `draft` status. The payload goes through the
/// normalization boundary, so both field spellings clients send are
/// accepted; anything structurally missing is a 400.
pub async fn create_campaign(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<Value>,
) -> Response {
    let input = match normalize::new_campaign(&payload) {
        Ok(input) => input,
        Err(e) => return reply_error(StatusCode::BAD_REQUEST, e),
    };

    if input.goal_amount <= 0 {
        return reply_error(
            StatusCode::BAD_REQUEST,
            DomainError::InvalidGoal(input.goal_amount),
        );
    }
    if input.deadline <= chrono::Utc::now().timestamp() {
        return reply_error(StatusCode::BAD_REQUEST, "Deadline must be in the future");
    }

    match db::insert_campaign(&state.pool, &input).await {
        Ok(campaign) => {
            info!("Campaign {} registered: {}", campaign.id, campaign.title);
            (StatusCode::CREATED, Json(campaign)).into_response()
        }
        Err(e) => internal_error(e),
    }
}

#[derive(Deserialize)]
pub struct StatusInput {
    pub status: String,
}

/// `PATCH /campaigns/:id/status` (admin)
///
/// Moderation: approve (`draft -> active`), close (`active -> ended`), or
/// withdraw (`-> cancelled`). The lifecycle state machine rejects
/// everything else.
pub async fn update_campaign_status(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(input): Json<StatusInput>,
) -> Response {
    if let Err(resp) = require_admin(&headers, &state.config) {
        return resp;
    }

    let target = CampaignStatus::from_str_loose(&input.status);
    if target == CampaignStatus::Unknown {
        return reply_error(
            StatusCode::BAD_REQUEST,
            format!("Unknown campaign status: {}", input.status),
        );
    }

    let campaign = match db::get_campaign(&state.pool, id).await {
        Ok(Some(campaign)) => campaign,
        Ok(None) => return reply_error(StatusCode::NOT_FOUND, format!("Campaign {id} not found")),
        Err(e) => return internal_error(e),
    };

    if let Err(e) = lifecycle::transition(campaign.status, target) {
        return reply_error(StatusCode::CONFLICT, e);
    }

    // The write re-checks the status we validated against, so a
    // concurrent moderation that landed in between loses here instead of
    // silently exiting a terminal state.
    match db::update_campaign_status(&state.pool, id, campaign.status, target).await {
        Ok(true) => {}
        Ok(false) => {
            return reply_error(
                StatusCode::CONFLICT,
                format!("Campaign {id} was moderated concurrently; re-fetch and retry"),
            )
        }
        Err(e) => return internal_error(e),
    }
    info!("Campaign {id}: {} -> {target}", campaign.status);

    match db::get_campaign(&state.pool, id).await {
        Ok(Some(updated)) => (StatusCode::OK, Json(updated)).into_response(),
        Ok(None) => reply_error(StatusCode::NOT_FOUND, format!("Campaign {id} not found")),
        Err(e) => internal_error(e),
    }
}

// ─────────────────────────────────────────────────────────
// Contributions & checkout
// ─────────────────────────────────────────────────────────

/// `GET /campaigns/:id/contributions`
///
/// Succeeded contributions only — the public supporter list.
pub async fn list_contributions(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i64>,
) -> Response {
    match db::list_succeeded_contributions(&state.pool, id).await {
        Ok(contributions) => (
            StatusCode::OK,
            Json(ContributionsResponse {
                campaign_id: id,
                count: contributions.len(),
                contributions,
            }),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

/// `POST /campaigns/:id/contributions`
///
/// Creates a pending contribution and a hosted-checkout session, then
/// hands the checkout URL back for the redirect. The contribution stays
/// pending until the gateway reports a terminal outcome.
pub async fn create_contribution(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i64>,
    Json(payload): Json<Value>,
) -> Response {
    let input = match normalize::new_contribution(&payload) {
        Ok(input) => input,
        Err(e) => return reply_error(StatusCode::BAD_REQUEST, e),
    };

    let campaign = match db::get_campaign(&state.pool, id).await {
        Ok(Some(campaign)) => campaign,
        Ok(None) => return reply_error(StatusCode::NOT_FOUND, format!("Campaign {id} not found")),
        Err(e) => return internal_error(e),
    };
    if campaign.status != CampaignStatus::Active {
        return reply_error(
            StatusCode::CONFLICT,
            format!("Campaign {id} is not accepting contributions ({})", campaign.status),
        );
    }

    let contribution = match db::insert_contribution(&state.pool, id, &input).await {
        Ok(contribution) => contribution,
        Err(e) => return internal_error(e),
    };

    let session =
        match gateway::create_session(&state.client, &state.config, &contribution, &campaign.title)
            .await
        {
            Ok(session) => session,
            Err(e) => {
                // The pending row is harmless: it never counts toward
                // progress and the supporter can retry.
                warn!("Checkout session creation failed for contribution {}: {e}", contribution.id);
                return reply_error(StatusCode::BAD_GATEWAY, e);
            }
        };

    if let Err(e) = db::set_contribution_session(&state.pool, contribution.id, &session.id).await {
        return internal_error(e);
    }
    info!(
        "Contribution {} pending, checkout session {}",
        contribution.id, session.id
    );

    (
        StatusCode::CREATED,
        Json(CheckoutResponse {
            contribution_id: contribution.id,
            session_id: session.id,
            checkout_url: session.url,
        }),
    )
        .into_response()
}

#[derive(Deserialize)]
pub struct VerifyParams {
    pub session_id: String,
}

/// `GET /payments/verify?session_id=...`
///
/// One-shot payment verification, called by the success page after the
/// gateway redirect: fetch the session once, settle the contribution if
/// the session reached a terminal state. Idempotent — a contribution the
/// webhook already settled is left untouched.
pub async fn verify_payment(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<VerifyParams>,
) -> Response {
    let session = match gateway::fetch_session(&state.client, &state.config, &params.session_id)
        .await
    {
        Ok(session) => session,
        Err(e) => return reply_error(StatusCode::BAD_GATEWAY, e),
    };

    match settle_from_session(&state.pool, &session).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(SettleError::NotFound) => reply_error(
            StatusCode::NOT_FOUND,
            format!("No contribution for session {}", session.id),
        ),
        Err(SettleError::Server(e)) => internal_error(e),
    }
}

/// `POST /webhooks/payment`
///
/// Gateway callback. The body is unauthenticated, so nothing in it is
/// trusted beyond the session id: the session is re-fetched from the
/// gateway and settlement is driven by that fresh copy.
pub async fn payment_webhook(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<Value>,
) -> Response {
    let event_type =
        normalize::pick_str(&payload, &["type", "event_type", "eventType"]).unwrap_or_default();
    let session_object = payload
        .pointer("/data/object")
        .or_else(|| payload.get("object"))
        .unwrap_or(&payload);
    let session_id = match normalize::pick_str(session_object, &["id", "session_id", "sessionId"])
    {
        Some(id) => id,
        None => return reply_error(StatusCode::BAD_REQUEST, "Webhook without a session id"),
    };

    match event_type.as_str() {
        "checkout.session.completed" | "checkout.session.expired" => {
            let session =
                match gateway::fetch_session(&state.client, &state.config, &session_id).await {
                    Ok(session) => session,
                    Err(e) => return reply_error(StatusCode::BAD_GATEWAY, e),
                };
            match settle_from_session(&state.pool, &session).await {
                Ok(response) => {
                    if response.settled {
                        info!("Webhook settled session {} as {}", session.id, response.payment_status);
                    }
                }
                Err(SettleError::NotFound) => {
                    warn!("Webhook for unknown session {session_id}");
                }
                Err(SettleError::Server(e)) => return internal_error(e),
            }
        }
        other => {
            info!("Unhandled webhook event type: {other}");
        }
    }

    (StatusCode::OK, Json(serde_json::json!({ "received": true }))).into_response()
}

enum SettleError {
    NotFound,
    Server(ServerError),
}

impl From<ServerError> for SettleError {
    fn from(e: ServerError) -> Self {
        SettleError::Server(e)
    }
}

/// Settle the contribution a session belongs to, if the session has
/// reached a terminal state. The contribution is located by stored
/// session id first, falling back to the id carried in session metadata.
async fn settle_from_session(
    pool: &SqlitePool,
    session: &gateway::CheckoutSession,
) -> Result<VerifyResponse, SettleError> {
    let contribution = match db::get_contribution_by_session(pool, &session.id).await? {
        Some(contribution) => Some(contribution),
        None => match session.contribution_id {
            Some(_) => find_by_metadata(pool, session).await?,
            None => None,
        },
    };
    let contribution = contribution.ok_or(SettleError::NotFound)?;

    match session.terminal_status() {
        Some(status) => {
            let settled = db::settle_contribution(pool, contribution.id, status).await?;
            Ok(VerifyResponse {
                session_id: session.id.clone(),
                payment_status: status.to_string(),
                settled,
            })
        }
        None => Ok(VerifyResponse {
            session_id: session.id.clone(),
            payment_status: contribution.payment_status.to_string(),
            settled: false,
        }),
    }
}

/// Metadata fallback for sessions whose id never made it into the row
/// (e.g. the process died between session creation and the UPDATE).
async fn find_by_metadata(
    pool: &SqlitePool,
    session: &gateway::CheckoutSession,
) -> Result<Option<Contribution>, ServerError> {
    let Some(contribution_id) = session.contribution_id else {
        return Ok(None);
    };
    db::get_contribution(pool, contribution_id).await
}

// ─────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────

/// `POST /users`
pub async fn create_user(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<Value>,
) -> Response {
    let email = normalize::pick_str(&payload, &["email"]);
    let name = normalize::pick_str(&payload, &["name", "display_name", "displayName"]);
    let (Some(email), Some(name)) = (email, name) else {
        return reply_error(StatusCode::BAD_REQUEST, "email and name are required");
    };

    match db::create_user(&state.pool, &email, &name).await {
        Ok(id) => (StatusCode::CREATED, Json(serde_json::json!({ "id": id }))).into_response(),
        Err(e) => internal_error(e),
    }
}

/// `GET /users/:id/campaigns`
///
/// Campaigns the user organizes, drafts included, with progress.
pub async fn my_campaigns(
    State(state): State<Arc<ApiState>>,
    Path(user_id): Path<i64>,
) -> Response {
    let campaigns = match db::list_campaigns_by_creator(&state.pool, user_id).await {
        Ok(campaigns) => campaigns,
        Err(e) => return internal_error(e),
    };

    let mut enriched = Vec::with_capacity(campaigns.len());
    for campaign in campaigns {
        match with_progress(&state.pool, campaign).await {
            Ok(c) => enriched.push(c),
            Err(e) => return internal_error(e),
        }
    }

    (
        StatusCode::OK,
        Json(CampaignsResponse {
            count: enriched.len(),
            campaigns: enriched,
        }),
    )
        .into_response()
}

/// `GET /users/:id/supported`
///
/// Campaigns the user has a succeeded contribution to, with progress.
pub async fn supported_campaigns(
    State(state): State<Arc<ApiState>>,
    Path(user_id): Path<i64>,
) -> Response {
    let campaigns = match db::list_supported_campaigns(&state.pool, user_id).await {
        Ok(campaigns) => campaigns,
        Err(e) => return internal_error(e),
    };

    let mut enriched = Vec::with_capacity(campaigns.len());
    for campaign in campaigns {
        match with_progress(&state.pool, campaign).await {
            Ok(c) => enriched.push(c),
            Err(e) => return internal_error(e),
        }
    }

    (
        StatusCode::OK,
        Json(CampaignsResponse {
            count: enriched.len(),
            campaigns: enriched,
        }),
    )
        .into_response()
}
