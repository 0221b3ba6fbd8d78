//! Hosted-checkout gateway client — creates and fetches checkout sessions.
//!
//! The gateway is an external collaborator: it hosts the payment page,
//! finalizes the charge, and reports the outcome out-of-band (redirect
//! and webhook). This module only ever creates a session and reads one
//! back; the terminal payment status is derived from the fetched session,
//! never from an unauthenticated webhook body alone.
//!
//! ## Resilience
//!
//! Transient failures (connection errors, 429 rate limits) are retried
//! with exponential back-off. Unlike a background poller, callers here
//! are request handlers, so attempts are bounded by [`MAX_ATTEMPTS`].

use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use tracing::warn;

use oshiome_core::normalize::pick_str;
use oshiome_core::types::{Contribution, PaymentStatus};

use crate::config::Config;
use crate::errors::{Result, ServerError};

const MAX_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF_SECS: u64 = 2;

/// The slice of a gateway checkout session this service cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted payment page the supporter is redirected to.
    pub url: Option<String>,
    /// Session lifecycle: `open`, `complete`, `expired`.
    pub status: Option<String>,
    /// Payment outcome: `paid`, `unpaid`, ...
    pub payment_state: Option<String>,
    /// Contribution id carried through session metadata.
    pub contribution_id: Option<i64>,
}

impl CheckoutSession {
    /// Map the session to a terminal [`PaymentStatus`], if it has reached
    /// one. An open/unpaid session maps to `None` — the contribution stays
    /// pending.
    pub fn terminal_status(&self) -> Option<PaymentStatus> {
        if matches!(self.payment_state.as_deref(), Some("paid") | Some("succeeded")) {
            return Some(PaymentStatus::Succeeded);
        }
        if matches!(self.status.as_deref(), Some("expired") | Some("canceled"))
            || matches!(self.payment_state.as_deref(), Some("failed"))
        {
            return Some(PaymentStatus::Failed);
        }
        None
    }
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Create a hosted-checkout session for a pending contribution.
///
/// The contribution id travels in session metadata so the webhook and the
/// verification flow can find their way back to the ledger row.
pub async fn create_session(
    client: &Client,
    config: &Config,
    contribution: &Contribution,
    campaign_title: &str,
) -> Result<CheckoutSession> {
    let payload = build_session_payload(config, contribution, campaign_title);
    let request = client
        .post(format!("{}/v1/checkout/sessions", config.gateway_url))
        .bearer_auth(&config.gateway_secret)
        .json(&payload);

    let body = send_with_retry(request).await?;
    decode_session(&body)
}

/// Fetch a checkout session by id — the one-shot payment verification.
pub async fn fetch_session(
    client: &Client,
    config: &Config,
    session_id: &str,
) -> Result<CheckoutSession> {
    let request = client
        .get(format!(
            "{}/v1/checkout/sessions/{session_id}",
            config.gateway_url
        ))
        .bearer_auth(&config.gateway_secret);

    let body = send_with_retry(request).await?;
    decode_session(&body)
}

fn build_session_payload(
    config: &Config,
    contribution: &Contribution,
    campaign_title: &str,
) -> Value {
    json!({
        "mode": "payment",
        "amount": contribution.amount,
        "product_name": campaign_title,
        "metadata": {
            "contribution_id": contribution.id.to_string(),
        },
        // The gateway substitutes its session id into the placeholder.
        "success_url": format!("{}?session_id={{CHECKOUT_SESSION_ID}}", config.success_url),
        "cancel_url": config.cancel_url,
    })
}

async fn send_with_retry(request: reqwest::RequestBuilder) -> Result<Value> {
    let mut backoff = INITIAL_BACKOFF_SECS;
    let mut attempt = 1u32;

    loop {
        let this_try = request
            .try_clone()
            .ok_or_else(|| ServerError::Gateway("Unclonable gateway request".to_string()))?;

        match this_try.send().await {
            Err(e) => {
                if attempt >= MAX_ATTEMPTS {
                    return Err(e.into());
                }
                warn!("Gateway request failed (will retry in {backoff}s): {e}");
            }
            Ok(resp) if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS => {
                if attempt >= MAX_ATTEMPTS {
                    return Err(ServerError::Gateway("Rate-limited by gateway".to_string()));
                }
                warn!("Rate-limited by gateway (will retry in {backoff}s)");
            }
            Ok(resp) => {
                let status = resp.status();
                if !status.is_success() {
                    let detail = resp.text().await.unwrap_or_default();
                    return Err(ServerError::Gateway(format!(
                        "Gateway returned {status}: {detail}"
                    )));
                }
                return Ok(resp.json().await?);
            }
        }

        tokio::time::sleep(Duration::from_secs(backoff)).await;
        backoff *= 2;
        attempt += 1;
    }
}

// ─────────────────────────────────────────────────────────
// Session decoding
// ─────────────────────────────────────────────────────────

/// Decode a gateway session object into [`CheckoutSession`].
///
/// Gateways disagree on field spelling, so every field goes through the
/// alias-aware normalization helpers; only the session id is mandatory.
pub fn decode_session(value: &Value) -> Result<CheckoutSession> {
    let id = pick_str(value, &["id", "session_id", "sessionId"])
        .ok_or_else(|| ServerError::Gateway("Session without an id".to_string()))?;

    let contribution_id = value
        .get("metadata")
        .and_then(|m| pick_str(m, &["contribution_id", "contributionId"]))
        .and_then(|s| s.parse::<i64>().ok());

    Ok(CheckoutSession {
        id,
        url: pick_str(value, &["url", "checkout_url", "checkoutUrl"]),
        status: pick_str(value, &["status"]),
        payment_state: pick_str(value, &["payment_status", "paymentStatus"]),
        contribution_id,
    })
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
