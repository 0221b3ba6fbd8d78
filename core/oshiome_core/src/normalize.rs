//! Normalization of dynamically-shaped remote records.
//!
//! Payloads arriving from clients and from the payment gateway use
//! inconsistent field names for the same thing (`goal_amount` /
//! `target_amount` / `targetAmount`, string or integer amounts). Rather
//! than null-checking every variant at each use site, everything is
//! mapped to the internal shape here, once, at the ingestion boundary.
//! Records that cannot be normalized are rejected with
//! [`DomainError::MalformedRecord`], never silently coerced.

use serde_json::Value;

use crate::errors::{DomainError, Result};

/// Pull a string field out of a JSON object, trying each alias in order.
pub fn pick_str(value: &Value, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .find_map(|k| value.get(k))
        .and_then(|v| v.as_str())
        .map(String::from)
}

/// Pull an integer field out of a JSON object, trying each alias in order.
/// Accepts both JSON numbers and numeric strings (gateways disagree on
/// which to send for monetary amounts).
pub fn pick_i64(value: &Value, aliases: &[&str]) -> Option<i64> {
    aliases.iter().find_map(|k| value.get(k)).and_then(|v| {
        v.as_i64()
            .or_else(|| v.as_str().and_then(|s| s.parse::<i64>().ok()))
    })
}

/// Normalized input for registering a campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCampaign {
    pub title: String,
    pub description: String,
    pub goal_amount: i64,
    pub deadline: i64,
    pub creator_id: i64,
    pub image_url: Option<String>,
}

/// Normalize a campaign-registration payload.
///
/// Field aliases observed in the wild: `goal_amount` / `target_amount` /
/// `targetAmount`, `creator_id` / `user_id` / `userId`, `image_url` /
/// `thumbnail_url`. Goal positivity is validated downstream by the
/// aggregator and the database; structural absence is rejected here.
pub fn new_campaign(value: &Value) -> Result<NewCampaign> {
    let title = pick_str(value, &["title"])
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| DomainError::MalformedRecord("campaign: missing title".into()))?;
    let goal_amount = pick_i64(value, &["goal_amount", "target_amount", "targetAmount"])
        .ok_or_else(|| DomainError::MalformedRecord("campaign: missing goal amount".into()))?;
    let deadline = pick_i64(value, &["deadline", "end_date", "endDate"])
        .ok_or_else(|| DomainError::MalformedRecord("campaign: missing deadline".into()))?;
    let creator_id = pick_i64(value, &["creator_id", "user_id", "userId"])
        .ok_or_else(|| DomainError::MalformedRecord("campaign: missing creator id".into()))?;

    Ok(NewCampaign {
        title,
        description: pick_str(value, &["description"]).unwrap_or_default(),
        goal_amount,
        deadline,
        creator_id,
        image_url: pick_str(value, &["image_url", "thumbnail_url", "thumbnailUrl"]),
    })
}

/// Normalized input for creating a contribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContribution {
    pub supporter_id: i64,
    pub amount: i64,
    pub message: Option<String>,
}

/// Normalize a contribution-creation payload.
pub fn new_contribution(value: &Value) -> Result<NewContribution> {
    let supporter_id = pick_i64(value, &["supporter_id", "user_id", "userId"])
        .ok_or_else(|| DomainError::MalformedRecord("contribution: missing supporter id".into()))?;
    let amount = pick_i64(value, &["amount"])
        .ok_or_else(|| DomainError::MalformedRecord("contribution: missing amount".into()))?;
    if amount <= 0 {
        return Err(DomainError::MalformedRecord(format!(
            "contribution: non-positive amount {amount}"
        )));
    }

    Ok(NewContribution {
        supporter_id,
        amount,
        message: pick_str(value, &["message"]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pick_i64_accepts_numbers_and_numeric_strings() {
        let v = json!({ "amount": 5000 });
        assert_eq!(pick_i64(&v, &["amount"]), Some(5000));
        let v = json!({ "amount": "5000" });
        assert_eq!(pick_i64(&v, &["amount"]), Some(5000));
        let v = json!({ "amount": "not a number" });
        assert_eq!(pick_i64(&v, &["amount"]), None);
    }

    #[test]
    fn pick_tries_aliases_in_order() {
        let v = json!({ "targetAmount": 300000 });
        assert_eq!(
            pick_i64(&v, &["goal_amount", "target_amount", "targetAmount"]),
            Some(300000)
        );
        let v = json!({ "goal_amount": 100, "targetAmount": 200 });
        assert_eq!(
            pick_i64(&v, &["goal_amount", "target_amount", "targetAmount"]),
            Some(100)
        );
    }

    #[test]
    fn new_campaign_accepts_both_field_spellings() {
        let snake = json!({
            "title": "Birthday billboard",
            "description": "Station ad",
            "goal_amount": 500000,
            "deadline": 1735689600,
            "creator_id": 7
        });
        let camel = json!({
            "title": "Birthday billboard",
            "description": "Station ad",
            "targetAmount": 500000,
            "endDate": 1735689600,
            "userId": 7
        });
        assert_eq!(new_campaign(&snake).unwrap(), new_campaign(&camel).unwrap());
    }

    #[test]
    fn new_campaign_rejects_missing_goal() {
        let v = json!({ "title": "x", "deadline": 1, "creator_id": 1 });
        assert!(matches!(
            new_campaign(&v),
            Err(DomainError::MalformedRecord(_))
        ));
    }

    #[test]
    fn new_contribution_rejects_non_positive_amount() {
        let v = json!({ "user_id": 3, "amount": 0 });
        assert!(matches!(
            new_contribution(&v),
            Err(DomainError::MalformedRecord(_))
        ));
        let v = json!({ "user_id": 3, "amount": -100 });
        assert!(new_contribution(&v).is_err());
    }
}
