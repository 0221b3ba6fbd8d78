//! Application configuration loaded from environment variables.

use crate::errors::{Result, ServerError};

#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite database file
    pub database_url: String,
    /// Port for the REST API server
    pub api_port: u16,
    /// Base URL of the hosted-checkout payment gateway
    pub gateway_url: String,
    /// Secret API key for the payment gateway
    pub gateway_secret: String,
    /// Shared token required on admin (moderation) endpoints
    pub admin_token: String,
    /// Where the gateway redirects the supporter after payment
    pub success_url: String,
    /// Where the gateway redirects the supporter on cancellation
    pub cancel_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            database_url: env_var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./oshiome.db".to_string()),
            api_port: env_var("API_PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .map_err(|_| ServerError::Config("Invalid API_PORT".to_string()))?,
            gateway_url: env_var("GATEWAY_URL")
                .unwrap_or_else(|_| "https://sandbox.checkout.example.com".to_string()),
            gateway_secret: env_var("GATEWAY_SECRET").map_err(|_| {
                ServerError::Config("GATEWAY_SECRET environment variable is required".to_string())
            })?,
            admin_token: env_var("ADMIN_TOKEN").map_err(|_| {
                ServerError::Config("ADMIN_TOKEN environment variable is required".to_string())
            })?,
            success_url: env_var("SUCCESS_URL")
                .unwrap_or_else(|_| "http://localhost:5173/payment/success".to_string()),
            cancel_url: env_var("CANCEL_URL")
                .unwrap_or_else(|_| "http://localhost:5173/payment/cancel".to_string()),
        })
    }
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| ServerError::Config(format!("Missing env var: {key}")))
}
