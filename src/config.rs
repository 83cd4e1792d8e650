use std::{env, time::Duration};

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub payments: PaymentConfig,
    /// Storefront origin used for payment redirects when a request has no `Origin` header.
    pub public_site_url: String,
}

#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub secret_key: String,
    pub api_base: String,
    pub currency: String,
    /// Upper bound for one provider call, connect to last body byte.
    pub timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        let public_site_url = env::var("PUBLIC_SITE_URL")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());

        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            payments: PaymentConfig::from_env()?,
            public_site_url: public_site_url.trim_end_matches('/').to_string(),
        })
    }
}

impl PaymentConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let secret_key =
            env::var("STRIPE_SECRET_KEY").context("STRIPE_SECRET_KEY is not set")?;
        let api_base = env::var("STRIPE_API_BASE")
            .unwrap_or_else(|_| "https://api.stripe.com/v1".to_string());
        let currency = env::var("PAYMENT_CURRENCY")
            .map(|c| c.to_lowercase())
            .unwrap_or_else(|_| "eur".to_string());
        let timeout_secs = env::var("STRIPE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);
        Ok(Self {
            secret_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            currency,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
