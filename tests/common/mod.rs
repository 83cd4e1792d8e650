#![allow(dead_code)]

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use jsonwebtoken::{EncodingKey, Header, encode};
use marketplace_api::{
    config::{AppConfig, PaymentConfig},
    db::{DbPool, orm_from_pool},
    dto::auth::Claims,
    payments::{CheckoutSession, CheckoutSessionRequest, PaymentError, PaymentGateway},
    state::AppState,
};
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-secret";

/// In-memory gateway recording every call made by checkout.
#[derive(Default)]
pub struct FakeGateway {
    pub customer: Option<String>,
    pub fail_sessions: bool,
    pub customer_lookups: AtomicUsize,
    pub sessions: Mutex<Vec<CheckoutSessionRequest>>,
}

impl FakeGateway {
    pub fn calls(&self) -> usize {
        self.customer_lookups.load(Ordering::SeqCst) + self.sessions_created()
    }

    pub fn sessions_created(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn find_customer(&self, _email: &str) -> Result<Option<String>, PaymentError> {
        self.customer_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.customer.clone())
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        if self.fail_sessions {
            return Err(PaymentError::Rejected {
                status: 400,
                body: "card_declined".into(),
            });
        }
        let mut sessions = self.sessions.lock().unwrap();
        sessions.push(request.clone());
        Ok(CheckoutSession {
            id: format!("cs_test_{}", sessions.len()),
            url: "https://checkout.example.com/pay/cs_test".into(),
        })
    }
}

pub fn test_config(database_url: &str) -> AppConfig {
    AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: JWT_SECRET.into(),
        payments: PaymentConfig {
            secret_key: "sk_test".into(),
            api_base: "http://127.0.0.1:9".into(),
            currency: "eur".into(),
            timeout: Duration::from_secs(5),
        },
        public_site_url: "http://localhost:5173".into(),
    }
}

pub fn state_with(pool: DbPool, database_url: &str, gateway: Arc<FakeGateway>) -> AppState {
    AppState {
        orm: orm_from_pool(&pool),
        pool,
        config: Arc::new(test_config(database_url)),
        payments: gateway,
    }
}

pub fn bearer(user_id: Uuid, email: &str) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        email: Some(email.to_string()),
        role: Some("authenticated".into()),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap();
    format!("Bearer {token}")
}
