use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::PaymentConfig;

use super::{CheckoutSession, CheckoutSessionRequest, PaymentError, PaymentGateway};

/// Stripe REST client covering customer lookup and checkout session creation.
#[derive(Clone)]
pub struct StripeGateway {
    client: Client,
    secret_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CustomerList {
    data: Vec<CustomerRef>,
}

#[derive(Debug, Deserialize)]
struct CustomerRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

impl StripeGateway {
    pub fn new(config: &PaymentConfig) -> Result<Self, PaymentError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            secret_key: config.secret_key.clone(),
            base_url: config.api_base.clone(),
        })
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, PaymentError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await?;
        Err(PaymentError::Rejected { status, body })
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn find_customer(&self, email: &str) -> Result<Option<String>, PaymentError> {
        let response = self
            .client
            .get(format!("{}/customers", self.base_url))
            .bearer_auth(&self.secret_key)
            .query(&[("email", email), ("limit", "1")])
            .send()
            .await?;
        let customers: CustomerList = Self::check(response).await?.json().await?;
        Ok(customers.data.into_iter().next().map(|c| c.id))
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let response = self
            .client
            .post(format!("{}/checkout/sessions", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&session_form(request))
            .send()
            .await?;
        let session: SessionResponse = Self::check(response).await?.json().await?;
        tracing::debug!(session_id = %session.id, "stripe checkout session created");

        let url = session.url.ok_or(PaymentError::MissingUrl)?;
        Ok(CheckoutSession { id: session.id, url })
    }
}

/// Flatten a session request into Stripe's bracketed form encoding.
pub fn session_form(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
    ];

    match (&request.customer, &request.customer_email) {
        (Some(customer), _) => form.push(("customer".into(), customer.clone())),
        (None, Some(email)) => form.push(("customer_email".into(), email.clone())),
        (None, None) => {}
    }

    for (i, item) in request.line_items.iter().enumerate() {
        let prefix = format!("line_items[{i}]");
        form.push((
            format!("{prefix}[price_data][currency]"),
            request.currency.clone(),
        ));
        form.push((
            format!("{prefix}[price_data][product_data][name]"),
            item.name.clone(),
        ));
        if let Some(description) = &item.description {
            form.push((
                format!("{prefix}[price_data][product_data][description]"),
                description.clone(),
            ));
        }
        if let Some(image) = &item.image {
            form.push((
                format!("{prefix}[price_data][product_data][images][0]"),
                image.clone(),
            ));
        }
        form.push((
            format!("{prefix}[price_data][unit_amount]"),
            item.unit_amount.to_string(),
        ));
        form.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
    }

    for (key, value) in &request.metadata {
        form.push((format!("metadata[{key}]"), value.clone()));
    }

    form
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::payments::PaymentLineItem;

    fn request(customer: Option<&str>) -> CheckoutSessionRequest {
        CheckoutSessionRequest {
            currency: "eur".into(),
            customer: customer.map(str::to_string),
            customer_email: Some("buyer@example.com".into()),
            line_items: vec![
                PaymentLineItem {
                    name: "Wax fabric".into(),
                    description: Some("Red 6m".into()),
                    image: Some("https://cdn.example.com/wax.jpg".into()),
                    unit_amount: 4599,
                    quantity: 2,
                },
                PaymentLineItem {
                    name: "Basket".into(),
                    description: None,
                    image: None,
                    unit_amount: 6550,
                    quantity: 1,
                },
            ],
            success_url: "https://shop.example.com/payment-success?session_id={CHECKOUT_SESSION_ID}"
                .into(),
            cancel_url: "https://shop.example.com/cart".into(),
            metadata: BTreeMap::from([
                ("order_id".to_string(), "0b7e".to_string()),
                ("order_number".to_string(), "ORD-1".to_string()),
            ]),
        }
    }

    fn value<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn encodes_line_items_with_bracketed_keys() {
        let form = session_form(&request(None));

        assert_eq!(value(&form, "mode"), Some("payment"));
        assert_eq!(value(&form, "line_items[0][price_data][currency]"), Some("eur"));
        assert_eq!(value(&form, "line_items[0][price_data][unit_amount]"), Some("4599"));
        assert_eq!(value(&form, "line_items[0][quantity]"), Some("2"));
        assert_eq!(
            value(&form, "line_items[0][price_data][product_data][images][0]"),
            Some("https://cdn.example.com/wax.jpg")
        );
        assert_eq!(value(&form, "line_items[1][price_data][product_data][description]"), None);
        assert_eq!(value(&form, "line_items[1][price_data][product_data][images][0]"), None);
        assert_eq!(value(&form, "metadata[order_number]"), Some("ORD-1"));
    }

    #[tokio::test]
    async fn hung_provider_call_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold connections without ever answering.
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let gateway = StripeGateway::new(&PaymentConfig {
            secret_key: "sk_test".into(),
            api_base: format!("http://{addr}"),
            currency: "eur".into(),
            timeout: std::time::Duration::from_millis(200),
        })
        .unwrap();

        let started = std::time::Instant::now();
        let err = gateway.find_customer("buyer@example.com").await.unwrap_err();
        assert!(matches!(&err, PaymentError::Transport(e) if e.is_timeout()));
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
        server.abort();
    }

    #[test]
    fn known_customer_replaces_customer_email() {
        let form = session_form(&request(Some("cus_123")));
        assert_eq!(value(&form, "customer"), Some("cus_123"));
        assert_eq!(value(&form, "customer_email"), None);

        let form = session_form(&request(None));
        assert_eq!(value(&form, "customer"), None);
        assert_eq!(value(&form, "customer_email"), Some("buyer@example.com"));
    }
}
