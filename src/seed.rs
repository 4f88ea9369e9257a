//! Synthetic Stripe webhooks for demos and local development

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use rand::{distributions::Alphanumeric, seq::SliceRandom, Rng};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::info;
use webhook_inspector_db::{NewWebhook, WebhookStore};

pub const STRIPE_EVENTS: [&str; 20] = [
    "charge.succeeded",
    "charge.failed",
    "charge.refunded",
    "payment_intent.succeeded",
    "payment_intent.payment_failed",
    "payment_intent.created",
    "invoice.paid",
    "invoice.payment_failed",
    "invoice.created",
    "invoice.finalized",
    "customer.created",
    "customer.updated",
    "customer.deleted",
    "customer.subscription.created",
    "customer.subscription.updated",
    "customer.subscription.deleted",
    "checkout.session.completed",
    "checkout.session.expired",
    "payment_method.attached",
    "payment_method.detached",
];

const CURRENCIES: [&str; 3] = ["usd", "eur", "brl"];

const DESCRIPTIONS: [&str; 6] = [
    "Monthly subscription",
    "Annual plan upgrade",
    "One-time setup fee",
    "Usage based billing",
    "Add-on seats",
    "Priority support",
];

const EMAIL_DOMAINS: [&str; 4] = ["example.com", "example.org", "mail.test", "shop.test"];

/// Window in which synthetic creation times fall
const RECENT_DAYS: i64 = 30;

fn alphanumeric<R: Rng>(rng: &mut R, len: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn object_id<R: Rng>(rng: &mut R, event_type: &str) -> String {
    let (prefix, len) = if event_type.contains("charge") {
        ("ch", 24)
    } else if event_type.contains("payment_intent") {
        ("pi", 24)
    } else if event_type.contains("invoice") {
        ("in", 24)
    } else if event_type.contains("customer") {
        ("cus", 14)
    } else {
        ("cs", 24)
    };

    format!("{}_{}", prefix, alphanumeric(rng, len))
}

/// Build one Stripe-style webhook received at a random time in the last 30 days
pub fn stripe_webhook<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> (NewWebhook, DateTime<Utc>) {
    let event_type = *STRIPE_EVENTS.choose(rng).unwrap_or(&STRIPE_EVENTS[0]);
    let currency = *CURRENCIES.choose(rng).unwrap_or(&CURRENCIES[0]);
    let amount: u32 = rng.gen_range(1000..=50000);
    let created_at = now - Duration::seconds(rng.gen_range(0..RECENT_DAYS * 24 * 60 * 60));

    let object = event_type.split('.').next().unwrap_or(event_type);
    let email = format!(
        "{}@{}",
        alphanumeric(rng, 8).to_lowercase(),
        EMAIL_DOMAINS.choose(rng).unwrap_or(&EMAIL_DOMAINS[0])
    );

    let body = json!({
        "id": format!("evt_{}", alphanumeric(rng, 24)),
        "object": "event",
        "api_version": "2023-10-16",
        "created": created_at.timestamp(),
        "type": event_type,
        "data": {
            "object": {
                "id": object_id(rng, event_type),
                "object": object,
                "amount": amount,
                "currency": currency,
                "customer": format!("cus_{}", alphanumeric(rng, 14)),
                "description": DESCRIPTIONS.choose(rng).unwrap_or(&DESCRIPTIONS[0]),
                "status": if event_type.contains("failed") { "failed" } else { "succeeded" },
                "receipt_email": email,
            }
        }
    });
    let body = serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string());

    let client_user_agent = json!({
        "bindings_version": "10.0.0",
        "lang": "node",
        "lang_version": "18.0.0",
        "platform": "linux",
        "publisher": "stripe",
    });

    let headers = BTreeMap::from([
        ("content-type".to_string(), "application/json".to_string()),
        (
            "stripe-signature".to_string(),
            format!("t={},v1={}", now.timestamp(), alphanumeric(rng, 64)),
        ),
        (
            "user-agent".to_string(),
            "Stripe/1.0 (+https://stripe.com/docs/webhooks)".to_string(),
        ),
        ("accept".to_string(), "*/*".to_string()),
        ("accept-encoding".to_string(), "gzip, deflate".to_string()),
        (
            "x-stripe-client-user-agent".to_string(),
            client_user_agent.to_string(),
        ),
    ]);

    let ip = format!(
        "{}.{}.{}.{}",
        rng.gen_range(1..=223u8),
        rng.gen::<u8>(),
        rng.gen::<u8>(),
        rng.gen_range(1..=254u8)
    );

    // Mostly successful deliveries
    let status_code = if rng.gen_ratio(1, 5) { 500 } else { 200 };

    let webhook = NewWebhook {
        method: "POST".to_string(),
        pathname: "/webhooks/stripe".to_string(),
        ip,
        status_code,
        content_type: Some("application/json".to_string()),
        content_length: i32::try_from(body.len()).ok(),
        query_params: None,
        headers,
        body: Some(body),
    };

    (webhook, created_at)
}

/// Clear the table and insert `count` synthetic webhooks, oldest first
pub async fn run(store: &WebhookStore, count: usize) -> Result<()> {
    info!(count, "Seeding database with Stripe webhooks");

    let removed = store
        .clear()
        .await
        .context("Failed to clear existing webhooks")?;
    info!(removed, "Removed existing webhooks");

    let now = Utc::now();
    let mut webhooks: Vec<_> = {
        let mut rng = rand::thread_rng();
        (0..count).map(|_| stripe_webhook(&mut rng, now)).collect()
    };
    webhooks.sort_by_key(|(_, created_at)| *created_at);

    for (webhook, created_at) in webhooks {
        store
            .insert_at(webhook, created_at)
            .await
            .context("Failed to insert seed webhook")?;
    }

    info!(count, "Database seeded");
    Ok(())
}
