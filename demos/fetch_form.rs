//! Post a multipart form and print the echoed response.
//!
//! ```text
//! RUST_LOG=fetch_model=debug cargo run --example fetch_form -- https://httpbin.org/post
//! ```

use anyhow::Context;
use fetch_model::client::{fetch, ClientConfig, ReqwestTransport};
use fetch_model::{Blob, FormData, FormValue, Request, RequestInit};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://httpbin.org/post".to_string());

    let mut form = FormData::new();
    form.append("greeting", "hello");
    form.append("greeting", "world");
    form.append(
        "notes",
        FormValue::file(Blob::new("line one\nline two", "text/plain"), "notes.txt"),
    );

    let transport = ReqwestTransport::with_config(ClientConfig {
        max_retries: 2,
        retry_delay_ms: 250,
        ..Default::default()
    })?;

    let request = Request::new(
        url.as_str(),
        RequestInit {
            method: Some("POST".into()),
            body: Some(form.into()),
            ..Default::default()
        },
    )?;

    let mut response = fetch(&transport, request)
        .await
        .with_context(|| format!("posting form to {url}"))?;

    tracing::info!(
        status = response.status(),
        status_text = response.status_text(),
        "response received"
    );

    let is_json = response
        .headers()
        .get("content-type")
        .is_some_and(|ct| ct.starts_with("application/json"));
    let body: serde_json::Value = if is_json {
        response.json().await?
    } else {
        serde_json::Value::String(response.text().await?)
    };
    println!("{}", serde_json::to_string_pretty(&body)?);

    Ok(())
}
