//! Demonstrates building, authorizing, and sending an API request.
//!
//! Run with: cargo run --example build_request

use backhaul::transport::{HttpTransport, Transport};
use backhaul::{ApiRequest, ApiRequestConfig, AuthType, ClientContext};
use serde_json::json;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), backhaul::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backhaul=debug".into()),
        )
        .init();

    let client = Arc::new(ClientContext {
        app_key: Some("myapp".to_string()),
        app_secret: Some("app-secret".to_string()),
        ..Default::default()
    });

    let mut config = ApiRequestConfig::new(
        "https://baas.example.com/appdata/myapp/books",
        client,
    );
    config.set_method("POST")?;
    config.set_auth_type(AuthType::App);
    config.set_body(json!({ "title": "Dune", "author": "Frank Herbert" }));
    config.set_app_version([1, 0]);
    config.set_query(Some(json!({ "tls": true })))?;

    println!("collection: {:?}", config.segments().collection);
    println!("url:        {}", config.url());

    let mut request = ApiRequest::new(config);
    let prepared = request.execute()?;
    for (name, value) in &prepared.headers {
        println!("header:     {name}: {value}");
    }

    let transport = HttpTransport::builder().build()?;
    match transport.send(prepared).await {
        Ok(response) => println!("status:     {}", response.status),
        Err(e) => println!("send failed: {e}"),
    }

    Ok(())
}
