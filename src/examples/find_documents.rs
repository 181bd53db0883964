//! Find Documents Example
//!
//! Queries a data service for users and prints them, once typed and once as
//! generic documents.
//!
//! Run with: cargo run --example find_documents -- [config.json]

use lightblue_core::projection::include_tree;
use lightblue_core::query::{and, cmp_value, cmp_value_list, NaryOp, RelationalOp};
use lightblue_core::{FindRequest, Literal, Range, RequestHeader, Response, Sort};
use lightblue_rs::{Client, ClientConfig, Document};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct User {
    login: String,
    #[serde(default)]
    first_name: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("lightblue_rs=debug,lightblue_core=debug")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ClientConfig::load(&path)?,
        None => ClientConfig::default(),
    };
    let client = Client::new(&config)?;

    // Attach the configured execution options explicitly
    let header = RequestHeader::new("user")
        .with_version("5.0.0")
        .with_execution_options(&config.execution_options())?;

    let query = and([
        cmp_value("active", RelationalOp::Eq, Literal::bool(true)),
        cmp_value_list("site", NaryOp::In, ["east", "west"]),
    ]);
    let request = FindRequest::default()
        .with_header(header)
        .with_query(query)
        .with_projection(include_tree("*"))
        .with_sort(Sort::asc("login"))
        .with_range(Range::new(0, 9));

    let users: Response<Vec<User>> = client.find(&request).await?;
    println!("Status: {:?}, matched {}", users.status, users.match_count);
    for user in &users.entity_data {
        println!("  {} ({})", user.login, user.first_name.as_deref().unwrap_or("-"));
    }
    for error in &users.errors {
        println!("  error: {}", error);
    }

    // Same request, documents kept generic
    let generic: Response<Vec<Document>> = client.find(&request).await?;
    for doc in &generic.entity_data {
        println!("  {}", serde_json::to_string(doc)?);
    }

    Ok(())
}
