//! Write Documents Example
//!
//! Inserts a user, updates it, saves a new version and finally deletes it.
//!
//! Run with: cargo run --example write_documents -- [config.json]

use lightblue_core::projection::include_field;
use lightblue_core::query::{cmp_value, RelationalOp};
use lightblue_core::{
    value_of, DeleteRequest, DocData, InsertRequest, Literal, SaveRequest, Update, UpdateRequest,
};
use lightblue_rs::{Client, ClientConfig, Document, Response};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    login: String,
    login_count: i64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lightblue_rs=debug")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ClientConfig::load(&path)?,
        None => ClientConfig::default(),
    };
    let client = Client::new(&config)?;

    let user = User {
        id: None,
        login: "jdoe".to_string(),
        login_count: 0,
    };
    let insert = InsertRequest::new("user", DocData::from_value(&user)?)
        .with_projection(include_field("_id", false));
    let inserted: Response<Option<User>> = client.insert(&insert).await?;
    let Some(id) = inserted.entity_data.and_then(|u| u.id) else {
        anyhow::bail!("insert returned no id: {:?}", inserted.errors);
    };
    println!("Inserted {}", id);

    let by_id = cmp_value("_id", RelationalOp::Eq, Literal::string(id.as_str()));

    let mut update = Update::new();
    update
        .add("loginCount", Literal::int(1))
        .set("previousLogin", value_of("login"));
    let updated: Response<Vec<Document>> = client
        .update(&UpdateRequest::new("user", by_id.clone(), update))
        .await?;
    println!("Updated {} document(s)", updated.modified_count);

    let saved: Response<Vec<User>> = client
        .save(
            &SaveRequest::new(
                "user",
                DocData::from_value(&User {
                    id: Some(id.clone()),
                    login: "jdoe".to_string(),
                    login_count: 10,
                })?,
            )
            .with_upsert(false),
        )
        .await?;
    for failed in &saved.data_errors {
        println!("Save failed for {:?}: {:?}", failed.entity_data, failed.errors);
    }

    let deleted = client.delete(&DeleteRequest::new("user", by_id)).await?;
    println!("Deleted {} document(s)", deleted.modified_count);

    Ok(())
}
