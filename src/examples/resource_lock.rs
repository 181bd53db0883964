//! Resource Lock Example
//!
//! Acquires a lock through the data service, inspects it and releases it.
//!
//! Run with: cargo run --example resource_lock -- [config.json]

use lightblue_rs::{Client, ClientConfig, ClientError};
use tracing_subscriber::EnvFilter;

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

    let (domain, caller, resource) = ("batch", "example-worker", "nightly-import");

    match client.acquire(domain, caller, resource, 30_000).await {
        Ok(true) => println!("Lock acquired"),
        Ok(false) => {
            println!("Lock is held by someone else");
            return Ok(());
        }
        Err(ClientError::Lock(error)) => {
            println!("Lock service refused: {}", error);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    println!("Held {} time(s)", client.lock_count(domain, caller, resource).await?);
    println!("Ping: {}", client.ping(domain, caller, resource).await?);
    println!("Released: {}", client.release(domain, caller, resource).await?);

    Ok(())
}
