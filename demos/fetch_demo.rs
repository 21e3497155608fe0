//! Document Fetch Example
//!
//! Looks up `users/user1` through each call shape and renders the answer the
//! way a UI would: "Data Exists", "Data Not Exist" or "Error: <message>".
//!
//! Run with `RUST_LOG=trace cargo run --example fetch_demo` to see the bridge's log lines.

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use callback_bridge::{
    CancelToken, DocumentClient, DocumentData, ErrorInfo, InMemoryStore, Outcome, Result,
};

fn render_exists(result: Result<bool>) -> String {
    match result {
        Ok(true) => "Data Exists".to_string(),
        Ok(false) => "Data Not Exist".to_string(),
        Err(e) => format!("Error: {e}"),
    }
}

fn render_data(outcome: &Outcome<DocumentData>) -> String {
    match outcome {
        Outcome::Success(Some(data)) => {
            let name = data.get("name").cloned().flatten().unwrap_or_default();
            format!("{data:?}\n{name}")
        }
        Outcome::Success(None) => "Data Not Exist".to_string(),
        Outcome::Failure(cause) => format!("Error: {cause}"),
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let store = InMemoryStore::new().with_latency(Duration::from_millis(50));
    let mut user = DocumentData::new();
    user.insert("name".to_string(), Some("Ada Lovelace".to_string()));
    user.insert("role".to_string(), Some("admin".to_string()));
    store.insert("users", "user1", user);
    let client = DocumentClient::new(Arc::new(store));

    println!("📡 Callback-to-future bridge demo");
    println!();

    // Callback style
    let (tx, rx) = mpsc::channel::<Result<bool>>();
    let err_tx = tx.clone();
    client.exists_with_callbacks(
        "users",
        "user1",
        move |exists| {
            let _ = tx.send(Ok(exists));
        },
        move |cause: ErrorInfo| {
            let _ = err_tx.send(Err(cause.into()));
        },
    );
    let answer = tokio::task::spawn_blocking(move || rx.recv())
        .await
        .ok()
        .and_then(|received| received.ok());
    match answer {
        Some(result) => println!("callbacks:   {}", render_exists(result)),
        None => println!("callbacks:   Error: no answer"),
    }

    // Raising shape
    println!("raising:     {}", render_exists(client.exists("users", "user1").await));
    println!("raising:     {}", render_exists(client.exists("users", "user2").await));

    // Outcome shape
    let found = client.fetch_data("users", "user1").await;
    println!("outcome:     {}", render_data(&found));
    let missing = client.fetch_data("users", "user2").await;
    println!("outcome:     {}", render_data(&missing));

    // Cancelled before the store answers
    let token = CancelToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        canceller.cancel();
    });
    let cancelled = client.exists_cancellable("users", "user1", &token).await;
    println!("cancelled:   {}", render_exists(cancelled));
    println!(
        "store cancel hooks run: {}",
        client.provider().cancellations()
    );
}
