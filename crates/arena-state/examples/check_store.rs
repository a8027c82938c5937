//! Open the turn store the way the CLI does and report what it holds.
//! Run with: cargo run --package arena-state --example check_store

use arena_state::{SurrealTurnStore, TurnStore};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    println!("Opening turn store from environment...");

    let store = match SurrealTurnStore::from_env().await {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Connection failed: {}", e);
            std::process::exit(1);
        }
    };

    match store.list().await {
        Ok(turns) => {
            println!("  Turns stored: {}", turns.len());
            if let Some(latest) = turns.first() {
                println!("  Latest turn: {} ({})", latest.turn_id, latest.created_at);
                println!("  Question:    {}", latest.question);
                match latest.human_label {
                    Some(label) => println!("  Label:       {}", label),
                    None => println!("  Label:       (none)"),
                }
            }
        }
        Err(e) => {
            eprintln!("Listing turns failed: {}", e);
            std::process::exit(1);
        }
    }
}
