//! Schema migration runner for the Ledgra database.
//!
//! Connects to `DATABASE_URL` and drives the migration set in
//! `ledgra_db::migration`. Supported subcommands:
//!   migrator up      - Apply pending migrations
//!   migrator down    - Roll back the last migration
//!   migrator status  - Show which migrations have run
//!   migrator fresh   - Drop everything and migrate from scratch

use ledgra_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    // .env is optional; environment variables win when both are set
    dotenvy::dotenv().ok();

    // The migrator CLI configures its own tracing subscriber
    cli::run_cli(Migrator).await;
}
