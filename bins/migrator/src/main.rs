//! Migration runner for the Postgres document store.
//!
//! Reads `DATABASE_URL`. Usage:
//!   migrator up      - Create the documents table
//!   migrator down    - Drop it again
//!   migrator status  - Show applied migrations

use ndiambour_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    cli::run_cli(Migrator).await;
}
