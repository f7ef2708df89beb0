use sea_orm_migration::prelude::*;

use foodime_rflct_migration::Migrator;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
