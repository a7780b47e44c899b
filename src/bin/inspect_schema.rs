//! Utility to inspect the customers table and print its structure.

use customer_records::config::Config;
use customer_records::db::Database;

/// Main entry point for the schema inspection utility.
///
/// Connects through the same lazy connection the server uses (which also
/// applies the schema), then lists the columns and row count of `customers`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let db = Database::new(&config);
    let pool = db.pool().await?;

    let columns: Vec<(String, String, String)> = sqlx::query_as(
        "SELECT column_name::text, data_type::text, is_nullable::text FROM information_schema.columns WHERE table_name = 'customers' ORDER BY ordinal_position",
    )
    .fetch_all(&pool)
    .await?;

    println!("customers");
    for (col, type_, nullable) in columns {
        let null = if nullable == "YES" { "" } else { " NOT NULL" };
        println!("  - {}: {}{}", col, type_, null);
    }

    let constraints: Vec<(String, String)> = sqlx::query_as(
        "SELECT constraint_name::text, constraint_type::text FROM information_schema.table_constraints WHERE table_name = 'customers' ORDER BY constraint_name",
    )
    .fetch_all(&pool)
    .await?;

    println!();
    println!("constraints");
    for (name, kind) in constraints {
        println!("  - {} ({})", name, kind);
    }

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM customers")
        .fetch_one(&pool)
        .await?;
    println!();
    println!("{} customer record(s)", count);

    Ok(())
}
