//! Table definitions
//!
//! The CHECK constraints back the ledger's invariants at the storage level:
//! a balance or amount below zero is refused even if application code slips.

use sqlx::PgPool;

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS sellers_tb (
        seller_id     BIGSERIAL PRIMARY KEY,
        username      VARCHAR(50) NOT NULL UNIQUE,
        password_hash TEXT,
        credit        BIGINT NOT NULL DEFAULT 0 CHECK (credit >= 0),
        is_active     BOOLEAN NOT NULL DEFAULT TRUE,
        is_staff      BOOLEAN NOT NULL DEFAULT FALSE,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS transactions_tb (
        id        BIGSERIAL PRIMARY KEY,
        seller_id BIGINT NOT NULL REFERENCES sellers_tb (seller_id),
        kind      VARCHAR(2) NOT NULL CHECK (kind IN ('CH', 'SE')),
        datetime  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        receiver  VARCHAR(14),
        amount    BIGINT NOT NULL CHECK (amount >= 0),
        CHECK (kind = 'CH' OR receiver IS NOT NULL)
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_transactions_seller
        ON transactions_tb (seller_id, id)
    "#,
];

/// Create tables and indexes if missing
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for stmt in STATEMENTS {
        sqlx::query(stmt).execute(pool).await?;
    }
    tracing::info!("Ledger schema ready");
    Ok(())
}
