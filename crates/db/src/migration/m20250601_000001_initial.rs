//! Initial database migration.
//!
//! Creates the enums, the accounts table, and the movements table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: ACCOUNTS
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 3: MOVEMENTS
        // ============================================================
        db.execute_unprepared(MOVEMENTS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Account product types
CREATE TYPE account_type AS ENUM ('savings', 'checking');

-- Movement kinds
CREATE TYPE movement_kind AS ENUM ('deposit', 'withdrawal');
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    account_number VARCHAR(20) NOT NULL UNIQUE,
    account_type account_type NOT NULL,
    opening_balance NUMERIC(15, 2) NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT true,
    owner_client_id VARCHAR(64) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_opening_balance_non_negative CHECK (opening_balance >= 0)
);

CREATE INDEX idx_accounts_owner ON accounts(owner_client_id);
";

const MOVEMENTS_SQL: &str = r"
CREATE TABLE movements (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
    occurred_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    sequence BIGINT NOT NULL,
    kind movement_kind NOT NULL,
    signed_amount NUMERIC(15, 2) NOT NULL,
    resulting_balance NUMERIC(15, 2) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_resulting_balance_non_negative CHECK (resulting_balance >= 0),
    CONSTRAINT chk_amount_sign_matches_kind CHECK (
        (kind = 'deposit' AND signed_amount >= 0)
        OR (kind = 'withdrawal' AND signed_amount <= 0)
    ),
    UNIQUE (account_id, sequence)
);

CREATE INDEX idx_movements_account_time ON movements(account_id, occurred_at DESC, sequence DESC);
";

const DROP_ALL_SQL: &str = r"
-- ============================================================
-- DROP ALL: Rollback migration
-- Order matters due to foreign key constraints
-- ============================================================

DROP TABLE IF EXISTS movements CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;

DROP TYPE IF EXISTS movement_kind CASCADE;
DROP TYPE IF EXISTS account_type CASCADE;
";
