//! Initial database migration.
//!
//! Creates the enums, the identity tables (users, startups, sessions, reset
//! tokens), the employee tables with their ledger, and the financial tables.

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
        // PART 2: IDENTITY
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(STARTUPS_SQL).await?;
        db.execute_unprepared(SESSIONS_SQL).await?;
        db.execute_unprepared(PASSWORD_RESET_TOKENS_SQL).await?;

        // ============================================================
        // PART 3: CAP TABLE
        // ============================================================
        db.execute_unprepared(CAP_TABLES_SQL).await?;
        db.execute_unprepared(INVESTMENTS_SQL).await?;

        // ============================================================
        // PART 4: EMPLOYEES & ESOP LEDGER
        // ============================================================
        db.execute_unprepared(EMPLOYEES_SQL).await?;
        db.execute_unprepared(SALARY_INCREMENTS_SQL).await?;
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;

        // ============================================================
        // PART 5: FINANCIALS
        // ============================================================
        db.execute_unprepared(FINANCIAL_RECORDS_SQL).await?;

        // ============================================================
        // PART 6: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE allocation_type AS ENUM ('one_time', 'annually', 'quarterly', 'monthly');
CREATE TYPE record_type AS ENUM ('expense', 'revenue');
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR(255) NOT NULL,
    password_hash VARCHAR(255) NOT NULL,
    full_name VARCHAR(255) NOT NULL,
    identity_document VARCHAR(512),
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE UNIQUE INDEX idx_users_email ON users(lower(email));
";

const STARTUPS_SQL: &str = r"
CREATE TABLE startups (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    company_name VARCHAR(255),
    country VARCHAR(100),
    currency VARCHAR(3),
    registration_date DATE,
    total_funding NUMERIC(20, 2),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_total_funding_non_negative CHECK (total_funding IS NULL OR total_funding >= 0)
);

CREATE UNIQUE INDEX idx_startups_owner ON startups(owner_id);
";

const SESSIONS_SQL: &str = r"
CREATE TABLE sessions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    refresh_token_hash VARCHAR(64) NOT NULL,
    user_agent TEXT,
    expires_at TIMESTAMPTZ NOT NULL,
    revoked_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_expires_future CHECK (expires_at > created_at)
);

CREATE INDEX idx_sessions_token_hash ON sessions(refresh_token_hash) WHERE revoked_at IS NULL;
CREATE INDEX idx_sessions_user ON sessions(user_id, created_at DESC) WHERE revoked_at IS NULL;
";

const PASSWORD_RESET_TOKENS_SQL: &str = r"
CREATE TABLE password_reset_tokens (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    token_hash VARCHAR(64) NOT NULL,
    expires_at TIMESTAMPTZ NOT NULL,
    used_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE UNIQUE INDEX idx_password_reset_token_hash ON password_reset_tokens(token_hash);
CREATE INDEX idx_password_reset_user ON password_reset_tokens(user_id) WHERE used_at IS NULL;
";

const CAP_TABLES_SQL: &str = r"
CREATE TABLE cap_tables (
    startup_id UUID PRIMARY KEY REFERENCES startups(id) ON DELETE CASCADE,
    total_shares NUMERIC(20, 0) NOT NULL DEFAULT 0,
    esop_reserved_shares NUMERIC(20, 0) NOT NULL DEFAULT 0,
    valuation NUMERIC(20, 2) NOT NULL DEFAULT 0,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_shares_non_negative CHECK (total_shares >= 0 AND esop_reserved_shares >= 0),
    CONSTRAINT chk_reserve_within_total CHECK (esop_reserved_shares <= total_shares),
    CONSTRAINT chk_valuation_non_negative CHECK (valuation >= 0)
);
";

const INVESTMENTS_SQL: &str = r"
CREATE TABLE investments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    startup_id UUID NOT NULL REFERENCES startups(id) ON DELETE CASCADE,
    investor_name VARCHAR(255) NOT NULL,
    round VARCHAR(100),
    amount NUMERIC(20, 2) NOT NULL,
    invested_on DATE NOT NULL,
    shares_issued NUMERIC(20, 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_investment_positive CHECK (amount > 0)
);

CREATE INDEX idx_investments_startup ON investments(startup_id, invested_on);
";

const EMPLOYEES_SQL: &str = r"
CREATE TABLE employees (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    startup_id UUID NOT NULL REFERENCES startups(id) ON DELETE CASCADE,
    full_name VARCHAR(255) NOT NULL,
    email VARCHAR(255),
    designation VARCHAR(255),
    department VARCHAR(255),
    entity VARCHAR(255),
    joining_date DATE NOT NULL,
    salary NUMERIC(20, 2) NOT NULL,
    esop_allocation NUMERIC(20, 2) NOT NULL DEFAULT 0,
    allocation_type allocation_type NOT NULL DEFAULT 'one_time',
    esop_per_allocation NUMERIC(20, 2) NOT NULL DEFAULT 0,
    price_per_share NUMERIC(28, 10) NOT NULL DEFAULT 0,
    number_of_shares NUMERIC(20, 0) NOT NULL DEFAULT 0,
    termination_date DATE,
    termination_reason TEXT,
    contract_key VARCHAR(1024),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_salary_non_negative CHECK (salary >= 0),
    CONSTRAINT chk_esop_non_negative CHECK (esop_allocation >= 0),
    CONSTRAINT chk_termination_after_joining CHECK (termination_date IS NULL OR termination_date >= joining_date)
);

CREATE INDEX idx_employees_startup ON employees(startup_id, joining_date);
";

const SALARY_INCREMENTS_SQL: &str = r"
CREATE TABLE salary_increments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    employee_id UUID NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
    effective_date DATE NOT NULL,
    salary NUMERIC(20, 2) NOT NULL,
    esop_allocation NUMERIC(20, 2) NOT NULL DEFAULT 0,
    allocation_type allocation_type NOT NULL DEFAULT 'one_time',
    esop_per_allocation NUMERIC(20, 2) NOT NULL DEFAULT 0,
    price_per_share NUMERIC(28, 10) NOT NULL DEFAULT 0,
    number_of_shares NUMERIC(20, 0) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_increment_salary_non_negative CHECK (salary >= 0),
    CONSTRAINT chk_increment_esop_non_negative CHECK (esop_allocation >= 0)
);

CREATE INDEX idx_salary_increments_employee ON salary_increments(employee_id, effective_date, created_at);
";

const LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE employee_ledger_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    employee_id UUID NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
    entry_date DATE NOT NULL,
    salary NUMERIC(20, 2) NOT NULL,
    esop_allocation NUMERIC(20, 2) NOT NULL,
    allocation_type allocation_type NOT NULL,
    esop_per_allocation NUMERIC(20, 2) NOT NULL,
    price_per_share NUMERIC(28, 10) NOT NULL,
    number_of_shares NUMERIC(20, 0) NOT NULL,
    shares_granted NUMERIC(20, 0) NOT NULL DEFAULT 0,
    cumulative_shares NUMERIC(20, 0) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_ledger_employee_date UNIQUE (employee_id, entry_date)
);
";

const FINANCIAL_RECORDS_SQL: &str = r"
CREATE TABLE financial_records (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    startup_id UUID NOT NULL REFERENCES startups(id) ON DELETE CASCADE,
    record_type record_type NOT NULL,
    record_date DATE NOT NULL,
    entity VARCHAR(255),
    vertical VARCHAR(255) NOT NULL,
    amount NUMERIC(20, 2) NOT NULL,
    description TEXT,
    cogs NUMERIC(20, 2),
    funding_source VARCHAR(255),
    attachment_key VARCHAR(1024),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_cogs_non_negative CHECK (cogs IS NULL OR cogs >= 0),
    CONSTRAINT chk_cogs_only_on_revenue CHECK (record_type = 'revenue' OR cogs IS NULL)
);

CREATE INDEX idx_financial_records_startup ON financial_records(startup_id, record_date);
";

const TRIGGERS_SQL: &str = r"
CREATE OR REPLACE FUNCTION touch_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_users_updated_at BEFORE UPDATE ON users
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_startups_updated_at BEFORE UPDATE ON startups
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_employees_updated_at BEFORE UPDATE ON employees
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_financial_records_updated_at BEFORE UPDATE ON financial_records
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS financial_records CASCADE;
DROP TABLE IF EXISTS employee_ledger_entries CASCADE;
DROP TABLE IF EXISTS salary_increments CASCADE;
DROP TABLE IF EXISTS employees CASCADE;
DROP TABLE IF EXISTS investments CASCADE;
DROP TABLE IF EXISTS cap_tables CASCADE;
DROP TABLE IF EXISTS password_reset_tokens CASCADE;
DROP TABLE IF EXISTS sessions CASCADE;
DROP TABLE IF EXISTS startups CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP FUNCTION IF EXISTS touch_updated_at CASCADE;
DROP TYPE IF EXISTS record_type;
DROP TYPE IF EXISTS allocation_type;
";
