//! Employee routes: records, increments, termination, ESOP ledgers and chart data.
//!
//! Every write that changes compensation history generates the employee's
//! new ledger first and checks it against the rest of the pool. Nothing is
//! written when the guard fails; otherwise the row change and the ledger are
//! stored in one transaction.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    routes::{current_startup, today, validate_amount},
};
use runway_core::currency::resolve_currency;
use runway_core::employee::{
    CompensationSnapshot, DepartmentBreakdown, Employee, EmployeeError, EmployeeRecord,
    MonthlyCost, SalaryIncrement, Termination, department_breakdown, monthly_costs,
    validate_increment, validate_new_employee, validate_termination,
};
use runway_core::esop::{AllocationType, EsopService, EsopSummary, EsopTerms};
use runway_core::ledger::{LedgerCadence, LedgerEntry, LedgerGenerator};
use runway_core::storage::StorageService;
use runway_db::{CapTableRepository, EmployeeRepository, LedgerRepository};
use runway_shared::types::{EmployeeId, IncrementId, StartupId};

/// Creates the employee routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/employees", get(list_employees).post(create_employee))
        .route("/employees/chart", get(employee_chart))
        .route("/employees/ledger/regenerate", post(regenerate_all_ledgers))
        .route(
            "/employees/{employee_id}",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
        .route("/employees/{employee_id}/increments", post(add_increment))
        .route(
            "/employees/{employee_id}/increments/{increment_id}",
            axum::routing::delete(delete_increment),
        )
        .route("/employees/{employee_id}/terminate", post(terminate_employee))
        .route(
            "/employees/{employee_id}/contract",
            put(set_contract).delete(clear_contract),
        )
        .route("/employees/{employee_id}/ledger", get(get_ledger))
        .route(
            "/employees/{employee_id}/ledger/regenerate",
            post(regenerate_ledger),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Employee fields set on hire or edit.
#[derive(Debug, Deserialize, Validate)]
pub struct EmployeeRequest {
    /// Full name.
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    /// Work email.
    #[validate(email)]
    pub email: Option<String>,
    /// Job title.
    pub designation: Option<String>,
    /// Department.
    pub department: Option<String>,
    /// Contracting entity.
    pub entity: Option<String>,
    /// First day of employment.
    pub joining_date: NaiveDate,
    /// Annual base salary.
    #[validate(custom(function = "validate_amount"))]
    pub salary: Decimal,
    /// ESOP value per allocation cycle.
    #[serde(default)]
    #[validate(custom(function = "validate_amount"))]
    pub esop_allocation: Decimal,
    /// Grant cadence.
    #[serde(default)]
    pub allocation_type: AllocationType,
}

/// A salary/ESOP change.
#[derive(Debug, Deserialize, Validate)]
pub struct IncrementRequest {
    /// First day the new values apply.
    pub effective_date: NaiveDate,
    /// New annual salary.
    #[validate(custom(function = "validate_amount"))]
    pub salary: Decimal,
    /// New ESOP value per allocation cycle.
    #[serde(default)]
    #[validate(custom(function = "validate_amount"))]
    pub esop_allocation: Decimal,
    /// New grant cadence.
    #[serde(default)]
    pub allocation_type: AllocationType,
}

/// Termination details.
#[derive(Debug, Deserialize, Validate)]
pub struct TerminateRequest {
    /// Last day of employment.
    pub termination_date: NaiveDate,
    /// Reason.
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

/// Contract attachment.
#[derive(Debug, Deserialize)]
pub struct ContractRequest {
    /// Storage key returned by the upload presign.
    pub key: String,
}

/// How to bring a ledger up to date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegenerateMode {
    /// Insert entries for missing dates only.
    #[default]
    FillGaps,
    /// Replace the whole ledger.
    Rebuild,
}

/// Regeneration options.
#[derive(Debug, Default, Deserialize)]
pub struct RegenerateRequest {
    /// Defaults to `fill_gaps`.
    #[serde(default)]
    pub mode: RegenerateMode,
}

/// Chart query.
#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    /// Calendar year; the current one when absent.
    pub year: Option<i32>,
}

/// An employee with its derived compensation.
#[derive(Debug, Serialize)]
pub struct EmployeeView {
    /// Stored record with joining values.
    #[serde(flatten)]
    pub employee: Employee,
    /// Values in force now.
    pub current: CompensationSnapshot,
    /// Recurring monthly ESOP expense of the current terms.
    pub monthly_esop_expense: Decimal,
    /// Employed today.
    pub is_active: bool,
    /// Increment history, oldest first.
    pub increments: Vec<SalaryIncrement>,
}

impl EmployeeView {
    fn new(record: EmployeeRecord, today: NaiveDate) -> Self {
        let current = record.current();
        let is_active = record.employee.is_active_on(today);
        Self {
            monthly_esop_expense: EsopService::monthly_expense(&current.terms),
            current,
            is_active,
            employee: record.employee,
            increments: record.increments,
        }
    }
}

/// Employee list with pool metrics.
#[derive(Debug, Serialize)]
pub struct EmployeeListResponse {
    /// Display currency.
    pub currency: &'static str,
    /// ESOP pool metrics.
    pub esop: EsopSummary,
    /// Employees.
    pub employees: Vec<EmployeeView>,
}

/// Ledger of one employee.
#[derive(Debug, Serialize)]
pub struct LedgerResponse {
    /// Stored entries in date order.
    pub entries: Vec<LedgerEntry>,
    /// Shares granted so far.
    pub total_shares: Decimal,
    /// Dates the stored ledger lacks.
    pub missing: usize,
    /// Dates whose stored values are out of date.
    pub changed: usize,
    /// Stored dates that should no longer exist.
    pub orphaned: usize,
}

/// Outcome of a regeneration.
#[derive(Debug, Serialize)]
pub struct RegenerateResponse {
    /// Mode used.
    pub mode: RegenerateMode,
    /// Employees processed.
    pub employees: usize,
    /// Entries written.
    pub written: u64,
}

/// Chart data.
#[derive(Debug, Serialize)]
pub struct ChartResponse {
    /// Year shown.
    pub year: i32,
    /// Display currency.
    pub currency: &'static str,
    /// Twelve monthly buckets.
    pub monthly: Vec<MonthlyCost>,
    /// Current cost per department.
    pub departments: Vec<DepartmentBreakdown>,
}

// ============================================================================
// Helpers
// ============================================================================

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Builds an employee from a request, pricing the terms at `price_per_share`.
fn employee_from_request(
    id: EmployeeId,
    startup_id: StartupId,
    req: EmployeeRequest,
    price_per_share: Decimal,
) -> Employee {
    Employee {
        id,
        startup_id,
        full_name: req.full_name.trim().to_string(),
        email: blank_to_none(req.email),
        designation: blank_to_none(req.designation),
        department: blank_to_none(req.department),
        entity: blank_to_none(req.entity),
        joining_date: req.joining_date,
        salary: req.salary,
        terms: EsopTerms::new(req.esop_allocation, req.allocation_type, price_per_share),
        termination: None,
        contract_key: None,
    }
}

/// Pool metrics, optionally leaving one employee's grants out so that
/// editing that employee is checked against the rest of the pool.
async fn pool_summary(
    state: &AppState,
    startup_id: StartupId,
    excluding: Option<EmployeeId>,
) -> ApiResult<EsopSummary> {
    let cap_tables = CapTableRepository::new((*state.db).clone());
    let ledger = LedgerRepository::new((*state.db).clone());

    let (cap_table, allocated, own) = tokio::try_join!(
        cap_tables.get(startup_id),
        ledger.allocated_shares(startup_id),
        async {
            match excluding {
                Some(id) => ledger
                    .list(id)
                    .await
                    .map(|entries| LedgerGenerator::total_shares(&entries)),
                None => Ok(Decimal::ZERO),
            }
        },
    )?;

    Ok(EsopService::summarize(&cap_table, allocated - own))
}

/// Ledger `record` produces up to `today`, checked against the rest of the
/// pool.
///
/// `others` must leave this employee's stored grants out, since the
/// returned ledger replaces them.
fn guarded_ledger(
    others: &EsopSummary,
    record: &EmployeeRecord,
    proposed: Decimal,
    today: NaiveDate,
    cadence: LedgerCadence,
) -> ApiResult<Vec<LedgerEntry>> {
    let ledger = LedgerGenerator::generate(record, today, cadence)?;
    EsopService::check_replacement(others, proposed, LedgerGenerator::total_shares(&ledger))?;
    Ok(ledger)
}

/// Generates the employee's ledger up to today and writes it.
async fn sync_ledger(
    state: &AppState,
    record: &EmployeeRecord,
    mode: RegenerateMode,
) -> ApiResult<u64> {
    let generated = LedgerGenerator::generate(record, today(), state.ledger_cadence)?;
    let ledger = LedgerRepository::new((*state.db).clone());

    let written = match mode {
        RegenerateMode::FillGaps => {
            let existing = ledger.list(record.employee.id).await?;
            let diff = LedgerGenerator::reconcile(&existing, &generated);
            ledger.insert_missing(&diff.missing).await?
        }
        RegenerateMode::Rebuild => ledger.rebuild(record.employee.id, &generated).await?,
    };
    Ok(written)
}

async fn load_record(
    state: &AppState,
    startup_id: StartupId,
    employee_id: EmployeeId,
) -> ApiResult<EmployeeRecord> {
    EmployeeRepository::new((*state.db).clone())
        .find_record(startup_id, employee_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Employee"))
}

/// Joining date may not move past history already recorded.
fn check_joining_against_history(
    record: &EmployeeRecord,
    joining: NaiveDate,
) -> Result<(), EmployeeError> {
    if let Some(first) = record.increments.iter().map(|i| i.effective_date).min()
        && first < joining
    {
        return Err(EmployeeError::IncrementBeforeJoining {
            effective: first,
            joining,
        });
    }
    if let Some(terminated) = record.employee.terminated_on()
        && terminated < joining
    {
        return Err(EmployeeError::TerminationBeforeJoining {
            termination: terminated,
            joining,
        });
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /employees - Employees with current compensation and pool metrics.
async fn list_employees(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<EmployeeListResponse>> {
    let (startup_id, startup) = current_startup(&state, &auth).await?;
    let employees = EmployeeRepository::new((*state.db).clone());

    let (records, esop) = tokio::try_join!(
        async { employees.list_records(startup_id).await.map_err(ApiError::from) },
        pool_summary(&state, startup_id, None),
    )?;

    let today = today();
    Ok(Json(EmployeeListResponse {
        currency: resolve_currency(startup.currency.as_deref(), startup.country.as_deref())
            .code(),
        esop,
        employees: records
            .into_iter()
            .map(|r| EmployeeView::new(r, today))
            .collect(),
    }))
}

/// POST /employees - Hire an employee.
async fn create_employee(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<EmployeeRequest>,
) -> ApiResult<impl IntoResponse> {
    payload.validate()?;
    let (startup_id, startup) = current_startup(&state, &auth).await?;
    let summary = pool_summary(&state, startup_id, None).await?;

    let employee =
        employee_from_request(EmployeeId::new(), startup_id, payload, summary.price_per_share);
    validate_new_employee(&employee, startup.registration_date)?;
    let record = EmployeeRecord {
        employee,
        increments: Vec::new(),
    };
    let ledger = guarded_ledger(
        &summary,
        &record,
        record.employee.terms.esop_allocation,
        today(),
        state.ledger_cadence,
    )?;

    let (employee, written) = EmployeeRepository::new((*state.db).clone())
        .create(&record.employee, &ledger)
        .await?;
    let record = EmployeeRecord {
        employee,
        increments: Vec::new(),
    };

    info!(
        employee_id = %record.employee.id,
        startup_id = %startup_id,
        ledger_entries = written,
        "Employee created"
    );
    Ok((StatusCode::CREATED, Json(EmployeeView::new(record, today()))))
}

/// GET /employees/{employee_id} - One employee.
async fn get_employee(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(employee_id): Path<EmployeeId>,
) -> ApiResult<Json<EmployeeView>> {
    let (startup_id, _) = current_startup(&state, &auth).await?;
    let record = load_record(&state, startup_id, employee_id).await?;
    Ok(Json(EmployeeView::new(record, today())))
}

/// PUT /employees/{employee_id} - Edit identity and joining values.
///
/// Terms are repriced at the current share price and the ledger is rebuilt.
/// The guard counts the rebuilt ledger instead of the one it replaces.
async fn update_employee(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(employee_id): Path<EmployeeId>,
    Json(payload): Json<EmployeeRequest>,
) -> ApiResult<Json<EmployeeView>> {
    payload.validate()?;
    let (startup_id, startup) = current_startup(&state, &auth).await?;
    let existing = load_record(&state, startup_id, employee_id).await?;
    let others = pool_summary(&state, startup_id, Some(employee_id)).await?;

    let mut employee =
        employee_from_request(employee_id, startup_id, payload, others.price_per_share);
    employee.termination = existing.employee.termination.clone();
    employee.contract_key = existing.employee.contract_key.clone();
    validate_new_employee(&employee, startup.registration_date)?;
    check_joining_against_history(&existing, employee.joining_date)?;

    let record = EmployeeRecord {
        employee,
        increments: existing.increments,
    };
    let ledger = guarded_ledger(
        &others,
        &record,
        record.employee.terms.esop_allocation,
        today(),
        state.ledger_cadence,
    )?;

    let (employee, written) = EmployeeRepository::new((*state.db).clone())
        .update(&record.employee, &ledger)
        .await?;
    let record = EmployeeRecord {
        employee,
        increments: record.increments,
    };

    info!(employee_id = %employee_id, ledger_entries = written, "Employee updated");
    Ok(Json(EmployeeView::new(record, today())))
}

/// DELETE /employees/{employee_id} - Remove an employee and its history.
async fn delete_employee(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(employee_id): Path<EmployeeId>,
) -> ApiResult<StatusCode> {
    let (startup_id, _) = current_startup(&state, &auth).await?;
    let repo = EmployeeRepository::new((*state.db).clone());
    let employee = repo
        .find(startup_id, employee_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Employee"))?;

    repo.delete(startup_id, employee_id).await?;

    if let (Some(key), Some(storage)) = (employee.contract_key.as_deref(), &state.storage)
        && let Err(e) = storage.delete(startup_id, key).await
    {
        warn!(error = %e, employee_id = %employee_id, "Failed to delete contract file");
    }

    info!(employee_id = %employee_id, "Employee deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /employees/{employee_id}/increments - Record a salary/ESOP change.
///
/// Like an edit, the guard counts the rebuilt ledger instead of the one it
/// replaces, so restating unchanged terms never fails.
async fn add_increment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(employee_id): Path<EmployeeId>,
    Json(payload): Json<IncrementRequest>,
) -> ApiResult<impl IntoResponse> {
    payload.validate()?;
    let (startup_id, _) = current_startup(&state, &auth).await?;
    let mut record = load_record(&state, startup_id, employee_id).await?;
    let others = pool_summary(&state, startup_id, Some(employee_id)).await?;

    let increment = SalaryIncrement {
        id: IncrementId::new(),
        employee_id,
        effective_date: payload.effective_date,
        salary: payload.salary,
        terms: EsopTerms::new(
            payload.esop_allocation,
            payload.allocation_type,
            others.price_per_share,
        ),
    };
    validate_increment(&record.employee, &increment, today())?;

    record.increments.push(increment.clone());
    let ledger = guarded_ledger(
        &others,
        &record,
        increment.terms.esop_allocation,
        today(),
        state.ledger_cadence,
    )?;

    let (increment, written) = EmployeeRepository::new((*state.db).clone())
        .add_increment(&increment, &ledger)
        .await?;

    info!(
        employee_id = %employee_id,
        effective_date = %increment.effective_date,
        ledger_entries = written,
        "Increment recorded"
    );
    Ok((StatusCode::CREATED, Json(increment)))
}

/// DELETE /employees/{employee_id}/increments/{increment_id} - Undo an increment.
///
/// Removing an increment can restore larger earlier terms, so the rebuilt
/// ledger goes through the guard too.
async fn delete_increment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((employee_id, increment_id)): Path<(EmployeeId, IncrementId)>,
) -> ApiResult<StatusCode> {
    let (startup_id, _) = current_startup(&state, &auth).await?;
    let mut record = load_record(&state, startup_id, employee_id).await?;
    if !record.increments.iter().any(|i| i.id == increment_id) {
        return Err(ApiError::not_found("Increment"));
    }
    let others = pool_summary(&state, startup_id, Some(employee_id)).await?;

    record.increments.retain(|i| i.id != increment_id);
    let ledger = guarded_ledger(
        &others,
        &record,
        Decimal::ZERO,
        today(),
        state.ledger_cadence,
    )?;

    EmployeeRepository::new((*state.db).clone())
        .delete_increment(employee_id, increment_id, &ledger)
        .await?
        .ok_or_else(|| ApiError::not_found("Increment"))?;

    info!(employee_id = %employee_id, increment_id = %increment_id, "Increment deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /employees/{employee_id}/terminate - Close employment.
///
/// Termination only ends grants early, so it skips the allocation guard.
async fn terminate_employee(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(employee_id): Path<EmployeeId>,
    Json(payload): Json<TerminateRequest>,
) -> ApiResult<Json<EmployeeView>> {
    payload.validate()?;
    let (startup_id, _) = current_startup(&state, &auth).await?;
    let mut record = load_record(&state, startup_id, employee_id).await?;

    validate_termination(
        &record.employee,
        &record.increments,
        payload.termination_date,
    )?;

    let termination = Termination {
        date: payload.termination_date,
        reason: blank_to_none(payload.reason),
    };
    record.employee.termination = Some(termination.clone());
    let ledger = LedgerGenerator::generate(&record, today(), state.ledger_cadence)?;

    let (employee, written) = EmployeeRepository::new((*state.db).clone())
        .terminate(employee_id, &termination, &ledger)
        .await?;
    let record = EmployeeRecord {
        employee,
        increments: record.increments,
    };

    info!(
        employee_id = %employee_id,
        termination_date = %termination.date,
        ledger_entries = written,
        "Employee terminated"
    );
    Ok(Json(EmployeeView::new(record, today())))
}

/// PUT /employees/{employee_id}/contract - Link an uploaded contract.
async fn set_contract(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(employee_id): Path<EmployeeId>,
    Json(payload): Json<ContractRequest>,
) -> ApiResult<StatusCode> {
    let (startup_id, _) = current_startup(&state, &auth).await?;
    if !StorageService::key_belongs_to(&payload.key, startup_id) {
        return Err(runway_core::storage::StorageError::InvalidKey(payload.key).into());
    }
    let repo = EmployeeRepository::new((*state.db).clone());
    repo.find(startup_id, employee_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Employee"))?;

    repo.set_contract_key(employee_id, Some(payload.key)).await?;
    info!(employee_id = %employee_id, "Contract linked");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /employees/{employee_id}/contract - Unlink the contract.
async fn clear_contract(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(employee_id): Path<EmployeeId>,
) -> ApiResult<StatusCode> {
    let (startup_id, _) = current_startup(&state, &auth).await?;
    let repo = EmployeeRepository::new((*state.db).clone());
    repo.find(startup_id, employee_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Employee"))?;

    repo.set_contract_key(employee_id, None).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /employees/{employee_id}/ledger - Stored ledger and how far it lags.
async fn get_ledger(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(employee_id): Path<EmployeeId>,
) -> ApiResult<Json<LedgerResponse>> {
    let (startup_id, _) = current_startup(&state, &auth).await?;
    let record = load_record(&state, startup_id, employee_id).await?;

    let entries = LedgerRepository::new((*state.db).clone())
        .list(employee_id)
        .await?;
    let generated = LedgerGenerator::generate(&record, today(), state.ledger_cadence)?;
    let diff = LedgerGenerator::reconcile(&entries, &generated);

    Ok(Json(LedgerResponse {
        total_shares: LedgerGenerator::total_shares(&entries),
        missing: diff.missing.len(),
        changed: diff.changed.len(),
        orphaned: diff.orphaned.len(),
        entries,
    }))
}

/// POST /employees/{employee_id}/ledger/regenerate - Bring one ledger up to date.
async fn regenerate_ledger(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(employee_id): Path<EmployeeId>,
    payload: Option<Json<RegenerateRequest>>,
) -> ApiResult<Json<RegenerateResponse>> {
    let mode = payload.map(|Json(p)| p.mode).unwrap_or_default();
    let (startup_id, _) = current_startup(&state, &auth).await?;
    let record = load_record(&state, startup_id, employee_id).await?;

    let written = sync_ledger(&state, &record, mode).await?;
    info!(employee_id = %employee_id, ?mode, written, "Ledger regenerated");

    Ok(Json(RegenerateResponse {
        mode,
        employees: 1,
        written,
    }))
}

/// POST /employees/ledger/regenerate - Bring every ledger of the startup up to date.
async fn regenerate_all_ledgers(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Option<Json<RegenerateRequest>>,
) -> ApiResult<Json<RegenerateResponse>> {
    let mode = payload.map(|Json(p)| p.mode).unwrap_or_default();
    let (startup_id, _) = current_startup(&state, &auth).await?;
    let records = EmployeeRepository::new((*state.db).clone())
        .list_records(startup_id)
        .await?;

    let mut written = 0;
    for record in &records {
        written += sync_ledger(&state, record, mode).await?;
    }
    info!(startup_id = %startup_id, ?mode, employees = records.len(), written, "Ledgers regenerated");

    Ok(Json(RegenerateResponse {
        mode,
        employees: records.len(),
        written,
    }))
}

/// GET /employees/chart - Monthly payroll cost and department split.
async fn employee_chart(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ChartQuery>,
) -> ApiResult<Json<ChartResponse>> {
    let today = today();
    let year = query.year.unwrap_or_else(|| today.year());
    let (startup_id, startup) = current_startup(&state, &auth).await?;
    let records = EmployeeRepository::new((*state.db).clone())
        .list_records(startup_id)
        .await?;

    Ok(Json(ChartResponse {
        year,
        currency: resolve_currency(startup.currency.as_deref(), startup.country.as_deref())
            .code(),
        monthly: monthly_costs(&records, year),
        departments: department_breakdown(&records, today),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use rust_decimal_macros::dec;

    use crate::routes::test_support::{access_token, app, json_body, send, state};
    use runway_core::cap_table::CapTable;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn request(esop_allocation: Decimal) -> EmployeeRequest {
        EmployeeRequest {
            full_name: "  Ada Lovelace ".to_string(),
            email: Some(" ".to_string()),
            designation: Some("Engineer".to_string()),
            department: None,
            entity: None,
            joining_date: d(2024, 1, 1),
            salary: dec!(120000),
            esop_allocation,
            allocation_type: AllocationType::OneTime,
        }
    }

    #[test]
    fn test_request_is_priced_and_trimmed() {
        let employee =
            employee_from_request(EmployeeId::new(), StartupId::new(), request(dec!(6000)), dec!(10));

        assert_eq!(employee.full_name, "Ada Lovelace");
        assert_eq!(employee.email, None);
        assert_eq!(employee.terms.number_of_shares, dec!(600));
        assert_eq!(employee.terms.esop_per_allocation, dec!(6000));
    }

    fn pool(allocated_shares: Decimal) -> EsopSummary {
        // 1000 reserved shares at 10 per share.
        let cap_table = CapTable {
            total_shares: dec!(10000),
            esop_reserved_shares: dec!(1000),
            valuation: dec!(100000),
        };
        EsopService::summarize(&cap_table, allocated_shares)
    }

    fn monthly_hire(joining: NaiveDate, esop_allocation: Decimal) -> EmployeeRecord {
        let mut req = request(esop_allocation);
        req.joining_date = joining;
        req.allocation_type = AllocationType::Monthly;
        EmployeeRecord {
            employee: employee_from_request(EmployeeId::new(), StartupId::new(), req, dec!(10)),
            increments: Vec::new(),
        }
    }

    #[test]
    fn test_second_allocation_over_reserve_is_rejected() {
        let mut req = request(dec!(5000));
        req.joining_date = d(2026, 1, 1);
        let record = EmployeeRecord {
            employee: employee_from_request(EmployeeId::new(), StartupId::new(), req, dec!(10)),
            increments: Vec::new(),
        };

        // 600 shares granted at 10 = 6000 of a 10000 reserve.
        let today = d(2026, 6, 1);
        let err = guarded_ledger(&pool(dec!(600)), &record, dec!(5000), today, LedgerCadence::Monthly)
            .unwrap_err();
        assert_eq!(err.code(), "ESOP_EXCEEDS_RESERVE");

        let ok = guarded_ledger(&pool(dec!(500)), &record, dec!(5000), today, LedgerCadence::Monthly);
        assert!(ok.is_ok());
    }

    #[test]
    fn test_backdated_hire_is_charged_for_every_grant() {
        // 6000 a year fits the 10000 reserve, but joining in 2020 books
        // 82 monthly grants of 50 shares by October 2026.
        let record = monthly_hire(d(2020, 1, 1), dec!(6000));
        let today = d(2026, 10, 19);

        let err = guarded_ledger(&pool(dec!(0)), &record, dec!(6000), today, LedgerCadence::Monthly)
            .unwrap_err();
        assert_eq!(err.code(), "ESOP_EXCEEDS_RESERVE");

        let recent = monthly_hire(d(2026, 1, 1), dec!(6000));
        let ledger =
            guarded_ledger(&pool(dec!(0)), &recent, dec!(6000), today, LedgerCadence::Monthly)
                .unwrap();
        assert_eq!(LedgerGenerator::total_shares(&ledger), dec!(500));
    }

    #[test]
    fn test_restating_terms_does_not_count_own_grants_twice() {
        // The employee already holds 500 shares; the rest of the pool is empty.
        let today = d(2026, 10, 19);
        let mut record = monthly_hire(d(2026, 1, 1), dec!(6000));
        let stored = LedgerGenerator::generate(&record, today, LedgerCadence::Monthly).unwrap();
        assert_eq!(LedgerGenerator::total_shares(&stored), dec!(500));

        record.increments.push(SalaryIncrement {
            id: IncrementId::new(),
            employee_id: record.employee.id,
            effective_date: d(2026, 7, 1),
            salary: dec!(150000),
            terms: record.employee.terms,
        });
        let others = pool(dec!(500) - dec!(500));
        let ledger =
            guarded_ledger(&others, &record, dec!(6000), today, LedgerCadence::Monthly).unwrap();
        assert_eq!(LedgerGenerator::total_shares(&ledger), dec!(500));
    }

    #[test]
    fn test_joining_cannot_pass_history() {
        let employee =
            employee_from_request(EmployeeId::new(), StartupId::new(), request(dec!(0)), dec!(1));
        let record = EmployeeRecord {
            increments: vec![SalaryIncrement {
                id: IncrementId::new(),
                employee_id: employee.id,
                effective_date: d(2024, 6, 1),
                salary: dec!(130000),
                terms: EsopTerms::default(),
            }],
            employee,
        };

        assert!(check_joining_against_history(&record, d(2024, 3, 1)).is_ok());
        assert!(matches!(
            check_joining_against_history(&record, d(2024, 7, 1)),
            Err(EmployeeError::IncrementBeforeJoining { .. })
        ));
    }

    #[test]
    fn test_view_uses_latest_increment() {
        let employee =
            employee_from_request(EmployeeId::new(), StartupId::new(), request(dec!(0)), dec!(1));
        let record = EmployeeRecord {
            increments: vec![SalaryIncrement {
                id: IncrementId::new(),
                employee_id: employee.id,
                effective_date: d(2024, 6, 1),
                salary: dec!(130000),
                terms: EsopTerms::new(dec!(1200), AllocationType::Monthly, dec!(1)),
            }],
            employee,
        };

        let view = EmployeeView::new(record, d(2025, 1, 1));
        assert_eq!(view.current.salary, dec!(130000));
        assert_eq!(view.monthly_esop_expense, dec!(100));
        assert!(view.is_active);
    }

    #[test]
    fn test_regenerate_mode_defaults_to_fill_gaps() {
        let req: RegenerateRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.mode, RegenerateMode::FillGaps);
        let req: RegenerateRequest = serde_json::from_str(r#"{"mode":"rebuild"}"#).unwrap();
        assert_eq!(req.mode, RegenerateMode::Rebuild);
    }

    #[tokio::test]
    async fn test_oversized_allocation_is_rejected_before_database() {
        let state = state();
        let token = access_token(&state);
        let body = serde_json::json!({
            "full_name": "Mallory",
            "joining_date": "2024-01-01",
            "salary": "1000",
            "esop_allocation": Decimal::MAX.to_string(),
            "allocation_type": "one_time"
        });

        let response = send(
            app(&state),
            Request::builder()
                .method("POST")
                .uri("/api/v1/employees")
                .header("Authorization", format!("Bearer {token}"))
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_employees_require_auth() {
        let state = state();
        let response = send(
            app(&state),
            Request::builder()
                .uri("/api/v1/employees")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"], "MISSING_TOKEN");
    }
}
