use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::core::{
    ChartSeries, CoastForm, CoastInputs, CoastSummary, EngineError, Granularity, MortgageForm,
    PayoffComparison, ReadinessAge, StrategyComparison, TargetLinkage, TargetSource,
    ValidationResult, balance_series, coast_summary, compare_payoff, compare_strategies,
    investment_vs_payoff, monthly_rate, required_payment, required_savings_by_age, resolve_target,
    savings_projection, validate_coast_form, validate_mortgage_form,
};

#[derive(Parser, Debug)]
#[command(
    name = "fire-calc",
    about = "Coast FIRE readiness and mortgage payoff vs invest calculator"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Evaluate Coast FIRE readiness and print the result as JSON
    Coast(CoastCli),
    /// Compare standard and accelerated mortgage payoff and print the result as JSON
    Mortgage(MortgageCli),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliTargetSource {
    Target,
    MonthlyExpenses,
    YearlyExpenses,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliGranularity {
    Monthly,
    Yearly,
}

impl From<CliGranularity> for Granularity {
    fn from(value: CliGranularity) -> Self {
        match value {
            CliGranularity::Monthly => Granularity::Monthly,
            CliGranularity::Yearly => Granularity::Yearly,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiTargetSource {
    #[serde(alias = "direct")]
    Target,
    #[serde(alias = "monthlyExpenses", alias = "monthly_expenses", alias = "monthly")]
    MonthlyExpenses,
    #[serde(alias = "yearlyExpenses", alias = "yearly_expenses", alias = "yearly")]
    YearlyExpenses,
}

impl From<ApiTargetSource> for CliTargetSource {
    fn from(value: ApiTargetSource) -> Self {
        match value {
            ApiTargetSource::Target => CliTargetSource::Target,
            ApiTargetSource::MonthlyExpenses => CliTargetSource::MonthlyExpenses,
            ApiTargetSource::YearlyExpenses => CliTargetSource::YearlyExpenses,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiGranularity {
    Monthly,
    Yearly,
}

impl From<ApiGranularity> for CliGranularity {
    fn from(value: ApiGranularity) -> Self {
        match value {
            ApiGranularity::Monthly => CliGranularity::Monthly,
            ApiGranularity::Yearly => CliGranularity::Yearly,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct CoastCli {
    #[arg(long, default_value_t = 30)]
    current_age: u32,
    #[arg(long, default_value_t = 65)]
    retirement_age: u32,
    #[arg(long, default_value_t = 50_000.0)]
    current_savings: f64,
    #[arg(long, default_value_t = 1_000_000.0, help = "Retirement target in today's money")]
    target: f64,
    #[arg(long, default_value_t = 40_000.0 / 12.0)]
    monthly_expenses: f64,
    #[arg(long, default_value_t = 40_000.0)]
    yearly_expenses: f64,
    #[arg(
        long,
        value_enum,
        default_value_t = CliTargetSource::Target,
        help = "Which of target / monthly / yearly expenses drives the other two"
    )]
    target_source: CliTargetSource,
    #[arg(long, default_value_t = 7.0, help = "Expected annual return in percent")]
    annual_return: f64,
    #[arg(long, default_value_t = 3.0, help = "Expected annual inflation in percent")]
    inflation_rate: f64,
    #[arg(long, default_value_t = 4.0, help = "Safe withdrawal rate in percent")]
    withdrawal_rate: f64,
}

#[derive(Args, Debug, Clone)]
pub struct MortgageCli {
    #[arg(long, default_value_t = 300_000.0, help = "Outstanding loan balance")]
    principal: f64,
    #[arg(long, default_value_t = 6.5, help = "Annual interest rate in percent")]
    interest_rate: f64,
    #[arg(long, default_value_t = 1_896.20)]
    monthly_payment: f64,
    #[arg(
        long,
        default_value_t = 30,
        help = "Loan term used to report the level payment for comparison"
    )]
    term_years: u32,
    #[arg(long, default_value_t = 0.0)]
    extra_payment: f64,
    #[arg(long, default_value_t = 0.0, help = "One-off prepayment applied today")]
    lump_sum: f64,
    #[arg(
        long,
        default_value_t = 7.0,
        help = "Expected annual return on invested money in percent"
    )]
    investment_return: f64,
    #[arg(long, default_value_t = 15.0, help = "Capital gains tax rate in percent")]
    tax_rate: f64,
    #[arg(long, value_enum, default_value_t = CliGranularity::Yearly)]
    granularity: CliGranularity,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CoastPayload {
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    current_savings: Option<f64>,
    target: Option<f64>,
    monthly_expenses: Option<f64>,
    yearly_expenses: Option<f64>,
    target_source: Option<ApiTargetSource>,
    annual_return: Option<f64>,
    inflation_rate: Option<f64>,
    withdrawal_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct MortgagePayload {
    principal: Option<f64>,
    interest_rate: Option<f64>,
    monthly_payment: Option<f64>,
    term_years: Option<u32>,
    extra_payment: Option<f64>,
    lump_sum: Option<f64>,
    investment_return: Option<f64>,
    tax_rate: Option<f64>,
    granularity: Option<ApiGranularity>,
}

#[derive(Debug)]
pub enum ApiError {
    Invalid(ValidationResult),
    Engine(EngineError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Invalid(_) => StatusCode::BAD_REQUEST,
            ApiError::Engine(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::Invalid(validation) => validation
                .errors
                .iter()
                .map(|(field, msg)| format!("{field}: {msg}"))
                .collect::<Vec<_>>()
                .join("; "),
            ApiError::Engine(e) => e.to_string(),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(value: EngineError) -> Self {
        ApiError::Engine(value)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<BTreeMap<&'static str, String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoastResponse {
    linkage: TargetLinkage,
    summary: CoastSummary,
    age_at_readiness_message: Option<String>,
    projection: ChartSeries,
    required_by_age: ChartSeries,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
enum PayoffOutcome {
    PaidOff,
    NeverPaysOff,
    IterationLimitExceeded,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageResponse {
    outcome: PayoffOutcome,
    message: Option<String>,
    level_payment_for_term: f64,
    comparison: Option<PayoffComparison>,
    strategy: Option<StrategyComparison>,
    balance_chart: Option<ChartSeries>,
    investment_chart: Option<ChartSeries>,
}

fn target_source(cli: &CoastCli) -> TargetSource {
    match cli.target_source {
        CliTargetSource::Target => TargetSource::Direct(cli.target),
        CliTargetSource::MonthlyExpenses => TargetSource::MonthlyExpenses(cli.monthly_expenses),
        CliTargetSource::YearlyExpenses => TargetSource::YearlyExpenses(cli.yearly_expenses),
    }
}

fn readiness_message(age: ReadinessAge) -> Option<String> {
    match age {
        ReadinessAge::At(_) => None,
        ReadinessAge::Unreachable => Some(
            "Target is not reachable by growth alone at this real return rate.".to_string(),
        ),
        ReadinessAge::Undefined => Some(
            "Add current savings to estimate the age at which you can coast.".to_string(),
        ),
    }
}

pub fn run_coast(cli: &CoastCli) -> Result<CoastResponse, ApiError> {
    let source = target_source(cli);
    let linkage = resolve_target(source, cli.withdrawal_rate / 100.0);
    let raw_target = match source {
        TargetSource::Direct(v)
        | TargetSource::MonthlyExpenses(v)
        | TargetSource::YearlyExpenses(v) => v,
    };

    let form = CoastForm {
        current_age: cli.current_age,
        retirement_age: cli.retirement_age,
        current_savings: cli.current_savings,
        target: linkage.as_ref().map_or(raw_target, |l| l.target),
        annual_return_percent: cli.annual_return,
        inflation_percent: cli.inflation_rate,
        withdrawal_rate_percent: cli.withdrawal_rate,
    };
    let validation = validate_coast_form(&form);
    if !validation.is_valid {
        return Err(ApiError::Invalid(validation));
    }
    let linkage = linkage?;

    let summary = coast_summary(&CoastInputs {
        current_age: cli.current_age,
        retirement_age: cli.retirement_age,
        current_savings: cli.current_savings,
        target: linkage.target,
        annual_return: cli.annual_return / 100.0,
        inflation_rate: cli.inflation_rate / 100.0,
    })?;

    let projection = savings_projection(
        cli.current_savings,
        summary.real_return,
        cli.current_age,
        cli.retirement_age,
        linkage.target,
    )?;
    let required_by_age =
        required_savings_by_age(linkage.target, summary.real_return, cli.retirement_age)?;

    Ok(CoastResponse {
        linkage,
        age_at_readiness_message: readiness_message(summary.age_at_readiness),
        summary,
        projection,
        required_by_age,
    })
}

/// Maps a failed payoff run to its outcome and message.
///
/// Validation already rejects a payment at or below the first month's interest,
/// so through `run_mortgage` only slow loans reach this; never-pays-off comes from
/// direct engine use.
fn payoff_failure(err: EngineError) -> Result<(PayoffOutcome, String), ApiError> {
    match err {
        EngineError::NeverPaysOff { interest, .. } => Ok((
            PayoffOutcome::NeverPaysOff,
            format!(
                "Payment too low: it does not cover the {interest:.2} of monthly interest, so the loan never pays off."
            ),
        )),
        EngineError::IterationLimitExceeded { limit, .. } => Ok((
            PayoffOutcome::IterationLimitExceeded,
            format!(
                "The loan would take longer than {} years to pay off at this payment.",
                limit / 12
            ),
        )),
        other => Err(ApiError::Engine(other)),
    }
}

pub fn run_mortgage(cli: &MortgageCli) -> Result<MortgageResponse, ApiError> {
    let form = MortgageForm {
        principal: cli.principal,
        annual_rate_percent: cli.interest_rate,
        monthly_payment: cli.monthly_payment,
        term_years: cli.term_years,
        extra_monthly_payment: cli.extra_payment,
        lump_sum: cli.lump_sum,
        investment_return_percent: cli.investment_return,
        tax_rate_percent: cli.tax_rate,
    };
    let validation = validate_mortgage_form(&form);
    if !validation.is_valid {
        return Err(ApiError::Invalid(validation));
    }

    let rate = monthly_rate(cli.interest_rate)?;
    let investment_rate = monthly_rate(cli.investment_return)?;
    let level_payment_for_term = required_payment(cli.principal, rate, cli.term_years * 12)?;

    let comparison = match compare_payoff(
        cli.principal,
        cli.monthly_payment,
        cli.extra_payment,
        cli.lump_sum,
        rate,
    ) {
        Ok(comparison) => comparison,
        Err(err) => {
            let (outcome, message) = payoff_failure(err)?;
            return Ok(MortgageResponse {
                outcome,
                message: Some(message),
                level_payment_for_term,
                comparison: None,
                strategy: None,
                balance_chart: None,
                investment_chart: None,
            });
        }
    };

    let strategy = compare_strategies(
        &comparison,
        cli.extra_payment,
        cli.lump_sum,
        investment_rate,
        cli.tax_rate / 100.0,
    )?;
    let balance_chart = balance_series(
        cli.principal,
        cli.monthly_payment,
        cli.extra_payment,
        cli.lump_sum,
        rate,
        cli.granularity.into(),
    )?;
    let investment_chart = investment_vs_payoff(
        cli.principal,
        cli.monthly_payment,
        cli.extra_payment,
        cli.lump_sum,
        rate,
        investment_rate,
        cli.tax_rate / 100.0,
    )?;

    Ok(MortgageResponse {
        outcome: PayoffOutcome::PaidOff,
        message: None,
        level_payment_for_term,
        comparison: Some(comparison),
        strategy: Some(strategy),
        balance_chart: Some(balance_chart),
        investment_chart: Some(investment_chart),
    })
}

pub fn render_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("Failed to serialize response: {e}"))
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/api/coast", get(coast_get_handler).post(coast_post_handler))
        .route(
            "/api/mortgage",
            get(mortgage_get_handler).post(mortgage_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "fire-calc HTTP API listening");
    tracing::info!("Local access: http://127.0.0.1:{port}/api/coast");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found", None, None)
}

async fn coast_get_handler(Query(payload): Query<CoastPayload>) -> Response {
    coast_handler_impl(payload)
}

async fn coast_post_handler(Json(payload): Json<CoastPayload>) -> Response {
    coast_handler_impl(payload)
}

async fn mortgage_get_handler(Query(payload): Query<MortgagePayload>) -> Response {
    mortgage_handler_impl(payload)
}

async fn mortgage_post_handler(Json(payload): Json<MortgagePayload>) -> Response {
    mortgage_handler_impl(payload)
}

fn coast_handler_impl(payload: CoastPayload) -> Response {
    let cli = coast_cli_from_payload(payload);
    match run_coast(&cli) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => api_error_response(err),
    }
}

fn mortgage_handler_impl(payload: MortgagePayload) -> Response {
    let cli = mortgage_cli_from_payload(payload);
    match run_mortgage(&cli) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => api_error_response(err),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(
    status: StatusCode,
    msg: &str,
    kind: Option<&'static str>,
    fields: Option<BTreeMap<&'static str, String>>,
) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
            kind,
            fields,
        },
    )
}

fn api_error_response(err: ApiError) -> Response {
    tracing::warn!(error = %err.message(), "rejected request");
    let status = err.status();
    match err {
        ApiError::Invalid(validation) => error_response(
            status,
            "Invalid input",
            None,
            Some(validation.errors),
        ),
        ApiError::Engine(e) => error_response(status, &e.to_string(), Some(e.kind()), None),
    }
}

#[cfg(test)]
fn coast_cli_from_json(json: &str) -> Result<CoastCli, String> {
    let payload = serde_json::from_str::<CoastPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    Ok(coast_cli_from_payload(payload))
}

#[cfg(test)]
fn mortgage_cli_from_json(json: &str) -> Result<MortgageCli, String> {
    let payload = serde_json::from_str::<MortgagePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    Ok(mortgage_cli_from_payload(payload))
}

fn coast_cli_from_payload(payload: CoastPayload) -> CoastCli {
    let mut cli = default_coast_cli();

    if let Some(v) = payload.current_age {
        cli.current_age = v;
    }
    if let Some(v) = payload.retirement_age {
        cli.retirement_age = v;
    }
    if let Some(v) = payload.current_savings {
        cli.current_savings = v;
    }
    if let Some(v) = payload.target {
        cli.target = v;
    }
    if let Some(v) = payload.monthly_expenses {
        cli.monthly_expenses = v;
    }
    if let Some(v) = payload.yearly_expenses {
        cli.yearly_expenses = v;
    }
    if let Some(v) = payload.target_source {
        cli.target_source = v.into();
    }
    if let Some(v) = payload.annual_return {
        cli.annual_return = v;
    }
    if let Some(v) = payload.inflation_rate {
        cli.inflation_rate = v;
    }
    if let Some(v) = payload.withdrawal_rate {
        cli.withdrawal_rate = v;
    }

    cli
}

fn mortgage_cli_from_payload(payload: MortgagePayload) -> MortgageCli {
    let mut cli = default_mortgage_cli();

    if let Some(v) = payload.principal {
        cli.principal = v;
    }
    if let Some(v) = payload.interest_rate {
        cli.interest_rate = v;
    }
    if let Some(v) = payload.monthly_payment {
        cli.monthly_payment = v;
    }
    if let Some(v) = payload.term_years {
        cli.term_years = v;
    }
    if let Some(v) = payload.extra_payment {
        cli.extra_payment = v;
    }
    if let Some(v) = payload.lump_sum {
        cli.lump_sum = v;
    }
    if let Some(v) = payload.investment_return {
        cli.investment_return = v;
    }
    if let Some(v) = payload.tax_rate {
        cli.tax_rate = v;
    }
    if let Some(v) = payload.granularity {
        cli.granularity = v.into();
    }

    cli
}

fn default_coast_cli() -> CoastCli {
    CoastCli {
        current_age: 30,
        retirement_age: 65,
        current_savings: 50_000.0,
        target: 1_000_000.0,
        monthly_expenses: 40_000.0 / 12.0,
        yearly_expenses: 40_000.0,
        target_source: CliTargetSource::Target,
        annual_return: 7.0,
        inflation_rate: 3.0,
        withdrawal_rate: 4.0,
    }
}

fn default_mortgage_cli() -> MortgageCli {
    MortgageCli {
        principal: 300_000.0,
        interest_rate: 6.5,
        monthly_payment: 1_896.20,
        term_years: 30,
        extra_payment: 0.0,
        lump_sum: 0.0,
        investment_return: 7.0,
        tax_rate: 15.0,
        granularity: CliGranularity::Yearly,
    }
}
