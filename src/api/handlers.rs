use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use super::error::ApiError;
use super::response::ApiResponse;
use super::routes::AppState;
use crate::domain::transaction::iso_millis;
use crate::domain::{DomainError, FixedPoint, NewAccount, TransactionKind, format_inr};
use crate::engine::{EngineError, HistoryOrder};
use crate::io::{RawTransactionRequest, export_file_name, write_transactions_csv};

type JsonBody<T> = Result<Json<T>, JsonRejection>;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRequest {
    #[serde(default)]
    pub card_number: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiometricRequest {
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub biometric_code: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinRequest {
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub pin: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub card_number: Option<String>,
    /// `newest` for timestamp-descending order
    pub order: Option<String>,
}

impl HistoryQuery {
    fn card_filter(&self) -> Option<&str> {
        self.card_number.as_deref().filter(|c| !c.is_empty())
    }

    fn history_order(&self) -> HistoryOrder {
        match self.order.as_deref() {
            Some(order) if order.eq_ignore_ascii_case("newest") => HistoryOrder::NewestFirst,
            _ => HistoryOrder::Inserted,
        }
    }
}

pub async fn insert_card(
    State(state): State<AppState>,
    body: JsonBody<CardRequest>,
) -> Result<ApiResponse, ApiError> {
    let Json(request) = body?;
    let account = state.atm.find_by_card(&request.card_number)?;

    info!(card_number = account.card_number(), "Card inserted");
    Ok(ApiResponse::ok("Card inserted successfully.")
        .with_data(json!({ "cardNumber": account.card_number() })))
}

pub async fn verify_biometric(
    State(state): State<AppState>,
    body: JsonBody<BiometricRequest>,
) -> Result<ApiResponse, ApiError> {
    let Json(request) = body?;
    state
        .atm
        .verify_biometric(&request.card_number, &request.biometric_code)?;

    Ok(ApiResponse::ok("Biometric verified."))
}

pub async fn verify_pin(
    State(state): State<AppState>,
    body: JsonBody<PinRequest>,
) -> Result<ApiResponse, ApiError> {
    let Json(request) = body?;
    let account = state.atm.verify_pin(&request.card_number, &request.pin)?;

    Ok(ApiResponse::ok("PIN verified.").with_data(json!({
        "holderName": account.holder_name(),
        "balance": account.balance(),
    })))
}

pub async fn transaction(
    State(state): State<AppState>,
    body: JsonBody<RawTransactionRequest>,
) -> Result<ApiResponse, ApiError> {
    let Json(raw) = body?;
    // Unknown cards are reported before a bad type or amount
    state.atm.find_by_card(&raw.card_number)?;

    let request = raw.parse::<FixedPoint>()?;
    let outcome = state.atm.apply_transaction(request).await?;

    let response = match outcome.kind {
        TransactionKind::Balance => {
            ApiResponse::ok(format!("Balance: {}", format_inr(outcome.balance)))
                .with_data(json!({ "balance": outcome.balance }))
        }
        kind => {
            let amount = outcome.record.map(|r| r.amount).unwrap_or_default();
            let verb = match kind {
                TransactionKind::Withdraw => "Withdrawn",
                _ => "Deposited",
            };
            ApiResponse::ok(format!("{verb}: {}", format_inr(amount)))
                .with_data(json!({ "newBalance": outcome.balance }))
        }
    };
    Ok(response)
}

pub async fn balance(
    State(state): State<AppState>,
    Path(card_number): Path<String>,
) -> Result<ApiResponse, ApiError> {
    let account = state.atm.find_by_card(&card_number)?;

    Ok(ApiResponse::data(json!({
        "balance": account.balance(),
        "holderName": account.holder_name(),
    })))
}

pub async fn transactions(
    State(state): State<AppState>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<ApiResponse, ApiError> {
    let Query(query) = query?;
    let records = state
        .atm
        .list_transactions(query.card_filter(), query.history_order());

    Ok(ApiResponse::data(to_value(&records)?))
}

/// Transaction history as a CSV download, newest first
pub async fn export_transactions(
    State(state): State<AppState>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let records = state
        .atm
        .list_transactions(query.card_filter(), HistoryOrder::NewestFirst);

    let mut csv = Vec::new();
    write_transactions_csv(&records, &mut csv)?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_file_name(Utc::now().date_naive())
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

/// Always acknowledges; the session itself lives on the client
pub async fn eject_card(body: Bytes) -> ApiResponse {
    if let Ok(request) = serde_json::from_slice::<CardRequest>(&body) {
        info!(card_number = %request.card_number, "Card ejected");
    }

    ApiResponse::ok("Card ejected successfully.")
}

pub async fn status() -> Json<Value> {
    Json(json!({
        "database": "connected",
        "server": "running",
        "timestamp": iso_millis::format(&Utc::now()),
    }))
}

/// Admin listing, secrets included
pub async fn accounts(State(state): State<AppState>) -> Result<ApiResponse, ApiError> {
    let accounts = state.atm.list_accounts();
    Ok(ApiResponse::data(to_value(&accounts)?))
}

pub async fn add_account(
    State(state): State<AppState>,
    body: JsonBody<NewAccount<FixedPoint>>,
) -> Result<ApiResponse, ApiError> {
    let Json(new_account) = body?;
    let account = state.atm.add_account(new_account).await?;

    Ok(ApiResponse::ok("Account added successfully.").with_data(json!({
        "cardNumber": account.card_number(),
        "holderName": account.holder_name(),
        "balance": account.balance(),
    })))
}

pub async fn delete_account(
    State(state): State<AppState>,
    Path(card_number): Path<String>,
) -> Result<ApiResponse, ApiError> {
    let (account, removed) = match state.atm.delete_account(&card_number).await {
        Ok(deleted) => deleted,
        Err(EngineError::Domain(DomainError::AccountNotFound)) => {
            return Ok(ApiResponse::failure("Account not found."));
        }
        Err(e) => return Err(e.into()),
    };

    Ok(ApiResponse::ok(format!(
        "Account deleted successfully. {removed} related transactions removed."
    ))
    .with_data(json!({
        "cardNumber": account.card_number(),
        "holderName": account.holder_name(),
    })))
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::Engine(EngineError::Storage(e.into())))
}
