use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use domains::{DashboardStats, Network, NewPayment, Payment, PaymentStatus, Plan, UsdAmount};
use serde::{Deserialize, Serialize};

use super::{parse_id, AppState};
use crate::error::ApiResult;
use crate::metrics::ReviewOutcome;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PlanOffer {
    plan: Plan,
    #[serde(rename = "priceUSD")]
    price_usd: UsdAmount,
    term_months: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct NetworkWallet {
    network: Network,
    chain: &'static str,
    wallet_address: String,
}

#[derive(Debug, Serialize)]
pub(super) struct PlansResponse {
    plans: Vec<PlanOffer>,
    networks: Vec<NetworkWallet>,
}

/// What the payment form needs: prices per plan and where to send funds.
pub(super) async fn plans(State(state): State<AppState>) -> Json<PlansResponse> {
    let catalog = state.services.payments.catalog();
    Json(PlansResponse {
        plans: Plan::ALL
            .into_iter()
            .map(|plan| PlanOffer {
                plan,
                price_usd: catalog.price(plan),
                term_months: plan.term_months(),
            })
            .collect(),
        networks: Network::ALL
            .into_iter()
            .map(|network| NetworkWallet {
                network,
                chain: network.chain(),
                wallet_address: catalog.wallet(network).to_string(),
            })
            .collect(),
    })
}

pub(super) async fn list_payments(State(state): State<AppState>) -> ApiResult<Json<Vec<Payment>>> {
    Ok(Json(state.services.payments.list_all().await?))
}

pub(super) async fn pending_payments(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Payment>>> {
    Ok(Json(state.services.payments.list_pending().await?))
}

pub(super) async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Payment>> {
    let id = parse_id("payment", &id)?;
    Ok(Json(state.services.payments.get(id).await?))
}

pub(super) async fn submit_payment(
    State(state): State<AppState>,
    payload: Result<Json<NewPayment>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Payment>)> {
    let Json(new) = payload?;
    let payment = state.services.payments.submit(new).await?;
    state.metrics.payment_submitted();
    Ok((StatusCode::CREATED, Json(payment)))
}

#[derive(Debug, Deserialize)]
pub(super) struct ReviewRequest {
    status: PaymentStatus,
}

pub(super) async fn review_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> ApiResult<Json<Payment>> {
    let id = parse_id("payment", &id)?;
    let Json(request) = payload?;
    let payment = state.services.payments.review(id, request.status).await?;
    let outcome = match payment.status {
        PaymentStatus::Completed => ReviewOutcome::Completed,
        _ => ReviewOutcome::Rejected,
    };
    state.metrics.payment_reviewed(outcome);
    Ok(Json(payment))
}

pub(super) async fn dashboard_stats(
    State(state): State<AppState>,
) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(state.services.stats.dashboard().await?))
}
