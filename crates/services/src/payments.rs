//! # Payments & entitlement
//!
//! Users pay for a plan off-platform and submit the transaction id; an
//! administrator checks it by hand and approves or rejects the payment.
//!
//! ```text
//!            approve            ┌───────────┐
//!         ┌────────────────────▶│ completed │──▶ user.is_premium = true,
//! ┌───────┴─┐                   └───────────┘    expiry = now + plan term
//! │ pending │
//! └───────┬─┘   reject          ┌──────────┐
//!         └────────────────────▶│ rejected │
//!                               └──────────┘
//! ```
//!
//! Terminal states are final. The store applies the transition with a
//! `status = 'pending'` guard, so approving twice can never extend or
//! re-grant premium.

use std::sync::Arc;

use domains::{
    premium_expiry, Clock, DomainError, DomainResult, NewPayment, Payment, PaymentRepository,
    PaymentReview, PaymentStatus, PlanCatalog, PremiumGrant, UserRepository,
};
use uuid::Uuid;

pub struct PaymentService {
    payments: Arc<dyn PaymentRepository>,
    users: Arc<dyn UserRepository>,
    catalog: PlanCatalog,
    clock: Arc<dyn Clock>,
}

impl PaymentService {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        users: Arc<dyn UserRepository>,
        catalog: PlanCatalog,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { payments, users, catalog, clock }
    }

    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    /// Records a pending payment. Wallet and amount come from the catalog;
    /// client-supplied values must match it.
    #[tracing::instrument(
        skip(self, new),
        fields(user_id = %new.user_id, plan = %new.plan, network = %new.network)
    )]
    pub async fn submit(&self, new: NewPayment) -> DomainResult<Payment> {
        let txid = new.txid.trim();
        if txid.is_empty() {
            return Err(DomainError::validation("transaction id is required"));
        }

        let wallet = self.catalog.wallet(new.network);
        if let Some(claimed) = new.wallet_address.as_deref() {
            if claimed.trim() != wallet {
                return Err(DomainError::validation(format!(
                    "wallet address does not match the {} receiving address",
                    new.network
                )));
            }
        }
        let price = self.catalog.price(new.plan);
        if let Some(claimed) = new.amount_usd {
            if claimed != price {
                return Err(DomainError::validation(format!(
                    "amount {claimed} does not match the {} plan price {price}",
                    new.plan
                )));
            }
        }

        if self.users.find_by_id(new.user_id).await?.is_none() {
            return Err(DomainError::not_found("user", new.user_id));
        }

        let payment = Payment {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            plan: new.plan,
            network: new.network,
            wallet_address: wallet.to_string(),
            amount_usd: price,
            txid: txid.to_string(),
            status: PaymentStatus::Pending,
            created_at: self.clock.now(),
            verified_at: None,
        };
        self.payments.insert(&payment).await?;
        tracing::info!(
            payment_id = %payment.id,
            amount = %payment.amount_usd,
            "payment submitted for review"
        );
        Ok(payment)
    }

    pub async fn list_all(&self) -> DomainResult<Vec<Payment>> {
        self.payments.list_all().await
    }

    pub async fn list_pending(&self) -> DomainResult<Vec<Payment>> {
        self.payments.list_by_status(PaymentStatus::Pending).await
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> DomainResult<Vec<Payment>> {
        self.payments.list_by_user(user_id).await
    }

    pub async fn get(&self, id: Uuid) -> DomainResult<Payment> {
        self.payments
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("payment", id))
    }

    /// Moves a pending payment to `completed` or `rejected`.
    ///
    /// Approval stamps `verified_at` and grants premium to the payer with an
    /// expiry of now plus the plan term, in one store transaction. A later
    /// approval replaces the payer's current grant (plan and expiry) rather
    /// than extending it, even when the current one runs longer.
    #[tracing::instrument(skip(self))]
    pub async fn review(&self, id: Uuid, target: PaymentStatus) -> DomainResult<Payment> {
        if !target.is_terminal() {
            return Err(DomainError::validation("status must be completed or rejected"));
        }

        let mut payment = self.get(id).await?;
        if payment.status.is_terminal() {
            return Err(DomainError::conflict(format!(
                "payment {id} is already {}",
                payment.status
            )));
        }

        let now = self.clock.now();
        let review = match target {
            PaymentStatus::Completed => PaymentReview {
                payment_id: id,
                status: target,
                verified_at: Some(now),
                grant: Some(PremiumGrant {
                    user_id: payment.user_id,
                    plan: payment.plan,
                    expires_at: premium_expiry(payment.plan, now)?,
                }),
            },
            _ => PaymentReview { payment_id: id, status: target, verified_at: None, grant: None },
        };

        // Another reviewer may have won the race since the read above.
        if !self.payments.apply_review(&review).await? {
            tracing::warn!(payment_id = %id, "payment was reviewed concurrently");
            return Err(DomainError::conflict(format!("payment {id} is no longer pending")));
        }

        payment.status = review.status;
        payment.verified_at = review.verified_at;
        match &review.grant {
            Some(grant) => tracing::info!(
                payment_id = %id,
                user_id = %grant.user_id,
                plan = %grant.plan,
                expires_at = %grant.expires_at,
                "payment approved, premium granted"
            ),
            None => tracing::info!(payment_id = %id, "payment rejected"),
        }
        Ok(payment)
    }
}
