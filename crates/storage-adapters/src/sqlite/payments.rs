use async_trait::async_trait;
use domains::{
    DomainError, DomainResult, Payment, PaymentRepository, PaymentReview, PaymentStatus, UsdAmount,
};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{parse_column, SqliteStore};
use crate::error::{IntoDomain, StorageError};

const COLUMNS: &str = "id, user_id, plan, network, wallet_address, amount_cents, txid, \
                       status, created_at, verified_at";

fn payment_from_row(row: &SqliteRow) -> Result<Payment, StorageError> {
    Ok(Payment {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        plan: parse_column("plan", row.try_get("plan")?)?,
        network: parse_column("network", row.try_get("network")?)?,
        wallet_address: row.try_get("wallet_address")?,
        amount_usd: UsdAmount::from_cents(row.try_get("amount_cents")?),
        txid: row.try_get("txid")?,
        status: parse_column("status", row.try_get("status")?)?,
        created_at: row.try_get("created_at")?,
        verified_at: row.try_get("verified_at")?,
    })
}

fn payments_from_rows(rows: &[SqliteRow]) -> DomainResult<Vec<Payment>> {
    rows.iter().map(payment_from_row).collect::<Result<Vec<_>, _>>().domain()
}

#[async_trait]
impl PaymentRepository for SqliteStore {
    async fn insert(&self, payment: &Payment) -> DomainResult<()> {
        sqlx::query(&format!(
            "INSERT INTO payments ({COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
            .bind(payment.id)
            .bind(payment.user_id)
            .bind(payment.plan.as_str())
            .bind(payment.network.as_str())
            .bind(&payment.wallet_address)
            .bind(payment.amount_usd.cents())
            .bind(&payment.txid)
            .bind(payment.status.as_str())
            .bind(payment.created_at)
            .bind(payment.verified_at)
            .execute(&self.pool)
            .await
            .domain()?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Payment>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM payments WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .domain()?;
        row.as_ref().map(payment_from_row).transpose().domain()
    }

    async fn list_all(&self) -> DomainResult<Vec<Payment>> {
        let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM payments ORDER BY created_at DESC"))
            .fetch_all(&self.pool)
            .await
            .domain()?;
        payments_from_rows(&rows)
    }

    /// Oldest first: the review queue is worked front to back.
    async fn list_by_status(&self, status: PaymentStatus) -> DomainResult<Vec<Payment>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM payments WHERE status = ? ORDER BY created_at ASC"
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .domain()?;
        payments_from_rows(&rows)
    }

    async fn list_by_user(&self, user_id: Uuid) -> DomainResult<Vec<Payment>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM payments WHERE user_id = ? ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .domain()?;
        payments_from_rows(&rows)
    }

    async fn apply_review(&self, review: &PaymentReview) -> DomainResult<bool> {
        let mut tx = self.pool.begin().await.domain()?;

        // The status guard is what makes terminal states final.
        let moved = sqlx::query(
            "UPDATE payments SET status = ?, verified_at = ? WHERE id = ? AND status = 'pending'",
        )
        .bind(review.status.as_str())
        .bind(review.verified_at)
        .bind(review.payment_id)
        .execute(&mut *tx)
        .await
        .domain()?;
        if moved.rows_affected() == 0 {
            tx.rollback().await.domain()?;
            return Ok(false);
        }

        if let Some(grant) = &review.grant {
            let granted = sqlx::query(
                "UPDATE users SET is_premium = 1, plan = ?, premium_expiry_date = ? WHERE id = ?",
            )
            .bind(grant.plan.as_str())
            .bind(grant.expires_at)
            .bind(grant.user_id)
            .execute(&mut *tx)
            .await
            .domain()?;
            if granted.rows_affected() == 0 {
                tx.rollback().await.domain()?;
                return Err(DomainError::not_found("user", grant.user_id));
            }
        }

        tx.commit().await.domain()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::fixtures;
    use chrono::Duration;
    use domains::{Plan, PremiumGrant, UserRepository};

    async fn store_with_user() -> (SqliteStore, Uuid) {
        let store = SqliteStore::in_memory().await.unwrap();
        let user = fixtures::user("payer@example.com", "payer");
        UserRepository::insert(&store, &user).await.unwrap();
        (store, user.id)
    }

    fn approval(payment: &Payment) -> PaymentReview {
        let now = fixtures::now();
        PaymentReview {
            payment_id: payment.id,
            status: PaymentStatus::Completed,
            verified_at: Some(now),
            grant: Some(PremiumGrant {
                user_id: payment.user_id,
                plan: payment.plan,
                expires_at: now + Duration::days(365),
            }),
        }
    }

    #[tokio::test]
    async fn approval_writes_status_and_entitlement_together() {
        let (store, user_id) = store_with_user().await;
        let payment = fixtures::payment(user_id, Plan::Yearly, 0);
        PaymentRepository::insert(&store, &payment).await.unwrap();

        let review = approval(&payment);
        assert!(store.apply_review(&review).await.unwrap());

        let stored = PaymentRepository::find_by_id(&store, payment.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Completed);
        assert_eq!(stored.verified_at, review.verified_at);

        let user = UserRepository::find_by_id(&store, user_id).await.unwrap().unwrap();
        assert!(user.is_premium);
        assert_eq!(user.plan, Some(Plan::Yearly));
        assert_eq!(user.premium_expiry_date, review.grant.map(|g| g.expires_at));
    }

    #[tokio::test]
    async fn terminal_payment_is_never_rewritten() {
        let (store, user_id) = store_with_user().await;
        let payment = fixtures::payment(user_id, Plan::Monthly, 0);
        PaymentRepository::insert(&store, &payment).await.unwrap();

        let reject = PaymentReview {
            payment_id: payment.id,
            status: PaymentStatus::Rejected,
            verified_at: None,
            grant: None,
        };
        assert!(store.apply_review(&reject).await.unwrap());
        assert!(!store.apply_review(&approval(&payment)).await.unwrap());

        let stored = PaymentRepository::find_by_id(&store, payment.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Rejected);
        let user = UserRepository::find_by_id(&store, user_id).await.unwrap().unwrap();
        assert!(!user.is_premium);
    }

    #[tokio::test]
    async fn second_approval_does_not_extend_expiry() {
        let (store, user_id) = store_with_user().await;
        let payment = fixtures::payment(user_id, Plan::Monthly, 0);
        PaymentRepository::insert(&store, &payment).await.unwrap();

        let first = approval(&payment);
        assert!(store.apply_review(&first).await.unwrap());
        let mut again = approval(&payment);
        if let Some(grant) = again.grant.as_mut() {
            grant.expires_at += Duration::days(30);
        }
        assert!(!store.apply_review(&again).await.unwrap());

        let user = UserRepository::find_by_id(&store, user_id).await.unwrap().unwrap();
        assert_eq!(user.premium_expiry_date, first.grant.map(|g| g.expires_at));
    }

    #[tokio::test]
    async fn listings_filter_and_order() {
        let (store, user_id) = store_with_user().await;
        let other = fixtures::user("other@example.com", "other");
        UserRepository::insert(&store, &other).await.unwrap();

        let oldest = fixtures::payment(user_id, Plan::Monthly, 30);
        let middle = fixtures::payment(other.id, Plan::Yearly, 20);
        let newest = fixtures::payment(user_id, Plan::Lifetime, 10);
        for p in [&oldest, &middle, &newest] {
            PaymentRepository::insert(&store, p).await.unwrap();
        }
        store
            .apply_review(&PaymentReview {
                payment_id: middle.id,
                status: PaymentStatus::Rejected,
                verified_at: None,
                grant: None,
            })
            .await
            .unwrap();

        let ids = |ps: Vec<Payment>| ps.into_iter().map(|p| p.id).collect::<Vec<_>>();
        assert_eq!(ids(store.list_all().await.unwrap()), [newest.id, middle.id, oldest.id]);
        let pending = store.list_by_status(PaymentStatus::Pending).await.unwrap();
        assert_eq!(ids(pending), [oldest.id, newest.id]);
        assert_eq!(ids(store.list_by_user(user_id).await.unwrap()), [newest.id, oldest.id]);
    }

    #[tokio::test]
    async fn payment_for_unknown_user_is_rejected() {
        let store = SqliteStore::in_memory().await.unwrap();
        let orphan = fixtures::payment(Uuid::new_v4(), Plan::Monthly, 0);
        let err = PaymentRepository::insert(&store, &orphan)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
