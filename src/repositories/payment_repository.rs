//! Repositorio de pagos
//!
//! Las dos mutaciones multi-fila (pago-confirma-reserva y
//! refund-cancela-reserva) corren cada una en su propia transacción para
//! que un fallo a mitad no deje estado parcial.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::payment::Payment;
use crate::services::payment_gateway::GatewayOutcome;
use crate::utils::errors::AppError;

pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id_scoped(
        &self,
        id: Uuid,
        owner: Option<Uuid>,
    ) -> Result<Option<Payment>, AppError> {
        let payment = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE id = $1 AND ($2::uuid IS NULL OR user_id = $2)",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    pub async fn find_by_booking_scoped(
        &self,
        booking_id: Uuid,
        owner: Option<Uuid>,
    ) -> Result<Option<Payment>, AppError> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            SELECT * FROM payments
            WHERE booking_id = $1 AND ($2::uuid IS NULL OR user_id = $2)
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(booking_id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    /// ¿Existe ya un pago completado para esta reserva? (exactly-once)
    pub async fn completed_exists_for_booking(&self, booking_id: Uuid) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM payments WHERE booking_id = $1 AND status = 'completed')",
        )
        .bind(booking_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    /// Persistir el resultado del gateway. Si el cobro fue bien la reserva
    /// pasa a confirmed en la misma transacción; si no, la reserva sigue
    /// en pending y el pago queda registrado como failed.
    pub async fn record_outcome(
        &self,
        booking_id: Uuid,
        user_id: Uuid,
        amount: Decimal,
        payment_method: String,
        outcome: &GatewayOutcome,
    ) -> Result<Payment, AppError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let status = if outcome.success { "completed" } else { "failed" };
        let failure_reason = if outcome.success {
            None
        } else {
            Some(outcome.message.clone())
        };

        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (id, booking_id, user_id, amount, payment_method, status, transaction_id, gateway_response, failure_reason, processed_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(booking_id)
        .bind(user_id)
        .bind(amount)
        .bind(payment_method)
        .bind(status)
        .bind(outcome.transaction_id.clone())
        .bind(outcome.gateway_response.clone())
        .bind(failure_reason)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        if outcome.success {
            sqlx::query("UPDATE bookings SET status = 'confirmed', updated_at = $2 WHERE id = $1")
                .bind(booking_id)
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(payment)
    }

    /// Marcar el pago como refunded y cancelar la reserva asociada,
    /// atómicamente
    pub async fn mark_refunded(
        &self,
        payment_id: Uuid,
        booking_id: Uuid,
        reason: String,
        refund_transaction_id: String,
    ) -> Result<Payment, AppError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let payment = sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET status = 'refunded', refunded_at = $2, refund_reason = $3, refund_transaction_id = $4, updated_at = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(payment_id)
        .bind(now)
        .bind(reason)
        .bind(refund_transaction_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE bookings SET status = 'cancelled', cancelled_at = $2, updated_at = $2 WHERE id = $1",
        )
        .bind(booking_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(payment)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn list_all(
        &self,
        status: Option<&str>,
        user_id: Option<Uuid>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Payment>, i64), AppError> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT * FROM payments
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
              AND ($3::date IS NULL OR processed_at >= $3::date)
              AND ($4::date IS NULL OR processed_at < $4::date + 1)
            ORDER BY processed_at DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(status)
        .bind(user_id)
        .bind(start_date)
        .bind(end_date)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM payments
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
              AND ($3::date IS NULL OR processed_at >= $3::date)
              AND ($4::date IS NULL OR processed_at < $4::date + 1)
            "#,
        )
        .bind(status)
        .bind(user_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&self.pool)
        .await?;

        Ok((payments, total.0))
    }
}
