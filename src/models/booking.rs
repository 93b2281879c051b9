//! Modelo de Booking y reglas del ciclo de vida
//!
//! Aquí viven las reglas puras del motor de reservas: solapamiento de
//! rangos semiabiertos, cálculo del importe total, la ventana de
//! cancelación de 24h y el grafo de transiciones de estado.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Estados del ciclo de vida de una reserva
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Active,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Active => "active",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "active" => Some(BookingStatus::Active),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// Estados terminales: la reserva ya no admite cambios por parte del usuario
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Grafo de transiciones legales (usado por los flujos de usuario y por
    /// el modo estricto de las transiciones de admin)
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        if *self == next {
            return true;
        }
        match self {
            BookingStatus::Pending => {
                matches!(next, BookingStatus::Confirmed | BookingStatus::Cancelled)
            }
            BookingStatus::Confirmed => {
                matches!(next, BookingStatus::Active | BookingStatus::Cancelled)
            }
            BookingStatus::Active => matches!(next, BookingStatus::Completed),
            BookingStatus::Completed | BookingStatus::Cancelled => false,
        }
    }

    /// Solo pending/confirmed se pueden cancelar por el flujo de usuario
    pub fn is_cancellable(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

/// Booking - mapea exactamente a la tabla bookings.
/// `end_date` es exclusivo: una reserva que termina el día X no bloquea
/// otra que empieza el día X.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub car_id: Uuid,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub total_amount: Decimal,
    pub status: String,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn status(&self) -> Option<BookingStatus> {
        BookingStatus::from_str(&self.status)
    }
}

/// Solapamiento de intervalos semiabiertos: `[s1,e1)` y `[s2,e2)` chocan
/// sii `s1 < e2 && s2 < e1`
pub fn ranges_overlap(s1: NaiveDate, e1: NaiveDate, s2: NaiveDate, e2: NaiveDate) -> bool {
    s1 < e2 && s2 < e1
}

/// Días de alquiler con fecha de fin exclusiva. La validación de entrada
/// exige end > start, así que siempre es >= 1.
pub fn rental_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// Importe total = días * tarifa diaria. Se calcula una sola vez al crear
/// la reserva y nunca se recalcula.
pub fn compute_total_amount(start: NaiveDate, end: NaiveDate, daily_rate: Decimal) -> Decimal {
    Decimal::from(rental_days(start, end)) * daily_rate
}

/// Ventana de cancelación: la reserva solo se puede cancelar si quedan al
/// menos 24 horas hasta la fecha de inicio (el límite exacto de 24h cuenta
/// como dentro de la ventana)
pub fn within_cancellation_window(start_date: NaiveDate, now: DateTime<Utc>) -> bool {
    let start = start_date
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or(now);
    start - now >= Duration::hours(24)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_overlap_half_open() {
        let s1 = date(2025, 3, 10);
        let e1 = date(2025, 3, 15);

        // solapamiento parcial
        assert!(ranges_overlap(s1, e1, date(2025, 3, 14), date(2025, 3, 18)));
        // contenido
        assert!(ranges_overlap(s1, e1, date(2025, 3, 11), date(2025, 3, 12)));
        // una reserva que termina el día X no choca con otra que empieza el día X
        assert!(!ranges_overlap(s1, e1, date(2025, 3, 15), date(2025, 3, 18)));
        assert!(!ranges_overlap(s1, e1, date(2025, 3, 5), date(2025, 3, 10)));
        // disjuntos
        assert!(!ranges_overlap(s1, e1, date(2025, 3, 20), date(2025, 3, 25)));
    }

    #[test]
    fn test_rental_days_exclusive_end() {
        assert_eq!(rental_days(date(2025, 3, 15), date(2025, 3, 18)), 3);
        assert_eq!(rental_days(date(2025, 3, 10), date(2025, 3, 11)), 1);
    }

    #[test]
    fn test_compute_total_amount() {
        // tarifa 50/día, 3 días -> 150
        let total = compute_total_amount(date(2025, 3, 15), date(2025, 3, 18), Decimal::from(50));
        assert_eq!(total, Decimal::from(150));
    }

    #[test]
    fn test_total_amount_is_deterministic() {
        let rate = Decimal::new(4550, 2); // 45.50
        let a = compute_total_amount(date(2025, 6, 1), date(2025, 6, 5), rate);
        let b = compute_total_amount(date(2025, 6, 1), date(2025, 6, 5), rate);
        assert_eq!(a, b);
        assert_eq!(a, Decimal::from(4) * rate);
    }

    #[test]
    fn test_cancellation_window_boundary() {
        let start = date(2025, 3, 20);
        // exactamente 24h antes de medianoche del día de inicio: dentro
        let exactly_24h = Utc.with_ymd_and_hms(2025, 3, 19, 0, 0, 0).unwrap();
        assert!(within_cancellation_window(start, exactly_24h));
        // un segundo de menos: fuera
        let just_inside = Utc.with_ymd_and_hms(2025, 3, 19, 0, 0, 1).unwrap();
        assert!(!within_cancellation_window(start, just_inside));
        // con margen de sobra: dentro
        let early = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        assert!(within_cancellation_window(start, early));
    }

    #[test]
    fn test_status_roundtrip() {
        for s in ["pending", "confirmed", "active", "completed", "cancelled"] {
            assert_eq!(BookingStatus::from_str(s).unwrap().as_str(), s);
        }
        assert!(BookingStatus::from_str("unknown").is_none());
    }

    #[test]
    fn test_transition_graph() {
        use BookingStatus::*;

        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Active));
        assert!(!Pending.can_transition_to(Completed));

        assert!(Confirmed.can_transition_to(Active));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(!Confirmed.can_transition_to(Completed));

        assert!(Active.can_transition_to(Completed));
        assert!(!Active.can_transition_to(Cancelled));

        // estados terminales
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Confirmed));

        // mismo estado siempre es válido
        assert!(Active.can_transition_to(Active));
    }

    #[test]
    fn test_cancellable_states() {
        assert!(BookingStatus::Pending.is_cancellable());
        assert!(BookingStatus::Confirmed.is_cancellable());
        assert!(!BookingStatus::Active.is_cancellable());
        assert!(!BookingStatus::Completed.is_cancellable());
        assert!(!BookingStatus::Cancelled.is_cancellable());
    }
}
