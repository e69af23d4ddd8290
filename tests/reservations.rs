//! Integration tests for the reservation engine. These run against a real
//! Postgres (sqlx provisions a scratch database per test), so they are
//! ignored by default; run with `cargo test -- --ignored` and a
//! DATABASE_URL pointing at a local server.

use chrono::{Duration, Utc};
use sqlx::PgPool;

use cinema_booking::error::AppError;
use cinema_booking::services::shows::NewShow;
use cinema_booking::services::{ReservationService, SeatService, ShowService};

async fn seed_show(pool: &PgPool, total_seats: i32) -> (i64, Vec<i64>) {
    let shows = ShowService::new(pool.clone());
    let show = shows
        .create_show(NewShow {
            movie_id: 1,
            theater_id: 1,
            show_time: Utc::now() + Duration::days(1),
            total_seats,
        })
        .await
        .expect("show creation failed");

    let seat_ids: Vec<i64> =
        sqlx::query_scalar("SELECT id FROM seats WHERE show_id = $1 ORDER BY id")
            .bind(show.id)
            .fetch_all(pool)
            .await
            .unwrap();
    (show.id, seat_ids)
}

async fn booked_seat_ids(pool: &PgPool, show_id: i64) -> Vec<i64> {
    sqlx::query_scalar("SELECT id FROM seats WHERE show_id = $1 AND is_booked ORDER BY id")
        .bind(show_id)
        .fetch_all(pool)
        .await
        .unwrap()
}

/* ---------- show provisioning ---------- */

#[sqlx::test(migrations = "src/migrations")]
#[ignore = "needs a running Postgres (DATABASE_URL)"]
async fn create_show_provisions_sequentially_labeled_seats(pool: PgPool) {
    let (show_id, seat_ids) = seed_show(&pool, 50).await;
    assert_eq!(seat_ids.len(), 50);

    let labels: Vec<String> =
        sqlx::query_scalar("SELECT seat_number FROM seats WHERE show_id = $1 ORDER BY id")
            .bind(show_id)
            .fetch_all(&pool)
            .await
            .unwrap();
    let expected: Vec<String> = (1..=50).map(|n| format!("Seat_{n}")).collect();
    assert_eq!(labels, expected);
}

#[sqlx::test(migrations = "src/migrations")]
#[ignore = "needs a running Postgres (DATABASE_URL)"]
async fn create_show_rejects_past_show_time(pool: PgPool) {
    let shows = ShowService::new(pool.clone());
    let err = shows
        .create_show(NewShow {
            movie_id: 1,
            theater_id: 1,
            show_time: Utc::now() - Duration::hours(1),
            total_seats: 10,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let show_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shows")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(show_count, 0);
}

#[sqlx::test(migrations = "src/migrations")]
#[ignore = "needs a running Postgres (DATABASE_URL)"]
async fn create_show_rejects_non_positive_seat_count(pool: PgPool) {
    let shows = ShowService::new(pool.clone());
    for bad in [0, -5] {
        let err = shows
            .create_show(NewShow {
                movie_id: 1,
                theater_id: 1,
                show_time: Utc::now() + Duration::days(1),
                total_seats: bad,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}

/* ---------- booking ---------- */

#[sqlx::test(migrations = "src/migrations")]
#[ignore = "needs a running Postgres (DATABASE_URL)"]
async fn booking_claims_exactly_the_requested_seats(pool: PgPool) {
    let (show_id, seat_ids) = seed_show(&pool, 10).await;
    let engine = ReservationService::new(pool.clone());
    let inventory = SeatService::new(pool.clone());

    let wanted = vec![seat_ids[2], seat_ids[3]];
    let booking = engine
        .book_tickets(show_id, &wanted, 7, "alice")
        .await
        .unwrap();

    assert_eq!(booking.show_id, show_id);
    assert_eq!(booking.user_id, 7);
    assert_eq!(booking.seat_ids, wanted);

    let available = inventory.list_available(show_id).await.unwrap();
    assert_eq!(available.len(), 8);
    assert!(available.iter().all(|s| !wanted.contains(&s.id)));
}

#[sqlx::test(migrations = "src/migrations")]
#[ignore = "needs a running Postgres (DATABASE_URL)"]
async fn booking_with_empty_seat_list_is_rejected(pool: PgPool) {
    let (show_id, _) = seed_show(&pool, 5).await;
    let engine = ReservationService::new(pool.clone());

    let err = engine.book_tickets(show_id, &[], 1, "alice").await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "src/migrations")]
#[ignore = "needs a running Postgres (DATABASE_URL)"]
async fn booking_with_duplicate_seat_ids_is_rejected(pool: PgPool) {
    let (show_id, seat_ids) = seed_show(&pool, 5).await;
    let engine = ReservationService::new(pool.clone());

    let err = engine
        .book_tickets(show_id, &[seat_ids[0], seat_ids[0]], 1, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(booked_seat_ids(&pool, show_id).await.is_empty());
}

#[sqlx::test(migrations = "src/migrations")]
#[ignore = "needs a running Postgres (DATABASE_URL)"]
async fn booking_unknown_show_is_not_found(pool: PgPool) {
    let engine = ReservationService::new(pool.clone());
    let err = engine.book_tickets(9999, &[1], 1, "alice").await.unwrap_err();
    assert!(matches!(err, AppError::ShowNotFound(9999)));
}

#[sqlx::test(migrations = "src/migrations")]
#[ignore = "needs a running Postgres (DATABASE_URL)"]
async fn seat_from_another_show_cannot_be_claimed(pool: PgPool) {
    let (show_a, _) = seed_show(&pool, 3).await;
    let (_, seats_b) = seed_show(&pool, 3).await;
    let engine = ReservationService::new(pool.clone());

    let err = engine
        .book_tickets(show_a, &[seats_b[0]], 1, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::SeatNotAvailable));

    // The foreign seat must not have been flipped either.
    let booked: bool = sqlx::query_scalar("SELECT is_booked FROM seats WHERE id = $1")
        .bind(seats_b[0])
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(!booked);
}

#[sqlx::test(migrations = "src/migrations")]
#[ignore = "needs a running Postgres (DATABASE_URL)"]
async fn losing_booking_leaves_no_partial_claims(pool: PgPool) {
    let (show_id, seat_ids) = seed_show(&pool, 5).await;
    let engine = ReservationService::new(pool.clone());

    engine
        .book_tickets(show_id, &[seat_ids[2]], 1, "alice")
        .await
        .unwrap();

    // Overlaps on seat_ids[2]; the claims on [1] and [3] must roll back.
    let err = engine
        .book_tickets(show_id, &[seat_ids[1], seat_ids[2], seat_ids[3]], 2, "bob")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::SeatNotAvailable));

    assert_eq!(booked_seat_ids(&pool, show_id).await, vec![seat_ids[2]]);
}

#[sqlx::test(migrations = "src/migrations")]
#[ignore = "needs a running Postgres (DATABASE_URL)"]
async fn concurrent_bookings_of_one_seat_have_a_single_winner(pool: PgPool) {
    let (show_id, seat_ids) = seed_show(&pool, 1).await;
    let contested = seat_ids[0];
    let engine = ReservationService::new(pool.clone());

    let n = 8;
    let attempts = (0..n).map(|i| {
        let engine = engine.clone();
        tokio::spawn(async move {
            engine
                .book_tickets(show_id, &[contested], i as i64 + 1, "racer")
                .await
        })
    });
    let results: Vec<_> = futures::future::join_all(attempts).await;

    let mut wins = 0;
    let mut conflicts = 0;
    for res in results {
        match res.unwrap() {
            Ok(booking) => {
                assert_eq!(booking.seat_ids, vec![contested]);
                wins += 1;
            }
            Err(AppError::SeatNotAvailable) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(wins, 1);
    assert_eq!(conflicts, n - 1);

    let booking_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE show_id = $1")
            .bind(show_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(booking_count, 1);
    assert_eq!(booked_seat_ids(&pool, show_id).await, vec![contested]);
}

#[sqlx::test(migrations = "src/migrations")]
#[ignore = "needs a running Postgres (DATABASE_URL)"]
async fn booked_seats_equal_the_disjoint_union_of_bookings(pool: PgPool) {
    let (show_id, seat_ids) = seed_show(&pool, 6).await;
    let engine = ReservationService::new(pool.clone());

    let a = engine
        .book_tickets(show_id, &[seat_ids[0], seat_ids[1]], 1, "alice")
        .await
        .unwrap();
    let b = engine
        .book_tickets(show_id, &[seat_ids[4], seat_ids[5]], 2, "bob")
        .await
        .unwrap();

    let mut union: Vec<i64> = a.seat_ids.iter().chain(b.seat_ids.iter()).copied().collect();
    union.sort_unstable();
    union.dedup();
    assert_eq!(union.len(), a.seat_ids.len() + b.seat_ids.len(), "seat sets overlap");
    assert_eq!(booked_seat_ids(&pool, show_id).await, union);
}

/* ---------- cancellation ---------- */

#[sqlx::test(migrations = "src/migrations")]
#[ignore = "needs a running Postgres (DATABASE_URL)"]
async fn book_then_cancel_restores_availability(pool: PgPool) {
    let (show_id, seat_ids) = seed_show(&pool, 4).await;
    let engine = ReservationService::new(pool.clone());
    let inventory = SeatService::new(pool.clone());

    let booking = engine
        .book_tickets(show_id, &[seat_ids[0], seat_ids[1]], 3, "carol")
        .await
        .unwrap();
    engine.cancel_booking(booking.id, 3).await.unwrap();

    let available = inventory.list_available(show_id).await.unwrap();
    assert_eq!(available.len(), 4);
    assert!(engine.list_bookings_by_user(3).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "src/migrations")]
#[ignore = "needs a running Postgres (DATABASE_URL)"]
async fn cancel_by_non_owner_changes_nothing(pool: PgPool) {
    let (show_id, seat_ids) = seed_show(&pool, 4).await;
    let engine = ReservationService::new(pool.clone());

    let booking = engine
        .book_tickets(show_id, &[seat_ids[0]], 3, "carol")
        .await
        .unwrap();
    let err = engine.cancel_booking(booking.id, 99).await.unwrap_err();
    assert!(matches!(err, AppError::NotOwner));

    assert_eq!(booked_seat_ids(&pool, show_id).await, vec![seat_ids[0]]);
    assert_eq!(engine.list_bookings_by_user(3).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "src/migrations")]
#[ignore = "needs a running Postgres (DATABASE_URL)"]
async fn cancel_unknown_booking_is_not_found(pool: PgPool) {
    let engine = ReservationService::new(pool.clone());
    let err = engine.cancel_booking(424242, 1).await.unwrap_err();
    assert!(matches!(err, AppError::BookingNotFound(424242)));
}

#[sqlx::test(migrations = "src/migrations")]
#[ignore = "needs a running Postgres (DATABASE_URL)"]
async fn bookings_are_listed_in_id_order(pool: PgPool) {
    let (show_id, seat_ids) = seed_show(&pool, 4).await;
    let engine = ReservationService::new(pool.clone());

    for &seat in &seat_ids {
        engine.book_tickets(show_id, &[seat], 5, "dave").await.unwrap();
    }

    let bookings = engine.list_bookings_by_user(5).await.unwrap();
    assert_eq!(bookings.len(), 4);
    assert!(bookings.windows(2).all(|w| w[0].id < w[1].id));
}
