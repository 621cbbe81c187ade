//! Single-use validation: the unused -> used transition happens at most
//! once, and every later scan reports the original validation.

mod common;

use ticketgate::models::TicketStatus;
use ticketgate::services::ScanReason;
use ticketgate::utils::error::AppError;

#[tokio::test]
async fn test_fresh_code_is_admitted_once() {
    let db = common::test_db().await;
    let buyer = common::seed_user(&db, "alice", "user").await;
    let event = common::seed_event(&db, "Expo", 40.0, 5, None).await;

    let ticket = common::issuance(&db).purchase(buyer, event, 1).await.unwrap();
    let validation = common::validation(&db);

    let scan = validation.validate(&ticket.code).await.unwrap();
    assert!(scan.valid);
    assert!(scan.reason.is_none());

    let admitted = scan.ticket.expect("admitted scan carries the ticket");
    assert_eq!(admitted.status, TicketStatus::Used);
    assert!(admitted.used_at.is_some());
    assert_eq!(admitted.username, "alice");
    assert_eq!(admitted.event_name, "Expo");
}

#[tokio::test]
async fn test_rescan_reports_already_used_with_original_timestamp() {
    let db = common::test_db().await;
    let buyer = common::seed_user(&db, "alice", "user").await;
    let event = common::seed_event(&db, "Expo", 40.0, 5, None).await;

    let ticket = common::issuance(&db).purchase(buyer, event, 1).await.unwrap();
    let validation = common::validation(&db);

    let first = validation.validate(&ticket.code).await.unwrap();
    let first_used_at = first.ticket.unwrap().used_at.unwrap();

    let second = validation.validate(&ticket.code).await.unwrap();
    assert!(!second.valid);
    assert_eq!(second.reason, Some(ScanReason::AlreadyUsed));
    assert_eq!(second.ticket.unwrap().used_at.unwrap(), first_used_at);

    // Re-scanning never errors and never moves the timestamp.
    let third = validation.validate(&ticket.code).await.unwrap();
    assert_eq!(third.ticket.unwrap().used_at.unwrap(), first_used_at);
}

#[tokio::test]
async fn test_unknown_code_is_an_expected_outcome() {
    let db = common::test_db().await;
    let scan = common::validation(&db)
        .validate("TKT0000000000NOPE")
        .await
        .unwrap();
    assert!(!scan.valid);
    assert_eq!(scan.reason, Some(ScanReason::NotFound));
    assert!(scan.ticket.is_none());
}

#[tokio::test]
async fn test_blank_code_is_rejected() {
    let db = common::test_db().await;
    let err = common::validation(&db)
        .validate("   ")
        .await
        .expect_err("blank code should be a validation error");
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_concurrent_scans_admit_at_most_once() {
    let db = common::test_db().await;
    let buyer = common::seed_user(&db, "alice", "user").await;
    let event = common::seed_event(&db, "Expo", 40.0, 5, None).await;

    let ticket = common::issuance(&db).purchase(buyer, event, 1).await.unwrap();
    let validation = common::validation(&db);

    let (first, second) = tokio::join!(
        validation.validate(&ticket.code),
        validation.validate(&ticket.code)
    );
    let first = first.unwrap();
    let second = second.unwrap();

    let admitted = [&first, &second].iter().filter(|s| s.valid).count();
    assert_eq!(admitted, 1, "only one concurrent scan may admit");

    let rejected = if first.valid { second } else { first };
    assert_eq!(rejected.reason, Some(ScanReason::AlreadyUsed));
}
