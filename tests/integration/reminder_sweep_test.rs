//! Integration tests for the hourly reminder sweep.

mod helpers;

use chrono::Duration;

use helpers::{TestApp, start_of_test};

#[tokio::test]
async fn test_sweeps_walk_the_course_to_completion() {
    let app = TestApp::new(start_of_test());
    let ctx = app.user();
    app.devices.register(&ctx, "device-1").await.unwrap();
    let med = app
        .create_medication(&ctx, "Amoxicillin", "2024-05-01T08:30:00Z", 6, "2024-05-03T00:00:00Z")
        .await;

    // 14:00 -> 20:00 -> next-day 09:00 -> 15:00 -> 21:00 -> past the stop date
    let expected = [
        (1, 14, "2024-05-01 20:00:00 +0000 UTC"),
        (1, 20, "2024-05-02 09:00:00 +0000 UTC"),
        (2, 9, "2024-05-02 15:00:00 +0000 UTC"),
        (2, 15, "2024-05-02 21:00:00 +0000 UTC"),
    ];
    for (day, hour, next) in expected {
        app.set_time(day, hour, 0);
        let summary = app.sweep().await;
        assert_eq!(summary["handled"], 1);
        assert_eq!(summary["courses_completed"], 0);
        let detail = app.medications.get_detail(&ctx, med.id).await.unwrap();
        assert_eq!(detail.next_dosage_time, next);
    }

    app.set_time(2, 21, 0);
    let summary = app.sweep().await;
    assert_eq!(summary["courses_completed"], 1);

    let detail = app.medications.get_detail(&ctx, med.id).await.unwrap();
    assert!(detail.is_medication_course_complete);
    assert_eq!(app.history_store.len(), 5);
    assert_eq!(app.sender.sent().len(), 5);

    app.advance(Duration::hours(12));
    let summary = app.sweep().await;
    assert_eq!(summary["due"], 0);
}

#[tokio::test]
async fn test_repeated_sweep_in_same_hour_sends_once() {
    let app = TestApp::new(start_of_test());
    let ctx = app.user();
    app.devices.register(&ctx, "device-1").await.unwrap();
    app.create_medication(&ctx, "Metformin", "2024-05-01T08:30:00Z", 6, "2024-05-03T00:00:00Z")
        .await;

    app.set_time(1, 14, 0);
    app.sweep().await;
    let summary = app.sweep().await;

    assert_eq!(summary["due"], 0);
    assert_eq!(app.sender.sent().len(), 1);
    assert_eq!(app.history_store.len(), 1);
}

#[tokio::test]
async fn test_overdue_dose_is_caught_up_once() {
    let app = TestApp::new(start_of_test());
    let ctx = app.user();
    let med = app
        .create_medication(&ctx, "Vitamin C", "2024-05-01T08:30:00Z", 6, "2024-05-03T00:00:00Z")
        .await;

    // Scheduler was down for a day; one catch-up reminder, then the schedule jumps ahead.
    app.set_time(2, 10, 30);
    let summary = app.sweep().await;
    assert_eq!(summary["handled"], 1);

    let detail = app.medications.get_detail(&ctx, med.id).await.unwrap();
    assert_eq!(detail.next_dosage_time, "2024-05-02 15:00:00 +0000 UTC");
    assert_eq!(app.history_store.len(), 1);
}

#[tokio::test]
async fn test_invalid_token_is_dropped_and_delivery_failure_still_records() {
    let app = TestApp::new(start_of_test());
    let ctx = app.user();
    app.devices.register(&ctx, "stale").await.unwrap();
    app.devices.register(&ctx, "fresh").await.unwrap();
    app.sender.reject("stale");
    app.create_medication(&ctx, "Lisinopril", "2024-05-01T08:30:00Z", 6, "2024-05-03T00:00:00Z")
        .await;

    app.set_time(1, 14, 0);
    let summary = app.sweep().await;
    assert_eq!(summary["notifications_delivered"], 1);
    assert_eq!(summary["tokens_removed"], 1);

    let tokens: Vec<String> = app
        .devices
        .list(&ctx)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.token)
        .collect();
    assert_eq!(tokens, vec!["fresh".to_string()]);

    app.sender.set_down(true);
    app.set_time(1, 20, 0);
    let summary = app.sweep().await;
    assert_eq!(summary["handled"], 1);
    assert_eq!(summary["notifications_delivered"], 0);
    assert_eq!(app.history_store.len(), 2);
}

#[tokio::test]
async fn test_message_targets_owner_devices_only() {
    let app = TestApp::new(start_of_test());
    let alice = app.user();
    let bob = app.user();
    app.devices.register(&alice, "alice-phone").await.unwrap();
    app.devices.register(&bob, "bob-phone").await.unwrap();
    let med = app
        .create_medication(&alice, "Insulin", "2024-05-01T08:30:00Z", 6, "2024-05-03T00:00:00Z")
        .await;

    app.set_time(1, 14, 0);
    app.sweep().await;

    let sent = app.sender.sent();
    assert_eq!(sent.len(), 1);
    let (tokens, message) = &sent[0];
    assert_eq!(tokens, &vec!["alice-phone".to_string()]);
    assert!(message.body.contains("Insulin"));
    assert_eq!(message.click_action, format!("medrem://medications/{}", med.id));
}

#[tokio::test]
async fn test_sweep_before_the_dose_hour_sends_nothing() {
    let app = TestApp::new(start_of_test());
    let ctx = app.user();
    app.devices.register(&ctx, "device-1").await.unwrap();
    app.create_medication(&ctx, "Warfarin", "2024-05-01T08:30:00Z", 6, "2024-05-03T00:00:00Z")
        .await;

    app.set_time(1, 13, 0);
    let summary = app.sweep().await;
    assert_eq!(summary["due"], 0);
    assert!(app.sender.sent().is_empty());
    assert!(app.history_store.is_empty());

    app.advance(Duration::hours(1));
    let summary = app.sweep().await;
    assert_eq!(summary["notifications_delivered"], 1);
}

#[tokio::test]
async fn test_edit_during_sweep_is_not_overwritten() {
    let app = TestApp::new(start_of_test());
    let ctx = app.user();
    let med = app
        .create_medication(&ctx, "Prednisone", "2024-05-01T08:30:00Z", 6, "2024-05-03T00:00:00Z")
        .await;

    app.set_time(1, 14, 0);
    let due = app.medications.get_due_medications().await.unwrap();
    assert_eq!(due.len(), 1);

    app.medications
        .update(
            &ctx,
            med.id,
            medrem_service::medication::UpdateMedicationRequest {
                is_medication_course_complete: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let advance = app
        .medications
        .advance_schedule(&due[0], due[0].next_dosage_time)
        .await
        .unwrap();
    assert_eq!(advance, medrem_service::medication::ScheduleAdvance::Superseded);

    let detail = app.medications.get_detail(&ctx, med.id).await.unwrap();
    assert!(detail.is_medication_course_complete);
    assert_eq!(detail.next_dosage_time, "2024-05-01 14:00:00 +0000 UTC");
}
