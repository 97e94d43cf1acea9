//! Integration tests for the medication lifecycle.

mod helpers;

use medrem_core::error::ErrorKind;
use medrem_entity::history::MissedStatus;
use medrem_service::medication::UpdateMedicationRequest;

use helpers::{TestApp, start_of_test};

#[tokio::test]
async fn test_create_sweep_confirm_and_list_history() {
    let app = TestApp::new(start_of_test());
    let ctx = app.user();
    app.devices.register(&ctx, "device-1").await.unwrap();

    let med = app
        .create_medication(&ctx, "Amoxicillin", "2024-05-01T08:30:00Z", 6, "2024-05-03T00:00:00Z")
        .await;
    assert_eq!(med.next_dosage_time, "2024-05-01 14:00:00 +0000 UTC");

    app.set_time(1, 14, 0);
    let summary = app.sweep().await;
    assert_eq!(summary["due"], 1);
    assert_eq!(summary["notifications_delivered"], 1);

    let history = app.histories.get_all_by_user(&ctx).await.unwrap();
    assert_eq!(history.len(), 1);
    let entry = &history[0];
    assert_eq!(entry.medication_id, med.id);
    assert_eq!(entry.dosage_time, "2024-05-01 14:00:00 +0000 UTC");
    assert_eq!(entry.was_medication_missed, MissedStatus::Pending);

    app.histories
        .update_medication_history(&ctx, entry.id, true)
        .await
        .unwrap();
    let confirmed = app.histories.get_detail(&ctx, entry.id).await.unwrap();
    assert!(confirmed.has_medication_been_taken);
    assert_eq!(confirmed.was_medication_missed, MissedStatus::Taken);

    let detail = app.medications.get_detail(&ctx, med.id).await.unwrap();
    assert_eq!(detail.next_dosage_time, "2024-05-01 20:00:00 +0000 UTC");
}

#[tokio::test]
async fn test_other_user_cannot_touch_records() {
    let app = TestApp::new(start_of_test());
    let owner = app.user();
    let stranger = app.user();

    let med = app
        .create_medication(&owner, "Metformin", "2024-05-01T08:30:00Z", 6, "2024-05-03T00:00:00Z")
        .await;
    app.set_time(1, 14, 0);
    app.sweep().await;
    let entry = app.histories.get_all_by_user(&owner).await.unwrap().remove(0);

    let err = app.medications.get_detail(&stranger, med.id).await.unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
    let err = app.medications.delete(&stranger, med.id).await.unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
    let err = app
        .histories
        .update_medication_history(&stranger, entry.id, true)
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
    assert!(app.histories.get_all_by_user(&stranger).await.unwrap().is_empty());

    let untouched = app.histories.get_detail(&owner, entry.id).await.unwrap();
    assert_eq!(untouched.was_medication_missed, MissedStatus::Pending);
}

#[tokio::test]
async fn test_update_reschedules_and_next_lists_active_only() {
    let app = TestApp::new(start_of_test());
    let ctx = app.user();

    let morning = app
        .create_medication(&ctx, "Vitamin D", "2024-05-01T08:30:00Z", 6, "2024-05-03T00:00:00Z")
        .await;
    let paused = app
        .create_medication(&ctx, "Melatonin", "2024-05-01T08:00:00Z", 2, "2024-05-03T00:00:00Z")
        .await;
    assert_eq!(paused.next_dosage_time, "2024-05-01 10:00:00 +0000 UTC");

    let updated = app
        .medications
        .update(
            &ctx,
            morning.id,
            UpdateMedicationRequest {
                time_interval: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.next_dosage_time, "2024-05-01 10:00:00 +0000 UTC");

    app.medications
        .update(
            &ctx,
            paused.id,
            UpdateMedicationRequest {
                is_medication_course_complete: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    app.set_time(1, 9, 30);
    let next = app.medications.get_next(&ctx).await.unwrap();
    assert_eq!(next.len(), 1);
    assert_eq!(next[0].id, morning.id);
}

#[tokio::test]
async fn test_deleted_medication_keeps_history() {
    let app = TestApp::new(start_of_test());
    let ctx = app.user();

    let med = app
        .create_medication(&ctx, "Ibuprofen", "2024-05-01T08:30:00Z", 6, "2024-05-03T00:00:00Z")
        .await;
    app.set_time(1, 14, 0);
    app.sweep().await;

    app.medications.delete(&ctx, med.id).await.unwrap();
    assert!(app.medication_store.is_empty());

    let history = app.histories.get_all_by_user(&ctx).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].medication_name, "Ibuprofen");
}
