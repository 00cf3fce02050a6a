//! End-to-end credential change and reset pipeline.

mod common;

use classhub_auth::{CredentialError, PasswordHasher};
use classhub_core::config::password::PasswordPolicyConfig;
use classhub_core::events::{AuditEvent, CredentialEvent};
use uuid::Uuid;

use common::{TestHarness, harness, harness_with_policy};

async fn seed_user(h: &TestHarness, password: &str) -> Uuid {
    let user = Uuid::new_v4();
    let hash = PasswordHasher::new().hash(password).unwrap();
    h.credentials.seed(user, &hash);
    user
}

#[tokio::test]
async fn test_change_invalidates_every_session() {
    let h = harness();
    let user = seed_user(&h, "OriginalPass7!").await;

    let mut ids = Vec::new();
    for n in 0..3 {
        let s = h
            .sessions
            .create_session(user, "teacher1", "teacher", None, None, Some(&format!("d{n}")))
            .await
            .unwrap();
        ids.push(s.session_id);
    }

    let outcome = h
        .service
        .change_password(
            user,
            "teacher1",
            "OriginalPass7!",
            "BrightLake42!x",
            Some("203.0.113.9"),
            Some("Mozilla/5.0"),
        )
        .await
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.sessions_invalidated, 3);
    assert_eq!(outcome.remaining_changes_today, 4);
    assert_eq!(outcome.action_required, "re-authenticate");
    assert!(outcome.password_strength_score >= 80);

    for id in &ids {
        assert!(h.sessions.get_session(id).await.unwrap().is_none());
    }
    assert!(h.sessions.get_user_sessions(user).await.unwrap().is_empty());

    // The new hash was committed and verifies.
    let stored = h.credentials.current_hash(user).unwrap();
    assert!(PasswordHasher::new().verify("BrightLake42!x", &stored).unwrap());

    assert!(h.audit.events().iter().any(|e| matches!(
        e,
        AuditEvent::Credential(CredentialEvent::PasswordChanged {
            user_id,
            sessions_invalidated: 3,
            ..
        }) if *user_id == user
    )));
}

#[tokio::test]
async fn test_sixth_change_in_a_day_is_rate_limited() {
    let h = harness();
    let user = seed_user(&h, "RotatePass0!xQ").await;

    for n in 0..5u32 {
        let current = format!("RotatePass{n}!xQ");
        let next = format!("RotatePass{}!xQ", n + 1);
        let outcome = h
            .service
            .change_password(user, "teacher1", &current, &next, None, None)
            .await
            .unwrap();
        assert_eq!(outcome.remaining_changes_today, 4 - n);
    }

    // A perfectly strong password changes nothing about the verdict.
    let err = h
        .service
        .change_password(user, "teacher1", "RotatePass5!xQ", "BrightLake42!x", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, CredentialError::RateLimited));

    // The credential is still the fifth rotation.
    let stored = h.credentials.current_hash(user).unwrap();
    assert!(PasswordHasher::new().verify("RotatePass5!xQ", &stored).unwrap());
}

#[tokio::test]
async fn test_weak_password_rejected_with_details_and_sessions_survive() {
    let h = harness();
    let user = seed_user(&h, "OriginalPass7!").await;
    let session = h
        .sessions
        .create_session(user, "teacher1", "teacher", None, None, None)
        .await
        .unwrap();

    let err = h
        .service
        .change_password(user, "teacher1", "OriginalPass7!", "short1!", None, None)
        .await
        .unwrap_err();

    let CredentialError::WeakPassword(result) = err else {
        panic!("expected WeakPassword, got {err:?}");
    };
    assert!(!result.is_valid);
    assert!(result.issues.iter().any(|i| i.contains("too short")));
    assert_eq!(result.issues.len(), result.suggestions.len());

    // Rejection never triggers the cascade.
    assert!(h.sessions.get_session(&session.session_id).await.unwrap().is_some());
    let stored = h.credentials.current_hash(user).unwrap();
    assert!(PasswordHasher::new().verify("OriginalPass7!", &stored).unwrap());
}

#[tokio::test]
async fn test_wrong_current_password_rejected() {
    let h = harness();
    let user = seed_user(&h, "OriginalPass7!").await;

    let err = h
        .service
        .change_password(user, "teacher1", "WrongGuess9!", "BrightLake42!x", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, CredentialError::InvalidCurrentPassword));

    let err = h
        .service
        .change_password(Uuid::new_v4(), "ghost", "Anything9!", "BrightLake42!x", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, CredentialError::InvalidCurrentPassword));
}

#[tokio::test]
async fn test_recent_passwords_cannot_be_reused() {
    let h = harness();
    let user = seed_user(&h, "OriginalPass7!").await;

    // Same as current.
    let err = h
        .service
        .change_password(user, "teacher1", "OriginalPass7!", "OriginalPass7!", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, CredentialError::PasswordReused));

    // Rotate twice, then try to come back to the intermediate one.
    h.service
        .change_password(user, "teacher1", "OriginalPass7!", "BrightLake42!x", None, None)
        .await
        .unwrap();
    h.service
        .change_password(user, "teacher1", "BrightLake42!x", "ThirdHarbor8!z", None, None)
        .await
        .unwrap();
    let err = h
        .service
        .change_password(user, "teacher1", "ThirdHarbor8!z", "BrightLake42!x", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, CredentialError::PasswordReused));
}

#[tokio::test]
async fn test_password_exits_reuse_window_after_depth_changes() {
    let policy = PasswordPolicyConfig {
        max_changes_per_day: 20,
        ..PasswordPolicyConfig::default()
    };
    let h = harness_with_policy(policy);
    let user = seed_user(&h, "CyclePass0!vQ").await;

    // Five changes fill the history to its depth of 5.
    for n in 0..5 {
        h.service
            .change_password(
                user,
                "teacher1",
                &format!("CyclePass{n}!vQ"),
                &format!("CyclePass{}!vQ", n + 1),
                None,
                None,
            )
            .await
            .unwrap();
    }

    // 1 is still among the five retained hashes; 0 has left the window.
    let err = h
        .service
        .change_password(user, "teacher1", "CyclePass5!vQ", "CyclePass1!vQ", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, CredentialError::PasswordReused));

    let outcome = h
        .service
        .change_password(user, "teacher1", "CyclePass5!vQ", "CyclePass0!vQ", None, None)
        .await
        .unwrap();
    assert!(outcome.success);
}

#[tokio::test]
async fn test_admin_reset_forces_logout_and_skips_gates() {
    let h = harness();
    let admin = Uuid::new_v4();
    let user = seed_user(&h, "OriginalPass7!").await;
    let session = h
        .sessions
        .create_session(user, "teacher1", "teacher", None, None, None)
        .await
        .unwrap();

    // Missing a special character: the self-service gate refuses it, the
    // privileged path only requires the minimum score.
    let provisional = "Summerterm2026extra";
    let err = h
        .service
        .change_password(user, "teacher1", "OriginalPass7!", provisional, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, CredentialError::WeakPassword(_)));

    let outcome = h
        .service
        .reset_password(admin, user, provisional, "forgot password", true)
        .await
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.sessions_invalidated, 1);
    assert_eq!(outcome.reset_by, admin);
    assert!(PasswordHasher::new().verify(provisional, &outcome.password_hash).unwrap());
    assert!(h.sessions.get_session(&session.session_id).await.unwrap().is_none());

    assert!(h.audit.events().iter().any(|e| matches!(
        e,
        AuditEvent::Credential(CredentialEvent::PasswordReset {
            admin_id,
            target_user_id,
            ..
        }) if *admin_id == admin && *target_user_id == user
    )));
}

#[tokio::test]
async fn test_admin_reset_without_logout_leaves_sessions() {
    let h = harness();
    let admin = Uuid::new_v4();
    let user = seed_user(&h, "OriginalPass7!").await;
    let session = h
        .sessions
        .create_session(user, "teacher1", "teacher", None, None, None)
        .await
        .unwrap();

    let outcome = h
        .service
        .reset_password(admin, user, "BrightLake42!x", "routine rotation", false)
        .await
        .unwrap();

    assert_eq!(outcome.sessions_invalidated, 0);
    assert!(h.sessions.get_session(&session.session_id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_admin_reset_still_refuses_trivial_passwords() {
    let h = harness();
    let err = h
        .service
        .reset_password(Uuid::new_v4(), Uuid::new_v4(), "password", "lockout", true)
        .await
        .unwrap_err();
    assert!(matches!(err, CredentialError::WeakPassword(_)));
}

#[tokio::test]
async fn test_policy_snapshot_matches_configuration() {
    let h = harness();
    let policy = h.service.password_policy();
    assert_eq!(policy.min_length, 8);
    assert_eq!(policy.history_depth, 5);
    assert_eq!(policy.max_changes_per_day, 5);
    assert_eq!(policy.required_classes.len(), 4);
}
