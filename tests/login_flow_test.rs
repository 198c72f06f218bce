mod common;

use std::sync::Arc;

use chrono::Utc;
use common::{TestApp, client_context};
use lvd_records_backend::types::db::{session, user};
use lvd_records_backend::types::internal::{LoginInput, LoginResult, Role};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, sea_query::Expr};

#[tokio::test]
async fn test_seeded_admin_login_and_session_role() {
    let app = TestApp::new().await;

    let result = app.attempt("LVD-ADMIN", "password").await;
    let LoginResult::Accepted { session, role, .. } = result else {
        panic!("expected Accepted, got {:?}", result);
    };
    assert_eq!(role, Role::Administrator);

    let info = app
        .login
        .validate_session(session.token.expose())
        .await
        .unwrap()
        .expect("fresh session should validate");
    assert_eq!(info.username, "LVD-ADMIN");
    assert_eq!(info.role, Role::Administrator);
}

#[tokio::test]
async fn test_five_failures_then_locked_even_with_correct_password() {
    let app = TestApp::new().await;

    for attempt in 1..=5 {
        let result = app.attempt("LVD-CLERK", "not-the-password").await;
        assert!(
            matches!(result, LoginResult::RejectedInvalidCredentials),
            "attempt {} gave {:?}",
            attempt,
            result
        );
    }

    let result = app.attempt("LVD-CLERK", "password").await;
    assert!(matches!(result, LoginResult::RejectedLocked { .. }));

    // Other accounts are unaffected
    assert!(app.attempt("LVD-RECORDS", "password").await.is_accepted());
}

#[tokio::test]
async fn test_lock_lapses_without_unlock() {
    let app = TestApp::new().await;
    let clerk_id = app.user_id("LVD-CLERK").await;

    for _ in 0..5 {
        app.attempt("LVD-CLERK", "wrong").await;
    }
    assert!(app.app_data.login_guard.is_locked(&clerk_id).await.unwrap());

    user::Entity::update_many()
        .col_expr(user::Column::LockUntil, Expr::value(Utc::now().timestamp() - 1))
        .filter(user::Column::Id.eq(clerk_id.as_str()))
        .exec(&app.app_data.db)
        .await
        .unwrap();

    assert!(!app.app_data.login_guard.is_locked(&clerk_id).await.unwrap());
    assert!(app.attempt("LVD-CLERK", "password").await.is_accepted());
}

#[tokio::test]
async fn test_unlock_resets_and_allows_login() {
    let app = TestApp::new().await;
    let clerk_id = app.user_id("LVD-CLERK").await;

    for _ in 0..5 {
        app.attempt("LVD-CLERK", "wrong").await;
    }
    assert!(app.admin.unlock_account(&client_context(), &clerk_id).await.unwrap());

    let state = app
        .app_data
        .login_attempt_store
        .get_lock_state(&app.app_data.db, &clerk_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state.failed_login_attempts, 0);
    assert_eq!(state.lock_until, None);

    assert!(app.attempt("LVD-CLERK", "password").await.is_accepted());
}

#[tokio::test]
async fn test_legacy_credential_replaced_after_first_login() {
    let app = TestApp::new().await;
    let records_id = app.user_id("LVD-RECORDS").await;

    let before = user::Entity::find_by_id(records_id.clone())
        .one(&app.app_data.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(before.password, "password");

    assert!(app.attempt("LVD-RECORDS", "password").await.is_accepted());

    let after = user::Entity::find_by_id(records_id)
        .one(&app.app_data.db)
        .await
        .unwrap()
        .unwrap();
    assert_ne!(after.password, "password");
    assert!(app.app_data.credential_codec.verify("password", &after.password));
    assert!(!app.app_data.credential_codec.verify("Password", &after.password));
}

#[tokio::test]
async fn test_session_expires_after_ttl() {
    let app = TestApp::new().await;

    let LoginResult::Accepted { session, .. } = app.attempt("LVD-CLERK", "password").await else {
        panic!("expected Accepted");
    };
    let ttl = session.expires_at - session.created_at;
    assert_eq!(ttl, 24 * 3600);

    session::Entity::update_many()
        .col_expr(session::Column::CreatedAt, Expr::value(session.created_at - ttl))
        .col_expr(session::Column::ExpiresAt, Expr::value(session.created_at))
        .filter(session::Column::Id.eq(session.session_id.as_str()))
        .exec(&app.app_data.db)
        .await
        .unwrap();

    assert!(app.login.validate_session(session.token.expose()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_logout_twice() {
    let app = TestApp::new().await;
    let ctx = client_context();

    let LoginResult::Accepted { session, .. } = app.attempt("LVD-ADMIN", "password").await else {
        panic!("expected Accepted");
    };
    let token = session.token.expose();

    assert!(app.login.logout(&ctx, token).await.unwrap());
    assert!(app.login.validate_session(token).await.unwrap().is_none());
    assert!(!app.login.logout(&ctx, token).await.unwrap());
}

#[tokio::test]
async fn test_concurrent_failures_are_all_counted() {
    let app = Arc::new(TestApp::new().await);
    let clerk_id = app.user_id("LVD-CLERK").await;

    let mut handles = Vec::new();
    for _ in 0..4 {
        let app = Arc::clone(&app);
        handles.push(tokio::spawn(async move {
            app.login
                .login(&client_context(), LoginInput::new("LVD-CLERK", "wrong"))
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        assert!(matches!(
            handle.await.unwrap(),
            LoginResult::RejectedInvalidCredentials
        ));
    }

    let state = app
        .app_data
        .login_attempt_store
        .get_lock_state(&app.app_data.db, &clerk_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state.failed_login_attempts, 4);
    assert_eq!(state.lock_until, None);
}

#[tokio::test]
async fn test_every_outcome_writes_one_activity_entry() {
    let app = TestApp::new().await;
    let before = app.admin.get_activity_log(None, Some(1000)).await.unwrap().len();

    app.attempt("LVD-CLERK", "password").await;
    app.attempt("LVD-CLERK", "wrong").await;
    app.attempt("NOBODY", "wrong").await;
    app.attempt("", "").await;

    let after = app.admin.get_activity_log(None, Some(1000)).await.unwrap();
    // Missing fields are rejected before anything is recorded
    assert_eq!(after.len() - before, 3);
    assert_eq!(after[0].activity_type, "login_failed");
    assert_eq!(after[0].ip_address.as_deref(), Some("192.168.1.50"));
}
