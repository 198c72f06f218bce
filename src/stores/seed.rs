use sea_orm::ConnectionTrait;

use crate::errors::InternalError;
use crate::stores::user_store::{NewUserRecord, UserStore};
use crate::types::internal::{Role, UserProfile};

/// Development accounts: (username, role, full name)
pub const DEFAULT_USERS: &[(&str, Role, &str)] = &[
    ("LVD-ADMIN", Role::Administrator, "Records Administrator"),
    ("LVD-CLERK", Role::User, "Records Clerk"),
    ("LVD-RECORDS", Role::User, "Records Keeper"),
];

/// Legacy plaintext credential given to every seeded account; upgraded to a
/// hash on first successful login.
pub const DEFAULT_SEED_PASSWORD: &str = "password";

/// Insert any missing default account; existing usernames are left alone
///
/// Returns the usernames that were created.
pub async fn seed_default_users(
    conn: &impl ConnectionTrait,
    user_store: &UserStore,
    now: i64,
) -> Result<Vec<String>, InternalError> {
    let mut created = Vec::new();

    for (username, role, full_name) in DEFAULT_USERS {
        if user_store.find_by_username(conn, username).await?.is_some() {
            tracing::debug!("Seed user {} already present, skipping", username);
            continue;
        }

        user_store
            .insert_user(
                conn,
                NewUserRecord {
                    username: username.to_string(),
                    credential: DEFAULT_SEED_PASSWORD.to_string(),
                    role: role.as_str().to_string(),
                    created_by: None,
                    profile: UserProfile {
                        full_name: Some(full_name.to_string()),
                        department: Some("Land Records".to_string()),
                        ..UserProfile::default()
                    },
                    password_changed_at: None,
                    created_at: now,
                },
            )
            .await?;

        tracing::info!("Seeded default user {} ({})", username, role);
        created.push(username.to_string());
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::setup_test_db;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let db = setup_test_db().await;
        let store = UserStore::new();

        let first = seed_default_users(&db, &store, 1).await.unwrap();
        assert_eq!(first, vec!["LVD-ADMIN", "LVD-CLERK", "LVD-RECORDS"]);

        let second = seed_default_users(&db, &store, 2).await.unwrap();
        assert!(second.is_empty());
        assert_eq!(store.list_users(&db).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_seeded_credentials_are_legacy_plaintext() {
        let db = setup_test_db().await;
        let store = UserStore::new();
        seed_default_users(&db, &store, 1).await.unwrap();

        let admin = store.find_by_username(&db, "LVD-ADMIN").await.unwrap().unwrap();
        assert_eq!(admin.password, DEFAULT_SEED_PASSWORD);
        assert_eq!(admin.role, "Administrator");
        assert!(admin.is_active);
    }
}
