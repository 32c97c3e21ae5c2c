//! Identity platform integration tests
//!
//! Drives the role registry, user directory, membership resolver and the
//! authorization gate over the in-memory identity store.

use std::sync::Arc;

use idm_platform::{
    Argon2Config, CallerIdentity, ExecutionContext, IdentityPlatform, InMemoryIdentityStore,
    PasswordPolicy, PasswordService,
};

fn platform() -> (Arc<InMemoryIdentityStore>, IdentityPlatform<InMemoryIdentityStore>) {
    let store = Arc::new(InMemoryIdentityStore::new());
    let hasher = PasswordService::new(Argon2Config::testing(), PasswordPolicy::default()).unwrap();
    let platform = IdentityPlatform::in_memory(store.clone(), Arc::new(hasher));
    (store, platform)
}

fn admin() -> ExecutionContext {
    ExecutionContext::create(CallerIdentity::new("admin-1", ["admin"]))
}

fn viewer() -> ExecutionContext {
    ExecutionContext::create(CallerIdentity::new("user-7", ["viewer", "Admin"]))
}

mod role_registry_tests {
    use super::*;

    #[tokio::test]
    async fn test_case_insensitive_name_conflict() {
        let (_store, platform) = platform();

        platform.roles.create_role("Editor", admin()).await.unwrap();
        let err = platform.roles.create_role("editor", admin()).await.unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(err.message(), "duplicate role name");
        assert_eq!(platform.roles.list_roles().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_roles_sorted_regardless_of_insertion_order() {
        let (_store, platform) = platform();
        for name in ["Zeta", "alpha", "Mu", "Beta"] {
            platform.roles.create_role(name, admin()).await.unwrap();
        }

        let names: Vec<String> = platform
            .roles
            .list_roles()
            .await
            .unwrap()
            .into_iter()
            .map(|role| role.name)
            .collect();
        assert_eq!(names, vec!["Beta", "Mu", "Zeta", "alpha"]);
    }

    #[tokio::test]
    async fn test_empty_registry_lists_nothing() {
        let (_store, platform) = platform();
        assert!(platform.roles.list_roles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_role_detail_is_not_found_for_any_caller() {
        let (_store, platform) = platform();

        let err = platform.roles.get_role_detail("NoSuchRole").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.http_status_code(), 404);
    }

    #[tokio::test]
    async fn test_detail_lookup_is_exact() {
        let (_store, platform) = platform();
        platform.roles.create_role("Ops", admin()).await.unwrap();

        assert!(platform.roles.get_role_detail("Ops").await.is_ok());
        assert!(platform.roles.get_role_detail("OPS").await.unwrap_err().is_not_found());
    }

    // runs back to back on the in-memory store; losers fail the pre-check
    #[tokio::test]
    async fn test_case_variant_creates_admit_one() {
        let (_store, platform) = platform();

        let attempts = (0..8).map(|i| {
            let name = if i % 2 == 0 { "Editor" } else { "EDITOR" };
            platform.roles.create_role(name, admin())
        });
        let results = futures::future::join_all(attempts).await;

        let successes = results.iter().filter(|r| r.is_success()).count();
        assert_eq!(successes, 1);
        for result in results.into_iter().filter(|r| r.is_failure()) {
            assert_eq!(result.unwrap_err().code(), "ROLE_NAME_EXISTS");
        }
    }
}

mod authorization_tests {
    use super::*;

    #[tokio::test]
    async fn test_non_admin_create_is_forbidden_and_store_untouched() {
        let (store, platform) = platform();

        let err = platform.roles.create_role("Editor", viewer()).await.unwrap_err();

        assert!(err.is_forbidden());
        assert_eq!(store.row_count("roles"), 0);
        assert!(store.audit_logs().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_admin_delete_is_forbidden_and_store_untouched() {
        let (store, platform) = platform();
        platform.roles.create_role("Ops", admin()).await.unwrap();
        platform
            .users
            .register_user("alice", "a@x.com", "secret", ExecutionContext::anonymous())
            .await
            .unwrap();
        platform.roles.assign_role("alice", "Ops", admin()).await.unwrap();

        let err = platform.roles.delete_role("Ops", viewer()).await.unwrap_err();

        assert!(err.is_forbidden());
        assert_eq!(store.row_count("roles"), 1);
        assert_eq!(store.row_count("user_roles"), 1);
        let detail = platform.roles.get_role_detail("Ops").await.unwrap();
        assert_eq!(detail.members, vec!["alice"]);
    }

    #[tokio::test]
    async fn test_gate_checked_before_lookup() {
        let (_store, platform) = platform();

        let err = platform
            .roles
            .delete_role("NoSuchRole", ExecutionContext::anonymous())
            .await
            .unwrap_err();
        assert!(err.is_forbidden());
    }

    #[tokio::test]
    async fn test_reads_are_open() {
        let (_store, platform) = platform();
        platform.roles.create_role("Ops", admin()).await.unwrap();

        assert_eq!(platform.roles.list_roles().await.unwrap().len(), 1);
        assert!(platform.roles.get_role_detail("Ops").await.is_ok());
        assert!(platform.users.list_users().await.is_ok());
    }
}

mod user_directory_tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_email_conflicts_even_with_new_username() {
        let (_store, platform) = platform();
        platform
            .users
            .register_user("alice", "a@x.com", "pw1", ExecutionContext::anonymous())
            .await
            .unwrap();

        let err = platform
            .users
            .register_user("bob", "a@x.com", "pw2", ExecutionContext::anonymous())
            .await
            .unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(err.message(), "duplicate email");
    }

    #[tokio::test]
    async fn test_duplicate_username_with_new_email() {
        let (_store, platform) = platform();
        platform
            .users
            .register_user("alice", "a@x.com", "secret", ExecutionContext::anonymous())
            .await
            .unwrap();

        let err = platform
            .users
            .register_user("alice", "b@x.com", "secret", ExecutionContext::anonymous())
            .await
            .unwrap_err();

        assert_eq!(err.message(), "duplicate username");
    }

    #[tokio::test]
    async fn test_email_reported_first_when_both_collide() {
        let (_store, platform) = platform();
        platform
            .users
            .register_user("alice", "a@x.com", "secret", ExecutionContext::anonymous())
            .await
            .unwrap();

        let err = platform
            .users
            .register_user("alice", "a@x.com", "secret", ExecutionContext::anonymous())
            .await
            .unwrap_err();

        assert_eq!(err.code(), "EMAIL_EXISTS");
    }

    #[tokio::test]
    async fn test_list_users_sorted_without_credentials() {
        let (_store, platform) = platform();
        for (username, email) in [("carol", "c@x.com"), ("alice", "a@x.com"), ("bob", "b@x.com")] {
            platform
                .users
                .register_user(username, email, "secret", ExecutionContext::anonymous())
                .await
                .unwrap();
        }

        let users = platform.users.list_users().await.unwrap();
        let usernames: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(usernames, vec!["alice", "bob", "carol"]);

        let json = serde_json::to_string(&users).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("secret"));
    }

    #[tokio::test]
    async fn test_audit_row_never_holds_password() {
        let (store, platform) = platform();
        platform
            .users
            .register_user("alice", "a@x.com", "hunter22", ExecutionContext::anonymous())
            .await
            .unwrap();

        let logs = store.audit_logs().unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].operation, "RegisterUserCommand");
        assert_eq!(logs[0].entity_type, "User");
        assert!(!logs[0].operation_json.as_deref().unwrap_or_default().contains("hunter22"));
    }
}

mod membership_tests {
    use super::*;
    use idm_platform::usecase::UnitOfWork;
    use idm_platform::{Membership, Role, RoleAssigned, RoleRepository, UserRepository};

    async fn with_alice_in_ops() -> (Arc<InMemoryIdentityStore>, IdentityPlatform<InMemoryIdentityStore>) {
        let (store, platform) = platform();
        platform.roles.create_role("Ops", admin()).await.unwrap();
        platform
            .users
            .register_user("alice", "a@x.com", "secret", ExecutionContext::anonymous())
            .await
            .unwrap();
        platform.roles.assign_role("alice", "Ops", admin()).await.unwrap();
        (store, platform)
    }

    #[tokio::test]
    async fn test_assign_detail_delete_scenario() {
        let (store, platform) = with_alice_in_ops().await;

        let detail = platform.roles.get_role_detail("Ops").await.unwrap();
        assert_eq!(detail.members, vec!["alice"]);

        platform.roles.delete_role("Ops", admin()).await.unwrap();

        assert!(platform.roles.get_role_detail("Ops").await.unwrap_err().is_not_found());
        assert_eq!(store.row_count("user_roles"), 0);
    }

    #[tokio::test]
    async fn test_delete_removes_every_membership() {
        let (store, platform) = platform();
        platform.roles.create_role("Ops", admin()).await.unwrap();
        platform.roles.create_role("Dev", admin()).await.unwrap();
        for i in 0..5 {
            let username = format!("user{}", i);
            platform
                .users
                .register_user(&username, &format!("{}@x.com", username), "secret", ExecutionContext::anonymous())
                .await
                .unwrap();
            platform.roles.assign_role(&username, "Ops", admin()).await.unwrap();
        }
        platform.roles.assign_role("user0", "Dev", admin()).await.unwrap();
        assert_eq!(store.row_count("user_roles"), 6);

        platform.roles.delete_role("Ops", admin()).await.unwrap();

        assert_eq!(store.row_count("user_roles"), 1);
        assert_eq!(platform.roles.get_role_detail("Dev").await.unwrap().members, vec!["user0"]);
    }

    #[tokio::test]
    async fn test_members_sorted_and_live() {
        let (_store, platform) = with_alice_in_ops().await;
        platform
            .users
            .register_user("Zed", "z@x.com", "secret", ExecutionContext::anonymous())
            .await
            .unwrap();
        platform
            .users
            .register_user("bob", "b@x.com", "secret", ExecutionContext::anonymous())
            .await
            .unwrap();

        platform.roles.assign_role("zed", "Ops", admin()).await.unwrap();
        assert_eq!(platform.roles.get_role_detail("Ops").await.unwrap().members, vec!["Zed", "alice"]);

        platform.roles.assign_role("bob", "Ops", admin()).await.unwrap();
        assert_eq!(
            platform.roles.get_role_detail("Ops").await.unwrap().members,
            vec!["Zed", "alice", "bob"]
        );
    }

    #[tokio::test]
    async fn test_is_member() {
        let (store, platform) = with_alice_in_ops().await;
        platform.roles.create_role("Dev", admin()).await.unwrap();
        let alice = store.find_by_normalized_username("ALICE").await.unwrap().unwrap();

        assert!(platform.memberships.is_member(&alice.id, "Ops").await.unwrap());
        assert!(!platform.memberships.is_member(&alice.id, "Dev").await.unwrap());
    }

    #[tokio::test]
    async fn test_is_member_of_missing_role_is_not_found() {
        let (store, platform) = with_alice_in_ops().await;
        let alice = store.find_by_normalized_username("ALICE").await.unwrap().unwrap();

        let err = platform.memberships.is_member(&alice.id, "NoSuchRole").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_membership_for_deleted_role_is_rejected_at_commit() {
        let (store, platform) = with_alice_in_ops().await;
        let alice = store.find_by_normalized_username("ALICE").await.unwrap().unwrap();
        let ops = store.find_by_name("Ops").await.unwrap().unwrap();
        platform.roles.delete_role("Ops", admin()).await.unwrap();

        // Stale read: the assignment was prepared before the delete landed.
        let membership = Membership::new(&alice.id, &ops.id);
        let event = RoleAssigned::new(&admin(), &membership, "alice", "Ops");
        let err = store
            .commit(&membership, event, &"AssignRoleCommand")
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(store.row_count("user_roles"), 0);
    }

    #[tokio::test]
    async fn test_write_time_duplicate_maps_to_conflict() {
        let (store, _platform) = platform();
        let first = Role::new("Editor");
        let racer = Role::new("editor");
        let ctx = admin();

        store
            .commit(&first, idm_platform::RoleCreated::new(&ctx, &first), &"CreateRoleCommand")
            .await
            .unwrap();
        let err = store
            .commit(&racer, idm_platform::RoleCreated::new(&ctx, &racer), &"CreateRoleCommand")
            .await
            .unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(err.message(), "duplicate role name");
    }
}

mod failure_tests {
    use super::*;

    #[tokio::test]
    async fn test_store_failure_is_generic_internal_error() {
        let (store, platform) = platform();
        store.set_unavailable(true);

        let err = platform.roles.list_roles().await.unwrap_err();
        assert!(err.is_internal());
        assert_eq!(err.message(), "An internal error occurred");

        let err = platform.roles.create_role("Ops", admin()).await.unwrap_err();
        assert!(err.is_internal());
    }

    #[tokio::test]
    async fn test_failed_delete_changes_nothing() {
        let (store, platform) = platform();
        platform.roles.create_role("Ops", admin()).await.unwrap();
        platform
            .users
            .register_user("alice", "a@x.com", "secret", ExecutionContext::anonymous())
            .await
            .unwrap();
        platform.roles.assign_role("alice", "Ops", admin()).await.unwrap();

        store.set_unavailable(true);
        let err = platform.roles.delete_role("Ops", admin()).await.unwrap_err();
        store.set_unavailable(false);

        assert!(err.is_internal());
        assert_eq!(store.row_count("roles"), 1);
        assert_eq!(store.row_count("user_roles"), 1);
    }
}

mod audit_trail_tests {
    use super::*;
    use idm_platform::AuditLogRepository;
    use std::time::Duration;

    #[tokio::test]
    async fn test_role_history_read_back_oldest_first() {
        let (store, platform) = platform();
        platform
            .users
            .register_user("alice", "a@x.com", "pw1", ExecutionContext::anonymous())
            .await
            .unwrap();
        platform.roles.create_role("Ops", admin()).await.unwrap();
        let role_id = platform.roles.list_roles().await.unwrap()[0].id.clone();
        platform.roles.assign_role("alice", "Ops", admin()).await.unwrap();

        // audit timestamps are stored with millisecond precision
        tokio::time::sleep(Duration::from_millis(5)).await;
        platform.roles.delete_role("Ops", admin()).await.unwrap();

        let history = store.find_by_entity_id(&role_id).await.unwrap();

        let operations: Vec<&str> = history.iter().map(|log| log.operation.as_str()).collect();
        assert_eq!(operations, vec!["CreateRoleCommand", "DeleteRoleCommand"]);
        let event_types: Vec<&str> = history.iter().map(|log| log.event_type.as_str()).collect();
        assert_eq!(event_types, vec!["idm:role:created", "idm:role:deleted"]);
        assert!(history.iter().all(|log| log.entity_type == "Role"));
        assert!(history.iter().all(|log| log.principal_id == "admin-1"));
        assert!(history[0].performed_at < history[1].performed_at);
    }

    #[tokio::test]
    async fn test_unknown_entity_has_no_history() {
        let (store, platform) = platform();
        platform.roles.create_role("Ops", admin()).await.unwrap();

        assert!(store.find_by_entity_id("0NOSUCHENTITY").await.unwrap().is_empty());
    }
}
