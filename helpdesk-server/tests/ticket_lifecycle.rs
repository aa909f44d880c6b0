//! Ticket engine against an embedded database
//!
//! Every test runs on its own temporary RocksDB work directory.

use std::collections::HashSet;

use helpdesk_server::auth::{CurrentUser, JwtConfig};
use helpdesk_server::tickets::TicketDraft;
use helpdesk_server::{Config, ErrorCode, ServerState};
use shared::client::RegisterRequest;
use shared::models::{Category, Priority, Role, TicketStatus, TicketUpdate, TicketView};
use shared::util::now_millis;

const HOUR: i64 = 60 * 60 * 1000;

async fn setup() -> (tempfile::TempDir, ServerState) {
    let tmp = tempfile::tempdir().unwrap();
    let config = Config::with_work_dir(
        tmp.path().to_string_lossy().to_string(),
        JwtConfig::with_secret("integration-test-secret-0123456789abcdef"),
    );
    let state = ServerState::initialize(&config).await.unwrap();
    (tmp, state)
}

async fn register(state: &ServerState, name: &str, role: Role) -> CurrentUser {
    let auth = state
        .identity()
        .register(RegisterRequest {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password: "secret123".to_string(),
            role: Some(role),
        })
        .await
        .unwrap();
    CurrentUser {
        id: auth.id,
        name: auth.name,
        email: auth.email,
        role: auth.role,
    }
}

fn draft(title: &str, deadline: Option<i64>) -> TicketDraft {
    TicketDraft {
        title: title.to_string(),
        description: "Details".to_string(),
        category: Category::Software,
        priority: Priority::Medium,
        resolution_date: deadline,
    }
}

#[tokio::test]
async fn create_sets_owner_and_open_status() {
    let (_tmp, state) = setup().await;
    let alice = register(&state, "Alice", Role::User).await;

    let ticket = state
        .tickets()
        .create(&alice, draft("Laptop slow", None), vec![])
        .await
        .unwrap();

    assert_eq!(ticket.status, TicketStatus::Open);
    assert_eq!(ticket.user.id, alice.id);
    assert_eq!(ticket.user.name, "Alice");
    assert!(ticket.responses.is_empty());
    assert!(ticket.last_updated_by.is_none());
    assert!(!ticket.sla.breached && !ticket.sla.warning);
}

#[tokio::test]
async fn strangers_are_rejected_and_missing_is_not_found() {
    let (_tmp, state) = setup().await;
    let alice = register(&state, "Alice", Role::User).await;
    let bob = register(&state, "Bob", Role::User).await;
    let tickets = state.tickets();

    let ticket = tickets
        .create(&alice, draft("VPN", None), vec![])
        .await
        .unwrap();

    let err = tickets.get(&bob, &ticket.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotTicketOwner);

    let err = tickets
        .update(
            &bob,
            &ticket.id,
            TicketUpdate {
                title: Some("Hijacked".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotTicketOwner);

    let err = tickets.delete(&bob, &ticket.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotTicketOwner);

    let err = tickets
        .add_response(&bob, &ticket.id, "me too")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotTicketOwner);

    // nothing changed
    let unchanged = tickets.get(&alice, &ticket.id).await.unwrap();
    assert_eq!(unchanged.title, "VPN");
    assert!(unchanged.responses.is_empty());

    let err = tickets.get(&bob, "does-not-exist").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::TicketNotFound);
}

#[tokio::test]
async fn list_is_scoped_by_role() {
    let (_tmp, state) = setup().await;
    let admin = register(&state, "Root", Role::Admin).await;
    let users = [
        register(&state, "Alice", Role::User).await,
        register(&state, "Bob", Role::User).await,
        register(&state, "Carol", Role::User).await,
    ];
    let tickets = state.tickets();

    for user in &users {
        for n in 0..2 {
            tickets
                .create(user, draft(&format!("{} #{n}", user.name), None), vec![])
                .await
                .unwrap();
        }
    }

    assert_eq!(tickets.list(&admin).await.unwrap().len(), 6);
    for user in &users {
        let mine = tickets.list(user).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|t| t.user.id == user.id));
    }

    // listing twice with no writes in between yields the same result
    let ids = |views: Vec<TicketView>| views.into_iter().map(|t| t.id).collect::<Vec<_>>();
    let first = ids(tickets.list(&admin).await.unwrap());
    let second = ids(tickets.list(&admin).await.unwrap());
    assert_eq!(first, second);
}

#[tokio::test]
async fn list_is_newest_first() {
    let (_tmp, state) = setup().await;
    let alice = register(&state, "Alice", Role::User).await;
    let tickets = state.tickets();

    for title in ["first", "second", "third"] {
        tickets.create(&alice, draft(title, None), vec![]).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let titles: Vec<String> = tickets
        .list(&alice)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, ["third", "second", "first"]);
}

#[tokio::test]
async fn owner_edits_text_but_not_status() {
    let (_tmp, state) = setup().await;
    let alice = register(&state, "Alice", Role::User).await;
    let admin = register(&state, "Root", Role::Admin).await;
    let tickets = state.tickets();

    let ticket = tickets
        .create(&alice, draft("Printer", None), vec![])
        .await
        .unwrap();

    let updated = tickets
        .update(
            &alice,
            &ticket.id,
            TicketUpdate {
                title: Some("Printer on floor 2".into()),
                priority: Some("High".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Printer on floor 2");
    assert_eq!(updated.priority, Priority::High);
    assert_eq!(updated.last_updated_by.unwrap().id, alice.id);

    let err = tickets
        .update(
            &alice,
            &ticket.id,
            TicketUpdate {
                status: Some("Closed".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    let updated = tickets
        .update(
            &admin,
            &ticket.id,
            TicketUpdate {
                status: Some("In Progress".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, TicketStatus::InProgress);
    let editor = updated.last_updated_by.unwrap();
    assert_eq!(editor.id, admin.id);
    assert_eq!(editor.name, "Root");

    let err = tickets
        .update(
            &admin,
            &ticket.id,
            TicketUpdate {
                status: Some("Reopened".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidTicketStatus);
}

#[tokio::test]
async fn only_admins_set_a_deadline_at_creation() {
    let (_tmp, state) = setup().await;
    let alice = register(&state, "Alice", Role::User).await;
    let admin = register(&state, "Root", Role::Admin).await;
    let tickets = state.tickets();
    let deadline = now_millis() + 48 * HOUR;

    let err = tickets
        .create(&alice, draft("Rush job", Some(deadline)), vec![])
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
    assert!(tickets.list(&admin).await.unwrap().is_empty());

    let ticket = tickets
        .create(&admin, draft("Rush job", Some(deadline)), vec![])
        .await
        .unwrap();
    assert_eq!(ticket.resolution_date, Some(deadline));
    assert_eq!(ticket.user.id, admin.id);
}

#[tokio::test]
async fn sla_flags_follow_deadline_and_status() {
    let (_tmp, state) = setup().await;
    let admin = register(&state, "Root", Role::Admin).await;
    let tickets = state.tickets();
    let now = now_millis();

    let overdue = tickets
        .create(&admin, draft("Overdue", Some(now - HOUR)), vec![])
        .await
        .unwrap();
    assert!(overdue.sla.breached);
    assert!(!overdue.sla.warning);

    let soon = tickets
        .create(&admin, draft("Soon", Some(now + 12 * HOUR)), vec![])
        .await
        .unwrap();
    assert!(soon.sla.warning);
    assert!(!soon.sla.breached);

    let later = tickets
        .create(&admin, draft("Later", Some(now + 72 * HOUR)), vec![])
        .await
        .unwrap();
    assert!(!later.sla.warning && !later.sla.breached);

    // resolving overrides the breach
    let resolved = tickets
        .update(
            &admin,
            &overdue.id,
            TicketUpdate {
                status: Some("Resolved".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!resolved.sla.breached);

    // clearing the deadline clears the warning
    let cleared = tickets
        .update(
            &admin,
            &soon.id,
            TicketUpdate {
                resolution_date: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(cleared.resolution_date.is_none());
    assert!(!cleared.sla.warning);
}

#[tokio::test]
async fn responses_keep_order_and_resolve_authors() {
    let (_tmp, state) = setup().await;
    let alice = register(&state, "Alice", Role::User).await;
    let admin = register(&state, "Root", Role::Admin).await;
    let tickets = state.tickets();

    let ticket = tickets
        .create(&alice, draft("Email", None), vec![])
        .await
        .unwrap();

    tickets
        .add_response(&admin, &ticket.id, "Looking into it")
        .await
        .unwrap();
    let updated = tickets
        .add_response(&alice, &ticket.id, "Thanks")
        .await
        .unwrap();

    let thread: Vec<(&str, &str)> = updated
        .responses
        .iter()
        .map(|r| (r.user.name.as_str(), r.message.as_str()))
        .collect();
    assert_eq!(thread, [("Root", "Looking into it"), ("Alice", "Thanks")]);

    let err = tickets
        .add_response(&alice, &ticket.id, "   ")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::EmptyResponse);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_responses_are_never_lost() {
    const N: usize = 16;

    let (_tmp, state) = setup().await;
    let alice = register(&state, "Alice", Role::User).await;
    let admin = register(&state, "Root", Role::Admin).await;
    let tickets = state.tickets();

    let ticket = tickets
        .create(&alice, draft("Network outage", None), vec![])
        .await
        .unwrap();

    let handles: Vec<_> = (0..N)
        .map(|i| {
            let tickets = tickets.clone();
            let caller = if i % 2 == 0 { alice.clone() } else { admin.clone() };
            let id = ticket.id.clone();
            tokio::spawn(async move {
                tickets
                    .add_response(&caller, &id, &format!("message {i}"))
                    .await
            })
        })
        .collect();

    for result in futures::future::join_all(handles).await {
        result.unwrap().unwrap();
    }

    let final_ticket = tickets.get(&alice, &ticket.id).await.unwrap();
    assert_eq!(final_ticket.responses.len(), N);
    let messages: HashSet<String> = final_ticket
        .responses
        .into_iter()
        .map(|r| r.message)
        .collect();
    let expected: HashSet<String> = (0..N).map(|i| format!("message {i}")).collect();
    assert_eq!(messages, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_status_updates_all_succeed() {
    const N: usize = 12;
    const STATUSES: [&str; 4] = ["In Progress", "Resolved", "Closed", "Open"];

    let (_tmp, state) = setup().await;
    let alice = register(&state, "Alice", Role::User).await;
    let admin = register(&state, "Root", Role::Admin).await;
    let tickets = state.tickets();

    let ticket = tickets
        .create(&alice, draft("Flaky Wi-Fi", None), vec![])
        .await
        .unwrap();

    let handles: Vec<_> = (0..N)
        .map(|i| {
            let tickets = tickets.clone();
            let admin = admin.clone();
            let id = ticket.id.clone();
            tokio::spawn(async move {
                let update = TicketUpdate {
                    status: Some(STATUSES[i % STATUSES.len()].to_string()),
                    ..Default::default()
                };
                tickets.update(&admin, &id, update).await
            })
        })
        .collect();

    for result in futures::future::join_all(handles).await {
        let view = result.unwrap().unwrap();
        assert_eq!(view.id, ticket.id);
    }

    let final_ticket = tickets.get(&alice, &ticket.id).await.unwrap();
    let written: HashSet<&str> = STATUSES.into_iter().collect();
    assert!(written.contains(final_ticket.status.as_str()));
    assert_eq!(final_ticket.last_updated_by.unwrap().id, admin.id);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_registrations_yield_one_account() {
    const N: usize = 8;

    let (_tmp, state) = setup().await;

    let handles: Vec<_> = (0..N)
        .map(|i| {
            let identity = state.identity();
            tokio::spawn(async move {
                identity
                    .register(RegisterRequest {
                        name: format!("Twin {i}"),
                        email: "twin@example.com".to_string(),
                        password: "secret123".to_string(),
                        role: None,
                    })
                    .await
            })
        })
        .collect();

    let mut created = 0;
    for result in futures::future::join_all(handles).await {
        match result.unwrap() {
            Ok(_) => created += 1,
            Err(err) => assert_eq!(err.code, ErrorCode::EmailAlreadyRegistered, "{err}"),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(state.users().count().await.unwrap(), 1);
}

#[tokio::test]
async fn delete_is_permanent() {
    let (_tmp, state) = setup().await;
    let alice = register(&state, "Alice", Role::User).await;
    let tickets = state.tickets();

    let ticket = tickets
        .create(&alice, draft("Old", None), vec![])
        .await
        .unwrap();
    let deleted = tickets.delete(&alice, &ticket.id).await.unwrap();
    assert_eq!(deleted.id, ticket.id);

    let err = tickets.get(&alice, &ticket.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::TicketNotFound);
    assert!(tickets.list(&alice).await.unwrap().is_empty());

    let err = tickets.delete(&alice, &ticket.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::TicketNotFound);
}

#[tokio::test]
async fn dashboard_counts_for_admin_only() {
    let (_tmp, state) = setup().await;
    let alice = register(&state, "Alice", Role::User).await;
    let admin = register(&state, "Root", Role::Admin).await;
    let tickets = state.tickets();
    let now = now_millis();

    tickets
        .create(&admin, draft("Overdue", Some(now - HOUR)), vec![])
        .await
        .unwrap();
    let second = tickets
        .create(&alice, draft("Other", None), vec![])
        .await
        .unwrap();
    tickets
        .update(
            &admin,
            &second.id,
            TicketUpdate {
                status: Some("Closed".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = state.metrics().dashboard(&alice).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::AdminRequired);

    let metrics = state.metrics().dashboard(&admin).await.unwrap();
    assert_eq!(metrics.total_tickets, 2);
    assert_eq!(metrics.open_tickets, 1);
    assert_eq!(metrics.closed_tickets, 1);
    assert_eq!(metrics.breached_tickets, 1);
    assert_eq!(metrics.tickets_by_category.len(), 1);
    assert_eq!(metrics.tickets_by_category[0].category, Category::Software);
    assert_eq!(metrics.tickets_by_category[0].count, 2);
}
