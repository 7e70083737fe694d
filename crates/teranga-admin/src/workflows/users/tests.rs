use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use tower::ServiceExt;

use super::*;
use crate::workflows::actor::{Actor, ActorRole, ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};
use crate::workflows::catalog::{
    CatalogActionError, CatalogStore, Deletion, MemoryCatalog, RepositoryError, TrashError, Trashed,
};

/// Store whose listings lag, widening the gap between an email check and the insert.
#[derive(Default)]
struct SlowListing {
    inner: MemoryCatalog<UserAccount>,
}

impl CatalogStore<UserAccount> for SlowListing {
    fn insert(&self, record: UserAccount) -> Result<UserAccount, RepositoryError> {
        self.inner.insert(record)
    }

    fn fetch(&self, id: &UserId) -> Result<Option<UserAccount>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn list(&self) -> Result<Vec<UserAccount>, RepositoryError> {
        std::thread::sleep(std::time::Duration::from_millis(50));
        self.inner.list()
    }

    fn swap(&self, current: &UserAccount, next: UserAccount) -> Result<UserAccount, RepositoryError> {
        self.inner.swap(current, next)
    }

    fn trash(&self, id: &UserId, deletion: Deletion) -> Result<Trashed<UserAccount>, RepositoryError> {
        self.inner.trash(id, deletion)
    }

    fn fetch_trashed(&self, id: &UserId) -> Result<Option<Trashed<UserAccount>>, RepositoryError> {
        self.inner.fetch_trashed(id)
    }

    fn list_trashed(&self) -> Result<Vec<Trashed<UserAccount>>, RepositoryError> {
        self.inner.list_trashed()
    }

    fn restore(&self, id: &UserId) -> Result<UserAccount, RepositoryError> {
        self.inner.restore(id)
    }

    fn purge(&self, id: &UserId) -> Result<Trashed<UserAccount>, RepositoryError> {
        self.inner.purge(id)
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 20, 12, 0, 0).unwrap()
}

fn admin() -> Actor {
    Actor::new("user-000001", "Aminata Sow", ActorRole::Admin)
}

fn account(id: &str, name: &str, role: ActorRole, joined: NaiveDate) -> UserAccount {
    UserAccount {
        id: UserId::from(id),
        name: name.to_string(),
        email: format!("{}@teranga.sn", id),
        phone: None,
        role,
        status: UserStatus::Active,
        location: "Dakar".to_string(),
        verified: false,
        joined_on: joined,
        updated_at: now(),
    }
}

fn day(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).expect("valid date")
}

fn seeded() -> UserService<MemoryCatalog<UserAccount>> {
    let store = MemoryCatalog::with_records([
        account("user-000001", "Aminata Sow", ActorRole::Admin, day(1, 15)),
        account("user-000002", "Moussa Diop", ActorRole::Guide, day(1, 10)),
        account("user-000003", "Jean Martin", ActorRole::Tourist, day(1, 8)),
    ]);
    UserService::new(Arc::new(store))
}

fn draft(name: &str, email: &str, role: ActorRole) -> UserDraft {
    UserDraft {
        name: name.to_string(),
        email: email.to_string(),
        phone: Some("+221 77 123 45 67".to_string()),
        role,
        location: "Saint-Louis".to_string(),
    }
}

#[test]
fn create_skips_seeded_ids_and_normalizes_email() {
    let service = seeded();
    let user = service
        .create(
            &admin(),
            draft("Fatou Ndiaye", " Fatou@Example.SN ", ActorRole::Organizer),
            now(),
        )
        .unwrap();

    assert_eq!(user.id, UserId::from("user-000004"));
    assert_eq!(user.email, "fatou@example.sn");
    assert_eq!(user.joined_on, day(1, 20));
    assert!(!user.verified);
}

#[test]
fn create_validates_email_and_uniqueness() {
    let service = seeded();
    assert!(matches!(
        service.create(&admin(), draft("Fatou", "fatou.example.sn", ActorRole::Guide), now()),
        Err(CatalogActionError::Validation(_))
    ));
    assert!(matches!(
        service.create(&admin(), draft(" ", "x@y.sn", ActorRole::Guide), now()),
        Err(CatalogActionError::Validation(_))
    ));
    assert!(matches!(
        service.create(
            &admin(),
            draft("Autre Moussa", "USER-000002@teranga.sn", ActorRole::Guide),
            now()
        ),
        Err(CatalogActionError::Conflict(_))
    ));
}

#[test]
fn concurrent_creates_cannot_share_an_email() {
    let service = UserService::new(Arc::new(SlowListing::default()));

    let outcomes: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = ["Awa Fall", "Awa Faye"]
            .into_iter()
            .map(|name| {
                let service = &service;
                scope.spawn(move || {
                    service.create(&admin(), draft(name, "dup@teranga.sn", ActorRole::Tourist), now())
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("create thread"))
            .collect()
    });

    assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .any(|outcome| matches!(outcome, Err(CatalogActionError::Conflict(_)))));
    let holders = service
        .list(&UserQuery::default())
        .expect("users list")
        .into_iter()
        .filter(|user| user.email == "dup@teranga.sn")
        .count();
    assert_eq!(holders, 1);
}

#[test]
fn concurrent_updates_cannot_claim_the_same_email() {
    let service = UserService::new(Arc::new(SlowListing::default()));
    let first = service
        .create(&admin(), draft("Awa Fall", "awa.fall@teranga.sn", ActorRole::Guide), now())
        .expect("first created");
    let second = service
        .create(&admin(), draft("Ibou Faye", "ibou.faye@teranga.sn", ActorRole::Guide), now())
        .expect("second created");

    let outcomes: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = [(&first, "Awa Fall"), (&second, "Ibou Faye")]
            .into_iter()
            .map(|(user, name)| {
                let service = &service;
                scope.spawn(move || {
                    service.update(
                        &admin(),
                        &user.id,
                        draft(name, "contact@teranga.sn", ActorRole::Guide),
                        now(),
                    )
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("update thread"))
            .collect()
    });

    assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
    let holders = service
        .list(&UserQuery::default())
        .expect("users list")
        .into_iter()
        .filter(|user| user.email == "contact@teranga.sn")
        .count();
    assert_eq!(holders, 1);
}

#[test]
fn update_allows_keeping_own_email() {
    let service = seeded();
    let id = UserId::from("user-000002");
    let updated = service
        .update(
            &admin(),
            &id,
            draft("Moussa Diop", "user-000002@teranga.sn", ActorRole::Guide),
            now(),
        )
        .unwrap();
    assert_eq!(updated.location, "Saint-Louis");

    assert!(matches!(
        service.update(
            &admin(),
            &id,
            draft("Moussa Diop", "user-000003@teranga.sn", ActorRole::Guide),
            now()
        ),
        Err(CatalogActionError::Conflict(_))
    ));
}

#[test]
fn admins_cannot_suspend_or_delete_themselves() {
    let service = seeded();
    let own = UserId::from("user-000001");

    assert!(matches!(
        service.suspend(&admin(), &own, now()),
        Err(CatalogActionError::Forbidden { .. })
    ));
    assert!(matches!(
        service.trash_bin().soft_delete(&own, &admin(), now()),
        Err(TrashError::Forbidden { .. })
    ));

    let other = UserId::from("user-000003");
    let suspended = service.suspend(&admin(), &other, now()).unwrap();
    assert_eq!(suspended.status, UserStatus::Suspended);
    assert!(matches!(
        service.suspend(&admin(), &other, now()),
        Err(CatalogActionError::InvalidStateTransition { .. })
    ));
    let active = service.activate(&admin(), &other, now()).unwrap();
    assert_eq!(active.status, UserStatus::Active);
}

#[test]
fn verify_is_one_way() {
    let service = seeded();
    let id = UserId::from("user-000002");
    assert!(service.verify(&admin(), &id, now()).unwrap().verified);
    assert!(matches!(
        service.verify(&admin(), &id, now()),
        Err(CatalogActionError::InvalidStateTransition { .. })
    ));
}

#[test]
fn stats_count_statuses_roles_recent_members_and_trash() {
    let service = seeded();
    service
        .suspend(&admin(), &UserId::from("user-000003"), now())
        .unwrap();
    service
        .verify(&admin(), &UserId::from("user-000002"), now())
        .unwrap();
    service
        .create(
            &admin(),
            draft("Old Timer", "old@teranga.sn", ActorRole::Local),
            now() - Duration::days(45),
        )
        .unwrap();
    service
        .trash_bin()
        .soft_delete(&UserId::from("user-000004"), &admin(), now())
        .unwrap();

    let stats = service.stats(now()).unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.active, 2);
    assert_eq!(stats.suspended, 1);
    assert_eq!(stats.verified, 1);
    assert_eq!(stats.joined_last_30_days, 3);
    assert_eq!(stats.deleted, 1);
    assert_eq!(stats.by_role["admin"], 1);
    assert_eq!(stats.by_role["guide"], 1);
    assert_eq!(stats.by_role["local"], 0);
}

#[test]
fn list_filters_by_role_status_and_search() {
    let service = seeded();
    let guides = service
        .list(&UserQuery {
            role: Some(ActorRole::Guide),
            ..UserQuery::default()
        })
        .unwrap();
    assert_eq!(guides.len(), 1);

    let everyone = service.list(&UserQuery::default()).unwrap();
    assert_eq!(everyone[0].id, UserId::from("user-000001"));

    let searched = service
        .list(&UserQuery {
            search: Some("MARTIN".to_string()),
            ..UserQuery::default()
        })
        .unwrap();
    assert_eq!(searched.len(), 1);
}

#[tokio::test]
async fn reads_require_admin() {
    let router = user_router(Arc::new(seeded()));
    let request = |role: &str| {
        Request::get("/api/v1/users/stats")
            .header(ACTOR_ID_HEADER, "user-000002")
            .header(ACTOR_ROLE_HEADER, role)
            .body(Body::empty())
            .unwrap()
    };

    let response = router.clone().oneshot(request("guide")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = router.oneshot(request("admin")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
