//! User service unit tests.
//!
//! The repository is mocked; these tests pin down the uniqueness and
//! existence invariants and the partial-update merge behavior.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use mockall::mock;
use mockall::predicate::eq;
use uuid::Uuid;

use user_registry::domain::{User, UserDraft, UserPatch};
use user_registry::errors::{AppError, AppResult};
use user_registry::infra::UserRepository;
use user_registry::services::{UserManager, UserService};
use user_registry::types::{Page, PaginationParams};

mock! {
    UserRepo {}

    #[async_trait]
    impl UserRepository for UserRepo {
        async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
        async fn exists_by_email(&self, email: &str) -> AppResult<bool>;
        async fn exists_by_email_excluding(&self, email: &str, id: Uuid) -> AppResult<bool>;
        async fn insert(&self, draft: UserDraft, actor: &str) -> AppResult<User>;
        async fn save(&self, user: User, actor: &str) -> AppResult<User>;
        async fn delete(&self, id: Uuid) -> AppResult<()>;
        async fn find_by_birth_date_between(
            &self,
            from: NaiveDate,
            to: NaiveDate,
            pagination: &PaginationParams,
        ) -> AppResult<Page<User>>;
    }
}

fn birth_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1990, 6, 15).unwrap()
}

fn stored_user(id: Uuid) -> User {
    User {
        id,
        email: "jane@example.com".to_string(),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        birth_date: birth_date(),
        address: Some("123 Main St".to_string()),
        phone_number: Some("1234567890".to_string()),
        created_at: Utc::now(),
        updated_at: Utc::now(),
        created_by: "alice".to_string(),
        updated_by: "alice".to_string(),
    }
}

fn draft() -> UserDraft {
    UserDraft {
        email: "john@example.com".to_string(),
        first_name: "John".to_string(),
        last_name: "Smith".to_string(),
        birth_date: birth_date(),
        address: None,
        phone_number: None,
    }
}

fn service(repo: MockUserRepo) -> UserManager {
    UserManager::new(Arc::new(repo))
}

#[tokio::test]
async fn create_persists_draft_and_returns_assigned_id() {
    let mut repo = MockUserRepo::new();
    repo.expect_exists_by_email()
        .withf(|email| email == "john@example.com")
        .returning(|_| Ok(false));
    repo.expect_insert()
        .withf(|draft, actor| draft.email == "john@example.com" && actor == "alice")
        .returning(|draft, actor| {
            let now = Utc::now();
            Ok(User {
                id: Uuid::new_v4(),
                email: draft.email,
                first_name: draft.first_name,
                last_name: draft.last_name,
                birth_date: draft.birth_date,
                address: draft.address,
                phone_number: draft.phone_number,
                created_at: now,
                updated_at: now,
                created_by: actor.to_string(),
                updated_by: actor.to_string(),
            })
        });

    let created = service(repo).create(draft(), "alice").await.unwrap();

    assert_eq!(created.email, "john@example.com");
    assert_eq!(created.first_name, "John");
    assert_eq!(created.created_by, "alice");
}

#[tokio::test]
async fn create_rejects_duplicate_email() {
    let mut repo = MockUserRepo::new();
    repo.expect_exists_by_email().returning(|_| Ok(true));
    repo.expect_insert().times(0);

    let result = service(repo).create(draft(), "alice").await;

    assert!(matches!(result.unwrap_err(), AppError::EmailConflict));
}

#[tokio::test]
async fn update_missing_user_is_not_found() {
    let id = Uuid::new_v4();
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .with(eq(id))
        .returning(|_| Ok(None));
    repo.expect_exists_by_email_excluding().times(0);
    repo.expect_save().times(0);

    let result = service(repo).update(id, draft(), "alice").await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound));
}

#[tokio::test]
async fn update_rejects_email_owned_by_another_user() {
    let id = Uuid::new_v4();
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .returning(|id| Ok(Some(stored_user(id))));
    repo.expect_exists_by_email_excluding()
        .withf(move |email, excluded| email == "john@example.com" && *excluded == id)
        .returning(|_, _| Ok(true));
    repo.expect_save().times(0);

    let result = service(repo).update(id, draft(), "alice").await;

    assert!(matches!(result.unwrap_err(), AppError::EmailConflict));
}

#[tokio::test]
async fn update_replaces_all_fields_and_keeps_identity() {
    let id = Uuid::new_v4();
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .returning(|id| Ok(Some(stored_user(id))));
    repo.expect_exists_by_email_excluding()
        .returning(|_, _| Ok(false));
    repo.expect_save()
        .withf(move |user, actor| {
            user.id == id
                && user.email == "john@example.com"
                && user.last_name == "Smith"
                && user.address.is_none()
                && actor == "bob"
        })
        .returning(|user, _| Ok(user));

    let updated = service(repo).update(id, draft(), "bob").await.unwrap();

    assert_eq!(updated.id, id);
    assert_eq!(updated.first_name, "John");
}

#[tokio::test]
async fn partial_update_merges_supplied_fields_only() {
    let id = Uuid::new_v4();
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .returning(|id| Ok(Some(stored_user(id))));
    // no email in the patch, so no uniqueness check
    repo.expect_exists_by_email_excluding().times(0);
    repo.expect_save()
        .withf(|user, _| {
            user.first_name == "John"
                && user.last_name == "Doe"
                && user.email == "jane@example.com"
        })
        .returning(|user, _| Ok(user));

    let patch = UserPatch {
        first_name: Some("John".to_string()),
        ..Default::default()
    };
    let updated = service(repo)
        .update_partial(id, patch, "alice")
        .await
        .unwrap();

    assert_eq!(updated.first_name, "John");
    assert_eq!(updated.last_name, "Doe");
    assert_eq!(updated.email, "jane@example.com");
}

#[tokio::test]
async fn partial_update_empty_strings_change_nothing() {
    let id = Uuid::new_v4();
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .returning(|id| Ok(Some(stored_user(id))));
    // an empty-string email is not a change, so no uniqueness check either
    repo.expect_exists_by_email_excluding().times(0);
    repo.expect_save()
        .withf(|user, _| {
            user.email == "jane@example.com"
                && user.first_name == "Jane"
                && user.address.as_deref() == Some("123 Main St")
        })
        .returning(|user, _| Ok(user));

    let patch = UserPatch {
        email: Some(String::new()),
        first_name: Some(String::new()),
        address: Some(String::new()),
        ..Default::default()
    };
    let updated = service(repo)
        .update_partial(id, patch, "alice")
        .await
        .unwrap();

    assert_eq!(updated.email, "jane@example.com");
}

#[tokio::test]
async fn partial_update_rejects_email_owned_by_another_user() {
    let id = Uuid::new_v4();
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .returning(|id| Ok(Some(stored_user(id))));
    repo.expect_exists_by_email_excluding()
        .withf(|email, _| email == "taken@example.com")
        .returning(|_, _| Ok(true));
    repo.expect_save().times(0);

    let patch = UserPatch {
        email: Some("taken@example.com".to_string()),
        ..Default::default()
    };
    let result = service(repo).update_partial(id, patch, "alice").await;

    assert!(matches!(result.unwrap_err(), AppError::EmailConflict));
}

#[tokio::test]
async fn partial_update_missing_user_is_not_found() {
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id().returning(|_| Ok(None));
    repo.expect_save().times(0);

    let result = service(repo)
        .update_partial(Uuid::new_v4(), UserPatch::default(), "alice")
        .await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound));
}

#[tokio::test]
async fn delete_propagates_not_found() {
    let mut repo = MockUserRepo::new();
    repo.expect_delete().returning(|_| Err(AppError::NotFound));

    let result = service(repo).delete(Uuid::new_v4()).await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound));
}

#[tokio::test]
async fn delete_succeeds_for_existing_user() {
    let id = Uuid::new_v4();
    let mut repo = MockUserRepo::new();
    repo.expect_delete().with(eq(id)).returning(|_| Ok(()));

    assert!(service(repo).delete(id).await.is_ok());
}

#[tokio::test]
async fn search_delegates_range_and_pagination_to_repository() {
    let from = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
    let to = NaiveDate::from_ymd_opt(2000, 12, 31).unwrap();

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_birth_date_between()
        .withf(move |f, t, pagination| {
            *f == from && *t == to && pagination.page == 2 && pagination.size == 10
        })
        .returning(|_, _, pagination| {
            Ok(Page {
                items: vec![stored_user(Uuid::new_v4())],
                page: pagination.page,
                size: pagination.size,
                total_elements: 21,
                total_pages: 3,
            })
        });

    let page = service(repo)
        .search_by_birth_date(from, to, PaginationParams::new(2, 10))
        .await
        .unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.page, 2);
    assert_eq!(page.total_elements, 21);
    assert_eq!(page.total_pages, 3);
}
