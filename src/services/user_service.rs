//! User service - Handles user-related business logic.
//!
//! Enforces the email-uniqueness and existence invariants and applies the
//! partial-update field merge before anything reaches the store. The
//! existence check for an email happens before the write; the store's
//! unique index remains the authoritative guard for the race window
//! between check and write.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{User, UserDraft, UserPatch};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UserRepository;
use crate::types::{Page, PaginationParams};

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Create a new user; fails with EmailConflict if the email is taken
    async fn create(&self, draft: UserDraft, actor: &str) -> AppResult<User>;

    /// Replace all fields of an existing user
    async fn update(&self, id: Uuid, draft: UserDraft, actor: &str) -> AppResult<User>;

    /// Merge supplied fields onto an existing user
    async fn update_partial(&self, id: Uuid, patch: UserPatch, actor: &str) -> AppResult<User>;

    /// Permanently delete a user
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Page of users with birth date in [from, to]
    async fn search_by_birth_date(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        pagination: PaginationParams,
    ) -> AppResult<Page<User>>;
}

/// Concrete implementation of UserService over the repository seam.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
}

impl UserManager {
    /// Create new user service instance
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn create(&self, draft: UserDraft, actor: &str) -> AppResult<User> {
        if self.repo.exists_by_email(&draft.email).await? {
            return Err(AppError::EmailConflict);
        }

        // The draft carries no id; the store assigns one on insert.
        self.repo.insert(draft, actor).await
    }

    async fn update(&self, id: Uuid, draft: UserDraft, actor: &str) -> AppResult<User> {
        let existing = self.repo.find_by_id(id).await?.ok_or_not_found()?;

        if self
            .repo
            .exists_by_email_excluding(&draft.email, id)
            .await?
        {
            return Err(AppError::EmailConflict);
        }

        self.repo.save(existing.apply_draft(draft), actor).await
    }

    async fn update_partial(&self, id: Uuid, patch: UserPatch, actor: &str) -> AppResult<User> {
        let existing = self.repo.find_by_id(id).await?.ok_or_not_found()?;

        // Only an email the merge would actually write can conflict;
        // absent or empty-string emails leave the stored one in place.
        if let Some(email) = patch.email_change() {
            if self.repo.exists_by_email_excluding(email, id).await? {
                return Err(AppError::EmailConflict);
            }
        }

        self.repo.save(existing.apply_patch(patch), actor).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repo.delete(id).await
    }

    async fn search_by_birth_date(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        pagination: PaginationParams,
    ) -> AppResult<Page<User>> {
        self.repo
            .find_by_birth_date_between(from, to, &pagination)
            .await
    }
}
