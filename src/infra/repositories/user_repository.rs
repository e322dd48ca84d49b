//! User repository - persistence seam for the user service.
//!
//! The trait is the interface the service layer depends on; `UserStore`
//! is the SeaORM implementation. The store owns the audit metadata:
//! insert stamps all four audit fields, save preserves `created_*` and
//! re-stamps `updated_*` with the current actor.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use super::entities::user::{ActiveModel, Column, Entity as UserEntity};
use crate::domain::{User, UserDraft};
use crate::errors::{AppError, AppResult};
use crate::types::{Page, PaginationParams};

/// Persistence operations required by the user service.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by id
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Check whether any user holds this email
    async fn exists_by_email(&self, email: &str) -> AppResult<bool>;

    /// Check whether a user other than `id` holds this email
    async fn exists_by_email_excluding(&self, email: &str, id: Uuid) -> AppResult<bool>;

    /// Insert a new user; assigns the id and stamps the audit fields
    async fn insert(&self, draft: UserDraft, actor: &str) -> AppResult<User>;

    /// Persist an updated user; preserves created_*, re-stamps updated_*
    async fn save(&self, user: User, actor: &str) -> AppResult<User>;

    /// Hard-delete a user by id
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Page of users with birth date in [from, to]
    async fn find_by_birth_date_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        pagination: &PaginationParams,
    ) -> AppResult<Page<User>>;
}

/// SeaORM-backed user repository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Map write errors, surfacing unique-index violations as email conflicts.
///
/// The unique index is the authoritative uniqueness guard; two writers can
/// both pass the service-level existence check and race here.
fn map_write_err(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::EmailConflict,
        _ => AppError::from(e),
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let model = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(model.map(User::from))
    }

    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        let count = UserEntity::find()
            .filter(Column::Email.eq(email))
            .count(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(count > 0)
    }

    async fn exists_by_email_excluding(&self, email: &str, id: Uuid) -> AppResult<bool> {
        let count = UserEntity::find()
            .filter(Column::Email.eq(email))
            .filter(Column::Id.ne(id))
            .count(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(count > 0)
    }

    async fn insert(&self, draft: UserDraft, actor: &str) -> AppResult<User> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(draft.email),
            first_name: Set(draft.first_name),
            last_name: Set(draft.last_name),
            birth_date: Set(draft.birth_date),
            address: Set(draft.address),
            phone_number: Set(draft.phone_number),
            created_at: Set(now),
            updated_at: Set(now),
            created_by: Set(actor.to_string()),
            updated_by: Set(actor.to_string()),
        };

        let model = active_model.insert(&self.db).await.map_err(map_write_err)?;

        Ok(User::from(model))
    }

    async fn save(&self, user: User, actor: &str) -> AppResult<User> {
        let active_model = ActiveModel {
            id: Set(user.id),
            email: Set(user.email),
            first_name: Set(user.first_name),
            last_name: Set(user.last_name),
            birth_date: Set(user.birth_date),
            address: Set(user.address),
            phone_number: Set(user.phone_number),
            created_at: Set(user.created_at),
            created_by: Set(user.created_by),
            updated_at: Set(Utc::now()),
            updated_by: Set(actor.to_string()),
        };

        let model = active_model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => AppError::NotFound,
            other => map_write_err(other),
        })?;

        Ok(User::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = UserEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn find_by_birth_date_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        pagination: &PaginationParams,
    ) -> AppResult<Page<User>> {
        let size = pagination.limit();
        let paginator = UserEntity::find()
            .filter(Column::BirthDate.between(from, to))
            .order_by_asc(Column::BirthDate)
            .paginate(&self.db, size);

        let totals = paginator
            .num_items_and_pages()
            .await
            .map_err(AppError::from)?;
        let models = paginator
            .fetch_page(pagination.page)
            .await
            .map_err(AppError::from)?;

        Ok(Page {
            items: models.into_iter().map(User::from).collect(),
            page: pagination.page,
            size,
            total_elements: totals.number_of_items,
            total_pages: totals.number_of_pages,
        })
    }
}
