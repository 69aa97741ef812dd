//! User records.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

use crate::entities::users;
use crate::error::AppError;
use crate::logging::pii::Redacted;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Fields accepted when creating a user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub age: i32,
}

pub async fn create_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    new_user: NewUser,
) -> Result<User, AppError> {
    let now = OffsetDateTime::now_utc();
    let email = new_user.email.clone();
    let active = users::ActiveModel {
        id: NotSet,
        name: Set(new_user.name),
        email: Set(new_user.email),
        age: Set(new_user.age),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    };

    let model = active
        .insert(conn)
        .await
        .map_err(|e| AppError::db(format!("Failed to create user: {e}")))?;
    debug!(user_id = model.id, email = %Redacted(&email), "user created");
    Ok(User::from(model))
}

/// Look up a live (not soft-deleted) user.
pub async fn find_user_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<Option<User>, AppError> {
    let model = users::Entity::find_by_id(user_id)
        .filter(users::Column::DeletedAt.is_null())
        .one(conn)
        .await?;
    Ok(model.map(User::from))
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            age: model.age,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
