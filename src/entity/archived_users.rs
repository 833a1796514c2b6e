//! 归档用户实体

use sea_orm::entity::prelude::*;
use std::str::FromStr;

use crate::models::users::entities::{ArchivedUser, UserRole};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "archived_users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub username: String,
    #[sea_orm(nullable)]
    pub full_name: Option<String>,
    pub role: String,
    pub password_hash: String,
    pub archived_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_archived_user(self) -> ArchivedUser {
        ArchivedUser {
            id: self.id,
            username: self.username,
            full_name: self.full_name,
            role: UserRole::from_str(&self.role).unwrap_or(UserRole::Teacher),
            password_hash: self.password_hash,
            archived_at: chrono::DateTime::from_timestamp(self.archived_at, 0).unwrap_or_default(),
        }
    }
}
