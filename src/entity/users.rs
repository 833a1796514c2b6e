//! 用户实体

use sea_orm::entity::prelude::*;
use std::str::FromStr;

use crate::models::users::entities::{User, UserRole, UserStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub status: String,
    #[sea_orm(nullable)]
    pub full_name: Option<String>,
    #[sea_orm(nullable)]
    pub profile_photo: Option<String>,
    #[sea_orm(nullable)]
    pub last_login: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::classes::Entity")]
    Classes,
    #[sea_orm(has_many = "super::assessments::Entity")]
    Assessments,
    #[sea_orm(has_many = "super::notifications::Entity")]
    Notifications,
}

impl Related<super::classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Classes.def()
    }
}

impl Related<super::assessments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assessments.def()
    }
}

impl Related<super::notifications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 转换为业务实体；库中的非法角色/状态按 teacher/active 兜底
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            password_hash: self.password_hash,
            role: UserRole::from_str(&self.role).unwrap_or(UserRole::Teacher),
            status: UserStatus::from_str(&self.status).unwrap_or(UserStatus::Active),
            full_name: self.full_name,
            profile_photo: self.profile_photo,
            last_login: self
                .last_login
                .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0)),
            created_at: chrono::DateTime::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: chrono::DateTime::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
