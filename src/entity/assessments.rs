//! 评估实体

use sea_orm::entity::prelude::*;
use std::str::FromStr;

use crate::models::assessments::entities::{Assessment, AssessmentStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assessments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub teacher_id: i64,
    pub date: String,
    pub week_number: i32,
    #[sea_orm(column_type = "Text")]
    pub summary: String,
    pub status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub headteacher_comment: Option<String>,
    #[sea_orm(nullable)]
    pub assessment_file: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::students::Entity",
        from = "Column::StudentId",
        to = "super::students::Column::Id"
    )]
    Student,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::TeacherId",
        to = "super::users::Column::Id"
    )]
    Teacher,
    #[sea_orm(has_many = "super::subject_assessments::Entity")]
    SubjectAssessments,
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teacher.def()
    }
}

impl Related<super::subject_assessments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubjectAssessments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 转换为业务实体；状态列只会持久化三个合法值，兜底 pending
    pub fn into_assessment(self) -> Assessment {
        Assessment {
            id: self.id,
            student_id: self.student_id,
            teacher_id: self.teacher_id,
            date: self.date,
            week_number: self.week_number,
            summary: self.summary,
            status: AssessmentStatus::from_str(&self.status).unwrap_or(AssessmentStatus::Pending),
            headteacher_comment: self.headteacher_comment,
            assessment_file: self.assessment_file,
            created_at: chrono::DateTime::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: chrono::DateTime::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
