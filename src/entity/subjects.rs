//! 科目实体

use sea_orm::entity::prelude::*;

use crate::models::subjects::entities::Subject;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "subjects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::class_subjects::Entity")]
    ClassSubjects,
    #[sea_orm(has_many = "super::subject_assessments::Entity")]
    SubjectAssessments,
}

impl Related<super::class_subjects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassSubjects.def()
    }
}

impl Related<super::subject_assessments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubjectAssessments.def()
    }
}

impl Related<super::classes::Entity> for Entity {
    fn to() -> RelationDef {
        super::class_subjects::Relation::Class.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::class_subjects::Relation::Subject.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_subject(self) -> Subject {
        Subject {
            id: self.id,
            name: self.name,
        }
    }
}
