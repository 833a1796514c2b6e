use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::config::AppConfig;
use crate::entity::assessments::{ActiveModel, Column, Entity as Assessments};
use crate::entity::students::{Column as StudentColumn, Entity as Students};
use crate::entity::subject_assessments::{
    ActiveModel as SubjectAssessmentActiveModel, Column as SubjectAssessmentColumn,
    Entity as SubjectAssessments,
};
use crate::entity::subjects::{Column as SubjectColumn, Entity as Subjects};
use crate::entity::users::Entity as Users;
use crate::errors::{AssessTrackError, Result};
use crate::models::{
    PaginationInfo,
    assessments::{
        entities::{Assessment, AssessmentStatus, SubjectAssessment},
        requests::{ApprovedHistoryQuery, AssessmentListQuery, CreateAssessmentRequest},
        responses::{
            ApprovedHistoryResponse, AssessmentDetailResponse, AssessmentListItem,
            SubjectCommentView,
        },
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 创建评估及其科目评语，初始状态为待审批
    pub async fn create_assessment_impl(
        &self,
        teacher_id: i64,
        req: CreateAssessmentRequest,
    ) -> Result<Assessment> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            student_id: Set(req.student_id),
            teacher_id: Set(teacher_id),
            date: Set(req.date),
            week_number: Set(req.week_number),
            summary: Set(req.summary),
            status: Set(AssessmentStatus::Pending.to_string()),
            headteacher_comment: Set(None),
            assessment_file: Set(req.assessment_file),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("创建评估失败: {e}")))?;

        for (subject_id, comment) in req.subject_comments {
            let link = SubjectAssessmentActiveModel {
                assessment_id: Set(result.id),
                subject_id: Set(subject_id),
                comment: Set(comment),
                ..Default::default()
            };
            link.insert(&self.db).await.map_err(|e| {
                AssessTrackError::database_operation(format!("写入科目评语失败: {e}"))
            })?;
        }

        Ok(result.into_assessment())
    }

    /// 通过 ID 获取评估
    pub async fn get_assessment_by_id_impl(&self, assessment_id: i64) -> Result<Option<Assessment>> {
        let result = Assessments::find_by_id(assessment_id)
            .one(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("查询评估失败: {e}")))?;

        Ok(result.map(|m| m.into_assessment()))
    }

    /// 获取评估详情，附带学生/教师姓名与科目评语
    pub async fn get_assessment_detail_impl(
        &self,
        assessment_id: i64,
    ) -> Result<Option<AssessmentDetailResponse>> {
        let assessment = match self.get_assessment_by_id_impl(assessment_id).await? {
            Some(assessment) => assessment,
            None => return Ok(None),
        };

        let student_name = Students::find_by_id(assessment.student_id)
            .one(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("查询学生失败: {e}")))?
            .map(|s| s.name)
            .unwrap_or_default();

        let teacher_name = Users::find_by_id(assessment.teacher_id)
            .one(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("查询教师失败: {e}")))?
            .map(|u| u.into_user().display_name().to_string())
            .unwrap_or_default();

        let links = SubjectAssessments::find()
            .filter(SubjectAssessmentColumn::AssessmentId.eq(assessment_id))
            .all(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("查询科目评语失败: {e}")))?;

        let subject_ids: Vec<i64> = links.iter().map(|l| l.subject_id).collect();
        let subject_names: HashMap<i64, String> = if subject_ids.is_empty() {
            HashMap::new()
        } else {
            Subjects::find()
                .filter(SubjectColumn::Id.is_in(subject_ids))
                .all(&self.db)
                .await
                .map_err(|e| AssessTrackError::database_operation(format!("查询科目失败: {e}")))?
                .into_iter()
                .map(|s| (s.id, s.name))
                .collect()
        };

        let subject_comments = links
            .into_iter()
            .map(|l| SubjectCommentView {
                subject_id: l.subject_id,
                subject_name: subject_names.get(&l.subject_id).cloned().unwrap_or_default(),
                comment: l.comment,
            })
            .collect();

        Ok(Some(AssessmentDetailResponse {
            assessment,
            student_name,
            teacher_name,
            subject_comments,
        }))
    }

    /// 教师重新提交：更新正文字段并把审批进度重置回待审批
    pub async fn update_assessment_fields_impl(
        &self,
        assessment_id: i64,
        date: &str,
        week_number: i32,
        summary: &str,
    ) -> Result<Option<Assessment>> {
        let existing = self.get_assessment_by_id_impl(assessment_id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            id: Set(assessment_id),
            date: Set(date.to_string()),
            week_number: Set(week_number),
            summary: Set(summary.to_string()),
            status: Set(AssessmentStatus::Pending.to_string()),
            headteacher_comment: Set(None),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("更新评估失败: {e}")))?;

        Ok(Some(result.into_assessment()))
    }

    /// 写入审批结果，状态与校长评语整体覆盖
    pub async fn set_assessment_review_impl(
        &self,
        assessment_id: i64,
        status: AssessmentStatus,
        headteacher_comment: Option<&str>,
    ) -> Result<Option<Assessment>> {
        let existing = self.get_assessment_by_id_impl(assessment_id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            id: Set(assessment_id),
            status: Set(status.to_string()),
            headteacher_comment: Set(headteacher_comment.map(|c| c.to_string())),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("写入审批结果失败: {e}")))?;

        Ok(Some(result.into_assessment()))
    }

    /// 写入或更新单科评语
    ///
    /// 已存在且内容一致时不产生写操作，直接返回现有记录。
    pub async fn upsert_subject_comment_impl(
        &self,
        assessment_id: i64,
        subject_id: i64,
        comment: &str,
    ) -> Result<SubjectAssessment> {
        let existing = SubjectAssessments::find()
            .filter(SubjectAssessmentColumn::AssessmentId.eq(assessment_id))
            .filter(SubjectAssessmentColumn::SubjectId.eq(subject_id))
            .one(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("查询科目评语失败: {e}")))?;

        match existing {
            Some(link) if link.comment == comment => Ok(link.into_subject_assessment()),
            Some(link) => {
                let model = SubjectAssessmentActiveModel {
                    id: Set(link.id),
                    comment: Set(comment.to_string()),
                    ..Default::default()
                };
                let result = model.update(&self.db).await.map_err(|e| {
                    AssessTrackError::database_operation(format!("更新科目评语失败: {e}"))
                })?;
                Ok(result.into_subject_assessment())
            }
            None => {
                let model = SubjectAssessmentActiveModel {
                    assessment_id: Set(assessment_id),
                    subject_id: Set(subject_id),
                    comment: Set(comment.to_string()),
                    ..Default::default()
                };
                let result = model.insert(&self.db).await.map_err(|e| {
                    AssessTrackError::database_operation(format!("写入科目评语失败: {e}"))
                })?;
                Ok(result.into_subject_assessment())
            }
        }
    }

    /// 按条件列出评估，创建时间倒序
    pub async fn list_assessments_impl(
        &self,
        query: AssessmentListQuery,
    ) -> Result<Vec<Assessment>> {
        let mut select = Assessments::find();

        if let Some(ref status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        if let Some(student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }

        if let Some(teacher_id) = query.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }

        let assessments = select
            .order_by_desc(Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("查询评估列表失败: {e}")))?;

        Ok(assessments.into_iter().map(|m| m.into_assessment()).collect())
    }

    /// 某学生的历史评估，按周次倒序
    pub async fn list_assessments_by_student_impl(
        &self,
        student_id: i64,
    ) -> Result<Vec<Assessment>> {
        let assessments = Assessments::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_desc(Column::WeekNumber)
            .all(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("查询历史评估失败: {e}")))?;

        Ok(assessments.into_iter().map(|m| m.into_assessment()).collect())
    }

    /// 分页列出已审批通过的评估，创建时间倒序
    pub async fn list_approved_with_pagination_impl(
        &self,
        query: ApprovedHistoryQuery,
    ) -> Result<ApprovedHistoryResponse> {
        let config = AppConfig::get();
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query
            .size
            .unwrap_or(config.review.history_page_size)
            .clamp(1, 100) as u64;

        let select = Assessments::find()
            .filter(Column::Status.eq(AssessmentStatus::Approved.to_string()))
            .order_by_desc(Column::CreatedAt);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("查询审批历史总数失败: {e}")))?;

        let assessments = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("查询审批历史失败: {e}")))?;

        let items = self.attach_student_names(assessments).await?;

        Ok(ApprovedHistoryResponse {
            items,
            pagination: PaginationInfo::new(page as i64, size as i64, total as i64),
        })
    }

    /// 给评估模型补上学生姓名
    async fn attach_student_names(
        &self,
        assessments: Vec<crate::entity::assessments::Model>,
    ) -> Result<Vec<AssessmentListItem>> {
        let student_ids: Vec<i64> = assessments.iter().map(|a| a.student_id).collect();
        let student_names: HashMap<i64, String> = if student_ids.is_empty() {
            HashMap::new()
        } else {
            Students::find()
                .filter(StudentColumn::Id.is_in(student_ids))
                .all(&self.db)
                .await
                .map_err(|e| AssessTrackError::database_operation(format!("查询学生失败: {e}")))?
                .into_iter()
                .map(|s| (s.id, s.name))
                .collect()
        };

        Ok(assessments
            .into_iter()
            .map(|m| {
                let student_name = student_names
                    .get(&m.student_id)
                    .cloned()
                    .unwrap_or_default();
                AssessmentListItem {
                    assessment: m.into_assessment(),
                    student_name,
                }
            })
            .collect())
    }
}
