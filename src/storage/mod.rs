use std::sync::Arc;

use crate::models::{
    assessments::{
        entities::{Assessment, AssessmentStatus, SubjectAssessment},
        requests::{ApprovedHistoryQuery, AssessmentListQuery, CreateAssessmentRequest},
        responses::{ApprovedHistoryResponse, AssessmentDetailResponse},
    },
    classes::{
        entities::Class,
        requests::{ClassListQuery, CreateClassRequest, UpdateClassRequest},
        responses::ClassListResponse,
    },
    notifications::{entities::Notification, requests::CreateNotificationRequest},
    students::{
        entities::Student,
        requests::{CreateStudentRequest, StudentListQuery, UpdateStudentRequest},
        responses::StudentListResponse,
    },
    subjects::{
        entities::Subject,
        requests::{CreateSubjectRequest, UpdateSubjectRequest},
    },
    users::{
        entities::{ArchivedUser, User, UserRole},
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::{ArchivedUserListResponse, SystemStatisticsResponse, UserListResponse},
    },
};

use crate::errors::Result;

#[cfg(test)]
pub mod memory;
pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名获取用户信息
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    // 列出用户
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 按角色列出用户（通知分发使用）
    async fn list_users_by_role(&self, role: UserRole) -> Result<Vec<User>>;
    // 更新用户信息
    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>>;
    // 修改用户密码
    async fn update_user_password(&self, id: i64, password_hash: &str) -> Result<bool>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 归档并删除用户
    async fn archive_and_delete_user(&self, id: i64) -> Result<Option<ArchivedUser>>;
    // 列出归档用户
    async fn list_archived_users(&self) -> Result<ArchivedUserListResponse>;
    // 通过ID获取归档用户
    async fn get_archived_user_by_id(&self, archived_id: i64) -> Result<Option<ArchivedUser>>;
    // 恢复归档用户
    async fn restore_archived_user(&self, archived_id: i64) -> Result<Option<User>>;
    // 系统统计（用户数 / 评估数 / 待审批数）
    async fn system_statistics(&self) -> Result<SystemStatisticsResponse>;

    /// 班级管理方法
    // 创建班级（附带科目关联）
    async fn create_class(&self, class: CreateClassRequest) -> Result<Class>;
    // 通过ID获取班级信息
    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>>;
    // 列出班级
    async fn list_classes_with_pagination(
        &self,
        query: ClassListQuery,
    ) -> Result<ClassListResponse>;
    // 更新班级信息（科目列表为整体替换语义）
    async fn update_class(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>>;
    // 删除班级
    async fn delete_class(&self, class_id: i64) -> Result<bool>;
    // 获取班级关联的科目
    async fn get_class_subjects(&self, class_id: i64) -> Result<Vec<Subject>>;

    /// 科目管理方法
    async fn create_subject(&self, subject: CreateSubjectRequest) -> Result<Subject>;
    async fn list_subjects(&self) -> Result<Vec<Subject>>;
    async fn update_subject(
        &self,
        subject_id: i64,
        update: UpdateSubjectRequest,
    ) -> Result<Option<Subject>>;
    async fn delete_subject(&self, subject_id: i64) -> Result<bool>;

    /// 学生管理方法
    async fn create_student(&self, student: CreateStudentRequest) -> Result<Student>;
    async fn get_student_by_id(&self, student_id: i64) -> Result<Option<Student>>;
    async fn list_students_with_pagination(
        &self,
        query: StudentListQuery,
    ) -> Result<StudentListResponse>;
    async fn update_student(
        &self,
        student_id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>>;
    async fn delete_student(&self, student_id: i64) -> Result<bool>;

    /// 评估管理方法
    // 创建评估及科目评语
    async fn create_assessment(
        &self,
        teacher_id: i64,
        request: CreateAssessmentRequest,
    ) -> Result<Assessment>;
    // 通过ID获取评估
    async fn get_assessment_by_id(&self, assessment_id: i64) -> Result<Option<Assessment>>;
    // 获取评估详情（学生/教师姓名与科目评语）
    async fn get_assessment_detail(
        &self,
        assessment_id: i64,
    ) -> Result<Option<AssessmentDetailResponse>>;
    // 更新评估正文字段并重置审批状态
    async fn update_assessment_fields(
        &self,
        assessment_id: i64,
        date: &str,
        week_number: i32,
        summary: &str,
    ) -> Result<Option<Assessment>>;
    // 写入审批结果（状态与评语整体覆盖）
    async fn set_assessment_review(
        &self,
        assessment_id: i64,
        status: AssessmentStatus,
        headteacher_comment: Option<&str>,
    ) -> Result<Option<Assessment>>;
    // 写入或更新单科评语，内容未变化时不产生写操作
    async fn upsert_subject_comment(
        &self,
        assessment_id: i64,
        subject_id: i64,
        comment: &str,
    ) -> Result<SubjectAssessment>;
    // 列出评估（按创建时间倒序）
    async fn list_assessments(&self, query: AssessmentListQuery) -> Result<Vec<Assessment>>;
    // 列出某学生的历史评估（按周次倒序）
    async fn list_assessments_by_student(&self, student_id: i64) -> Result<Vec<Assessment>>;
    // 分页列出已审批通过的评估
    async fn list_approved_with_pagination(
        &self,
        query: ApprovedHistoryQuery,
    ) -> Result<ApprovedHistoryResponse>;

    /// 通知管理方法
    // 创建通知
    async fn create_notification(&self, request: CreateNotificationRequest)
    -> Result<Notification>;
    // 通过ID获取通知
    async fn get_notification_by_id(&self, notification_id: i64) -> Result<Option<Notification>>;
    // 列出某组用户收到的通知（共享收件箱），按创建时间倒序
    async fn list_notifications_for_users(&self, user_ids: &[i64]) -> Result<Vec<Notification>>;
    // 标记单条通知为已读
    async fn mark_notification_read(&self, notification_id: i64) -> Result<bool>;
    // 标记某组用户的全部通知为已读，返回实际更新条数
    async fn mark_all_notifications_read(&self, user_ids: &[i64]) -> Result<i64>;
    // 删除通知
    async fn delete_notification(&self, notification_id: i64) -> Result<bool>;
    // 统计未读通知数
    async fn count_unread_notifications(&self, user_ids: &[i64]) -> Result<i64>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
