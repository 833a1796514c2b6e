//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod assessments;
mod classes;
mod notifications;
mod students;
mod subjects;
mod users;

use crate::config::AppConfig;
use crate::errors::{AssessTrackError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| AssessTrackError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| AssessTrackError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| AssessTrackError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(AssessTrackError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn list_users_by_role(&self, role: UserRole) -> Result<Vec<User>> {
        self.list_users_by_role_impl(role).await
    }

    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn update_user_password(&self, id: i64, password_hash: &str) -> Result<bool> {
        self.update_user_password_impl(id, password_hash).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn archive_and_delete_user(&self, id: i64) -> Result<Option<ArchivedUser>> {
        self.archive_and_delete_user_impl(id).await
    }

    async fn list_archived_users(&self) -> Result<ArchivedUserListResponse> {
        self.list_archived_users_impl().await
    }

    async fn get_archived_user_by_id(&self, archived_id: i64) -> Result<Option<ArchivedUser>> {
        self.get_archived_user_by_id_impl(archived_id).await
    }

    async fn restore_archived_user(&self, archived_id: i64) -> Result<Option<User>> {
        self.restore_archived_user_impl(archived_id).await
    }

    async fn system_statistics(&self) -> Result<SystemStatisticsResponse> {
        self.system_statistics_impl().await
    }

    // 班级模块
    async fn create_class(&self, class: CreateClassRequest) -> Result<Class> {
        self.create_class_impl(class).await
    }

    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>> {
        self.get_class_by_id_impl(class_id).await
    }

    async fn list_classes_with_pagination(
        &self,
        query: ClassListQuery,
    ) -> Result<ClassListResponse> {
        self.list_classes_with_pagination_impl(query).await
    }

    async fn update_class(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>> {
        self.update_class_impl(class_id, update).await
    }

    async fn delete_class(&self, class_id: i64) -> Result<bool> {
        self.delete_class_impl(class_id).await
    }

    async fn get_class_subjects(&self, class_id: i64) -> Result<Vec<Subject>> {
        self.get_class_subjects_impl(class_id).await
    }

    // 科目模块
    async fn create_subject(&self, subject: CreateSubjectRequest) -> Result<Subject> {
        self.create_subject_impl(subject).await
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>> {
        self.list_subjects_impl().await
    }

    async fn update_subject(
        &self,
        subject_id: i64,
        update: UpdateSubjectRequest,
    ) -> Result<Option<Subject>> {
        self.update_subject_impl(subject_id, update).await
    }

    async fn delete_subject(&self, subject_id: i64) -> Result<bool> {
        self.delete_subject_impl(subject_id).await
    }

    // 学生模块
    async fn create_student(&self, student: CreateStudentRequest) -> Result<Student> {
        self.create_student_impl(student).await
    }

    async fn get_student_by_id(&self, student_id: i64) -> Result<Option<Student>> {
        self.get_student_by_id_impl(student_id).await
    }

    async fn list_students_with_pagination(
        &self,
        query: StudentListQuery,
    ) -> Result<StudentListResponse> {
        self.list_students_with_pagination_impl(query).await
    }

    async fn update_student(
        &self,
        student_id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>> {
        self.update_student_impl(student_id, update).await
    }

    async fn delete_student(&self, student_id: i64) -> Result<bool> {
        self.delete_student_impl(student_id).await
    }

    // 评估模块
    async fn create_assessment(
        &self,
        teacher_id: i64,
        request: CreateAssessmentRequest,
    ) -> Result<Assessment> {
        self.create_assessment_impl(teacher_id, request).await
    }

    async fn get_assessment_by_id(&self, assessment_id: i64) -> Result<Option<Assessment>> {
        self.get_assessment_by_id_impl(assessment_id).await
    }

    async fn get_assessment_detail(
        &self,
        assessment_id: i64,
    ) -> Result<Option<AssessmentDetailResponse>> {
        self.get_assessment_detail_impl(assessment_id).await
    }

    async fn update_assessment_fields(
        &self,
        assessment_id: i64,
        date: &str,
        week_number: i32,
        summary: &str,
    ) -> Result<Option<Assessment>> {
        self.update_assessment_fields_impl(assessment_id, date, week_number, summary)
            .await
    }

    async fn set_assessment_review(
        &self,
        assessment_id: i64,
        status: AssessmentStatus,
        headteacher_comment: Option<&str>,
    ) -> Result<Option<Assessment>> {
        self.set_assessment_review_impl(assessment_id, status, headteacher_comment)
            .await
    }

    async fn upsert_subject_comment(
        &self,
        assessment_id: i64,
        subject_id: i64,
        comment: &str,
    ) -> Result<SubjectAssessment> {
        self.upsert_subject_comment_impl(assessment_id, subject_id, comment)
            .await
    }

    async fn list_assessments(&self, query: AssessmentListQuery) -> Result<Vec<Assessment>> {
        self.list_assessments_impl(query).await
    }

    async fn list_assessments_by_student(&self, student_id: i64) -> Result<Vec<Assessment>> {
        self.list_assessments_by_student_impl(student_id).await
    }

    async fn list_approved_with_pagination(
        &self,
        query: ApprovedHistoryQuery,
    ) -> Result<ApprovedHistoryResponse> {
        self.list_approved_with_pagination_impl(query).await
    }

    // 通知模块
    async fn create_notification(
        &self,
        request: CreateNotificationRequest,
    ) -> Result<Notification> {
        self.create_notification_impl(request).await
    }

    async fn get_notification_by_id(&self, notification_id: i64) -> Result<Option<Notification>> {
        self.get_notification_by_id_impl(notification_id).await
    }

    async fn list_notifications_for_users(&self, user_ids: &[i64]) -> Result<Vec<Notification>> {
        self.list_notifications_for_users_impl(user_ids).await
    }

    async fn mark_notification_read(&self, notification_id: i64) -> Result<bool> {
        self.mark_notification_read_impl(notification_id).await
    }

    async fn mark_all_notifications_read(&self, user_ids: &[i64]) -> Result<i64> {
        self.mark_all_notifications_read_impl(user_ids).await
    }

    async fn delete_notification(&self, notification_id: i64) -> Result<bool> {
        self.delete_notification_impl(notification_id).await
    }

    async fn count_unread_notifications(&self, user_ids: &[i64]) -> Result<i64> {
        self.count_unread_notifications_impl(user_ids).await
    }
}
