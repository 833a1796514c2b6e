//! 测试用内存存储
//!
//! 以 Mutex 包裹的内存状态实现 Storage，供业务层单测在不连数据库的
//! 情况下验证生命周期与通知分发行为。辅助构造函数只填关键字段。

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

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
    classes::{
        entities::Class,
        requests::{ClassListQuery, CreateClassRequest, UpdateClassRequest},
        responses::ClassListResponse,
    },
    notifications::{
        entities::{Notification, NotificationType},
        requests::CreateNotificationRequest,
    },
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
        entities::{ArchivedUser, User, UserRole, UserStatus},
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::{ArchivedUserListResponse, SystemStatisticsResponse, UserListResponse},
    },
};
use crate::storage::Storage;

#[derive(Default)]
struct State {
    users: Vec<User>,
    archived_users: Vec<ArchivedUser>,
    classes: Vec<Class>,
    class_subjects: HashMap<i64, Vec<Subject>>,
    subjects: Vec<Subject>,
    students: Vec<Student>,
    assessments: Vec<Assessment>,
    subject_comments: Vec<SubjectAssessment>,
    notifications: Vec<Notification>,
    next_id: i64,
    fail_notifications: bool,
}

#[derive(Default)]
pub struct MemoryStorage {
    state: Mutex<State>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(state: &mut State) -> i64 {
        state.next_id += 1;
        state.next_id + 1000
    }

    pub fn add_user(&self, user: User) {
        self.state.lock().unwrap().users.push(user);
    }

    pub fn add_archived_user(&self, archived: ArchivedUser) {
        self.state.lock().unwrap().archived_users.push(archived);
    }

    pub fn add_student(&self, student: Student) {
        self.state.lock().unwrap().students.push(student);
    }

    pub fn set_class_subjects(&self, class_id: i64, subjects: Vec<Subject>) {
        self.state
            .lock()
            .unwrap()
            .class_subjects
            .insert(class_id, subjects);
    }

    pub fn add_assessment(&self, assessment: Assessment) {
        self.state.lock().unwrap().assessments.push(assessment);
    }

    pub fn add_notification(&self, notification: Notification) {
        self.state.lock().unwrap().notifications.push(notification);
    }

    /// 让后续的通知写入全部失败，用于验证降级成功路径
    pub fn fail_notifications(&self) {
        self.state.lock().unwrap().fail_notifications = true;
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.state.lock().unwrap().notifications.clone()
    }

    pub fn assessments(&self) -> Vec<Assessment> {
        self.state.lock().unwrap().assessments.clone()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        let created = User {
            id,
            username: user.username,
            password_hash: user.password,
            role: user.role,
            status: UserStatus::Active,
            full_name: user.full_name,
            profile_photo: None,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        state.users.push(created.clone());
        Ok(created)
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list_users_with_pagination(&self, _query: UserListQuery) -> Result<UserListResponse> {
        let users = self.state.lock().unwrap().users.clone();
        let total = users.len() as i64;
        Ok(UserListResponse {
            items: users,
            pagination: PaginationInfo::new(1, total.max(1), total),
        })
    }

    async fn list_users_by_role(&self, role: UserRole) -> Result<Vec<User>> {
        let mut users: Vec<User> = self
            .state
            .lock()
            .unwrap()
            .users
            .iter()
            .filter(|u| u.role == role && u.status == UserStatus::Active)
            .cloned()
            .collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>> {
        let mut state = self.state.lock().unwrap();
        let Some(user) = state.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(username) = update.username {
            user.username = username;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(status) = update.status {
            user.status = status;
        }
        if let Some(full_name) = update.full_name {
            user.full_name = Some(full_name);
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn update_user_password(&self, id: i64, password_hash: &str) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        match state.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        match state.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.last_login = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn archive_and_delete_user(&self, id: i64) -> Result<Option<ArchivedUser>> {
        let mut state = self.state.lock().unwrap();
        let Some(pos) = state.users.iter().position(|u| u.id == id) else {
            return Ok(None);
        };
        let user = state.users.remove(pos);
        let archived_id = Self::next_id(&mut state);
        let archived = ArchivedUser {
            id: archived_id,
            username: user.username,
            full_name: user.full_name,
            role: user.role,
            password_hash: user.password_hash,
            archived_at: Utc::now(),
        };
        state.archived_users.push(archived.clone());
        Ok(Some(archived))
    }

    async fn list_archived_users(&self) -> Result<ArchivedUserListResponse> {
        Ok(ArchivedUserListResponse {
            items: self.state.lock().unwrap().archived_users.clone(),
        })
    }

    async fn get_archived_user_by_id(&self, archived_id: i64) -> Result<Option<ArchivedUser>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .archived_users
            .iter()
            .find(|a| a.id == archived_id)
            .cloned())
    }

    async fn restore_archived_user(&self, archived_id: i64) -> Result<Option<User>> {
        let mut state = self.state.lock().unwrap();
        let Some(pos) = state
            .archived_users
            .iter()
            .position(|a| a.id == archived_id)
        else {
            return Ok(None);
        };
        let archived = state.archived_users.remove(pos);
        let id = Self::next_id(&mut state);
        let user = User {
            id,
            username: archived.username,
            password_hash: archived.password_hash,
            role: archived.role,
            status: UserStatus::Active,
            full_name: archived.full_name,
            profile_photo: None,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        state.users.push(user.clone());
        Ok(Some(user))
    }

    async fn system_statistics(&self) -> Result<SystemStatisticsResponse> {
        let state = self.state.lock().unwrap();
        Ok(SystemStatisticsResponse {
            total_users: state.users.len() as i64,
            total_assessments: state.assessments.len() as i64,
            pending_reviews: state
                .assessments
                .iter()
                .filter(|a| a.status == AssessmentStatus::Pending)
                .count() as i64,
        })
    }

    async fn create_class(&self, class: CreateClassRequest) -> Result<Class> {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        let created = Class {
            id,
            name: class.name,
            teacher_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        state.classes.push(created.clone());
        let linked: Vec<Subject> = state
            .subjects
            .iter()
            .filter(|s| class.subject_ids.contains(&s.id))
            .cloned()
            .collect();
        state.class_subjects.insert(id, linked);
        Ok(created)
    }

    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .classes
            .iter()
            .find(|c| c.id == class_id)
            .cloned())
    }

    async fn list_classes_with_pagination(
        &self,
        _query: ClassListQuery,
    ) -> Result<ClassListResponse> {
        let classes = self.state.lock().unwrap().classes.clone();
        let total = classes.len() as i64;
        Ok(ClassListResponse {
            items: classes,
            pagination: PaginationInfo::new(1, total.max(1), total),
        })
    }

    async fn update_class(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>> {
        let mut state = self.state.lock().unwrap();
        let Some(class) = state.classes.iter_mut().find(|c| c.id == class_id) else {
            return Ok(None);
        };
        if let Some(name) = update.name {
            class.name = name;
        }
        if let Some(teacher_id) = update.teacher_id {
            class.teacher_id = Some(teacher_id);
        }
        Ok(Some(class.clone()))
    }

    async fn delete_class(&self, class_id: i64) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.classes.len();
        state.classes.retain(|c| c.id != class_id);
        Ok(state.classes.len() < before)
    }

    async fn get_class_subjects(&self, class_id: i64) -> Result<Vec<Subject>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .class_subjects
            .get(&class_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_subject(&self, subject: CreateSubjectRequest) -> Result<Subject> {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        let created = Subject {
            id,
            name: subject.name,
        };
        state.subjects.push(created.clone());
        Ok(created)
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>> {
        Ok(self.state.lock().unwrap().subjects.clone())
    }

    async fn update_subject(
        &self,
        subject_id: i64,
        update: UpdateSubjectRequest,
    ) -> Result<Option<Subject>> {
        let mut state = self.state.lock().unwrap();
        let Some(subject) = state.subjects.iter_mut().find(|s| s.id == subject_id) else {
            return Ok(None);
        };
        subject.name = update.name;
        Ok(Some(subject.clone()))
    }

    async fn delete_subject(&self, subject_id: i64) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.subjects.len();
        state.subjects.retain(|s| s.id != subject_id);
        Ok(state.subjects.len() < before)
    }

    async fn create_student(&self, student: CreateStudentRequest) -> Result<Student> {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        let created = Student {
            id,
            name: student.name,
            class_id: student.class_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        state.students.push(created.clone());
        Ok(created)
    }

    async fn get_student_by_id(&self, student_id: i64) -> Result<Option<Student>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .students
            .iter()
            .find(|s| s.id == student_id)
            .cloned())
    }

    async fn list_students_with_pagination(
        &self,
        _query: StudentListQuery,
    ) -> Result<StudentListResponse> {
        let students = self.state.lock().unwrap().students.clone();
        let total = students.len() as i64;
        Ok(StudentListResponse {
            items: students,
            pagination: PaginationInfo::new(1, total.max(1), total),
        })
    }

    async fn update_student(
        &self,
        student_id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>> {
        let mut state = self.state.lock().unwrap();
        let Some(student) = state.students.iter_mut().find(|s| s.id == student_id) else {
            return Ok(None);
        };
        if let Some(name) = update.name {
            student.name = name;
        }
        if let Some(class_id) = update.class_id {
            student.class_id = class_id;
        }
        Ok(Some(student.clone()))
    }

    async fn delete_student(&self, student_id: i64) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.students.len();
        state.students.retain(|s| s.id != student_id);
        Ok(state.students.len() < before)
    }

    async fn create_assessment(
        &self,
        teacher_id: i64,
        request: CreateAssessmentRequest,
    ) -> Result<Assessment> {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        let assessment = Assessment {
            id,
            student_id: request.student_id,
            teacher_id,
            date: request.date,
            week_number: request.week_number,
            summary: request.summary,
            status: AssessmentStatus::Pending,
            headteacher_comment: None,
            assessment_file: request.assessment_file,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        state.assessments.push(assessment.clone());
        for (subject_id, comment) in request.subject_comments {
            let comment_id = Self::next_id(&mut state);
            state.subject_comments.push(SubjectAssessment {
                id: comment_id,
                assessment_id: id,
                subject_id,
                comment,
            });
        }
        Ok(assessment)
    }

    async fn get_assessment_by_id(&self, assessment_id: i64) -> Result<Option<Assessment>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .assessments
            .iter()
            .find(|a| a.id == assessment_id)
            .cloned())
    }

    async fn get_assessment_detail(
        &self,
        assessment_id: i64,
    ) -> Result<Option<AssessmentDetailResponse>> {
        let state = self.state.lock().unwrap();
        let Some(assessment) = state
            .assessments
            .iter()
            .find(|a| a.id == assessment_id)
            .cloned()
        else {
            return Ok(None);
        };
        let student_name = state
            .students
            .iter()
            .find(|s| s.id == assessment.student_id)
            .map(|s| s.name.clone())
            .unwrap_or_default();
        let teacher_name = state
            .users
            .iter()
            .find(|u| u.id == assessment.teacher_id)
            .map(|u| u.display_name().to_string())
            .unwrap_or_default();
        let subject_comments = state
            .subject_comments
            .iter()
            .filter(|c| c.assessment_id == assessment_id)
            .map(|c| SubjectCommentView {
                subject_id: c.subject_id,
                subject_name: state
                    .subjects
                    .iter()
                    .find(|s| s.id == c.subject_id)
                    .map(|s| s.name.clone())
                    .unwrap_or_default(),
                comment: c.comment.clone(),
            })
            .collect();
        Ok(Some(AssessmentDetailResponse {
            assessment,
            student_name,
            teacher_name,
            subject_comments,
        }))
    }

    async fn update_assessment_fields(
        &self,
        assessment_id: i64,
        date: &str,
        week_number: i32,
        summary: &str,
    ) -> Result<Option<Assessment>> {
        let mut state = self.state.lock().unwrap();
        let Some(assessment) = state.assessments.iter_mut().find(|a| a.id == assessment_id)
        else {
            return Ok(None);
        };
        assessment.date = date.to_string();
        assessment.week_number = week_number;
        assessment.summary = summary.to_string();
        assessment.status = AssessmentStatus::Pending;
        assessment.headteacher_comment = None;
        assessment.updated_at = Utc::now();
        Ok(Some(assessment.clone()))
    }

    async fn set_assessment_review(
        &self,
        assessment_id: i64,
        status: AssessmentStatus,
        headteacher_comment: Option<&str>,
    ) -> Result<Option<Assessment>> {
        let mut state = self.state.lock().unwrap();
        let Some(assessment) = state.assessments.iter_mut().find(|a| a.id == assessment_id)
        else {
            return Ok(None);
        };
        assessment.status = status;
        assessment.headteacher_comment = headteacher_comment.map(|c| c.to_string());
        assessment.updated_at = Utc::now();
        Ok(Some(assessment.clone()))
    }

    async fn upsert_subject_comment(
        &self,
        assessment_id: i64,
        subject_id: i64,
        comment: &str,
    ) -> Result<SubjectAssessment> {
        let mut state = self.state.lock().unwrap();
        if let Some(existing) = state
            .subject_comments
            .iter_mut()
            .find(|c| c.assessment_id == assessment_id && c.subject_id == subject_id)
        {
            if existing.comment != comment {
                existing.comment = comment.to_string();
            }
            return Ok(existing.clone());
        }
        let id = Self::next_id(&mut state);
        let created = SubjectAssessment {
            id,
            assessment_id,
            subject_id,
            comment: comment.to_string(),
        };
        state.subject_comments.push(created.clone());
        Ok(created)
    }

    async fn list_assessments(&self, query: AssessmentListQuery) -> Result<Vec<Assessment>> {
        let state = self.state.lock().unwrap();
        let mut assessments: Vec<Assessment> = state
            .assessments
            .iter()
            .filter(|a| query.status.is_none_or(|s| a.status == s))
            .filter(|a| query.student_id.is_none_or(|id| a.student_id == id))
            .filter(|a| query.teacher_id.is_none_or(|id| a.teacher_id == id))
            .cloned()
            .collect();
        assessments.sort_by_key(|a| std::cmp::Reverse(a.id));
        Ok(assessments)
    }

    async fn list_assessments_by_student(&self, student_id: i64) -> Result<Vec<Assessment>> {
        let state = self.state.lock().unwrap();
        let mut assessments: Vec<Assessment> = state
            .assessments
            .iter()
            .filter(|a| a.student_id == student_id)
            .cloned()
            .collect();
        assessments.sort_by_key(|a| std::cmp::Reverse(a.week_number));
        Ok(assessments)
    }

    async fn list_approved_with_pagination(
        &self,
        _query: ApprovedHistoryQuery,
    ) -> Result<ApprovedHistoryResponse> {
        let state = self.state.lock().unwrap();
        let items: Vec<AssessmentListItem> = state
            .assessments
            .iter()
            .filter(|a| a.status == AssessmentStatus::Approved)
            .map(|a| AssessmentListItem {
                student_name: state
                    .students
                    .iter()
                    .find(|s| s.id == a.student_id)
                    .map(|s| s.name.clone())
                    .unwrap_or_default(),
                assessment: a.clone(),
            })
            .collect();
        let total = items.len() as i64;
        Ok(ApprovedHistoryResponse {
            items,
            pagination: PaginationInfo::new(1, total.max(1), total),
        })
    }

    async fn create_notification(
        &self,
        request: CreateNotificationRequest,
    ) -> Result<Notification> {
        let mut state = self.state.lock().unwrap();
        if state.fail_notifications {
            return Err(AssessTrackError::notification_dispatch(
                "通知写入失败".to_string(),
            ));
        }
        let id = Self::next_id(&mut state);
        let notification = Notification {
            id,
            user_id: request.user_id,
            message: request.message,
            notification_type: request.notification_type,
            is_read: false,
            assessment_id: request.assessment_id,
            created_at: Utc::now(),
        };
        state.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn get_notification_by_id(&self, notification_id: i64) -> Result<Option<Notification>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .notifications
            .iter()
            .find(|n| n.id == notification_id)
            .cloned())
    }

    async fn list_notifications_for_users(&self, user_ids: &[i64]) -> Result<Vec<Notification>> {
        let state = self.state.lock().unwrap();
        let mut notifications: Vec<Notification> = state
            .notifications
            .iter()
            .filter(|n| user_ids.contains(&n.user_id))
            .cloned()
            .collect();
        notifications.sort_by_key(|n| std::cmp::Reverse(n.id));
        Ok(notifications)
    }

    async fn mark_notification_read(&self, notification_id: i64) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        match state
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id)
        {
            Some(notification) => {
                notification.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_notifications_read(&self, user_ids: &[i64]) -> Result<i64> {
        let mut state = self.state.lock().unwrap();
        let mut marked = 0;
        for notification in state
            .notifications
            .iter_mut()
            .filter(|n| user_ids.contains(&n.user_id) && !n.is_read)
        {
            notification.is_read = true;
            marked += 1;
        }
        Ok(marked)
    }

    async fn delete_notification(&self, notification_id: i64) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.notifications.len();
        state.notifications.retain(|n| n.id != notification_id);
        Ok(state.notifications.len() < before)
    }

    async fn count_unread_notifications(&self, user_ids: &[i64]) -> Result<i64> {
        let state = self.state.lock().unwrap();
        Ok(state
            .notifications
            .iter()
            .filter(|n| user_ids.contains(&n.user_id) && !n.is_read)
            .count() as i64)
    }
}

fn user_with_role(id: i64, username: &str, role: UserRole) -> User {
    User {
        id,
        username: username.to_string(),
        password_hash: String::new(),
        role,
        status: UserStatus::Active,
        full_name: None,
        profile_photo: None,
        last_login: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn teacher(id: i64, username: &str) -> User {
    user_with_role(id, username, UserRole::Teacher)
}

pub fn headteacher(id: i64, username: &str) -> User {
    user_with_role(id, username, UserRole::Headteacher)
}

pub fn archived_user(id: i64, username: &str) -> ArchivedUser {
    ArchivedUser {
        id,
        username: username.to_string(),
        full_name: None,
        role: UserRole::Teacher,
        password_hash: String::new(),
        archived_at: Utc::now(),
    }
}

pub fn student(id: i64, class_id: i64, name: &str) -> Student {
    Student {
        id,
        name: name.to_string(),
        class_id,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn subject(id: i64, name: &str) -> Subject {
    Subject {
        id,
        name: name.to_string(),
    }
}

pub fn assessment(id: i64, student_id: i64, teacher_id: i64, status: AssessmentStatus) -> Assessment {
    Assessment {
        id,
        student_id,
        teacher_id,
        date: "2026-03-02".to_string(),
        week_number: 10,
        summary: "课堂表现稳定".to_string(),
        status,
        headteacher_comment: None,
        assessment_file: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn notification(id: i64, user_id: i64, notification_type: NotificationType) -> Notification {
    Notification {
        id,
        user_id,
        message: "测试通知".to_string(),
        notification_type,
        is_read: false,
        assessment_id: Some(1),
        created_at: Utc::now(),
    }
}
