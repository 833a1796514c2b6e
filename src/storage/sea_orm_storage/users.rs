use super::SeaOrmStorage;
use crate::entity::archived_users::{
    ActiveModel as ArchivedActiveModel, Entity as ArchivedUsers,
};
use crate::entity::assessments::{Column as AssessmentColumn, Entity as Assessments};
use crate::entity::classes::{Column as ClassColumn, Entity as Classes};
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{AssessTrackError, Result};
use crate::models::{
    PaginationInfo,
    assessments::entities::AssessmentStatus,
    users::{
        entities::{ArchivedUser, User, UserRole, UserStatus},
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::{ArchivedUserListResponse, SystemStatisticsResponse, UserListResponse},
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

impl SeaOrmStorage {
    /// 创建用户
    ///
    /// 调用方负责提前完成密码哈希，request.password 中已是哈希值。
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            username: Set(req.username),
            password_hash: Set(req.password),
            role: Set(req.role.to_string()),
            status: Set(UserStatus::Active.to_string()),
            full_name: Set(req.full_name),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("创建用户失败: {e}")))?;

        // 新建班主任时可以直接挂到班级上
        if let Some(class_id) = req.class_id {
            Classes::update_many()
                .col_expr(
                    ClassColumn::TeacherId,
                    sea_orm::sea_query::Expr::value(result.id),
                )
                .filter(ClassColumn::Id.eq(class_id))
                .exec(&self.db)
                .await
                .map_err(|e| {
                    AssessTrackError::database_operation(format!("关联班级失败: {e}"))
                })?;
        }

        Ok(result.into_user())
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过用户名获取用户
    pub async fn get_user_by_username_impl(&self, username: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 分页列出用户
    pub async fn list_users_with_pagination_impl(
        &self,
        query: UserListQuery,
    ) -> Result<UserListResponse> {
        let page = query.pagination.page.max(1) as u64;
        let size = query.pagination.size.clamp(1, 100) as u64;

        let mut select = Users::find();

        // 搜索条件
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Username.contains(&escaped))
                    .add(Column::FullName.contains(&escaped)),
            );
        }

        // 角色筛选
        if let Some(ref role) = query.role {
            select = select.filter(Column::Role.eq(role.to_string()));
        }

        // 排序
        select = select.order_by_desc(Column::CreatedAt);

        // 分页查询
        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("查询用户总数失败: {e}")))?;

        let users = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("查询用户列表失败: {e}")))?;

        Ok(UserListResponse {
            items: users.into_iter().map(|m| m.into_user()).collect(),
            pagination: PaginationInfo::new(page as i64, size as i64, total as i64),
        })
    }

    /// 按角色列出用户，通知分发用
    pub async fn list_users_by_role_impl(&self, role: UserRole) -> Result<Vec<User>> {
        let users = Users::find()
            .filter(Column::Role.eq(role.to_string()))
            .filter(Column::Status.eq(UserStatus::Active.to_string()))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("按角色查询用户失败: {e}")))?;

        Ok(users.into_iter().map(|m| m.into_user()).collect())
    }

    /// 更新用户最后登录时间
    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Users::update_many()
            .col_expr(Column::LastLogin, sea_orm::sea_query::Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| {
                AssessTrackError::database_operation(format!("更新最后登录时间失败: {e}"))
            })?;

        Ok(result.rows_affected > 0)
    }

    /// 更新用户信息
    pub async fn update_user_impl(
        &self,
        id: i64,
        update: UpdateUserRequest,
    ) -> Result<Option<User>> {
        // 先检查用户是否存在
        let existing = self.get_user_by_id_impl(id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(username) = update.username {
            model.username = Set(username);
        }

        if let Some(role) = update.role {
            model.role = Set(role.to_string());
        }

        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }

        if let Some(full_name) = update.full_name {
            model.full_name = Set(Some(full_name));
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("更新用户失败: {e}")))?;

        // class_ids 为整体替换语义：先清空该用户名下的班级，再挂上指定班级
        if let Some(class_ids) = update.class_ids {
            Classes::update_many()
                .col_expr(
                    ClassColumn::TeacherId,
                    sea_orm::sea_query::Expr::value(Option::<i64>::None),
                )
                .filter(ClassColumn::TeacherId.eq(id))
                .exec(&self.db)
                .await
                .map_err(|e| {
                    AssessTrackError::database_operation(format!("清除班级关联失败: {e}"))
                })?;

            if !class_ids.is_empty() {
                Classes::update_many()
                    .col_expr(ClassColumn::TeacherId, sea_orm::sea_query::Expr::value(id))
                    .filter(ClassColumn::Id.is_in(class_ids))
                    .exec(&self.db)
                    .await
                    .map_err(|e| {
                        AssessTrackError::database_operation(format!("更新班级关联失败: {e}"))
                    })?;
            }
        }

        self.get_user_by_id_impl(id).await
    }

    /// 修改用户密码
    pub async fn update_user_password_impl(&self, id: i64, password_hash: &str) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Users::update_many()
            .col_expr(
                Column::PasswordHash,
                sea_orm::sea_query::Expr::value(password_hash),
            )
            .col_expr(Column::UpdatedAt, sea_orm::sea_query::Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("修改密码失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 归档并删除用户
    ///
    /// 先写入 archived_users 再删除原记录，保证可以恢复。
    pub async fn archive_and_delete_user_impl(&self, id: i64) -> Result<Option<ArchivedUser>> {
        let user = match Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("查询用户失败: {e}")))?
        {
            Some(user) => user,
            None => return Ok(None),
        };

        let now = chrono::Utc::now().timestamp();

        let archived = ArchivedActiveModel {
            username: Set(user.username.clone()),
            full_name: Set(user.full_name.clone()),
            role: Set(user.role.clone()),
            password_hash: Set(user.password_hash.clone()),
            archived_at: Set(now),
            ..Default::default()
        };

        let archived = archived
            .insert(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("归档用户失败: {e}")))?;

        Users::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("删除用户失败: {e}")))?;

        Ok(Some(archived.into_archived_user()))
    }

    /// 列出归档用户
    pub async fn list_archived_users_impl(&self) -> Result<ArchivedUserListResponse> {
        let items = ArchivedUsers::find()
            .order_by_desc(crate::entity::archived_users::Column::ArchivedAt)
            .all(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("查询归档用户失败: {e}")))?;

        Ok(ArchivedUserListResponse {
            items: items.into_iter().map(|m| m.into_archived_user()).collect(),
        })
    }

    /// 通过 ID 获取归档用户
    pub async fn get_archived_user_by_id_impl(
        &self,
        archived_id: i64,
    ) -> Result<Option<ArchivedUser>> {
        let result = ArchivedUsers::find_by_id(archived_id)
            .one(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("查询归档用户失败: {e}")))?;

        Ok(result.map(|m| m.into_archived_user()))
    }

    /// 系统统计：用户总数、评估总数、待审批评估数
    pub async fn system_statistics_impl(&self) -> Result<SystemStatisticsResponse> {
        let total_users = Users::find()
            .count(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("统计用户数失败: {e}")))?;

        let total_assessments = Assessments::find()
            .count(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("统计评估数失败: {e}")))?;

        let pending_reviews = Assessments::find()
            .filter(AssessmentColumn::Status.eq(AssessmentStatus::Pending.to_string()))
            .count(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("统计待审批数失败: {e}")))?;

        Ok(SystemStatisticsResponse {
            total_users: total_users as i64,
            total_assessments: total_assessments as i64,
            pending_reviews: pending_reviews as i64,
        })
    }

    /// 恢复归档用户
    pub async fn restore_archived_user_impl(&self, archived_id: i64) -> Result<Option<User>> {
        let archived = match ArchivedUsers::find_by_id(archived_id)
            .one(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("查询归档用户失败: {e}")))?
        {
            Some(archived) => archived,
            None => return Ok(None),
        };

        let now = chrono::Utc::now().timestamp();

        let restored = ActiveModel {
            username: Set(archived.username.clone()),
            password_hash: Set(archived.password_hash.clone()),
            role: Set(archived.role.clone()),
            status: Set(UserStatus::Active.to_string()),
            full_name: Set(archived.full_name.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let restored = restored
            .insert(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("恢复用户失败: {e}")))?;

        ArchivedUsers::delete_by_id(archived_id)
            .exec(&self.db)
            .await
            .map_err(|e| {
                AssessTrackError::database_operation(format!("清除归档记录失败: {e}"))
            })?;

        Ok(Some(restored.into_user()))
    }
}
