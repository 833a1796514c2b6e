use super::SeaOrmStorage;
use crate::entity::notifications::{ActiveModel, Column, Entity as Notifications};
use crate::errors::{AssessTrackError, Result};
use crate::models::notifications::{
    entities::Notification, requests::CreateNotificationRequest,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 创建通知
    pub async fn create_notification_impl(
        &self,
        req: CreateNotificationRequest,
    ) -> Result<Notification> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            user_id: Set(req.user_id),
            message: Set(req.message),
            notification_type: Set(req.notification_type.as_str().to_string()),
            is_read: Set(false),
            assessment_id: Set(req.assessment_id),
            created_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("创建通知失败: {e}")))?;

        Ok(result.into_notification())
    }

    /// 通过 ID 获取通知
    pub async fn get_notification_by_id_impl(
        &self,
        notification_id: i64,
    ) -> Result<Option<Notification>> {
        let result = Notifications::find_by_id(notification_id)
            .one(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("查询通知失败: {e}")))?;

        Ok(result.map(|m| m.into_notification()))
    }

    /// 列出一组用户收到的通知，创建时间倒序
    ///
    /// 校长收件箱是共享的，传入全体校长的 ID 即可拿到合并后的列表。
    pub async fn list_notifications_for_users_impl(
        &self,
        user_ids: &[i64],
    ) -> Result<Vec<Notification>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let notifications = Notifications::find()
            .filter(Column::UserId.is_in(user_ids.to_vec()))
            .order_by_desc(Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("查询通知列表失败: {e}")))?;

        Ok(notifications
            .into_iter()
            .map(|m| m.into_notification())
            .collect())
    }

    /// 标记单条通知为已读，重复标记等同于无操作
    pub async fn mark_notification_read_impl(&self, notification_id: i64) -> Result<bool> {
        let result = Notifications::update_many()
            .col_expr(Column::IsRead, sea_orm::sea_query::Expr::value(true))
            .filter(Column::Id.eq(notification_id))
            .exec(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("标记通知已读失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 标记一组用户的全部未读通知为已读，返回实际更新条数
    pub async fn mark_all_notifications_read_impl(&self, user_ids: &[i64]) -> Result<i64> {
        if user_ids.is_empty() {
            return Ok(0);
        }

        let result = Notifications::update_many()
            .col_expr(Column::IsRead, sea_orm::sea_query::Expr::value(true))
            .filter(Column::UserId.is_in(user_ids.to_vec()))
            .filter(Column::IsRead.eq(false))
            .exec(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("批量标记已读失败: {e}")))?;

        Ok(result.rows_affected as i64)
    }

    /// 删除通知
    pub async fn delete_notification_impl(&self, notification_id: i64) -> Result<bool> {
        let result = Notifications::delete_by_id(notification_id)
            .exec(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("删除通知失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 统计一组用户的未读通知数
    pub async fn count_unread_notifications_impl(&self, user_ids: &[i64]) -> Result<i64> {
        if user_ids.is_empty() {
            return Ok(0);
        }

        let count = Notifications::find()
            .filter(Column::UserId.is_in(user_ids.to_vec()))
            .filter(Column::IsRead.eq(false))
            .count(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("统计未读通知失败: {e}")))?;

        Ok(count as i64)
    }
}
