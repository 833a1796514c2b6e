pub mod count;
pub mod delete;
pub mod feed;
pub mod mark_read;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::Result;
use crate::models::users::entities::{User, UserRole};
use crate::storage::Storage;

pub struct NotificationService {
    storage: Option<Arc<dyn Storage>>,
}

impl NotificationService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    /// 解析收件箱归属的用户 ID 集合
    ///
    /// 校长收件箱是共享的：任何校长都能看到发给任意校长的通知。
    /// 其他角色只能看到发给自己的。
    pub(crate) async fn inbox_user_ids(
        storage: &Arc<dyn Storage>,
        user: &User,
    ) -> Result<Vec<i64>> {
        if user.role == UserRole::Headteacher {
            let headteachers = storage.list_users_by_role(UserRole::Headteacher).await?;
            let mut ids: Vec<i64> = headteachers.into_iter().map(|u| u.id).collect();
            // 自己刚被降级/升级时保证至少包含本人
            if !ids.contains(&user.id) {
                ids.push(user.id);
            }
            Ok(ids)
        } else {
            Ok(vec![user.id])
        }
    }

    // 通知收件箱（未读/已读分组）
    pub async fn notification_feed(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        feed::notification_feed(self, request).await
    }

    // 未读通知数
    pub async fn unread_count(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        count::unread_count(self, request).await
    }

    // 标记单条通知已读
    pub async fn mark_read(
        &self,
        notification_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        mark_read::mark_read(self, notification_id, request).await
    }

    // 标记全部通知已读
    pub async fn mark_all_read(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        mark_read::mark_all_read(self, request).await
    }

    // 删除通知
    pub async fn delete_notification(
        &self,
        notification_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_notification(self, notification_id, request).await
    }
}
