use super::SeaOrmStorage;
use crate::entity::class_subjects::{
    ActiveModel as ClassSubjectActiveModel, Column as ClassSubjectColumn, Entity as ClassSubjects,
};
use crate::entity::classes::{ActiveModel, Column, Entity as Classes};
use crate::entity::subjects::{Column as SubjectColumn, Entity as Subjects};
use crate::errors::{AssessTrackError, Result};
use crate::models::{
    PaginationInfo,
    classes::{
        entities::Class,
        requests::{ClassListQuery, CreateClassRequest, UpdateClassRequest},
        responses::ClassListResponse,
    },
    subjects::entities::Subject,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 创建班级并建立科目关联
    pub async fn create_class_impl(&self, req: CreateClassRequest) -> Result<Class> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            name: Set(req.name),
            teacher_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("创建班级失败: {e}")))?;

        self.replace_class_subjects(result.id, &req.subject_ids)
            .await?;

        Ok(result.into_class())
    }

    /// 通过 ID 获取班级
    pub async fn get_class_by_id_impl(&self, class_id: i64) -> Result<Option<Class>> {
        let result = Classes::find_by_id(class_id)
            .one(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("查询班级失败: {e}")))?;

        Ok(result.map(|m| m.into_class()))
    }

    /// 分页列出班级
    pub async fn list_classes_with_pagination_impl(
        &self,
        query: ClassListQuery,
    ) -> Result<ClassListResponse> {
        let page = query.pagination.page.max(1) as u64;
        let size = query.pagination.size.clamp(1, 100) as u64;

        let mut select = Classes::find();

        if let Some(teacher_id) = query.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }

        select = select.order_by_asc(Column::Name);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("查询班级总数失败: {e}")))?;

        let classes = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("查询班级列表失败: {e}")))?;

        Ok(ClassListResponse {
            items: classes.into_iter().map(|m| m.into_class()).collect(),
            pagination: PaginationInfo::new(page as i64, size as i64, total as i64),
        })
    }

    /// 更新班级信息
    pub async fn update_class_impl(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>> {
        let existing = self.get_class_by_id_impl(class_id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            id: Set(class_id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name);
        }

        if let Some(teacher_id) = update.teacher_id {
            model.teacher_id = Set(Some(teacher_id));
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("更新班级失败: {e}")))?;

        // 科目列表为整体替换语义
        if let Some(subject_ids) = update.subject_ids {
            self.replace_class_subjects(class_id, &subject_ids).await?;
        }

        self.get_class_by_id_impl(class_id).await
    }

    /// 删除班级，级联清理学生与科目关联
    pub async fn delete_class_impl(&self, class_id: i64) -> Result<bool> {
        let result = Classes::delete_by_id(class_id)
            .exec(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("删除班级失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 获取班级关联的科目列表
    pub async fn get_class_subjects_impl(&self, class_id: i64) -> Result<Vec<Subject>> {
        let links = ClassSubjects::find()
            .filter(ClassSubjectColumn::ClassId.eq(class_id))
            .all(&self.db)
            .await
            .map_err(|e| {
                AssessTrackError::database_operation(format!("查询班级科目关联失败: {e}"))
            })?;

        let subject_ids: Vec<i64> = links.into_iter().map(|l| l.subject_id).collect();
        if subject_ids.is_empty() {
            return Ok(Vec::new());
        }

        let subjects = Subjects::find()
            .filter(SubjectColumn::Id.is_in(subject_ids))
            .order_by_asc(SubjectColumn::Name)
            .all(&self.db)
            .await
            .map_err(|e| AssessTrackError::database_operation(format!("查询科目失败: {e}")))?;

        Ok(subjects.into_iter().map(|m| m.into_subject()).collect())
    }

    /// 整体替换班级科目关联
    async fn replace_class_subjects(&self, class_id: i64, subject_ids: &[i64]) -> Result<()> {
        ClassSubjects::delete_many()
            .filter(ClassSubjectColumn::ClassId.eq(class_id))
            .exec(&self.db)
            .await
            .map_err(|e| {
                AssessTrackError::database_operation(format!("清除班级科目关联失败: {e}"))
            })?;

        for subject_id in subject_ids {
            let link = ClassSubjectActiveModel {
                class_id: Set(class_id),
                subject_id: Set(*subject_id),
                ..Default::default()
            };
            link.insert(&self.db).await.map_err(|e| {
                AssessTrackError::database_operation(format!("写入班级科目关联失败: {e}"))
            })?;
        }

        Ok(())
    }
}
