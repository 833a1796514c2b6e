use serde::{Deserialize, Serialize};

// 通知类型
//
// assessment_change_request 是历史遗留别名，解析时归并到
// AssessmentChangesRequested，写入时只使用规范值。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationType {
    NewAssessment,
    AssessmentApproved,
    AssessmentChangesRequested,
    AssessmentUpdated,
    /// 未识别的类型：保留原始字符串，路由时不跳转只记录日志
    Other(String),
}

impl NotificationType {
    pub const NEW_ASSESSMENT: &'static str = "new_assessment";
    pub const ASSESSMENT_APPROVED: &'static str = "assessment_approved";
    pub const ASSESSMENT_CHANGES_REQUESTED: &'static str = "assessment_changes_requested";
    pub const ASSESSMENT_CHANGE_REQUEST_LEGACY: &'static str = "assessment_change_request";
    pub const ASSESSMENT_UPDATED: &'static str = "assessment_updated";

    /// 解析类型字符串，未识别的值保留为 Other，永不失败
    pub fn parse(s: &str) -> Self {
        match s {
            Self::NEW_ASSESSMENT => NotificationType::NewAssessment,
            Self::ASSESSMENT_APPROVED => NotificationType::AssessmentApproved,
            Self::ASSESSMENT_CHANGES_REQUESTED | Self::ASSESSMENT_CHANGE_REQUEST_LEGACY => {
                NotificationType::AssessmentChangesRequested
            }
            Self::ASSESSMENT_UPDATED => NotificationType::AssessmentUpdated,
            other => NotificationType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            NotificationType::NewAssessment => Self::NEW_ASSESSMENT,
            NotificationType::AssessmentApproved => Self::ASSESSMENT_APPROVED,
            NotificationType::AssessmentChangesRequested => Self::ASSESSMENT_CHANGES_REQUESTED,
            NotificationType::AssessmentUpdated => Self::ASSESSMENT_UPDATED,
            NotificationType::Other(s) => s,
        }
    }

    /// 点击跳转路由表：type → 目标页面路径
    ///
    /// - new_assessment → 校长的评估审阅页
    /// - assessment_approved → 教师的评估只读页
    /// - assessment_changes_requested（含遗留别名）→ 教师的评估编辑页
    /// - 其余类型不跳转，由消费端记录日志
    pub fn route(&self, assessment_id: Option<i64>) -> Option<String> {
        let id = assessment_id?;
        match self {
            NotificationType::NewAssessment => Some(format!("/headteacher/assessments/{id}")),
            NotificationType::AssessmentApproved => Some(format!("/teacher/assessments/{id}")),
            NotificationType::AssessmentChangesRequested => {
                Some(format!("/teacher/assessments/{id}/edit"))
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for NotificationType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NotificationType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(NotificationType::parse(&s))
    }
}

// 业务通知实体
//
// 状态机：unread → read（单向），删除为终态。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub is_read: bool,
    pub assessment_id: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_alias_is_recognised() {
        let canonical = NotificationType::parse("assessment_changes_requested");
        let legacy = NotificationType::parse("assessment_change_request");
        assert_eq!(canonical, NotificationType::AssessmentChangesRequested);
        assert_eq!(legacy, canonical);
        // 写出时只使用规范值
        assert_eq!(legacy.as_str(), "assessment_changes_requested");
    }

    #[test]
    fn test_unknown_type_is_preserved() {
        let other = NotificationType::parse("system_maintenance");
        assert_eq!(
            other,
            NotificationType::Other("system_maintenance".to_string())
        );
        assert_eq!(other.as_str(), "system_maintenance");
    }

    #[test]
    fn test_routing_table() {
        let id = Some(42);
        assert_eq!(
            NotificationType::NewAssessment.route(id).as_deref(),
            Some("/headteacher/assessments/42")
        );
        assert_eq!(
            NotificationType::AssessmentApproved.route(id).as_deref(),
            Some("/teacher/assessments/42")
        );
        assert_eq!(
            NotificationType::AssessmentChangesRequested
                .route(id)
                .as_deref(),
            Some("/teacher/assessments/42/edit")
        );
        // 别名与规范值走同一路由
        assert_eq!(
            NotificationType::parse("assessment_change_request")
                .route(id)
                .as_deref(),
            Some("/teacher/assessments/42/edit")
        );
    }

    #[test]
    fn test_routing_table_unrecognised_or_missing_reference() {
        // 未识别类型不跳转
        assert_eq!(NotificationType::parse("whatever").route(Some(1)), None);
        // assessment_updated 不在路由表中
        assert_eq!(NotificationType::AssessmentUpdated.route(Some(1)), None);
        // 缺失评估引用时同样不跳转
        assert_eq!(NotificationType::NewAssessment.route(None), None);
    }
}
