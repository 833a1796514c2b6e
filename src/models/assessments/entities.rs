use serde::{Deserialize, Serialize};

// 评估状态机
//
// pending ──approve──▶ approved
//    │  ▲
//    │  └──teacher resubmit（update 强制回到 pending）
//    └──request_changes──▶ changes-requested
//
// 审批操作对任意当前状态生效（含 changes-requested 直接 approve）。
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum AssessmentStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "approved")]
    Approved,
    #[serde(rename = "changes-requested")]
    ChangesRequested,
}

impl AssessmentStatus {
    pub const PENDING: &'static str = "pending";
    pub const APPROVED: &'static str = "approved";
    pub const CHANGES_REQUESTED: &'static str = "changes-requested";

    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentStatus::Pending => Self::PENDING,
            AssessmentStatus::Approved => Self::APPROVED,
            AssessmentStatus::ChangesRequested => Self::CHANGES_REQUESTED,
        }
    }

    pub fn all() -> &'static [AssessmentStatus] {
        &[
            AssessmentStatus::Pending,
            AssessmentStatus::Approved,
            AssessmentStatus::ChangesRequested,
        ]
    }
}

impl<'de> Deserialize<'de> for AssessmentStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AssessmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::PENDING => Ok(AssessmentStatus::Pending),
            Self::APPROVED => Ok(AssessmentStatus::Approved),
            Self::CHANGES_REQUESTED => Ok(AssessmentStatus::ChangesRequested),
            _ => Err(format!(
                "无效的评估状态: '{s}'. 支持的状态: pending, approved, changes-requested"
            )),
        }
    }
}

// 业务评估实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub id: i64,
    pub student_id: i64,
    pub teacher_id: i64,
    /// 评估日期，ISO 8601（YYYY-MM-DD）
    pub date: String,
    pub week_number: i32,
    pub summary: String,
    pub status: AssessmentStatus,
    /// 仅在 approve / request_changes 时写入，teacher 重新提交时清空
    pub headteacher_comment: Option<String>,
    /// 附件引用（外部存储的文件标识，本服务不做上传）
    pub assessment_file: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 科目评语实体，每条隶属于一个评估和一个科目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectAssessment {
    pub id: i64,
    pub assessment_id: i64,
    pub subject_id: i64,
    pub comment: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_round_trip() {
        for status in AssessmentStatus::all() {
            let parsed = AssessmentStatus::from_str(status.as_str()).unwrap();
            assert_eq!(parsed, *status);
        }
    }

    #[test]
    fn test_status_rejects_unknown_values() {
        // 状态集合封闭：除这三个值外不允许持久化任何状态
        assert!(AssessmentStatus::from_str("needs_changes").is_err());
        assert!(AssessmentStatus::from_str("draft").is_err());
        assert!(AssessmentStatus::from_str("").is_err());
    }

    #[test]
    fn test_status_serde_uses_hyphenated_form() {
        let json = serde_json::to_string(&AssessmentStatus::ChangesRequested).unwrap();
        assert_eq!(json, "\"changes-requested\"");
        let back: AssessmentStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AssessmentStatus::ChangesRequested);
    }
}
