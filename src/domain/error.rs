// ==========================================
// 选课分班系统 - 领域错误类型
// ==========================================
// 两级错误:
// - DomainError: 配置/调用契约错误, 立即失败 (Err 返回)
// - Rejection:   录取结果, 预期内可恢复, 记入志愿拒绝日志
// 工具: thiserror 派生宏
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 领域层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    // ===== 容量相关错误 =====
    #[error("容量非法: {0}")]
    InvalidCapacity(String),

    // ===== 标识相关错误 =====
    #[error("重复标识: {kind} '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    #[error("实体不存在: {kind} '{id}'")]
    UnknownEntity { kind: &'static str, id: String },

    // ===== 班次相关错误 =====
    #[error("班次 {shift} 不包含时段分区 '{partition}'")]
    UnknownPartition { shift: String, partition: String },

    #[error("学生 {student} 班次已固定为 {current}, 不可改为 {requested}")]
    ShiftAlreadySet {
        student: String,
        current: String,
        requested: String,
    },

    // ===== 关系相关错误 =====
    #[error("自引用关系: {0}")]
    SelfReference(String),

    #[error("关系冲突: {0}")]
    ConflictingRelation(String),

    #[error("往年记录年级 {previous} 必须低于当前年级 {current}")]
    PreviousGradeNotLower { previous: u32, current: u32 },

    #[error("教学班 {section} 不属于 {offering}")]
    SectionParentMismatch { section: String, offering: String },

    #[error("{offering} 不是课程 (Subject), 不支持该操作")]
    NotASubject { offering: String },

    // ===== 志愿相关错误 =====
    #[error("未配置的志愿类型: '{0}'")]
    UnknownRankType(String),

    #[error("志愿下标越界 (类型 {rank_type}): index={index}, len={len}")]
    IndexOutOfRange {
        rank_type: String,
        index: usize,
        len: usize,
    },

    #[error("重复志愿 (类型 {rank_type}): {offering}")]
    DuplicatePreference { rank_type: String, offering: String },

    #[error("年级 {grade_level} 未配置{kind}类型 '{slot}'")]
    SlotNotConfigured {
        grade_level: u32,
        kind: &'static str,
        slot: String,
    },

    #[error("{offering} 的类型为 '{offering_type}', 不能放入 '{slot}'")]
    SlotTypeMismatch {
        offering: String,
        offering_type: String,
        slot: String,
    },

    #[error("学生 {student} 的 '{slot}' 已分配")]
    SlotAlreadyAssigned { student: String, slot: String },

    // ===== 并发相关错误 =====
    #[error("锁获取失败: {0}")]
    LockPoisoned(String),

    #[error("任务执行失败: {0}")]
    TaskFailed(String),
}

/// Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

// ==========================================
// Rejection - 录取拒绝原因
// ==========================================
// 检查顺序决定上报哪个原因: 容量优先于兼容性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rejection {
    Full,
    IncompatibleShift,
    AlreadyInParallelSession,
    IncompatibleClassmates,
    IncompatibleGroupmates,
    PrerequisitesNotMet,
    ConflictsWithAttended,
    IncompatibleWithSections,
    GradeLevelIncompatible,
    AlreadyTaken,
    AlreadyAttending,
    AlreadyMember,
    AlreadyGrouped,
}

impl Rejection {
    /// 稳定代码 (导出 CSV 使用)
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::Full => "FULL",
            Rejection::IncompatibleShift => "INCOMPATIBLE_SHIFT",
            Rejection::AlreadyInParallelSession => "ALREADY_IN_PARALLEL_SESSION",
            Rejection::IncompatibleClassmates => "INCOMPATIBLE_CLASSMATES",
            Rejection::IncompatibleGroupmates => "INCOMPATIBLE_GROUPMATES",
            Rejection::PrerequisitesNotMet => "PREREQUISITES_NOT_MET",
            Rejection::ConflictsWithAttended => "CONFLICTS_WITH_ATTENDED",
            Rejection::IncompatibleWithSections => "INCOMPATIBLE_WITH_SECTIONS",
            Rejection::GradeLevelIncompatible => "GRADE_LEVEL_INCOMPATIBLE",
            Rejection::AlreadyTaken => "ALREADY_TAKEN",
            Rejection::AlreadyAttending => "ALREADY_ATTENDING",
            Rejection::AlreadyMember => "ALREADY_MEMBER",
            Rejection::AlreadyGrouped => "ALREADY_GROUPED",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Rejection::Full => "Full",
            Rejection::IncompatibleShift => "Incompatible shift",
            Rejection::AlreadyInParallelSession => "Already attending a parallel session",
            Rejection::IncompatibleClassmates => "Incompatible classmate/s",
            Rejection::IncompatibleGroupmates => "Incompatible with groupmate/s",
            Rejection::PrerequisitesNotMet => "Prerequisites not met",
            Rejection::ConflictsWithAttended => "Conflicts with an attended offering",
            Rejection::IncompatibleWithSections => "Incompatible with sections",
            Rejection::GradeLevelIncompatible => "Grade level incompatible",
            Rejection::AlreadyTaken => "Already taken",
            Rejection::AlreadyAttending => "Already attending",
            Rejection::AlreadyMember => "Already a member",
            Rejection::AlreadyGrouped => "Already grouped for this offering",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_display_and_code() {
        assert_eq!(Rejection::Full.to_string(), "Full");
        assert_eq!(
            Rejection::IncompatibleWithSections.to_string(),
            "Incompatible with sections"
        );
        assert_eq!(Rejection::IncompatibleGroupmates.code(), "INCOMPATIBLE_GROUPMATES");
    }

    #[test]
    fn test_rejection_serde() {
        let json = serde_json::to_string(&Rejection::AlreadyInParallelSession).unwrap();
        assert_eq!(json, "\"ALREADY_IN_PARALLEL_SESSION\"");
    }
}
