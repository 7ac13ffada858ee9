// ==========================================
// 选课分班系统 - 领域类型定义
// ==========================================
// 职责: 实体标识 (arena 下标) + 录取结果类型
// 红线: 标识只在所属 School 内有效, 不跨 School 使用
// ==========================================

use crate::domain::error::Rejection;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 实体标识 (Typed Ids)
// ==========================================
// 每个实体在 School 内按插入顺序编号
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub usize);

        impl $name {
            /// arena 下标
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", $prefix, self.0)
            }
        }
    };
}

entity_id!(
    /// 班次标识
    ShiftId,
    "SHIFT"
);
entity_id!(
    /// 年级标识
    GradeLevelId,
    "GRADE"
);
entity_id!(
    /// 课程/类别 (Offering) 标识
    OfferingId,
    "OFFERING"
);
entity_id!(
    /// 教学班标识
    SectionId,
    "SECTION"
);
entity_id!(
    /// 分组标识
    GroupId,
    "GROUP"
);
entity_id!(
    /// 学生标识
    StudentId,
    "STUDENT"
);

// ==========================================
// Admission - 录取结果
// ==========================================
// 录取失败是预期内结果, 不走 Err 通道
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Admission {
    Accepted,
    Rejected(Rejection),
}

impl Admission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Admission::Accepted)
    }

    /// 拒绝原因 (录取成功时为 None)
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Admission::Accepted => None,
            Admission::Rejected(reason) => Some(*reason),
        }
    }
}

impl From<Result<(), Rejection>> for Admission {
    fn from(result: Result<(), Rejection>) -> Self {
        match result {
            Ok(()) => Admission::Accepted,
            Err(reason) => Admission::Rejected(reason),
        }
    }
}

impl fmt::Display for Admission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Admission::Accepted => write!(f, "Accepted"),
            Admission::Rejected(reason) => write!(f, "Rejected: {}", reason),
        }
    }
}

// ==========================================
// ProposalResult - 单次志愿提交结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalResult {
    pub student: StudentId,
    pub rank_type: String,
    pub offering: OfferingId,
    pub admission: Admission,
    /// 录取的教学班 (无分班的类别为 None)
    pub section: Option<SectionId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(StudentId(3).to_string(), "STUDENT#3");
        assert_eq!(SectionId(0).to_string(), "SECTION#0");
    }

    #[test]
    fn test_admission_from_result() {
        assert!(Admission::from(Ok(())).is_accepted());
        let rejected = Admission::from(Err(Rejection::Full));
        assert_eq!(rejected.rejection(), Some(Rejection::Full));
        assert_eq!(rejected.to_string(), "Rejected: Full");
    }
}
