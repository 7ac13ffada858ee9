// ==========================================
// 选课分班系统 - 年级配置
// ==========================================
// 职责: 定义某年级存在哪些课程/类别类型, 以及哪些需要志愿排序
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::types::GradeLevelId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeLevel {
    id: GradeLevelId,
    grade_level: u32,
    to_rank: BTreeSet<String>,
    category_types: BTreeSet<String>,
    subject_types: BTreeSet<String>,
}

impl GradeLevel {
    /// 创建年级配置
    ///
    /// 志愿类型必须是已配置的课程或类别类型
    pub(crate) fn new(
        id: GradeLevelId,
        grade_level: u32,
        to_rank: BTreeSet<String>,
        category_types: BTreeSet<String>,
        subject_types: BTreeSet<String>,
    ) -> DomainResult<Self> {
        if let Some(unknown) = to_rank
            .iter()
            .find(|t| !category_types.contains(*t) && !subject_types.contains(*t))
        {
            return Err(DomainError::UnknownRankType(unknown.clone()));
        }
        Ok(Self {
            id,
            grade_level,
            to_rank,
            category_types,
            subject_types,
        })
    }

    pub fn id(&self) -> GradeLevelId {
        self.id
    }

    /// 年级序号 (排序键)
    pub fn grade_level(&self) -> u32 {
        self.grade_level
    }

    pub fn to_rank(&self) -> &BTreeSet<String> {
        &self.to_rank
    }

    pub fn category_types(&self) -> &BTreeSet<String> {
        &self.category_types
    }

    pub fn subject_types(&self) -> &BTreeSet<String> {
        &self.subject_types
    }

    pub fn is_ranked(&self, rank_type: &str) -> bool {
        self.to_rank.contains(rank_type)
    }
}

impl fmt::Display for GradeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grade {}", self.grade_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_rank_types_must_be_configured() {
        let err = GradeLevel::new(
            GradeLevelId(0),
            11,
            set(&["Core", "Sport"]),
            set(&["Club"]),
            set(&["Core"]),
        )
        .unwrap_err();
        assert_eq!(err, DomainError::UnknownRankType("Sport".to_string()));
    }

    #[test]
    fn test_grade_level_accessors() {
        let grade = GradeLevel::new(
            GradeLevelId(1),
            12,
            set(&["Core"]),
            set(&["Club"]),
            set(&["Core", "Math"]),
        )
        .unwrap();
        assert!(grade.is_ranked("Core"));
        assert!(!grade.is_ranked("Math"));
        assert_eq!(grade.to_string(), "Grade 12");
    }
}
