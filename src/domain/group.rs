// ==========================================
// 选课分班系统 - 学生分组
// ==========================================
// required 分组: 成员在同一课程下必须进入同一教学班, 且班次一致
// 班次一致性在入班时惰性校验, 入组时不校验
// ==========================================

use crate::domain::capacity::Capacity;
use crate::domain::error::DomainResult;
use crate::domain::types::{GroupId, OfferingId, StudentId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    id: GroupId,
    code: String,
    parent: OfferingId,
    required: bool,
    students: BTreeSet<StudentId>,
    capacity: Capacity,
}

impl Group {
    /// 创建分组
    ///
    /// # 参数
    /// - max_members: 所属课程的分组人数上限 (None 表示不限)
    pub(crate) fn new(
        id: GroupId,
        code: impl Into<String>,
        parent: OfferingId,
        required: bool,
        max_members: Option<u32>,
    ) -> Self {
        let capacity = max_members.map_or_else(Capacity::unbounded, Capacity::up_to);
        Self {
            id,
            code: code.into(),
            parent,
            required,
            students: BTreeSet::new(),
            capacity,
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn parent(&self) -> OfferingId {
        self.parent
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn students(&self) -> &BTreeSet<StudentId> {
        &self.students
    }

    pub fn capacity(&self) -> &Capacity {
        &self.capacity
    }

    pub fn contains(&self, student: StudentId) -> bool {
        self.students.contains(&student)
    }

    /// 登记成员 (调用方已完成全部校验)
    pub(crate) fn admit(&mut self, student: StudentId) -> DomainResult<()> {
        self.capacity.fill_one()?;
        self.students.insert(student);
        Ok(())
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}
