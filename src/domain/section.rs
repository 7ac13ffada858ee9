// ==========================================
// 选课分班系统 - 教学班
// ==========================================
// 某课程/类别在某平行时段的具体开班, 自带容量与名单
// ==========================================

use crate::domain::capacity::Capacity;
use crate::domain::error::DomainResult;
use crate::domain::shift::ParallelSession;
use crate::domain::types::{OfferingId, SectionId, ShiftId, StudentId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    id: SectionId,
    name: Option<String>,
    parent: OfferingId,
    parallel_session: ParallelSession,
    capacity: Capacity,
    students: BTreeSet<StudentId>,
}

impl Section {
    pub(crate) fn new(
        id: SectionId,
        parent: OfferingId,
        parallel_session: ParallelSession,
        capacity: Capacity,
        name: Option<String>,
    ) -> Self {
        Self {
            id,
            name,
            parent,
            parallel_session,
            capacity,
            students: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> SectionId {
        self.id
    }

    /// 显式名称 (未指定时由 School 按 "{课程} {时段}" 生成显示名)
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn parent(&self) -> OfferingId {
        self.parent
    }

    /// 教学班所在班次 (即平行时段的班次)
    pub fn shift(&self) -> ShiftId {
        self.parallel_session.shift()
    }

    pub fn parallel_session(&self) -> &ParallelSession {
        &self.parallel_session
    }

    pub fn partition(&self) -> &str {
        self.parallel_session.partition()
    }

    pub fn capacity(&self) -> &Capacity {
        &self.capacity
    }

    pub fn students(&self) -> &BTreeSet<StudentId> {
        &self.students
    }

    pub(crate) fn admit(&mut self, student: StudentId) -> DomainResult<()> {
        self.capacity.fill_one()?;
        self.students.insert(student);
        Ok(())
    }

    pub(crate) fn reset_enrollment(&mut self) {
        self.students.clear();
        self.capacity.clear_filled();
    }
}
