// ==========================================
// 选课分班系统 - 课程与类别 (Offering)
// ==========================================
// Offering = 公共能力 (容量/教学班/先修/互斥/名单) + 种类
// - Category: 类别 (可无教学班, 直接录取)
// - Subject:  课程 (含层级/可重修/适用年级, 必须经教学班录取)
// ==========================================

use crate::domain::capacity::Capacity;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::student::SlotKind;
use crate::domain::types::{GradeLevelId, OfferingId, SectionId, StudentId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ==========================================
// OfferingKind - 种类
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OfferingKind {
    Category,
    Subject {
        /// 层级 (None/0 表示不分层)
        level: Option<u32>,
        repeatable: bool,
        teaches: BTreeSet<GradeLevelId>,
    },
}

impl OfferingKind {
    pub fn subject(level: Option<u32>, repeatable: bool) -> Self {
        OfferingKind::Subject {
            level,
            repeatable,
            teaches: BTreeSet::new(),
        }
    }

    pub fn slot_kind(&self) -> SlotKind {
        match self {
            OfferingKind::Category => SlotKind::Category,
            OfferingKind::Subject { .. } => SlotKind::Subject,
        }
    }
}

// ==========================================
// Offering - 课程/类别
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offering {
    id: OfferingId,
    name: String,
    offering_type: String,
    kind: OfferingKind,
    capacity: Capacity,
    sections: Vec<SectionId>,
    prerequisites: Vec<BTreeSet<OfferingId>>, // 组内 OR, 组间 AND
    not_alongside: BTreeSet<OfferingId>,
    max_group_members: Option<u32>,
    students: BTreeSet<StudentId>,
}

impl Offering {
    pub(crate) fn new(
        id: OfferingId,
        name: impl Into<String>,
        offering_type: impl Into<String>,
        kind: OfferingKind,
        capacity: Option<Capacity>,
        max_group_members: Option<u32>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            offering_type: offering_type.into(),
            kind,
            capacity: capacity.unwrap_or_else(Capacity::unbounded),
            sections: Vec::new(),
            prerequisites: Vec::new(),
            not_alongside: BTreeSet::new(),
            max_group_members,
            students: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> OfferingId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 配置类型 (如 Core/Elective)
    pub fn offering_type(&self) -> &str {
        &self.offering_type
    }

    pub fn kind(&self) -> &OfferingKind {
        &self.kind
    }

    pub fn is_subject(&self) -> bool {
        matches!(self.kind, OfferingKind::Subject { .. })
    }

    /// 层级 (仅课程, 0 视为不分层)
    pub fn level(&self) -> Option<u32> {
        match &self.kind {
            OfferingKind::Subject { level, .. } => level.filter(|l| *l != 0),
            OfferingKind::Category => None,
        }
    }

    pub fn repeatable(&self) -> bool {
        match &self.kind {
            OfferingKind::Subject { repeatable, .. } => *repeatable,
            OfferingKind::Category => true,
        }
    }

    /// 课程适用年级 (类别返回 None, 表示不限)
    pub fn teaches(&self) -> Option<&BTreeSet<GradeLevelId>> {
        match &self.kind {
            OfferingKind::Subject { teaches, .. } => Some(teaches),
            OfferingKind::Category => None,
        }
    }

    pub fn capacity(&self) -> &Capacity {
        &self.capacity
    }

    /// 教学班 (按添加顺序, 录取时按此顺序尝试)
    pub fn sections(&self) -> &[SectionId] {
        &self.sections
    }

    pub fn prerequisites(&self) -> &[BTreeSet<OfferingId>] {
        &self.prerequisites
    }

    pub fn not_alongside(&self) -> &BTreeSet<OfferingId> {
        &self.not_alongside
    }

    pub fn max_group_members(&self) -> Option<u32> {
        self.max_group_members
    }

    pub fn students(&self) -> &BTreeSet<StudentId> {
        &self.students
    }

    /// 显示名: 分层课程附加 " Level{n}"
    pub fn label(&self) -> String {
        match self.level() {
            Some(level) => format!("{} Level{}", self.name, level),
            None => self.name.clone(),
        }
    }

    // ==========================================
    // 配置操作
    // ==========================================

    /// 登记教学班并汇总容量
    pub(crate) fn attach_section(&mut self, section: SectionId, capacity: &Capacity) -> DomainResult<()> {
        if self.sections.contains(&section) {
            return Err(DomainError::DuplicateId {
                kind: "section",
                id: section.to_string(),
            });
        }
        self.capacity.increase(capacity)?;
        self.sections.push(section);
        Ok(())
    }

    /// 添加先修组 (组内任一已修即满足)
    pub fn add_prerequisites(&mut self, objects: BTreeSet<OfferingId>) -> DomainResult<()> {
        if objects.is_empty() {
            return Err(DomainError::ConflictingRelation(format!(
                "{} 的先修组为空",
                self.label()
            )));
        }
        if objects.contains(&self.id) {
            return Err(DomainError::SelfReference(format!(
                "{} 不能以自身为先修",
                self.label()
            )));
        }
        if !objects.is_disjoint(&self.not_alongside) {
            return Err(DomainError::ConflictingRelation(format!(
                "{} 的先修组与互斥课程重叠",
                self.label()
            )));
        }
        if !self.prerequisites.contains(&objects) {
            self.prerequisites.push(objects);
        }
        Ok(())
    }

    pub fn add_not_alongside(&mut self, object: OfferingId) -> DomainResult<()> {
        if object == self.id {
            return Err(DomainError::SelfReference(format!(
                "{} 不能与自身互斥",
                self.label()
            )));
        }
        self.not_alongside.insert(object);
        Ok(())
    }

    /// 添加适用年级 (仅课程)
    pub fn add_taught(&mut self, grade_level: GradeLevelId) -> DomainResult<()> {
        let label = self.label();
        match &mut self.kind {
            OfferingKind::Subject { teaches, .. } => {
                teaches.insert(grade_level);
                Ok(())
            }
            OfferingKind::Category => Err(DomainError::NotASubject { offering: label }),
        }
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

impl fmt::Display for Offering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
