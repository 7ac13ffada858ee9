// ==========================================
// 选课分班系统 - 学生领域模型
// ==========================================
// 核心实体: 班次、同伴约束、志愿、当前录取状态
// 红线: 同一时段分区至多一个教学班
// 红线: 班次一旦固定不可变更
// 红线: prerequisites 与 not_alongside 互斥
// ==========================================
// 录取状态只经 School 的事务化操作写入, 此处只提供记账方法
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::grade_level::GradeLevel;
use crate::domain::rank::Rankings;
use crate::domain::types::{GradeLevelId, GroupId, OfferingId, SectionId, ShiftId, StudentId};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// 类型槽位的种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Subject,
    Category,
}

impl SlotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotKind::Subject => "课程",
            SlotKind::Category => "类别",
        }
    }
}

// ==========================================
// Student - 学生
// ==========================================
#[derive(Debug, Clone)]
pub struct Student {
    id: StudentId,
    code: String,
    grade_level: GradeLevelId,

    // ===== 班次 =====
    declared_shift: Option<ShiftId>, // 导入时指定的班次
    shift: Option<ShiftId>,          // 生效班次 (首次入班时惰性固定)

    // ===== 同伴约束 =====
    prerequisites: BTreeSet<StudentId>,
    not_alongside: BTreeSet<StudentId>,
    previous: Option<StudentId>,

    // ===== 录取状态 =====
    recorded: BTreeSet<OfferingId>, // 往年记录登记的已修课程 (重置后保留)
    attends: BTreeSet<OfferingId>,
    groups: BTreeMap<OfferingId, GroupId>,
    sections: BTreeMap<OfferingId, SectionId>,
    sessions: BTreeMap<String, SectionId>,
    categories: BTreeMap<String, Option<OfferingId>>,
    subjects: BTreeMap<String, Option<OfferingId>>,

    // ===== 志愿 =====
    rankings: Rankings,
}

impl Student {
    pub(crate) fn new(id: StudentId, code: impl Into<String>, grade_level: &GradeLevel) -> Self {
        let code = code.into();
        Self {
            id,
            rankings: Rankings::new(&code, grade_level.to_rank()),
            code,
            grade_level: grade_level.id(),
            declared_shift: None,
            shift: None,
            prerequisites: BTreeSet::new(),
            not_alongside: BTreeSet::new(),
            previous: None,
            recorded: BTreeSet::new(),
            attends: BTreeSet::new(),
            groups: BTreeMap::new(),
            sections: BTreeMap::new(),
            sessions: BTreeMap::new(),
            categories: grade_level
                .category_types()
                .iter()
                .map(|t| (t.clone(), None))
                .collect(),
            subjects: grade_level
                .subject_types()
                .iter()
                .map(|t| (t.clone(), None))
                .collect(),
        }
    }

    // ==========================================
    // 只读访问
    // ==========================================

    pub fn id(&self) -> StudentId {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn grade_level(&self) -> GradeLevelId {
        self.grade_level
    }

    pub fn shift(&self) -> Option<ShiftId> {
        self.shift
    }

    pub fn prerequisites(&self) -> &BTreeSet<StudentId> {
        &self.prerequisites
    }

    pub fn not_alongside(&self) -> &BTreeSet<StudentId> {
        &self.not_alongside
    }

    pub fn previous(&self) -> Option<StudentId> {
        self.previous
    }

    pub fn attends(&self) -> &BTreeSet<OfferingId> {
        &self.attends
    }

    pub fn groups(&self) -> &BTreeMap<OfferingId, GroupId> {
        &self.groups
    }

    pub fn sections(&self) -> &BTreeMap<OfferingId, SectionId> {
        &self.sections
    }

    pub fn sessions(&self) -> &BTreeMap<String, SectionId> {
        &self.sessions
    }

    pub fn categories(&self) -> &BTreeMap<String, Option<OfferingId>> {
        &self.categories
    }

    pub fn subjects(&self) -> &BTreeMap<String, Option<OfferingId>> {
        &self.subjects
    }

    pub fn rankings(&self) -> &Rankings {
        &self.rankings
    }

    pub(crate) fn rankings_mut(&mut self) -> &mut Rankings {
        &mut self.rankings
    }

    /// 某分区已占用的教学班
    pub fn session(&self, partition: &str) -> Option<SectionId> {
        self.sessions.get(partition).copied()
    }

    /// 在某课程下就读的教学班
    pub fn section_for(&self, parent: OfferingId) -> Option<SectionId> {
        self.sections.get(&parent).copied()
    }

    /// 类型槽位当前分配 (None 表示该类型未配置)
    pub fn slot(&self, slot: &str) -> Option<Option<OfferingId>> {
        self.subjects
            .get(slot)
            .or_else(|| self.categories.get(slot))
            .copied()
    }

    pub fn is_slot_assigned(&self, slot: &str) -> bool {
        matches!(self.slot(slot), Some(Some(_)))
    }

    /// 校验同班约束: roster ⊇ prerequisites 且 roster ∩ not_alongside = ∅
    pub fn ok_classmates(&self, roster: &BTreeSet<StudentId>) -> bool {
        roster.is_superset(&self.prerequisites) && roster.is_disjoint(&self.not_alongside)
    }

    // ==========================================
    // 配置操作
    // ==========================================

    /// 设置班次 (已固定为其他班次时报错)
    pub(crate) fn set_shift(&mut self, shift: ShiftId) -> DomainResult<()> {
        match self.shift {
            Some(current) if current != shift => Err(DomainError::ShiftAlreadySet {
                student: self.code.clone(),
                current: current.to_string(),
                requested: shift.to_string(),
            }),
            _ => {
                self.shift = Some(shift);
                self.declared_shift = Some(shift);
                Ok(())
            }
        }
    }

    pub(crate) fn set_previous(&mut self, previous: StudentId) {
        self.previous = Some(previous);
    }

    pub(crate) fn add_prerequisite(&mut self, other: StudentId) -> DomainResult<()> {
        if other == self.id {
            return Err(DomainError::SelfReference(format!(
                "学生 {} 不能以自身为同班前提",
                self.code
            )));
        }
        if self.not_alongside.contains(&other) {
            return Err(DomainError::ConflictingRelation(format!(
                "学生 {} 已将 {} 列为不可同班",
                self.code, other
            )));
        }
        self.prerequisites.insert(other);
        Ok(())
    }

    pub(crate) fn add_not_alongside(&mut self, other: StudentId) -> DomainResult<()> {
        if other == self.id {
            return Err(DomainError::SelfReference(format!(
                "学生 {} 不能将自身列为不可同班",
                self.code
            )));
        }
        if self.prerequisites.contains(&other) {
            return Err(DomainError::ConflictingRelation(format!(
                "学生 {} 已将 {} 列为同班前提",
                self.code, other
            )));
        }
        self.not_alongside.insert(other);
        Ok(())
    }

    /// 往年记录: 直接登记已修课程
    pub(crate) fn add_attended(&mut self, offering: OfferingId) {
        self.recorded.insert(offering);
        self.attends.insert(offering);
    }

    // ==========================================
    // 录取记账 (由 School 在校验通过后调用)
    // ==========================================

    pub(crate) fn record_group(&mut self, parent: OfferingId, group: GroupId) {
        self.groups.insert(parent, group);
    }

    pub(crate) fn record_section(
        &mut self,
        parent: OfferingId,
        section: SectionId,
        partition: &str,
        shift: ShiftId,
    ) {
        self.sections.insert(parent, section);
        self.sessions.insert(partition.to_string(), section);
        if self.shift.is_none() {
            self.shift = Some(shift);
        }
    }

    pub(crate) fn record_offering(&mut self, kind: SlotKind, slot: &str, offering: OfferingId) {
        let slots = match kind {
            SlotKind::Subject => &mut self.subjects,
            SlotKind::Category => &mut self.categories,
        };
        slots.insert(slot.to_string(), Some(offering));
        self.attends.insert(offering);
    }

    /// 清空录取状态 (分组关系与志愿快照保留)
    pub(crate) fn reset_enrollment(&mut self) {
        self.shift = self.declared_shift;
        self.attends = self.recorded.clone();
        self.sections.clear();
        self.sessions.clear();
        self.categories.values_mut().for_each(|v| *v = None);
        self.subjects.values_mut().for_each(|v| *v = None);
        self.rankings.restore();
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}
