// ==========================================
// 选课分班系统 - 学校对象图 (arena)
// ==========================================
// 职责: 持有全部实体, 提供配置操作与查询
// 红线: 实体之间只通过 typed id 引用, 每个实体独占自己的容器
// 红线: 每次匹配使用独立的 School, 不共享全局状态
// ==========================================
// 录取/志愿提交等状态变更见 engine::admission
// ==========================================

use crate::domain::capacity::Capacity;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::grade_level::GradeLevel;
use crate::domain::group::Group;
use crate::domain::offering::{Offering, OfferingKind};
use crate::domain::section::Section;
use crate::domain::shift::{ParallelSession, Shift};
use crate::domain::student::{SlotKind, Student};
use crate::domain::types::{GradeLevelId, GroupId, OfferingId, SectionId, ShiftId, StudentId};
use std::collections::{BTreeSet, HashMap};

/// 学校对象图
#[derive(Debug, Clone, Default)]
pub struct School {
    pub(crate) shifts: Vec<Shift>,
    pub(crate) grade_levels: Vec<GradeLevel>,
    pub(crate) offerings: Vec<Offering>,
    pub(crate) sections: Vec<Section>,
    pub(crate) groups: Vec<Group>,
    pub(crate) students: Vec<Student>,

    // ===== 查找索引 =====
    shift_index: HashMap<String, ShiftId>,
    grade_index: HashMap<u32, GradeLevelId>,
    offering_index: HashMap<String, OfferingId>,
    group_index: HashMap<(OfferingId, String), GroupId>,
    student_index: HashMap<(GradeLevelId, String), StudentId>,
}

fn unknown(kind: &'static str, id: impl ToString) -> DomainError {
    DomainError::UnknownEntity {
        kind,
        id: id.to_string(),
    }
}

impl School {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================
    // 实体访问
    // ==========================================

    pub fn shift(&self, id: ShiftId) -> DomainResult<&Shift> {
        self.shifts.get(id.index()).ok_or_else(|| unknown("shift", id))
    }

    pub fn grade_level(&self, id: GradeLevelId) -> DomainResult<&GradeLevel> {
        self.grade_levels
            .get(id.index())
            .ok_or_else(|| unknown("grade_level", id))
    }

    pub fn offering(&self, id: OfferingId) -> DomainResult<&Offering> {
        self.offerings
            .get(id.index())
            .ok_or_else(|| unknown("offering", id))
    }

    pub(crate) fn offering_mut(&mut self, id: OfferingId) -> DomainResult<&mut Offering> {
        self.offerings
            .get_mut(id.index())
            .ok_or_else(|| unknown("offering", id))
    }

    pub fn section(&self, id: SectionId) -> DomainResult<&Section> {
        self.sections
            .get(id.index())
            .ok_or_else(|| unknown("section", id))
    }

    pub(crate) fn section_mut(&mut self, id: SectionId) -> DomainResult<&mut Section> {
        self.sections
            .get_mut(id.index())
            .ok_or_else(|| unknown("section", id))
    }

    pub fn group(&self, id: GroupId) -> DomainResult<&Group> {
        self.groups.get(id.index()).ok_or_else(|| unknown("group", id))
    }

    pub(crate) fn group_mut(&mut self, id: GroupId) -> DomainResult<&mut Group> {
        self.groups
            .get_mut(id.index())
            .ok_or_else(|| unknown("group", id))
    }

    pub fn student(&self, id: StudentId) -> DomainResult<&Student> {
        self.students
            .get(id.index())
            .ok_or_else(|| unknown("student", id))
    }

    pub(crate) fn student_mut(&mut self, id: StudentId) -> DomainResult<&mut Student> {
        self.students
            .get_mut(id.index())
            .ok_or_else(|| unknown("student", id))
    }

    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    pub fn grade_levels(&self) -> &[GradeLevel] {
        &self.grade_levels
    }

    pub fn offerings(&self) -> &[Offering] {
        &self.offerings
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    // ==========================================
    // 查找
    // ==========================================

    pub fn find_shift(&self, code: &str) -> Option<ShiftId> {
        self.shift_index.get(code).copied()
    }

    pub fn find_grade_level(&self, grade_level: u32) -> Option<GradeLevelId> {
        self.grade_index.get(&grade_level).copied()
    }

    /// 按显示名查找课程/类别; 未命中时按名称查找 (名称唯一时)
    pub fn find_offering(&self, label: &str) -> Option<OfferingId> {
        if let Some(id) = self.offering_index.get(label) {
            return Some(*id);
        }
        let mut by_name = self.offerings.iter().filter(|o| o.name() == label);
        match (by_name.next(), by_name.next()) {
            (Some(offering), None) => Some(offering.id()),
            _ => None,
        }
    }

    pub fn find_group(&self, parent: OfferingId, code: &str) -> Option<GroupId> {
        self.group_index.get(&(parent, code.to_string())).copied()
    }

    pub fn find_student(&self, grade_level: GradeLevelId, code: &str) -> Option<StudentId> {
        self.student_index
            .get(&(grade_level, code.to_string()))
            .copied()
    }

    /// 教学班显示名: 显式名称, 否则 "{课程} {时段}"
    pub fn section_label(&self, id: SectionId) -> DomainResult<String> {
        let section = self.section(id)?;
        if let Some(name) = section.name() {
            return Ok(name.to_string());
        }
        let parent = self.offering(section.parent())?;
        Ok(format!("{} {}", parent.label(), section.parallel_session()))
    }

    // ==========================================
    // 配置: 班次 / 年级
    // ==========================================

    pub fn add_shift<I, P>(&mut self, code: &str, partitions: I) -> DomainResult<ShiftId>
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        if self.shift_index.contains_key(code) {
            return Err(DomainError::DuplicateId {
                kind: "shift",
                id: code.to_string(),
            });
        }
        let id = ShiftId(self.shifts.len());
        let mut shift = Shift::new(id, code);
        for partition in partitions {
            shift.add_partition(partition)?;
        }
        self.shifts.push(shift);
        self.shift_index.insert(code.to_string(), id);
        Ok(id)
    }

    pub fn add_grade_level(
        &mut self,
        grade_level: u32,
        to_rank: BTreeSet<String>,
        category_types: BTreeSet<String>,
        subject_types: BTreeSet<String>,
    ) -> DomainResult<GradeLevelId> {
        if self.grade_index.contains_key(&grade_level) {
            return Err(DomainError::DuplicateId {
                kind: "grade_level",
                id: grade_level.to_string(),
            });
        }
        let id = GradeLevelId(self.grade_levels.len());
        let grade = GradeLevel::new(id, grade_level, to_rank, category_types, subject_types)?;
        self.grade_levels.push(grade);
        self.grade_index.insert(grade_level, id);
        Ok(id)
    }

    // ==========================================
    // 配置: 课程 / 类别 / 教学班
    // ==========================================

    /// 添加课程或类别
    ///
    /// # 参数
    /// - capacity: None 表示课程层面不限 (仍受教学班容量约束)
    /// - max_group_members: 该课程下分组人数上限, None 表示不限
    pub fn add_offering(
        &mut self,
        name: &str,
        offering_type: &str,
        kind: OfferingKind,
        capacity: Option<Capacity>,
        max_group_members: Option<u32>,
    ) -> DomainResult<OfferingId> {
        let id = OfferingId(self.offerings.len());
        let offering = Offering::new(id, name, offering_type, kind, capacity, max_group_members);
        let label = offering.label();
        if self.offering_index.contains_key(&label) {
            return Err(DomainError::DuplicateId {
                kind: "offering",
                id: label,
            });
        }
        self.offerings.push(offering);
        self.offering_index.insert(label, id);
        Ok(id)
    }

    pub fn add_category(
        &mut self,
        name: &str,
        offering_type: &str,
        capacity: Option<Capacity>,
    ) -> DomainResult<OfferingId> {
        self.add_offering(name, offering_type, OfferingKind::Category, capacity, None)
    }

    pub fn add_subject(
        &mut self,
        name: &str,
        offering_type: &str,
        level: Option<u32>,
        teaches: &[GradeLevelId],
    ) -> DomainResult<OfferingId> {
        let id = self.add_offering(
            name,
            offering_type,
            OfferingKind::subject(level, false),
            None,
            None,
        )?;
        for grade in teaches {
            self.add_taught(id, *grade)?;
        }
        Ok(id)
    }

    /// 添加教学班 (容量汇总到所属课程)
    pub fn add_section(
        &mut self,
        parent: OfferingId,
        shift: ShiftId,
        partition: &str,
        index: Option<u32>,
        capacity: Capacity,
        name: Option<String>,
    ) -> DomainResult<SectionId> {
        self.offering(parent)?;
        let session = ParallelSession::new(self.shift(shift)?, partition, index)?;
        let id = SectionId(self.sections.len());
        let section = Section::new(id, parent, session, capacity, name);
        self.attach_section(parent, section)
    }

    fn attach_section(&mut self, parent: OfferingId, section: Section) -> DomainResult<SectionId> {
        if section.parent() != parent {
            return Err(DomainError::SectionParentMismatch {
                section: section.id().to_string(),
                offering: parent.to_string(),
            });
        }
        let id = section.id();
        let capacity = *section.capacity();
        self.offering_mut(parent)?.attach_section(id, &capacity)?;
        self.sections.push(section);
        Ok(id)
    }

    pub fn add_offering_prerequisites<I>(&mut self, offering: OfferingId, objects: I) -> DomainResult<()>
    where
        I: IntoIterator<Item = OfferingId>,
    {
        let objects: BTreeSet<OfferingId> = objects.into_iter().collect();
        for object in &objects {
            self.offering(*object)?;
        }
        self.offering_mut(offering)?.add_prerequisites(objects)
    }

    pub fn add_offering_not_alongside(&mut self, offering: OfferingId, object: OfferingId) -> DomainResult<()> {
        self.offering(object)?;
        self.offering_mut(offering)?.add_not_alongside(object)
    }

    pub fn add_taught(&mut self, subject: OfferingId, grade_level: GradeLevelId) -> DomainResult<()> {
        self.grade_level(grade_level)?;
        self.offering_mut(subject)?.add_taught(grade_level)
    }

    // ==========================================
    // 配置: 分组
    // ==========================================

    pub fn add_group(&mut self, parent: OfferingId, code: &str, required: bool) -> DomainResult<GroupId> {
        let max_members = self.offering(parent)?.max_group_members();
        let key = (parent, code.to_string());
        if self.group_index.contains_key(&key) {
            return Err(DomainError::DuplicateId {
                kind: "group",
                id: code.to_string(),
            });
        }
        let id = GroupId(self.groups.len());
        self.groups
            .push(Group::new(id, code, parent, required, max_members));
        self.group_index.insert(key, id);
        Ok(id)
    }

    // ==========================================
    // 配置: 学生
    // ==========================================

    pub fn add_student(&mut self, code: &str, grade_level: GradeLevelId) -> DomainResult<StudentId> {
        let key = (grade_level, code.to_string());
        if self.student_index.contains_key(&key) {
            return Err(DomainError::DuplicateId {
                kind: "student",
                id: code.to_string(),
            });
        }
        let id = StudentId(self.students.len());
        let student = Student::new(id, code, self.grade_level(grade_level)?);
        self.students.push(student);
        self.student_index.insert(key, id);
        Ok(id)
    }

    pub fn set_student_shift(&mut self, student: StudentId, shift: ShiftId) -> DomainResult<()> {
        self.shift(shift)?;
        self.student_mut(student)?.set_shift(shift)
    }

    /// 关联往年记录 (往年年级必须严格低于当前年级)
    pub fn set_previous(&mut self, student: StudentId, previous: StudentId) -> DomainResult<()> {
        let current = self.grade_level(self.student(student)?.grade_level())?.grade_level();
        let earlier = self.grade_level(self.student(previous)?.grade_level())?.grade_level();
        if earlier >= current {
            return Err(DomainError::PreviousGradeNotLower {
                previous: earlier,
                current,
            });
        }
        self.student_mut(student)?.set_previous(previous);
        Ok(())
    }

    /// 创建同一学生的往年记录并关联
    pub fn add_previous_record(&mut self, student: StudentId, grade_level: GradeLevelId) -> DomainResult<StudentId> {
        let code = self.student(student)?.code().to_string();
        let previous = match self.find_student(grade_level, &code) {
            Some(existing) => existing,
            None => self.add_student(&code, grade_level)?,
        };
        self.set_previous(student, previous)?;
        Ok(previous)
    }

    /// 往年记录登记已修课程
    pub fn record_taken(&mut self, record: StudentId, offering: OfferingId) -> DomainResult<()> {
        self.offering(offering)?;
        self.student_mut(record)?.add_attended(offering);
        Ok(())
    }

    pub fn add_student_prerequisite(&mut self, student: StudentId, other: StudentId) -> DomainResult<()> {
        self.student(other)?;
        self.student_mut(student)?.add_prerequisite(other)
    }

    pub fn add_student_not_alongside(&mut self, student: StudentId, other: StudentId) -> DomainResult<()> {
        self.student(other)?;
        self.student_mut(student)?.add_not_alongside(other)
    }

    /// 校验槽位: 类型在年级中按课程/类别种类配置, 且与课程自身类型一致
    pub(crate) fn check_slot(&self, student: StudentId, slot: &str, offering: OfferingId) -> DomainResult<SlotKind> {
        let grade = self.grade_level(self.student(student)?.grade_level())?;
        let offering = self.offering(offering)?;
        let kind = offering.kind().slot_kind();
        let configured = match kind {
            SlotKind::Subject => grade.subject_types(),
            SlotKind::Category => grade.category_types(),
        };
        if !configured.contains(slot) {
            return Err(DomainError::SlotNotConfigured {
                grade_level: grade.grade_level(),
                kind: kind.as_str(),
                slot: slot.to_string(),
            });
        }
        if offering.offering_type() != slot {
            return Err(DomainError::SlotTypeMismatch {
                offering: offering.label(),
                offering_type: offering.offering_type().to_string(),
                slot: slot.to_string(),
            });
        }
        Ok(kind)
    }

    /// 录入志愿 (initial 与 final 同步写入)
    pub fn add_ranking(&mut self, student: StudentId, rank_type: &str, offering: OfferingId) -> DomainResult<()> {
        let grade = self.grade_level(self.student(student)?.grade_level())?;
        if !grade.is_ranked(rank_type) {
            return Err(DomainError::UnknownRankType(rank_type.to_string()));
        }
        self.check_slot(student, rank_type, offering)?;
        self.student_mut(student)?
            .rankings_mut()
            .add(rank_type, offering)
    }

    /// 以给定顺序替换 final 志愿 (initial 不变)
    ///
    /// 全部校验通过后才清空并写入, 失败时 final 志愿保持原样
    pub fn default_ranking(&mut self, student: StudentId, rank_type: &str, offerings: &[OfferingId]) -> DomainResult<()> {
        let grade = self.grade_level(self.student(student)?.grade_level())?;
        if !grade.is_ranked(rank_type) {
            return Err(DomainError::UnknownRankType(rank_type.to_string()));
        }
        let mut seen = BTreeSet::new();
        for offering in offerings {
            self.check_slot(student, rank_type, *offering)?;
            if !seen.insert(*offering) {
                return Err(DomainError::DuplicatePreference {
                    rank_type: rank_type.to_string(),
                    offering: self.offering(*offering)?.label(),
                });
            }
        }
        let rank = self.student_mut(student)?.rankings_mut().final_rank_mut();
        rank.clear(Some(rank_type))?;
        for offering in offerings {
            rank.add(rank_type, *offering)?;
        }
        Ok(())
    }

    // ==========================================
    // 学生查询
    // ==========================================

    /// 往年已修课程 (无往年记录时为空)
    pub fn taken(&self, student: StudentId) -> DomainResult<BTreeSet<OfferingId>> {
        match self.student(student)?.previous() {
            Some(previous) => Ok(self.student(previous)?.attends().clone()),
            None => Ok(BTreeSet::new()),
        }
    }

    /// final 志愿中是否存在该层级的课程
    pub fn has_enlisted_level(&self, student: StudentId, level: u32) -> DomainResult<bool> {
        let student = self.student(student)?;
        let rank = student.rankings().final_rank();
        for rank_type in rank.types() {
            for offering in rank.all(rank_type)? {
                if self.offering(*offering)?.level() == Some(level) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// 往年已修或当前就读中是否存在该层级的课程
    pub fn has_level(&self, student: StudentId, level: u32) -> DomainResult<bool> {
        let taken = self.taken(student)?;
        let attends = self.student(student)?.attends();
        for offering in taken.iter().chain(attends.iter()) {
            let offering = self.offering(*offering)?;
            if offering.is_subject() && offering.level() == Some(level) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn school() -> (School, GradeLevelId, GradeLevelId) {
        let mut school = School::new();
        let g11 = school
            .add_grade_level(11, set(&["Core"]), set(&["Club"]), set(&["Core"]))
            .unwrap();
        let g12 = school
            .add_grade_level(12, set(&["Core"]), set(&["Club"]), set(&["Core"]))
            .unwrap();
        (school, g11, g12)
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let (mut school, g11, _) = school();
        school.add_shift("AM", ["P", "Q"]).unwrap();
        assert!(school.add_shift("AM", ["P"]).is_err());
        assert!(school.add_shift("PM", ["P", "P"]).is_err());
        assert!(school
            .add_grade_level(11, set(&[]), set(&[]), set(&[]))
            .is_err());

        school.add_student("S1", g11).unwrap();
        assert!(school.add_student("S1", g11).is_err());

        school.add_subject("Math", "Core", Some(1), &[g11]).unwrap();
        assert!(school.add_subject("Math", "Core", Some(1), &[g11]).is_err());
        // 不同层级显示名不同
        school.add_subject("Math", "Core", Some(2), &[g11]).unwrap();
    }

    #[test]
    fn test_find_offering_by_label_then_unique_name() {
        let (mut school, g11, _) = school();
        let math1 = school.add_subject("Math", "Core", Some(1), &[g11]).unwrap();
        let art = school.add_subject("Art", "Core", None, &[g11]).unwrap();

        assert_eq!(school.find_offering("Math Level1"), Some(math1));
        assert_eq!(school.find_offering("Math"), Some(math1));
        assert_eq!(school.find_offering("Art"), Some(art));

        school.add_subject("Math", "Core", Some(2), &[g11]).unwrap();
        assert_eq!(school.find_offering("Math"), None);
    }

    #[test]
    fn test_section_label_and_rollup() {
        let (mut school, g11, _) = school();
        let am = school.add_shift("AM", ["P"]).unwrap();
        let math = school.add_subject("Math", "Core", None, &[g11]).unwrap();
        let section = school
            .add_section(math, am, "P", Some(1), Capacity::new(0, 0, 3).unwrap(), None)
            .unwrap();
        assert_eq!(school.section_label(section).unwrap(), "Math P1");
        assert!(school
            .add_section(math, am, "Z", None, Capacity::new(0, 0, 3).unwrap(), None)
            .is_err());
        assert_eq!(school.offering(math).unwrap().sections(), &[section]);
    }

    #[test]
    fn test_previous_record_must_be_lower_grade() {
        let (mut school, g11, g12) = school();
        let senior = school.add_student("S1", g12).unwrap();
        let peer = school.add_student("S2", g12).unwrap();
        assert!(matches!(
            school.set_previous(senior, peer),
            Err(DomainError::PreviousGradeNotLower { .. })
        ));

        let record = school.add_previous_record(senior, g11).unwrap();
        let art = school.add_subject("Art", "Core", Some(3), &[g11]).unwrap();
        school.record_taken(record, art).unwrap();

        assert!(school.taken(senior).unwrap().contains(&art));
        assert!(school.has_level(senior, 3).unwrap());
        assert!(!school.has_level(senior, 2).unwrap());
    }

    #[test]
    fn test_ranking_requires_ranked_and_configured_slot() {
        let (mut school, g11, _) = school();
        let student = school.add_student("S1", g11).unwrap();
        let math = school.add_subject("Math", "Core", Some(2), &[g11]).unwrap();
        let choir = school.add_category("Choir", "Club", None).unwrap();

        school.add_ranking(student, "Core", math).unwrap();
        assert!(matches!(
            school.add_ranking(student, "Club", choir),
            Err(DomainError::UnknownRankType(_))
        ));
        assert!(matches!(
            school.add_ranking(student, "Core", choir),
            Err(DomainError::SlotNotConfigured { .. })
        ));
        assert!(school.has_enlisted_level(student, 2).unwrap());
    }

    #[test]
    fn test_default_ranking_replaces_final_only() {
        let (mut school, g11, _) = school();
        let student = school.add_student("S1", g11).unwrap();
        let a = school.add_subject("A", "Core", None, &[g11]).unwrap();
        let b = school.add_subject("B", "Core", None, &[g11]).unwrap();
        school.add_ranking(student, "Core", a).unwrap();

        school.default_ranking(student, "Core", &[b, a]).unwrap();
        let rankings = school.student(student).unwrap().rankings();
        assert_eq!(rankings.final_rank().all("Core").unwrap(), &[b, a]);
        assert_eq!(rankings.initial().all("Core").unwrap(), &[a]);
    }

    #[test]
    fn test_default_ranking_failure_keeps_final() {
        let (mut school, g11, _) = school();
        let student = school.add_student("S1", g11).unwrap();
        let a = school.add_subject("A", "Core", None, &[g11]).unwrap();
        let b = school.add_subject("B", "Core", None, &[g11]).unwrap();
        let c = school.add_subject("C", "Elective", None, &[g11]).unwrap();
        school.add_ranking(student, "Core", a).unwrap();
        school.add_ranking(student, "Core", b).unwrap();

        assert!(matches!(
            school.default_ranking(student, "Core", &[b, b]),
            Err(DomainError::DuplicatePreference { .. })
        ));
        assert!(matches!(
            school.default_ranking(student, "Core", &[b, c]),
            Err(DomainError::SlotTypeMismatch { .. })
        ));
        let rankings = school.student(student).unwrap().rankings();
        assert_eq!(rankings.final_rank().all("Core").unwrap(), &[a, b]);
    }
}
