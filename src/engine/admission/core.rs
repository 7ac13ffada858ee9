// ==========================================
// 录取引擎 - 纯校验函数
// ==========================================
// 红线: 只读 School, 无副作用
// 返回约定: Ok(None) 表示通过, Ok(Some(reason)) 表示拒绝
// ==========================================

use crate::domain::error::{DomainResult, Rejection};
use crate::domain::group::Group;
use crate::domain::offering::Offering;
use crate::domain::school::School;
use crate::domain::section::Section;
use crate::domain::student::Student;
use crate::domain::types::SectionId;

pub struct AdmissionCore;

impl AdmissionCore {
    /// 入组校验
    ///
    /// # 规则 (按顺序)
    /// 1. 已是成员 → AlreadyMember
    /// 2. 分组已满 → Full
    /// 3. 同伴约束不满足 → IncompatibleClassmates
    /// 4. 同一课程下已有分组 → AlreadyGrouped
    ///
    /// 入组时不校验班次, 班次一致性在入班时检查
    pub fn check_group(group: &Group, student: &Student) -> Option<Rejection> {
        if group.contains(student.id()) {
            return Some(Rejection::AlreadyMember);
        }
        if group.capacity().is_full() {
            return Some(Rejection::Full);
        }
        if !student.ok_classmates(group.students()) {
            return Some(Rejection::IncompatibleClassmates);
        }
        if student.groups().contains_key(&group.parent()) {
            return Some(Rejection::AlreadyGrouped);
        }
        None
    }

    /// 入班校验
    ///
    /// # 规则 (按顺序, 容量优先)
    /// 1. 教学班已满 → Full
    /// 2. 学生班次已定且不同 → IncompatibleShift
    /// 3. 同一分区已有教学班 → AlreadyInParallelSession
    /// 4. 同班约束不满足 → IncompatibleClassmates
    /// 5. required 分组同伴冲突 → IncompatibleGroupmates
    pub fn check_section(
        school: &School,
        section: &Section,
        student: &Student,
    ) -> DomainResult<Option<Rejection>> {
        if section.capacity().is_full() {
            return Ok(Some(Rejection::Full));
        }
        if student.shift().is_some_and(|shift| shift != section.shift()) {
            return Ok(Some(Rejection::IncompatibleShift));
        }
        if student.session(section.partition()).is_some() {
            return Ok(Some(Rejection::AlreadyInParallelSession));
        }
        if !student.ok_classmates(section.students()) {
            return Ok(Some(Rejection::IncompatibleClassmates));
        }
        if !Self::ok_groupmates(school, section, student)? {
            return Ok(Some(Rejection::IncompatibleGroupmates));
        }
        Ok(None)
    }

    /// required 分组同伴校验
    ///
    /// # 规则
    /// - 同一课程: 已入班的同伴必须在本教学班
    /// - 任意 required 分组: 同伴班次已定时必须与本教学班一致
    pub fn ok_groupmates(school: &School, section: &Section, student: &Student) -> DomainResult<bool> {
        for (parent, group_id) in student.groups() {
            let group = school.group(*group_id)?;
            if !group.required() {
                continue;
            }
            for mate_id in group.students() {
                if *mate_id == student.id() {
                    continue;
                }
                let mate = school.student(*mate_id)?;
                if *parent == section.parent() {
                    if let Some(seated) = mate.section_for(*parent) {
                        if seated != section.id() {
                            return Ok(false);
                        }
                    }
                }
                if mate.shift().is_some_and(|shift| shift != section.shift()) {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// 先修与互斥校验
    ///
    /// # 规则
    /// - 每个先修组至少有一门出现在往年已修 → 否则 PrerequisitesNotMet
    /// - 当前就读不得与互斥课程重叠 → 否则 ConflictsWithAttended
    pub fn ok_student(school: &School, offering: &Offering, student: &Student) -> DomainResult<Option<Rejection>> {
        let taken = school.taken(student.id())?;
        if offering
            .prerequisites()
            .iter()
            .any(|tuple| tuple.is_disjoint(&taken))
        {
            return Ok(Some(Rejection::PrerequisitesNotMet));
        }
        if !student.attends().is_disjoint(offering.not_alongside()) {
            return Ok(Some(Rejection::ConflictsWithAttended));
        }
        Ok(None)
    }

    /// 课程/类别层面的录取校验 (教学班之前)
    ///
    /// # 规则 (按顺序)
    /// 1. 容量已满 → Full
    /// 2. 已在就读 → AlreadyAttending
    /// 3. 先修/互斥 (见 ok_student)
    /// 4. 不可重修且往年已修 → AlreadyTaken
    /// 5. 课程不适用于学生年级 → GradeLevelIncompatible
    pub fn check_offering(
        school: &School,
        offering: &Offering,
        student: &Student,
    ) -> DomainResult<Option<Rejection>> {
        if offering.capacity().is_full() {
            return Ok(Some(Rejection::Full));
        }
        if student.attends().contains(&offering.id()) {
            return Ok(Some(Rejection::AlreadyAttending));
        }
        if let Some(reason) = Self::ok_student(school, offering, student)? {
            return Ok(Some(reason));
        }
        if !offering.repeatable() && school.taken(student.id())?.contains(&offering.id()) {
            return Ok(Some(Rejection::AlreadyTaken));
        }
        if let Some(teaches) = offering.teaches() {
            if !teaches.contains(&student.grade_level()) {
                return Ok(Some(Rejection::GradeLevelIncompatible));
            }
        }
        Ok(None)
    }

    /// 按添加顺序找到第一个可入的教学班
    pub fn first_compatible_section(
        school: &School,
        offering: &Offering,
        student: &Student,
    ) -> DomainResult<Option<SectionId>> {
        for section_id in offering.sections() {
            let section = school.section(*section_id)?;
            if Self::check_section(school, section, student)?.is_none() {
                return Ok(Some(*section_id));
            }
        }
        Ok(None)
    }
}
