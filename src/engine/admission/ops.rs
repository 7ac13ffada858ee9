// ==========================================
// 录取引擎 - 事务化写操作
// ==========================================
// 每个操作: 先用 AdmissionCore 完成全部校验, 再一次性写入
// (名单 + 容量 + 学生映射 + 志愿)
// ==========================================

use super::core::AdmissionCore;
use crate::domain::error::{DomainError, DomainResult, Rejection};
use crate::domain::school::School;
use crate::domain::student::SlotKind;
use crate::domain::types::{Admission, GroupId, OfferingId, ProposalResult, SectionId, StudentId};
use tracing::{debug, info, instrument};

impl School {
    // ==========================================
    // 分组
    // ==========================================

    /// 学生加入分组
    pub fn join_group(&mut self, group_id: GroupId, student_id: StudentId) -> DomainResult<Admission> {
        let group = self.group(group_id)?;
        let student = self.student(student_id)?;
        if let Some(reason) = AdmissionCore::check_group(group, student) {
            debug!(
                student = %student.code(),
                group = %group.code(),
                reason = reason.code(),
                "入组被拒绝"
            );
            return Ok(Admission::Rejected(reason));
        }
        let parent = group.parent();

        self.group_mut(group_id)?.admit(student_id)?;
        self.student_mut(student_id)?.record_group(parent, group_id);
        Ok(Admission::Accepted)
    }

    // ==========================================
    // 教学班
    // ==========================================

    /// 单个教学班的录取闸门
    ///
    /// 只写教学班名单/容量与学生的 sections/sessions/shift, 不写课程层面
    pub fn add_to_section(&mut self, section_id: SectionId, student_id: StudentId) -> DomainResult<Admission> {
        let section = self.section(section_id)?;
        let student = self.student(student_id)?;
        if let Some(reason) = AdmissionCore::check_section(self, section, student)? {
            return Ok(Admission::Rejected(reason));
        }
        self.commit_section(section_id, student_id)?;
        Ok(Admission::Accepted)
    }

    fn commit_section(&mut self, section_id: SectionId, student_id: StudentId) -> DomainResult<()> {
        let section = self.section(section_id)?;
        let parent = section.parent();
        let shift = section.shift();
        let partition = section.partition().to_string();

        self.section_mut(section_id)?.admit(student_id)?;
        self.student_mut(student_id)?
            .record_section(parent, section_id, &partition, shift);
        Ok(())
    }

    // ==========================================
    // 课程/类别
    // ==========================================

    /// 课程/类别录取: 校验 → 选教学班 → 一次性写入
    ///
    /// # 返回
    /// (录取结果, 录取的教学班)
    fn admit_offering(
        &mut self,
        offering_id: OfferingId,
        student_id: StudentId,
        slot: &str,
        kind: SlotKind,
    ) -> DomainResult<(Admission, Option<SectionId>)> {
        let offering = self.offering(offering_id)?;
        let student = self.student(student_id)?;
        if let Some(reason) = AdmissionCore::check_offering(self, offering, student)? {
            return Ok((Admission::Rejected(reason), None));
        }

        // 无教学班的类别直接录取; 课程必须经教学班录取
        let section = if offering.sections().is_empty() && !offering.is_subject() {
            None
        } else {
            match AdmissionCore::first_compatible_section(self, offering, student)? {
                Some(section) => Some(section),
                None => {
                    return Ok((Admission::Rejected(Rejection::IncompatibleWithSections), None))
                }
            }
        };

        if let Some(section_id) = section {
            self.commit_section(section_id, student_id)?;
        }
        self.offering_mut(offering_id)?.admit(student_id)?;
        self.student_mut(student_id)?
            .record_offering(kind, slot, offering_id);
        Ok((Admission::Accepted, section))
    }

    /// 槽位必须已配置且未分配
    fn check_open_slot(&self, student_id: StudentId, slot: &str, offering: OfferingId) -> DomainResult<SlotKind> {
        let kind = self.check_slot(student_id, slot, offering)?;
        let student = self.student(student_id)?;
        if student.is_slot_assigned(slot) {
            return Err(DomainError::SlotAlreadyAssigned {
                student: student.code().to_string(),
                slot: slot.to_string(),
            });
        }
        Ok(kind)
    }

    /// 直接分配 (非志愿类型, 不修改志愿)
    pub fn assign(&mut self, student_id: StudentId, slot: &str, offering_id: OfferingId) -> DomainResult<ProposalResult> {
        let kind = self.check_open_slot(student_id, slot, offering_id)?;
        let (admission, section) = self.admit_offering(offering_id, student_id, slot, kind)?;
        if let Admission::Rejected(reason) = admission {
            debug!(
                student = %self.student(student_id)?.code(),
                offering = %self.offering(offering_id)?.label(),
                slot,
                reason = reason.code(),
                "直接分配被拒绝"
            );
        }
        Ok(ProposalResult {
            student: student_id,
            rank_type: slot.to_string(),
            offering: offering_id,
            admission,
            section,
        })
    }

    // ==========================================
    // 志愿提交
    // ==========================================

    /// 提交一次志愿: 取 final 志愿 index 处的课程尝试录取
    ///
    /// # 规则
    /// - 录取: 写入槽位/就读/教学班
    /// - 拒绝: 从 final 志愿移除该项并记录原因, 不再提交
    ///
    /// # 错误
    /// - 类型未要求排志愿 / 槽位已分配 / index 越界
    #[instrument(skip(self), level = "debug")]
    pub fn propose(&mut self, student_id: StudentId, rank_type: &str, index: usize) -> DomainResult<ProposalResult> {
        let student = self.student(student_id)?;
        if !self.grade_level(student.grade_level())?.is_ranked(rank_type) {
            return Err(DomainError::UnknownRankType(rank_type.to_string()));
        }
        let offering_id = student.rankings().final_rank().get(rank_type, index)?;
        let kind = self.check_open_slot(student_id, rank_type, offering_id)?;

        let (admission, section) = self.admit_offering(offering_id, student_id, rank_type, kind)?;

        if let Admission::Rejected(reason) = admission {
            let label = self.offering(offering_id)?.label();
            debug!(
                student = %self.student(student_id)?.code(),
                offering = %label,
                rank_type,
                reason = reason.code(),
                "志愿被拒绝"
            );
            self.student_mut(student_id)?
                .rankings_mut()
                .final_rank_mut()
                .reject(rank_type, index, reason, label)?;
        }

        Ok(ProposalResult {
            student: student_id,
            rank_type: rank_type.to_string(),
            offering: offering_id,
            admission,
            section,
        })
    }

    // ==========================================
    // 重置
    // ==========================================

    /// 清空全部录取结果并以 initial 恢复 final 志愿
    ///
    /// 分组关系与配置保留
    pub fn reset_enrollment(&mut self) {
        self.sections.iter_mut().for_each(|s| s.reset_enrollment());
        self.offerings.iter_mut().for_each(|o| o.reset_enrollment());
        self.students.iter_mut().for_each(|s| s.reset_enrollment());
        info!(
            students = self.students.len(),
            offerings = self.offerings.len(),
            sections = self.sections.len(),
            "录取结果已重置"
        );
    }
}
