// ==========================================
// 选课分班系统 - 场景装载器
// ==========================================
// 职责: ScenarioSpec → School 对象图
// 顺序: 班次 → 年级 → 课程/类别 → 先修/互斥 → 教学班 → 分组
//       → 学生 (记录/往年/同伴/分组/志愿) → 直接分配
// 红线: 引用错误/配置错误立即失败
// 入组/直接分配被拒绝属于录取结果, 记入 LoadSummary 后继续
// ==========================================

use crate::domain::capacity::Capacity;
use crate::domain::error::Rejection;
use crate::domain::offering::OfferingKind;
use crate::domain::school::School;
use crate::domain::types::{Admission, GradeLevelId, OfferingId, ShiftId, StudentId};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::scenario::{CapacitySpec, OfferingKindSpec, ScenarioSpec, StudentSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{info, instrument, warn};

/// 装载过程中被拒绝的入组/直接分配
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadRejection {
    pub student: String,
    /// "group" 或 "assignment"
    pub action: String,
    pub target: String,
    pub reason: Rejection,
}

/// 装载统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub shifts: usize,
    pub grade_levels: usize,
    pub offerings: usize,
    pub sections: usize,
    pub groups: usize,
    pub students: usize,
    pub history_records: usize,
    pub rankings: usize,
    pub assignments: usize,
    pub rejected: Vec<LoadRejection>,
}

#[derive(Debug, Clone)]
pub struct LoadedScenario {
    pub school: School,
    pub summary: LoadSummary,
}

pub struct ScenarioLoader;

impl ScenarioLoader {
    /// 读取 JSON 场景文件
    pub fn load_file(path: impl AsRef<Path>) -> ImportResult<ScenarioSpec> {
        let path = path.as_ref();

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if ext != "json" {
            return Err(ImportError::UnsupportedFormat(ext.to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        Ok(ScenarioSpec::from_json_str(&content)?)
    }

    /// 构建对象图
    #[instrument(skip(spec), fields(students = spec.students.len(), offerings = spec.offerings.len()))]
    pub fn build(spec: &ScenarioSpec) -> ImportResult<LoadedScenario> {
        let mut school = School::new();
        let mut summary = LoadSummary::default();

        // ==========================================
        // 步骤1: 班次 / 年级
        // ==========================================
        for shift in &spec.shifts {
            school.add_shift(&shift.code, &shift.partitions)?;
            summary.shifts += 1;
        }
        for grade in &spec.grade_levels {
            school.add_grade_level(
                grade.grade_level,
                to_set(&grade.to_rank),
                to_set(&grade.category_types),
                to_set(&grade.subject_types),
            )?;
            summary.grade_levels += 1;
        }

        // ==========================================
        // 步骤2: 课程/类别
        // ==========================================
        let mut offering_ids = Vec::with_capacity(spec.offerings.len());
        for offering in &spec.offerings {
            let kind = match offering.kind {
                OfferingKindSpec::Category => OfferingKind::Category,
                OfferingKindSpec::Subject => OfferingKind::subject(offering.level, offering.repeatable),
            };
            let capacity = offering.capacity.as_ref().map(to_capacity).transpose()?;
            let id = school.add_offering(
                &offering.name,
                &offering.offering_type,
                kind,
                capacity,
                offering.max_group_members,
            )?;
            for grade_level in &offering.teaches {
                let grade = resolve_grade(&school, *grade_level)?;
                school.add_taught(id, grade)?;
            }
            offering_ids.push(id);
        }
        summary.offerings = offering_ids.len();

        // ==========================================
        // 步骤3: 先修 / 互斥 / 教学班
        // ==========================================
        for (offering, id) in spec.offerings.iter().zip(offering_ids.iter().copied()) {
            for tuple in &offering.prerequisites {
                let objects = tuple
                    .iter()
                    .map(|label| resolve_offering(&school, label))
                    .collect::<ImportResult<Vec<_>>>()?;
                school.add_offering_prerequisites(id, objects)?;
            }
            for label in &offering.not_alongside {
                let object = resolve_offering(&school, label)?;
                school.add_offering_not_alongside(id, object)?;
            }
        }
        for (offering, id) in spec.offerings.iter().zip(offering_ids.iter().copied()) {
            for section in &offering.sections {
                let shift = resolve_shift(&school, &section.shift)?;
                school.add_section(
                    id,
                    shift,
                    &section.partition,
                    section.index,
                    to_capacity(&section.capacity)?,
                    section.name.clone(),
                )?;
                summary.sections += 1;
            }
        }

        // ==========================================
        // 步骤4: 分组
        // ==========================================
        for group in &spec.groups {
            let parent = resolve_offering(&school, &group.offering)?;
            school.add_group(parent, &group.code, group.required)?;
            summary.groups += 1;
        }

        info!(
            shifts = summary.shifts,
            grade_levels = summary.grade_levels,
            offerings = summary.offerings,
            sections = summary.sections,
            groups = summary.groups,
            "学校配置装载完成"
        );

        // ==========================================
        // 步骤5: 学生
        // ==========================================
        let mut student_ids = Vec::with_capacity(spec.students.len());
        for student in &spec.students {
            student_ids.push(Self::add_student_record(&mut school, student, &mut summary)?);
        }
        for (student, id) in spec.students.iter().zip(student_ids.iter().copied()) {
            Self::link_student(&mut school, student, id, &mut summary)?;
        }

        // ==========================================
        // 步骤6: 直接分配 (全部学生就绪后)
        // ==========================================
        for (student, id) in spec.students.iter().zip(student_ids.iter().copied()) {
            for (slot, label) in &student.assignments {
                let offering = resolve_offering(&school, label)?;
                let result = school.assign(id, slot, offering)?;
                match result.admission {
                    Admission::Accepted => summary.assignments += 1,
                    Admission::Rejected(reason) => {
                        warn!(student = %student.code, slot = %slot, offering = %label, reason = %reason, "直接分配被拒绝");
                        summary.rejected.push(LoadRejection {
                            student: student.code.clone(),
                            action: "assignment".to_string(),
                            target: label.clone(),
                            reason,
                        });
                    }
                }
            }
        }

        info!(
            students = summary.students,
            history_records = summary.history_records,
            rankings = summary.rankings,
            assignments = summary.assignments,
            rejected = summary.rejected.len(),
            "学生数据装载完成"
        );

        Ok(LoadedScenario { school, summary })
    }

    /// 学生记录 + 班次 + 往年记录
    fn add_student_record(school: &mut School, student: &StudentSpec, summary: &mut LoadSummary) -> ImportResult<StudentId> {
        let grade = resolve_grade(school, student.grade_level)?;
        let id = school.add_student(&student.code, grade)?;
        if let Some(shift) = &student.shift {
            let shift = resolve_shift(school, shift)?;
            school.set_student_shift(id, shift)?;
        }
        if let Some(previous) = &student.previous {
            let previous_grade = resolve_grade(school, previous.grade_level)?;
            let record = school.add_previous_record(id, previous_grade)?;
            for label in &previous.taken {
                let offering = resolve_offering(school, label)?;
                school.record_taken(record, offering)?;
            }
            summary.history_records += 1;
        }
        summary.students += 1;
        Ok(id)
    }

    /// 同伴约束 + 分组 + 志愿
    fn link_student(
        school: &mut School,
        student: &StudentSpec,
        id: StudentId,
        summary: &mut LoadSummary,
    ) -> ImportResult<()> {
        let grade = resolve_grade(school, student.grade_level)?;
        for code in &student.prerequisites {
            let other = resolve_student(school, grade, code)?;
            school.add_student_prerequisite(id, other)?;
        }
        for code in &student.not_alongside {
            let other = resolve_student(school, grade, code)?;
            school.add_student_not_alongside(id, other)?;
        }

        for (label, code) in &student.groups {
            let parent = resolve_offering(school, label)?;
            // 未声明的分组按 required 创建
            let group = match school.find_group(parent, code) {
                Some(group) => group,
                None => {
                    summary.groups += 1;
                    school.add_group(parent, code, true)?
                }
            };
            if let Admission::Rejected(reason) = school.join_group(group, id)? {
                warn!(student = %student.code, group = %code, reason = %reason, "入组被拒绝");
                summary.rejected.push(LoadRejection {
                    student: student.code.clone(),
                    action: "group".to_string(),
                    target: code.clone(),
                    reason,
                });
            }
        }

        for (rank_type, labels) in &student.rankings {
            for label in labels {
                let offering = resolve_offering(school, label)?;
                school.add_ranking(id, rank_type, offering)?;
                summary.rankings += 1;
            }
        }
        Ok(())
    }
}

// ==========================================
// 引用解析
// ==========================================

fn to_set(items: &[String]) -> BTreeSet<String> {
    items.iter().cloned().collect()
}

fn to_capacity(spec: &CapacitySpec) -> ImportResult<Capacity> {
    Ok(Capacity::new(spec.minimum, spec.ideal, spec.maximum)?)
}

fn resolve_offering(school: &School, label: &str) -> ImportResult<OfferingId> {
    school
        .find_offering(label)
        .ok_or_else(|| ImportError::UnknownReference {
            kind: "offering",
            name: label.to_string(),
        })
}

fn resolve_shift(school: &School, code: &str) -> ImportResult<ShiftId> {
    school
        .find_shift(code)
        .ok_or_else(|| ImportError::UnknownReference {
            kind: "shift",
            name: code.to_string(),
        })
}

fn resolve_grade(school: &School, grade_level: u32) -> ImportResult<GradeLevelId> {
    school
        .find_grade_level(grade_level)
        .ok_or_else(|| ImportError::UnknownReference {
            kind: "grade_level",
            name: grade_level.to_string(),
        })
}

fn resolve_student(school: &School, grade: GradeLevelId, code: &str) -> ImportResult<StudentId> {
    school
        .find_student(grade, code)
        .ok_or_else(|| ImportError::UnknownReference {
            kind: "student",
            name: code.to_string(),
        })
}
