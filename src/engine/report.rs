// ==========================================
// 选课分班系统 - 录取审计报告
// ==========================================
// 输出: 每个学生的分配结果与拒绝日志 + 课程/教学班的填充情况
// 格式: JSON (完整报告) / CSV (拒绝日志, 分配表)
// ==========================================

use crate::config::ReportConfig;
use crate::domain::capacity::Capacity;
use crate::domain::error::{DomainError, Rejection};
use crate::domain::school::School;
use crate::domain::student::Student;
use crate::domain::types::{OfferingId, StudentId};
use crate::engine::orchestrator::MatchOutcome;
use chrono::{DateTime, Utc};
use csv::Writer;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("领域错误: {0}")]
    Domain(#[from] DomainError),

    #[error("JSON 序列化失败: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV 写入失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("文件写入失败: {0}")]
    Io(#[from] std::io::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;

// 拒绝日志 CSV 表头
const REJECTIONS_HEADER: &[&str] = &[
    "run_id",
    "student",
    "grade_level",
    "rank_type",
    "order",
    "offering",
    "reason_code",
    "reason",
];

// 分配表 CSV 表头
const ASSIGNMENTS_HEADER: &[&str] = &[
    "run_id",
    "student",
    "grade_level",
    "slot",
    "offering",
    "section",
    "shift",
];

// ==========================================
// 报告结构
// ==========================================

/// 容量填充情况 (maximum 为 None 表示不限)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillSummary {
    pub minimum: u32,
    pub ideal: u32,
    pub maximum: Option<u32>,
    pub filled: u32,
    pub under_minimum: bool,
}

impl From<&Capacity> for FillSummary {
    fn from(capacity: &Capacity) -> Self {
        Self {
            minimum: capacity.minimum(),
            ideal: capacity.ideal(),
            maximum: (capacity.maximum() != u32::MAX).then_some(capacity.maximum()),
            filled: capacity.filled(),
            under_minimum: capacity.is_under_minimum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferingFill {
    pub label: String,
    pub offering_type: String,
    pub is_subject: bool,
    pub fill: FillSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionFill {
    pub label: String,
    pub offering: String,
    pub shift: String,
    pub partition: String,
    pub fill: FillSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionEntry {
    pub offering: String,
    pub reason: Rejection,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentReport {
    pub code: String,
    pub grade_level: u32,
    pub shift: Option<String>,
    /// 类型 → 课程显示名
    pub subjects: BTreeMap<String, Option<String>>,
    pub categories: BTreeMap<String, Option<String>>,
    /// 课程显示名 → 教学班显示名
    pub sections: BTreeMap<String, String>,
    /// 分区 → 教学班显示名
    pub sessions: BTreeMap<String, String>,
    /// 课程显示名 → 分组代码
    pub groups: BTreeMap<String, String>,
    pub initial_ranks: BTreeMap<String, Vec<String>>,
    pub final_ranks: BTreeMap<String, Vec<String>>,
    pub rejections: BTreeMap<String, Vec<RejectionEntry>>,
}

// ==========================================
// EnrollmentReport - 审计报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentReport {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub outcome: Option<MatchOutcome>,
    pub students: Vec<StudentReport>,
    pub offerings: Vec<OfferingFill>,
    pub sections: Vec<SectionFill>,
}

impl EnrollmentReport {
    /// 从对象图生成报告
    ///
    /// # 参数
    /// - outcome: 驱动运行结果 (未经驱动时为 None)
    /// - config: 报告配置 (是否包含往年记录)
    pub fn build(school: &School, outcome: Option<MatchOutcome>, config: &ReportConfig) -> ReportResult<Self> {
        let history: HashSet<StudentId> = school
            .students()
            .iter()
            .filter_map(Student::previous)
            .collect();

        let students = school
            .students()
            .iter()
            .filter(|s| config.include_history_records || !history.contains(&s.id()))
            .map(|s| student_report(school, s))
            .collect::<ReportResult<Vec<_>>>()?;

        let offerings = school
            .offerings()
            .iter()
            .map(|o| OfferingFill {
                label: o.label(),
                offering_type: o.offering_type().to_string(),
                is_subject: o.is_subject(),
                fill: o.capacity().into(),
            })
            .collect();

        let mut sections = Vec::with_capacity(school.sections().len());
        for section in school.sections() {
            sections.push(SectionFill {
                label: school.section_label(section.id())?,
                offering: school.offering(section.parent())?.label(),
                shift: school.shift(section.shift())?.code().to_string(),
                partition: section.partition().to_string(),
                fill: section.capacity().into(),
            });
        }

        Ok(Self {
            run_id: Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            outcome,
            students,
            offerings,
            sections,
        })
    }

    pub fn to_json(&self) -> ReportResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 按年级与学生代码查找 (往年记录与当前学生同代码)
    pub fn student(&self, grade_level: u32, code: &str) -> Option<&StudentReport> {
        self.students
            .iter()
            .find(|s| s.grade_level == grade_level && s.code == code)
    }

    /// 导出拒绝日志 CSV (按学生、类型、拒绝先后)
    pub fn write_rejections_csv<W: Write>(&self, writer: W) -> ReportResult<()> {
        let mut csv = Writer::from_writer(writer);
        csv.write_record(REJECTIONS_HEADER)?;
        for student in &self.students {
            let grade_level = student.grade_level.to_string();
            for (rank_type, entries) in &student.rejections {
                for (order, entry) in entries.iter().enumerate() {
                    csv.write_record([
                        self.run_id.as_str(),
                        student.code.as_str(),
                        grade_level.as_str(),
                        rank_type.as_str(),
                        (order + 1).to_string().as_str(),
                        entry.offering.as_str(),
                        entry.reason.code(),
                        entry.message.as_str(),
                    ])?;
                }
            }
        }
        csv.flush()?;
        Ok(())
    }

    /// 导出分配表 CSV (每个已分配槽位一行)
    pub fn write_assignments_csv<W: Write>(&self, writer: W) -> ReportResult<()> {
        let mut csv = Writer::from_writer(writer);
        csv.write_record(ASSIGNMENTS_HEADER)?;
        for student in &self.students {
            let grade_level = student.grade_level.to_string();
            let shift = student.shift.as_deref().unwrap_or("");
            let slots = student.subjects.iter().chain(student.categories.iter());
            for (slot, offering) in slots {
                let Some(offering) = offering else {
                    continue;
                };
                let section = student.sections.get(offering).map_or("", String::as_str);
                csv.write_record([
                    self.run_id.as_str(),
                    student.code.as_str(),
                    grade_level.as_str(),
                    slot.as_str(),
                    offering.as_str(),
                    section,
                    shift,
                ])?;
            }
        }
        csv.flush()?;
        Ok(())
    }
}

fn student_report(school: &School, student: &Student) -> ReportResult<StudentReport> {
    let label = |id: OfferingId| -> ReportResult<String> { Ok(school.offering(id)?.label()) };

    let slot_labels = |slots: &BTreeMap<String, Option<OfferingId>>| {
        slots
            .iter()
            .map(|(slot, offering)| -> ReportResult<(String, Option<String>)> {
                Ok((slot.clone(), offering.map(label).transpose()?))
            })
            .collect::<ReportResult<BTreeMap<_, _>>>()
    };

    let mut sections = BTreeMap::new();
    for (parent, section) in student.sections() {
        sections.insert(label(*parent)?, school.section_label(*section)?);
    }
    let mut sessions = BTreeMap::new();
    for (partition, section) in student.sessions() {
        sessions.insert(partition.clone(), school.section_label(*section)?);
    }
    let mut groups = BTreeMap::new();
    for (parent, group) in student.groups() {
        groups.insert(label(*parent)?, school.group(*group)?.code().to_string());
    }

    let rankings = student.rankings();
    let mut initial_ranks = BTreeMap::new();
    let mut final_ranks = BTreeMap::new();
    let mut rejections = BTreeMap::new();
    for rank_type in rankings.initial().types() {
        initial_ranks.insert(
            rank_type.to_string(),
            rankings
                .initial()
                .all(rank_type)?
                .iter()
                .map(|o| label(*o))
                .collect::<ReportResult<Vec<_>>>()?,
        );
        final_ranks.insert(
            rank_type.to_string(),
            rankings
                .final_rank()
                .all(rank_type)?
                .iter()
                .map(|o| label(*o))
                .collect::<ReportResult<Vec<_>>>()?,
        );
        rejections.insert(
            rank_type.to_string(),
            rankings
                .final_rank()
                .rejections(rank_type)
                .iter()
                .map(|record| RejectionEntry {
                    offering: record.label.clone(),
                    reason: record.reason,
                    message: record.to_string(),
                })
                .collect(),
        );
    }

    let shift = match student.shift() {
        Some(shift) => Some(school.shift(shift)?.code().to_string()),
        None => None,
    };

    Ok(StudentReport {
        code: student.code().to_string(),
        grade_level: school.grade_level(student.grade_level())?.grade_level(),
        shift,
        subjects: slot_labels(student.subjects())?,
        categories: slot_labels(student.categories())?,
        sections,
        sessions,
        groups,
        initial_ranks,
        final_ranks,
        rejections,
    })
}
