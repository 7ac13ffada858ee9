// ==========================================
// 选课分班系统 - 志愿提交驱动
// ==========================================
// 用途: 反复调用 propose(type, 0), 直到没有学生还有待处理的志愿
// 终止: 无待处理志愿, 或达到 max_rounds
// ==========================================
// 待处理: 类型需排志愿 + 槽位未分配 + final 志愿非空
// ==========================================

use crate::config::{DriverConfig, DriverOrder};
use crate::domain::error::DomainResult;
use crate::domain::school::School;
use crate::domain::types::{ProposalResult, StudentId};
use crate::engine::shared::SharedSchool;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

// ==========================================
// MatchOutcome - 驱动运行结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub rounds: u32,
    pub proposals: usize,
    pub accepted: usize,
    pub rejected: usize,
    /// 运行结束时仍未分配的志愿槽位数
    pub unassigned: usize,
    /// 是否因志愿耗尽而结束 (false 表示达到 max_rounds)
    pub exhausted: bool,
}

impl MatchOutcome {
    fn record(&mut self, result: &ProposalResult) {
        self.proposals += 1;
        if result.admission.is_accepted() {
            self.accepted += 1;
        } else {
            self.rejected += 1;
        }
    }
}

// ==========================================
// SchoolAccess - 对象图访问方式
// ==========================================
// 独占 (&mut School) 或加锁 (&SharedSchool)
pub trait SchoolAccess {
    fn with_school<R>(&mut self, f: impl FnOnce(&mut School) -> DomainResult<R>) -> DomainResult<R>;
}

impl SchoolAccess for &mut School {
    fn with_school<R>(&mut self, f: impl FnOnce(&mut School) -> DomainResult<R>) -> DomainResult<R> {
        f(&mut **self)
    }
}

impl SchoolAccess for &SharedSchool {
    fn with_school<R>(&mut self, f: impl FnOnce(&mut School) -> DomainResult<R>) -> DomainResult<R> {
        self.with(f)
    }
}

// ==========================================
// ProposalOrchestrator - 驱动器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ProposalOrchestrator {
    config: DriverConfig,
}

impl ProposalOrchestrator {
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// 独占运行
    pub fn run(&self, school: &mut School) -> DomainResult<MatchOutcome> {
        self.drive(school)
    }

    /// 共享运行 (每次提交单独加锁)
    pub fn run_shared(&self, shared: &SharedSchool) -> DomainResult<MatchOutcome> {
        self.drive(shared)
    }

    #[instrument(skip(self, access), fields(order = self.config.order.as_str()))]
    fn drive<A: SchoolAccess>(&self, mut access: A) -> DomainResult<MatchOutcome> {
        let mut outcome = MatchOutcome::default();

        loop {
            if let Some(max_rounds) = self.config.max_rounds {
                if outcome.rounds >= max_rounds {
                    break;
                }
            }

            let progressed = match self.config.order {
                DriverOrder::RoundRobin => self.round_robin_pass(&mut access, &mut outcome)?,
                DriverOrder::StudentFirst => self.student_first_pass(&mut access, &mut outcome)?,
            };
            if !progressed {
                outcome.exhausted = true;
                break;
            }
            outcome.rounds += 1;
            debug!(
                round = outcome.rounds,
                proposals = outcome.proposals,
                "本轮志愿提交完成"
            );
        }

        outcome.unassigned = access.with_school(|school| self.count_unassigned(school))?;

        info!(
            rounds = outcome.rounds,
            proposals = outcome.proposals,
            accepted = outcome.accepted,
            rejected = outcome.rejected,
            unassigned = outcome.unassigned,
            exhausted = outcome.exhausted,
            "志愿匹配完成"
        );
        Ok(outcome)
    }

    // ==========================================
    // 提交顺序
    // ==========================================

    /// 每个学生每个待处理类型提交一次
    fn round_robin_pass<A: SchoolAccess>(&self, access: &mut A, outcome: &mut MatchOutcome) -> DomainResult<bool> {
        let students = access.with_school(|school| Ok(student_ids(school)))?;
        let mut progressed = false;

        for student in students {
            let types = access.with_school(|school| self.pending_types(school, student))?;
            for rank_type in types {
                if let Some(result) = access.with_school(|school| self.propose_if_pending(school, student, &rank_type))? {
                    outcome.record(&result);
                    progressed = true;
                }
            }
        }
        Ok(progressed)
    }

    /// 每个学生处理完所有类型再轮到下一个
    fn student_first_pass<A: SchoolAccess>(&self, access: &mut A, outcome: &mut MatchOutcome) -> DomainResult<bool> {
        let students = access.with_school(|school| Ok(student_ids(school)))?;
        let mut progressed = false;

        for student in students {
            let types = access.with_school(|school| self.pending_types(school, student))?;
            for rank_type in types {
                while let Some(result) = access.with_school(|school| self.propose_if_pending(school, student, &rank_type))? {
                    outcome.record(&result);
                    progressed = true;
                }
            }
        }
        Ok(progressed)
    }

    fn propose_if_pending(&self, school: &mut School, student: StudentId, rank_type: &str) -> DomainResult<Option<ProposalResult>> {
        if !is_pending(school, student, rank_type)? {
            return Ok(None);
        }
        school.propose(student, rank_type, 0).map(Some)
    }

    // ==========================================
    // 待处理判定
    // ==========================================

    /// 学生的待处理类型 (按 type_priority, 再按名称)
    pub fn pending_types(&self, school: &School, student: StudentId) -> DomainResult<Vec<String>> {
        let grade = school.grade_level(school.student(student)?.grade_level())?;
        let mut types = Vec::new();
        for rank_type in self.ordered_types(grade.to_rank().iter().map(String::as_str)) {
            if is_pending(school, student, &rank_type)? {
                types.push(rank_type);
            }
        }
        Ok(types)
    }

    /// 类型排序: type_priority 中的先, 其余按名称
    pub fn ordered_types<'a>(&self, types: impl Iterator<Item = &'a str>) -> Vec<String> {
        let priority: HashMap<&str, usize> = self
            .config
            .type_priority
            .iter()
            .enumerate()
            .map(|(i, t)| (t.as_str(), i))
            .collect();
        let mut types: Vec<&str> = types.collect();
        types.sort_by_key(|t| (priority.get(t).copied().unwrap_or(usize::MAX), *t));
        types.into_iter().map(str::to_string).collect()
    }

    fn count_unassigned(&self, school: &School) -> DomainResult<usize> {
        let mut count = 0;
        for student in school.students() {
            let grade = school.grade_level(student.grade_level())?;
            count += grade
                .to_rank()
                .iter()
                .filter(|t| !student.is_slot_assigned(t))
                .filter(|t| !student.rankings().initial().is_empty(t))
                .count();
        }
        Ok(count)
    }
}

fn student_ids(school: &School) -> Vec<StudentId> {
    school.students().iter().map(|s| s.id()).collect()
}

fn is_pending(school: &School, student: StudentId, rank_type: &str) -> DomainResult<bool> {
    let record = school.student(student)?;
    let grade = school.grade_level(record.grade_level())?;
    Ok(grade.is_ranked(rank_type)
        && !record.is_slot_assigned(rank_type)
        && !record.rankings().final_rank().is_empty(rank_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_types_follow_priority_then_name() {
        let orchestrator = ProposalOrchestrator::new(DriverConfig {
            type_priority: vec!["Elective".to_string()],
            ..DriverConfig::default()
        });
        let ordered = orchestrator.ordered_types(["Core", "Art", "Elective"].into_iter());
        assert_eq!(ordered, vec!["Elective", "Art", "Core"]);
    }

    #[test]
    fn test_empty_school_exhausts_immediately() {
        let mut school = School::new();
        let outcome = ProposalOrchestrator::default().run(&mut school).unwrap();
        assert!(outcome.exhausted);
        assert_eq!(outcome.rounds, 0);
        assert_eq!(outcome.proposals, 0);
    }
}
