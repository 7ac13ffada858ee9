// ==========================================
// 选课分班系统 - 核心库
// ==========================================
// 系统定位: 志愿排序的录取匹配引擎
// 学生按志愿逐个提交, 课程/教学班按容量与兼容性约束录取或拒绝
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体、类型、错误
pub mod domain;

// 引擎层 - 录取、驱动、报告
pub mod engine;

// 导入层 - 场景 JSON / 学生 CSV
pub mod importer;

// 配置层 - 运行配置
pub mod config;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体与类型
pub use domain::{
    Admission, Capacity, DomainError, DomainResult, GradeLevel, GradeLevelId, Group, GroupId,
    Offering, OfferingId, OfferingKind, ParallelSession, ProposalResult, Rank, Rankings,
    Rejection, RejectionRecord, School, Section, SectionId, Shift, ShiftId, SlotKind, Student,
    StudentId,
};

// 引擎
pub use engine::{
    run_independent, AdmissionCore, EnrollmentReport, MatchOutcome, ProposalOrchestrator,
    SharedSchool,
};

// 配置
pub use config::{DriverConfig, DriverOrder, MatchingConfig};

// 导入
pub use importer::{ScenarioLoader, ScenarioSpec};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "选课分班系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
