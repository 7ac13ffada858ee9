// ==========================================
// 选课分班系统 - 引擎层
// ==========================================
// 职责: 录取闸门、志愿提交、驱动、并发运行、审计报告
// 红线: 所有拒绝必须输出原因, 并记入志愿拒绝日志
// ==========================================

pub mod admission;
pub mod orchestrator;
pub mod parallel;
pub mod report;
pub mod shared;

// 重导出核心引擎
pub use admission::AdmissionCore;
pub use orchestrator::{MatchOutcome, ProposalOrchestrator, SchoolAccess};
pub use parallel::run_independent;
pub use report::{
    EnrollmentReport, FillSummary, OfferingFill, RejectionEntry, ReportError, ReportResult,
    SectionFill, StudentReport,
};
pub use shared::SharedSchool;
