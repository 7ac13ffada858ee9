// ==========================================
// 选课分班系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、错误与录取拒绝原因
// 红线: 不含驱动逻辑, 录取流程见 engine
// ==========================================

pub mod capacity;
pub mod error;
pub mod grade_level;
pub mod group;
pub mod offering;
pub mod rank;
pub mod school;
pub mod section;
pub mod shift;
pub mod student;
pub mod types;

// 重导出核心类型
pub use capacity::Capacity;
pub use error::{DomainError, DomainResult, Rejection};
pub use grade_level::GradeLevel;
pub use group::Group;
pub use offering::{Offering, OfferingKind};
pub use rank::{Rank, Rankings, RejectionRecord};
pub use school::School;
pub use section::Section;
pub use shift::{ParallelSession, Shift};
pub use student::{SlotKind, Student};
pub use types::{
    Admission, GradeLevelId, GroupId, OfferingId, ProposalResult, SectionId, ShiftId, StudentId,
};
