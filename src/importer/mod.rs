// ==========================================
// 选课分班系统 - 导入层
// ==========================================
// 职责: 外部数据 → School 对象图
// 支持: JSON 场景文件, CSV 学生表
// ==========================================

// 模块声明
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod scenario;
pub mod scenario_loader;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::{StudentRowMapper, LIST_DELIMITER};
pub use file_parser::{RawRow, RowParser};
pub use scenario::{
    CapacitySpec, GradeLevelSpec, GroupSpec, OfferingKindSpec, OfferingSpec, PreviousSpec,
    ScenarioSpec, SectionSpec, ShiftSpec, StudentSpec,
};
pub use scenario_loader::{LoadRejection, LoadSummary, LoadedScenario, ScenarioLoader};
