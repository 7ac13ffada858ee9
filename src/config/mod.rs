// ==========================================
// 选课分班系统 - 配置层
// ==========================================
// 职责: 匹配运行配置 (驱动顺序/轮数/类型优先级/报告/日志)
// 存储: JSON 文件
// ==========================================

pub mod matching_config;

// 重导出
pub use matching_config::{
    ConfigError, ConfigResult, DriverConfig, DriverOrder, MatchingConfig, ReportConfig,
};
