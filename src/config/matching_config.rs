// ==========================================
// 选课分班系统 - 匹配运行配置
// ==========================================
// 存储: JSON 文件 (所有字段可缺省)
// 红线: 配置对象按次传入引擎, 不使用全局状态
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

// ==========================================
// ConfigError - 配置错误
// ==========================================
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("配置校验失败: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// DriverOrder - 志愿提交顺序
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DriverOrder {
    /// 每轮每个学生每个类型提交一次
    #[default]
    RoundRobin,
    /// 每个学生处理完全部类型后再轮到下一个学生
    StudentFirst,
}

impl DriverOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverOrder::RoundRobin => "round_robin",
            DriverOrder::StudentFirst => "student_first",
        }
    }
}

/// 驱动配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DriverConfig {
    #[serde(default)]
    pub order: DriverOrder,

    /// 最大轮数 (None 表示直到志愿耗尽)
    #[serde(default)]
    pub max_rounds: Option<u32>,

    /// 类型优先顺序 (未列出的类型按名称排在后面)
    #[serde(default)]
    pub type_priority: Vec<String>,
}

/// 报告配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ReportConfig {
    /// 报告中是否包含往年记录学生
    #[serde(default)]
    pub include_history_records: bool,
}

/// 匹配运行配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingConfig {
    #[serde(default)]
    pub driver: DriverConfig,

    #[serde(default)]
    pub report: ReportConfig,

    /// 日志过滤 (EnvFilter 语法)
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            driver: DriverConfig::default(),
            report: ReportConfig::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl MatchingConfig {
    /// 从 JSON 文本解析并校验
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: MatchingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件加载并校验
    pub fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// 校验
    ///
    /// # 规则
    /// - max_rounds 设置时必须大于 0
    /// - type_priority 不得重复
    pub fn validate(&self) -> ConfigResult<()> {
        if self.driver.max_rounds == Some(0) {
            return Err(ConfigError::Invalid("max_rounds 必须大于 0".to_string()));
        }
        let mut seen = HashSet::new();
        for rank_type in &self.driver.type_priority {
            if !seen.insert(rank_type.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "type_priority 重复: {}",
                    rank_type
                )));
            }
        }
        Ok(())
    }

    /// 配置快照 (写入报告, 便于复现)
    pub fn snapshot_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
