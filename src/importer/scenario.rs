// ==========================================
// 选课分班系统 - 场景描述 (导入数据结构)
// ==========================================
// 格式: JSON, 课程/类别一律按显示名引用 (如 "Math Level2")
// 学生之间按学生代码引用 (同一年级内)
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 完整场景
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    #[serde(default)]
    pub shifts: Vec<ShiftSpec>,
    #[serde(default)]
    pub grade_levels: Vec<GradeLevelSpec>,
    #[serde(default)]
    pub offerings: Vec<OfferingSpec>,
    #[serde(default)]
    pub groups: Vec<GroupSpec>,
    #[serde(default)]
    pub students: Vec<StudentSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftSpec {
    pub code: String,
    pub partitions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeLevelSpec {
    pub grade_level: u32,
    #[serde(default)]
    pub to_rank: Vec<String>,
    #[serde(default)]
    pub category_types: Vec<String>,
    #[serde(default)]
    pub subject_types: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OfferingKindSpec {
    Category,
    #[default]
    Subject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacitySpec {
    #[serde(default)]
    pub minimum: u32,
    #[serde(default)]
    pub ideal: u32,
    pub maximum: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSpec {
    pub shift: String,
    pub partition: String,
    #[serde(default)]
    pub index: Option<u32>,
    pub capacity: CapacitySpec,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferingSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub offering_type: String,
    #[serde(default)]
    pub kind: OfferingKindSpec,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub repeatable: bool,
    /// 适用年级 (仅课程)
    #[serde(default)]
    pub teaches: Vec<u32>,
    #[serde(default)]
    pub capacity: Option<CapacitySpec>,
    #[serde(default)]
    pub max_group_members: Option<u32>,
    /// 先修组列表, 组内任一满足即可
    #[serde(default)]
    pub prerequisites: Vec<Vec<String>>,
    #[serde(default)]
    pub not_alongside: Vec<String>,
    #[serde(default)]
    pub sections: Vec<SectionSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub offering: String,
    pub code: String,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

/// 往年记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousSpec {
    pub grade_level: u32,
    #[serde(default)]
    pub taken: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentSpec {
    pub code: String,
    pub grade_level: u32,
    #[serde(default)]
    pub shift: Option<String>,
    #[serde(default)]
    pub previous: Option<PreviousSpec>,
    /// 课程显示名 → 分组代码
    #[serde(default)]
    pub groups: BTreeMap<String, String>,
    /// 类型 → 按优先顺序的课程显示名
    #[serde(default)]
    pub rankings: BTreeMap<String, Vec<String>>,
    /// 类型 → 直接分配的课程/类别显示名
    #[serde(default)]
    pub assignments: BTreeMap<String, String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub not_alongside: Vec<String>,
}

impl ScenarioSpec {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
