// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的场景数据、临时文件、小型学校对象图
// ==========================================

#![allow(dead_code)]

use school_enrollment::domain::{Capacity, GradeLevelId, School, ShiftId};
use school_enrollment::importer::{ScenarioLoader, ScenarioSpec};
use std::collections::BTreeSet;
use std::error::Error;
use std::io::Write;
use tempfile::NamedTempFile;

/// 标准测试场景 (JSON)
///
/// # 内容
/// - 班次 AM / PM, 分区 P / Q / R
/// - 年级 10 / 11, Core 与 Elective 排志愿, Club 直接分配
/// - Math Level2 需先修 Algebra Level1, 两个教学班各 1 人
/// - 学生 S1 / S2 (AM, 往年修过 Algebra), S3 (PM, 无往年记录)
///
/// # 轮转驱动下的预期结果
/// - 第1轮: S1 得 Math/Art, S2 两个志愿均被拒, S3 Math 先修不满足但得 Art
/// - 第2轮: S2 得 Physics/Music, S3 得 Physics
pub const SCENARIO_JSON: &str = r#"{
  "shifts": [
    { "code": "AM", "partitions": ["P", "Q", "R"] },
    { "code": "PM", "partitions": ["P", "Q", "R"] }
  ],
  "grade_levels": [
    { "grade_level": 10, "to_rank": ["Core", "Elective"], "category_types": ["Club"], "subject_types": ["Core", "Elective"] },
    { "grade_level": 11, "to_rank": ["Core", "Elective"], "category_types": ["Club"], "subject_types": ["Core", "Elective"] }
  ],
  "offerings": [
    {
      "name": "Algebra", "type": "Core", "level": 1, "teaches": [10, 11],
      "sections": [ { "shift": "AM", "partition": "P", "capacity": { "maximum": 10 } } ]
    },
    {
      "name": "Math", "type": "Core", "level": 2, "teaches": [11],
      "prerequisites": [["Algebra Level1"]],
      "sections": [
        { "shift": "AM", "partition": "P", "capacity": { "maximum": 1 }, "name": "Math A1" },
        { "shift": "PM", "partition": "P", "capacity": { "maximum": 1 }, "name": "Math B1" }
      ]
    },
    {
      "name": "Physics", "type": "Core", "teaches": [11],
      "sections": [
        { "shift": "AM", "partition": "Q", "capacity": { "maximum": 2 } },
        { "shift": "PM", "partition": "Q", "capacity": { "maximum": 2 } }
      ]
    },
    {
      "name": "Art", "type": "Elective", "teaches": [10, 11],
      "sections": [
        { "shift": "AM", "partition": "R", "capacity": { "maximum": 1 } },
        { "shift": "PM", "partition": "R", "capacity": { "maximum": 1 } }
      ]
    },
    {
      "name": "Music", "type": "Elective", "teaches": [10, 11],
      "sections": [
        { "shift": "AM", "partition": "R", "capacity": { "minimum": 2, "ideal": 3, "maximum": 5 } },
        { "shift": "PM", "partition": "R", "capacity": { "maximum": 5 } }
      ]
    },
    { "name": "Chess", "type": "Club", "kind": "category", "capacity": { "maximum": 10 } }
  ],
  "students": [
    {
      "code": "S1", "grade_level": 11, "shift": "AM",
      "previous": { "grade_level": 10, "taken": ["Algebra Level1"] },
      "rankings": { "Core": ["Math Level2", "Physics"], "Elective": ["Art", "Music"] },
      "assignments": { "Club": "Chess" }
    },
    {
      "code": "S2", "grade_level": 11, "shift": "AM",
      "previous": { "grade_level": 10, "taken": ["Algebra Level1"] },
      "rankings": { "Core": ["Math Level2", "Physics"], "Elective": ["Art", "Music"] }
    },
    {
      "code": "S3", "grade_level": 11, "shift": "PM",
      "rankings": { "Core": ["Math Level2", "Physics"], "Elective": ["Art", "Music"] }
    }
  ]
}"#;

/// 解析标准场景
pub fn scenario_spec() -> ScenarioSpec {
    ScenarioSpec::from_json_str(SCENARIO_JSON).expect("标准场景应可解析")
}

/// 装载标准场景
pub fn load_scenario() -> School {
    ScenarioLoader::build(&scenario_spec())
        .expect("标准场景应可装载")
        .school
}

/// 写入带后缀的临时文件
///
/// # 返回
/// - NamedTempFile: 临时文件（需要保持存活）
pub fn write_temp_file(suffix: &str, content: &str) -> Result<NamedTempFile, Box<dyn Error>> {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile()?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(file)
}

pub fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn cap(maximum: u32) -> Capacity {
    Capacity::new(0, 0, maximum).expect("容量参数合法")
}

/// 小型学校: 单年级 11, 班次 AM/PM (分区 P/Q), Core 排志愿
pub struct SmallSchool {
    pub school: School,
    pub grade: GradeLevelId,
    pub am: ShiftId,
    pub pm: ShiftId,
}

pub fn create_small_school() -> SmallSchool {
    let mut school = School::new();
    let grade = school
        .add_grade_level(11, set(&["Core"]), set(&["Club"]), set(&["Core"]))
        .expect("年级创建成功");
    let am = school.add_shift("AM", ["P", "Q"]).expect("班次创建成功");
    let pm = school.add_shift("PM", ["P", "Q"]).expect("班次创建成功");
    SmallSchool {
        school,
        grade,
        am,
        pm,
    }
}
