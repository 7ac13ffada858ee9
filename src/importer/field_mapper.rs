// ==========================================
// 选课分班系统 - 学生表字段映射器
// ==========================================
// 职责: CSV 行 → StudentSpec
// 列:
// - grade_level / 年级 (必填, 整数)
// - student / 学生 (必填)
// - shift / 班次
// - previous / 往年已修 ("||" 分隔的课程显示名)
// - previous_grade_level / 往年年级 (缺省为 grade_level - 1)
// - prerequisites / not_alongside ("||" 分隔的学生代码)
// - group:<课程>  → 分组代码
// - rank:<类型>   → "||" 分隔的志愿 (按优先顺序)
// - assign:<类型> → 直接分配的课程/类别
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRow;
use crate::importer::scenario::{PreviousSpec, StudentSpec};

/// 多值字段分隔符
pub const LIST_DELIMITER: &str = "||";

const GROUP_PREFIX: &str = "group:";
const RANK_PREFIX: &str = "rank:";
const ASSIGN_PREFIX: &str = "assign:";

pub struct StudentRowMapper;

impl StudentRowMapper {
    /// 映射全部行 (行号从 1 开始, 不含表头)
    pub fn map_rows(rows: &[RawRow]) -> ImportResult<Vec<StudentSpec>> {
        rows.iter()
            .enumerate()
            .map(|(idx, row)| Self::map_row(row, idx + 1))
            .collect()
    }

    pub fn map_row(row: &RawRow, row_number: usize) -> ImportResult<StudentSpec> {
        let code = Self::get_string(row, "student").ok_or_else(|| ImportError::FieldMappingError {
            row: row_number,
            message: "学生代码为空".to_string(),
        })?;
        let grade_level = Self::parse_u32(row, "grade_level", row_number)?.ok_or_else(|| {
            ImportError::FieldMappingError {
                row: row_number,
                message: format!("学生 {} 缺少年级", code),
            }
        })?;

        let taken = Self::get_list(row, "previous");
        let previous = if taken.is_empty() {
            None
        } else {
            let previous_grade = match Self::parse_u32(row, "previous_grade_level", row_number)? {
                Some(grade) => grade,
                None => grade_level.checked_sub(1).ok_or_else(|| ImportError::FieldMappingError {
                    row: row_number,
                    message: format!("学生 {} 的往年年级无法推断", code),
                })?,
            };
            Some(PreviousSpec {
                grade_level: previous_grade,
                taken,
            })
        };

        let mut spec = StudentSpec {
            code,
            grade_level,
            shift: Self::get_string(row, "shift"),
            previous,
            prerequisites: Self::get_list(row, "prerequisites"),
            not_alongside: Self::get_list(row, "not_alongside"),
            ..StudentSpec::default()
        };

        // 前缀列
        for (header, value) in row {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            if let Some(offering) = header.strip_prefix(GROUP_PREFIX) {
                spec.groups
                    .insert(offering.trim().to_string(), value.to_string());
            } else if let Some(rank_type) = header.strip_prefix(RANK_PREFIX) {
                spec.rankings
                    .insert(rank_type.trim().to_string(), split_list(value));
            } else if let Some(slot) = header.strip_prefix(ASSIGN_PREFIX) {
                spec.assignments
                    .insert(slot.trim().to_string(), value.to_string());
            }
        }

        Ok(spec)
    }

    /// 提取字符串字段, 支持中文列名别名
    fn get_string(row: &RawRow, key: &str) -> Option<String> {
        let aliases: &[&str] = match key {
            "student" => &["student", "学生"],
            "grade_level" => &["grade_level", "年级"],
            "shift" => &["shift", "班次"],
            "previous" => &["previous", "往年已修"],
            "previous_grade_level" => &["previous_grade_level", "往年年级"],
            "prerequisites" => &["prerequisites", "同班前提"],
            "not_alongside" => &["not_alongside", "不可同班"],
            _ => &[],
        };

        for alias in aliases.iter().copied().chain(std::iter::once(key)) {
            if let Some(v) = row.get(alias) {
                let trimmed = v.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
        None
    }

    fn get_list(row: &RawRow, key: &str) -> Vec<String> {
        Self::get_string(row, key)
            .map(|value| split_list(&value))
            .unwrap_or_default()
    }

    /// 解析非负整数
    fn parse_u32(row: &RawRow, key: &str, row_number: usize) -> ImportResult<Option<u32>> {
        match Self::get_string(row, key) {
            None => Ok(None),
            Some(value) => value
                .parse::<u32>()
                .map(Some)
                .map_err(|_| ImportError::TypeConversionError {
                    row: row_number,
                    field: key.to_string(),
                    message: format!("无法解析为整数: {}", value),
                }),
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(LIST_DELIMITER)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_map_full_row() {
        let row = row(&[
            ("student", "S1"),
            ("grade_level", "11"),
            ("shift", "AM"),
            ("previous", "Algebra Level1 || Art"),
            ("group:Science", "LAB"),
            ("rank:Core", "Math Level2||Physics"),
            ("assign:Club", "Chess"),
            ("rank:Elective", ""),
            ("not_alongside", "S2"),
        ]);
        let spec = StudentRowMapper::map_row(&row, 1).unwrap();

        assert_eq!(spec.code, "S1");
        assert_eq!(spec.grade_level, 11);
        assert_eq!(spec.shift.as_deref(), Some("AM"));
        let previous = spec.previous.unwrap();
        assert_eq!(previous.grade_level, 10);
        assert_eq!(previous.taken, vec!["Algebra Level1", "Art"]);
        assert_eq!(spec.groups["Science"], "LAB");
        assert_eq!(spec.rankings["Core"], vec!["Math Level2", "Physics"]);
        assert!(!spec.rankings.contains_key("Elective"));
        assert_eq!(spec.assignments["Club"], "Chess");
        assert_eq!(spec.not_alongside, vec!["S2"]);
    }

    #[test]
    fn test_chinese_aliases() {
        let row = row(&[("学生", "S9"), ("年级", "12"), ("往年已修", "Art"), ("往年年级", "9")]);
        let spec = StudentRowMapper::map_row(&row, 3).unwrap();
        assert_eq!(spec.code, "S9");
        assert_eq!(spec.previous.unwrap().grade_level, 9);
    }

    #[test]
    fn test_missing_or_bad_fields() {
        assert!(matches!(
            StudentRowMapper::map_row(&row(&[("grade_level", "11")]), 2),
            Err(ImportError::FieldMappingError { row: 2, .. })
        ));
        assert!(matches!(
            StudentRowMapper::map_row(&row(&[("student", "S1")]), 4),
            Err(ImportError::FieldMappingError { row: 4, .. })
        ));
        assert!(matches!(
            StudentRowMapper::map_row(&row(&[("student", "S1"), ("grade_level", "eleven")]), 5),
            Err(ImportError::TypeConversionError { row: 5, .. })
        ));
    }
}
