// ==========================================
// 选课分班系统 - 班次与平行时段
// ==========================================
// Shift: 上课班次 (如上午/下午), 含若干时段分区
// ParallelSession: 班次内的具名平行时段, 构造后不可变
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::types::ShiftId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ==========================================
// Shift - 班次
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    id: ShiftId,
    code: String,
    partitions: BTreeSet<String>,
}

impl Shift {
    pub(crate) fn new(id: ShiftId, code: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
            partitions: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> ShiftId {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn partitions(&self) -> &BTreeSet<String> {
        &self.partitions
    }

    pub fn has_partition(&self, partition: &str) -> bool {
        self.partitions.contains(partition)
    }

    /// 添加时段分区 (分区名在班次内唯一)
    pub fn add_partition(&mut self, partition: impl Into<String>) -> DomainResult<()> {
        let partition = partition.into();
        if self.partitions.contains(&partition) {
            return Err(DomainError::DuplicateId {
                kind: "partition",
                id: format!("{}/{}", self.code, partition),
            });
        }
        self.partitions.insert(partition);
        Ok(())
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

// ==========================================
// ParallelSession - 平行时段
// ==========================================
// 同一学生在同一分区内至多占用一个教学班
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelSession {
    shift: ShiftId,
    partition: String,
    index: Option<u32>,
    name: Option<String>,
}

impl ParallelSession {
    /// 创建平行时段
    ///
    /// # 参数
    /// - shift: 所属班次 (partition 必须是其分区之一)
    /// - partition: 分区名
    /// - index: 可选序号, 用于区分同分区下的多个时段
    pub fn new(shift: &Shift, partition: impl Into<String>, index: Option<u32>) -> DomainResult<Self> {
        let partition = partition.into();
        if !shift.has_partition(&partition) {
            return Err(DomainError::UnknownPartition {
                shift: shift.code().to_string(),
                partition,
            });
        }
        Ok(Self {
            shift: shift.id(),
            partition,
            index,
            name: None,
        })
    }

    /// 指定显示名称
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn shift(&self) -> ShiftId {
        self.shift
    }

    pub fn partition(&self) -> &str {
        &self.partition
    }

    pub fn index(&self) -> Option<u32> {
        self.index
    }

    /// 名称: 显式名称, 否则为 partition + index (index 为 0 时只用 partition)
    pub fn name(&self) -> String {
        match (&self.name, self.index) {
            (Some(name), _) => name.clone(),
            (None, Some(index)) if index != 0 => format!("{}{}", self.partition, index),
            (None, _) => self.partition.clone(),
        }
    }
}

impl fmt::Display for ParallelSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn morning() -> Shift {
        let mut shift = Shift::new(ShiftId(0), "AM");
        shift.add_partition("P").unwrap();
        shift.add_partition("Q").unwrap();
        shift
    }

    #[test]
    fn test_duplicate_partition_rejected() {
        let mut shift = morning();
        assert!(matches!(
            shift.add_partition("P"),
            Err(DomainError::DuplicateId { .. })
        ));
        assert_eq!(shift.partitions().len(), 2);
    }

    #[test]
    fn test_session_partition_must_belong_to_shift() {
        let shift = morning();
        let err = ParallelSession::new(&shift, "Z", None).unwrap_err();
        assert!(matches!(err, DomainError::UnknownPartition { .. }));
    }

    #[test]
    fn test_session_name_derivation() {
        let shift = morning();
        assert_eq!(ParallelSession::new(&shift, "P", Some(2)).unwrap().name(), "P2");
        assert_eq!(ParallelSession::new(&shift, "Q", None).unwrap().name(), "Q");
        assert_eq!(ParallelSession::new(&shift, "P", Some(0)).unwrap().name(), "P");
        let named = ParallelSession::new(&shift, "P", Some(1)).unwrap().named("Block A");
        assert_eq!(named.to_string(), "Block A");
        assert_eq!(named.partition(), "P");
    }
}
