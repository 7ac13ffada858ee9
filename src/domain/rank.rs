// ==========================================
// 选课分班系统 - 志愿队列
// ==========================================
// Rank: 按类型分组的有序志愿 + 集合镜像 + 拒绝日志
// Rankings: initial (原始志愿快照) + final (匹配过程中逐步消耗)
// ==========================================
// 状态机: 不存在 → 队列中 (add) → 已移除且记录原因 (reject), 不可回到队列
// ==========================================

use crate::domain::error::{DomainError, DomainResult, Rejection};
use crate::domain::types::OfferingId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

// ==========================================
// RejectionRecord - 拒绝记录 (审计用)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionRecord {
    pub offering: OfferingId,
    /// 拒绝时的课程显示名
    pub label: String,
    pub reason: Rejection,
}

impl fmt::Display for RejectionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.reason)
    }
}

// ==========================================
// Rank - 志愿队列
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rank {
    label: String,
    ordered: BTreeMap<String, Vec<OfferingId>>,
    present: BTreeMap<String, HashSet<OfferingId>>,
    rejections: BTreeMap<String, Vec<RejectionRecord>>,
}

impl Rank {
    pub fn new(label: impl Into<String>, types: &BTreeSet<String>) -> Self {
        Self {
            label: label.into(),
            ordered: types.iter().map(|t| (t.clone(), Vec::new())).collect(),
            present: types.iter().map(|t| (t.clone(), HashSet::new())).collect(),
            rejections: types.iter().map(|t| (t.clone(), Vec::new())).collect(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.ordered.keys().map(|t| t.as_str())
    }

    fn ordered(&self, rank_type: &str) -> DomainResult<&Vec<OfferingId>> {
        self.ordered
            .get(rank_type)
            .ok_or_else(|| DomainError::UnknownRankType(rank_type.to_string()))
    }

    /// 某类型的全部志愿 (按优先顺序)
    pub fn all(&self, rank_type: &str) -> DomainResult<&[OfferingId]> {
        Ok(self.ordered(rank_type)?.as_slice())
    }

    /// 读取志愿 (不移除)
    pub fn get(&self, rank_type: &str, index: usize) -> DomainResult<OfferingId> {
        let ordered = self.ordered(rank_type)?;
        ordered
            .get(index)
            .copied()
            .ok_or_else(|| DomainError::IndexOutOfRange {
                rank_type: rank_type.to_string(),
                index,
                len: ordered.len(),
            })
    }

    pub fn contains(&self, rank_type: &str, offering: OfferingId) -> bool {
        self.present
            .get(rank_type)
            .is_some_and(|present| present.contains(&offering))
    }

    pub fn len(&self, rank_type: &str) -> usize {
        self.ordered.get(rank_type).map_or(0, Vec::len)
    }

    pub fn is_empty(&self, rank_type: &str) -> bool {
        self.len(rank_type) == 0
    }

    /// 追加志愿 (同类型内不允许重复)
    pub fn add(&mut self, rank_type: &str, offering: OfferingId) -> DomainResult<()> {
        let present = self
            .present
            .get_mut(rank_type)
            .ok_or_else(|| DomainError::UnknownRankType(rank_type.to_string()))?;
        if !present.insert(offering) {
            return Err(DomainError::DuplicatePreference {
                rank_type: rank_type.to_string(),
                offering: offering.to_string(),
            });
        }
        if let Some(ordered) = self.ordered.get_mut(rank_type) {
            ordered.push(offering);
        }
        Ok(())
    }

    /// 拒绝并移除 index 处的志愿, 记录原因
    ///
    /// # 返回
    /// 被移除的课程标识
    pub fn reject(
        &mut self,
        rank_type: &str,
        index: usize,
        reason: Rejection,
        label: impl Into<String>,
    ) -> DomainResult<OfferingId> {
        let offering = self.get(rank_type, index)?;

        if let Some(ordered) = self.ordered.get_mut(rank_type) {
            ordered.remove(index);
        }
        if let Some(present) = self.present.get_mut(rank_type) {
            present.remove(&offering);
        }
        if let Some(log) = self.rejections.get_mut(rank_type) {
            log.push(RejectionRecord {
                offering,
                label: label.into(),
                reason,
            });
        }
        Ok(offering)
    }

    /// 拒绝日志
    pub fn rejections(&self, rank_type: &str) -> &[RejectionRecord] {
        self.rejections
            .get(rank_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 拒绝日志 (格式: "{课程}: {原因}")
    pub fn reasons(&self, rank_type: &str) -> Vec<String> {
        self.rejections(rank_type)
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// 清空志愿 (None 表示全部类型), 拒绝日志保留
    pub fn clear(&mut self, rank_type: Option<&str>) -> DomainResult<()> {
        match rank_type {
            Some(t) => {
                let ordered = self
                    .ordered
                    .get_mut(t)
                    .ok_or_else(|| DomainError::UnknownRankType(t.to_string()))?;
                ordered.clear();
                if let Some(present) = self.present.get_mut(t) {
                    present.clear();
                }
            }
            None => {
                self.ordered.values_mut().for_each(Vec::clear);
                self.present.values_mut().for_each(HashSet::clear);
            }
        }
        Ok(())
    }

    /// 按另一队列恢复内容并清空拒绝日志
    pub(crate) fn restore_from(&mut self, other: &Rank) {
        self.ordered = other.ordered.clone();
        self.present = other.present.clone();
        self.rejections.values_mut().for_each(Vec::clear);
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

// ==========================================
// Rankings - 学生志愿 (initial + final)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rankings {
    label: String,
    initial: Rank,
    final_rank: Rank,
}

impl Rankings {
    pub fn new(owner: &str, to_rank: &BTreeSet<String>) -> Self {
        Self {
            label: format!("RANKING-{}", owner),
            initial: Rank::new(format!("{}I", owner), to_rank),
            final_rank: Rank::new(format!("{}F", owner), to_rank),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// 原始志愿快照
    pub fn initial(&self) -> &Rank {
        &self.initial
    }

    /// 匹配过程中的剩余志愿
    pub fn final_rank(&self) -> &Rank {
        &self.final_rank
    }

    pub(crate) fn final_rank_mut(&mut self) -> &mut Rank {
        &mut self.final_rank
    }

    /// 录入志愿 (同时写入 initial 与 final)
    pub fn add(&mut self, rank_type: &str, offering: OfferingId) -> DomainResult<()> {
        if self.initial.contains(rank_type, offering) || self.final_rank.contains(rank_type, offering)
        {
            return Err(DomainError::DuplicatePreference {
                rank_type: rank_type.to_string(),
                offering: offering.to_string(),
            });
        }
        self.initial.add(rank_type, offering)?;
        self.final_rank.add(rank_type, offering)
    }

    /// 以 initial 重建 final (重置匹配)
    pub(crate) fn restore(&mut self) {
        self.final_rank.restore_from(&self.initial);
    }
}
