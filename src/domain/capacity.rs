// ==========================================
// 选课分班系统 - 容量领域模型
// ==========================================
// 红线: minimum ≤ ideal ≤ maximum, 0 ≤ filled ≤ maximum
// 红线: 校验失败不修改任何字段
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Capacity - 容量
// ==========================================
// 用途: 教学班/课程/类别/分组的人数约束
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    minimum: u32,
    ideal: u32,
    maximum: u32,
    filled: u32,
}

impl Capacity {
    /// 创建容量 (filled = 0)
    ///
    /// # 参数
    /// - minimum: 开班下限
    /// - ideal: 理想人数
    /// - maximum: 上限
    pub fn new(minimum: u32, ideal: u32, maximum: u32) -> DomainResult<Self> {
        Self::with_filled(minimum, ideal, maximum, 0)
    }

    /// 创建容量 (指定已占用人数)
    pub fn with_filled(minimum: u32, ideal: u32, maximum: u32, filled: u32) -> DomainResult<Self> {
        if minimum > ideal {
            return Err(DomainError::InvalidCapacity(format!(
                "minimum {} > ideal {}",
                minimum, ideal
            )));
        }
        if ideal > maximum {
            return Err(DomainError::InvalidCapacity(format!(
                "ideal {} > maximum {}",
                ideal, maximum
            )));
        }
        if filled > maximum {
            return Err(DomainError::InvalidCapacity(format!(
                "filled {} > maximum {}",
                filled, maximum
            )));
        }
        Ok(Self {
            minimum,
            ideal,
            maximum,
            filled,
        })
    }

    /// 仅有上限的容量 (minimum = ideal = 0)
    pub fn up_to(maximum: u32) -> Self {
        Self {
            minimum: 0,
            ideal: 0,
            maximum,
            filled: 0,
        }
    }

    /// 无上限容量 (未配置容量的课程/类别默认值)
    pub fn unbounded() -> Self {
        Self {
            minimum: 0,
            ideal: 0,
            maximum: u32::MAX,
            filled: 0,
        }
    }

    pub fn minimum(&self) -> u32 {
        self.minimum
    }

    pub fn ideal(&self) -> u32 {
        self.ideal
    }

    pub fn maximum(&self) -> u32 {
        self.maximum
    }

    pub fn filled(&self) -> u32 {
        self.filled
    }

    /// 剩余名额
    pub fn available(&self) -> u32 {
        self.maximum - self.filled
    }

    pub fn is_full(&self) -> bool {
        self.available() == 0
    }

    /// 是否低于开班下限
    pub fn is_under_minimum(&self) -> bool {
        self.filled < self.minimum
    }

    pub fn set_minimum(&mut self, value: u32) -> DomainResult<()> {
        if value > self.ideal {
            return Err(DomainError::InvalidCapacity(format!(
                "minimum {} > ideal {}",
                value, self.ideal
            )));
        }
        self.minimum = value;
        Ok(())
    }

    pub fn set_ideal(&mut self, value: u32) -> DomainResult<()> {
        if value < self.minimum {
            return Err(DomainError::InvalidCapacity(format!(
                "ideal {} < minimum {}",
                value, self.minimum
            )));
        }
        if value > self.maximum {
            return Err(DomainError::InvalidCapacity(format!(
                "ideal {} > maximum {}",
                value, self.maximum
            )));
        }
        self.ideal = value;
        Ok(())
    }

    pub fn set_maximum(&mut self, value: u32) -> DomainResult<()> {
        if value < self.ideal {
            return Err(DomainError::InvalidCapacity(format!(
                "maximum {} < ideal {}",
                value, self.ideal
            )));
        }
        if value < self.filled {
            return Err(DomainError::InvalidCapacity(format!(
                "maximum {} < filled {}",
                value, self.filled
            )));
        }
        self.maximum = value;
        Ok(())
    }

    pub fn set_filled(&mut self, value: u32) -> DomainResult<()> {
        if value > self.maximum {
            return Err(DomainError::InvalidCapacity(format!(
                "filled {} > maximum {}",
                value, self.maximum
            )));
        }
        self.filled = value;
        Ok(())
    }

    /// 占用一个名额
    pub fn fill_one(&mut self) -> DomainResult<()> {
        let next = self.filled.checked_add(1).ok_or_else(|| {
            DomainError::InvalidCapacity("filled overflow".to_string())
        })?;
        self.set_filled(next)
    }

    /// 合并子容量 (教学班容量汇总到所属课程/类别)
    ///
    /// 四个字段逐项相加, 无上限容量按饱和加法保持无上限
    pub fn increase(&mut self, other: &Capacity) -> DomainResult<()> {
        let merged = Capacity::with_filled(
            self.minimum.saturating_add(other.minimum),
            self.ideal.saturating_add(other.ideal),
            self.maximum.saturating_add(other.maximum),
            self.filled.saturating_add(other.filled),
        )?;
        *self = merged;
        Ok(())
    }

    /// 清空占用 (重置匹配时使用)
    pub(crate) fn clear_filled(&mut self) {
        self.filled = 0;
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.maximum == u32::MAX {
            write!(f, "{}/∞", self.filled)
        } else {
            write!(f, "{}/{}", self.filled, self.maximum)
        }
    }
}
