// ==========================================
// 选课分班系统 - 共享对象图句柄
// ==========================================
// 多个驱动共享同一 School 时使用 (例如跨班次的共享课程)
// 红线: 每次志愿提交在一次加锁内完成
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::school::School;
use crate::domain::types::{ProposalResult, StudentId};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct SharedSchool {
    inner: Arc<Mutex<School>>,
}

impl SharedSchool {
    pub fn new(school: School) -> Self {
        Self {
            inner: Arc::new(Mutex::new(school)),
        }
    }

    /// 在锁内执行操作
    pub fn with<R>(&self, f: impl FnOnce(&mut School) -> DomainResult<R>) -> DomainResult<R> {
        let mut school = self
            .inner
            .lock()
            .map_err(|e| DomainError::LockPoisoned(e.to_string()))?;
        f(&mut *school)
    }

    pub fn propose(&self, student: StudentId, rank_type: &str, index: usize) -> DomainResult<ProposalResult> {
        self.with(|school| school.propose(student, rank_type, index))
    }

    /// 当前状态的副本 (用于出报告)
    pub fn snapshot(&self) -> DomainResult<School> {
        self.with(|school| Ok(school.clone()))
    }

    /// 取回对象图 (仍有其他句柄时返回副本)
    pub fn into_inner(self) -> DomainResult<School> {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => mutex
                .into_inner()
                .map_err(|e| DomainError::LockPoisoned(e.to_string())),
            Err(shared) => SharedSchool { inner: shared }.snapshot(),
        }
    }
}
