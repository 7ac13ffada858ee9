// ==========================================
// 选课分班系统 - 独立匹配并发运行
// ==========================================
// 适用: 互不共享容量对象的 School (例如按年级拆分)
// 每个 School 在 tokio 阻塞线程池上独立运行
// ==========================================

use crate::config::DriverConfig;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::school::School;
use crate::engine::orchestrator::{MatchOutcome, ProposalOrchestrator};
use futures::future::join_all;
use tracing::{error, info};

/// 并发运行多个独立 School
///
/// # 返回
/// 与输入顺序一致的 (School, MatchOutcome); 任一运行失败则返回第一个错误
pub async fn run_independent(
    schools: Vec<School>,
    config: DriverConfig,
) -> DomainResult<Vec<(School, MatchOutcome)>> {
    info!(count = schools.len(), "开始并发匹配");

    let tasks = schools.into_iter().enumerate().map(|(index, mut school)| {
        let orchestrator = ProposalOrchestrator::new(config.clone());
        async move {
            tokio::task::spawn_blocking(move || {
                let outcome = orchestrator.run(&mut school)?;
                Ok::<_, DomainError>((school, outcome))
            })
            .await
            .map_err(|e| {
                error!(index, error = %e, "匹配任务执行失败");
                DomainError::TaskFailed(e.to_string())
            })?
        }
    });

    let results = join_all(tasks).await;

    info!(
        total = results.len(),
        success = results.iter().filter(|r| r.is_ok()).count(),
        failed = results.iter().filter(|r| r.is_err()).count(),
        "并发匹配完成"
    );

    results.into_iter().collect()
}
