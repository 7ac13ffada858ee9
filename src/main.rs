// ==========================================
// 选课分班系统 - 命令行入口
// ==========================================
// 用法:
//   school-enrollment <scenario.json> [students.csv] [--config matching.json]
//
// 流程: 读取配置 → 装载场景 (可追加学生表) → 驱动志愿提交 → 输出 JSON 报告
// 报告写 stdout, 日志写 stderr
// ==========================================

use anyhow::{bail, Context, Result};
use school_enrollment::config::MatchingConfig;
use school_enrollment::engine::{EnrollmentReport, ProposalOrchestrator};
use school_enrollment::importer::{RowParser, ScenarioLoader, StudentRowMapper};
use school_enrollment::{logging, APP_NAME, VERSION};
use std::path::PathBuf;
use tracing::{info, warn};

struct CliArgs {
    scenario: PathBuf,
    students: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn parse_args() -> Result<CliArgs> {
    let mut positional = Vec::new();
    let mut config = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            let path = args.next().context("--config 缺少文件路径")?;
            config = Some(PathBuf::from(path));
        } else {
            positional.push(PathBuf::from(arg));
        }
    }

    let mut positional = positional.into_iter();
    let scenario = match positional.next() {
        Some(path) => path,
        None => bail!("用法: school-enrollment <scenario.json> [students.csv] [--config matching.json]"),
    };
    let students = positional.next();
    if positional.next().is_some() {
        bail!("参数过多");
    }

    Ok(CliArgs {
        scenario,
        students,
        config,
    })
}

fn main() -> Result<()> {
    let args = parse_args()?;

    let config = match &args.config {
        Some(path) => MatchingConfig::load_from_file(path)
            .with_context(|| format!("加载配置失败: {}", path.display()))?,
        None => MatchingConfig::default(),
    };

    logging::init_with_filter(&config.log_filter);

    info!("==========================================");
    info!("{} v{}", APP_NAME, VERSION);
    info!("==========================================");
    info!(config = %config.snapshot_json()?, "运行配置");

    let mut spec = ScenarioLoader::load_file(&args.scenario)
        .with_context(|| format!("读取场景失败: {}", args.scenario.display()))?;

    if let Some(path) = &args.students {
        let rows = RowParser::parse_file(path)
            .with_context(|| format!("读取学生表失败: {}", path.display()))?;
        let students = StudentRowMapper::map_rows(&rows)?;
        info!(count = students.len(), "学生表已读取");
        spec.students.extend(students);
    }

    let loaded = ScenarioLoader::build(&spec).context("场景装载失败")?;
    for rejection in &loaded.summary.rejected {
        warn!(
            student = %rejection.student,
            action = %rejection.action,
            target = %rejection.target,
            reason = %rejection.reason,
            "装载阶段被拒绝"
        );
    }

    let mut school = loaded.school;
    let orchestrator = ProposalOrchestrator::new(config.driver.clone());
    let outcome = orchestrator.run(&mut school)?;

    let report = EnrollmentReport::build(&school, Some(outcome), &config.report)?;
    println!("{}", report.to_json()?);

    info!(run_id = %report.run_id, "运行完成");
    Ok(())
}
