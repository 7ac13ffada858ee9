// ==========================================
// 并发匹配测试
// ==========================================
// 测试目标: 独立 School 并发运行 / 共享 School 加锁提交
// ==========================================

mod test_helpers;

use futures::future::join_all;
use school_enrollment::config::{DriverConfig, DriverOrder};
use school_enrollment::engine::{run_independent, ProposalOrchestrator, SharedSchool};
use school_enrollment::logging;
use std::time::Instant;

#[tokio::test]
async fn test_run_independent_preserves_order_and_results() {
    logging::init_test();

    let mut expected_school = test_helpers::load_scenario();
    let expected = ProposalOrchestrator::default()
        .run(&mut expected_school)
        .unwrap();

    let schools = vec![
        test_helpers::load_scenario(),
        test_helpers::create_small_school().school,
        test_helpers::load_scenario(),
    ];

    let start = Instant::now();
    let results = run_independent(schools, DriverConfig::default()).await.unwrap();
    let elapsed = start.elapsed();
    println!("并发运行 3 个学校耗时: {:?}", elapsed);

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].1, expected);
    assert_eq!(results[2].1, expected);

    // 空学校立即耗尽
    let (small, outcome) = &results[1];
    assert!(small.students().is_empty());
    assert_eq!(outcome.rounds, 0);
    assert!(outcome.exhausted);

    let (school, _) = &results[0];
    let grade = school.find_grade_level(11).unwrap();
    let s2 = school.find_student(grade, "S2").unwrap();
    let physics = school.find_offering("Physics").unwrap();
    assert_eq!(school.student(s2).unwrap().slot("Core"), Some(Some(physics)));
}

#[tokio::test]
async fn test_run_independent_with_student_first_order() {
    let config = DriverConfig {
        order: DriverOrder::StudentFirst,
        ..DriverConfig::default()
    };
    let schools = (0..4).map(|_| test_helpers::load_scenario()).collect();
    let results = run_independent(schools, config).await.unwrap();

    assert_eq!(results.len(), 4);
    for (_, outcome) in &results {
        assert_eq!(outcome.rounds, 1);
        assert_eq!(outcome.accepted, 6);
    }
}

#[tokio::test]
async fn test_shared_school_never_overfills_section() {
    let mut small = test_helpers::create_small_school();
    let grade = small.grade;
    let seminar = small
        .school
        .add_subject("Seminar", "Core", None, &[grade])
        .unwrap();
    let section = small
        .school
        .add_section(seminar, small.am, "P", None, test_helpers::cap(1), None)
        .unwrap();
    let students: Vec<_> = (0..8)
        .map(|i| {
            let id = small.school.add_student(&format!("C{}", i), grade).unwrap();
            small.school.add_ranking(id, "Core", seminar).unwrap();
            id
        })
        .collect();

    let shared = SharedSchool::new(small.school);
    let tasks = students.into_iter().map(|student| {
        let shared = shared.clone();
        tokio::task::spawn_blocking(move || shared.propose(student, "Core", 0))
    });
    let results = join_all(tasks).await;

    let accepted = results
        .into_iter()
        .map(|r| r.unwrap().unwrap())
        .filter(|r| r.admission.is_accepted())
        .count();
    assert_eq!(accepted, 1);

    let school = shared.into_inner().unwrap();
    let section = school.section(section).unwrap();
    assert_eq!(section.students().len(), 1);
    assert!(section.capacity().is_full());
    assert_eq!(school.offering(seminar).unwrap().students().len(), 1);
}
