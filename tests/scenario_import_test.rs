// ==========================================
// 场景导入测试
// ==========================================
// 测试目标: JSON 场景 / CSV 学生表 → School 对象图
// ==========================================

mod test_helpers;

use school_enrollment::config::MatchingConfig;
use school_enrollment::domain::{DomainError, Rejection};
use school_enrollment::engine::ProposalOrchestrator;
use school_enrollment::importer::{
    CapacitySpec, GroupSpec, ImportError, RowParser, ScenarioLoader, StudentRowMapper, StudentSpec,
};
use std::collections::BTreeMap;

#[test]
fn test_load_summary_counts() {
    let loaded = ScenarioLoader::build(&test_helpers::scenario_spec()).unwrap();
    let summary = &loaded.summary;

    assert_eq!(summary.shifts, 2);
    assert_eq!(summary.grade_levels, 2);
    assert_eq!(summary.offerings, 6);
    assert_eq!(summary.sections, 9);
    assert_eq!(summary.students, 3);
    assert_eq!(summary.history_records, 2);
    assert_eq!(summary.rankings, 12);
    assert_eq!(summary.assignments, 1);
    assert!(summary.rejected.is_empty());

    // 往年记录是独立的学生记录 (同代码, 低年级)
    let school = &loaded.school;
    assert_eq!(school.students().len(), 5);
    let g10 = school.find_grade_level(10).unwrap();
    let g11 = school.find_grade_level(11).unwrap();
    let current = school.find_student(g11, "S1").unwrap();
    let record = school.find_student(g10, "S1").unwrap();
    assert_eq!(school.student(current).unwrap().previous(), Some(record));
    let algebra = school.find_offering("Algebra Level1").unwrap();
    assert!(school.taken(current).unwrap().contains(&algebra));
    assert!(school.has_level(current, 1).unwrap());
}

#[test]
fn test_offering_capacity_rolls_up_sections() {
    let school = test_helpers::load_scenario();

    let music = school.find_offering("Music").unwrap();
    let capacity = school.offering(music).unwrap().capacity();
    assert_eq!(capacity.minimum(), 2);
    assert_eq!(capacity.ideal(), 3);
    assert_eq!(capacity.maximum(), u32::MAX);

    let chess = school.find_offering("Chess").unwrap();
    let chess = school.offering(chess).unwrap();
    assert!(!chess.is_subject());
    assert_eq!(chess.capacity().maximum(), 10);
    assert_eq!(chess.capacity().filled(), 1);
}

#[test]
fn test_load_file_from_disk() {
    let file = test_helpers::write_temp_file(".json", test_helpers::SCENARIO_JSON).unwrap();
    let spec = ScenarioLoader::load_file(file.path()).unwrap();
    assert_eq!(spec.students.len(), 3);
    assert_eq!(spec, test_helpers::scenario_spec());

    assert!(matches!(
        ScenarioLoader::load_file("/nonexistent/scenario.json"),
        Err(ImportError::FileNotFound(_))
    ));

    let file = test_helpers::write_temp_file(".yaml", "shifts: []").unwrap();
    assert!(matches!(
        ScenarioLoader::load_file(file.path()),
        Err(ImportError::UnsupportedFormat(_))
    ));

    let file = test_helpers::write_temp_file(".json", "{ not json").unwrap();
    assert!(matches!(
        ScenarioLoader::load_file(file.path()),
        Err(ImportError::JsonParseError(_))
    ));
}

#[test]
fn test_unknown_references_fail_fast() {
    let mut spec = test_helpers::scenario_spec();
    spec.students[0]
        .rankings
        .insert("Core".to_string(), vec!["Astronomy".to_string()]);
    match ScenarioLoader::build(&spec) {
        Err(ImportError::UnknownReference { kind, name }) => {
            assert_eq!(kind, "offering");
            assert_eq!(name, "Astronomy");
        }
        other => panic!("应返回 UnknownReference, 实际: {:?}", other.map(|l| l.summary)),
    }

    let mut spec = test_helpers::scenario_spec();
    spec.students[2].shift = Some("NIGHT".to_string());
    assert!(matches!(
        ScenarioLoader::build(&spec),
        Err(ImportError::UnknownReference { kind: "shift", .. })
    ));

    let mut spec = test_helpers::scenario_spec();
    spec.students[1].not_alongside = vec!["S9".to_string()];
    assert!(matches!(
        ScenarioLoader::build(&spec),
        Err(ImportError::UnknownReference { kind: "student", .. })
    ));
}

#[test]
fn test_configuration_errors_fail_fast() {
    // 志愿类型不在年级配置中
    let mut spec = test_helpers::scenario_spec();
    spec.students[0]
        .rankings
        .insert("Club".to_string(), vec!["Chess".to_string()]);
    assert!(matches!(
        ScenarioLoader::build(&spec),
        Err(ImportError::Domain(DomainError::UnknownRankType(_)))
    ));

    // 往年年级不低于当前年级
    let mut spec = test_helpers::scenario_spec();
    if let Some(previous) = spec.students[0].previous.as_mut() {
        previous.grade_level = 11;
    }
    assert!(matches!(
        ScenarioLoader::build(&spec),
        Err(ImportError::Domain(DomainError::PreviousGradeNotLower { .. }))
    ));
}

#[test]
fn test_group_rejections_are_recorded_not_fatal() {
    let mut spec = test_helpers::scenario_spec();
    if let Some(physics) = spec.offerings.iter_mut().find(|o| o.name == "Physics") {
        physics.max_group_members = Some(1);
    }
    spec.groups.push(GroupSpec {
        offering: "Physics".to_string(),
        code: "LAB".to_string(),
        required: true,
    });
    spec.students[0]
        .groups
        .insert("Physics".to_string(), "LAB".to_string());
    spec.students[1]
        .groups
        .insert("Physics".to_string(), "LAB".to_string());
    // 未声明的分组自动创建
    spec.students[2]
        .groups
        .insert("Art".to_string(), "STUDIO".to_string());

    let loaded = ScenarioLoader::build(&spec).unwrap();
    assert_eq!(loaded.summary.groups, 2);
    assert_eq!(loaded.summary.rejected.len(), 1);
    let rejection = &loaded.summary.rejected[0];
    assert_eq!(rejection.student, "S2");
    assert_eq!(rejection.action, "group");
    assert_eq!(rejection.target, "LAB");
    assert_eq!(rejection.reason, Rejection::Full);

    let school = &loaded.school;
    let art = school.find_offering("Art").unwrap();
    let studio = school.find_group(art, "STUDIO").unwrap();
    assert!(school.group(studio).unwrap().required());
}

#[test]
fn test_assignment_rejection_is_recorded() {
    let mut spec = test_helpers::scenario_spec();
    spec.students.push(StudentSpec {
        code: "S4".to_string(),
        grade_level: 11,
        assignments: BTreeMap::from([("Club".to_string(), "Algebra Level1".to_string())]),
        ..StudentSpec::default()
    });

    // 类别槽位不能直接分配课程
    assert!(matches!(
        ScenarioLoader::build(&spec),
        Err(ImportError::Domain(DomainError::SlotNotConfigured { .. }))
    ));

    spec.students[3].assignments = BTreeMap::from([("Club".to_string(), "Chess".to_string())]);
    for offering in spec.offerings.iter_mut().filter(|o| o.name == "Chess") {
        offering.capacity = Some(CapacitySpec {
            minimum: 0,
            ideal: 0,
            maximum: 1,
        });
    }
    let loaded = ScenarioLoader::build(&spec).unwrap();
    assert_eq!(loaded.summary.assignments, 1);
    assert_eq!(loaded.summary.rejected.len(), 1);
    assert_eq!(loaded.summary.rejected[0].student, "S4");
    assert_eq!(loaded.summary.rejected[0].action, "assignment");
    assert_eq!(loaded.summary.rejected[0].reason, Rejection::Full);
}

#[test]
fn test_student_table_csv_merges_into_scenario() {
    let csv = "\
student,grade_level,shift,previous,rank:Core,rank:Elective,assign:Club
S4,11,PM,Algebra Level1,Math Level2||Physics,Music,Chess
S5,11,,,Physics,,
";
    let file = test_helpers::write_temp_file(".csv", csv).unwrap();
    let rows = RowParser::parse_file(file.path()).unwrap();
    let students = StudentRowMapper::map_rows(&rows).unwrap();
    assert_eq!(students.len(), 2);

    let mut spec = test_helpers::scenario_spec();
    spec.students.extend(students);
    let loaded = ScenarioLoader::build(&spec).unwrap();
    assert_eq!(loaded.summary.students, 5);
    assert_eq!(loaded.summary.history_records, 3);

    let mut school = loaded.school;
    ProposalOrchestrator::default().run(&mut school).unwrap();

    // S4 有往年记录且在 PM, 取得 Math B1
    let g11 = school.find_grade_level(11).unwrap();
    let s4 = school.find_student(g11, "S4").unwrap();
    let math = school.find_offering("Math Level2").unwrap();
    let record = school.student(s4).unwrap();
    assert_eq!(record.slot("Core"), Some(Some(math)));
    let section = record.section_for(math).unwrap();
    assert_eq!(school.section_label(section).unwrap(), "Math B1");

    // S5 未声明班次, 第一个录取的教学班决定班次
    let s5 = school.find_student(g11, "S5").unwrap();
    assert_eq!(school.student(s5).unwrap().shift(), school.find_shift("AM"));
}

#[test]
fn test_matching_config_file() {
    let file = test_helpers::write_temp_file(
        ".json",
        r#"{ "driver": { "order": "student_first", "max_rounds": 3 }, "log_filter": "debug" }"#,
    )
    .unwrap();
    let config = MatchingConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.driver.max_rounds, Some(3));
    assert_eq!(config.log_filter, "debug");
    assert!(!config.report.include_history_records);

    let file = test_helpers::write_temp_file(".json", r#"{ "driver": { "max_rounds": 0 } }"#).unwrap();
    assert!(MatchingConfig::load_from_file(file.path()).is_err());
}
