use chrono::NaiveDate;
use std::io::Write;
use study_planner::{
    PersistenceError, Planner, SchoolDay, StudentProfile, Task, TaskDraft, TaskType,
    export_tasks_to_csv, import_tasks_from_csv, load_planner_from_json, save_planner_to_json,
};
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn build_sample_planner() -> Planner {
    let mut planner = Planner::new();
    let exam = planner
        .add_task(
            TaskDraft::new(TaskType::Exam, "Matematica", d(2024, 2, 12))
                .with_description("Equazioni, disequazioni")
                .with_time("09:00"),
        )
        .unwrap();
    planner.toggle_completed(&exam.id).unwrap();
    planner
        .add_task(TaskDraft::new(TaskType::Homework, "Inglese", d(2024, 2, 13)))
        .unwrap();

    let mut legacy = Task::new("legacy", TaskType::Commitment, "Gita", d(2024, 2, 14));
    legacy.due_date_raw = "2024-02-14T08:00:00.000Z".into();
    planner.upsert_task_record(legacy).unwrap();

    planner.edit_timetable(|t| t.set_day(SchoolDay::Saturday, vec!["Musica".to_string()]));
    let mut profile = StudentProfile::default();
    profile.name = "Luca".into();
    profile.school = "Liceo Galilei".into();
    planner.set_profile(profile);
    planner.toggle_theme();
    planner
}

#[test]
fn json_round_trip_restores_the_whole_planner() {
    let planner = build_sample_planner();
    let tmp = NamedTempFile::new().unwrap();

    save_planner_to_json(&planner, tmp.path()).unwrap();
    let loaded = load_planner_from_json(tmp.path()).unwrap();

    assert_eq!(loaded.tasks(), planner.tasks());
    assert_eq!(loaded.timetable(), planner.timetable());
    assert!(loaded.has_custom_timetable());
    assert_eq!(loaded.profile(), planner.profile());
    assert_eq!(loaded.preferences(), planner.preferences());
}

#[test]
fn json_uses_camel_case_task_fields() {
    let planner = build_sample_planner();
    let tmp = NamedTempFile::new().unwrap();
    save_planner_to_json(&planner, tmp.path()).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(tmp.path()).unwrap()).unwrap();
    let first = &raw["tasks"][0];
    assert_eq!(first["type"], "exam");
    assert_eq!(first["dueDate"], "2024-02-12");
    assert_eq!(first["completed"], true);
    assert!(first.get("createdAt").is_some());
    assert_eq!(raw["timetable"]["sab"][0], "Musica");
    assert_eq!(raw["preferences"]["theme"], "dark");
}

#[test]
fn default_timetable_is_not_written() {
    let mut planner = Planner::new();
    planner
        .add_task(TaskDraft::new(TaskType::Homework, "Arte", d(2024, 2, 13)))
        .unwrap();
    let tmp = NamedTempFile::new().unwrap();
    save_planner_to_json(&planner, tmp.path()).unwrap();

    let loaded = load_planner_from_json(tmp.path()).unwrap();
    assert!(!loaded.has_custom_timetable());
}

#[test]
fn json_load_rejects_duplicate_ids() {
    let mut tmp = NamedTempFile::new().unwrap();
    write!(
        tmp,
        r#"{{"tasks": [
            {{"id": "a", "type": "homework", "subject": "Arte", "dueDate": "2024-02-13"}},
            {{"id": "a", "type": "exam", "subject": "Arte", "dueDate": "2024-02-14"}}
        ]}}"#
    )
    .unwrap();
    let err = load_planner_from_json(tmp.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(_)));
}

#[test]
fn json_load_keeps_tasks_with_unreadable_dates() {
    let mut tmp = NamedTempFile::new().unwrap();
    write!(
        tmp,
        r#"{{"tasks": [{{"id": "x", "subject": "Arte", "dueDate": "boh"}}]}}"#
    )
    .unwrap();
    let planner = load_planner_from_json(tmp.path()).unwrap();
    assert_eq!(planner.tasks().len(), 1);
    assert_eq!(planner.tasks()[0].kind, TaskType::Homework);
    assert_eq!(planner.tasks()[0].due_date(), None);
}

#[test]
fn csv_round_trip_preserves_tasks() {
    let planner = build_sample_planner();
    let tmp = NamedTempFile::new().unwrap();

    export_tasks_to_csv(&planner, tmp.path()).unwrap();
    let tasks = import_tasks_from_csv(tmp.path()).unwrap();
    assert_eq!(tasks, planner.tasks());
}

#[test]
fn csv_import_accepts_sparse_rows() {
    let mut tmp = NamedTempFile::new().unwrap();
    writeln!(tmp, "id,type,subject,description,due_date,time,completed,created_at").unwrap();
    writeln!(tmp, "r1,verifica,Storia,,2024-03-01,,,").unwrap();
    writeln!(tmp, "r2,,Arte,Disegno,2024-03-02,14:30,true,").unwrap();

    let tasks = import_tasks_from_csv(tmp.path()).unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].kind, TaskType::Exam);
    assert_eq!(tasks[0].description, None);
    assert!(!tasks[0].completed);
    assert_eq!(tasks[1].kind, TaskType::Homework);
    assert_eq!(tasks[1].time.as_deref(), Some("14:30"));
    assert!(tasks[1].completed);
}

#[test]
fn csv_import_reports_bad_values() {
    let mut tmp = NamedTempFile::new().unwrap();
    writeln!(tmp, "id,type,subject,description,due_date,time,completed,created_at").unwrap();
    writeln!(tmp, "r1,homework,Storia,,2024-03-01,,forse,").unwrap();
    assert!(matches!(
        import_tasks_from_csv(tmp.path()),
        Err(PersistenceError::InvalidData(_))
    ));

    let mut tmp = NamedTempFile::new().unwrap();
    writeln!(tmp, "id,type,subject,description,due_date,time,completed,created_at").unwrap();
    writeln!(tmp, "r1,gita,Storia,,2024-03-01,,,").unwrap();
    assert!(import_tasks_from_csv(tmp.path()).is_err());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_planner_from_json(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, PersistenceError::Io(_)));
}
