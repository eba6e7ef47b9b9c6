use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::NamedTempFile;

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.env("STUDY_PLANNER_TODAY", "2024-01-03")
        .write_stdin(script.to_string())
        .assert()
}

fn stdout_of(script: &str) -> String {
    let assert = run_cli(script).success();
    String::from_utf8_lossy(&assert.get_output().stdout).into_owned()
}

#[test]
fn cli_starts_on_the_current_week() {
    run_cli("quit\n")
        .success()
        .stdout(str_contains("Settimana 1/1 - 7/1"))
        .stdout(str_contains("mercoledì 03/01 *"))
        .stdout(str_contains("08:00-09:00 Latino"));
}

#[test]
fn cli_adds_lists_and_completes_tasks() {
    let output = stdout_of(
        "add exam 2024-01-04 Storia Prima guerra mondiale\nlist\ndone 1\nlist\nquit\n",
    );
    assert!(output.contains("Added task #1"));
    assert!(output.contains("[ ] #1 exam 2024-01-04 Storia - Prima guerra mondiale"));
    assert!(output.contains("Task #1 marked completed."));
    assert!(output.contains("[x] #1 exam 2024-01-04 Storia"));
}

#[test]
fn cli_rejects_invalid_tasks() {
    run_cli("add exam 04/01/2024 Storia\nadd gita 2024-01-04 Storia\nquit\n")
        .success()
        .stdout(str_contains("is not a calendar date"))
        .stdout(str_contains("unknown task type 'gita'"));
}

#[test]
fn cli_delete_command_removes_task() {
    run_cli("add homework 2024-01-05 Arte\ndelete 1\nlist\nquit\n")
        .success()
        .stdout(str_contains("Deleted task #1."))
        .stdout(str_contains("No tasks."));
}

#[test]
fn cli_time_command_sets_task_time() {
    run_cli("add commitment 2024-01-05 Gita\ntime 1 08:30\nlist\ntime 1 tardi\nquit\n")
        .success()
        .stdout(str_contains("Time of task #1 set to 08:30."))
        .stdout(str_contains("Gita (08:30)"))
        .stdout(str_contains("is not a clock time"));
}

#[test]
fn cli_agenda_shows_upcoming_exams() {
    let output = stdout_of(
        "add exam 2024-01-02 Passata\nadd exam 2024-01-10 Futura\nagenda\nquit\n",
    );
    let agenda = output.split("Prossime verifiche:").last().unwrap_or_default();
    assert!(agenda.contains("Futura"));
    assert!(!agenda.contains("Passata"));
    assert!(agenda.contains("Nessun impegno salvato."));
}

#[test]
fn cli_week_navigation() {
    run_cli("next\nweek 2024-02-14\nprev\nquit\n")
        .success()
        .stdout(str_contains("Settimana 8/1 - 14/1"))
        .stdout(str_contains("Settimana 12/2 - 18/2"))
        .stdout(str_contains("Settimana 5/2 - 11/2"));
}

#[test]
fn cli_timetable_editing() {
    run_cli(
        "timetable set sab Musica, Musica, Arte\ntimetable slots sab\ntimetable remove sab 3\ntimetable show\ntimetable reset\ntimetable show\nquit\n",
    )
    .success()
    .stdout(str_contains("08:00-10:00 Musica"))
    .stdout(str_contains("10:00-11:00 Arte"))
    .stdout(str_contains("Removed hour 3 (Arte) from Sabato."))
    .stdout(str_contains("Timetable (custom):"))
    .stdout(str_contains("Timetable reset to default."))
    .stdout(str_contains("Timetable (default):"));
}

#[test]
fn cli_timetable_set_keeps_free_hours() {
    run_cli("timetable set lun Latino,,Arte\ntimetable slots lun\nquit\n")
        .success()
        .stdout(str_contains("08:00-09:00 Latino"))
        .stdout(str_contains("09:00-10:00 \n"))
        .stdout(str_contains("10:00-11:00 Arte"));
}

#[test]
fn cli_timetable_subjects_lists_distinct_lessons() {
    run_cli("timetable subjects lun\ntimetable subjects sab\nquit\n")
        .success()
        .stdout(str_contains("Latino, Matematica, Inglese, Italiano"))
        .stdout(str_contains("Nessuna materia per Sabato"));
}

#[test]
fn cli_profile_and_theme() {
    run_cli("profile set name Sara\nprofile set school Liceo Volta\ntheme\nprofile show\nquit\n")
        .success()
        .stdout(str_contains("Student   : Sara"))
        .stdout(str_contains("School    : Liceo Volta"))
        .stdout(str_contains("Theme     : dark"));
}

#[test]
fn cli_save_and_load_json_round_trip() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().into_owned();
    let script = format!(
        "add exam 2024-01-04 Persistente\nsave json {path}\nadd homework 2024-01-05 Temporaneo\nload json {path}\nlist\nquit\n"
    );
    let output = stdout_of(&script);
    assert!(output.contains("Planner loaded from"));
    let after_reload = output.split("Planner loaded from").last().unwrap_or_default();
    assert!(after_reload.contains("Persistente"));
    assert!(!after_reload.contains("Temporaneo"));
}

#[test]
fn cli_csv_export_and_import() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().into_owned();
    let script = format!(
        "add exam 2024-01-04 Latino\nadd homework 2024-01-05 Greco\nexport csv {path}\nimport csv {path}\nlist\nquit\n"
    );
    let output = stdout_of(&script);
    assert!(output.contains(&format!("Exported 2 tasks to {path}")));
    assert!(output.contains(&format!("Imported 2 tasks from {path}")));
    // re-importing the same ids replaces rather than duplicates
    assert!(!output.contains("#3"));
}

#[test]
fn cli_unknown_command() {
    run_cli("frobnicate\nquit\n")
        .success()
        .stdout(str_contains("Unknown command. Type 'help'."));
}
