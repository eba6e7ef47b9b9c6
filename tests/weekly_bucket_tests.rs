use chrono::NaiveDate;
use study_planner::{Task, TaskType, WeekWindow, WeekWindowError, bucketize, bucketize_dates};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn task(id: &str, due: &str) -> Task {
    let mut task = Task::new(id, TaskType::Homework, "Matematica", d(2000, 1, 1));
    task.due_date_raw = due.to_string();
    task
}

fn first_week_of_2024() -> WeekWindow {
    WeekWindow::containing(d(2024, 1, 1)).unwrap()
}

fn ids(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|task| task.id.as_str()).collect()
}

#[test]
fn tasks_land_in_their_due_date_bucket() {
    let tasks = vec![
        task("1", "2024-01-02"),
        task("2", "2024-01-02"),
        task("3", "2024-01-05"),
        task("4", "2024-01-09"),
    ];
    let week = first_week_of_2024();
    let result = bucketize(&tasks, &week);

    assert_eq!(result.buckets().len(), 7);
    assert_eq!(ids(result.get(d(2024, 1, 2)).unwrap()), ["1", "2"]);
    assert_eq!(ids(result.get(d(2024, 1, 5)).unwrap()), ["3"]);
    for empty in [1, 3, 4, 6, 7] {
        assert!(result.get(d(2024, 1, empty)).unwrap().is_empty());
    }
    assert!(result.get(d(2024, 1, 9)).is_none());
    assert_eq!(result.task_count(), 3);
    assert_eq!(result.unparseable(), 0);
}

#[test]
fn out_of_window_task_is_absent_from_every_bucket() {
    let tasks = vec![
        task("1", "2024-01-03"),
        task("2", "2024-01-01"),
        task("3", "2024-01-10"),
    ];
    let result = bucketize(&tasks, &first_week_of_2024());

    let expected: [(u32, Vec<&str>); 7] = [
        (1, vec!["2"]),
        (2, vec![]),
        (3, vec!["1"]),
        (4, vec![]),
        (5, vec![]),
        (6, vec![]),
        (7, vec![]),
    ];
    for (day, want) in expected {
        assert_eq!(ids(result.get(d(2024, 1, day)).unwrap()), want, "2024-01-{day:02}");
    }
    assert!(
        result
            .buckets()
            .iter()
            .all(|bucket| bucket.tasks.iter().all(|task| task.id != "3"))
    );
}

#[test]
fn empty_task_list_still_yields_seven_empty_buckets() {
    let result = bucketize(&[], &first_week_of_2024());
    let dates: Vec<NaiveDate> = result.dates().collect();
    assert_eq!(dates, first_week_of_2024().dates().to_vec());
    assert!(result.buckets().iter().all(|bucket| bucket.tasks.is_empty()));
}

#[test]
fn bucket_order_follows_input_order() {
    let tasks = vec![
        task("c", "2024-01-03"),
        task("a", "2024-01-03"),
        task("b", "2024-01-03"),
    ];
    let result = bucketize(&tasks, &first_week_of_2024());
    assert_eq!(ids(result.get(d(2024, 1, 3)).unwrap()), ["c", "a", "b"]);
}

#[test]
fn bucketizing_is_idempotent() {
    let tasks = vec![task("1", "2024-01-04"), task("2", "2024-01-06")];
    let week = first_week_of_2024();
    assert_eq!(bucketize(&tasks, &week), bucketize(&tasks, &week));
}

#[test]
fn due_dates_with_time_compare_on_the_date() {
    let tasks = vec![
        task("late", "2024-01-07T23:30:00"),
        task("offset", "2024-01-01T00:15:00+02:00"),
        task("next", "2024-01-08T00:00:00"),
    ];
    let result = bucketize(&tasks, &first_week_of_2024());
    assert_eq!(ids(result.get(d(2024, 1, 7)).unwrap()), ["late"]);
    assert_eq!(ids(result.get(d(2024, 1, 1)).unwrap()), ["offset"]);
    assert_eq!(result.task_count(), 2);
}

#[test]
fn unparseable_due_dates_are_skipped_and_counted() {
    let tasks = vec![
        task("bad", "domani"),
        task("empty", ""),
        task("ok", "2024-01-02"),
    ];
    let result = bucketize(&tasks, &first_week_of_2024());
    assert_eq!(result.task_count(), 1);
    assert_eq!(result.unparseable(), 2);
}

#[test]
fn every_in_window_task_lands_exactly_once() {
    let tasks: Vec<Task> = (0..20)
        .map(|i| task(&i.to_string(), &format!("2023-12-{:02}", 25 + i % 7)))
        .chain((0..10).map(|i| task(&format!("w{i}"), &format!("2024-01-{:02}", 1 + i % 7))))
        .collect();
    let week = first_week_of_2024();
    let result = bucketize(&tasks, &week);
    let expected = tasks
        .iter()
        .filter(|t| t.due_date().is_some_and(|due| week.contains(due)))
        .count();
    assert_eq!(result.task_count(), expected);
    assert_eq!(expected, 10);
}

#[test]
fn bucketize_dates_validates_the_window() {
    let tasks = vec![task("1", "2024-01-02")];
    let short = [d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 3)];
    assert_eq!(
        bucketize_dates(&tasks, &short),
        Err(WeekWindowError::WrongLength(3))
    );

    let dates: Vec<NaiveDate> = (1..=7).map(|day| d(2024, 1, day)).collect();
    let result = bucketize_dates(&tasks, &dates).unwrap();
    assert_eq!(result.task_count(), 1);
}

#[test]
fn into_map_keys_every_window_date() {
    let tasks = vec![task("1", "2024-01-02")];
    let map = bucketize(&tasks, &first_week_of_2024()).into_map();
    assert_eq!(map.len(), 7);
    assert_eq!(map[&d(2024, 1, 2)].len(), 1);
}
