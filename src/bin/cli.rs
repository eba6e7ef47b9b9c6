use chrono::{Local, NaiveDate};
use study_planner::{
    Planner, SchoolDay, Task, TaskDraft, TaskType, WeekBoard, WeekWindow, export_tasks_to_csv,
    import_tasks_from_csv, load_planner_from_json, save_planner_to_json,
};
use std::io::{self, Write};
use std::str::FromStr;

fn render_board(board: &WeekBoard, planner: &Planner) -> String {
    let mut out = String::new();
    out.push_str(&format!("Settimana {}\n", board.label));
    for day in &board.days {
        let marker = if day.is_today { " *" } else { "" };
        out.push_str(&format!(
            "{} {}{}\n",
            day.name,
            day.date.format("%d/%m"),
            marker
        ));
        if day.is_weekend {
            out.push_str("  Weekend!\n");
        } else if day.slots.is_empty() {
            out.push_str("  Nessuna lezione impostata\n");
        } else {
            for slot in &day.slots {
                let label = if slot.label.is_empty() { "-" } else { slot.label.as_str() };
                out.push_str(&format!(
                    "  {:02}:00-{:02}:00 {}\n",
                    slot.start_hour, slot.end_hour, label
                ));
            }
        }
        for task in &day.tasks {
            out.push_str(&format!("  {}\n", render_task(task_number(planner, &task.id), task)));
        }
    }
    if board.hidden_tasks > 0 {
        out.push_str(&format!(
            "({} task(s) with unreadable due dates not shown)\n",
            board.hidden_tasks
        ));
    }
    out
}

fn render_task(number: usize, task: &Task) -> String {
    let check = if task.completed { "[x]" } else { "[ ]" };
    let mut line = format!(
        "{} #{} {} {} {}",
        check,
        number,
        task.kind,
        task.due_date_raw,
        task.subject
    );
    if let Some(time) = &task.time {
        line.push_str(&format!(" ({time})"));
    }
    if let Some(description) = &task.description {
        line.push_str(&format!(" - {description}"));
    }
    line
}

fn task_number(planner: &Planner, task_id: &str) -> usize {
    planner
        .tasks()
        .iter()
        .position(|task| task.id == task_id)
        .map(|idx| idx + 1)
        .unwrap_or(0)
}

/// Accept a 1-based list position or a task id.
fn resolve_task(planner: &Planner, reference: &str) -> Option<(usize, String)> {
    if let Ok(number) = reference.parse::<usize>() {
        if number >= 1 {
            if let Some(task) = planner.tasks().get(number - 1) {
                return Some((number, task.id.clone()));
            }
        }
    }
    planner
        .find_task(reference)
        .map(|task| (task_number(planner, &task.id), task.id.clone()))
}

fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()
}

fn print_help() {
    println!(
        "Commands:\n  help                                   Show this help\n  show                                   Show the current week\n  next | prev                            Move one week forward/back\n  week <YYYY-MM-DD>                      Show the week containing a date\n  list                                   List all tasks with their numbers\n  add <type> <YYYY-MM-DD> <subject> [description...]\n                                         Add homework|exam|commitment\n  time <n> <HH:MM>                       Set the time of task n\n  done <n>                               Toggle completion of task n\n  delete <n>                             Delete task n\n  agenda                                 Upcoming exams and commitments\n  timetable show                         Show the timetable\n  timetable slots <day>                  Show compressed slots of a day (lun..sab)\n  timetable subjects <day>               Distinct subjects of a day\n  timetable set <day> <a,,c>             Replace a day's subjects (empty = free hour)\n  timetable add <day>                    Append an empty hour\n  timetable remove <day> <n>             Remove hour n (1-based)\n  timetable reset                        Go back to the default timetable\n  profile show                           Show the student profile\n  profile set <field> <value...>         Set name|surname|age|school|classRoom|gender\n  theme                                  Toggle light/dark theme\n  save json <path>                       Save planner to disk\n  load json <path>                       Load planner from disk\n  export csv <path>                      Export tasks as CSV\n  import csv <path>                      Import tasks from CSV\n  quit|exit                              Exit"
    );
}

fn print_timetable(planner: &Planner) {
    let timetable = planner.timetable();
    let source = if planner.has_custom_timetable() {
        "custom"
    } else {
        "default"
    };
    println!("Timetable ({source}):");
    for day in SchoolDay::ALL {
        let periods = timetable.periods(day);
        if periods.is_empty() {
            println!("  {:<10} -", day.label());
        } else {
            println!("  {:<10} {}", day.label(), periods.join(", "));
        }
    }
}

fn print_profile(planner: &Planner) {
    let profile = planner.profile();
    println!("Student   : {}", profile.display_name());
    println!("School    : {}", profile.school_label());
    println!("Class     : {}", profile.class_room);
    println!(
        "Age       : {}",
        profile.age.map(|a| a.to_string()).unwrap_or_default()
    );
    println!("Gender    : {}", profile.gender);
    println!("Theme     : {}", planner.preferences().theme);
}

fn today() -> NaiveDate {
    std::env::var("STUDY_PLANNER_TODAY")
        .ok()
        .and_then(|value| parse_date(&value))
        .unwrap_or_else(|| Local::now().date_naive())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let today = today();
    let mut planner = Planner::new();
    let mut week = match WeekWindow::containing(today) {
        Ok(week) => week,
        Err(e) => {
            eprintln!("Error: {}", e);
            return;
        }
    };

    println!("Study Planner (CLI) - type 'help' for commands\n");
    println!("{}", render_board(&planner.week_board(&week, today), &planner));

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => println!("{}", render_board(&planner.week_board(&week, today), &planner)),
            "next" | "prev" => {
                let moved = if cmd == "next" {
                    week.next()
                } else {
                    week.previous()
                };
                match moved {
                    Ok(w) => {
                        week = w;
                        println!("{}", render_board(&planner.week_board(&week, today), &planner));
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "week" => match parts.next().and_then(parse_date) {
                Some(date) => match WeekWindow::containing(date) {
                    Ok(w) => {
                        week = w;
                        println!("{}", render_board(&planner.week_board(&week, today), &planner));
                    }
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("Usage: week <YYYY-MM-DD>"),
            },
            "list" => {
                if planner.tasks().is_empty() {
                    println!("No tasks.");
                }
                for (idx, task) in planner.tasks().iter().enumerate() {
                    println!("{}", render_task(idx + 1, task));
                }
            }
            "add" => {
                let kind_s = parts.next();
                let date_s = parts.next();
                let subject = parts.next();
                let description = parts.collect::<Vec<_>>().join(" ");
                match (kind_s, date_s, subject) {
                    (Some(kind_s), Some(date_s), Some(subject)) => {
                        let kind = match TaskType::from_str(kind_s) {
                            Ok(k) => k,
                            Err(e) => {
                                println!("Error: {}", e);
                                continue;
                            }
                        };
                        let mut draft = TaskDraft {
                            kind,
                            subject: subject.to_string(),
                            description: None,
                            due_date: date_s.to_string(),
                            time: None,
                        };
                        if !description.is_empty() {
                            draft = draft.with_description(description);
                        }
                        match planner.add_task(draft) {
                            Ok(task) => println!(
                                "Added task #{} ({}).",
                                task_number(&planner, &task.id),
                                task.id
                            ),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: add <type> <YYYY-MM-DD> <subject> [description...]"),
                }
            }
            "time" => {
                let reference = parts.next();
                let time = parts.next();
                match (reference, time) {
                    (Some(reference), Some(time)) => {
                        let Some((number, id)) = resolve_task(&planner, reference) else {
                            println!("Unknown task {}", reference);
                            continue;
                        };
                        let draft = match planner.find_task(&id) {
                            Some(task) => task.draft().with_time(time),
                            None => continue,
                        };
                        match planner.update_task(&id, draft) {
                            Ok(_) => println!("Time of task #{} set to {}.", number, time),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: time <n> <HH:MM>"),
                }
            }
            "done" => match parts.next() {
                Some(reference) => match resolve_task(&planner, reference) {
                    Some((number, id)) => match planner.toggle_completed(&id) {
                        Ok(task) if task.completed => {
                            println!("Task #{} marked completed.", number)
                        }
                        Ok(_) => println!("Task #{} marked open.", number),
                        Err(e) => println!("Error: {}", e),
                    },
                    None => println!("Unknown task {}", reference),
                },
                None => println!("Usage: done <n>"),
            },
            "delete" => match parts.next() {
                Some(reference) => match resolve_task(&planner, reference) {
                    Some((number, id)) => {
                        if planner.delete_task(&id) {
                            println!("Deleted task #{}.", number);
                        }
                    }
                    None => println!("Unknown task {}", reference),
                },
                None => println!("Usage: delete <n>"),
            },
            "agenda" => {
                let agenda = planner.agenda(today);
                println!("Prossime verifiche:");
                if agenda.exams.is_empty() {
                    println!("  Nessuna verifica in vista!");
                }
                for task in &agenda.exams {
                    println!("  {}", render_task(task_number(&planner, &task.id), task));
                }
                println!("Impegni:");
                if agenda.commitments.is_empty() {
                    println!("  Nessun impegno salvato.");
                }
                for task in &agenda.commitments {
                    println!("  {}", render_task(task_number(&planner, &task.id), task));
                }
            }
            "timetable" => {
                let sub = parts.next().unwrap_or("");
                match sub {
                    "show" | "" => print_timetable(&planner),
                    "reset" => {
                        planner.reset_timetable();
                        println!("Timetable reset to default.");
                    }
                    "slots" | "subjects" | "set" | "add" | "remove" => {
                        let day = match parts.next().map(SchoolDay::from_str) {
                            Some(Ok(day)) => day,
                            Some(Err(e)) => {
                                println!("Error: {}", e);
                                continue;
                            }
                            None => {
                                println!("Usage: timetable {} <day> ...", sub);
                                continue;
                            }
                        };
                        match sub {
                            "slots" => {
                                let slots = planner.timetable().slots(day);
                                if slots.is_empty() {
                                    println!("Nessuna lezione impostata");
                                }
                                for slot in slots {
                                    println!(
                                        "{:02}:00-{:02}:00 {}",
                                        slot.start_hour, slot.end_hour, slot.label
                                    );
                                }
                            }
                            "subjects" => {
                                let subjects = planner.timetable().suggested_subjects(day);
                                if subjects.is_empty() {
                                    println!("Nessuna materia per {}", day.label());
                                } else {
                                    println!("{}", subjects.join(", "));
                                }
                            }
                            "set" => {
                                let rest = parts.collect::<Vec<_>>().join(" ");
                                // empty segments are free hours
                                let subjects = if rest.trim().is_empty() {
                                    Vec::new()
                                } else {
                                    rest.split(',').map(|s| s.trim().to_string()).collect()
                                };
                                planner.edit_timetable(|t| t.set_day(day, subjects));
                                println!("Timetable for {} updated.", day.label());
                            }
                            "add" => {
                                let idx = planner.edit_timetable(|t| t.add_hour(day));
                                println!("Added hour {} to {}.", idx + 1, day.label());
                            }
                            _ => {
                                let idx = match parts.next().and_then(|s| s.parse::<usize>().ok()) {
                                    Some(n) if n >= 1 => n - 1,
                                    _ => {
                                        println!("Usage: timetable remove <day> <n>");
                                        continue;
                                    }
                                };
                                match planner.edit_timetable(|t| t.remove_hour(day, idx)) {
                                    Ok(removed) => println!(
                                        "Removed hour {} ({}) from {}.",
                                        idx + 1,
                                        removed,
                                        day.label()
                                    ),
                                    Err(e) => println!("Error: {}", e),
                                }
                            }
                        }
                    }
                    _ => println!("Usage: timetable show|slots|subjects|set|add|remove|reset"),
                }
            }
            "profile" => match parts.next() {
                Some("show") | None => print_profile(&planner),
                Some("set") => {
                    let field = parts.next();
                    let value = parts.collect::<Vec<_>>().join(" ");
                    match field {
                        Some(field) => {
                            let mut profile = planner.profile().clone();
                            match profile.set_field(field, &value) {
                                Ok(()) => {
                                    planner.set_profile(profile);
                                    println!("Profile {} updated.", field);
                                }
                                Err(e) => println!("Error: {}", e),
                            }
                        }
                        None => println!("Usage: profile set <field> <value...>"),
                    }
                }
                Some(_) => println!("Usage: profile show|set <field> <value...>"),
            },
            "theme" => {
                let theme = planner.toggle_theme();
                println!("Theme set to {}.", theme);
            }
            "save" | "load" | "export" | "import" => {
                let format = parts.next();
                let path = parts.collect::<Vec<_>>().join(" ");
                if path.is_empty() {
                    println!("Usage: {} <json|csv> <path>", cmd);
                    continue;
                }
                match (cmd, format) {
                    ("save", Some("json")) => match save_planner_to_json(&planner, &path) {
                        Ok(()) => println!("Planner saved to {}", path),
                        Err(e) => println!("Error: {}", e),
                    },
                    ("load", Some("json")) => match load_planner_from_json(&path) {
                        Ok(loaded) => {
                            planner = loaded;
                            println!("Planner loaded from {}", path);
                        }
                        Err(e) => println!("Error: {}", e),
                    },
                    ("export", Some("csv")) => match export_tasks_to_csv(&planner, &path) {
                        Ok(()) => println!("Exported {} tasks to {}", planner.tasks().len(), path),
                        Err(e) => println!("Error: {}", e),
                    },
                    ("import", Some("csv")) => match import_tasks_from_csv(&path) {
                        Ok(tasks) => {
                            let mut imported = 0;
                            for task in tasks {
                                match planner.upsert_task_record(task) {
                                    Ok(()) => imported += 1,
                                    Err(e) => println!("Skipped: {}", e),
                                }
                            }
                            println!("Imported {} tasks from {}", imported, path);
                        }
                        Err(e) => println!("Error: {}", e),
                    },
                    _ => println!("Usage: save|load json <path>, export|import csv <path>"),
                }
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
