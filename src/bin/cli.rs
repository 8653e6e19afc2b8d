use polars::prelude::*;
use school_schedule::{
    MemoryStore, NewSection, PersistenceError, SchoolDay, Section, SectionStatus, SectionStore,
    ServiceConfig, TimetableEntry, TimetableStore, WeeklySchedule, config, enroll, group_by_day,
    load_snapshot_from_json, load_timetables_from_csv, save_snapshot_to_json,
    save_timetables_to_csv, set_status, unenroll,
};
use std::io::{self, Write};

fn cell_text(av: &AnyValue) -> String {
    match av {
        AnyValue::Null => String::new(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        _ => av.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut cells: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let row = columns
            .iter()
            .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
            .collect::<Vec<_>>();
        cells.push(row);
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for row in &cells {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |values: &[String]| {
        let mut line = String::from("|");
        for (ci, value) in values.iter().enumerate() {
            let pad = widths[ci].saturating_sub(value.chars().count());
            line.push(' ');
            line.push_str(value);
            line.push_str(&" ".repeat(pad));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&col_names));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn sections_dataframe(sections: &[Section]) -> PolarsResult<DataFrame> {
    let codes: Vec<&str> = sections.iter().map(|s| s.section_code.as_str()).collect();
    let names: Vec<&str> = sections.iter().map(|s| s.section_name.as_str()).collect();
    let instructors: Vec<&str> = sections.iter().map(|s| s.instructor_name.as_str()).collect();
    let rooms: Vec<&str> = sections.iter().map(|s| s.room.as_str()).collect();
    let enrolled: Vec<String> = sections
        .iter()
        .map(|s| format!("{}/{}", s.enrolled_count(), s.max_students))
        .collect();
    let statuses: Vec<&str> = sections.iter().map(|s| s.status.as_str()).collect();
    DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("code"), codes).into_column(),
        Series::new(PlSmallStr::from_static("name"), names).into_column(),
        Series::new(PlSmallStr::from_static("instructor"), instructors).into_column(),
        Series::new(PlSmallStr::from_static("room"), rooms).into_column(),
        Series::new(PlSmallStr::from_static("enrolled"), enrolled).into_column(),
        Series::new(PlSmallStr::from_static("status"), statuses).into_column(),
    ])
}

fn print_help() {
    println!(
        "Commands:\n  help                                   Show this help\n  sections                               List sections\n  section add <code> <max> <name...>     Create a section\n  section show <code>                    Show a section and its roster\n  section delete <code>                  Delete a section\n  section instructor <code> <id> <name...>\n                                         Set the instructor of a new section\n  enroll   <code> <student>              Enroll a student\n  unenroll <code> <student>              Remove a student\n  status   <code> <active|inactive|full> Override section status\n  entry add <student> <day> <start> <end> <room> <subject...>\n                                         Add a timetable entry (times like 9:00)\n  week <student>                         Show a student's week\n  save <json|csv> <path>                 Save everything (json) or timetables (csv)\n  load <json|csv> <path>                 Load everything (json) or timetables (csv)\n  quit|exit                              Exit"
    );
}

fn print_section(section: &Section) {
    println!("Section      : {} ({})", section.section_code, section.section_name);
    println!("Instructor   : {}", section.instructor_name);
    println!("Room         : {}", section.room);
    println!("Schedule     : {}", section.schedule.join(", "));
    println!(
        "Enrollment   : {}/{} ({})",
        section.enrolled_count(),
        section.max_students,
        section.status
    );
    println!("Students     : {}", section.enrolled_students.join(", "));
}

fn print_week(student: &str, week: &WeeklySchedule) {
    match week.to_dataframe() {
        Ok(df) if df.height() > 0 => println!("{}", render_df_as_text_table(&df)),
        Ok(_) => println!("No classes scheduled for {student}."),
        Err(e) => println!("Error rendering week: {e}"),
    }
    for (day, _) in week.iter() {
        println!("{:<10} {}", day.as_str(), week.summary(day).label());
    }
    println!("{:<10} {}", "Week", week.week_summary().label());
}

fn find_section(store: &MemoryStore, code: &str) -> Option<Section> {
    let found = store.find_by_code(code);
    if found.is_none() {
        println!("Section {code} not found.");
    }
    found
}

fn report_update(result: Result<Section, PersistenceError>, done: impl FnOnce(&Section)) {
    match result {
        Ok(section) => done(&section),
        Err(PersistenceError::Enrollment(e)) => println!("Rejected ({}): {}", e.kind(), e),
        Err(e) => println!("Error: {e}"),
    }
}

fn handle_section(store: &MemoryStore, parts: &mut std::str::SplitWhitespace<'_>) {
    match parts.next() {
        Some("add") => {
            let code = parts.next();
            let max = parts.next();
            let name = parts.collect::<Vec<_>>().join(" ");
            match (code, max) {
                (Some(code), Some(max)) if !name.is_empty() => {
                    let max_students: u32 = match max.parse() {
                        Ok(v) => v,
                        Err(_) => {
                            println!("Invalid max_students");
                            return;
                        }
                    };
                    if store.find_by_code(code).is_some() {
                        println!("Section {code} already exists.");
                        return;
                    }
                    match Section::create(NewSection::new(name, code, max_students)) {
                        Ok(section) => match store.insert_section(&section) {
                            Ok(()) => println!(
                                "Created section {} with {} seats.",
                                section.section_code, section.max_students
                            ),
                            Err(e) => println!("Error: {e}"),
                        },
                        Err(e) => println!("Error: {e}"),
                    }
                }
                _ => println!("Usage: section add <code> <max> <name...>"),
            }
        }
        Some("show") => match parts.next() {
            Some(code) => {
                if let Some(section) = find_section(store, code) {
                    print_section(&section);
                }
            }
            None => println!("Usage: section show <code>"),
        },
        Some("delete") => match parts.next() {
            Some(code) => {
                if let Some(section) = find_section(store, code) {
                    match store.delete_section(section.id) {
                        Ok(true) => println!("Deleted section {code}."),
                        Ok(false) => println!("Section {code} not found."),
                        Err(e) => println!("Error: {e}"),
                    }
                }
            }
            None => println!("Usage: section delete <code>"),
        },
        Some("instructor") => {
            let code = parts.next();
            let id = parts.next();
            let name = parts.collect::<Vec<_>>().join(" ");
            match (code, id) {
                (Some(code), Some(id)) if !name.is_empty() => {
                    if let Some(section) = find_section(store, code) {
                        let result = store.update_section(section.id, &|s| {
                            let mut updated = s.clone();
                            updated.instructor_id = id.to_string();
                            updated.instructor_name = name.clone();
                            Ok(updated)
                        });
                        report_update(result, |s| {
                            println!("Instructor of {} set to {}.", s.section_code, s.instructor_name)
                        });
                    }
                }
                _ => println!("Usage: section instructor <code> <id> <name...>"),
            }
        }
        _ => println!("Usage: section <add|show|delete|instructor> ..."),
    }
}

fn handle_entry(store: &MemoryStore, parts: &mut std::str::SplitWhitespace<'_>) {
    if parts.next() != Some("add") {
        println!("Usage: entry add <student> <day> <start> <end> <room> <subject...>");
        return;
    }
    let student = parts.next();
    let day = parts.next();
    let start = parts.next();
    let end = parts.next();
    let room = parts.next();
    let subject = parts.collect::<Vec<_>>().join(" ");
    let (Some(student), Some(day), Some(start), Some(end), Some(room)) =
        (student, day, start, end, room)
    else {
        println!("Usage: entry add <student> <day> <start> <end> <room> <subject...>");
        return;
    };
    if subject.is_empty() {
        println!("Usage: entry add <student> <day> <start> <end> <room> <subject...>");
        return;
    }
    let entry = match day
        .parse::<SchoolDay>()
        .and_then(|day| TimetableEntry::parse(subject, day, start, end, room))
    {
        Ok(entry) => entry,
        Err(e) => {
            println!("Error: {e}");
            return;
        }
    };
    let mut entries = match store.timetable_for_student(student) {
        Ok(entries) => entries,
        Err(e) => {
            println!("Error: {e}");
            return;
        }
    };
    entries.push(entry);
    match store.replace_timetable(student, &entries) {
        Ok(()) => println!("Added entry for {student} ({} total).", entries.len()),
        Err(e) => println!("Error: {e}"),
    }
}

fn handle_save(store: &MemoryStore, format: Option<&str>, path: Option<&str>) {
    let result = match (format, path) {
        (Some("json"), Some(path)) => save_snapshot_to_json(&store.snapshot(), path),
        (Some("csv"), Some(path)) => save_timetables_to_csv(&store.snapshot().timetables, path),
        _ => {
            println!("Usage: save <json|csv> <path>");
            return;
        }
    };
    match result {
        Ok(()) => println!("Saved to {}.", path.unwrap_or_default()),
        Err(e) => println!("Save error: {e}"),
    }
}

fn handle_load(store: &MemoryStore, format: Option<&str>, path: Option<&str>) {
    let result = match (format, path) {
        (Some("json"), Some(path)) => {
            load_snapshot_from_json(path).and_then(|snapshot| store.restore(snapshot))
        }
        (Some("csv"), Some(path)) => load_timetables_from_csv(path).and_then(|timetables| {
            for (student, entries) in &timetables {
                store.replace_timetable(student, entries)?;
            }
            Ok(())
        }),
        _ => {
            println!("Usage: load <json|csv> <path>");
            return;
        }
    };
    match result {
        Ok(()) => println!("Loaded from {}.", path.unwrap_or_default()),
        Err(e) => println!("Load error: {e}"),
    }
}

fn main() {
    let service_config = ServiceConfig {
        log_filter: "warn".to_string(),
        ..ServiceConfig::default()
    };
    config::init_tracing(&service_config);

    let store = MemoryStore::new();

    println!("School Schedule (CLI) - type 'help' for commands\n");

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
            "sections" => match store.list_sections().map(|s| sections_dataframe(&s)) {
                Ok(Ok(df)) => println!("{}", render_df_as_text_table(&df)),
                Ok(Err(e)) => println!("Error rendering sections: {e}"),
                Err(e) => println!("Error: {e}"),
            },
            "section" => handle_section(&store, &mut parts),
            "enroll" | "unenroll" => match (parts.next(), parts.next()) {
                (Some(code), Some(student)) => {
                    let Some(section) = find_section(&store, code) else {
                        continue;
                    };
                    if cmd == "enroll" {
                        let result = store.update_section(section.id, &|s| enroll(s, student));
                        report_update(result, |s| {
                            println!(
                                "Enrolled {student} in {} ({}/{}, {}).",
                                s.section_code,
                                s.enrolled_count(),
                                s.max_students,
                                s.status
                            )
                        });
                    } else {
                        let result = store.update_section(section.id, &|s| unenroll(s, student));
                        report_update(result, |s| {
                            println!(
                                "Unenrolled {student} from {} ({}/{}, {}).",
                                s.section_code,
                                s.enrolled_count(),
                                s.max_students,
                                s.status
                            )
                        });
                    }
                }
                _ => println!("Usage: {cmd} <code> <student>"),
            },
            "status" => match (parts.next(), parts.next()) {
                (Some(code), Some(status)) => {
                    let status: SectionStatus = match status.parse() {
                        Ok(s) => s,
                        Err(e) => {
                            println!("{e}");
                            continue;
                        }
                    };
                    let Some(section) = find_section(&store, code) else {
                        continue;
                    };
                    let result = store.update_section(section.id, &|s| Ok(set_status(s, status)));
                    report_update(result, |s| {
                        println!("Section {} is now {}.", s.section_code, s.status)
                    });
                }
                _ => println!("Usage: status <code> <active|inactive|full>"),
            },
            "entry" => handle_entry(&store, &mut parts),
            "week" => match parts.next() {
                Some(student) => match store
                    .timetable_for_student(student)
                    .map_err(|e| e.to_string())
                    .and_then(|entries| group_by_day(entries).map_err(|e| e.to_string()))
                {
                    Ok(week) => print_week(student, &week),
                    Err(e) => println!("Error: {e}"),
                },
                None => println!("Usage: week <student>"),
            },
            "save" => handle_save(&store, parts.next(), parts.next()),
            "load" => handle_load(&store, parts.next(), parts.next()),
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
