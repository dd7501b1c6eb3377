//! Table formatting for CLI output

use chrono::{DateTime, Local, Utc};
use console::style;
use tabled::{
    builder::Builder,
    settings::{object::Columns, Modify, Style, Width},
    Table, Tabled,
};
use taskhire_sdk::{AjtbdSuggestion, Project, SuggestionKind, Task, User};

const SUGGESTION_WIDTH: usize = 80;

/// Format a timestamp as local YY-MM-DD HH:MM:SS
fn format_timestamp(timestamp: Option<&DateTime<Utc>>) -> String {
    timestamp
        .map(|dt| dt.with_timezone(&Local).format("%y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Two-column key/value table without header
fn details_table(details: &[(&str, String)]) -> Table {
    let mut builder = Builder::default();
    for (key, value) in details {
        builder.push_record([key.to_string(), value.clone()]);
    }
    let mut table = builder.build();
    table.with(Style::blank());
    table
}

fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

/// Display tasks in table format
pub fn display_tasks(tasks: &[Task]) {
    #[derive(Tabled)]
    struct TaskRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Title")]
        title: String,
        #[tabled(rename = "Status")]
        status: String,
        #[tabled(rename = "Time limit")]
        time_limit: String,
        #[tabled(rename = "Project")]
        project: String,
        #[tabled(rename = "Updated")]
        updated: String,
    }

    if tasks.is_empty() {
        println!("No tasks found");
        return;
    }

    let rows: Vec<TaskRow> = tasks
        .iter()
        .map(|task| TaskRow {
            id: task.id.clone(),
            title: task.title.clone(),
            status: or_dash(task.status.as_deref()),
            time_limit: or_dash(task.time_limit.as_deref()),
            project: or_dash(task.project_id.as_deref()),
            updated: format_timestamp(task.updated_at.as_ref().or(task.created_at.as_ref())),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::modern());
    println!("{table}");
}

/// Display projects in table format
pub fn display_projects(projects: &[Project]) {
    #[derive(Tabled)]
    struct ProjectRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Title")]
        title: String,
        #[tabled(rename = "Access code")]
        access_code: String,
        #[tabled(rename = "Active")]
        active: String,
        #[tabled(rename = "Deadline")]
        final_date: String,
    }

    if projects.is_empty() {
        println!("No projects found");
        return;
    }

    let rows: Vec<ProjectRow> = projects
        .iter()
        .map(|project| ProjectRow {
            id: project.id.clone(),
            title: project.title.clone(),
            access_code: project.access_code.clone(),
            active: if project.is_active { "yes" } else { "no" }.to_string(),
            final_date: or_dash(project.final_date.as_deref()),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::modern());
    println!("{table}");
}

/// Display one project with its relations
pub fn display_project(project: &Project) {
    println!("{}", style(&project.title).bold());
    if let Some(description) = project.description.as_deref().filter(|d| !d.is_empty()) {
        println!("{description}");
    }
    println!();

    let client = project
        .client
        .as_ref()
        .map(|c| match &c.email {
            Some(email) => format!("{} <{}>", c.name, email),
            None => c.name.clone(),
        })
        .unwrap_or_else(|| project.client_id.clone());

    let details = [
        ("ID", project.id.clone()),
        ("Client", client),
        ("Access code", project.access_code.clone()),
        ("Active", if project.is_active { "yes" } else { "no" }.to_string()),
        ("Deadline", or_dash(project.final_date.as_deref())),
        ("Created", format_timestamp(project.created_at.as_ref())),
    ];
    println!("{}", details_table(&details));

    let tasks = project.tasks.as_deref().unwrap_or_default();
    println!();
    println!("{} ({})", style("Tasks").bold(), tasks.len());
    if !tasks.is_empty() {
        display_tasks(tasks);
    }

    let candidates = project.candidates.as_deref().unwrap_or_default();
    println!();
    println!("{} ({})", style("Candidates").bold(), candidates.len());
    for candidate in candidates {
        println!("  {candidate}");
    }
}

/// Display a user profile
pub fn display_user(user: &User) {
    println!("{}", style(user.display_name()).bold());

    let details = [
        ("ID", user.id.clone()),
        ("Telegram ID", user.telegram_id.clone()),
        ("Username", or_dash(user.username.as_deref())),
        ("Language", or_dash(user.language.as_deref())),
        ("Member since", format_timestamp(user.created_at.as_ref())),
    ];
    println!("{}", details_table(&details));
}

/// Display quiz suggestions for one stage
pub fn display_suggestions(stage: &str, suggestions: &[AjtbdSuggestion]) {
    #[derive(Tabled)]
    struct SuggestionRow {
        #[tabled(rename = "Kind")]
        kind: &'static str,
        #[tabled(rename = "Suggestion")]
        suggestion: String,
    }

    println!("{}", style(stage).bold());
    if suggestions.is_empty() {
        println!("  No suggestions");
        return;
    }

    let rows: Vec<SuggestionRow> = suggestions
        .iter()
        .map(|s| SuggestionRow {
            kind: match s.kind {
                SuggestionKind::Variation => "variation",
                SuggestionKind::FollowUp => "follow-up",
            },
            suggestion: s.suggestion.clone(),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Modify::new(Columns::single(1)).with(Width::wrap(SUGGESTION_WIDTH)));
    println!("{table}");
}
