use colored::*;
use jiff::SignedDuration;
use jiff::civil::DateTime;

use crate::models::task::{DeadlineStatus, Task, TaskType};

/// Get the terminal width, defaulting to 80 if unavailable
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

/// Get the appropriate status glyph for a task
pub fn get_status_glyph(task: &Task, now: DateTime) -> ColoredString {
    if task.finished {
        "✓".dimmed()
    } else if task.is_overdue_at(now) {
        "●".red()
    } else {
        "○".normal()
    }
}

/// Format a date-time for people (e.g., "Tue Jan 01, 2030 09:00 am")
pub fn humanize_datetime(datetime: DateTime) -> String {
    datetime.strftime("%a %b %d, %Y %I:%M %P").to_string()
}

/// Format a remaining duration (e.g., "2d 3h left", "overdue by 45m")
pub fn format_time_remaining(remaining: SignedDuration) -> String {
    let minutes = remaining.as_secs().unsigned_abs() / 60;
    let (days, hours, mins) = (minutes / (24 * 60), (minutes / 60) % 24, minutes % 60);

    let amount = if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    };

    if remaining.is_negative() {
        format!("overdue by {}", amount)
    } else {
        format!("{} left", amount)
    }
}

/// Deadline column text, colored by how close the deadline is
pub fn format_deadline(task: &Task, now: DateTime) -> ColoredString {
    let Some(deadline) = task.deadline else {
        return "no deadline".dimmed();
    };
    let remaining = task.time_remaining_at(now).unwrap_or(SignedDuration::ZERO);
    let text = format!(
        "{}  ·  {}",
        humanize_datetime(deadline),
        format_time_remaining(remaining)
    );

    match task.deadline_status_at(now) {
        DeadlineStatus::Finished | DeadlineStatus::NoDeadline => text.dimmed(),
        DeadlineStatus::Overdue => text.red(),
        DeadlineStatus::DueToday => text.yellow(),
        DeadlineStatus::Upcoming => text.green(),
    }
}

/// One line per task: id, glyph, title and a right-aligned deadline or tags
pub fn task_line(task: &Task, now: DateTime) -> String {
    let terminal_width = get_terminal_width();

    let id_str = format!("{:>3}", task.id);
    let glyph = get_status_glyph(task, now);
    let left_section = format!("  {}  {}  {}", id_str, glyph, task.title);

    let styled_left = if task.finished {
        left_section.dimmed()
    } else {
        left_section.bold()
    };

    let right_plain = if let Some(deadline) = task.deadline {
        humanize_datetime(deadline)
    } else {
        task.tags
            .iter()
            .map(|t| format!("#{}", t))
            .collect::<Vec<_>>()
            .join(" ")
    };

    if right_plain.is_empty() {
        return styled_left.to_string();
    }

    let left_visible_len = format!("  {}  {}  {}", id_str, " ", task.title)
        .chars()
        .count();
    let right_visible_len = right_plain.chars().count();
    let total_content = left_visible_len + right_visible_len;

    if total_content + 4 < terminal_width {
        let padding = terminal_width - total_content - 2;
        let right = if task.deadline.is_some() && task.is_overdue_at(now) {
            right_plain.red()
        } else {
            right_plain.dimmed()
        };
        format!("{}{}{}", styled_left, " ".repeat(padding), right)
    } else {
        // Not enough space for right alignment
        styled_left.to_string()
    }
}

/// View header with title and count (e.g., "Daily (2 tasks)")
pub fn view_header(title: &str, count: usize) -> String {
    let task_word = if count == 1 { "task" } else { "tasks" };
    format!("\n  {} ({} {})\n", title.cyan().bold(), count, task_word)
}

/// Every field of one task, one per line
pub fn task_details(task: &Task, task_type: TaskType, now: DateTime) -> String {
    let tags = if task.tags.is_empty() {
        "none".dimmed().to_string()
    } else {
        task.tags.join(", ")
    };
    let description = if task.description.is_empty() {
        "none".dimmed().to_string()
    } else {
        task.description.clone()
    };

    let mut lines = vec![
        format!("\n  {} #{}", task.title.bold(), task.id),
        format!("    {} {}", "Type:".dimmed(), task_type),
        format!("    {} {}", "Description:".dimmed(), description),
        format!("    {} {}", "Tags:".dimmed(), tags),
        format!(
            "    {} {}",
            "Created:".dimmed(),
            humanize_datetime(task.created_at)
        ),
        format!("    {} {}", "Deadline:".dimmed(), format_deadline(task, now)),
    ];

    match task.finished_at {
        Some(finished_at) => lines.push(format!(
            "    {} {}",
            "Finished:".dimmed(),
            humanize_datetime(finished_at).green()
        )),
        None => lines.push(format!("    {} {}", "Finished:".dimmed(), "no")),
    }

    lines.join("\n")
}

/// Tag vocabulary with how many tasks carry each tag
pub fn tag_lines<'a>(vocabulary: &[String], tasks: impl Iterator<Item = &'a Task>) -> Vec<String> {
    let tasks: Vec<&Task> = tasks.collect();

    vocabulary
        .iter()
        .map(|tag| {
            let count = tasks.iter().filter(|t| t.tags.contains(tag)).count();
            format!(
                "  {} {} {}",
                "•".green(),
                tag.bold(),
                format!("({} {})", count, if count == 1 { "task" } else { "tasks" }).dimmed()
            )
        })
        .collect()
}
