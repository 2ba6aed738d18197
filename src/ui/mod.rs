//! Terminal output for the command-line interface.
//!
//! Colored section headers, paper cards, the insight block and a spinner for
//! long-running stages. Color can be switched off globally with
//! [`set_color_enabled`] for piped or `--output plain` runs.

use owo_colors::{OwoColorize, Style};
use std::io::IsTerminal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use unicode_width::UnicodeWidthChar;

use crate::models::{PaperEntry, PipelineReport};

static COLOR_ENABLED: AtomicBool = AtomicBool::new(true);

/// Widest line the card layout will use, even on very wide terminals.
const MAX_CONTENT_WIDTH: usize = 100;

/// Get the current terminal width.
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(100)
}

/// Check if stdout is a terminal.
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Enable or disable ANSI styling for everything printed by this module.
pub fn set_color_enabled(enabled: bool) {
    COLOR_ENABLED.store(enabled, Ordering::Relaxed);
}

fn style(style: Style) -> Style {
    if COLOR_ENABLED.load(Ordering::Relaxed) {
        style
    } else {
        Style::new()
    }
}

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
}

/// Status icons for different operations.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Error => "✗",
        Status::Warning => "⚠",
    }
}

fn status_style(status: Status) -> Style {
    match status {
        Status::Success => Style::new().green().bold(),
        Status::Error => Style::new().red().bold(),
        Status::Warning => Style::new().yellow().bold(),
    }
}

/// Print a styled status message to stdout.
pub fn print_status(status: Status, msg: &str) {
    println!("{} {}", status_icon(status).style(style(status_style(status))), msg);
}

/// Print a styled status message to stderr.
pub fn eprint_status(status: Status, msg: &str) {
    eprintln!("{} {}", status_icon(status).style(style(status_style(status))), msg);
}

/// Welcome banner for the application.
pub fn print_banner() {
    println!();
    println!(
        "{}",
        format!("📚 Paper Insight v{}", crate::VERSION).style(style(Style::new().bold().cyan()))
    );
    println!(
        "{}",
        "   Search arXiv, summarize abstracts and synthesize the big picture"
            .style(style(Style::new().dimmed()))
    );
}

/// Print a section header.
pub fn print_section(title: &str) {
    println!();
    println!(
        "{}",
        format!("━━━ {} ━━━", title).style(style(Style::new().bold().cyan()))
    );
}

fn content_width() -> usize {
    terminal_width().clamp(40, MAX_CONTENT_WIDTH)
}

/// Print one search result with its summary.
pub fn print_paper(index: usize, entry: &PaperEntry) {
    println!();
    for line in render_paper(index, entry, content_width()) {
        println!("{}", line);
    }
}

/// Lines of a paper card. Placeholders show their title and the summary text.
fn render_paper(index: usize, entry: &PaperEntry, width: usize) -> Vec<String> {
    let record = &entry.record;
    let body_width = width.saturating_sub(3);
    let mut lines = Vec::new();

    if record.is_placeholder() {
        lines.push(format!(
            "{} {}",
            status_icon(Status::Warning).style(style(status_style(Status::Warning))),
            record.title.style(style(Style::new().yellow().bold()))
        ));
    } else {
        lines.push(format!(
            "{} {}",
            format!("{}.", index + 1).style(style(Style::new().dimmed())),
            truncate_with_ellipsis(&record.title, width.saturating_sub(4))
                .style(style(Style::new().blue().bold()))
        ));

        let mut meta = Vec::new();
        if !record.authors.is_empty() {
            meta.push(truncate_with_ellipsis(&record.author_line(), 60));
        }
        if let Some(year) = record.published.as_deref().and_then(|d| d.get(..4)) {
            meta.push(year.to_string());
        }
        if !meta.is_empty() {
            lines.push(format!("   {}", meta.join(" · ").style(style(Style::new().green()))));
        }
        if !record.url.is_empty() {
            lines.push(format!("   {}", record.url.style(style(Style::new().underline()))));
        }
    }

    lines.extend(
        wrap_text(&entry.summary, body_width)
            .into_iter()
            .map(|line| format!("   {}", line)),
    );
    lines
}

/// Print the synthesized insight.
pub fn print_insight(insight: &str) {
    print_section("Insight");
    for line in wrap_text(insight, content_width()) {
        println!("{}", line);
    }
}

/// Print a whole pipeline report: papers first, then the insight.
pub fn print_report(report: &PipelineReport) {
    print_section(&format!("Papers on \"{}\"", report.query));
    for (index, entry) in report.papers.iter().enumerate() {
        print_paper(index, entry);
    }
    print_insight(&report.insight);
    println!();
}

/// Display width of `text` in terminal columns.
pub fn display_width(text: &str) -> usize {
    text.chars().map(|c| c.width().unwrap_or(1)).sum()
}

/// Greedily wrap `text` into lines no wider than `width` columns.
///
/// Words wider than `width` get a line of their own. Whitespace runs collapse.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_width = 0;

    for word in text.split_whitespace() {
        let word_width = display_width(word);
        if !line.is_empty() && line_width + 1 + word_width > width {
            lines.push(std::mem::take(&mut line));
            line_width = 0;
        }
        if !line.is_empty() {
            line.push(' ');
            line_width += 1;
        }
        line.push_str(word);
        line_width += word_width;
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Truncate text to fit within the specified width using unicode-aware truncation.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width <= 3 {
        return "...".to_string();
    }

    if display_width(text) <= max_width {
        return text.to_string();
    }

    let mut current_width = 0;
    let mut truncated = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(1);
        if current_width + w > max_width - 3 {
            break;
        }
        current_width += w;
        truncated.push(c);
    }

    if truncated.is_empty() {
        return "...".to_string();
    }
    format!("{}...", truncated)
}

fn spinner_style(template: &str, tick_chars: &str) -> indicatif::ProgressStyle {
    indicatif::ProgressStyle::with_template(template)
        .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner())
        .tick_chars(tick_chars)
}

/// A loading spinner for the pipeline stages.
///
/// Hidden when stderr is not a terminal so piped output stays clean.
pub struct Spinner {
    pb: indicatif::ProgressBar,
}

impl Spinner {
    /// Create a new spinner with the given message.
    pub fn new(msg: &str) -> Self {
        let pb = if std::io::stderr().is_terminal() {
            indicatif::ProgressBar::new_spinner()
        } else {
            indicatif::ProgressBar::hidden()
        };
        pb.set_style(spinner_style("{spinner:.cyan} {msg}", "⠁⠂⠄⡀⢀⠠⠐⠈ "));
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    /// A spinner that never draws.
    pub fn hidden() -> Self {
        Self {
            pb: indicatif::ProgressBar::hidden(),
        }
    }

    /// Set the message.
    pub fn set_message(&self, msg: impl Into<String>) {
        self.pb.set_message(msg.into());
    }

    /// Finish with success message.
    pub fn finish_with_success(&self, msg: &str) {
        self.pb.set_style(spinner_style("{spinner:.green} {msg}", "✓✓"));
        self.pb.finish_with_message(msg.to_string());
    }

    /// Finish with a warning message.
    pub fn finish_with_warning(&self, msg: &str) {
        self.pb.set_style(spinner_style("{spinner:.yellow} {msg}", "⚠⚠"));
        self.pb.finish_with_message(msg.to_string());
    }

    /// Remove the spinner from the terminal.
    pub fn finish_and_clear(&self) {
        self.pb.finish_and_clear();
    }
}
