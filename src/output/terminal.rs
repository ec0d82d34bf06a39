use chrono;
use colored::Colorize;
use console::Style;
use std::io::{stdout, Write};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Terminal UI utilities for Sibyl
pub struct OracleColors;

impl OracleColors {
    pub fn primary() -> Style {
        Style::new().magenta().bold()
    }

    pub fn error() -> Style {
        Style::new().red().bold()
    }

    pub fn subtle() -> Style {
        Style::new().dim()
    }
}

/// Styled section header
pub fn section_header(title: &str) -> String {
    let prefix = "╸⟪ ";
    let suffix = " ⟫╺";

    format!(
        "\n{}\n",
        OracleColors::primary().apply_to(format!("{}{}{}", prefix, title, suffix))
    )
}

/// Styled divider line
pub fn divider() -> String {
    let divider_pattern = "═━═━═━═━═━═━═━═━═━═━═━═━═━═━═━═━═━═━═━═━═━═━═━═━═━═━═━";

    OracleColors::subtle()
        .apply_to(divider_pattern)
        .to_string()
}

/// Display a colorful error panel with a title and message
pub fn error_panel(title: &str, message: &str, details: Option<&str>) {
    let panel_width = 80;
    let error_style = OracleColors::error();
    let separator = "═".repeat(panel_width);

    let print_wrapped = |text: &str| {
        let words = text.split_whitespace().collect::<Vec<_>>();
        let mut line = String::new();

        for word in words {
            if line.len() + word.len() + 1 > panel_width - 4 {
                let padding = " ".repeat(panel_width.saturating_sub(line.len() + 4));
                println!(
                    "{}",
                    error_style.apply_to(format!("║  {}{}  ║", line, padding))
                );
                line = word.to_string();
            } else {
                if !line.is_empty() {
                    line.push(' ');
                }
                line.push_str(word);
            }
        }

        if !line.is_empty() {
            let padding = " ".repeat(panel_width.saturating_sub(line.len() + 4));
            println!(
                "{}",
                error_style.apply_to(format!("║  {}{}  ║", line, padding))
            );
        }
    };

    println!("\n{}", error_style.apply_to(format!("╔{}╗", separator)));

    // Title centered
    let title = format!(" {} ", title);
    let padding = (panel_width - title.len()) / 2;
    let title_line =
        " ".repeat(padding) + &title + &" ".repeat(panel_width - padding - title.len());
    println!("{}", error_style.apply_to(format!("║{}║", title_line)));

    println!("{}", error_style.apply_to(format!("╠{}╣", separator)));
    print_wrapped(message);

    if let Some(details) = details {
        println!("{}", error_style.apply_to(format!("╠{}╣", separator)));
        print_wrapped(details);
    }

    println!("{}", error_style.apply_to(format!("╚{}╝", separator)));
}

/// Spinner status enum
#[derive(Clone)]
enum SpinnerStatus {
    Active,
    Success(String),
    Warning(String),
    Error(String),
}

impl SpinnerStatus {
    /// One rendered display line for this status
    fn line(&self, label: &str, frame: &str) -> String {
        match self {
            SpinnerStatus::Active => format!("{} {}", frame.bright_cyan(), label),
            SpinnerStatus::Success(details) => {
                format!("{} {} {}", "✓".bright_green(), label, details.bright_green())
            }
            SpinnerStatus::Warning(details) => {
                format!("{} {} {}", "⚠".yellow(), label, details.yellow())
            }
            SpinnerStatus::Error(details) => {
                format!("{} {} {}", "✗".bright_red(), label, details.bright_red())
            }
        }
    }
}

/// Erase the previous block of status lines and draw the current one.
///
/// Returns the number of lines drawn so the next call knows how far
/// back to erase.
fn redraw(states: &[(String, SpinnerStatus)], frame: &str, erase_lines: usize) -> usize {
    for _ in 0..erase_lines {
        print!("\x1B[1A\x1B[2K");
    }
    for (label, status) in states {
        println!("{}", status.line(label, frame));
    }
    stdout().flush().unwrap_or(());
    states.len()
}

/// Status display with a clean, consistent theme
pub struct ScryingDisplay {
    spinner_states: Arc<Mutex<Vec<(String, SpinnerStatus)>>>,
    render_thread: Option<thread::JoinHandle<()>>,
    running: Arc<Mutex<bool>>,
    issues_count: usize,
}

impl Default for ScryingDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl ScryingDisplay {
    /// Create a new status display
    pub fn new() -> Self {
        // Clean, elegant header
        let now = chrono::Local::now();
        println!(
            "{} {} {}",
            "sibyl".bright_magenta(),
            now.format("%H:%M:%S").to_string().bright_blue(),
            "divination initialized".bright_cyan()
        );
        println!("{}", "Consulting the oracle about your code...".bright_white());

        // Add a blank line before spinners start
        println!();

        // Create shared state
        let spinner_states = Arc::new(Mutex::new(Vec::new()));
        let running = Arc::new(Mutex::new(true));

        // Clone for the render thread
        let spinner_states_clone = Arc::clone(&spinner_states);
        let running_clone = Arc::clone(&running);

        // Start the render thread
        let render_thread = thread::spawn(move || {
            let frames = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
            let mut frame_index = 0;
            let mut drawn = 0;

            while *running_clone.lock().unwrap() {
                let states = spinner_states_clone.lock().unwrap().clone();
                if states.is_empty() {
                    thread::sleep(Duration::from_millis(100));
                    continue;
                }

                drawn = redraw(&states, frames[frame_index], drawn);
                frame_index = (frame_index + 1) % frames.len();
                thread::sleep(Duration::from_millis(80));
            }

            // Final pass: anything still spinning reads as completed
            let mut states = spinner_states_clone.lock().unwrap().clone();
            for (_, status) in &mut states {
                if matches!(status, SpinnerStatus::Active) {
                    *status = SpinnerStatus::Success("completed".to_string());
                }
            }
            redraw(&states, "", drawn);
        });

        Self {
            spinner_states,
            render_thread: Some(render_thread),
            running,
            issues_count: 0,
        }
    }

    /// Add an analysis status to the display
    pub fn add_analysis_status(&mut self, analysis_type: &str, detail: &str) -> usize {
        let status_message = format!(
            "{} {}",
            analysis_type.bright_magenta(),
            format!("({})", detail).bright_blue()
        );

        // Add to spinner states
        let mut states = self.spinner_states.lock().unwrap();
        let index = states.len();
        states.push((status_message, SpinnerStatus::Active));

        index
    }

    /// Finish a specific analysis with a result message
    pub fn finish_spinner(&mut self, index: usize, message: String) {
        let status = if message.contains("failed") || message.contains("error") {
            SpinnerStatus::Error("「analysis failed」".to_string())
        } else if message.contains("no issues") {
            SpinnerStatus::Success("「no issues found」".to_string())
        } else if message.contains("issue") {
            let details = message
                .split_whitespace()
                .find(|word| word.parse::<usize>().is_ok())
                .map(|count| format!("「{} issues found」", count))
                .unwrap_or_else(|| "「issues found」".to_string());
            SpinnerStatus::Warning(details)
        } else {
            SpinnerStatus::Success("「completed」".to_string())
        };

        let mut states = self.spinner_states.lock().unwrap();
        if let Some(slot) = states.get_mut(index) {
            slot.1 = status;
            drop(states);
            // Brief pause so the status change registers visually
            thread::sleep(Duration::from_millis(300));
        }
    }

    /// Finish all analyses and show the footer
    pub fn finish(&mut self, total_issues: usize) {
        self.issues_count = total_issues;

        // Signal the render thread to stop
        if let Ok(mut running) = self.running.lock() {
            *running = false;
        }

        // Wait for the render thread to finish
        if let Some(handle) = self.render_thread.take() {
            let _ = handle.join();
        }

        // Display elegant footer
        let now = chrono::Local::now();
        println!(
            "\n{} {} {}",
            "sibyl".bright_magenta(),
            now.format("%H:%M:%S").to_string().bright_blue(),
            "divination complete".bright_cyan()
        );
    }
}

impl Drop for ScryingDisplay {
    fn drop(&mut self) {
        // Signal the render thread to stop
        if let Ok(mut running) = self.running.lock() {
            *running = false;
        }

        // Wait for the render thread to finish
        if let Some(handle) = self.render_thread.take() {
            let _ = handle.join();
        }
    }
}
