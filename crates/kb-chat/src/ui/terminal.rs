//! `console`-backed terminal UI with panels and a typing spinner

use console::{measure_text_width, pad_str, Alignment, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{BufRead, Write};
use std::time::Duration;

use crate::error::Result;

use super::{markdown, ChatConsole, Notice, Renderer};

/// Title of assistant reply panels
pub const ASSISTANT_TITLE: &str = "Custom GPT";

const MAX_WIDTH: usize = 100;
const MIN_WIDTH: usize = 40;

/// Interactive terminal front end
pub struct TerminalUi {
    term: Term,
    spinner: Option<ProgressBar>,
    received: usize,
}

impl TerminalUi {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
            spinner: None,
            received: 0,
        }
    }

    fn width(&self) -> usize {
        let (_, cols) = self.term.size();
        (cols as usize).clamp(MIN_WIDTH, MAX_WIDTH)
    }

    fn write(&self, text: &str) {
        if let Err(e) = self.term.write_line(text) {
            tracing::debug!("terminal write failed: {}", e);
        }
    }

    pub fn banner(&self) {
        let width = self.width();
        let title = Style::new().cyan().bold();
        self.write(&pad_str(&title.apply_to("CUSTOM GPT CHATBOT").to_string(), width, Alignment::Center, None));
        self.write(&pad_str(
            &title.apply_to("With Knowledge Base Integration").to_string(),
            width,
            Alignment::Center,
            None,
        ));
        self.write(&Style::new().green().apply_to("─".repeat(width)).to_string());
        self.write("");
    }

    pub fn main_menu(&self) {
        let key = Style::new().yellow().bold();
        let body = [
            "Start Chat with Custom GPT",
            "Configure API Key",
            "About",
            "Exit",
        ]
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{} {}", key.apply_to(format!("[{}]", i + 1)), item))
        .collect::<Vec<_>>()
        .join("\n");

        self.write(&self.panel("Main Menu", &body, Style::new().cyan()));
    }

    /// One styled status line, no panel
    pub fn status(&self, notice: Notice, text: &str) {
        self.write(&notice_style(notice).apply_to(text).to_string());
    }

    /// Read a line without echo
    pub fn prompt_secret(&self, label: &str) -> Result<String> {
        self.term.write_str(&prompt_label(label))?;
        Ok(self.term.read_secure_line()?)
    }

    /// Wait for Enter
    pub fn pause(&mut self) -> Result<()> {
        self.read_input("Press Enter to return")?;
        Ok(())
    }

    /// Box `body` under a coloured title
    pub fn panel(&self, title: &str, body: &str, color: Style) -> String {
        let width = self.width();
        let inner = width - 4;
        let title_text = format!(" {} ", title);
        let fill = width.saturating_sub(3 + measure_text_width(&title_text));

        let mut out = format!(
            "{}{}{}\n",
            color.apply_to("╭─"),
            color.clone().bold().apply_to(&title_text),
            color.apply_to(format!("{}╮", "─".repeat(fill)))
        );

        let lines: Vec<&str> = if body.is_empty() { vec![""] } else { body.lines().collect() };
        for line in lines {
            for wrapped in wrap(line, inner) {
                let pad = inner.saturating_sub(measure_text_width(&wrapped));
                out.push_str(&format!(
                    "{} {}{} {}\n",
                    color.apply_to("│"),
                    wrapped,
                    " ".repeat(pad),
                    color.apply_to("│")
                ));
            }
        }

        out.push_str(&color.apply_to(format!("╰{}╯", "─".repeat(width - 2))).to_string());
        out
    }
}

impl Default for TerminalUi {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for TerminalUi {
    fn message(&mut self, notice: Notice, title: &str, body: &str) {
        self.write(&self.panel(title, body, notice_style(notice)));
    }

    fn begin_reply(&mut self) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message(format!("{} is typing...", ASSISTANT_TITLE));

        self.received = 0;
        self.spinner = Some(spinner);
    }

    fn reply_fragment(&mut self, fragment: &str) {
        self.received += fragment.chars().count();
        if let Some(spinner) = &self.spinner {
            spinner.set_message(format!("{} is typing... {} chars", ASSISTANT_TITLE, self.received));
        }
    }

    fn end_reply(&mut self, reply: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
        if !reply.trim().is_empty() {
            let body = markdown::render(reply.trim());
            self.write(&self.panel(ASSISTANT_TITLE, &body, Style::new().cyan()));
        }
    }
}

impl ChatConsole for TerminalUi {
    fn read_input(&mut self, label: &str) -> Result<Option<String>> {
        self.term.write_str(&prompt_label(label))?;

        if self.term.is_term() {
            return Ok(Some(self.term.read_line()?));
        }

        // piped input: distinguish end of input from an empty line
        std::io::stdout().flush()?;
        let mut line = String::new();
        if std::io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn clear(&mut self) {
        if let Err(e) = self.term.clear_screen() {
            tracing::debug!("clear screen failed: {}", e);
        }
    }
}

fn notice_style(notice: Notice) -> Style {
    match notice {
        Notice::Info => Style::new().cyan(),
        Notice::Success => Style::new().green(),
        Notice::Warning => Style::new().yellow(),
        Notice::Error => Style::new().red(),
        Notice::System => Style::new().magenta(),
    }
}

fn prompt_label(label: &str) -> String {
    format!(
        "{} {} ",
        Style::new().yellow().bold().apply_to("=>"),
        Style::new().white().bold().apply_to(format!("{}:", label))
    )
}

/// Greedy word wrap by display width; keeps the line's leading indent
fn wrap(line: &str, width: usize) -> Vec<String> {
    if measure_text_width(line) <= width {
        return vec![line.to_string()];
    }

    let indent: String = line.chars().take_while(|c| *c == ' ').collect();
    let mut lines = Vec::new();
    let mut current = indent.clone();

    for word in line.split_whitespace() {
        let used = measure_text_width(&current);
        if used > indent.len() && used + 1 + measure_text_width(word) > width {
            lines.push(std::mem::replace(&mut current, indent.clone()));
        }
        if measure_text_width(&current) > indent.len() {
            current.push(' ');
        }
        current.push_str(word);
    }
    lines.push(current);
    lines
}
