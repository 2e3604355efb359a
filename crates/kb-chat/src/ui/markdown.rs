//! Markdown to styled terminal text

use console::Style;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

/// Render Markdown as ANSI-styled plain text
pub fn render(markdown: &str) -> String {
    let mut writer = StyledWriter::default();
    for event in Parser::new_ext(markdown, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH) {
        writer.event(event);
    }
    writer.out.trim_end().to_string()
}

#[derive(Default)]
struct StyledWriter {
    out: String,
    strong: usize,
    emphasis: usize,
    quote: usize,
    heading: bool,
    code_block: bool,
    link: Option<String>,
    /// Next number for ordered lists, `None` for bullets
    lists: Vec<Option<u64>>,
}

impl StyledWriter {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if self.code_block {
                    let style = Style::new().yellow();
                    for line in text.lines() {
                        self.out.push_str("    ");
                        self.out.push_str(&style.apply_to(line).to_string());
                        self.out.push('\n');
                    }
                } else {
                    let styled = self.style().apply_to(&*text).to_string();
                    self.out.push_str(&styled);
                }
            }
            Event::Code(code) => {
                let styled = Style::new().yellow().apply_to(&*code).to_string();
                self.out.push_str(&styled);
            }
            Event::SoftBreak => self.out.push(' '),
            Event::HardBreak => self.out.push('\n'),
            Event::Rule => {
                self.block_break();
                self.out.push_str(&"─".repeat(40));
                self.out.push('\n');
            }
            Event::TaskListMarker(done) => self.out.push_str(if done { "[x] " } else { "[ ] " }),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { .. } => {
                self.block_break();
                self.heading = true;
            }
            Tag::Paragraph => {
                if self.lists.is_empty() {
                    self.block_break();
                }
            }
            Tag::BlockQuote { .. } => {
                self.block_break();
                self.quote += 1;
            }
            Tag::CodeBlock(_) => {
                self.block_break();
                self.code_block = true;
            }
            Tag::List(first) => {
                if self.lists.is_empty() {
                    self.block_break();
                }
                self.lists.push(first);
            }
            Tag::Item => {
                self.line_break();
                let depth = self.lists.len().saturating_sub(1);
                self.out.push_str(&"  ".repeat(depth));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}. ", n);
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.out.push_str(&marker);
            }
            Tag::Emphasis => self.emphasis += 1,
            Tag::Strong => self.strong += 1,
            Tag::Link { dest_url, .. } => self.link = Some(dest_url.to_string()),
            Tag::TableRow | Tag::TableHead => self.line_break(),
            Tag::TableCell => self.out.push_str("| "),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading { .. } => {
                self.heading = false;
                self.out.push('\n');
            }
            TagEnd::Paragraph => {
                if self.lists.is_empty() {
                    self.line_break();
                }
            }
            TagEnd::BlockQuote { .. } => {
                self.quote = self.quote.saturating_sub(1);
                self.line_break();
            }
            TagEnd::CodeBlock => self.code_block = false,
            TagEnd::List { .. } => {
                self.lists.pop();
                self.line_break();
            }
            TagEnd::Item => self.line_break(),
            TagEnd::Emphasis => self.emphasis = self.emphasis.saturating_sub(1),
            TagEnd::Strong => self.strong = self.strong.saturating_sub(1),
            TagEnd::Link => {
                if let Some(url) = self.link.take() {
                    let styled = Style::new().dim().apply_to(format!(" ({})", url)).to_string();
                    self.out.push_str(&styled);
                }
            }
            TagEnd::TableCell => self.out.push(' '),
            TagEnd::Table => self.line_break(),
            _ => {}
        }
    }

    fn style(&self) -> Style {
        let mut style = Style::new();
        if self.heading {
            style = style.cyan().bold().underlined();
        }
        if self.strong > 0 {
            style = style.bold();
        }
        if self.emphasis > 0 {
            style = style.italic();
        }
        if self.quote > 0 {
            style = style.dim();
        }
        if self.link.is_some() {
            style = style.blue().underlined();
        }
        style
    }

    fn line_break(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    /// Start a new block separated by one blank line
    fn block_break(&mut self) {
        if self.out.is_empty() {
            return;
        }
        self.line_break();
        if !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(markdown: &str) -> String {
        console::strip_ansi_codes(&render(markdown)).to_string()
    }

    #[test]
    fn test_heading_and_paragraph() {
        assert_eq!(plain("# Title\n\nSome **bold** and *soft*\ntext."), "Title\n\nSome bold and soft text.");
    }

    #[test]
    fn test_lists() {
        assert_eq!(plain("- one\n- two"), "• one\n• two");
        assert_eq!(plain("1. first\n2. second"), "1. first\n2. second");
        assert_eq!(plain("- outer\n  - inner"), "• outer\n  • inner");
    }

    #[test]
    fn test_code() {
        assert_eq!(plain("Run `cargo`:\n\n```\nlet x = 1;\nlet y = 2;\n```"), "Run cargo:\n\n    let x = 1;\n    let y = 2;");
    }

    #[test]
    fn test_link_shows_target() {
        assert_eq!(plain("See [docs](https://docs.mistral.ai)."), "See docs (https://docs.mistral.ai).");
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(plain("The invoice total is 500 dollars."), "The invoice total is 500 dollars.");
    }
}
