//! Chat input commands

/// Shown for `/help`
pub const HELP_TEXT: &str = "Commands:\n  /new  - Start a new conversation (reloads the knowledge folder)\n  /help - Show this help\n  /exit - Exit the chat";

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Leave the chat loop
    Exit,
    /// Reload documents and clear history
    New,
    Help,
    /// Anything else: a question for the knowledge base
    Ask(String),
    /// Blank input; ignored
    Empty,
}

impl ChatCommand {
    /// Commands are matched case-insensitively after trimming
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.is_empty() {
            return Self::Empty;
        }

        match input.to_lowercase().as_str() {
            "/exit" => Self::Exit,
            "/new" => Self::New,
            "/help" => Self::Help,
            _ => Self::Ask(input.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(ChatCommand::parse("/exit"), ChatCommand::Exit);
        assert_eq!(ChatCommand::parse("  /NEW "), ChatCommand::New);
        assert_eq!(ChatCommand::parse("/Help"), ChatCommand::Help);
        assert_eq!(ChatCommand::parse(""), ChatCommand::Empty);
        assert_eq!(ChatCommand::parse(" \t"), ChatCommand::Empty);
        assert_eq!(
            ChatCommand::parse(" what is the invoice total? "),
            ChatCommand::Ask("what is the invoice total?".to_string())
        );
        assert_eq!(ChatCommand::parse("/unknown"), ChatCommand::Ask("/unknown".to_string()));
    }
}
