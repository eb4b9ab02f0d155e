//! The line-oriented control protocol.
//!
//! Everything on the wire is newline-delimited UTF-8 text. A handful of
//! reserved single-word lines — the control tokens — shift what the receiver
//! does with the next line; every other line is free text or a command line,
//! distinguished purely by session state.

// ----------------------------------------------------------------------------
// Control Tokens
// ----------------------------------------------------------------------------

/// Reserved line values that steer the peer instead of being displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlToken {
    /// The next line from the human is plain data, not a command.
    Input,
    /// The next line from the human is a command.
    InputCommand,
    /// The next line is an encrypted message; decrypt before display.
    Decrypt,
    /// Send your public key now.
    SendKey,
    /// The session is over.
    Quit,
}

impl ControlToken {
    pub fn as_line(&self) -> &'static str {
        match self {
            ControlToken::Input => "INPUT",
            ControlToken::InputCommand => "INPUTC",
            ControlToken::Decrypt => "DECRYPT",
            ControlToken::SendKey => "SENDKEY",
            ControlToken::Quit => "QUIT",
        }
    }

    pub fn parse(line: &str) -> Option<Self> {
        match line {
            "INPUT" => Some(ControlToken::Input),
            "INPUTC" => Some(ControlToken::InputCommand),
            "DECRYPT" => Some(ControlToken::Decrypt),
            "SENDKEY" => Some(ControlToken::SendKey),
            "QUIT" => Some(ControlToken::Quit),
            _ => None,
        }
    }
}

// ----------------------------------------------------------------------------
// Reply Texts
// ----------------------------------------------------------------------------

/// Server reply lines. The client string-matches [`REPLY_USERNAME_NOT_FOUND`]
/// during its send pre-check, so these are shared constants rather than ad
/// hoc literals on each side.
pub const REPLY_SYNTAX_ERROR: &str = "<Server> syntax error";
pub const REPLY_DELIVERY_FAILED: &str = "<Server> could not deliver the message";
pub const REPLY_NO_NEW_MESSAGES: &str = "<Server> no new messages";
pub const REPLY_USERNAME_NOT_FOUND: &str = "<Server> username not found";
pub const REPLY_COMMAND_NOT_FOUND: &str = "<Server> command not found";
pub const REPLY_HELP_UNSUPPORTED: &str = "command not supported by help";

pub const LOGIN_PROMPT: &str = "<Server> choose a username (no spaces):";
pub const QUIT_CONFIRM_PROMPT: &str = "are you sure? (y/n)";
pub const QUIT_AFFIRMATIVE: char = 'y';

/// Username no live session may claim; the server signs its replies with it.
pub const RESERVED_USERNAME: &str = "Server";

// ----------------------------------------------------------------------------
// Command Grammar
// ----------------------------------------------------------------------------

/// A parsed command line. The verb is case-insensitive; a line splits into
/// at most three whitespace-separated fields (verb, first argument, rest).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Send { receiver: String, body: String },
    Receive,
    GetKey { username: String },
    Help { topic: Option<String> },
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Known verb with the wrong number of fields.
    Syntax,
    /// The first token is not a verb we know.
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, CommandError> {
        let mut fields = line.splitn(3, ' ');
        let verb = fields.next().unwrap_or_default();
        let arg = fields.next();
        let rest = fields.next();

        match verb.to_ascii_lowercase().as_str() {
            "list" => Ok(Command::List),
            "receive" => Ok(Command::Receive),
            "quit" => Ok(Command::Quit),
            "help" => Ok(Command::Help {
                topic: arg.map(str::to_owned),
            }),
            "getkey" => match arg {
                Some(username) => Ok(Command::GetKey {
                    username: username.to_owned(),
                }),
                None => Err(CommandError::Syntax),
            },
            "send" => match (arg, rest) {
                (Some(receiver), Some(body)) => Ok(Command::Send {
                    receiver: receiver.to_owned(),
                    body: body.to_owned(),
                }),
                _ => Err(CommandError::Syntax),
            },
            _ => Err(CommandError::Unknown(verb.to_owned())),
        }
    }
}

// ----------------------------------------------------------------------------
// Help Texts
// ----------------------------------------------------------------------------

/// The static command summary, one entry per line.
pub const HELP_SUMMARY: &[&str] = &[
    "For more information on a specific command, type HELP command-name.",
    "LIST\tLists the users currently online",
    "SEND\tSends an encrypted message to the given user",
    "RECEIVE\tPrints the messages addressed to you",
    "GETKEY\tPrints the public key of the given user",
    "QUIT\tExits the program",
    "HELP\tProvides help for commands",
];

/// Per-verb help description, or `None` for verbs the help utility does not
/// know about.
pub fn help_for(verb: &str) -> Option<&'static str> {
    match verb {
        "list" => Some("Lists the users currently online\r\n\r\nLIST"),
        "send" => Some(
            "Sends an encrypted message to the given user\r\n\r\nSEND [receiver] [message]\r\n\r\n\treceiver - username of an online user\r\n\tmessage - text to send",
        ),
        "receive" => Some("Prints the messages addressed to you\r\n\r\nRECEIVE"),
        "getkey" => Some("Prints the public key of the given user\r\n\r\nGETKEY [username]"),
        "quit" => Some("Exits the program\r\n\r\nQUIT"),
        "help" => Some(
            "Provides help for commands\r\n\r\nHELP [command]\r\n\r\n\tcommand - shows help for that command",
        ),
        _ => None,
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_trip() {
        for token in [
            ControlToken::Input,
            ControlToken::InputCommand,
            ControlToken::Decrypt,
            ControlToken::SendKey,
            ControlToken::Quit,
        ] {
            assert_eq!(ControlToken::parse(token.as_line()), Some(token));
        }
    }

    #[test]
    fn free_text_is_not_a_token() {
        assert_eq!(ControlToken::parse("hello INPUT"), None);
        assert_eq!(ControlToken::parse("input"), None);
        assert_eq!(ControlToken::parse(""), None);
    }

    #[test]
    fn verbs_are_case_insensitive() {
        assert_eq!(Command::parse("LIST"), Ok(Command::List));
        assert_eq!(Command::parse("Receive"), Ok(Command::Receive));
    }

    #[test]
    fn send_requires_three_fields() {
        assert_eq!(
            Command::parse("send bob hello world"),
            Ok(Command::Send {
                receiver: "bob".into(),
                body: "hello world".into(),
            })
        );
        assert_eq!(Command::parse("send bob"), Err(CommandError::Syntax));
        assert_eq!(Command::parse("send"), Err(CommandError::Syntax));
    }

    #[test]
    fn send_body_keeps_embedded_spaces() {
        let parsed = Command::parse("send alice a b c d").unwrap();
        assert_eq!(
            parsed,
            Command::Send {
                receiver: "alice".into(),
                body: "a b c d".into(),
            }
        );
    }

    #[test]
    fn getkey_requires_an_argument() {
        assert_eq!(
            Command::parse("getkey bob"),
            Ok(Command::GetKey {
                username: "bob".into()
            })
        );
        assert_eq!(Command::parse("getkey"), Err(CommandError::Syntax));
    }

    #[test]
    fn help_topic_is_optional() {
        assert_eq!(Command::parse("help"), Ok(Command::Help { topic: None }));
        assert_eq!(
            Command::parse("help send"),
            Ok(Command::Help {
                topic: Some("send".into())
            })
        );
    }

    #[test]
    fn unknown_verbs_are_reported() {
        assert_eq!(
            Command::parse("frobnicate"),
            Err(CommandError::Unknown("frobnicate".into()))
        );
        // An empty line has an empty verb.
        assert_eq!(Command::parse(""), Err(CommandError::Unknown(String::new())));
    }

    #[test]
    fn help_table_covers_every_verb() {
        for verb in ["list", "send", "receive", "getkey", "quit", "help"] {
            assert!(help_for(verb).is_some());
        }
        assert!(help_for("frobnicate").is_none());
    }
}
