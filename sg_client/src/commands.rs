use shoot_gate::{Usd, messages::SpecialChoice};
use std::fmt;

/// A command typed by the user.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UserCommand {
    /// Join the table. Without a name the configured default is used; a
    /// missing or zero ante falls back to the default ante.
    Join {
        name: Option<String>,
        ante: Option<Usd>,
    },
    /// Deal a new round.
    Deal,
    /// Shoot the gate, optionally setting the bet first.
    Shoot(Option<Usd>),
    /// Pass on this round.
    Pass,
    /// Call high or low on a pair, optionally setting the bet first.
    Call(SpecialChoice, Option<Usd>),
    /// Move the bet input.
    Bet(Usd),
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Invalid bet amount (not a valid number).
    InvalidAmount(String),
    /// Unrecognized command.
    UnrecognizedCommand(String),
    /// Command needs an argument it didn't get.
    MissingArgument(&'static str),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAmount(value) => write!(
                f,
                "Invalid amount '{}'. Must be a positive number (e.g., 'shoot 10')",
                value
            ),
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{}'. Press Tab (or type 'help') to see available commands",
                cmd
            ),
            Self::MissingArgument(usage) => write!(f, "Missing argument. Usage: '{}'", usage),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse a command string into a UserCommand.
///
/// # Examples
///
/// ```
/// use sg_client::commands::{UserCommand, parse_command};
/// use shoot_gate::messages::SpecialChoice;
///
/// assert_eq!(parse_command("pass"), Ok(UserCommand::Pass));
/// assert_eq!(parse_command("shoot 25"), Ok(UserCommand::Shoot(Some(25))));
/// assert_eq!(
///     parse_command("high"),
///     Ok(UserCommand::Call(SpecialChoice::High, None))
/// );
/// ```
pub fn parse_command(input: &str) -> Result<UserCommand, ParseError> {
    let trimmed = input.trim();

    // Try single-word commands first
    match trimmed {
        "deal" | "start" => return Ok(UserCommand::Deal),
        "pass" => return Ok(UserCommand::Pass),
        "join" => {
            return Ok(UserCommand::Join {
                name: None,
                ante: None,
            });
        }
        _ => {}
    }

    // Parse multi-word commands
    let parts: Vec<&str> = trimmed.split_ascii_whitespace().collect();
    match parts.first() {
        Some(&"join") => Ok(parse_join_command(&parts)),
        Some(&"shoot") => Ok(UserCommand::Shoot(parse_optional_amount(&parts)?)),
        Some(&"high") => Ok(UserCommand::Call(
            SpecialChoice::High,
            parse_optional_amount(&parts)?,
        )),
        Some(&"low") => Ok(UserCommand::Call(
            SpecialChoice::Low,
            parse_optional_amount(&parts)?,
        )),
        Some(&"bet") => match parse_optional_amount(&parts)? {
            Some(amount) => Ok(UserCommand::Bet(amount)),
            None => Err(ParseError::MissingArgument("bet AMOUNT")),
        },
        _ => Err(ParseError::UnrecognizedCommand(trimmed.to_string())),
    }
}

/// Parse a join command: "join NAME [ANTE]". Names may contain spaces; a
/// trailing integer is taken as the ante, and one that isn't a positive
/// amount falls back to the default.
fn parse_join_command(parts: &[&str]) -> UserCommand {
    let args = &parts[1..];
    let (name_parts, ante) = match args.split_last() {
        Some((last, rest)) if !rest.is_empty() && looks_like_integer(last) => {
            (rest, last.parse::<Usd>().ok())
        }
        _ => (args, None),
    };

    let name = name_parts.join(" ");
    UserCommand::Join {
        name: (!name.is_empty()).then_some(name),
        ante: ante.filter(|ante| *ante > 0),
    }
}

/// `-?[0-9]+`
fn looks_like_integer(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Parse the optional amount after a command word.
fn parse_optional_amount(parts: &[&str]) -> Result<Option<Usd>, ParseError> {
    parts
        .get(1)
        .map(|value| {
            value
                .parse::<Usd>()
                .map_err(|_| ParseError::InvalidAmount(value.to_string()))
        })
        .transpose()
}
