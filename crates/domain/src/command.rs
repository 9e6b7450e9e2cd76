//! Chat commands: parsing free text into a verb and its arguments.
//!
//! Parsing happens in two steps so that the caller can check privileges
//! between them: [`Invocation::parse`] only recognises the verb, and
//! [`Invocation::into_command`] then parses the verb-specific arguments.
//!
//! | Verb | Arguments |
//! |------|-----------|
//! | `start`, `help`, `commandlist` | none |
//! | `auth` | `<user id>` |
//! | `send` | `<topic> <value>` |
//! | `register` | `<name> <topic> <v1,v2,...>` |
//! | `unregister` | `<name>` |
//! | any other word | optional device value |

use std::num::ParseIntError;

use crate::id::UserId;
use crate::registration::parse_values;

/// Verbs handled by the bridge itself. Devices cannot be registered under
/// these names.
pub const BUILTIN_VERBS: &[&str] = &[
    "start",
    "help",
    "auth",
    "send",
    "register",
    "unregister",
    "commandlist",
];

/// The leading word of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    Start,
    Help,
    Auth,
    Send,
    Register,
    Unregister,
    CommandList,
    /// Anything else; possibly the name of a registered device.
    Other(String),
}

impl Verb {
    fn from_word(word: &str) -> Self {
        match word {
            "start" => Self::Start,
            "help" => Self::Help,
            "auth" => Self::Auth,
            "send" => Self::Send,
            "register" => Self::Register,
            "unregister" => Self::Unregister,
            "commandlist" => Self::CommandList,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether only the admin may use this verb.
    #[must_use]
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            Self::Auth | Self::Register | Self::Unregister | Self::CommandList
        )
    }
}

/// A recognised verb with its raw, not yet parsed, argument text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation<'a> {
    pub verb: Verb,
    /// Text after the first space. `None` when the message had no space.
    pub args: Option<&'a str>,
}

impl<'a> Invocation<'a> {
    /// Split `text` into verb and argument text.
    ///
    /// A leading `/` is dropped, as is a `@botname` suffix on the verb
    /// (Telegram appends one to commands sent in group chats).
    #[must_use]
    pub fn parse(text: &'a str) -> Self {
        let (head, args) = match text.split_once(' ') {
            Some((head, args)) => (head, Some(args)),
            None => (text, None),
        };
        let head = head.strip_prefix('/').unwrap_or(head);
        let word = head.split_once('@').map_or(head, |(word, _)| word);
        Self {
            verb: Verb::from_word(word),
            args,
        }
    }

    /// Parse the arguments for the recognised verb.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when the argument text does not match the
    /// verb's grammar.
    pub fn into_command(self) -> Result<Command, ParseError> {
        let args = self.args;
        match self.verb {
            Verb::Start => Ok(Command::Start),
            Verb::Help => Ok(Command::Help),
            Verb::CommandList => Ok(Command::CommandList),
            Verb::Auth => args
                .unwrap_or_default()
                .parse::<UserId>()
                .map(Command::Auth)
                .map_err(ParseError::InvalidId),
            Verb::Send => {
                let (topic, value) = args
                    .and_then(|args| args.split_once(' '))
                    .ok_or(ParseError::MissingValue)?;
                Ok(Command::Send {
                    topic: topic.to_string(),
                    value: value.to_string(),
                })
            }
            Verb::Register => {
                let (name, rest) = args
                    .and_then(|args| args.split_once(' '))
                    .ok_or(ParseError::MissingName)?;
                let (topic, values) = rest.split_once(' ').ok_or(ParseError::MissingTopic)?;
                Ok(Command::Register {
                    name: name.to_string(),
                    topic: topic.to_string(),
                    values: parse_values(values),
                })
            }
            Verb::Unregister => {
                let name = args.ok_or(ParseError::MissingName)?;
                Ok(Command::Unregister {
                    name: name.to_string(),
                })
            }
            Verb::Other(name) => Ok(Command::Device {
                name,
                value: args.map(str::to_string),
            }),
        }
    }
}

/// A fully parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Auth(UserId),
    Send {
        topic: String,
        value: String,
    },
    Register {
        name: String,
        topic: String,
        values: Vec<String>,
    },
    Unregister {
        name: String,
    },
    CommandList,
    /// A device verb, either querying its state or setting a value.
    Device {
        name: String,
        value: Option<String>,
    },
}

/// Malformed command arguments. Displays as the reply sent to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Error parsing ID! {0}")]
    InvalidId(#[source] ParseIntError),

    #[error("Error parsing your message.")]
    MissingValue,

    #[error("Error parsing name!")]
    MissingName,

    #[error("Error parsing topic!")]
    MissingTopic,
}
