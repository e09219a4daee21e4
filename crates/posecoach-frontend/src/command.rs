use posecoach_bridge::{MessageToBackend, audio::RouteChangeReason};

/// A line typed on the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    /// Announce an upcoming spoken message.
    Speak,
    /// Simulate an OS route change notification.
    Route(RouteChangeReason),
    Config,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseCommandError {
    #[error("unknown command `{0}`, type `help` for the list")]
    Unknown(String),
    #[error("unknown route change reason `{0}`")]
    UnknownReason(String),
}

impl Command {
    /// Parses one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, ParseCommandError> {
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            return Ok(None);
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "start" => Self::Start,
            "stop" => Self::Stop,
            "speak" => Self::Speak,
            "route" => Self::Route(parse_reason(words.next())?),
            "config" => Self::Config,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(ParseCommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }

    /// The backend message this command sends, if any.
    pub fn to_message(&self) -> Option<MessageToBackend> {
        match self {
            Self::Start => Some(MessageToBackend::StartExerciseSession),
            Self::Stop => Some(MessageToBackend::StopExerciseSession),
            Self::Speak => Some(MessageToBackend::PrepareSpeech),
            Self::Route(reason) => Some(MessageToBackend::AudioRouteChanged(*reason)),
            Self::Config => Some(MessageToBackend::ConfigurationRequest),
            Self::Help | Self::Quit => None,
        }
    }
}

fn parse_reason(word: Option<&str>) -> Result<RouteChangeReason, ParseCommandError> {
    let Some(word) = word else {
        return Ok(RouteChangeReason::Unknown);
    };
    match word.to_ascii_lowercase().as_str() {
        "new" => Ok(RouteChangeReason::NewDeviceAvailable),
        "old" | "gone" => Ok(RouteChangeReason::OldDeviceUnavailable),
        "category" => Ok(RouteChangeReason::CategoryChange),
        "override" => Ok(RouteChangeReason::Override),
        other => Err(ParseCommandError::UnknownReason(other.to_string())),
    }
}

pub const HELP: &str = "\
commands:
  start              start an exercise session
  stop               stop the exercise session
  speak              prepare the audio route for a spoken message
  route [new|old|category|override]
                     report an audio route change
  config             print the configuration
  quit               stop the session and exit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_session_commands() {
        assert_eq!(Command::parse("start"), Ok(Some(Command::Start)));
        assert_eq!(Command::parse("  STOP  "), Ok(Some(Command::Stop)));
        assert_eq!(Command::parse(""), Ok(None));
        assert_eq!(Command::parse("exit"), Ok(Some(Command::Quit)));
    }

    #[test]
    fn route_reason_defaults_to_unknown() {
        assert_eq!(
            Command::parse("route"),
            Ok(Some(Command::Route(RouteChangeReason::Unknown)))
        );
        assert_eq!(
            Command::parse("route old"),
            Ok(Some(Command::Route(RouteChangeReason::OldDeviceUnavailable)))
        );
        assert_eq!(
            Command::parse("route sideways"),
            Err(ParseCommandError::UnknownReason("sideways".into()))
        );
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert_eq!(
            Command::parse("jump"),
            Err(ParseCommandError::Unknown("jump".into()))
        );
        assert!(Command::Quit.to_message().is_none());
    }
}
