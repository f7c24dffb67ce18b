//! Interactive trigger commands
//!
//! The command loop is the inbound trigger: `read` delivers "begin reading"
//! and the selection is captured at that moment, not earlier.

pub const HELP: &str = "\
commands:
  read [text]    read the current selection aloud (or the given text)
  pause          pause playback
  resume         resume paused playback
  toggle         flip between pause and resume
  stop           stop reading and close the panel
  rate <0.5-2>   change playback speed (persisted)
  volume <0-1>   change volume
  voice <id>     switch voice
  voices         list available voices
  quit           exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Read(Option<String>),
    Pause,
    Resume,
    Toggle,
    Stop,
    Rate(f32),
    Volume(f32),
    Voice(String),
    Voices,
    Help,
    Quit,
}

pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head {
        "read" | "r" => Ok(Command::Read(if rest.is_empty() {
            None
        } else {
            Some(rest.to_string())
        })),
        "pause" => Ok(Command::Pause),
        "resume" => Ok(Command::Resume),
        "toggle" | "p" => Ok(Command::Toggle),
        "stop" | "s" => Ok(Command::Stop),
        "rate" => rest
            .parse()
            .map(Command::Rate)
            .map_err(|_| format!("not a rate: {rest:?} (try `rate 1.5`)")),
        "volume" | "vol" => rest
            .parse()
            .map(Command::Volume)
            .map_err(|_| format!("not a volume: {rest:?} (try `volume 0.8`)")),
        "voice" => {
            if rest.is_empty() {
                Err("usage: voice <id> (see `voices`)".to_string())
            } else {
                Ok(Command::Voice(rest.to_string()))
            }
        }
        "voices" => Ok(Command::Voices),
        "help" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command: {other} (try `help`)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_without_text_captures_the_selection() {
        assert_eq!(parse("read"), Ok(Command::Read(None)));
    }

    #[test]
    fn read_with_inline_text() {
        assert_eq!(
            parse("read The quick brown fox"),
            Ok(Command::Read(Some("The quick brown fox".to_string())))
        );
    }

    #[test]
    fn rate_parses_a_float() {
        assert_eq!(parse("rate 1.5"), Ok(Command::Rate(1.5)));
        assert!(parse("rate fast").is_err());
        assert!(parse("rate").is_err());
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(parse("p"), Ok(Command::Toggle));
        assert_eq!(parse("s"), Ok(Command::Stop));
        assert_eq!(parse("vol 0.5"), Ok(Command::Volume(0.5)));
        assert_eq!(parse("q"), Ok(Command::Quit));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(parse("  stop  "), Ok(Command::Stop));
    }

    #[test]
    fn unknown_commands_are_rejected() {
        assert!(parse("selfdestruct").is_err());
    }
}
