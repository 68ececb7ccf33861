//! User commands

// Imports
use {
	crate::panner::Speed,
	anyhow::Context,
	core::{fmt, str::FromStr},
	pano_util::Size,
	tokio::io::{self, AsyncBufReadExt, BufReader},
};

/// User command
#[derive(PartialEq, Clone, Debug)]
pub enum Command {
	/// Switch to another source
	Source(String),

	/// Change the pan speed
	Speed(SpeedCommand),

	/// Resize the viewport
	Resize(Size),

	/// Reload now
	Reload,

	/// Print the status
	Status,

	/// Quit
	Quit,
}

/// Speed command
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum SpeedCommand {
	/// Set a speed
	Set(Speed),

	/// Fast-forward
	FastForward,
}

impl FromStr for Command {
	type Err = CommandParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let mut words = s.split_whitespace();
		let command = words.next().ok_or(CommandParseError::Empty)?;
		let arg = words.next();
		if let Some(extra) = words.next() {
			return Err(CommandParseError::ExtraArgument {
				command: command.to_owned(),
				arg:     extra.to_owned(),
			});
		}

		let missing = || CommandParseError::MissingArgument {
			command: command.to_owned(),
		};
		let no_arg = |cmd: Self| match arg {
			Some(arg) => Err(CommandParseError::ExtraArgument {
				command: command.to_owned(),
				arg:     arg.to_owned(),
			}),
			None => Ok(cmd),
		};

		match command {
			"source" => arg.map(|name| Self::Source(name.to_owned())).ok_or_else(missing),
			"speed" => {
				let arg = arg.ok_or_else(missing)?;
				let speed = match arg {
					"pause" => SpeedCommand::Set(Speed::PAUSED),
					"ff" => SpeedCommand::FastForward,
					_ => arg
						.parse::<f64>()
						.ok()
						.and_then(Speed::new)
						.map(SpeedCommand::Set)
						.ok_or_else(|| CommandParseError::InvalidSpeed(arg.to_owned()))?,
				};
				Ok(Self::Speed(speed))
			},
			"resize" => {
				let arg = arg.ok_or_else(missing)?;
				let size = arg.parse::<Size>().map_err(|err| CommandParseError::InvalidSize {
					size: arg.to_owned(),
					err,
				})?;
				Ok(Self::Resize(size))
			},
			"reload" => no_arg(Self::Reload),
			"status" => no_arg(Self::Status),
			"quit" | "exit" => no_arg(Self::Quit),
			_ => Err(CommandParseError::Unknown(command.to_owned())),
		}
	}
}

impl fmt::Display for Command {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Source(name) => write!(f, "source {name}"),
			Self::Speed(SpeedCommand::Set(speed)) => write!(f, "speed {}", speed.multiplier()),
			Self::Speed(SpeedCommand::FastForward) => write!(f, "speed ff"),
			Self::Resize(size) => write!(f, "resize {size}"),
			Self::Reload => f.pad("reload"),
			Self::Status => f.pad("status"),
			Self::Quit => f.pad("quit"),
		}
	}
}

/// Command parse error
#[derive(Debug, thiserror::Error)]
pub enum CommandParseError {
	/// Empty line
	#[error("Empty command")]
	Empty,

	/// Unknown command
	#[error("Unknown command {0:?}, expected one of `source`, `speed`, `resize`, `reload`, `status` or `quit`")]
	Unknown(String),

	/// Missing argument
	#[error("Command {command:?} requires an argument")]
	MissingArgument { command: String },

	/// Extra argument
	#[error("Command {command:?} doesn't take argument {arg:?}")]
	ExtraArgument { command: String, arg: String },

	/// Invalid speed
	#[error("Invalid speed {0:?}, expected `pause`, a non-negative number or `ff`")]
	InvalidSpeed(String),

	/// Invalid size
	#[error("Invalid size {size:?}")]
	InvalidSize {
		size: String,
		#[source]
		err:  anyhow::Error,
	},
}

/// Reads commands from stdin, one per line, and sends them to `commands_tx`.
///
/// Returns once stdin is closed or the receiver is dropped.
pub async fn read_stdin(commands_tx: async_channel::Sender<Command>) -> Result<(), anyhow::Error> {
	let mut lines = BufReader::new(io::stdin()).lines();
	while let Some(line) = lines.next_line().await.context("Unable to read stdin")? {
		if line.trim().is_empty() {
			continue;
		}

		let command = match line.parse::<Command>() {
			Ok(command) => command,
			Err(err) => {
				tracing::warn!("Invalid command: {err}");
				continue;
			},
		};

		tracing::debug!(%command, "Received command");
		if commands_tx.send(command).await.is_err() {
			tracing::debug!("Command receiver was dropped, stopping");
			break;
		}
	}

	Ok(())
}

#[cfg(test)]
mod test {
	use super::*;

	fn parse(s: &str) -> Command {
		s.parse().unwrap_or_else(|err| panic!("Unable to parse {s:?}: {err}"))
	}

	#[test]
	fn commands() {
		assert_eq!(self::parse("source station"), Command::Source("station".to_owned()), "Source");
		assert_eq!(self::parse("  reload "), Command::Reload, "Reload");
		assert_eq!(self::parse("status"), Command::Status, "Status");
		assert_eq!(self::parse("quit"), Command::Quit, "Quit");
		assert_eq!(
			self::parse("resize 1280x720"),
			Command::Resize(Size::new(1280, 720)),
			"Resize"
		);
	}

	#[test]
	fn speeds() {
		let speed = |multiplier| Command::Speed(SpeedCommand::Set(Speed::new(multiplier).expect("Invalid speed")));

		assert_eq!(self::parse("speed pause"), speed(0.0), "Pause");
		assert_eq!(self::parse("speed 0"), speed(0.0), "Zero");
		assert_eq!(self::parse("speed 0.5"), speed(0.5), "Half");
		assert_eq!(self::parse("speed 2"), speed(2.0), "Double");
		assert_eq!(
			self::parse("speed ff"),
			Command::Speed(SpeedCommand::FastForward),
			"Fast-forward"
		);
	}

	#[test]
	fn invalid_commands() {
		let parse_err = |s: &str| s.parse::<Command>().expect_err("Command should be invalid");

		assert!(matches!(parse_err(""), CommandParseError::Empty), "Empty");
		assert!(matches!(parse_err("jump"), CommandParseError::Unknown(_)), "Unknown");
		assert!(
			matches!(parse_err("source"), CommandParseError::MissingArgument { .. }),
			"Missing source"
		);
		assert!(
			matches!(parse_err("reload now"), CommandParseError::ExtraArgument { .. }),
			"Extra argument"
		);
		assert!(matches!(parse_err("speed -1"), CommandParseError::InvalidSpeed(_)), "Negative speed");
		assert!(matches!(parse_err("speed fast"), CommandParseError::InvalidSpeed(_)), "Word speed");
		assert!(
			matches!(parse_err("resize 1280"), CommandParseError::InvalidSize { .. }),
			"Invalid size"
		);
	}

	#[test]
	fn display_parses_back() {
		for s in ["source village", "speed 0.5", "speed ff", "resize 800x600", "reload", "status", "quit"] {
			assert_eq!(self::parse(s).to_string(), s, "Display of {s:?}");
		}
	}
}
