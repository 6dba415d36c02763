//! Shell command parsing and the command reference.

use kurbo::Point;
use roadnet_core::{
    Direction, ParseKindError, PointerEvent, TrafficFlow, VehicleType, ZoomDirection, parse_volume,
};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from parsing or running a command line.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Unknown command: {0} (try `help`)")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Unclosed quote")]
    UnclosedQuote,
    #[error("Not a number: {0:?}")]
    InvalidNumber(String),
    #[error(transparent)]
    InvalidKind(#[from] ParseKindError),
    #[error("Nothing is selected")]
    NothingSelected,
    #[error("The selection is not a road")]
    NotARoad,
    #[error("The selection is not an intersection")]
    NotAnIntersection,
    #[error("No flow row {0}")]
    NoSuchRow(usize),
    #[error("No connected road matches {0:?}")]
    UnknownRoad(String),
    #[error("Not a turning movement: a road cannot turn into itself")]
    NotAMovement,
    #[error("Export failed: {0}")]
    Export(#[from] roadnet_core::ExportError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A parsed shell command. Coordinates are screen pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Click(Point),
    Pointer(PointerEvent),
    Zoom(ZoomDirection),
    Pan,
    Cancel,
    Delete,
    SelectInfo,
    FlowAdd(TrafficFlow),
    /// Replace a flow row (1-based).
    FlowSet { row: usize, flow: TrafficFlow },
    FlowRemove(usize),
    /// Set a turning volume; roads are named or given by 1-based position.
    Turn {
        from: String,
        to: String,
        vehicle_type: VehicleType,
        volume: u32,
    },
    List,
    Export(Option<PathBuf>),
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines and `#` comments yield `None`.
    ///
    /// Arguments are separated by whitespace; double quotes group words, so
    /// road names with spaces can be given as `"Main St"`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        if line.trim_start().starts_with('#') {
            return Ok(None);
        }
        let words = tokenize(line)?;
        let words: Vec<&str> = words.iter().map(String::as_str).collect();
        let Some((&name, args)) = words.split_first() else {
            return Ok(None);
        };

        let command = match name.to_ascii_lowercase().as_str() {
            "click" => Command::Click(point(args, "click X Y")?),
            "down" => Command::Pointer(PointerEvent::Down {
                position: point(args, "down X Y")?,
            }),
            "move" => Command::Pointer(PointerEvent::Move {
                position: point(args, "move X Y")?,
            }),
            "up" => Command::Pointer(PointerEvent::Up {
                position: point(args, "up X Y")?,
            }),
            "wheel" => {
                const USAGE: &str = "wheel X Y DY";
                let [x, y, dy] = exact(args, USAGE)?;
                Command::Pointer(PointerEvent::Wheel {
                    position: Point::new(number(x)?, number(y)?),
                    delta_y: number(dy)?,
                })
            }
            "zoom" => match args {
                ["in"] => Command::Zoom(ZoomDirection::In),
                ["out"] => Command::Zoom(ZoomDirection::Out),
                _ => return Err(CommandError::Usage("zoom in|out")),
            },
            "pan" => Command::Pan,
            "cancel" | "esc" => Command::Cancel,
            "delete" | "del" => Command::Delete,
            "select-info" | "info" => Command::SelectInfo,
            "flow" => parse_flow(args)?,
            "turn" => {
                const USAGE: &str = "turn FROM TO TYPE VOL";
                let [from, to, vehicle_type, volume] = exact(args, USAGE)?;
                Command::Turn {
                    from: from.to_string(),
                    to: to.to_string(),
                    vehicle_type: vehicle_type.parse()?,
                    volume: parse_volume(volume),
                }
            }
            "list" | "ls" => Command::List,
            "export" => match args {
                [] => Command::Export(None),
                [dir] => Command::Export(Some(PathBuf::from(dir))),
                _ => return Err(CommandError::Usage("export [DIR]")),
            },
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

/// Split a line into words, keeping double-quoted text together.
fn tokenize(line: &str) -> Result<Vec<String>, CommandError> {
    let mut words = Vec::new();
    let mut chars = line.chars().peekable();
    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let Some(&first) = chars.peek() else {
            return Ok(words);
        };

        let mut word = String::new();
        if first == '"' {
            chars.next();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some(c) => word.push(c),
                    None => return Err(CommandError::UnclosedQuote),
                }
            }
        } else {
            while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                word.push(c);
            }
        }
        words.push(word);
    }
}

fn parse_flow(args: &[&str]) -> Result<Command, CommandError> {
    match args {
        ["add", rest @ ..] => {
            let [vehicle_type, direction, volume] = exact(rest, "flow add TYPE DIR VOL")?;
            Ok(Command::FlowAdd(flow(vehicle_type, direction, volume)?))
        }
        ["set", rest @ ..] => {
            let [row, vehicle_type, direction, volume] =
                exact(rest, "flow set ROW TYPE DIR VOL")?;
            Ok(Command::FlowSet {
                row: index(row)?,
                flow: flow(vehicle_type, direction, volume)?,
            })
        }
        ["remove", rest @ ..] => {
            let [row] = exact(rest, "flow remove ROW")?;
            Ok(Command::FlowRemove(index(row)?))
        }
        _ => Err(CommandError::Usage("flow add|set|remove ...")),
    }
}

fn exact<'a, const N: usize>(
    args: &[&'a str],
    usage: &'static str,
) -> Result<[&'a str; N], CommandError> {
    <[&str; N]>::try_from(args).map_err(|_| CommandError::Usage(usage))
}

fn number(text: &str) -> Result<f64, CommandError> {
    text.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| CommandError::InvalidNumber(text.to_string()))
}

fn point(args: &[&str], usage: &'static str) -> Result<Point, CommandError> {
    let [x, y] = exact(args, usage)?;
    Ok(Point::new(number(x)?, number(y)?))
}

fn index(text: &str) -> Result<usize, CommandError> {
    text.parse::<usize>()
        .map_err(|_| CommandError::InvalidNumber(text.to_string()))
}

fn flow(vehicle_type: &str, direction: &str, volume: &str) -> Result<TrafficFlow, CommandError> {
    Ok(TrafficFlow::new(
        vehicle_type.parse()?,
        direction.parse::<Direction>()?,
        parse_volume(volume),
    ))
}

/// A documented shell command.
#[derive(Debug, Clone)]
pub struct CommandHelp {
    pub usage: &'static str,
    pub description: &'static str,
}

impl CommandHelp {
    pub const fn new(usage: &'static str, description: &'static str) -> Self {
        Self { usage, description }
    }
}

/// Reference of all shell commands.
pub struct CommandRegistry;

impl CommandRegistry {
    pub fn all() -> Vec<CommandHelp> {
        vec![
            CommandHelp::new("click X Y", "Click the canvas at a screen position"),
            CommandHelp::new("down|move|up X Y", "Raw pointer events (drag to pan in pan mode)"),
            CommandHelp::new("wheel X Y DY", "Wheel zoom at a position (negative DY zooms in)"),
            CommandHelp::new("zoom in|out", "Zoom by one step"),
            CommandHelp::new("pan", "Toggle pan mode"),
            CommandHelp::new("cancel", "Cancel the current road and clear selection"),
            CommandHelp::new("delete", "Delete the selected element"),
            CommandHelp::new("select-info", "Show properties of the selected element"),
            CommandHelp::new("flow add TYPE DIR VOL", "Add a flow to the selected road"),
            CommandHelp::new("flow set ROW TYPE DIR VOL", "Replace a flow row"),
            CommandHelp::new("flow remove ROW", "Remove a flow row"),
            CommandHelp::new(
                "turn FROM TO TYPE VOL",
                "Set a turning volume; roads by position or name (quote names with spaces)",
            ),
            CommandHelp::new("list", "List intersections and roads"),
            CommandHelp::new("export [DIR]", "Write road-network.json"),
            CommandHelp::new("help", "Show this reference"),
            CommandHelp::new("quit", "Leave the shell"),
        ]
    }

    /// Write the command reference.
    pub fn print_all(out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "\n=== Commands ===")?;
        for command in Self::all() {
            writeln!(out, "  {:28} {}", command.usage, command.description)?;
        }
        writeln!(out)
    }
}
