//! Line-driven editing shell.
//!
//! Each input line is one command. Prompts raised while a command runs
//! (road names, delete confirmations) read the following line.

use crate::commands::{Command, CommandError, CommandRegistry};
use crate::view;
use roadnet_core::{
    ElementId, ElementKind, FlowListEditor, PointerEvent, Prompter, RoadId, RoadNetwork, Session,
    SnapshotObserver, TrafficFlow, TurningMatrixEditor, VehicleType,
};
use std::io::{self, BufRead, Lines, Write};
use std::path::PathBuf;

/// Answers session prompts from the next input line.
struct LinePrompter<'a, R, W> {
    lines: &'a mut Lines<R>,
    out: &'a mut W,
}

impl<R: BufRead, W: Write> LinePrompter<'_, R, W> {
    fn ask(&mut self, message: &str) -> Option<String> {
        // Prompt output is best effort; the answer still comes from input
        let _ = writeln!(self.out, "{}", message);
        match self.lines.next()? {
            Ok(line) => Some(line),
            Err(e) => {
                log::warn!("Failed to read prompt answer: {}", e);
                None
            }
        }
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<'_, R, W> {
    fn road_name(&mut self, message: &str) -> Option<String> {
        self.ask(message)
    }

    fn confirm(&mut self, message: &str) -> bool {
        let message = format!("{} [y/N]", message);
        self.ask(&message)
            .is_some_and(|answer| matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    }
}

/// Logs each committed snapshot.
struct ChangeLog;

impl SnapshotObserver for ChangeLog {
    fn snapshot_changed(&mut self, network: &RoadNetwork) {
        log::info!(
            "Network now has {} intersections and {} roads",
            network.intersection_count(),
            network.road_count()
        );
    }
}

/// What the shell loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// The editing shell.
pub struct Shell<R, W> {
    session: Session,
    lines: Lines<R>,
    out: W,
    out_dir: PathBuf,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(mut session: Session, input: R, out: W, out_dir: PathBuf) -> Self {
        session.add_observer(Box::new(ChangeLog));
        Self {
            session,
            lines: input.lines(),
            out,
            out_dir,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    /// Run commands until `quit` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", self.session.interaction().hint())?;
        while let Some(line) = self.lines.next() {
            let line = line?;
            let command = match Command::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    writeln!(self.out, "error: {}", e)?;
                    continue;
                }
            };
            log::debug!("Running {:?}", command);

            match self.execute(command) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(e) => {
                    log::warn!("Command failed: {}", e);
                    writeln!(self.out, "error: {}", e)?;
                }
            }
        }
        self.out.flush()
    }

    fn execute(&mut self, command: Command) -> Result<Flow, CommandError> {
        match command {
            Command::Click(position) => {
                let (session, mut prompter) = self.session_and_prompter();
                session.click_at(position, &mut prompter);
                self.show_hint()?;
            }
            Command::Pointer(event) => {
                let ends_gesture = matches!(event, PointerEvent::Up { .. });
                let (session, mut prompter) = self.session_and_prompter();
                session.handle_pointer(event, &mut prompter);
                if ends_gesture {
                    self.show_hint()?;
                }
            }
            Command::Zoom(direction) => {
                self.session.zoom_step(direction);
                self.show_zoom()?;
            }
            Command::Pan => {
                let panning = self.session.toggle_panning();
                writeln!(self.out, "Pan mode {}", if panning { "on" } else { "off" })?;
            }
            Command::Cancel => {
                self.session.cancel();
                self.show_hint()?;
            }
            Command::Delete => {
                if self.session.selection().is_none() {
                    return Err(CommandError::NothingSelected);
                }
                let (session, mut prompter) = self.session_and_prompter();
                if session.delete_selected(&mut prompter) {
                    writeln!(self.out, "Deleted")?;
                }
            }
            Command::SelectInfo => view::write_selection(&mut self.out, &self.session)?,
            Command::FlowAdd(flow) => {
                let mut editor = self.flow_editor()?;
                editor.draft = flow;
                let flows = editor.add_draft();
                self.session.update_road_flows(editor.road(), flows);
            }
            Command::FlowSet { row, flow } => self.edit_flows(row, |editor, index| {
                editor.set_flow(index, flow)
            })?,
            Command::FlowRemove(row) => {
                self.edit_flows(row, |editor, index| editor.remove(index))?
            }
            Command::Turn {
                from,
                to,
                vehicle_type,
                volume,
            } => self.set_turn(&from, &to, vehicle_type, volume)?,
            Command::List => view::write_lists(&mut self.out, self.session.network())?,
            Command::Export(dir) => {
                let dir = dir.unwrap_or_else(|| self.out_dir.clone());
                let path = self.session.export_to_dir(&dir)?;
                writeln!(self.out, "Exported to {}", path.display())?;
            }
            Command::Help => CommandRegistry::print_all(&mut self.out)?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn session_and_prompter(&mut self) -> (&mut Session, LinePrompter<'_, R, W>) {
        let prompter = LinePrompter {
            lines: &mut self.lines,
            out: &mut self.out,
        };
        (&mut self.session, prompter)
    }

    fn show_hint(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", self.session.interaction().hint())
    }

    fn show_zoom(&mut self) -> io::Result<()> {
        writeln!(self.out, "Zoom {:.0}%", self.session.viewport.zoom_percent())
    }

    fn selected(&self, kind: ElementKind, error: CommandError) -> Result<ElementId, CommandError> {
        let id = self.session.selection().ok_or(CommandError::NothingSelected)?;
        if self.session.selection_kind() == Some(kind) {
            Ok(id)
        } else {
            Err(error)
        }
    }

    fn flow_editor(&self) -> Result<FlowListEditor, CommandError> {
        let road = self.selected(ElementKind::Road, CommandError::NotARoad)?;
        self.session.flow_editor(road).ok_or(CommandError::NotARoad)
    }

    /// Apply a row edit to the selected road. `row` is 1-based.
    fn edit_flows(
        &mut self,
        row: usize,
        edit: impl FnOnce(&mut FlowListEditor, usize) -> Option<Vec<TrafficFlow>>,
    ) -> Result<(), CommandError> {
        let mut editor = self.flow_editor()?;
        let flows = row
            .checked_sub(1)
            .and_then(|index| edit(&mut editor, index))
            .ok_or(CommandError::NoSuchRow(row))?;
        self.session.update_road_flows(editor.road(), flows);
        Ok(())
    }

    fn set_turn(
        &mut self,
        from: &str,
        to: &str,
        vehicle_type: VehicleType,
        volume: u32,
    ) -> Result<(), CommandError> {
        let intersection =
            self.selected(ElementKind::Intersection, CommandError::NotAnIntersection)?;
        let mut editor = self
            .session
            .matrix_editor(intersection)
            .ok_or(CommandError::NotAnIntersection)?;

        let from = resolve_road(self.session.network(), &editor, from)?;
        let to = resolve_road(self.session.network(), &editor, to)?;
        let matrix = editor
            .set_volume(from, to, vehicle_type, volume)
            .ok_or(CommandError::NotAMovement)?;
        self.session.update_intersection_matrix(intersection, matrix);
        Ok(())
    }
}

/// Find a connected road by 1-based position or by name.
fn resolve_road(
    network: &RoadNetwork,
    editor: &TurningMatrixEditor,
    key: &str,
) -> Result<RoadId, CommandError> {
    let roads = editor.roads();
    if let Ok(position) = key.parse::<usize>() {
        return position
            .checked_sub(1)
            .and_then(|index| roads.get(index))
            .copied()
            .ok_or_else(|| CommandError::UnknownRoad(key.to_string()));
    }
    roads
        .iter()
        .copied()
        .find(|&road| network.road_segment(road).is_some_and(|r| r.name == key))
        .ok_or_else(|| CommandError::UnknownRoad(key.to_string()))
}
