use std::collections::VecDeque;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock, format_timestamp};
use crate::diagram_ast::*;
use crate::diagram_parser::{ParseLimits, parse_diagram_with_limits};
use crate::error::SessionError;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub zoom_step: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Oldest entries are dropped past this many. `None` keeps everything.
    pub log_capacity: Option<usize>,
    pub limits: ParseLimits,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            zoom_step: 1.2,
            min_zoom: 0.5,
            max_zoom: 3.0,
            log_capacity: None,
            limits: ParseLimits::default(),
        }
    }
}

/// Every state change a view can request, one variant per operation.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    SetDiagramCode(String),
    NodeClick { id: String, label: String },
    NoteChange { id: String, text: String },
    DeleteNote { id: String },
    ZoomIn,
    ZoomOut,
    ResetZoom,
    LogMessage(String),
    SetNotes(IndexMap<String, Note>),
    SetFocused(bool),
    SetSelectedNodes(Vec<String>),
    SetExecuting(bool),
    SetError(Option<String>),
}

/// Plain-data copy of everything a view reads from a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub diagram_code: String,
    pub parsed_diagram: ParsedDiagram,
    pub notes: IndexMap<String, Note>,
    pub zoom: f64,
    pub logs: Vec<String>,
    pub actions: Vec<Edge>,
    pub is_focused: bool,
    pub selected_nodes: Vec<String>,
    pub is_executing: bool,
    pub error: Option<String>,
}

/// Editing state for one diagram: source text, the last good parse and
/// the notes users attach to its nodes.
///
/// Changing the text re-parses it and folds the result into `notes`.
/// Notes are only ever removed by [`DiagramSession::handle_delete_note`]
/// or [`DiagramSession::set_notes`], so a node that briefly disappears
/// while the text is being edited keeps its note.
#[derive(Debug)]
pub struct DiagramSession {
    diagram_code: String,
    parsed_diagram: ParsedDiagram,
    notes: IndexMap<String, Note>,
    zoom: f64,
    logs: VecDeque<String>,
    actions: Vec<Edge>,
    is_focused: bool,
    selected_nodes: Vec<String>,
    is_executing: bool,
    error: Option<String>,
    config: SessionConfig,
    clock: Box<dyn Clock>,
}

impl DiagramSession {
    pub fn new(code: impl Into<String>) -> Self {
        Self::with_config(code, SessionConfig::default(), SystemClock)
    }

    pub fn with_config(
        code: impl Into<String>,
        config: SessionConfig,
        clock: impl Clock + 'static,
    ) -> Self {
        let mut session = DiagramSession {
            diagram_code: code.into(),
            parsed_diagram: ParsedDiagram::default(),
            notes: IndexMap::new(),
            zoom: 1.0,
            logs: VecDeque::new(),
            actions: Vec::new(),
            is_focused: false,
            selected_nodes: Vec::new(),
            is_executing: false,
            error: None,
            config,
            clock: Box::new(clock),
        };
        session.sync_with_code();
        session
    }

    pub fn dispatch(&mut self, action: SessionAction) -> Result<(), SessionError> {
        match action {
            SessionAction::SetDiagramCode(code) => self.set_diagram_code(code),
            SessionAction::NodeClick { id, label } => self.handle_node_click(&id, &label),
            SessionAction::NoteChange { id, text } => return self.handle_note_change(&id, text),
            SessionAction::DeleteNote { id } => {
                self.handle_delete_note(&id);
            }
            SessionAction::ZoomIn => self.handle_zoom_in(),
            SessionAction::ZoomOut => self.handle_zoom_out(),
            SessionAction::ResetZoom => self.handle_reset_zoom(),
            SessionAction::LogMessage(text) => self.log_message(&text),
            SessionAction::SetNotes(notes) => self.set_notes(notes),
            SessionAction::SetFocused(focused) => self.set_is_focused(focused),
            SessionAction::SetSelectedNodes(ids) => self.set_selected_nodes(ids),
            SessionAction::SetExecuting(executing) => self.set_is_executing(executing),
            SessionAction::SetError(error) => self.set_error(error),
        }
        Ok(())
    }

    pub fn set_diagram_code(&mut self, code: impl Into<String>) {
        let code = code.into();
        if code == self.diagram_code {
            return;
        }
        self.diagram_code = code;
        self.sync_with_code();
    }

    fn sync_with_code(&mut self) {
        match parse_diagram_with_limits(&self.diagram_code, &self.config.limits) {
            Ok(diagram) => self.apply_parse(diagram),
            Err(err) => {
                warn!(error = %err, "diagram parse failed, keeping previous state");
                self.error = Some(err.to_string());
            }
        }
    }

    fn apply_parse(&mut self, diagram: ParsedDiagram) {
        let mut created = 0;
        for (id, info) in &diagram.nodes {
            match self.notes.get_mut(id) {
                Some(note) => note.node_info = info.clone(),
                None => {
                    self.notes.insert(id.clone(), Note::new(info.clone()));
                    created += 1;
                }
            }
        }
        debug!(
            nodes = diagram.nodes.len(),
            edges = diagram.edges.len(),
            notes_created = created,
            "reconciled diagram"
        );
        self.actions = diagram.edges.clone();
        self.parsed_diagram = diagram;
        self.error = None;
    }

    pub fn handle_node_click(&mut self, id: &str, label: &str) {
        self.log_message(&format!("Clicked node {label} ({id})"));
        self.notes.entry(id.to_string()).or_insert_with(|| {
            Note::new(NodeInfo {
                id: id.to_string(),
                label: label.to_string(),
                action: Vec::new(),
                subgraph: None,
            })
        });
    }

    pub fn handle_note_change(
        &mut self,
        id: &str,
        text: impl Into<String>,
    ) -> Result<(), SessionError> {
        let Some(note) = self.notes.get_mut(id) else {
            warn!(node = id, "note edit for a node without a note");
            return Err(SessionError::UnknownNote(id.to_string()));
        };
        note.content = text.into();
        self.log_message(&format!("Updated note for {id}"));
        Ok(())
    }

    /// Set note text for each id, creating a bare note for ids the
    /// diagram does not mention. Only the content edits are logged.
    pub fn import_notes(
        &mut self,
        notes: impl IntoIterator<Item = (String, String)>,
    ) -> Result<(), SessionError> {
        for (id, content) in notes {
            self.notes
                .entry(id.clone())
                .or_insert_with(|| Note::new(NodeInfo::bare(&id, None)));
            self.handle_note_change(&id, content)?;
        }
        Ok(())
    }

    /// Returns whether a note was removed.
    pub fn handle_delete_note(&mut self, id: &str) -> bool {
        let removed = self.notes.shift_remove(id).is_some();
        self.log_message(&format!("Deleted note for {id}"));
        removed
    }

    pub fn handle_zoom_in(&mut self) {
        self.zoom = (self.zoom * self.config.zoom_step).min(self.config.max_zoom);
        self.log_message(&format!("Zoomed in to {:.2}x", self.zoom));
    }

    pub fn handle_zoom_out(&mut self) {
        self.zoom = (self.zoom / self.config.zoom_step).max(self.config.min_zoom);
        self.log_message(&format!("Zoomed out to {:.2}x", self.zoom));
    }

    pub fn handle_reset_zoom(&mut self) {
        self.zoom = 1.0;
        self.log_message("Zoom reset to 1.00x");
    }

    pub fn log_message(&mut self, text: &str) {
        let stamp = format_timestamp(self.clock.now());
        self.logs.push_back(format!("[{stamp}] {text}"));
        if let Some(capacity) = self.config.log_capacity {
            while self.logs.len() > capacity {
                self.logs.pop_front();
            }
        }
    }

    pub fn set_notes(&mut self, notes: IndexMap<String, Note>) {
        self.notes = notes;
    }

    pub fn set_is_focused(&mut self, focused: bool) {
        self.is_focused = focused;
    }

    pub fn set_selected_nodes(&mut self, ids: Vec<String>) {
        self.selected_nodes = ids;
    }

    pub fn set_is_executing(&mut self, executing: bool) {
        self.is_executing = executing;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub fn diagram_code(&self) -> &str {
        &self.diagram_code
    }

    pub fn parsed_diagram(&self) -> &ParsedDiagram {
        &self.parsed_diagram
    }

    pub fn notes(&self) -> &IndexMap<String, Note> {
        &self.notes
    }

    pub fn note(&self, id: &str) -> Option<&Note> {
        self.notes.get(id)
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn logs(&self) -> &VecDeque<String> {
        &self.logs
    }

    /// Edges of the last good parse.
    pub fn actions(&self) -> &[Edge] {
        &self.actions
    }

    pub fn is_focused(&self) -> bool {
        self.is_focused
    }

    pub fn selected_nodes(&self) -> &[String] {
        &self.selected_nodes
    }

    pub fn is_executing(&self) -> bool {
        self.is_executing
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            diagram_code: self.diagram_code.clone(),
            parsed_diagram: self.parsed_diagram.clone(),
            notes: self.notes.clone(),
            zoom: self.zoom,
            logs: self.logs.iter().cloned().collect(),
            actions: self.actions.clone(),
            is_focused: self.is_focused,
            selected_nodes: self.selected_nodes.clone(),
            is_executing: self.is_executing,
            error: self.error.clone(),
        }
    }
}
