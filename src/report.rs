use crate::display_width::{display_width, pad_to_width, truncate_to_width};
use crate::session::DiagramSession;

const NOTE_COLUMN_MAX: usize = 40;

/// Plain-text overview of a session: one row per noted node, then edges
/// and subgraphs.
pub fn render_report(session: &DiagramSession) -> String {
    let mut rows: Vec<[String; 4]> = vec![[
        "ID".to_string(),
        "LABEL".to_string(),
        "SUBGRAPH".to_string(),
        "NOTE".to_string(),
    ]];
    for (id, note) in session.notes() {
        let info = &note.node_info;
        rows.push([
            id.clone(),
            info.label.clone(),
            info.subgraph.clone().unwrap_or_else(|| "-".to_string()),
            truncate_to_width(&note.content, NOTE_COLUMN_MAX),
        ]);
    }

    let mut widths = [0usize; 4];
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(display_width(cell));
        }
    }

    let mut lines: Vec<String> = rows
        .iter()
        .map(|row| {
            let cells: Vec<String> = row
                .iter()
                .zip(widths)
                .map(|(cell, w)| pad_to_width(cell, w))
                .collect();
            cells.join("  ").trim_end().to_string()
        })
        .collect();

    let edges = session.actions();
    if !edges.is_empty() {
        lines.push(String::new());
        lines.push("Edges:".to_string());
        for edge in edges {
            if edge.action.is_empty() {
                lines.push(format!("  {} -> {}", edge.source, edge.target));
            } else {
                lines.push(format!("  {} -> {}: {}", edge.source, edge.target, edge.action));
            }
        }
    }

    let subgraphs = &session.parsed_diagram().subgraphs;
    if !subgraphs.is_empty() {
        lines.push(String::new());
        lines.push("Subgraphs:".to_string());
        for (name, ids) in subgraphs {
            lines.push(format!("  {name}: {}", ids.join(", ")).trim_end().to_string());
        }
    }

    lines.join("\n")
}
