use winnow::prelude::*;
use winnow::ascii::{space0, space1};
use winnow::combinator::{alt, delimited, eof, opt};
use winnow::token::{rest, take_until, take_while};

use tracing::trace;

use crate::diagram_ast::*;
use crate::error::ParseError;

/// Upper bounds applied before parsing text coming from an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    pub max_bytes: usize,
    pub max_lines: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        ParseLimits {
            max_bytes: 1024 * 1024,
            max_lines: 10_000,
        }
    }
}

/// Parse diagram text into nodes, edges and subgraphs.
///
/// Best effort: lines that match no rule are dropped, so a half-typed
/// diagram still yields everything that was recognizable.
pub fn parse_diagram(input: &str) -> ParsedDiagram {
    let mut builder = DiagramBuilder::default();
    for (index, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if is_skipped(line) {
            continue;
        }
        match classify(line) {
            Some(parsed) => builder.apply(parsed),
            None => trace!(line = index + 1, text = line, "ignoring unrecognized diagram line"),
        }
    }
    builder.finish()
}

pub fn parse_diagram_with_limits(
    input: &str,
    limits: &ParseLimits,
) -> Result<ParsedDiagram, ParseError> {
    if input.len() > limits.max_bytes {
        return Err(ParseError::TooLarge {
            size: input.len(),
            limit: limits.max_bytes,
        });
    }
    let lines = input.lines().count();
    if lines > limits.max_lines {
        return Err(ParseError::TooManyLines {
            lines,
            limit: limits.max_lines,
        });
    }
    Ok(parse_diagram(input))
}

fn is_skipped(line: &str) -> bool {
    line.is_empty() || line.starts_with("%%") || line.starts_with("//") || line.starts_with("style")
}

#[derive(Debug, PartialEq)]
enum DiagramLine<'s> {
    SubgraphOpen(String),
    SubgraphClose,
    Edge {
        source: &'s str,
        target: &'s str,
        action: String,
    },
    Node {
        id: &'s str,
        label: String,
    },
}

#[derive(Default)]
struct DiagramBuilder {
    diagram: ParsedDiagram,
    current_subgraph: Option<String>,
}

impl DiagramBuilder {
    fn apply(&mut self, line: DiagramLine<'_>) {
        match line {
            DiagramLine::SubgraphOpen(name) => {
                self.diagram.subgraphs.entry(name.clone()).or_default();
                self.current_subgraph = Some(name);
            }
            DiagramLine::SubgraphClose => {
                self.current_subgraph = None;
            }
            DiagramLine::Edge {
                source,
                target,
                action,
            } => {
                self.touch_node(source);
                self.touch_node(target);
                if !action.is_empty() {
                    self.push_action(source, format!("To {target}: {action}"));
                    self.push_action(target, format!("From {source}: {action}"));
                }
                self.diagram.edges.push(Edge {
                    source: source.to_string(),
                    target: target.to_string(),
                    action,
                });
            }
            DiagramLine::Node { id, label } => {
                let node = self
                    .diagram
                    .nodes
                    .entry(id.to_string())
                    .or_insert_with(|| NodeInfo::bare(id, None));
                node.label = label;
                node.subgraph = self.current_subgraph.clone();
                if let Some(name) = &self.current_subgraph {
                    self.diagram
                        .subgraphs
                        .entry(name.clone())
                        .or_default()
                        .push(id.to_string());
                }
            }
        }
    }

    /// Create the node if unseen; an existing node only moves into the
    /// active subgraph, it never leaves one.
    fn touch_node(&mut self, id: &str) {
        let current = &self.current_subgraph;
        self.diagram
            .nodes
            .entry(id.to_string())
            .and_modify(|node| {
                if let Some(name) = current {
                    node.subgraph = Some(name.clone());
                }
            })
            .or_insert_with(|| NodeInfo::bare(id, current.clone()));
    }

    fn push_action(&mut self, id: &str, description: String) {
        if let Some(node) = self.diagram.nodes.get_mut(id) {
            node.action.push(description);
        }
    }

    fn finish(self) -> ParsedDiagram {
        self.diagram
    }
}

fn classify(line: &str) -> Option<DiagramLine<'_>> {
    let mut input = line;
    alt((subgraph_open, subgraph_close, edge_line, node_line))
        .parse_next(&mut input)
        .ok()
}

fn subgraph_open<'s>(input: &mut &'s str) -> winnow::Result<DiagramLine<'s>> {
    "subgraph".parse_next(input)?;
    space1.parse_next(input)?;
    let name = rest.parse_next(input)?.trim();
    let name = name
        .strip_prefix('"')
        .and_then(|n| n.strip_suffix('"'))
        .unwrap_or(name)
        .trim();
    if name.is_empty() {
        return Err(winnow::error::ParserError::from_input(input));
    }
    Ok(DiagramLine::SubgraphOpen(name.to_string()))
}

fn subgraph_close<'s>(input: &mut &'s str) -> winnow::Result<DiagramLine<'s>> {
    ("end", eof).parse_next(input)?;
    Ok(DiagramLine::SubgraphClose)
}

fn edge_line<'s>(input: &mut &'s str) -> winnow::Result<DiagramLine<'s>> {
    // Shape labels at the edge site are read past but not kept.
    let (source, _) = node_ref.parse_next(input)?;
    space0.parse_next(input)?;
    let action = connector.parse_next(input)?;
    space0.parse_next(input)?;
    let (target, _) = node_ref.parse_next(input)?;
    Ok(DiagramLine::Edge {
        source,
        target,
        action,
    })
}

fn node_line<'s>(input: &mut &'s str) -> winnow::Result<DiagramLine<'s>> {
    let id = identifier.parse_next(input)?;
    let label = shape_label.parse_next(input)?;
    (space0, opt(';'), space0, eof).parse_next(input)?;
    Ok(DiagramLine::Node {
        id,
        label: label.trim().to_string(),
    })
}

/// `-->`, `-->|label|` or `--label-->`. A pipe label wins over an inline one.
fn connector(input: &mut &str) -> winnow::Result<String> {
    let inline = alt((
        "-->".value(None),
        delimited("--", take_until(0.., "-->"), "-->").map(Some),
    ))
    .parse_next(input)?;
    let piped = opt(pipe_label).parse_next(input)?;
    Ok(piped.or(inline).unwrap_or_default().trim().to_string())
}

fn pipe_label<'s>(input: &mut &'s str) -> winnow::Result<&'s str> {
    delimited("|", take_while(0.., |c: char| c != '|'), "|").parse_next(input)
}

fn identifier<'s>(input: &mut &'s str) -> winnow::Result<&'s str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_').parse_next(input)
}

fn node_ref<'s>(input: &mut &'s str) -> winnow::Result<(&'s str, Option<String>)> {
    let id = identifier.parse_next(input)?;
    let label = opt(shape_label).parse_next(input)?;
    Ok((id, label))
}

fn shape_label(input: &mut &str) -> winnow::Result<String> {
    alt((circle_label, round_label, diamond_label, bracketed_label)).parse_next(input)
}

fn quoted_inner(quote: char, closer: char) -> impl FnMut(&mut &str) -> winnow::Result<String> {
    move |input: &mut &str| {
        if input.starts_with(quote) {
            let text = delimited(quote, take_while(0.., move |c: char| c != quote), quote)
                .parse_next(input)?;
            Ok(text.to_string())
        } else {
            let text = take_while(0.., move |c: char| c != closer).parse_next(input)?;
            Ok(text.to_string())
        }
    }
}

fn circle_label(input: &mut &str) -> winnow::Result<String> {
    let text = delimited("((", take_while(0.., |c: char| c != ')'), "))").parse_next(input)?;
    Ok(text.to_string())
}

fn round_label(input: &mut &str) -> winnow::Result<String> {
    delimited("(", quoted_inner('"', ')'), ")").parse_next(input)
}

fn diamond_label(input: &mut &str) -> winnow::Result<String> {
    delimited("{", quoted_inner('"', '}'), "}").parse_next(input)
}

fn bracketed_label(input: &mut &str) -> winnow::Result<String> {
    delimited("[", quoted_inner('"', ']'), "]").parse_next(input)
}
