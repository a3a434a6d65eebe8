pub mod clock;
pub mod diagram_ast;
pub mod diagram_parser;
pub mod display_width;
pub mod error;
pub mod report;
pub mod session;

pub use diagram_ast::{Edge, NodeInfo, Note, ParsedDiagram};
pub use diagram_parser::{ParseLimits, parse_diagram, parse_diagram_with_limits};
pub use error::{ParseError, SessionError};
pub use session::{DiagramSession, SessionAction, SessionConfig, SessionSnapshot};
