//! rqml_core: Core utilities shared by the QML parser and language service.
//!
//! Provides character-based text ranges and line maps, the bump arena that
//! owns AST nodes, and the atom table used for property names.

pub mod arena;
pub mod collections;
pub mod intern;
pub mod text;

pub use arena::SyntaxArena;
pub use intern::{Atom, AtomTable};
pub use text::{LineAndColumn, LineMap, Position, TextPos, TextRange};
