//! rqml_ast: Syntax tree definitions for QML documents and embedded ES5.
//!
//! One AST schema serves both the strict and the loose grammar. Nodes are
//! arena-allocated and reference their children by `&'a` borrows; nodes that
//! own a lexical scope carry a [`ScopeSlot`] filled in by the inference
//! engine's gathering pass.

pub mod node;
pub mod serialize;
pub mod syntax_kind;
pub mod types;
pub mod visitor;

pub use node::*;
pub use syntax_kind::{ContextualKeyword, SyntaxKind};
pub use types::*;
