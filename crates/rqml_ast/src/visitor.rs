//! AST walker.
//!
//! [`AstVisitor`] has one method per node kind. Every default method calls the
//! matching `walk_*` function, which visits the node's children in a fixed
//! order. An implementation overrides the methods it cares about and calls the
//! `walk_*` function itself when it still wants the default recursion.
//!
//! Child order:
//! - `Program`: header statements, then the root object.
//! - `ImportStatement`: module id, version (or directory), qualifier.
//! - `ObjectLiteral`: type id, then member block.
//! - `MemberBlock`: members in source order.
//! - `PropertyDeclaration`: type, list modifier, id, binding.
//! - `PropertyBinding`: id, then the bound value.
//! - `PropertyModifier`: modifier type, property id, then member block.
//! - `ArrayBinding`: object literals in source order.
//! - `SignalDefinition`: id, then parameters in order.
//! - `StatementBlock`: statements in source order.

use crate::node::*;

pub trait AstVisitor<'a> {
    // -- QML --

    fn visit_program(&mut self, node: &'a Program<'a>) {
        walk_program(self, node);
    }

    fn visit_header_statement(&mut self, node: &'a HeaderStatement<'a>) {
        walk_header_statement(self, node);
    }

    fn visit_import_statement(&mut self, node: &'a ImportStatement<'a>) {
        walk_import_statement(self, node);
    }

    fn visit_pragma_statement(&mut self, node: &'a PragmaStatement<'a>) {
        self.visit_qualified_id(&node.id);
    }

    fn visit_version_literal(&mut self, _node: &'a VersionLiteral<'a>) {}

    fn visit_object_literal(&mut self, node: &'a ObjectLiteral<'a>) {
        walk_object_literal(self, node);
    }

    fn visit_member_block(&mut self, node: &'a MemberBlock<'a>) {
        walk_member_block(self, node);
    }

    fn visit_member(&mut self, node: &'a Member<'a>) {
        walk_member(self, node);
    }

    fn visit_property_declaration(&mut self, node: &'a PropertyDeclaration<'a>) {
        walk_property_declaration(self, node);
    }

    fn visit_property_binding(&mut self, node: &'a PropertyBinding<'a>) {
        walk_property_binding(self, node);
    }

    fn visit_binding(&mut self, node: &'a Binding<'a>) {
        walk_binding(self, node);
    }

    fn visit_property_modifier(&mut self, node: &'a PropertyModifier<'a>) {
        walk_property_modifier(self, node);
    }

    fn visit_array_binding(&mut self, node: &'a ArrayBinding<'a>) {
        for element in node.elements.iter() {
            self.visit_object_literal(element);
        }
    }

    fn visit_signal_definition(&mut self, node: &'a SignalDefinition<'a>) {
        walk_signal_definition(self, node);
    }

    fn visit_parameter(&mut self, node: &'a Parameter<'a>) {
        self.visit_property_type(&node.kind);
        self.visit_identifier(&node.id);
    }

    fn visit_property_type(&mut self, node: &'a PropertyType<'a>) {
        match node {
            PropertyType::Builtin(id) => self.visit_identifier(id),
            PropertyType::Named(qid) => self.visit_qualified_id(qid),
        }
    }

    fn visit_qualified_id(&mut self, node: &'a QualifiedId<'a>) {
        for part in node.parts.iter() {
            self.visit_identifier(part);
        }
    }

    fn visit_statement_block(&mut self, node: &'a StatementBlock<'a>) {
        for stmt in node.body.iter() {
            self.visit_statement(stmt);
        }
    }

    // -- JavaScript --

    fn visit_identifier(&mut self, _node: &'a Identifier<'a>) {}

    fn visit_literal(&mut self, _node: &'a Literal<'a>) {}

    fn visit_function(&mut self, node: &'a Function<'a>) {
        walk_function(self, node);
    }

    fn visit_statement(&mut self, node: &'a Statement<'a>) {
        walk_statement(self, node);
    }

    fn visit_variable_declarator(&mut self, node: &'a VariableDeclarator<'a>) {
        self.visit_identifier(&node.id);
        if let Some(init) = &node.init {
            self.visit_expression(init);
        }
    }

    fn visit_expression(&mut self, node: &'a Expression<'a>) {
        walk_expression(self, node);
    }
}

// ============================================================================
// QML walkers
// ============================================================================

pub fn walk_program<'a, V: AstVisitor<'a> + ?Sized>(v: &mut V, node: &'a Program<'a>) {
    for stmt in node.header_statements.statements.iter() {
        v.visit_header_statement(stmt);
    }
    if let Some(root) = node.root_object {
        v.visit_object_literal(root);
    }
}

pub fn walk_header_statement<'a, V: AstVisitor<'a> + ?Sized>(v: &mut V, node: &'a HeaderStatement<'a>) {
    match node {
        HeaderStatement::Import(n) => v.visit_import_statement(n),
        HeaderStatement::Pragma(n) => v.visit_pragma_statement(n),
    }
}

pub fn walk_import_statement<'a, V: AstVisitor<'a> + ?Sized>(v: &mut V, node: &'a ImportStatement<'a>) {
    match &node.source {
        ImportSource::Module(module) => {
            v.visit_qualified_id(&module.id);
            v.visit_version_literal(&module.version);
        }
        ImportSource::Directory(lit) => v.visit_literal(lit),
    }
    if let Some(qualifier) = &node.qualifier {
        v.visit_identifier(qualifier);
    }
}

pub fn walk_object_literal<'a, V: AstVisitor<'a> + ?Sized>(v: &mut V, node: &'a ObjectLiteral<'a>) {
    v.visit_qualified_id(&node.id);
    v.visit_member_block(&node.block);
}

pub fn walk_member_block<'a, V: AstVisitor<'a> + ?Sized>(v: &mut V, node: &'a MemberBlock<'a>) {
    for member in node.members.iter() {
        v.visit_member(member);
    }
}

pub fn walk_member<'a, V: AstVisitor<'a> + ?Sized>(v: &mut V, node: &'a Member<'a>) {
    match node {
        Member::Property(n) => v.visit_property_declaration(n),
        Member::Binding(n) => v.visit_property_binding(n),
        Member::Signal(n) => v.visit_signal_definition(n),
        Member::Object(n) => v.visit_object_literal(n),
        Member::Function(n) => v.visit_function(n),
        Member::Modifier(n) => v.visit_property_modifier(n),
    }
}

pub fn walk_property_declaration<'a, V: AstVisitor<'a> + ?Sized>(v: &mut V, node: &'a PropertyDeclaration<'a>) {
    v.visit_property_type(&node.kind);
    if let Some(modifier) = &node.modifier {
        v.visit_property_type(modifier);
    }
    v.visit_identifier(&node.id);
    if let Some(binding) = &node.binding {
        v.visit_binding(binding);
    }
}

pub fn walk_property_binding<'a, V: AstVisitor<'a> + ?Sized>(v: &mut V, node: &'a PropertyBinding<'a>) {
    v.visit_qualified_id(&node.id);
    v.visit_binding(&node.binding);
}

pub fn walk_binding<'a, V: AstVisitor<'a> + ?Sized>(v: &mut V, node: &'a Binding<'a>) {
    match node {
        Binding::Expression(expr) => v.visit_expression(expr),
        Binding::Block(block) => v.visit_statement_block(block),
        Binding::Object(obj) => v.visit_object_literal(obj),
        Binding::Array(array) => v.visit_array_binding(array),
    }
}

pub fn walk_property_modifier<'a, V: AstVisitor<'a> + ?Sized>(v: &mut V, node: &'a PropertyModifier<'a>) {
    v.visit_qualified_id(&node.kind);
    v.visit_qualified_id(&node.id);
    v.visit_member_block(&node.block);
}

pub fn walk_signal_definition<'a, V: AstVisitor<'a> + ?Sized>(v: &mut V, node: &'a SignalDefinition<'a>) {
    v.visit_identifier(&node.id);
    for param in node.params.iter() {
        v.visit_parameter(param);
    }
}

// ============================================================================
// JavaScript walkers
// ============================================================================

pub fn walk_function<'a, V: AstVisitor<'a> + ?Sized>(v: &mut V, node: &'a Function<'a>) {
    if let Some(id) = &node.id {
        v.visit_identifier(id);
    }
    for param in node.params.iter() {
        v.visit_identifier(param);
    }
    for stmt in node.body.body.iter() {
        v.visit_statement(stmt);
    }
}

fn walk_for_init<'a, V: AstVisitor<'a> + ?Sized>(v: &mut V, init: &'a ForInit<'a>) {
    match init {
        ForInit::Declaration(decl) => {
            for d in decl.declarations.iter() {
                v.visit_variable_declarator(d);
            }
        }
        ForInit::Expression(expr) => v.visit_expression(expr),
    }
}

pub fn walk_statement<'a, V: AstVisitor<'a> + ?Sized>(v: &mut V, node: &'a Statement<'a>) {
    match node {
        Statement::Expression(n) => v.visit_expression(&n.expression),
        Statement::Block(n) => {
            for stmt in n.body.iter() {
                v.visit_statement(stmt);
            }
        }
        Statement::Empty(_) | Statement::Debugger(_) => {}
        Statement::With(n) => {
            v.visit_expression(&n.object);
            v.visit_statement(&n.body);
        }
        Statement::Return(n) => {
            if let Some(arg) = &n.argument {
                v.visit_expression(arg);
            }
        }
        Statement::Labeled(n) => {
            v.visit_identifier(&n.label);
            v.visit_statement(&n.body);
        }
        Statement::Break(n) | Statement::Continue(n) => {
            if let Some(label) = &n.label {
                v.visit_identifier(label);
            }
        }
        Statement::If(n) => {
            v.visit_expression(&n.test);
            v.visit_statement(&n.consequent);
            if let Some(alt) = &n.alternate {
                v.visit_statement(alt);
            }
        }
        Statement::Switch(n) => {
            v.visit_expression(&n.discriminant);
            for case in n.cases.iter() {
                if let Some(test) = &case.test {
                    v.visit_expression(test);
                }
                for stmt in case.consequent.iter() {
                    v.visit_statement(stmt);
                }
            }
        }
        Statement::Throw(n) => v.visit_expression(&n.argument),
        Statement::Try(n) => {
            for stmt in n.block.body.iter() {
                v.visit_statement(stmt);
            }
            if let Some(handler) = n.handler {
                v.visit_identifier(&handler.param);
                for stmt in handler.body.body.iter() {
                    v.visit_statement(stmt);
                }
            }
            if let Some(finalizer) = n.finalizer {
                for stmt in finalizer.body.iter() {
                    v.visit_statement(stmt);
                }
            }
        }
        Statement::While(n) => {
            v.visit_expression(&n.test);
            v.visit_statement(&n.body);
        }
        Statement::DoWhile(n) => {
            v.visit_statement(&n.body);
            v.visit_expression(&n.test);
        }
        Statement::For(n) => {
            if let Some(init) = &n.init {
                walk_for_init(v, init);
            }
            if let Some(test) = &n.test {
                v.visit_expression(test);
            }
            if let Some(update) = &n.update {
                v.visit_expression(update);
            }
            v.visit_statement(&n.body);
        }
        Statement::ForIn(n) => {
            walk_for_init(v, &n.left);
            v.visit_expression(&n.right);
            v.visit_statement(&n.body);
        }
        Statement::FunctionDeclaration(f) => v.visit_function(f),
        Statement::VariableDeclaration(n) => {
            for d in n.declarations.iter() {
                v.visit_variable_declarator(d);
            }
        }
    }
}

pub fn walk_expression<'a, V: AstVisitor<'a> + ?Sized>(v: &mut V, node: &'a Expression<'a>) {
    match node {
        Expression::Identifier(id) => v.visit_identifier(id),
        Expression::Literal(lit) => v.visit_literal(lit),
        Expression::This(_) => {}
        Expression::Array(n) => {
            for elem in n.elements.iter().flatten() {
                v.visit_expression(elem);
            }
        }
        Expression::Object(n) => {
            for prop in n.properties.iter() {
                match &prop.key {
                    PropertyKey::Identifier(id) => v.visit_identifier(id),
                    PropertyKey::Literal(lit) => v.visit_literal(lit),
                }
                v.visit_expression(&prop.value);
            }
        }
        Expression::Function(f) => v.visit_function(f),
        Expression::Unary(n) => v.visit_expression(&n.argument),
        Expression::Update(n) => v.visit_expression(&n.argument),
        Expression::Binary(n) => {
            v.visit_expression(&n.left);
            v.visit_expression(&n.right);
        }
        Expression::Assignment(n) => {
            v.visit_expression(&n.left);
            v.visit_expression(&n.right);
        }
        Expression::Conditional(n) => {
            v.visit_expression(&n.test);
            v.visit_expression(&n.consequent);
            v.visit_expression(&n.alternate);
        }
        Expression::Call(n) => {
            v.visit_expression(&n.callee);
            for arg in n.arguments.iter() {
                v.visit_expression(arg);
            }
        }
        Expression::Member(n) => {
            v.visit_expression(&n.object);
            v.visit_expression(&n.property);
        }
        Expression::Sequence(n) => {
            for expr in n.expressions.iter() {
                v.visit_expression(expr);
            }
        }
    }
}
