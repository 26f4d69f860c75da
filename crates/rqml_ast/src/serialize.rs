//! ESTree-style JSON output for parsed documents.
//!
//! Every node becomes an object with `type`, `range: [start, end]`, an
//! optional `loc: {start: {line, column}, end: {line, column}}`, and then its
//! kind-specific fields in a fixed order.

use crate::node::*;
use rqml_core::text::{LineMap, TextRange};
use serde_json::{json, Map, Value};

/// Converts an AST into `serde_json` values.
pub struct AstSerializer<'m> {
    line_map: Option<&'m LineMap>,
}

impl<'m> AstSerializer<'m> {
    /// Serializer that emits only ranges.
    pub fn new() -> Self {
        Self { line_map: None }
    }

    /// Serializer that also emits `loc` objects.
    pub fn with_locations(line_map: &'m LineMap) -> Self {
        Self {
            line_map: Some(line_map),
        }
    }

    fn node(&self, data: NodeData) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("type".into(), Value::from(data.kind.node_type_name()));
        self.put_range(&mut map, data.range);
        map
    }

    fn put_range(&self, map: &mut Map<String, Value>, range: TextRange) {
        map.insert("range".into(), json!([range.pos, range.end]));
        if let Some(line_map) = self.line_map {
            let start = line_map.position_of(range.pos);
            let end = line_map.position_of(range.end);
            map.insert(
                "loc".into(),
                json!({
                    "start": { "line": start.line, "column": start.column },
                    "end": { "line": end.line, "column": end.column },
                }),
            );
        }
    }

    fn opt<T>(&self, value: Option<T>, f: impl FnOnce(T) -> Value) -> Value {
        value.map(f).unwrap_or(Value::Null)
    }

    // ========================================================================
    // QML
    // ========================================================================

    pub fn program(&self, node: &Program<'_>) -> Value {
        let mut map = self.node(node.data);
        let mut header = self.node(node.header_statements.data);
        header.insert(
            "statements".into(),
            node.header_statements
                .statements
                .iter()
                .map(|s| self.header_statement(s))
                .collect(),
        );
        map.insert("headerStatements".into(), Value::Object(header));
        map.insert(
            "rootObject".into(),
            self.opt(node.root_object, |o| self.object_literal(o)),
        );
        Value::Object(map)
    }

    fn header_statement(&self, node: &HeaderStatement<'_>) -> Value {
        match node {
            HeaderStatement::Import(import) => {
                let mut map = self.node(import.data);
                match &import.source {
                    ImportSource::Module(module) => {
                        let mut m = self.node(module.data);
                        m.insert("id".into(), self.qualified_id(&module.id));
                        m.insert("version".into(), self.version_literal(&module.version));
                        map.insert("module".into(), Value::Object(m));
                    }
                    ImportSource::Directory(lit) => {
                        map.insert("directory".into(), self.literal(lit));
                    }
                }
                map.insert(
                    "qualifier".into(),
                    self.opt(import.qualifier.as_ref(), |q| self.identifier(q)),
                );
                Value::Object(map)
            }
            HeaderStatement::Pragma(pragma) => {
                let mut map = self.node(pragma.data);
                map.insert("id".into(), self.qualified_id(&pragma.id));
                Value::Object(map)
            }
        }
    }

    fn version_literal(&self, node: &VersionLiteral<'_>) -> Value {
        let mut map = self.node(node.data);
        map.insert("major".into(), Value::from(node.major));
        map.insert("minor".into(), Value::from(node.minor));
        map.insert("value".into(), number(node.value));
        map.insert("raw".into(), Value::from(node.raw));
        Value::Object(map)
    }

    pub fn object_literal(&self, node: &ObjectLiteral<'_>) -> Value {
        let mut map = self.node(node.data);
        map.insert("id".into(), self.qualified_id(&node.id));
        map.insert("block".into(), self.member_block(&node.block));
        Value::Object(map)
    }

    fn member_block(&self, node: &MemberBlock<'_>) -> Value {
        let mut block = self.node(node.data);
        block.insert(
            "members".into(),
            node.members.iter().map(|m| self.member(m)).collect(),
        );
        Value::Object(block)
    }

    fn member(&self, node: &Member<'_>) -> Value {
        match node {
            Member::Property(prop) => {
                let mut map = self.node(prop.data);
                map.insert("default".into(), Value::from(prop.is_default));
                map.insert("readonly".into(), Value::from(prop.is_readonly));
                map.insert("kind".into(), self.property_type(&prop.kind));
                if let Some(modifier) = &prop.modifier {
                    map.insert("modifier".into(), self.property_type(modifier));
                }
                map.insert("id".into(), self.identifier(&prop.id));
                map.insert(
                    "init".into(),
                    self.opt(prop.binding.as_ref(), |b| self.binding(b)),
                );
                Value::Object(map)
            }
            Member::Binding(binding) => {
                let mut map = self.node(binding.data);
                map.insert("id".into(), self.qualified_id(&binding.id));
                map.insert("expr".into(), self.binding(&binding.binding));
                Value::Object(map)
            }
            Member::Signal(signal) => {
                let mut map = self.node(signal.data);
                map.insert("id".into(), self.identifier(&signal.id));
                map.insert(
                    "params".into(),
                    signal
                        .params
                        .iter()
                        .map(|p| {
                            let mut param = self.node(p.data);
                            param.insert("kind".into(), self.property_type(&p.kind));
                            param.insert("id".into(), self.identifier(&p.id));
                            Value::Object(param)
                        })
                        .collect(),
                );
                Value::Object(map)
            }
            Member::Object(obj) => self.object_literal(obj),
            Member::Function(func) => self.function(func),
            Member::Modifier(modifier) => {
                let mut map = self.node(modifier.data);
                map.insert("kind".into(), self.qualified_id(&modifier.kind));
                map.insert("id".into(), self.qualified_id(&modifier.id));
                map.insert("block".into(), self.member_block(&modifier.block));
                Value::Object(map)
            }
        }
    }

    fn property_type(&self, node: &PropertyType<'_>) -> Value {
        match node {
            PropertyType::Builtin(id) => Value::from(id.name),
            PropertyType::Named(qid) => self.qualified_id(qid),
        }
    }

    fn binding(&self, node: &Binding<'_>) -> Value {
        match node {
            Binding::Expression(expr) => self.expression(expr),
            Binding::Block(block) => {
                let mut map = self.node(block.data);
                map.insert("body".into(), self.statements(block.body));
                Value::Object(map)
            }
            Binding::Object(obj) => self.object_literal(obj),
            Binding::Array(array) => {
                let mut map = self.node(array.data);
                map.insert(
                    "elements".into(),
                    array.elements.iter().map(|e| self.object_literal(e)).collect(),
                );
                Value::Object(map)
            }
        }
    }

    pub fn qualified_id(&self, node: &QualifiedId<'_>) -> Value {
        let mut map = self.node(node.data);
        map.insert(
            "parts".into(),
            node.parts.iter().map(|p| self.identifier(p)).collect(),
        );
        map.insert("name".into(), Value::from(node.name));
        Value::Object(map)
    }

    // ========================================================================
    // JavaScript
    // ========================================================================

    pub fn identifier(&self, node: &Identifier<'_>) -> Value {
        let mut map = self.node(node.data);
        map.insert("name".into(), Value::from(node.name));
        Value::Object(map)
    }

    pub fn literal(&self, node: &Literal<'_>) -> Value {
        let mut map = self.node(node.data);
        let value = match node.value {
            LiteralValue::Null => Value::Null,
            LiteralValue::Boolean(b) => Value::from(b),
            LiteralValue::Number(n) => number(n),
            LiteralValue::String(s) => Value::from(s),
            LiteralValue::RegExp { .. } => Value::Null,
        };
        map.insert("value".into(), value);
        map.insert("raw".into(), Value::from(node.raw));
        if let LiteralValue::RegExp { pattern, flags } = node.value {
            map.insert("regex".into(), json!({ "pattern": pattern, "flags": flags }));
        }
        Value::Object(map)
    }

    fn function(&self, node: &Function<'_>) -> Value {
        let mut map = self.node(node.data);
        map.insert("id".into(), self.opt(node.id.as_ref(), |id| self.identifier(id)));
        map.insert(
            "params".into(),
            node.params.iter().map(|p| self.identifier(p)).collect(),
        );
        map.insert("body".into(), self.block_statement(node.body));
        Value::Object(map)
    }

    fn block_statement(&self, node: &BlockStatement<'_>) -> Value {
        let mut map = self.node(node.data);
        map.insert("body".into(), self.statements(node.body));
        Value::Object(map)
    }

    fn statements(&self, stmts: &[Statement<'_>]) -> Value {
        stmts.iter().map(|s| self.statement(s)).collect()
    }

    fn variable_declaration(&self, node: &VariableDeclaration<'_>) -> Value {
        let mut map = self.node(node.data);
        map.insert(
            "declarations".into(),
            node.declarations
                .iter()
                .map(|d| {
                    let mut decl = self.node(d.data);
                    decl.insert("id".into(), self.identifier(&d.id));
                    decl.insert("init".into(), self.opt(d.init.as_ref(), |e| self.expression(e)));
                    Value::Object(decl)
                })
                .collect(),
        );
        map.insert("kind".into(), Value::from("var"));
        Value::Object(map)
    }

    fn for_init(&self, node: &ForInit<'_>) -> Value {
        match node {
            ForInit::Declaration(decl) => self.variable_declaration(decl),
            ForInit::Expression(expr) => self.expression(expr),
        }
    }

    pub fn statement(&self, node: &Statement<'_>) -> Value {
        let mut map = self.node(node.data());
        match node {
            Statement::Expression(n) => {
                map.insert("expression".into(), self.expression(&n.expression));
            }
            Statement::Block(n) => return self.block_statement(n),
            Statement::Empty(_) | Statement::Debugger(_) => {}
            Statement::With(n) => {
                map.insert("object".into(), self.expression(&n.object));
                map.insert("body".into(), self.statement(&n.body));
            }
            Statement::Return(n) => {
                map.insert("argument".into(), self.opt(n.argument.as_ref(), |e| self.expression(e)));
            }
            Statement::Labeled(n) => {
                map.insert("label".into(), self.identifier(&n.label));
                map.insert("body".into(), self.statement(&n.body));
            }
            Statement::Break(n) | Statement::Continue(n) => {
                map.insert("label".into(), self.opt(n.label.as_ref(), |l| self.identifier(l)));
            }
            Statement::If(n) => {
                map.insert("test".into(), self.expression(&n.test));
                map.insert("consequent".into(), self.statement(&n.consequent));
                map.insert("alternate".into(), self.opt(n.alternate.as_ref(), |s| self.statement(s)));
            }
            Statement::Switch(n) => {
                map.insert("discriminant".into(), self.expression(&n.discriminant));
                map.insert(
                    "cases".into(),
                    n.cases
                        .iter()
                        .map(|c| {
                            let mut case = self.node(c.data);
                            case.insert("test".into(), self.opt(c.test.as_ref(), |e| self.expression(e)));
                            case.insert("consequent".into(), self.statements(c.consequent));
                            Value::Object(case)
                        })
                        .collect(),
                );
            }
            Statement::Throw(n) => {
                map.insert("argument".into(), self.expression(&n.argument));
            }
            Statement::Try(n) => {
                map.insert("block".into(), self.block_statement(n.block));
                map.insert(
                    "handler".into(),
                    self.opt(n.handler, |h| {
                        let mut handler = self.node(h.data);
                        handler.insert("param".into(), self.identifier(&h.param));
                        handler.insert("body".into(), self.block_statement(h.body));
                        Value::Object(handler)
                    }),
                );
                map.insert("finalizer".into(), self.opt(n.finalizer, |f| self.block_statement(f)));
            }
            Statement::While(n) | Statement::DoWhile(n) => {
                map.insert("test".into(), self.expression(&n.test));
                map.insert("body".into(), self.statement(&n.body));
            }
            Statement::For(n) => {
                map.insert("init".into(), self.opt(n.init.as_ref(), |i| self.for_init(i)));
                map.insert("test".into(), self.opt(n.test.as_ref(), |e| self.expression(e)));
                map.insert("update".into(), self.opt(n.update.as_ref(), |e| self.expression(e)));
                map.insert("body".into(), self.statement(&n.body));
            }
            Statement::ForIn(n) => {
                map.insert("left".into(), self.for_init(&n.left));
                map.insert("right".into(), self.expression(&n.right));
                map.insert("body".into(), self.statement(&n.body));
            }
            Statement::FunctionDeclaration(f) => return self.function(f),
            Statement::VariableDeclaration(n) => return self.variable_declaration(n),
        }
        Value::Object(map)
    }

    pub fn expression(&self, node: &Expression<'_>) -> Value {
        let mut map = self.node(node.data());
        match node {
            Expression::Identifier(id) => return self.identifier(id),
            Expression::Literal(lit) => return self.literal(lit),
            Expression::This(_) => {}
            Expression::Array(n) => {
                map.insert(
                    "elements".into(),
                    n.elements
                        .iter()
                        .map(|e| self.opt(e.as_ref(), |e| self.expression(e)))
                        .collect(),
                );
            }
            Expression::Object(n) => {
                map.insert(
                    "properties".into(),
                    n.properties
                        .iter()
                        .map(|p| {
                            let mut prop = self.node(p.data);
                            let key = match &p.key {
                                PropertyKey::Identifier(id) => self.identifier(id),
                                PropertyKey::Literal(lit) => self.literal(lit),
                            };
                            prop.insert("key".into(), key);
                            prop.insert("value".into(), self.expression(&p.value));
                            prop.insert("kind".into(), Value::from(p.kind.as_str()));
                            Value::Object(prop)
                        })
                        .collect(),
                );
            }
            Expression::Function(f) => return self.function(f),
            Expression::Unary(n) => {
                map.insert("operator".into(), Value::from(n.operator.operator_text()));
                map.insert("prefix".into(), Value::from(true));
                map.insert("argument".into(), self.expression(&n.argument));
            }
            Expression::Update(n) => {
                map.insert("operator".into(), Value::from(n.operator.operator_text()));
                map.insert("prefix".into(), Value::from(n.prefix));
                map.insert("argument".into(), self.expression(&n.argument));
            }
            Expression::Binary(n) => {
                map.insert("left".into(), self.expression(&n.left));
                map.insert("operator".into(), Value::from(n.operator.operator_text()));
                map.insert("right".into(), self.expression(&n.right));
            }
            Expression::Assignment(n) => {
                map.insert("operator".into(), Value::from(n.operator.operator_text()));
                map.insert("left".into(), self.expression(&n.left));
                map.insert("right".into(), self.expression(&n.right));
            }
            Expression::Conditional(n) => {
                map.insert("test".into(), self.expression(&n.test));
                map.insert("consequent".into(), self.expression(&n.consequent));
                map.insert("alternate".into(), self.expression(&n.alternate));
            }
            Expression::Call(n) => {
                map.insert("callee".into(), self.expression(&n.callee));
                map.insert(
                    "arguments".into(),
                    n.arguments.iter().map(|a| self.expression(a)).collect(),
                );
            }
            Expression::Member(n) => {
                map.insert("object".into(), self.expression(&n.object));
                map.insert("property".into(), self.expression(&n.property));
                map.insert("computed".into(), Value::from(n.computed));
            }
            Expression::Sequence(n) => {
                map.insert(
                    "expressions".into(),
                    n.expressions.iter().map(|e| self.expression(e)).collect(),
                );
            }
        }
        Value::Object(map)
    }
}

impl Default for AstSerializer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Integral values are emitted as JSON integers so that `3` stays `3`.
fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_keeps_integers_integral() {
        assert_eq!(number(3.0), json!(3));
        assert_eq!(number(2.5), json!(2.5));
        assert_eq!(number(f64::NAN), Value::Null);
    }

    #[test]
    fn test_identifier_with_locations() {
        let map = LineMap::new("a\n  width");
        let ser = AstSerializer::with_locations(&map);
        let value = ser.identifier(&Identifier::new(4, 9, "width"));
        assert_eq!(value["type"], "Identifier");
        assert_eq!(value["range"], json!([4, 9]));
        assert_eq!(value["loc"]["start"], json!({"line": 2, "column": 2}));
        assert_eq!(value["loc"]["end"], json!({"line": 2, "column": 7}));
        assert_eq!(value["name"], "width");
    }
}
