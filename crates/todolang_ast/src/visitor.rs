//! AST visitor trait for traversing the syntax tree.
//!
//! Implement [`AstVisitor`] and override the methods for the node kinds of
//! interest. Default implementations walk into every child; an override
//! that still wants to descend has to visit the children itself.

use crate::node::*;

/// A visitor that traverses the AST. Default implementations walk into children.
pub trait AstVisitor<'a> {
    fn visit_program(&mut self, node: &Program<'a>) {
        for decl in node.declarations.iter() {
            self.visit_declaration(decl);
        }
    }

    fn visit_declaration(&mut self, decl: &Declaration<'a>) {
        match decl {
            Declaration::Component(n) => self.visit_component_declaration(n),
            Declaration::Model(n) => self.visit_model_declaration(n),
            Declaration::Service(n) => self.visit_service_declaration(n),
        }
    }

    // -- Declarations --

    fn visit_component_declaration(&mut self, node: &ComponentDeclaration<'a>) {
        self.visit_identifier(&node.name);
        if let Some(state) = node.state {
            self.visit_state_block(state);
        }
        for method in node.methods.iter() {
            self.visit_method_declaration(method);
        }
        for computed in node.computed.iter() {
            self.visit_computed_declaration(computed);
        }
        if let Some(render) = node.render {
            self.visit_render_block(render);
        }
    }

    fn visit_model_declaration(&mut self, node: &ModelDeclaration<'a>) {
        self.visit_identifier(&node.name);
        for prop in node.properties.iter() {
            self.visit_property_declaration(prop);
        }
        for method in node.methods.iter() {
            self.visit_method_declaration(method);
        }
    }

    fn visit_service_declaration(&mut self, node: &ServiceDeclaration<'a>) {
        self.visit_identifier(&node.name);
        for method in node.methods.iter() {
            self.visit_method_declaration(method);
        }
    }

    // -- Members --

    fn visit_state_block(&mut self, node: &StateBlock<'a>) {
        for prop in node.properties.iter() {
            self.visit_property_declaration(prop);
        }
    }

    fn visit_property_declaration(&mut self, node: &PropertyDeclaration<'a>) {
        self.visit_identifier(&node.name);
        self.visit_type_node(&node.type_annotation);
        if let Some(init) = node.default_value {
            self.visit_expression(init);
        }
    }

    fn visit_method_declaration(&mut self, node: &MethodDeclaration<'a>) {
        self.visit_identifier(&node.name);
        for param in node.parameters.iter() {
            self.visit_parameter(param);
        }
        if let Some(ref ret) = node.return_type {
            self.visit_type_node(ret);
        }
        for stmt in node.body.iter() {
            self.visit_statement(stmt);
        }
    }

    fn visit_parameter(&mut self, node: &Parameter<'a>) {
        self.visit_identifier(&node.name);
        if let Some(ref ty) = node.type_annotation {
            self.visit_type_node(ty);
        }
    }

    fn visit_computed_declaration(&mut self, node: &ComputedDeclaration<'a>) {
        self.visit_identifier(&node.name);
        if let Some(ref ret) = node.return_type {
            self.visit_type_node(ret);
        }
        for stmt in node.body.iter() {
            self.visit_statement(stmt);
        }
    }

    fn visit_render_block(&mut self, node: &RenderBlock<'a>) {
        for stmt in node.body.iter() {
            self.visit_statement(stmt);
        }
    }

    fn visit_type_node(&mut self, _node: &TypeNode<'a>) {}

    // -- Statements --

    fn visit_statement(&mut self, stmt: &Statement<'a>) {
        match stmt {
            Statement::Block(n) => self.visit_block(n),
            Statement::ExpressionStatement(n) => self.visit_expression(n.expression),
            Statement::IfStatement(n) => self.visit_if_statement(n),
            Statement::ForStatement(n) => self.visit_for_statement(n),
            Statement::WhileStatement(n) => self.visit_while_statement(n),
            Statement::ReturnStatement(n) => {
                if let Some(expr) = n.expression {
                    self.visit_expression(expr);
                }
            }
        }
    }

    fn visit_block(&mut self, node: &Block<'a>) {
        for stmt in node.statements.iter() {
            self.visit_statement(stmt);
        }
    }

    fn visit_if_statement(&mut self, node: &IfStatement<'a>) {
        self.visit_expression(node.condition);
        self.visit_statement(node.then_statement);
        if let Some(else_stmt) = node.else_statement {
            self.visit_statement(else_stmt);
        }
    }

    fn visit_for_statement(&mut self, node: &ForStatement<'a>) {
        if let Some(init) = node.initializer {
            self.visit_expression(init);
        }
        if let Some(cond) = node.condition {
            self.visit_expression(cond);
        }
        if let Some(update) = node.update {
            self.visit_expression(update);
        }
        self.visit_statement(node.body);
    }

    fn visit_while_statement(&mut self, node: &WhileStatement<'a>) {
        self.visit_expression(node.condition);
        self.visit_statement(node.body);
    }

    // -- Expressions --

    fn visit_expression(&mut self, expr: &Expression<'a>) {
        match expr {
            Expression::Identifier(n) => self.visit_identifier(n),
            Expression::StringLiteral(_)
            | Expression::NumericLiteral(_)
            | Expression::BooleanLiteral(_)
            | Expression::NullLiteral(_)
            | Expression::This(_) => {}
            Expression::ArrayLiteral(n) => {
                for elem in n.elements.iter() {
                    self.visit_expression(elem);
                }
            }
            Expression::ObjectLiteral(n) => {
                for prop in n.properties.iter() {
                    self.visit_expression(prop.value);
                }
            }
            Expression::Member(n) => {
                self.visit_expression(n.object);
                self.visit_expression(n.property);
            }
            Expression::Call(n) => {
                self.visit_expression(n.callee);
                for arg in n.arguments.iter() {
                    self.visit_expression(arg);
                }
            }
            Expression::Unary(n) => self.visit_expression(n.operand),
            Expression::Binary(n) => {
                self.visit_expression(n.left);
                self.visit_expression(n.right);
            }
            Expression::Conditional(n) => {
                self.visit_expression(n.condition);
                self.visit_expression(n.true_expr);
                self.visit_expression(n.false_expr);
            }
            Expression::Assignment(n) => {
                self.visit_expression(n.target);
                self.visit_expression(n.right);
            }
            Expression::Markup(n) => self.visit_markup_element(n),
        }
    }

    fn visit_identifier(&mut self, _node: &Identifier<'a>) {}

    // -- Markup --

    fn visit_markup_element(&mut self, node: &MarkupElement<'a>) {
        for attr in node.attributes.iter() {
            if let Some(value) = attr.value {
                self.visit_expression(value);
            }
        }
        for child in node.children.iter() {
            match child {
                MarkupChild::Text(_) => {}
                MarkupChild::Expression(n) => self.visit_expression(n.expression),
                MarkupChild::Element(n) => self.visit_markup_element(n),
            }
        }
    }
}
