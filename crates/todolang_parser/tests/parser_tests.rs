//! Parser integration tests.
//!
//! Verifies that the parser correctly builds AST structures from TodoLang source.

use bumpalo::Bump;
use todolang_ast::*;
use todolang_core::text::{Location, TextSpan};
use todolang_diagnostics::{ParseError, ParseErrorKind};
use todolang_lexer::tokenize;
use todolang_parser::{Parser, MAX_NESTING_DEPTH};

/// Helper: parse source text and hand the program to `check`.
fn with_program<R>(source: &str, check: impl FnOnce(&Program<'_>) -> R) -> R {
    let arena = Bump::new();
    let tokens = tokenize(source).expect("source should tokenize");
    let program = Parser::new(&arena, tokens)
        .parse()
        .unwrap_or_else(|e| panic!("parse failed for {:?}: {}", source, e));
    check(&program)
}

fn parse_err(source: &str) -> ParseError {
    let arena = Bump::new();
    let tokens = tokenize(source).expect("source should tokenize");
    match Parser::new(&arena, tokens).parse() {
        Ok(_) => panic!("expected a parse error for {:?}", source),
        Err(e) => e,
    }
}

/// Helper: parse `source` as the body of a method and return the first statement's
/// expression.
fn with_expression<R>(expr: &str, check: impl FnOnce(&Expression<'_>) -> R) -> R {
    let source = format!("service S {{ run() {{ {}; }} }}", expr);
    with_program(&source, |program| {
        let service = program.declarations[0].as_service().expect("service");
        match &service.methods[0].body[0] {
            Statement::ExpressionStatement(stmt) => check(stmt.expression),
            other => panic!("expected expression statement, got {:?}", other),
        }
    })
}

/// Helper: the first `return` expression of a component's render block.
fn with_render_markup<R>(markup: &str, check: impl FnOnce(&MarkupElement<'_>) -> R) -> R {
    let source = format!("component C {{ render {{ return {}; }} }}", markup);
    with_program(&source, |program| {
        let component = program.declarations[0].as_component().expect("component");
        let render = component.render.expect("render block");
        match &render.body[0] {
            Statement::ReturnStatement(ReturnStatement {
                expression: Some(Expression::Markup(element)),
                ..
            }) => check(element),
            other => panic!("expected markup return, got {:?}", other),
        }
    })
}

fn ident_name<'e>(expr: &'e Expression<'_>) -> &'e str {
    expr.as_identifier().map(|id| id.name).expect("identifier")
}

// ============================================================================
// Declarations
// ============================================================================

#[test]
fn test_parse_empty_program() {
    with_program("", |program| assert!(program.declarations.is_empty()));
    with_program("// only a comment\n", |program| assert!(program.declarations.is_empty()));
}

#[test]
fn test_parse_three_declaration_kinds() {
    let source = "component App { } model Todo { } service Api { }";
    with_program(source, |program| {
        let kinds: Vec<SyntaxKind> = program.declarations.iter().map(Declaration::kind).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::ComponentDeclaration,
                SyntaxKind::ModelDeclaration,
                SyntaxKind::ServiceDeclaration
            ]
        );
        let names: Vec<&str> = program.declarations.iter().map(|d| d.name().name).collect();
        assert_eq!(names, vec!["App", "Todo", "Api"]);
    });
}

#[test]
fn test_parse_component_members_in_any_order() {
    let source = r#"
        component TodoList {
            addTodo(text: string) { this.todos.push(text); }
            render { return <ul></ul>; }
            computed remaining: number { return this.todos.length; }
            state {
                todos: string[] = [];
                draft: string = "";
            }
        }
    "#;
    with_program(source, |program| {
        let component = program.declarations[0].as_component().expect("component");
        assert_eq!(component.name.name, "TodoList");
        let state = component.state.expect("state");
        assert_eq!(state.properties.len(), 2);
        assert_eq!(state.properties[0].name.name, "todos");
        assert!(state.properties[0].type_annotation.is_array);
        assert_eq!(component.methods.len(), 1);
        assert!(component.method("addTodo").is_some());
        assert_eq!(component.computed.len(), 1);
        assert_eq!(component.computed[0].name.name, "remaining");
        assert!(component.render.is_some());
    });
}

#[test]
fn test_parse_model_properties_and_methods() {
    let source = r#"
        model Todo {
            id: number
            text: string,
            owner: User?
            tags: string[]?;
            toggle() { this.done = !this.done; }
            static create(text: string): Todo { return { text }; }
        }
    "#;
    with_program(source, |program| {
        let model = program.declarations[0].as_model().expect("model");
        assert_eq!(model.properties.len(), 4);
        let owner = model.property("owner").expect("owner");
        assert_eq!(owner.type_annotation.name, "User");
        assert!(owner.type_annotation.is_optional);
        assert!(!owner.type_annotation.is_array);
        let tags = model.property("tags").expect("tags");
        assert!(tags.type_annotation.is_array && tags.type_annotation.is_optional);

        assert_eq!(model.methods.len(), 2);
        assert!(!model.methods[0].is_static());
        let create = &model.methods[1];
        assert!(create.is_static());
        assert_eq!(create.parameters[0].name.name, "text");
        assert_eq!(create.return_type.as_ref().map(|t| t.name), Some("Todo"));
    });
}

#[test]
fn test_parse_service_methods() {
    let source = "service TodoApi { fetchAll(url, retries: number,) { return; } }";
    with_program(source, |program| {
        let service = program.declarations[0].as_service().expect("service");
        let method = &service.methods[0];
        assert_eq!(method.parameters.len(), 2);
        assert!(method.parameters[0].type_annotation.is_none());
        assert_eq!(method.parameters[1].type_annotation.as_ref().map(|t| t.name), Some("number"));
        assert!(matches!(
            method.body[0],
            Statement::ReturnStatement(ReturnStatement { expression: None, .. })
        ));
    });
}

#[test]
fn test_declaration_positions() {
    with_program("\n\n  model Todo {\n  }", |program| {
        let model = &program.declarations[0];
        assert_eq!(model.data().location, Location::new(3, 3));
        assert_eq!(model.name().data.location, Location::new(3, 9));
    });
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_parse_control_flow() {
    let source = r#"
        service S {
            run() {
                if (a) { b(); } else if (c) d(); else { }
                for (i = 0; i < 10; i++) { total += i; }
                for (;;) ;
                while (running) step();
                return total;
            }
        }
    "#;
    with_program(source, |program| {
        let body = program.declarations[0].as_service().expect("service").methods[0].body;
        let kinds: Vec<SyntaxKind> = body.iter().map(Statement::kind).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::IfStatement,
                SyntaxKind::ForStatement,
                SyntaxKind::ForStatement,
                SyntaxKind::WhileStatement,
                SyntaxKind::ReturnStatement,
            ]
        );
        match &body[0] {
            Statement::IfStatement(stmt) => {
                assert!(matches!(stmt.else_statement, Some(Statement::IfStatement(_))));
            }
            other => panic!("expected if, got {:?}", other),
        }
        match &body[2] {
            Statement::ForStatement(stmt) => {
                assert!(stmt.initializer.is_none() && stmt.condition.is_none() && stmt.update.is_none());
                assert!(matches!(stmt.body, Statement::Block(Block { statements: [], .. })));
            }
            other => panic!("expected for, got {:?}", other),
        }
    });
}

#[test]
fn test_stray_semicolons_are_skipped() {
    with_program("service S { ; run() { ;; x; ; } }", |program| {
        let service = program.declarations[0].as_service().expect("service");
        assert_eq!(service.methods[0].body.len(), 1);
    });
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_multiplicative_binds_tighter_than_additive() {
    with_expression("result = a + b * c", |expr| {
        let Expression::Assignment(assign) = expr else {
            panic!("expected assignment, got {:?}", expr);
        };
        assert_eq!(ident_name(assign.target), "result");
        assert_eq!(assign.operator, AssignmentOperator::Assign);
        let Expression::Binary(add) = assign.right else {
            panic!("expected binary");
        };
        assert_eq!(add.operator, BinaryOperator::Add);
        assert_eq!(ident_name(add.left), "a");
        let Expression::Binary(mul) = add.right else {
            panic!("expected binary");
        };
        assert_eq!(mul.operator, BinaryOperator::Multiply);
        assert_eq!(ident_name(mul.left), "b");
        assert_eq!(ident_name(mul.right), "c");
    });
}

#[test]
fn test_binary_operators_are_left_associative() {
    with_expression("a - b - c", |expr| {
        let Expression::Binary(outer) = expr else { panic!("expected binary") };
        assert_eq!(ident_name(outer.right), "c");
        assert!(matches!(outer.left, Expression::Binary(inner) if ident_name(inner.right) == "b"));
    });
}

#[test]
fn test_assignment_is_right_associative() {
    with_expression("a = b += c", |expr| {
        let Expression::Assignment(outer) = expr else { panic!("expected assignment") };
        assert_eq!(ident_name(outer.target), "a");
        let Expression::Assignment(inner) = outer.right else { panic!("expected assignment") };
        assert_eq!(inner.operator, AssignmentOperator::AddAssign);
        assert_eq!(ident_name(inner.target), "b");
    });
}

#[test]
fn test_logical_precedence() {
    with_expression("a || b && c == d < e", |expr| {
        let Expression::Binary(or) = expr else { panic!("expected binary") };
        assert_eq!(or.operator, BinaryOperator::LogicalOr);
        let Expression::Binary(and) = or.right else { panic!("expected binary") };
        assert_eq!(and.operator, BinaryOperator::LogicalAnd);
        let Expression::Binary(eq) = and.right else { panic!("expected binary") };
        assert_eq!(eq.operator, BinaryOperator::Equal);
        assert!(matches!(eq.right, Expression::Binary(lt) if lt.operator == BinaryOperator::LessThan));
    });
}

#[test]
fn test_conditional_expression() {
    with_expression("done ? \"yes\" : count > 0 ? \"some\" : \"none\"", |expr| {
        let Expression::Conditional(cond) = expr else { panic!("expected conditional") };
        assert_eq!(ident_name(cond.condition), "done");
        assert!(matches!(cond.true_expr, Expression::StringLiteral(s) if s.value == "yes"));
        assert!(matches!(cond.false_expr, Expression::Conditional(_)));
    });
}

#[test]
fn test_unary_and_postfix() {
    with_expression("!-x", |expr| {
        let Expression::Unary(not) = expr else { panic!("expected unary") };
        assert_eq!(not.operator, UnaryOperator::Not);
        assert!(not.is_prefix);
        assert!(matches!(not.operand, Expression::Unary(neg) if neg.operator == UnaryOperator::Negate));
    });
    with_expression("this.count++", |expr| {
        let Expression::Unary(inc) = expr else { panic!("expected unary") };
        assert_eq!(inc.operator, UnaryOperator::Increment);
        assert!(!inc.is_prefix);
        assert_eq!(inc.data.kind, SyntaxKind::PostfixUnaryExpression);
        assert!(matches!(inc.operand, Expression::Member(_)));
    });
    // Only update operators are postfix.
    with_expression("count - 1", |expr| {
        let Expression::Binary(sub) = expr else { panic!("expected binary") };
        assert_eq!(sub.operator, BinaryOperator::Subtract);
    });
}

#[test]
fn test_member_and_call_chains() {
    with_expression("this.todos[index].save(true, null)", |expr| {
        let Expression::Call(call) = expr else { panic!("expected call") };
        assert_eq!(call.arguments.len(), 2);
        let Expression::Member(save) = call.callee else { panic!("expected member") };
        assert!(!save.computed);
        assert_eq!(ident_name(save.property), "save");
        let Expression::Member(index) = save.object else { panic!("expected member") };
        assert!(index.computed);
        let Expression::Member(todos) = index.object else { panic!("expected member") };
        assert!(matches!(todos.object, Expression::This(_)));
    });
}

#[test]
fn test_keyword_allowed_as_member_name() {
    with_expression("this.state.render", |expr| {
        let Expression::Member(member) = expr else { panic!("expected member") };
        assert_eq!(ident_name(member.property), "render");
    });
}

#[test]
fn test_literals() {
    with_expression("[1, 3.50, \"s\", true, false, null,]", |expr| {
        let Expression::ArrayLiteral(array) = expr else { panic!("expected array") };
        assert_eq!(array.elements.len(), 6);
        match &array.elements[1] {
            Expression::NumericLiteral(n) => {
                assert_eq!(n.text, "3.50");
                assert_eq!(n.value, 3.5);
            }
            other => panic!("expected number, got {:?}", other),
        }
        assert!(matches!(array.elements[3], Expression::BooleanLiteral(BooleanLiteral { value: true, .. })));
        assert!(matches!(array.elements[5], Expression::NullLiteral(_)));
    });
}

#[test]
fn test_object_literal() {
    with_expression("x = { text, done: false, \"with space\": 1, if: 2, }", |expr| {
        let Expression::Assignment(assign) = expr else { panic!("expected assignment") };
        let Expression::ObjectLiteral(object) = assign.right else { panic!("expected object") };
        let keys: Vec<&str> = object.properties.iter().map(|p| p.key).collect();
        assert_eq!(keys, vec!["text", "done", "with space", "if"]);
        assert!(object.properties[0].shorthand);
        assert_eq!(ident_name(object.properties[0].value), "text");
        assert!(!object.properties[1].shorthand);
    });
}

#[test]
fn test_parenthesized_expression_has_no_wrapper() {
    with_expression("(a + b) * c", |expr| {
        let Expression::Binary(mul) = expr else { panic!("expected binary") };
        assert_eq!(mul.operator, BinaryOperator::Multiply);
        assert!(matches!(mul.left, Expression::Binary(add) if add.operator == BinaryOperator::Add));
    });
}

#[test]
fn test_parenthesized_operand_starts_at_open_paren() {
    // `service S { run() { ` is 20 bytes.
    with_expression("(a + b) * c", |expr| {
        assert_eq!(expr.location(), Location::new(1, 21));
        assert_eq!(expr.span(), TextSpan::new(20, 11));
        let Expression::Binary(mul) = expr else { panic!("expected binary") };
        assert_eq!(mul.left.location(), Location::new(1, 21));
        assert_eq!(mul.left.span(), TextSpan::new(20, 7));
    });
    with_expression("(f)(x).y = (z)", |expr| {
        let Expression::Assignment(assign) = expr else { panic!("expected assignment") };
        assert_eq!(assign.data.location, Location::new(1, 21));
        assert_eq!(assign.target.location(), Location::new(1, 21));
        assert_eq!(assign.right.span(), TextSpan::new(31, 3));
    });
}

// ============================================================================
// Markup
// ============================================================================

#[test]
fn test_markup_with_text_and_splices() {
    with_render_markup("<p class=\"greeting\">Hello world, {name}!</p>", |element| {
        assert_eq!(element.tag_name, "p");
        assert!(!element.self_closing);
        assert_eq!(element.attributes[0].name, "class");
        assert!(matches!(element.attributes[0].value, Some(Expression::StringLiteral(s)) if s.value == "greeting"));
        assert_eq!(element.children.len(), 3);
        assert!(matches!(&element.children[0], MarkupChild::Text(t) if t.text == "Hello world,"));
        assert!(matches!(&element.children[1], MarkupChild::Expression(e) if ident_name(e.expression) == "name"));
        assert!(matches!(&element.children[2], MarkupChild::Text(t) if t.text == "!"));
    });
}

#[test]
fn test_markup_nested_and_self_closing() {
    let markup = r#"<ul>
        <li onClick={this.select(todo)}>{todo.text}</li>
        <input type="checkbox" checked disabled={false} />
    </ul>"#;
    with_render_markup(markup, |element| {
        assert_eq!(element.children.len(), 2);
        let MarkupChild::Element(li) = &element.children[0] else { panic!("expected element") };
        assert_eq!(li.tag_name, "li");
        assert!(matches!(li.attributes[0].value, Some(Expression::Call(_))));
        let MarkupChild::Element(input) = &element.children[1] else { panic!("expected element") };
        assert!(input.self_closing);
        assert_eq!(input.data.kind, SyntaxKind::MarkupSelfClosingElement);
        let names: Vec<&str> = input.attributes.iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["type", "checked", "disabled"]);
        assert!(input.attributes[1].value.is_none());
    });
}

#[test]
fn test_markup_text_keeps_quotes_when_source_is_known() {
    let source = r#"component C { render { return <p>Say "hi" to 'you', 1.50!</p>; } }"#;
    let text_of = |program: &Program<'_>| -> String {
        let render = program.declarations[0].as_component().and_then(|c| c.render).expect("render");
        match &render.body[0] {
            Statement::ReturnStatement(ReturnStatement {
                expression: Some(Expression::Markup(p)),
                ..
            }) => match &p.children[0] {
                MarkupChild::Text(t) => t.text.to_string(),
                other => panic!("expected text, got {:?}", other),
            },
            other => panic!("expected markup return, got {:?}", other),
        }
    };

    let arena = Bump::new();
    let tokens = tokenize(source).expect("tokenize");
    let program = Parser::with_source(&arena, tokens.clone(), source).parse().expect("parse");
    assert_eq!(text_of(&program), r#"Say "hi" to 'you', 1.50!"#);

    // Without the source only decoded token values are available.
    let program = Parser::new(&arena, tokens).parse().expect("parse");
    assert_eq!(text_of(&program), "Say hi to you, 1.50!");
}

#[test]
fn test_empty_markup_splice_is_dropped() {
    with_render_markup("<div>{}</div>", |element| assert!(element.children.is_empty()));
}

#[test]
fn test_markup_tag_mismatch() {
    let err = parse_err("component C { render { return <div><span>x</div></div>; } }");
    assert_eq!(
        err.kind,
        ParseErrorKind::MismatchedClosingTag {
            expected: "span".to_string(),
            found: "div".to_string()
        }
    );
    assert!(err.to_string().contains("mismatched closing tag"));
}

#[test]
fn test_markup_tag_names_are_case_sensitive() {
    let err = parse_err("component C { render { return <Div></div>; } }");
    assert!(matches!(err.kind, ParseErrorKind::MismatchedClosingTag { .. }));
}

#[test]
fn test_unterminated_markup_points_at_open_tag() {
    let err = parse_err("component C { render { return <div>text");
    assert_eq!(err.kind, ParseErrorKind::UnterminatedElement { tag: "div".to_string() });
    assert_eq!(err.location, Location::new(1, 31));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_duplicate_state_block() {
    let err = parse_err("component C { state { } state { } }");
    assert_eq!(err.kind, ParseErrorKind::DuplicateState { component: "C".to_string() });
    assert_eq!(err.location, Location::new(1, 25));
}

#[test]
fn test_duplicate_render_block() {
    let err = parse_err("component C { render { } render { } }");
    assert_eq!(err.kind, ParseErrorKind::DuplicateRender { component: "C".to_string() });
}

#[test]
fn test_missing_name_reports_expected_and_found() {
    let err = parse_err("component { }");
    assert_eq!(
        err.kind,
        ParseErrorKind::UnexpectedToken {
            expected: "identifier".to_string(),
            found: "'{'".to_string()
        }
    );
    assert_eq!(err.to_string(), "expected identifier, got '{' at line 1, column 11");
}

#[test]
fn test_missing_closing_brace() {
    let err = parse_err("service S { run() { x = 1; }");
    assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { ref found, .. } if found == "end of file"));
}

#[test]
fn test_bad_type_annotation() {
    let err = parse_err("model M { id: 42 }");
    assert!(matches!(err.kind, ParseErrorKind::TypeNameExpected { ref found } if found == "number 42"));
}

#[test]
fn test_invalid_assignment_target() {
    let err = parse_err("service S { run() { 1 = x; } }");
    assert_eq!(err.kind, ParseErrorKind::InvalidAssignmentTarget);
    assert_eq!(err.location, Location::new(1, 21));
}

#[test]
fn test_unknown_member_in_component() {
    let err = parse_err("component C { 42 }");
    assert!(matches!(
        err.kind,
        ParseErrorKind::MemberExpected { ref container, .. } if container == "component 'C'"
    ));
}

#[test]
fn test_top_level_garbage() {
    let err = parse_err("x = 1");
    assert!(matches!(err.kind, ParseErrorKind::DeclarationExpected { ref found } if found == "identifier 'x'"));
}

#[test]
fn test_expression_expected() {
    let err = parse_err("service S { run() { return * 2; } }");
    assert!(matches!(err.kind, ParseErrorKind::ExpressionExpected { ref found } if found == "'*'"));
}

// ============================================================================
// Recovery
// ============================================================================

#[test]
fn test_recovery_collects_errors_per_declaration() {
    let source = "model M { 42 } service S { } garbage here component C { state { x: } } component D { }";
    let arena = Bump::new();
    let tokens = tokenize(source).expect("tokenize");
    let (program, errors) = Parser::new(&arena, tokens).parse_with_recovery();
    let names: Vec<&str> = program.declarations.iter().map(|d| d.name().name).collect();
    assert_eq!(names, vec!["S", "D"]);
    assert_eq!(errors.len(), 3);
    assert!(matches!(errors[0].kind, ParseErrorKind::MemberExpected { .. }));
    assert!(matches!(errors[1].kind, ParseErrorKind::DeclarationExpected { .. }));
    assert!(matches!(errors[2].kind, ParseErrorKind::TypeNameExpected { .. }));
}

#[test]
fn test_recovery_skips_keywords_used_as_names() {
    let source = "component A { state { x: } render() { return this.service.load({ model: 1 }); } }\n\
                  component B { render { return <x component=\"y\" />; } }\n\
                  service C { }";
    let arena = Bump::new();
    let tokens = tokenize(source).expect("tokenize");
    let (program, errors) = Parser::new(&arena, tokens).parse_with_recovery();
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(matches!(errors[0].kind, ParseErrorKind::TypeNameExpected { .. }));
    let names: Vec<&str> = program.declarations.iter().map(|d| d.name().name).collect();
    assert_eq!(names, vec!["B", "C"]);
}

#[test]
fn test_recovery_resumes_after_broken_declaration() {
    let source = "model M { id: }\nmodel N { id: number }";
    let arena = Bump::new();
    let tokens = tokenize(source).expect("tokenize");
    let (program, errors) = Parser::new(&arena, tokens).parse_with_recovery();
    assert_eq!(errors.len(), 1);
    assert_eq!(program.declarations.len(), 1);
    assert_eq!(program.declarations[0].name().name, "N");

    let source = "component A { state { x: }\ncomponent B { }";
    let tokens = tokenize(source).expect("tokenize");
    let (program, errors) = Parser::new(&arena, tokens).parse_with_recovery();
    assert_eq!(errors.len(), 1);
    let names: Vec<&str> = program.declarations.iter().map(|d| d.name().name).collect();
    assert_eq!(names, vec!["B"]);
}

#[test]
fn test_recovery_on_valid_input_matches_parse() {
    let source = "component A { state { n: number = 1 } render { return <b>{n}</b>; } }";
    let arena = Bump::new();
    let tokens = tokenize(source).expect("tokenize");
    let strict = Parser::new(&arena, tokens.clone()).parse().expect("parse");
    let (recovered, errors) = Parser::new(&arena, tokens).parse_with_recovery();
    assert!(errors.is_empty());
    assert_eq!(strict, recovered);
}

// ============================================================================
// Nesting limits
// ============================================================================

// These run on the default test thread stack. The enclosing statement and
// its expression take the first two levels.

#[test]
fn test_nesting_at_the_limit() {
    let depth = MAX_NESTING_DEPTH as usize - 2;
    let parens = format!("service S {{ run() {{ return {}x{}; }} }}", "(".repeat(depth), ")".repeat(depth));
    with_program(&parens, |program| assert_eq!(program.declarations.len(), 1));

    let brackets = format!("service S {{ run() {{ return {}x{}; }} }}", "[".repeat(depth), "]".repeat(depth));
    with_program(&brackets, |program| assert_eq!(program.declarations.len(), 1));

    let markup = format!(
        "component C {{ render {{ return {}{}; }} }}",
        "<a>".repeat(depth),
        "</a>".repeat(depth)
    );
    with_program(&markup, |program| assert_eq!(program.declarations.len(), 1));

    let blocks = format!("service S {{ run() {{ {}x;{} }} }}", "{".repeat(depth), "}".repeat(depth));
    with_program(&blocks, |program| assert_eq!(program.declarations.len(), 1));
}

#[test]
fn test_nesting_too_deep_is_an_error() {
    let depth = MAX_NESTING_DEPTH as usize - 1;
    let parens = format!("service S {{ run() {{ return {}x{}; }} }}", "(".repeat(depth), ")".repeat(depth));
    let err = parse_err(&parens);
    assert_eq!(err.kind, ParseErrorKind::NestingTooDeep { limit: MAX_NESTING_DEPTH });

    let markup = format!(
        "component C {{ render {{ return {}{}; }} }}",
        "<a>".repeat(1000),
        "</a>".repeat(1000)
    );
    let err = parse_err(&markup);
    assert_eq!(err.kind, ParseErrorKind::NestingTooDeep { limit: MAX_NESTING_DEPTH });
}

#[test]
fn test_long_prefix_chain_does_not_recurse() {
    let source = format!("service S {{ run() {{ {}x; }} }}", "!".repeat(10_000));
    with_program(&source, |program| {
        let body = program.declarations[0].as_service().expect("service").methods[0].body;
        assert_eq!(body.len(), 1);
    });
}

// ============================================================================
// Whole-tree properties
// ============================================================================

#[test]
fn test_parse_is_deterministic() {
    let source = r#"
        component Counter {
            state { count: number = 0 }
            increment() { this.count += 1; }
            render { return <button onClick={this.increment}>Count: {count}</button>; }
        }
    "#;
    let tokens = tokenize(source).expect("tokenize");
    let first_arena = Bump::new();
    let second_arena = Bump::new();
    let first = Parser::new(&first_arena, tokens.clone()).parse().expect("parse");
    let second = Parser::new(&second_arena, tokens).parse().expect("parse");
    assert_eq!(first, second);
}

#[test]
fn test_program_serializes_to_json() {
    with_program("model Todo { text: string = \"x\" }", |program| {
        let json = serde_json::to_value(program).expect("serialize");
        assert_eq!(json["declarations"][0]["type"], "Model");
        assert_eq!(json["declarations"][0]["name"]["name"], "Todo");
        assert_eq!(json["declarations"][0]["properties"][0]["type_annotation"]["name"], "string");
    });
}

#[derive(Default)]
struct IdentifierCounter {
    names: Vec<String>,
}

impl<'a> AstVisitor<'a> for IdentifierCounter {
    fn visit_identifier(&mut self, node: &Identifier<'a>) {
        self.names.push(node.name.to_string());
    }
}

#[test]
fn test_visitor_reaches_every_identifier() {
    let source = "component A { state { n: number } inc(by) { n += by; } render { return <p>{n}</p>; } }";
    with_program(source, |program| {
        let mut counter = IdentifierCounter::default();
        counter.visit_program(program);
        assert_eq!(counter.names, vec!["A", "n", "inc", "by", "n", "by", "n"]);
    });
}
