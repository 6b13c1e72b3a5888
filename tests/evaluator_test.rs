use color_eyre::eyre::{Context, Result};
use proptest::prelude::*;
use std::{
    fs::{read_dir, read_to_string},
    path::Path,
};

use monkey::environment::{Builtins, SharedEnvironment};
use monkey::interpreter::TreeWalkInterpreter;
use monkey::parser::{statement::Statement, Parser};
use monkey::value::{
    error::RuntimeError,
    formatter::{BasicFormatter, CodedFormatter, ValueFormatter},
    Object, ObjectKind, FALSE, NULL, TRUE,
};

fn eval_in(input: &str, environment: &mut SharedEnvironment) -> Object {
    let mut parser = Parser::new(input);
    let program = parser.parse_program();
    assert!(
        parser.errors().is_empty(),
        "Failed to parse {input}: {:?}",
        parser.errors()
    );
    TreeWalkInterpreter::new().eval(&program, environment)
}

fn eval(input: &str) -> Object {
    eval_in(input, &mut SharedEnvironment::new())
}

fn check_error(input: &str, expected: &str) {
    match eval(input) {
        Object::Error(error) => assert_eq!(error.to_string(), expected, "Failed the test {input}"),
        other => panic!("Expected an error from {input} but got {other:?}"),
    }
}

fn check(input: &str, expected: &str, test_name: &str) {
    let formatter = BasicFormatter;
    let output = format!("{}\n", formatter.format(&eval(input)));
    assert_eq!(output, expected, "Failed the test {test_name}");
}

#[test]
fn smoke_test() {
    assert_eq!(eval(""), NULL);
}

#[test]
fn eval_integer_arithmetic() {
    let cases = [
        ("5", 5),
        ("-10", -10),
        ("5 * 2 - 10", 0),
        ("2 * (5 + 3)", 16),
        ("5 / 2", 2),
        ("-7 / 2", -3),
        ("50 / 2 * 2 + 10", 60),
        ("3 * (3 * 3) + 10", 37),
        ("(5 + 10 * 2 + 15 / 3) * 2 + -10", 50),
    ];
    for (input, expected) in cases {
        assert_eq!(eval(input), Object::Integer(expected), "Failed the test {input}");
    }
}

#[test]
fn eval_integer_overflow_wraps() {
    assert_eq!(eval("9223372036854775807 + 1"), Object::Integer(i64::MIN));
    assert_eq!(eval("-9223372036854775807 - 2"), Object::Integer(i64::MAX));
}

#[test]
fn eval_division_by_zero() {
    check_error("10 / 0", "division by zero: 10 / 0");
}

#[test]
fn eval_boolean_expressions() {
    let cases = [
        ("true", true),
        ("false", false),
        ("1 < 2", true),
        ("1 > 2", false),
        ("1 <= 1", true),
        ("2 >= 3", false),
        ("1 == 1", true),
        ("1 != 1", false),
        ("true == true", true),
        ("true != false", true),
        ("(1 < 2) == true", true),
        ("(1 > 2) == true", false),
    ];
    for (input, expected) in cases {
        assert_eq!(eval(input), Object::Boolean(expected), "Failed the test {input}");
    }
}

#[test]
fn eval_bang_operator_uses_truthiness() {
    assert_eq!(eval("!true"), FALSE);
    assert_eq!(eval("!false"), TRUE);
    assert_eq!(eval("!5"), FALSE);
    assert_eq!(eval("!!5"), TRUE);
    assert_eq!(eval("!0"), FALSE);
    assert_eq!(eval("!\"\""), FALSE);
    assert_eq!(eval("!if (false) { 1 }"), TRUE);
}

#[test]
fn eval_logical_operators() {
    assert_eq!(eval("true && false"), FALSE);
    assert_eq!(eval("true && true"), TRUE);
    assert_eq!(eval("false || true"), TRUE);
    assert_eq!(eval("1 && 0"), TRUE);
    assert_eq!(eval("false || if (false) { 1 }"), FALSE);
    check_error("foo && true", "identifier not found: foo");
}

#[test]
fn eval_if_expressions() {
    assert_eq!(eval("if (true) { 10 }"), Object::Integer(10));
    assert_eq!(eval("if (false) { 10 }"), NULL);
    assert_eq!(eval("if (1) { 10 }"), Object::Integer(10));
    assert_eq!(eval("if (1 < 2) { 10 } else { 20 }"), Object::Integer(10));
    assert_eq!(eval("if (1 > 2) { 10 } else { 20 }"), Object::Integer(20));
    assert_eq!(eval("if (true) { }"), NULL);
}

#[test]
fn eval_return_statements() {
    let cases = [
        ("return 10;", 10),
        ("return 10; 9;", 10),
        ("return 2 * 5; 9;", 10),
        ("9; return 2 * 5; 9;", 10),
        ("if (10 > 1) { if (10 > 1) { return 10; } return 1; }", 10),
        ("let f = fn(x) { return x; x + 10; }; f(10);", 10),
        ("let f = fn(x) { let result = x + 10; return result; return 10; }; f(10);", 20),
    ];
    for (input, expected) in cases {
        assert_eq!(eval(input), Object::Integer(expected), "Failed the test {input}");
    }
}

#[test]
fn eval_return_inside_expressions() {
    let cases = [
        ("let f = fn() { let x = if (true) { return 1; }; 2 }; f()", 1),
        ("let f = fn() { 1 + if (true) { return 7; } }; f()", 7),
        ("let f = fn() { if (true) { return 3; } * 10 }; f()", 3),
        ("let f = fn() { len(if (true) { return 4; }) }; f()", 4),
        ("let f = fn() { [1, if (true) { return 5; }, 3] }; f()", 5),
        ("let f = fn() { -if (true) { return 6; } }; f()", 6),
        ("let f = fn() { [1, 2][if (true) { return 8; }] }; f()", 8),
        ("let f = fn() { if (if (true) { return 9; }) { 0 } }; f()", 9),
        ("let f = fn() { let g = if (true) { return 10; }; g }; f() + 0", 10),
        ("let g = fn() { return 2; }; let f = fn() { g() * 3 }; f()", 6),
        ("let x = if (true) { return 5; }; x + 1", 5),
    ];
    for (input, expected) in cases {
        assert_eq!(eval(input), Object::Integer(expected), "Failed the test {input}");
    }
}

#[test]
fn eval_return_in_let_stops_function() {
    let mut environment = SharedEnvironment::new();
    let result = eval_in(
        "let f = fn() { let x = if (true) { return 1; }; let y = 2; y }; let r = f(); r",
        &mut environment,
    );
    assert_eq!(result, Object::Integer(1));
    assert_eq!(environment.access("r"), Some(Object::Integer(1)));
    assert!(environment.access("x").is_none());

    let result = eval_in("let x = if (true) { return 5; }; 6", &mut environment);
    assert_eq!(result, Object::Integer(5));
    assert!(environment.access("x").is_none());
}

#[test]
fn eval_nested_return_skips_siblings() {
    let mut environment = SharedEnvironment::new();
    let result = eval_in(
        "if (true) { if (true) { return 1; let inner = 2; } let outer = 3; } let top = 4;",
        &mut environment,
    );
    assert_eq!(result, Object::Integer(1));
    assert!(environment.access("inner").is_none());
    assert!(environment.access("outer").is_none());
    assert!(environment.access("top").is_none());
}

#[test]
fn eval_error_short_circuits() {
    let mut environment = SharedEnvironment::new();
    let result = eval_in("let x = 1; 5 + true; let y = 2; 5;", &mut environment);
    assert_eq!(
        result,
        Object::Error(RuntimeError::TypeMismatch {
            left: ObjectKind::Integer,
            operator: monkey::parser::expression::InfixOperator::Add,
            right: ObjectKind::Boolean,
        })
    );
    assert!(environment.access("x").is_some());
    assert!(environment.access("y").is_none());
}

#[test]
fn eval_error_messages() {
    let cases = [
        ("5 + true;", "type mismatch: INTEGER + BOOLEAN"),
        ("5 + true; 5;", "type mismatch: INTEGER + BOOLEAN"),
        ("1 == true", "type mismatch: INTEGER == BOOLEAN"),
        ("-true", "unknown operator: -BOOLEAN"),
        ("true + false;", "unknown operator: BOOLEAN + BOOLEAN"),
        ("5; true + false; 5", "unknown operator: BOOLEAN + BOOLEAN"),
        ("if (10 > 1) { true + false; }", "unknown operator: BOOLEAN + BOOLEAN"),
        (
            "if (10 > 1) { if (10 > 1) { return true + false; } return 1; }",
            "unknown operator: BOOLEAN + BOOLEAN",
        ),
        ("foobar", "identifier not found: foobar"),
        ("\"Hello\" - \"World\"", "unknown operator: STRING - STRING"),
        ("\"a\" == \"a\"", "unknown operator: STRING == STRING"),
        ("1[0]", "unknown operator: INTEGER[INTEGER]"),
        ("[1][true]", "unknown operator: ARRAY[BOOLEAN]"),
        ("5()", "not a function: INTEGER"),
        ("[1, 2](0)", "not a function: ARRAY"),
        ("len(1 + true)", "type mismatch: INTEGER + BOOLEAN"),
        ("[1, foo, 3]", "identifier not found: foo"),
        ("fn(x) { x } == 1", "type mismatch: FUNCTION == INTEGER"),
    ];
    for (input, expected) in cases {
        check_error(input, expected);
    }
}

#[test]
fn eval_error_codes() {
    let formatter = CodedFormatter;
    assert_eq!(
        formatter.format(&eval("5 + true")),
        "[RT004] ERROR: type mismatch: INTEGER + BOOLEAN"
    );
    assert_eq!(
        formatter.format(&eval("missing")),
        "[RT001] ERROR: identifier not found: missing"
    );
}

#[test]
fn eval_let_statements() {
    let cases = [
        ("let a = 5; a;", 5),
        ("let a = 5 * 5; a;", 25),
        ("let a = 5; let b = a; b;", 5),
        ("let a = 5; let b = a; let c = a + b + 5; c;", 15),
    ];
    for (input, expected) in cases {
        assert_eq!(eval(input), Object::Integer(expected), "Failed the test {input}");
    }
    assert_eq!(eval("let a = 5;"), NULL);
}

#[test]
fn eval_functions() {
    let cases = [
        ("let identity = fn(x) { x; }; identity(5);", 5),
        ("let identity = fn(x) { return x; }; identity(5);", 5),
        ("let double = fn(x) { x * 2; }; double(5);", 10),
        ("let add = fn(x, y) { x + y; }; add(5, 5);", 10),
        ("let add = fn(x, y) { x + y }; add(1, add(2,3))", 6),
        ("fn(x) { x; }(5)", 5),
        ("let f = fn() { }; if (f()) { 1 } else { 2 }", 2),
    ];
    for (input, expected) in cases {
        assert_eq!(eval(input), Object::Integer(expected), "Failed the test {input}");
    }
}

#[test]
fn eval_function_arity_is_checked() {
    check_error(
        "let add = fn(x, y) { x + y }; add(1)",
        "wrong number of arguments. expected=2, actual=1",
    );
    check_error(
        "fn() { 1 }(1, 2, 3)",
        "wrong number of arguments. expected=0, actual=3",
    );
}

#[test]
fn eval_closures() {
    assert_eq!(
        eval("let newAdder = fn(x) { fn(y) { x + y }; }; let addTwo = newAdder(2); addTwo(2);"),
        Object::Integer(4)
    );
    // Bindings made after the closure was created are still visible through it
    assert_eq!(eval("let f = fn() { y }; let y = 7; f()"), Object::Integer(7));
}

#[test]
fn eval_let_shadows_outer_binding() {
    let mut environment = SharedEnvironment::new();
    let result = eval_in(
        "let x = 1; let f = fn() { let x = 2; x }; f() * 10 + x",
        &mut environment,
    );
    assert_eq!(result, Object::Integer(21));
    assert_eq!(environment.access("x"), Some(Object::Integer(1)));
}

#[test]
fn eval_bindings_persist_across_calls() {
    let mut environment = SharedEnvironment::new();
    assert_eq!(eval_in("let a = 10;", &mut environment), NULL);
    assert_eq!(eval_in("let b = fn(x) { a + x };", &mut environment), NULL);
    assert_eq!(eval_in("b(5)", &mut environment), Object::Integer(15));
}

#[test]
fn eval_strings() {
    assert_eq!(eval("\"Hello World!\""), Object::String("Hello World!".into()));
    assert_eq!(
        eval("\"Hello\" + \" \" + \"World!\""),
        Object::String("Hello World!".into())
    );
}

#[test]
fn eval_arrays() {
    assert_eq!(
        eval("[1, 2 * 2, 3 + 3]"),
        Object::Array(vec![Object::Integer(1), Object::Integer(4), Object::Integer(6)].into())
    );
    let cases = [
        ("[1, 2, 3][0]", 1),
        ("[1, 2, 3][2]", 3),
        ("let i = 0; [1][i];", 1),
        ("[1, 2, 3][1 + 1];", 3),
        ("let myArray = [1, 2, 3]; myArray[0] + myArray[1] + myArray[2];", 6),
        ("let myArray = [1, 2, 3]; let i = myArray[0]; myArray[i]", 2),
    ];
    for (input, expected) in cases {
        assert_eq!(eval(input), Object::Integer(expected), "Failed the test {input}");
    }
}

#[test]
fn eval_out_of_range_index_is_null() {
    assert_eq!(eval("[1, 2, 3][3]"), NULL);
    assert_eq!(eval("[1, 2, 3][-1]"), NULL);
    assert_eq!(eval("[][0]"), NULL);
}

#[test]
fn eval_push_does_not_mutate() {
    let mut environment = SharedEnvironment::new();
    eval_in("let a = [1, 5, 9]; let b = push(a, 8);", &mut environment);
    assert_eq!(eval_in("len(a)", &mut environment), Object::Integer(3));
    assert_eq!(eval_in("b[3]", &mut environment), Object::Integer(8));
    assert_eq!(eval_in("len(b)", &mut environment), Object::Integer(4));
}

#[test]
fn eval_builtin_functions() {
    let integer_cases = [
        ("len(\"\")", 0),
        ("len(\"four\")", 4),
        ("len(\"hello world\")", 11),
        ("len([1, 2, 3])", 3),
        ("len([])", 0),
        ("first([1, 2, 3])", 1),
        ("last([1, 2, 3])", 3),
    ];
    for (input, expected) in integer_cases {
        assert_eq!(eval(input), Object::Integer(expected), "Failed the test {input}");
    }

    assert_eq!(eval("first(\"abc\")"), Object::String("a".into()));
    assert_eq!(eval("last(\"abc\")"), Object::String("c".into()));
    assert_eq!(eval("first([])"), NULL);
    // Only a single byte is taken, so a multi-byte character is replaced
    assert_eq!(eval("first(\"é\")"), Object::String("\u{FFFD}".into()));
    assert_eq!(eval("last(\"aé\")"), Object::String("\u{FFFD}".into()));
    assert_eq!(eval("last(\"éa\")"), Object::String("a".into()));
    assert_eq!(eval("last(\"\")"), NULL);
    assert_eq!(
        eval("push([], 1)"),
        Object::Array(vec![Object::Integer(1)].into())
    );
}

#[test]
fn eval_builtin_errors() {
    let cases = [
        ("len(1)", "argument to 'len' method is not supported. actual=INTEGER"),
        ("len(\"one\", \"two\")", "wrong number of arguments. expected=1, actual=2"),
        ("first(1)", "argument to 'first' method is not supported. actual=INTEGER"),
        ("last(true)", "argument to 'last' method is not supported. actual=BOOLEAN"),
        ("push(1, 1)", "argument to 'push' method is not supported. actual=INTEGER"),
        ("push([1])", "wrong number of arguments. expected=2, actual=1"),
    ];
    for (input, expected) in cases {
        check_error(input, expected);
    }
}

#[test]
fn eval_builtins_can_be_shadowed() {
    assert_eq!(eval("let len = fn(x) { 42 }; len([1])"), Object::Integer(42));
}

#[test]
fn builtin_table() {
    let builtins = Builtins::new();
    for name in ["len", "first", "last", "push"] {
        let Some(Object::BuiltIn(function)) = builtins.get(name) else {
            panic!("Expected {name} to be a builtin");
        };
        assert_eq!(function.get_name(), name);
    }
    assert!(builtins.get("rest").is_none());

    let interpreter = TreeWalkInterpreter::with_builtins(builtins);
    let mut environment = SharedEnvironment::new();
    let mut parser = Parser::new("len(\"abc\")");
    let program = parser.parse_program();
    assert_eq!(interpreter.eval(&program, &mut environment), Object::Integer(3));
}

#[test]
fn eval_identity_equality() {
    assert_eq!(eval("let a = [1]; a == a"), TRUE);
    assert_eq!(eval("[1] == [1]"), FALSE);
    assert_eq!(eval("let f = fn() { 1 }; f == f"), TRUE);
    assert_eq!(eval("len == len"), TRUE);
    assert_eq!(eval("if (false) { 1 } == if (false) { 2 }"), TRUE);
}

#[test]
fn eval_single_nodes() {
    let mut parser = Parser::new("1 + 2; let x = 3;");
    let program = parser.parse_program();
    assert!(parser.errors().is_empty());

    let interpreter = TreeWalkInterpreter::new();
    let mut environment = SharedEnvironment::new();
    let first = program.get_statement(0).expect("Program has two statements");
    let second = program.get_statement(1).expect("Program has two statements");

    assert_eq!(interpreter.eval(first, &mut environment), Object::Integer(3));
    let Statement::Expression(stmt) = first else {
        panic!("Expected an expression statement");
    };
    assert_eq!(
        interpreter.eval(&stmt.expression, &mut environment),
        Object::Integer(3)
    );
    assert_eq!(interpreter.eval(second, &mut environment), NULL);
    assert_eq!(environment.access("x"), Some(Object::Integer(3)));
}

#[test]
fn eval_return_outside_function_is_wrapped() {
    let mut parser = Parser::new("return 1 + 1;");
    let program = parser.parse_program();
    let statement = program.get_statement(0).expect("Program has one statement");

    let interpreter = TreeWalkInterpreter::new();
    let mut environment = SharedEnvironment::new();
    assert_eq!(
        interpreter.eval(statement, &mut environment),
        Object::ReturnValue(Box::new(Object::Integer(2)))
    );
    assert_eq!(interpreter.eval(&program, &mut environment), Object::Integer(2));
}

#[test]
fn eval_program_without_value() {
    let interpreter = TreeWalkInterpreter::new();
    let mut environment = SharedEnvironment::new();
    let cases = [
        ("", None),
        ("let a = 1;", None),
        ("1; let b = 2;", None),
        ("let c = 3; c", Some(Object::Integer(3))),
        ("if (false) { 1 }", Some(NULL)),
        ("return 4; let d = 5;", Some(Object::Integer(4))),
    ];
    for (input, expected) in cases {
        let mut parser = Parser::new(input);
        let program = parser.parse_program();
        assert_eq!(
            interpreter.eval_program(&program, &mut environment),
            expected,
            "Failed the test {input}"
        );
    }
}

#[test]
fn inspect_strings() {
    let cases = [
        ("5", "5"),
        ("true", "true"),
        ("\"text\"", "text"),
        ("[1, \"two\", [3]]", "[1, two, [3]]"),
        ("if (false) { 1 }", "null"),
        ("fn(x, y) { x + y; }", "fn(x, y) { (x + y) }"),
        ("len", "builtin function len"),
        ("5 + true", "ERROR: type mismatch: INTEGER + BOOLEAN"),
    ];
    for (input, expected) in cases {
        assert_eq!(eval(input).inspect(), expected, "Failed the test {input}");
    }
}

#[test]
fn object_kinds() {
    assert_eq!(eval("1").kind().to_string(), "INTEGER");
    assert_eq!(eval("\"\"").kind().to_string(), "STRING");
    assert_eq!(eval("[]").kind().to_string(), "ARRAY");
    assert_eq!(eval("fn() { }").kind().to_string(), "FUNCTION");
    assert_eq!(eval("first").kind().to_string(), "BUILTIN");
    assert!(eval("x").is_error());
}

#[test]
fn environment_scopes() {
    let mut global = SharedEnvironment::new();
    global.declare("a", Object::Integer(1));

    let mut local = global.new_scope();
    local.declare("b", Object::Integer(2));
    assert_eq!(local.access("a"), Some(Object::Integer(1)));
    assert!(global.access("b").is_none());

    // Later declarations in the parent are visible from the child
    global.declare("c", Object::Integer(3));
    assert_eq!(local.access("c"), Some(Object::Integer(3)));

    local.declare("a", Object::Integer(10));
    assert_eq!(local.access("a"), Some(Object::Integer(10)));
    assert_eq!(global.access("a"), Some(Object::Integer(1)));

    // Clones are handles to the same scope
    let mut alias = global.clone();
    alias.declare("d", Object::Integer(4));
    assert_eq!(global.access("d"), Some(Object::Integer(4)));
}

#[test]
fn test_all() -> Result<()> {
    let input_dir = Path::new("./test_data/evaluator/in");
    let output_dir = Path::new("./test_data/evaluator/out");

    let mut succeeded = true;
    for entry in read_dir(input_dir).context("Failed to open input test data folder")? {
        let entry = entry?;
        let path = entry.path();

        let Some(extension) = path.extension() else {
            continue;
        };

        if extension != "monkey" {
            continue;
        }

        let test_name = AsRef::<Path>::as_ref(
            path.file_name()
                .expect("File name can't be none as the path is to a real file."),
        );

        let input = read_to_string(&path).context("Failed to open input test data file")?;

        let expected = {
            let output_file_name = test_name.with_extension("txt");
            let output_path = output_dir.join(output_file_name);
            read_to_string(output_path).context("Failed to open output test data file")?
        };

        println!("Checking {}", test_name.display());
        let res = std::panic::catch_unwind(|| {
            check(&input, &expected, &test_name.to_string_lossy());
        });
        if res.is_err() {
            println!("\tFails test case {}", test_name.display());
            succeeded = false;
        }
    }

    assert!(succeeded);

    Ok(())
}

// Property-based tests

proptest! {
    #[test]
    fn eval_integer_literal(n in 0..=i64::MAX) {
        prop_assert_eq!(eval(&n.to_string()), Object::Integer(n));
    }

    #[test]
    fn eval_integer_literal_with_leading_zeros(zeros in 0usize..5, n in 0..=1_000_000i64) {
        let input = format!("{}{n}", "0".repeat(zeros));
        prop_assert_eq!(eval(&input), Object::Integer(n));
    }

    #[test]
    fn eval_integer_addition_matches_host(a in any::<i32>(), b in any::<i32>()) {
        let (a, b) = (i64::from(a), i64::from(b));
        let input = format!("{a} + {b}");
        prop_assert_eq!(eval(&input), Object::Integer(a + b));
    }
}
