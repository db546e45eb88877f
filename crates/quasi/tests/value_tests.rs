mod common;

use pretty_assertions::assert_eq;
use quasi::source::SourceFile;
use quasi::syntax::Builder;
use quasi::*;

fn record(symbols: &SymbolTable, members: &[(&str, Value)]) -> Value {
    let mut record = Record::new();
    for (name, value) in members {
        record.insert(symbols.intern(name), value.clone());
    }
    Value::record(record)
}

// ═══════════════════════════════════════════════════════════════════════
// Equality
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_scalar_equality() {
    assert_eq!(Value::Int(1), Value::Int(1));
    assert_ne!(Value::Int(1), Value::Float(1.0));
    assert_ne!(Value::Null, Value::Bool(false));
    assert_eq!(Value::string("a"), Value::from("a"));
    assert_ne!(Value::Float(f64::NAN), Value::Float(f64::NAN));
}

#[test]
fn test_array_equality_is_elementwise() {
    let a = Value::array(vec![Value::Int(1), Value::string("x")]);
    let b = Value::array(vec![Value::Int(1), Value::string("x")]);
    let c = Value::array(vec![Value::string("x"), Value::Int(1)]);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, Value::array(vec![Value::Int(1)]));
}

#[test]
fn test_record_equality_ignores_member_order() {
    let symbols = SymbolTable::new();
    let ab = record(&symbols, &[("a", Value::Int(1)), ("b", Value::Int(2))]);
    let ba = record(&symbols, &[("b", Value::Int(2)), ("a", Value::Int(1))]);
    let a = record(&symbols, &[("a", Value::Int(1))]);
    let ab_other = record(&symbols, &[("a", Value::Int(1)), ("b", Value::Int(3))]);

    assert_eq!(ab, ba);
    assert_ne!(ab, a);
    assert_ne!(a, ab);
    assert_ne!(ab, ab_other);
}

#[test]
fn test_function_equality_is_identity() -> anyhow::Result<()> {
    let b = Builder::new();
    // let f = \x -> x, g = \x -> x in [f, f, g]
    let identity = || b.lambda(&["x"], b.reference("x"));
    let program = b.let_in(
        vec![("f", identity()), ("g", identity())],
        b.array(vec![
            b.reference("f").into(),
            b.reference("f").into(),
            b.reference("g").into(),
        ]),
    );
    let value = common::run(&program)?;
    let items = value.as_array().expect("array");
    assert_eq!(items[0], items[1]);
    assert_ne!(items[0], items[2]);

    let first = NativeFn::new("id", Some(1), |args: &[Value]| Ok(args[0].clone()));
    let second = NativeFn::new("id", Some(1), |args: &[Value]| Ok(args[0].clone()));
    assert_eq!(Value::Native(first.clone()), Value::Native(first.clone()));
    assert_ne!(Value::Native(first), Value::Native(second));
    Ok(())
}

#[test]
fn test_error_equality_by_message() {
    let here = Value::error("boom", 1);
    let there = Value::error("boom", 7);
    assert_eq!(here, there);
    assert_ne!(here, Value::error("bang", 1));
}

// ═══════════════════════════════════════════════════════════════════════
// Printing
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_print_scalars() {
    assert_eq!(Value::Null.to_string(), "null");
    assert_eq!(Value::Bool(true).to_string(), "true");
    assert_eq!(Value::Int(-3).to_string(), "-3");
    assert_eq!(Value::Float(1.0).to_string(), "1.0");
    assert_eq!(Value::string("a\"b").to_string(), "\"a\\\"b\"");
}

#[test]
fn test_print_compound_values() {
    let symbols = SymbolTable::new();
    let value = Value::array(vec![
        record(
            &symbols,
            &[("name", Value::string("q")), ("tags", Value::array(vec![]))],
        ),
        record(&symbols, &[]),
    ]);
    assert_eq!(
        value.display(&symbols).to_string(),
        "[{ name: \"q\", tags: [] }, {}]"
    );

    // Without a table members fall back to their symbol ids
    let name = symbols.intern("name");
    let plain = record(&symbols, &[("name", Value::Int(1))]);
    assert_eq!(plain.to_string(), format!("{{ {}: 1 }}", name));
}

#[test]
fn test_print_functions_and_errors() -> anyhow::Result<()> {
    let b = Builder::new();
    let closure = common::run(&b.lambda(&["a", "b"], b.null()))?;
    assert_eq!(closure.to_string(), "<lambda/2>");

    let native = common::run(&b.import("add"))?;
    assert_eq!(native.to_string(), "<native add>");

    let error = Value::error("boom", 4);
    assert_eq!(error.to_string(), "<error: boom>");
    assert_eq!(format!("{:?}", error), "Error(\"boom\" @4)");
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// Error Rendering
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_render_error_against_source_file() -> anyhow::Result<()> {
    let text = "0\n1\n2\n3\n4\n5\n6\n";
    let file = SourceFile::new("prog.q", text);

    let b = Builder::new();
    // let f = \-> [][0] in f(), with the index at offset 2 and the call at 5
    let program = b.let_in(
        vec![("f", b.lambda(&[], b.index(b.array(vec![]), b.int(0))))],
        b.call(b.reference("f"), vec![]),
    );
    let value = common::run(&program)?;
    let error = common::expect_error(&value);

    assert_eq!(
        render_error(error, &file),
        "index 0 is out of range, the target is empty at prog.q:2:1\n  called from prog.q:3:2"
    );
    Ok(())
}
