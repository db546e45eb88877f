mod common;

use common::{expect_error, run, run_with};
use pretty_assertions::assert_eq;
use quasi::syntax::{Builder, Element, Expr, Member};
use quasi::*;

// `\n -> match n { 0 => done, #m => step(sub(m, 1)) }`
fn countdown(b: &Builder, done: Expr, step: impl FnOnce(Expr) -> Expr) -> Expr {
    let decrement = b.call(b.reference("sub"), vec![b.reference("m"), b.int(1)]);
    let body = b.match_on(
        b.reference("n"),
        vec![(b.int(0), done), (b.var("m"), step(decrement))],
    );
    b.lambda(&["n"], body)
}

// ═══════════════════════════════════════════════════════════════════════
// Literal Evaluation
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_eval_literals() -> anyhow::Result<()> {
    let b = Builder::new();
    assert_eq!(run(&b.int(42))?, Value::Int(42));
    assert_eq!(run(&b.float(2.5))?, Value::Float(2.5));
    assert_eq!(run(&b.string("hello"))?, Value::string("hello"));
    assert_eq!(run(&b.bool(true))?, Value::Bool(true));
    assert_eq!(run(&b.null())?, Value::Null);
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// Lambdas and Calls
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_eval_lambda_substitutes_arguments() -> anyhow::Result<()> {
    let b = Builder::new();
    let swap = b.lambda(
        &["x", "y"],
        b.array(vec![b.reference("y").into(), b.reference("x").into()]),
    );
    let program = b.call(swap, vec![b.int(1), b.int(2)]);
    assert_eq!(
        run(&program)?,
        Value::array(vec![Value::Int(2), Value::Int(1)])
    );
    Ok(())
}

#[test]
fn test_eval_closure_captures_context() -> anyhow::Result<()> {
    let b = Builder::new();
    // let k = \x -> \y -> x in k(1)(2)
    let program = b.let_in(
        vec![("k", b.lambda(&["x"], b.lambda(&["y"], b.reference("x"))))],
        b.call(b.call(b.reference("k"), vec![b.int(1)]), vec![b.int(2)]),
    );
    assert_eq!(run(&program)?, Value::Int(1));
    Ok(())
}

#[test]
fn test_eval_mutual_recursion_through_let() -> anyhow::Result<()> {
    let b = Builder::new();
    let even = b.lambda(
        &["n"],
        b.match_on(
            b.reference("n"),
            vec![
                (b.int(0), b.bool(true)),
                (
                    b.var("m"),
                    b.call(
                        b.reference("odd"),
                        vec![b.call(b.reference("sub"), vec![b.reference("m"), b.int(1)])],
                    ),
                ),
            ],
        ),
    );
    let odd = b.lambda(
        &["n"],
        b.match_on(
            b.reference("n"),
            vec![
                (b.int(0), b.bool(false)),
                (
                    b.var("m"),
                    b.call(
                        b.reference("even"),
                        vec![b.call(b.reference("sub"), vec![b.reference("m"), b.int(1)])],
                    ),
                ),
            ],
        ),
    );
    let program = b.let_in(
        vec![("sub", b.import("sub")), ("even", even), ("odd", odd)],
        b.call(b.reference("even"), vec![b.int(7)]),
    );
    assert_eq!(run(&program)?, Value::Bool(false));
    Ok(())
}

#[test]
fn test_eval_deep_tail_recursion_completes() -> anyhow::Result<()> {
    let b = Builder::new();
    let count = countdown(&b, b.string("done"), |next| {
        b.call(b.reference("count"), vec![next])
    });
    let program = b.let_in(
        vec![("sub", b.import("sub")), ("count", count)],
        b.call(b.reference("count"), vec![b.int(10_000)]),
    );
    assert_eq!(run(&program)?, Value::string("done"));
    Ok(())
}

#[test]
fn test_eval_arity_mismatch() -> anyhow::Result<()> {
    let b = Builder::new();
    let call = b.call(b.lambda(&["x"], b.reference("x")), vec![b.int(1), b.int(2)]);
    let offset = call.offset;
    let value = run(&call)?;
    let error = expect_error(&value);
    assert_eq!(error.message, "arity mismatch: expected 1 arguments, received 2");
    assert_eq!(error.offset, Some(offset));
    Ok(())
}

#[test]
fn test_eval_native_arity_mismatch() -> anyhow::Result<()> {
    let b = Builder::new();
    let program = b.call(b.import("not"), vec![]);
    let value = run(&program)?;
    assert_eq!(
        expect_error(&value).message,
        "arity mismatch: expected 1 arguments, received 0"
    );
    Ok(())
}

#[test]
fn test_eval_call_non_callable() -> anyhow::Result<()> {
    let b = Builder::new();
    let value = run(&b.call(b.int(1), vec![b.int(2)]))?;
    assert_eq!(expect_error(&value).message, "value cannot be called: 1");
    Ok(())
}

#[test]
fn test_eval_native_error_at_call_site() -> anyhow::Result<()> {
    let b = Builder::new();
    let call = b.call(b.import("add"), vec![b.int(1), b.string("x")]);
    let offset = call.offset;
    let value = run(&call)?;
    let error = expect_error(&value);
    assert_eq!(error.message, "add: expected numbers, found int and string");
    assert_eq!(error.offset, Some(offset));
    Ok(())
}

#[test]
fn test_eval_missing_import() -> anyhow::Result<()> {
    let b = Builder::new();
    let value = run(&b.import("nope"))?;
    assert_eq!(expect_error(&value).message, "import `nope` not found");
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// Records
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_eval_record_first_writer_wins() -> anyhow::Result<()> {
    let b = Builder::new();
    // let r = {a: 1, b: 2} in {a: 10, ...r, c: 3}
    let program = b.let_in(
        vec![(
            "r",
            b.record(vec![
                Member::named("a", b.int(1)),
                Member::named("b", b.int(2)),
            ]),
        )],
        b.record(vec![
            Member::named("a", b.int(10)),
            Member::projection(b.reference("r")),
            Member::named("c", b.int(3)),
        ]),
    );

    let symbols = SymbolTable::new();
    let bound = common::bind_with_prelude(&program, &symbols)?;
    let value = Interpreter::new(&symbols).run(&bound);
    assert_eq!(value.display(&symbols).to_string(), "{ a: 10, b: 2, c: 3 }");
    Ok(())
}

#[test]
fn test_eval_record_earlier_projection_wins() -> anyhow::Result<()> {
    let b = Builder::new();
    let program = b.select(
        b.record(vec![
            Member::projection(b.record(vec![Member::named("x", b.int(1))])),
            Member::projection(b.record(vec![Member::named("x", b.int(2))])),
        ]),
        "x",
    );
    assert_eq!(run(&program)?, Value::Int(1));
    Ok(())
}

#[test]
fn test_eval_record_projection_of_non_record() -> anyhow::Result<()> {
    let b = Builder::new();
    let value = run(&b.record(vec![Member::projection(b.int(1))]))?;
    assert_eq!(
        expect_error(&value).message,
        "cannot project int 1 into a record"
    );
    Ok(())
}

#[test]
fn test_eval_select_missing_member() -> anyhow::Result<()> {
    let b = Builder::new();
    let program = b.select(b.record(vec![Member::named("a", b.int(1))]), "b");
    let value = run(&program)?;
    assert_eq!(expect_error(&value).message, "record has no member `b`");

    let value = run(&b.select(b.int(1), "a"))?;
    assert_eq!(expect_error(&value).message, "cannot select `a` from int 1");
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// Arrays and Indexing
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_eval_array_projection_splices() -> anyhow::Result<()> {
    let b = Builder::new();
    let program = b.array(vec![
        b.int(0).into(),
        Element::projection(b.array(vec![b.int(1).into(), b.int(2).into()])),
        b.int(3).into(),
    ]);
    assert_eq!(
        run(&program)?,
        Value::array(vec![
            Value::Int(0),
            Value::Int(1),
            Value::Int(2),
            Value::Int(3)
        ])
    );

    let value = run(&b.array(vec![Element::projection(b.string("s"))]))?;
    assert_eq!(
        expect_error(&value).message,
        "cannot project string \"s\" into an array"
    );
    Ok(())
}

#[test]
fn test_eval_index() -> anyhow::Result<()> {
    let b = Builder::new();
    let array = || b.array(vec![b.int(10).into(), b.int(20).into()]);

    assert_eq!(run(&b.index(array(), b.int(1)))?, Value::Int(20));

    let value = run(&b.index(array(), b.int(2)))?;
    assert_eq!(expect_error(&value).message, "index 2 is out of range 0..1");

    let value = run(&b.index(array(), b.int(-1)))?;
    assert_eq!(expect_error(&value).message, "index -1 is out of range 0..1");

    let value = run(&b.index(b.array(vec![]), b.int(0)))?;
    assert_eq!(
        expect_error(&value).message,
        "index 0 is out of range, the target is empty"
    );

    let value = run(&b.index(array(), b.string("x")))?;
    assert_eq!(expect_error(&value).message, "index must be an int, found string");
    Ok(())
}

#[test]
fn test_eval_index_string_yields_char_code() -> anyhow::Result<()> {
    let b = Builder::new();
    assert_eq!(run(&b.index(b.string("AB"), b.int(1)))?, Value::Int(66));
    assert_eq!(run(&b.index(b.string("ñx"), b.int(0)))?, Value::Int(241));

    let value = run(&b.index(b.null(), b.int(0)))?;
    assert_eq!(expect_error(&value).message, "cannot index into null null");
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_eval_first_error_short_circuits() -> anyhow::Result<()> {
    let b = Builder::new();
    let first = b.select(b.record(vec![]), "a");
    let first_offset = first.offset;
    let program = b.array(vec![first.into(), b.call(b.int(1), vec![]).into()]);
    let value = run(&program)?;
    let error = expect_error(&value);
    assert_eq!(error.message, "record has no member `a`");
    assert_eq!(error.offset, Some(first_offset));
    Ok(())
}

#[test]
fn test_eval_tail_call_trace_keeps_latest_site() -> anyhow::Result<()> {
    let b = Builder::new();
    let fail = b.index(b.array(vec![]), b.int(0));
    let fail_offset = fail.offset;
    let g = b.lambda(&[], fail);
    let g_call = b.call(b.reference("g"), vec![]);
    let g_site = g_call.offset;
    let f = b.lambda(&[], g_call);
    let program = b.let_in(
        vec![("g", g), ("f", f)],
        b.call(b.reference("f"), vec![]),
    );

    let value = run(&program)?;
    let error = expect_error(&value);
    assert_eq!(error.offset, Some(fail_offset));
    assert_eq!(error.trace, vec![g_site]);
    Ok(())
}

#[test]
fn test_eval_nested_call_trace_lists_every_site() -> anyhow::Result<()> {
    let b = Builder::new();
    let g = b.lambda(&[], b.index(b.array(vec![]), b.int(0)));
    let g_call = b.call(b.reference("g"), vec![]);
    let g_site = g_call.offset;
    // f wraps the call in an array, so it is not a tail call
    let f = b.lambda(&[], b.array(vec![g_call.into()]));
    let f_call = b.call(b.reference("f"), vec![]);
    let f_site = f_call.offset;
    let program = b.let_in(vec![("g", g), ("f", f)], f_call);

    let value = run(&program)?;
    assert_eq!(expect_error(&value).trace, vec![g_site, f_site]);
    Ok(())
}

#[test]
fn test_eval_render_error_with_trace() -> anyhow::Result<()> {
    let b = Builder::new();
    let g = b.lambda(&[], b.index(b.array(vec![]), b.int(0)));
    let program = b.let_in(
        vec![("g", g)],
        b.call(b.reference("g"), vec![]),
    );
    let value = run(&program)?;

    let map = |offset: usize| -> Option<SourcePosition> {
        Some(SourcePosition {
            file: "test.q".to_string(),
            line: 1,
            column: offset + 1,
        })
    };
    // index node is offset 2, call is offset 5
    assert_eq!(
        render_error(expect_error(&value), &map),
        "index 0 is out of range, the target is empty at test.q:1:3\n  called from test.q:1:6"
    );
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// Configuration
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_eval_interrupt() -> anyhow::Result<()> {
    let b = Builder::new();
    let config = EvalContext::new();
    config.interrupt();
    let value = run_with(&b.int(1), config)?;
    assert_eq!(expect_error(&value).message, "evaluation interrupted");
    Ok(())
}

#[test]
fn test_eval_traced_matches_untraced() -> anyhow::Result<()> {
    let b = Builder::new();
    let program = b.let_in(
        vec![("add", b.import("add"))],
        b.call(b.reference("add"), vec![b.int(40), b.int(2)]),
    );
    let traced = run_with(&program, EvalContext::new().traced(true))?;
    assert_eq!(traced, run(&program)?);
    assert_eq!(traced, Value::Int(42));
    Ok(())
}

#[test]
fn test_eval_depth_limit() -> anyhow::Result<()> {
    let b = Builder::new();
    let mut nested = b.int(1);
    for _ in 0..4 {
        nested = b.array(vec![nested.into()]);
    }
    let value = run_with(&nested, EvalContext::with_max_depth(3))?;
    assert_eq!(
        expect_error(&value).message,
        "maximum evaluation depth of 3 exceeded"
    );

    assert!(!run_with(&nested, EvalContext::with_max_depth(5))?.is_error());
    Ok(())
}

#[test]
fn test_eval_non_tail_recursion_hits_depth_limit() -> anyhow::Result<()> {
    let b = Builder::new();
    // count(n) = match n { 0 => 0, #m => add(1, count(sub(m, 1))) }
    let program = |n: i64| {
        let count = countdown(&b, b.int(0), |next| {
            b.call(
                b.reference("add"),
                vec![b.int(1), b.call(b.reference("count"), vec![next])],
            )
        });
        b.let_in(
            vec![
                ("sub", b.import("sub")),
                ("add", b.import("add")),
                ("count", count),
            ],
            b.call(b.reference("count"), vec![b.int(n)]),
        )
    };

    let value = run_with(&program(1_000), EvalContext::with_max_depth(100))?;
    assert_eq!(
        expect_error(&value).message,
        "maximum evaluation depth of 100 exceeded"
    );
    assert_eq!(
        run_with(&program(10), EvalContext::with_max_depth(100))?,
        Value::Int(10)
    );

    // The default limit leaves room for several hundred nested calls
    let deep = program(600);
    let worker = std::thread::Builder::new()
        .stack_size(256 * 1024 * 1024)
        .spawn(move || run(&deep))?;
    let value = worker
        .join()
        .map_err(|_| anyhow::anyhow!("evaluation thread panicked"))??;
    assert_eq!(value, Value::Int(600));
    Ok(())
}
