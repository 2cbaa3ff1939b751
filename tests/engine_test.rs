//! End-to-end tests for Engine: tokenize, resolve, bind, invoke.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rstest::{fixture, rstest};

use cmdlet::application::{
    DispatchError, Engine, Handler, HandlerError, Param, RegistryBuilder,
};
use cmdlet::domain::{ParamType, Value};
use cmdlet::util::testing;

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

#[derive(Debug)]
struct Refused;

impl std::fmt::Display for Refused {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("refused")
    }
}

impl std::error::Error for Refused {}

/// Records every call as (method, bound values).
#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<(String, Vec<Value>)>>,
    released: Arc<AtomicBool>,
}

impl Recorder {
    fn record(&self, method: &str, values: &[Value]) {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), values.to_vec()));
    }

    fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Handler for Recorder {
    fn register(commands: &mut RegistryBuilder<Self>) {
        commands
            .mark("TestMethod")
            .named("test")
            .param(Param::required("value1", ParamType::String))
            .param(Param::optional("value2", "val-2").lookup("o"))
            .param(Param::optional("value3", 0i32).lookup("v"))
            .param(Param::optional("value4", false).lookup("b"))
            .bind(|h, args| {
                h.record("TestMethod", args.values());
                Ok(None)
            });

        commands
            .mark("scale_int")
            .named("scale")
            .param(Param::required("n", ParamType::I32))
            .bind(|h, args| {
                h.record("scale_int", args.values());
                Ok(Some(Value::I32(args.get::<i32>(0)? * 2)))
            });

        commands
            .mark("scale_text")
            .named("scale")
            .param(Param::required("s", ParamType::String))
            .bind(|h, args| {
                h.record("scale_text", args.values());
                Ok(Some(Value::from(args.get::<String>(0)?.repeat(2))))
            });

        commands
            .mark("guard")
            .param(Param::required("n", ParamType::U8))
            .bind(|_, args| {
                let n: u8 = args.get(0)?;
                if n == 0 {
                    Err(Refused.into())
                } else {
                    Ok(Some(Value::U8(n)))
                }
            });

        // the fallback must not run when `guard` itself fails
        commands
            .mark("guard_any")
            .named("guard")
            .param(Param::required("s", ParamType::String))
            .bind(|h, args| {
                h.record("guard_any", args.values());
                Ok(None)
            });

        commands
            .mark("try_parse")
            .param(Param::required("text", ParamType::String))
            .param(Param::by_ref("result", ParamType::I32))
            .bind(|_, _| Ok(None));

        commands
            .mark("pair")
            .param(Param::required("a", ParamType::String))
            .param(Param::required("b", ParamType::I64))
            .param(Param::optional("sep", ":").lookup("s"))
            .bind(|_, args| {
                Ok(Some(Value::from(format!(
                    "{}{}{}",
                    args.get::<String>(0)?,
                    args.get::<String>(2)?,
                    args.get::<i64>(1)?
                ))))
            });

        commands
            .mark("plain_name")
            .param(Param::optional("count", 1u16))
            .bind(|_, args| Ok(Some(Value::U16(args.get(0)?))));
    }

    fn release(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

#[fixture]
fn engine() -> Engine<Recorder> {
    Engine::create()
}

#[rstest]
fn given_reference_line_when_executing_then_binds_all_parameters(engine: Engine<Recorder>) {
    let result = engine.execute(r#"test -v 80 AAAA -o "x-\"x\"" -b on"#);

    assert!(result.is_success(), "{}", result);
    assert!(result.value().is_none());
    assert_eq!(
        engine.handler().calls(),
        vec![(
            "TestMethod".to_string(),
            vec![
                Value::from("AAAA"),
                Value::from(r#"x-"x""#),
                Value::I32(80),
                Value::Bool(true),
            ]
        )]
    );
}

#[rstest]
fn given_only_required_argument_when_executing_then_defaults_fill_in(engine: Engine<Recorder>) {
    assert!(engine.execute("test AAAA").is_success());
    assert_eq!(
        engine.handler().calls()[0].1,
        vec![
            Value::from("AAAA"),
            Value::from("val-2"),
            Value::I32(0),
            Value::Bool(false),
        ]
    );
}

#[rstest]
fn given_bad_optional_value_when_executing_then_default_used(engine: Engine<Recorder>) {
    assert!(engine.execute("test AAAA -v eighty -b maybe").is_success());
    let values = &engine.handler().calls()[0].1;
    assert_eq!(values[2], Value::I32(0));
    assert_eq!(values[3], Value::Bool(false));
}

#[rstest]
#[case("TEST a")]
#[case("test a")]
#[case("Test a")]
#[case("tEsT a")]
fn given_any_case_when_executing_then_resolves(engine: Engine<Recorder>, #[case] line: &str) {
    assert!(engine.execute(line).is_success());
}

#[rstest]
fn given_unknown_command_when_executing_then_method_not_found(engine: Engine<Recorder>) {
    let result = engine.execute("deploy now");

    match result.error() {
        Some(DispatchError::MethodNotFound { handler, command }) => {
            assert!(handler.ends_with("Recorder"));
            assert_eq!(command, "deploy");
        }
        other => panic!("expected method-not-found, got {:?}", other),
    }
}

#[rstest]
fn given_missing_required_argument_when_executing_then_argument_mismatch(
    engine: Engine<Recorder>,
) {
    let result = engine.execute("test -v 1");
    assert!(matches!(
        result.error(),
        Some(DispatchError::ArgumentMismatch { .. })
    ));
    assert!(engine.handler().calls().is_empty());
}

#[rstest]
#[case("")]
#[case("    ")]
#[case("\t \n")]
fn given_blank_line_when_executing_then_invalid_input(
    engine: Engine<Recorder>,
    #[case] line: &str,
) {
    assert!(matches!(
        engine.execute(line).error(),
        Some(DispatchError::InvalidInput)
    ));
}

#[rstest]
fn given_overloads_when_first_binds_then_first_runs(engine: Engine<Recorder>) {
    assert_eq!(engine.execute("scale 21").value(), Some(&Value::I32(42)));
    assert_eq!(engine.handler().calls()[0].0, "scale_int");
}

#[rstest]
fn given_overloads_when_first_rejects_then_next_runs(engine: Engine<Recorder>) {
    assert_eq!(engine.execute("scale ab").value(), Some(&Value::from("abab")));

    let calls = engine.handler().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0], ("scale_text".to_string(), vec![Value::from("ab")]));
}

#[rstest]
fn given_handler_error_when_executing_then_stops_without_fallback(engine: Engine<Recorder>) {
    let result = engine.execute("guard 0");

    let Some(DispatchError::Execution { command, source }) = result.error() else {
        panic!("expected execution error, got {}", result);
    };
    assert_eq!(command, "guard");
    assert_eq!(source.to_string(), "refused");
    assert!(engine.handler().calls().is_empty());
}

#[rstest]
fn given_by_ref_only_candidate_when_executing_then_method_not_found(engine: Engine<Recorder>) {
    assert!(matches!(
        engine.execute("try_parse 12").error(),
        Some(DispatchError::MethodNotFound { .. })
    ));
}

#[rstest]
fn given_uncoercible_middle_argument_when_executing_then_no_shift(engine: Engine<Recorder>) {
    // "b" is not a number: the candidate fails rather than binding "7" to `b`
    assert!(matches!(
        engine.execute("pair x notanumber 7").error(),
        Some(DispatchError::ArgumentMismatch { .. })
    ));
    assert_eq!(
        engine.execute("pair x 7 -s =").value(),
        Some(&Value::from("x=7"))
    );
}

#[rstest]
fn given_optional_without_lookup_when_executing_then_uses_declared_name(
    engine: Engine<Recorder>,
) {
    assert_eq!(
        engine.execute("plain_name -count 9").value(),
        Some(&Value::U16(9))
    );
    assert_eq!(engine.execute("plain_name").value(), Some(&Value::U16(1)));
}

#[rstest]
fn given_trailing_flag_when_executing_then_ignored(engine: Engine<Recorder>) {
    assert!(engine.execute("test AAAA -v").is_success());
    assert_eq!(engine.handler().calls()[0].1[2], Value::I32(0));
}

#[test]
fn given_engine_when_dropped_then_handler_released() {
    let released = Arc::new(AtomicBool::new(false));
    let handler = Recorder {
        released: Arc::clone(&released),
        ..Recorder::default()
    };

    let engine = Engine::new(handler);
    assert!(!released.load(Ordering::SeqCst));
    drop(engine);

    assert!(released.load(Ordering::SeqCst));
}

#[test]
fn given_shared_engine_when_executing_from_threads_then_all_succeed() {
    let engine = Engine::<Recorder>::create();
    let succeeded = AtomicUsize::new(0);

    std::thread::scope(|s| {
        for i in 0..8 {
            let engine = &engine;
            let succeeded = &succeeded;
            s.spawn(move || {
                if engine.execute(&format!("scale {}", i)).is_success() {
                    succeeded.fetch_add(1, Ordering::SeqCst);
                }
            });
        }
    });

    assert_eq!(succeeded.load(Ordering::SeqCst), 8);
    assert_eq!(engine.handler().calls().len(), 8);
}

#[test]
fn given_handler_error_type_when_boxing_then_source_preserved() {
    let error: HandlerError = Refused.into();
    let dispatch = DispatchError::Execution {
        command: "guard".to_string(),
        source: error,
    };
    assert_eq!(dispatch.kind(), "execution");
    assert!(std::error::Error::source(&dispatch).is_some());
}
