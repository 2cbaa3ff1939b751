//! Demonstration handler used by the `cmdlet` binary.

use std::fmt;

use chrono::{DateTime, FixedOffset, TimeDelta};
use tracing::debug;
use uuid::Uuid;

use crate::application::{Handler, HandlerError, Param, RegistryBuilder};
use crate::domain::{ParamType, Value};

#[derive(Debug)]
struct DemoFailure(String);

impl fmt::Display for DemoFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "demo failure: {}", self.0)
    }
}

impl std::error::Error for DemoFailure {}

const MAX_ECHO: u32 = 1_000;

/// Handler exposing a handful of sample commands.
#[derive(Debug, Default)]
pub struct DemoHandler;

impl DemoHandler {
    fn test_method(value1: &str, value2: &str, value3: i32, value4: bool) -> String {
        format!(
            "value1: {}\nvalue2: {}\nvalue3: {}\nvalue4: {}",
            value1, value2, value3, value4
        )
    }

    fn echo(text: &str, times: u32) -> Result<String, HandlerError> {
        if times > MAX_ECHO {
            let message = format!("echo repeats at most {} times", MAX_ECHO);
            return Err(DemoFailure(message).into());
        }
        Ok(vec![text; times as usize].join(" "))
    }

    fn shift(at: DateTime<FixedOffset>, by: TimeDelta) -> Result<DateTime<FixedOffset>, HandlerError> {
        at.checked_add_signed(by)
            .ok_or_else(|| DemoFailure(format!("{} + {} is out of range", at, by)).into())
    }
}

impl Handler for DemoHandler {
    fn register(commands: &mut RegistryBuilder<Self>) {
        commands
            .mark("TestMethod")
            .named("test")
            .params([
                Param::required("value1", ParamType::String),
                Param::optional("value2", "val-2").lookup("o"),
                Param::optional("value3", 0i32).lookup("v"),
                Param::optional("value4", false).lookup("b"),
            ])
            .bind(|_, args| {
                let text = Self::test_method(
                    &args.get::<String>(0)?,
                    &args.get::<String>(1)?,
                    args.get(2)?,
                    args.get(3)?,
                );
                Ok(Some(Value::from(text)))
            });

        commands
            .mark("echo")
            .param(Param::required("text", ParamType::String))
            .param(Param::optional("times", 1u32).lookup("n"))
            .bind(|_, args| {
                Ok(Some(Value::from(Self::echo(
                    &args.get::<String>(0)?,
                    args.get(1)?,
                )?)))
            });

        // integer overload first: "add 1 2" stays integral
        commands
            .mark("add_integers")
            .named("add")
            .param(Param::required("a", ParamType::I64))
            .param(Param::required("b", ParamType::I64))
            .bind(|_, args| {
                let (a, b): (i64, i64) = (args.get(0)?, args.get(1)?);
                let sum = a
                    .checked_add(b)
                    .ok_or_else(|| DemoFailure(format!("{} + {} overflows", a, b)))?;
                Ok(Some(Value::I64(sum)))
            });

        commands
            .mark("add_floats")
            .named("add")
            .param(Param::required("a", ParamType::F64))
            .param(Param::required("b", ParamType::F64))
            .bind(|_, args| Ok(Some(Value::F64(args.get::<f64>(0)? + args.get::<f64>(1)?))));

        commands
            .mark("shift")
            .param(Param::required("at", ParamType::DateTimeOffset))
            .param(Param::required("by", ParamType::Duration))
            .bind(|_, args| Ok(Some(Value::from(Self::shift(args.get(0)?, args.get(1)?)?))));

        commands
            .mark("kind")
            .param(Param::required("of", ParamType::Type))
            .bind(|_, args| {
                let ty: ParamType = args.get(0)?;
                Ok(Some(Value::from(ty.name())))
            });

        commands.mark("new_id").named("new-id").bind(|_, _| {
            let id = Uuid::new_v4();
            debug!("generated {}", id);
            Ok(Some(Value::Uuid(id)))
        });

        commands
            .mark("fail")
            .param(Param::optional("reason", "requested").lookup("r"))
            .bind(|_, args| Err(DemoFailure(args.get::<String>(0)?).into()));
    }
}
