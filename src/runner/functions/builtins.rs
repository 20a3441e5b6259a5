//! Built-in function library

use super::{CallError, FunctionContext, FunctionResult, FunctionSet, ParamType};
use crate::error::ExpressionError;
use crate::runner::expr::{ObjectValue, Value};
use std::any::Any;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use ParamType::{Any as AnyT, Bool, Number, String as Str};

/// Every built-in function set
pub fn function_sets() -> Vec<FunctionSet> {
    vec![
        string_functions(),
        property_functions(),
        environment_functions(),
        file_functions(),
        directory_functions(),
        path_functions(),
        conversion_functions(),
        int_functions(),
        double_functions(),
        bool_functions(),
        math_functions(),
        platform_functions(),
        version_functions(),
    ]
}

fn text(v: &Value) -> String {
    v.to_string()
}

fn num(v: &Value) -> f64 {
    v.to_number().unwrap_or_default()
}

fn string_functions() -> FunctionSet {
    FunctionSet::new("string")
        .function("length", &[Str], Number, |_, a| {
            Ok(Value::Number(text(&a[0]).chars().count() as f64))
        })
        .function("to-upper", &[Str], Str, |_, a| {
            Ok(Value::Str(text(&a[0]).to_uppercase()))
        })
        .function("to-lower", &[Str], Str, |_, a| {
            Ok(Value::Str(text(&a[0]).to_lowercase()))
        })
        .function("trim", &[Str], Str, |_, a| {
            Ok(Value::Str(text(&a[0]).trim().to_string()))
        })
        .function("contains", &[Str, Str], Bool, |_, a| {
            Ok(Value::Bool(text(&a[0]).contains(&text(&a[1]))))
        })
        .function("starts-with", &[Str, Str], Bool, |_, a| {
            Ok(Value::Bool(text(&a[0]).starts_with(&text(&a[1]))))
        })
        .function("ends-with", &[Str, Str], Bool, |_, a| {
            Ok(Value::Bool(text(&a[0]).ends_with(&text(&a[1]))))
        })
        .function("replace", &[Str, Str, Str], Str, |_, a| {
            Ok(Value::Str(text(&a[0]).replace(&text(&a[1]), &text(&a[2]))))
        })
        .function("substring", &[Str, Number, Number], Str, substring)
        .function("index-of", &[Str, Str], Number, |_, a| {
            let haystack = text(&a[0]);
            let index = haystack
                .find(&text(&a[1]))
                .map(|byte| haystack[..byte].chars().count() as f64)
                .unwrap_or(-1.0);
            Ok(Value::Number(index))
        })
}

fn substring(_: &FunctionContext<'_>, a: &[Value]) -> FunctionResult {
    let s = text(&a[0]);
    let start = non_negative_int(num(&a[1]), "start index")?;
    let length = non_negative_int(num(&a[2]), "length")?;
    let count = s.chars().count();
    if start.checked_add(length).map_or(true, |end| end > count) {
        return Err(CallError::Failed(format!(
            "start index {} and length {} exceed string length {}",
            start, length, count
        )));
    }
    Ok(Value::Str(s.chars().skip(start).take(length).collect()))
}

fn non_negative_int(n: f64, what: &str) -> Result<usize, String> {
    if n < 0.0 || n.fract() != 0.0 {
        return Err(format!("{} must be a non-negative integer, got {}", what, n));
    }
    Ok(n as usize)
}

fn property_functions() -> FunctionSet {
    FunctionSet::new("property")
        .function("exists", &[Str], Bool, |ctx, a| {
            Ok(Value::Bool(ctx.properties.contains(&text(&a[0]))))
        })
        .function("get-value", &[Str], Str, |ctx, a| {
            let name = text(&a[0]);
            match ctx.properties.get(&name) {
                Ok(Some(value)) => Ok(Value::Str(value)),
                Ok(None) => Err(ExpressionError::PropertyNotFound(name).into()),
                Err(e) => Err(e.into()),
            }
        })
        .function("is-readonly", &[Str], Bool, |ctx, a| {
            Ok(Value::Bool(ctx.properties.is_read_only(&text(&a[0]))))
        })
        .function("is-dynamic", &[Str], Bool, |ctx, a| {
            Ok(Value::Bool(ctx.properties.is_dynamic(&text(&a[0]))))
        })
}

fn environment_functions() -> FunctionSet {
    FunctionSet::new("environment")
        .function("get-variable", &[Str], Str, |_, a| {
            let name = text(&a[0]);
            env::var(&name)
                .map(Value::Str)
                .map_err(|_| CallError::Failed(format!("environment variable '{}' is not set", name)))
        })
        .function("variable-exists", &[Str], Bool, |_, a| {
            Ok(Value::Bool(env::var_os(text(&a[0])).is_some()))
        })
}

fn resolve(ctx: &FunctionContext<'_>, path: &str) -> PathBuf {
    ctx.base_dir().join(path)
}

fn file_functions() -> FunctionSet {
    FunctionSet::new("file").function("exists", &[Str], Bool, |ctx, a| {
        Ok(Value::Bool(resolve(ctx, &text(&a[0])).is_file()))
    })
}

fn directory_functions() -> FunctionSet {
    FunctionSet::new("directory").function("exists", &[Str], Bool, |ctx, a| {
        Ok(Value::Bool(resolve(ctx, &text(&a[0])).is_dir()))
    })
}

fn path_functions() -> FunctionSet {
    FunctionSet::new("path")
        .function("combine", &[Str, Str], Str, |_, a| {
            let joined = Path::new(&text(&a[0])).join(text(&a[1]));
            Ok(Value::Str(joined.display().to_string()))
        })
        .function("get-file-name", &[Str], Str, |_, a| {
            let name = Path::new(&text(&a[0]))
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(Value::Str(name))
        })
        .function("get-extension", &[Str], Str, |_, a| {
            let ext = Path::new(&text(&a[0]))
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default();
            Ok(Value::Str(ext))
        })
        .function("get-directory-name", &[Str], Str, |_, a| {
            let dir = Path::new(&text(&a[0]))
                .parent()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            Ok(Value::Str(dir))
        })
        .function("change-extension", &[Str, Str], Str, |_, a| {
            let ext = text(&a[1]);
            let changed = Path::new(&text(&a[0])).with_extension(ext.trim_start_matches('.'));
            Ok(Value::Str(changed.display().to_string()))
        })
}

fn conversion_functions() -> FunctionSet {
    FunctionSet::new("convert").function("to-string", &[AnyT], Str, |_, a| {
        Ok(Value::Str(text(&a[0])))
    })
}

fn int_functions() -> FunctionSet {
    FunctionSet::new("int").function("parse", &[Str], Number, |_, a| {
        let s = text(&a[0]);
        s.trim()
            .parse::<i64>()
            .map(|n| Value::Number(n as f64))
            .map_err(|_| CallError::Failed(format!("'{}' is not an integer", s)))
    })
}

fn double_functions() -> FunctionSet {
    FunctionSet::new("double").function("parse", &[Str], Number, |_, a| {
        let s = text(&a[0]);
        s.trim()
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|_| CallError::Failed(format!("'{}' is not a number", s)))
    })
}

fn bool_functions() -> FunctionSet {
    FunctionSet::new("bool").function("parse", &[Str], Bool, |_, a| {
        let s = text(&a[0]);
        crate::runner::expr::parse_bool(&s)
            .map(Value::Bool)
            .ok_or_else(|| CallError::Failed(format!("'{}' is not a boolean", s)))
    })
}

fn math_functions() -> FunctionSet {
    FunctionSet::new("math")
        .function("min", &[Number, Number], Number, |_, a| {
            Ok(Value::Number(num(&a[0]).min(num(&a[1]))))
        })
        .function("max", &[Number, Number], Number, |_, a| {
            Ok(Value::Number(num(&a[0]).max(num(&a[1]))))
        })
        .function("abs", &[Number], Number, |_, a| Ok(Value::Number(num(&a[0]).abs())))
        .function("round", &[Number], Number, |_, a| {
            Ok(Value::Number(num(&a[0]).round()))
        })
        .function("floor", &[Number], Number, |_, a| {
            Ok(Value::Number(num(&a[0]).floor()))
        })
        .function("ceiling", &[Number], Number, |_, a| {
            Ok(Value::Number(num(&a[0]).ceil()))
        })
}

fn platform_functions() -> FunctionSet {
    FunctionSet::new("platform")
        .function("get-name", &[], Str, |_, _| {
            Ok(Value::Str(env::consts::OS.to_string()))
        })
        .function("is-unix", &[], Bool, |_, _| Ok(Value::Bool(cfg!(unix))))
        .function("is-windows", &[], Bool, |_, _| Ok(Value::Bool(cfg!(windows))))
}

/// A `major.minor.patch` version, returned as an opaque value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub fn parse(s: &str) -> Result<Self, String> {
        let mut parts = [0u64; 3];
        let trimmed = s.trim();
        let pieces: Vec<&str> = trimmed.split('.').collect();
        if pieces.is_empty() || pieces.len() > 3 {
            return Err(format!("'{}' is not a version", s));
        }
        for (slot, piece) in parts.iter_mut().zip(&pieces) {
            *slot = piece
                .parse()
                .map_err(|_| format!("'{}' is not a version", s))?;
        }
        Ok(Version {
            major: parts[0],
            minor: parts[1],
            patch: parts[2],
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl ObjectValue for Version {
    fn type_name(&self) -> &'static str {
        "version"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn version_arg(v: &Value) -> Result<Version, String> {
    match v.downcast::<Version>() {
        Some(version) => Ok(*version),
        None => Version::parse(&v.to_string()),
    }
}

fn version_functions() -> FunctionSet {
    FunctionSet::new("version")
        .function("parse", &[Str], AnyT, |_, a| {
            Version::parse(&text(&a[0]))
                .map(Value::object)
                .map_err(CallError::Failed)
        })
        .function("get-major", &[AnyT], Number, |_, a| {
            Ok(Value::Number(version_arg(&a[0])?.major as f64))
        })
        .function("get-minor", &[AnyT], Number, |_, a| {
            Ok(Value::Number(version_arg(&a[0])?.minor as f64))
        })
        .function("get-patch", &[AnyT], Number, |_, a| {
            Ok(Value::Number(version_arg(&a[0])?.patch as f64))
        })
}
