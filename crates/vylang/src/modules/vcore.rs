//! `vcore`: clock, platform, RNG, and process-introspection primitives.
//! Grounded on `original_source`'s `vcore.cpp`, which implements
//! `now/sleep/platform/random/string/number/input/version`; the
//! remaining entries (`clamp`, `engine`, `build`, `cwd`,
//! `processor_count`, `pid`, `memory_usage`) are supplemented here.

use std::io::Write as _;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::Rng;

use crate::error::RuntimeError;
use crate::intern::Interner;
use crate::namespace::Namespaces;
use crate::value::{format_number, Value};

use super::{define, native_fn};

const MODULE: &str = "vcore";

pub fn setup(namespaces: &mut Namespaces, interner: &mut Interner) {
    define(namespaces, interner, MODULE, "now", native_fn("now", std::rc::Rc::new(now)));
    define(namespaces, interner, MODULE, "sleep", native_fn("sleep", std::rc::Rc::new(sleep)));
    define(namespaces, interner, MODULE, "platform", native_fn("platform", std::rc::Rc::new(platform)));
    define(namespaces, interner, MODULE, "random", native_fn("random", std::rc::Rc::new(random)));
    define(namespaces, interner, MODULE, "input", native_fn("input", std::rc::Rc::new(input)));
    define(namespaces, interner, MODULE, "clamp", native_fn("clamp", std::rc::Rc::new(clamp)));
    define(namespaces, interner, MODULE, "string", native_fn("string", std::rc::Rc::new(to_string_fn)));
    define(namespaces, interner, MODULE, "number", native_fn("number", std::rc::Rc::new(to_number_fn)));

    define(namespaces, interner, MODULE, "version", Value::string(env!("CARGO_PKG_VERSION")).with_read_only(true));
    define(namespaces, interner, MODULE, "engine", Value::string("vylang").with_read_only(true));
    define(namespaces, interner, MODULE, "build", Value::string(build_label()).with_read_only(true));
    define(namespaces, interner, MODULE, "cwd", Value::string(cwd()).with_read_only(true));
    define(
        namespaces,
        interner,
        MODULE,
        "processor_count",
        Value::number(std::thread::available_parallelism().map(|n| n.get() as f64).unwrap_or(1.0)).with_read_only(true),
    );
    define(namespaces, interner, MODULE, "pid", Value::number(std::process::id() as f64).with_read_only(true));
    define(namespaces, interner, MODULE, "memory_usage", Value::number(resident_set_bytes() as f64).with_read_only(true));
}

fn now(_args: &mut Vec<Value>, _ctx: &crate::value::NativeCtx) -> Result<Value, RuntimeError> {
    let secs = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs_f64()).unwrap_or(0.0);
    Ok(Value::number(secs))
}

fn sleep(args: &mut Vec<Value>, _ctx: &crate::value::NativeCtx) -> Result<Value, RuntimeError> {
    let ms = args.first().and_then(Value::as_number).ok_or_else(|| RuntimeError::new(0, "sleep(ms) expects a number"))?;
    std::thread::sleep(Duration::from_millis(ms.max(0.0) as u64));
    Ok(Value::null())
}

fn platform(_args: &mut Vec<Value>, _ctx: &crate::value::NativeCtx) -> Result<Value, RuntimeError> {
    Ok(Value::string(std::env::consts::OS))
}

fn random(args: &mut Vec<Value>, _ctx: &crate::value::NativeCtx) -> Result<Value, RuntimeError> {
    let lo = args.first().and_then(Value::as_number).ok_or_else(|| RuntimeError::new(0, "random(lo, hi) expects 2 numbers"))?;
    let hi = args.get(1).and_then(Value::as_number).ok_or_else(|| RuntimeError::new(0, "random(lo, hi) expects 2 numbers"))?;
    let (lo, hi) = (lo.floor() as i64, hi.floor() as i64);
    if lo > hi {
        return Err(RuntimeError::new(0, "random(lo, hi) requires lo <= hi"));
    }
    let n = rand::thread_rng().gen_range(lo..=hi);
    Ok(Value::number(n as f64))
}

fn input(args: &mut Vec<Value>, _ctx: &crate::value::NativeCtx) -> Result<Value, RuntimeError> {
    if let Some(prompt) = args.first().and_then(Value::as_str) {
        print!("{prompt}");
        let _ = std::io::stdout().flush();
    }
    let mut line = String::new();
    match std::io::stdin().read_line(&mut line) {
        Ok(0) => Ok(Value::null()),
        Ok(_) => Ok(Value::string(line.trim_end_matches(['\n', '\r']).to_owned())),
        Err(_) => Ok(Value::null()),
    }
}

fn clamp(args: &mut Vec<Value>, _ctx: &crate::value::NativeCtx) -> Result<Value, RuntimeError> {
    let v = args.first().and_then(Value::as_number).ok_or_else(|| RuntimeError::new(0, "clamp(v, lo, hi) expects numbers"))?;
    let lo = args.get(1).and_then(Value::as_number).ok_or_else(|| RuntimeError::new(0, "clamp(v, lo, hi) expects numbers"))?;
    let hi = args.get(2).and_then(Value::as_number).ok_or_else(|| RuntimeError::new(0, "clamp(v, lo, hi) expects numbers"))?;
    Ok(Value::number(v.clamp(lo, hi)))
}

fn to_string_fn(args: &mut Vec<Value>, _ctx: &crate::value::NativeCtx) -> Result<Value, RuntimeError> {
    let n = args.first().and_then(Value::as_number).ok_or_else(|| RuntimeError::new(0, "string(n) expects a number"))?;
    Ok(Value::string(format_number(n)))
}

fn to_number_fn(args: &mut Vec<Value>, _ctx: &crate::value::NativeCtx) -> Result<Value, RuntimeError> {
    let s = args.first().and_then(Value::as_str).ok_or_else(|| RuntimeError::new(0, "number(s) expects a string"))?;
    Ok(Value::number(s.trim().parse().unwrap_or(0.0)))
}

fn build_label() -> String {
    format!("{} {}", std::env::consts::OS, std::env::consts::ARCH)
}

fn cwd() -> String {
    std::env::current_dir().map(|p| p.display().to_string()).unwrap_or_default()
}

/// Resident set size in bytes, best-effort. Linux reads `/proc/self/statm`;
/// other platforms have no equivalent here and report 0.
fn resident_set_bytes() -> u64 {
    #[cfg(target_os = "linux")]
    {
        if let Ok(contents) = std::fs::read_to_string("/proc/self/statm") {
            if let Some(pages) = contents.split_whitespace().nth(1) {
                if let Ok(pages) = pages.parse::<u64>() {
                    return pages * 4096;
                }
            }
        }
        0
    }
    #[cfg(not(target_os = "linux"))]
    {
        0
    }
}
