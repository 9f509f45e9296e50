//! `vmath`: thin wrappers over `f64`'s own methods and
//! `std::f64::consts`, covering every named function and constant even
//! though `original_source`'s trimmed `vmath.cpp` only exercises a few of
//! these.

use std::rc::Rc;

use crate::error::RuntimeError;
use crate::intern::Interner;
use crate::namespace::Namespaces;
use crate::value::{NativeCtx, Value};

use super::{define, native_fn};

const MODULE: &str = "vmath";

macro_rules! unary_fn {
    ($name:literal, $op:expr) => {{
        fn f(args: &mut Vec<Value>, _ctx: &NativeCtx) -> Result<Value, RuntimeError> {
            let x = args.first().and_then(Value::as_number).ok_or_else(|| RuntimeError::new(0, concat!($name, " expects a number")))?;
            Ok(Value::number(($op)(x)))
        }
        native_fn($name, Rc::new(f))
    }};
}

macro_rules! binary_fn {
    ($name:literal, $op:expr) => {{
        fn f(args: &mut Vec<Value>, _ctx: &NativeCtx) -> Result<Value, RuntimeError> {
            let a = args.first().and_then(Value::as_number).ok_or_else(|| RuntimeError::new(0, concat!($name, " expects 2 numbers")))?;
            let b = args.get(1).and_then(Value::as_number).ok_or_else(|| RuntimeError::new(0, concat!($name, " expects 2 numbers")))?;
            Ok(Value::number(($op)(a, b)))
        }
        native_fn($name, Rc::new(f))
    }};
}

pub fn setup(namespaces: &mut Namespaces, interner: &mut Interner) {
    define(namespaces, interner, MODULE, "sqrt", unary_fn!("sqrt", f64::sqrt));
    define(namespaces, interner, MODULE, "abs", unary_fn!("abs", f64::abs));
    define(namespaces, interner, MODULE, "sin", unary_fn!("sin", f64::sin));
    define(namespaces, interner, MODULE, "cos", unary_fn!("cos", f64::cos));
    define(namespaces, interner, MODULE, "tan", unary_fn!("tan", f64::tan));
    define(namespaces, interner, MODULE, "asin", unary_fn!("asin", f64::asin));
    define(namespaces, interner, MODULE, "acos", unary_fn!("acos", f64::acos));
    define(namespaces, interner, MODULE, "atan", unary_fn!("atan", f64::atan));
    define(namespaces, interner, MODULE, "atan2", binary_fn!("atan2", f64::atan2));
    define(namespaces, interner, MODULE, "sinh", unary_fn!("sinh", f64::sinh));
    define(namespaces, interner, MODULE, "cosh", unary_fn!("cosh", f64::cosh));
    define(namespaces, interner, MODULE, "tanh", unary_fn!("tanh", f64::tanh));
    define(namespaces, interner, MODULE, "log", unary_fn!("log", f64::ln));
    define(namespaces, interner, MODULE, "log10", unary_fn!("log10", f64::log10));
    define(namespaces, interner, MODULE, "exp", unary_fn!("exp", f64::exp));
    define(namespaces, interner, MODULE, "pow", binary_fn!("pow", f64::powf));
    define(namespaces, interner, MODULE, "floor", unary_fn!("floor", f64::floor));
    define(namespaces, interner, MODULE, "ceil", unary_fn!("ceil", f64::ceil));
    define(namespaces, interner, MODULE, "round", unary_fn!("round", f64::round));
    define(namespaces, interner, MODULE, "min", binary_fn!("min", f64::min));
    define(namespaces, interner, MODULE, "max", binary_fn!("max", f64::max));
    define(namespaces, interner, MODULE, "fmod", binary_fn!("fmod", |a: f64, b: f64| a % b));
    define(namespaces, interner, MODULE, "hypot", binary_fn!("hypot", f64::hypot));
    define(namespaces, interner, MODULE, "degrees", unary_fn!("degrees", f64::to_degrees));
    define(namespaces, interner, MODULE, "radians", unary_fn!("radians", f64::to_radians));
    define(namespaces, interner, MODULE, "erf", unary_fn!("erf", erf));
    define(namespaces, interner, MODULE, "erfc", unary_fn!("erfc", |x: f64| 1.0 - erf(x)));
    define(namespaces, interner, MODULE, "tgamma", unary_fn!("tgamma", gamma));
    define(namespaces, interner, MODULE, "lgamma", unary_fn!("lgamma", |x: f64| gamma(x).abs().ln()));
    define(namespaces, interner, MODULE, "clamp", native_fn("clamp", Rc::new(clamp3)));

    define(namespaces, interner, MODULE, "pi", Value::number(std::f64::consts::PI).with_read_only(true));
    define(namespaces, interner, MODULE, "e", Value::number(std::f64::consts::E).with_read_only(true));
    define(namespaces, interner, MODULE, "tau", Value::number(std::f64::consts::TAU).with_read_only(true));
    define(namespaces, interner, MODULE, "phi", Value::number(1.618_033_988_749_895).with_read_only(true));
    define(namespaces, interner, MODULE, "euler_gamma", Value::number(0.577_215_664_901_532_9).with_read_only(true));
    define(namespaces, interner, MODULE, "sqrt2", Value::number(std::f64::consts::SQRT_2).with_read_only(true));
    define(namespaces, interner, MODULE, "inf", Value::number(f64::INFINITY).with_read_only(true));
    define(namespaces, interner, MODULE, "nan", Value::number(f64::NAN).with_read_only(true));
}

fn clamp3(args: &mut Vec<Value>, _ctx: &NativeCtx) -> Result<Value, RuntimeError> {
    let v = args.first().and_then(Value::as_number).ok_or_else(|| RuntimeError::new(0, "clamp(v, lo, hi) expects numbers"))?;
    let lo = args.get(1).and_then(Value::as_number).ok_or_else(|| RuntimeError::new(0, "clamp(v, lo, hi) expects numbers"))?;
    let hi = args.get(2).and_then(Value::as_number).ok_or_else(|| RuntimeError::new(0, "clamp(v, lo, hi) expects numbers"))?;
    Ok(Value::number(v.clamp(lo, hi)))
}

/// Abramowitz & Stegun 7.1.26 approximation; std has no `erf`.
fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let a1 = 0.254_829_592;
    let a2 = -0.284_496_736;
    let a3 = 1.421_413_741;
    let a4 = -1.453_152_027;
    let a5 = 1.061_405_429;
    let p = 0.327_591_1;
    let t = 1.0 / (1.0 + p * x);
    let poly = ((((a5 * t + a4) * t + a3) * t + a2) * t + a1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Lanczos approximation; std has no `tgamma`.
fn gamma(x: f64) -> f64 {
    const G: f64 = 7.0;
    const COEFFS: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];
    if x < 0.5 {
        std::f64::consts::PI / ((std::f64::consts::PI * x).sin() * gamma(1.0 - x))
    } else {
        let x = x - 1.0;
        let mut a = COEFFS[0];
        let t = x + G + 0.5;
        for (i, c) in COEFFS.iter().enumerate().skip(1) {
            a += c / (x + i as f64);
        }
        (2.0 * std::f64::consts::PI).sqrt() * t.powf(x + 0.5) * (-t).exp() * a
    }
}
