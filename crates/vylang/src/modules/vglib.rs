//! `vglib`: a single demo routine, `donut(A, B)`, writing ANSI-escape
//! frames of a rotating torus to stdout. A faithful-enough stand-in with
//! the same signature and ANSI framing as the classic donut demo
//! `original_source` names, without attempting frame-for-frame parity.

use std::rc::Rc;

use crate::error::RuntimeError;
use crate::intern::Interner;
use crate::namespace::Namespaces;
use crate::value::{NativeCtx, Value};

use super::{define, native_fn};

const MODULE: &str = "vglib";

pub fn setup(namespaces: &mut Namespaces, interner: &mut Interner) {
    define(namespaces, interner, MODULE, "donut", native_fn("donut", Rc::new(donut)));
}

fn donut(args: &mut Vec<Value>, _ctx: &NativeCtx) -> Result<Value, RuntimeError> {
    let a = args.first().and_then(Value::as_number).unwrap_or(0.0);
    let b = args.get(1).and_then(Value::as_number).unwrap_or(0.0);
    render_frame(a, b);
    Ok(Value::null())
}

/// One frame of the spinning-donut raymarch, at rotation angles `a`
/// (around the x axis) and `b` (around the z axis).
fn render_frame(a: f64, b: f64) {
    const WIDTH: usize = 80;
    const HEIGHT: usize = 22;
    let mut output = [' '; WIDTH * HEIGHT];
    let mut zbuffer = [0.0_f64; WIDTH * HEIGHT];
    let (sin_a, cos_a) = a.sin_cos();
    let (sin_b, cos_b) = b.sin_cos();

    let mut theta = 0.0_f64;
    while theta < std::f64::consts::TAU {
        let (sin_theta, cos_theta) = theta.sin_cos();
        let mut phi = 0.0_f64;
        while phi < std::f64::consts::TAU {
            let (sin_phi, cos_phi) = phi.sin_cos();
            let circle_x = cos_theta + 2.0;
            let circle_y = sin_theta;

            let x = circle_x * (cos_b * cos_phi + sin_a * sin_b * sin_phi) - circle_y * cos_a * sin_b;
            let y = circle_x * (sin_b * cos_phi - sin_a * cos_b * sin_phi) + circle_y * cos_a * cos_b;
            let z = 5.0 + cos_a * circle_x * sin_phi + circle_y * sin_a;
            let ooz = 1.0 / z;

            let xp = (WIDTH as f64 / 2.0 + 30.0 * ooz * x) as isize;
            let yp = (HEIGHT as f64 / 2.0 - 15.0 * ooz * y) as isize;

            let luminance = cos_phi * cos_theta * sin_b - cos_a * cos_theta * sin_phi - sin_a * sin_theta
                + cos_b * (cos_a * sin_theta - cos_theta * sin_a * sin_phi);

            if (0..WIDTH as isize).contains(&xp) && (0..HEIGHT as isize).contains(&yp) {
                let idx = (xp as usize) + (yp as usize) * WIDTH;
                if ooz > zbuffer[idx] {
                    zbuffer[idx] = ooz;
                    let luminance_index = ((luminance * 8.0) as isize).clamp(0, 11) as usize;
                    output[idx] = b".,-~:;=!*#$@"[luminance_index] as char;
                }
            }
            phi += 0.07;
        }
        theta += 0.02;
    }

    print!("\x1b[H");
    for row in 0..HEIGHT {
        let line: String = output[row * WIDTH..(row + 1) * WIDTH].iter().collect();
        println!("{line}");
    }
}
