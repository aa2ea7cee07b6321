//! Derivative-free minimization with Powell's conjugate direction method.
//!
//! Each outer iteration runs a Brent line search along every direction of the
//! current set, then tries to replace the direction of largest decrease with
//! the net displacement of the iteration.

use ndarray::{Array1, Array2, ArrayView1};
use std::cell::Cell;

const GOLDEN_RATIO: f64 = 1.618_034;
const GOLDEN_SECTION: f64 = 0.381_966_0;
const BRACKET_GROW_LIMIT: f64 = 110.0;
const BRACKET_MAX_ITERATIONS: usize = 1000;
const BRENT_MAX_ITERATIONS: usize = 500;
const BRENT_MIN_TOLERANCE: f64 = 1e-11;
const TINY: f64 = 1e-20;

#[derive(Debug, Clone)]
pub struct PowellOptions {
    pub max_iterations: usize,
    /// Relative tolerance on the line-search position.
    pub xtol: f64,
    /// Relative tolerance on the objective decrease per iteration.
    pub ftol: f64,
}

impl Default for PowellOptions {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            xtol: 1e-4,
            ftol: 1e-4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Minimum {
    pub point: Array1<f64>,
    pub value: f64,
    pub iterations: usize,
    pub evaluations: usize,
    pub converged: bool,
}

struct CountingObjective<F> {
    inner: F,
    calls: Cell<usize>,
}

impl<F> CountingObjective<F>
where
    F: Fn(ArrayView1<f64>) -> f64,
{
    fn eval(&self, point: ArrayView1<f64>) -> f64 {
        self.calls.set(self.calls.get() + 1);
        (self.inner)(point)
    }
}

/// Minimizes `objective` starting at `start`.
///
/// Never fails: a non-finite objective value or hitting the iteration cap
/// yields a `Minimum` with `converged == false`.
pub fn minimize<F>(objective: F, start: Array1<f64>, options: &PowellOptions) -> Minimum
where
    F: Fn(ArrayView1<f64>) -> f64,
{
    let objective = CountingObjective {
        inner: objective,
        calls: Cell::new(0),
    };
    let dimension = start.len();
    let mut directions: Array2<f64> = Array2::eye(dimension);
    let mut x = start;
    let mut fval = objective.eval(x.view());
    let line_tolerance = options.xtol * 100.0;

    let finish = |point: Array1<f64>, value: f64, iterations: usize, converged: bool| Minimum {
        point,
        value,
        iterations,
        evaluations: objective.calls.get(),
        converged,
    };

    if !fval.is_finite() {
        return finish(x, fval, 0, false);
    }

    for iteration in 1..=options.max_iterations {
        let iteration_start = x.clone();
        let fx = fval;
        let mut largest_drop = 0.0;
        let mut largest_drop_index = 0;

        for i in 0..dimension {
            let direction = directions.row(i).to_owned();
            let before = fval;
            let (step, value) = line_search(&objective, &x, &direction, fval, line_tolerance);
            x = &x + &(&direction * step);
            fval = value;
            if !fval.is_finite() {
                return finish(x, fval, iteration, false);
            }
            if before - fval > largest_drop {
                largest_drop = before - fval;
                largest_drop_index = i;
            }
        }

        let bound = options.ftol * (fx.abs() + fval.abs()) + TINY;
        if 2.0 * (fx - fval) <= bound {
            return finish(x, fval, iteration, true);
        }

        let displacement = &x - &iteration_start;
        let extrapolated = &x + &displacement;
        let f_extrapolated = objective.eval(extrapolated.view());

        if fx > f_extrapolated {
            let mut t = 2.0 * (fx + f_extrapolated - 2.0 * fval);
            let lost = fx - fval - largest_drop;
            t *= lost * lost;
            let gained = fx - f_extrapolated;
            t -= largest_drop * gained * gained;
            if t < 0.0 {
                let (step, value) =
                    line_search(&objective, &x, &displacement, fval, line_tolerance);
                let moved = &displacement * step;
                x = &x + &moved;
                fval = value;
                if !fval.is_finite() {
                    return finish(x, fval, iteration, false);
                }
                replace_direction(&mut directions, largest_drop_index, &moved);
            }
        }
    }

    finish(x, fval, options.max_iterations, false)
}

/// Drops the direction of largest decrease and appends `moved`, the step
/// actually taken along the extrapolated displacement. A zero step leaves the
/// set unchanged so it never degenerates.
fn replace_direction(
    directions: &mut Array2<f64>,
    largest_drop_index: usize,
    moved: &Array1<f64>,
) {
    if moved.iter().all(|&component| component == 0.0) {
        return;
    }
    let last_index = directions.nrows() - 1;
    let last = directions.row(last_index).to_owned();
    directions.row_mut(largest_drop_index).assign(&last);
    directions.row_mut(last_index).assign(moved);
}

/// Returns the step along `direction` minimizing the objective and the value there.
fn line_search<F>(
    objective: &CountingObjective<F>,
    origin: &Array1<f64>,
    direction: &Array1<f64>,
    value_at_origin: f64,
    tolerance: f64,
) -> (f64, f64)
where
    F: Fn(ArrayView1<f64>) -> f64,
{
    let phi = |step: f64| {
        let trial = origin + &(direction * step);
        objective.eval(trial.view())
    };
    let bracket = Bracket::search(&phi, 0.0, 1.0, value_at_origin);
    let (step, value) = brent(&phi, &bracket, tolerance);
    if value <= value_at_origin || !value.is_finite() {
        (step, value)
    } else {
        (0.0, value_at_origin)
    }
}

struct Bracket {
    a: f64,
    b: f64,
    c: f64,
    fb: f64,
}

impl Bracket {
    /// Walks downhill from `[a, b]` until `f(b)` is below both `f(a)` and `f(c)`.
    fn search(phi: &impl Fn(f64) -> f64, mut a: f64, mut b: f64, fa_known: f64) -> Self {
        let mut fa = fa_known;
        let mut fb = phi(b);
        if fa < fb {
            std::mem::swap(&mut a, &mut b);
            std::mem::swap(&mut fa, &mut fb);
        }
        let mut c = b + GOLDEN_RATIO * (b - a);
        let mut fc = phi(c);

        let mut iterations = 0;
        while fc < fb {
            let tmp1 = (b - a) * (fb - fc);
            let tmp2 = (b - c) * (fb - fa);
            let val = tmp2 - tmp1;
            let denom = if val.abs() < TINY { 2.0 * TINY } else { 2.0 * val };
            let mut w = b - ((b - c) * tmp2 - (b - a) * tmp1) / denom;
            let w_limit = b + BRACKET_GROW_LIMIT * (c - b);
            if iterations > BRACKET_MAX_ITERATIONS {
                break;
            }
            iterations += 1;

            let mut fw;
            if (w - c) * (b - w) > 0.0 {
                fw = phi(w);
                if fw < fc {
                    return Self { a: b, b: w, c, fb: fw };
                } else if fw > fb {
                    return Self { a, b, c: w, fb };
                }
                w = c + GOLDEN_RATIO * (c - b);
                fw = phi(w);
            } else if (w - w_limit) * (w_limit - c) >= 0.0 {
                w = w_limit;
                fw = phi(w);
            } else if (w - w_limit) * (c - w) > 0.0 {
                fw = phi(w);
                if fw < fc {
                    b = c;
                    c = w;
                    w = c + GOLDEN_RATIO * (c - b);
                    fb = fc;
                    fc = fw;
                    fw = phi(w);
                }
            } else {
                w = c + GOLDEN_RATIO * (c - b);
                fw = phi(w);
            }
            a = b;
            b = c;
            c = w;
            fa = fb;
            fb = fc;
            fc = fw;
        }

        Self { a, b, c, fb }
    }
}

fn brent(phi: &impl Fn(f64) -> f64, bracket: &Bracket, tolerance: f64) -> (f64, f64) {
    let (mut lo, mut hi) = if bracket.a < bracket.c {
        (bracket.a, bracket.c)
    } else {
        (bracket.c, bracket.a)
    };
    let mut x = bracket.b;
    let mut w = x;
    let mut v = x;
    let mut fx = bracket.fb;
    let mut fw = fx;
    let mut fv = fx;
    let mut delta = 0.0_f64;
    let mut rat = 0.0_f64;

    for _ in 0..BRENT_MAX_ITERATIONS {
        let tol1 = tolerance * x.abs() + BRENT_MIN_TOLERANCE;
        let tol2 = 2.0 * tol1;
        let midpoint = 0.5 * (lo + hi);
        if (x - midpoint).abs() < tol2 - 0.5 * (hi - lo) {
            break;
        }

        if delta.abs() <= tol1 {
            delta = if x >= midpoint { lo - x } else { hi - x };
            rat = GOLDEN_SECTION * delta;
        } else {
            // Parabolic step through x, w, v.
            let tmp1 = (x - w) * (fx - fv);
            let mut tmp2 = (x - v) * (fx - fw);
            let mut p = (x - v) * tmp2 - (x - w) * tmp1;
            tmp2 = 2.0 * (tmp2 - tmp1);
            if tmp2 > 0.0 {
                p = -p;
            }
            tmp2 = tmp2.abs();
            let previous_delta = delta;
            delta = rat;
            if p > tmp2 * (lo - x)
                && p < tmp2 * (hi - x)
                && p.abs() < (0.5 * tmp2 * previous_delta).abs()
            {
                rat = p / tmp2;
                let u = x + rat;
                if (u - lo) < tol2 || (hi - u) < tol2 {
                    rat = if midpoint - x >= 0.0 { tol1 } else { -tol1 };
                }
            } else {
                delta = if x >= midpoint { lo - x } else { hi - x };
                rat = GOLDEN_SECTION * delta;
            }
        }

        let u = if rat.abs() < tol1 {
            if rat >= 0.0 {
                x + tol1
            } else {
                x - tol1
            }
        } else {
            x + rat
        };
        let fu = phi(u);

        if fu > fx {
            if u < x {
                lo = u;
            } else {
                hi = u;
            }
            if fu <= fw || w == x {
                v = w;
                w = u;
                fv = fw;
                fw = fu;
            } else if fu <= fv || v == x || v == w {
                v = u;
                fv = fu;
            }
        } else {
            if u >= x {
                lo = x;
            } else {
                hi = x;
            }
            v = w;
            w = x;
            x = u;
            fv = fw;
            fw = fx;
            fx = fu;
        }
    }

    (x, fx)
}
