//! Bessel functions of the first and second kind.
//!
//! Below |x| = 8 the order-0/1 values come from the rational fits of
//! Abramowitz & Stegun §9.4; above it from the shared asymptotic form
//! `sqrt(2/(πx)) · (P·cos θ ∓ Q·sin θ)` with phase `θ = x − (2k+1)π/4`,
//! where the modulus polynomials P and Q are the same for both kinds and
//! only the sin/cos mix differs. Higher integer orders recur from there:
//! upward for `Y_n` (stable), and for `J_n` upward when `n <= |x|` but
//! downward with sum normalization when `n > |x|`, where the upward
//! direction explodes.
//!
//! The second kind is only defined for `x > 0`; outside that domain the
//! functions return NaN and the binding layer reports a domain error.

use std::f64::consts::{FRAC_2_PI, FRAC_PI_4};

// Rational-fit coefficients (A&S §9.4.1, §9.4.4), highest power first.
const J0_NUM: [f64; 6] = [
    -184.905_245_6,
    77_392.330_17,
    -11_214_424.18,
    651_619_640.7,
    -13_362_590_354.0,
    57_568_490_574.0,
];
const J0_DEN: [f64; 6] = [
    1.0,
    267.853_271_2,
    59_272.648_53,
    9_494_680.718,
    1_029_532_985.0,
    57_568_490_411.0,
];
const J1_NUM: [f64; 6] = [
    -30.160_366_06,
    15_704.482_60,
    -2_972_611.439,
    242_396_853.1,
    -7_895_059_235.0,
    72_362_614_232.0,
];
const J1_DEN: [f64; 6] = [
    1.0,
    376.999_139_7,
    99_447.433_94,
    18_583_304.74,
    2_300_535_178.0,
    144_725_228_442.0,
];
const Y0_NUM: [f64; 6] = [
    228.462_273_3,
    -86_327.927_57,
    10_879_881.29,
    -512_359_803.6,
    7_062_834_065.0,
    -2_957_821_389.0,
];
const Y0_DEN: [f64; 6] = [
    1.0,
    226.103_024_4,
    47_447.264_70,
    7_189_466.438,
    745_249_964.8,
    40_076_544_269.0,
];
const Y1_NUM: [f64; 6] = [
    0.851_193_793_5e4,
    -0.423_792_272_6e7,
    0.734_926_455_1e9,
    -0.515_343_813_9e11,
    0.127_527_439_0e13,
    -0.490_060_494_3e13,
];
const Y1_DEN: [f64; 7] = [
    1.0,
    0.354_963_288_5e3,
    0.102_042_605_0e6,
    0.224_590_400_2e8,
    0.373_365_036_7e10,
    0.424_441_966_4e12,
    0.249_958_057_0e14,
];

// Asymptotic modulus polynomials in y = (8/x)² (A&S §9.4.3, §9.4.6),
// shared between J and Y of the same order. Highest power first.
const MOD0_P: [f64; 5] = [
    0.209_388_721_1e-6,
    -0.207_337_063_9e-5,
    0.273_451_040_7e-4,
    -0.109_862_862_7e-2,
    1.0,
];
const MOD0_Q: [f64; 5] = [
    -0.934_935_152e-7,
    0.762_109_516_1e-6,
    -0.691_114_765_1e-5,
    0.143_048_876_5e-3,
    -0.156_249_999_5e-1,
];
const MOD1_P: [f64; 5] = [
    -0.240_337_019e-6,
    0.245_752_017_4e-5,
    -0.351_639_649_6e-4,
    0.183_105e-2,
    1.0,
];
const MOD1_Q: [f64; 5] = [
    0.105_787_412e-6,
    -0.882_289_87e-6,
    0.844_919_909_6e-5,
    -0.200_269_087_3e-3,
    0.046_874_999_95,
];

/// Polynomial in `y`, coefficients ordered highest power first.
fn poly(y: f64, coeffs: &[f64]) -> f64 {
    coeffs.iter().fold(0.0, |acc, &c| acc * y + c)
}

/// Large-argument form for x >= 8. `quarter_turns` is the phase offset in
/// units of π/4 (1 for order 0, 3 for order 1); the second kind swaps the
/// sin/cos mix of the modulus polynomials.
fn asymptotic(x: f64, quarter_turns: f64, p: &[f64], q: &[f64], second_kind: bool) -> f64 {
    let z = 8.0 / x;
    let y = z * z;
    let theta = x - quarter_turns * FRAC_PI_4;
    let pv = poly(y, p);
    let qv = z * poly(y, q);
    let mix = if second_kind {
        theta.sin() * pv + theta.cos() * qv
    } else {
        theta.cos() * pv - theta.sin() * qv
    };
    (FRAC_2_PI / x).sqrt() * mix
}

/// Bessel function of the first kind `J_0(x)`.
pub fn j0(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x.is_infinite() {
        return 0.0;
    }
    let ax = x.abs();
    if ax < 8.0 {
        let y = x * x;
        poly(y, &J0_NUM) / poly(y, &J0_DEN)
    } else {
        asymptotic(ax, 1.0, &MOD0_P, &MOD0_Q, false)
    }
}

/// Bessel function of the first kind `J_1(x)`.
pub fn j1(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x.is_infinite() {
        return 0.0;
    }
    let ax = x.abs();
    if ax < 8.0 {
        // the odd symmetry rides on the explicit x factor
        let y = x * x;
        x * (poly(y, &J1_NUM) / poly(y, &J1_DEN))
    } else {
        let magnitude = asymptotic(ax, 3.0, &MOD1_P, &MOD1_Q, false);
        if x < 0.0 { -magnitude } else { magnitude }
    }
}

/// Bessel function of the first kind `J_n(x)` for integer order.
pub fn jn(n: i32, x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    let order = n.abs();
    let value = match order {
        0 => j0(x),
        1 => j1(x),
        _ if x == 0.0 || x.is_infinite() => 0.0,
        _ if f64::from(order) <= x.abs() => {
            // upward: J_{k+1} = (2k/x) J_k − J_{k−1}
            let (mut prev, mut curr) = (j0(x), j1(x));
            for k in 1..order {
                (prev, curr) = (curr, 2.0 * f64::from(k) / x * curr - prev);
            }
            curr
        }
        _ => {
            // Downward from a seed far enough above the order that its
            // arbitrariness has washed out by the time k reaches n, then
            // scale by the sum identity 1 = J_0 + 2(J_2 + J_4 + ...).
            let mut k = order + (50.0 * f64::from(order)).sqrt() as i32 + 15;
            let mut above = 0.0_f64;
            let mut here = 1e-30_f64;
            let mut at_order = 0.0;
            let mut scale_sum = 0.0;
            while k >= 0 {
                if k == order {
                    at_order = here;
                }
                if k % 2 == 0 {
                    scale_sum += if k == 0 { here } else { 2.0 * here };
                }
                let below = 2.0 * f64::from(k) / x * here - above;
                above = here;
                here = below;
                // the unscaled sequence grows without bound; shrink
                // everything together before it can overflow
                if here.abs() > 1e100 {
                    above *= 1e-100;
                    here *= 1e-100;
                    at_order *= 1e-100;
                    scale_sum *= 1e-100;
                }
                k -= 1;
            }
            at_order / scale_sum
        }
    };
    if n < 0 && order % 2 == 1 { -value } else { value }
}

/// Bessel function of the second kind `Y_0(x)`. NaN for `x <= 0`.
pub fn y0(x: f64) -> f64 {
    if x.is_nan() || x <= 0.0 {
        return f64::NAN;
    }
    if x.is_infinite() {
        return 0.0;
    }
    if x < 8.0 {
        let y = x * x;
        poly(y, &Y0_NUM) / poly(y, &Y0_DEN) + FRAC_2_PI * x.ln() * j0(x)
    } else {
        asymptotic(x, 1.0, &MOD0_P, &MOD0_Q, true)
    }
}

/// Bessel function of the second kind `Y_1(x)`. NaN for `x <= 0`.
pub fn y1(x: f64) -> f64 {
    if x.is_nan() || x <= 0.0 {
        return f64::NAN;
    }
    if x.is_infinite() {
        return 0.0;
    }
    if x < 8.0 {
        let y = x * x;
        x * (poly(y, &Y1_NUM) / poly(y, &Y1_DEN)) + FRAC_2_PI * (x.ln() * j1(x) - 1.0 / x)
    } else {
        asymptotic(x, 3.0, &MOD1_P, &MOD1_Q, true)
    }
}

/// Bessel function of the second kind `Y_n(x)` for integer order. NaN for
/// `x <= 0`.
pub fn yn(n: i32, x: f64) -> f64 {
    if x.is_nan() || x <= 0.0 {
        return f64::NAN;
    }
    let order = n.abs();
    let value = match order {
        0 => y0(x),
        1 => y1(x),
        _ => {
            // upward recurrence is stable for the second kind
            let (mut prev, mut curr) = (y0(x), y1(x));
            for k in 1..order {
                (prev, curr) = (curr, 2.0 * f64::from(k) / x * curr - prev);
            }
            curr
        }
    };
    if n < 0 && order % 2 == 1 { -value } else { value }
}
