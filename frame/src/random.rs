//! FILENAME: frame/src/random.rs
//! PURPOSE: Distribution sampling helpers.
//! CONTEXT: Generic over `rand::Rng` so callers can pass a seeded generator
//! in tests and `thread_rng` everywhere else.

use rand::Rng;

/// Samples uniformly from the half-open range `[begin, end)`.
pub fn uniform_between<R: Rng + ?Sized>(rng: &mut R, begin: f64, end: f64) -> f64 {
    rng.gen_range(begin..end)
}

/// Samples uniformly from `[-1, 1)`, the conventional unit range.
pub fn uniform<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    uniform_between(rng, -1.0, 1.0)
}

/// Samples a normal distribution with the given mean and standard
/// deviation, using the Marsaglia polar method: draw points uniformly in
/// the unit square until one lands strictly inside the unit circle, then
/// transform.
pub fn normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    loop {
        let u = uniform(rng);
        let v = uniform(rng);
        let s = u * u + v * v;
        if s > 0.0 && s < 1.0 {
            return u * (-2.0 * s.ln() / s).sqrt() * std_dev + mean;
        }
    }
}
