//! Page backdrop: a gradient plus a decorative particle effect, both keyed by
//! the weather condition code and whether it is night at the location.

use rand::Rng;
use std::fmt;

/// OpenWeather condition groups that get their own look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionBucket {
    Thunderstorm,
    Rain,
    Snow,
    Atmosphere,
    Clear,
    Clouds,
    Fallback,
}

impl ConditionBucket {
    pub fn from_condition(condition_id: u16) -> Self {
        match condition_id {
            200..=299 => ConditionBucket::Thunderstorm,
            300..=599 => ConditionBucket::Rain,
            600..=699 => ConditionBucket::Snow,
            700..=799 => ConditionBucket::Atmosphere,
            800 => ConditionBucket::Clear,
            801.. => ConditionBucket::Clouds,
            _ => ConditionBucket::Fallback,
        }
    }
}

/// Top-to-bottom linear gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gradient {
    pub stops: &'static [&'static str],
}

impl Gradient {
    pub fn for_bucket(bucket: ConditionBucket, is_night: bool) -> Self {
        use ConditionBucket::*;

        let stops: &'static [&'static str] = match (bucket, is_night) {
            (Thunderstorm, false) => &["#485563", "#29323c"],
            (Thunderstorm, true) => &["#0f2027", "#203a43", "#2c5364"],
            (Rain, false) => &["#74ebd5", "#ACB6E5"],
            (Rain, true) => &["#1e3c72", "#2a5298"],
            (Snow, false) => &["#e0eafc", "#cfdef3"],
            (Snow, true) => &["#000428", "#004e92"],
            (Atmosphere, false) => &["#bdc3c7", "#2c3e50"],
            (Atmosphere, true) => &["#2c3e50", "#4ca1af"],
            (Clear, false) => &["#fceabb", "#f8b500"],
            (Clear, true) => &["#0f2027", "#203a43", "#2c5364"],
            (Clouds, false) => &["#d7d2cc", "#304352"],
            (Clouds, true) => &["#232526", "#414345"],
            (Fallback, false) => &["#74ebd5", "#ACB6E5"],
            (Fallback, true) => &["#0f2027", "#203a43", "#2c5364"],
        };
        Self { stops }
    }
}

impl fmt::Display for Gradient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "linear-gradient(to bottom, {})", self.stops.join(", "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    None,
    Rain,
    Snow,
    Fog,
    Clouds,
    SunRays,
    Stars,
}

/// A CSS-like length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Vw(f64),
    Percent(f64),
    Px(f64),
}

/// One decorative element of an ambient effect.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Particle {
    pub left: Option<Length>,
    pub top: Option<Length>,
    pub size_px: Option<f64>,
    pub duration_secs: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmbientEffect {
    pub kind: EffectKind,
    pub particles: Vec<Particle>,
}

impl AmbientEffect {
    pub fn generate<R: Rng + ?Sized>(bucket: ConditionBucket, is_night: bool, rng: &mut R) -> Self {
        let (kind, particles) = match bucket {
            ConditionBucket::Rain => (
                EffectKind::Rain,
                spawn(100, rng, |_, rng| Particle {
                    left: Some(Length::Vw(rng.gen_range(0.0..100.0))),
                    duration_secs: rng.gen_range(0.5..1.0),
                    ..Particle::default()
                }),
            ),
            ConditionBucket::Snow => (
                EffectKind::Snow,
                spawn(50, rng, |_, rng| Particle {
                    left: Some(Length::Vw(rng.gen_range(0.0..100.0))),
                    duration_secs: rng.gen_range(2.0..4.0),
                    size_px: Some(rng.gen_range(3.0..6.0)),
                    ..Particle::default()
                }),
            ),
            ConditionBucket::Atmosphere => (EffectKind::Fog, Vec::new()),
            ConditionBucket::Clouds => (
                EffectKind::Clouds,
                spawn(5, rng, |_, rng| Particle {
                    top: Some(Length::Percent(rng.gen_range(0.0..50.0))),
                    duration_secs: rng.gen_range(30.0..50.0),
                    left: Some(Length::Px(-rng.gen_range(0.0..500.0))),
                    ..Particle::default()
                }),
            ),
            ConditionBucket::Clear if !is_night => (
                EffectKind::SunRays,
                spawn(3, rng, |i, _| Particle {
                    top: Some(Length::Percent(10.0 + i as f64 * 20.0)),
                    duration_secs: 15.0 + i as f64 * 5.0,
                    ..Particle::default()
                }),
            ),
            ConditionBucket::Clear => (
                EffectKind::Stars,
                spawn(50, rng, |_, rng| Particle {
                    top: Some(Length::Percent(rng.gen_range(0.0..100.0))),
                    left: Some(Length::Percent(rng.gen_range(0.0..100.0))),
                    size_px: Some(rng.gen_range(1.0..3.0)),
                    duration_secs: rng.gen_range(1.0..3.0),
                }),
            ),
            ConditionBucket::Thunderstorm | ConditionBucket::Fallback => {
                (EffectKind::None, Vec::new())
            }
        };

        Self { kind, particles }
    }
}

/// Spawn `count` particles, each drawn independently by `make`.
fn spawn<R, F>(count: usize, rng: &mut R, mut make: F) -> Vec<Particle>
where
    R: Rng + ?Sized,
    F: FnMut(usize, &mut R) -> Particle,
{
    (0..count).map(|i| make(i, rng)).collect()
}

/// The full backdrop for one weather reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Backdrop {
    pub bucket: ConditionBucket,
    pub is_night: bool,
    pub gradient: Gradient,
    pub effect: AmbientEffect,
}

impl Backdrop {
    pub fn for_condition<R: Rng + ?Sized>(condition_id: u16, is_night: bool, rng: &mut R) -> Self {
        let bucket = ConditionBucket::from_condition(condition_id);
        Self {
            bucket,
            is_night,
            gradient: Gradient::for_bucket(bucket, is_night),
            effect: AmbientEffect::generate(bucket, is_night, rng),
        }
    }
}
