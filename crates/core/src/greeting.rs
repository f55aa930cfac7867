//! Greeting line for the job creation view.

use rand::seq::IndexedRandom;
use rand::Rng;

pub const GREETINGS: &[&str] = &[
    "Ready to render something beautiful?",
    "Let's light up some blocks.",
    "Another scene for the render farm!",
    "Time to put those render nodes to work.",
    "May your samples converge quickly.",
];

/// Pick a greeting using the caller's random source. Views call this once
/// when they are constructed.
pub fn pick_greeting<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    GREETINGS.choose(rng).copied().unwrap_or(GREETINGS[0])
}
