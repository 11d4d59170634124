// Score enrichment core.
// Implements: impact-ranked suggestions, experience-level calibration, ATS
// pass probability, benchmark history, and assembled feedback.
// Calculators are pure functions over static configuration; the benchmark
// tracker is the only stateful piece.

pub mod benchmark;
pub mod calibration;
pub mod enrichment;
pub mod feedback;
pub mod handlers;
pub mod impact;
pub mod pass_probability;
pub mod prioritizer;
