//! Low-level DSP primitives used by the tine voice.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside voice structs. They stay focused on the
//! signal-processing math; the voice model in `synth::tine` wires them into a
//! physical instrument.

/// Hammer attack and damper release.
pub mod envelope;
/// State-variable filter used for tone shaping and DC blocking.
pub mod filter;
/// Asymmetric magnetic pickup transfer curve.
pub mod pickup;
/// Damped complex-phasor resonator, one per vibrating mode.
pub mod resonator;

pub use envelope::EnvelopeState;
