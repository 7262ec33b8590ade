//! Height sources for terrain sampling.
//!
//! Defines the [`HeightSource`] capability the grid sampler evaluates, the
//! per-tile [`NoiseParameters`] handed to it, edge falloff tags, and a
//! fractal backend built on simdnoise.

mod falloff;
mod fractal;
mod source;

pub use falloff::{EdgeFalloffTag, FalloffSides};
pub use fractal::{sample_fractal_noise, FractalHeightSource, FractalNoiseConfig};
pub use source::{HeightSource, NoiseParameters, NoiseSettings};
