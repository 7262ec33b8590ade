//! Multi-octave fractal Brownian motion (fBm) terrain source.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use simdnoise::NoiseBuilder;

use super::{HeightSource, NoiseParameters};

/// Configuration for multi-octave fractal noise generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractalNoiseConfig {
    /// Number of noise octaves (4-8 typical).
    pub octaves: u8,
    /// Base frequency of the noise (1.0-4.0 typical).
    pub frequency: f32,
    /// Frequency multiplier per octave (typically 2.0).
    pub lacunarity: f32,
    /// Amplitude decay per octave (0.4-0.6 typical).
    pub persistence: f32,
    /// Random seed for reproducible generation.
    pub seed: i32,
    /// Vertical scale of the normalized noise.
    pub amplitude: f64,
    /// Height added after scaling.
    pub base_level: f64,
    /// Width of the edge falloff ramp as a fraction of a tile.
    pub falloff_width: f64,
    /// Height that tapered edges converge to.
    pub edge_level: f64,
}

impl Default for FractalNoiseConfig {
    fn default() -> Self {
        Self {
            octaves: 6,
            frequency: 2.0,
            lacunarity: 2.0,
            persistence: 0.5,
            seed: 42,
            amplitude: 1.0,
            base_level: 0.0,
            falloff_width: 0.25,
            edge_level: 0.0,
        }
    }
}

impl FractalNoiseConfig {
    /// Creates a new noise configuration with the given seed.
    pub fn with_seed(seed: i32) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Broad rolling hills.
    pub fn hills(seed: i32) -> Self {
        Self {
            octaves: 4,
            frequency: 1.0,
            lacunarity: 2.0,
            persistence: 0.4,
            amplitude: 0.6,
            base_level: 0.2,
            seed,
            ..Default::default()
        }
    }

    /// Rough, high-contrast mountain terrain.
    pub fn mountains(seed: i32) -> Self {
        Self {
            octaves: 8,
            frequency: 1.5,
            lacunarity: 2.1,
            persistence: 0.55,
            seed,
            ..Default::default()
        }
    }
}

/// Samples fractal noise at a 2D noise-space position.
///
/// # Returns
/// A noise value in approximately [-1, 1] range (normalized by amplitude sum)
pub fn sample_fractal_noise(x: f64, y: f64, config: &FractalNoiseConfig) -> f32 {
    let mut total = 0.0f32;
    let mut amplitude = 1.0f32;
    let mut frequency = config.frequency;
    let mut max_amplitude = 0.0f32;

    for octave in 0..config.octaves.max(1) {
        // Each octave gets a different seed offset for variation
        let octave_seed = config.seed.wrapping_add(octave as i32 * 31337);

        let nx = x as f32 * frequency;
        let ny = y as f32 * frequency;

        let noise_value = NoiseBuilder::fbm_2d_offset(nx, 1, ny, 1)
            .with_seed(octave_seed)
            .with_freq(1.0)
            .with_octaves(1)
            .generate()
            .0[0];

        total += noise_value * amplitude;
        max_amplitude += amplitude;
        amplitude *= config.persistence;
        frequency *= config.lacunarity;
    }

    total / max_amplitude
}

/// Planar fBm height source with per-tile edge falloff.
#[derive(Debug, Clone, Default)]
pub struct FractalHeightSource {
    pub config: FractalNoiseConfig,
}

impl FractalHeightSource {
    pub fn new(config: FractalNoiseConfig) -> Self {
        Self { config }
    }
}

impl HeightSource for FractalHeightSource {
    fn height(&self, position: DVec3, params: &NoiseParameters) -> f64 {
        let (nx, ny) = params.noise_coordinate(position);
        let noise = sample_fractal_noise(nx, ny, &self.config) as f64;
        let h = self.config.base_level + self.config.amplitude * (noise * 0.5 + 0.5);

        let (u, v) = params.extent.to_unit(position.x, position.y);
        let factor = params
            .edge_falloff_tag
            .attenuation(u, v, self.config.falloff_width);
        self.config.edge_level + (h - self.config.edge_level) * factor
    }
}
