//! Heightmap buffers and the samplers that fill them.
//!
//! Two distinct strategies: the grid sampler evaluates a height source over
//! a tile grid, the vertex resampler bins an existing mesh's vertices.

mod heightmap;
mod resample;
mod sampler;

pub use heightmap::{dequantize_sample, quantize_sample, Heightmap, QUANT_MAX};
pub use resample::{resample_vertices, ResampleError};
pub use sampler::{sample_tile, ExecutionMode, GridSampler, SamplingStrategy};
