//! Tiled heightmap baker.
//!
//! Samples a height function over a rectangular mesh footprint, split into a
//! grid of tiles that share their boundary rows and columns, and writes the
//! result as 16-bit PNG or RAW16 images. Tiles can be saved individually or
//! assembled into one seamless mosaic.

pub mod export;
pub mod geometry;
pub mod noise;
pub mod pipeline;
pub mod terrain;

pub use export::{OutputFormat, PngLayout, SaveOptions};
pub use geometry::{Mesh, MeshExtent, SceneObject, TileCursor, TileGridConfig};
pub use noise::{EdgeFalloffTag, FractalHeightSource, FractalNoiseConfig, HeightSource, NoiseParameters, NoiseSettings};
pub use pipeline::{BakeConfig, BakeError, BakeJob, BakeOutcome};
pub use terrain::{ExecutionMode, GridSampler, Heightmap, SamplingStrategy};
