use std::fs;
use std::path::Path;

use glam::DVec3;
use heightbake::export::{read_r16, OutputFormat};
use heightbake::geometry::{Mesh, TileGridConfig};
use heightbake::noise::{FractalNoiseConfig, NoiseParameters, NoiseSettings};
use heightbake::terrain::dequantize_sample;
use heightbake::{BakeConfig, BakeError, BakeJob, BakeOutcome, MeshExtent, SceneObject};
use tempfile::tempdir;

fn config_in(dir: &Path, grid: TileGridConfig) -> BakeConfig {
    let mut config = BakeConfig::default();
    config.output.outpath = dir.join("out").join("terrain");
    config.grid = grid;
    config
}

fn plane() -> SceneObject {
    let noise = NoiseSettings {
        noise_size: 2.0,
        fractal: FractalNoiseConfig::with_seed(11),
        ..Default::default()
    };
    SceneObject::plane("Plane", MeshExtent::default(), Some(noise))
}

/// Height that depends only on the noise-space coordinate.
fn ramp(position: DVec3, params: &NoiseParameters) -> f64 {
    let (nx, ny) = params.noise_coordinate(position);
    (0.1 * nx + 0.05 * ny + 0.5).clamp(0.0, 1.0)
}

fn sorted_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn independent_tiles_write_one_file_per_cell() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path(), TileGridConfig::new(2, 2, 5, 5));

    let outcome = BakeJob::new(&config).run_fractal(Some(&plane())).unwrap();

    assert_eq!(outcome.files().len(), 4);
    assert_eq!(
        sorted_names(&dir.path().join("out")),
        vec![
            "terrain_x0_y0.png",
            "terrain_x0_y1.png",
            "terrain_x1_y0.png",
            "terrain_x1_y1.png"
        ]
    );
}

#[test]
fn raw_tiles_have_exact_size() {
    let dir = tempdir().unwrap();
    let mut config = config_in(dir.path(), TileGridConfig::new(3, 1, 9, 5));
    config.output.format = OutputFormat::Raw;

    let outcome = BakeJob::new(&config).run(Some(&plane()), &ramp).unwrap();

    let BakeOutcome::Tiles { paths } = outcome else {
        panic!("expected tiles");
    };
    assert_eq!(paths.len(), 3);
    for path in paths {
        assert_eq!(fs::metadata(&path).unwrap().len(), 9 * 5 * 2);
    }
}

#[test]
fn mosaic_is_single_raw_file_of_mosaic_size() {
    let dir = tempdir().unwrap();
    let mut grid = TileGridConfig::new(3, 2, 5, 4);
    grid.single_heightmap = true;
    let config = config_in(dir.path(), grid);

    let outcome = BakeJob::new(&config).run(Some(&plane()), &ramp).unwrap();

    let BakeOutcome::Mosaic { path, width, height } = outcome else {
        panic!("expected mosaic");
    };
    assert_eq!((width, height), (13, 7));
    assert_eq!(path, dir.path().join("out").join("terrain.r16"));
    assert_eq!(fs::metadata(&path).unwrap().len(), 13 * 7 * 2);
    assert_eq!(sorted_names(&dir.path().join("out")), vec!["terrain.r16"]);
}

#[test]
fn mosaic_of_continuous_source_has_no_seams() {
    let dir = tempdir().unwrap();
    let mut grid = TileGridConfig::new(2, 2, 9, 9);
    grid.single_heightmap = true;
    let config = config_in(dir.path(), grid);

    let outcome = BakeJob::new(&config).run(Some(&plane()), &ramp).unwrap();
    let BakeOutcome::Mosaic { path, width, .. } = outcome else {
        panic!("expected mosaic");
    };
    let samples = read_r16(&path).unwrap();
    let row: Vec<f64> = samples[..width as usize].iter().map(|&s| dequantize_sample(s)).collect();

    // A linear source yields constant steps across the tile boundary.
    let steps: Vec<f64> = row.windows(2).map(|w| w[1] - w[0]).collect();
    for step in &steps {
        assert!((step - steps[0]).abs() < 2.5 / 65535.0);
    }
}

#[test]
fn parallel_and_sequential_runs_are_byte_identical() {
    for single in [false, true] {
        let mut grid = TileGridConfig::new(3, 2, 17, 9);
        grid.single_heightmap = single;
        grid.edge_falloff_active = true;

        let seq_dir = tempdir().unwrap();
        let par_dir = tempdir().unwrap();
        let seq = config_in(seq_dir.path(), grid);
        let mut par = config_in(par_dir.path(), grid);
        par.parallel = true;

        let a = BakeJob::new(&seq).run_fractal(Some(&plane())).unwrap();
        let b = BakeJob::new(&par).run_fractal(Some(&plane())).unwrap();

        let (a, b) = (a.files(), b.files());
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.file_name(), y.file_name());
            assert_eq!(fs::read(x).unwrap(), fs::read(y).unwrap());
        }
    }
}

#[test]
fn empty_parameter_set_writes_nothing() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path(), TileGridConfig::new(2, 2, 5, 5));
    let object = SceneObject::plane("Bare", MeshExtent::default(), None);

    let outcome = BakeJob::new(&config).run_fractal(Some(&object)).unwrap();

    assert!(matches!(outcome, BakeOutcome::Skipped { .. }));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn missing_selection_is_an_error() {
    let config = BakeConfig::default();
    let err = BakeJob::new(&config).run_fractal(None).unwrap_err();
    assert!(matches!(err, BakeError::NoActiveSelection));
    assert_eq!(err.to_string(), "No object selected");
}

#[test]
fn resample_writes_single_image() {
    let dir = tempdir().unwrap();
    let obj = dir.path().join("hill.obj");
    fs::write(
        &obj,
        "o hill\nv 10 10 0\nv 12 10 0\nv 10 12 0\nv 12 12 0\nv 11 11 1\nf 1 2 5\n",
    )
    .unwrap();

    let mesh = Mesh::load_obj(&obj).unwrap().recentered();
    let object = SceneObject::from_mesh("hill", mesh, None).unwrap();
    let mut config = config_in(dir.path(), TileGridConfig::default());
    config.resample.width = 4;
    config.resample.height = 4;
    config.output.format = OutputFormat::Raw;

    let outcome = BakeJob::new(&config).resample(Some(&object)).unwrap();

    let BakeOutcome::Image { path, width, height } = outcome else {
        panic!("expected image");
    };
    assert_eq!((width, height), (4, 4));
    assert_eq!(path, dir.path().join("out").join("terrain.r16"));
    let samples = read_r16(&path).unwrap();
    assert_eq!(samples.len(), 16);
    // The peak lands in the centre bin and raises the four centre pixels.
    assert!(samples[5] > 0 && samples[6] > 0 && samples[9] > 0 && samples[10] > 0);
    assert_eq!(samples[0], 0);
}

#[test]
fn falloff_wider_than_a_tile_is_rejected() {
    let dir = tempdir().unwrap();
    let mut grid = TileGridConfig::new(3, 3, 5, 5);
    grid.edge_falloff_active = true;
    let config = config_in(dir.path(), grid);
    let mut object = plane();
    object.noise.as_mut().unwrap().fractal.falloff_width = 2.0;

    let err = BakeJob::new(&config).run_fractal(Some(&object)).unwrap_err();

    assert!(matches!(err, BakeError::Config(_)));
    assert_eq!(err.to_string(), "Falloff width must be within [0, 1], got 2");
    assert!(!dir.path().join("out").exists());
}
