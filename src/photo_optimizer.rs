//! Batch resizing of gallery photos before publishing.
//!
//! Every jpg/jpeg/png directly inside the input directory is shrunk to fit a
//! square bounding box (never enlarged) and re-encoded as JPEG into the
//! output directory. Files are processed in parallel and a broken file is
//! logged and counted instead of aborting the batch.

use crate::config::OptimizeConfig;
use crate::mimetype_detector;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use log::{info, warn};
use rayon::prelude::*;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum OptimizeError {
    #[error("Image processing error: {0}")]
    ImageError(#[from] image::ImageError),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Input directory does not exist: {0}")]
    MissingInput(PathBuf),
    #[error("Failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

pub type OptimizeResult<T> = Result<T, OptimizeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizeOptions {
    pub max_dimension: u32,
    pub jpeg_quality: u8,
    pub workers: usize,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            max_dimension: 1200,
            jpeg_quality: 85,
            workers: num_cpus::get(),
        }
    }
}

impl From<&OptimizeConfig> for OptimizeOptions {
    fn from(config: &OptimizeConfig) -> Self {
        Self {
            max_dimension: config.max_dimension,
            jpeg_quality: config.jpeg_quality,
            workers: config.workers,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimizeReport {
    pub processed: usize,
    pub failed: usize,
}

pub fn optimize_directory(
    input_dir: &Path,
    output_dir: &Path,
    options: &OptimizeOptions,
) -> OptimizeResult<OptimizeReport> {
    if !input_dir.is_dir() {
        return Err(OptimizeError::MissingInput(input_dir.to_path_buf()));
    }

    fs::create_dir_all(output_dir)?;

    let mut files: Vec<PathBuf> = fs::read_dir(input_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|path| path.is_file() && mimetype_detector::is_gallery_image(path))
        .collect();
    files.sort();

    info!("Found {} images to optimize...", files.len());

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers.max(1))
        .build()?;

    let results: Vec<OptimizeResult<PathBuf>> = pool.install(|| {
        files
            .par_iter()
            .map(|path| optimize_file(path, output_dir, options))
            .collect()
    });

    let mut report = OptimizeReport::default();
    for (path, result) in files.iter().zip(results) {
        match result {
            Ok(output) => {
                info!("Optimized {} -> {}", path.display(), output.display());
                report.processed += 1;
            }
            Err(e) => {
                warn!("Failed to optimize {}: {}", path.display(), e);
                report.failed += 1;
            }
        }
    }

    info!(
        "Photo optimization complete: {} processed, {} failed, output in {}",
        report.processed,
        report.failed,
        output_dir.display()
    );

    Ok(report)
}

/// Resizes one image and writes it into `output_dir`, returning the new path.
pub fn optimize_file(
    input: &Path,
    output_dir: &Path,
    options: &OptimizeOptions,
) -> OptimizeResult<PathBuf> {
    let img = image::open(input)?;
    let img = fit_inside(img, options.max_dimension);

    let output = output_dir.join(output_name(input));
    let writer = BufWriter::new(fs::File::create(&output)?);
    let encoder = JpegEncoder::new_with_quality(writer, options.jpeg_quality.clamp(1, 100));
    DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;

    Ok(output)
}

/// Shrinks the image to fit a `max_dimension` square, keeping aspect ratio.
pub fn fit_inside(img: DynamicImage, max_dimension: u32) -> DynamicImage {
    if img.width() <= max_dimension && img.height() <= max_dimension {
        return img;
    }

    img.resize(max_dimension, max_dimension, FilterType::Lanczos3)
}

/// JPEG files keep their name; other formats get a `.jpg` extension.
fn output_name(input: &Path) -> PathBuf {
    let file_name = PathBuf::from(input.file_name().unwrap_or_default());
    let is_jpeg = mimetype_detector::from_path(input)
        .map(|mime| mime.subtype() == "jpeg")
        .unwrap_or(false);

    if is_jpeg {
        file_name
    } else {
        file_name.with_extension("jpg")
    }
}
