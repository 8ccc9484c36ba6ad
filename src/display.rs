//! Image and histogram display.
//!
//! Figures are rendered to PNG files in the configured output directory,
//! one file per call.

use image::{ImageBuffer, Rgba, RgbaImage};
use ndarray::ArrayView2;
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

use crate::colormaps::{get_colormap, Colormap};
use crate::config::DisplayConfig;
use crate::error::{MusaError, Result};

/// Edge length of image figures in pixels
pub const FIGURE_SIZE: u32 = 1600;

/// Colormap used when none is given
pub const DEFAULT_COLORMAP: &str = "gray";

/// Histogram figure dimensions
const HISTOGRAM_WIDTH: u32 = 800;
const HISTOGRAM_HEIGHT: u32 = 600;
const HISTOGRAM_MARGIN: u32 = 40;

/// Upper bound on histogram bins, whatever the data spread
const MAX_HISTOGRAM_BINS: usize = 10_000;
const HISTOGRAM_TITLE: &str = "Histogram with 'auto' bins";
const BAR_COLOR: Rgba<u8> = Rgba([0x1f, 0x77, 0xb4, 0xff]);
const BACKGROUND: Rgba<u8> = Rgba([0xff, 0xff, 0xff, 0xff]);
const AXIS_COLOR: Rgba<u8> = Rgba([0x00, 0x00, 0x00, 0xff]);

/// Render `arr` as a `FIGURE_SIZE` square image.
///
/// Values are stretched between the array's finite minimum and maximum and
/// resampled with nearest-neighbor; non-finite cells are transparent.
pub fn render_image<T>(arr: ArrayView2<T>, colormap: &dyn Colormap) -> Result<RgbaImage>
where
    T: Copy + Into<f64>,
{
    let (rows, cols) = arr.dim();
    if rows == 0 || cols == 0 {
        return Err(MusaError::InvalidParameter {
            param: "arr".to_string(),
            message: "Cannot display an empty array".to_string(),
        });
    }

    let (min, max) = arr
        .iter()
        .map(|&v| -> f64 { v.into() })
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    let size = FIGURE_SIZE as usize;
    Ok(ImageBuffer::from_fn(FIGURE_SIZE, FIGURE_SIZE, |px, py| {
        let row = py as usize * rows / size;
        let col = px as usize * cols / size;
        Rgba(colormap.map(arr[[row, col]].into(), min, max))
    }))
}

/// Value histogram with NumPy's `'auto'` bin selection
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    edges: Vec<f64>,
    counts: Vec<usize>,
}

impl Histogram {
    /// Histogram of the finite values of `arr`, leaving out `no_data`
    pub fn compute<T>(arr: ArrayView2<T>, no_data: Option<f64>) -> Self
    where
        T: Copy + Into<f64>,
    {
        let mut values: Vec<f64> = arr
            .iter()
            .map(|&v| -> f64 { v.into() })
            .filter(|v| v.is_finite() && Some(*v) != no_data)
            .collect();
        values.sort_by(|a, b| a.total_cmp(b));

        let (Some(&first), Some(&last)) = (values.first(), values.last()) else {
            return Self {
                edges: vec![0.0, 1.0],
                counts: vec![0],
            };
        };

        let (lo, hi) = if first == last {
            (first - 0.5, last + 0.5)
        } else {
            (first, last)
        };

        let bins = auto_bin_count(&values);
        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + i as f64 * width).collect();

        let mut counts = vec![0usize; bins];
        for v in &values {
            let index = (((v - lo) / (hi - lo)) * bins as f64).floor() as usize;
            counts[index.min(bins - 1)] += 1;
        }

        Self { edges, counts }
    }

    /// Bin edges, one more than the number of bins
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Larger of the Sturges and Freedman-Diaconis bin counts over sorted values.
///
/// Capped at one bin per value and at `MAX_HISTOGRAM_BINS`; a single far
/// outlier beside a tight cluster would otherwise ask for billions of bins.
fn auto_bin_count(sorted: &[f64]) -> usize {
    let n = sorted.len() as f64;
    let range = sorted[sorted.len() - 1] - sorted[0];
    if range == 0.0 {
        return 1;
    }

    let sturges_width = range / (n.log2() + 1.0);
    let iqr = percentile(sorted, 75.0) - percentile(sorted, 25.0);
    let fd_width = 2.0 * iqr * n.powf(-1.0 / 3.0);

    let width = if fd_width > 0.0 {
        fd_width.min(sturges_width)
    } else {
        sturges_width
    };
    let cap = sorted.len().min(MAX_HISTOGRAM_BINS) as f64;
    (range / width).ceil().min(cap).max(1.0) as usize
}

/// Linearly interpolated percentile of sorted values
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let position = q / 100.0 * (sorted.len() - 1) as f64;
    let below = position.floor() as usize;
    let above = position.ceil() as usize;
    let fraction = position - below as f64;
    sorted[below] + (sorted[above] - sorted[below]) * fraction
}

/// Draw `histogram` as a bar chart
pub fn render_histogram(histogram: &Histogram) -> RgbaImage {
    let mut img = ImageBuffer::from_pixel(HISTOGRAM_WIDTH, HISTOGRAM_HEIGHT, BACKGROUND);
    let plot_width = HISTOGRAM_WIDTH - 2 * HISTOGRAM_MARGIN;
    let plot_height = HISTOGRAM_HEIGHT - 2 * HISTOGRAM_MARGIN;
    let baseline = HISTOGRAM_HEIGHT - HISTOGRAM_MARGIN;

    let bins = histogram.bins() as u64;
    let tallest = histogram.counts().iter().copied().max().unwrap_or(0);
    if tallest > 0 {
        for (i, &count) in histogram.counts().iter().enumerate() {
            let x0 = HISTOGRAM_MARGIN + (i as u64 * plot_width as u64 / bins) as u32;
            let x1 = HISTOGRAM_MARGIN + ((i as u64 + 1) * plot_width as u64 / bins) as u32;
            let height = (count as u64 * plot_height as u64 / tallest as u64) as u32;
            for x in x0..x1.max(x0 + 1) {
                for y in baseline - height..baseline {
                    img.put_pixel(x, y, BAR_COLOR);
                }
            }
        }
    }

    for x in HISTOGRAM_MARGIN..HISTOGRAM_WIDTH - HISTOGRAM_MARGIN {
        img.put_pixel(x, baseline, AXIS_COLOR);
    }
    for y in HISTOGRAM_MARGIN..=baseline {
        img.put_pixel(HISTOGRAM_MARGIN - 1, y, AXIS_COLOR);
    }

    img
}

/// Writes figures into a display directory
#[derive(Debug, Clone)]
pub struct Display {
    output_dir: PathBuf,
}

impl Default for Display {
    fn default() -> Self {
        Self::new(&DisplayConfig::default())
    }
}

impl Display {
    pub fn new(config: &DisplayConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
        }
    }

    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    /// Render `arr` with the named colormap and write it as a PNG
    pub fn show_image<T>(&self, arr: ArrayView2<T>, colormap: &str) -> Result<PathBuf>
    where
        T: Copy + Into<f64>,
    {
        let colormap = get_colormap(colormap)?;
        let img = render_image(arr, colormap.as_ref())?;
        let path = self.save(&img, "image")?;

        info!(
            operation = "show_image",
            colormap = %colormap.name(),
            rows = arr.nrows(),
            cols = arr.ncols(),
            path = %path.display(),
            "Image displayed"
        );
        Ok(path)
    }

    /// Plot the value histogram of `arr` and write it as a PNG
    pub fn show_histogram<T>(&self, arr: ArrayView2<T>, no_data: Option<f64>) -> Result<PathBuf>
    where
        T: Copy + Into<f64>,
    {
        let histogram = Histogram::compute(arr, no_data);
        let img = render_histogram(&histogram);
        let path = self.save(&img, "histogram")?;

        info!(
            operation = "show_histogram",
            title = HISTOGRAM_TITLE,
            bins = histogram.bins(),
            values = histogram.total(),
            path = %path.display(),
            "Histogram displayed"
        );
        Ok(path)
    }

    fn save(&self, img: &RgbaImage, kind: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(format!("{}-{}.png", kind, Uuid::new_v4()));
        img.save(&path)?;
        Ok(path)
    }
}

/// [`Display::show_image`] into the default display directory
pub fn show_image<T>(arr: ArrayView2<T>, colormap: &str) -> Result<PathBuf>
where
    T: Copy + Into<f64>,
{
    Display::default().show_image(arr, colormap)
}

/// [`Display::show_histogram`] into the default display directory
pub fn show_histogram<T>(arr: ArrayView2<T>, no_data: Option<f64>) -> Result<PathBuf>
where
    T: Copy + Into<f64>,
{
    Display::default().show_histogram(arr, no_data)
}
