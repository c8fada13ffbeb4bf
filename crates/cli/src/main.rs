//! Verdant CLI - NDVI mapping, point maps and audio utilities

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use verdant_algorithms::imagery::{
    mask_fraction, ndvi, ndvi_statistics, segment_landcover, water_mask, LandCover,
    LandCoverClass, LandCoverParams, NdviStatistics, WaterMaskParams,
};
use verdant_algorithms::vector::{bounding_box, centroid};
use verdant_colormap::{write_png, ColorScheme, ColormapParams, Figure, Panel};
use verdant_core::io::{read_geotiff, read_point_table_path, write_geotiff, PointTable};
use verdant_core::{Raster, RasterElement};
use verdant_media::{
    convert_to_wav, TtsClient, TtsOptions, Voice, WavOptions, WavSampleFormat, VOICES,
};
use verdant_webmap::{write_geojson, MapParams, WebMap};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "verdant")]
#[command(author, version, about = "NDVI maps, point maps and audio utilities", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Red and near-infrared inputs shared by the NDVI commands
#[derive(Args)]
struct BandArgs {
    /// Red band GeoTIFF
    #[arg(long)]
    red: PathBuf,
    /// Near-infrared band GeoTIFF
    #[arg(long)]
    nir: PathBuf,
    /// Band index inside the red file (0-based, for multi-band images)
    #[arg(long)]
    red_band: Option<usize>,
    /// Band index inside the NIR file (0-based, for multi-band images)
    #[arg(long)]
    nir_band: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// Compute NDVI from red and NIR bands
    Ndvi {
        #[command(flatten)]
        bands: BandArgs,
        /// Output NDVI GeoTIFF
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Figure with the NDVI map and colorbar (SVG)
        #[arg(short, long, default_value = "ndvi.svg")]
        figure: PathBuf,
        /// Color-mapped NDVI image (PNG)
        #[arg(long)]
        png: Option<PathBuf>,
    },
    /// Compute NDVI and a water body mask
    Water {
        #[command(flatten)]
        bands: BandArgs,
        /// Pixels with NDVI below this value are water
        #[arg(short, long, default_value = "0.1", allow_hyphen_values = true)]
        threshold: f64,
        /// Figure with NDVI and water mask panels (SVG)
        #[arg(short, long, default_value = "water.svg")]
        figure: PathBuf,
        /// Output water mask GeoTIFF (0/1)
        #[arg(short, long)]
        mask: Option<PathBuf>,
    },
    /// Compute NDVI and segment vegetation, water and soil
    Landcover {
        #[command(flatten)]
        bands: BandArgs,
        /// Pixels with NDVI above this value are vegetation
        #[arg(long, default_value = "0.2", allow_hyphen_values = true)]
        veg_threshold: f64,
        /// Pixels with NDVI below this value are water
        #[arg(long, default_value = "-0.1", allow_hyphen_values = true)]
        water_threshold: f64,
        /// Figure with NDVI, vegetation, water and soil panels (SVG)
        #[arg(short, long, default_value = "landcover.svg")]
        figure: PathBuf,
        /// Output class GeoTIFF (1 water, 2 soil, 3 vegetation)
        #[arg(short, long)]
        classes: Option<PathBuf>,
    },
    /// Show a CSV of locations on an OpenStreetMap map
    Map {
        /// Input CSV with Latitude and Longitude columns
        input: PathBuf,
        /// Output HTML map
        #[arg(short, long, default_value = "map.html")]
        output: PathBuf,
        /// Also write the points as GeoJSON
        #[arg(long)]
        geojson: Option<PathBuf>,
        /// Initial zoom level
        #[arg(short, long, default_value = "10")]
        zoom: u8,
        /// Print only these columns (comma separated)
        #[arg(short, long, value_delimiter = ',')]
        columns: Option<Vec<String>>,
        /// Print the Latitude column
        #[arg(long)]
        show_lat: bool,
        /// Print the Longitude column
        #[arg(long)]
        show_lon: bool,
    },
    /// Convert an MP3 file to WAV
    Mp3ToWav {
        /// Input audio file
        input: PathBuf,
        /// Output WAV file
        output: PathBuf,
        /// Write 32-bit float samples instead of 16-bit PCM
        #[arg(long)]
        float: bool,
    },
    /// Convert text to speech (MP3)
    Tts {
        /// Text to speak
        #[arg(short, long, default_value = "Hello, how are you?")]
        text: String,
        /// Voice label or language code
        #[arg(long, default_value = "English (Male)")]
        voice: String,
        /// Output MP3 file
        #[arg(short, long, default_value = "output.mp3")]
        output: PathBuf,
        /// Speech endpoint URL override
        #[arg(long)]
        endpoint: Option<String>,
        /// Request timeout in seconds
        #[arg(long, default_value = "10")]
        timeout_secs: u64,
        /// Slower speech
        #[arg(long)]
        slow: bool,
        /// List available voices and exit
        #[arg(long)]
        list_voices: bool,
    },
}

const LATITUDE: &str = "Latitude";
const LONGITUDE: &str = "Longitude";

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set up logging")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn read_band(path: &Path, band: Option<usize>) -> Result<Raster<f64>> {
    let pb = spinner("Reading raster...");
    let raster: Raster<f64> = read_geotiff(path, band)
        .with_context(|| format!("Failed to read raster {}", path.display()))?;
    pb.finish_and_clear();
    info!("Input: {} x {} ({})", raster.cols(), raster.rows(), path.display());
    Ok(raster)
}

fn compute_ndvi(bands: &BandArgs) -> Result<Raster<f64>> {
    let red = read_band(&bands.red, bands.red_band)?;
    let nir = read_band(&bands.nir, bands.nir_band)?;
    let pb = spinner("Computing NDVI...");
    let result = ndvi(&nir, &red).context("Failed to compute NDVI")?;
    pb.finish_and_clear();
    Ok(result)
}

fn write_result<T: RasterElement>(raster: &Raster<T>, path: &Path) -> Result<()> {
    let pb = spinner("Writing output...");
    write_geotiff(raster, path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    pb.finish_and_clear();
    Ok(())
}

fn write_figure(figure: &Figure, path: &Path) -> Result<()> {
    let pb = spinner("Rendering figure...");
    figure
        .write_svg(path)
        .with_context(|| format!("Failed to write figure {}", path.display()))?;
    pb.finish_and_clear();
    Ok(())
}

fn ndvi_panel(raster: &Raster<f64>) -> Result<Panel> {
    Panel::new("NDVI Image", raster, ColormapParams::ndvi(), "NDVI Value")
        .context("Failed to render NDVI")
}

fn mask_panel(title: &str, label: &str, mask: &Raster<u8>, scheme: ColorScheme) -> Result<Panel> {
    Panel::new(title, mask, ColormapParams::mask(scheme), label)
        .with_context(|| format!("Failed to render {}", title))
}

fn water_figure(ndvi: &Raster<f64>, water: &Raster<u8>) -> Result<Figure> {
    Ok(Figure::new().with_panel(ndvi_panel(ndvi)?).with_panel(mask_panel(
        "Water Body Mask",
        "Water Probability",
        water,
        ColorScheme::Blues,
    )?))
}

fn landcover_figure(ndvi: &Raster<f64>, cover: &LandCover) -> Result<Figure> {
    Ok(Figure::new()
        .with_panel(ndvi_panel(ndvi)?)
        .with_panel(mask_panel(
            "Vegetation Mask",
            "Vegetation Probability",
            &cover.vegetation,
            ColorScheme::Greens,
        )?)
        .with_panel(mask_panel(
            "Water Mask",
            "Water Probability",
            &cover.water,
            ColorScheme::Blues,
        )?)
        .with_panel(mask_panel(
            "Soil Mask",
            "Soil Probability",
            &cover.soil,
            ColorScheme::Reds,
        )?))
}

fn print_ndvi_stats(stats: &NdviStatistics) {
    println!("NDVI statistics:");
    if let Some(min) = stats.min {
        println!("  Min: {:.4}", min);
    }
    if let Some(max) = stats.max {
        println!("  Max: {:.4}", max);
    }
    if let Some(mean) = stats.mean {
        println!("  Mean: {:.4}", mean);
    }
    println!("  Valid cells: {}", stats.valid_count);
    if stats.nan_count > 0 {
        println!("  Undefined cells (NIR + RED = 0 or nodata): {}", stats.nan_count);
    }
}

fn print_fraction(name: &str, mask: &Raster<u8>) {
    println!("  {}: {:.1}%", name, 100.0 * mask_fraction(mask));
}

fn print_table(table: &PointTable) {
    let headers = table.headers();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in table.rows() {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }
    let index_width = table.len().saturating_sub(1).to_string().len();

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:>width$}", c, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!("{:width$}  {}", "", line(headers), width = index_width);
    for (i, row) in table.rows().iter().enumerate() {
        println!("{:>width$}  {}", i, line(row), width = index_width);
    }
}

fn done(name: &str, path: &Path, elapsed: Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Commands ───────────────────────────────────────────────────────────

fn run_info(input: &Path) -> Result<()> {
    let raster = read_band(input, None)?;
    let (rows, cols) = raster.shape();
    let bounds = raster.bounds();
    let stats = raster.statistics();

    println!("File: {}", input.display());
    println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
    println!("Cell size: {}", raster.cell_size());
    println!(
        "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
        bounds.0, bounds.1, bounds.2, bounds.3
    );
    if let Some(nodata) = raster.nodata() {
        println!("NoData: {}", nodata);
    }
    println!("\nStatistics:");
    if let Some(min) = stats.min {
        println!("  Min: {:.4}", min);
    }
    if let Some(max) = stats.max {
        println!("  Max: {:.4}", max);
    }
    if let Some(mean) = stats.mean {
        println!("  Mean: {:.4}", mean);
    }
    if !raster.is_empty() {
        println!(
            "  Valid cells: {} ({:.1}%)",
            stats.valid_count,
            100.0 * stats.valid_count as f64 / raster.len() as f64
        );
    }
    Ok(())
}

fn run_ndvi(
    bands: &BandArgs,
    output: Option<&Path>,
    figure: &Path,
    png: Option<&Path>,
) -> Result<()> {
    let start = Instant::now();
    let result = compute_ndvi(bands)?;
    print_ndvi_stats(&ndvi_statistics(&result));

    if let Some(output) = output {
        write_result(&result, output)?;
        done("NDVI", output, start.elapsed());
    }
    if let Some(png) = png {
        write_png(&result, &ColormapParams::ndvi(), png)
            .with_context(|| format!("Failed to write {}", png.display()))?;
        done("NDVI image", png, start.elapsed());
    }

    let fig = Figure::new().with_panel(ndvi_panel(&result)?);
    write_figure(&fig, figure)?;
    done("NDVI figure", figure, start.elapsed());
    Ok(())
}

fn run_water(bands: &BandArgs, threshold: f64, figure: &Path, mask: Option<&Path>) -> Result<()> {
    let start = Instant::now();
    let result = compute_ndvi(bands)?;
    let water = water_mask(&result, WaterMaskParams { threshold })
        .context("Failed to compute water mask")?;

    print_ndvi_stats(&ndvi_statistics(&result));
    println!("Cover (NDVI < {}):", threshold);
    print_fraction("Water", &water);

    if let Some(mask) = mask {
        write_result(&water, mask)?;
        done("Water mask", mask, start.elapsed());
    }

    let fig = water_figure(&result, &water)?;
    write_figure(&fig, figure)?;
    done("Water figure", figure, start.elapsed());
    Ok(())
}

fn run_landcover(
    bands: &BandArgs,
    params: LandCoverParams,
    figure: &Path,
    classes: Option<&Path>,
) -> Result<()> {
    let start = Instant::now();
    let result = compute_ndvi(bands)?;
    let cover = segment_landcover(&result, params).context("Failed to segment land cover")?;

    print_ndvi_stats(&ndvi_statistics(&result));
    println!("Cover:");
    print_fraction("Vegetation", &cover.vegetation);
    print_fraction("Water", &cover.water);
    print_fraction("Soil", &cover.soil);

    if let Some(classes) = classes {
        let class_raster = cover.class_raster().context("Failed to build class raster")?;
        write_result(&class_raster, classes)?;
        let legend: Vec<String> = [
            LandCoverClass::Water,
            LandCoverClass::Soil,
            LandCoverClass::Vegetation,
        ]
        .iter()
        .map(|&c| format!("{} {}", c as u8, c.name()))
        .collect();
        println!("Classes: {} (0 undefined)", legend.join(", "));
        done("Land cover classes", classes, start.elapsed());
    }

    let fig = landcover_figure(&result, &cover)?;
    write_figure(&fig, figure)?;
    done("Land cover figure", figure, start.elapsed());
    Ok(())
}

struct MapArgs<'a> {
    input: &'a Path,
    output: &'a Path,
    geojson: Option<&'a Path>,
    zoom: u8,
    columns: Option<&'a [String]>,
    show_lat: bool,
    show_lon: bool,
}

/// Columns to print. Coordinate columns absent from the table are left
/// out here and reported by the missing-column warning instead.
fn display_columns(
    table: &PointTable,
    columns: Option<&[String]>,
    show_lat: bool,
    show_lon: bool,
) -> Vec<String> {
    let mut selected: Vec<String> = columns.map(<[String]>::to_vec).unwrap_or_default();
    for (wanted, name) in [(show_lat, LATITUDE), (show_lon, LONGITUDE)] {
        if wanted && table.has_column(name) {
            selected.push(name.to_string());
        }
    }
    selected
}

fn run_map(args: MapArgs<'_>) -> Result<()> {
    let start = Instant::now();
    let table = read_point_table_path(args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let selected = display_columns(&table, args.columns, args.show_lat, args.show_lon);
    if selected.is_empty() {
        print_table(&table);
    } else {
        let view = table.select(selected.as_slice()).context("Failed to select columns")?;
        print_table(&view);
    }

    let features = match table.to_features(LATITUDE, LONGITUDE) {
        Ok(features) => features,
        Err(e) if e.is_missing_column() => {
            warn!(
                "The CSV file must contain '{}' and '{}' columns ({}); no map written",
                LATITUDE, LONGITUDE, e
            );
            return Ok(());
        }
        Err(e) => return Err(e).context("Failed to read coordinates"),
    };

    if features.is_empty() {
        warn!("No rows with valid coordinates; no map written");
        return Ok(());
    }
    if let (Some((lat, lon)), Some(bbox)) = (centroid(&features), bounding_box(&features)) {
        println!(
            "{} points, center ({:.6}, {:.6}), extent ({:.6}, {:.6}) - ({:.6}, {:.6})",
            features.len(),
            lat,
            lon,
            bbox.min_lat,
            bbox.min_lon,
            bbox.max_lat,
            bbox.max_lon
        );
    }

    let params = MapParams {
        zoom: args.zoom,
        ..Default::default()
    };
    let map = WebMap::from_features(&features, params).context("Failed to build map")?;
    map.write_html(args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    done("Map", args.output, start.elapsed());

    if let Some(path) = args.geojson {
        write_geojson(&features, path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        done("GeoJSON", path, start.elapsed());
    }
    Ok(())
}

fn run_tts(
    text: &str,
    voice: &str,
    output: &Path,
    options: TtsOptions,
    list_voices: bool,
) -> Result<()> {
    if list_voices {
        for v in VOICES.iter() {
            println!("{:<18} {}", v.label, v.code);
        }
        return Ok(());
    }

    let start = Instant::now();
    let voice = Voice::from_label(voice).context("Failed to select voice")?;
    let client = TtsClient::new(options).context("Failed to create speech client")?;

    let pb = spinner("Synthesizing speech...");
    let mp3 = client
        .synthesize(text, &voice)
        .context("Failed to synthesize speech")?;
    pb.finish_and_clear();

    std::fs::write(output, &mp3).with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Voice: {} ({})", voice.label, voice.code);
    println!("Audio: {} bytes, audio/mp3", mp3.len());
    done("Speech", output, start.elapsed());
    Ok(())
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Info { input } => run_info(&input)?,

        Commands::Ndvi {
            bands,
            output,
            figure,
            png,
        } => run_ndvi(&bands, output.as_deref(), &figure, png.as_deref())?,

        Commands::Water {
            bands,
            threshold,
            figure,
            mask,
        } => run_water(&bands, threshold, &figure, mask.as_deref())?,

        Commands::Landcover {
            bands,
            veg_threshold,
            water_threshold,
            figure,
            classes,
        } => {
            let params = LandCoverParams {
                vegetation_threshold: veg_threshold,
                water_threshold,
            };
            run_landcover(&bands, params, &figure, classes.as_deref())?
        }

        Commands::Map {
            input,
            output,
            geojson,
            zoom,
            columns,
            show_lat,
            show_lon,
        } => run_map(MapArgs {
            input: &input,
            output: &output,
            geojson: geojson.as_deref(),
            zoom,
            columns: columns.as_deref(),
            show_lat,
            show_lon,
        })?,

        Commands::Mp3ToWav {
            input,
            output,
            float,
        } => {
            let start = Instant::now();
            let options = WavOptions {
                sample_format: if float {
                    WavSampleFormat::Float32
                } else {
                    WavSampleFormat::Pcm16
                },
            };
            let pb = spinner("Converting audio...");
            let audio = convert_to_wav(&input, &output, options)
                .with_context(|| format!("Failed to convert {}", input.display()))?;
            pb.finish_and_clear();
            println!(
                "Audio: {} Hz, {} channel(s), {:.2}s",
                audio.sample_rate,
                audio.channels,
                audio.duration_secs()
            );
            done("WAV", &output, start.elapsed());
        }

        Commands::Tts {
            text,
            voice,
            output,
            endpoint,
            timeout_secs,
            slow,
            list_voices,
        } => {
            let options = TtsOptions {
                endpoint,
                timeout: Duration::from_secs(timeout_secs),
                slow,
            };
            run_tts(&text, &voice, &output, options, list_voices)?
        }
    }

    Ok(())
}
