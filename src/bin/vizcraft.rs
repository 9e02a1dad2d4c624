use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use vizcraft::charts::{
    ChartOptions, DEFAULT_SCATTER_ALPHA, styled_bar, styled_hist, styled_line, styled_pie,
    styled_scatter,
};
use vizcraft::choropleth::{ChoroplethOptions, DataTable, build_choropleth};
use vizcraft::figure::{Figure, LineStyle, MarkerShape};
use vizcraft::theme::Theme;

#[derive(Parser, Debug)]
#[command(
    name = "vizcraft",
    version,
    about = "Render consistently themed charts and interactive choropleth maps"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the demo chart set (line, comparison, scatter, bar, histogram, pie).
    Demo(DemoArgs),
    /// Join a value table onto region geometry and write an interactive HTML map.
    Map(MapArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ImageFormat {
    Svg,
    Png,
}

impl ImageFormat {
    fn extension(self) -> &'static str {
        match self {
            ImageFormat::Svg => "svg",
            ImageFormat::Png => "png",
        }
    }
}

#[derive(Args, Debug)]
struct DemoArgs {
    /// Directory the charts are written to (created if missing).
    #[arg(long)]
    out_dir: PathBuf,
    /// Image format of the charts.
    #[arg(long, value_enum, default_value_t = ImageFormat::Svg)]
    format: ImageFormat,
    /// Theme JSON file; absent fields keep the default theme.
    #[arg(long)]
    theme: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct MapArgs {
    /// GeoJSON file with one feature per region.
    #[arg(long)]
    geometry: PathBuf,
    /// CSV file with a header row.
    #[arg(long)]
    values: PathBuf,
    /// Region name property in the geometry file.
    #[arg(long)]
    geometry_key: String,
    /// Region name column in the CSV file.
    #[arg(long)]
    values_key: String,
    /// Numeric column to color by.
    #[arg(long)]
    value_column: String,
    /// Output HTML path.
    #[arg(long)]
    out: PathBuf,
    /// Map options JSON file; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    title: Option<String>,
    /// Brewer (e.g. OrRd, Blues) or perceptual (viridis, magma, ...) palette name.
    #[arg(long)]
    palette: Option<String>,
    /// Number of Brewer palette steps.
    #[arg(long)]
    steps: Option<usize>,
    /// Lower color-scale bound (defaults to the data minimum).
    #[arg(long, allow_hyphen_values = true)]
    low: Option<f64>,
    /// Upper color-scale bound (defaults to the data maximum).
    #[arg(long, allow_hyphen_values = true)]
    high: Option<f64>,
    #[arg(long)]
    legend_label: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Demo(args) => cmd_demo(args),
        Command::Map(args) => cmd_map(args),
    }
}

/// Deterministic, roughly normal samples (sum of uniforms from a 64-bit LCG).
fn synthetic_latencies(n: usize, mean: f64, sd: f64, seed: u64) -> Vec<f64> {
    let mut state = seed;
    let mut uniform = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };
    (0..n)
        .map(|_| {
            let z: f64 = (0..12).map(|_| uniform()).sum::<f64>() - 6.0;
            (mean + sd * z).round().max(20.0)
        })
        .collect()
}

fn save(fig: &Figure, dir: &Path, name: &str, format: ImageFormat) -> Result<()> {
    let path = dir.join(format!("{}.{}", name, format.extension()));
    fig.save(&path)
        .with_context(|| format!("writing {}", path.display()))?;
    eprintln!("Wrote {}", path.display());
    Ok(())
}

fn cmd_demo(args: DemoArgs) -> Result<()> {
    let theme = match &args.theme {
        Some(p) => Theme::from_json_file(p)
            .with_context(|| format!("reading theme {}", p.display()))?,
        None => Theme::default(),
    };
    std::fs::create_dir_all(&args.out_dir)?;
    let dir = args.out_dir.as_path();
    let opts = || ChartOptions::default().theme(&theme);

    let months = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug"];
    let sales_2024 = [12.0, 15.0, 14.0, 18.0, 21.0, 19.0, 23.0, 25.0];
    let sales_2025 = [14.0, 16.0, 15.0, 20.0, 24.0, 22.0, 26.0, 29.0];

    let (fig, _) = styled_line(
        months,
        &sales_2024,
        "o",
        opts()
            .title("Monthly sales (2024)")
            .xlabel("Month")
            .ylabel("Sales (k$)"),
    )?;
    save(&fig, dir, "line", args.format)?;

    let (mut fig, ax) = styled_line(
        months,
        &sales_2025,
        "s",
        opts()
            .title("Monthly sales comparison (2024 vs 2025)")
            .xlabel("Month")
            .ylabel("Sales (k$)"),
    )?;
    fig.axes_mut(ax)?
        .plot(
            months,
            &sales_2024,
            LineStyle {
                color: Some(theme.secondary),
                width: Some(theme.line_width),
                marker: MarkerShape::Circle,
                marker_size: theme.marker_size as f64,
                label: None,
            },
        )?
        .legend(&["2025", "2024"]);
    save(&fig, dir, "line_comparison", args.format)?;

    let hours = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
    let scores = [45.0, 50.0, 55.0, 60.0, 66.0, 70.0, 78.0, 85.0];
    let (fig, _) = styled_scatter(
        hours,
        &scores,
        90.0,
        DEFAULT_SCATTER_ALPHA,
        opts()
            .title("Study hours vs exam score")
            .xlabel("Hours")
            .ylabel("Score"),
    )?;
    save(&fig, dir, "scatter", args.format)?;

    let teams = ["Backend", "Frontend", "Data", "DevOps", "Design"];
    let tickets = [28.0, 34.0, 22.0, 18.0, 25.0];
    let (fig, _) = styled_bar(
        &teams,
        &tickets,
        opts()
            .title("Tickets closed per team")
            .xlabel("Team")
            .ylabel("Tickets"),
    )?;
    save(&fig, dir, "bar", args.format)?;

    let latencies = synthetic_latencies(250, 180.0, 45.0, 7);
    let (fig, _) = styled_hist(
        &latencies,
        18,
        opts()
            .title("API latency distribution")
            .xlabel("Latency (ms)")
            .ylabel("Requests"),
    )?;
    save(&fig, dir, "histogram", args.format)?;

    let sources = ["Direct", "Search", "Social", "Referral", "Email"];
    let traffic = [38.0, 27.0, 16.0, 12.0, 7.0];
    let (fig, _) = styled_pie(
        &sources,
        &traffic,
        None,
        opts().title("Website traffic sources"),
    )?;
    save(&fig, dir, "pie", args.format)?;

    Ok(())
}

fn cmd_map(args: MapArgs) -> Result<()> {
    let mut options = match &args.config {
        Some(p) => ChoroplethOptions::from_json_file(p)
            .with_context(|| format!("reading map options {}", p.display()))?,
        None => ChoroplethOptions::default(),
    };
    if let Some(t) = args.title {
        options.title = t;
    }
    if let Some(p) = args.palette {
        options.palette_name = p;
    }
    if let Some(s) = args.steps {
        options.palette_steps = s;
    }
    if args.low.is_some() {
        options.low = args.low;
    }
    if args.high.is_some() {
        options.high = args.high;
    }
    if let Some(l) = args.legend_label {
        options.legend_label = l;
    }

    let table = DataTable::from_csv_path(&args.values)
        .with_context(|| format!("reading {}", args.values.display()))?;
    let map = build_choropleth(
        args.geometry.as_path(),
        &table,
        &args.geometry_key,
        &args.values_key,
        &args.value_column,
        &args.out,
        &options,
    )?;

    let matched = map.regions.iter().filter(|r| r.value.is_some()).count();
    eprintln!(
        "Wrote {} ({} regions, {} with values, scale {}..{})",
        map.output.display(),
        map.regions.len(),
        matched,
        map.scale.low,
        map.scale.high
    );
    Ok(())
}
