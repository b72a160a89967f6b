use std::fmt;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use compute::JoinReport;
use formats::{
    ClassificationMethod, LoadError, MapData, MapPackage, MapPackageError, load_all,
};
use foundation::{ColorParseError, Rgba};
use layers::{BuildError, BuiltMap, Device, MapView, build_map};
use render::{Camera, CameraError, render_html, render_svg};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Choropleth maps of county statistics by year")]
struct Args {
    /// Map config JSON; relative sources resolve against its directory
    #[arg(long, default_value = "map.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one year as a static SVG
    Render(OutputArgs),

    /// Write a self-contained HTML page with the year slider
    Html(OutputArgs),

    /// Print breakpoints, class colors and the join report as JSON
    Breaks,
}

#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Year to show (defaults to the configured start year)
    #[arg(long)]
    year: Option<String>,

    /// Output file (stdout when omitted)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Use the mobile control placement
    #[arg(long)]
    mobile: bool,
}

#[derive(Debug)]
enum CliError {
    Package(MapPackageError),
    Load(LoadError),
    SourceOrder,
    Build(BuildError),
    Camera(CameraError),
    Background(ColorParseError),
    UnknownYear { year: String, years: Vec<String> },
    Write { path: PathBuf, source: std::io::Error },
    Json(serde_json::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Package(e) => write!(f, "{e}"),
            CliError::Load(e) => write!(f, "{e}"),
            CliError::SourceOrder => write!(f, "loaded sources arrived in an unexpected order"),
            CliError::Build(e) => write!(f, "{e}"),
            CliError::Camera(e) => write!(f, "camera: {e}"),
            CliError::Background(e) => write!(f, "map.background: {e}"),
            CliError::UnknownYear { year, years } => {
                write!(f, "unknown year {year}; available: {}", years.join(", "))
            }
            CliError::Write { path, source } => {
                write!(f, "failed to write {}: {source}", path.display())
            }
            CliError::Json(e) => write!(f, "json: {e}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<MapPackageError> for CliError {
    fn from(e: MapPackageError) -> Self {
        CliError::Package(e)
    }
}

impl From<BuildError> for CliError {
    fn from(e: BuildError) -> Self {
        CliError::Build(e)
    }
}

impl From<CameraError> for CliError {
    fn from(e: CameraError) -> Self {
        CliError::Camera(e)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), CliError> {
    let package = MapPackage::load(&args.config)?;
    let built = load_map(&package).await?;
    let cfg = package.config();

    match args.command {
        Command::Breaks => {
            let summary = BreaksSummary::new(&built, cfg.data_layer.classification.method);
            let json = serde_json::to_string_pretty(&summary).map_err(CliError::Json)?;
            println!("{json}");
            Ok(())
        }
        Command::Render(out) => {
            let mut view = built.view;
            prepare_view(&mut view, &out)?;
            let camera = Camera::from_config(cfg)?;
            let svg = render_svg(&view, &camera, background(&cfg.map.background)?);
            emit(out.out.as_deref(), &svg).await
        }
        Command::Html(out) => {
            let mut view = built.view;
            prepare_view(&mut view, &out)?;
            let camera = Camera::from_config(cfg)?;
            let title = cfg.name.as_deref().unwrap_or("Choropleth");
            let page = render_html(
                &mut view,
                &camera,
                &cfg.map,
                background(&cfg.map.background)?,
                title,
            )
            .map_err(CliError::Json)?;
            emit(out.out.as_deref(), &page).await
        }
    }
}

/// Fetches every source at once and builds the view; the first failure wins.
async fn load_map(package: &MapPackage) -> Result<BuiltMap, CliError> {
    let sources = package.sources();
    let loaded = load_all(&sources).await.map_err(CliError::Load)?;
    let data = MapData::from_loaded(loaded).ok_or(CliError::SourceOrder)?;
    let built = build_map(package.config(), data)?;
    log_report(&built.report);
    Ok(built)
}

fn log_report(report: &JoinReport) {
    info!(
        matched = report.matched,
        unmatched = report.unmatched,
        duplicates = report.duplicate_keys.len(),
        "joined table to features"
    );
}

fn prepare_view(view: &mut MapView, out: &OutputArgs) -> Result<(), CliError> {
    if out.mobile {
        view.set_device(Device::Mobile);
    }
    if let Some(year) = &out.year {
        if !view.slider().contains(year) {
            return Err(CliError::UnknownYear {
                year: year.clone(),
                years: view.slider().years().to_vec(),
            });
        }
        view.select_year(year);
    }
    Ok(())
}

fn background(css: &str) -> Result<Rgba, CliError> {
    Rgba::parse(css).map_err(CliError::Background)
}

async fn emit(path: Option<&Path>, body: &str) -> Result<(), CliError> {
    match path {
        Some(path) => {
            tokio::fs::write(path, body)
                .await
                .map_err(|source| CliError::Write {
                    path: path.to_path_buf(),
                    source,
                })?;
            info!(path = %path.display(), bytes = body.len(), "wrote output");
        }
        None => print!("{body}"),
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct BreaksSummary {
    method: ClassificationMethod,
    breaks: Vec<f64>,
    class_colors: Vec<String>,
    fingerprint: String,
    years: Vec<String>,
    observations: ObservationSummary,
    join: JoinSummary,
}

#[derive(Debug, Serialize)]
struct ObservationSummary {
    count: usize,
    min: f64,
    max: f64,
    mean: f64,
}

#[derive(Debug, Serialize)]
struct JoinSummary {
    matched: usize,
    unmatched: usize,
    missing_identifier: usize,
    records_without_key: usize,
    duplicate_keys: Vec<String>,
}

impl BreaksSummary {
    fn new(built: &BuiltMap, method: ClassificationMethod) -> Self {
        let colorizer = built.view.choropleth().colorizer();
        let classification = colorizer.classification();
        let report = &built.report;
        Self {
            method,
            breaks: classification.breaks.clone(),
            class_colors: colorizer.class_colors().iter().map(Rgba::to_hex).collect(),
            fingerprint: classification.fingerprint(),
            years: built.view.slider().years().to_vec(),
            observations: ObservationSummary {
                count: built.observations.count,
                min: built.observations.min,
                max: built.observations.max,
                mean: built.observations.mean,
            },
            join: JoinSummary {
                matched: report.matched,
                unmatched: report.unmatched,
                missing_identifier: report.missing_identifier,
                records_without_key: report.records_without_key,
                duplicate_keys: report.duplicate_keys.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Args, BreaksSummary, CliError, Command, load_map, prepare_view, run};
    use clap::Parser;
    use formats::MapPackage;
    use layers::Device;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;

    const CONFIG: &str = r##"{
        "version": "1.0",
        "name": "Unemployment",
        "projection": {
            "code": "EPSG:4326",
            "def": "+proj=longlat +datum=WGS84 +no_defs",
            "resolutions": [0.05, 0.025],
            "origin": [-180, 90]
        },
        "map": {"center": [47.0, -100.0], "zoom": 0},
        "table": {"source": "counties.csv", "state_field": "STATE_FIP", "county_field": "COUNTY_FIP"},
        "start_year": "2001",
        "data_layer": {
            "source": "counties.json",
            "id_field": "GEOID",
            "exclude": ["NAME"],
            "classification": {"method": "e", "classes": 2, "palette": {"type": "colors", "colors": ["white", "black"]}, "mode": "rgb"},
            "hover": {"weight": 4}
        },
        "tooltip": {"template": "{NAME}: {value}"},
        "legend": {"title": "{year}"}
    }"##;

    const CSV: &str = "STATE_FIP,COUNTY_FIP,NAME,2001,2002\n\
        38,015,Burleigh,2,4\n\
        38,017,Cass,6,\n\
        38,017,Cass again,9,9\n";

    const GEOJSON: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"GEOID": "38015"},
         "geometry": {"type": "Polygon", "coordinates": [[[-101, 46], [-100, 46], [-100, 47], [-101, 46]]]}},
        {"type": "Feature", "properties": {"GEOID": "38017"},
         "geometry": {"type": "Polygon", "coordinates": [[[-99, 46], [-98, 46], [-98, 47], [-99, 46]]]}},
        {"type": "Feature", "properties": {"GEOID": "38999"},
         "geometry": {"type": "Point", "coordinates": [-97, 46.5]}}
    ]}"#;

    fn package_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("map.json"), CONFIG).unwrap();
        fs::write(dir.path().join("counties.csv"), CSV).unwrap();
        fs::write(dir.path().join("counties.json"), GEOJSON).unwrap();
        dir
    }

    fn args(dir: &Path, rest: &[&str]) -> Args {
        let config = dir.join("map.json");
        let mut argv = vec!["choropleth", "--config", config.to_str().unwrap()];
        argv.extend_from_slice(rest);
        Args::try_parse_from(argv).expect("parse args")
    }

    #[test]
    fn parses_subcommands() {
        let a = Args::try_parse_from(["choropleth", "render", "--year", "2002", "--mobile"]).unwrap();
        assert_eq!(a.config.to_str(), Some("map.json"));
        match a.command {
            Command::Render(out) => {
                assert_eq!(out.year.as_deref(), Some("2002"));
                assert!(out.mobile);
                assert_eq!(out.out, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(Args::try_parse_from(["choropleth", "bogus"]).is_err());
    }

    #[tokio::test]
    async fn breaks_summary_reports_join_and_colors() {
        let dir = package_dir();
        let package = MapPackage::load(dir.path().join("map.json")).unwrap();
        let built = load_map(&package).await.unwrap();
        let summary = BreaksSummary::new(&built, package.config().data_layer.classification.method);

        assert_eq!(summary.breaks, vec![2.0, 4.0, 6.0]);
        assert_eq!(summary.class_colors, vec!["#ffffff", "#000000"]);
        assert_eq!(summary.years, vec!["2001", "2002"]);
        assert_eq!(summary.observations.count, 3);
        assert_eq!(summary.observations.mean, 4.0);
        assert_eq!(summary.join.matched, 2);
        assert_eq!(summary.join.unmatched, 1);
        assert_eq!(summary.join.duplicate_keys, vec!["38017"]);
        assert!(summary.fingerprint.len() > 8);
    }

    #[tokio::test]
    async fn unknown_year_is_rejected() {
        let dir = package_dir();
        let package = MapPackage::load(dir.path().join("map.json")).unwrap();
        let mut view = load_map(&package).await.unwrap().view;

        let Command::Render(out) = args(dir.path(), &["render", "--year", "1999"]).command else {
            panic!("expected render");
        };
        let err = prepare_view(&mut view, &out).unwrap_err();
        assert!(matches!(err, CliError::UnknownYear { ref year, .. } if year == "1999"));
        assert_eq!(err.to_string(), "unknown year 1999; available: 2001, 2002");

        let Command::Render(out) = args(dir.path(), &["render", "--year", "2002", "--mobile"]).command
        else {
            panic!("expected render");
        };
        prepare_view(&mut view, &out).unwrap();
        assert_eq!(view.year(), "2002");
        assert_eq!(view.device(), Device::Mobile);
    }

    #[tokio::test]
    async fn writes_svg_and_html() {
        let dir = package_dir();
        let svg_path = dir.path().join("map.svg");
        let html_path = dir.path().join("map.html");

        run(args(dir.path(), &["render", "--year", "2002", "--out", svg_path.to_str().unwrap()]))
            .await
            .unwrap();
        let svg = fs::read_to_string(&svg_path).unwrap();
        assert!(svg.starts_with("<svg "));
        assert!(svg.contains("<title>Burleigh: 4</title>"));

        run(args(dir.path(), &["html", "--out", html_path.to_str().unwrap()]))
            .await
            .unwrap();
        let page = fs::read_to_string(&html_path).unwrap();
        assert!(page.contains("<title>Unemployment</title>"));
        assert!(page.contains("Cass: 6"));
    }

    #[tokio::test]
    async fn missing_source_fails_the_whole_load() {
        let dir = package_dir();
        fs::remove_file(dir.path().join("counties.json")).unwrap();
        let err = run(args(dir.path(), &["breaks"])).await.unwrap_err();
        assert!(matches!(err, CliError::Load(_)));
        // The one report carries the source, its location and the cause.
        let message = err.to_string();
        assert!(message.starts_with("failed to load data_layer from "), "{message}");
        assert!(message.contains("counties.json: "), "{message}");
    }
}
