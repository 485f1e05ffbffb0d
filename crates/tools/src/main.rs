use std::path::PathBuf;
use std::sync::Arc;

use catalog::LineCatalog;
use clap::{Parser, Subcommand};
use foundation::DisplayPoint;
use points::{ClientConfig, Comment, HttpStore, ImageUploader, MemoryStore, SharePointStore};
use scene::{DisplayState, PointCandidate};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(author, version, about = "Historical railway map: coordinates, years and share points")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a canonical (WGS-84) coordinate to the display frame (GCJ-02)
    ToDisplay {
        #[arg(allow_negative_numbers = true)]
        lon: f64,
        #[arg(allow_negative_numbers = true)]
        lat: f64,
    },

    /// Convert a display (GCJ-02) coordinate back to the canonical frame
    ToCanonical {
        #[arg(allow_negative_numbers = true)]
        lon: f64,
        #[arg(allow_negative_numbers = true)]
        lat: f64,
    },

    /// Resolve a year to the nearest year with line data
    Year {
        /// Directory of <year>.json datasets (default: bundled demo catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,

        #[arg(allow_negative_numbers = true)]
        year: i32,
    },

    /// Print the render scene for a year as JSON
    Scene {
        #[arg(long)]
        catalog: Option<PathBuf>,

        #[arg(long, allow_negative_numbers = true)]
        year: Option<i32>,

        /// Share point API base URL; without it no points are loaded
        #[arg(long)]
        api: Option<String>,

        #[arg(long)]
        hide_lines: bool,

        #[arg(long)]
        hide_points: bool,
    },

    /// Upload images and print their URLs
    Upload {
        #[arg(long)]
        api: Option<String>,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Submit a share point for a click on the display map
    AddPoint {
        #[arg(long)]
        catalog: Option<PathBuf>,

        #[arg(long)]
        api: Option<String>,

        /// Click longitude in the display frame
        #[arg(long, allow_negative_numbers = true)]
        click_lon: f64,

        /// Click latitude in the display frame
        #[arg(long, allow_negative_numbers = true)]
        click_lat: f64,

        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        desc: String,

        /// Image to upload and attach; repeatable
        #[arg(long = "image")]
        images: Vec<PathBuf>,
    },

    /// Comment on a share point, addressed by its list index
    Comment {
        #[arg(long)]
        catalog: Option<PathBuf>,

        #[arg(long)]
        api: Option<String>,

        #[arg(long)]
        index: usize,

        #[arg(long)]
        username: String,

        #[arg(long)]
        contents: String,

        #[arg(long = "image")]
        images: Vec<PathBuf>,
    },

    /// Delete a share point, addressed by its list index
    Delete {
        #[arg(long)]
        catalog: Option<PathBuf>,

        #[arg(long)]
        api: Option<String>,

        #[arg(long)]
        index: usize,

        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Args::parse()).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> CliResult<()> {
    match args.command {
        Command::ToDisplay { lon, lat } => print_json(&tools::to_display(lon, lat)?),
        Command::ToCanonical { lon, lat } => print_json(&tools::to_canonical(lon, lat)?),
        Command::Year { catalog, year } => {
            let catalog = load_catalog(catalog)?;
            print_json(&tools::resolve_year(&catalog, year))
        }
        Command::Scene {
            catalog,
            year,
            api,
            hide_lines,
            hide_points,
        } => {
            let catalog = load_catalog(catalog)?;
            let store: Arc<dyn SharePointStore> = match &api {
                Some(url) => Arc::new(http_store(Some(url.clone()))?),
                None => Arc::new(MemoryStore::new()),
            };
            let mut state = DisplayState::new(catalog, store);
            if let Some(year) = year {
                state.set_year(year);
            }
            state.set_show_lines(!hide_lines);
            state.set_show_share_points(!hide_points);
            if api.is_some() {
                state.load_share_points().await?;
            }
            print_json(&state.render())
        }
        Command::Upload { api, files } => {
            let store = http_store(api)?;
            let urls = store.upload(tools::read_images(&files)?).await?;
            print_json(&urls)
        }
        Command::AddPoint {
            catalog,
            api,
            click_lon,
            click_lat,
            name,
            desc,
            images,
        } => {
            let click = DisplayPoint::new(click_lon, click_lat)?;
            let store = Arc::new(http_store(api)?);
            let image_urls = upload_all(store.as_ref(), &images).await?;

            let mut state = DisplayState::new(load_catalog(catalog)?, store);
            let candidate = PointCandidate::from_click(click, name, desc, image_urls);
            info!(
                "click {:?} stored as {:?}",
                click.lon_lat(),
                candidate.position().lon_lat()
            );
            let created = state.submit_share_point(candidate).await?;
            print_json(created)
        }
        Command::Comment {
            catalog,
            api,
            index,
            username,
            contents,
            images,
        } => {
            let store = Arc::new(http_store(api)?);
            let image_urls = upload_all(store.as_ref(), &images).await?;

            let mut state = DisplayState::new(load_catalog(catalog)?, store);
            state.load_share_points().await?;
            let comment = Comment::new(username, contents, points::now_ms(), image_urls);
            let updated = state.submit_comment(index, comment).await?;
            print_json(updated)
        }
        Command::Delete {
            catalog,
            api,
            index,
            password,
        } => {
            let store = Arc::new(http_store(api)?);
            let mut state = DisplayState::new(load_catalog(catalog)?, store);
            state.load_share_points().await?;
            let success = state.remove_share_point(index, &password).await?;
            print_json(&serde_json::json!({ "success": success }))
        }
    }
}

fn load_catalog(dir: Option<PathBuf>) -> CliResult<LineCatalog> {
    let dir = dir.unwrap_or_else(tools::default_catalog_dir);
    Ok(LineCatalog::load_dir(dir)?)
}

/// `--api` wins over `RAILS_API_BASE`.
fn http_store(api: Option<String>) -> CliResult<HttpStore> {
    let mut config = ClientConfig::from_env();
    if let Some(url) = api {
        config.base_url = url;
    }
    Ok(HttpStore::new(config)?)
}

async fn upload_all(store: &HttpStore, images: &[PathBuf]) -> CliResult<Vec<String>> {
    if images.is_empty() {
        return Ok(Vec::new());
    }
    let files = tools::read_images(images)?;
    Ok(store.upload(files).await?)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
