pub(crate) mod report;
pub(crate) mod utils;

use anyhow::Result;
use log::{debug, warn};
use std::{fs, path::Path};
use structopt::StructOpt;
use ve_component::prelude::*;
use walkdir::WalkDir;

// Cli arguments
#[derive(StructOpt, Debug)]
#[structopt(name = "ve_asset")]
struct CliArgs {
    /// Component description, or a folder to search for component descriptions
    input: String,
    /// Loader settings (toml)
    #[structopt(short = "c", long = "config")]
    config: Option<String>,
    /// Output debug info
    #[structopt(short = "v", long = "verbose")]
    verbose: bool,
}

/// Happens during setup
#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("Input does not exist: {0}")]
    InputNonExistant(String),
    #[error("Loader config could not be read: {0}")]
    Config(#[source] ComponentError),
}

fn main() -> Result<()> {
    let args = CliArgs::from_args();

    if !args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    } else {
        env_logger::Builder::new()
            .filter(None, log::LevelFilter::Debug)
            .init();
    }

    prepare(args)
}

fn prepare(args: CliArgs) -> Result<()> {
    let input_path = Path::new(&args.input);
    if !input_path.exists() {
        return Err(CliError::InputNonExistant(input_path.display().to_string()).into());
    }

    let config = match &args.config {
        Some(config) => LoaderConfig::parse(Path::new(config)).map_err(CliError::Config)?,
        None => LoaderConfig::default(),
    };
    let mut loader = ComponentLoader::new(config);

    let stats = walk(input_path, &mut loader);
    if stats.failed > 0 {
        warn!("{} component(s) failed to load", stats.failed);
    }

    Ok(())
}

#[derive(Debug, Default, PartialEq, Eq)]
struct WalkStats {
    inspected: usize,
    failed: usize,
}

/// Inspects every component description below `input_path`. A file that fails is logged and
/// counted, the walk goes on with the next one.
fn walk<D: MeshDecoder>(input_path: &Path, loader: &mut ComponentLoader<D>) -> WalkStats {
    let mut stats = WalkStats::default();
    for entry in WalkDir::new(input_path).sort_by_file_name() {
        let path = match &entry {
            Err(err) => {
                warn!("Error parsing path: {}", err);
                continue;
            }
            Ok(entry) => entry.path(),
        };

        if path.is_dir() {
            continue;
        }

        match utils::extension(path).as_deref() {
            Some("json") => {
                // absolute, so the configured asset root does not apply twice
                let absolute = match fs::canonicalize(path) {
                    Ok(absolute) => absolute,
                    Err(err) => {
                        warn!("{}: could not resolve path: {}", path.display(), err);
                        stats.failed += 1;
                        continue;
                    }
                };
                match report::inspect(loader, &absolute) {
                    Ok(summary) => {
                        println!("{}", summary);
                        stats.inspected += 1;
                    }
                    Err(err) => {
                        warn!("{}: {:#}", path.display(), err);
                        stats.failed += 1;
                    }
                }
            }
            Some("vem") | Some("toml") => debug!("Ignored file: {}", path.display()),
            Some(_) => warn!("Could not handle path: {}", path.display()),
            None => warn!(
                "Ignored file \"{}\", because no file extension was found.",
                path.display()
            ),
        }
    }
    stats
}
