use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Args, Parser};
use stemshift_core::{compile, AppConfig, Session, StemLayout, StemshiftError};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(kind = err.kind(), "{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> stemshift_core::Result<()> {
    let config = build_config(&cli)?;
    let recipe = read_recipe(&cli.recipe)?;
    let pipelines = compile(&recipe)?;

    if cli.check {
        for pipeline in &pipelines {
            println!("{pipeline}");
        }
        return Ok(());
    }

    let output = cli
        .output
        .as_deref()
        .ok_or_else(|| StemshiftError::Config("an output path is required".to_string()))?;

    tracing::info!(stems = ?config.stems.dir, layout = ?config.stems.layout, "starting session");
    let report = Session::from_config(&config).run(&pipelines, output)?;
    tracing::info!(
        pipelines = report.pipelines_run,
        saved = report.saved.len(),
        output = %report.output.display(),
        "done"
    );
    Ok(())
}

fn build_config(cli: &Cli) -> stemshift_core::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    if let Some(dir) = &cli.stems_dir {
        config.stems.dir = dir.clone();
    }
    if let Some(layout) = cli.layout {
        config.stems.layout = layout;
    }
    if let Some(dir) = &cli.work_dir {
        config.export.work_dir = dir.clone();
    }
    if cli.preserve {
        config.export.preserve_intermediates = true;
    }

    config.validate()?;
    Ok(config)
}

fn read_recipe(args: &RecipeArgs) -> stemshift_core::Result<String> {
    match (&args.recipe, &args.recipe_file) {
        (Some(recipe), _) => Ok(recipe.clone()),
        (None, Some(path)) => read_recipe_file(path),
        (None, None) => Err(StemshiftError::Config(
            "either --recipe or --recipe-file must be provided".to_string(),
        )),
    }
}

fn read_recipe_file(path: &Path) -> stemshift_core::Result<String> {
    Ok(fs::read_to_string(path)?)
}

fn init_tracing(default_level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Rearrange the stems of a song with a recipe", long_about = None)]
struct Cli {
    /// Where to write the merged WAV file.
    #[arg(required_unless_present = "check")]
    output: Option<PathBuf>,

    #[command(flatten)]
    recipe: RecipeArgs,

    /// Directory holding the splitter output (`<channel>.wav`).
    #[arg(long)]
    stems_dir: Option<PathBuf>,

    /// Stems produced by the splitter: two, four or five.
    #[arg(long)]
    layout: Option<StemLayout>,

    /// Directory for exported intermediate tracks.
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Keep intermediate files for debugging.
    #[arg(long)]
    preserve: bool,

    /// JSON configuration file; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set.
    #[arg(
        long,
        default_value = "warn",
        value_parser = ["trace", "debug", "info", "warn", "error"]
    )]
    log_level: String,

    /// Compile the recipe, print its pipelines and exit.
    #[arg(long)]
    check: bool,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct RecipeArgs {
    /// Recipe text, e.g. "vocals -> save(vocals); piano -> flat -> save(p2)".
    #[arg(long)]
    recipe: Option<String>,

    /// Path to a file containing the recipe.
    #[arg(long)]
    recipe_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "stemshift",
            "out.wav",
            "--recipe",
            "vocals -> save(vocals)",
            "--layout",
            "two",
            "--stems-dir",
            "split",
            "--preserve",
        ])
        .unwrap();

        let config = build_config(&cli).unwrap();
        assert_eq!(config.stems.layout, StemLayout::Two);
        assert_eq!(config.stems.dir, PathBuf::from("split"));
        assert!(config.export.preserve_intermediates);
        assert_eq!(read_recipe(&cli.recipe).unwrap(), "vocals -> save(vocals)");
    }

    #[test]
    fn recipe_sources_are_mutually_exclusive() {
        let result = Cli::try_parse_from([
            "stemshift",
            "out.wav",
            "--recipe",
            "a -> b",
            "--recipe-file",
            "recipe.txt",
        ]);
        assert!(result.is_err());
        assert!(Cli::try_parse_from(["stemshift", "out.wav"]).is_err());
    }

    #[test]
    fn check_mode_needs_no_output() {
        let cli = Cli::try_parse_from(["stemshift", "--check", "--recipe", "vocals -> drop"]).unwrap();
        assert!(cli.output.is_none());
        assert!(run(cli).is_ok());
    }
}
