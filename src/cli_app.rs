//! Top-level CLI definition and dispatch.

use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{ColoredString, Colorize, control};
use serde_json::{Value, json};
use thiserror::Error;

use frame_waterfall::core::config::Config;
use frame_waterfall::core::errors::FwvError;
use frame_waterfall::core::paths::resolve_absolute_path;
use frame_waterfall::decoder::frame::{Frame, StatusCode};
use frame_waterfall::decoder::layout::LayoutPreset;
use frame_waterfall::decoder::source::{DecodedLog, decode_file};
use frame_waterfall::logger::ActivityLogger;
use frame_waterfall::session::Session;
use frame_waterfall::synth::{SynthConfig, write_synth};
use frame_waterfall::window::{WINDOW_ROWS, Window};

/// Frame waterfall viewer for 16x16 sensor-controller logs.
#[derive(Debug, Parser)]
#[command(
    name = "fwv",
    author,
    version,
    about = "Frame Waterfall Viewer - decode and browse sensor-controller logs",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Override the configured frame layout.
    #[arg(long, global = true, value_enum, value_name = "LAYOUT")]
    layout: Option<LayoutArg>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Increase verbosity.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Quiet mode (errors only).
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Browse a log interactively in the terminal.
    View(InputArgs),
    /// List decoded frames.
    Decode(DecodeArgs),
    /// Print the 16-row window ending at a row.
    Window(WindowArgs),
    /// Show file digest, layout, and scan statistics.
    Info(InputArgs),
    /// Write a synthetic log for testing.
    Synth(SynthArgs),
    /// Inspect configuration state.
    Config(ConfigArgs),
    /// Show version and optional build metadata.
    Version,
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LayoutArg {
    /// 20-byte frames: image row only.
    ImageOnly,
    /// 22-byte frames: image row, status code, error value.
    Extended,
}

impl From<LayoutArg> for LayoutPreset {
    fn from(value: LayoutArg) -> Self {
        match value {
            LayoutArg::ImageOnly => Self::ImageOnly,
            LayoutArg::Extended => Self::Extended,
        }
    }
}

#[derive(Debug, Clone, Args)]
struct InputArgs {
    /// Log file (defaults to `input.log_path` from config).
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct DecodeArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Skip this many frames before listing.
    #[arg(long, default_value_t = 0, value_name = "N")]
    offset: usize,
    /// Maximum frames to list.
    #[arg(long, value_name = "N")]
    limit: Option<usize>,
}

#[derive(Debug, Clone, Args)]
struct WindowArgs {
    #[command(flatten)]
    input: InputArgs,
    /// 1-indexed row shown at the bottom of the window.
    #[arg(long, value_name = "N")]
    row: String,
}

#[derive(Debug, Clone, Args)]
struct SynthArgs {
    /// Output file.
    #[arg(value_name = "OUT")]
    out: PathBuf,
    /// Number of frames to generate.
    #[arg(long, default_value_t = 256, value_name = "N")]
    frames: usize,
    /// Probability of a junk run before each frame.
    #[arg(long, default_value_t = 0.1, value_name = "RATIO")]
    junk_ratio: f64,
    /// Seed for reproducible output.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
}

#[derive(Debug, Clone, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Subcommand)]
enum ConfigCommand {
    /// Print the config file path in use.
    Path,
    /// Print the effective configuration.
    Show,
    /// Validate the configuration.
    Validate,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completion script for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input or unusable log contents.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// Internal bug or invariant violation.
    #[error("{0}")]
    Internal(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Internal(_) | Self::Json(_) => 3,
        }
    }
}

impl From<FwvError> for CliError {
    fn from(err: FwvError) -> Self {
        if err.is_user_facing() {
            Self::User(err.to_string())
        } else if matches!(err, FwvError::Serialization { .. }) {
            Self::Internal(err.to_string())
        } else {
            Self::Runtime(err.to_string())
        }
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        Command::View(args) => run_view(cli, args),
        Command::Decode(args) => run_decode(cli, args),
        Command::Window(args) => run_window(cli, args),
        Command::Info(args) => run_info(cli, args),
        Command::Synth(args) => run_synth(cli, args),
        Command::Config(args) => run_config(cli, args),
        Command::Version => emit_version(cli),
        Command::Completions(args) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

// ──────────────────── shared plumbing ────────────────────

fn load_config(cli: &Cli) -> Result<Config, CliError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(layout) = cli.layout {
        config.layout.preset = layout.into();
    }
    Ok(config)
}

fn input_path(args: &InputArgs, config: &Config) -> PathBuf {
    args.path
        .clone()
        .unwrap_or_else(|| config.input.log_path.clone())
}

/// Decode `path`, recording the session in the activity log. Zero frames is
/// an error here; callers that want to report empty logs use
/// [`decode_logged`] directly.
fn decode_with_frames(
    config: &Config,
    logger: &mut ActivityLogger,
    path: &Path,
) -> Result<DecodedLog, CliError> {
    let log = decode_logged(config, logger, path)?;
    if let Err(err) = log.require_frames() {
        logger.error(&err);
        return Err(err.into());
    }
    Ok(log)
}

fn decode_logged(
    config: &Config,
    logger: &mut ActivityLogger,
    path: &Path,
) -> Result<DecodedLog, CliError> {
    let hash = config.stable_hash()?;
    logger.session_start(path, &hash);
    match decode_file(path, &config.frame_layout()) {
        Ok(log) => {
            if log.frames.is_empty() {
                logger.no_frames(&log.path, log.byte_len);
            } else {
                logger.decode_complete(&log);
            }
            Ok(log)
        }
        Err(err) => {
            logger.error(&err);
            Err(err.into())
        }
    }
}

fn paint_status(code: StatusCode) -> ColoredString {
    let label = format!("{:<12}", code.label());
    match code {
        StatusCode::NORMAL => label.normal(),
        StatusCode::STRAIGHT => label.green(),
        StatusCode::LEFT | StatusCode::RIGHT => label.cyan(),
        StatusCode::GO_LEFT | StatusCode::GO_RIGHT => label.yellow(),
        _ => label.red(),
    }
}

fn paint_error(error: i8) -> ColoredString {
    let text = format!("{error:>5}");
    match error.unsigned_abs() {
        0 => text.normal(),
        1..=20 => text.yellow(),
        _ => text.red(),
    }
}

fn frame_json(row: usize, offset: Option<usize>, frame: &Frame) -> Value {
    json!({
        "row": row,
        "offset": offset,
        "image": frame.intensities().to_vec(),
        "status_code": frame.status_code.raw(),
        "status": frame.status_code.label(),
        "error": frame.error_value,
    })
}

fn report_json(log: &DecodedLog) -> Value {
    json!({
        "frames": log.frame_count(),
        "skipped_bytes": log.report.skipped_bytes,
        "resync_events": log.report.resync_events,
        "trailing_bytes": log.report.trailing_bytes,
        "clean": log.report.is_clean(),
    })
}

// ──────────────────── view ────────────────────

#[cfg(feature = "tui")]
fn run_view(cli: &Cli, args: &InputArgs) -> Result<(), CliError> {
    use frame_waterfall::viewer::model::Glyphs;
    use frame_waterfall::viewer::theme::ColorMode;
    use frame_waterfall::viewer::{ViewerOptions, run_viewer};

    if !io::stdout().is_terminal() {
        return Err(CliError::User(
            "view needs an interactive terminal; use `fwv decode` or `fwv window` instead"
                .to_string(),
        ));
    }

    let config = load_config(cli)?;
    let path = input_path(args, &config);
    let mut logger = ActivityLogger::from_config(&config.logging);
    logger.session_start(&path, &config.stable_hash()?);

    let options = ViewerOptions {
        path,
        layout: config.frame_layout(),
        glyphs: Glyphs {
            on: config.viewer.on_glyph.clone(),
            off: config.viewer.off_glyph.clone(),
        },
        start_at_end: config.viewer.start_at_end,
        color: ColorMode::from_environment(cli.no_color),
    };
    let summary = match run_viewer(options, &mut logger) {
        Ok(summary) => summary,
        Err(err) => {
            logger.flush();
            return Err(err.into());
        }
    };
    logger.flush();

    if cli.quiet {
        return Ok(());
    }
    let (row, total) = summary.position;
    match output_mode(cli) {
        OutputMode::Human => {
            println!("Stopped at row {row} / {total}");
            if cli.verbose
                && let Some(report) = summary.report
            {
                println!(
                    "  skipped {} bytes in {} resyncs, {} trailing",
                    report.skipped_bytes, report.resync_events, report.trailing_bytes
                );
                println!("  session: {:.1}s", summary.elapsed.as_secs_f64());
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "view",
                "row": row,
                "total": total,
                "duration_ms": u64::try_from(summary.elapsed.as_millis()).unwrap_or(u64::MAX),
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_view(_cli: &Cli, _args: &InputArgs) -> Result<(), CliError> {
    Err(CliError::User(
        "fwv was built without the `tui` feature".to_string(),
    ))
}

// ──────────────────── decode ────────────────────

fn run_decode(cli: &Cli, args: &DecodeArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let path = input_path(&args.input, &config);
    let mut logger = ActivityLogger::from_config(&config.logging);
    let log = decode_with_frames(&config, &mut logger, &path)?;

    let limit = args.limit.unwrap_or(usize::MAX);
    let selected = log
        .frames
        .iter()
        .zip(&log.offsets)
        .enumerate()
        .skip(args.offset)
        .take(limit);

    match output_mode(cli) {
        OutputMode::Human => {
            let mut stdout = io::stdout().lock();
            if !cli.quiet {
                writeln!(
                    stdout,
                    "{}: {} frames ({} layout)",
                    log.path.display(),
                    log.frame_count(),
                    log.layout.preset().map_or("custom", LayoutPreset::label)
                )?;
                if log.report.skipped_bytes > 0 {
                    writeln!(
                        stdout,
                        "{}",
                        format!(
                            "  skipped {} bytes in {} resyncs",
                            log.report.skipped_bytes, log.report.resync_events
                        )
                        .yellow()
                    )?;
                }
            }
            for (index, (frame, &offset)) in selected {
                write!(stdout, "{:>7}  {}  ", index + 1, frame.bitmap())?;
                if cli.verbose {
                    write!(stdout, "@{offset:<9} ")?;
                }
                writeln!(
                    stdout,
                    "{} {}",
                    paint_status(frame.status_code),
                    paint_error(frame.error_value)
                )?;
            }
        }
        OutputMode::Json => {
            let frames: Vec<Value> = selected
                .map(|(index, (frame, &offset))| frame_json(index + 1, Some(offset), frame))
                .collect();
            let payload = json!({
                "command": "decode",
                "path": log.path.to_string_lossy(),
                "layout": log.layout.preset().map_or("custom", LayoutPreset::label),
                "report": report_json(&log),
                "offset": args.offset,
                "limit": args.limit,
                "frames": frames,
            });
            write_json_line(&payload)?;
        }
    }
    logger.flush();
    Ok(())
}

// ──────────────────── window ────────────────────

fn run_window(cli: &Cli, args: &WindowArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let path = input_path(&args.input, &config);
    let mut logger = ActivityLogger::from_config(&config.logging);
    let log = decode_with_frames(&config, &mut logger, &path)?;
    let mut session = Session::from_log(log)?;

    let outcome = session.jump(&args.row);
    if !outcome.is_accepted() {
        logger.jump_rejected(&outcome);
        return Err(CliError::User(outcome.to_string()));
    }
    let (row, total) = session.position();
    let window = session.window();

    match output_mode(cli) {
        OutputMode::Human => {
            let mut stdout = io::stdout().lock();
            if !cli.quiet {
                writeln!(stdout, "{}", format!("Row {row} / {total}").bold())?;
            }
            write_window_human(
                &mut stdout,
                &window,
                &config.viewer.on_glyph,
                &config.viewer.off_glyph,
            )?;
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "window",
                "path": session.source().to_string_lossy(),
                "row": row,
                "total": total,
                "rows": window_json(&window),
            });
            write_json_line(&payload)?;
        }
    }
    logger.session_end((row, total), std::time::Duration::ZERO);
    logger.flush();
    Ok(())
}

fn write_window_human(
    out: &mut impl Write,
    window: &Window,
    on: &str,
    off: &str,
) -> Result<(), CliError> {
    for d in 0..WINDOW_ROWS {
        let source = window.sources[d].map_or_else(String::new, |i| (i + 1).to_string());
        let status = window.statuses[d];
        let pixels = window.row_text(d, on, off);
        if window.sources[d].is_some() {
            writeln!(
                out,
                "{source:>7} │{pixels}│ {} {}",
                paint_status(status.code),
                paint_error(status.error)
            )?;
        } else {
            writeln!(
                out,
                "{source:>7} │{}│ {}",
                pixels.dimmed(),
                format!("{:<12} {:>5}", status.label(), status.error).dimmed()
            )?;
        }
    }
    Ok(())
}

fn window_json(window: &Window) -> Vec<Value> {
    (0..WINDOW_ROWS)
        .map(|d| {
            let status = window.statuses[d];
            json!({
                "source_row": window.sources[d].map(|i| i + 1),
                "pixels": window.pixels[d].to_vec(),
                "status_code": status.code.raw(),
                "status": status.label(),
                "error": status.error,
            })
        })
        .collect()
}

// ──────────────────── info ────────────────────

fn run_info(cli: &Cli, args: &InputArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let path = input_path(args, &config);
    let mut logger = ActivityLogger::from_config(&config.logging);
    let log = decode_logged(&config, &mut logger, &path)?;
    let layout_label = log.layout.preset().map_or("custom", LayoutPreset::label);
    let absolute = resolve_absolute_path(&log.path);
    let elapsed_ms = u64::try_from(log.elapsed.as_millis()).unwrap_or(u64::MAX);

    match output_mode(cli) {
        OutputMode::Human => {
            println!("{}", log.path.display().to_string().bold());
            println!("  bytes:          {}", log.byte_len);
            println!("  sha256:         {}", log.sha256);
            println!(
                "  layout:         {layout_label} ({}-byte frames)",
                log.layout.frame_length()
            );
            println!("  frames:         {}", log.frame_count());
            let skipped = format!("{}", log.report.skipped_bytes);
            println!(
                "  skipped bytes:  {}",
                if log.report.skipped_bytes > 0 {
                    skipped.yellow()
                } else {
                    skipped.normal()
                }
            );
            println!("  resync events:  {}", log.report.resync_events);
            println!("  trailing bytes: {}", log.report.trailing_bytes);
            if cli.verbose {
                println!("  resolved path:  {}", absolute.display());
                println!("  decode time:    {elapsed_ms} ms");
                if let (Some(first), Some(last)) = (log.offsets.first(), log.offsets.last()) {
                    println!("  first frame at: {first}");
                    println!("  last frame at:  {last}");
                }
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "info",
                "path": log.path.to_string_lossy(),
                "absolute_path": absolute.to_string_lossy(),
                "bytes": log.byte_len,
                "sha256": log.sha256,
                "layout": layout_label,
                "frame_length": log.layout.frame_length(),
                "report": report_json(&log),
                "decode_ms": elapsed_ms,
            });
            write_json_line(&payload)?;
        }
    }
    logger.flush();

    log.require_frames()?;
    Ok(())
}

// ──────────────────── synth ────────────────────

fn run_synth(cli: &Cli, args: &SynthArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let synth = SynthConfig {
        frames: args.frames,
        layout: config.frame_layout(),
        junk_ratio: args.junk_ratio,
        seed: args.seed,
    };
    let log = write_synth(&args.out, &synth)?;

    match output_mode(cli) {
        OutputMode::Human => {
            if !cli.quiet {
                println!(
                    "Wrote {} frames ({} bytes, {} junk) to {}",
                    log.frames.len(),
                    log.bytes.len(),
                    log.junk_bytes,
                    args.out.display()
                );
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "synth",
                "path": args.out.to_string_lossy(),
                "frames": log.frames.len(),
                "bytes": log.bytes.len(),
                "junk_bytes": log.junk_bytes,
                "seed": args.seed,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

// ──────────────────── config ────────────────────

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    match &args.command {
        None | Some(ConfigCommand::Path) => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            let exists = path.exists();

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", path.display());
                    if !exists {
                        println!("  (file does not exist; defaults will be used)");
                    }
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config path",
                        "path": path.to_string_lossy(),
                        "exists": exists,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Show) => {
            let config = load_config(cli)?;

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", config.to_toml_string()?);
                }
                OutputMode::Json => {
                    let value = serde_json::to_value(&config)?;
                    let payload = json!({
                        "command": "config show",
                        "config": value,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Validate) => match load_config(cli) {
            Ok(config) => {
                let hash = config.stable_hash()?;

                match output_mode(cli) {
                    OutputMode::Human => {
                        println!("Configuration is valid.");
                        println!("  Source: {}", config.config_file.display());
                        println!("  Hash: {hash}");
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": true,
                            "path": config.config_file.to_string_lossy(),
                            "hash": hash,
                        });
                        write_json_line(&payload)?;
                    }
                }
                Ok(())
            }
            Err(e) => {
                match output_mode(cli) {
                    OutputMode::Human => {
                        eprintln!("Configuration is INVALID: {e}");
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": false,
                            "error": e.to_string(),
                        });
                        write_json_line(&payload)?;
                    }
                }
                Err(CliError::User(format!("invalid config: {e}")))
            }
        },
    }
}

// ──────────────────── version + output ────────────────────

fn emit_version(cli: &Cli) -> Result<(), CliError> {
    let version = env!("CARGO_PKG_VERSION");
    let package = env!("CARGO_PKG_NAME");
    let target = option_env!("TARGET").unwrap_or("unknown");
    let profile = option_env!("PROFILE").unwrap_or("unknown");
    let git_sha = option_env!("GIT_SHA").unwrap_or("unknown");

    match output_mode(cli) {
        OutputMode::Human => {
            println!("fwv {version}");
            if cli.verbose {
                println!("package: {package}");
                println!("target: {target}");
                println!("profile: {profile}");
                println!("git_sha: {git_sha}");
                println!("features: {}", enabled_features().join(","));
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "binary": "fwv",
                "version": version,
                "package": package,
                "features": enabled_features(),
                "build": {
                    "target": target,
                    "profile": profile,
                    "git_sha": git_sha,
                }
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn enabled_features() -> Vec<&'static str> {
    let mut features = vec!["cli"];
    if cfg!(feature = "tui") {
        features.push("tui");
    }
    features
}

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("FWV_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref(), io::stdout().is_terminal())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>, stdout_is_tty: bool) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    let fallback = if stdout_is_tty {
        OutputMode::Human
    } else {
        OutputMode::Json
    };

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        Some("human") => OutputMode::Human,
        Some("auto") | None => fallback,
        Some(_) => fallback,
    }
}
