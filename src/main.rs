//! mathdown - Convert Word manuscripts to Markdown+LaTeX
//!
//! CLI entry point

use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

use mathdown::{
    exit_codes,
    // Batch pipeline
    run_batch,
    // CLI
    BatchArgs, Cli, Commands, ConvertArgs, FixDelimitersArgs, ValidateArgs,
    // Config
    CliOverrides, Config,
    // Conversion pipeline
    DocumentConverter,
    // Engine
    Severity,
    // Progress tracking
    OutputMode, ProgressTracker,
};

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let result = match cli.command {
        Commands::Convert(args) => run_convert(&args),
        Commands::Batch(args) => run_batch_cmd(&args),
        Commands::FixDelimiters(args) => run_fix_delimiters(&args),
        Commands::Validate(args) => run_validate(&args),
        Commands::Info => run_info(),
    };

    std::process::exit(match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            exit_codes::GENERAL_ERROR
        }
    });
}

fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("warn"))
        .expect("fallback filter is valid");
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the config file, falling back to defaults with a warning when
/// the file is unreadable.
fn load_config(path: Option<&PathBuf>) -> Config {
    match path {
        Some(path) => match Config::load_from_path(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: failed to load config file: {e}");
                Config::default()
            }
        },
        None => Config::load().unwrap_or_default(),
    }
}

// ============ Convert Command ============

fn run_convert(args: &ConvertArgs) -> anyhow::Result<i32> {
    if !args.input.exists() {
        eprintln!("Error: input file does not exist: {}", args.input.display());
        return Ok(exit_codes::INPUT_NOT_FOUND);
    }

    let file_config = load_config(args.config.as_ref());
    let mut overrides = CliOverrides::new();
    if args.no_fix {
        overrides.fix_delimiters = Some(false);
    }
    if args.no_images {
        overrides.extract_images = Some(false);
    }
    if args.no_tables {
        overrides.process_tables = Some(false);
    }
    let config = file_config.merge_with_cli(&overrides);

    let output = match &args.output {
        Some(output) => output.clone(),
        None => args.input.with_extension("md"),
    };

    let mode = if args.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::from_verbosity(args.verbose)
    };
    let mut progress = ProgressTracker::new(1, mode);
    progress.start_file(1, &args.input.display().to_string());

    let converter = DocumentConverter::new(config);
    let report = converter.convert_with_progress(&args.input, &output, &mut progress)?;
    progress.complete_file();

    if !args.quiet {
        println!("Output file: {}", report.output.display());
        println!("Equations fixed: {}", report.equations_fixed());
        println!("Tables tidied: {}", report.tables_tidied);
        if report.images_optimized > 0 {
            println!("Images optimized: {}", report.images_optimized);
        }
        for diagnostic in &report.diagnostics {
            eprintln!("{}", diagnostic.render(&report.output.display().to_string()));
        }
    }

    Ok(exit_codes::SUCCESS)
}

// ============ Batch Command ============

fn run_batch_cmd(args: &BatchArgs) -> anyhow::Result<i32> {
    let start_time = Instant::now();

    if !args.input_dir.is_dir() {
        eprintln!(
            "Error: input directory does not exist: {}",
            args.input_dir.display()
        );
        return Ok(exit_codes::INPUT_NOT_FOUND);
    }

    let file_config = load_config(args.config.as_ref());
    let overrides = CliOverrides {
        threads: args.threads,
        ..Default::default()
    };
    let config = file_config.merge_with_cli(&overrides);

    let output_dir = args.output_dir.as_ref().unwrap_or(&args.input_dir);
    let outcome = run_batch(&args.input_dir, output_dir, &config, args.recursive)?;

    for (path, message) in &outcome.failures {
        eprintln!("Error processing {}: {}", path.display(), message);
    }

    if !args.quiet {
        ProgressTracker::print_summary(outcome.processed, outcome.succeeded(), outcome.failed());
        println!("Total time: {:.2}s", start_time.elapsed().as_secs_f64());
    }

    if outcome.failed() > 0 {
        anyhow::bail!("{} file(s) failed to convert", outcome.failed());
    }
    Ok(exit_codes::SUCCESS)
}

// ============ Fix-Delimiters Command ============

fn run_fix_delimiters(args: &FixDelimitersArgs) -> anyhow::Result<i32> {
    if !args.input.exists() {
        eprintln!("Error: input file does not exist: {}", args.input.display());
        return Ok(exit_codes::INPUT_NOT_FOUND);
    }

    let file_config = load_config(args.config.as_ref());
    let overrides = CliOverrides {
        inline_delimiters: args.inline_delimiters.clone(),
        display_delimiters: args.display_delimiters.clone(),
        ..Default::default()
    };
    let config = file_config.merge_with_cli(&overrides);

    let document = std::fs::read_to_string(&args.input)?;
    let outcome = mathdown::fix(&document, &config.delimiter_config());

    let output = args.output.as_ref().unwrap_or(&args.input);
    std::fs::write(output, &outcome.text)?;

    println!("Output file: {}", output.display());
    println!("Inline equations fixed: {}", outcome.stats.inline_rewritten);
    println!(
        "Display equations fixed: {}",
        outcome.stats.display_rewritten
    );
    let path = args.input.display().to_string();
    for diagnostic in &outcome.diagnostics {
        eprintln!("{}", diagnostic.render(&path));
    }

    Ok(exit_codes::SUCCESS)
}

// ============ Validate Command ============

fn run_validate(args: &ValidateArgs) -> anyhow::Result<i32> {
    if !args.input.exists() {
        eprintln!("Error: input file does not exist: {}", args.input.display());
        return Ok(exit_codes::INPUT_NOT_FOUND);
    }

    let file_config = load_config(args.config.as_ref());
    let overrides = CliOverrides {
        require_math_wrapper: args.require_wrapped.then_some(true),
        ..Default::default()
    };
    let config = file_config.merge_with_cli(&overrides);

    let document = std::fs::read_to_string(&args.input)?;
    let diagnostics = mathdown::check(&document, &config.delimiter_config());

    let path = args.input.display().to_string();
    if args.json {
        let report = serde_json::json!({
            "path": path,
            "diagnostics": diagnostics,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for diagnostic in &diagnostics {
            println!("{}", diagnostic.render(&path));
        }
        if diagnostics.is_empty() {
            println!("{path}: no problems found");
        }
    }

    let failing = diagnostics
        .iter()
        .any(|d| d.severity == Severity::Error || (args.strict && d.severity == Severity::Warning));
    Ok(if failing {
        exit_codes::VALIDATION_FAILED
    } else {
        exit_codes::SUCCESS
    })
}

// ============ Info Command ============

fn run_info() -> anyhow::Result<i32> {
    println!("mathdown v{}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("System Information:");
    println!("  Platform: {}", std::env::consts::OS);
    println!("  Arch: {}", std::env::consts::ARCH);
    println!("  CPUs: {}", num_cpus::get());

    println!();
    println!("External Tools:");
    check_tool_with_version("pandoc", "Pandoc", &["--version"]);

    println!();
    println!("Config File Locations:");
    println!("  Local: ./mathdown.yaml");
    if let Some(user) = Config::user_config_path() {
        println!("  User:  {}", user.display());
    }

    Ok(exit_codes::SUCCESS)
}

fn check_tool_with_version(cmd: &str, name: &str, version_args: &[&str]) {
    match which::which(cmd) {
        Ok(path) => {
            if let Ok(output) = std::process::Command::new(&path).args(version_args).output() {
                let version_str = String::from_utf8_lossy(&output.stdout);
                let first_line = version_str.lines().next().unwrap_or("");
                if !first_line.is_empty() && first_line.len() < 80 {
                    println!("  {}: {} ({})", name, first_line.trim(), path.display());
                    return;
                }
            }
            println!("  {}: {} (found)", name, path.display());
        }
        Err(_) => println!("  {}: Not found", name),
    }
}
