//! Halldyll stack CLI entrypoint.
//!
//! This is the main entrypoint for the halldyll-stack command-line tool.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use halldyll_stack::cli::{Cli, Commands, OutputFormatter, ParameterArgs};
use halldyll_stack::config::{
    find_stack_file, load_parameters_file, parameters_from_env_file, parse_set_values,
    StackParser, StackValidator,
};
use halldyll_stack::error::{ConfigError, Result, StackError};
use halldyll_stack::stack::Stack;
use halldyll_stack::template::ParameterSet;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // Initialize logging
    init_logging(cli.verbose, cli.log_json);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system on stderr.
fn init_logging(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Dispatches the selected command.
fn run(cli: Cli) -> Result<()> {
    let formatter = OutputFormatter::new(cli.output);
    let stack_file = resolve_stack_path(cli.file.as_deref())?;

    match cli.command {
        Commands::Render { params, out } => {
            cmd_render(&stack_file, &params, out.as_deref(), &formatter)
        }
        Commands::Validate { warnings, params } => {
            cmd_validate(&stack_file, &params, warnings, &formatter)
        }
        Commands::Inspect { params } => cmd_inspect(&stack_file, &params, &formatter),
    }
}

/// Render the stack.
fn cmd_render(
    stack_file: &Path,
    args: &ParameterArgs,
    out: Option<&Path>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let stack = load_stack(stack_file)?;
    let params = load_parameters(args)?;

    let rendered = stack.render(&params)?;
    let output = formatter.format_rendered(&rendered)?;

    match out {
        Some(path) => {
            std::fs::write(path, output)?;
            info!("Wrote rendered stack to: {}", path.display());
        }
        None => write_stdout(&output)?,
    }

    Ok(())
}

/// Validate the stack.
fn cmd_validate(
    stack_file: &Path,
    args: &ParameterArgs,
    show_warnings: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let stack = load_stack(stack_file)?;
    info!("Validating stack: {}", stack.name());

    let params = if args.is_empty() {
        None
    } else {
        Some(load_parameters(args)?)
    };

    let result = StackValidator::new().check(&stack, params.as_ref());
    write_stdout(&formatter.format_validation(&result, show_warnings))?;

    match result.errors.first() {
        None => Ok(()),
        Some(first) => Err(StackError::Config(ConfigError::validation(
            first.message.clone(),
            first.field.clone(),
        ))),
    }
}

/// List placeholders and their values.
fn cmd_inspect(stack_file: &Path, args: &ParameterArgs, formatter: &OutputFormatter) -> Result<()> {
    let stack = load_stack(stack_file)?;
    let params = load_parameters(args)?;

    let refs = stack.placeholders();
    debug!(
        "Stack {} references {} distinct parameters",
        stack.name(),
        stack.required_parameters().len()
    );

    write_stdout(&formatter.format_placeholders(&refs, &params))
}

/// Resolves the stack file path, searching upward when none is given.
fn resolve_stack_path(file: Option<&Path>) -> Result<PathBuf> {
    match file {
        Some(path) => Ok(path.to_path_buf()),
        None => find_stack_file(std::env::current_dir()?),
    }
}

/// Loads a stack document.
fn load_stack(path: &Path) -> Result<Stack> {
    StackParser::new().load_file(path)
}

/// Builds the parameter set from files, env files and `--set` pairs, in that order.
fn load_parameters(args: &ParameterArgs) -> Result<ParameterSet> {
    let mut params = ParameterSet::new();

    for path in &args.parameters {
        params = params.layered(load_parameters_file(path)?);
    }
    for path in &args.env_files {
        params = params.layered(parameters_from_env_file(path)?);
    }
    params = params.layered(parse_set_values(&args.set)?);

    debug!("Using {} parameters", params.len());
    Ok(params)
}

/// Writes command output to stdout.
fn write_stdout(output: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    if !output.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}
