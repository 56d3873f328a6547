use std::env;
use std::ffi::OsString;
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::{self, Command};

use envtab::{EnvTable, ParseFlags};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILE: &str = ".env";

const HELP: &str = "\
envtab - run commands with variables parsed from env files

Usage:
  envtab run [OPTIONS] -- COMMAND [ARGS...]
  envtab run [OPTIONS] COMMAND [ARGS...]
  envtab --help
  envtab --version

Commands:
  run       Parse env files and execute a command
";

const RUN_HELP: &str = "\
envtab run - parse env files and execute a command

Usage:
  envtab run [OPTIONS] -- COMMAND [ARGS...]
  envtab run [OPTIONS] COMMAND [ARGS...]

Options:
  -f, --file <PATHS>      Env file path(s). Repeat or pass comma-separated
                          paths; later files win. Defaults to .env.
      --no-check-ext      Skip the .env file-name check.
      --no-interpolate    Disable variable expansion in values.
  -v, --verbose           Print parser diagnostics to stderr.
  -q, --quiet             Suppress parser diagnostics.
  -h, --help              Show this help text.
";

#[derive(Debug, Clone, PartialEq, Eq)]
enum RunCommand {
    Help,
    Execute(RunOptions),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct RunOptions {
    files: Vec<PathBuf>,
    flags: ParseFlags,
    verbose: bool,
    quiet: bool,
    command: OsString,
    args: Vec<OsString>,
}

fn main() {
    process::exit(run(env::args_os()));
}

fn run(args: impl IntoIterator<Item = OsString>) -> i32 {
    let mut args = args.into_iter();
    let _bin = args.next();

    let Some(subcommand) = args.next() else {
        print_help();
        return 0;
    };

    let subcommand = subcommand.to_string_lossy();
    match subcommand.as_ref() {
        "-h" | "--help" | "help" => {
            print_help();
            0
        }
        "-V" | "--version" | "version" => {
            print_version();
            0
        }
        "run" => match parse_run_options(args.collect()) {
            Ok(RunCommand::Help) => {
                print_run_help();
                0
            }
            Ok(RunCommand::Execute(options)) => {
                init_logging(&options);
                match execute_run(options) {
                    Ok(code) => code,
                    Err(err) => {
                        eprintln!("envtab: {err}");
                        1
                    }
                }
            }
            Err(err) => {
                eprintln!("envtab: {err}");
                eprintln!("Try `envtab run --help`.");
                1
            }
        },
        unknown => {
            eprintln!("envtab: unknown subcommand `{unknown}`");
            eprintln!("Try `envtab --help`.");
            1
        }
    }
}

fn parse_run_options(args: Vec<OsString>) -> Result<RunCommand, String> {
    let mut options = RunOptions::default();
    let mut index = 0usize;
    while index < args.len() {
        let token = args[index].to_string_lossy();
        match token.as_ref() {
            "--" => {
                index += 1;
                break;
            }
            "-h" | "--help" => return Ok(RunCommand::Help),
            "-f" | "--file" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    return Err("missing value for `-f/--file`".to_owned());
                };
                parse_file_text(&value.to_string_lossy(), &mut options.files)?;
                index += 1;
            }
            value if value.starts_with("--file=") => {
                parse_file_text(&value["--file=".len()..], &mut options.files)?;
                index += 1;
            }
            "--no-check-ext" => {
                options.flags |= ParseFlags::NO_CHECK_EXT;
                index += 1;
            }
            "--no-interpolate" => {
                options.flags |= ParseFlags::NO_INTERPOLATE;
                index += 1;
            }
            "-v" | "--verbose" => {
                options.verbose = true;
                index += 1;
            }
            "-q" | "--quiet" => {
                options.quiet = true;
                index += 1;
            }
            unknown if unknown.starts_with('-') => {
                return Err(format!("unknown option `{unknown}`"));
            }
            _ => break,
        }
    }

    let remaining = &args[index..];
    let Some((command, command_args)) = remaining.split_first() else {
        return Err("missing command after `run`".to_owned());
    };

    if options.files.is_empty() {
        options.files.push(PathBuf::from(DEFAULT_FILE));
    }

    options.command = command.clone();
    options.args = command_args.to_vec();
    Ok(RunCommand::Execute(options))
}

fn parse_file_text(raw: &str, files: &mut Vec<PathBuf>) -> Result<(), String> {
    let mut added = 0usize;
    for segment in raw.split(',') {
        let trimmed = segment.trim();
        if trimmed.is_empty() {
            continue;
        }
        files.push(PathBuf::from(trimmed));
        added += 1;
    }
    if added == 0 {
        return Err("`-f/--file` requires at least one path".to_owned());
    }
    Ok(())
}

fn init_logging(options: &RunOptions) {
    let default_level = if options.quiet {
        "error"
    } else if options.verbose {
        "debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn execute_run(options: RunOptions) -> Result<i32, String> {
    let mut command = Command::new(&options.command);
    command.args(&options.args);

    for path in &options.files {
        let table = EnvTable::from_path_with(path, options.flags)
            .map_err(|err| format!("{}: {err}", path.display()))?;
        for (key, value) in table.iter() {
            command.env(key, value);
        }
    }

    execute_command(command, &options.command)
}

#[cfg(unix)]
fn execute_command(mut command: Command, program: &OsString) -> Result<i32, String> {
    let err = command.exec();
    Err(format!(
        "failed to execute `{}`: {err}",
        program.to_string_lossy()
    ))
}

#[cfg(not(unix))]
fn execute_command(mut command: Command, program: &OsString) -> Result<i32, String> {
    let status = command
        .status()
        .map_err(|err| format!("failed to execute `{}`: {err}", program.to_string_lossy()))?;
    Ok(status.code().unwrap_or(1))
}

fn print_help() {
    println!("{HELP}");
}

fn print_run_help() {
    println!("{RUN_HELP}");
}

fn print_version() {
    println!("envtab {}", env!("CARGO_PKG_VERSION"));
}
