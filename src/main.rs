//! fprettier-lex - Dump or check the logical lines of Fortran source files

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::fmt::Write as _;
use std::io::{self, BufReader, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};

use fprettier_lex::config::CONFIG_FILE_NAME;
use fprettier_lex::{parse_args, CliArgs, Config, InputStream, LexError, Result};
use glob::Pattern;
use rayon::prelude::*;
use walkdir::WalkDir;

/// Fortran file extensions to process
const FORTRAN_EXTENSIONS: &[&str] = &[
    "f90", "f95", "f03", "f08", "f18", "f", "for", "ftn", "fpp", "F90", "F95", "F03", "F08", "F18",
    "F", "FOR", "FTN", "FPP",
];

/// Files larger than this are skipped (100 MB)
const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Result of lexing one source
#[derive(Debug)]
struct LexReport {
    /// Dump text, empty in `--check` mode
    output: String,
    logical_lines: usize,
    physical_lines: usize,
}

fn main() -> Result<()> {
    let args = parse_args();

    let use_stdin =
        args.inputs.is_empty() || (args.inputs.len() == 1 && args.inputs[0].as_os_str() == "-");

    if args.inputs.is_empty() && io::stdin().is_terminal() {
        print_usage();
        return Ok(());
    }

    let config = build_config(&args)?;

    if use_stdin {
        return process_stdin(&config, &args);
    }

    if let Some(jobs) = args.jobs {
        if jobs > 0 {
            if let Err(e) = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build_global()
            {
                eprintln!("Warning: failed to configure thread pool: {e}");
            }
        }
    }

    let files = collect_files(&args);

    if files.is_empty() {
        if !args.silent {
            eprintln!("No Fortran files found to lex.");
        }
        return Ok(());
    }

    let errors = process_files(&files, &config, &args)?;
    if errors > 0 {
        anyhow::bail!("{errors} of {} files failed", files.len());
    }

    Ok(())
}

/// Build configuration from the config file and CLI overrides
fn build_config(args: &CliArgs) -> Result<Config> {
    let mut config = if let Some(config_path) = &args.config {
        if args.debug {
            eprintln!(
                "[DEBUG] Using explicit config file: {}",
                config_path.display()
            );
        }
        Config::from_toml_file(config_path)?
    } else if Path::new(CONFIG_FILE_NAME).is_file() {
        if args.debug {
            eprintln!("[DEBUG] Using config file: {CONFIG_FILE_NAME}");
        }
        Config::from_toml_file(Path::new(CONFIG_FILE_NAME))?
    } else {
        if args.debug {
            eprintln!("[DEBUG] No config file found, using defaults");
        }
        Config::default()
    };

    if let Some(tab_width) = args.tab_width {
        config.tab_width = tab_width;
    }
    if args.strict {
        config.strict = true;
    }

    if args.debug {
        print_config_debug(&config);
    }

    if let Some(error) = config.validate() {
        anyhow::bail!("Invalid configuration: {error}");
    }

    Ok(config)
}

/// Print configuration values in debug mode
fn print_config_debug(config: &Config) {
    eprintln!("[DEBUG] Configuration:");
    eprintln!("[DEBUG]   tab_width: {}", config.tab_width);
    eprintln!(
        "[DEBUG]   max_continuation_lines: {}",
        config.max_continuation_lines
    );
    eprintln!("[DEBUG]   strict: {}", config.strict);
}

/// Collect all files to process, handling directories and recursive flag
fn collect_files(args: &CliArgs) -> Vec<PathBuf> {
    let exclude_patterns: Vec<Pattern> = args
        .exclude
        .iter()
        .filter_map(|p| match Pattern::new(p) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                eprintln!("Warning: ignoring exclude pattern '{p}': {e}");
                None
            }
        })
        .collect();

    let custom_extensions = &args.fortran_extensions;
    let mut files = Vec::new();

    for input in &args.inputs {
        if input.is_file() {
            if !is_excluded(input, &exclude_patterns) {
                files.push(input.clone());
            }
        } else if input.is_dir() {
            let walker = if args.recursive {
                WalkDir::new(input).follow_links(true).max_depth(256)
            } else {
                WalkDir::new(input).max_depth(1)
            };
            let mut found: Vec<PathBuf> = walker
                .into_iter()
                .filter_map(std::result::Result::ok)
                .map(walkdir::DirEntry::into_path)
                .filter(|path| {
                    path.is_file()
                        && is_fortran_file(path, custom_extensions)
                        && !is_excluded(path, &exclude_patterns)
                })
                .collect();
            found.sort();
            files.append(&mut found);
        } else if !args.silent {
            eprintln!("Skipping {}: no such file or directory", input.display());
        }
    }

    if args.debug {
        eprintln!("[DEBUG] {} files to lex", files.len());
    }

    files
}

/// Check if a path matches any exclusion pattern
fn is_excluded(path: &Path, patterns: &[Pattern]) -> bool {
    if patterns.is_empty() {
        return false;
    }

    let path_str = path.to_string_lossy();

    patterns.iter().any(|pattern| {
        pattern.matches(&path_str)
            || path.components().any(|component| match component {
                std::path::Component::Normal(c) => pattern.matches(&c.to_string_lossy()),
                _ => false,
            })
    })
}

/// Check if a file has a default or custom Fortran extension
fn is_fortran_file(path: &Path, custom_extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            FORTRAN_EXTENSIONS.contains(&ext)
                || custom_extensions
                    .iter()
                    .any(|custom| custom.strip_prefix('.').unwrap_or(custom) == ext)
        })
}

/// Lex all files, print dumps in input order, return the number of failures
fn process_files(files: &[PathBuf], config: &Config, args: &CliArgs) -> Result<usize> {
    let lex = |path: &PathBuf| lex_file(path, config, args);
    let results: Vec<Result<LexReport>> = if args.jobs == Some(1) {
        files.iter().map(lex).collect()
    } else {
        files.par_iter().map(lex).collect()
    };

    let mut stdout = io::stdout().lock();
    let mut errors = 0;
    let mut logical_lines = 0;
    let mut physical_lines = 0;

    for (path, result) in files.iter().zip(results) {
        match result {
            Ok(report) => {
                stdout.write_all(report.output.as_bytes())?;
                logical_lines += report.logical_lines;
                physical_lines += report.physical_lines;
            }
            Err(e) => {
                errors += 1;
                eprintln!("Error lexing {}: {e}", path.display());
            }
        }
    }
    stdout.flush()?;

    if !args.silent {
        let verb = if args.check { "Checked" } else { "Lexed" };
        let ok = files.len() - errors;
        if errors == 0 {
            eprintln!(
                "{verb} {ok} files successfully ({physical_lines} physical, {logical_lines} logical lines)."
            );
        } else {
            eprintln!("{verb} {ok} files, {errors} errors.");
        }
    }

    Ok(errors)
}

/// Read and lex a single file
fn lex_file(path: &Path, config: &Config, args: &CliArgs) -> Result<LexReport> {
    let file_size = std::fs::metadata(path)?.len();
    if file_size > DEFAULT_MAX_FILE_SIZE {
        anyhow::bail!(
            "{} MB exceeds limit of {} MB",
            file_size / (1024 * 1024),
            DEFAULT_MAX_FILE_SIZE / (1024 * 1024)
        );
    }

    let contents = std::fs::read_to_string(path)?;
    let name = path.display().to_string();
    let report = lex_source(&contents, &name, config, args)?;

    if args.debug {
        eprintln!(
            "[DEBUG] {name}: {} physical lines, {} logical lines",
            report.physical_lines, report.logical_lines
        );
    }

    Ok(report)
}

/// Lex `contents`, check that the physical lines reproduce it and build the dump
fn lex_source(contents: &str, name: &str, config: &Config, args: &CliArgs) -> Result<LexReport> {
    let mut stream = InputStream::with_config(BufReader::new(contents.as_bytes()), name, config);
    let mut output = String::new();
    let mut reconstructed = String::with_capacity(contents.len());
    let mut logical_lines = 0;

    while let Some(line) = stream.next_fortran_line()? {
        if stream.truncated_at_eof() {
            if config.strict {
                return Err(stream
                    .parse_error("continuation line at end of file")
                    .into());
            }
            if args.debug {
                eprintln!(
                    "[DEBUG] {name}:{}: continuation left open at end of file",
                    line.line_number
                );
            }
        }

        logical_lines += 1;
        for physical in &line.lines {
            reconstructed.push_str(physical);
        }

        if !args.check {
            writeln!(output, "{name}:{}: {:?}", line.line_number, line.joined_line)?;
            if args.comments {
                for (offset, comment) in line.comments.iter().enumerate() {
                    if !comment.is_empty() {
                        writeln!(output, "{name}:{}:   {comment}", line.line_number + offset)?;
                    }
                }
            }
        }
    }

    // Tabs are expanded on read, so compare against the expanded input
    let expected = contents.replace('\t', &" ".repeat(config.tab_width));
    if reconstructed != expected {
        let common = reconstructed
            .bytes()
            .zip(expected.bytes())
            .take_while(|(a, b)| a == b)
            .count();
        let line_nr = expected.as_bytes()[..common]
            .iter()
            .filter(|&&b| b == b'\n')
            .count()
            + 1;
        let err = LexError::internal("lexed lines do not reproduce the input", name, line_nr);
        if args.check || config.strict {
            return Err(err.into());
        }
        eprintln!("Warning: {err}");
    }

    Ok(LexReport {
        output,
        logical_lines,
        physical_lines: stream.line_number(),
    })
}

/// Lex stdin, dump to stdout
fn process_stdin(config: &Config, args: &CliArgs) -> Result<()> {
    let mut contents = String::new();
    io::stdin().read_to_string(&mut contents)?;

    #[allow(clippy::cast_possible_truncation)]
    let stdin_size = contents.len() as u64;
    if stdin_size > DEFAULT_MAX_FILE_SIZE {
        anyhow::bail!(
            "stdin input too large ({} MB exceeds limit of {} MB)",
            stdin_size / (1024 * 1024),
            DEFAULT_MAX_FILE_SIZE / (1024 * 1024)
        );
    }

    let report = lex_source(&contents, "<stdin>", config, args)?;
    let mut stdout = io::stdout().lock();
    stdout.write_all(report.output.as_bytes())?;
    stdout.flush()?;

    if !args.silent {
        eprintln!(
            "Lexed stdin successfully ({} physical, {} logical lines).",
            report.physical_lines, report.logical_lines
        );
    }

    Ok(())
}

fn print_usage() {
    println!(
        "fprettier-lex v{} - Fortran logical line lexer",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("Usage:");
    println!("  fprettier-lex [OPTIONS] <FILE>...");
    println!("  fprettier-lex [OPTIONS] -r <DIRECTORY>");
    println!("  fprettier-lex [OPTIONS] -              # Read from stdin");
    println!();
    println!("Examples:");
    println!("  fprettier-lex file.f90                 # Print logical lines");
    println!("  fprettier-lex --comments file.f90      # Include comments");
    println!("  fprettier-lex --check -r src/          # Verify lossless splitting");
    println!("  cat file.f90 | fprettier-lex           # Pipe input");
    println!();
    println!("Run with --help for all options.");
}
