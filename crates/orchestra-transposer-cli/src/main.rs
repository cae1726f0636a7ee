// crates/orchestra-transposer-cli/src/main.rs

//! Thin command-line shell around the orchestra-transposer library.
//!
//! Selects a translator from the source/target format flags, wires up file
//! streams and the log file, and prints the conversion's error count.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use orchestra_transposer::{
    Orchestra2Sbe, Orchestra2Unified, OrchestraUpdater, Sbe2Orchestra, Unified2Orchestra,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Orchestra 1.0
    #[value(name = "orch")]
    Orch,
    /// Orchestra 1.1 (output only, upgrade from Orchestra 1.0)
    #[value(name = "orch11")]
    Orch11,
    /// Unified Repository (main file plus phrases file)
    #[value(name = "unif")]
    Unif,
    /// SBE 1.0
    #[value(name = "sbe")]
    Sbe,
    /// SBE 2.0 (input only)
    #[value(name = "sbe2")]
    Sbe2,
}

impl Format {
    fn tag(self) -> &'static str {
        match self {
            Format::Orch => "orch",
            Format::Orch11 => "orch11",
            Format::Unif => "unif",
            Format::Sbe => "sbe",
            Format::Sbe2 => "sbe2",
        }
    }
}

/// Convert an Orchestra version 1.0 XML file to or from another schema.
///
/// Log messages are written to a file with the same path as the first output
/// file but with a `.log` extension.
#[derive(Debug, Parser)]
#[command(name = "orchestra-transposer", version)]
struct Cli {
    /// Name of input file(s); the unif format takes the main file and the
    /// phrases file
    #[arg(required = true, num_args = 1..=2)]
    input: Vec<PathBuf>,

    /// Name of output file(s)
    #[arg(short, long, required = true, num_args = 1..=2)]
    output: Vec<PathBuf>,

    /// Format of the source file
    #[arg(short = 'f', long = "from", value_enum, default_value = "orch")]
    from: Format,

    /// Format of the output file
    #[arg(short = 't', long = "to", value_enum, default_value = "orch")]
    to: Format,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let problems = validate_args(&cli);
    if !problems.is_empty() {
        for problem in &problems {
            eprintln!("ERROR: {problem}");
        }
        return ExitCode::from(2);
    }
    match run(&cli) {
        Ok(error_count) => {
            println!("{error_count} errors");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err:#}");
            eprintln!("ERROR: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Checks the format/file-count rules; returns one message per violation.
fn validate_args(cli: &Cli) -> Vec<String> {
    let mut problems = Vec::new();
    if cli.to == Format::Orch11 && cli.from != Format::Orch {
        problems
            .push("\"orch11\" output format can only be used with \"orch\" input format".into());
    }
    if cli.from == Format::Orch11 {
        problems.push("\"orch11\" only supported as upgrade from \"orch\" format".into());
    }
    if cli.to == Format::Sbe2 {
        problems.push("\"sbe2\" is only supported as an input format".into());
    }
    if cli.from == cli.to {
        problems.push(format!(
            "Input format \"{}\" same as output format; nothing to do.",
            cli.from.tag()
        ));
    }
    if cli.from != Format::Orch && cli.to != Format::Orch {
        problems.push(format!(
            "One of input format \"{}\" or output format \"{}\" must be \"orch\"",
            cli.from.tag(),
            cli.to.tag()
        ));
    }
    if cli.from == Format::Unif && cli.input.len() != 2 {
        problems.push("Two input files must be provided for \"unif\" format".into());
    }
    if cli.to == Format::Unif && cli.output.len() != 2 {
        problems.push("Two output files must be provided for \"unif\" format".into());
    }
    problems
}

fn run(cli: &Cli) -> Result<usize> {
    init_logging(&cli.output[0])?;
    let errors = match (cli.from, cli.to) {
        (Format::Orch, Format::Unif) => {
            let input = open_input(&cli.input[0])?;
            let main_out = create_output(&cli.output[0])?;
            let phrases_out = create_output(&cli.output[1])?;
            Orchestra2Unified::new().translate_xml(input, main_out, phrases_out)?
        }
        (Format::Orch, Format::Sbe) => {
            let input = open_input(&cli.input[0])?;
            let output = create_output(&cli.output[0])?;
            Orchestra2Sbe::new().translate_xml(input, output)?
        }
        (Format::Orch, Format::Orch11) => {
            let input = open_input(&cli.input[0])?;
            let output = create_output(&cli.output[0])?;
            OrchestraUpdater::new().update_xml(input, output)?
        }
        (Format::Unif, Format::Orch) => {
            let main_in = open_input(&cli.input[0])?;
            let phrases_in = open_input(&cli.input[1])?;
            let output = create_output(&cli.output[0])?;
            Unified2Orchestra::new().translate_xml(main_in, phrases_in, output)?
        }
        (Format::Sbe, Format::Orch) => {
            let input = open_input(&cli.input[0])?;
            let output = create_output(&cli.output[0])?;
            Sbe2Orchestra::new().translate_xml(input, output)?
        }
        (Format::Sbe2, Format::Orch) => {
            let input = open_input(&cli.input[0])?;
            let output = create_output(&cli.output[0])?;
            Sbe2Orchestra::from_sbe2().translate_xml(input, output)?
        }
        // Every other pair is rejected by validate_args.
        (from, to) => anyhow::bail!("unsupported conversion {} -> {}", from.tag(), to.tag()),
    };
    Ok(errors.len())
}

fn open_input(path: &Path) -> Result<BufReader<File>> {
    let file =
        File::open(path).with_context(|| format!("cannot open input file {}", path.display()))?;
    Ok(BufReader::new(file))
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path)
        .with_context(|| format!("cannot create output file {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Sends library log output to `<first-output-stem>.log`.
fn init_logging(first_output: &Path) -> Result<()> {
    let log_path = first_output.with_extension("log");
    let log_file = File::create(&log_path)
        .with_context(|| format!("cannot create log file {}", log_path.display()))?;
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .try_init()
        .context("logger already initialized")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Format, validate_args};
    use std::path::PathBuf;

    fn cli(from: Format, to: Format, inputs: usize, outputs: usize) -> Cli {
        Cli {
            input: (0..inputs).map(|i| PathBuf::from(format!("in{i}.xml"))).collect(),
            output: (0..outputs).map(|i| PathBuf::from(format!("out{i}.xml"))).collect(),
            from,
            to,
        }
    }

    #[test]
    fn test_accepts_supported_pairs() {
        assert!(validate_args(&cli(Format::Orch, Format::Sbe, 1, 1)).is_empty());
        assert!(validate_args(&cli(Format::Orch, Format::Orch11, 1, 1)).is_empty());
        assert!(validate_args(&cli(Format::Orch, Format::Unif, 1, 2)).is_empty());
        assert!(validate_args(&cli(Format::Unif, Format::Orch, 2, 1)).is_empty());
        assert!(validate_args(&cli(Format::Sbe, Format::Orch, 1, 1)).is_empty());
        assert!(validate_args(&cli(Format::Sbe2, Format::Orch, 1, 1)).is_empty());
    }

    #[test]
    fn test_rejects_same_formats() {
        let problems = validate_args(&cli(Format::Orch, Format::Orch, 1, 1));
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("nothing to do"));
    }

    #[test]
    fn test_rejects_conversions_not_anchored_on_orch() {
        let problems = validate_args(&cli(Format::Sbe, Format::Unif, 1, 2));
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("must be \"orch\""));
    }

    #[test]
    fn test_rejects_orch11_as_input() {
        let problems = validate_args(&cli(Format::Orch11, Format::Orch, 1, 1));
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("upgrade"));
    }

    #[test]
    fn test_rejects_orch11_output_from_non_orch() {
        let problems = validate_args(&cli(Format::Sbe, Format::Orch11, 1, 1));
        // Also violates the orch-anchoring rule; both are reported.
        assert_eq!(problems.len(), 2);
    }

    #[test]
    fn test_rejects_sbe2_output() {
        let problems = validate_args(&cli(Format::Orch, Format::Sbe2, 1, 1));
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("input format"));
    }

    #[test]
    fn test_requires_two_files_for_unif() {
        let problems = validate_args(&cli(Format::Unif, Format::Orch, 1, 1));
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("Two input files"));

        let problems = validate_args(&cli(Format::Orch, Format::Unif, 1, 1));
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("Two output files"));
    }
}
