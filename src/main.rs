use clap::Parser;
use imgpipe::cli::{
    exit_status, parse_failure, subcommand_usage, Cli, EXIT_FAILURE, EXIT_SUCCESS,
};
use imgpipe::utils::format_file_size;
use imgpipe::{ErrorRecord, Outcome, Pipeline, Reporter, Task};
use log::LevelFilter;
use std::ffi::OsString;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<OsString> = std::env::args_os().collect();
    let cli = match Cli::try_parse_from(&args) {
        Ok(cli) => cli,
        // help and version go to stdout and are not errors
        Err(e) if !e.use_stderr() => {
            let _ = e.print();
            return ExitCode::from(EXIT_SUCCESS);
        }
        Err(e) => {
            let (reporter, record) = parse_failure(&e, &args);
            reporter.report(&record);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    // Initialize logger
    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .init();

    let registry = cli.registry();
    let request = cli.command.into_request();
    let name = request.task.name();
    let mut reporter = Reporter::new(name);
    if let Some(usage) = subcommand_usage(name) {
        reporter = reporter.with_usage(usage);
    }

    let request = match request.validate() {
        Ok(request) => request,
        Err(e) => {
            reporter.report(&ErrorRecord::usage("validate", e));
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    let pipeline = Pipeline::from_request(&request, &registry);
    let result = pipeline.run(&request.input, &request.output);

    match &result {
        Ok(Outcome::Converted) => {
            let size = std::fs::metadata(&request.output)
                .map(|m| format_file_size(m.len()))
                .unwrap_or_else(|_| "unknown size".to_string());
            match request.task {
                Task::Preview(_) => println!("Preview written to: {}", request.output.display()),
                _ => println!("Output saved to: {} ({})", request.output.display(), size),
            }
        }
        Ok(Outcome::Skipped) => reporter.note("no conversion took place"),
        Err(record) => reporter.report(record),
    }

    ExitCode::from(exit_status(&request.task, &result))
}
