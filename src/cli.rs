// imgpipe/src/cli.rs
use crate::codecs::{CodecRegistry, PsLevel, DEFAULT_RESOLUTION};
use crate::core::config::Viewer;
use crate::core::{
    EnhanceParams, ErrorRecord, FormatTag, ImageToolError, Outcome, PipelineRequest,
    PostScriptParams, PreviewParams, RemapParams, Reporter, Task,
};
use crate::utils::{default_output_path, preview_path};
use clap::{CommandFactory, Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

pub const EXIT_SUCCESS: u8 = 0;
/// Failures, usage errors and "no conversion took place" all share this code.
pub const EXIT_FAILURE: u8 = 1;

#[derive(Parser, Debug)]
#[command(name = "imgpipe", version, about = "Read, transform and write images")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Treat a codec as absent from this build (repeatable)
    #[arg(long, global = true, value_name = "FORMAT")]
    pub disable: Vec<FormatTag>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert to another format unless the input already is that format
    Convert {
        input: PathBuf,
        output: Option<PathBuf>,

        /// Target format
        #[arg(long = "to", default_value = "png")]
        target: FormatTag,
    },

    /// Sharpen with an unsharp mask
    Enhance {
        input: PathBuf,
        /// Smoothing half-width: 1 gives a 3x3 window, 2 a 5x5 window
        radius: u32,
        /// Amount of high-pass signal added back, typically 0.2 - 0.7
        #[arg(allow_negative_numbers = true)]
        fraction: f32,
        output: PathBuf,
    },

    /// Export as a PostScript page
    Postscript {
        input: PathBuf,
        output: PathBuf,
        /// PostScript language level (1, 2 or 3); anything else means 2
        level: Option<u32>,

        /// Pixels per inch on the page
        #[arg(long, default_value_t = DEFAULT_RESOLUTION)]
        resolution: u32,
    },

    /// Apply a gamma transfer curve between min and max
    Gamma {
        input: PathBuf,
        #[arg(allow_negative_numbers = true)]
        gamma: f32,
        #[arg(allow_negative_numbers = true)]
        min: i32,
        #[arg(allow_negative_numbers = true)]
        max: i32,
        output: PathBuf,
    },

    /// Shrink to fit the screen and open in a viewer
    ///
    /// The preview is written to <temp dir>/<stem>_imgpipe_preview.png and
    /// replaced by the next preview of an image with the same name.
    Preview {
        input: PathBuf,

        #[arg(long, default_value_t = 1000)]
        max_width: u32,

        #[arg(long, default_value_t = 800)]
        max_height: u32,

        /// Viewer program; defaults to the platform opener
        #[arg(long, env = "IMGPIPE_VIEWER")]
        viewer: Option<String>,

        /// Write the preview file but do not open it
        #[arg(long)]
        no_display: bool,
    },
}

impl Cli {
    /// Registry of compiled codecs minus any disabled on the command line.
    pub fn registry(&self) -> CodecRegistry {
        self.disable
            .iter()
            .fold(CodecRegistry::new(), |registry, &format| {
                registry.with_disabled(format)
            })
    }
}

impl Commands {
    pub fn into_request(self) -> PipelineRequest {
        match self {
            Commands::Convert {
                input,
                output,
                target,
            } => {
                let output = output.unwrap_or_else(|| default_output_path(&input, target));
                PipelineRequest::new(input, output, Task::Convert { target })
            }
            Commands::Enhance {
                input,
                radius,
                fraction,
                output,
            } => PipelineRequest::new(input, output, Task::Enhance(EnhanceParams { radius, fraction })),
            Commands::Postscript {
                input,
                output,
                level,
                resolution,
            } => {
                let level = level.map(PsLevel::from_requested).unwrap_or_default();
                PipelineRequest::new(
                    input,
                    output,
                    Task::ExportPostScript(PostScriptParams { level, resolution }),
                )
            }
            Commands::Gamma {
                input,
                gamma,
                min,
                max,
                output,
            } => PipelineRequest::new(input, output, Task::Remap(RemapParams { gamma, min, max })),
            Commands::Preview {
                input,
                max_width,
                max_height,
                viewer,
                no_display,
            } => {
                let viewer = match (no_display, viewer) {
                    (true, _) => Viewer::Disabled,
                    (false, Some(program)) => Viewer::Command(program),
                    (false, None) => Viewer::System,
                };
                let output = preview_path(&input);
                PipelineRequest::new(
                    input,
                    output,
                    Task::Preview(PreviewParams {
                        max_width,
                        max_height,
                        viewer,
                    }),
                )
            }
        }
    }
}

/// Usage line clap renders for one subcommand, `None` for unknown names.
pub fn subcommand_usage(name: &str) -> Option<String> {
    let mut command = Cli::command();
    command.build();
    command
        .find_subcommand_mut(name)
        .map(|sub| sub.render_usage().to_string())
}

/// Reporter and usage record for a command line clap rejected.
pub fn parse_failure(error: &clap::Error, args: &[OsString]) -> (Reporter, ErrorRecord) {
    let rendered = error.render().to_string();
    let message = rendered
        .split("Usage:")
        .next()
        .unwrap_or_default()
        .trim()
        .trim_start_matches("error:")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let mut reporter = Reporter::new("imgpipe");
    let usage = args
        .iter()
        .skip(1)
        .find_map(|arg| arg.to_str().and_then(subcommand_usage));
    if let Some(usage) = usage {
        reporter = reporter.with_usage(usage);
    }

    let record = ErrorRecord::usage("parse", ImageToolError::InvalidParameter(message));
    (reporter, record)
}

/// Process exit status for a validated run.
///
/// PostScript export exits 0 once the export was attempted; its failures are
/// still reported on stderr.
pub fn exit_status(task: &Task, result: &Result<Outcome, ErrorRecord>) -> u8 {
    match (task, result) {
        (_, Ok(Outcome::Converted)) => EXIT_SUCCESS,
        (_, Ok(Outcome::Skipped)) => EXIT_FAILURE,
        (Task::ExportPostScript(_), Err(_)) => EXIT_SUCCESS,
        (_, Err(_)) => EXIT_FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ImageToolError, Stage};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn convert_defaults() {
        let cli = parse(&["imgpipe", "convert", "scan.jpg"]);
        let request = cli.command.into_request();
        assert_eq!(request.output, PathBuf::from("scan.png"));
        assert_eq!(
            request.task,
            Task::Convert {
                target: FormatTag::Png
            }
        );
    }

    #[test]
    fn enhance_needs_four_arguments() {
        assert!(Cli::try_parse_from(["imgpipe", "enhance", "in.jpg", "1", "0.5"]).is_err());
        assert!(Cli::try_parse_from(["imgpipe", "enhance", "in.jpg", "x", "0.5", "o.jpg"]).is_err());

        let cli = parse(&["imgpipe", "enhance", "in.jpg", "2", "0.3", "out.jpg"]);
        assert_eq!(
            cli.command.into_request().task,
            Task::Enhance(EnhanceParams {
                radius: 2,
                fraction: 0.3
            })
        );
    }

    #[test]
    fn postscript_level_is_corrected() {
        for (args, expected) in [
            (vec!["imgpipe", "postscript", "a.png", "a.ps"], PsLevel::Two),
            (vec!["imgpipe", "postscript", "a.png", "a.ps", "3"], PsLevel::Three),
            (vec!["imgpipe", "postscript", "a.png", "a.ps", "9"], PsLevel::Two),
        ] {
            match parse(&args).command.into_request().task {
                Task::ExportPostScript(params) => assert_eq!(params.level, expected),
                other => panic!("unexpected task {:?}", other),
            }
        }
    }

    #[test]
    fn gamma_accepts_negative_min() {
        let cli = parse(&["imgpipe", "gamma", "in.png", "0.7", "-20", "300", "out.png"]);
        assert_eq!(
            cli.command.into_request().task,
            Task::Remap(RemapParams {
                gamma: 0.7,
                min: -20,
                max: 300
            })
        );
    }

    #[test]
    fn disable_flag_builds_stubbed_registry() {
        use crate::codecs::{Capability, CodecOp};
        let cli = parse(&["imgpipe", "--disable", "gif", "preview", "x.gif", "--no-display"]);
        assert_eq!(
            cli.registry().capability(FormatTag::Gif, CodecOp::ReadStream),
            Capability::Unavailable
        );
    }

    #[test]
    fn usage_comes_from_clap() {
        let usage = subcommand_usage("gamma").unwrap();
        assert!(usage.starts_with("Usage:"));
        assert!(usage.contains("gamma"));
        assert!(usage.contains("<MIN>"));
        assert!(subcommand_usage("sharpen").is_none());
    }

    #[test]
    fn parse_failures_become_usage_records() {
        let args: Vec<OsString> = ["imgpipe", "gamma", "a.png"]
            .iter()
            .map(OsString::from)
            .collect();
        let error = Cli::try_parse_from(&args).unwrap_err();
        let (reporter, record) = parse_failure(&error, &args);

        assert_eq!(record.stage, Stage::Usage);
        assert_eq!(record.operation, "parse");
        let mut out = Vec::new();
        reporter.report_to(&mut out, &record).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Error in imgpipe::parse:"));
        assert!(text.contains("required"));
        assert!(text.contains("<MAX>"));
    }

    #[test]
    fn exit_codes_per_outcome() {
        let gamma = Task::Remap(RemapParams::default());
        assert_eq!(exit_status(&gamma, &Ok(Outcome::Converted)), EXIT_SUCCESS);
        assert_eq!(exit_status(&gamma, &Ok(Outcome::Skipped)), EXIT_FAILURE);
        let err = || {
            ErrorRecord::new(
                Stage::Read,
                "read",
                ImageToolError::InvalidParameter("x".into()),
            )
        };
        assert_eq!(exit_status(&gamma, &Err(err())), EXIT_FAILURE);

        let export = Task::ExportPostScript(PostScriptParams::default());
        assert_eq!(exit_status(&export, &Err(err())), EXIT_SUCCESS);
    }
}
