//! Workflow triggers as CLI subcommands and interactive input lines.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::controller::{
    events::WorkflowKind,
    validation::{CaptureInput, GenerateInput},
};

/// The server rejects generation requests without a duration.
pub const DEFAULT_SAMPLE_HOURS: u32 = 24;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowCommand {
    /// Generate a synthetic traffic sample on the server.
    Generate {
        #[arg(long)]
        start_date: Option<String>,
        /// Hours of traffic to generate.
        #[arg(long, default_value_t = DEFAULT_SAMPLE_HOURS)]
        duration: u32,
        /// Download the generated sample when it is ready.
        #[arg(long)]
        save: bool,
    },
    /// Upload a traffic CSV for anomaly analysis.
    Analyze {
        file: Option<PathBuf>,
        /// Download charts and the anomaly report when the analysis is done.
        #[arg(long)]
        save: bool,
    },
    /// Capture live traffic on the server and analyze it.
    Capture {
        #[arg(long, default_value = "")]
        interface: String,
        /// Capture duration in seconds.
        #[arg(long)]
        duration: Option<u64>,
        /// BPF filter; blank means "tcp or udp".
        #[arg(long, default_value = "")]
        filter: String,
        #[arg(long)]
        max_packets: Option<u64>,
        #[arg(long)]
        tshark_path: Option<String>,
        #[arg(long)]
        save: bool,
    },
}

impl WorkflowCommand {
    pub fn workflow(&self) -> WorkflowKind {
        match self {
            WorkflowCommand::Generate { .. } => WorkflowKind::Generate,
            WorkflowCommand::Analyze { .. } => WorkflowKind::Upload,
            WorkflowCommand::Capture { .. } => WorkflowKind::Capture,
        }
    }

    pub fn wants_save(&self) -> bool {
        match self {
            WorkflowCommand::Generate { save, .. }
            | WorkflowCommand::Analyze { save, .. }
            | WorkflowCommand::Capture { save, .. } => *save,
        }
    }

    pub fn trigger(&self) -> Trigger {
        match self {
            WorkflowCommand::Generate {
                start_date,
                duration,
                ..
            } => Trigger::Generate(GenerateInput {
                start_date: start_date.clone(),
                duration: Some(*duration),
            }),
            WorkflowCommand::Analyze { file, .. } => Trigger::Upload(file.clone()),
            WorkflowCommand::Capture {
                interface,
                duration,
                filter,
                max_packets,
                tshark_path,
                ..
            } => Trigger::Capture(CaptureInput {
                interface: interface.clone(),
                duration: *duration,
                filter: filter.clone(),
                max_packets: *max_packets,
                tshark_path: tshark_path.clone(),
            }),
        }
    }
}

/// Controller input for one trigger; uploads still need their file read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Generate(GenerateInput),
    Upload(Option<PathBuf>),
    Capture(CaptureInput),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum LineCommand {
    #[command(flatten)]
    Workflow(WorkflowCommand),
    /// Download the generated sample or what the results panel shows.
    Save {
        #[arg(value_enum, default_value_t = SaveTarget::Results)]
        target: SaveTarget,
    },
    /// Redraw the interface.
    Show,
    /// Dismiss the generation status notice.
    Dismiss,
    Quit,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTarget {
    /// Charts and anomaly report of the displayed session.
    Results,
    /// The last generated sample.
    Sample,
}

impl SaveTarget {
    pub fn for_workflow(workflow: WorkflowKind) -> Self {
        match workflow {
            WorkflowKind::Generate => SaveTarget::Sample,
            WorkflowKind::Upload | WorkflowKind::Capture => SaveTarget::Results,
        }
    }
}

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ConsoleLine {
    #[command(subcommand)]
    command: LineCommand,
}

/// Parses one interactive line; `Ok(None)` for blank input.
pub fn parse_line(line: &str) -> Result<Option<LineCommand>, String> {
    let words = split_words(line)?;
    if words.is_empty() {
        return Ok(None);
    }
    ConsoleLine::try_parse_from(words)
        .map(|parsed| Some(parsed.command))
        .map_err(|err| err.render().to_string())
}

/// Whitespace split that keeps double-quoted runs together.
fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_word = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                has_word = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_word {
                    words.push(std::mem::take(&mut current));
                    has_word = false;
                }
            }
            c => {
                current.push(c);
                has_word = true;
            }
        }
    }
    if in_quotes {
        return Err("unterminated quote".to_string());
    }
    if has_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_quoted_filter_as_one_argument() {
        let command = parse_line(r#"capture --interface eth0 --filter "port 80" --duration 5"#)
            .expect("parse")
            .expect("command");
        let LineCommand::Workflow(workflow) = command else {
            panic!("expected workflow command");
        };
        let Trigger::Capture(input) = workflow.trigger() else {
            panic!("expected capture trigger");
        };
        assert_eq!(input.filter, "port 80");
        assert_eq!(input.duration, Some(5));
        assert_eq!(workflow.workflow(), WorkflowKind::Capture);
    }

    #[test]
    fn empty_quotes_produce_an_empty_argument() {
        assert_eq!(
            split_words(r#"capture --filter """#).expect("split"),
            vec!["capture", "--filter", ""]
        );
    }

    #[test]
    fn generate_without_start_date_still_parses() {
        let command = parse_line("generate --save").expect("parse").expect("command");
        assert_eq!(
            command,
            LineCommand::Workflow(WorkflowCommand::Generate {
                start_date: None,
                duration: DEFAULT_SAMPLE_HOURS,
                save: true,
            })
        );
    }

    #[test]
    fn blank_lines_and_bad_input() {
        assert_eq!(parse_line("   "), Ok(None));
        assert!(parse_line("capture --filter \"port 80").is_err());
        assert!(parse_line("reboot").is_err());
        assert_eq!(parse_line("quit"), Ok(Some(LineCommand::Quit)));
    }

    #[test]
    fn generate_always_sends_a_duration() {
        let command = parse_line("generate --start-date 2024-01-01")
            .expect("parse")
            .expect("command");
        let LineCommand::Workflow(workflow) = command else {
            panic!("expected workflow command");
        };
        let Trigger::Generate(input) = workflow.trigger() else {
            panic!("expected generate trigger");
        };
        assert_eq!(input.duration, Some(DEFAULT_SAMPLE_HOURS));

        let explicit = parse_line("generate --start-date 2024-01-01 --duration 6")
            .expect("parse")
            .expect("command");
        let LineCommand::Workflow(workflow) = explicit else {
            panic!("expected workflow command");
        };
        let Trigger::Generate(input) = workflow.trigger() else {
            panic!("expected generate trigger");
        };
        assert_eq!(input.duration, Some(6));
    }

    #[test]
    fn save_defaults_to_results_panel() {
        assert_eq!(
            parse_line("save"),
            Ok(Some(LineCommand::Save {
                target: SaveTarget::Results
            }))
        );
        assert_eq!(
            parse_line("save sample"),
            Ok(Some(LineCommand::Save {
                target: SaveTarget::Sample
            }))
        );
        assert!(parse_line("save everything").is_err());
        assert_eq!(
            SaveTarget::for_workflow(WorkflowKind::Generate),
            SaveTarget::Sample
        );
        assert_eq!(
            SaveTarget::for_workflow(WorkflowKind::Capture),
            SaveTarget::Results
        );
    }
}
