use crate::catalog::ToolConfig;
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Lossless Codec Benchmark - measures compression ratio and encode/decode
/// speed of lossless audio codecs over a WAV corpus
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v debug, -vv trace)
    #[clap(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[clap(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Also write plain-text logs to this file
    #[clap(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Abort on the first bad input file or failed tool invocation
    #[clap(long, global = true, default_value_t = false)]
    pub strict: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every configured codec over the corpus and write the ratio reports
    Evaluate(EvaluateArgs),

    /// Write duration and RMS level of every input file
    Statistics(StatisticsArgs),
}

#[derive(clap::Args, Debug)]
pub struct EvaluateArgs {
    /// WAV files or directories searched recursively for *.wav
    #[clap(default_value = crate::defaults::INPUT_DIR, help_heading = "Input")]
    pub inputs: Vec<PathBuf>,

    /// Tool to benchmark as id[:options], e.g. "flac:-8" (repeatable)
    #[clap(short = 't', long = "tool", value_parser = parse_tool_config, help_heading = "Tools")]
    pub tools: Vec<ToolConfig>,

    /// JSON file with an array of {"tool": ..., "options": ...} entries
    #[clap(long, help_heading = "Tools")]
    pub tools_file: Option<PathBuf>,

    /// Directory holding locally built tools and Windows executables
    #[clap(long, default_value = crate::defaults::TOOL_DIR, help_heading = "Tools")]
    pub tool_dir: PathBuf,

    /// Kill a tool invocation that runs longer than this (e.g. "30s", "5m")
    #[clap(long, value_parser = parse_duration, help_heading = "Tools")]
    pub timeout: Option<Duration>,

    /// Decode back and require bit-identical PCM
    #[clap(long, default_value_t = false, help_heading = "Tools")]
    pub verify: bool,

    /// Directory reports are written to
    #[clap(short = 'o', long, default_value = crate::defaults::OUTPUT_DIR, help_heading = "Output")]
    pub output_dir: PathBuf,

    /// Directory for temporary artifacts (default: a fresh temp directory)
    #[clap(long, help_heading = "Output")]
    pub scratch_dir: Option<PathBuf>,

    /// Also write a JSON run summary
    #[clap(long, help_heading = "Output")]
    pub json: Option<PathBuf>,
}

impl EvaluateArgs {
    /// The configured tools in column order: `--tool` entries, then the tools
    /// file, or the default set when neither names any.
    pub fn tool_configs(&self) -> Result<Vec<ToolConfig>> {
        let mut tools = self.tools.clone();
        if let Some(ref path) = self.tools_file {
            tools.extend(load_tools_file(path)?);
        }
        if tools.is_empty() {
            tools = crate::defaults::tools();
        }
        Ok(tools)
    }
}

#[derive(clap::Args, Debug)]
pub struct StatisticsArgs {
    /// WAV files or directories searched recursively for *.wav
    #[clap(default_value = crate::defaults::INPUT_DIR)]
    pub inputs: Vec<PathBuf>,

    /// Report file
    #[clap(short = 'o', long, default_value = crate::defaults::STATISTICS_RESULT_FILE)]
    pub output: PathBuf,
}

/// Read a JSON array of tool configurations.
pub fn load_tools_file(path: &Path) -> Result<Vec<ToolConfig>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read tools file {:?}", path))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid tools file {:?}", path))
}

fn parse_tool_config(s: &str) -> Result<ToolConfig, String> {
    s.parse().map_err(|e: crate::BenchError| e.to_string())
}

/// Parse duration from string (e.g., "500ms", "10s", "5m", "1h")
fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Duration cannot be empty".to_string());
    }

    let (num_str, scale) = if let Some(stripped) = s.strip_suffix("ms") {
        (stripped, 0.001)
    } else if let Some(stripped) = s.strip_suffix('s') {
        (stripped, 1.0)
    } else if let Some(stripped) = s.strip_suffix('m') {
        (stripped, 60.0)
    } else if let Some(stripped) = s.strip_suffix('h') {
        (stripped, 3600.0)
    } else {
        (s, 1.0)
    };

    let num: f64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number in duration: {}", num_str))?;
    if !num.is_finite() || num <= 0.0 {
        return Err(format!("Duration must be positive: {}", s));
    }

    Duration::try_from_secs_f64(num * scale)
        .map_err(|e| format!("Invalid duration {}: {}", s, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ToolKind;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("10").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));

        assert!(parse_duration("").is_err());
        assert!(parse_duration("invalid").is_err());
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("1e30h").is_err());
    }

    #[test]
    fn test_evaluate_defaults() {
        let args = Args::parse_from(["lossless-bench", "evaluate"]);
        assert_eq!(args.verbose, 0);
        assert!(!args.strict);
        let Command::Evaluate(eval) = args.command else {
            panic!("expected evaluate");
        };
        assert_eq!(eval.inputs, vec![PathBuf::from("./data")]);
        assert_eq!(eval.output_dir, PathBuf::from("."));
        assert!(eval.timeout.is_none());

        let labels: Vec<String> = eval
            .tool_configs()
            .unwrap()
            .iter()
            .map(ToolConfig::label)
            .collect();
        assert_eq!(
            labels,
            vec!["flac -8", "wavpack -hh", "tta", "monkey's audio -c4000", "naru -m 4"]
        );
    }

    #[test]
    fn test_tools_and_global_flags() {
        let args = Args::parse_from([
            "lossless-bench",
            "evaluate",
            "corpus",
            "-t",
            "flac:-5",
            "--tool",
            "wavpack:-hh -x3",
            "-vv",
            "--strict",
            "--timeout",
            "30s",
        ]);
        assert_eq!(args.verbose, 2);
        assert!(args.strict);
        let Command::Evaluate(eval) = args.command else {
            panic!("expected evaluate");
        };
        assert_eq!(eval.inputs, vec![PathBuf::from("corpus")]);
        assert_eq!(
            eval.tools,
            vec![
                ToolConfig::new(ToolKind::Flac, "-5"),
                ToolConfig::new(ToolKind::WavPack, "-hh -x3"),
            ]
        );
        assert_eq!(eval.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_unknown_tool_is_rejected() {
        let result = Args::try_parse_from(["lossless-bench", "evaluate", "-t", "mp3:-V0"]);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unsupported tool name"), "{err}");
    }

    #[test]
    fn test_tools_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tools.json");
        std::fs::write(
            &path,
            r#"[{"tool": "tak", "options": "-p4m"}, {"tool": "naru"}]"#,
        )
        .unwrap();

        let args = Args::parse_from([
            "lossless-bench",
            "evaluate",
            "-t",
            "flac:-8",
            "--tools-file",
            path.to_str().unwrap(),
        ]);
        let Command::Evaluate(eval) = args.command else {
            panic!("expected evaluate");
        };
        assert_eq!(
            eval.tool_configs().unwrap(),
            vec![
                ToolConfig::new(ToolKind::Flac, "-8"),
                ToolConfig::new(ToolKind::Tak, "-p4m"),
                ToolConfig::new(ToolKind::Naru, ""),
            ]
        );

        std::fs::write(&path, r#"[{"tool": "mp3"}]"#).unwrap();
        assert!(load_tools_file(&path).is_err());
    }

    #[test]
    fn test_statistics_args() {
        let args = Args::parse_from(["lossless-bench", "-q", "statistics", "a.wav", "-o", "s.csv"]);
        assert!(args.quiet);
        let Command::Statistics(stats) = args.command else {
            panic!("expected statistics");
        };
        assert_eq!(stats.inputs, vec![PathBuf::from("a.wav")]);
        assert_eq!(stats.output, PathBuf::from("s.csv"));
    }
}
