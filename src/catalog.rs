//! # Tool Invocation Catalog
//!
//! The closed set of codecs the harness can drive, and for each one the recipe
//! that turns (input, output, options) into an external command plus the
//! filesystem side steps the tool needs around it.
//!
//! Every tool quirk lives here: local copies under fixed ASCII-only names for
//! tools that choke on non-ASCII paths, forced output extensions that need a
//! rename afterwards, and stale-file removal for tools that refuse to
//! overwrite. Adding a codec means adding a `ToolKind` variant and one entry
//! in `RECIPES`; the runner never changes.

use crate::error::{BenchError, BenchResult};
use serde::{Deserialize, Serialize};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Launcher for the Windows-only encoders.
pub const WINE_PROGRAM: &str = "wine64";

/// Scratch copy of the input for the MPEG-4 ALS reference encoder.
pub const MP4ALS_INPUT_COPY: &str = "mp4alstmp.wav";

/// Scratch copy of the input for the TAK encoder.
pub const TAK_INPUT_COPY: &str = "taktmp.wav";

/// Supported codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ToolKind {
    Flac,
    WavPack,
    Tta,
    MonkeysAudio,
    OptimFrog,
    Mp4Als,
    Tak,
    Sla,
    Naru,
}

impl ToolKind {
    /// All tools, in catalog order.
    pub const ALL: [ToolKind; 9] = [
        ToolKind::Flac,
        ToolKind::WavPack,
        ToolKind::Tta,
        ToolKind::MonkeysAudio,
        ToolKind::OptimFrog,
        ToolKind::Mp4Als,
        ToolKind::Tak,
        ToolKind::Sla,
        ToolKind::Naru,
    ];

    /// Name used in report headers and accepted on the command line.
    pub fn display_name(&self) -> &'static str {
        match self {
            ToolKind::Flac => "flac",
            ToolKind::WavPack => "wavpack",
            ToolKind::Tta => "tta",
            ToolKind::MonkeysAudio => "monkey's audio",
            ToolKind::OptimFrog => "optimfrog",
            ToolKind::Mp4Als => "mp4als",
            ToolKind::Tak => "tak",
            ToolKind::Sla => "sla",
            ToolKind::Naru => "naru",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            ToolKind::MonkeysAudio => &["monkeys-audio", "mac", "ape"],
            ToolKind::OptimFrog => &["ofr"],
            ToolKind::WavPack => &["wv"],
            _ => &[],
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ToolKind {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ToolKind::ALL
            .iter()
            .copied()
            .find(|tool| tool.display_name() == wanted || tool.aliases().contains(&wanted.as_str()))
            .ok_or_else(|| BenchError::UnsupportedTool(s.to_string()))
    }
}

impl TryFrom<String> for ToolKind {
    type Error = BenchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ToolKind> for String {
    fn from(tool: ToolKind) -> Self {
        tool.display_name().to_string()
    }
}

/// A tool together with the option string it is benchmarked with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    pub tool: ToolKind,
    #[serde(default)]
    pub options: String,
}

impl ToolConfig {
    pub fn new(tool: ToolKind, options: impl Into<String>) -> Self {
        Self {
            tool,
            options: options.into().trim().to_string(),
        }
    }

    /// Report column label: display name and options, space joined.
    pub fn label(&self) -> String {
        if self.options.is_empty() {
            self.tool.display_name().to_string()
        } else {
            format!("{} {}", self.tool.display_name(), self.options)
        }
    }

    /// The option string split into separate arguments.
    pub fn option_args(&self) -> Vec<String> {
        self.options.split_whitespace().map(str::to_string).collect()
    }
}

impl FromStr for ToolConfig {
    type Err = BenchError;

    /// Parses `id` or `id:options`, e.g. `flac:-8` or `wavpack:-hh -x3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, options) = match s.split_once(':') {
            Some((id, options)) => (id, options),
            None => (s, ""),
        };
        Ok(ToolConfig::new(id.parse()?, options))
    }
}

/// Locations recipes resolve paths against.
#[derive(Debug, Clone)]
pub struct ToolEnv {
    /// Directory holding locally built tools and the Windows executables.
    pub tool_dir: PathBuf,
    /// Directory for recipe-owned copies of the input.
    pub scratch_dir: PathBuf,
}

/// A filesystem step performed before or after the external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsStep {
    /// Remove a file if present.
    Remove(PathBuf),
    Copy { from: PathBuf, to: PathBuf },
    Rename { from: PathBuf, to: PathBuf },
}

impl FsStep {
    pub fn apply(&self) -> std::io::Result<()> {
        match self {
            FsStep::Remove(path) => match std::fs::remove_file(path) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            },
            FsStep::Copy { from, to } => std::fs::copy(from, to).map(|_| ()),
            FsStep::Rename { from, to } => std::fs::rename(from, to),
        }
    }
}

/// Program and argument vector of an external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl CommandLine {
    fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.contains(' ') {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// One fully resolved external invocation with its side steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub prepare: Vec<FsStep>,
    pub command: CommandLine,
    /// Applied only when the command succeeded.
    pub finish: Vec<FsStep>,
    /// Recipe-created files to remove once the invocation is over.
    pub scratch: Vec<PathBuf>,
}

impl Invocation {
    fn plain(command: CommandLine) -> Self {
        Self {
            prepare: Vec::new(),
            command,
            finish: Vec::new(),
            scratch: Vec::new(),
        }
    }
}

type EncodeTemplate = fn(&ToolEnv, &Path, &Path, &[String]) -> Invocation;
type DecodeTemplate = fn(&ToolEnv, &Path, &Path) -> Invocation;

/// Encode and decode templates for one tool.
#[derive(Clone, Copy)]
pub struct InvocationRecipe {
    pub tool: ToolKind,
    encode: EncodeTemplate,
    decode: DecodeTemplate,
}

impl fmt::Debug for InvocationRecipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationRecipe")
            .field("tool", &self.tool)
            .finish_non_exhaustive()
    }
}

impl InvocationRecipe {
    pub fn encode(&self, env: &ToolEnv, input: &Path, output: &Path, options: &[String]) -> Invocation {
        (self.encode)(env, input, output, options)
    }

    pub fn decode(&self, env: &ToolEnv, input: &Path, output: &Path) -> Invocation {
        (self.decode)(env, input, output)
    }
}

/// Recipe table, indexed by `ToolKind` discriminant.
static RECIPES: [InvocationRecipe; 9] = [
    InvocationRecipe {
        tool: ToolKind::Flac,
        encode: flac_encode,
        decode: flac_decode,
    },
    InvocationRecipe {
        tool: ToolKind::WavPack,
        encode: wavpack_encode,
        decode: wavpack_decode,
    },
    InvocationRecipe {
        tool: ToolKind::Tta,
        encode: tta_encode,
        decode: tta_decode,
    },
    InvocationRecipe {
        tool: ToolKind::MonkeysAudio,
        encode: mac_encode,
        decode: mac_decode,
    },
    InvocationRecipe {
        tool: ToolKind::OptimFrog,
        encode: ofr_encode,
        decode: ofr_decode,
    },
    InvocationRecipe {
        tool: ToolKind::Mp4Als,
        encode: mp4als_encode,
        decode: mp4als_decode,
    },
    InvocationRecipe {
        tool: ToolKind::Tak,
        encode: tak_encode,
        decode: tak_decode,
    },
    InvocationRecipe {
        tool: ToolKind::Sla,
        encode: sla_encode,
        decode: sla_decode,
    },
    InvocationRecipe {
        tool: ToolKind::Naru,
        encode: naru_encode,
        decode: naru_decode,
    },
];

/// Look up the recipe for a tool.
pub fn recipe_for(tool: ToolKind) -> &'static InvocationRecipe {
    &RECIPES[tool as usize]
}

/// Look up the recipe for a tool identifier, failing on unknown ids.
pub fn recipe_for_id(id: &str) -> BenchResult<&'static InvocationRecipe> {
    Ok(recipe_for(id.parse()?))
}

fn flac_encode(_: &ToolEnv, input: &Path, output: &Path, options: &[String]) -> Invocation {
    Invocation::plain(
        CommandLine::new("flac")
            .args(options)
            .args(["-f", "-s", "-o"])
            .arg(output)
            .arg(input),
    )
}

fn flac_decode(_: &ToolEnv, input: &Path, output: &Path) -> Invocation {
    Invocation::plain(
        CommandLine::new("flac")
            .args(["-d", "-f", "-s", "-o"])
            .arg(output)
            .arg(input),
    )
}

fn wavpack_encode(_: &ToolEnv, input: &Path, output: &Path, options: &[String]) -> Invocation {
    Invocation::plain(
        CommandLine::new("wavpack")
            .args(options)
            .args(["-q", "-y"])
            .arg(input)
            .arg("-o")
            .arg(output),
    )
}

fn wavpack_decode(_: &ToolEnv, input: &Path, output: &Path) -> Invocation {
    Invocation::plain(
        CommandLine::new("wvunpack")
            .arg(input)
            .args(["-q", "-y", "-o"])
            .arg(output),
    )
}

fn tta_encode(_: &ToolEnv, input: &Path, output: &Path, options: &[String]) -> Invocation {
    Invocation::plain(
        CommandLine::new("tta")
            .arg("-e")
            .args(options)
            .arg(input)
            .arg(output),
    )
}

fn tta_decode(_: &ToolEnv, input: &Path, output: &Path) -> Invocation {
    Invocation::plain(CommandLine::new("tta").arg("-d").arg(input).arg(output))
}

fn mac_encode(_: &ToolEnv, input: &Path, output: &Path, options: &[String]) -> Invocation {
    Invocation::plain(CommandLine::new("mac").arg(input).arg(output).args(options))
}

// mac refuses to decode anything not named *.ape.
fn mac_decode(_: &ToolEnv, input: &Path, output: &Path) -> Invocation {
    let ape_input = input.with_extension("ape");
    Invocation {
        prepare: vec![FsStep::Rename {
            from: input.to_path_buf(),
            to: ape_input.clone(),
        }],
        command: CommandLine::new("mac").arg(&ape_input).arg(output).arg("-d"),
        finish: Vec::new(),
        scratch: vec![ape_input],
    }
}

// ofr forces a .ofr extension on whatever --output names.
fn ofr_encode(_: &ToolEnv, input: &Path, output: &Path, options: &[String]) -> Invocation {
    let ofr_output = output.with_extension("ofr");
    Invocation {
        prepare: vec![FsStep::Remove(ofr_output.clone())],
        command: CommandLine::new("ofr")
            .arg("--encode")
            .args(options)
            .arg(input)
            .arg("--output")
            .arg(&ofr_output),
        finish: vec![FsStep::Rename {
            from: ofr_output.clone(),
            to: output.to_path_buf(),
        }],
        scratch: vec![ofr_output],
    }
}

fn ofr_decode(_: &ToolEnv, input: &Path, output: &Path) -> Invocation {
    Invocation::plain(
        CommandLine::new("ofr")
            .arg("--decode")
            .arg(input)
            .arg("--output")
            .arg(output),
    )
}

// The reference encoder cannot open paths containing non-ASCII characters.
fn mp4als_encode(env: &ToolEnv, input: &Path, output: &Path, options: &[String]) -> Invocation {
    let local_input = env.scratch_dir.join(MP4ALS_INPUT_COPY);
    Invocation {
        prepare: vec![
            FsStep::Remove(local_input.clone()),
            FsStep::Copy {
                from: input.to_path_buf(),
                to: local_input.clone(),
            },
        ],
        command: CommandLine::new(WINE_PROGRAM)
            .arg(env.tool_dir.join("mp4alsRM23.exe"))
            .args(options)
            .arg(&local_input)
            .arg(output),
        finish: Vec::new(),
        scratch: vec![local_input],
    }
}

fn mp4als_decode(env: &ToolEnv, input: &Path, output: &Path) -> Invocation {
    Invocation::plain(
        CommandLine::new(WINE_PROGRAM)
            .arg(env.tool_dir.join("mp4alsRM23.exe"))
            .arg("-x")
            .arg(input)
            .arg(output),
    )
}

// Takc needs an ASCII input path, a .tak output name, and fails if the output
// already exists.
fn tak_encode(env: &ToolEnv, input: &Path, output: &Path, options: &[String]) -> Invocation {
    let local_input = env.scratch_dir.join(TAK_INPUT_COPY);
    let tak_output = output.with_extension("tak");
    Invocation {
        prepare: vec![
            FsStep::Remove(local_input.clone()),
            FsStep::Remove(tak_output.clone()),
            FsStep::Copy {
                from: input.to_path_buf(),
                to: local_input.clone(),
            },
        ],
        command: CommandLine::new(WINE_PROGRAM)
            .arg(env.tool_dir.join("Takc.exe"))
            .arg("-e")
            .args(options)
            .arg(&local_input)
            .arg(&tak_output),
        finish: vec![FsStep::Rename {
            from: tak_output.clone(),
            to: output.to_path_buf(),
        }],
        scratch: vec![local_input, tak_output],
    }
}

fn tak_decode(env: &ToolEnv, input: &Path, output: &Path) -> Invocation {
    let tak_input = input.with_extension("tak");
    Invocation {
        prepare: vec![FsStep::Rename {
            from: input.to_path_buf(),
            to: tak_input.clone(),
        }],
        command: CommandLine::new(WINE_PROGRAM)
            .arg(env.tool_dir.join("Takc.exe"))
            .arg("-d")
            .arg(&tak_input)
            .arg(output),
        finish: Vec::new(),
        scratch: vec![tak_input],
    }
}

fn sla_encode(env: &ToolEnv, input: &Path, output: &Path, options: &[String]) -> Invocation {
    Invocation::plain(
        CommandLine::new(env.tool_dir.join("sla"))
            .arg("-es")
            .args(options)
            .arg(input)
            .arg(output),
    )
}

fn sla_decode(env: &ToolEnv, input: &Path, output: &Path) -> Invocation {
    Invocation::plain(
        CommandLine::new(env.tool_dir.join("sla"))
            .arg("-ds")
            .arg(input)
            .arg(output),
    )
}

fn naru_encode(env: &ToolEnv, input: &Path, output: &Path, options: &[String]) -> Invocation {
    Invocation::plain(
        CommandLine::new(env.tool_dir.join("naru"))
            .arg("-e")
            .args(options)
            .arg(input)
            .arg(output),
    )
}

fn naru_decode(env: &ToolEnv, input: &Path, output: &Path) -> Invocation {
    Invocation::plain(
        CommandLine::new(env.tool_dir.join("naru"))
            .arg("-d")
            .arg(input)
            .arg(output),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> ToolEnv {
        ToolEnv {
            tool_dir: PathBuf::from("/opt/codecs"),
            scratch_dir: PathBuf::from("/tmp/scratch"),
        }
    }

    fn args(cmd: &CommandLine) -> Vec<String> {
        cmd.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_recipe_table_matches_tool_order() {
        for tool in ToolKind::ALL {
            assert_eq!(recipe_for(tool).tool, tool);
        }
    }

    #[test]
    fn test_tool_id_parsing() {
        assert_eq!("flac".parse::<ToolKind>().unwrap(), ToolKind::Flac);
        assert_eq!("FLAC".parse::<ToolKind>().unwrap(), ToolKind::Flac);
        assert_eq!(
            "monkey's audio".parse::<ToolKind>().unwrap(),
            ToolKind::MonkeysAudio
        );
        assert_eq!("mac".parse::<ToolKind>().unwrap(), ToolKind::MonkeysAudio);
        assert_eq!("ofr".parse::<ToolKind>().unwrap(), ToolKind::OptimFrog);

        let err = "unknown-codec".parse::<ToolKind>().unwrap_err();
        assert!(matches!(err, BenchError::UnsupportedTool(ref id) if id == "unknown-codec"));
        assert!(recipe_for_id("unknown-codec").is_err());
    }

    #[test]
    fn test_tool_config_parsing_and_label() {
        let config: ToolConfig = "flac:-8".parse().unwrap();
        assert_eq!(config, ToolConfig::new(ToolKind::Flac, "-8"));
        assert_eq!(config.label(), "flac -8");

        let config: ToolConfig = "tta".parse().unwrap();
        assert_eq!(config.label(), "tta");
        assert!(config.option_args().is_empty());

        let config: ToolConfig = "optimfrog:--preset max".parse().unwrap();
        assert_eq!(config.label(), "optimfrog --preset max");
        assert_eq!(config.option_args(), vec!["--preset", "max"]);

        assert!("nope:-1".parse::<ToolConfig>().is_err());
    }

    #[test]
    fn test_tool_config_from_json() {
        let configs: Vec<ToolConfig> = serde_json::from_str(
            r#"[{"tool": "flac", "options": "-8"}, {"tool": "monkey's audio"}]"#,
        )
        .unwrap();
        assert_eq!(configs[0].label(), "flac -8");
        assert_eq!(configs[1], ToolConfig::new(ToolKind::MonkeysAudio, ""));

        let bad: Result<Vec<ToolConfig>, _> = serde_json::from_str(r#"[{"tool": "zip"}]"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_flac_command_lines() {
        let recipe = recipe_for(ToolKind::Flac);
        let opts = vec!["-8".to_string()];
        let enc = recipe.encode(&env(), Path::new("in.wav"), Path::new("c.tmp"), &opts);
        assert_eq!(enc.command.program, OsString::from("flac"));
        assert_eq!(args(&enc.command), ["-8", "-f", "-s", "-o", "c.tmp", "in.wav"]);
        assert!(enc.prepare.is_empty() && enc.finish.is_empty());

        let dec = recipe.decode(&env(), Path::new("c.tmp"), Path::new("d.tmp"));
        assert_eq!(args(&dec.command), ["-d", "-f", "-s", "-o", "d.tmp", "c.tmp"]);
    }

    #[test]
    fn test_wavpack_decoder_is_separate_binary() {
        let dec = recipe_for(ToolKind::WavPack).decode(&env(), Path::new("c.tmp"), Path::new("d.tmp"));
        assert_eq!(dec.command.program, OsString::from("wvunpack"));
        assert_eq!(args(&dec.command), ["c.tmp", "-q", "-y", "-o", "d.tmp"]);
    }

    #[test]
    fn test_monkeys_audio_decode_renames_to_ape() {
        let dec = recipe_for(ToolKind::MonkeysAudio).decode(
            &env(),
            Path::new("/s/compressed.tmp"),
            Path::new("/s/d.tmp"),
        );
        assert_eq!(
            dec.prepare,
            vec![FsStep::Rename {
                from: PathBuf::from("/s/compressed.tmp"),
                to: PathBuf::from("/s/compressed.ape"),
            }]
        );
        assert_eq!(args(&dec.command), ["/s/compressed.ape", "/s/d.tmp", "-d"]);
        assert_eq!(dec.scratch, vec![PathBuf::from("/s/compressed.ape")]);
    }

    #[test]
    fn test_ofr_encode_forces_extension_then_renames() {
        let opts = vec!["--preset".to_string(), "max".to_string()];
        let enc = recipe_for(ToolKind::OptimFrog).encode(
            &env(),
            Path::new("/data/a.wav"),
            Path::new("/s/compressed.tmp"),
            &opts,
        );
        assert_eq!(
            enc.prepare,
            vec![FsStep::Remove(PathBuf::from("/s/compressed.ofr"))]
        );
        assert_eq!(enc.command.program, OsString::from("ofr"));
        assert_eq!(
            args(&enc.command),
            [
                "--encode",
                "--preset",
                "max",
                "/data/a.wav",
                "--output",
                "/s/compressed.ofr"
            ]
        );
        assert_eq!(
            enc.finish,
            vec![FsStep::Rename {
                from: PathBuf::from("/s/compressed.ofr"),
                to: PathBuf::from("/s/compressed.tmp"),
            }]
        );
        assert_eq!(enc.scratch, vec![PathBuf::from("/s/compressed.ofr")]);
    }

    #[test]
    fn test_tak_encode_copies_input_and_renames_output() {
        let opts = vec!["-p4m".to_string()];
        let enc = recipe_for(ToolKind::Tak).encode(
            &env(),
            Path::new("/data/日本語.wav"),
            Path::new("/s/compressed.tmp"),
            &opts,
        );
        assert_eq!(
            enc.prepare,
            vec![
                FsStep::Remove(PathBuf::from("/tmp/scratch/taktmp.wav")),
                FsStep::Remove(PathBuf::from("/s/compressed.tak")),
                FsStep::Copy {
                    from: PathBuf::from("/data/日本語.wav"),
                    to: PathBuf::from("/tmp/scratch/taktmp.wav"),
                },
            ]
        );
        assert_eq!(enc.command.program, OsString::from(WINE_PROGRAM));
        assert_eq!(
            args(&enc.command),
            [
                "/opt/codecs/Takc.exe",
                "-e",
                "-p4m",
                "/tmp/scratch/taktmp.wav",
                "/s/compressed.tak"
            ]
        );
        assert_eq!(
            enc.finish,
            vec![FsStep::Rename {
                from: PathBuf::from("/s/compressed.tak"),
                to: PathBuf::from("/s/compressed.tmp"),
            }]
        );
        assert!(enc.scratch.contains(&PathBuf::from("/tmp/scratch/taktmp.wav")));
    }

    #[test]
    fn test_mp4als_uses_ascii_copy() {
        let enc = recipe_for(ToolKind::Mp4Als).encode(
            &env(),
            Path::new("/data/ü.wav"),
            Path::new("c.tmp"),
            &[],
        );
        assert_eq!(
            args(&enc.command),
            ["/opt/codecs/mp4alsRM23.exe", "/tmp/scratch/mp4alstmp.wav", "c.tmp"]
        );
        assert_eq!(enc.scratch, vec![PathBuf::from("/tmp/scratch/mp4alstmp.wav")]);
    }

    #[test]
    fn test_local_tools_resolve_against_tool_dir() {
        let opts = vec!["-m".to_string(), "4".to_string()];
        let enc = recipe_for(ToolKind::Naru).encode(&env(), Path::new("a.wav"), Path::new("c.tmp"), &opts);
        assert_eq!(enc.command.program, OsString::from("/opt/codecs/naru"));
        assert_eq!(args(&enc.command), ["-e", "-m", "4", "a.wav", "c.tmp"]);
        assert_eq!(enc.command.to_string(), "/opt/codecs/naru -e -m 4 a.wav c.tmp");
    }

    #[test]
    fn test_fs_steps() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        let c = dir.path().join("c");
        std::fs::write(&a, b"abc").unwrap();

        FsStep::Copy { from: a.clone(), to: b.clone() }.apply().unwrap();
        FsStep::Rename { from: b.clone(), to: c.clone() }.apply().unwrap();
        assert!(!b.exists());
        assert_eq!(std::fs::read(&c).unwrap(), b"abc");

        FsStep::Remove(c.clone()).apply().unwrap();
        FsStep::Remove(c.clone()).apply().unwrap();
        assert!(!c.exists());
    }
}
