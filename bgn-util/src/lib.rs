use std::{collections::BTreeSet, ops::Deref, path::Path};

use env_logger::fmt::Color;
use log::Level;

use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};

pub enum Error {
    Any(Box<dyn std::error::Error + 'static>),
    Compare,
}

impl<E> From<E> for Error
where
    E: std::error::Error + 'static,
{
    fn from(e: E) -> Self {
        Error::Any(Box::new(e))
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Any(e) => write!(f, "{e:?}"),
            Error::Compare => write!(f, "Comparison failed"),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Run a test body with logging initialized, reporting the whole error chain on failure
pub fn run_test<F>(closure: F) -> Result<(), Error>
where
    F: FnOnce() -> Result<(), Error>,
{
    use tracing::error;

    init_log();

    let res = closure();

    res.map_err(|err| {
        error!("{err}");

        if let Error::Any(ref err) = err {
            for e in source_iter(err.deref()) {
                error!("  because: {e}")
            }
        }

        err
    })
}

/// Install the colored env_logger formatter. Filter defaults to "warn" and is overridden by RUST_LOG.
pub fn init_log() {
    init_log_with_filter("warn")
}

pub fn init_log_with_filter(default_filter: &str) {
    use std::io::Write;

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format(|buf, record| -> Result<(), std::io::Error> {
            let mut level_style = buf.style();
            match record.level() {
                Level::Trace => level_style.set_color(Color::Blue),
                Level::Debug => level_style.set_color(Color::White),
                Level::Info => level_style.set_color(Color::Cyan),
                Level::Warn => level_style.set_color(Color::Yellow),
                Level::Error => level_style.set_color(Color::Red),
            };

            writeln!(
                buf,
                "{} [{}:{}] {}",
                level_style.value(record.level()),
                record.file().unwrap_or(""),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .try_init();
}

/// Print a line diff of `left` against `right` and fail if they differ
pub fn compare(left: &str, right: &str) -> Result<(), Error> {
    use colored::*;
    let diff = TextDiff::from_lines(left, right);

    let mut same = true;
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Delete => {
                same = false;
                print!("{}", format!("-| {change}").color(Color::Red));
            }
            ChangeTag::Insert => {
                same = false;
                print!("{}", format!("+| {change}").color(Color::Green));
            }
            ChangeTag::Equal => {
                print!("{}", format!(" | {change}").color(Color::BrightBlack));
            }
        };
    }

    if same {
        Ok(())
    } else {
        println!();
        Err(Error::Compare)
    }
}

pub fn source_iter(
    error: &(impl std::error::Error + ?Sized),
) -> impl Iterator<Item = &(dyn std::error::Error + 'static)> {
    SourceIter {
        current: error.source(),
    }
}

pub struct SourceIter<'a> {
    current: Option<&'a (dyn std::error::Error + 'static)>,
}

impl<'a> Iterator for SourceIter<'a> {
    type Item = &'a (dyn std::error::Error + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current;
        self.current = self.current.and_then(std::error::Error::source);
        current
    }
}

#[derive(Debug)]
pub struct Trace(pub backtrace::Backtrace);

impl Trace {
    pub fn new() -> Trace {
        Trace(backtrace::Backtrace::new())
    }
}

impl Default for Trace {
    fn default() -> Self {
        Trace::new()
    }
}

impl std::fmt::Display for Trace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match std::env::var("RUST_BACKTRACE") {
            Ok(value) if value == "1" => {
                write!(f, "Backtrace:\n{:?}", self.0)
            }
            _ => Ok(()),
        }
    }
}

impl std::error::Error for Trace {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

/// The platform the generated bindings are compiled for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetPlatform {
    /// Natively compiled target. Unsigned native integers map to unsigned target types and forward declarations
    /// live in their own packages.
    #[default]
    Native,
    /// JVM target. There are no unsigned primitives, so unsigned native integers map to the signed types of the
    /// same width.
    Jvm,
}

impl std::fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetPlatform::Native => write!(f, "native"),
            TargetPlatform::Jvm => write!(f, "jvm"),
        }
    }
}

/// What the pipeline writes besides the native bridge file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// One target-language source unit per sub-module
    #[default]
    SourceCode,
    /// A single serialized metadata module aggregating every sub-module
    Metadata,
}

/// JSON struct holding the options for a single generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Target package. Derived from `library_name` when missing.
    pub package: Option<String>,
    /// Name of the native library being bound
    pub library_name: String,
    /// Functions that never produce a stub
    pub excluded_functions: BTreeSet<String>,
    /// Macros (constant or wrapped) that never produce a stub
    pub excluded_macros: BTreeSet<String>,
    /// Enums forced to be strict
    pub strict_enums: BTreeSet<String>,
    /// Enums forced to be non-strict
    pub non_strict_enums: BTreeSet<String>,
    /// Forward declarations recorded in the manifest as exported by this library
    pub export_forward_declarations: Vec<String>,
    pub platform: TargetPlatform,
    pub mode: GenerationMode,
    /// Name of an entry point trampoline forwarding to the runtime's main
    pub entry_point: Option<String>,
    /// Lines prepended to the bridge file after the index's own preamble
    pub extra_preamble: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            package: None,
            library_name: "interop".to_string(),
            excluded_functions: BTreeSet::new(),
            excluded_macros: BTreeSet::new(),
            strict_enums: BTreeSet::new(),
            non_strict_enums: BTreeSet::new(),
            export_forward_declarations: Vec::new(),
            platform: TargetPlatform::Native,
            mode: GenerationMode::SourceCode,
            entry_point: None,
            extra_preamble: Vec::new(),
        }
    }
}

pub fn read_generator_config(
    path: impl AsRef<Path>,
) -> Result<GeneratorConfig, Box<dyn std::error::Error + 'static + Send + Sync>> {
    let s = std::fs::read_to_string(path)?;
    let config = serde_json::from_str::<GeneratorConfig>(&s)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_fill_missing_fields() -> Result<(), Error> {
        let config: GeneratorConfig = serde_json::from_str(
            r#"{ "package": "org.sample", "platform": "jvm", "strict_enums": ["Color"] }"#,
        )?;

        assert_eq!(config.package.as_deref(), Some("org.sample"));
        assert_eq!(config.platform, TargetPlatform::Jvm);
        assert_eq!(config.mode, GenerationMode::SourceCode);
        assert!(config.strict_enums.contains("Color"));
        assert!(config.excluded_functions.is_empty());
        assert_eq!(config.library_name, "interop");

        Ok(())
    }

    #[test]
    fn config_is_read_from_file() -> Result<(), Error> {
        let path = std::env::temp_dir().join("bgn_util_read_config.json");
        std::fs::write(&path, r#"{ "entry_point": "app_main", "mode": "metadata" }"#)?;

        let read = read_generator_config(&path).map_err(|e| Error::Any(e))?;
        assert_eq!(read.entry_point.as_deref(), Some("app_main"));
        assert_eq!(read.mode, GenerationMode::Metadata);

        let bad = std::env::temp_dir().join("bgn_util_read_bad_config.json");
        std::fs::write(&bad, r#"{ "mode": "assembly" }"#)?;
        assert!(read_generator_config(&bad).is_err());

        Ok(())
    }

    #[test]
    fn compare_detects_difference() {
        assert!(compare("a\nb\n", "a\nb\n").is_ok());
        assert!(matches!(compare("a\nb\n", "a\nc\n"), Err(Error::Compare)));
    }
}
