//! Build-time options for decoders and encoders, and the DBC sources they read.

use std::path::PathBuf;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Flags consumed while building a decoder or an encoder.
///
/// Deserialises from partial documents; missing fields take their defaults.
///
/// ```rust
/// # use dbc_codec::BuildOptions;
/// let opts = BuildOptions::default()
///     .with_consolidate_schema(true)
///     .with_selected_attributes(["EngineSpeed"]);
/// assert!(opts.apply_formula);
/// assert!(opts.selected_attributes.contains("EngineSpeed"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Flatten every channel into one id-keyed table (first channel wins).
    pub consolidate_schema: bool,
    /// Name signals `<message>.<signal>`.
    pub use_qualified_name: bool,
    /// When `false`, factor and offset are forced to 1 and 0.
    pub apply_formula: bool,
    /// Drop a message id from every channel after the first that declares it.
    pub deduplicate_message: bool,
    /// Emit the raw nanosecond `OFFSET` column after `TIME`.
    pub output_offset: bool,
    /// Signals kept after the build; empty keeps everything.
    pub selected_attributes: IndexSet<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            consolidate_schema: false,
            use_qualified_name: false,
            apply_formula: true,
            deduplicate_message: false,
            output_offset: false,
            selected_attributes: IndexSet::new(),
        }
    }
}

impl BuildOptions {
    pub fn with_consolidate_schema(mut self, value: bool) -> Self {
        self.consolidate_schema = value;
        self
    }

    pub fn with_use_qualified_name(mut self, value: bool) -> Self {
        self.use_qualified_name = value;
        self
    }

    pub fn with_apply_formula(mut self, value: bool) -> Self {
        self.apply_formula = value;
        self
    }

    pub fn with_deduplicate_message(mut self, value: bool) -> Self {
        self.deduplicate_message = value;
        self
    }

    pub fn with_output_offset(mut self, value: bool) -> Self {
        self.output_offset = value;
        self
    }

    pub fn with_selected_attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_attributes = names.into_iter().map(Into::into).collect();
        self
    }
}

/// One DBC input. Each source becomes one channel, numbered from 1 by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DbcSource {
    Path(PathBuf),
    Contents(String),
}

impl DbcSource {
    /// Splits a comma-separated path list. Blank entries are kept so later
    /// entries keep their channel number.
    pub fn from_path_list(paths: &str) -> Vec<DbcSource> {
        if paths.trim().is_empty() {
            return Vec::new();
        }
        paths
            .split(',')
            .map(|p| DbcSource::Path(PathBuf::from(p.trim())))
            .collect()
    }

    pub fn from_contents<I, S>(contents: I) -> Vec<DbcSource>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        contents
            .into_iter()
            .map(|c| DbcSource::Contents(c.into()))
            .collect()
    }

    /// `true` for an empty path or whitespace-only contents.
    pub fn is_blank(&self) -> bool {
        match self {
            DbcSource::Path(p) => p.as_os_str().is_empty(),
            DbcSource::Contents(c) => c.trim().is_empty(),
        }
    }
}
