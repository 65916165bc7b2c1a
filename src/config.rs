//! Axis table configuration
//!
//! The table has a fixed number of slots, one per virtual axis. It is read
//! either from the line-oriented `keyaxis.cfg` format:
//!
//! ```text
//! Throttle,26
//! Brake,22
//! Steering,4,7
//! ```
//!
//! (one line per axis index, `name,key1[,key2]`), or from TOML when the
//! file name ends in `.toml`. Keys in TOML may be written as names (`"W"`)
//! or HID usage ids (`26`).

use crate::error::ConfigError;
use keyaxis_device::KeyCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Number of virtual axes exposed to the host
pub const AXIS_COUNT: usize = 6;

/// File name of the line-oriented config
pub const CONFIG_FILE_NAME: &str = "keyaxis.cfg";

const DEFAULT_AXIS_NAME: &str = "unnamed axis";

/// How many keys drive an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    /// Not polled, always 0.0
    Disabled,
    /// One key, 0.0 to 1.0
    Single,
    /// Two opposing keys, -1.0 to 1.0
    Dual,
}

/// Which physical keys feed an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisBinding {
    #[default]
    Disabled,
    Single(KeyCode),
    /// `negative` pulls the axis towards -1.0, `positive` towards +1.0
    Dual { negative: KeyCode, positive: KeyCode },
}

impl AxisBinding {
    pub fn kind(&self) -> AxisKind {
        match self {
            AxisBinding::Disabled => AxisKind::Disabled,
            AxisBinding::Single(_) => AxisKind::Single,
            AxisBinding::Dual { .. } => AxisKind::Dual,
        }
    }

    /// All keys read by this binding
    pub fn keys(&self) -> Vec<KeyCode> {
        match *self {
            AxisBinding::Disabled => vec![],
            AxisBinding::Single(key) => vec![key],
            AxisBinding::Dual { negative, positive } => vec![negative, positive],
        }
    }
}

/// One slot of the axis table
#[derive(Debug, Clone, PartialEq)]
pub struct AxisDefinition {
    /// Name shown in the host's control settings
    pub display_name: String,
    pub binding: AxisBinding,
}

impl AxisDefinition {
    /// Names are cleaned to the characters the line format keeps
    pub fn single(name: &str, key: KeyCode) -> Self {
        Self {
            display_name: display_name(name),
            binding: AxisBinding::Single(key),
        }
    }

    pub fn dual(name: &str, negative: KeyCode, positive: KeyCode) -> Self {
        Self {
            display_name: display_name(name),
            binding: AxisBinding::Dual { negative, positive },
        }
    }

    pub fn kind(&self) -> AxisKind {
        self.binding.kind()
    }

    fn validate(&self, index: usize) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidAxis {
            index,
            reason: reason.to_string(),
        };
        if self.display_name.is_empty() {
            return Err(invalid("display name is empty"));
        }
        if self.binding.keys().contains(&KeyCode(0)) {
            return Err(invalid("key code 0 is not a key"));
        }
        if let AxisBinding::Dual { negative, positive } = self.binding {
            if negative == positive {
                return Err(invalid("dual axis needs two different keys"));
            }
        }
        Ok(())
    }
}

impl Default for AxisDefinition {
    fn default() -> Self {
        Self {
            display_name: DEFAULT_AXIS_NAME.to_string(),
            binding: AxisBinding::Disabled,
        }
    }
}

impl fmt::Display for AxisDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.binding {
            AxisBinding::Disabled => write!(f, "{}: disabled", self.display_name),
            AxisBinding::Single(key) => {
                write!(f, "{}: single {} ({})", self.display_name, key, key.0)
            }
            AxisBinding::Dual { negative, positive } => write!(
                f,
                "{}: dual -{} ({}) / +{} ({})",
                self.display_name, negative, negative.0, positive, positive.0
            ),
        }
    }
}

/// The full, fixed-size axis table
#[derive(Debug, Clone, PartialEq)]
pub struct AxisTable {
    axes: [AxisDefinition; AXIS_COUNT],
}

impl AxisTable {
    /// A table with every axis disabled
    pub fn new() -> Self {
        Self {
            axes: std::array::from_fn(|_| AxisDefinition::default()),
        }
    }

    /// Mapping used when no config can be read: W and S as single axes,
    /// A/D as a shared steering axis
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        table.axes[1] = AxisDefinition::single("Analog key W", KeyCode::W);
        table.axes[2] = AxisDefinition::single("Analog key S", KeyCode::S);
        table.axes[3] = AxisDefinition::dual("Analog key AD", KeyCode::A, KeyCode::D);
        table
    }

    pub fn get(&self, index: usize) -> Option<&AxisDefinition> {
        self.axes.get(index)
    }

    /// Replace one axis, validating its binding
    pub fn set(&mut self, index: usize, mut axis: AxisDefinition) -> Result<(), ConfigError> {
        if index >= AXIS_COUNT {
            return Err(ConfigError::IndexOutOfRange(index));
        }
        axis.display_name = display_name(&axis.display_name);
        axis.validate(index)?;
        self.axes[index] = axis;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &AxisDefinition> {
        self.axes.iter()
    }

    /// Every key read by an enabled axis
    pub fn mapped_keys(&self) -> Vec<KeyCode> {
        self.axes.iter().flat_map(|a| a.binding.keys()).collect()
    }

    /// Parse the line-oriented format
    ///
    /// Never fails: a bad field only affects its own axis, and axes past
    /// the end of the text stay disabled.
    pub fn parse_cfg(text: &str) -> Self {
        let mut table = Self::new();
        for (index, line) in text.lines().take(AXIS_COUNT).enumerate() {
            table.axes[index] = parse_cfg_line(index, line);
        }
        table
    }

    /// Render the line-oriented format
    pub fn to_cfg_string(&self) -> String {
        let mut out = String::new();
        for axis in &self.axes {
            out.push_str(&display_name(&axis.display_name));
            match axis.binding {
                AxisBinding::Disabled => {}
                AxisBinding::Single(key) => out.push_str(&format!(",{}", key.0)),
                AxisBinding::Dual { negative, positive } => {
                    out.push_str(&format!(",{},{}", negative.0, positive.0))
                }
            }
            out.push('\n');
        }
        out
    }

    /// Parse the TOML format
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: TomlConfig = toml::from_str(text)?;
        let mut table = Self::new();
        let mut seen = [false; AXIS_COUNT];

        for axis in config.axes {
            let index = axis.index;
            let invalid = |reason: &str| ConfigError::InvalidAxis {
                index,
                reason: reason.to_string(),
            };
            if index >= AXIS_COUNT {
                return Err(ConfigError::IndexOutOfRange(index));
            }
            if seen[index] {
                return Err(invalid("defined more than once"));
            }
            seen[index] = true;

            let binding = match axis.kind {
                AxisKind::Disabled => AxisBinding::Disabled,
                AxisKind::Single => {
                    AxisBinding::Single(axis.key.ok_or_else(|| invalid("single axis needs `key`"))?)
                }
                AxisKind::Dual => AxisBinding::Dual {
                    negative: axis
                        .negative_key
                        .ok_or_else(|| invalid("dual axis needs `negative_key`"))?,
                    positive: axis
                        .positive_key
                        .ok_or_else(|| invalid("dual axis needs `positive_key`"))?,
                },
            };
            table.set(
                index,
                AxisDefinition {
                    display_name: axis.name,
                    binding,
                },
            )?;
        }
        Ok(table)
    }

    /// Render the TOML format
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        let axes = self
            .axes
            .iter()
            .enumerate()
            .map(|(index, axis)| {
                let (key, negative_key, positive_key) = match axis.binding {
                    AxisBinding::Disabled => (None, None, None),
                    AxisBinding::Single(key) => (Some(key), None, None),
                    AxisBinding::Dual { negative, positive } => {
                        (None, Some(negative), Some(positive))
                    }
                };
                TomlAxis {
                    index,
                    name: axis.display_name.clone(),
                    kind: axis.kind(),
                    key,
                    negative_key,
                    positive_key,
                }
            })
            .collect();
        Ok(toml::to_string_pretty(&TomlConfig { axes })?)
    }

    /// Default config file location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keyaxis")
            .join(CONFIG_FILE_NAME)
    }

    /// Load from a file, picking the format from the extension
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if is_toml(path) {
            Self::from_toml_str(&content)
        } else {
            Ok(Self::parse_cfg(&content))
        }
    }

    /// Load from a file, falling back to [`AxisTable::with_defaults`] with
    /// a warning if it cannot be read
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(table) => {
                info!("got user values from config file {}", path.display());
                table.log_summary();
                table
            }
            Err(e) => {
                warn!("failure reading config file ({}), using default keys (WASD)", e);
                Self::with_defaults()
            }
        }
    }

    /// Save to a file in the format matching its extension
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = if is_toml(path) {
            self.to_toml_string()?
        } else {
            self.to_cfg_string()
        };
        std::fs::write(path, content)?;
        Ok(())
    }

    fn log_summary(&self) {
        for (index, axis) in self.axes.iter().enumerate() {
            info!("axis {}: {}", index, axis);
        }
    }
}

impl Default for AxisTable {
    fn default() -> Self {
        Self::new()
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

/// Keep letters, digits, space, `.` and `_`
fn sanitize_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '.' | '_'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Sanitized name, or the default if nothing is left
fn display_name(raw: &str) -> String {
    match sanitize_name(raw) {
        name if name.is_empty() => DEFAULT_AXIS_NAME.to_string(),
        name => name,
    }
}

/// Keep digits only and parse. `None` if nothing numeric is left or the
/// value does not fit a key code.
fn parse_key_field(raw: &str) -> Option<u16> {
    raw.chars()
        .filter(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .ok()
}

fn parse_cfg_line(index: usize, line: &str) -> AxisDefinition {
    let mut axis = AxisDefinition::default();
    // Empty fields are skipped, so "name,,26" still binds key 26
    let mut fields = line.split(',').filter(|f| !f.is_empty());

    let Some(name) = fields.next() else {
        return axis;
    };
    let name = sanitize_name(name);
    if !name.is_empty() {
        axis.display_name = name;
    }

    let Some(raw_key1) = fields.next() else {
        return axis;
    };
    let key1 = match parse_key_field(raw_key1) {
        Some(code) if code != 0 => KeyCode(code),
        _ => {
            warn!(
                "axis {}: invalid key \"{}\", axis left disabled",
                index,
                raw_key1.trim()
            );
            return axis;
        }
    };
    axis.binding = AxisBinding::Single(key1);

    if let Some(raw_key2) = fields.next() {
        match parse_key_field(raw_key2) {
            // An explicit 0 means "no second key"
            Some(0) => {}
            Some(code) if KeyCode(code) == key1 => {
                warn!("axis {}: both keys are {}, using a single axis", index, key1.0);
            }
            Some(code) => {
                axis.binding = AxisBinding::Dual {
                    negative: key1,
                    positive: KeyCode(code),
                };
            }
            None => {
                warn!(
                    "axis {}: invalid second key \"{}\", using a single axis",
                    index,
                    raw_key2.trim()
                );
            }
        }
    }
    axis
}

// ---------------------------------------------------------------------------
// TOML representation
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct TomlConfig {
    #[serde(default)]
    axes: Vec<TomlAxis>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TomlAxis {
    index: usize,
    #[serde(default = "default_axis_name")]
    name: String,
    kind: AxisKind,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "key_name")]
    key: Option<KeyCode>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "key_name")]
    negative_key: Option<KeyCode>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "key_name")]
    positive_key: Option<KeyCode>,
}

fn default_axis_name() -> String {
    DEFAULT_AXIS_NAME.to_string()
}

/// Serialize keys as their name (e.g. `"W"`), accept names or usage ids
mod key_name {
    use keyaxis_device::KeyCode;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(key: &Option<KeyCode>, s: S) -> Result<S::Ok, S::Error> {
        match key {
            Some(k) => match k.name() {
                Some(name) => s.serialize_str(name),
                None => s.serialize_u16(k.0),
            },
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<KeyCode>, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum KeyRepr {
            Name(String),
            Code(u16),
        }

        match KeyRepr::deserialize(d)? {
            KeyRepr::Name(name) => name
                .parse::<KeyCode>()
                .map(Some)
                .map_err(serde::de::Error::custom),
            KeyRepr::Code(code) => Ok(Some(KeyCode(code))),
        }
    }
}
