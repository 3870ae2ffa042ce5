use std::time::Duration;

/// Property controlling the minimum interval between progress events.
pub const PROP_PROGRESS_PERIOD: &str = "slf4jtoys.meter.progress.period";
/// Property controlling whether human-readable message events are emitted.
pub const PROP_PRINT_STATUS: &str = "slf4jtoys.meter.print.status";
/// Property controlling whether messages include the category.
pub const PROP_PRINT_CATEGORY: &str = "slf4jtoys.meter.print.category";
/// Property controlling whether messages include the position.
pub const PROP_PRINT_POSITION: &str = "slf4jtoys.meter.print.position";
/// Property controlling whether messages include the system load.
pub const PROP_PRINT_LOAD: &str = "slf4jtoys.meter.print.load";
/// Property controlling whether messages include process memory.
pub const PROP_PRINT_MEMORY: &str = "slf4jtoys.meter.print.memory";
/// Property holding text prepended to every message event.
pub const PROP_MESSAGE_PREFIX: &str = "slf4jtoys.meter.message.prefix";
/// Property holding text appended to every message event.
pub const PROP_MESSAGE_SUFFIX: &str = "slf4jtoys.meter.message.suffix";
/// Property holding text prepended to every data event.
pub const PROP_DATA_PREFIX: &str = "slf4jtoys.meter.data.prefix";
/// Property holding text appended to every data event.
pub const PROP_DATA_SUFFIX: &str = "slf4jtoys.meter.data.suffix";

const DEFAULT_PROGRESS_PERIOD: Duration = Duration::from_millis(2000);

/// Settings shared by all meters created from one [`Session`][crate::Session].
///
/// The configuration is read once, typically at process start, from `slf4jtoys.meter.*`
/// properties. [`MeterConfig::from_env()`] maps each property name to an environment variable
/// by upper-casing it and replacing `.` with `_`, so `slf4jtoys.meter.progress.period` is read
/// from `SLF4JTOYS_METER_PROGRESS_PERIOD`.
///
/// | Property | Default |
/// |---|---|
/// | `slf4jtoys.meter.progress.period` | 2000 ms |
/// | `slf4jtoys.meter.print.status` | `true` |
/// | `slf4jtoys.meter.print.category` | `false` |
/// | `slf4jtoys.meter.print.position` | `false` |
/// | `slf4jtoys.meter.print.load` | `false` |
/// | `slf4jtoys.meter.print.memory` | `false` |
/// | `slf4jtoys.meter.message.prefix` / `.suffix` | empty |
/// | `slf4jtoys.meter.data.prefix` / `.suffix` | empty |
///
/// Durations are given in milliseconds or with an explicit `ms`, `s`, `min` or `h` suffix.
/// A value that cannot be parsed is reported as a warning and the default is kept.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use log_meter::MeterConfig;
///
/// let config = MeterConfig::from_lookup(|property| match property {
///     "slf4jtoys.meter.progress.period" => Some("5s".to_string()),
///     "slf4jtoys.meter.print.category" => Some("true".to_string()),
///     _ => None,
/// });
///
/// assert_eq!(config.progress_period(), Duration::from_secs(5));
/// assert!(config.print_category());
/// assert!(config.print_status());
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MeterConfig {
    progress_period: Duration,
    print_status: bool,
    print_category: bool,
    print_position: bool,
    print_load: bool,
    print_memory: bool,
    message_prefix: String,
    message_suffix: String,
    data_prefix: String,
    data_suffix: String,
}

impl MeterConfig {
    /// Reads the configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|property| std::env::var(env_var_name(property)).ok())
    }

    /// Reads the configuration through a lookup function that maps a property name to its
    /// value. Properties for which the lookup returns `None` keep their default.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            progress_period: read_duration(
                &lookup,
                PROP_PROGRESS_PERIOD,
                defaults.progress_period,
            ),
            print_status: read_bool(&lookup, PROP_PRINT_STATUS, defaults.print_status),
            print_category: read_bool(&lookup, PROP_PRINT_CATEGORY, defaults.print_category),
            print_position: read_bool(&lookup, PROP_PRINT_POSITION, defaults.print_position),
            print_load: read_bool(&lookup, PROP_PRINT_LOAD, defaults.print_load),
            print_memory: read_bool(&lookup, PROP_PRINT_MEMORY, defaults.print_memory),
            message_prefix: lookup(PROP_MESSAGE_PREFIX).unwrap_or(defaults.message_prefix),
            message_suffix: lookup(PROP_MESSAGE_SUFFIX).unwrap_or(defaults.message_suffix),
            data_prefix: lookup(PROP_DATA_PREFIX).unwrap_or(defaults.data_prefix),
            data_suffix: lookup(PROP_DATA_SUFFIX).unwrap_or(defaults.data_suffix),
        }
    }

    /// Re-reads the configuration from environment variables.
    pub fn init(&mut self) {
        *self = Self::from_env();
    }

    /// Restores the built-in defaults, ignoring the environment.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Minimum interval between two progress events of one meter. Zero disables throttling.
    #[must_use]
    pub fn progress_period(&self) -> Duration {
        self.progress_period
    }

    /// Whether human-readable message events are emitted.
    #[must_use]
    pub fn print_status(&self) -> bool {
        self.print_status
    }

    /// Whether messages include the category even when an operation is named.
    #[must_use]
    pub fn print_category(&self) -> bool {
        self.print_category
    }

    /// Whether messages include the position of the meter.
    #[must_use]
    pub fn print_position(&self) -> bool {
        self.print_position
    }

    /// Whether messages include the system load.
    #[must_use]
    pub fn print_load(&self) -> bool {
        self.print_load
    }

    /// Whether messages include the resident memory of the process.
    #[must_use]
    pub fn print_memory(&self) -> bool {
        self.print_memory
    }

    /// Text prepended to every message event.
    #[must_use]
    pub fn message_prefix(&self) -> &str {
        &self.message_prefix
    }

    /// Text appended to every message event.
    #[must_use]
    pub fn message_suffix(&self) -> &str {
        &self.message_suffix
    }

    /// Text prepended to every data event.
    #[must_use]
    pub fn data_prefix(&self) -> &str {
        &self.data_prefix
    }

    /// Text appended to every data event.
    #[must_use]
    pub fn data_suffix(&self) -> &str {
        &self.data_suffix
    }

    /// Sets the minimum interval between two progress events of one meter.
    #[must_use]
    pub fn with_progress_period(self, progress_period: Duration) -> Self {
        Self {
            progress_period,
            ..self
        }
    }

    /// Sets whether human-readable message events are emitted.
    #[must_use]
    pub fn with_print_status(self, print_status: bool) -> Self {
        Self {
            print_status,
            ..self
        }
    }

    /// Sets whether messages include the category.
    #[must_use]
    pub fn with_print_category(self, print_category: bool) -> Self {
        Self {
            print_category,
            ..self
        }
    }

    /// Sets whether messages include the position.
    #[must_use]
    pub fn with_print_position(self, print_position: bool) -> Self {
        Self {
            print_position,
            ..self
        }
    }

    /// Sets whether messages include the system load.
    #[must_use]
    pub fn with_print_load(self, print_load: bool) -> Self {
        Self { print_load, ..self }
    }

    /// Sets whether messages include process memory.
    #[must_use]
    pub fn with_print_memory(self, print_memory: bool) -> Self {
        Self {
            print_memory,
            ..self
        }
    }

    /// Sets the text surrounding every message event.
    #[must_use]
    pub fn with_message_affixes(self, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            message_prefix: prefix.into(),
            message_suffix: suffix.into(),
            ..self
        }
    }

    /// Sets the text surrounding every data event.
    #[must_use]
    pub fn with_data_affixes(self, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            data_prefix: prefix.into(),
            data_suffix: suffix.into(),
            ..self
        }
    }

    /// Whether system status needs to be sampled to render messages.
    pub(crate) fn needs_status_for_messages(&self) -> bool {
        self.print_status && (self.print_load || self.print_memory)
    }
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            progress_period: DEFAULT_PROGRESS_PERIOD,
            print_status: true,
            print_category: false,
            print_position: false,
            print_load: false,
            print_memory: false,
            message_prefix: String::new(),
            message_suffix: String::new(),
            data_prefix: String::new(),
            data_suffix: String::new(),
        }
    }
}

/// The environment variable that carries a property, e.g. `SLF4JTOYS_METER_PRINT_LOAD`.
#[must_use]
pub fn env_var_name(property: &str) -> String {
    property.to_ascii_uppercase().replace('.', "_")
}

fn read_bool(lookup: &impl Fn(&str) -> Option<String>, property: &str, default: bool) -> bool {
    let Some(value) = lookup(property) else {
        return default;
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "true" => true,
        "false" => false,
        _ => {
            tracing::warn!(property, value = %value, default, "ignoring invalid boolean property");
            default
        }
    }
}

fn read_duration(
    lookup: &impl Fn(&str) -> Option<String>,
    property: &str,
    default: Duration,
) -> Duration {
    let Some(value) = lookup(property) else {
        return default;
    };

    parse_duration(&value).unwrap_or_else(|| {
        tracing::warn!(
            property,
            value = %value,
            default = ?default,
            "ignoring invalid duration property"
        );
        default
    })
}

/// Parses `"250"`, `"250ms"`, `"3s"`, `"2min"` or `"1h"`.
fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    let digits_end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(digits_end);
    let number: u64 = number.parse().ok()?;

    match unit.trim() {
        "" | "ms" => Some(Duration::from_millis(number)),
        "s" => Some(Duration::from_secs(number)),
        "min" => Some(Duration::from_secs(number.checked_mul(60)?)),
        "h" => Some(Duration::from_secs(number.checked_mul(3600)?)),
        _ => None,
    }
}
