//! Compact single-line encoding of [`MeterData`].
//!
//! The payload is a JSON object with abbreviated keys. Fields that hold their default value are
//! left out, so a freshly started meter encodes to a handful of keys.

use serde::{Deserialize, Deserializer, Serialize};

use crate::{Context, Error, MeterData, Outcome, Result, SystemStatus};

fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

// JSON has no representation for NaN or infinity; such a load is recorded as unknown.
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn null_as_zero<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
struct Wire {
    #[serde(rename = "_", skip_serializing_if = "Option::is_none")]
    session_uuid: Option<String>,
    #[serde(rename = "c", skip_serializing_if = "String::is_empty")]
    category: String,
    #[serde(rename = "n", skip_serializing_if = "Option::is_none")]
    operation: Option<String>,
    #[serde(rename = "ep", skip_serializing_if = "Option::is_none")]
    parent: Option<String>,
    #[serde(rename = "#", skip_serializing_if = "is_default")]
    position: u64,
    #[serde(rename = "d", skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    #[serde(rename = "t0", skip_serializing_if = "is_default")]
    create_time: u64,
    #[serde(rename = "t1", skip_serializing_if = "is_default")]
    start_time: u64,
    #[serde(rename = "t2", skip_serializing_if = "is_default")]
    stop_time: u64,
    #[serde(rename = "t", skip_serializing_if = "is_default")]
    last_current_time: u64,
    #[serde(rename = "tl", skip_serializing_if = "is_default")]
    time_limit: u64,

    #[serde(rename = "i", skip_serializing_if = "is_default")]
    current_iteration: u64,
    #[serde(rename = "ei", skip_serializing_if = "is_default")]
    expected_iterations: u64,

    #[serde(rename = "ok", skip_serializing_if = "Option::is_none")]
    ok_path: Option<String>,
    #[serde(rename = "rj", skip_serializing_if = "Option::is_none")]
    reject_path: Option<String>,
    #[serde(rename = "fl", skip_serializing_if = "Option::is_none")]
    fail_path: Option<String>,
    #[serde(rename = "fm", skip_serializing_if = "Option::is_none")]
    fail_message: Option<String>,

    #[serde(rename = "ctx", skip_serializing_if = "Context::is_empty")]
    context: Context,

    #[serde(rename = "sm", skip_serializing_if = "is_default")]
    system_memory: [u64; 3],
    #[serde(rename = "pm", skip_serializing_if = "is_default")]
    process_memory: [u64; 2],
    #[serde(rename = "ct", skip_serializing_if = "is_default")]
    cpu_time: [u64; 2],
    #[serde(
        rename = "sl",
        skip_serializing_if = "is_default",
        deserialize_with = "null_as_zero"
    )]
    system_load: f64,
}

impl From<&MeterData> for Wire {
    fn from(data: &MeterData) -> Self {
        let (ok_path, reject_path, fail_path, fail_message) = match &data.outcome {
            Outcome::Unset => (None, None, None, None),
            Outcome::Ok { path } => (path.clone(), None, None, None),
            Outcome::Reject { path } => (None, Some(path.clone()), None, None),
            Outcome::Fail { path, message } => (None, None, Some(path.clone()), message.clone()),
        };

        Self {
            session_uuid: data.session_uuid.clone(),
            category: data.category.clone(),
            operation: data.operation.clone(),
            parent: data.parent.clone(),
            position: data.position,
            description: data.description.clone(),
            create_time: data.create_time,
            start_time: data.start_time,
            stop_time: data.stop_time,
            last_current_time: data.last_current_time,
            time_limit: data.time_limit,
            current_iteration: data.current_iteration,
            expected_iterations: data.expected_iterations,
            ok_path,
            reject_path,
            fail_path,
            fail_message,
            context: data.context.clone(),
            system_memory: data.status.system_memory,
            process_memory: data.status.process_memory,
            cpu_time: data.status.cpu_time,
            system_load: finite_or_zero(data.status.system_load),
        }
    }
}

impl From<Wire> for MeterData {
    fn from(wire: Wire) -> Self {
        let outcome = if let Some(path) = wire.fail_path {
            Outcome::Fail {
                path,
                message: wire.fail_message,
            }
        } else if let Some(path) = wire.reject_path {
            Outcome::Reject { path }
        } else if wire.ok_path.is_some() || wire.stop_time != 0 {
            Outcome::Ok {
                path: wire.ok_path,
            }
        } else {
            Outcome::Unset
        };

        let mut status = SystemStatus::default();
        status.system_memory = wire.system_memory;
        status.process_memory = wire.process_memory;
        status.cpu_time = wire.cpu_time;
        status.system_load = wire.system_load;

        Self {
            session_uuid: wire.session_uuid,
            category: wire.category,
            operation: wire.operation,
            parent: wire.parent,
            position: wire.position,
            description: wire.description,
            create_time: wire.create_time,
            start_time: wire.start_time,
            stop_time: wire.stop_time,
            last_current_time: wire.last_current_time,
            time_limit: wire.time_limit,
            current_iteration: wire.current_iteration,
            expected_iterations: wire.expected_iterations,
            outcome,
            context: wire.context,
            status,
        }
    }
}

impl MeterData {
    /// Encodes the snapshot as a single-line payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] if the snapshot cannot be serialized. This does not happen
    /// for any snapshot a meter produces.
    ///
    /// # Examples
    ///
    /// ```
    /// use log_meter::MeterData;
    ///
    /// let mut data = MeterData::default();
    /// data.category = "billing".to_string();
    /// data.position = 3;
    ///
    /// assert_eq!(data.encode().unwrap(), r##"{"c":"billing","#":3}"##);
    /// ```
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(&Wire::from(self))?)
    }

    /// Decodes a payload produced by [`encode()`][Self::encode].
    ///
    /// Keys that are absent keep their default value and unknown keys are ignored. The outcome
    /// is rebuilt from whichever outcome key is present; a payload with a stop time but no
    /// outcome key decodes as a successful outcome without a path.
    ///
    /// Every snapshot a meter produces survives an encode-decode round trip unchanged. A
    /// hand-built snapshot whose outcome disagrees with its stop time (unresolved but stopped,
    /// or successful without a path and never stopped) comes back with the outcome that the
    /// stop time implies.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] if `payload` is not a valid encoding.
    pub fn decode(payload: &str) -> Result<Self> {
        let wire: Wire = serde_json::from_str(payload)?;
        Ok(wire.into())
    }

    /// Extracts and decodes the payload embedded in a complete log line.
    ///
    /// The payload is taken from the first `{` through the last `}`, so any prefix and suffix
    /// text added by the log format or by the configured data affixes is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingPayload`] if the line contains no `{...}` section and
    /// [`Error::Malformed`] if the section is not a valid encoding.
    ///
    /// # Examples
    ///
    /// ```
    /// use log_meter::MeterData;
    ///
    /// let line = r##"2025-01-01T00:00:00Z TRACE billing: DATA {"c":"billing","#":3,"t1":50} end"##;
    /// let data = MeterData::parse_line(line).unwrap();
    ///
    /// assert_eq!(data.category, "billing");
    /// assert_eq!(data.position, 3);
    /// assert_eq!(data.start_time, 50);
    /// ```
    pub fn parse_line(line: &str) -> Result<Self> {
        let payload = line
            .find('{')
            .zip(line.rfind('}'))
            .and_then(|(start, end)| line.get(start..=end));

        match payload {
            Some(payload) => Self::decode(payload),
            None => Err(Error::MissingPayload {
                line: line.to_string(),
            }),
        }
    }
}
