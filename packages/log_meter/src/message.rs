//! Human-readable text of message events.

use std::fmt::{self, Display};

use tracing::Level;

use crate::units::{Bytes, Nanos, Rate};
use crate::{Marker, MeterAnalysis, MeterConfig, MeterData};

/// The lifecycle transition that an event pair reports.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Status {
    Started,
    Progress,
    Ok,
    Slow,
    Reject,
    Fail,
}

impl Status {
    fn label(self) -> &'static str {
        match self {
            Self::Started => "STARTED",
            Self::Progress => "PROGRESS",
            Self::Ok => "OK",
            Self::Slow => "SLOW",
            Self::Reject => "REJECT",
            Self::Fail => "FAIL",
        }
    }

    pub(crate) fn message_marker(self) -> Marker {
        match self {
            Self::Started => Marker::MsgStart,
            Self::Progress => Marker::MsgProgress,
            Self::Ok => Marker::MsgOk,
            Self::Slow => Marker::MsgSlowOk,
            Self::Reject => Marker::MsgReject,
            Self::Fail => Marker::MsgFail,
        }
    }

    pub(crate) fn data_marker(self) -> Marker {
        match self {
            Self::Started => Marker::DataStart,
            Self::Progress => Marker::DataProgress,
            Self::Ok => Marker::DataOk,
            Self::Slow => Marker::DataSlowOk,
            Self::Reject => Marker::DataReject,
            Self::Fail => Marker::DataFail,
        }
    }

    pub(crate) fn message_level(self) -> Level {
        match self {
            Self::Started => Level::DEBUG,
            Self::Progress | Self::Ok | Self::Reject => Level::INFO,
            Self::Slow => Level::WARN,
            Self::Fail => Level::ERROR,
        }
    }

    fn is_stop(self) -> bool {
        matches!(self, Self::Ok | Self::Slow | Self::Reject | Self::Fail)
    }
}

/// Renders `STATUS[ path]: id 'description'; execution time; iterations; rate; context`,
/// followed by memory and load when enabled in the configuration.
pub(crate) struct ReadableMessage<'a> {
    pub(crate) status: Status,
    pub(crate) data: &'a MeterData,
    pub(crate) config: &'a MeterConfig,
}

impl ReadableMessage<'_> {
    fn write_id(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data;

        match &data.operation {
            Some(operation) if self.config.print_category() => {
                write!(f, "{}/{operation}", data.category)?;
            }
            Some(operation) => f.write_str(operation)?,
            None => f.write_str(&data.category)?,
        }

        if self.config.print_position() {
            write!(f, "#{}", data.position)?;
        }

        Ok(())
    }
}

impl Display for ReadableMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data;

        f.write_str(self.status.label())?;

        if self.status.is_stop() {
            if let Some(path) = data.path() {
                write!(f, "[{path}]")?;
            }
        }

        f.write_str(": ")?;
        self.write_id(f)?;

        if let Some(description) = &data.description {
            write!(f, " '{description}'")?;
        }

        let execution_time = data.execution_time();
        if self.status != Status::Started {
            write!(f, "; {}", Nanos(execution_time))?;

            if self.status == Status::Slow {
                write!(f, " (limit {})", Nanos(data.time_limit))?;
            }
        }

        if data.current_iteration > 0 {
            if data.expected_iterations > 0 {
                write!(
                    f,
                    "; {}/{}",
                    data.current_iteration, data.expected_iterations
                )?;
            } else {
                write!(f, "; {}", data.current_iteration)?;
            }

            if execution_time > 0 {
                write!(f, "; {}", Rate(data.iterations_per_second()))?;
            }
        }

        if let Some(message) = data.outcome.fail_message() {
            write!(f, "; {message}")?;
        }

        if !data.context.is_empty() {
            f.write_str(";")?;

            for (index, (key, value)) in data.context.iter().enumerate() {
                let separator = if index == 0 { " " } else { ", " };

                if value.is_empty() {
                    write!(f, "{separator}{key}")?;
                } else {
                    write!(f, "{separator}{key}={value}")?;
                }
            }
        }

        if self.config.print_memory() && data.status.process_memory[0] > 0 {
            write!(f, "; {}", Bytes(data.status.process_memory[0]))?;
        }

        if self.config.print_load() {
            write!(f, "; load {:.1}", data.status.system_load)?;
        }

        Ok(())
    }
}
