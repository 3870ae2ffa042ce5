use std::fmt;

/// Classifies the semantic category of an event emitted by a [`Meter`][crate::Meter].
///
/// Every lifecycle transition emits two events: a `Msg*` event with a human-readable line and a
/// `Data*` event with the encoded [`MeterData`][crate::MeterData]. Diagnostics about misuse of
/// the meter API carry one of the `Inconsistent*` markers or [`Marker::Illegal`].
///
/// The string form of each marker (see [`Marker::as_str()`]) is stable and intended to be used
/// for filtering log output.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Marker {
    /// Message event: the meter was started.
    MsgStart,
    /// Message event: the meter reported progress.
    MsgProgress,
    /// Message event: the meter completed successfully.
    MsgOk,
    /// Message event: the meter completed successfully but exceeded its time limit.
    MsgSlowOk,
    /// Message event: the meter was rejected.
    MsgReject,
    /// Message event: the meter failed.
    MsgFail,

    /// Data event: the meter was started.
    DataStart,
    /// Data event: the meter reported progress.
    DataProgress,
    /// Data event: the meter completed successfully.
    DataOk,
    /// Data event: the meter completed successfully but exceeded its time limit.
    DataSlowOk,
    /// Data event: the meter was rejected.
    DataReject,
    /// Data event: the meter failed.
    DataFail,

    /// The meter was started more than once.
    InconsistentStart,
    /// The iteration counter was changed before the meter was started.
    InconsistentIncrement,
    /// Progress was reported before the meter was started.
    InconsistentProgress,
    /// The meter was completed while not started or while already stopped.
    InconsistentOk,
    /// The meter was rejected while not started or while already stopped.
    InconsistentReject,
    /// The meter was failed while not started or while already stopped.
    InconsistentFail,

    /// A meter method was called with an illegal argument.
    Illegal,

    /// The meter itself misbehaved; this always indicates a defect in this crate.
    Bug,
}

impl Marker {
    /// Every marker, in declaration order.
    pub const ALL: [Self; 20] = [
        Self::MsgStart,
        Self::MsgProgress,
        Self::MsgOk,
        Self::MsgSlowOk,
        Self::MsgReject,
        Self::MsgFail,
        Self::DataStart,
        Self::DataProgress,
        Self::DataOk,
        Self::DataSlowOk,
        Self::DataReject,
        Self::DataFail,
        Self::InconsistentStart,
        Self::InconsistentIncrement,
        Self::InconsistentProgress,
        Self::InconsistentOk,
        Self::InconsistentReject,
        Self::InconsistentFail,
        Self::Illegal,
        Self::Bug,
    ];

    /// The stable name of the marker, e.g. `MSG_START` or `INCONSISTENT_OK`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MsgStart => "MSG_START",
            Self::MsgProgress => "MSG_PROGRESS",
            Self::MsgOk => "MSG_OK",
            Self::MsgSlowOk => "MSG_SLOW_OK",
            Self::MsgReject => "MSG_REJECT",
            Self::MsgFail => "MSG_FAIL",
            Self::DataStart => "DATA_START",
            Self::DataProgress => "DATA_PROGRESS",
            Self::DataOk => "DATA_OK",
            Self::DataSlowOk => "DATA_SLOW_OK",
            Self::DataReject => "DATA_REJECT",
            Self::DataFail => "DATA_FAIL",
            Self::InconsistentStart => "INCONSISTENT_START",
            Self::InconsistentIncrement => "INCONSISTENT_INCREMENT",
            Self::InconsistentProgress => "INCONSISTENT_PROGRESS",
            Self::InconsistentOk => "INCONSISTENT_OK",
            Self::InconsistentReject => "INCONSISTENT_REJECT",
            Self::InconsistentFail => "INCONSISTENT_FAIL",
            Self::Illegal => "ILLEGAL",
            Self::Bug => "BUG",
        }
    }

    /// Whether this marker tags a data event carrying an encoded [`MeterData`][crate::MeterData].
    #[must_use]
    pub const fn is_data(self) -> bool {
        matches!(
            self,
            Self::DataStart
                | Self::DataProgress
                | Self::DataOk
                | Self::DataSlowOk
                | Self::DataReject
                | Self::DataFail
        )
    }

    /// Whether this marker tags a diagnostic about misuse of the meter API or a defect.
    #[must_use]
    pub const fn is_diagnostic(self) -> bool {
        matches!(
            self,
            Self::InconsistentStart
                | Self::InconsistentIncrement
                | Self::InconsistentProgress
                | Self::InconsistentOk
                | Self::InconsistentReject
                | Self::InconsistentFail
                | Self::Illegal
                | Self::Bug
        )
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn names_are_unique() {
        let names: HashSet<_> = Marker::ALL.iter().map(|m| m.as_str()).collect();
        assert_eq!(names.len(), Marker::ALL.len());
    }

    #[test]
    fn display_matches_as_str() {
        for marker in Marker::ALL {
            assert_eq!(marker.to_string(), marker.as_str());
        }
    }

    #[test]
    fn data_and_diagnostic_are_disjoint() {
        for marker in Marker::ALL {
            assert!(!(marker.is_data() && marker.is_diagnostic()), "{marker}");
        }
    }

    #[test]
    fn message_markers_are_neither_data_nor_diagnostic() {
        for marker in [
            Marker::MsgStart,
            Marker::MsgProgress,
            Marker::MsgOk,
            Marker::MsgSlowOk,
            Marker::MsgReject,
            Marker::MsgFail,
        ] {
            assert!(!marker.is_data());
            assert!(!marker.is_diagnostic());
        }
    }

    #[test]
    fn data_markers_are_recognized() {
        assert!(Marker::DataStart.is_data());
        assert!(Marker::DataFail.is_data());
        assert!(Marker::InconsistentOk.is_diagnostic());
        assert!(Marker::Bug.is_diagnostic());
    }
}
