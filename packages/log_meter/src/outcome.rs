/// The terminal classification of a [`Meter`][crate::Meter].
///
/// A meter starts out [`Outcome::Unset`] and is resolved exactly once by one of
/// [`ok()`][crate::Meter::ok], [`reject()`][crate::Meter::reject] or
/// [`fail()`][crate::Meter::fail]. Resolving a meter again replaces the outcome and is reported
/// as inconsistent usage.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
#[expect(
    clippy::exhaustive_enums,
    reason = "a meter has exactly these outcomes and callers are expected to match on them"
)]
pub enum Outcome {
    /// The meter has not been resolved yet.
    #[default]
    Unset,

    /// The operation completed successfully, optionally through a labeled path.
    Ok {
        /// Label of the branch through which the operation completed.
        path: Option<String>,
    },

    /// The operation ended through an expected, non-successful path.
    Reject {
        /// The reason for the rejection.
        path: String,
    },

    /// The operation failed.
    Fail {
        /// The failure identifier, typically the type name of the error.
        path: String,

        /// A description of the failure, typically the error's display text.
        message: Option<String>,
    },
}

impl Outcome {
    /// Whether the meter has been resolved with any outcome.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    /// Whether the outcome is [`Outcome::Ok`].
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    /// Whether the outcome is [`Outcome::Reject`].
    #[must_use]
    pub fn is_reject(&self) -> bool {
        matches!(self, Self::Reject { .. })
    }

    /// Whether the outcome is [`Outcome::Fail`].
    #[must_use]
    pub fn is_fail(&self) -> bool {
        matches!(self, Self::Fail { .. })
    }

    /// The path of whichever outcome is set.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Unset => None,
            Self::Ok { path } => path.as_deref(),
            Self::Reject { path } | Self::Fail { path, .. } => Some(path),
        }
    }

    /// The failure message, if the outcome is a failure that carries one.
    #[must_use]
    pub fn fail_message(&self) -> Option<&str> {
        match self {
            Self::Fail { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}
