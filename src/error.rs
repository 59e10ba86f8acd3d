// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

macro_rules! iot_errors {
    ($($variant:ident = $code:literal, $name:literal, $description:literal;)+) => {
        /// Result codes shared by the kernel and its collaborators (driver modules, device
        /// connections).
        ///
        /// Every variant has a stable negative numeric code, which is what crosses module
        /// boundaries in serialized form.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum IotError {
            $(
                #[doc = $description]
                $variant,
            )+
        }

        impl IotError {
            /// Returns the numeric code of this error.
            pub const fn code(self) -> i32 {
                match self {
                    $(Self::$variant => $code,)+
                }
            }

            /// Looks up the error for a numeric code.
            /// Returns `None` for zero (success) and unknown codes.
            pub const fn from_code(code: i32) -> Option<Self> {
                match code {
                    $($code => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Returns the symbolic name of this error, e.g. `"NOT_FOUND"`.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }

            const fn description(self) -> &'static str {
                match self {
                    $(Self::$variant => $description,)+
                }
            }
        }
    };
}

iot_errors! {
    NoMemory = -1, "NO_MEMORY", "memory allocation error";
    NotInited = -2, "NOT_INITED", "object wasn't properly inited";
    InitedTwice = -3, "INITED_TWICE", "object was already inited";
    InvalidThread = -4, "INVALID_THREAD", "function called from unacceptable thread";
    NoBufSpace = -5, "NO_BUFSPACE", "provided buffer size is not enough";
    NotFound = -6, "NOT_FOUND", "not found";
    InvalidArgs = -7, "INVALID_ARGS", "invalid args provided";
    TemporaryError = -8, "TEMPORARY_ERROR", "temporary error";
    DeviceNotSupported = -9, "DEVICE_NOT_SUPPORTED", "device not supported";
    InvalidDeviceData = -10, "INVALID_DEVICE_DATA", "invalid device data";
    CriticalError = -11, "CRITICAL_ERROR", "critical error";
    LimitReached = -12, "LIMIT_REACHED", "limit reached";
    NoPeer = -13, "NO_PEER", "peer is not connected";
    TryAgain = -14, "TRY_AGAIN", "one more try should be made";
    MessageIgnored = -15, "MESSAGE_IGNORED", "unknown or invalid message";
    UnknownAction = -16, "UNKNOWN_ACTION", "unknown action";
    NotReady = -17, "NOT_READY", "object not ready";
    ActionCancelled = -18, "ACTION_CANCELLED", "action cancelled";
    ModuleBlocked = -19, "MODULE_BLOCKED", "module blocked";
    NoAction = -20, "NO_ACTION", "no action performed";
    HardLimitReached = -21, "HARD_LIMIT_REACHED", "hard limit reached";
    BadRequest = -22, "BAD_REQUEST", "request is broken";
    BadData = -23, "BAD_DATA", "data is broken";
    CriticalBug = -100, "CRITICAL_BUG", "bug in code";
}

impl fmt::Display for IotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl std::error::Error for IotError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_lookup() {
        for err in [
            IotError::NoMemory,
            IotError::NotFound,
            IotError::TemporaryError,
            IotError::NotReady,
            IotError::ModuleBlocked,
            IotError::HardLimitReached,
            IotError::CriticalBug,
        ] {
            assert_eq!(IotError::from_code(err.code()), Some(err));
        }

        assert_eq!(IotError::from_code(0), None);
        assert_eq!(IotError::from_code(-99), None);
    }

    #[test]
    fn display_and_name() {
        assert_eq!(IotError::DeviceNotSupported.code(), -9);
        assert_eq!(IotError::DeviceNotSupported.name(), "DEVICE_NOT_SUPPORTED");
        assert_eq!(
            format!("{}", IotError::DeviceNotSupported),
            "device not supported"
        );
        assert_eq!(format!("{}", IotError::ModuleBlocked), "module blocked");
    }
}
