//! Verdict codes and their stable integer encoding.
//!
//! The integer values and message strings are part of the external contract:
//! downstream diagnostics match on both, so neither may change within a
//! major version. Unlisted integers decode to `InternalError` rather than
//! failing, keeping the boundary total.

use std::ffi::CStr;
use std::fmt;

/// Classification of a container configuration, encoded as a stable `i32`
/// on the C boundary.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[repr(i32)]
pub enum Verdict {
    /// The security predicate holds.
    Valid = 0,
    /// `SYS_ADMIN` requested without privileged mode.
    InvalidCapabilities = 1,
    /// Root UID without a user namespace.
    InvalidUserNamespace = 2,
    /// `NET_ADMIN` with an unprivileged network mode.
    InvalidNetworkMode = 3,
    /// Root UID able to regain privileges.
    InvalidPrivilegeEscape = 4,
    /// Input was unparseable, oversize, or null.
    ParseError = 5,
    /// Unexpected condition inside the validator.
    InternalError = -1,
}

impl Verdict {
    /// The wire encoding of this verdict.
    pub fn exit_code(self) -> i32 {
        self as i32
    }

    /// Decode a wire integer. Anything outside the published table maps to
    /// `InternalError`.
    pub fn from_exit_code(code: i32) -> Verdict {
        match code {
            0 => Verdict::Valid,
            1 => Verdict::InvalidCapabilities,
            2 => Verdict::InvalidUserNamespace,
            3 => Verdict::InvalidNetworkMode,
            4 => Verdict::InvalidPrivilegeEscape,
            5 => Verdict::ParseError,
            _ => Verdict::InternalError,
        }
    }

    /// NUL-terminated form of [`message`] for the C boundary. The two
    /// tables carry identical bytes; a test keeps them in agreement.
    ///
    /// [`message`]: Verdict::message
    pub fn message_cstr(self) -> &'static CStr {
        match self {
            Verdict::Valid => c"Configuration is valid and secure",
            Verdict::InvalidCapabilities => c"SYS_ADMIN capability requires privileged mode",
            Verdict::InvalidUserNamespace => {
                c"Root UID (0) requires user namespace to be enabled"
            }
            Verdict::InvalidNetworkMode => {
                c"NET_ADMIN capability requires Restricted or Admin network mode"
            }
            Verdict::InvalidPrivilegeEscape => {
                c"Potential privilege escalation: set no_new_privileges or enable user namespace"
            }
            Verdict::ParseError => c"Failed to parse container configuration",
            Verdict::InternalError => c"Internal error in security validation",
        }
    }

    /// Human-readable diagnostic. Byte-stable at the major version.
    pub fn message(self) -> &'static str {
        match self {
            Verdict::Valid => "Configuration is valid and secure",
            Verdict::InvalidCapabilities => "SYS_ADMIN capability requires privileged mode",
            Verdict::InvalidUserNamespace => {
                "Root UID (0) requires user namespace to be enabled"
            }
            Verdict::InvalidNetworkMode => {
                "NET_ADMIN capability requires Restricted or Admin network mode"
            }
            Verdict::InvalidPrivilegeEscape => {
                "Potential privilege escalation: set no_new_privileges or enable user namespace"
            }
            Verdict::ParseError => "Failed to parse container configuration",
            Verdict::InternalError => "Internal error in security validation",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
