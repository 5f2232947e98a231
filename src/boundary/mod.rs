//! Stable C-ABI surface over the parser and the policy.
//!
//! The boundary owns every surface pre-condition (null pointers, buffer
//! lengths, the input size bound) and the translation between [`Verdict`]
//! and its integer encoding. Nothing may unwind across these functions:
//! each body runs under `catch_unwind` and an unexpected panic surfaces as
//! `InternalError`. All returned strings have static lifetime and are
//! NUL-terminated; callers must not free them.
//!
//! There is no shared mutable state anywhere behind this surface, so every
//! function is safe to call from multiple threads at once.

use crate::emit::render_sanitised;
use crate::policy::Verdict;
use crate::scan::{MAX_JSON, ParseStatus, parse_config};
use libc::{c_char, c_int};
use std::ffi::CStr;
use std::panic;
use std::ptr;

const VERSION: &CStr = c"0.1.0";
const MSG_UNKNOWN_CODE: &CStr = c"Unknown error code";

/// Classify a NUL-terminated JSON configuration.
///
/// Returns a verdict code from the published table: 0 valid, 1–4 the
/// policy clause that failed, 5 parse failure, -1 internal failure. A null
/// pointer or an input longer than `MAX_JSON` reads as a parse failure.
///
/// # Safety
///
/// `json` must be null or point to a NUL-terminated byte string that stays
/// valid for the duration of the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn verify_json_config(json: *const c_char) -> c_int {
    let verdict = panic::catch_unwind(|| {
        if json.is_null() {
            return Verdict::ParseError;
        }
        let bytes = unsafe { CStr::from_ptr(json) }.to_bytes();
        verify_bytes(bytes)
    })
    .unwrap_or(Verdict::InternalError);
    verdict.exit_code()
}

/// Parse, harden, and re-serialise a configuration into `out`.
///
/// On success the sanitised OCI-shaped document is written NUL-terminated
/// and the byte count (excluding the NUL) is returned. Failures return a
/// negative value: the negated parse code (-5) for null pointers, a
/// non-positive or insufficient buffer, oversize input, or an unparseable
/// document, and -1 for an internal failure.
///
/// # Safety
///
/// `json` must be null or a valid NUL-terminated byte string; `out` must
/// be null or writable for `out_len` bytes. Both must stay valid for the
/// duration of the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sanitise_config(
    json: *const c_char,
    out: *mut c_char,
    out_len: c_int,
) -> c_int {
    let outcome = panic::catch_unwind(|| {
        if json.is_null() || out.is_null() || out_len <= 0 {
            return Err(Verdict::ParseError);
        }
        let bytes = unsafe { CStr::from_ptr(json) }.to_bytes();
        if bytes.len() > MAX_JSON {
            return Err(Verdict::ParseError);
        }
        let (status, cfg) = parse_config(bytes);
        if status != ParseStatus::Ok {
            return Err(Verdict::ParseError);
        }
        let rendered = render_sanitised(&cfg).map_err(|_| Verdict::InternalError)?;
        // Room for the document plus the terminating NUL.
        if rendered.len() >= out_len as usize {
            return Err(Verdict::ParseError);
        }
        unsafe {
            ptr::copy_nonoverlapping(rendered.as_ptr(), out.cast::<u8>(), rendered.len());
            *out.add(rendered.len()) = 0;
        }
        Ok(rendered.len() as c_int)
    })
    .unwrap_or(Err(Verdict::InternalError));

    match outcome {
        Ok(written) => written,
        // InternalError already encodes negative; the policy and parse
        // codes are positive and negate cleanly.
        Err(Verdict::InternalError) => Verdict::InternalError.exit_code(),
        Err(verdict) => -verdict.exit_code(),
    }
}

/// Resolve a verdict code to its diagnostic message.
///
/// Codes outside the published table resolve to "Unknown error code". The
/// returned pointer has static lifetime; do not free it.
#[unsafe(no_mangle)]
pub extern "C" fn get_error_message(code: c_int) -> *const c_char {
    let message = match code {
        0 | 1 | 2 | 3 | 4 | 5 | -1 => Verdict::from_exit_code(code).message_cstr(),
        _ => MSG_UNKNOWN_CODE,
    };
    message.as_ptr()
}

/// Version of the validator. Static lifetime; do not free.
#[unsafe(no_mangle)]
pub extern "C" fn gatekeeper_version() -> *const c_char {
    VERSION.as_ptr()
}

/// One-shot initialisation hook, reserved for future use.
///
/// The validator keeps no state, so there is nothing to set up; the hook
/// exists so hosts can call it unconditionally. Returns 0.
#[unsafe(no_mangle)]
pub extern "C" fn gatekeeper_init() -> c_int {
    0
}

/// Length-checked verification pipeline shared by the exports.
fn verify_bytes(bytes: &[u8]) -> Verdict {
    if bytes.len() > MAX_JSON {
        return Verdict::ParseError;
    }
    let (status, cfg) = parse_config(bytes);
    match status {
        ParseStatus::Ok => cfg.validate(),
        ParseStatus::TooLong
        | ParseStatus::InvalidJson
        | ParseStatus::MissingField
        | ParseStatus::InvalidValue => Verdict::ParseError,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn verify(json: &str) -> c_int {
        let input = CString::new(json).expect("test input has no interior NUL");
        unsafe { verify_json_config(input.as_ptr()) }
    }

    #[test]
    fn null_input_is_a_parse_error() {
        assert_eq!(unsafe { verify_json_config(ptr::null()) }, 5);
    }

    #[test]
    fn empty_input_is_a_parse_error() {
        assert_eq!(verify(""), 5);
    }

    #[test]
    fn defaults_verify_as_valid() {
        assert_eq!(verify("{}"), 0);
    }

    #[test]
    fn hardened_root_configuration_verifies_as_valid() {
        assert_eq!(verify(r#"{"process":{"user":{"uid":0}}}"#), 0);
    }

    #[test]
    fn oversize_input_is_a_parse_error() {
        let mut doc = b"{".to_vec();
        doc.resize(MAX_JSON + 1, b' ');
        let input = CString::new(doc).expect("no interior NUL");
        assert_eq!(unsafe { verify_json_config(input.as_ptr()) }, 5);
    }

    #[test]
    fn sanitise_rejects_null_and_bad_buffers() {
        let input = CString::new("{}").expect("no interior NUL");
        let mut out = [0 as c_char; 1024];
        unsafe {
            assert_eq!(sanitise_config(ptr::null(), out.as_mut_ptr(), 1024), -5);
            assert_eq!(sanitise_config(input.as_ptr(), ptr::null_mut(), 1024), -5);
            assert_eq!(sanitise_config(input.as_ptr(), out.as_mut_ptr(), 0), -5);
            assert_eq!(sanitise_config(input.as_ptr(), out.as_mut_ptr(), -7), -5);
        }
    }

    #[test]
    fn sanitise_rejects_a_buffer_too_small_for_the_document() {
        let input = CString::new("{}").expect("no interior NUL");
        let mut out = [0 as c_char; 8];
        let written = unsafe { sanitise_config(input.as_ptr(), out.as_mut_ptr(), 8) };
        assert_eq!(written, -5);
    }

    #[test]
    fn sanitise_writes_a_nul_terminated_document() {
        let input = CString::new(r#"{"process":{"user":{"uid":0}},"root":{"readonly":false}}"#)
            .expect("no interior NUL");
        let mut out = [0 as c_char; 2048];
        let written = unsafe { sanitise_config(input.as_ptr(), out.as_mut_ptr(), 2048) };
        assert!(written > 0, "sanitise failed: {written}");

        let text = unsafe { CStr::from_ptr(out.as_ptr()) }
            .to_str()
            .expect("sanitised output is UTF-8");
        assert_eq!(text.len(), written as usize);

        let value: serde_json::Value = serde_json::from_str(text).expect("output is JSON");
        assert_eq!(
            value.pointer("/process/user/uid").and_then(serde_json::Value::as_u64),
            Some(0)
        );
        assert_eq!(
            value.pointer("/root/readonly").and_then(serde_json::Value::as_bool),
            Some(false)
        );
    }

    #[test]
    fn error_messages_resolve_per_code() {
        for code in [0, 1, 2, 3, 4, 5, -1] {
            let message = unsafe { CStr::from_ptr(get_error_message(code)) };
            assert_eq!(
                message.to_bytes(),
                Verdict::from_exit_code(code).message().as_bytes()
            );
        }
    }

    #[test]
    fn unknown_codes_resolve_to_the_unknown_message() {
        for code in [6, 7, -2, 100, i32::MIN] {
            let message = unsafe { CStr::from_ptr(get_error_message(code)) };
            assert_eq!(message.to_bytes(), b"Unknown error code");
        }
    }

    #[test]
    fn version_and_init() {
        let version = unsafe { CStr::from_ptr(gatekeeper_version()) };
        assert_eq!(version.to_bytes(), b"0.1.0");
        assert_eq!(gatekeeper_init(), 0);
    }
}
