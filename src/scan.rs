//! Bounded projection of an OCI runtime configuration document.
//!
//! The scanner is not a JSON parser: it never builds a tree and never
//! allocates per-input memory. Each recognised field is located by an
//! independent left-to-right scan that tracks nothing but a nesting depth
//! and a fixed 256-byte key scratch buffer, so the state machine stays
//! small enough to audit. Anything structurally malformed degrades to
//! "field not present" and the record keeps its default; the scan position
//! advances on every branch, so termination follows from the input bound.
//!
//! Recognised paths:
//!
//! | path | field |
//! |---|---|
//! | `process.user.uid` | `user_id` |
//! | `linux.namespaces[*].type == "user"` | `user_namespace := true` |
//! | `root.readonly` | `root_read_only` |
//!
//! Everything else in the document is ignored. The produced record is
//! hardened before it is returned, so an `Ok` parse always satisfies the
//! security predicate.

use crate::policy::ContainerConfig;

/// Upper bound on accepted input, in bytes. Longer documents are rejected
/// without partial parsing.
pub const MAX_JSON: usize = 65_536;

/// Key tokens longer than this are silently truncated before comparison.
const KEY_SCRATCH: usize = 256;

/// Outcome of a projection attempt.
///
/// `MissingField` and `InvalidValue` belong to the status vocabulary for
/// callers that distinguish them, but the current scan degrades both cases
/// to defaults and reports `Ok`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseStatus {
    Ok,
    TooLong,
    InvalidJson,
    MissingField,
    InvalidValue,
}

/// Project `input` onto a complete, hardened [`ContainerConfig`].
///
/// Never fails hard: hostile input yields either defaults under `Ok` or a
/// non-`Ok` status with the default record.
pub fn parse_config(input: &[u8]) -> (ParseStatus, ContainerConfig) {
    let mut cfg = ContainerConfig::default();
    if input.len() > MAX_JSON {
        return (ParseStatus::TooLong, cfg);
    }
    if input.is_empty() {
        return (ParseStatus::InvalidJson, cfg);
    }

    if let Some(pos) = value_of_path(input, &[b"process", b"user", b"uid"]) {
        cfg.user_id = parse_uint(&input[pos..]);
    }

    if let Some(pos) = value_of_path(input, &[b"root", b"readonly"]) {
        cfg.root_read_only = parse_bool(&input[pos..]);
    }

    if let Some(pos) = value_of_path(input, &[b"linux", b"namespaces"]) {
        if has_user_namespace_entry(&input[pos..]) {
            cfg.user_namespace = true;
        }
    }

    cfg.harden();
    (ParseStatus::Ok, cfg)
}

/// Chain [`value_of_key`] lookups, each restarting on the tail that follows
/// the previous key's colon.
fn value_of_path(bytes: &[u8], path: &[&[u8]]) -> Option<usize> {
    let mut origin = 0usize;
    for key in path {
        let offset = value_of_key(&bytes[origin..], key)?;
        origin += offset;
    }
    Some(origin)
}

/// Find `key` as an object key at depth 1 relative to the slice origin and
/// return the index just past its `:`.
///
/// Depth counts structural braces and brackets outside string tokens only,
/// so braces inside strings cannot misalign the scan. The rule is purely
/// structural: a depth-1 key of any object reachable from the origin
/// matches, which is what keeps the state machine to a cursor, a counter,
/// and one scratch buffer.
fn value_of_key(bytes: &[u8], key: &[u8]) -> Option<usize> {
    let mut pos = 0usize;
    let mut depth: i32 = 0;
    let mut scratch = [0u8; KEY_SCRATCH];

    while pos < bytes.len() {
        match bytes[pos] {
            b'"' => {
                let token_depth = depth;
                let (len, next) = read_string(bytes, pos, &mut scratch)?;
                pos = next;
                if token_depth == 1 {
                    let after = skip_ws(bytes, pos);
                    if after < bytes.len() && bytes[after] == b':' && &scratch[..len] == key {
                        return Some(after + 1);
                    }
                }
            }
            b'{' | b'[' => {
                depth += 1;
                pos += 1;
            }
            b'}' | b']' => {
                depth -= 1;
                pos += 1;
            }
            _ => pos += 1,
        }
    }
    None
}

/// Scan the region after a `namespaces` key for any `"type": "user"` pair.
///
/// The lookup is deliberately loose: it does not confirm that the pair sits
/// inside the namespaces array, so a structurally adjacent `"type": "user"`
/// later in the document also sets the flag. Tests pin this so a future
/// tightening is a visible change.
fn has_user_namespace_entry(bytes: &[u8]) -> bool {
    let mut pos = 0usize;
    let mut scratch = [0u8; KEY_SCRATCH];

    while pos < bytes.len() {
        if bytes[pos] != b'"' {
            pos += 1;
            continue;
        }
        let Some((len, next)) = read_string(bytes, pos, &mut scratch) else {
            return false;
        };
        pos = next;
        if &scratch[..len] != b"type" {
            continue;
        }
        let after = skip_ws(bytes, pos);
        if after >= bytes.len() || bytes[after] != b':' {
            continue;
        }
        let value = skip_ws(bytes, after + 1);
        if value >= bytes.len() || bytes[value] != b'"' {
            continue;
        }
        match read_string(bytes, value, &mut scratch) {
            Some((vlen, vnext)) => {
                if &scratch[..vlen] == b"user" {
                    return true;
                }
                pos = vnext;
            }
            None => return false,
        }
    }
    false
}

/// Consume a string token starting at the opening quote.
///
/// Escapes are handled structurally: `\x` consumes two bytes without
/// decoding, which keeps the cursor aligned without an unescape table.
/// Bytes beyond the scratch capacity are dropped. Returns the token length
/// and the index past the closing quote, or `None` when the token never
/// terminates.
fn read_string(bytes: &[u8], start: usize, scratch: &mut [u8; KEY_SCRATCH]) -> Option<(usize, usize)> {
    let mut pos = start + 1;
    let mut len = 0usize;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b'"' => return Some((len, pos + 1)),
            byte => {
                if len < scratch.len() {
                    scratch[len] = byte;
                    len += 1;
                }
                pos += 1;
            }
        }
    }
    None
}

/// Accumulate a run of ASCII digits after optional whitespace, saturating
/// instead of overflowing. A missing digit run yields 0.
fn parse_uint(bytes: &[u8]) -> u64 {
    let mut pos = skip_ws(bytes, 0);
    let mut value: u64 = 0;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        value = value
            .saturating_mul(10)
            .saturating_add(u64::from(bytes[pos] - b'0'));
        pos += 1;
    }
    value
}

/// Exactly the literal `true` reads as true; any other token is false.
fn parse_bool(bytes: &[u8]) -> bool {
    let pos = skip_ws(bytes, 0);
    match bytes[pos..].strip_prefix(b"true") {
        Some(tail) => !tail.first().is_some_and(|b| b.is_ascii_alphanumeric()),
        None => false,
    }
}

fn skip_ws(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && matches!(bytes[pos], b' ' | b'\t' | b'\n' | b'\r') {
        pos += 1;
    }
    pos
}
