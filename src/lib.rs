//! Container security policy validator.
//!
//! The crate decides whether an OCI-style runtime configuration is safe to
//! execute, and rewrites unsafe configurations into safe ones. It sits in
//! front of a container runtime shim: the shim hands over the configuration
//! document, the validator answers with a verdict code, and no workload
//! launches on anything but a 0.
//!
//! Three layers, composed leaves-first:
//!
//! - [`policy`]: the configuration record, the security predicate, and the
//!   pure `validate` / `harden` operations over it.
//! - [`scan`]: a bounded projection that reads only the security-relevant
//!   fields out of a JSON document, without building a tree.
//! - [`boundary`]: the C-ABI surface a host process links against, with
//!   [`emit`] rendering hardened configurations back out as JSON.
//!
//! Everything is a pure function of its inputs: no I/O, no globals, no
//! threads, nothing that outlives a call. Hosts may invoke any operation
//! from any number of threads concurrently.

pub mod boundary;
pub mod emit;
pub mod policy;
pub mod scan;

pub use emit::render_sanitised;
pub use policy::{
    Capability, CapabilitySet, ContainerConfig, NetworkMode, Verdict, is_safe_capability,
};
pub use scan::{MAX_JSON, ParseStatus, parse_config};
