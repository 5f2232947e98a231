//! Renders a hardened configuration back out as an OCI-shaped document.
//!
//! The writer covers exactly the subset of the runtime configuration the
//! record represents: user, capability lists, no-new-privileges, root
//! read-only, and the user namespace. Fields with no OCI spelling
//! (network mode, the privileged bypass, seccomp) travel as annotations so
//! the document stays a valid OCI subset. The emitted shape is pinned by
//! `schema/sanitised_config.schema.json`.

use crate::policy::ContainerConfig;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
struct SanitisedDocument {
    process: ProcessSection,
    root: RootSection,
    linux: LinuxSection,
    annotations: BTreeMap<&'static str, String>,
}

#[derive(Debug, Serialize)]
struct ProcessSection {
    user: UserSection,
    capabilities: CapabilitySection,
    #[serde(rename = "noNewPrivileges")]
    no_new_privileges: bool,
}

#[derive(Debug, Serialize)]
struct UserSection {
    uid: u64,
}

// The record keeps one effective set; the runtime expects the usual three
// lists, all equal here.
#[derive(Debug, Serialize)]
struct CapabilitySection {
    bounding: Vec<&'static str>,
    effective: Vec<&'static str>,
    permitted: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct RootSection {
    readonly: bool,
}

#[derive(Debug, Serialize)]
struct LinuxSection {
    namespaces: Vec<NamespaceEntry>,
}

#[derive(Debug, Serialize)]
struct NamespaceEntry {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Serialise `cfg` as a compact OCI-shaped JSON document.
///
/// Callers pass a hardened record; the writer does not re-harden.
pub fn render_sanitised(cfg: &ContainerConfig) -> serde_json::Result<String> {
    let caps: Vec<&'static str> = cfg.capabilities.iter().map(|c| c.as_oci_name()).collect();

    let mut namespaces = Vec::new();
    if cfg.user_namespace {
        namespaces.push(NamespaceEntry { kind: "user" });
    }

    let mut annotations = BTreeMap::new();
    annotations.insert(
        "io.gatekeeper.network-mode",
        cfg.network_mode.as_str().to_string(),
    );
    annotations.insert("io.gatekeeper.privileged", cfg.is_privileged.to_string());
    annotations.insert("io.gatekeeper.seccomp", cfg.seccomp_enabled.to_string());

    let document = SanitisedDocument {
        process: ProcessSection {
            user: UserSection { uid: cfg.user_id },
            capabilities: CapabilitySection {
                bounding: caps.clone(),
                effective: caps.clone(),
                permitted: caps,
            },
            no_new_privileges: cfg.no_new_privileges,
        },
        root: RootSection {
            readonly: cfg.root_read_only,
        },
        linux: LinuxSection { namespaces },
        annotations,
    };

    serde_json::to_string(&document)
}
