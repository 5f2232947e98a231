//! Container configuration record and the security predicate over it.
//!
//! The policy is pure data plus two total operations. `validate` classifies
//! a configuration into a [`Verdict`] by walking an ordered decision table;
//! `harden` rewrites the record so the predicate holds. Hardening only ever
//! flows toward constraint: it removes capabilities and enables isolation,
//! never raises the network privilege level or grants anything new. The one
//! rewrite that looks like an addition, enabling the user namespace for a
//! root UID, maps container root onto an unprivileged host UID and is
//! therefore a reduction.

mod capability;
mod verdict;

pub use capability::{Capability, CapabilitySet};
pub use verdict::Verdict;

/// Network privilege level, ordered from least to most privileged.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum NetworkMode {
    Unprivileged,
    Restricted,
    Admin,
}

impl NetworkMode {
    pub fn as_str(self) -> &'static str {
        match self {
            NetworkMode::Unprivileged => "unprivileged",
            NetworkMode::Restricted => "restricted",
            NetworkMode::Admin => "admin",
        }
    }
}

/// Security-relevant projection of an OCI runtime configuration.
///
/// The record is total: every field holds a value from the moment it is
/// constructed, and fields a JSON document never mentions keep their
/// defaults. The default record satisfies the security predicate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ContainerConfig {
    /// Administrator-explicit bypass. When set, every check passes.
    pub is_privileged: bool,
    /// Root filesystem mounted read-only.
    pub root_read_only: bool,
    /// Effective capability set.
    pub capabilities: CapabilitySet,
    /// UID the container process runs as; 0 is root.
    pub user_id: u64,
    /// User-namespace mapping enabled.
    pub user_namespace: bool,
    /// Network privilege level.
    pub network_mode: NetworkMode,
    /// Blocks privilege gain through setuid binaries and file capabilities.
    pub no_new_privileges: bool,
    /// Seccomp profile applied.
    pub seccomp_enabled: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        ContainerConfig {
            is_privileged: false,
            root_read_only: true,
            capabilities: CapabilitySet::DEFAULT,
            user_id: 1000,
            user_namespace: true,
            network_mode: NetworkMode::Unprivileged,
            no_new_privileges: true,
            seccomp_enabled: true,
        }
    }
}

impl ContainerConfig {
    /// The security predicate.
    ///
    /// Holds when the configuration is privileged, or when all four clauses
    /// pass: no `SYS_ADMIN`, root only inside a user namespace, `NET_ADMIN`
    /// only with elevated network privilege, and no open escalation path
    /// for a root UID.
    pub fn is_secure(&self) -> bool {
        if self.is_privileged {
            return true;
        }
        let no_sys_admin = !self.capabilities.contains(Capability::SysAdmin);
        let root_mapped = self.user_id > 0 || self.user_namespace;
        let net_admin_ok = !self.capabilities.contains(Capability::NetAdmin)
            || self.network_mode != NetworkMode::Unprivileged;
        let no_escape = self.user_id > 0 || self.no_new_privileges || self.user_namespace;
        no_sys_admin && root_mapped && net_admin_ok && no_escape
    }

    /// Classify the configuration. The first failing clause, in table
    /// order, selects the verdict; `Valid` implies [`is_secure`].
    ///
    /// [`is_secure`]: ContainerConfig::is_secure
    pub fn validate(&self) -> Verdict {
        if self.is_privileged {
            return Verdict::Valid;
        }
        if self.capabilities.contains(Capability::SysAdmin) {
            return Verdict::InvalidCapabilities;
        }
        if self.user_id == 0 && !self.user_namespace {
            return Verdict::InvalidUserNamespace;
        }
        if self.capabilities.contains(Capability::NetAdmin)
            && self.network_mode == NetworkMode::Unprivileged
        {
            return Verdict::InvalidNetworkMode;
        }
        if self.user_id == 0 && !self.no_new_privileges && !self.user_namespace {
            return Verdict::InvalidPrivilegeEscape;
        }
        Verdict::Valid
    }

    /// Rewrite the configuration until the security predicate holds.
    ///
    /// Idempotent, and a no-op for privileged configurations. Conflicts are
    /// resolved by dropping the capability rather than raising the network
    /// mode.
    pub fn harden(&mut self) {
        if self.is_privileged {
            return;
        }
        self.capabilities.remove(Capability::SysAdmin);
        if self.user_id == 0 {
            self.user_namespace = true;
        }
        if self.capabilities.contains(Capability::NetAdmin)
            && self.network_mode == NetworkMode::Unprivileged
        {
            self.capabilities.remove(Capability::NetAdmin);
        }
        // Unreachable after the namespace rewrite above, but kept so the
        // escape clause stays closed even if the rewrite order changes.
        if self.user_id == 0 && !self.user_namespace {
            self.no_new_privileges = true;
        }
    }
}

/// Whether a single capability is acceptable under the given privilege and
/// network context.
pub fn is_safe_capability(cap: Capability, is_privileged: bool, net_mode: NetworkMode) -> bool {
    if is_privileged {
        return true;
    }
    match cap {
        Capability::SysAdmin => false,
        Capability::NetAdmin => net_mode != NetworkMode::Unprivileged,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_is_secure() {
        let cfg = ContainerConfig::default();
        assert!(cfg.is_secure());
        assert_eq!(cfg.validate(), Verdict::Valid);
    }

    #[test]
    fn sys_admin_without_privilege_is_rejected() {
        let mut cfg = ContainerConfig::default();
        cfg.capabilities.insert(Capability::SysAdmin);
        assert_eq!(cfg.validate(), Verdict::InvalidCapabilities);
        assert!(!cfg.is_secure());
    }

    #[test]
    fn unmapped_root_is_rejected_before_escape_check() {
        // Root with neither a user namespace nor no_new_privileges trips the
        // namespace clause first; the escape clause never gets a look.
        let cfg = ContainerConfig {
            user_id: 0,
            user_namespace: false,
            no_new_privileges: false,
            ..ContainerConfig::default()
        };
        assert_eq!(cfg.validate(), Verdict::InvalidUserNamespace);
    }

    #[test]
    fn net_admin_on_unprivileged_network_is_rejected() {
        let mut cfg = ContainerConfig::default();
        cfg.capabilities.insert(Capability::NetAdmin);
        assert_eq!(cfg.network_mode, NetworkMode::Unprivileged);
        assert_eq!(cfg.validate(), Verdict::InvalidNetworkMode);
    }

    #[test]
    fn net_admin_with_restricted_network_passes() {
        let mut cfg = ContainerConfig::default();
        cfg.capabilities.insert(Capability::NetAdmin);
        cfg.network_mode = NetworkMode::Restricted;
        assert_eq!(cfg.validate(), Verdict::Valid);
    }

    #[test]
    fn privileged_bypasses_every_check() {
        let mut cfg = ContainerConfig {
            is_privileged: true,
            user_id: 0,
            user_namespace: false,
            no_new_privileges: false,
            ..ContainerConfig::default()
        };
        cfg.capabilities.insert(Capability::SysAdmin);
        cfg.capabilities.insert(Capability::NetAdmin);
        assert_eq!(cfg.validate(), Verdict::Valid);
        assert!(cfg.is_secure());
    }

    #[test]
    fn root_without_namespace_but_with_nnp_still_needs_namespace() {
        let cfg = ContainerConfig {
            user_id: 0,
            user_namespace: false,
            no_new_privileges: true,
            ..ContainerConfig::default()
        };
        assert_eq!(cfg.validate(), Verdict::InvalidUserNamespace);
    }

    #[test]
    fn harden_clears_sys_admin() {
        let mut cfg = ContainerConfig::default();
        cfg.capabilities.insert(Capability::SysAdmin);
        cfg.harden();
        assert!(!cfg.capabilities.contains(Capability::SysAdmin));
        assert_eq!(cfg.validate(), Verdict::Valid);
    }

    #[test]
    fn harden_maps_root_into_user_namespace() {
        let mut cfg = ContainerConfig {
            user_id: 0,
            user_namespace: false,
            ..ContainerConfig::default()
        };
        cfg.harden();
        assert!(cfg.user_namespace);
        assert!(cfg.is_secure());
    }

    #[test]
    fn harden_drops_net_admin_instead_of_raising_network_mode() {
        let mut cfg = ContainerConfig::default();
        cfg.capabilities.insert(Capability::NetAdmin);
        cfg.harden();
        assert!(!cfg.capabilities.contains(Capability::NetAdmin));
        assert_eq!(cfg.network_mode, NetworkMode::Unprivileged);
    }

    #[test]
    fn harden_keeps_net_admin_when_network_is_elevated() {
        let mut cfg = ContainerConfig::default();
        cfg.capabilities.insert(Capability::NetAdmin);
        cfg.network_mode = NetworkMode::Admin;
        cfg.harden();
        assert!(cfg.capabilities.contains(Capability::NetAdmin));
    }

    #[test]
    fn harden_leaves_privileged_configurations_alone() {
        let mut cfg = ContainerConfig {
            is_privileged: true,
            user_id: 0,
            user_namespace: false,
            ..ContainerConfig::default()
        };
        cfg.capabilities.insert(Capability::SysAdmin);
        let before = cfg;
        cfg.harden();
        assert_eq!(cfg, before);
    }

    #[test]
    fn harden_is_idempotent() {
        let mut cfg = ContainerConfig {
            user_id: 0,
            user_namespace: false,
            no_new_privileges: false,
            ..ContainerConfig::default()
        };
        cfg.capabilities.insert(Capability::SysAdmin);
        cfg.capabilities.insert(Capability::NetAdmin);
        cfg.harden();
        let once = cfg;
        cfg.harden();
        assert_eq!(cfg, once);
        assert!(cfg.is_secure());
    }

    #[test]
    fn safe_capability_matrix() {
        assert!(!is_safe_capability(
            Capability::SysAdmin,
            false,
            NetworkMode::Admin
        ));
        assert!(is_safe_capability(
            Capability::SysAdmin,
            true,
            NetworkMode::Unprivileged
        ));
        assert!(!is_safe_capability(
            Capability::NetAdmin,
            false,
            NetworkMode::Unprivileged
        ));
        assert!(is_safe_capability(
            Capability::NetAdmin,
            false,
            NetworkMode::Restricted
        ));
        assert!(is_safe_capability(
            Capability::Chown,
            false,
            NetworkMode::Unprivileged
        ));
    }

    #[test]
    fn network_modes_are_ordered() {
        assert!(NetworkMode::Unprivileged < NetworkMode::Restricted);
        assert!(NetworkMode::Restricted < NetworkMode::Admin);
    }
}
