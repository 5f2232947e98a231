//! Closed capability vocabulary and the bitmask set over it.
//!
//! Real containers carry dozens of capabilities; the validator fixes a
//! 16-element vocabulary so the security predicate stays exhaustively
//! checkable. Names outside the vocabulary are ignored on lookup rather
//! than rejected. Widening the enum widens the set representation and is a
//! breaking change.

use std::fmt;

/// One of the sixteen Linux capabilities the validator reasons about.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Capability {
    Chown,
    DacOverride,
    Fsetid,
    Fowner,
    Mknod,
    NetRaw,
    Setgid,
    Setuid,
    Setfcap,
    Setpcap,
    NetBindService,
    SysChroot,
    Kill,
    AuditWrite,
    NetAdmin,
    SysAdmin,
}

impl Capability {
    /// Every capability in declaration order. Lookups and emitted lists use
    /// this order so output stays deterministic.
    pub const ALL: [Capability; 16] = [
        Capability::Chown,
        Capability::DacOverride,
        Capability::Fsetid,
        Capability::Fowner,
        Capability::Mknod,
        Capability::NetRaw,
        Capability::Setgid,
        Capability::Setuid,
        Capability::Setfcap,
        Capability::Setpcap,
        Capability::NetBindService,
        Capability::SysChroot,
        Capability::Kill,
        Capability::AuditWrite,
        Capability::NetAdmin,
        Capability::SysAdmin,
    ];

    /// OCI spelling, e.g. `CAP_SYS_ADMIN`.
    pub fn as_oci_name(self) -> &'static str {
        match self {
            Capability::Chown => "CAP_CHOWN",
            Capability::DacOverride => "CAP_DAC_OVERRIDE",
            Capability::Fsetid => "CAP_FSETID",
            Capability::Fowner => "CAP_FOWNER",
            Capability::Mknod => "CAP_MKNOD",
            Capability::NetRaw => "CAP_NET_RAW",
            Capability::Setgid => "CAP_SETGID",
            Capability::Setuid => "CAP_SETUID",
            Capability::Setfcap => "CAP_SETFCAP",
            Capability::Setpcap => "CAP_SETPCAP",
            Capability::NetBindService => "CAP_NET_BIND_SERVICE",
            Capability::SysChroot => "CAP_SYS_CHROOT",
            Capability::Kill => "CAP_KILL",
            Capability::AuditWrite => "CAP_AUDIT_WRITE",
            Capability::NetAdmin => "CAP_NET_ADMIN",
            Capability::SysAdmin => "CAP_SYS_ADMIN",
        }
    }

    /// Resolve an OCI capability name, with or without the `CAP_` prefix.
    ///
    /// Unknown names return `None`; callers treat them as out of vocabulary
    /// and skip them instead of erroring.
    pub fn from_oci_name(name: &str) -> Option<Capability> {
        let bare = name.strip_prefix("CAP_").unwrap_or(name);
        Capability::ALL
            .iter()
            .copied()
            .find(|cap| cap.as_oci_name().strip_prefix("CAP_") == Some(bare))
    }

    fn bit(self) -> u16 {
        1 << self as u16
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_oci_name())
    }
}

/// Total present/absent mapping over [`Capability`], packed into a `u16`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct CapabilitySet(u16);

impl CapabilitySet {
    /// No capabilities at all.
    pub const EMPTY: CapabilitySet = CapabilitySet(0);

    /// The conservative runtime default: everything in the vocabulary except
    /// `NET_ADMIN` and `SYS_ADMIN`.
    pub const DEFAULT: CapabilitySet = CapabilitySet(0b0011_1111_1111_1111);

    pub fn contains(self, cap: Capability) -> bool {
        self.0 & cap.bit() != 0
    }

    pub fn insert(&mut self, cap: Capability) {
        self.0 |= cap.bit();
    }

    pub fn remove(&mut self, cap: Capability) {
        self.0 &= !cap.bit();
    }

    /// Present capabilities in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL
            .into_iter()
            .filter(move |cap| self.contains(*cap))
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl Default for CapabilitySet {
    fn default() -> Self {
        CapabilitySet::DEFAULT
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut set = CapabilitySet::EMPTY;
        for cap in iter {
            set.insert(cap);
        }
        set
    }
}
