//! Enumeration types for node records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The role of a node address.
///
/// Depending on the cluster environment (cloud, bare metal) any subset of
/// these roles may be reported for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AddressRole {
    /// Address reachable from inside the cluster.
    #[serde(rename = "InternalIP")]
    InternalIp,
    /// Address reachable from outside the cluster.
    #[serde(rename = "ExternalIP")]
    ExternalIp,
    /// DNS name resolvable inside the cluster.
    #[serde(rename = "InternalDNS")]
    InternalDns,
    /// DNS name resolvable outside the cluster.
    #[serde(rename = "ExternalDNS")]
    ExternalDns,
}

impl AddressRole {
    /// Every role, in the order output columns and fields are emitted.
    pub const ALL: [Self; 4] = [
        Self::InternalIp,
        Self::ExternalIp,
        Self::InternalDns,
        Self::ExternalDns,
    ];

    /// Parse a wire name. Returns `None` for address types outside
    /// [`Self::ALL`].
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == name)
    }

    /// The wire name of the role, as reported by the cluster.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InternalIp => "InternalIP",
            Self::ExternalIp => "ExternalIP",
            Self::InternalDns => "InternalDNS",
            Self::ExternalDns => "ExternalDNS",
        }
    }
}

impl fmt::Display for AddressRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a node condition.
///
/// Only [`ConditionStatus::True`] is surfaced in output; `False` and
/// `Unknown` are treated as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConditionStatus {
    /// The condition is asserted.
    True,
    /// The condition is not asserted.
    False,
    /// The control plane could not determine the condition. Any status
    /// string other than `True` or `False` decodes to this.
    #[default]
    #[serde(other)]
    Unknown,
}
