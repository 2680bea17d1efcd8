//! Core record structs.
//!
//! A [`NodeRecord`] is the full observed state of one cluster member. Feeds
//! always deliver whole records; nothing here supports partial updates.

use serde::{Deserialize, Deserializer, Serialize};

use crate::enums::{AddressRole, ConditionStatus};

/// A typed network endpoint of a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeAddress {
    /// The role this address plays.
    #[serde(rename = "type")]
    pub role: AddressRole,
    /// The address or DNS name.
    pub address: String,
}

/// A named health signal reported for a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeCondition {
    /// Condition name, e.g. `Ready` or `DiskPressure`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Current status of the condition.
    #[serde(default)]
    pub status: ConditionStatus,
}

impl NodeCondition {
    /// Whether the condition is currently asserted.
    pub fn is_true(&self) -> bool {
        self.status == ConditionStatus::True
    }
}

/// A scheduling restriction on a node, passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Taint {
    /// Taint key.
    pub key: String,
    /// Taint value (may be empty).
    #[serde(default)]
    pub value: String,
}

impl Taint {
    /// Create a taint from a key and value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One cluster member at the time of last observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Unique node name; the store key.
    pub name: String,
    /// Typed endpoints, at most one per role.
    ///
    /// Addresses of any other type (such as `Hostname`) are dropped when
    /// decoding.
    #[serde(default, deserialize_with = "known_addresses")]
    pub addresses: Vec<NodeAddress>,
    /// Health signals in the order they were reported.
    #[serde(default)]
    pub conditions: Vec<NodeCondition>,
    /// Scheduling restrictions in the order they were reported.
    #[serde(default)]
    pub taints: Vec<Taint>,
}

impl NodeRecord {
    /// Create a record with no addresses, conditions or taints.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            addresses: Vec::new(),
            conditions: Vec::new(),
            taints: Vec::new(),
        }
    }

    /// Set the address for `role`, replacing any existing one.
    #[must_use]
    pub fn with_address(mut self, role: AddressRole, address: impl Into<String>) -> Self {
        self.addresses.retain(|a| a.role != role);
        self.addresses.push(NodeAddress {
            role,
            address: address.into(),
        });
        self
    }

    /// Append a condition.
    #[must_use]
    pub fn with_condition(mut self, kind: impl Into<String>, status: ConditionStatus) -> Self {
        self.conditions.push(NodeCondition {
            kind: kind.into(),
            status,
        });
        self
    }

    /// Append a taint.
    #[must_use]
    pub fn with_taint(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.taints.push(Taint::new(key, value));
        self
    }

    /// The address reported for `role`, if any.
    ///
    /// A payload carrying the same role more than once resolves to the last
    /// entry.
    pub fn address(&self, role: AddressRole) -> Option<&str> {
        self.addresses
            .iter()
            .rev()
            .find(|a| a.role == role)
            .map(|a| a.address.as_str())
    }

    /// Whether any address with `role` is reported.
    pub fn has_address(&self, role: AddressRole) -> bool {
        self.addresses.iter().any(|a| a.role == role)
    }

    /// Names of the conditions currently asserted, in reported order.
    pub fn true_conditions(&self) -> impl Iterator<Item = &str> {
        self.conditions
            .iter()
            .filter(|c| c.is_true())
            .map(|c| c.kind.as_str())
    }

    /// Taints formatted as `key: value`, in reported order.
    pub fn taint_labels(&self) -> impl Iterator<Item = String> + '_ {
        self.taints.iter().map(|t| format!("{}: {}", t.key, t.value))
    }
}

/// Decode an address list, keeping only the roles in [`AddressRole::ALL`].
fn known_addresses<'de, D>(deserializer: D) -> Result<Vec<NodeAddress>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct WireAddress {
        #[serde(rename = "type")]
        role: String,
        address: String,
    }

    let wire = Vec::<WireAddress>::deserialize(deserializer)?;
    Ok(wire
        .into_iter()
        .filter_map(|a| {
            AddressRole::from_wire(&a.role).map(|role| NodeAddress {
                role,
                address: a.address,
            })
        })
        .collect())
}
