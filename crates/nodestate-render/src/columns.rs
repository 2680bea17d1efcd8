//! Per-snapshot column derivation shared by the renderers.
//!
//! Address roles are sparse: a bare-metal cluster may report only internal
//! IPs while a cloud cluster reports all four. Every render call derives
//! the roles present in its own snapshot; nothing is cached between calls.

use nodestate_core::store::Snapshot;
use nodestate_types::AddressRole;

/// Roles reported by at least one node in `snapshot`, in canonical order.
pub fn present_roles(snapshot: &Snapshot) -> Vec<AddressRole> {
    AddressRole::ALL
        .into_iter()
        .filter(|&role| snapshot.iter().any(|node| node.has_address(role)))
        .collect()
}

/// Table column heading for `role`.
pub const fn heading(role: AddressRole) -> &'static str {
    match role {
        AddressRole::InternalIp => "Internal IP",
        AddressRole::ExternalIp => "External IP",
        AddressRole::InternalDns => "Internal DNS Name",
        AddressRole::ExternalDns => "External DNS Name",
    }
}

/// logfmt key for `role`.
pub const fn logfmt_key(role: AddressRole) -> &'static str {
    match role {
        AddressRole::InternalIp => "node_internal_ip",
        AddressRole::ExternalIp => "node_external_ip",
        AddressRole::InternalDns => "node_internal_dns",
        AddressRole::ExternalDns => "node_external_dns",
    }
}
