//! Session user, role and capability models

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::EntityId;

/// The signed-in operator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub user_id: EntityId,
    pub name: String,
    pub role_id: EntityId,
    #[serde(default)]
    pub location_id: Option<EntityId>,
    #[serde(default)]
    pub location_name: Option<String>,
}

/// Something a role may be allowed to do
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewDashboard,
    ManageProducts,
    ManageLocations,
    ViewInventory,
    ManageThresholds,
    CreateTransfer,
    ReceiveTransfer,
    RevertTransfer,
    RecoverMissing,
    OverrideInventory,
    RevertAdjustmentBatch,
    ManageBatchStaging,
    PointOfSale,
    ViewReports,
    ManageStaff,
    ManageRoles,
}

impl Capability {
    pub const ALL: [Capability; 16] = [
        Capability::ViewDashboard,
        Capability::ManageProducts,
        Capability::ManageLocations,
        Capability::ViewInventory,
        Capability::ManageThresholds,
        Capability::CreateTransfer,
        Capability::ReceiveTransfer,
        Capability::RevertTransfer,
        Capability::RecoverMissing,
        Capability::OverrideInventory,
        Capability::RevertAdjustmentBatch,
        Capability::ManageBatchStaging,
        Capability::PointOfSale,
        Capability::ViewReports,
        Capability::ManageStaff,
        Capability::ManageRoles,
    ];

    /// Name of the boolean flag carrying this capability on the server's role record
    pub fn flag(&self) -> &'static str {
        match self {
            Capability::ViewDashboard => "canViewDashboard",
            Capability::ManageProducts => "canManageProducts",
            Capability::ManageLocations => "canManageLocations",
            Capability::ViewInventory => "canViewInventory",
            Capability::ManageThresholds => "canManageThresholds",
            Capability::CreateTransfer => "canCreateTransfer",
            Capability::ReceiveTransfer => "canReceiveTransfer",
            Capability::RevertTransfer => "canRevertTransfer",
            Capability::RecoverMissing => "canRecoverMissing",
            Capability::OverrideInventory => "canOverrideInventory",
            Capability::RevertAdjustmentBatch => "canRevertAdjustmentBatch",
            Capability::ManageBatchStaging => "canManageBatchStaging",
            Capability::PointOfSale => "canUsePointOfSale",
            Capability::ViewReports => "canViewReports",
            Capability::ManageStaff => "canManageStaff",
            Capability::ManageRoles => "canManageRoles",
        }
    }

    pub fn from_flag(flag: &str) -> Option<Capability> {
        Capability::ALL.into_iter().find(|c| c.flag() == flag)
    }
}

/// Role record as the server sends it: identity plus a flat map of flags
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoleRecord {
    pub id: EntityId,
    pub name: String,
    #[serde(flatten)]
    pub flags: BTreeMap<String, serde_json::Value>,
}

/// A role with its typed capability set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: EntityId,
    pub name: String,
    pub capabilities: BTreeSet<Capability>,
}

impl Role {
    /// Decode the flag map; unknown flags and non-`true` values grant nothing
    pub fn from_record(record: &RoleRecord) -> Self {
        let capabilities = record
            .flags
            .iter()
            .filter(|(_, value)| value.as_bool() == Some(true))
            .filter_map(|(flag, _)| Capability::from_flag(flag))
            .collect();

        Self {
            id: record.id,
            name: record.name.clone(),
            capabilities,
        }
    }
}

/// The single capability predicate
pub fn has_capability(role: &Role, capability: Capability) -> bool {
    role.capabilities.contains(&capability)
}

/// Default staff roles offered when setting up a new store
pub fn default_roles() -> Vec<(&'static str, Vec<Capability>)> {
    vec![
        ("owner", Capability::ALL.to_vec()),
        (
            "manager",
            vec![
                Capability::ViewDashboard,
                Capability::ManageProducts,
                Capability::ViewInventory,
                Capability::ManageThresholds,
                Capability::CreateTransfer,
                Capability::ReceiveTransfer,
                Capability::RevertTransfer,
                Capability::RecoverMissing,
                Capability::OverrideInventory,
                Capability::ManageBatchStaging,
                Capability::PointOfSale,
                Capability::ViewReports,
            ],
        ),
        (
            "stock_clerk",
            vec![
                Capability::ViewInventory,
                Capability::CreateTransfer,
                Capability::ReceiveTransfer,
                Capability::ManageBatchStaging,
            ],
        ),
        ("cashier", vec![Capability::PointOfSale]),
    ]
}

/// A navigation entry; `capability: None` means always visible
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MenuEntry {
    pub key: String,
    pub label: String,
    pub capability: Option<Capability>,
    #[serde(default)]
    pub children: Vec<MenuEntry>,
}

impl MenuEntry {
    fn leaf(key: &str, label: &str, capability: Capability) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            capability: Some(capability),
            children: vec![],
        }
    }

    fn group(key: &str, label: &str, children: Vec<MenuEntry>) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            capability: None,
            children,
        }
    }
}

/// The dashboard menu as data
pub fn default_menu() -> Vec<MenuEntry> {
    vec![
        MenuEntry::leaf("dashboard", "Dashboard", Capability::ViewDashboard),
        MenuEntry::group(
            "catalog",
            "Catalog",
            vec![
                MenuEntry::leaf("products", "Products", Capability::ManageProducts),
                MenuEntry::leaf("locations", "Locations", Capability::ManageLocations),
            ],
        ),
        MenuEntry::group(
            "inventory",
            "Inventory",
            vec![
                MenuEntry::leaf("stock", "Stock Overview", Capability::ViewInventory),
                MenuEntry::leaf("thresholds", "Stock Thresholds", Capability::ManageThresholds),
                MenuEntry::leaf("override", "Physical Inventory", Capability::OverrideInventory),
                MenuEntry::leaf(
                    "checkpoints",
                    "Adjustment Checkpoints",
                    Capability::RevertAdjustmentBatch,
                ),
                MenuEntry::leaf("staging", "Batch Staging", Capability::ManageBatchStaging),
            ],
        ),
        MenuEntry::group(
            "transfers",
            "Transfers",
            vec![
                MenuEntry::leaf("compose", "New Transfer", Capability::CreateTransfer),
                MenuEntry::leaf("in-transit", "In Transit", Capability::ReceiveTransfer),
                MenuEntry::leaf("received", "Received", Capability::RecoverMissing),
            ],
        ),
        MenuEntry::leaf("pos", "Point of Sale", Capability::PointOfSale),
        MenuEntry::leaf("reports", "Reports", Capability::ViewReports),
        MenuEntry::group(
            "admin",
            "Administration",
            vec![
                MenuEntry::leaf("staff", "Staff", Capability::ManageStaff),
                MenuEntry::leaf("roles", "Roles", Capability::ManageRoles),
            ],
        ),
    ]
}

/// Filter a menu down to what the role may see; empty groups are dropped
pub fn visible_menu(menu: &[MenuEntry], role: &Role) -> Vec<MenuEntry> {
    menu.iter()
        .filter_map(|entry| {
            if let Some(capability) = entry.capability {
                if !has_capability(role, capability) {
                    return None;
                }
            }
            if entry.children.is_empty() {
                return Some(entry.clone());
            }
            let children = visible_menu(&entry.children, role);
            if children.is_empty() {
                None
            } else {
                Some(MenuEntry {
                    children,
                    ..entry.clone()
                })
            }
        })
        .collect()
}
