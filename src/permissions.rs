//! Static table of API permissions required by the Defender 365 integration.
//!
//! Fixed at build time and never mutated at runtime. Each entry pairs a
//! permission GUID with its display name so the operator can see what was
//! granted.

use serde::Serialize;

/// Microsoft Graph service principal
pub const MICROSOFT_GRAPH_APP_ID: &str = "00000003-0000-0000-c000-000000000000";

/// WindowsDefenderATP service principal
pub const DEFENDER_ATP_APP_ID: &str = "fc780465-2017-40d4-a0c5-307022471b92";

/// Grant type for application-level permissions
const ROLE: &str = "Role";

/// An application-level permission grant on a resource service principal
pub struct Permission {
    pub id: &'static str,
    pub name: &'static str,
}

/// Microsoft Graph permissions
pub const GRAPH_PERMISSIONS: &[Permission] = &[
    Permission {
        id: "472e4a4d-bb4a-4026-98d1-0b0d74cb74a5",
        name: "SecurityAlert.Read.All",
    },
    Permission {
        id: "45cc0394-e837-488b-a098-1918f48d186c",
        name: "SecurityIncident.Read.All",
    },
    Permission {
        id: "bf394140-e372-4bf9-a898-299cfc7564e5",
        name: "SecurityEvents.Read.All",
    },
    Permission {
        id: "dd98c7f5-2d42-42d3-a0e4-633161547251",
        name: "ThreatHunting.Read.All",
    },
    Permission {
        id: "7ab1d382-f21e-4acd-a863-ba3e13f7da61",
        name: "Directory.Read.All",
    },
    Permission {
        id: "df021288-bdef-4463-88db-98f22de89214",
        name: "User.Read.All",
    },
];

/// WindowsDefenderATP permissions
pub const DEFENDER_ATP_PERMISSIONS: &[Permission] = &[
    Permission {
        id: "41269fc5-d04d-4bfd-bce7-43a51cea049a",
        name: "Vulnerability.Read.All",
    },
    Permission {
        id: "02b005dd-f804-43b4-8fc7-078460413f74",
        name: "Score.Read.All",
    },
    Permission {
        id: "37f71c98-d198-41ae-964d-2c49aab74926",
        name: "Software.Read.All",
    },
    Permission {
        id: "ea8291d3-4b9a-44b5-bc3a-6cea3026dc79",
        name: "Machine.Read.All",
    },
    Permission {
        id: "71fe6b80-7034-4028-9ed8-0f316df9c3ff",
        name: "Alert.Read.All",
    },
];

/// One entry of the `requiredResourceAccess` field on an application object
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredResourceAccess {
    pub resource_app_id: &'static str,
    pub resource_access: Vec<ResourceAccess>,
}

#[derive(Debug, Serialize)]
pub struct ResourceAccess {
    pub id: &'static str,
    #[serde(rename = "type")]
    pub access_type: &'static str,
}

/// The full permission table in the Graph wire format
pub fn required_resource_access() -> Vec<RequiredResourceAccess> {
    [
        (MICROSOFT_GRAPH_APP_ID, GRAPH_PERMISSIONS),
        (DEFENDER_ATP_APP_ID, DEFENDER_ATP_PERMISSIONS),
    ]
    .into_iter()
    .map(|(resource_app_id, permissions)| RequiredResourceAccess {
        resource_app_id,
        resource_access: permissions
            .iter()
            .map(|p| ResourceAccess {
                id: p.id,
                access_type: ROLE,
            })
            .collect(),
    })
    .collect()
}

/// All permissions with their resource service principal, for display
pub fn all() -> impl Iterator<Item = (&'static str, &'static Permission)> {
    GRAPH_PERMISSIONS
        .iter()
        .map(|p| ("Microsoft Graph", p))
        .chain(
            DEFENDER_ATP_PERMISSIONS
                .iter()
                .map(|p| ("WindowsDefenderATP", p)),
        )
}
