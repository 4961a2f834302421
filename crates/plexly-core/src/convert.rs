// ── Response-to-domain conversions ──
//
// Bridges raw plex.tv response trees into `model` types. Attributes go
// through `AttributeStore` so numbers, timestamps, and flags follow the
// same soft-fail rules as node attributes.

use plexly_api::RawTree;
use secrecy::SecretString;

use crate::attributes::AttributeStore;
use crate::model::server::{DEFAULT_PORT, DEFAULT_SCHEME};
use crate::model::{Account, ServerInfo, Subscription};

// ── Helpers ────────────────────────────────────────────────────────

fn text(attrs: &AttributeStore, name: &str) -> Option<String> {
    attrs.get(name).filter(|v| !v.is_empty()).map(str::to_owned)
}

fn secret(attrs: &AttributeStore, name: &str) -> Option<SecretString> {
    text(attrs, name).map(SecretString::from)
}

/// `id` attributes of every `<{element}>` directly under `parent`.
fn ids(parent: Option<&RawTree>, element: &str) -> Vec<String> {
    parent
        .map(|p| {
            p.children_named(element)
                .filter_map(|c| c.attr("id"))
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

// ── Server ─────────────────────────────────────────────────────────

impl From<&RawTree> for ServerInfo {
    fn from(raw: &RawTree) -> Self {
        let attrs = AttributeStore::from_raw(&raw.attributes);

        let port = attrs
            .parse_int("port")
            .and_then(|p| u16::try_from(p).ok())
            .unwrap_or(DEFAULT_PORT);

        let local_addresses = attrs
            .get("localAddresses")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            access_token: secret(&attrs, "accessToken"),
            name: text(&attrs, "name").unwrap_or_default(),
            address: text(&attrs, "address").unwrap_or_default(),
            port,
            version: text(&attrs, "version"),
            scheme: text(&attrs, "scheme").unwrap_or_else(|| DEFAULT_SCHEME.to_owned()),
            host: text(&attrs, "host"),
            local_addresses,
            machine_identifier: text(&attrs, "machineIdentifier"),
            created_at: attrs.parse_timestamp("createdAt"),
            updated_at: attrs.parse_timestamp("updatedAt"),
            owned: attrs.parse_flag("owned"),
            synced: attrs.parse_flag("synced"),
        }
    }
}

/// Every `<Server>` under a `servers.xml` container.
pub fn servers_from_tree(tree: &RawTree) -> Vec<ServerInfo> {
    tree.children_named("Server").map(ServerInfo::from).collect()
}

// ── Account ────────────────────────────────────────────────────────

impl From<&RawTree> for Account {
    fn from(raw: &RawTree) -> Self {
        let attrs = AttributeStore::from_raw(&raw.attributes);

        let subscription = raw
            .first_child("subscription")
            .map(|sub| {
                let sub_attrs = AttributeStore::from_raw(&sub.attributes);
                Subscription {
                    active: sub_attrs.parse_flag("active"),
                    status: text(&sub_attrs, "status"),
                    plan: text(&sub_attrs, "plan"),
                    features: ids(Some(sub), "feature"),
                }
            })
            .unwrap_or_default();

        let entitlements = raw.first_child("entitlements");
        let all_entitlements = entitlements
            .map(|e| AttributeStore::from_raw(&e.attributes).parse_flag("all"))
            .unwrap_or(false);

        Self {
            id: text(&attrs, "id"),
            uuid: text(&attrs, "uuid"),
            email: text(&attrs, "email"),
            username: text(&attrs, "username"),
            title: text(&attrs, "title"),
            thumb: text(&attrs, "thumb"),
            locale: text(&attrs, "locale"),
            cloud_sync_device: text(&attrs, "cloudSyncDevice"),
            authentication_token: secret(&attrs, "authenticationToken")
                .or_else(|| secret(&attrs, "authToken")),
            restricted: attrs.parse_flag("restricted"),
            home: attrs.parse_flag("home"),
            queue_email: text(&attrs, "queueEmail"),
            queue_uid: text(&attrs, "queueUid"),
            max_home_size: attrs.parse_int("maxHomeSize"),
            subscription,
            roles: ids(raw.first_child("roles"), "role"),
            entitlements: ids(entitlements, "entitlement"),
            all_entitlements,
        }
    }
}
