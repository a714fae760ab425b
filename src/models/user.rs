use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A managed client-station record on the controller.
///
/// Two keys identify a user: `id` is the site-scoped identifier assigned by
/// the controller and stable across the record's lifetime, while `mac` acts
/// as an alternate key that is unique within a site but can rotate on some
/// controllers. Everything else is controller-defined metadata; the common
/// fields are typed below and any remaining fields round-trip untouched
/// through `extra`.
///
/// "Deleting" a user forgets the station (`forget-sta`), a soft removal from
/// the controller's station table, not guaranteed physical deletion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    /// Controller-assigned identifier. Absent on records that have not been
    /// created yet.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Client MAC address, canonical lower-case colon-hex.
    pub mac: String,

    /// Friendly name assigned to the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Free-form note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// User group the client belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usergroup_id: Option<String>,

    /// Network the client is assigned to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,

    /// Whether the client is blocked from the network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,

    /// Last known IP address. Only the `stat/user` lookup returns this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    /// Fixed IP address, if one is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_ip: Option<String>,

    /// Whether the fixed IP assignment is active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_fixedip: Option<bool>,

    /// Hostname reported by the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    /// Organizationally unique identifier derived from the MAC.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oui: Option<String>,

    /// Unix timestamp of the last time the client was seen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<u64>,

    /// Site the record belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,

    /// Controller-defined fields without a typed counterpart, passed
    /// through as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Creates a record for a client MAC, ready to pass to create.
    ///
    /// The MAC is normalized to lower-case.
    pub fn new(mac: impl Into<String>) -> Self {
        User {
            mac: mac.into().to_lowercase(),
            ..User::default()
        }
    }
}

/// A station-management command for the `cmd/stamgr` endpoint.
///
/// The closed set of supported commands, serialized with the `cmd` tag the
/// endpoint expects (e.g. `{"cmd": "block-sta", "mac": "..."}`). The
/// endpoint always answers with the sequence of affected [`User`] records;
/// how many are acceptable is the caller's decision.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "cmd", rename_all = "kebab-case")]
pub enum StationCommand {
    /// Block a station from the network.
    BlockSta {
        /// Client MAC address.
        mac: String,
    },
    /// Unblock a previously blocked station.
    UnblockSta {
        /// Client MAC address.
        mac: String,
    },
    /// Forget stations, removing them from the station table.
    ForgetSta {
        /// Client MAC addresses.
        macs: Vec<String>,
    },
}

/// Request body for `group/user` writes: `{ objects: [{ data: User }] }`.
#[derive(Debug, Serialize)]
pub(crate) struct GroupUserRequest<'a> {
    objects: Vec<GroupUserObject<'a>>,
}

#[derive(Debug, Serialize)]
struct GroupUserObject<'a> {
    data: &'a User,
}

impl<'a> GroupUserRequest<'a> {
    pub(crate) fn new(user: &'a User) -> Self {
        GroupUserRequest {
            objects: vec![GroupUserObject { data: user }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn station_commands_serialize_with_cmd_tag() {
        let block = StationCommand::BlockSta {
            mac: "00:11:22:33:44:55".into(),
        };
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            json!({"cmd": "block-sta", "mac": "00:11:22:33:44:55"})
        );

        let forget = StationCommand::ForgetSta {
            macs: vec!["00:11:22:33:44:55".into()],
        };
        assert_eq!(
            serde_json::to_value(&forget).unwrap(),
            json!({"cmd": "forget-sta", "macs": ["00:11:22:33:44:55"]})
        );
    }

    #[test]
    fn unknown_fields_round_trip_through_extra() {
        let raw = json!({
            "_id": "abc123",
            "mac": "00:11:22:33:44:55",
            "rx_bytes": 1024,
            "is_wired": false
        });

        let user: User = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(user.extra.get("rx_bytes"), Some(&json!(1024)));
        assert_eq!(serde_json::to_value(&user).unwrap(), raw);
    }

    #[test]
    fn group_request_wraps_one_object() {
        let user = User::new("AA:BB:CC:DD:EE:FF");
        let body = serde_json::to_value(GroupUserRequest::new(&user)).unwrap();
        assert_eq!(
            body,
            json!({"objects": [{"data": {"mac": "aa:bb:cc:dd:ee:ff"}}]})
        );
    }
}
