//! SIP device provisioning for the browser softphone.
//!
//! Filters the account device map down to devices the service account user
//! owns and that a WebRTC client can register, and hands out their SIP
//! credentials together with the platform's WebSocket endpoint.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::Config;
use crate::upstream::RawDevice;

/// Provisioned device handed to the dashboard softphone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SipDevice {
    pub id: String,
    pub name: String,
    pub sip_uri: String,
    pub username: String,
    pub password: String,
    pub domain: String,
    pub wss_url: String,
}

/// Select and provision the user's WebRTC-capable devices.
///
/// A device is kept when it is owned by `user_id`, enabled, carries SIP
/// credentials, and declares WebRTC support. The SIP domain is the account
/// domain lowercased with whitespace removed, suffixed with the platform
/// domain.
pub fn provision(
    devices: BTreeMap<String, RawDevice>,
    user_id: &str,
    config: &Config,
) -> Vec<SipDevice> {
    let sip_domain = sip_domain(&config.domain, &config.platform_domain);

    devices
        .into_iter()
        .filter_map(|(id, device)| {
            if device.owner_id.as_deref() != Some(user_id) || !device.enabled {
                return None;
            }
            if !device.media.as_ref().is_some_and(|m| m.webrtc) {
                return None;
            }
            let sip = device.sip?;
            Some(SipDevice {
                id,
                name: device.name,
                sip_uri: format!("sip:{}@{}", sip.username, sip_domain),
                username: sip.username,
                password: sip.password,
                domain: sip_domain.clone(),
                wss_url: config.wss_url.clone(),
            })
        })
        .collect()
}

fn sip_domain(account_domain: &str, platform_domain: &str) -> String {
    let normalized: String = account_domain
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    format!("{normalized}.{platform_domain}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn test_config() -> Config {
        Config::parse_from([
            "phonebook-gateway",
            "--api-base-url",
            "https://pbx.example.com/v2/",
            "--login-endpoint",
            "user_auth",
            "--list-users-endpoint",
            "users",
            "--account-id",
            "acct-1",
            "--username",
            "svc",
            "--password",
            "hunter2",
            "--domain",
            "Example Corp",
        ])
    }

    fn device(owner: &str, enabled: bool, webrtc: bool) -> RawDevice {
        serde_json::from_value(serde_json::json!({
            "name": "Desk phone",
            "sip": { "username": "sipuser", "password": "sippass" },
            "media": { "webrtc": webrtc },
            "enabled": enabled,
            "owner_id": owner
        }))
        .unwrap()
    }

    #[test]
    fn keeps_only_owned_enabled_webrtc_devices() {
        let devices = BTreeMap::from([
            ("a".to_string(), device("me", true, true)),
            ("b".to_string(), device("someone-else", true, true)),
            ("c".to_string(), device("me", false, true)),
            ("d".to_string(), device("me", true, false)),
        ]);
        let provisioned = provision(devices, "me", &test_config());
        assert_eq!(provisioned.len(), 1);
        assert_eq!(provisioned[0].id, "a");
    }

    #[test]
    fn sip_domain_is_lowercased_and_despaced() {
        let devices = BTreeMap::from([("a".to_string(), device("me", true, true))]);
        let provisioned = provision(devices, "me", &test_config());
        assert_eq!(provisioned[0].domain, "examplecorp.mobileuc.co.za");
        assert_eq!(
            provisioned[0].sip_uri,
            "sip:sipuser@examplecorp.mobileuc.co.za"
        );
    }

    #[test]
    fn device_without_sip_credentials_is_skipped() {
        let device: RawDevice = serde_json::from_value(serde_json::json!({
            "name": "Bare device",
            "media": { "webrtc": true },
            "enabled": true,
            "owner_id": "me"
        }))
        .unwrap();
        let provisioned = provision(BTreeMap::from([("a".to_string(), device)]), "me", &test_config());
        assert!(provisioned.is_empty());
    }
}
