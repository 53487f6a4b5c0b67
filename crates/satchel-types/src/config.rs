//! Network configuration model.
//!
//! Chain configuration is two things at once: a user-editable *declaration*
//! (a URL to fetch from, or literal configuration text) and a
//! network-derived *resolution* (the text last fetched for a declaration).
//! The persisted [`WalletConfiguration`] keeps both; the derived
//! [`EffectiveConfig`] exists only while the resolution still matches the
//! declaration it was produced for. Changing the declaration therefore
//! invalidates the effective view without deleting the stale resolution,
//! which is retained in case the user reverts.

use serde::{Deserialize, Serialize};

/// URL the stock configuration is fetched from.
pub const DEFAULT_CONFIG_URL: &str = "https://ton.org/global-config-wallet.json";

/// Network name advertised when the declaration carries no custom id.
const DEFAULT_NETWORK_NAME: &str = "testnet2";

/// Where the chain configuration text comes from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Fetch the configuration from a remote URL.
    Url(String),
    /// Use the given literal configuration text.
    Inline(String),
}

/// User-declared configuration intent for one network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDeclaration {
    pub source: ConfigSource,
    /// Overrides the advertised network name when set.
    pub custom_id: Option<String>,
}

/// The last successfully fetched configuration text, tagged with the source
/// it was resolved against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    pub source: ConfigSource,
    pub text: String,
}

/// Declaration plus whatever resolution has been persisted for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkEntry {
    pub declaration: NetworkDeclaration,
    pub resolved: Option<ResolvedConfig>,
}

impl NetworkEntry {
    /// The resolution usable right now: present and produced for the
    /// current declaration source.
    pub fn valid_resolution(&self) -> Option<&ResolvedConfig> {
        self.resolved
            .as_ref()
            .filter(|resolved| resolved.source == self.declaration.source)
    }

    /// Advertised name of this network.
    pub fn network_name(&self) -> &str {
        self.declaration
            .custom_id
            .as_deref()
            .unwrap_or(DEFAULT_NETWORK_NAME)
    }
}

/// Which network the wallet talks to.
///
/// A single variant today; kept as a tagged enum in the serialized form so
/// additional networks do not break decoding of existing documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActiveNetwork {
    TestNet,
}

/// The persisted configuration document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConfiguration {
    pub test_net: NetworkEntry,
    pub active_network: ActiveNetwork,
}

impl Default for WalletConfiguration {
    fn default() -> Self {
        Self {
            test_net: NetworkEntry {
                declaration: NetworkDeclaration {
                    source: ConfigSource::Url(DEFAULT_CONFIG_URL.to_string()),
                    custom_id: Some("mainnet".to_string()),
                },
                resolved: None,
            },
            active_network: ActiveNetwork::TestNet,
        }
    }
}

impl WalletConfiguration {
    fn active_entry(&self) -> &NetworkEntry {
        match self.active_network {
            ActiveNetwork::TestNet => &self.test_net,
        }
    }

    /// The configuration usable right now, or `None` while the persisted
    /// resolution does not match the current declaration.
    pub fn effective(&self) -> Option<EffectiveConfig> {
        let entry = self.active_entry();
        entry.valid_resolution().map(|resolved| EffectiveConfig {
            network_name: entry.network_name().to_string(),
            config_text: resolved.text.clone(),
            active_network: self.active_network,
        })
    }

    /// The declared source for the active network, ignoring resolution
    /// state entirely.
    pub fn effective_source(&self) -> EffectiveSource {
        let entry = self.active_entry();
        EffectiveSource {
            network_name: entry.network_name().to_string(),
            source: entry.declaration.source.clone(),
        }
    }

    /// Declaration-only projection, for consumers that track intent
    /// changes and do not care about resolution state.
    pub fn declarations(&self) -> DeclarationSet {
        DeclarationSet {
            test_net: self.test_net.declaration.clone(),
            active_network: self.active_network,
        }
    }
}

/// The configuration usable right now. Derived, never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub network_name: String,
    pub config_text: String,
    pub active_network: ActiveNetwork,
}

/// The declared source for the active network. Derived, never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectiveSource {
    pub network_name: String,
    pub source: ConfigSource,
}

/// All declarations plus the active network, with resolution state erased.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclarationSet {
    pub test_net: NetworkDeclaration,
    pub active_network: ActiveNetwork,
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn configured(source: ConfigSource, resolved: Option<ResolvedConfig>) -> WalletConfiguration {
        WalletConfiguration {
            test_net: NetworkEntry {
                declaration: NetworkDeclaration {
                    source,
                    custom_id: None,
                },
                resolved,
            },
            active_network: ActiveNetwork::TestNet,
        }
    }

    #[test]
    fn default_configuration_shape() {
        let config = WalletConfiguration::default();
        assert_eq!(
            config.test_net.declaration.source,
            ConfigSource::Url(DEFAULT_CONFIG_URL.to_string())
        );
        assert_eq!(config.test_net.declaration.custom_id.as_deref(), Some("mainnet"));
        assert!(config.test_net.resolved.is_none());
        assert!(config.effective().is_none());
    }

    #[test]
    fn effective_requires_matching_source() {
        let source = ConfigSource::Url("https://example.org/cfg.json".into());
        let config = configured(
            source.clone(),
            Some(ResolvedConfig {
                source: source.clone(),
                text: "{}".into(),
            }),
        );

        let effective = config.effective().unwrap();
        assert_eq!(effective.config_text, "{}");
        assert_eq!(effective.network_name, "testnet2");
    }

    #[test]
    fn changing_declaration_invalidates_without_deleting() {
        let source = ConfigSource::Url("https://example.org/cfg.json".into());
        let mut config = configured(
            source.clone(),
            Some(ResolvedConfig {
                source,
                text: "{}".into(),
            }),
        );
        assert!(config.effective().is_some());

        config.test_net.declaration.source = ConfigSource::Inline("{\"a\":1}".into());

        // No longer effective, but the stale resolution is retained.
        assert!(config.effective().is_none());
        assert!(config.test_net.resolved.is_some());
    }

    #[test]
    fn effective_source_ignores_resolution_state() {
        let config = configured(ConfigSource::Inline("{}".into()), None);
        let source = config.effective_source();
        assert_eq!(source.source, ConfigSource::Inline("{}".into()));
        assert_eq!(source.network_name, "testnet2");
    }

    #[test]
    fn custom_id_overrides_network_name() {
        let mut config = configured(ConfigSource::Inline("{}".into()), None);
        config.test_net.declaration.custom_id = Some("sandbox".into());
        assert_eq!(config.effective_source().network_name, "sandbox");
    }

    #[test]
    fn declarations_projection_erases_resolution() {
        let source = ConfigSource::Url("https://example.org/cfg.json".into());
        let resolved = configured(
            source.clone(),
            Some(ResolvedConfig {
                source: source.clone(),
                text: "{}".into(),
            }),
        );
        let unresolved = configured(source, None);
        assert_eq!(resolved.declarations(), unresolved.declarations());
    }

    #[test]
    fn document_roundtrip() {
        let mut config = WalletConfiguration::default();
        config.test_net.resolved = Some(ResolvedConfig {
            source: config.test_net.declaration.source.clone(),
            text: "{\"liteservers\":[]}".into(),
        });
        let json = serde_json::to_vec(&config).unwrap();
        let decoded: WalletConfiguration = serde_json::from_slice(&json).unwrap();
        assert_eq!(decoded, config);
        assert_eq!(decoded.effective(), config.effective());
    }

    fn arb_source() -> impl Strategy<Value = ConfigSource> {
        prop_oneof![
            "[a-z]{1,12}".prop_map(|s| ConfigSource::Url(format!("https://{s}/cfg.json"))),
            "[ -~]{0,24}".prop_map(ConfigSource::Inline),
        ]
    }

    proptest! {
        // Effective is present exactly when the resolution was produced
        // for the declared source.
        #[test]
        fn effective_iff_sources_match(
            declared in arb_source(),
            resolved_for in arb_source(),
            text in "[ -~]{0,24}",
        ) {
            let config = configured(
                declared.clone(),
                Some(ResolvedConfig { source: resolved_for.clone(), text }),
            );
            prop_assert_eq!(config.effective().is_some(), declared == resolved_for);
        }
    }
}
