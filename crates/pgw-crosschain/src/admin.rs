//! Operator writes: validated upserts and deletes of route policies and
//! bridge configs. Nothing reaches a store without passing the validator.

use pgw_core::{BridgeConfig, BridgeType, RoutePair, RoutePolicy};

use crate::engine::Registries;
use crate::error::CrosschainError;
use crate::resolver::ChainResolver;
use crate::validator::{BridgeConfigInput, BridgeConfigValidator, RoutePolicyInput};

#[derive(Clone)]
pub struct ConfigAdmin {
    registries: Registries,
    resolver: ChainResolver,
    validator: BridgeConfigValidator,
}

impl ConfigAdmin {
    pub fn new(registries: Registries, validator: BridgeConfigValidator) -> Self {
        Self {
            resolver: ChainResolver::new(registries.chains.clone()),
            registries,
            validator,
        }
    }

    /// Validate and store a policy. Re-submitting for the same route replaces
    /// the policy in place and keeps its id.
    pub fn upsert_route_policy(&self, input: &RoutePolicyInput) -> Result<RoutePolicy, CrosschainError> {
        let policy = self.validator.validate_route_policy(input)?;
        let stored = self.registries.policies.upsert(policy)?;
        tracing::info!(route = %stored.route, default = %stored.default_bridge_type, "route policy stored");
        Ok(stored)
    }

    pub fn delete_route_policy(&self, source: &str, dest: &str) -> Result<RoutePolicy, CrosschainError> {
        let route = self.route(source, dest)?;
        let policy = self
            .registries
            .policies
            .get_by_route(&route)?
            .ok_or_else(|| CrosschainError::NotFound {
                entity: "route policy",
                key: route.to_string(),
            })?;
        let removed = self.registries.policies.delete(&policy.id)?;
        tracing::info!(route = %route, "route policy deleted");
        Ok(removed)
    }

    /// Validate and store a config, keyed by route and protocol.
    pub fn upsert_bridge_config(
        &self,
        protocol: BridgeType,
        input: &BridgeConfigInput,
    ) -> Result<BridgeConfig, CrosschainError> {
        let config = self.validator.validate_bridge_config(protocol, input)?;
        let stored = self.registries.bridge_configs.upsert(config)?;
        tracing::info!(route = %stored.route, bridge = %protocol, active = stored.is_active, "bridge config stored");
        Ok(stored)
    }

    pub fn delete_bridge_config(
        &self,
        source: &str,
        dest: &str,
        protocol: BridgeType,
    ) -> Result<BridgeConfig, CrosschainError> {
        let route = self.route(source, dest)?;
        let config = self
            .registries
            .bridge_configs
            .get_for_route(&route, protocol)?
            .ok_or_else(|| CrosschainError::NotFound {
                entity: "bridge config",
                key: format!("{route}/{protocol}"),
            })?;
        let removed = self.registries.bridge_configs.delete(&config.id)?;
        tracing::info!(route = %route, bridge = %protocol, "bridge config deleted");
        Ok(removed)
    }

    fn route(&self, source: &str, dest: &str) -> Result<RoutePair, CrosschainError> {
        let source = self.resolver.resolve(source)?;
        let dest = self.resolver.resolve(dest)?;
        Ok(RoutePair::new(source.id, dest.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Fixture;
    use crate::validator::NumericInput;

    fn admin(fx: &Fixture) -> ConfigAdmin {
        let registries = fx.registries();
        let validator = BridgeConfigValidator::new(ChainResolver::new(registries.chains.clone()));
        ConfigAdmin::new(registries, validator)
    }

    fn policy(default: &str) -> RoutePolicyInput {
        RoutePolicyInput {
            source_chain_id: "eip155:8453".into(),
            dest_chain_id: "eip155:42161".into(),
            default_bridge_type: Some(default.into()),
            ..Default::default()
        }
    }

    #[test]
    fn upsert_is_idempotent_by_route() {
        let fx = Fixture::new();
        let admin = admin(&fx);
        let first = admin.upsert_route_policy(&policy("CCIP")).unwrap();
        let second = admin.upsert_route_policy(&policy("LAYERZERO")).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.default_bridge_type, BridgeType::LayerZero);
        assert_eq!(fx.registries().policies.list().unwrap().len(), 1);
    }

    #[test]
    fn invalid_policy_is_not_stored() {
        let fx = Fixture::new();
        assert!(admin(&fx).upsert_route_policy(&policy("wormhole")).is_err());
        assert!(fx.registries().policies.list().unwrap().is_empty());
    }

    #[test]
    fn delete_policy_by_any_identifier_form() {
        let fx = Fixture::ready();
        let admin = admin(&fx);
        admin.delete_route_policy("8453", "eip155:42161").unwrap();
        assert!(matches!(
            admin.delete_route_policy("8453", "42161"),
            Err(CrosschainError::NotFound { entity: "route policy", .. })
        ));
    }

    #[test]
    fn bridge_config_upsert_and_delete() {
        let fx = Fixture::new();
        let admin = admin(&fx);
        let input = BridgeConfigInput {
            source_chain_id: "8453".into(),
            dest_chain_id: "42161".into(),
            chain_selector: Some(NumericInput::Number(4949039107694359620)),
            destination_adapter: Some("0x00000000000000000000000000000000000000c1".into()),
            ..Default::default()
        };
        let stored = admin.upsert_bridge_config(BridgeType::Ccip, &input).unwrap();
        assert_eq!(stored.bridge_type(), BridgeType::Ccip);
        let removed = admin
            .delete_bridge_config("8453", "42161", BridgeType::Ccip)
            .unwrap();
        assert_eq!(removed.id, stored.id);
        assert!(matches!(
            admin.delete_bridge_config("8453", "42161", BridgeType::Ccip),
            Err(CrosschainError::NotFound { entity: "bridge config", .. })
        ));
    }
}
