use crate::error::PaymentError;
use crate::gateways::{GatewayType, PaymentGateway};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Gateways keyed by provider. Filled once at start-up, read-only afterwards.
#[derive(Default)]
pub struct GatewayRegistry {
    gateways: RwLock<HashMap<GatewayType, Arc<dyn PaymentGateway>>>,
}

impl GatewayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        gateway_type: GatewayType,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Result<(), PaymentError> {
        // check and insert under one write guard
        let mut gateways = self.gateways.write().unwrap_or_else(PoisonError::into_inner);
        if gateways.contains_key(&gateway_type) {
            return Err(PaymentError::GatewayAlreadyRegistered(gateway_type));
        }
        gateways.insert(gateway_type, gateway);
        Ok(())
    }

    pub fn get(&self, gateway_type: GatewayType) -> Result<Arc<dyn PaymentGateway>, PaymentError> {
        self.gateways
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&gateway_type)
            .cloned()
            .ok_or_else(|| PaymentError::InvalidGateway(gateway_type.to_string()))
    }

    pub fn get_by_name(&self, name: &str) -> Result<Arc<dyn PaymentGateway>, PaymentError> {
        let gateway_type = name
            .parse::<GatewayType>()
            .map_err(|e| PaymentError::InvalidGateway(e.0))?;
        self.get(gateway_type)
    }

    pub fn providers(&self) -> Vec<GatewayType> {
        let mut out: Vec<GatewayType> = self
            .gateways
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        out.sort_by_key(|g| g.as_str());
        out
    }
}
