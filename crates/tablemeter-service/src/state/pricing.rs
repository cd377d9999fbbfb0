//! # Pricing State
//!
//! The live per-minute rate. Read at the moment a visit is billed or
//! projected; finished visits keep the cost they were billed with.

use std::sync::{Arc, RwLock};

use tablemeter_core::PricePerMinute;

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Default)]
pub struct PricingState {
    rate: Arc<RwLock<PricePerMinute>>,
}

impl PricingState {
    pub fn new(rate: PricePerMinute) -> Self {
        PricingState {
            rate: Arc::new(RwLock::new(rate)),
        }
    }

    pub fn get(&self) -> ServiceResult<PricePerMinute> {
        self.rate
            .read()
            .map(|rate| *rate)
            .map_err(|_| ServiceError::StatePoisoned("pricing"))
    }

    /// Replaces the rate and returns the previous one.
    pub fn set(&self, rate: PricePerMinute) -> ServiceResult<PricePerMinute> {
        let mut current = self
            .rate
            .write()
            .map_err(|_| ServiceError::StatePoisoned("pricing"))?;
        Ok(std::mem::replace(&mut *current, rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_returns_previous_rate() {
        let pricing = PricingState::default();
        let new_rate = PricePerMinute::from_cents(800).unwrap();

        assert_eq!(pricing.set(new_rate).unwrap(), PricePerMinute::default());
        assert_eq!(pricing.get().unwrap(), new_rate);
    }
}
