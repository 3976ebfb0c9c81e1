//! Per-agent resource quantities.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resource requirements keyed by resource name.
pub type ResourceMap = BTreeMap<String, f64>;

/// Resource name to available quantity.
///
/// Reservations are all-or-nothing: either every requested quantity is
/// taken or the pool is left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourcePool {
    quantities: ResourceMap,
}

impl ResourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, quantity: f64) -> Self {
        self.quantities.insert(name.into(), quantity);
        self
    }

    pub fn available(&self, name: &str) -> f64 {
        self.quantities.get(name).copied().unwrap_or(0.0)
    }

    /// Returns the first shortage, if any.
    pub fn check(&self, required: &ResourceMap) -> Result<(), DomainError> {
        for (name, &amount) in required {
            let available = self.available(name);
            if available < amount {
                return Err(DomainError::InsufficientResource {
                    resource: name.clone(),
                    required: amount,
                    available,
                });
            }
        }
        Ok(())
    }

    pub fn has_sufficient(&self, required: &ResourceMap) -> bool {
        self.check(required).is_ok()
    }

    /// Take `required` from the pool, or nothing at all.
    pub fn try_reserve(&mut self, required: &ResourceMap) -> Result<(), DomainError> {
        self.check(required)?;
        for (name, &amount) in required {
            if let Some(quantity) = self.quantities.get_mut(name) {
                *quantity -= amount;
            }
        }
        Ok(())
    }

    /// Give back a reservation.
    pub fn release(&mut self, reserved: &ResourceMap) {
        for (name, &amount) in reserved {
            *self.quantities.entry(name.clone()).or_insert(0.0) += amount;
        }
    }

    pub fn as_map(&self) -> &ResourceMap {
        &self.quantities
    }
}

impl From<ResourceMap> for ResourcePool {
    fn from(quantities: ResourceMap) -> Self {
        Self { quantities }
    }
}

/// True when two requirement maps name at least one common resource.
pub fn overlaps(a: &ResourceMap, b: &ResourceMap) -> bool {
    a.keys().any(|k| b.contains_key(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn needs(pairs: &[(&str, f64)]) -> ResourceMap {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_reserve_and_release() {
        let mut pool = ResourcePool::new().with("energy", 10.0).with("arm", 1.0);
        pool.try_reserve(&needs(&[("energy", 4.0), ("arm", 1.0)]))
            .unwrap();
        assert_eq!(pool.available("energy"), 6.0);
        assert_eq!(pool.available("arm"), 0.0);

        pool.release(&needs(&[("arm", 1.0)]));
        assert_eq!(pool.available("arm"), 1.0);
    }

    #[test]
    fn test_reserve_is_all_or_nothing() {
        let mut pool = ResourcePool::new().with("energy", 10.0).with("arm", 0.0);
        let err = pool
            .try_reserve(&needs(&[("energy", 4.0), ("arm", 1.0)]))
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::InsufficientResource { ref resource, .. } if resource == "arm"
        ));
        assert_eq!(pool.available("energy"), 10.0);
    }

    #[test]
    fn test_unknown_resource_is_unavailable() {
        let pool = ResourcePool::new();
        assert!(pool.has_sufficient(&ResourceMap::new()));
        assert!(!pool.has_sufficient(&needs(&[("gpu", 1.0)])));
    }

    #[test]
    fn test_overlaps() {
        assert!(overlaps(&needs(&[("a", 1.0), ("b", 1.0)]), &needs(&[("b", 5.0)])));
        assert!(!overlaps(&needs(&[("a", 1.0)]), &needs(&[("b", 1.0)])));
        assert!(!overlaps(&ResourceMap::new(), &ResourceMap::new()));
    }
}
