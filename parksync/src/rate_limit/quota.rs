//! Static per-service quota table.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;

use crate::provider::Service;

/// One hour, the window every upstream service publishes its quota against.
pub const HOURLY: Duration = Duration::from_secs(60 * 60);

/// Request quota for a single service: at most `max_requests` per `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceQuota {
    pub max_requests: u32,
    #[serde(with = "duration_secs")]
    pub window: Duration,
}

impl ServiceQuota {
    pub const fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }

    /// Published default quota for a service.
    ///
    /// - Unsplash demo applications: 50 requests/hour
    /// - NPS developer keys: 1000 requests/hour
    /// - NASA api.nasa.gov keys: 1000 requests/hour
    pub const fn default_for(service: Service) -> Self {
        match service {
            Service::Unsplash => Self::new(50, HOURLY),
            Service::Nps => Self::new(1000, HOURLY),
            Service::Nasa => Self::new(1000, HOURLY),
        }
    }
}

/// Quota for every service, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaTable {
    quotas: HashMap<Service, ServiceQuota>,
}

impl Default for QuotaTable {
    fn default() -> Self {
        Self {
            quotas: Service::ALL
                .into_iter()
                .map(|s| (s, ServiceQuota::default_for(s)))
                .collect(),
        }
    }
}

impl QuotaTable {
    /// Use the same quota for every service.
    pub fn uniform(quota: ServiceQuota) -> Self {
        Self {
            quotas: Service::ALL.into_iter().map(|s| (s, quota)).collect(),
        }
    }

    /// Override the quota of one service.
    pub fn with_quota(mut self, service: Service, quota: ServiceQuota) -> Self {
        self.quotas.insert(service, quota);
        self
    }

    pub fn get(&self, service: Service) -> ServiceQuota {
        self.quotas
            .get(&service)
            .copied()
            .unwrap_or_else(|| ServiceQuota::default_for(service))
    }
}

pub(crate) mod duration_secs {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = QuotaTable::default();
        assert_eq!(table.get(Service::Unsplash), ServiceQuota::new(50, HOURLY));
        assert_eq!(table.get(Service::Nps).max_requests, 1000);
        assert_eq!(table.get(Service::Nasa).window, HOURLY);
    }

    #[test]
    fn test_override_one_service() {
        let quota = ServiceQuota::new(2, Duration::from_secs(1));
        let table = QuotaTable::default().with_quota(Service::Nasa, quota);
        assert_eq!(table.get(Service::Nasa), quota);
        assert_eq!(table.get(Service::Nps).max_requests, 1000);
    }

    #[test]
    fn test_uniform() {
        let quota = ServiceQuota::new(7, Duration::from_secs(3));
        let table = QuotaTable::uniform(quota);
        assert!(Service::ALL.iter().all(|&s| table.get(s) == quota));
    }
}
