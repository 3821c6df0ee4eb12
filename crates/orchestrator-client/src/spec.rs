use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Desired workload spec (§4.E step 3): image plus the ordered union of
/// system-injected and user env-vars.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadSpec {
    pub name: String,
    pub image: String,
    pub replicas: u32,
    pub port: u16,
    /// Ordered so that precedence (system vars first, user overrides after)
    /// is reproducible; a `BTreeMap` would silently reorder on collision.
    pub env: Vec<(String, String)>,
    pub labels: BTreeMap<String, String>,
}

/// Desired network spec (§4.E step 4): one internal address, plus one
/// externally-routable address per custom domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub name: String,
    pub internal_port: u16,
    pub external_domains: Vec<ExternalDomain>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalDomain {
    pub hostname: String,
    pub tls: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ObservedHealth {
    pub ready_replicas: u32,
    pub desired_replicas: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResourceMetrics {
    pub memory_gb_hours: f64,
    pub cpu_core_hours: f64,
}
