//! Usage Aggregation (component H, §4.H): per-billing-period compute,
//! build-minute, storage and bandwidth usage per service, with overage
//! cost rounded to 2 decimals. Grounded on the teacher's
//! `cost::tracking::CostTracker`: a read-side aggregator over persisted
//! records rather than its own store.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod period;
pub mod pricing;

pub use error::{UsageError, UsageResult};
pub use period::BillingPeriod;
pub use pricing::UsagePricing;

use chrono::{DateTime, Utc};
use core_types::EntityId;
use orchestrator_client::OrchestratorClient;
use repository::InMemoryRepositories;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct UsageReport {
    pub compute_gb_hours: f64,
    pub build_minutes: f64,
    pub storage_gb: f64,
    pub bandwidth_gb: f64,
    pub compute_overage_cost: f64,
    pub build_overage_cost: f64,
    pub storage_overage_cost: f64,
    pub bandwidth_overage_cost: f64,
    pub total_overage_cost: f64,
    /// True when `OrchestratorClient::metrics` reported unavailable and
    /// compute usage fell back to the service-count heuristic.
    pub used_heuristic: bool,
}

pub struct UsageAggregator {
    repos: InMemoryRepositories,
    orchestrator: Arc<dyn OrchestratorClient>,
    pricing: UsagePricing,
}

impl UsageAggregator {
    #[must_use]
    pub fn new(repos: InMemoryRepositories, orchestrator: Arc<dyn OrchestratorClient>, pricing: UsagePricing) -> Self {
        Self { repos, orchestrator, pricing }
    }

    /// Usage for one service within `period`, observed as of `now` (pass
    /// the real current time at call sites; injectable here so tests don't
    /// depend on wall-clock).
    pub async fn service_usage(
        &self,
        service_id: EntityId,
        environment_id: EntityId,
        period: BillingPeriod,
        now: DateTime<Utc>,
    ) -> UsageResult<UsageReport> {
        let service = self.repos.services.get_by_id(service_id).await?.ok_or(UsageError::ServiceNotFound(service_id))?;
        let environment = self.repos.environments.get_by_id(environment_id).await?.ok_or(UsageError::EnvironmentNotFound(environment_id))?;

        let elapsed_hours = period.elapsed_hours(now);

        let (compute_gb_hours, used_heuristic) = match self.orchestrator.metrics(&environment.namespace, &service.name).await {
            Ok(Some(metrics)) => (metrics.memory_gb_hours, false),
            Ok(None) | Err(_) => {
                debug!(%service_id, "metrics unavailable, falling back to service-count heuristic");
                (self.pricing.heuristic_memory_gb_per_service * elapsed_hours, true)
            }
        };

        let releases = self.repos.releases.list_by_service(service_id).await?;
        let release_count_in_period = releases.iter().filter(|r| period.contains(r.created_at)).count();
        let build_minutes = release_count_in_period as f64 * self.pricing.estimated_minutes_per_build;

        let storage_gb = self.pricing.estimated_storage_gb_per_service;
        let bandwidth_gb = self.pricing.estimated_bandwidth_gb_per_service;

        let compute_overage_cost = pricing::overage_cost(compute_gb_hours, self.pricing.included_compute_gb_hours, self.pricing.compute_gb_hour_price);
        let build_overage_cost = pricing::overage_cost(build_minutes, self.pricing.included_build_minutes, self.pricing.build_minute_price);
        let storage_overage_cost = pricing::overage_cost(storage_gb, self.pricing.included_storage_gb, self.pricing.storage_gb_price);
        let bandwidth_overage_cost = pricing::overage_cost(bandwidth_gb, self.pricing.included_bandwidth_gb, self.pricing.bandwidth_gb_price);

        let total_overage_cost = pricing::round2(compute_overage_cost + build_overage_cost + storage_overage_cost + bandwidth_overage_cost);

        Ok(UsageReport {
            compute_gb_hours: pricing::round2(compute_gb_hours),
            build_minutes: pricing::round2(build_minutes),
            storage_gb: pricing::round2(storage_gb),
            bandwidth_gb: pricing::round2(bandwidth_gb),
            compute_overage_cost,
            build_overage_cost,
            storage_overage_cost,
            bandwidth_overage_cost,
            total_overage_cost,
            used_heuristic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_types::{Environment, Project, Release, Service};
    use orchestrator_client::fake::FakeOrchestratorClient;

    async fn setup() -> (Arc<UsageAggregator>, EntityId, EntityId) {
        let repos = InMemoryRepositories::new();
        let project = repos.projects.create(Project::new("demo", "demo")).await.unwrap();
        let service = repos
            .services
            .create(Service {
                id: EntityId::new(),
                project_id: project.id,
                name: "api".to_string(),
                repository_url: "git@github.com:acme/api.git".to_string(),
                app_path: None,
                watch_paths: vec![],
                build_config: core_types::service::BuildConfig::Dockerfile { dockerfile_path: "Dockerfile".to_string() },
                auto_deploy: core_types::service::AutoDeployConfig::default(),
                health: core_types::service::HealthSnapshot::default(),
            })
            .await
            .unwrap();
        let environment = repos
            .environments
            .create(Environment { id: EntityId::new(), project_id: project.id, name: "production".to_string(), namespace: "enclii-production".to_string() })
            .await
            .unwrap();

        let orchestrator: Arc<dyn OrchestratorClient> = Arc::new(FakeOrchestratorClient::new());
        let aggregator = Arc::new(UsageAggregator::new(repos, orchestrator, UsagePricing::default()));
        (aggregator, service.id, environment.id)
    }

    #[tokio::test]
    async fn falls_back_to_heuristic_when_metrics_unavailable() {
        let (aggregator, service_id, environment_id) = setup().await;
        let period = BillingPeriod::for_month(2026, 7);
        let now = Utc.with_ymd_and_hms(2026, 7, 11, 0, 0, 0).unwrap();

        let report = aggregator.service_usage(service_id, environment_id, period, now).await.unwrap();
        assert!(report.used_heuristic);
        assert!(report.compute_gb_hours > 0.0);
    }

    #[tokio::test]
    async fn build_minutes_counts_only_releases_within_the_period() {
        let (aggregator, service_id, environment_id) = setup().await;
        let repos = &aggregator.repos;

        let mut in_period = Release::new_building(service_id, "abcdef1234567890", "v1");
        in_period.created_at = Utc.with_ymd_and_hms(2026, 7, 5, 0, 0, 0).unwrap();
        repos.releases.create(in_period).await.unwrap();

        let mut out_of_period = Release::new_building(service_id, "0123456789abcdef", "v2");
        out_of_period.created_at = Utc.with_ymd_and_hms(2026, 6, 5, 0, 0, 0).unwrap();
        repos.releases.create(out_of_period).await.unwrap();

        let period = BillingPeriod::for_month(2026, 7);
        let now = Utc.with_ymd_and_hms(2026, 7, 11, 0, 0, 0).unwrap();
        let report = aggregator.service_usage(service_id, environment_id, period, now).await.unwrap();

        assert_eq!(report.build_minutes, 5.0);
    }

    #[tokio::test]
    async fn usage_within_allowances_has_zero_total_overage() {
        let (aggregator, service_id, environment_id) = setup().await;
        let period = BillingPeriod::for_month(2026, 7);
        let now = Utc.with_ymd_and_hms(2026, 7, 1, 1, 0, 0).unwrap();

        let report = aggregator.service_usage(service_id, environment_id, period, now).await.unwrap();
        assert_eq!(report.total_overage_cost, 0.0);
    }
}
