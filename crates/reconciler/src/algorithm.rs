use core_types::audit::AuditOutcome;
use core_types::{AuditEntry, DeploymentStatus, EntityId, HealthStatus, ReleaseStatus};
use orchestrator_client::{NetworkSpec, WorkloadSpec};
use tracing::{info, warn};

use crate::context::ReconcilerContext;
use crate::error::{ReconcileError, ReconcileResult};

/// System-injected env-vars always present on the workload (§4.E step 3).
fn system_env(service_name: &str, project_slug: &str, release_version: &str, deployment_id: EntityId, port: u16) -> Vec<(String, String)> {
    vec![
        ("SERVICE_NAME".to_string(), service_name.to_string()),
        ("PROJECT_SLUG".to_string(), project_slug.to_string()),
        ("RELEASE_VERSION".to_string(), release_version.to_string()),
        ("DEPLOYMENT_ID".to_string(), deployment_id.to_string()),
        ("PORT".to_string(), port.to_string()),
    ]
}

/// Runs the full per-deployment reconciliation algorithm (§4.E steps 1-7).
/// Returns `Ok(())` once the step has been applied and observed; callers
/// decide retry/backoff based on the returned error's retryability.
pub async fn reconcile_deployment(ctx: &ReconcilerContext, deployment_id: EntityId) -> ReconcileResult<()> {
    // 1. Load deployment, its release, its service, its environment.
    let deployment = ctx
        .repos
        .deployments
        .get_by_id(deployment_id)
        .await?
        .ok_or(ReconcileError::DeploymentNotFound(deployment_id))?;

    let release = ctx
        .repos
        .releases
        .get_by_id(deployment.release_id)
        .await?
        .ok_or(ReconcileError::DeploymentNotFound(deployment_id))?;

    let service = ctx
        .repos
        .services
        .get_by_id(deployment.service_id)
        .await?
        .ok_or(ReconcileError::DeploymentNotFound(deployment_id))?;

    let environment = ctx
        .repos
        .environments
        .get_by_id(deployment.environment_id)
        .await?
        .ok_or(ReconcileError::DeploymentNotFound(deployment_id))?;

    // 2. Guard: if release.status != ready, leave deployment pending.
    if release.status != ReleaseStatus::Ready {
        return Ok(());
    }

    let image = release.image_uri.clone().ok_or(ReconcileError::DeploymentNotFound(deployment_id))?;

    // 3. Compute desired workload spec.
    let mut env = system_env(&service.name, &environment.name, &release.version, deployment.id, 8080);
    let user_vars = ctx
        .repos
        .env_vars
        .list_for_service(service.id, Some(environment.id))
        .await?;
    let unscoped_vars = ctx.repos.env_vars.list_for_service(service.id, None).await?;
    for var in unscoped_vars.into_iter().chain(user_vars) {
        env.push((var.key, var.value));
    }

    let workload = WorkloadSpec {
        name: service.name.clone(),
        image,
        replicas: deployment.desired_replicas,
        port: 8080,
        env,
        labels: Default::default(),
    };

    // 4. Compute desired network spec (custom domains out of this core's
    // scope beyond the contract — see orchestrator-client::kube_client).
    let network = NetworkSpec {
        name: service.name.clone(),
        internal_port: 8080,
        external_domains: vec![],
    };

    // 5. Apply via Orchestrator Client idempotently.
    ctx.orchestrator.ensure_namespace(&environment.namespace, &[]).await?;
    let apply_result = ctx.orchestrator.apply_workload(&environment.namespace, &workload).await;
    if let Err(e) = apply_result {
        return Err(handle_apply_error(ctx, &deployment, e).await);
    }
    let _ = ctx.orchestrator.apply_network(&environment.namespace, &network).await;

    // 6. Observe and update deployment.
    let observed = ctx.orchestrator.observe(&environment.namespace, &service.name).await?;
    let health = core_types::deployment::ObservedHealth::from_counts(observed.ready_replicas, observed.desired_replicas);
    let status = if matches!(health.status, HealthStatus::Healthy) {
        DeploymentStatus::Running
    } else {
        DeploymentStatus::Pending
    };
    ctx.repos
        .deployments
        .update_status(deployment.id, status, health.status, None)
        .await?;

    // 7. Mirror onto the service's denormalized health.
    ctx.repos
        .services
        .update_health(
            service.id,
            core_types::service::HealthSnapshot {
                status: health.status,
                ready_replicas: health.ready_replicas,
                desired_replicas: health.desired_replicas,
                namespace: Some(environment.namespace.clone()),
            },
        )
        .await?;

    ctx.audit.record(AuditEntry::new(
        "reconciler",
        "reconciled",
        "deployment",
        deployment.id.to_string(),
        service.name.clone(),
        AuditOutcome::Success,
    ));

    info!(deployment_id = %deployment.id, status = ?health.status, "reconciliation step applied");
    Ok(())
}

/// §4.E "Retry & backoff": irrecoverable errors (invalid spec, quota) mark
/// the deployment failed and do not retry automatically; transient errors
/// propagate so the caller re-enqueues with backoff.
async fn handle_apply_error(
    ctx: &ReconcilerContext,
    deployment: &core_types::Deployment,
    err: orchestrator_client::OrchestratorError,
) -> ReconcileError {
    if !err.is_retryable() {
        warn!(deployment_id = %deployment.id, error = %err, "irrecoverable reconciliation failure");
        let _ = ctx
            .repos
            .deployments
            .update_status(deployment.id, DeploymentStatus::Failed, HealthStatus::Unhealthy, Some(err.to_string()))
            .await;
        ctx.audit.record(AuditEntry::new(
            "reconciler",
            "reconcile_failed",
            "deployment",
            deployment.id.to_string(),
            deployment.id.to_string(),
            AuditOutcome::Failure,
        ));
    }
    ReconcileError::Orchestrator(err)
}
