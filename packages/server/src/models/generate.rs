use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::generator::GenerateReport;
use crate::publish::{PlanReport, PublishOutcome};

#[derive(Serialize, ToSchema)]
pub struct ReportEnvelope {
    pub report: GenerateReport,
}

#[derive(Deserialize, Default, ToSchema)]
pub struct PublishRequest {
    /// Skip the commit and push when the mirrored tree matches the branch.
    /// By default an empty commit is pushed.
    #[serde(default)]
    pub skip_if_unchanged: bool,
}

#[derive(Serialize, ToSchema)]
pub struct PublishEnvelope {
    pub publish: PublishOutcome,
}

#[derive(Serialize, ToSchema)]
pub struct PlanEnvelope {
    pub plan: PlanReport,
}
