use crate::types::{AttributePath, Diagnostic, Dynamic};

#[derive(Debug, Clone)]
pub struct PlanModifyRequest {
    /// Prior state value of the attribute, null on create
    pub state: Dynamic,
    pub plan: Dynamic,
    pub config: Dynamic,
    pub attribute_path: AttributePath,
}

#[derive(Debug, Clone)]
pub struct PlanModifyResponse {
    pub plan_value: Dynamic,
    pub requires_replace: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl PlanModifyResponse {
    fn keep(plan_value: Dynamic) -> Self {
        Self {
            plan_value,
            requires_replace: false,
            diagnostics: Vec::new(),
        }
    }
}

/// Trait for modifying terraform plan behavior
///
/// Plan modifiers run after the framework has marked computed attributes as
/// unknown and can:
/// - Modify the planned value
/// - Mark an attribute as requiring replacement
/// - Add warnings or errors to the plan
pub trait PlanModifier: Send + Sync {
    fn description(&self) -> &str;

    fn modify_plan(&self, request: PlanModifyRequest) -> PlanModifyResponse;
}

/// Marks an attribute as requiring replacement when it changes
pub struct RequiresReplace;

impl PlanModifier for RequiresReplace {
    fn description(&self) -> &str {
        "changing this attribute forces a new resource"
    }

    fn modify_plan(&self, request: PlanModifyRequest) -> PlanModifyResponse {
        // Nothing to replace while creating, and unknown values may still match.
        let requires_replace = !request.state.is_null()
            && !request.plan.is_unknown()
            && request.state != request.plan;

        PlanModifyResponse {
            requires_replace,
            ..PlanModifyResponse::keep(request.plan)
        }
    }
}

/// Copies the prior state value into an unknown plan value
///
/// Used for computed attributes such as remote IDs that never change once
/// the object exists.
pub struct UseStateForUnknown;

impl PlanModifier for UseStateForUnknown {
    fn description(&self) -> &str {
        "once set, the value of this attribute in state will not change"
    }

    fn modify_plan(&self, request: PlanModifyRequest) -> PlanModifyResponse {
        if request.plan.is_unknown() && !request.state.is_null() {
            PlanModifyResponse::keep(request.state)
        } else {
            PlanModifyResponse::keep(request.plan)
        }
    }
}
