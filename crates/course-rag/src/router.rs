use tracing::{info, warn};

/// Which class of model a request is sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingDecision {
    /// Certified for structured tool calls; used whenever tools are declared
    ToolCapableModel,
    /// Open-ended reasoning; used for everything else
    ReasoningModel,
}

/// Picks a model identity for each provider call.
///
/// The tool-capable model is used only when the call declares at least one
/// tool. An empty tool list counts as none.
#[derive(Debug, Clone)]
pub struct ModelRouter {
    reasoning_model: String,
    tool_model: String,
}

impl ModelRouter {
    pub fn new<R, T>(reasoning_model: R, tool_model: T) -> Self
    where
        R: Into<String>,
        T: Into<String>,
    {
        let router = Self {
            reasoning_model: reasoning_model.into(),
            tool_model: tool_model.into(),
        };
        if router.reasoning_model == router.tool_model {
            warn!(
                model = %router.tool_model,
                "reasoning and tool models are identical, routing has no effect"
            );
        }
        router
    }

    pub fn decide(has_tools: bool) -> RoutingDecision {
        if has_tools {
            RoutingDecision::ToolCapableModel
        } else {
            RoutingDecision::ReasoningModel
        }
    }

    pub fn model_for(&self, decision: RoutingDecision) -> &str {
        match decision {
            RoutingDecision::ToolCapableModel => &self.tool_model,
            RoutingDecision::ReasoningModel => &self.reasoning_model,
        }
    }

    /// Model identity for a call that does (or does not) declare tools
    pub fn route(&self, has_tools: bool) -> &str {
        let decision = Self::decide(has_tools);
        let model = self.model_for(decision);
        info!(?decision, model, "routing generation request");
        model
    }

    pub fn reasoning_model(&self) -> &str {
        &self.reasoning_model
    }

    pub fn tool_model(&self) -> &str {
        &self.tool_model
    }
}
