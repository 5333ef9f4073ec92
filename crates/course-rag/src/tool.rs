use async_trait::async_trait;
use serde_json::Value;

use crate::errors::AgentResult;

/// Executes tools on behalf of the generator.
///
/// Implementations should report failures as `Err` rather than panic; the
/// tool loop turns every error into the text of the tool result.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Run the named tool with already-parsed object arguments
    async fn execute_tool(&self, name: &str, arguments: Value) -> AgentResult<String>;
}

/// A tool executor that also owns the declarations of its tools
pub trait ToolRegistry: ToolExecutor {
    /// Declarations shaped for the active provider where feasible. The
    /// canonical `{name, description, input_schema}` shape works for both.
    fn tool_definitions(&self) -> Vec<Value>;
}
