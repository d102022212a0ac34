//! Specialist - one instruction set bound to a fixed tool subset
//!
//! A specialist runs a bounded tool loop: ask the provider with tools
//! bound, execute whatever tool calls come back, append the results as tool
//! turns, and ask again. The loop ends on the first response without tool
//! calls or at the iteration cap. Tool failures are folded into the
//! transcript as text; only generation failures abort the run.

use crate::error::Result;
use opsmesh_llm::{
    CompletionRequest, LlmProvider, Message, ToolCompletionRequest,
};
use opsmesh_tools::ToolRegistry;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Iteration cap for the tool loop
const MAX_TOOL_ITERATIONS: usize = 5;

/// Static wiring of one specialist: who it is and what it may call
#[derive(Debug, Clone)]
pub struct SpecialistBinding {
    /// Producer tag for turns this specialist appends
    pub name: String,
    /// System instructions
    pub instructions: String,
    /// Names of the registry tools this specialist may call
    pub tools: Vec<String>,
}

impl SpecialistBinding {
    /// Create a binding
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        tools: Vec<&str>,
    ) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            tools: tools.into_iter().map(String::from).collect(),
        }
    }
}

/// A binding joined with its runtime collaborators
pub struct Specialist {
    binding: SpecialistBinding,
    provider: Arc<dyn LlmProvider>,
    registry: Arc<ToolRegistry>,
}

impl Specialist {
    /// Create a specialist
    #[must_use]
    pub fn new(
        binding: SpecialistBinding,
        provider: Arc<dyn LlmProvider>,
        registry: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            binding,
            provider,
            registry,
        }
    }

    /// The producer tag of this specialist
    #[must_use]
    pub fn name(&self) -> &str {
        &self.binding.name
    }

    /// Answer one question, running the bounded tool loop.
    ///
    /// # Errors
    /// Returns an error when the provider fails or when the binding names
    /// a tool that is not registered.
    #[instrument(skip(self, question), fields(specialist = %self.binding.name))]
    pub async fn run(&self, question: &str) -> Result<String> {
        let tool_names: Vec<&str> = self.binding.tools.iter().map(String::as_str).collect();
        let tool_defs = self.registry.llm_definitions(&tool_names)?;

        let mut messages = vec![
            Message::system(self.binding.instructions.clone()),
            Message::user(question),
        ];
        let mut last_content = String::new();

        for iteration in 0..MAX_TOOL_ITERATIONS {
            let request = ToolCompletionRequest::new(
                CompletionRequest::new().with_messages(messages.clone()),
                tool_defs.clone(),
            );
            let response = self.provider.complete_with_tools(request).await?;

            if let Some(content) = &response.content {
                last_content = content.clone();
            }

            if !response.has_tool_calls() {
                debug!(iteration, "Specialist finished without tool calls");
                return Ok(last_content);
            }

            // The assistant turn must declare the calls so the tool turns
            // that follow resolve against their ids.
            messages.push(Message::assistant_with_tool_calls(
                response.content.clone().unwrap_or_default(),
                response.tool_calls.clone(),
            ));

            for call in &response.tool_calls {
                let output = match self.registry.get(&call.name) {
                    Some(tool) => {
                        let input: serde_json::Value = serde_json::from_str(&call.arguments)
                            .unwrap_or(serde_json::Value::Null);
                        match tool.execute(input).await {
                            Ok(result) => {
                                if !result.success {
                                    warn!(tool = %call.name, "Tool reported failure");
                                }
                                result.output
                            }
                            Err(e) => format!("Tool {} failed: {e}", call.name),
                        }
                    }
                    None => format!("Tool {} is not available", call.name),
                };
                debug!(tool = %call.name, iteration, "Executed tool call");
                messages.push(Message::tool_response(call.id.clone(), output).with_name(&call.name));
            }
        }

        warn!(
            specialist = %self.binding.name,
            cap = MAX_TOOL_ITERATIONS,
            "Tool loop hit the iteration cap"
        );
        Ok(last_content)
    }
}
