use std::collections::HashSet;
use tracing::info;
use anyhow::Result;

use crate::agent::agents::{AgentPersona, AgentRoster, TerminationPredicate};
use crate::config_manager::agent::AgentConfig;

/// Factory for building the persona roster
pub struct AgentFactory;

impl AgentFactory {
    /// Build the roster from the agent configuration.
    ///
    /// Each persona terminates on its own marker if it sets one, otherwise on
    /// the roster-wide `termination_marker`.
    pub fn create_roster(config: &AgentConfig) -> Result<AgentRoster> {
        let mut seen = HashSet::new();
        let mut personas = Vec::with_capacity(config.personas.len());

        for persona in &config.personas {
            let name = persona.name.trim();
            if name.is_empty() {
                return Err(anyhow::anyhow!("Persona name must not be empty"));
            }
            if !seen.insert(name.to_string()) {
                return Err(anyhow::anyhow!("Duplicate persona name: {}", name));
            }
            if persona.instructions.trim().is_empty() {
                return Err(anyhow::anyhow!("Persona {} has no instructions", name));
            }

            let marker = persona
                .termination_marker
                .as_deref()
                .unwrap_or(&config.termination_marker)
                .trim();
            let termination = if marker.is_empty() {
                TerminationPredicate::Never
            } else {
                TerminationPredicate::ContainsMarker(marker.to_string())
            };

            info!("Initializing agent: {}", name);
            personas.push(AgentPersona::new(
                name,
                persona.description.clone(),
                persona.instructions.clone(),
                termination,
            ));
        }

        if personas.is_empty() {
            return Err(anyhow::anyhow!("Agent roster is empty"));
        }
        Ok(AgentRoster::new(personas))
    }
}
