use super::persona::AgentPersona;

/// Personas taking part in every conversation, in speaking order
#[derive(Debug, Clone)]
pub struct AgentRoster {
    personas: Vec<AgentPersona>,
}

impl AgentRoster {
    pub fn new(personas: Vec<AgentPersona>) -> Self {
        Self { personas }
    }

    /// Round-robin speaker selection
    pub fn speaker_for(&self, round: usize) -> Option<&AgentPersona> {
        if self.personas.is_empty() {
            return None;
        }
        self.personas.get(round % self.personas.len())
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&AgentPersona> {
        self.personas.iter().find(|p| p.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentPersona> {
        self.personas.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.personas.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}
