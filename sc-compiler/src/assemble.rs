//! The top-level document handed to the agent.
use sc_core::k8s::namespaced_name;
use sc_core::prelude::*;

use crate::config::CompilerConfig;
use crate::job::CompiledJob;
use crate::yaml::MapSlice;

/// `global:` section of the document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalSection {
    pub scrape_interval: String,
    pub external_label_name: String,
    pub external_label_value: String,
}

impl GlobalSection {
    pub fn new(config: &CompilerConfig, agent: &AgentRef) -> Self {
        Self {
            scrape_interval: config.scrape_interval.clone(),
            external_label_name: config.external_label_name.clone(),
            external_label_value: namespaced_name(&agent.namespace, &agent.name),
        }
    }

    fn render(&self) -> MapSlice {
        MapSlice::new()
            .with("scrape_interval", &self.scrape_interval)
            .with("external_labels", MapSlice::new().with(&self.external_label_name, &self.external_label_value))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledDocument {
    pub global: GlobalSection,
    pub jobs: Vec<CompiledJob>,
}

impl CompiledDocument {
    pub fn to_map_slice(&self) -> MapSlice {
        let jobs: Vec<MapSlice> = self.jobs.iter().map(CompiledJob::to_map_slice).collect();
        MapSlice::new().with("global", self.global.render()).with("scrape_configs", jobs)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.to_map_slice())
    }
}
