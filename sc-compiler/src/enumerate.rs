//! Fixes the order in which scrape resources are compiled.
use sc_api::{
    ScrapeKind,
    ScrapeResource,
};

/// The already-selected candidates of every kind, as returned by the lister.
#[derive(Clone, Debug, Default)]
pub struct ScrapeLists {
    pub service: Vec<ScrapeResource>,
    pub pod: Vec<ScrapeResource>,
    pub probe: Vec<ScrapeResource>,
    pub node: Vec<ScrapeResource>,
    pub static_scrape: Vec<ScrapeResource>,
}

impl ScrapeLists {
    pub fn len(&self) -> usize {
        self.service.len() + self.pod.len() + self.probe.len() + self.node.len() + self.static_scrape.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Buckets resources by their kind.
impl FromIterator<ScrapeResource> for ScrapeLists {
    fn from_iter<I: IntoIterator<Item = ScrapeResource>>(iter: I) -> Self {
        let mut lists = Self::default();
        for resource in iter {
            match resource.kind() {
                ScrapeKind::Service => lists.service.push(resource),
                ScrapeKind::Pod => lists.pod.push(resource),
                ScrapeKind::Probe => lists.probe.push(resource),
                ScrapeKind::Node => lists.node.push(resource),
                ScrapeKind::Static => lists.static_scrape.push(resource),
            }
        }
        lists
    }
}

/// Flatten the lists into compilation order: service, pod, probe, node, static, then namespace
/// and name within each kind.
pub fn enumerate(lists: ScrapeLists) -> Vec<ScrapeResource> {
    let mut resources: Vec<_> = [lists.service, lists.pod, lists.probe, lists.node, lists.static_scrape]
        .into_iter()
        .flatten()
        .collect();
    resources.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    resources
}
