use crate::container::{ContainerDescriptor, ContainerID, ExclusionRule};
use crate::docker;

/// One pending stats request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsRequest {
    label: String,
    id: ContainerID,
    path: String,
}

impl StatsRequest {
    pub fn new(container: &ContainerDescriptor) -> Self {
        Self {
            label: container.label().to_owned(),
            id: container.id().clone(),
            path: docker::stats_path(container.id()),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn id(&self) -> &ContainerID {
        &self.id
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// The ordered set of stats requests for one collection round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestBatch {
    requests: Vec<StatsRequest>,
}

impl RequestBatch {
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StatsRequest> {
        self.requests.iter()
    }
}

impl IntoIterator for RequestBatch {
    type Item = StatsRequest;
    type IntoIter = std::vec::IntoIter<StatsRequest>;

    fn into_iter(self) -> Self::IntoIter {
        self.requests.into_iter()
    }
}

impl<'a> IntoIterator for &'a RequestBatch {
    type Item = &'a StatsRequest;
    type IntoIter = std::slice::Iter<'a, StatsRequest>;

    fn into_iter(self) -> Self::IntoIter {
        self.requests.iter()
    }
}

/// Builds the stats batch for `containers`, skipping every container whose
/// trimmed name matches one of `exclusions`.
///
/// Input order is preserved.
pub fn build_batch(
    containers: &[ContainerDescriptor],
    exclusions: &[ExclusionRule],
) -> RequestBatch {
    let requests = containers
        .iter()
        .filter(|container| {
            let label = container.label();
            match exclusions.iter().find(|rule| rule.matches(label)) {
                Some(rule) => {
                    log::debug!(
                        "Skipping {} ({}): excluded by {}",
                        label,
                        container.id(),
                        rule
                    );
                    false
                }
                None => true,
            }
        })
        .map(StatsRequest::new)
        .collect();

    RequestBatch { requests }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, id: &str) -> ContainerDescriptor {
        ContainerDescriptor::new(name, ContainerID::new(id).unwrap())
    }

    #[test]
    fn test_build_batch_skips_excluded_names() {
        let containers = vec![
            descriptor("['/nova_api']", "abc123"),
            descriptor("['/nova_ssh']", "def456"),
        ];
        let exclusions = vec!["['/nova_ssh']".parse().unwrap()];

        let batch = build_batch(&containers, &exclusions);
        assert_eq!(batch.len(), 1);
        let request = batch.iter().next().unwrap();
        assert_eq!(request.label(), "['/nova_api']");
        assert_eq!(request.id().as_str(), "abc123");
        assert_eq!(request.path(), "/containers/abc123/stats?stream=false");
    }

    #[test]
    fn test_build_batch_trims_trailing_whitespace_before_matching() {
        let containers = vec![descriptor("['/nova_ssh']\n", "def456")];
        let exclusions = vec!["['/nova_ssh']".parse().unwrap()];

        assert!(build_batch(&containers, &exclusions).is_empty());
    }

    #[test]
    fn test_build_batch_without_exclusions_keeps_order() {
        let containers = vec![
            descriptor("['/c']", "c"),
            descriptor("['/a']", "a"),
            descriptor("['/b']", "b"),
        ];

        let batch = build_batch(&containers, &[]);
        let ids: Vec<&str> = batch.iter().map(|r| r.id().as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_build_batch_with_pattern_rule() {
        let containers = vec![
            descriptor("['/nova_api']", "a"),
            descriptor("['/nova_ssh']", "b"),
            descriptor("['/nova_libvirt']", "c"),
        ];
        let exclusions = vec![
            "regex:nova_(ssh|libvirt)".parse().unwrap(),
            "substring:glance".parse().unwrap(),
        ];

        let labels: Vec<String> = build_batch(&containers, &exclusions)
            .into_iter()
            .map(|r| r.label().to_owned())
            .collect();
        assert_eq!(labels, vec!["['/nova_api']"]);
    }
}
