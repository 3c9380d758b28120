//! Kubernetes label-change preset.
//!
//! Builds a [`ShellTransport`] that reads each pod's identity annotation via
//! `kubectl` jsonpath output, and the four-step scenario that changes pod
//! and namespace labels and expects every pod to pick up a new identity
//! after each change.

use crate::domain::models::{Mutation, Scenario, ScenarioStep};
use crate::infrastructure::shell::ShellTransport;

/// Parameters of the label-change scenario.
#[derive(Debug, Clone)]
pub struct KubectlPreset {
    /// kubectl binary (may include flags such as `--context`).
    pub kubectl: String,
    /// Namespace holding the tracked pods.
    pub namespace: String,
    /// Label selector of the tracked pods.
    pub selector: String,
    /// Label applied and removed, as `key=value`.
    pub label: String,
    /// Pod annotation carrying the derived identity.
    pub identity_annotation: String,
}

impl KubectlPreset {
    /// Preset with the conventional defaults for `namespace` and `selector`.
    pub fn new(namespace: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            kubectl: "kubectl".to_string(),
            namespace: namespace.into(),
            selector: selector.into(),
            label: "foo-bar=new-label".to_string(),
            identity_annotation: "io.cilium.identity".to_string(),
        }
    }

    /// Override the label toggled by the scenario.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Label key without its value.
    pub fn label_key(&self) -> &str {
        self.label
            .split_once('=')
            .map_or(self.label.as_str(), |(key, _)| key)
    }

    /// Command template listing `<pod> <identity>` lines for `{selector}`.
    pub fn snapshot_command(&self) -> String {
        let annotation = self.identity_annotation.replace('.', "\\.");
        format!(
            "{} -n {} get pods -l {{selector}} -o jsonpath='{{range .items[*]}}{{.metadata.name}}{{\" \"}}{{.metadata.annotations.{}}}{{\"\\n\"}}{{end}}'",
            self.kubectl, self.namespace, annotation
        )
    }

    /// Shell transport reading pod identities.
    pub fn transport(&self) -> ShellTransport {
        ShellTransport::new(self.snapshot_command())
    }

    /// The pod/namespace label-change scenario.
    pub fn label_change_scenario(&self) -> Scenario {
        let pod_label = format!(
            "{} -n {} label pod/{{entity}} {}",
            self.kubectl, self.namespace, self.label
        );
        let pod_unlabel = format!(
            "{} -n {} label pod/{{entity}} {}-",
            self.kubectl,
            self.namespace,
            self.label_key()
        );
        let ns_label = format!("{} label ns/{{scope}} {}", self.kubectl, self.label);
        let ns_unlabel = format!("{} label ns/{{scope}} {}-", self.kubectl, self.label_key());

        Scenario::new("label-changes", self.selector.clone())
            .step(ScenarioStep::new(
                "add label to pods",
                Mutation::each_tracked(pod_label),
            ))
            .step(ScenarioStep::new(
                "add label to namespace",
                Mutation::scoped(self.namespace.clone(), ns_label),
            ))
            .step(ScenarioStep::new(
                "remove label from namespace",
                Mutation::scoped(self.namespace.clone(), ns_unlabel),
            ))
            .step(ScenarioStep::new(
                "remove label from pods",
                Mutation::each_tracked(pod_unlabel),
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{MutationScope, MutationTarget};

    #[test]
    fn test_snapshot_command_escapes_annotation() {
        let preset = KubectlPreset::new("default", "zgroup=testapp");
        assert_eq!(
            preset.snapshot_command(),
            "kubectl -n default get pods -l {selector} -o jsonpath='{range .items[*]}{.metadata.name}{\" \"}{.metadata.annotations.io\\.cilium\\.identity}{\"\\n\"}{end}'"
        );
    }

    #[test]
    fn test_label_change_scenario_steps() {
        let scenario = KubectlPreset::new("default", "zgroup=testapp").label_change_scenario();

        assert_eq!(scenario.selector, "zgroup=testapp");
        assert_eq!(scenario.steps.len(), 4);
        assert_eq!(scenario.steps[0].mutation.scope, MutationScope::EachTracked);
        assert_eq!(
            scenario.steps[1].mutation.scope,
            MutationScope::Scope("default".to_string())
        );
        assert_eq!(
            ShellTransport::render_change(
                &MutationTarget::Entity("app1".into()),
                &scenario.steps[0].mutation.change
            ),
            "kubectl -n default label pod/app1 foo-bar=new-label"
        );
        assert_eq!(
            ShellTransport::render_change(
                &MutationTarget::Scope("default".to_string()),
                &scenario.steps[2].mutation.change
            ),
            "kubectl label ns/default foo-bar-"
        );
    }

    #[test]
    fn test_label_key() {
        let preset = KubectlPreset::new("default", "app=x").with_label("team=blue");
        assert_eq!(preset.label_key(), "team");
        assert_eq!(preset.with_label("flag").label_key(), "flag");
    }
}
