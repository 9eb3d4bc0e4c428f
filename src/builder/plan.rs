//! Multi-architecture build planning.
//!
//! An [`ActionGraph`] describes every action needed to produce one universal
//! binary: per-architecture compile, archive and link actions, and a single
//! combine action whose inputs are exactly the per-architecture binaries.
//! Planning never runs anything; the graph is handed to an executor.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Topo;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::builder::toolchain::{AppleToolchain, CommandSpec};
use crate::builder::variables::{assemble, BuildVariableSet, APPLE_SDK_PLATFORM_VALUE};
use crate::core::platform::{Architecture, PlatformType};
use crate::core::target::UniversalBinaryTarget;
use crate::resolver::errors::{ConfigError, LookupError};
use crate::resolver::platform::{resolve_platform_spec, VersionOverrides};
use crate::resolver::xcode::{ToolchainVersion, XcodeResolver, XcodeVersionTable};
use crate::util::hash::Fingerprint;

/// Index of an action within its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub usize);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A file produced or consumed by an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Artifact(PathBuf);

impl Artifact {
    /// Create an artifact for a path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Artifact(path.into())
    }

    /// The artifact's path.
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Whether the path ends with `suffix` (compared as text).
    pub fn ends_with(&self, suffix: &str) -> bool {
        self.0.to_string_lossy().ends_with(suffix)
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// What an action does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Compile one source to an object file
    Compile,
    /// Archive objects into a static library
    Archive,
    /// Link one architecture's binary
    Link,
    /// Merge per-architecture binaries into a universal binary
    Combine,
}

impl ActionKind {
    /// Short name used in logs and descriptions.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            ActionKind::Compile => "Compile",
            ActionKind::Archive => "Archive",
            ActionKind::Link => "Link",
            ActionKind::Combine => "Lipo",
        }
    }
}

/// One planned action.
#[derive(Debug, Clone, Serialize)]
pub struct Action {
    id: ActionId,
    kind: ActionKind,
    /// Target that owns the action (binary or library name)
    label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    architecture: Option<Architecture>,
    inputs: Vec<Artifact>,
    output: Artifact,
    /// Shared with every other action of the same architecture
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<Arc<BuildVariableSet>>,
    command: CommandSpec,
    key: String,
}

impl Action {
    pub fn id(&self) -> ActionId {
        self.id
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Architecture of a per-architecture action; `None` for the combine action.
    pub fn architecture(&self) -> Option<&Architecture> {
        self.architecture.as_ref()
    }

    pub fn inputs(&self) -> &[Artifact] {
        &self.inputs
    }

    pub fn output(&self) -> &Artifact {
        &self.output
    }

    pub fn command(&self) -> &CommandSpec {
        &self.command
    }

    /// Variable set this action was rendered from.
    pub fn variables(&self) -> Option<&Arc<BuildVariableSet>> {
        self.variables.as_ref()
    }

    /// Stable digest of the command, inputs and output.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// First input whose path ends with `suffix`.
    pub fn input_ending_with(&self, suffix: &str) -> Option<&Artifact> {
        self.inputs.iter().find(|a| a.ends_with(suffix))
    }

    /// Look up one resolved variable on this action.
    pub fn variable(&self, name: &str) -> Result<&str, LookupError> {
        let vars = self.variables.as_ref().ok_or_else(|| LookupError::NoVariables {
            action: self.describe(),
        })?;
        vars.lookup(&self.describe(), name)
    }

    /// Human-readable description, e.g. `Link bin [armv7k]`.
    pub fn describe(&self) -> String {
        match &self.architecture {
            Some(arch) => format!("{} {} [{}]", self.kind.mnemonic(), self.label, arch),
            None => format!("{} {}", self.kind.mnemonic(), self.label),
        }
    }
}

fn action_key(kind: ActionKind, command: &CommandSpec, inputs: &[Artifact], output: &Artifact) -> String {
    let mut fp = Fingerprint::new();
    fp.update_str(kind.mnemonic())
        .update_path(&command.program)
        .update_strs(command.args.iter().map(String::as_str));
    for (k, v) in &command.env {
        fp.update_str(k).update_str(v);
    }
    fp.update_paths(inputs.iter().map(Artifact::path))
        .update_path(output.path());
    fp.finish()
}

/// One architecture's slice of a universal binary.
#[derive(Debug, Clone)]
pub struct ArchitectureBuildUnit {
    pub architecture: Architecture,
    pub variables: Arc<BuildVariableSet>,
    /// Objects and archives linked into the slice
    pub inputs: Vec<Artifact>,
    /// The single-architecture binary
    pub output: Artifact,
    /// Action that links `output`
    pub link_action: ActionId,
}

/// The planned actions for one universal binary.
#[derive(Debug, Clone)]
pub struct ActionGraph {
    target: String,
    platform_type: PlatformType,
    actions: Vec<Action>,
    generating: HashMap<Artifact, ActionId>,
    graph: DiGraph<ActionId, ()>,
    nodes: Vec<NodeIndex>,
    units: Vec<ArchitectureBuildUnit>,
    combine: Option<ActionId>,
}

impl ActionGraph {
    fn new(target: &str, platform_type: PlatformType) -> Self {
        ActionGraph {
            target: target.to_string(),
            platform_type,
            actions: Vec::new(),
            generating: HashMap::new(),
            graph: DiGraph::new(),
            nodes: Vec::new(),
            units: Vec::new(),
            combine: None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn add_action(
        &mut self,
        kind: ActionKind,
        label: &str,
        architecture: Option<&Architecture>,
        inputs: Vec<Artifact>,
        output: Artifact,
        variables: Option<Arc<BuildVariableSet>>,
        command: CommandSpec,
    ) -> ActionId {
        let id = ActionId(self.actions.len());
        let node = self.graph.add_node(id);
        self.nodes.push(node);

        // Edges run producer -> consumer
        for input in &inputs {
            if let Some(producer) = self.generating.get(input) {
                self.graph.add_edge(self.nodes[producer.0], node, ());
            }
        }
        self.generating.insert(output.clone(), id);

        let key = action_key(kind, &command, &inputs, &output);
        let action = Action {
            id,
            kind,
            label: label.to_string(),
            architecture: architecture.cloned(),
            inputs,
            output,
            variables,
            command,
            key,
        };
        tracing::debug!("planned {} -> {}", action.describe(), action.output);
        self.actions.push(action);
        id
    }

    /// Name of the logical target.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Platform family of every slice.
    pub fn platform_type(&self) -> PlatformType {
        self.platform_type
    }

    /// All actions in emission order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the graph has no actions.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Get an action by id.
    pub fn action(&self, id: ActionId) -> Option<&Action> {
        self.actions.get(id.0)
    }

    /// Per-architecture build units, in request order.
    pub fn units(&self) -> &[ArchitectureBuildUnit] {
        &self.units
    }

    /// Single-architecture link actions, in request order.
    pub fn link_actions(&self) -> impl Iterator<Item = &Action> + '_ {
        self.units.iter().map(move |u| &self.actions[u.link_action.0])
    }

    /// The action producing the universal binary.
    pub fn combine_action(&self) -> &Action {
        // Graphs are only returned once the combine action, always the last
        // one emitted, is in place.
        let id = self.combine.unwrap_or(ActionId(self.actions.len().saturating_sub(1)));
        &self.actions[id.0]
    }

    /// The universal binary artifact.
    pub fn universal_binary(&self) -> &Artifact {
        self.combine_action().output()
    }

    /// The action that produces `artifact`, if it is planned here.
    pub fn generating_action(&self, artifact: &Artifact) -> Option<&Action> {
        self.generating
            .get(artifact)
            .map(|id| &self.actions[id.0])
    }

    /// Look up one resolved variable on one action.
    pub fn variable_value_for(&self, id: ActionId, name: &str) -> Result<&str, LookupError> {
        self.action(id)
            .ok_or(LookupError::UnknownAction { id: id.0 })?
            .variable(name)
    }

    /// Actions ordered so every producer precedes its consumers.
    pub fn execution_order(&self) -> Vec<&Action> {
        let mut topo = Topo::new(&self.graph);
        let mut order = Vec::with_capacity(self.actions.len());
        while let Some(node) = topo.next(&self.graph) {
            order.push(&self.actions[self.graph[node].0]);
        }
        order
    }

    /// Direct dependencies of an action (actions producing its inputs).
    pub fn dependencies(&self, id: ActionId) -> Vec<&Action> {
        let Some(&node) = self.nodes.get(id.0) else {
            return Vec::new();
        };
        let mut deps: Vec<&Action> = self
            .graph
            .neighbors_directed(node, petgraph::Direction::Incoming)
            .map(|n| &self.actions[self.graph[n].0])
            .collect();
        deps.sort_by_key(|a| a.id());
        deps
    }

    /// Serializable view of the plan.
    pub fn summary(&self) -> PlanSummary<'_> {
        PlanSummary {
            target: &self.target,
            platform_type: self.platform_type,
            universal_binary: self.universal_binary(),
            architectures: self.units.iter().map(|u| &u.architecture).collect(),
            actions: self.execution_order(),
        }
    }
}

/// JSON view of an [`ActionGraph`].
#[derive(Debug, Serialize)]
pub struct PlanSummary<'a> {
    pub target: &'a str,
    pub platform_type: PlatformType,
    pub universal_binary: &'a Artifact,
    pub architectures: Vec<&'a Architecture>,
    /// Actions in execution order
    pub actions: Vec<&'a Action>,
}

/// Plans universal binaries.
#[derive(Debug, Clone)]
pub struct MultiArchGraphBuilder<'a> {
    table: &'a XcodeVersionTable,
    overrides: &'a VersionOverrides,
    toolchain: AppleToolchain,
}

impl<'a> MultiArchGraphBuilder<'a> {
    /// Create a builder over a version table and the configured overrides.
    pub fn new(table: &'a XcodeVersionTable, overrides: &'a VersionOverrides) -> Self {
        MultiArchGraphBuilder {
            table,
            overrides,
            toolchain: AppleToolchain::default(),
        }
    }

    /// Use a different set of tool paths.
    pub fn with_toolchain(mut self, toolchain: AppleToolchain) -> Self {
        self.toolchain = toolchain;
        self
    }

    /// Resolve the toolchain versions shared by every slice of `target`.
    pub fn resolve_toolchain(&self, platform_type: PlatformType) -> Result<ToolchainVersion, ConfigError> {
        XcodeResolver::new(self.table).resolve(
            self.overrides.xcode_version.as_ref(),
            self.overrides.sdk_version_for(platform_type),
            platform_type,
        )
    }

    /// Resolve the variable set for one architecture.
    pub fn resolve_variables(
        &self,
        platform_type: PlatformType,
        arch: &Architecture,
    ) -> Result<BuildVariableSet, ConfigError> {
        let toolchain = self.resolve_toolchain(platform_type)?;
        let platform = resolve_platform_spec(platform_type, arch, self.overrides)?;
        Ok(assemble(&platform, &toolchain, platform_type, arch))
    }

    /// Plan every action for `target`.
    ///
    /// All configuration is validated before the first action is emitted, so
    /// a failed plan never leaves a partial graph behind.
    pub fn build_graph(&self, target: &UniversalBinaryTarget) -> Result<ActionGraph, ConfigError> {
        let platform_type = target.platform_type;

        if target.architectures.is_empty() {
            return Err(ConfigError::EmptyArchitectures {
                target: target.name.clone(),
            });
        }

        let mut seen = HashSet::new();
        for arch in &target.architectures {
            if !seen.insert(arch) {
                return Err(ConfigError::DuplicateArchitecture {
                    target: target.name.clone(),
                    cpu: arch.cpu().to_string(),
                });
            }
        }

        // Slices differ only in their arch directory, so one is enough
        let mut outputs = HashSet::new();
        for path in target.slice_outputs(&target.architectures[0]) {
            if !outputs.insert(path.clone()) {
                return Err(ConfigError::ConflictingOutput {
                    target: target.name.clone(),
                    path: path.display().to_string(),
                });
            }
        }

        let toolchain = self.resolve_toolchain(platform_type)?;

        let variable_sets: Vec<Arc<BuildVariableSet>> = target
            .architectures
            .par_iter()
            .map(|arch| -> Result<Arc<BuildVariableSet>, ConfigError> {
                let platform = resolve_platform_spec(platform_type, arch, self.overrides)?;
                Ok(Arc::new(assemble(&platform, &toolchain, platform_type, arch)))
            })
            .collect::<Result<_, ConfigError>>()?;

        let mut graph = ActionGraph::new(&target.name, platform_type);

        for (arch, vars) in target.architectures.iter().zip(variable_sets) {
            tracing::debug!(
                "planning {} slice of {} against {}",
                arch,
                target.name,
                vars.get(APPLE_SDK_PLATFORM_VALUE).unwrap_or_default()
            );
            let unit = self.emit_slice(&mut graph, target, arch, vars)?;
            graph.units.push(unit);
        }

        let inputs: Vec<Artifact> = graph.units.iter().map(|u| u.output.clone()).collect();
        let input_paths: Vec<PathBuf> = inputs.iter().map(|a| a.path().to_path_buf()).collect();
        let output = Artifact::new(target.universal_binary());
        let command =
            self.toolchain
                .combine_command(&toolchain.xcode_version, &input_paths, output.path());
        let combine = graph.add_action(
            ActionKind::Combine,
            &target.name,
            None,
            inputs,
            output,
            None,
            command,
        );
        graph.combine = Some(combine);

        tracing::info!(
            "planned {} actions for {} ({} architectures)",
            graph.len(),
            target.name,
            graph.units.len()
        );

        Ok(graph)
    }

    fn emit_slice(
        &self,
        graph: &mut ActionGraph,
        target: &UniversalBinaryTarget,
        arch: &Architecture,
        vars: Arc<BuildVariableSet>,
    ) -> Result<ArchitectureBuildUnit, ConfigError> {
        let mut link_inputs = Vec::new();

        for src in &target.srcs {
            let obj = self.emit_compile(graph, target, arch, &vars, &target.name, src)?;
            link_inputs.push(obj);
        }

        for lib in &target.deps {
            let mut objects = Vec::new();
            for src in &lib.srcs {
                objects.push(self.emit_compile(graph, target, arch, &vars, &lib.name, src)?);
            }
            let output = Artifact::new(target.archive_path(arch, lib));
            let object_paths: Vec<PathBuf> =
                objects.iter().map(|a| a.path().to_path_buf()).collect();
            let command = self
                .toolchain
                .archive_command(&vars, &object_paths, output.path());
            graph.add_action(
                ActionKind::Archive,
                &lib.name,
                Some(arch),
                objects,
                output.clone(),
                Some(Arc::clone(&vars)),
                command,
            );
            link_inputs.push(output);
        }

        let output = Artifact::new(target.arch_binary(arch));
        let input_paths: Vec<PathBuf> = link_inputs.iter().map(|a| a.path().to_path_buf()).collect();
        let command = self
            .toolchain
            .link_command(&vars, &input_paths, output.path())?;
        let link_action = graph.add_action(
            ActionKind::Link,
            &target.name,
            Some(arch),
            link_inputs.clone(),
            output.clone(),
            Some(Arc::clone(&vars)),
            command,
        );

        Ok(ArchitectureBuildUnit {
            architecture: arch.clone(),
            variables: vars,
            inputs: link_inputs,
            output,
            link_action,
        })
    }

    fn emit_compile(
        &self,
        graph: &mut ActionGraph,
        target: &UniversalBinaryTarget,
        arch: &Architecture,
        vars: &Arc<BuildVariableSet>,
        owner: &str,
        src: &Path,
    ) -> Result<Artifact, ConfigError> {
        let output = Artifact::new(target.object_path(arch, owner, src));
        let command = self.toolchain.compile_command(vars, src, output.path())?;
        graph.add_action(
            ActionKind::Compile,
            owner,
            Some(arch),
            vec![Artifact::new(src)],
            output.clone(),
            Some(Arc::clone(vars)),
            command,
        );
        Ok(output)
    }
}
