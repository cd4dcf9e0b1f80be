//! Control file assembly.
//!
//! One [`ControlFileAssembler`] runs per render request and moves through
//! four stages:
//!
//! ```text
//! CollectDependencies -> GenerateStale -> Assemble -> Done
//! ```
//!
//! Collecting resolves the artifact graph into a leaves-first order.
//! Generating walks that order and rebuilds every stale artifact. A failing
//! required artifact has its partial output removed and ends the assembly.
//! A failing optional artifact is logged and omitted, and so is every
//! optional artifact built on top of it. Assembling writes the control file,
//! touching it only when its content changed.

use crate::artifact::{ArtifactGraph, ArtifactKind};
use crate::core::{ProjectContext, RapumaError};
use crate::generators::control::control_plan;
use crate::generators::{BuildRequest, generator_for};
use crate::utils::fs::{remove_file_forced, write_if_changed};
use anyhow::Result;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyStage {
    CollectDependencies,
    GenerateStale,
    Assemble,
    Done,
}

/// What one assembly did.
#[derive(Debug, Clone)]
pub struct AssemblyReport {
    pub control_file: PathBuf,
    /// Artifacts rebuilt in this run, in generation order.
    pub regenerated: Vec<ArtifactKind>,
    /// Optional artifacts left out of the control file.
    pub omitted: BTreeSet<ArtifactKind>,
    /// Whether the control file was written.
    pub control_changed: bool,
    /// Every file the control file refers to.
    pub dependencies: Vec<PathBuf>,
}

pub struct ControlFileAssembler<'a> {
    ctx: &'a ProjectContext,
    req: &'a BuildRequest,
    graph: ArtifactGraph,
    stage: AssemblyStage,
    order: Vec<ArtifactKind>,
    regenerated: Vec<ArtifactKind>,
    omitted: BTreeSet<ArtifactKind>,
}

impl<'a> ControlFileAssembler<'a> {
    #[must_use]
    pub fn new(ctx: &'a ProjectContext, req: &'a BuildRequest) -> Self {
        Self::with_graph(ctx, req, ArtifactGraph::standard())
    }

    #[must_use]
    pub fn with_graph(ctx: &'a ProjectContext, req: &'a BuildRequest, graph: ArtifactGraph) -> Self {
        Self {
            ctx,
            req,
            graph,
            stage: AssemblyStage::CollectDependencies,
            order: Vec::new(),
            regenerated: Vec::new(),
            omitted: BTreeSet::new(),
        }
    }

    #[must_use]
    pub const fn stage(&self) -> AssemblyStage {
        self.stage
    }

    /// Run every remaining stage and report.
    pub fn assemble(mut self) -> Result<AssemblyReport> {
        let mut report = None;
        while self.stage != AssemblyStage::Done {
            match self.stage {
                AssemblyStage::CollectDependencies => self.collect()?,
                AssemblyStage::GenerateStale => self.generate_stale()?,
                AssemblyStage::Assemble => report = Some(self.write_control()?),
                AssemblyStage::Done => {}
            }
        }
        report.ok_or_else(|| {
            RapumaError::Other {
                message: "control file assembly finished without a report".to_string(),
            }
            .into()
        })
    }

    fn collect(&mut self) -> Result<()> {
        self.order = self
            .graph
            .generation_order()?
            .into_iter()
            .filter(|kind| generator_for(*kind).is_some())
            .collect();
        debug!(target: "assembler", "Generation order for {}: {:?}", self.req.gid, self.order);
        self.stage = AssemblyStage::GenerateStale;
        Ok(())
    }

    fn generate_stale(&mut self) -> Result<()> {
        for kind in self.order.clone() {
            self.generate_one(kind)?;
        }
        self.stage = AssemblyStage::Assemble;
        Ok(())
    }

    fn generate_one(&mut self, kind: ArtifactKind) -> Result<()> {
        let Some(generator) = generator_for(kind) else {
            return Ok(());
        };
        let targets = generator.targets(self.ctx, self.req);
        if targets.is_empty() {
            return Ok(());
        }

        let missing: Vec<ArtifactKind> =
            self.graph.dependencies_of(kind).into_iter().filter(|d| self.omitted.contains(d)).collect();
        if !missing.is_empty() {
            if kind.is_required() {
                return Err(RapumaError::GeneratorFailed {
                    artifact: kind.to_string(),
                    reason: format!("depends on omitted {missing:?}"),
                }
                .into());
            }
            warn!(target: "assembler", "Omitting {} because {:?} is unavailable", kind, missing);
            self.omitted.insert(kind);
            return Ok(());
        }

        if !generator.needs_generation(self.ctx, self.req) {
            debug!(target: "assembler", "{} is up to date", kind);
            return Ok(());
        }

        match generator.generate(self.ctx, self.req) {
            Ok(()) => {
                info!(target: "assembler", "Generated {}", kind);
                self.regenerated.push(kind);
                Ok(())
            }
            Err(err) if kind.is_required() => {
                for target in &targets {
                    if target.exists() {
                        remove_file_forced(target)?;
                    }
                }
                let reason = format!("{err:#}");
                Err(err.context(RapumaError::GeneratorFailed {
                    artifact: kind.to_string(),
                    reason,
                }))
            }
            Err(err) => {
                warn!(target: "assembler", "Optional {} could not be generated, leaving it out: {:#}", kind, err);
                self.omitted.insert(kind);
                Ok(())
            }
        }
    }

    fn write_control(&mut self) -> Result<AssemblyReport> {
        let plan = control_plan(self.ctx, self.req, &self.omitted)?;
        let control_file = self.ctx.paths.control_file(&self.req.gid);
        let control_changed = write_if_changed(&control_file, &plan.content)?;
        if control_changed {
            info!(target: "assembler", "Wrote control file {}", control_file.display());
        } else {
            debug!(target: "assembler", "Control file {} unchanged", control_file.display());
        }
        self.stage = AssemblyStage::Done;
        Ok(AssemblyReport {
            control_file,
            regenerated: std::mem::take(&mut self.regenerated),
            omitted: std::mem::take(&mut self.omitted),
            control_changed,
            dependencies: plan.referenced,
        })
    }
}
