//! Structural invariant checking.
//!
//! The checker verifies, for the whole tree: parent back-references, the
//! parent/child type laws, child counts, containment of every child extent
//! in its parent extent, tightness of every directory extent, and the
//! fan-out bounds of non-root directories. Silent mode fails on the first
//! violation; verbose mode reports every node and every violation through
//! the `log` facade before failing.

use std::ptr;

use crate::capacity::Capacity;
use crate::errors::{TreeError, TreeResult};
use crate::point::Coordinate;

use super::node::{NodePayload, NodeStore, NodeType};
use super::RTree;

/// How an integrity check reports its findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    /// Fail with the first violation found.
    Silent,
    /// Log every node and every violation, then fail if any was found.
    Verbose,
}

/// Result of a full (verbose) integrity check.
#[derive(Debug, Clone)]
pub struct IntegrityReport {
    /// Total nodes visited.
    pub nodes_checked: u64,
    /// Detailed violation messages, in traversal order.
    pub errors: Vec<String>,
    /// Whether the tree satisfies every invariant.
    pub is_valid: bool,
}

impl IntegrityReport {
    pub fn new() -> Self {
        Self {
            nodes_checked: 0,
            errors: Vec::new(),
            is_valid: true,
        }
    }
}

impl Default for IntegrityReport {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Coordinate, V, const D: usize, C: Capacity> RTree<K, V, D, C> {
    /// Verifies the structural invariants of the tree.
    ///
    /// With [`CheckMode::Silent`] the first violation is returned as
    /// [`TreeError::Integrity`]. With [`CheckMode::Verbose`] every node and
    /// every violation is written to the `log` sink first, and the error
    /// names the violation count.
    pub fn check_integrity(&self, mode: CheckMode) -> TreeResult<()> {
        match mode {
            CheckMode::Silent => {
                let mut report = IntegrityReport::new();
                self.verify(false, &mut report)
            }
            CheckMode::Verbose => {
                let report = self.integrity_report();
                if report.is_valid {
                    Ok(())
                } else {
                    Err(TreeError::Integrity(format!(
                        "tree contains {} violation(s)",
                        report.errors.len()
                    )))
                }
            }
        }
    }

    /// Runs a full check, logging every node, and returns the collected
    /// report instead of failing.
    pub fn integrity_report(&self) -> IntegrityReport {
        let mut report = IntegrityReport::new();
        // In verbose mode verify never short-circuits, so the result carries
        // no information beyond the report itself.
        let _ = self.verify(true, &mut report);
        report
    }

    fn verify(&self, verbose: bool, report: &mut IntegrityReport) -> TreeResult<()> {
        if !self.root.node_type.is_directory() {
            violation(
                report,
                verbose,
                0,
                "the root node must be a directory node".into(),
            )?;
        }

        if !self.root.parent.is_null() {
            violation(
                report,
                verbose,
                0,
                "the root node must not have a parent".into(),
            )?;
        }

        Self::verify_node(&self.root, None, 0, verbose, report)
    }

    fn verify_node(
        ns: &NodeStore<K, V, D>,
        parent: Option<&NodeStore<K, V, D>>,
        level: usize,
        verbose: bool,
        report: &mut IntegrityReport,
    ) -> TreeResult<()> {
        report.nodes_checked += 1;

        if verbose {
            log::debug!(
                "{:indent$}node: {:p}; parent: {:p}; type: {}; extent: {}",
                "",
                ns,
                ns.parent,
                ns.node_type,
                ns.extent,
                indent = level * 4
            );
        }

        if let Some(parent) = parent {
            if !ptr::eq(ns.parent, parent) {
                violation(
                    report,
                    verbose,
                    level,
                    format!(
                        "the parent back-reference does not point to the real parent \
                         (expected: {:p}; stored in node: {:p})",
                        parent, ns.parent
                    ),
                )?;
            }

            if !parent.extent.contains(&ns.extent) {
                violation(
                    report,
                    verbose,
                    level,
                    format!(
                        "the extent of the child {} is not within the extent of the parent {}",
                        ns.extent, parent.extent
                    ),
                )?;
            }

            let type_law_holds = match ns.node_type {
                NodeType::DirectoryLeaf | NodeType::DirectoryNonleaf => {
                    parent.node_type == NodeType::DirectoryNonleaf
                }
                NodeType::Value => parent.node_type == NodeType::DirectoryLeaf,
                NodeType::Unspecified => false,
            };
            if !type_law_holds {
                violation(
                    report,
                    verbose,
                    level,
                    format!(
                        "a {} node must not be the child of a {} node",
                        ns.node_type, parent.node_type
                    ),
                )?;
            }
        }

        match &ns.payload {
            NodePayload::Directory(dir) => {
                if ns.count != dir.children.len() {
                    violation(
                        report,
                        verbose,
                        level,
                        format!(
                            "incorrect child count (expected: {}; actual: {})",
                            dir.children.len(),
                            ns.count
                        ),
                    )?;
                }

                let tight = dir.calc_extent().unwrap_or_default();
                if tight != ns.extent {
                    violation(
                        report,
                        verbose,
                        level,
                        format!(
                            "the extent of the node {} does not equal the truly tight extent {}",
                            ns.extent, tight
                        ),
                    )?;
                }

                if !ns.is_root()
                    && (ns.count < C::MIN_FANOUT || ns.count > C::MAX_FANOUT)
                {
                    violation(
                        report,
                        verbose,
                        level,
                        format!(
                            "directory fan-out {} is outside [{}, {}]",
                            ns.count,
                            C::MIN_FANOUT,
                            C::MAX_FANOUT
                        ),
                    )?;
                }

                for child in &dir.children {
                    Self::verify_node(child, Some(ns), level + 1, verbose, report)?;
                }
            }
            NodePayload::Value(_) => {}
        }

        Ok(())
    }
}

/// Records one violation: pushed into the report (and logged) in verbose
/// mode, returned as an error in silent mode.
fn violation(
    report: &mut IntegrityReport,
    verbose: bool,
    level: usize,
    message: String,
) -> TreeResult<()> {
    if verbose {
        log::warn!("{:indent$}* {}", "", message, indent = level * 4);
        report.errors.push(message);
        report.is_valid = false;
        Ok(())
    } else {
        Err(TreeError::Integrity(message))
    }
}
