//! Ordered executable resolution with a per-run cache.
use super::{ToolsConfig, EXE_DIR_PLACEHOLDER};
use crate::error::{AddFileError, Result};
use crate::util::current_exe_dir;
use std::collections::{BTreeMap, HashMap};
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Which configured candidate satisfied a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolLocation {
    /// The first candidate.
    Preferred,
    /// A later candidate, by its index in the candidate list.
    Fallback(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTool {
    pub name: String,
    pub path: PathBuf,
    pub location: ToolLocation,
}

impl ResolvedTool {
    pub fn program(&self) -> String {
        self.path.display().to_string()
    }
}

/// Resolves logical tool names to executables, at most once per tool.
///
/// Bare candidates are looked up in the search path; candidates containing a
/// path separator are checked directly, relative ones against `cwd`.
pub struct ToolResolver {
    candidates: BTreeMap<String, Vec<String>>,
    search_path: Option<OsString>,
    cwd: PathBuf,
    exe_dir: Option<PathBuf>,
    resolved: HashMap<String, ResolvedTool>,
}

impl ToolResolver {
    /// Resolver over the process environment (`PATH`, cwd, executable dir).
    pub fn from_env(config: &ToolsConfig) -> Self {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(
            config.tools.clone(),
            env::var_os("PATH"),
            cwd,
            current_exe_dir(),
        )
    }

    pub fn new(
        candidates: BTreeMap<String, Vec<String>>,
        search_path: Option<OsString>,
        cwd: PathBuf,
        exe_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            candidates,
            search_path,
            cwd,
            exe_dir,
            resolved: HashMap::new(),
        }
    }

    /// Resolve `tool`, reusing an earlier resolution from this run.
    pub fn resolve(&mut self, tool: &str) -> Result<ResolvedTool> {
        if let Some(resolved) = self.resolved.get(tool) {
            return Ok(resolved.clone());
        }
        let resolved = self.lookup(tool)?;
        tracing::debug!(
            tool,
            path = %resolved.path.display(),
            location = ?resolved.location,
            "resolved tool"
        );
        self.resolved.insert(tool.to_string(), resolved.clone());
        Ok(resolved)
    }

    /// Tools resolved so far in this run.
    pub fn resolved_count(&self) -> usize {
        self.resolved.len()
    }

    fn lookup(&self, tool: &str) -> Result<ResolvedTool> {
        let candidates = self.candidates.get(tool).ok_or_else(|| {
            AddFileError::Config(format!("no candidate locations configured for '{tool}'"))
        })?;

        let mut last_failure = None;
        for (index, raw) in candidates.iter().enumerate() {
            let Some(candidate) = expand_candidate(raw, self.exe_dir.as_deref()) else {
                tracing::debug!(tool, candidate = %raw, "executable directory unknown; skipping");
                continue;
            };
            match which::which_in(&candidate, self.search_path.as_ref(), &self.cwd) {
                Ok(path) => {
                    let location = if index == 0 {
                        ToolLocation::Preferred
                    } else {
                        ToolLocation::Fallback(index)
                    };
                    return Ok(ResolvedTool {
                        name: tool.to_string(),
                        path,
                        location,
                    });
                }
                Err(err) => {
                    tracing::debug!(
                        tool,
                        candidate = %candidate,
                        error = %err,
                        "candidate unavailable"
                    );
                    last_failure = Some((candidate, err.to_string()));
                }
            }
        }

        let (candidate, reason) = last_failure.unwrap_or_else(|| {
            (
                tool.to_string(),
                "no candidate location could be expanded".to_string(),
            )
        });
        Err(AddFileError::ToolNotFound {
            tool: tool.to_string(),
            candidate,
            reason,
        })
    }
}

/// Substitute `{exe_dir}`; `None` when the candidate needs it but it is unknown.
fn expand_candidate(raw: &str, exe_dir: Option<&Path>) -> Option<String> {
    if !raw.contains(EXE_DIR_PLACEHOLDER) {
        return Some(raw.to_string());
    }
    let dir = exe_dir?;
    Some(raw.replace(EXE_DIR_PLACEHOLDER, &dir.display().to_string()))
}
