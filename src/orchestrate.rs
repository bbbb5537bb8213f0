//! One volume update followed by a remount trigger per domain.
//!
//! Domain outcomes are independent: a failed trigger is reported and the run
//! moves on. With more than one job the triggers run on a bounded pool of
//! scoped threads; each report is printed in domain order once every earlier
//! domain has finished.
use crate::cli::{AddFileArgs, DomainId};
use crate::error::Result;
use crate::invoke::{
    remount_result, trigger_remount, update_volume, InvocationOutcome, REMOUNT_ACTION,
    TRIGGER_FAILED,
};
use crate::tools::{ResolvedTool, ToolResolver, ToolsConfig, CTLTRIGGER, SHFS_ADMIN};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainReport {
    pub domain: DomainId,
    /// 0 on success; otherwise the trigger's failure code.
    pub code: i64,
}

impl DomainReport {
    pub fn succeeded(&self) -> bool {
        self.code == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub volume: InvocationOutcome,
    pub domains: Vec<DomainReport>,
}

impl RunSummary {
    pub fn failed_domains(&self) -> usize {
        self.domains.iter().filter(|report| !report.succeeded()).count()
    }
}

/// Run the volume update, then trigger every domain.
///
/// The volume outcome does not gate the triggers. The trigger tool is only
/// resolved when there is at least one domain.
pub fn run(
    args: &AddFileArgs,
    config: &ToolsConfig,
    resolver: &mut ToolResolver,
) -> Result<RunSummary> {
    let volume = update_volume(resolver, &args.files, &args.passthrough)?;
    if !volume.succeeded() {
        tracing::warn!(
            exit_code = volume.exit_code,
            files = args.files.len(),
            "volume update failed; triggering remounts anyway"
        );
        eprintln!("{SHFS_ADMIN} exited with status {}", volume.exit_code);
    }

    if args.domains.is_empty() {
        return Ok(RunSummary {
            volume,
            domains: Vec::new(),
        });
    }

    let tool = resolver.resolve(CTLTRIGGER)?;
    let domains = if args.jobs <= 1 {
        trigger_sequential(&tool, &args.domains, &config.scope)
    } else {
        trigger_parallel(&tool, &args.domains, &config.scope, args.jobs)
    };
    Ok(RunSummary { volume, domains })
}

fn trigger_sequential(
    tool: &ResolvedTool,
    domains: &[DomainId],
    scope: &str,
) -> Vec<DomainReport> {
    domains
        .iter()
        .map(|&domain| {
            announce(domain);
            let report = trigger_domain(tool, domain, scope);
            report_failure(&report);
            report
        })
        .collect()
}

fn trigger_parallel(
    tool: &ResolvedTool,
    domains: &[DomainId],
    scope: &str,
    jobs: usize,
) -> Vec<DomainReport> {
    let next = AtomicUsize::new(0);
    let (sender, receiver) = mpsc::channel::<(usize, DomainReport)>();
    let mut queue = ReportQueue::new(domains.len());

    thread::scope(|workers| {
        for _ in 0..jobs.min(domains.len()) {
            let sender = sender.clone();
            let next = &next;
            workers.spawn(move || loop {
                let index = next.fetch_add(1, Ordering::Relaxed);
                let Some(&domain) = domains.get(index) else {
                    break;
                };
                let report = trigger_domain(tool, domain, scope);
                if sender.send((index, report)).is_err() {
                    break;
                }
            });
        }
        drop(sender);

        for (index, report) in receiver {
            for ready in queue.push(index, report) {
                announce(ready.domain);
                report_failure(&ready);
            }
        }
    });

    queue.into_reports()
}

/// Releases reports in domain order as soon as every earlier domain is done.
struct ReportQueue {
    slots: Vec<Option<DomainReport>>,
    emitted: usize,
}

impl ReportQueue {
    fn new(len: usize) -> Self {
        Self {
            slots: vec![None; len],
            emitted: 0,
        }
    }

    fn push(&mut self, index: usize, report: DomainReport) -> Vec<DomainReport> {
        self.slots[index] = Some(report);
        let mut ready = Vec::new();
        while let Some(Some(report)) = self.slots.get(self.emitted) {
            ready.push(*report);
            self.emitted += 1;
        }
        ready
    }

    fn into_reports(self) -> Vec<DomainReport> {
        self.slots.into_iter().flatten().collect()
    }
}

fn trigger_domain(tool: &ResolvedTool, domain: DomainId, scope: &str) -> DomainReport {
    let code = match trigger_remount(tool, domain, scope) {
        Ok(outcome) => remount_result(&outcome),
        Err(err) => {
            tracing::warn!(domain = domain.get(), error = %err, "trigger could not be spawned");
            eprintln!("{err}");
            TRIGGER_FAILED
        }
    };
    tracing::debug!(domain = domain.get(), code, "trigger finished");
    DomainReport { domain, code }
}

fn announce(domain: DomainId) {
    println!("Trigger action '{REMOUNT_ACTION}' on Domain {domain}");
}

fn report_failure(report: &DomainReport) {
    if !report.succeeded() {
        eprintln!(
            "Could not trigger action '{REMOUNT_ACTION}' on Domain {}",
            report.domain
        );
    }
}
