//! Pairs declared records with live records and classifies the differences
//! into create/update/delete buckets. Pure computation, no I/O.

use log::{debug, info};

use crate::config::Record;
use crate::provider::LiveRecord;

/// Expands a short record name against the zone apex; `"@"` stands for the
/// apex itself. Comparison elsewhere is exact: no case folding, no
/// trailing-dot handling.
pub fn fqdn(name: &str, domain: &str) -> String {
    if name == "@" {
        return domain.to_string();
    }

    format!("{}.{}", name, domain)
}

impl Record {
    /// Whether this declared record and a live record refer to the same DNS
    /// entry: equal fully qualified name and equal type. Content and proxy
    /// status are not part of the identity.
    fn matches_live(&self, domain: &str, live: &LiveRecord) -> bool {
        fqdn(&self.name, domain) == live.name && self.record_type == live.record_type
    }

    /// Whether the paired live record has drifted from the declared state.
    /// Records without a live counterpart have nothing to update.
    pub fn needs_update(&self) -> bool {
        match &self.matched_live {
            Some(live) => self.proxied != live.proxied || self.content != live.content,
            None => false,
        }
    }
}

/// The classified outcome of one reconcile pass.
///
/// The buckets are disjoint: a declared record lands in at most one of
/// create/update, and a live record is either paired or slated for deletion,
/// never both.
#[derive(Debug, Default)]
pub struct ReconcilePlan {
    pub to_create: Vec<Record>,
    pub to_update: Vec<Record>,
    pub to_delete: Vec<LiveRecord>,
}

/// Matches live records against declared records and buckets the differences.
///
/// Each managed live record is scanned against the declared list in
/// declaration order and the first entry with the same (name, type) wins.
/// A duplicate declared key therefore pairs at most once; the surplus entry
/// falls through to the create bucket and is left for the provider to
/// reject. Unmanaged record types are skipped on both sides before matching.
pub fn reconcile(declared: &[Record], live: Vec<LiveRecord>, domain: &str) -> ReconcilePlan {
    info!("Classifying records");

    let mut paired: Vec<Record> = Vec::new();
    let mut to_delete: Vec<LiveRecord> = Vec::new();

    for rec in live {
        if !rec.record_type.is_managed() {
            continue;
        }

        let matched = declared
            .iter()
            .filter(|d| d.record_type.is_managed())
            .find(|d| d.matches_live(domain, &rec));

        match matched {
            Some(d) => {
                let mut d = d.clone();
                d.matched_live = Some(rec);
                paired.push(d);
            }
            None => to_delete.push(rec),
        }
    }

    // The create bucket suppresses by short name alone, not (name, type): an
    // entry paired under one type shadows an unpaired entry that shares its
    // name under a different type.
    let to_create: Vec<Record> = declared
        .iter()
        .filter(|d| d.record_type.is_managed())
        .filter(|d| !paired.iter().any(|p| p.name == d.name))
        .cloned()
        .collect();

    // Paired entries that are already in sync are dropped here, neither
    // updated nor reported.
    let to_update: Vec<Record> = paired.into_iter().filter(Record::needs_update).collect();

    ReconcilePlan {
        to_create,
        to_update,
        to_delete,
    }
}

/// Logs the fetched zone contents. Unmanaged record types are omitted, like
/// everywhere else. Detail lines only appear when `verbose` is set.
pub fn log_live_records(live: &[LiveRecord], verbose: bool) {
    if !verbose {
        return;
    }

    for rec in live {
        if !rec.record_type.is_managed() {
            continue;
        }
        debug!(
            "live: [{}] {} -> {} (proxied: {})",
            rec.record_type, rec.name, rec.content, rec.proxied
        );
    }
}

/// Logs the plan summary, with per-record detail when `verbose` is set.
pub fn log_plan(plan: &ReconcilePlan, verbose: bool) {
    info!("To create ({})", plan.to_create.len());
    if verbose {
        log_declared(&plan.to_create);
    }

    info!("To update ({})", plan.to_update.len());
    if verbose {
        log_declared(&plan.to_update);
    }

    info!("To delete ({})", plan.to_delete.len());
    if verbose {
        for rec in &plan.to_delete {
            debug!(
                "  [{}] {} -> {} (proxied: {})",
                rec.record_type, rec.name, rec.content, rec.proxied
            );
        }
    }
}

fn log_declared(records: &[Record]) {
    for rec in records {
        debug!(
            "  [{}] {} -> {} (proxied: {})",
            rec.record_type, rec.name, rec.content, rec.proxied
        );
    }
}
