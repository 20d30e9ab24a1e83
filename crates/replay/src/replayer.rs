use std::fmt;
use std::path::Path;
use std::time::{Duration, SystemTime};

use tracing::{debug, warn};

use mdns_cache::{CacheConfig, CacheKey, MdnsCache, UpdateKind};
use mdns_common::{MdnsError, MdnsResult, TraceError};
use mdns_protocol::{Record, TimedEvent, TraceEvent, type_name};

/// Opções do replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayOptions {
    /// Chama `cleanup_records` antes de cada `find`, como faria o dono do cache.
    pub cleanup_before_find: bool,
    /// Linhas inválidas são logadas e ignoradas em vez de abortar.
    pub lenient: bool,
}

/// Efeito observável de um evento aplicado ao cache.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Updated { key: CacheKey, kind: UpdateKind },
    Found {
        rtype: u16,
        name: String,
        records: Vec<Record>,
    },
    Removed(Record),
    Cleared { dropped: usize },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Updated { key, kind } => {
                let label = match kind {
                    UpdateKind::Added => "added",
                    UpdateKind::Changed => "changed",
                    UpdateKind::NoChange => "unchanged",
                };
                write!(f, "{label} {key}")
            }
            Outcome::Found {
                rtype,
                name,
                records,
            } => {
                let name = if name.is_empty() { "*" } else { name.as_str() };
                write!(f, "found {} {name}: {}", type_name(*rtype), records.len())?;
                for record in records {
                    write!(f, "\n    {record}")?;
                }
                Ok(())
            }
            Outcome::Removed(record) => write!(f, "removed {record}"),
            Outcome::Cleared { dropped } => write!(f, "cleared {dropped}"),
        }
    }
}

/// Contadores acumulados de um replay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub events: usize,
    pub added: usize,
    pub changed: usize,
    pub unchanged: usize,
    pub removed: usize,
    pub queries: usize,
    pub skipped_lines: usize,
}

impl ReplayReport {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Updated { kind, .. } => match kind {
                UpdateKind::Added => self.added += 1,
                UpdateKind::Changed => self.changed += 1,
                UpdateKind::NoChange => self.unchanged += 1,
            },
            Outcome::Found { .. } => self.queries += 1,
            Outcome::Removed(_) => self.removed += 1,
            Outcome::Cleared { .. } => {}
        }
    }
}

/// Dono do cache durante um replay: aplica eventos com o relógio do trace.
pub struct Replayer {
    cache: MdnsCache,
    epoch: SystemTime,
    options: ReplayOptions,
    last_offset: u64,
    report: ReplayReport,
}

impl Replayer {
    pub fn new(config: CacheConfig, options: ReplayOptions) -> Self {
        Self {
            cache: MdnsCache::with_config(config),
            epoch: SystemTime::UNIX_EPOCH,
            options,
            last_offset: 0,
            report: ReplayReport::default(),
        }
    }

    pub fn cache(&self) -> &MdnsCache {
        &self.cache
    }

    pub fn report(&self) -> &ReplayReport {
        &self.report
    }

    /// Aplica um evento. Offsets não podem voltar no tempo.
    pub fn apply(&mut self, timed: TimedEvent) -> Result<Vec<Outcome>, TraceError> {
        if timed.offset_ms < self.last_offset {
            return Err(TraceError::OutOfOrder {
                previous: self.last_offset,
                got: timed.offset_ms,
            });
        }
        self.last_offset = timed.offset_ms;
        let now = self.epoch + Duration::from_millis(timed.offset_ms);

        let mut outcomes = Vec::new();
        match timed.event {
            TraceEvent::Update(record) => {
                let key = CacheKey::for_record(&record);
                let kind = self.cache.update_record(record);
                outcomes.push(Outcome::Updated { key, kind });
            }
            TraceEvent::Find { rtype, name } => {
                if self.options.cleanup_before_find {
                    self.cleanup(now, &mut outcomes);
                }
                let records = self
                    .cache
                    .find_records(rtype, &name, now)
                    .into_iter()
                    .cloned()
                    .collect();
                outcomes.push(Outcome::Found {
                    rtype,
                    name,
                    records,
                });
            }
            TraceEvent::Cleanup => self.cleanup(now, &mut outcomes),
            TraceEvent::Clear => {
                let dropped = self.cache.len();
                self.cache.clear();
                outcomes.push(Outcome::Cleared { dropped });
            }
        }

        self.report.events += 1;
        for outcome in &outcomes {
            debug!("{}ms: {outcome}", timed.offset_ms);
            self.report.record(outcome);
        }
        Ok(outcomes)
    }

    fn cleanup(&mut self, now: SystemTime, outcomes: &mut Vec<Outcome>) {
        self.cache
            .cleanup_records(now, |record| outcomes.push(Outcome::Removed(record.clone())));
    }

    /// Executa um trace completo, entregando cada resultado a `sink` junto do offset.
    pub fn replay_str<F>(&mut self, trace: &str, mut sink: F) -> MdnsResult<()>
    where
        F: FnMut(u64, &Outcome),
    {
        for (index, line) in trace.lines().enumerate() {
            let line_no = index + 1;
            let result = TimedEvent::from_line(line, self.epoch).and_then(|parsed| {
                match parsed {
                    Some(timed) => {
                        let offset = timed.offset_ms;
                        self.apply(timed).map(|outcomes| Some((offset, outcomes)))
                    }
                    None => Ok(None),
                }
            });

            match result {
                Ok(Some((offset, outcomes))) => {
                    for outcome in &outcomes {
                        sink(offset, outcome);
                    }
                }
                Ok(None) => {}
                Err(e) if self.options.lenient => {
                    warn!("linha {line_no} ignorada: {e}");
                    self.report.skipped_lines += 1;
                }
                Err(e) => return Err(MdnsError::at_line(line_no, e)),
            }
        }
        Ok(())
    }
}

/// Lê o trace de `path` e o executa num cache novo.
pub fn replay_file<F>(
    path: &Path,
    config: CacheConfig,
    options: ReplayOptions,
    sink: F,
) -> MdnsResult<ReplayReport>
where
    F: FnMut(u64, &Outcome),
{
    let trace = std::fs::read_to_string(path)?;
    let mut replayer = Replayer::new(config, options);
    replayer.replay_str(&trace, sink)?;
    Ok(replayer.report)
}
