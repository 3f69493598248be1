//! Lock-step runner for a fleet of vehicle sessions.

use ft_core::SimConfig;

use crate::record::{CorrectionCounters, EventRecord};
use crate::session::{SessionStatus, VehicleSession};
use crate::{EventSink, SimResult};

/// Totals for one [`Fleet::run`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FleetReport {
    /// Fleet ticks executed (the longest session's length).
    pub ticks:       u64,
    pub records:     u64,
    pub incidents:   u64,
    pub sessions:    usize,
    pub delivered:   usize,
    pub corrections: CorrectionCounters,
}

/// A set of started sessions advanced together, one tick at a time.
///
/// Sessions are held in ascending vehicle id order.  Each fleet tick:
///
/// 1. **Compute** — tick every running session (on Rayon with the
///    `parallel` feature).  Sessions share nothing mutable, so this step has
///    no ordering dependency.
/// 2. **Deliver** — hand the records to the sink sequentially in ascending
///    vehicle id order, followed by a summary for each session that
///    completed this tick.
///
/// Delivery order is therefore identical with and without `parallel`.
///
/// Create via [`FleetBuilder`][crate::FleetBuilder].
pub struct Fleet {
    pub config: SimConfig,
    sessions:   Vec<VehicleSession>,
    #[cfg(feature = "parallel")]
    pool:       Option<rayon::ThreadPool>,
}

impl Fleet {
    pub(crate) fn new(config: SimConfig, sessions: Vec<VehicleSession>) -> SimResult<Self> {
        #[cfg(feature = "parallel")]
        let pool = match config.num_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| crate::SimError::Config(format!("thread pool: {e}")))?,
            ),
            None => None,
        };

        Ok(Self {
            config,
            sessions,
            #[cfg(feature = "parallel")]
            pool,
        })
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn sessions(&self) -> &[VehicleSession] {
        &self.sessions
    }

    /// Number of sessions still producing records.
    pub fn running(&self) -> usize {
        self.sessions
            .iter()
            .filter(|s| s.status() == SessionStatus::Running)
            .count()
    }

    /// Run every session to completion, delivering records to `sink`.
    ///
    /// The first session error aborts the run; records already delivered
    /// stay delivered and `on_run_end` is not called.
    pub fn run<S: EventSink>(&mut self, sink: &mut S) -> SimResult<FleetReport> {
        log::info!(
            "fleet run: {} vehicles, seed {}, max {} ticks of {} s",
            self.sessions.len(),
            self.config.seed,
            self.config.max_ticks,
            self.config.tick_duration_secs
        );

        let mut report = FleetReport::default();
        while self.running() > 0 {
            for (i, result) in self.compute_tick() {
                let record = result?;
                report.records += 1;
                report.incidents += record.incident_count;
                sink.on_record(record);

                let session = &self.sessions[i];
                if session.status() == SessionStatus::Completed {
                    if let Some(summary) = session.summary() {
                        report.sessions += 1;
                        report.delivered += usize::from(summary.delivered);
                        report.corrections.merge(&summary.corrections);
                        sink.on_session_end(&summary);
                    }
                }
            }
            report.ticks += 1;
        }
        sink.on_run_end();

        log::info!(
            "fleet run finished: {} ticks, {} records, {} incidents, {}/{} delivered",
            report.ticks,
            report.records,
            report.incidents,
            report.delivered,
            report.sessions
        );
        if report.corrections.total() > 0 {
            log::warn!(
                "numerical corrections applied: {} speed clamps, {} lambda floors",
                report.corrections.speed_clamped,
                report.corrections.lambda_floored
            );
        }
        Ok(report)
    }

    /// Tick every running session; results in ascending session order.
    fn compute_tick(&mut self) -> Vec<(usize, SimResult<EventRecord>)> {
        #[cfg(not(feature = "parallel"))]
        {
            self.sessions
                .iter_mut()
                .enumerate()
                .filter(|(_, s)| s.status() == SessionStatus::Running)
                .map(|(i, s)| (i, s.tick()))
                .collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let sessions = &mut self.sessions;
            let mut tick_all = move || {
                sessions
                    .par_iter_mut()
                    .enumerate()
                    .filter(|(_, s)| s.status() == SessionStatus::Running)
                    .map(|(i, s)| (i, s.tick()))
                    .collect::<Vec<_>>()
            };
            match &self.pool {
                Some(pool) => pool.install(tick_all),
                None       => tick_all(),
            }
        }
    }
}
