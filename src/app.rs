//! Application Coordinator
//!
//! Runs the classification cycle (recognize, interpret, classify, decide,
//! dispatch) as one sequential unit of work, and schedules it periodically.

use chrono::{Local, NaiveDateTime};
use crossbeam_channel::{select, tick, Receiver};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::analysis::{classify, Classification, Decision, NotificationPolicy};
use crate::capture::{CapturedFrame, FrameSource};
use crate::config::WatchConfig;
use crate::error::Result;
use crate::notify::{DispatchReport, Dispatcher, MessageTransport};
use crate::storage::NotificationLedger;
use crate::vision::{interpret, render_report, Observation, Recognizer};

/// Everything one cycle observed and decided
#[derive(Debug)]
pub struct CycleOutcome {
    pub observations: Vec<Observation>,
    /// Numbered recognition report
    pub report: String,
    pub classification: Classification,
    pub decision: Decision,
    pub dispatch: DispatchReport,
}

/// Main application coordinator
pub struct ChargeWatchApp {
    config: WatchConfig,
    ledger: NotificationLedger,
    recognizer: Box<dyn Recognizer>,
    transport: Box<dyn MessageTransport>,
}

impl ChargeWatchApp {
    pub fn new(
        config: WatchConfig,
        ledger: NotificationLedger,
        recognizer: Box<dyn Recognizer>,
        transport: Box<dyn MessageTransport>,
    ) -> Self {
        Self {
            config,
            ledger,
            recognizer,
            transport,
        }
    }

    #[cfg(test)]
    pub fn ledger(&self) -> &NotificationLedger {
        &self.ledger
    }

    /// Run one full cycle for `frame` at wall-clock time `now`.
    ///
    /// Recognition failures degrade to "no observations". A ledger failure
    /// aborts the cycle before anything is sent and is returned so the next
    /// cycle can retry.
    pub fn run_cycle(&self, frame: &CapturedFrame, now: NaiveDateTime) -> Result<CycleOutcome> {
        let records = match self.recognizer.recognize(frame) {
            Ok(records) => records,
            Err(e) => {
                warn!("Recognition unavailable, treating as no text: {}", e);
                Vec::new()
            }
        };

        let observations = interpret(&records, &self.config.labels);
        let report = render_report(&observations);
        for line in report.lines() {
            debug!("{}", line);
        }

        let classification = classify(&observations, &self.config.keywords);
        let policy = NotificationPolicy::from_config(&self.config);
        let decision = policy.decide(now, classification.charging, &self.ledger)?;

        let dispatch =
            Dispatcher::new(self.transport.as_ref(), &self.config).dispatch(decision, now);

        Ok(CycleOutcome {
            observations,
            report,
            classification,
            decision,
            dispatch,
        })
    }
}

/// Periodic cycle trigger
pub struct Scheduler {
    interval: Duration,
    total_cycles: u64,
    failed_cycles: u64,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            total_cycles: 0,
            failed_cycles: 0,
        }
    }

    #[cfg(test)]
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    #[cfg(test)]
    pub fn failed_cycles(&self) -> u64 {
        self.failed_cycles
    }

    /// Capture a frame and run one cycle, logging rather than propagating
    /// failures so the next tick retries
    pub fn tick(
        &mut self,
        app: &ChargeWatchApp,
        frames: &FrameSource,
        now: NaiveDateTime,
    ) -> Option<Decision> {
        self.total_cycles += 1;

        let frame = match frames.next_frame() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Frame capture failed, using blank frame: {}", e);
                CapturedFrame::blank()
            }
        };

        match app.run_cycle(&frame, now) {
            Ok(outcome) => Some(outcome.decision),
            Err(e) => {
                self.failed_cycles += 1;
                if e.is_retryable() {
                    error!("Cycle aborted, will retry next tick: {}", e);
                } else {
                    error!("Cycle failed: {}", e);
                }
                None
            }
        }
    }

    /// Run a cycle immediately and then on every interval until `shutdown`
    /// fires or disconnects
    pub fn run(&mut self, app: &ChargeWatchApp, frames: &FrameSource, shutdown: &Receiver<()>) {
        info!("Scheduler running every {:?}", self.interval);
        let ticker = tick(self.interval);

        self.tick(app, frames, Local::now().naive_local());
        loop {
            select! {
                recv(ticker) -> _ => {
                    self.tick(app, frames, Local::now().naive_local());
                }
                recv(shutdown) -> _ => {
                    info!(
                        "Scheduler stopping after {} cycles ({} failed)",
                        self.total_cycles, self.failed_cycles
                    );
                    return;
                }
            }
        }
    }
}
