//! # Scheduler: the cooperative tick loop that drives the lot.
//!
//! The [`Scheduler`] owns every piece of lot state ([`SlotRegistry`]), the two
//! timer-driven controllers, the devices and the optional [`StatusServer`]. It is
//! the single mutator of lot state, so nothing in here is locked.
//!
//! ## One tick
//! ```text
//! tick(now = clock.now(), at = clock.instant()):
//!   1. server.poll_once(lot, now)      accept at most one connection, never wait for one
//!        ├─ Some(Ok(route)) ─► RequestServed
//!        ├─ Some(Err(e))    ─► RequestFailed (connection closed, tick continues)
//!        └─ None            ─► (nothing pending)
//!   2. range.distance_cm() ─► gate.step(reading, lot.is_full(), at)
//!        ├─ Opening/Closing ─► actuator.set_angle(..), GateOpening/GateClosing
//!        ├─ Refused         ─► display "FULL", GateRefused
//!        └─ NoticeOver      ─► display free summary
//!   3. for slot in 1..=N (ascending):
//!        presence.is_present()
//!        ├─ free & present      ─► lot.arrive ─► TicketOpened | ArrivalRejected
//!        └─ occupied            ─► debounce.observe
//!                                   ├─ Armed      ─► DepartureSuspected
//!                                   ├─ Cancelled  ─► DepartureCancelled
//!                                   └─ Confirmed  ─► lot.depart ─► TicketClosed
//!   4. forward bus events to the SubscriberSet
//! ```
//!
//! `now` (wall time) stamps tickets, fees and events; `at` (monotonic time)
//! drives the gate and settle deadlines. Display frames are rendered at
//! `display_width` before they reach the [`DisplaySink`].
//!
//! `run()` repeats the tick with `tick_interval` of idle sleep in between.
//!
//! ## Shutdown path
//! ```text
//! token.cancelled() | wait_for_shutdown_signal()
//!     └─► Bus.publish(ShutdownRequested)
//!     └─► Bus.publish(SchedulerStopped)   (ledger totals)
//!     └─► SubscriberSet::shutdown()   (queued events are drained)
//! ```
//!
//! ## Failure handling
//! A failed device read publishes `SensorFailed` and skips that device for the
//! tick. A failed status exchange publishes `RequestFailed`. Neither stops the
//! loop; `run()` only returns on shutdown.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::control::{DebounceOutcome, DepartureDebouncer, GateController, GateEvent, GateState};
use crate::core::{Clock, LotConfig, Timestamp, shutdown};
use crate::error::{LotError, SensorError};
use crate::events::{Bus, Event, EventKind};
use crate::hw::{DisplayFrame, DisplaySink, GateActuator, PresenceSensor, RangeSensor};
use crate::lot::{Arrival, SlotRegistry, TicketId};
use crate::server::StatusServer;
use crate::subscribers::SubscriberSet;

use super::builder::SchedulerBuilder;

/// Devices wired into the scheduler.
pub(crate) struct Devices {
    /// Presence sensors, index `i` watches slot `i + 1`.
    pub(crate) presence: Vec<Box<dyn PresenceSensor>>,
    pub(crate) range: Box<dyn RangeSensor>,
    pub(crate) actuator: Box<dyn GateActuator>,
    pub(crate) display: Box<dyn DisplaySink>,
}

/// Single-threaded cooperative scheduler for one lot.
pub struct Scheduler {
    cfg: LotConfig,
    lot: SlotRegistry,
    gate: GateController,
    debounce: DepartureDebouncer,
    devices: Devices,
    server: Option<StatusServer>,
    clock: Arc<dyn Clock>,
    bus: Bus,
    listener: broadcast::Receiver<Event>,
    subs: SubscriberSet,
    /// Slots whose current presence was already reported as rejected.
    rejected: BTreeSet<u16>,
    started: bool,
}

impl Scheduler {
    /// Returns a builder for configuring devices and subscribers.
    ///
    /// # Example
    /// ```rust
    /// use lotkeeper::hw::{SimActuator, SimDisplay, SimPresence, SimRange};
    /// use lotkeeper::{LotConfig, Scheduler};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> Result<(), lotkeeper::LotError> {
    /// let slot1 = SimPresence::new();
    /// let mut sched = Scheduler::builder(LotConfig { capacity: 1, ..LotConfig::default() })
    ///     .with_slot_sensor(slot1.clone())
    ///     .with_range(SimRange::new())
    ///     .with_actuator(SimActuator::new())
    ///     .with_display(SimDisplay::default())
    ///     .build()?;
    ///
    /// slot1.set(true);
    /// sched.tick().await;
    /// assert!(sched.lot().is_full());
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder(cfg: LotConfig) -> SchedulerBuilder {
        SchedulerBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: LotConfig,
        lot: SlotRegistry,
        devices: Devices,
        server: Option<StatusServer>,
        clock: Arc<dyn Clock>,
        bus: Bus,
        subs: SubscriberSet,
    ) -> Self {
        let listener = bus.subscribe();
        Self {
            gate: GateController::new(&cfg),
            debounce: DepartureDebouncer::new(cfg.settle),
            cfg,
            lot,
            devices,
            server,
            clock,
            bus,
            listener,
            subs,
            rejected: BTreeSet::new(),
            started: false,
        }
    }

    /// Lot state (read-only).
    pub fn lot(&self) -> &SlotRegistry {
        &self.lot
    }

    /// Current gate state.
    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    /// Slots with a departure currently settling.
    pub fn pending_departures(&self) -> usize {
        self.debounce.pending_count()
    }

    /// Configuration the scheduler was built with.
    pub fn config(&self) -> &LotConfig {
        &self.cfg
    }

    /// Creates a receiver that observes every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Commands the gate closed and shows the free-slot summary.
    ///
    /// Runs once; [`tick`](Self::tick) and [`run`](Self::run) call it on first use.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.devices.actuator.set_angle(self.cfg.closed_angle);
        self.refresh_display();
    }

    /// Runs one scheduler pass at the clock's current instant.
    pub async fn tick(&mut self) {
        self.start();
        let now = self.clock.now();
        let at = self.clock.instant();

        self.serve(now).await;
        self.step_gate(at);
        // Capacity is validated to fit u16.
        let count = self.devices.presence.len() as u16;
        for slot in 1..=count {
            if let Err(e) = self.step_slot(slot, now, at) {
                tracing::error!(error = e.as_label(), detail = %e.as_message(), "slot step failed");
            }
        }
        self.forward();
    }

    /// Ticks until `token` is cancelled or the process receives a termination
    /// signal, then stops subscribers after draining their queues.
    pub async fn run(mut self, token: CancellationToken) {
        self.start();
        tracing::debug!(capacity = self.lot.capacity(), "scheduler started");

        let signal = async {
            if let Err(e) = shutdown::wait_for_shutdown_signal().await {
                tracing::warn!(error = %e, "os signals unavailable, relying on the cancellation token");
                std::future::pending::<()>().await;
            }
        };
        tokio::pin!(signal);

        let reason = loop {
            self.tick().await;
            tokio::select! {
                _ = token.cancelled() => break "cancelled",
                _ = &mut signal => break "signal",
                _ = tokio::time::sleep(self.cfg.tick_interval) => {}
            }
        };

        self.publish(Event::new(EventKind::ShutdownRequested).with_reason(reason));

        let ledger = self.lot.ledger();
        let (closed, revenue) = (ledger.closed_total(), ledger.revenue_total());
        tracing::debug!(closed, revenue, "scheduler stopped");
        self.publish(Event::scheduler_stopped(closed, revenue));
        self.forward();
        self.subs.shutdown().await;
    }

    async fn serve(&mut self, now: Timestamp) {
        let Some(server) = &self.server else {
            return;
        };
        let Some(exchange) = server.poll_once(&self.lot, now).await else {
            return;
        };

        let ev = match exchange.result {
            Ok(route) => Event::new(EventKind::RequestServed).with_reason(route.as_str()),
            Err(e) => Event::new(EventKind::RequestFailed)
                .with_reason(format!("{}: {}", e.as_label(), e.as_message())),
        };
        let ev = match exchange.peer {
            Some(peer) => ev.with_source(peer.to_string()),
            None => ev,
        };
        self.publish(ev);
    }

    fn step_gate(&mut self, at: Instant) {
        let reading = match self.devices.range.distance_cm() {
            Ok(reading) => reading,
            Err(e) => {
                self.sensor_failed(None, &e);
                None
            }
        };

        match self.gate.step(reading, self.lot.is_full(), at) {
            GateEvent::Quiet => {}
            GateEvent::Opening { angle } => {
                self.devices.actuator.set_angle(angle);
                self.publish(Event::new(EventKind::GateOpening));
            }
            GateEvent::Holding { .. } => {
                self.publish(Event::new(EventKind::GateHolding));
            }
            GateEvent::Closing { angle } => {
                self.devices.actuator.set_angle(angle);
                self.publish(Event::new(EventKind::GateClosing));
            }
            GateEvent::Closed => {
                self.publish(Event::new(EventKind::GateIdle));
            }
            GateEvent::Refused { .. } => {
                self.show(&DisplayFrame::Full);
                self.publish(Event::new(EventKind::GateRefused));
            }
            GateEvent::NoticeOver => self.refresh_display(),
        }
    }

    fn step_slot(&mut self, slot: u16, now: Timestamp, at: Instant) -> Result<(), LotError> {
        let held = self.lot.slot(slot)?.ticket();
        let present = match self.devices.presence[usize::from(slot) - 1].is_present() {
            Ok(present) => present,
            Err(e) => {
                self.sensor_failed(Some(slot), &e);
                return Ok(());
            }
        };

        match self.debounce.observe(slot, present, held.is_some(), at) {
            DebounceOutcome::Steady | DebounceOutcome::Settling => {}
            DebounceOutcome::Armed { .. } => {
                self.publish_for(EventKind::DepartureSuspected, slot, held);
            }
            DebounceOutcome::Cancelled => {
                self.publish_for(EventKind::DepartureCancelled, slot, held);
            }
            DebounceOutcome::Confirmed => {
                if let Some(closed) = self.lot.depart(slot, now)? {
                    self.publish(Event::ticket_closed(&closed));
                    self.refresh_display();
                }
            }
        }

        if held.is_some() {
            return Ok(());
        }
        if !present {
            self.rejected.remove(&slot);
            return Ok(());
        }
        match self.lot.arrive(slot, now)? {
            Arrival::Opened(id) => {
                self.rejected.remove(&slot);
                self.publish_for(EventKind::TicketOpened, slot, Some(id));
                self.refresh_display();
            }
            Arrival::PoolExhausted => {
                if self.rejected.insert(slot) {
                    self.publish(Event::new(EventKind::ArrivalRejected).with_slot(slot));
                }
            }
            Arrival::AlreadyOccupied => {}
        }
        Ok(())
    }

    fn publish_for(&self, kind: EventKind, slot: u16, ticket: Option<TicketId>) {
        let ev = Event::new(kind).with_slot(slot);
        self.publish(match ticket {
            Some(id) => ev.with_ticket(id),
            None => ev,
        });
    }

    fn sensor_failed(&self, slot: Option<u16>, e: &SensorError) {
        let ev = Event::new(EventKind::SensorFailed)
            .with_reason(format!("{}: {}", e.as_label(), e.as_message()));
        self.publish(match slot {
            Some(slot) => ev.with_slot(slot),
            None => ev,
        });
    }

    /// Shows the free-slot summary unless the "FULL" notice is up.
    fn refresh_display(&mut self) {
        if self.gate.notice_active() {
            return;
        }
        self.show(&DisplayFrame::summary(self.lot.free_slots()));
    }

    fn show(&mut self, frame: &DisplayFrame) {
        self.devices.display.show(&frame.lines(self.cfg.display_width));
    }

    /// Publishes `ev` stamped with the scheduler clock.
    fn publish(&self, ev: Event) {
        self.bus.publish(ev.with_at(self.clock.now()));
    }

    /// Subscriber listener: moves everything published so far into the subscriber set.
    fn forward(&mut self) {
        loop {
            match self.listener.try_recv() {
                Ok(ev) => self.subs.emit(&ev),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber listener lagged behind the bus");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }
}

#[cfg(test)]
impl Scheduler {
    pub(crate) fn lot_mut(&mut self) -> &mut SlotRegistry {
        &mut self.lot
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;
    use crate::core::ManualClock;
    use crate::hw::{SimActuator, SimDisplay, SimPresence, SimRange};
    use crate::lot::SlotState;
    use crate::subscribers::Subscribe;

    struct Rig {
        clock: ManualClock,
        slots: Vec<SimPresence>,
        range: SimRange,
        actuator: SimActuator,
        display: SimDisplay,
        sched: Scheduler,
        events: broadcast::Receiver<Event>,
    }

    fn cfg() -> LotConfig {
        LotConfig {
            capacity: 3,
            rate_per_minute: 0.5,
            ..LotConfig::default()
        }
    }

    fn rig_with(cfg: LotConfig, subscribers: Vec<Arc<dyn Subscribe>>) -> Rig {
        let clock = ManualClock::epoch();
        let slots: Vec<SimPresence> = (0..cfg.capacity).map(|_| SimPresence::new()).collect();
        let range = SimRange::new();
        let actuator = SimActuator::new();
        let display = SimDisplay::new();

        let sched = Scheduler::builder(cfg)
            .with_slot_sensors(
                slots
                    .iter()
                    .map(|s| Box::new(s.clone()) as Box<dyn PresenceSensor>)
                    .collect(),
            )
            .with_range(range.clone())
            .with_actuator(actuator.clone())
            .with_display(display.clone())
            .with_subscribers(subscribers)
            .with_clock(Arc::new(clock.clone()))
            .build()
            .unwrap();
        let events = sched.subscribe();
        Rig {
            clock,
            slots,
            range,
            actuator,
            display,
            sched,
            events,
        }
    }

    fn rig() -> Rig {
        rig_with(cfg(), Vec::new())
    }

    fn lines(frame: DisplayFrame) -> [String; 2] {
        frame.lines(16)
    }

    impl Rig {
        fn kinds(&mut self) -> Vec<EventKind> {
            let mut out = Vec::new();
            while let Ok(ev) = self.events.try_recv() {
                out.push(ev.kind);
            }
            out
        }

        fn last_lines(&self) -> [String; 2] {
            self.display.current().unwrap()
        }
    }

    #[tokio::test]
    async fn start_closes_gate_and_shows_summary() {
        let mut r = rig();
        r.sched.tick().await;
        assert_eq!(r.actuator.commands(), vec![0]);
        assert_eq!(r.last_lines(), lines(DisplayFrame::FreeSlots(vec![1, 2, 3])));
        assert!(r.kinds().is_empty());
    }

    #[tokio::test]
    async fn quick_departure_closes_free_ticket_and_reuses_identifier() {
        let mut r = rig();

        r.slots[0].set(true);
        r.sched.tick().await;
        assert_eq!(r.sched.lot().slot(1).unwrap().ticket(), Some(TicketId::new_for_test(1)));
        assert_eq!(r.last_lines(), lines(DisplayFrame::FreeSlots(vec![2, 3])));

        r.slots[0].set(false);
        r.sched.tick().await;
        assert!(r.sched.lot().slot(1).unwrap().is_occupied());
        assert_eq!(r.sched.pending_departures(), 1);

        r.clock.advance(Duration::from_secs(1));
        r.sched.tick().await;
        let closed = r.sched.lot().ledger().last().cloned().unwrap();
        assert_eq!((closed.id.get(), closed.slot), (1, 1));
        assert_eq!(closed.minutes, 0.0);
        assert_eq!(closed.fee, 0.0);
        assert!(r.sched.lot().pool().is_free(closed.id));
        assert_eq!(r.last_lines(), lines(DisplayFrame::FreeSlots(vec![1, 2, 3])));

        r.slots[1].set(true);
        r.sched.tick().await;
        assert_eq!(r.sched.lot().slot(2).unwrap().ticket(), Some(TicketId::new_for_test(1)));

        assert_eq!(
            r.kinds(),
            vec![
                EventKind::TicketOpened,
                EventKind::DepartureSuspected,
                EventKind::TicketClosed,
                EventKind::TicketOpened,
            ]
        );
    }

    #[tokio::test]
    async fn full_lot_refuses_gate_and_shows_full() {
        let mut r = rig();
        for s in &r.slots {
            s.set(true);
        }
        r.sched.tick().await;
        assert!(r.sched.lot().is_full());
        r.kinds();

        r.range.set(Some(8.0));
        r.sched.tick().await;
        assert_eq!(r.last_lines(), lines(DisplayFrame::Full));
        assert_eq!(r.actuator.commands(), vec![0]);
        assert_eq!(r.sched.gate_state(), GateState::Idle);
        assert_eq!(r.kinds(), vec![EventKind::GateRefused]);

        // Notice over: the summary comes back, still no movement.
        r.range.set(None);
        r.clock.advance(Duration::from_secs(2));
        r.sched.tick().await;
        assert_eq!(r.actuator.commands(), vec![0]);
        assert_eq!(r.display.current().unwrap()[0], "FULL");
        assert!(r.kinds().is_empty());
    }

    #[tokio::test]
    async fn presence_returning_within_settle_keeps_ticket() {
        let mut r = rig();
        r.slots[2].set(true);
        r.sched.tick().await;
        let entry = r.sched.lot().slot(3).unwrap().entry();

        r.clock.advance(Duration::from_millis(200));
        r.slots[2].set(false);
        r.sched.tick().await;

        r.clock.advance(Duration::from_millis(500));
        r.slots[2].set(true);
        r.sched.tick().await;

        r.clock.advance(Duration::from_secs(2));
        r.sched.tick().await;

        let slot = r.sched.lot().slot(3).unwrap();
        assert!(slot.is_occupied());
        assert_eq!(slot.entry(), entry);
        assert!(r.sched.lot().ledger().is_empty());
        assert_eq!(
            r.kinds(),
            vec![
                EventKind::TicketOpened,
                EventKind::DepartureSuspected,
                EventKind::DepartureCancelled,
            ]
        );
    }

    #[tokio::test]
    async fn arrival_with_exhausted_pool_leaves_slot_free() {
        let mut r = rig();
        let pool = r.sched.lot_mut().pool_mut();
        while pool.allocate().is_some() {}

        r.slots[0].set(true);
        r.sched.tick().await;
        r.sched.tick().await;

        let slot = r.sched.lot().slot(1).unwrap();
        assert_eq!(slot.state(), SlotState::Free);
        assert_eq!(slot.ticket(), None);
        assert_eq!(r.kinds(), vec![EventKind::ArrivalRejected]);

        // A fresh presence is reported again.
        r.slots[0].set(false);
        r.sched.tick().await;
        r.slots[0].set(true);
        r.sched.tick().await;
        assert_eq!(r.kinds(), vec![EventKind::ArrivalRejected]);
    }

    #[tokio::test]
    async fn gate_cycle_moves_actuator_open_then_closed() {
        let mut r = rig();
        r.range.set(Some(5.0));
        r.sched.tick().await;
        assert_eq!(r.sched.gate_state(), GateState::Opening);
        assert_eq!(r.actuator.angle(), Some(90));

        r.range.set(None);
        r.sched.tick().await;
        assert_eq!(r.sched.gate_state(), GateState::HoldOpen);

        r.clock.advance(Duration::from_secs(5));
        r.sched.tick().await;
        r.sched.tick().await;
        assert_eq!(r.sched.gate_state(), GateState::Idle);
        assert_eq!(r.actuator.commands(), vec![0, 90, 0]);
        assert_eq!(
            r.kinds(),
            vec![
                EventKind::GateOpening,
                EventKind::GateHolding,
                EventKind::GateClosing,
                EventKind::GateIdle,
            ]
        );
    }

    #[tokio::test]
    async fn held_gate_does_not_stall_slot_polling() {
        let mut r = rig();
        r.range.set(Some(5.0));
        r.sched.tick().await;
        r.sched.tick().await;

        r.clock.advance(Duration::from_secs(1));
        r.slots[1].set(true);
        r.sched.tick().await;
        assert_eq!(r.sched.gate_state(), GateState::HoldOpen);
        assert!(r.sched.lot().slot(2).unwrap().is_occupied());
    }

    #[tokio::test]
    async fn failed_sensor_is_skipped_for_the_tick() {
        let mut r = rig();
        r.slots[0].set(true);
        r.slots[0].set_failing(true);
        r.slots[1].set(true);
        r.sched.tick().await;

        assert!(!r.sched.lot().slot(1).unwrap().is_occupied());
        assert!(r.sched.lot().slot(2).unwrap().is_occupied());
        assert_eq!(
            r.kinds(),
            vec![EventKind::SensorFailed, EventKind::TicketOpened]
        );

        r.slots[0].set_failing(false);
        r.sched.tick().await;
        assert!(r.sched.lot().slot(1).unwrap().is_occupied());
    }

    #[tokio::test]
    async fn fee_follows_rounded_minutes() {
        let mut r = rig();
        r.slots[0].set(true);
        r.sched.tick().await;

        r.clock.advance(Duration::from_secs(755));
        r.slots[0].set(false);
        r.sched.tick().await;
        r.clock.advance(Duration::from_secs(1));
        r.sched.tick().await;

        let closed = r.sched.lot().ledger().last().cloned().unwrap();
        assert_eq!(closed.minutes, 12.6);
        assert_eq!(closed.fee, 6.3);
    }

    #[tokio::test]
    async fn status_request_is_served_within_a_tick() {
        let mut r = rig();
        let server = StatusServer::bind("127.0.0.1:0", r.sched.config())
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        r.sched.server = Some(server);

        r.slots[0].set(true);
        r.sched.tick().await;
        r.kinds();

        let mut client = tokio::net::TcpStream::connect(addr).await.unwrap();
        client
            .write_all(b"GET /data HTTP/1.1\r\nHost: lot\r\n\r\n")
            .await
            .unwrap();

        let mut served = false;
        for _ in 0..400 {
            r.sched.tick().await;
            if r.kinds().contains(&EventKind::RequestServed) {
                served = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(served);

        let mut out = String::new();
        client.read_to_string(&mut out).await.unwrap();
        assert!(out.contains("\"occupied\":1"));
    }

    #[tokio::test]
    async fn builder_rejects_mismatched_wiring() {
        let err = Scheduler::builder(cfg())
            .with_slot_sensor(SimPresence::new())
            .with_range(SimRange::new())
            .with_actuator(SimActuator::new())
            .with_display(SimDisplay::default())
            .build()
            .err()
            .unwrap();
        assert_eq!(err.as_label(), "lot_sensor_count");

        let err = Scheduler::builder(LotConfig {
            capacity: 1,
            ..LotConfig::default()
        })
        .with_slot_sensor(SimPresence::new())
        .with_actuator(SimActuator::new())
        .with_display(SimDisplay::default())
        .build()
        .err()
        .unwrap();
        assert_eq!(err.as_label(), "lot_missing_device");

        let err = Scheduler::builder(LotConfig {
            rate_per_minute: -1.0,
            ..cfg()
        })
        .build()
        .err()
        .unwrap();
        assert_eq!(err.as_label(), "lot_config");
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<Event>>,
    }

    impl Recorder {
        fn kinds(&self) -> Vec<EventKind> {
            self.seen.lock().unwrap().iter().map(|e| e.kind).collect()
        }
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.clone());
        }
    }

    #[tokio::test]
    async fn run_stops_on_cancel_and_drains_subscribers() {
        let rec = Arc::new(Recorder::default());
        let r = rig_with(cfg(), vec![rec.clone()]);
        r.slots[0].set(true);

        let token = CancellationToken::new();
        token.cancel();
        r.sched.run(token).await;

        assert_eq!(
            rec.kinds(),
            vec![
                EventKind::TicketOpened,
                EventKind::ShutdownRequested,
                EventKind::SchedulerStopped,
            ]
        );
    }

    #[tokio::test]
    async fn stop_event_reports_ledger_totals() {
        let rec = Arc::new(Recorder::default());
        let mut r = rig_with(cfg(), vec![rec.clone()]);
        r.slots[0].set(true);
        r.sched.tick().await;
        r.clock.advance(Duration::from_secs(120));
        r.slots[0].set(false);
        r.sched.tick().await;
        r.clock.advance(Duration::from_secs(1));
        r.sched.tick().await;

        let token = CancellationToken::new();
        token.cancel();
        r.sched.run(token).await;

        let seen = rec.seen.lock().unwrap();
        let stopped = seen.last().unwrap();
        assert_eq!(stopped.kind, EventKind::SchedulerStopped);
        assert_eq!(stopped.fee, Some(1.0));
        assert_eq!(stopped.reason.as_deref(), Some("closed=1 revenue=1.00"));
    }

    #[tokio::test]
    async fn events_carry_the_scheduler_clock() {
        let mut r = rig();
        r.clock.advance(Duration::from_secs(3600));
        r.slots[1].set(true);
        r.sched.tick().await;

        let ev = r.events.try_recv().unwrap();
        assert_eq!(ev.kind, EventKind::TicketOpened);
        assert_eq!(ev.at, r.clock.now());
        assert_eq!(Some(ev.at), r.sched.lot().slot(2).unwrap().entry());
    }

    #[tokio::test]
    async fn display_lines_follow_configured_width() {
        let mut r = rig_with(
            LotConfig {
                display_width: 4,
                ..cfg()
            },
            Vec::new(),
        );
        r.sched.tick().await;
        assert_eq!(r.last_lines(), ["Free".to_string(), "S1 S".to_string()]);
    }

    #[tokio::test]
    async fn wall_clock_step_back_does_not_stall_timers() {
        let mut r = rig();
        r.clock.set(ManualClock::epoch().now() + chrono::TimeDelta::seconds(7200));
        r.slots[0].set(true);
        r.sched.tick().await;

        r.range.set(Some(5.0));
        r.slots[0].set(false);
        r.sched.tick().await;
        r.range.set(None);
        assert_eq!(r.sched.gate_state(), GateState::Opening);
        assert_eq!(r.sched.pending_departures(), 1);

        // NTP-style correction: wall time jumps back an hour.
        r.clock.set(ManualClock::epoch().now() + chrono::TimeDelta::seconds(3600));
        for _ in 0..60 {
            r.clock.advance(Duration::from_millis(100));
            r.sched.tick().await;
        }

        assert_eq!(r.sched.gate_state(), GateState::Idle);
        assert_eq!(r.sched.pending_departures(), 0);
        assert!(!r.sched.lot().slot(1).unwrap().is_occupied());
        assert_eq!(r.actuator.commands(), vec![0, 90, 0]);
    }
}
