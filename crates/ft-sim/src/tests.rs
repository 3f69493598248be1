//! Unit tests for ft-sim.

use std::collections::BTreeMap;
use std::sync::Arc;

use ft_core::{GeoPoint, SimConfig, Tick, VehicleId};
use ft_models::{Ar1Params, Channel, DriverState, GeneratorConfig, ModelSet, RouteState};

use crate::{
    EventRecord, FleetBuilder, InitialContext, ProfileGenerator, SessionStatus, SimError,
    VecSink, VehicleSession,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn sim_config(max_ticks: u64) -> SimConfig {
    SimConfig {
        start_unix_secs:    1_700_000_000,
        tick_duration_secs: 60,
        max_ticks,
        seed:               42,
        num_threads:        Some(1),
        stop_on_delivery:   true,
    }
}

fn default_models() -> Arc<ModelSet> {
    GeneratorConfig::default().build().unwrap().into_shared()
}

/// Route rows that walk warehouse → highway → urban → customer, one state
/// per tick, with a single temperature channel.
fn scripted_models() -> Arc<ModelSet> {
    let mut cfg = GeneratorConfig::default();
    cfg.transition_matrices.route = BTreeMap::from([
        ("warehouse".to_owned(), vec![0.0, 1.0, 0.0, 0.0]),
        ("highway".to_owned(), vec![0.0, 0.0, 1.0, 0.0]),
        ("urban".to_owned(), vec![0.0, 0.0, 0.0, 1.0]),
        ("customer".to_owned(), vec![0.0, 0.0, 0.0, 1.0]),
    ]);
    cfg.ar1_params = BTreeMap::from([(Channel::EngineTemp, Ar1Params::new(0.95, 1.0, 90.0))]);
    cfg.build().unwrap().into_shared()
}

fn context() -> InitialContext {
    InitialContext::new(GeoPoint::new(24.86, 67.00), GeoPoint::new(25.10, 67.30))
}

fn started(models: Arc<ModelSet>, config: SimConfig, ctx: InitialContext) -> VehicleSession {
    let seed = config.seed;
    let mut session = VehicleSession::new(models, config);
    session.start(VehicleId(0), seed, ctx).unwrap();
    session
}

fn run_to_end(session: &mut VehicleSession) -> Vec<EventRecord> {
    let mut out = Vec::new();
    while session.status() == SessionStatus::Running {
        out.push(session.tick().unwrap());
    }
    out
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use super::*;

    #[test]
    fn tick_before_start_fails() {
        let mut session = VehicleSession::new(default_models(), sim_config(10));
        assert_eq!(session.status(), SessionStatus::NotStarted);
        match session.tick() {
            Err(SimError::InvalidState { op, status }) => {
                assert_eq!(op, "tick");
                assert_eq!(status, SessionStatus::NotStarted);
            }
            other => panic!("expected InvalidState, got {other:?}"),
        }
        assert!(session.summary().is_none());
    }

    #[test]
    fn start_twice_fails() {
        let mut session = started(default_models(), sim_config(10), context());
        let err = session.start(VehicleId(0), 42, context()).unwrap_err();
        assert!(matches!(
            err,
            SimError::InvalidState { op: "start", status: SessionStatus::Running }
        ));
    }

    #[test]
    fn tick_after_stop_fails() {
        let mut session = started(default_models(), sim_config(10), context());
        session.tick().unwrap();
        session.stop();
        assert_eq!(session.status(), SessionStatus::Completed);
        assert!(matches!(
            session.tick(),
            Err(SimError::InvalidState { status: SessionStatus::Completed, .. })
        ));
    }

    #[test]
    fn stop_is_idempotent() {
        let mut session = started(default_models(), sim_config(10), context());
        session.tick().unwrap();
        session.stop();
        let before = session.summary();
        session.stop();
        assert_eq!(session.status(), SessionStatus::Completed);
        assert_eq!(session.summary(), before);
    }

    #[test]
    fn stop_before_start_completes() {
        let mut session = VehicleSession::new(default_models(), sim_config(10));
        session.stop();
        assert_eq!(session.status(), SessionStatus::Completed);
        assert!(session.start(VehicleId(0), 42, context()).is_err());
    }

    #[test]
    fn invalid_sim_config_rejected_at_start() {
        let mut cfg = sim_config(10);
        cfg.tick_duration_secs = 0;
        let mut session = VehicleSession::new(default_models(), cfg);
        assert!(matches!(
            session.start(VehicleId(0), 42, context()),
            Err(SimError::Config(_))
        ));
        assert_eq!(session.status(), SessionStatus::NotStarted);
    }

    #[test]
    fn max_ticks_bounds_session() {
        let mut cfg = sim_config(25);
        cfg.stop_on_delivery = false;
        let mut session = started(default_models(), cfg, context());
        let records = run_to_end(&mut session);
        assert_eq!(records.len(), 25);
        assert_eq!(session.status(), SessionStatus::Completed);
        assert!(session.tick().is_err());
        assert_eq!(session.summary().unwrap().ticks, 25);
    }

    #[test]
    fn delivery_completes_session() {
        let mut session = started(default_models(), sim_config(10_000), context());
        let records = run_to_end(&mut session);
        let last = records.last().unwrap();
        assert_eq!(last.route_state, RouteState::Customer);
        assert!(records[..records.len() - 1]
            .iter()
            .all(|r| r.route_state != RouteState::Customer));
        assert!(session.summary().unwrap().delivered);
    }
}

// ── End-to-end scenario ───────────────────────────────────────────────────────

#[cfg(test)]
mod scenario {
    use super::*;

    fn scenario_session() -> VehicleSession {
        let mut ctx = context();
        ctx.initial_driver_state = Some(DriverState::Normal);
        started(scripted_models(), sim_config(100), ctx)
    }

    #[test]
    fn four_tick_delivery() {
        let mut session = scenario_session();
        let records = run_to_end(&mut session);
        let route: Vec<RouteState> = records.iter().map(|r| r.route_state).collect();
        assert_eq!(
            route,
            vec![RouteState::Warehouse, RouteState::Highway, RouteState::Urban, RouteState::Customer]
        );
        assert_eq!(session.status(), SessionStatus::Completed);

        for r in &records {
            let temp = r.telemetry[&Channel::EngineTemp];
            assert!((88.0..=92.0).contains(&temp), "temperature {temp} out of range");
            assert!(r.speed_kmh >= 0.0);
            assert_eq!(r.incident_count, r.incidents.len() as u64);
        }
    }

    #[test]
    fn first_record_is_initial_state() {
        let mut session = scenario_session();
        let first = session.tick_labelled().unwrap();
        assert_eq!(first.record.tick, Tick(0));
        assert_eq!(first.record.timestamp_unix, 1_700_000_000);
        assert_eq!(first.record.route_state, RouteState::Warehouse);
        assert_eq!(first.record.position, GeoPoint::new(24.86, 67.00));
        assert_eq!(first.record.odometer_km, 0.0);
        assert_eq!(first.record.telemetry[&Channel::EngineTemp], 90.0);
        assert_eq!(first.driver_state, DriverState::Normal);

        let second = session.tick().unwrap();
        assert_eq!(second.tick, Tick(1));
        assert_eq!(second.timestamp_unix, 1_700_000_060);
    }

    #[test]
    fn same_seed_gives_identical_json() {
        let a = run_to_end(&mut scenario_session());
        let b = run_to_end(&mut scenario_session());
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }

    #[test]
    fn different_vehicle_ids_diverge() {
        let mut a = VehicleSession::new(default_models(), sim_config(20));
        let mut b = VehicleSession::new(default_models(), sim_config(20));
        a.start(VehicleId(0), 42, context()).unwrap();
        b.start(VehicleId(1), 42, context()).unwrap();
        let (ra, rb) = (run_to_end(&mut a), run_to_end(&mut b));
        let speeds_a: Vec<f64> = ra.iter().map(|r| r.speed_kmh).collect();
        let speeds_b: Vec<f64> = rb.iter().map(|r| r.speed_kmh).collect();
        assert_ne!(speeds_a, speeds_b);
    }
}

// ── Records ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod records {
    use super::*;

    #[test]
    fn hidden_state_not_serialized() {
        let mut session = started(default_models(), sim_config(5), context());
        let record = session.tick().unwrap();
        let json = serde_json::to_value(&record).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("driver_state"));
        assert!(obj.contains_key("driver"));
        assert!(!json.to_string().contains("driver_state"));
    }

    #[test]
    fn state_view_hides_driver_state() {
        let mut session = started(default_models(), sim_config(5), context());
        session.tick().unwrap();
        let state = session.state().unwrap();
        let shown = format!("{state:?}");
        assert!(shown.contains("route_state"));
        assert!(!shown.contains("driver_state"));
        assert!(!format!("{session:?}").contains("driver_state"));
    }

    #[test]
    fn labelled_record_matches_observable_record() {
        let mut plain = started(default_models(), sim_config(30), context());
        let mut labelled = started(default_models(), sim_config(30), context());
        while plain.status() == SessionStatus::Running {
            let a = plain.tick().unwrap();
            let b = labelled.tick_labelled().unwrap();
            assert_eq!(a, b.record);
        }
        assert_eq!(labelled.status(), SessionStatus::Completed);
    }

    #[test]
    fn no_teleporting() {
        let mut cfg = sim_config(200);
        cfg.stop_on_delivery = false;
        let hours = cfg.tick_duration_secs as f64 / 3600.0;
        let max_kmh = GeneratorConfig::default().speed.max_kmh;
        let records = run_to_end(&mut started(default_models(), cfg, context()));
        for pair in records.windows(2) {
            let step_km = pair[0].position.distance_km(pair[1].position);
            assert!(step_km <= max_kmh * hours + 0.1, "jumped {step_km} km");
            assert!(pair[1].odometer_km >= pair[0].odometer_km);
        }
    }

    #[test]
    fn fuel_never_increases() {
        let mut cfg = sim_config(300);
        cfg.stop_on_delivery = false;
        let records = run_to_end(&mut started(default_models(), cfg, context()));
        for pair in records.windows(2) {
            assert!(pair[1].engine.fuel_level_pct <= pair[0].engine.fuel_level_pct);
        }
        assert!(records.iter().all(|r| r.engine.fuel_level_pct >= 0.0));
    }

    #[test]
    fn correction_counters_match_flags() {
        let mut gen_cfg = GeneratorConfig::default();
        gen_cfg.speed.max_kmh = 20.0;
        gen_cfg.poisson_risk_factors.lambda_floor = 0.5;
        let models = gen_cfg.build().unwrap().into_shared();

        let mut cfg = sim_config(100);
        cfg.stop_on_delivery = false;
        let mut session = started(models, cfg, context());
        let records = run_to_end(&mut session);

        let clamped = records.iter().filter(|r| r.speed_clamped).count() as u64;
        let floored = records.iter().filter(|r| r.lambda_floored).count() as u64;
        let counters = session.counters();
        assert!(clamped > 0);
        assert_eq!(counters.speed_clamped, clamped);
        // Per-minute rates sit far below 0.5, so every tick is floored.
        assert_eq!(floored, 100);
        assert_eq!(counters.lambda_floored, floored);
        assert!(records.iter().all(|r| r.speed_kmh <= 20.0));
        assert_eq!(session.summary().unwrap().corrections, counters);
    }

    #[test]
    fn summary_totals_match_records() {
        let mut session = started(default_models(), sim_config(120), context());
        let records = run_to_end(&mut session);
        let summary = session.summary().unwrap();
        assert_eq!(summary.ticks, records.len() as u64);
        assert_eq!(summary.incidents, records.iter().map(|r| r.incident_count).sum::<u64>());
        assert_eq!(summary.odometer_km, records.last().unwrap().odometer_km);
        let last_fuel = records.last().unwrap().engine.fuel_level_pct;
        assert!((summary.fuel_used_pct - (100.0 - last_fuel)).abs() < 1e-9);
    }
}

// ── Stream ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod stream {
    use super::*;

    #[test]
    fn stream_ends_with_session() {
        let mut cfg = sim_config(15);
        cfg.stop_on_delivery = false;
        let mut stream = started(default_models(), cfg, context()).into_stream();
        let records: Vec<EventRecord> = stream.by_ref().map(Result::unwrap).collect();
        assert_eq!(records.len(), 15);
        assert!(stream.next().is_none());
        assert_eq!(stream.session().status(), SessionStatus::Completed);
    }

    #[test]
    fn new_session_replays_stream() {
        let first: Vec<EventRecord> = started(default_models(), sim_config(50), context())
            .into_stream()
            .map(Result::unwrap)
            .collect();
        let again: Vec<EventRecord> = started(default_models(), sim_config(50), context())
            .into_stream()
            .map(Result::unwrap)
            .collect();
        assert_eq!(first, again);
    }

    #[test]
    fn unstarted_stream_is_empty() {
        let session = VehicleSession::new(default_models(), sim_config(5));
        assert_eq!(session.into_stream().count(), 0);
    }
}

// ── Session-level statistics ──────────────────────────────────────────────────

#[cfg(test)]
mod statistics {
    use super::*;
    use ft_models::stats;

    #[test]
    fn hidden_state_occupancy_matches_stationary_distribution() {
        let models = default_models();
        let mut cfg = sim_config(100_000);
        cfg.stop_on_delivery = false;
        let mut session = started(Arc::clone(&models), cfg, context());
        let mut states = Vec::with_capacity(100_000);
        while session.status() == SessionStatus::Running {
            states.push(session.tick_labelled().unwrap().driver_state);
        }
        let occupancy = stats::occupancy(&states);
        let stationary = models.driver.stationary_distribution();
        for (got, want) in occupancy.iter().zip(&stationary) {
            assert!((got - want).abs() < 0.02, "occupancy {got} vs stationary {want}");
        }
    }

    #[test]
    fn session_temperature_is_autocorrelated() {
        let mut cfg = sim_config(50_000);
        cfg.stop_on_delivery = false;
        let mut session = started(default_models(), cfg, context());
        let temps: Vec<f64> = run_to_end(&mut session)
            .iter()
            .map(|r| r.telemetry[&Channel::EngineTemp])
            .collect();
        assert!((stats::autocorrelation(&temps, 1) - 0.95).abs() < 0.02);
        assert!((stats::mean(&temps) - 90.0).abs() < 0.5);
    }
}

// ── Profiles ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod profiles {
    use super::*;
    use crate::profile::DEFAULT_BASE;

    #[test]
    fn same_seed_same_profiles() {
        assert_eq!(ProfileGenerator::new(7).generate(20), ProfileGenerator::new(7).generate(20));
        assert_ne!(ProfileGenerator::new(7).generate(20), ProfileGenerator::new(8).generate(20));
    }

    #[test]
    fn smaller_fleet_is_prefix() {
        let small = ProfileGenerator::new(42).generate(3);
        let large = ProfileGenerator::new(42).generate(10);
        assert_eq!(small[..], large[..3]);
    }

    #[test]
    fn points_stay_near_base() {
        let generator = ProfileGenerator::new(42);
        for (i, p) in generator.generate(200).iter().enumerate() {
            assert_eq!(p.driver_id.index(), i);
            assert!(p.origin.within_bbox(DEFAULT_BASE, generator.warehouse_spread_deg));
            assert!(p.destination.within_bbox(p.origin, generator.customer_spread_deg));
            assert!(p.initial_driver_state.is_none());
        }
    }

    #[test]
    fn custom_base_moves_region() {
        let base = GeoPoint::new(51.5, -0.12);
        let profiles = ProfileGenerator::new(1).base(base).generate(50);
        assert!(profiles.iter().all(|p| p.origin.within_bbox(base, 2.0)));
    }
}

// ── Fleet ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod fleet {
    use super::*;

    #[test]
    fn zero_vehicles_rejected() {
        let result = FleetBuilder::new(sim_config(10), default_models()).vehicles(0).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn context_count_mismatch_rejected() {
        let result = FleetBuilder::new(sim_config(10), default_models())
            .vehicles(3)
            .contexts(vec![context(); 2])
            .build();
        assert!(matches!(
            result,
            Err(SimError::ProfileCountMismatch { expected: 3, got: 2, .. })
        ));
    }

    #[test]
    fn invalid_config_rejected() {
        let mut cfg = sim_config(10);
        cfg.max_ticks = 0;
        let result = FleetBuilder::new(cfg, default_models()).vehicles(2).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn records_delivered_in_tick_then_vehicle_order() {
        let mut fleet = FleetBuilder::new(sim_config(60), default_models())
            .vehicles(6)
            .build()
            .unwrap();
        let mut sink = VecSink::new();
        let report = fleet.run(&mut sink).unwrap();

        let keys: Vec<(Tick, VehicleId)> =
            sink.records.iter().map(|r| (r.tick, r.vehicle_id)).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);

        assert!(sink.finished);
        assert_eq!(sink.summaries.len(), 6);
        assert_eq!(report.sessions, 6);
        assert_eq!(report.records, sink.records.len() as u64);
        assert_eq!(
            report.incidents,
            sink.records.iter().map(|r| r.incident_count).sum::<u64>()
        );
        assert_eq!(fleet.running(), 0);
    }

    #[test]
    fn fleet_matches_standalone_sessions() {
        let config = sim_config(40);
        let models = default_models();
        let mut fleet = FleetBuilder::new(config.clone(), Arc::clone(&models))
            .vehicles(4)
            .build()
            .unwrap();
        let mut sink = VecSink::new();
        fleet.run(&mut sink).unwrap();

        let contexts = ProfileGenerator::new(config.seed).generate(4);
        for (i, ctx) in contexts.into_iter().enumerate() {
            let mut session = VehicleSession::new(Arc::clone(&models), config.clone());
            session.start(VehicleId(i as u32), config.seed, ctx).unwrap();
            let alone = run_to_end(&mut session);
            let in_fleet: Vec<EventRecord> = sink
                .records
                .iter()
                .filter(|r| r.vehicle_id == VehicleId(i as u32))
                .cloned()
                .collect();
            assert_eq!(alone, in_fleet, "vehicle {i} diverged");
        }
    }

    #[test]
    fn report_ticks_is_longest_session() {
        let mut cfg = sim_config(30);
        cfg.stop_on_delivery = false;
        let mut fleet = FleetBuilder::new(cfg, default_models()).vehicles(3).build().unwrap();
        let mut sink = VecSink::new();
        let report = fleet.run(&mut sink).unwrap();
        assert_eq!(report.ticks, 30);
        assert_eq!(report.records, 90);
        assert!(sink.summaries.iter().all(|s| s.ticks == 30));
    }

    #[test]
    fn explicit_contexts_are_used() {
        let mut ctx = context();
        ctx.initial_driver_state = Some(DriverState::Tired);
        let mut fleet = FleetBuilder::new(sim_config(1), default_models())
            .vehicles(2)
            .contexts(vec![ctx.clone(), ctx])
            .build()
            .unwrap();
        let mut sink = VecSink::new();
        fleet.run(&mut sink).unwrap();
        assert_eq!(sink.records.len(), 2);
        assert!(sink.records.iter().all(|r| r.position == GeoPoint::new(24.86, 67.00)));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_delivery_matches_single_thread() {
        let models = default_models();
        let run = |threads| {
            let mut cfg = sim_config(50);
            cfg.num_threads = Some(threads);
            let mut fleet = FleetBuilder::new(cfg, Arc::clone(&models))
                .vehicles(8)
                .build()
                .unwrap();
            let mut sink = VecSink::new();
            fleet.run(&mut sink).unwrap();
            sink.records
        };
        assert_eq!(run(1), run(4));
    }
}
