//! Unit tests for ft-core primitives.

#[cfg(test)]
mod ids {
    use crate::{DriverId, VehicleId};

    #[test]
    fn index_roundtrip() {
        let id = VehicleId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(VehicleId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(VehicleId::INVALID.0, u32::MAX);
        assert_eq!(DriverId::INVALID.0, u32::MAX);
        assert_eq!(VehicleId::default(), VehicleId::INVALID);
    }

    #[test]
    fn labels_are_one_based() {
        assert_eq!(VehicleId(0).label(), "VEH-00001");
        assert_eq!(DriverId(41).label(), "DRV-00042");
    }

    #[test]
    fn display() {
        assert_eq!(VehicleId(7).to_string(), "VehicleId(7)");
    }
}

#[cfg(test)]
mod geo {
    use crate::GeoPoint;

    #[test]
    fn zero_distance() {
        let p = GeoPoint::new(24.8607, 67.0011);
        assert!(p.distance_m(p) < 0.01);
    }

    #[test]
    fn one_degree_latitude() {
        // ~1 degree of latitude ≈ 111.195 km
        let a = GeoPoint::new(24.0, 67.0);
        let b = GeoPoint::new(25.0, 67.0);
        let d = a.distance_km(b);
        assert!((d - 111.195).abs() < 0.05, "got {d}");
    }

    #[test]
    fn step_toward_covers_requested_distance() {
        let a = GeoPoint::new(24.8607, 67.0011);
        let b = GeoPoint::new(25.3960, 68.3578);
        let p = a.step_toward(b, 10.0);
        assert!((a.distance_km(p) - 10.0).abs() < 1e-6);
        // Still on the way: remaining distance shrank by the step.
        let before = a.distance_km(b);
        let after = p.distance_km(b);
        assert!((before - after - 10.0).abs() < 1e-3, "before={before} after={after}");
    }

    #[test]
    fn step_toward_never_overshoots() {
        let a = GeoPoint::new(24.86, 67.00);
        let b = GeoPoint::new(24.87, 67.00);
        assert_eq!(a.step_toward(b, 500.0), b);
        assert_eq!(a.step_toward(b, 0.0), a);
    }

    #[test]
    fn offset_m_is_metric() {
        let a = GeoPoint::new(24.86, 67.00);
        let north = a.offset_m(100.0, 0.0);
        let east = a.offset_m(0.0, 100.0);
        assert!((a.distance_m(north) - 100.0).abs() < 0.5);
        assert!((a.distance_m(east) - 100.0).abs() < 0.5);
    }

    #[test]
    fn bbox_check() {
        let center = GeoPoint::new(24.86, 67.00);
        assert!(GeoPoint::new(24.90, 67.02).within_bbox(center, 0.1));
        assert!(!GeoPoint::new(26.0, 67.0).within_bbox(center, 0.1));
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, SimConfig, Tick};

    #[test]
    fn tick_display_and_order() {
        assert_eq!(Tick(15).to_string(), "T15");
        assert!(Tick(3) < Tick(10));
        assert_eq!(Tick::default(), Tick::ZERO);
    }

    #[test]
    fn clock_elapsed_and_interval() {
        let mut clock = SimClock::new(0, 60);
        assert_eq!(clock.elapsed_secs(), 0);
        clock.advance();
        clock.advance();
        assert_eq!(clock.elapsed_secs(), 120);
        assert!((clock.tick_hours() - 1.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn hour_of_day_wraps() {
        // 1970-01-01 23:00 UTC, one-hour ticks.
        let mut clock = SimClock::new(23 * 3_600, 3_600);
        assert_eq!(clock.hour_of_day(), 23);
        clock.advance();
        assert_eq!(clock.hour_of_day(), 0);
    }

    #[test]
    fn clock_dhm() {
        let mut clock = SimClock::new(0, 3_600);
        for _ in 0..25 {
            clock.advance();
        }
        assert_eq!(clock.elapsed_dhm(), (1, 1, 0));
        assert_eq!(clock.to_string(), "T25 (day 1 01:00)");
    }

    #[test]
    fn sim_config_defaults() {
        let cfg = SimConfig::default();
        assert_eq!(cfg.tick_duration_secs, 60);
        assert!(cfg.stop_on_delivery);
        assert_eq!(cfg.make_clock().current_tick, Tick::ZERO);
    }
}

#[cfg(test)]
mod rng {
    use crate::rng::Sampler;
    use crate::{SimRng, VehicleId, VehicleRng};

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = VehicleRng::new(12345, VehicleId(0));
        let mut r2 = VehicleRng::new(12345, VehicleId(0));
        for _ in 0..100 {
            assert_eq!(r1.standard_normal(), r2.standard_normal());
            assert_eq!(r1.poisson(3.0).unwrap(), r2.poisson(3.0).unwrap());
        }
    }

    #[test]
    fn different_vehicles_differ() {
        let mut r0 = VehicleRng::new(1, VehicleId(0));
        let mut r1 = VehicleRng::new(1, VehicleId(1));
        let a = r0.uniform();
        let b = r1.uniform();
        assert_ne!(a, b, "seeds for adjacent vehicles should diverge");
    }

    #[test]
    fn uniform_range_in_bounds() {
        let mut rng = VehicleRng::new(0, VehicleId(0));
        for _ in 0..1000 {
            let v = rng.uniform_range(-2.0, 2.0);
            assert!((-2.0..2.0).contains(&v));
        }
        assert_eq!(rng.uniform_range(5.0, 5.0), 5.0);
    }

    #[test]
    fn normal_moments() {
        let mut rng = VehicleRng::new(7, VehicleId(3));
        let n = 100_000;
        let xs: Vec<f64> = (0..n).map(|_| rng.normal(10.0, 2.0)).collect();
        let mean = xs.iter().sum::<f64>() / n as f64;
        let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert!((mean - 10.0).abs() < 0.05, "mean={mean}");
        assert!((var - 4.0).abs() < 0.1, "var={var}");
    }

    #[test]
    fn normal_zero_std_is_exact() {
        let mut rng = VehicleRng::new(7, VehicleId(3));
        assert_eq!(rng.normal(42.0, 0.0), 42.0);
    }

    #[test]
    fn poisson_large_lambda_is_finite_and_centered() {
        let mut rng = VehicleRng::new(99, VehicleId(0));
        let n = 20_000;
        let sum: u64 = (0..n).map(|_| rng.poisson(50.0).unwrap()).sum();
        let mean = sum as f64 / n as f64;
        assert!((mean - 50.0).abs() < 0.5, "mean={mean}");
    }

    #[test]
    fn poisson_rejects_negative_rate() {
        let mut rng = VehicleRng::new(0, VehicleId(0));
        assert!(rng.poisson(-0.1).is_err());
        assert!(rng.poisson(f64::NAN).is_err());
        assert_eq!(rng.poisson(0.0).unwrap(), 0);
    }

    #[test]
    fn categorical_single_nonzero_entry() {
        let mut rng = VehicleRng::new(5, VehicleId(5));
        for _ in 0..10_000 {
            assert_eq!(rng.categorical(&[0.0, 0.0, 1.0, 0.0]), Some(2));
        }
    }

    #[test]
    fn categorical_never_selects_zero_weight() {
        let mut rng = VehicleRng::new(5, VehicleId(6));
        for _ in 0..10_000 {
            let i = rng.categorical(&[0.3, 0.0, 0.7]).unwrap();
            assert_ne!(i, 1);
        }
    }

    #[test]
    fn categorical_frequencies() {
        let mut rng = SimRng::new(11);
        let mut counts = [0usize; 3];
        let n = 60_000;
        for _ in 0..n {
            counts[rng.categorical(&[0.2, 0.5, 0.3]).unwrap()] += 1;
        }
        let freq: Vec<f64> = counts.iter().map(|&c| c as f64 / n as f64).collect();
        assert!((freq[0] - 0.2).abs() < 0.01, "{freq:?}");
        assert!((freq[1] - 0.5).abs() < 0.01, "{freq:?}");
        assert!((freq[2] - 0.3).abs() < 0.01, "{freq:?}");
    }

    #[test]
    fn categorical_all_zero_is_none() {
        let mut rng = SimRng::new(0);
        assert_eq!(rng.categorical(&[0.0, 0.0]), None);
        assert_eq!(rng.categorical(&[]), None);
    }

    #[test]
    fn sim_rng_children_are_reproducible() {
        let mut a = SimRng::new(42);
        let mut b = SimRng::new(42);
        let mut ca = a.child(1);
        let mut cb = b.child(1);
        assert_eq!(ca.uniform(), cb.uniform());
    }
}
