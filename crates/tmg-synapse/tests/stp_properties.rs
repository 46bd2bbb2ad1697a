use proptest::prelude::*;
use tmg_synapse::{ConductanceState, ConnectionId, SynapseError, TmgParams, TmgSynapse};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn close(a: f64, b: f64, rel: f64) -> bool {
    (a - b).abs() <= rel * a.abs().max(b.abs()).max(1e-300)
}

/// Parameter sets away from the tau_1 == tau_rec singularity
fn params_strategy() -> impl Strategy<Value = TmgParams> {
    (
        0.2f64..5.0,
        1.5f64..20.0,
        10.0f64..1000.0,
        prop_oneof![Just(0.0), 1.0f64..5000.0],
        0.001f64..=1.0,
        0.0f64..=1.0,
    )
        .prop_map(|(tau_1, ratio, tau_rec, tau_facil, utilization, u0)| {
            TmgParams::default()
                .with_kernel(tau_1, tau_1 * ratio)
                .with_recovery(tau_rec)
                .with_facilitation(tau_facil)
                .with_utilization(utilization)
                .with_u0(u0)
        })
}

fn intervals_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(prop_oneof![Just(0.0), 0.0f64..300.0], 1..40)
}

proptest! {
    #[test]
    fn split_decay_matches_single_decay(
        a in 0.0f64..10.0,
        b in 0.0f64..10.0,
        tau_1 in 0.1f64..10.0,
        tau_2 in 10.0f64..100.0,
        dt1 in 0.0f64..200.0,
        dt2 in 0.0f64..200.0,
    ) {
        let mut split = ConductanceState { a, b };
        let mut whole = split;
        split.advance(dt1, tau_1, tau_2);
        split.advance(dt2, tau_1, tau_2);
        whole.advance(dt1 + dt2, tau_1, tau_2);

        prop_assert!((split.a - whole.a).abs() <= 1e-12 * a.max(1.0));
        prop_assert!((split.b - whole.b).abs() <= 1e-12 * b.max(1.0));
    }

    #[test]
    fn resources_conserved_after_every_event(
        params in params_strategy(),
        intervals in intervals_strategy(),
    ) {
        init_logging();
        let mut syn = TmgSynapse::new(params).unwrap();
        let conn = ConnectionId::new(0);
        let mut t = 0.0;

        for dt in intervals {
            t += dt;
            syn.on_event(conn, t, 0.01).unwrap();
            let stream = syn.stream(conn).unwrap();
            prop_assert!((stream.recovered() + stream.y + stream.z - 1.0).abs() < 1e-9);
            prop_assert!(stream.y >= -1e-12 && stream.z >= -1e-12);
            prop_assert!(stream.recovered() >= -1e-12);
        }
    }

    #[test]
    fn facilitation_stays_in_unit_interval(
        params in params_strategy(),
        tau_facil in 1.0f64..5000.0,
        intervals in intervals_strategy(),
    ) {
        let mut syn = TmgSynapse::new(params.with_facilitation(tau_facil)).unwrap();
        let conn = ConnectionId::new(1);
        let mut t = 0.0;

        for dt in intervals {
            t += dt;
            let outcome = syn.on_event(conn, t, 0.01).unwrap();
            prop_assert!(outcome.u > 0.0 && outcome.u <= 1.0);
        }
    }

    #[test]
    fn disabled_facilitation_pins_u(
        params in params_strategy(),
        intervals in intervals_strategy(),
    ) {
        let params = params.with_facilitation(0.0);
        let utilization = params.utilization;
        let mut syn = TmgSynapse::new(params).unwrap();
        let conn = ConnectionId::new(2);
        let mut t = 0.0;

        for dt in intervals {
            t += dt;
            let outcome = syn.on_event(conn, t, 0.01).unwrap();
            prop_assert_eq!(outcome.u, utilization);
            prop_assert_eq!(syn.stream(conn).unwrap().u, utilization);
        }
    }

    #[test]
    fn isolated_event_peaks_at_weight_times_utilization(
        params in params_strategy(),
        weight in 0.001f64..1.0,
        onset in 0.0f64..50.0,
    ) {
        let params = params.with_u0(0.0);
        let utilization = params.utilization;
        let mut syn = TmgSynapse::new(params).unwrap();
        let tp = syn.kernel().time_to_peak();

        syn.on_event(ConnectionId::new(0), onset, weight).unwrap();
        let mut at_peak = *syn.conductance_state();
        at_peak.advance(tp, syn.kernel().tau_1(), syn.kernel().tau_2());
        let peak = at_peak.conductance();
        prop_assert!(close(peak, weight * utilization, 1e-9));

        for offset in [0.25 * tp, 0.9 * tp, 1.1 * tp, 3.0 * tp] {
            let mut g = *syn.conductance_state();
            g.advance(offset, syn.kernel().tau_1(), syn.kernel().tau_2());
            prop_assert!(g.conductance() <= peak * (1.0 + 1e-12));
        }
    }

    #[test]
    fn earlier_event_is_rejected_untouched(
        first in 1.0f64..100.0,
        back in 1e-6f64..1.0,
        weight in -1.0f64..1.0,
    ) {
        let mut syn = TmgSynapse::new(TmgParams::default()).unwrap();
        let conn = ConnectionId::new(5);
        syn.on_event(conn, first, weight).unwrap();
        let stream = *syn.stream(conn).unwrap();
        let state = *syn.conductance_state();

        let result = syn.on_event(conn, first - back, weight);
        let is_ordering_violation = matches!(result, Err(SynapseError::OrderingViolation { .. }));
        prop_assert!(is_ordering_violation);
        prop_assert_eq!(*syn.stream(conn).unwrap(), stream);
        prop_assert_eq!(*syn.conductance_state(), state);
    }

    #[test]
    fn same_time_events_commute(
        t in 0.0f64..100.0,
        w1 in -1.0f64..1.0,
        w2 in -1.0f64..1.0,
    ) {
        let mut forward = TmgSynapse::new(TmgParams::default()).unwrap();
        forward.on_event(ConnectionId::new(0), t, w1).unwrap();
        forward.on_event(ConnectionId::new(1), t, w2).unwrap();

        let mut reverse = TmgSynapse::new(TmgParams::default()).unwrap();
        reverse.on_event(ConnectionId::new(1), t, w2).unwrap();
        reverse.on_event(ConnectionId::new(0), t, w1).unwrap();

        prop_assert!((forward.a() - reverse.a()).abs() < 1e-15);
        prop_assert!((forward.b() - reverse.b()).abs() < 1e-15);
        prop_assert_eq!(
            forward.stream(ConnectionId::new(0)),
            reverse.stream(ConnectionId::new(0))
        );
    }
}
