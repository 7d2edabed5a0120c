use {
    std::{
        sync::mpsc,
        time::Duration as StdDuration,
    },
    rand::{Rng, SeedableRng, rngs::StdRng},
    foresim::{
        error,
        physics::{
            forces::{ForceField, Peers},
            integrator,
            intersection,
            Completion,
            ComputationState,
            Engine,
            GenerationWatch,
            Outcome,
        },
        scene::{
            active_group_count,
            attractor_normalization,
            same_group_normalization,
            Attractor,
            Body,
            SceneSnapshot,
            SimulationParameters,
        },
        BodyId,
        Error,
        GroupId,
        Vector,
    },
};

const RECV_TIMEOUT: StdDuration = StdDuration::from_secs(10);

/// A resting unit-mass body with collision radius 1
fn still_body(id: BodyId, group: GroupId, location: Vector) -> Body {
    Body::new(
        id,
        format!("body-{}", id),
        group,
        1.0,
        1.0,
        0.0,
        1.0,
        location,
        Vector::zeros(),
    )
}

fn moving_body(id: BodyId, group: GroupId, location: Vector, velocity: Vector) -> Body {
    Body::new(
        id,
        format!("body-{}", id),
        group,
        1.0,
        1.0,
        0.0,
        1.0,
        location,
        velocity,
    )
}

/// Parameters with every force term switched off: 1 s span, 50 ms step
fn quiet_params() -> SimulationParameters {
    SimulationParameters {
        gravity: Vector::zeros(),
        gravity_constant: 1.0,
        same_group_factor: 0.0,
        attractor_factor: 0.0,
        same_group_force_limit: 100.0,
        attractor_force_limit: 100.0,
        intersection_limit: 16,
        step: chrono::Duration::milliseconds(50),
        duration: chrono::Duration::seconds(1),
    }
}

fn snapshot(
    bodies: Vec<Body>,
    attractors: Vec<Attractor>,
    parameters: SimulationParameters,
) -> SceneSnapshot {
    SceneSnapshot::new(bodies, attractors, parameters).expect("valid snapshot")
}

/// Drains the completion channel until the given generation reports back
fn wait_for(receiver: &mpsc::Receiver<Completion>, generation: u64) -> Completion {
    loop {
        let completion = receiver
            .recv_timeout(RECV_TIMEOUT)
            .expect("computation never completed");

        if completion.generation == generation {
            return completion;
        }
    }
}

// ==================================================================================
// Force model
// ==================================================================================

#[test]
fn same_group_attraction_obeys_the_third_law() {
    let params = SimulationParameters {
        same_group_factor: 1.0,
        ..quiet_params()
    };
    let field = ForceField::new(&[], &params);

    let locations = [Vector::new(-1.0, 0.0, 0.0), Vector::new(1.0, 0.0, 0.0)];
    let masses = [2.0, 3.0];

    let lhs = field.acceleration(masses[0], 0.0, &locations[0], Peers {
        locations: &locations,
        masses: &masses,
        subject: 0,
    });
    let rhs = field.acceleration(masses[1], 0.0, &locations[1], Peers {
        locations: &locations,
        masses: &masses,
        subject: 1,
    });

    let net = lhs * masses[0] + rhs * masses[1];
    assert!(net.norm() < 1e-5, "net momentum change is not zero: {:?}", net);

    // both pulls point inward
    assert!(lhs[0] > 0.0);
    assert!(rhs[0] < 0.0);
}

#[test]
fn force_cap_bounds_near_singular_pairs() {
    let params = SimulationParameters {
        same_group_factor: 1.0,
        same_group_force_limit: 10.0,
        ..quiet_params()
    };
    let field = ForceField::new(&[], &params);

    let locations = [Vector::zeros(), Vector::new(1e-4, 0.0, 0.0)];
    let masses = [1.0, 1.0];

    let acceleration = field.acceleration(masses[0], 0.0, &locations[0], Peers {
        locations: &locations,
        masses: &masses,
        subject: 0,
    });

    assert!(
        acceleration.norm() <= 10.0 + 1e-3,
        "cap exceeded: {}",
        acceleration.norm()
    );
}

#[test]
fn attractors_pull_regardless_of_group() {
    let params = SimulationParameters {
        attractor_factor: 1.0,
        duration: chrono::Duration::seconds(2),
        ..quiet_params()
    };
    let attractor = Attractor::new(1, Vector::new(10.0, 0.0, 0.0), 50.0);

    let bodies = vec![
        still_body(1, 1, Vector::new(0.0, 0.0, 0.0)),
        still_body(2, 2, Vector::new(0.0, 3.0, 0.0)),
    ];

    let engine = Engine::new();
    let (sender, receiver) = mpsc::channel();
    let generation = engine
        .request_computation(snapshot(bodies, vec![attractor], params), sender)
        .unwrap();

    assert_eq!(wait_for(&receiver, generation).outcome, Outcome::Computed);

    let result = engine.latest_result().unwrap();
    for id in [1u64, 2u64].iter() {
        let track = result.track(*id).expect("track missing");
        let first = track.initial_location();
        let last = track.locations().last().unwrap();

        let target = Vector::new(10.0, 0.0, 0.0);
        assert!(
            (last - target).norm() < (first - target).norm(),
            "BID#{} did not move toward the attractor",
            id
        );
    }
}

// ==================================================================================
// Integrator
// ==================================================================================

#[test]
fn lone_body_without_forces_stays_put() {
    let engine = Engine::new();
    let (sender, receiver) = mpsc::channel();

    let params = SimulationParameters {
        attractor_factor: 1.0,
        ..quiet_params()
    };

    // a massless attractor exerts nothing
    let initial = Vector::new(1.0, 2.0, 3.0);
    let generation = engine
        .request_computation(
            snapshot(
                vec![still_body(7, 1, initial)],
                vec![Attractor::new(1, Vector::new(5.0, 0.0, 0.0), 0.0)],
                params,
            ),
            sender,
        )
        .unwrap();

    assert_eq!(wait_for(&receiver, generation).outcome, Outcome::Computed);

    let result = engine.latest_result().unwrap();
    let track = result.track(7).expect("track missing");

    assert_eq!(track.sample_count(), 21);
    for location in track.locations() {
        assert!((location - initial).norm() < 1e-6);
    }
}

#[test]
fn uniform_gravity_matches_the_closed_form() {
    let gravity = Vector::new(0.0, -9.8, 0.0);
    let params = SimulationParameters {
        gravity,
        ..quiet_params()
    };

    let initial = Vector::new(0.0, 10.0, 0.0);
    let velocity = Vector::new(2.0, 0.0, 0.0);

    let tracks = integrator::integrate_group(
        &[moving_body(1, 1, initial, velocity)],
        &[],
        &params,
        &GenerationWatch::detached(),
    )
    .unwrap();

    let (_, track) = &tracks[0];
    let step = 0.05;

    for (sample, location) in track.locations().iter().enumerate() {
        let t = sample as f32 * step;
        let expected = initial + velocity * t + gravity * (0.5 * t * t);

        // semi-implicit Euler drifts from the closed form by g*dt*t/2
        let tolerance = 0.51 * gravity.norm() * step * t + 1e-4;
        assert!(
            (location - expected).norm() <= tolerance,
            "sample {}: {} off the closed form (tolerance {})",
            sample,
            (location - expected).norm(),
            tolerance
        );
    }
}

#[test]
fn sample_count_is_uniform_across_groups() {
    let params = SimulationParameters {
        step: chrono::Duration::milliseconds(300),
        duration: chrono::Duration::seconds(1),
        ..quiet_params()
    };

    let engine = Engine::new();
    let (sender, receiver) = mpsc::channel();
    let generation = engine
        .request_computation(
            snapshot(
                vec![
                    still_body(1, 1, Vector::zeros()),
                    still_body(2, 2, Vector::new(5.0, 0.0, 0.0)),
                    still_body(3, 2, Vector::new(-5.0, 0.0, 0.0)),
                ],
                vec![],
                params,
            ),
            sender,
        )
        .unwrap();

    assert_eq!(wait_for(&receiver, generation).outcome, Outcome::Computed);

    let result = engine.latest_result().unwrap();
    assert_eq!(result.tracks().len(), 3);

    // ceil(1000 / 300) = 4 steps, plus the initial sample
    for track in result.tracks().values() {
        assert_eq!(track.sample_count(), 5);
    }
}

#[test]
fn non_positive_span_yields_the_initial_sample_only() {
    let params = SimulationParameters {
        duration: chrono::Duration::zero(),
        ..quiet_params()
    };

    let tracks = integrator::integrate_group(
        &[still_body(1, 1, Vector::new(4.0, 0.0, 0.0))],
        &[],
        &params,
        &GenerationWatch::detached(),
    )
    .unwrap();

    assert_eq!(tracks[0].1.sample_count(), 1);
    assert_eq!(tracks[0].1.initial_location(), &Vector::new(4.0, 0.0, 0.0));
}

#[test]
fn cross_group_bodies_do_not_attract() {
    let params = SimulationParameters {
        same_group_factor: 5.0,
        ..quiet_params()
    };

    // spatially overlapping, but in different attraction groups
    let engine = Engine::new();
    let (sender, receiver) = mpsc::channel();
    let generation = engine
        .request_computation(
            snapshot(
                vec![
                    still_body(1, 1, Vector::new(0.1, 0.0, 0.0)),
                    still_body(2, 2, Vector::new(-0.1, 0.0, 0.0)),
                ],
                vec![],
                params,
            ),
            sender,
        )
        .unwrap();

    assert_eq!(wait_for(&receiver, generation).outcome, Outcome::Computed);

    let result = engine.latest_result().unwrap();
    for (id, initial) in [
        (1u64, Vector::new(0.1, 0.0, 0.0)),
        (2u64, Vector::new(-0.1, 0.0, 0.0)),
    ]
    .iter()
    {
        let track = result.track(*id).expect("track missing");
        for location in track.locations() {
            assert!(
                (location - initial).norm() < 1e-6,
                "BID#{} moved despite having no same-group peers",
                id
            );
        }
    }
}

#[test]
fn unstable_drag_is_rejected() {
    let params = quiet_params();

    // drag * step = 2.0 inverts the velocity direction
    let dragged = Body::new(
        9,
        "dragged".into(),
        1,
        1.0,
        1.0,
        40.0,
        1.0,
        Vector::zeros(),
        Vector::zeros(),
    );

    let err = integrator::integrate_group(
        &[dragged],
        &[],
        &params,
        &GenerationWatch::detached(),
    )
    .unwrap_err();

    match err {
        Error::Physics(error::Physics::UnstableDrag(id)) => assert_eq!(id, 9),
        other => panic!("unexpected error: {}", other),
    }
}

// ==================================================================================
// Intersection detector
// ==================================================================================

#[test]
fn overlapping_bodies_intersect_at_the_first_sample() {
    let engine = Engine::new();
    let (sender, receiver) = mpsc::channel();

    // radius 1 each: contact below (1 + 1) / 2
    let generation = engine
        .request_computation(
            snapshot(
                vec![
                    still_body(1, 1, Vector::zeros()),
                    still_body(2, 1, Vector::new(0.5, 0.0, 0.0)),
                ],
                vec![],
                quiet_params(),
            ),
            sender,
        )
        .unwrap();

    assert_eq!(wait_for(&receiver, generation).outcome, Outcome::Computed);

    let result = engine.latest_result().unwrap();
    let first = result.intersections().first().expect("no intersection found");

    assert_eq!(first.sample(), 0);
    assert!(first.bodies().contains(&1));
    assert!(first.bodies().contains(&2));
}

#[test]
fn intersection_scan_stops_at_the_limit() {
    let params = quiet_params();

    // four mutually overlapping bodies: six pairs per column
    let bodies: Vec<Body> = (0..4)
        .map(|index| still_body(index, 1, Vector::new(index as f32 * 0.1, 0.0, 0.0)))
        .collect();

    let tracks = integrator::integrate_group(
        &bodies,
        &[],
        &params,
        &GenerationWatch::detached(),
    )
    .unwrap();

    let scan_input: Vec<_> = bodies
        .iter()
        .zip(tracks.iter())
        .map(|(body, (_, track))| (body.id(), body.radius(), track))
        .collect();

    let intersections =
        intersection::find_intersections(&scan_input, 1, &GenerationWatch::detached()).unwrap();

    assert_eq!(intersections.len(), 1);
}

#[test]
fn separated_bodies_do_not_intersect() {
    let engine = Engine::new();
    let (sender, receiver) = mpsc::channel();

    let generation = engine
        .request_computation(
            snapshot(
                vec![
                    still_body(1, 1, Vector::zeros()),
                    still_body(2, 1, Vector::new(50.0, 0.0, 0.0)),
                ],
                vec![],
                quiet_params(),
            ),
            sender,
        )
        .unwrap();

    assert_eq!(wait_for(&receiver, generation).outcome, Outcome::Computed);
    assert!(engine.latest_result().unwrap().intersections().is_empty());
}

// ==================================================================================
// Async controller
// ==================================================================================

#[test]
fn empty_snapshot_completes_with_the_empty_result() {
    let engine = Engine::new();
    let (sender, receiver) = mpsc::channel();

    let generation = engine
        .request_computation(snapshot(vec![], vec![], quiet_params()), sender)
        .unwrap();

    let completion = wait_for(&receiver, generation);
    assert_eq!(completion.outcome, Outcome::Empty);

    let result = engine.latest_result().unwrap();
    assert!(result.is_empty());
    assert_eq!(result.generation(), generation);
}

#[test]
fn superseding_requests_publish_the_last_snapshot_only() {
    let engine = Engine::new();
    let (sender, receiver) = mpsc::channel();
    let mut rng = StdRng::seed_from_u64(42);

    let params = SimulationParameters {
        same_group_factor: 1.0,
        same_group_force_limit: 50.0,
        step: chrono::Duration::milliseconds(1),
        duration: chrono::Duration::seconds(2),
        ..quiet_params()
    };

    let rounds: u64 = 5;
    let bodies_per_round: u64 = 24;
    let mut last_generation = 0;

    for round in 0..rounds {
        let bodies: Vec<Body> = (0..bodies_per_round)
            .map(|index| {
                let location = Vector::new(
                    rng.gen_range(-20.0, 20.0),
                    rng.gen_range(-20.0, 20.0),
                    rng.gen_range(-20.0, 20.0),
                );

                still_body(round * 100 + index, 1, location)
            })
            .collect();

        last_generation = engine
            .request_computation(snapshot(bodies, vec![], params.clone()), sender.clone())
            .unwrap();
    }

    let completion = wait_for(&receiver, last_generation);
    assert_eq!(completion.outcome, Outcome::Computed);

    let result = engine.latest_result().unwrap();
    assert_eq!(result.generation(), last_generation);
    assert_eq!(result.tracks().len(), bodies_per_round as usize);

    // never a blend of two snapshots: every track belongs to the last round
    let last_round = rounds - 1;
    for index in 0..bodies_per_round {
        assert!(result.track(last_round * 100 + index).is_some());
    }
}

#[test]
fn faulted_computation_leaves_the_published_result_untouched() {
    let engine = Engine::new();
    let (sender, receiver) = mpsc::channel();

    let good = engine
        .request_computation(
            snapshot(vec![still_body(1, 1, Vector::zeros())], vec![], quiet_params()),
            sender.clone(),
        )
        .unwrap();
    assert_eq!(wait_for(&receiver, good).outcome, Outcome::Computed);

    let bad_params = SimulationParameters {
        step: chrono::Duration::zero(),
        ..quiet_params()
    };
    let bad = engine
        .request_computation(
            snapshot(vec![still_body(2, 1, Vector::zeros())], vec![], bad_params),
            sender.clone(),
        )
        .unwrap();

    let completion = wait_for(&receiver, bad);
    assert_eq!(completion.outcome, Outcome::Faulted);
    assert_eq!(engine.state().unwrap(), ComputationState::Faulted);

    // the previously published result survived the fault
    let result = engine.latest_result().unwrap();
    assert_eq!(result.generation(), good);
    assert!(result.track(1).is_some());

    // and the engine keeps serving requests afterwards
    let next = engine
        .request_computation(
            snapshot(vec![still_body(3, 1, Vector::zeros())], vec![], quiet_params()),
            sender,
        )
        .unwrap();
    assert_eq!(wait_for(&receiver, next).outcome, Outcome::Computed);
    assert_eq!(engine.state().unwrap(), ComputationState::Completed);
}

// ==================================================================================
// Scene
// ==================================================================================

#[test]
fn snapshots_reject_malformed_bodies() {
    let duplicate = SceneSnapshot::new(
        vec![
            still_body(1, 1, Vector::zeros()),
            still_body(1, 2, Vector::new(1.0, 0.0, 0.0)),
        ],
        vec![],
        quiet_params(),
    );
    assert!(matches!(
        duplicate.unwrap_err(),
        Error::Scene(error::Scene::DuplicateBody(1))
    ));

    let weightless = SceneSnapshot::new(
        vec![Body::new(
            5,
            "weightless".into(),
            1,
            0.0,
            1.0,
            0.0,
            1.0,
            Vector::zeros(),
            Vector::zeros(),
        )],
        vec![],
        quiet_params(),
    );
    assert!(matches!(
        weightless.unwrap_err(),
        Error::Scene(error::Scene::NonPositiveMass(5))
    ));
}

#[test]
fn tracks_interpolate_between_samples() {
    let tracks = integrator::integrate_group(
        &[moving_body(1, 1, Vector::zeros(), Vector::new(1.0, 0.0, 0.0))],
        &[],
        &quiet_params(),
        &GenerationWatch::detached(),
    )
    .unwrap();

    let (_, track) = &tracks[0];

    // constant velocity: the interpolated location is linear in time
    let location = track.interpolate(0.025).unwrap();
    assert!((location - Vector::new(0.025, 0.0, 0.0)).norm() < 1e-5);

    assert!(track.interpolate(-0.1).is_err());
    assert!(track.interpolate(100.0).is_err());
}

#[test]
fn normalization_spreads_the_base_force_over_the_population() {
    assert!((same_group_normalization(12.0, 3, 4) - 1.0).abs() < 1e-6);
    assert_eq!(same_group_normalization(12.0, 0, 4), 0.0);
    assert_eq!(same_group_normalization(12.0, 3, 0), 0.0);

    assert!((attractor_normalization(10.0, 5) - 2.0).abs() < 1e-6);
    assert_eq!(attractor_normalization(10.0, 0), 0.0);

    let bodies = vec![
        still_body(1, 1, Vector::zeros()),
        still_body(2, 1, Vector::new(3.0, 0.0, 0.0)),
        still_body(3, 7, Vector::new(6.0, 0.0, 0.0)),
    ];
    assert_eq!(active_group_count(&bodies), 2);
}

#[test]
fn results_export_every_sample_as_csv() {
    let engine = Engine::new();
    let (sender, receiver) = mpsc::channel();

    let generation = engine
        .request_computation(
            snapshot(
                vec![
                    still_body(1, 1, Vector::zeros()),
                    still_body(2, 2, Vector::new(9.0, 0.0, 0.0)),
                ],
                vec![],
                quiet_params(),
            ),
            sender,
        )
        .unwrap();

    assert_eq!(wait_for(&receiver, generation).outcome, Outcome::Computed);

    let result = engine.latest_result().unwrap();

    let mut buffer = vec![];
    result.write_csv(&mut buffer).unwrap();

    let csv = String::from_utf8(buffer).unwrap();
    let records: Vec<&str> = csv.lines().collect();

    // 21 samples per body, bodies ordered by id
    assert_eq!(records.len(), 42);
    assert!(records[0].starts_with("1,0,"));
    assert!(records[21].starts_with("2,0,"));
}
