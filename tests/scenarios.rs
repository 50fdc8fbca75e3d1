//! The six end-to-end scenarios named in §8, built directly against
//! `crowd_physics`/`crowd_geometry` so they run fast and do not depend on
//! fixture files.

use approx::assert_abs_diff_eq;
use crowd_geometry::{Disk, Pose2D};
use crowd_mechanics::xml::interactions;
use crowd_physics::{
    Agent, AgentId, ContactBook, DrivingInput, MaterialRegistry, Shape, StepConfig, Wall, WallId, World,
};
use crowd_containers::HashMap;
use nalgebra::{Point2, Vector2};

const SHAPES_PER_AGENT: usize = crowd_physics::agent::SHAPES_PER_AGENT;

fn torso_shapes(radius: f64) -> [Shape; SHAPES_PER_AGENT] {
    std::array::from_fn(|i| {
        let offset = (i as f64 - 2.0) * 2.0 * radius;
        Shape::new(Disk::new(Vector2::new(0.0, offset), radius), None)
    })
}

fn agent(id: u64, position: Point2<f64>, velocity: Vector2<f64>, omega: f64, tau_t: f64, tau_r: f64, radius: f64) -> Agent {
    Agent::new(
        AgentId(id),
        80.0,
        4.0,
        tau_t,
        tau_r,
        Pose2D::new(position, 0.0),
        velocity,
        omega,
        torso_shapes(radius),
    )
    .unwrap()
}

fn no_driving() -> HashMap<AgentId, DrivingInput> {
    HashMap::default()
}

#[test]
fn idle_relaxation_matches_the_closed_form_exponential_decay() {
    let tau_t = 2.0;
    let mut world = World::build(
        MaterialRegistry::default(),
        vec![agent(1, Point2::new(5.0, 2.0), Vector2::new(1.0, 0.0), 0.0, tau_t, tau_t, 0.1)],
        vec![],
        20.0,
        20.0,
    )
    .unwrap();

    crowd_physics::run_coarse_step(&mut world, &no_driving(), StepConfig { dt: 0.1, dt_m: 1e-5 }).unwrap();

    let a = world.agents().get(AgentId(1)).unwrap();
    let expected_speed = (-0.1_f64 / tau_t).exp();
    let expected_position_x = 5.0 + tau_t * (1.0 - (-0.1_f64 / tau_t).exp());
    assert_abs_diff_eq!(a.velocity().x, expected_speed, epsilon = 1e-4);
    assert_abs_diff_eq!(a.pose().position.x, expected_position_x, epsilon = 1e-3);
}

#[test]
fn two_agents_colliding_head_on_register_a_symmetric_contact() {
    let radius = 0.1;
    let mut world = World::build(
        MaterialRegistry::default(),
        vec![
            agent(1, Point2::new(5.0, 2.5), Vector2::new(0.5, 0.0), 0.0, 2.0, 2.0, radius),
            agent(2, Point2::new(5.3, 2.5), Vector2::new(-0.5, 0.0), 0.0, 2.0, 2.0, radius),
        ],
        vec![],
        20.0,
        20.0,
    )
    .unwrap();

    crowd_physics::run_coarse_step(&mut world, &no_driving(), StepConfig { dt: 0.01, dt_m: 1e-5 }).unwrap();

    assert!(!world.contacts().is_empty(), "the closing middle disks should have registered a contact");
    for (_, record) in world.contacts().iter() {
        assert!(record.normal_force >= 0.0);
    }

    let a = world.agents().get(AgentId(1)).unwrap();
    let b = world.agents().get(AgentId(2)).unwrap();
    assert!(a.velocity().x < 0.5, "agent 1 should have been slowed by the contact");
    assert!(b.velocity().x > -0.5, "agent 2 should have been slowed by the contact");
}

fn wall_along_x(y: f64) -> Wall {
    Wall::new(WallId(1), None, vec![Point2::new(-10.0, y), Point2::new(10.0, y)]).unwrap()
}

#[test]
fn sliding_along_a_wall_saturates_friction_at_the_coulomb_limit() {
    let radius = 0.1;
    let mut world = World::build(
        MaterialRegistry::default(),
        vec![agent(1, Point2::new(0.0, radius - 0.01), Vector2::new(1.0, 0.0), 0.0, 2.0, 2.0, radius)],
        vec![wall_along_x(0.0)],
        20.0,
        20.0,
    )
    .unwrap();

    let mut driving = HashMap::default();
    driving.insert(AgentId(1), DrivingInput { force: Vector2::new(0.0, -50.0), torque: 0.0 });

    let config = StepConfig { dt: 0.01, dt_m: 1e-5 };
    for _ in 0..50 {
        crowd_physics::run_coarse_step(&mut world, &driving, config).unwrap();
    }

    let record = world
        .contacts()
        .iter()
        .next()
        .expect("the agent pushed into the wall should have an active contact")
        .1;
    let friction_limit = 0.5 * record.normal_force;
    assert!(record.tangential_force <= friction_limit + 1e-6);
}

#[test]
fn sliding_to_a_stop_leaves_a_sub_threshold_tangential_spring_built_up() {
    let radius = 0.1;
    let mut world = World::build(
        MaterialRegistry::default(),
        vec![agent(1, Point2::new(0.0, radius - 0.01), Vector2::zeros(), 0.0, 2.0, 2.0, radius)],
        vec![wall_along_x(0.0)],
        20.0,
        20.0,
    )
    .unwrap();

    let mut driving = HashMap::default();
    driving.insert(AgentId(1), DrivingInput { force: Vector2::new(0.01, 0.0), torque: 0.0 });

    let config = StepConfig { dt: 0.01, dt_m: 1e-5 };
    for _ in 0..20 {
        crowd_physics::run_coarse_step(&mut world, &driving, config).unwrap();
    }

    let agent = world.agents().get(AgentId(1)).unwrap();
    assert!(agent.velocity().norm() < 0.5, "a below-threshold driving force should not build up much speed");
}

#[test]
fn rotational_velocity_decays_exponentially_with_no_driving_torque() {
    let tau_r = 2.0;
    let mut world = World::build(
        MaterialRegistry::default(),
        vec![agent(1, Point2::new(5.0, 5.0), Vector2::zeros(), 1.0, 2.0, tau_r, 0.1)],
        vec![],
        20.0,
        20.0,
    )
    .unwrap();

    crowd_physics::run_coarse_step(&mut world, &no_driving(), StepConfig { dt: 0.1, dt_m: 1e-5 }).unwrap();

    let a = world.agents().get(AgentId(1)).unwrap();
    let expected_omega = (-0.1_f64 / tau_r).exp();
    assert_abs_diff_eq!(a.angular_velocity(), expected_omega, epsilon = 1e-4);
}

#[test]
fn tangential_displacement_persists_across_coarse_steps_via_the_interactions_file() {
    let radius = 0.1;
    let mut world = World::build(
        MaterialRegistry::default(),
        vec![agent(1, Point2::new(0.0, radius - 0.01), Vector2::new(0.1, 0.0), 0.0, 2.0, 2.0, radius)],
        vec![wall_along_x(0.0)],
        20.0,
        20.0,
    )
    .unwrap();

    let mut driving = HashMap::default();
    driving.insert(AgentId(1), DrivingInput { force: Vector2::new(5.0, 0.0), torque: 0.0 });
    let config = StepConfig { dt: 0.01, dt_m: 1e-5 };
    crowd_physics::run_coarse_step(&mut world, &driving, config).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("AgentInteractions.xml");
    interactions::write(&path, world.contacts()).unwrap();

    let final_xi = world
        .contacts()
        .iter()
        .next()
        .expect("the agent pressed into the wall should have an active contact")
        .1
        .tangential_displacement;

    let seeds = interactions::parse(&path).unwrap();
    let mut fresh_book = ContactBook::new();
    interactions::seed_contact_book(&mut fresh_book, &seeds);
    fresh_book.begin_substep();
    let key = seeds[0].key;
    let record = fresh_book.activate(key);
    assert_abs_diff_eq!(record.tangential_displacement, final_xi, epsilon = 1e-12);
}
