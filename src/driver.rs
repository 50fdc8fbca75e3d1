//! The `CrowdMechanics` entry point: resolves the XML file set named on the
//! command line into absolute paths, loads a [`World`], runs one coarse
//! step, and writes the outputs (§6, §12).

use crate::xml::{agents, dynamics, geometry, interactions, materials, parameters};
use anyhow::{Context, ensure};
use crowd_containers::HashMap;
use crowd_physics::{Agent, DrivingInput, Shape, StepConfig, World};
use std::path::{Path, PathBuf};

/// The filename for the mandatory Agent Interactions output, always written
/// to the process's current working directory (§6).
const AGENT_INTERACTIONS_FILENAME: &str = "AgentInteractions.xml";

/// The arguments `CrowdMechanics` takes for one call: a parameters file and,
/// resolved against its declared `Static`/`Dynamic` directories, the
/// remaining four or five file names.
#[derive(Clone, Debug)]
pub struct CallArgs {
    pub parameters: PathBuf,
    pub materials: PathBuf,
    pub geometry: PathBuf,
    pub agents: PathBuf,
    pub dynamics: PathBuf,
    pub interactions: Option<PathBuf>,
}

/// The fully resolved, absolute paths for one call, built once at the start
/// and threaded immutably through loading (§12).
#[derive(Clone, Debug)]
struct CrowdMechanicsConfig {
    materials: PathBuf,
    geometry: PathBuf,
    agents: PathBuf,
    dynamics: PathBuf,
    interactions_input: Option<PathBuf>,
    dt: f64,
    dt_m: f64,
    interactions_output: PathBuf,
}

impl CrowdMechanicsConfig {
    fn resolve(args: &CallArgs) -> anyhow::Result<Self> {
        let params = parameters::parse(&args.parameters)
            .with_context(|| format!("failed to read parameters file {}", args.parameters.display()))?;

        let interactions_input = args.interactions.as_ref().map(|path| params.dynamic_dir.join(path));

        Ok(Self {
            materials: params.static_dir.join(&args.materials),
            geometry: params.static_dir.join(&args.geometry),
            agents: params.static_dir.join(&args.agents),
            dynamics: params.dynamic_dir.join(&args.dynamics),
            interactions_input,
            dt: params.dt,
            dt_m: params.dt_m,
            interactions_output: PathBuf::from(AGENT_INTERACTIONS_FILENAME),
        })
    }
}

/// Runs `CrowdMechanics` for one call and returns the process status to
/// exit with: `0` on success, non-zero on any validation or I/O failure.
///
/// Logs the full error chain at `error` level before returning non-zero, so
/// the CLI driver's `main` only needs to translate the code.
pub fn run_crowd_mechanics(args: &CallArgs) -> i32 {
    match run(args) {
        Ok(()) => 0,
        Err(error) => {
            crowd_log::error!("crowd mechanics call failed: {error:#}");
            1
        }
    }
}

fn run(args: &CallArgs) -> anyhow::Result<()> {
    let config = CrowdMechanicsConfig::resolve(args)?;

    crowd_log::with_timing_info_logging!("crowd mechanics call"; {
        let materials = materials::parse(&config.materials)
            .with_context(|| format!("failed to read materials file {}", config.materials.display()))?;
        let geometry = geometry::parse(&config.geometry)
            .with_context(|| format!("failed to read geometry file {}", config.geometry.display()))?;
        let definitions = agents::parse(&config.agents)
            .with_context(|| format!("failed to read agents file {}", config.agents.display()))?;
        let inputs = dynamics::parse_input(&config.dynamics)
            .with_context(|| format!("failed to read agent dynamics file {}", config.dynamics.display()))?;

        let (world_agents, driving) = build_agents(&definitions, &inputs)?;

        let mut world = World::build(materials, world_agents, geometry.walls, geometry.lx, geometry.ly)?;

        if let Some(interactions_input) = &config.interactions_input {
            let seeds = interactions::parse(interactions_input)
                .with_context(|| format!("failed to read agent interactions file {}", interactions_input.display()))?;
            interactions::seed_contact_book(world.contacts_mut(), &seeds);
        }

        crowd_log::info!(
            "loaded {} agent(s), {} wall(s)",
            world.agents().len(),
            world.walls().len()
        );

        crowd_physics::run_coarse_step(&mut world, &driving, StepConfig { dt: config.dt, dt_m: config.dt_m })?;

        dynamics::write_output(&config.dynamics, &world)
            .with_context(|| format!("failed to write agent dynamics file {}", config.dynamics.display()))?;
        interactions::write(&config.interactions_output, world.contacts())
            .with_context(|| format!("failed to write agent interactions file {}", config.interactions_output.display()))?;

        Ok::<(), anyhow::Error>(())
    })
}

/// Joins each agent's static definition with its per-call kinematics and
/// driving input, in declaration order, and builds the driving-input map
/// keyed by agent id for the integrator.
fn build_agents(
    definitions: &[agents::AgentDefinition],
    inputs: &[dynamics::AgentDynamicsInput],
) -> anyhow::Result<(Vec<Agent>, HashMap<crowd_physics::AgentId, DrivingInput>)> {
    let mut inputs_by_id = HashMap::default();
    for input in inputs {
        inputs_by_id.insert(input.id, *input);
    }

    let mut world_agents = Vec::with_capacity(definitions.len());
    let mut driving = HashMap::default();
    for definition in definitions {
        let input = inputs_by_id
            .get(&definition.id)
            .ok_or_else(|| anyhow::anyhow!("agent {} has no entry in the agent dynamics file", definition.id.0))?;

        let shapes: [Shape; crowd_physics::agent::SHAPES_PER_AGENT] = definition.shapes.clone();
        let pose = crowd_geometry::Pose2D::new(input.position, input.theta);
        let agent = Agent::new(
            definition.id,
            definition.mass,
            definition.moment_of_inertia,
            definition.floor_relaxation_time,
            definition.angular_relaxation_time,
            pose,
            input.velocity,
            input.omega,
            shapes,
        )?;
        driving.insert(
            definition.id,
            DrivingInput {
                force: input.driving_force,
                torque: input.driving_torque,
            },
        );
        world_agents.push(agent);
    }

    ensure!(!world_agents.is_empty(), "agents file declares no agents");
    Ok((world_agents, driving))
}

/// Resolves the optional `interactions` filename against its own default
/// (`AgentInteractions.xml` in the Dynamic directory), matching the
/// mandatory output filename so that a subsequent call picks up exactly
/// what the previous call wrote.
pub fn default_interactions_filename() -> &'static Path {
    Path::new(AGENT_INTERACTIONS_FILENAME)
}
