//! Behavioural tests for whole daemons: role routing, heartbeats, and the
//! launch lifecycle.

use std::cell::RefCell;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use wonder_client::{CallError, Reply};
use wonder_config::Role;
use wonder_proto::ListServersResponse;

use crate::process::LaunchError;

use super::support::{DaemonWorld, FailingConfigLoader, HealthEvent, TestConfigLoader, WAIT_TIMEOUT};

type StepResult = Result<(), String>;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Default)]
struct DaemonsWorld {
    land: Option<DaemonWorld>,
    stage: Option<DaemonWorld>,
    listing: Option<Reply<ListServersResponse>>,
    launch: Option<Result<(), LaunchError>>,
    stopped: Option<DaemonWorld>,
}

impl DaemonsWorld {
    fn daemon(&self, role: Role) -> Result<&DaemonWorld, String> {
        let daemon = match role {
            Role::Land => self.land.as_ref(),
            Role::Stage => self.stage.as_ref(),
        };
        daemon.ok_or_else(|| format!("no {role} daemon running"))
    }
}

#[fixture]
fn world() -> RefCell<DaemonsWorld> {
    RefCell::new(DaemonsWorld::default())
}

fn parse_role(name: &str) -> Result<Role, String> {
    name.parse::<Role>()
        .map_err(|error| format!("invalid role '{name}': {error}"))
}

fn list_servers(daemon: &DaemonWorld) -> Result<Reply<ListServersResponse>, String> {
    let client = daemon.connect()?;
    let (replies, reply) = mpsc::sync_channel(1);
    client
        .list_servers(replies)
        .map_err(|error| error.to_string())?;
    reply
        .recv_timeout(WAIT_TIMEOUT)
        .map_err(|error| format!("no list-servers reply: {error}"))
}

#[given("a running {role} daemon")]
fn given_running_daemon(world: &RefCell<DaemonsWorld>, role: String) -> StepResult {
    let role = parse_role(&role)?;
    let daemon = DaemonWorld::start(TestConfigLoader::new(role))?;
    let mut world = world.borrow_mut();
    match role {
        Role::Land => world.land = Some(daemon),
        Role::Stage => world.stage = Some(daemon),
    }
    Ok(())
}

#[given("a land daemon heartbeating to the stage every {millis} milliseconds")]
fn given_reporting_land(world: &RefCell<DaemonsWorld>, millis: u64) -> StepResult {
    let stage = world.borrow().daemon(Role::Stage)?.endpoint();
    let land = DaemonWorld::start(TestConfigLoader::reporting_to(stage, millis))?;
    world.borrow_mut().land = Some(land);
    Ok(())
}

#[when("the {role} daemon is asked for its servers")]
fn when_asked_for_servers(world: &RefCell<DaemonsWorld>, role: String) -> StepResult {
    let role = parse_role(&role)?;
    let listing = list_servers(world.borrow().daemon(role)?)?;
    world.borrow_mut().listing = Some(listing);
    Ok(())
}

#[when("the stage lists servers until the land daemon appears")]
fn when_stage_lists_land(world: &RefCell<DaemonsWorld>) -> StepResult {
    let world_ref = world.borrow();
    let member = world_ref.daemon(Role::Land)?.endpoint().authority();
    let stage = world_ref.daemon(Role::Stage)?;
    let deadline = Instant::now() + WAIT_TIMEOUT;
    let listing = loop {
        let listing = list_servers(stage)?;
        let listed = matches!(&listing, Ok(response) if response.members.contains(&member));
        if listed || Instant::now() >= deadline {
            break listing;
        }
        thread::sleep(POLL_INTERVAL);
    };
    drop(world_ref);
    world.borrow_mut().listing = Some(listing);
    Ok(())
}

#[when("a daemon launches with a failing configuration loader")]
fn when_launch_fails(world: &RefCell<DaemonsWorld>) {
    let outcome = DaemonWorld::run_to_completion(FailingConfigLoader);
    world.borrow_mut().launch = Some(outcome);
}

#[when("the {role} daemon is stopped")]
fn when_daemon_stopped(world: &RefCell<DaemonsWorld>, role: String) -> StepResult {
    let role = parse_role(&role)?;
    let mut world = world.borrow_mut();
    let taken = match role {
        Role::Land => world.land.take(),
        Role::Stage => world.stage.take(),
    };
    let mut daemon = taken.ok_or_else(|| format!("no {role} daemon running"))?;
    daemon.stop()?;
    world.stopped = Some(daemon);
    Ok(())
}

#[then("the listing contains the land daemon")]
fn then_listing_has_land(world: &RefCell<DaemonsWorld>) -> StepResult {
    let world = world.borrow();
    let member = world.daemon(Role::Land)?.endpoint().authority();
    match &world.listing {
        Some(Ok(response)) if response.members.contains(&member) => Ok(()),
        other => Err(format!("{member} missing from listing: {other:?}")),
    }
}

#[then("the listing is empty")]
fn then_listing_empty(world: &RefCell<DaemonsWorld>) -> StepResult {
    match &world.borrow().listing {
        Some(Ok(response)) if response.members.is_empty() => Ok(()),
        other => Err(format!("expected an empty listing: {other:?}")),
    }
}

#[then("the listing is refused as not served")]
fn then_listing_refused(world: &RefCell<DaemonsWorld>) -> StepResult {
    match &world.borrow().listing {
        Some(Err(CallError::Remote(message))) if message.contains("not served") => Ok(()),
        other => Err(format!("expected a not-served refusal: {other:?}")),
    }
}

#[then("the launch fails during bootstrap")]
fn then_launch_failed(world: &RefCell<DaemonsWorld>) -> StepResult {
    match &world.borrow().launch {
        Some(Err(LaunchError::Bootstrap { .. })) => Ok(()),
        other => Err(format!("expected a bootstrap launch failure: {other:?}")),
    }
}

#[then("the stopped daemon reported shutdown completion")]
fn then_shutdown_reported(world: &RefCell<DaemonsWorld>) -> StepResult {
    let world = world.borrow();
    let daemon = world.stopped.as_ref().ok_or("no daemon was stopped")?;
    let events = daemon.events();
    if events.last() == Some(&HealthEvent::ShutdownCompleted) {
        Ok(())
    } else {
        Err(format!("shutdown completion missing: {events:?}"))
    }
}

#[then("the stopped daemon served the {role} role")]
fn then_stopped_role(world: &RefCell<DaemonsWorld>, role: String) -> StepResult {
    let role = parse_role(&role)?;
    let world = world.borrow();
    let daemon = world.stopped.as_ref().ok_or("no daemon was stopped")?;
    match daemon.role() {
        Some(served) if served == role => Ok(()),
        other => Err(format!("expected the {role} role, found {other:?}")),
    }
}

#[scenario(
    path = "tests/features/daemon_lifecycle.feature",
    name = "A fresh stage lists no servers"
)]
fn fresh_stage_is_empty(world: RefCell<DaemonsWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/daemon_lifecycle.feature",
    name = "The stage lists a land daemon that heartbeats to it"
)]
fn stage_lists_reporting_land(world: RefCell<DaemonsWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/daemon_lifecycle.feature",
    name = "A land daemon refuses stage commands"
)]
fn land_refuses_stage_commands(world: RefCell<DaemonsWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/daemon_lifecycle.feature",
    name = "Launch stops when configuration cannot be loaded"
)]
fn launch_fails_on_configuration(world: RefCell<DaemonsWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/daemon_lifecycle.feature",
    name = "A stopped daemon reports shutdown completion"
)]
fn stopped_daemon_reports_completion(world: RefCell<DaemonsWorld>) {
    drop(world);
}
