//! Behavioural tests for the stage liveness registry under a manual clock.

use std::cell::RefCell;
use std::sync::Arc;
use std::time::Duration;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::registry::{LivenessRegistry, ManualClock};

type StepResult = Result<(), String>;

struct RegistryWorld {
    clock: Arc<ManualClock>,
    registry: Option<LivenessRegistry>,
    acknowledgement: Option<String>,
    demoted: Option<Vec<String>>,
}

impl RegistryWorld {
    fn registry(&self) -> Result<&LivenessRegistry, String> {
        self.registry
            .as_ref()
            .ok_or_else(|| "registry not created".to_owned())
    }
}

#[fixture]
fn world() -> RefCell<RegistryWorld> {
    RefCell::new(RegistryWorld {
        clock: Arc::new(ManualClock::new()),
        registry: None,
        acknowledgement: None,
        demoted: None,
    })
}

fn members(listed: &str) -> Vec<String> {
    if listed == "none" {
        return Vec::new();
    }
    listed.split(',').map(|member| member.trim().to_owned()).collect()
}

fn expect_members(kind: &str, found: &[String], listed: &str) -> StepResult {
    let expected = members(listed);
    if found == expected.as_slice() {
        Ok(())
    } else {
        Err(format!("expected {kind} members {expected:?}, found {found:?}"))
    }
}

#[given("a liveness registry expiring members after {millis} milliseconds")]
fn given_registry(world: &RefCell<RegistryWorld>, millis: u64) {
    let mut world = world.borrow_mut();
    let clock = Arc::clone(&world.clock);
    world.registry = Some(LivenessRegistry::new(Duration::from_millis(millis), clock));
}

#[given("member {member} has reported alive")]
fn given_member_reported(world: &RefCell<RegistryWorld>, member: String) -> StepResult {
    world.borrow().registry()?.report_alive(&member);
    Ok(())
}

#[when("member {member} reports alive")]
fn when_member_reports(world: &RefCell<RegistryWorld>, member: String) -> StepResult {
    let acknowledgement = world.borrow().registry()?.report_alive(&member);
    world.borrow_mut().acknowledgement = Some(acknowledgement);
    Ok(())
}

#[when("the clock advances {millis} milliseconds")]
fn when_clock_advances(world: &RefCell<RegistryWorld>, millis: u64) {
    world.borrow().clock.advance(Duration::from_millis(millis));
}

#[when("the registry sweeps")]
fn when_registry_sweeps(world: &RefCell<RegistryWorld>) -> StepResult {
    let demoted = world.borrow().registry()?.sweep();
    world.borrow_mut().demoted = Some(demoted);
    Ok(())
}

#[then("the acknowledgement reads {message}")]
fn then_acknowledgement(world: &RefCell<RegistryWorld>, message: String) -> StepResult {
    match world.borrow().acknowledgement.as_deref() {
        Some(found) if found == message => Ok(()),
        other => Err(format!("expected acknowledgement {message:?}, found {other:?}")),
    }
}

#[then("the sweep demoted {listed}")]
fn then_sweep_demoted(world: &RefCell<RegistryWorld>, listed: String) -> StepResult {
    let world = world.borrow();
    let demoted = world.demoted.as_deref().ok_or("the registry never swept")?;
    expect_members("demoted", demoted, &listed)
}

#[then("the alive members are {listed}")]
fn then_alive_members(world: &RefCell<RegistryWorld>, listed: String) -> StepResult {
    let alive = world.borrow().registry()?.list_alive();
    expect_members("alive", &alive, &listed)
}

#[then("the dead members are {listed}")]
fn then_dead_members(world: &RefCell<RegistryWorld>, listed: String) -> StepResult {
    let dead = world.borrow().registry()?.list_dead();
    expect_members("dead", &dead, &listed)
}

#[scenario(
    path = "tests/features/stage_liveness.feature",
    name = "A report registers the member as alive"
)]
fn report_registers_member(world: RefCell<RegistryWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/stage_liveness.feature",
    name = "Silent members expire exactly once"
)]
fn silent_members_expire(world: RefCell<RegistryWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/stage_liveness.feature",
    name = "A fresh report revives a dead member"
)]
fn report_revives_member(world: RefCell<RegistryWorld>) {
    drop(world);
}
