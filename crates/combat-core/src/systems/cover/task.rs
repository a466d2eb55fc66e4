//! Cover State Machine
//!
//! Per-agent finite state machine driving the Inactive → MovingToCover →
//! Hiding/Peaking cover lifecycle. The machine is advanced explicitly once
//! per tick with the frame delta; timed waits are internal countdowns, and
//! cancellation is safe from any state without leaving occupancy or
//! paused-movement flags dangling.

use bevy_ecs::prelude::*;
use glam::Vec2;
use rand::rngs::SmallRng;
use rand::Rng;
use tracing::debug;

use combat_events::{CoverChange, CoverTransition, EventPayload, EventType, SimTime};

use crate::components::agent::{AgentId, Alive, Facing, PoseFlags, Position};
use crate::components::attack::CombatState;
use crate::components::cover::CoverKind;
use crate::components::faction::{FactionId, FactionMembership, FactionRegistry};
use crate::config::{Config, CoverTuning};
use crate::events::TickEvents;
use crate::systems::cover::index::{CoverNodeIndex, NodeId};
use crate::systems::cover::select::{find_cover_node, CoverSearch};
use crate::systems::movement::Navigator;
use crate::systems::perception::{unobstructed_position, AgentDirectory, VisibleContacts};
use crate::{Clock, CombatRng};

/// Turn-in rotation rate, radians per second.
const TURN_RATE: f32 = 3.0;

/// Snap threshold ending the arrival interpolation.
const ARRIVE_SNAP: f32 = 0.05;

/// Externally visible cover state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverState {
    Inactive,
    MovingToCover,
    Hiding,
    Peaking,
}

impl CoverState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverState::Inactive => "inactive",
            CoverState::MovingToCover => "moving_to_cover",
            CoverState::Hiding => "hiding",
            CoverState::Peaking => "peaking",
        }
    }
}

/// Internal phase within a state. Each phase is one suspension point of the
/// original cooperative script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Inactive: counting down the retry interval
    Idle,
    /// MovingToCover: waiting for the path computation
    AwaitPath,
    /// MovingToCover: en route, steering handled by movement
    Travel,
    /// MovingToCover: interpolating onto the exact node position
    Arrive,
    /// MovingToCover: rotating toward the current target
    TurnIn,
    /// Hiding: holding the hide pose
    HideWait,
    /// Peaking: settle delay after leaving the hide pose
    PeekSettle,
    /// Peaking: moving to an unobstructed firing position
    Reposition,
    /// Peaking: window during which the agent may attack
    AttackWindow,
    /// Peaking: end-of-cycle jitter before returning to Inactive
    Jitter,
}

/// Collaborators one `advance` call may touch. Passed explicitly so the
/// machine has no reach into global state.
pub struct CoverContext<'a> {
    pub agent: Entity,
    pub agent_id: &'a str,
    pub in_combat: bool,
    pub position: &'a mut Vec2,
    pub facing: &'a mut Vec2,
    pub navigator: &'a mut Navigator,
    pub pose: &'a mut PoseFlags,
    pub contacts: &'a mut VisibleContacts,
    pub combat: &'a mut CombatState,
    pub nodes: &'a mut CoverNodeIndex,
    pub directory: &'a AgentDirectory,
    pub registry: &'a FactionRegistry,
    pub faction: &'a FactionId,
    pub cfg: &'a CoverTuning,
    pub rng: &'a mut SmallRng,
    pub events: &'a mut TickEvents,
    pub time: SimTime,
}

/// Per-agent cover lifecycle task.
#[derive(Component, Debug)]
pub struct CoverTask {
    state: CoverState,
    phase: Phase,
    /// Node this agent currently occupies
    claimed: Option<NodeId>,
    /// Node used last cycle, excluded from the next search
    last_used: Option<NodeId>,
    cycles_remaining: u32,
    single_cycle: bool,
    /// Countdown for the current phase
    timer: f32,
    /// Last randomized retry interval, reused after a cancel
    retry_interval: f32,
}

impl Default for CoverTask {
    fn default() -> Self {
        Self::new()
    }
}

impl CoverTask {
    pub fn new() -> Self {
        Self {
            state: CoverState::Inactive,
            phase: Phase::Idle,
            claimed: None,
            last_used: None,
            cycles_remaining: 0,
            single_cycle: false,
            timer: 1.0,
            retry_interval: 1.0,
        }
    }

    /// Task already holding `node`, mid-travel. Test scaffolding.
    #[cfg(test)]
    pub(crate) fn holding_node(node: NodeId) -> Self {
        let mut task = Self::new();
        task.claimed = Some(node);
        task.state = CoverState::MovingToCover;
        task.phase = Phase::Travel;
        task
    }

    pub fn state(&self) -> CoverState {
        self.state
    }

    pub fn claimed_node(&self) -> Option<NodeId> {
        self.claimed
    }

    /// Whether the agent may swing right now. Open outside cover and during
    /// the peaking attack window, closed while hiding or in transit.
    pub fn attack_window_open(&self) -> bool {
        match self.state {
            CoverState::Inactive => true,
            CoverState::Peaking => self.phase == Phase::AttackWindow,
            _ => false,
        }
    }

    fn set_state(&mut self, to: CoverState, ctx: &mut CoverContext) {
        if self.state == to {
            return;
        }
        ctx.events.emit(
            ctx.time,
            EventType::CoverState,
            ctx.agent_id.to_string(),
            EventPayload::Transition(CoverTransition {
                from: self.state.as_str().to_string(),
                to: to.as_str().to_string(),
            }),
        );
        debug!(agent = ctx.agent_id, from = self.state.as_str(), to = to.as_str(), "cover transition");
        self.state = to;
    }

    fn roll_retry_interval(&mut self, rng: &mut SmallRng, cfg: &CoverTuning) {
        self.retry_interval = rng.gen_range(cfg.retry_seconds_min..cfg.retry_seconds_max);
        self.timer = self.retry_interval;
    }

    /// Stop the task immediately from any state.
    ///
    /// Clears paused movement, locked turning, and the hide pose; restores
    /// the default stopping distance; releases node occupancy; and lands in
    /// `Inactive` with the retry countdown re-armed.
    #[allow(clippy::too_many_arguments)]
    pub fn cancel(
        &mut self,
        agent: Entity,
        agent_id: &str,
        navigator: &mut Navigator,
        pose: &mut PoseFlags,
        contacts: &mut VisibleContacts,
        nodes: &mut CoverNodeIndex,
        events: &mut TickEvents,
        time: SimTime,
    ) {
        navigator.cancel();
        navigator.paused = false;
        navigator.turn_locked = false;
        navigator.restore_stopping_distance();
        pose.hiding = false;
        contacts.target_obstructed = false;

        if let Some(node) = self.claimed.take() {
            nodes.release(node, agent);
            self.last_used = Some(node);
            events.emit(
                time,
                EventType::CoverReleased,
                agent_id.to_string(),
                EventPayload::Cover(CoverChange { node, distance: None }),
            );
        }
        if self.state != CoverState::Inactive {
            events.emit(
                time,
                EventType::CoverState,
                agent_id.to_string(),
                EventPayload::Transition(CoverTransition {
                    from: self.state.as_str().to_string(),
                    to: CoverState::Inactive.as_str().to_string(),
                }),
            );
        }
        self.state = CoverState::Inactive;
        self.phase = Phase::Idle;
        self.timer = self.retry_interval;
    }

    fn cancel_in_ctx(&mut self, ctx: &mut CoverContext) {
        self.cancel(
            ctx.agent,
            ctx.agent_id,
            ctx.navigator,
            ctx.pose,
            ctx.contacts,
            ctx.nodes,
            ctx.events,
            ctx.time,
        );
    }

    /// Advance the machine by one frame delta.
    pub fn advance(&mut self, dt: f32, ctx: &mut CoverContext) {
        if !ctx.in_combat {
            if self.state != CoverState::Inactive {
                self.cancel_in_ctx(ctx);
            }
            return;
        }

        match self.phase {
            Phase::Idle => self.tick_idle(dt, ctx),
            Phase::AwaitPath => self.tick_await_path(ctx),
            Phase::Travel => self.tick_travel(ctx),
            Phase::Arrive => self.tick_arrive(dt, ctx),
            Phase::TurnIn => self.tick_turn_in(dt, ctx),
            Phase::HideWait => self.tick_hide_wait(dt, ctx),
            Phase::PeekSettle => self.tick_peek_settle(dt, ctx),
            Phase::Reposition => self.tick_reposition(ctx),
            Phase::AttackWindow => self.tick_attack_window(dt, ctx),
            Phase::Jitter => self.tick_jitter(dt, ctx),
        }
    }

    fn tick_idle(&mut self, dt: f32, ctx: &mut CoverContext) {
        self.timer -= dt;
        if self.timer > 0.0 {
            return;
        }
        self.roll_retry_interval(ctx.rng, ctx.cfg);

        let search = CoverSearch {
            agent: ctx.agent,
            agent_pos: *ctx.position,
            prior_node: self.last_used,
            hostiles: &ctx.contacts.hostiles,
        };
        let found = find_cover_node(
            ctx.nodes,
            &search,
            |holder| ctx.directory.is_hostile_to(ctx.registry, ctx.faction, holder),
            ctx.cfg,
            ctx.rng,
        );

        match found {
            Some(node) => self.begin_moving(node, ctx),
            None => self.fall_back_to_prior(ctx),
        }
    }

    /// Search failure: re-enter the prior node when it still works, or step
    /// to an unobstructed firing position when line-of-sight is the problem.
    fn fall_back_to_prior(&mut self, ctx: &mut CoverContext) {
        let Some(prior) = self.last_used else {
            return;
        };
        let Some(node) = ctx.nodes.get(prior) else {
            return;
        };
        if !node.seek_line_of_sight || !ctx.contacts.target_obstructed {
            if ctx.nodes.try_claim(prior, ctx.agent) {
                self.begin_moving(prior, ctx);
            }
        } else if let Some(target) = ctx.contacts.nearest_hostile(*ctx.position) {
            let spot = unobstructed_position(*ctx.position, target.position, ctx.cfg.reposition_offset);
            ctx.navigator.request(spot);
        }
    }

    fn begin_moving(&mut self, node: NodeId, ctx: &mut CoverContext) {
        let Some(node_pos) = ctx.nodes.get(node).map(|n| n.position) else {
            return;
        };
        self.claimed = Some(node);
        ctx.events.emit(
            ctx.time,
            EventType::CoverClaimed,
            ctx.agent_id.to_string(),
            EventPayload::Cover(CoverChange {
                node,
                distance: Some(ctx.position.distance(node_pos)),
            }),
        );

        // Entering cover preempts the committed attack and any path in flight
        ctx.combat.current_attack = None;
        ctx.navigator.cancel();
        ctx.navigator.stopping_distance = 0.0;
        ctx.navigator.request(node_pos);

        self.set_state(CoverState::MovingToCover, ctx);
        self.phase = Phase::AwaitPath;
    }

    /// True when the claim was lost to another agent mid-travel.
    fn claim_lost(&self, ctx: &CoverContext) -> bool {
        match self.claimed {
            Some(node) => ctx.nodes.occupant(node) != Some(ctx.agent),
            None => true,
        }
    }

    fn tick_await_path(&mut self, ctx: &mut CoverContext) {
        if self.claim_lost(ctx) {
            self.cancel_in_ctx(ctx);
            return;
        }
        if ctx.navigator.path_pending {
            return;
        }
        if ctx.navigator.remaining_distance(*ctx.position) <= ctx.cfg.arrive_distance {
            ctx.navigator.cancel();
            self.phase = Phase::Arrive;
        } else {
            self.phase = Phase::Travel;
        }
    }

    fn tick_travel(&mut self, ctx: &mut CoverContext) {
        if self.claim_lost(ctx) {
            self.cancel_in_ctx(ctx);
            return;
        }
        // Steering reorientation happens in the movement system; here we only
        // watch for arrival
        if ctx.navigator.remaining_distance(*ctx.position) <= ctx.cfg.arrive_distance {
            ctx.navigator.cancel();
            self.phase = Phase::Arrive;
        }
    }

    fn tick_arrive(&mut self, dt: f32, ctx: &mut CoverContext) {
        if self.claim_lost(ctx) {
            self.cancel_in_ctx(ctx);
            return;
        }
        let Some(node_pos) = self.claimed.and_then(|id| ctx.nodes.get(id)).map(|n| n.position)
        else {
            self.cancel_in_ctx(ctx);
            return;
        };
        let t = (ctx.cfg.arrival_lerp_speed * dt).min(1.0);
        *ctx.position = ctx.position.lerp(node_pos, t);
        if ctx.position.distance(node_pos) <= ARRIVE_SNAP {
            *ctx.position = node_pos;
            self.phase = Phase::TurnIn;
            self.timer = ctx.cfg.turn_in_seconds;
        }
    }

    fn tick_turn_in(&mut self, dt: f32, ctx: &mut CoverContext) {
        self.timer -= dt;

        let desired = ctx
            .contacts
            .nearest_hostile(*ctx.position)
            .map(|h| (h.position - *ctx.position).normalize_or_zero())
            .filter(|d| *d != Vec2::ZERO)
            .or_else(|| self.claimed.and_then(|id| ctx.nodes.get(id)).map(|n| n.forward));

        let aligned = match desired {
            Some(desired) => {
                let delta = ctx.facing.angle_between(desired);
                let step = delta.clamp(-TURN_RATE * dt, TURN_RATE * dt);
                *ctx.facing = Vec2::from_angle(step).rotate(*ctx.facing);
                delta.abs().to_degrees() <= ctx.cfg.turn_tolerance_degrees
            }
            None => true,
        };

        if aligned || self.timer <= 0.0 {
            self.dispatch_by_kind(ctx);
        }
    }

    /// Arrival complete; route by node kind into the hide/peek cycle.
    fn dispatch_by_kind(&mut self, ctx: &mut CoverContext) {
        let kind = self
            .claimed
            .and_then(|id| ctx.nodes.get(id))
            .map(|n| n.kind)
            .unwrap_or(CoverKind::Stand);

        match kind {
            CoverKind::CrouchAndPeak => {
                self.single_cycle = false;
                self.cycles_remaining =
                    ctx.rng.gen_range(ctx.cfg.peak_times_min..=ctx.cfg.peak_times_max);
                self.enter_hiding(ctx);
            }
            CoverKind::CrouchOnce => {
                self.single_cycle = true;
                self.cycles_remaining = 1;
                self.enter_hiding(ctx);
            }
            CoverKind::Stand => {
                self.single_cycle = true;
                self.cycles_remaining = 1;
                self.enter_peaking(ctx);
            }
        }
    }

    fn enter_hiding(&mut self, ctx: &mut CoverContext) {
        self.set_state(CoverState::Hiding, ctx);
        self.phase = Phase::HideWait;
        self.timer = ctx.rng.gen_range(ctx.cfg.hide_seconds_min..ctx.cfg.hide_seconds_max);
        ctx.navigator.turn_locked = true;
        ctx.navigator.paused = true;
        ctx.contacts.target_obstructed = true;
        ctx.pose.hiding = true;
    }

    fn enter_peaking(&mut self, ctx: &mut CoverContext) {
        self.set_state(CoverState::Peaking, ctx);
        self.phase = Phase::PeekSettle;
        self.timer = ctx.cfg.settle_seconds;
        ctx.navigator.turn_locked = false;
        ctx.navigator.paused = false;
        ctx.pose.hiding = false;
        // Standing back up restores sight unless the node resolves
        // obstruction by repositioning
        let seeks_los = self
            .claimed
            .and_then(|id| ctx.nodes.get(id))
            .map(|n| n.seek_line_of_sight)
            .unwrap_or(false);
        if !seeks_los {
            ctx.contacts.target_obstructed = false;
        }
    }

    fn tick_hide_wait(&mut self, dt: f32, ctx: &mut CoverContext) {
        self.timer -= dt;
        if self.timer <= 0.0 {
            self.enter_peaking(ctx);
        }
    }

    fn tick_peek_settle(&mut self, dt: f32, ctx: &mut CoverContext) {
        self.timer -= dt;
        if self.timer > 0.0 {
            return;
        }
        let needs_los = self
            .claimed
            .and_then(|id| ctx.nodes.get(id))
            .map(|n| n.seek_line_of_sight)
            .unwrap_or(false);
        if needs_los && ctx.contacts.target_obstructed {
            if let Some(target) = ctx.contacts.nearest_hostile(*ctx.position) {
                let spot =
                    unobstructed_position(*ctx.position, target.position, ctx.cfg.reposition_offset);
                ctx.navigator.request(spot);
                self.phase = Phase::Reposition;
                return;
            }
        }
        self.open_attack_window(ctx);
    }

    fn tick_reposition(&mut self, ctx: &mut CoverContext) {
        if ctx.navigator.path_pending {
            return;
        }
        let threshold = ctx.navigator.stopping_distance.max(ctx.cfg.arrive_distance);
        if ctx.navigator.remaining_distance(*ctx.position) <= threshold {
            ctx.navigator.cancel();
            ctx.contacts.target_obstructed = false;
            // Settle again at the new spot before the window opens
            self.phase = Phase::PeekSettle;
            self.timer = ctx.cfg.settle_seconds;
        }
    }

    fn open_attack_window(&mut self, ctx: &mut CoverContext) {
        self.phase = Phase::AttackWindow;
        self.timer = ctx.rng.gen_range(ctx.cfg.attack_seconds_min..ctx.cfg.attack_seconds_max);
    }

    fn tick_attack_window(&mut self, dt: f32, ctx: &mut CoverContext) {
        self.timer -= dt;
        if self.timer > 0.0 {
            return;
        }
        self.cycles_remaining = self.cycles_remaining.saturating_sub(1);
        if !self.single_cycle && self.cycles_remaining > 0 {
            self.enter_hiding(ctx);
        } else {
            self.phase = Phase::Jitter;
            self.timer = if ctx.cfg.end_jitter_seconds > 0.0 {
                ctx.rng.gen_range(0.0..ctx.cfg.end_jitter_seconds)
            } else {
                0.0
            };
        }
    }

    fn tick_jitter(&mut self, dt: f32, ctx: &mut CoverContext) {
        self.timer -= dt;
        if self.timer > 0.0 {
            return;
        }
        // Occupancy persists until the next search claims elsewhere; only the
        // held flag clears here
        self.last_used = self.claimed;
        ctx.navigator.restore_stopping_distance();
        ctx.contacts.target_obstructed = false;
        self.set_state(CoverState::Inactive, ctx);
        self.phase = Phase::Idle;
        self.timer = self.retry_interval;
    }
}

/// System to advance every living agent's cover task by one tick.
#[allow(clippy::type_complexity)]
pub fn drive_cover_tasks(
    clock: Res<Clock>,
    config: Res<Config>,
    directory: Res<AgentDirectory>,
    registry: Res<FactionRegistry>,
    mut nodes: ResMut<CoverNodeIndex>,
    mut rng: ResMut<CombatRng>,
    mut events: ResMut<TickEvents>,
    mut query: Query<(
        Entity,
        &AgentId,
        &FactionMembership,
        &Alive,
        &mut CombatState,
        &mut Position,
        &mut Facing,
        &mut Navigator,
        &mut PoseFlags,
        &mut VisibleContacts,
        &mut CoverTask,
    )>,
) {
    let dt = clock.dt;
    for (
        entity,
        agent_id,
        membership,
        alive,
        mut combat,
        mut position,
        mut facing,
        mut navigator,
        mut pose,
        mut contacts,
        mut task,
    ) in query.iter_mut()
    {
        if !alive.is_alive() {
            continue;
        }
        let mut ctx = CoverContext {
            agent: entity,
            agent_id: &agent_id.0,
            in_combat: combat.in_combat,
            position: &mut position.0,
            facing: &mut facing.0,
            navigator: &mut navigator,
            pose: &mut pose,
            contacts: &mut contacts,
            combat: &mut combat,
            nodes: &mut nodes,
            directory: &directory,
            registry: &registry,
            faction: &membership.faction_id,
            cfg: &config.cover,
            rng: &mut rng.0,
            events: &mut events,
            time: clock.time,
        };
        task.advance(dt, &mut ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::cover::CoverNode;
    use crate::systems::perception::Contact;
    use rand::SeedableRng;

    /// Everything a context borrows, owned in one place for direct-drive
    /// tests that bypass the ECS schedule.
    struct Harness {
        agent: Entity,
        position: Vec2,
        facing: Vec2,
        navigator: Navigator,
        pose: PoseFlags,
        contacts: VisibleContacts,
        combat: CombatState,
        nodes: CoverNodeIndex,
        directory: AgentDirectory,
        registry: FactionRegistry,
        faction: FactionId,
        cfg: CoverTuning,
        rng: SmallRng,
        events: TickEvents,
    }

    impl Harness {
        fn new(seed: u64, kind: CoverKind) -> (Self, NodeId) {
            Self::with_node(seed, CoverNode::new(Vec2::new(2.0, 0.0), Vec2::X, kind))
        }

        fn with_node(seed: u64, cover_node: CoverNode) -> (Self, NodeId) {
            let mut nodes = CoverNodeIndex::new();
            let node = nodes.add(cover_node);

            let mut contacts = VisibleContacts::new();
            contacts.hostiles.push(Contact {
                entity: Entity::from_raw(50),
                id: "r1".to_string(),
                position: Vec2::new(10.0, 0.0),
                forward: Vec2::NEG_X,
                health_ratio: 1.0,
            });

            let harness = Self {
                agent: Entity::from_raw(1),
                position: Vec2::ZERO,
                facing: Vec2::Y,
                navigator: Navigator::new(4.0, 1.5),
                pose: PoseFlags::default(),
                contacts,
                combat: CombatState {
                    in_combat: true,
                    current_attack: None,
                    last_swing: -10.0,
                },
                nodes,
                directory: AgentDirectory::default(),
                registry: FactionRegistry::default(),
                faction: FactionId::from("wardens"),
                cfg: Config::default().cover,
                rng: SmallRng::seed_from_u64(seed),
                events: TickEvents::new(),
            };
            (harness, node)
        }

        /// One advance step plus the straight-line travel the movement
        /// system would perform.
        fn step(&mut self, task: &mut CoverTask, dt: f32) {
            let mut ctx = CoverContext {
                agent: self.agent,
                agent_id: "w1",
                in_combat: self.combat.in_combat,
                position: &mut self.position,
                facing: &mut self.facing,
                navigator: &mut self.navigator,
                pose: &mut self.pose,
                contacts: &mut self.contacts,
                combat: &mut self.combat,
                nodes: &mut self.nodes,
                directory: &self.directory,
                registry: &self.registry,
                faction: &self.faction,
                cfg: &self.cfg,
                rng: &mut self.rng,
                events: &mut self.events,
                time: SimTime::default(),
            };
            task.advance(dt, &mut ctx);

            // Stand-in for integrate_movement
            if self.navigator.path_pending {
                self.navigator.path_pending = false;
            } else if !self.navigator.paused {
                if let Some(dest) = self.navigator.destination {
                    let remaining = self.position.distance(dest);
                    if remaining > self.navigator.stopping_distance {
                        let dir = (dest - self.position).normalize_or_zero();
                        let step =
                            (self.navigator.speed * dt).min(remaining - self.navigator.stopping_distance);
                        self.position += dir * step;
                    }
                }
            }
        }

        fn cancel(&mut self, task: &mut CoverTask) {
            task.cancel(
                self.agent,
                "w1",
                &mut self.navigator,
                &mut self.pose,
                &mut self.contacts,
                &mut self.nodes,
                &mut self.events,
                SimTime::default(),
            );
        }
    }

    /// Drive until the task reaches `want`, panicking after `max` steps.
    fn run_until(harness: &mut Harness, task: &mut CoverTask, want: CoverState, max: usize) {
        for _ in 0..max {
            if task.state() == want {
                return;
            }
            harness.step(task, 0.05);
        }
        panic!("never reached {:?}, stuck in {:?}", want, task.state());
    }

    #[test]
    fn test_full_cycle_reaches_every_state_and_returns_inactive() {
        let (mut harness, node) = Harness::new(21, CoverKind::CrouchAndPeak);
        let mut task = CoverTask::new();

        run_until(&mut harness, &mut task, CoverState::MovingToCover, 100);
        assert_eq!(task.claimed_node(), Some(node));
        assert_eq!(harness.nodes.occupant(node), Some(harness.agent));

        run_until(&mut harness, &mut task, CoverState::Hiding, 2000);
        assert!(harness.pose.hiding);
        assert!(harness.navigator.paused);
        assert!(harness.contacts.target_obstructed);

        run_until(&mut harness, &mut task, CoverState::Peaking, 2000);
        assert!(!harness.pose.hiding);
        assert!(!harness.navigator.paused);
        assert!(
            !harness.contacts.target_obstructed,
            "peeking from plain cover must restore sight"
        );

        run_until(&mut harness, &mut task, CoverState::Inactive, 5000);
        assert!(!harness.pose.hiding);
        assert!(!harness.navigator.turn_locked);
        assert_eq!(
            harness.navigator.stopping_distance,
            harness.navigator.default_stopping_distance
        );
    }

    #[test]
    fn test_crouch_and_peak_runs_bounded_cycle_count() {
        for seed in 0..8 {
            let (mut harness, _) = Harness::new(100 + seed, CoverKind::CrouchAndPeak);
            let mut task = CoverTask::new();

            let mut hide_to_peek = 0u32;
            let mut entered_cover = false;
            let mut prev = task.state();
            for _ in 0..20_000 {
                harness.step(&mut task, 0.05);
                let now = task.state();
                if prev == CoverState::Hiding && now == CoverState::Peaking {
                    hide_to_peek += 1;
                }
                if now != CoverState::Inactive {
                    entered_cover = true;
                }
                if entered_cover && now == CoverState::Inactive {
                    break;
                }
                prev = now;
            }
            assert!(entered_cover, "seed {} never entered cover", seed);
            let min = harness.cfg.peak_times_min;
            let max = harness.cfg.peak_times_max;
            assert!(
                (min..=max).contains(&hide_to_peek),
                "seed {}: {} cycles outside [{}, {}]",
                seed,
                hide_to_peek,
                min,
                max
            );
        }
    }

    #[test]
    fn test_stand_node_skips_hiding() {
        let (mut harness, _) = Harness::new(33, CoverKind::Stand);
        let mut task = CoverTask::new();

        let mut saw_hiding = false;
        let mut entered_cover = false;
        for _ in 0..10_000 {
            harness.step(&mut task, 0.05);
            match task.state() {
                CoverState::Hiding => saw_hiding = true,
                CoverState::Inactive if entered_cover => break,
                CoverState::Inactive => {}
                _ => entered_cover = true,
            }
        }
        assert!(entered_cover);
        assert!(!saw_hiding, "stand cover must never crouch");
    }

    #[test]
    fn test_cancel_from_every_state_releases_and_resets() {
        let states = [
            CoverState::Inactive,
            CoverState::MovingToCover,
            CoverState::Hiding,
            CoverState::Peaking,
        ];
        for target in states {
            let (mut harness, node) = Harness::new(7, CoverKind::CrouchAndPeak);
            let mut task = CoverTask::new();
            run_until(&mut harness, &mut task, target, 5000);

            harness.cancel(&mut task);

            assert_eq!(task.state(), CoverState::Inactive, "after cancel from {:?}", target);
            assert_eq!(task.claimed_node(), None);
            assert_eq!(harness.nodes.occupant(node), None, "occupancy leaked from {:?}", target);
            assert!(!harness.navigator.paused);
            assert!(!harness.navigator.turn_locked);
            assert!(!harness.pose.hiding);
            assert!(!harness.contacts.target_obstructed);
            assert_eq!(
                harness.navigator.stopping_distance,
                harness.navigator.default_stopping_distance
            );
        }
    }

    #[test]
    fn test_mid_travel_claim_loss_cancels_cover() {
        let (mut harness, node) = Harness::new(44, CoverKind::CrouchAndPeak);
        let mut task = CoverTask::new();
        run_until(&mut harness, &mut task, CoverState::MovingToCover, 100);

        // Another agent steals the node
        let thief = Entity::from_raw(77);
        harness.nodes.release(node, harness.agent);
        assert!(harness.nodes.try_claim(node, thief));

        harness.step(&mut task, 0.05);
        assert_eq!(task.state(), CoverState::Inactive);
        assert_eq!(task.claimed_node(), None);
        assert_eq!(harness.nodes.occupant(node), Some(thief), "thief keeps the node");
    }

    #[test]
    fn test_leaving_combat_cancels_cover() {
        let (mut harness, node) = Harness::new(55, CoverKind::CrouchAndPeak);
        let mut task = CoverTask::new();
        run_until(&mut harness, &mut task, CoverState::Hiding, 2000);

        harness.combat.in_combat = false;
        harness.step(&mut task, 0.05);
        assert_eq!(task.state(), CoverState::Inactive);
        assert_eq!(harness.nodes.occupant(node), None);
        assert!(!harness.pose.hiding);
    }

    #[test]
    fn test_line_of_sight_reposition_settles_before_attack_window() {
        let (mut harness, _) = Harness::with_node(
            88,
            CoverNode::new(Vec2::new(2.0, 0.0), Vec2::X, CoverKind::Stand)
                .seeking_line_of_sight(),
        );
        let mut task = CoverTask::new();
        harness.contacts.target_obstructed = true;

        run_until(&mut harness, &mut task, CoverState::Peaking, 2000);

        let mut saw_reposition = false;
        let mut steps_since_arrival = 0u32;
        for _ in 0..2000 {
            if task.attack_window_open() {
                break;
            }
            if harness.navigator.destination.is_some() {
                saw_reposition = true;
                steps_since_arrival = 0;
            } else if saw_reposition {
                steps_since_arrival += 1;
            }
            harness.step(&mut task, 0.05);
        }

        assert!(task.attack_window_open(), "window never opened");
        assert!(saw_reposition, "obstructed sight line should force a reposition");
        assert!(!harness.contacts.target_obstructed);
        // 0.25s settle at 0.05s per step
        assert!(
            steps_since_arrival >= 4,
            "window opened {} steps after arrival, before the settle elapsed",
            steps_since_arrival
        );
    }

    #[test]
    fn test_retry_interval_delays_search() {
        let (mut harness, _) = Harness::new(66, CoverKind::CrouchAndPeak);
        let mut task = CoverTask::new();

        // New tasks arm a 1.0s countdown; well under it, no claim yet
        for _ in 0..10 {
            harness.step(&mut task, 0.05);
        }
        assert_eq!(task.state(), CoverState::Inactive);
        assert_eq!(task.claimed_node(), None);
    }
}
