use std::collections::BTreeMap;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use waypoint_defence_core::{Command, Event, RandomSource, SimulationState, TICKS_PER_INTERVAL};
use waypoint_defence_rendering::{FrameInput, Presentation, Scene};
use waypoint_defence_world::{self as world, query, World};

/// Drives a world the way a front end's frame timer would.
///
/// Every interval first submits the input gathered for it, then runs
/// [`TICKS_PER_INTERVAL`] steps back to back and presents a single scene.
#[derive(Debug, Default)]
pub(crate) struct Scheduler {
    inputs: BTreeMap<u64, FrameInput>,
    events: Vec<Event>,
    tally: Tally,
}

/// Event counts accumulated over a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Tally {
    pub(crate) waves: u64,
    pub(crate) destroyed: u64,
    pub(crate) escaped: u64,
    pub(crate) shots: u64,
    pub(crate) placed: u64,
    pub(crate) rejected: u64,
}

impl Tally {
    fn record(&mut self, event: &Event) {
        match event {
            Event::WaveSpawned { .. } => self.waves += 1,
            Event::HostileDestroyed { .. } => self.destroyed += 1,
            Event::HostileFinished { .. } => self.escaped += 1,
            Event::ProjectileFired { .. } => self.shots += 1,
            Event::EmplacementPlaced { .. } => self.placed += 1,
            Event::EmplacementRejected { position, reason } => {
                warn!(
                    "placement at ({:.1}, {:.1}) rejected: {reason}",
                    position.x, position.y
                );
                self.rejected += 1;
            }
            Event::TickCompleted { .. } => {}
        }
    }
}

/// Final state of a scheduled run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct RunOutcome {
    pub(crate) intervals: u64,
    pub(crate) state: SimulationState,
    pub(crate) tally: Tally,
    pub(crate) stopped_on_defeat: bool,
}

impl RunOutcome {
    /// One-line description printed when the run ends.
    #[must_use]
    pub(crate) fn summary(&self) -> String {
        format!(
            "ran {} intervals ({} ticks){}: currency {}, lives {}, difficulty {}, \
             {} waves, {} destroyed, {} escaped, {} shots, {} placed, {} rejected",
            self.intervals,
            self.state.tick_count(),
            if self.stopped_on_defeat {
                ", stopped on defeat"
            } else {
                ""
            },
            self.state.currency(),
            self.state.lives(),
            self.state.difficulty(),
            self.tally.waves,
            self.tally.destroyed,
            self.tally.escaped,
            self.tally.shots,
            self.tally.placed,
            self.tally.rejected,
        )
    }
}

impl Scheduler {
    /// Creates a scheduler that submits `inputs` at the start of their interval.
    #[must_use]
    pub(crate) fn new(inputs: BTreeMap<u64, FrameInput>) -> Self {
        Self {
            inputs,
            ..Self::default()
        }
    }

    /// Runs a single interval and presents its final scene.
    pub(crate) fn run_interval<R, P>(
        &mut self,
        world: &mut World<R>,
        interval: u64,
        presenter: &mut P,
    ) -> Result<()>
    where
        R: RandomSource,
        P: Presentation,
    {
        if let Some(input) = self.inputs.remove(&interval) {
            for command in input.placement_commands() {
                world::apply(world, command, &mut self.events);
            }
        }

        for _ in 0..TICKS_PER_INTERVAL {
            world::apply(world, Command::Step, &mut self.events);
        }

        for event in self.events.drain(..) {
            self.tally.record(&event);
        }

        let scene = Scene::from_snapshot(&query::snapshot(world));
        presenter
            .present(&scene)
            .with_context(|| format!("failed to present interval {interval}"))
    }

    /// Runs up to `intervals` intervals.
    ///
    /// With `stop_on_defeat` the run ends after the first interval that leaves
    /// no lives. The world itself never stops on its own.
    pub(crate) fn run<R, P>(
        &mut self,
        world: &mut World<R>,
        intervals: u64,
        stop_on_defeat: bool,
        presenter: &mut P,
    ) -> Result<RunOutcome>
    where
        R: RandomSource,
        P: Presentation,
    {
        let mut completed = 0;
        let mut stopped_on_defeat = false;
        while completed < intervals {
            self.run_interval(world, completed, presenter)?;
            completed += 1;

            if stop_on_defeat && query::simulation_state(world).is_defeated() {
                info!("all lives lost after {completed} intervals");
                stopped_on_defeat = true;
                break;
            }
        }

        if !self.inputs.is_empty() {
            debug!(
                "{} scheduled inputs fell outside the run and were never submitted",
                self.inputs.len()
            );
        }

        Ok(RunOutcome {
            intervals: completed,
            state: query::simulation_state(world),
            tally: self.tally,
            stopped_on_defeat,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use waypoint_defence_world::Config;

    #[derive(Default)]
    struct Recorder {
        scenes: Vec<Scene>,
    }

    impl Presentation for Recorder {
        fn present(&mut self, scene: &Scene) -> Result<()> {
            self.scenes.push(scene.clone());
            Ok(())
        }
    }

    struct Broken;

    impl Presentation for Broken {
        fn present(&mut self, _scene: &Scene) -> Result<()> {
            anyhow::bail!("surface lost")
        }
    }

    fn click_at(interval: u64, x: f32, y: f32) -> BTreeMap<u64, FrameInput> {
        let mut inputs = BTreeMap::new();
        let _ = inputs.insert(
            interval,
            FrameInput {
                clicks: vec![Vec2::new(x, y)],
                surface_offset: Vec2::ZERO,
            },
        );
        inputs
    }

    #[test]
    fn each_interval_runs_three_steps_then_presents() {
        let mut world = World::seeded(Config::default(), 11);
        let mut scheduler = Scheduler::new(BTreeMap::new());
        let mut recorder = Recorder::default();

        let outcome = scheduler
            .run(&mut world, 4, false, &mut recorder)
            .expect("run succeeds");

        assert_eq!(outcome.intervals, 4);
        assert_eq!(outcome.state.tick_count(), 12);
        assert_eq!(recorder.scenes.len(), 4);
        assert_eq!(outcome.tally.waves, 1);
        assert!(!outcome.stopped_on_defeat);
    }

    #[test]
    fn placements_land_before_the_interval_steps() {
        let mut world = World::seeded(Config::default(), 11);
        let mut scheduler = Scheduler::new(click_at(1, 60.0, 200.0));
        let mut recorder = Recorder::default();

        let outcome = scheduler
            .run(&mut world, 3, false, &mut recorder)
            .expect("run succeeds");

        assert!(recorder.scenes[0].emplacements.is_empty());
        assert_eq!(recorder.scenes[1].emplacements.len(), 1);
        assert_eq!(recorder.scenes[1].emplacements[0].center, Vec2::new(60.0, 200.0));
        assert_eq!(outcome.tally.placed, 1);
        assert_eq!(recorder.scenes[1].hud[0].text, "Money: $100.00");
    }

    #[test]
    fn inputs_beyond_the_run_are_never_submitted() {
        let mut world = World::seeded(Config::default(), 11);
        let mut scheduler = Scheduler::new(click_at(10, 60.0, 200.0));
        let mut recorder = Recorder::default();

        let outcome = scheduler
            .run(&mut world, 2, false, &mut recorder)
            .expect("run succeeds");

        assert_eq!(outcome.tally.placed, 0);
        assert_eq!(outcome.state.currency(), 200);
    }

    #[test]
    fn defeat_stops_the_run_only_when_requested() {
        let config = Config::default().with_starting_resources(200, 0, 1);

        let mut world = World::seeded(config.clone(), 5);
        let outcome = Scheduler::default()
            .run(&mut world, 5, true, &mut Recorder::default())
            .expect("run succeeds");
        assert_eq!(outcome.intervals, 1);
        assert!(outcome.stopped_on_defeat);
        assert!(outcome.summary().contains("stopped on defeat"));

        let mut world = World::seeded(config, 5);
        let outcome = Scheduler::default()
            .run(&mut world, 5, false, &mut Recorder::default())
            .expect("run succeeds");
        assert_eq!(outcome.intervals, 5);
        assert_eq!(outcome.state.tick_count(), 15);
    }

    #[test]
    fn presentation_failures_abort_the_run() {
        let mut world = World::seeded(Config::default(), 5);
        let error = Scheduler::default()
            .run(&mut world, 3, false, &mut Broken)
            .expect_err("presenter failure propagates");

        assert!(format!("{error:#}").contains("surface lost"));
        assert_eq!(query::simulation_state(&world).tick_count(), 3);
    }

    #[test]
    fn summary_lists_the_counters() {
        let outcome = RunOutcome {
            intervals: 2,
            state: SimulationState::new(150, 48, 3),
            tally: Tally {
                waves: 2,
                destroyed: 7,
                escaped: 2,
                shots: 30,
                placed: 1,
                rejected: 0,
            },
            stopped_on_defeat: false,
        };

        assert_eq!(
            outcome.summary(),
            "ran 2 intervals (0 ticks): currency 150, lives 48, difficulty 3, \
             2 waves, 7 destroyed, 2 escaped, 30 shots, 1 placed, 0 rejected"
        );
    }
}
