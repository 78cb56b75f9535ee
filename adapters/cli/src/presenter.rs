use anyhow::Result;
use log::info;
use waypoint_defence_rendering::{Presentation, Scene};

/// Presenter that logs the HUD instead of drawing it.
#[derive(Debug)]
pub(crate) struct TextPresenter {
    report_every: u64,
    presented: u64,
}

impl TextPresenter {
    /// Creates a presenter that reports every `report_every` frames.
    #[must_use]
    pub(crate) const fn new(report_every: u64) -> Self {
        Self {
            report_every,
            presented: 0,
        }
    }

    fn is_due(&self) -> bool {
        self.report_every > 0 && self.presented % self.report_every == 0
    }
}

impl Presentation for TextPresenter {
    fn present(&mut self, scene: &Scene) -> Result<()> {
        self.presented += 1;
        if self.is_due() {
            info!("interval {}: {}", self.presented, report(scene));
        }
        Ok(())
    }
}

/// Single-line rendition of a scene.
fn report(scene: &Scene) -> String {
    let hud: Vec<&str> = scene.hud.iter().map(|line| line.text.as_str()).collect();
    format!(
        "{} | {} hostiles, {} emplacements, {} projectiles",
        hud.join(" | "),
        scene.hostiles.len(),
        scene.emplacements.len(),
        scene.projectiles.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_defence_core::{Path, SimulationState, Snapshot};

    fn empty_scene() -> Scene {
        let path = Path::standard();
        Scene::from_snapshot(&Snapshot {
            hostiles: &[],
            emplacements: &[],
            projectiles: &[],
            path: &path,
            state: SimulationState::default(),
        })
    }

    #[test]
    fn report_contains_hud_and_counts() {
        assert_eq!(
            report(&empty_scene()),
            "Money: $200.00 | Lives: 50 | 0 hostiles, 0 emplacements, 0 projectiles"
        );
    }

    #[test]
    fn reports_fall_on_multiples_of_the_period() {
        let scene = empty_scene();
        let mut presenter = TextPresenter::new(3);
        let mut due = Vec::new();
        for _ in 0..7 {
            presenter.present(&scene).expect("text presentation never fails");
            due.push(presenter.is_due());
        }
        assert_eq!(due, vec![false, false, true, false, false, true, false]);
    }

    #[test]
    fn zero_period_disables_reports() {
        let mut presenter = TextPresenter::new(0);
        presenter
            .present(&empty_scene())
            .expect("text presentation never fails");
        assert!(!presenter.is_due());
    }
}
