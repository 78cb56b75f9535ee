#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Waypoint Defence adapters.
//!
//! Adapters never read world internals directly. They turn a
//! [`Snapshot`] into a [`Scene`] of flat drawing primitives and hand that to a
//! [`Presentation`] implementation, which may be a window, a terminal or a
//! test recorder.

use anyhow::Result as AnyResult;
use glam::Vec2;
use waypoint_defence_core::{
    Command, HostileUnit, Snapshot, Variant, EMPLACEMENT_RADIUS, PROJECTILE_RADIUS,
};

/// Stroke width of the drawn path in world units.
pub const PATH_STROKE_WIDTH: f32 = 20.0;
/// Distance of the HUD baseline from the top of the surface.
pub const HUD_BASELINE: f32 = 30.0;
/// Horizontal inset of the currency readout from the left edge.
pub const MONEY_INSET: f32 = 45.0;
/// Horizontal inset of the lives readout from the right edge.
pub const LIVES_INSET: f32 = 150.0;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Creates an opaque color from a three digit hex code such as `0xa51`.
    #[must_use]
    pub const fn from_short_hex(code: u16) -> Self {
        let red = ((code >> 8) & 0xf) as u8;
        let green = ((code >> 4) & 0xf) as u8;
        let blue = (code & 0xf) as u8;
        Self::from_rgb_u8(red * 17, green * 17, blue * 17)
    }
}

/// Colors used for every drawable in the scene.
pub mod palette {
    use super::Color;

    /// Normal hostiles.
    pub const NORMAL: Color = Color::from_short_hex(0xa51);
    /// Miniboss hostiles.
    pub const MINIBOSS: Color = Color::from_short_hex(0xd33);
    /// Boss hostiles.
    pub const BOSS: Color = Color::from_short_hex(0xe15);
    /// Emplacements.
    pub const EMPLACEMENT: Color = Color::from_short_hex(0x33f);
    /// Projectiles.
    pub const PROJECTILE: Color = Color::from_short_hex(0x333);
    /// Path stroke.
    pub const PATH: Color = Color::from_short_hex(0x555);
    /// Currency readout.
    pub const MONEY: Color = Color::from_short_hex(0x3c1);
    /// Lives readout.
    pub const LIVES: Color = Color::from_short_hex(0xc31);
}

/// Axis-aligned filled square centred on an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SquarePresentation {
    /// Centre in world units.
    pub center: Vec2,
    /// Edge length in world units.
    pub side: f32,
    /// Fill color.
    pub color: Color,
}

impl SquarePresentation {
    /// Creates a square of the given half extent.
    #[must_use]
    pub fn new(center: Vec2, radius: f32, color: Color) -> Self {
        Self {
            center,
            side: radius * 2.0,
            color,
        }
    }

    /// Top-left corner of the square.
    #[must_use]
    pub fn origin(&self) -> Vec2 {
        self.center - Vec2::splat(self.side / 2.0)
    }
}

/// Polyline drawn underneath every entity.
#[derive(Clone, Debug, PartialEq)]
pub struct PathPresentation {
    /// Waypoints in travel order.
    pub points: Vec<Vec2>,
    /// Stroke width in world units.
    pub stroke_width: f32,
    /// Stroke color.
    pub color: Color,
}

/// Horizontal edge a HUD line is measured from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HudAnchor {
    /// Offset is measured from the left edge of the surface.
    Left,
    /// Offset is measured leftwards from the right edge of the surface.
    Right,
}

/// Single line of heads-up text.
#[derive(Clone, Debug, PartialEq)]
pub struct HudLine {
    /// Rendered text.
    pub text: String,
    /// Text color.
    pub color: Color,
    /// Edge the horizontal inset is measured from.
    pub anchor: HudAnchor,
    /// Horizontal inset from `anchor` in surface units.
    pub inset: f32,
    /// Distance of the baseline from the top edge.
    pub baseline: f32,
}

impl HudLine {
    /// Resolves the text origin on a surface of the given width.
    #[must_use]
    pub fn position(&self, surface_width: f32) -> Vec2 {
        let x = match self.anchor {
            HudAnchor::Left => self.inset,
            HudAnchor::Right => surface_width - self.inset,
        };
        Vec2::new(x, self.baseline)
    }
}

/// Flat drawing description of one frame, listed in back-to-front order.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Route underlay.
    pub path: PathPresentation,
    /// Hostiles in store order.
    pub hostiles: Vec<SquarePresentation>,
    /// Emplacements in placement order.
    pub emplacements: Vec<SquarePresentation>,
    /// Projectiles in launch order.
    pub projectiles: Vec<SquarePresentation>,
    /// Heads-up readouts drawn last.
    pub hud: Vec<HudLine>,
}

impl Scene {
    /// Builds the scene for a world snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &Snapshot<'_>) -> Self {
        let path = PathPresentation {
            points: snapshot
                .path
                .waypoints()
                .iter()
                .map(|waypoint| waypoint.position().as_vec2())
                .collect(),
            stroke_width: PATH_STROKE_WIDTH,
            color: palette::PATH,
        };

        let hostiles = snapshot.hostiles.iter().map(hostile_square).collect();
        let emplacements = snapshot
            .emplacements
            .iter()
            .map(|emplacement| {
                SquarePresentation::new(
                    emplacement.position.as_vec2(),
                    EMPLACEMENT_RADIUS as f32,
                    palette::EMPLACEMENT,
                )
            })
            .collect();
        let projectiles = snapshot
            .projectiles
            .iter()
            .map(|projectile| {
                SquarePresentation::new(
                    projectile.position.as_vec2(),
                    PROJECTILE_RADIUS as f32,
                    palette::PROJECTILE,
                )
            })
            .collect();

        let hud = vec![
            HudLine {
                text: format!("Money: ${}.00", snapshot.state.currency()),
                color: palette::MONEY,
                anchor: HudAnchor::Left,
                inset: MONEY_INSET,
                baseline: HUD_BASELINE,
            },
            HudLine {
                text: format!("Lives: {}", snapshot.state.lives()),
                color: palette::LIVES,
                anchor: HudAnchor::Right,
                inset: LIVES_INSET,
                baseline: HUD_BASELINE,
            },
        ];

        Self {
            path,
            hostiles,
            emplacements,
            projectiles,
            hud,
        }
    }
}

fn hostile_square(hostile: &HostileUnit) -> SquarePresentation {
    let color = match hostile.variant {
        Variant::Normal => palette::NORMAL,
        Variant::Miniboss => palette::MINIBOSS,
        Variant::Boss => palette::BOSS,
    };
    SquarePresentation::new(hostile.position.as_vec2(), hostile.radius() as f32, color)
}

/// Input gathered by an adapter between two presented frames.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Pointer clicks in client coordinates, oldest first.
    pub clicks: Vec<Vec2>,
    /// Position of the drawing surface within the client area.
    pub surface_offset: Vec2,
}

impl FrameInput {
    /// Placement commands for every click, translated into world space.
    pub fn placement_commands(&self) -> impl Iterator<Item = Command> + '_ {
        self.clicks.iter().map(|&client| Command::PlaceEmplacement {
            position: surface_to_world(client, self.surface_offset).as_dvec2(),
        })
    }
}

/// Translates a client-space pointer position into world units.
///
/// The surface maps one-to-one onto the world, so only its offset within the
/// client area has to be removed.
#[must_use]
pub fn surface_to_world(client: Vec2, surface_offset: Vec2) -> Vec2 {
    client - surface_offset
}

/// Sink capable of showing a [`Scene`].
pub trait Presentation {
    /// Presents a fully built scene.
    fn present(&mut self, scene: &Scene) -> AnyResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;
    use waypoint_defence_core::{Emplacement, Path, Projectile, SimulationState};

    fn scene_for(hostiles: &[HostileUnit], state: SimulationState) -> Scene {
        let path = Path::standard();
        let emplacements = [Emplacement::new(DVec2::new(60.0, 60.0))];
        let projectiles = [Projectile::fire(DVec2::new(10.0, 20.0), DVec2::X)];
        let snapshot = Snapshot {
            hostiles,
            emplacements: &emplacements,
            projectiles: &projectiles,
            path: &path,
            state,
        };
        Scene::from_snapshot(&snapshot)
    }

    #[test]
    fn short_hex_expands_each_nibble() {
        assert_eq!(palette::EMPLACEMENT, Color::from_rgb_u8(0x33, 0x33, 0xff));
        assert_eq!(palette::NORMAL, Color::from_rgb_u8(0xaa, 0x55, 0x11));
    }

    #[test]
    fn hostile_squares_scale_with_variant() {
        let hostiles: Vec<_> = Variant::ALL
            .iter()
            .map(|&variant| HostileUnit::spawn(variant, DVec2::new(100.0, 50.0)))
            .collect();
        let scene = scene_for(&hostiles, SimulationState::default());

        let sides: Vec<f32> = scene.hostiles.iter().map(|square| square.side).collect();
        assert_eq!(sides, vec![8.0, 16.0, 40.0]);
        assert_eq!(scene.hostiles[2].color, palette::BOSS);
        assert_eq!(scene.hostiles[0].origin(), Vec2::new(96.0, 46.0));
    }

    #[test]
    fn emplacements_and_projectiles_use_fixed_sizes() {
        let scene = scene_for(&[], SimulationState::default());

        assert_eq!(scene.emplacements[0].side, 14.0);
        assert_eq!(scene.emplacements[0].color, palette::EMPLACEMENT);
        assert_eq!(scene.projectiles[0].side, 4.0);
        assert_eq!(scene.projectiles[0].center, Vec2::new(10.0, 20.0));
    }

    #[test]
    fn path_follows_waypoints() {
        let scene = scene_for(&[], SimulationState::default());

        assert_eq!(scene.path.points.len(), 6);
        assert_eq!(scene.path.points[0], Vec2::new(30.0, 0.0));
        assert_eq!(scene.path.points[5], Vec2::new(450.0, 500.0));
        assert_eq!(scene.path.stroke_width, 20.0);
    }

    #[test]
    fn hud_reports_money_and_lives() {
        let scene = scene_for(&[], SimulationState::new(310, -2, 4));

        let texts: Vec<&str> = scene.hud.iter().map(|line| line.text.as_str()).collect();
        assert_eq!(texts, vec!["Money: $310.00", "Lives: -2"]);
        assert_eq!(scene.hud[0].position(500.0), Vec2::new(45.0, 30.0));
        assert_eq!(scene.hud[1].position(500.0), Vec2::new(350.0, 30.0));
    }

    #[test]
    fn clicks_are_translated_by_surface_offset() {
        let input = FrameInput {
            clicks: vec![Vec2::new(108.0, 58.0)],
            surface_offset: Vec2::new(8.0, 8.0),
        };

        let commands: Vec<Command> = input.placement_commands().collect();
        assert_eq!(
            commands,
            vec![Command::PlaceEmplacement {
                position: DVec2::new(100.0, 50.0)
            }]
        );
    }
}
