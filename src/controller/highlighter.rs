use crate::model::{Intersects, Rgb, Tinted};

/// Counts from one highlight pass, for the overlay and trace logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighlightSummary {
    /// Bodies overlapping the reference body
    pub on_reference: usize,
    /// Bodies overlapping at least one other body
    pub touching: usize,
}

/// Recolors dynamic bodies by what they overlap this frame.
///
/// Each body first gets `alert` if it overlaps the reference body, `neutral` otherwise.
/// Then, if it overlaps any other dynamic body, its blue channel is forced to 1 on top of
/// that base. The base write always happens first, so nothing carries over between frames.
#[derive(Debug, Clone)]
pub struct ProximityHighlighter {
    pub alert: Rgb,
    pub neutral: Rgb,
}

impl ProximityHighlighter {
    pub fn new(alert: Rgb, neutral: Rgb) -> Self {
        Self { alert, neutral }
    }

    pub fn apply<B>(&self, reference: &B, bodies: &mut [B]) -> HighlightSummary
    where
        B: Intersects + Tinted,
    {
        let mut summary = HighlightSummary::default();

        for i in 0..bodies.len() {
            let on_reference = bodies[i].intersects(reference);
            bodies[i].set_color(if on_reference { self.alert } else { self.neutral });

            let touching = (0..bodies.len()).any(|j| j != i && bodies[i].intersects(&bodies[j]));
            if touching {
                let mut color = bodies[i].color();
                color.b = 1.0;
                bodies[i].set_color(color);
            }

            summary.on_reference += on_reference as usize;
            summary.touching += touching as usize;
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Body;
    use glam::{Quat, Vec3};

    const ALERT: Rgb = Rgb::new(1.0, 0.0, 0.0);
    const NEUTRAL: Rgb = Rgb::new(0.5, 0.5, 0.5);

    /// Overlap decided by shared tags, so scenarios don't depend on geometry.
    #[derive(Debug, Clone)]
    struct Tagged {
        tags: Vec<u32>,
        color: Rgb,
    }

    impl Tagged {
        fn new(tags: &[u32]) -> Self {
            Self { tags: tags.to_vec(), color: Rgb::new(0.1, 0.2, 0.3) }
        }
    }

    impl Intersects for Tagged {
        fn intersects(&self, other: &Tagged) -> bool {
            self.tags.iter().any(|t| other.tags.contains(t))
        }
    }

    impl Tinted for Tagged {
        fn color(&self) -> Rgb { self.color }
        fn set_color(&mut self, color: Rgb) { self.color = color; }
    }

    fn highlighter() -> ProximityHighlighter {
        ProximityHighlighter::new(ALERT, NEUTRAL)
    }

    #[test]
    fn test_on_reference_only_is_alert() {
        let ground = Tagged::new(&[0]);
        let mut bodies = vec![Tagged::new(&[0]), Tagged::new(&[7])];
        highlighter().apply(&ground, &mut bodies);
        assert_eq!(bodies[0].color, Rgb::new(1.0, 0.0, 0.0));
        assert_eq!(bodies[1].color, NEUTRAL);
    }

    #[test]
    fn test_touching_other_body_only_is_neutral_blue() {
        let ground = Tagged::new(&[0]);
        let mut bodies = vec![Tagged::new(&[1]), Tagged::new(&[1]), Tagged::new(&[9])];
        let summary = highlighter().apply(&ground, &mut bodies);
        assert_eq!(bodies[0].color, Rgb::new(0.5, 0.5, 1.0));
        assert_eq!(bodies[1].color, Rgb::new(0.5, 0.5, 1.0));
        assert_eq!(bodies[2].color, NEUTRAL);
        assert_eq!(summary, HighlightSummary { on_reference: 0, touching: 2 });
    }

    #[test]
    fn test_touching_both_is_magenta() {
        let ground = Tagged::new(&[0]);
        let mut bodies = vec![Tagged::new(&[0, 1]), Tagged::new(&[1])];
        let summary = highlighter().apply(&ground, &mut bodies);
        assert_eq!(bodies[0].color, Rgb::new(1.0, 0.0, 1.0));
        assert_eq!(bodies[1].color, Rgb::new(0.5, 0.5, 1.0));
        assert_eq!(summary, HighlightSummary { on_reference: 1, touching: 2 });
    }

    #[test]
    fn test_body_does_not_touch_itself() {
        let ground = Tagged::new(&[0]);
        let mut bodies = vec![Tagged::new(&[5])];
        highlighter().apply(&ground, &mut bodies);
        assert_eq!(bodies[0].color, NEUTRAL);
    }

    #[test]
    fn test_previous_blue_does_not_carry_over() {
        let ground = Tagged::new(&[0]);
        let mut bodies = vec![Tagged::new(&[1]), Tagged::new(&[1])];
        highlighter().apply(&ground, &mut bodies);
        assert_eq!(bodies[0].color.b, 1.0);

        bodies[1].tags = vec![2];
        highlighter().apply(&ground, &mut bodies);
        assert_eq!(bodies[0].color, NEUTRAL);
        assert_eq!(bodies[1].color, NEUTRAL);
    }

    #[test]
    fn test_idempotent_on_unchanged_scene() {
        let ground = Tagged::new(&[0]);
        let mut bodies = vec![Tagged::new(&[0, 1]), Tagged::new(&[1]), Tagged::new(&[0]), Tagged::new(&[4])];
        let first_summary = highlighter().apply(&ground, &mut bodies);
        let first: Vec<Rgb> = bodies.iter().map(|b| b.color).collect();
        let second_summary = highlighter().apply(&ground, &mut bodies);
        let second: Vec<Rgb> = bodies.iter().map(|b| b.color).collect();
        assert_eq!(first, second);
        assert_eq!(first_summary, second_summary);
    }

    #[test]
    fn test_with_box_geometry() {
        let half = Vec3::splat(0.5);
        let ground = Body::new_static(Vec3::new(0.0, -0.05, 0.0), Vec3::new(10.0, 0.05, 10.0), NEUTRAL);
        let mut bodies = vec![
            // resting on the ground, alone
            Body::new_dynamic(Vec3::new(-5.0, 0.5, 0.0), Quat::IDENTITY, half, NEUTRAL),
            // two overlapping in the air
            Body::new_dynamic(Vec3::new(0.0, 5.0, 0.0), Quat::IDENTITY, half, NEUTRAL),
            Body::new_dynamic(Vec3::new(0.5, 5.2, 0.0), Quat::IDENTITY, half, NEUTRAL),
            // on the ground and overlapping its neighbour
            Body::new_dynamic(Vec3::new(5.0, 0.5, 0.0), Quat::IDENTITY, half, NEUTRAL),
            Body::new_dynamic(Vec3::new(5.0, 1.2, 0.0), Quat::IDENTITY, half, NEUTRAL),
        ];
        highlighter().apply(&ground, &mut bodies);
        assert_eq!(bodies[0].color, ALERT);
        assert_eq!(bodies[1].color, Rgb::new(0.5, 0.5, 1.0));
        assert_eq!(bodies[2].color, Rgb::new(0.5, 0.5, 1.0));
        assert_eq!(bodies[3].color, Rgb::new(1.0, 0.0, 1.0));
        assert_eq!(bodies[4].color, Rgb::new(0.5, 0.5, 1.0));
    }
}
