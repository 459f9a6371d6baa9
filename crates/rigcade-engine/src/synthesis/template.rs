//! Motion templates.
//!
//! A template is a list of channels, each driving one property of the bones
//! a [`BoneSelector`] picks out. Curves are functions of normalized time
//! `t` in `[0, 1]` over one template cycle; synthesis scales them by
//! intensity, emotion, and the skeleton's size.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use rigcade_model::{BaseMotion, Bone, PartKind, Side};

/// Which side(s) of the body a limb selector applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideSelector {
    /// Screen-left limb.
    Left,
    /// Screen-right limb.
    Right,
    /// The side the motion is performed with (see synthesis).
    Primary,
    /// The other side.
    Secondary,
    /// Both sides.
    Both,
}

impl SideSelector {
    /// Returns true if a bone on `side` is selected, given the primary side.
    pub fn matches(&self, side: Side, primary: Side) -> bool {
        match self {
            SideSelector::Left => side == Side::Left,
            SideSelector::Right => side == Side::Right,
            SideSelector::Primary => side == primary,
            SideSelector::Secondary => side == primary.opposite(),
            SideSelector::Both => side != Side::Center,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            SideSelector::Left => "_l",
            SideSelector::Right => "_r",
            SideSelector::Primary => "(primary)",
            SideSelector::Secondary => "(secondary)",
            SideSelector::Both => "",
        }
    }
}

/// Picks bones by body part rather than by name or index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoneSelector {
    /// The root bone.
    Root,
    /// The torso bone.
    Torso,
    /// The head bone.
    Head,
    /// First arm link (upper arm, or a whole unsplit arm).
    UpperArm(SideSelector),
    /// Second arm link.
    Forearm(SideSelector),
    /// Hand.
    Hand(SideSelector),
    /// First leg link (thigh, or a whole unsplit leg).
    Thigh(SideSelector),
    /// Second leg link.
    Shin(SideSelector),
    /// Foot.
    Foot(SideSelector),
}

impl BoneSelector {
    /// Returns true if this selector picks `bone`.
    pub fn selects(&self, bone: &Bone, primary: Side) -> bool {
        let limb = |parts: &[PartKind], sides: &SideSelector| {
            bone.part.is_some_and(|p| parts.contains(&p)) && sides.matches(bone.side, primary)
        };
        match self {
            BoneSelector::Root => bone.parent.is_none(),
            BoneSelector::Torso => bone.part == Some(PartKind::Torso),
            BoneSelector::Head => bone.part == Some(PartKind::Head),
            BoneSelector::UpperArm(s) => limb(&[PartKind::UpperArm, PartKind::Arm], s),
            BoneSelector::Forearm(s) => limb(&[PartKind::Forearm], s),
            BoneSelector::Hand(s) => limb(&[PartKind::Hand], s),
            BoneSelector::Thigh(s) => limb(&[PartKind::Thigh, PartKind::Leg], s),
            BoneSelector::Shin(s) => limb(&[PartKind::Shin], s),
            BoneSelector::Foot(s) => limb(&[PartKind::Foot], s),
        }
    }
}

impl std::fmt::Display for BoneSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (base, side) = match self {
            BoneSelector::Root => ("root", None),
            BoneSelector::Torso => ("torso", None),
            BoneSelector::Head => ("head", None),
            BoneSelector::UpperArm(s) => ("upper_arm", Some(s)),
            BoneSelector::Forearm(s) => ("forearm", Some(s)),
            BoneSelector::Hand(s) => ("hand", Some(s)),
            BoneSelector::Thigh(s) => ("thigh", Some(s)),
            BoneSelector::Shin(s) => ("shin", Some(s)),
            BoneSelector::Foot(s) => ("foot", Some(s)),
        };
        write!(f, "{}{}", base, side.map_or("", |s| s.label()))
    }
}

/// Animated property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    /// Rotation, amplitude in degrees.
    Rotate,
    /// Horizontal offset, amplitude as a fraction of body height.
    TranslateX,
    /// Vertical offset, amplitude as a fraction of body height.
    TranslateY,
}

/// Unit curve shapes over one period `u` in `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveShape {
    /// `sin(2πu)`.
    Sine,
    /// `sin(πu)`: one hump, zero at both ends.
    Arc,
    /// Smooth rise over the first quarter, hold, smooth fall over the last.
    Raise,
}

impl CurveShape {
    /// Evaluates the shape at phase `u` (wrapped into `[0, 1)`).
    pub fn eval(&self, u: f64) -> f64 {
        let u = u.rem_euclid(1.0);
        match self {
            CurveShape::Sine => (2.0 * PI * u).sin(),
            CurveShape::Arc => (PI * u).sin(),
            CurveShape::Raise => {
                if u < 0.25 {
                    smoothstep(u / 0.25)
                } else if u > 0.75 {
                    smoothstep((1.0 - u) / 0.25)
                } else {
                    1.0
                }
            }
        }
    }
}

fn smoothstep(x: f64) -> f64 {
    let x = x.clamp(0.0, 1.0);
    x * x * (3.0 - 2.0 * x)
}

/// One curve applied to the bones a selector picks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Channel {
    /// Bones driven.
    pub selector: BoneSelector,
    /// Property driven.
    pub property: Property,
    /// Curve shape.
    pub shape: CurveShape,
    /// Peak value at intensity 1.
    pub amplitude: f64,
    /// Phase offset, in cycles.
    pub phase: f64,
    /// Periods per template cycle.
    pub cycles: f64,
    /// Negate on left-side bones so both sides move outward together.
    pub mirrored: bool,
}

impl Channel {
    /// A one-period rotation channel.
    pub fn rotate(selector: BoneSelector, shape: CurveShape, amplitude: f64) -> Self {
        Self {
            selector,
            property: Property::Rotate,
            shape,
            amplitude,
            phase: 0.0,
            cycles: 1.0,
            mirrored: false,
        }
    }

    /// A one-period translation channel.
    pub fn translate(
        selector: BoneSelector,
        property: Property,
        shape: CurveShape,
        amplitude: f64,
    ) -> Self {
        Self {
            property,
            ..Self::rotate(selector, shape, amplitude)
        }
    }

    /// Sets the phase offset.
    pub fn phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }

    /// Sets the number of periods per cycle.
    pub fn cycles(mut self, cycles: f64) -> Self {
        self.cycles = cycles;
        self
    }

    /// Mirrors the channel on the left side.
    pub fn mirrored(mut self) -> Self {
        self.mirrored = true;
        self
    }

    /// Unscaled value at normalized time `t` for a bone on `side`.
    pub fn value(&self, t: f64, side: Side) -> f64 {
        let sign = if self.mirrored && side == Side::Left {
            -1.0
        } else {
            1.0
        };
        sign * self.amplitude * self.shape.eval(self.cycles * t + self.phase)
    }
}

/// A hand-authored motion.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionTemplate {
    /// Motion this template animates.
    pub motion: BaseMotion,
    /// Length of one cycle at speed 1, in seconds.
    pub cycle_seconds: f64,
    /// Whether the motion loops (affects follower pre-roll).
    pub looping: bool,
    /// Curves.
    pub channels: Vec<Channel>,
    /// Selectors that must resolve for the motion to make sense.
    pub required: Vec<BoneSelector>,
    /// Normalized times of accent beats.
    pub emphasis: Vec<f64>,
    /// Normalized times of ground contacts.
    pub contacts: Vec<f64>,
}

/// Read-only table of motion templates, built once and shared.
#[derive(Debug, Clone, Default)]
pub struct TemplateTable {
    templates: BTreeMap<BaseMotion, MotionTemplate>,
}

impl TemplateTable {
    /// A table with no templates.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Adds or replaces a template.
    pub fn insert(&mut self, template: MotionTemplate) {
        self.templates.insert(template.motion, template);
    }

    /// Looks up the template for a motion.
    pub fn get(&self, motion: BaseMotion) -> Option<&MotionTemplate> {
        self.templates.get(&motion)
    }

    /// Motions with a template, in order.
    pub fn motions(&self) -> impl Iterator<Item = BaseMotion> + '_ {
        self.templates.keys().copied()
    }

    /// The built-in templates for every [`BaseMotion`].
    pub fn builtin() -> Self {
        use BoneSelector::*;
        use CurveShape::*;
        use Property::*;
        use SideSelector::{Both, Left, Primary, Right};

        let mut table = Self::empty();

        table.insert(MotionTemplate {
            motion: BaseMotion::Idle,
            cycle_seconds: 2.0,
            looping: true,
            channels: vec![
                Channel::rotate(Torso, Sine, 1.5),
                Channel::translate(Torso, TranslateY, Sine, 0.006).phase(0.25),
                Channel::rotate(Head, Sine, 2.0).phase(0.15),
                Channel::rotate(UpperArm(Both), Sine, 2.0).phase(0.1).mirrored(),
            ],
            required: vec![Torso],
            emphasis: vec![0.25],
            contacts: vec![],
        });

        table.insert(MotionTemplate {
            motion: BaseMotion::Walk,
            cycle_seconds: 1.0,
            looping: true,
            channels: vec![
                Channel::rotate(Thigh(Left), Sine, 25.0),
                Channel::rotate(Thigh(Right), Sine, 25.0).phase(0.5),
                Channel::rotate(Shin(Left), Sine, 15.0).phase(0.125),
                Channel::rotate(Shin(Right), Sine, 15.0).phase(0.625),
                Channel::rotate(Foot(Both), Sine, 6.0).phase(0.25),
                Channel::rotate(UpperArm(Left), Sine, 18.0).phase(0.5),
                Channel::rotate(UpperArm(Right), Sine, 18.0),
                Channel::rotate(Forearm(Left), Sine, 8.0).phase(0.55),
                Channel::rotate(Forearm(Right), Sine, 8.0).phase(0.05),
                Channel::rotate(Torso, Sine, 3.0).cycles(2.0),
                Channel::translate(Root, TranslateY, Sine, 0.015)
                    .cycles(2.0)
                    .phase(0.25),
                Channel::rotate(Head, Sine, 2.0).cycles(2.0).phase(0.35),
            ],
            required: vec![Thigh(Left), Thigh(Right)],
            emphasis: vec![0.0, 0.5],
            contacts: vec![0.0, 0.5],
        });

        table.insert(MotionTemplate {
            motion: BaseMotion::Run,
            cycle_seconds: 0.6,
            looping: true,
            channels: vec![
                Channel::rotate(Thigh(Left), Sine, 40.0),
                Channel::rotate(Thigh(Right), Sine, 40.0).phase(0.5),
                Channel::rotate(Shin(Left), Sine, 30.0).phase(0.15),
                Channel::rotate(Shin(Right), Sine, 30.0).phase(0.65),
                Channel::rotate(Foot(Both), Sine, 10.0).phase(0.25),
                Channel::rotate(UpperArm(Left), Sine, 35.0).phase(0.5),
                Channel::rotate(UpperArm(Right), Sine, 35.0),
                Channel::rotate(Forearm(Both), Sine, 20.0)
                    .phase(0.25)
                    .mirrored(),
                Channel::rotate(Torso, Sine, 4.0).cycles(2.0),
                Channel::translate(Root, TranslateY, Sine, 0.03)
                    .cycles(2.0)
                    .phase(0.25),
                Channel::rotate(Head, Sine, 3.0).cycles(2.0).phase(0.4),
            ],
            required: vec![Thigh(Left), Thigh(Right)],
            emphasis: vec![0.25, 0.75],
            contacts: vec![0.0, 0.5],
        });

        table.insert(MotionTemplate {
            motion: BaseMotion::Jump,
            cycle_seconds: 1.2,
            looping: false,
            channels: vec![
                Channel::translate(Root, TranslateY, Arc, 0.25),
                Channel::rotate(Thigh(Both), Raise, 20.0).mirrored(),
                Channel::rotate(Shin(Both), Raise, -30.0).mirrored(),
                Channel::rotate(UpperArm(Both), Arc, 60.0).mirrored(),
                Channel::rotate(Forearm(Both), Arc, 20.0).mirrored(),
                Channel::rotate(Head, Arc, 4.0).phase(0.1),
            ],
            required: vec![],
            emphasis: vec![0.5],
            contacts: vec![0.0, 1.0],
        });

        table.insert(MotionTemplate {
            motion: BaseMotion::Wave,
            cycle_seconds: 1.2,
            looping: true,
            channels: vec![
                Channel::rotate(UpperArm(Primary), Raise, 140.0).mirrored(),
                Channel::rotate(Forearm(Primary), Sine, 25.0).cycles(3.0),
                Channel::rotate(Hand(Primary), Sine, 10.0).cycles(3.0).phase(0.1),
                Channel::rotate(Head, Sine, 3.0).phase(0.25),
                Channel::rotate(Torso, Sine, 1.5),
            ],
            required: vec![UpperArm(Primary)],
            emphasis: vec![1.0 / 12.0, 5.0 / 12.0, 9.0 / 12.0],
            contacts: vec![],
        });

        table.insert(MotionTemplate {
            motion: BaseMotion::Nod,
            cycle_seconds: 0.8,
            looping: true,
            channels: vec![
                Channel::rotate(Head, Sine, 10.0).cycles(2.0),
                Channel::translate(Head, TranslateY, Arc, -0.01).cycles(2.0),
                Channel::rotate(Torso, Sine, 1.0).cycles(2.0).phase(0.1),
            ],
            required: vec![Head],
            emphasis: vec![0.125, 0.625],
            contacts: vec![],
        });

        table.insert(MotionTemplate {
            motion: BaseMotion::Dance,
            cycle_seconds: 1.6,
            looping: true,
            channels: vec![
                Channel::rotate(Torso, Sine, 8.0).cycles(2.0),
                Channel::translate(Root, TranslateY, Arc, 0.03).cycles(4.0),
                Channel::translate(Root, TranslateX, Sine, 0.02),
                Channel::rotate(Head, Sine, 6.0).cycles(2.0).phase(0.15),
                Channel::rotate(UpperArm(Both), Sine, 45.0)
                    .cycles(2.0)
                    .mirrored(),
                Channel::rotate(Forearm(Both), Sine, 30.0)
                    .cycles(4.0)
                    .mirrored(),
                Channel::rotate(Thigh(Left), Sine, 12.0).cycles(2.0),
                Channel::rotate(Thigh(Right), Sine, 12.0).cycles(2.0).phase(0.5),
            ],
            required: vec![Torso],
            emphasis: vec![0.125, 0.375, 0.625, 0.875],
            contacts: vec![0.0, 0.25, 0.5, 0.75],
        });

        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_motion() {
        let table = TemplateTable::builtin();
        for motion in BaseMotion::ALL {
            assert!(table.get(motion).is_some(), "missing template for {}", motion);
        }
    }

    #[test]
    fn test_looping_curves_close() {
        let table = TemplateTable::builtin();
        for motion in table.motions() {
            let template = table.get(motion).unwrap();
            if !template.looping {
                continue;
            }
            for channel in &template.channels {
                let start = channel.value(0.0, Side::Right);
                let end = channel.value(1.0, Side::Right);
                assert!(
                    (start - end).abs() < 1e-9,
                    "{} channel on {} does not loop",
                    motion,
                    channel.selector
                );
            }
        }
    }

    #[test]
    fn test_beats_are_normalized() {
        let table = TemplateTable::builtin();
        for motion in table.motions() {
            let template = table.get(motion).unwrap();
            for beat in template.emphasis.iter().chain(&template.contacts) {
                assert!((0.0..=1.0).contains(beat));
            }
        }
    }

    #[test]
    fn test_shapes() {
        assert!((CurveShape::Sine.eval(0.25) - 1.0).abs() < 1e-12);
        assert!((CurveShape::Arc.eval(0.5) - 1.0).abs() < 1e-12);
        assert_eq!(CurveShape::Raise.eval(0.0), 0.0);
        assert_eq!(CurveShape::Raise.eval(0.5), 1.0);
        assert!(CurveShape::Raise.eval(0.1) > 0.0 && CurveShape::Raise.eval(0.1) < 1.0);
    }

    #[test]
    fn test_mirroring() {
        let channel = Channel::rotate(BoneSelector::UpperArm(SideSelector::Both), CurveShape::Raise, 90.0)
            .mirrored();
        assert_eq!(channel.value(0.5, Side::Right), 90.0);
        assert_eq!(channel.value(0.5, Side::Left), -90.0);
    }

    #[test]
    fn test_selector_display() {
        assert_eq!(BoneSelector::Thigh(SideSelector::Left).to_string(), "thigh_l");
        assert_eq!(
            BoneSelector::UpperArm(SideSelector::Primary).to_string(),
            "upper_arm(primary)"
        );
        assert_eq!(BoneSelector::Head.to_string(), "head");
    }
}
