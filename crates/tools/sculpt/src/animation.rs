//! Animation kinds and their keyframe schedules
//!
//! Every kind plays on the same looping timeline: 60 frames at 30 fps. Periodic
//! curves are sampled every [`SAMPLE_STEP`] frames and their periods divide
//! the timeline, so the last keyframe matches the first and the loop is
//! seamless.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::str::FromStr;
use tracing::warn;

/// Timeline length in frames
pub const TIMELINE_FRAMES: u32 = 60;

/// Playback rate of the timeline
pub const FPS: u32 = 30;

/// Distance between sampled keyframes of periodic curves
pub const SAMPLE_STEP: u32 = 2;

/// Named animation applied to a built asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationKind {
    /// Scale throb with a slow z-rotation sway
    #[default]
    Dance,
    /// Vertical hop
    Bounce,
    /// One full turn per loop
    Spin,
    /// Quick scale throb
    Pulse,
}

/// Animated property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Uniform scale factor
    Scale,
    /// Rotation about z, in degrees
    RotationZ,
    /// Translation along z, in scene units
    LocationZ,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Scale => "scale",
            Channel::RotationZ => "rotation_z",
            Channel::LocationZ => "location_z",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Curve {
    Sine {
        channel: Channel,
        base: f32,
        amplitude: f32,
        period: u32,
    },
    Linear {
        channel: Channel,
        from: f32,
        to: f32,
    },
}

impl Curve {
    fn channel(self) -> Channel {
        match self {
            Curve::Sine { channel, .. } | Curve::Linear { channel, .. } => channel,
        }
    }

    fn sample(self, frame: u32) -> f32 {
        match self {
            Curve::Sine {
                base,
                amplitude,
                period,
                ..
            } => base + amplitude * (2.0 * PI * frame as f32 / period as f32).sin(),
            Curve::Linear { from, to, .. } => {
                from + (to - from) * frame as f32 / TIMELINE_FRAMES as f32
            }
        }
    }
}

const DANCE: &[Curve] = &[
    Curve::Sine {
        channel: Channel::Scale,
        base: 1.0,
        amplitude: 0.05,
        period: 30,
    },
    Curve::Sine {
        channel: Channel::RotationZ,
        base: 0.0,
        amplitude: 5.0,
        period: 60,
    },
];

const BOUNCE: &[Curve] = &[Curve::Sine {
    channel: Channel::LocationZ,
    base: 0.0,
    amplitude: 0.2,
    period: 30,
}];

const SPIN: &[Curve] = &[Curve::Linear {
    channel: Channel::RotationZ,
    from: 0.0,
    to: 360.0,
}];

const PULSE: &[Curve] = &[Curve::Sine {
    channel: Channel::Scale,
    base: 1.0,
    amplitude: 0.1,
    period: 20,
}];

impl AnimationKind {
    pub const ALL: [AnimationKind; 4] = [
        AnimationKind::Dance,
        AnimationKind::Bounce,
        AnimationKind::Spin,
        AnimationKind::Pulse,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AnimationKind::Dance => "dance",
            AnimationKind::Bounce => "bounce",
            AnimationKind::Spin => "spin",
            AnimationKind::Pulse => "pulse",
        }
    }

    /// Parse a kind name, falling back to [`AnimationKind::Dance`]
    pub fn parse_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            warn!(animation = name, "unknown animation kind, using dance");
            AnimationKind::default()
        })
    }

    fn curves(self) -> &'static [Curve] {
        match self {
            AnimationKind::Dance => DANCE,
            AnimationKind::Bounce => BOUNCE,
            AnimationKind::Spin => SPIN,
            AnimationKind::Pulse => PULSE,
        }
    }

    /// Keyframe schedule of this kind
    pub fn clip(self) -> AnimationClip {
        let curves = self.curves();
        let periodic = curves.iter().any(|c| matches!(c, Curve::Sine { .. }));
        let frames: Vec<u32> = if periodic {
            (0..=TIMELINE_FRAMES)
                .step_by(SAMPLE_STEP as usize)
                .collect()
        } else {
            vec![0, TIMELINE_FRAMES]
        };

        let keyframes = frames
            .into_iter()
            .map(|frame| Keyframe {
                frame,
                values: curves.iter().map(|curve| curve.sample(frame)).collect(),
            })
            .collect();

        AnimationClip {
            kind: self,
            channels: curves.iter().map(|curve| curve.channel()).collect(),
            keyframes,
        }
    }
}

impl std::fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnimationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnimationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown animation kind `{s}`"))
    }
}

/// Values of every channel at one frame, in channel order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub frame: u32,
    #[serde(rename = "value")]
    pub values: Vec<f32>,
}

/// Looping keyframe schedule over the shared timeline
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub kind: AnimationKind,
    pub channels: Vec<Channel>,
    pub keyframes: Vec<Keyframe>,
}

impl AnimationClip {
    pub fn frame_end(&self) -> u32 {
        TIMELINE_FRAMES
    }

    pub fn fps(&self) -> u32 {
        FPS
    }

    /// Values of one channel across all keyframes
    pub fn channel_values(&self, channel: Channel) -> Option<Vec<f32>> {
        let index = self.channels.iter().position(|c| *c == channel)?;
        Some(self.keyframes.iter().map(|k| k.values[index]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-4, "{a} != {b}");
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("spin".parse::<AnimationKind>(), Ok(AnimationKind::Spin));
        assert_eq!("PULSE".parse::<AnimationKind>(), Ok(AnimationKind::Pulse));
        assert!("wobble".parse::<AnimationKind>().is_err());
        assert_eq!(AnimationKind::parse_or_default("wobble"), AnimationKind::Dance);
        assert_eq!(AnimationKind::parse_or_default("bounce"), AnimationKind::Bounce);
    }

    #[test]
    fn test_dance_syncs_scale_and_sway() {
        let clip = AnimationKind::Dance.clip();
        assert_eq!(clip.channels, vec![Channel::Scale, Channel::RotationZ]);
        assert_eq!(clip.keyframes.len(), 31);

        let scale = clip.channel_values(Channel::Scale).unwrap();
        let max = scale.iter().cloned().fold(f32::MIN, f32::max);
        let min = scale.iter().cloned().fold(f32::MAX, f32::min);
        // Peaks fall between sampled frames.
        assert!((max - 1.05).abs() < 1e-3);
        assert!((min - 0.95).abs() < 1e-3);

        let sway = clip.channel_values(Channel::RotationZ).unwrap();
        // Quarter period of the sway is frame 15, not sampled; frame 14 is close.
        assert!(sway[7] > 4.9);
    }

    #[test]
    fn test_bounce_moves_along_z_only() {
        let clip = AnimationKind::Bounce.clip();
        assert_eq!(clip.channels, vec![Channel::LocationZ]);
        let heights = clip.channel_values(Channel::LocationZ).unwrap();
        assert!(heights.iter().all(|h| h.abs() <= 0.2 + 1e-6));
    }

    #[test]
    fn test_spin_is_linear_full_turn() {
        let clip = AnimationKind::Spin.clip();
        assert_eq!(clip.keyframes.len(), 2);
        assert_eq!(clip.keyframes[0].frame, 0);
        assert_eq!(clip.keyframes[1].frame, TIMELINE_FRAMES);
        assert_close(clip.keyframes[0].values[0], 0.0);
        assert_close(clip.keyframes[1].values[0], 360.0);
    }

    #[test]
    fn test_pulse_is_faster_than_dance() {
        let pulse = AnimationKind::Pulse.clip();
        assert_eq!(pulse.channels, vec![Channel::Scale]);
        let values = pulse.channel_values(Channel::Scale).unwrap();
        // Period of 20 frames: back at rest on frame 10 and 20.
        assert_close(values[5], 1.0);
        assert_close(values[10], 1.0);
        assert!(values[2] > 1.09);
    }

    #[test]
    fn test_periodic_clips_loop_seamlessly() {
        for kind in [AnimationKind::Dance, AnimationKind::Bounce, AnimationKind::Pulse] {
            let clip = kind.clip();
            let first = &clip.keyframes[0];
            let last = clip.keyframes.last().unwrap();
            assert_eq!(last.frame, clip.frame_end());
            for (a, b) in first.values.iter().zip(&last.values) {
                assert_close(*a, *b);
            }
        }
    }
}
