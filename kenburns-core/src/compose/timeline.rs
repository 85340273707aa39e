use std::{fmt, path::PathBuf};

use crate::foundation::error::{KenBurnsError, KenBurnsResult};

/// Gap kept between a fade and the shorter of its two clips, so a fade never swallows a clip.
pub const FADE_EPSILON_SECS: f64 = 0.01;

/// One encoded clip as seen by the compositor.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClipDescriptor {
    /// Position of the source image in the slideshow.
    pub index: usize,
    /// Clip length in seconds.
    pub duration: f64,
    /// Declared fade into the next clip, in seconds.
    pub fade_duration: f64,
    /// Encoded clip on disk.
    pub source: PathBuf,
}

/// Transition applied at a clip boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Transition {
    /// Linear cross-fade.
    #[default]
    Fade,
}

impl Transition {
    /// Name understood by ffmpeg's `xfade` filter.
    pub fn xfade_name(self) -> &'static str {
        match self {
            Self::Fade => "fade",
        }
    }
}

/// One `xfade` node joining the running output with the next clip.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CrossfadeStep {
    /// Running output so far (`[0:v]` for the first step).
    pub left_label: String,
    /// Incoming clip.
    pub right_label: String,
    /// Stream produced by this step.
    pub output_label: String,
    /// Transition kind.
    pub transition: Transition,
    /// Effective fade length in seconds.
    pub duration: f64,
    /// Start of the fade on the running output timeline, in seconds.
    pub offset: f64,
}

impl fmt::Display for CrossfadeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}xfade=transition={}:duration={:.3}:offset={:.3}{}",
            self.left_label,
            self.right_label,
            self.transition.xfade_name(),
            self.duration,
            self.offset,
            self.output_label
        )
    }
}

/// Chain of cross-fades rendered as an ffmpeg `filter_complex` string.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FilterGraph {
    /// Steps in application order.
    pub steps: Vec<CrossfadeStep>,
}

impl FilterGraph {
    /// Label of the final stream, mapped to the output file.
    pub fn output_label(&self) -> String {
        self.steps
            .last()
            .map(|s| s.output_label.clone())
            .unwrap_or_else(|| input_label(0))
    }
}

impl fmt::Display for FilterGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

/// How the encoded clips become the final video.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TimelinePlan {
    /// One clip, copied through untouched.
    Single {
        /// The only clip.
        source: PathBuf,
        /// Its length in seconds.
        duration: f64,
    },
    /// Clips merged by a chain of cross-fades.
    Crossfade {
        /// Clips in input order; input `i` is addressed as `[i:v]`.
        inputs: Vec<PathBuf>,
        /// The `xfade` chain.
        graph: FilterGraph,
        /// Length of the merged video in seconds.
        total_duration: f64,
    },
}

impl TimelinePlan {
    /// Length of the final video in seconds.
    pub fn total_duration(&self) -> f64 {
        match self {
            Self::Single { duration, .. } => *duration,
            Self::Crossfade { total_duration, .. } => *total_duration,
        }
    }
}

fn input_label(index: usize) -> String {
    format!("[{index}:v]")
}

fn output_label(step: usize) -> String {
    format!("[x{step}]")
}

/// Fade actually applied between clips of length `a` and `b`.
///
/// Clamped to `[0, min(a, b) - FADE_EPSILON_SECS]`; non-finite declarations mean no fade.
pub fn effective_fade(declared: f64, a: f64, b: f64) -> f64 {
    let max_fade = (a.min(b) - FADE_EPSILON_SECS).max(0.0);
    if !declared.is_finite() {
        return 0.0;
    }
    declared.clamp(0.0, max_fade)
}

/// Plan the merge of `clips` in order.
///
/// The fade at each boundary comes from the outgoing clip. Offsets are measured on the running
/// output, which shrinks by every fade already applied.
pub fn plan_timeline(clips: &[ClipDescriptor]) -> KenBurnsResult<TimelinePlan> {
    for clip in clips {
        if !clip.duration.is_finite() || clip.duration <= 0.0 {
            return Err(KenBurnsError::composition(format!(
                "clip {} has invalid duration {}",
                clip.index, clip.duration
            )));
        }
    }

    let (first, rest) = clips
        .split_first()
        .ok_or_else(|| KenBurnsError::composition("no clips to compose"))?;

    if rest.is_empty() {
        return Ok(TimelinePlan::Single {
            source: first.source.clone(),
            duration: first.duration,
        });
    }

    let mut running = first.duration;
    let mut steps = Vec::with_capacity(rest.len());
    for (i, pair) in clips.windows(2).enumerate() {
        let (out_clip, in_clip) = (&pair[0], &pair[1]);
        let fade = effective_fade(out_clip.fade_duration, out_clip.duration, in_clip.duration);
        let offset = (running - fade).max(0.0);
        running += in_clip.duration - fade;

        let left_label = if i == 0 {
            input_label(0)
        } else {
            output_label(i)
        };
        steps.push(CrossfadeStep {
            left_label,
            right_label: input_label(i + 1),
            output_label: output_label(i + 1),
            transition: Transition::Fade,
            duration: fade,
            offset,
        });
    }

    tracing::debug!(
        clips = clips.len(),
        total_duration = running,
        "planned cross-fade timeline"
    );

    Ok(TimelinePlan::Crossfade {
        inputs: clips.iter().map(|c| c.source.clone()).collect(),
        graph: FilterGraph { steps },
        total_duration: running,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/compose/timeline.rs"]
mod tests;
