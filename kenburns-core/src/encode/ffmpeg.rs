use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use crate::{
    compose::timeline::FilterGraph,
    foundation::{
        core::Fps,
        error::{KenBurnsError, KenBurnsResult},
    },
};

/// Lower-cased stderr fragments that mean "this codec cannot run here", as opposed to a bad
/// input or a full disk.
const UNAVAILABLE_SIGNATURES: &[&str] = &[
    "unknown encoder",
    "encoder not found",
    "no capable devices found",
    "no nvenc capable devices",
    "cannot load libcuda",
    "cannot load nvcuda",
    "openencodesessionex failed",
    "device creation failed",
    "cannot create compression session",
    "error creating a videotoolbox",
    "driver does not support the required nvenc api version",
];

/// Codec selection and quality knobs for the system `ffmpeg` binary.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    /// ffmpeg executable, looked up on `PATH` when relative.
    pub ffmpeg_bin: PathBuf,
    /// Hardware codec tried first; `None` goes straight to software.
    pub hardware_codec: Option<String>,
    /// Bitrate handed to the hardware codec.
    pub hardware_bitrate: String,
    /// Software fallback codec.
    pub software_codec: String,
    /// Constant rate factor for the software codec.
    pub crf: u8,
    /// x264-style preset for the software codec.
    pub preset: String,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            ffmpeg_bin: PathBuf::from("ffmpeg"),
            hardware_codec: Some(default_hardware_codec().to_string()),
            hardware_bitrate: "8M".to_string(),
            software_codec: "libx264".to_string(),
            crf: 20,
            preset: "medium".to_string(),
        }
    }
}

/// Platform hardware H.264 encoder.
pub fn default_hardware_codec() -> &'static str {
    if std::env::consts::OS == "macos" {
        "h264_videotoolbox"
    } else {
        "h264_nvenc"
    }
}

/// Whether `bin -version` runs successfully.
pub fn is_ffmpeg_available(bin: &Path) -> bool {
    Command::new(bin)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Whether ffmpeg's stderr says the codec itself is unusable on this machine.
pub fn is_encoder_unavailable_message(stderr: &str) -> bool {
    let lower = stderr.to_ascii_lowercase();
    UNAVAILABLE_SIGNATURES.iter().any(|sig| lower.contains(sig))
}

/// Create the parent directory of `path` if needed.
pub fn ensure_parent_dir(path: &Path) -> KenBurnsResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Encodes frame sequences and merges clips through the system `ffmpeg` binary.
///
/// Every job tries the hardware codec first. An [`KenBurnsError::EncoderUnavailable`] failure
/// retries the job once with the software codec and pins the encoder to software for the rest
/// of its lifetime; any other failure propagates unchanged.
#[derive(Debug)]
pub struct FfmpegEncoder {
    settings: EncoderSettings,
    hardware_disabled: bool,
}

impl FfmpegEncoder {
    /// Build an encoder; fails if the ffmpeg binary cannot be run.
    pub fn new(settings: EncoderSettings) -> KenBurnsResult<Self> {
        if !is_ffmpeg_available(&settings.ffmpeg_bin) {
            return Err(KenBurnsError::encode(format!(
                "ffmpeg is required for encoding, but '{}' could not be run",
                settings.ffmpeg_bin.display()
            )));
        }
        Ok(Self::unchecked(settings))
    }

    /// Build without probing the binary.
    pub fn unchecked(settings: EncoderSettings) -> Self {
        let hardware_disabled = settings.hardware_codec.is_none();
        Self {
            settings,
            hardware_disabled,
        }
    }

    /// Codec the next job will try first.
    pub fn current_codec(&self) -> &str {
        match (&self.settings.hardware_codec, self.hardware_disabled) {
            (Some(hw), false) => hw,
            _ => &self.settings.software_codec,
        }
    }

    /// Encode an image2 `pattern` at `fps` into a `duration`-second clip at `out`.
    ///
    /// Returns the codec that produced the clip.
    #[tracing::instrument(skip_all, fields(out = %out.display(), duration = duration))]
    pub fn encode_clip(
        &mut self,
        pattern: &Path,
        fps: Fps,
        duration: f64,
        out: &Path,
    ) -> KenBurnsResult<String> {
        ensure_parent_dir(out)?;
        self.run_with_fallback(|codec_args| clip_args(pattern, fps, duration, codec_args, out))
    }

    /// Merge `inputs` through a cross-fade `graph` into `out`.
    ///
    /// Returns the codec that produced the output.
    #[tracing::instrument(skip_all, fields(out = %out.display(), inputs = inputs.len()))]
    pub fn merge_clips(
        &mut self,
        inputs: &[PathBuf],
        graph: &FilterGraph,
        out: &Path,
    ) -> KenBurnsResult<String> {
        ensure_parent_dir(out)?;
        self.run_with_fallback(|codec_args| merge_args(inputs, graph, codec_args, out))
    }

    fn run_with_fallback(
        &mut self,
        build: impl Fn(&[String]) -> Vec<OsString>,
    ) -> KenBurnsResult<String> {
        if let (Some(hw), false) = (self.settings.hardware_codec.clone(), self.hardware_disabled) {
            match self.run(&build(&self.codec_args(&hw)), &hw) {
                Ok(()) => return Ok(hw),
                Err(e) if e.is_encoder_unavailable() => {
                    tracing::warn!(
                        codec = %hw,
                        fallback = %self.settings.software_codec,
                        error = %e,
                        "hardware encoder unavailable, falling back to software"
                    );
                    self.hardware_disabled = true;
                }
                Err(e) => return Err(e),
            }
        }

        let sw = self.settings.software_codec.clone();
        self.run(&build(&self.codec_args(&sw)), &sw)?;
        Ok(sw)
    }

    fn codec_args(&self, codec: &str) -> Vec<String> {
        let mut args = vec!["-c:v".to_string(), codec.to_string()];
        if Some(codec) == self.settings.hardware_codec.as_deref() {
            args.extend(["-b:v".to_string(), self.settings.hardware_bitrate.clone()]);
        } else {
            args.extend([
                "-preset".to_string(),
                self.settings.preset.clone(),
                "-crf".to_string(),
                self.settings.crf.to_string(),
            ]);
        }
        args
    }

    fn run(&self, args: &[OsString], codec: &str) -> KenBurnsResult<()> {
        tracing::debug!(?args, "running ffmpeg");
        let output = Command::new(&self.settings.ffmpeg_bin)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                KenBurnsError::encode(format!(
                    "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
                ))
            })?;

        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(classify_failure(codec, output.status, stderr.trim()))
    }
}

fn classify_failure(codec: &str, status: std::process::ExitStatus, stderr: &str) -> KenBurnsError {
    if is_encoder_unavailable_message(stderr) {
        KenBurnsError::encoder_unavailable(codec, stderr)
    } else {
        KenBurnsError::encode(format!("ffmpeg exited with status {status}: {stderr}"))
    }
}

fn common_prefix() -> Vec<OsString> {
    ["-y", "-hide_banner", "-loglevel", "error"]
        .into_iter()
        .map(OsString::from)
        .collect()
}

fn output_suffix(codec_args: &[String], out: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = codec_args.iter().map(OsString::from).collect();
    args.extend(
        ["-pix_fmt", "yuv420p", "-movflags", "+faststart"]
            .into_iter()
            .map(OsString::from),
    );
    args.push(out.as_os_str().to_owned());
    args
}

pub(crate) fn clip_args(
    pattern: &Path,
    fps: Fps,
    duration: f64,
    codec_args: &[String],
    out: &Path,
) -> Vec<OsString> {
    let rate = fps.to_ffmpeg_arg();
    let mut args = common_prefix();
    args.extend(
        ["-framerate", rate.as_str(), "-start_number", "0", "-i"]
            .into_iter()
            .map(OsString::from),
    );
    args.push(pattern.as_os_str().to_owned());
    args.extend(
        [
            "-t".to_string(),
            format!("{duration:.3}"),
            "-r".to_string(),
            rate.clone(),
            "-an".to_string(),
        ]
        .into_iter()
        .map(OsString::from),
    );
    args.extend(output_suffix(codec_args, out));
    args
}

pub(crate) fn merge_args(
    inputs: &[PathBuf],
    graph: &FilterGraph,
    codec_args: &[String],
    out: &Path,
) -> Vec<OsString> {
    let mut args = common_prefix();
    for input in inputs {
        args.push(OsString::from("-i"));
        args.push(input.as_os_str().to_owned());
    }
    args.extend(
        [
            "-filter_complex".to_string(),
            graph.to_string(),
            "-map".to_string(),
            graph.output_label(),
            "-an".to_string(),
        ]
        .into_iter()
        .map(OsString::from),
    );
    args.extend(output_suffix(codec_args, out));
    args
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
