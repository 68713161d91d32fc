// FFmpeg-backed transcoder: stream copy into a new container with
// attached metadata, no re-encode.

use std::path::Path;
use std::process::Command;

use crate::error::{Result, TakeoutEmbedError};
use crate::tools;
use super::{TranscodeFields, Transcoder};

pub struct FfmpegTranscoder;

impl Transcoder for FfmpegTranscoder {
    fn transcode(&self, input: &Path, output: &Path, fields: &TranscodeFields) -> Result<()> {
        let args = build_transcode_args(input, output, fields)?;
        log::info!("Running ffmpeg to embed metadata: ffmpeg {}", args.join(" "));

        let result = Command::new(tools::ffmpeg_path())
            .args(&args)
            .output()
            .map_err(|e| TakeoutEmbedError::FFmpeg(format!("Failed to run ffmpeg: {}", e)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(TakeoutEmbedError::FFmpeg(format!(
                "ffmpeg failed for {}: {}",
                input.display(),
                last_stderr_line(&stderr)
            )));
        }
        Ok(())
    }
}

/// Build the full ffmpeg args list for a metadata-attaching stream copy.
fn build_transcode_args(
    input: &Path,
    output: &Path,
    fields: &TranscodeFields,
) -> Result<Vec<String>> {
    let mut args: Vec<String> = vec![
        "-y".into(),
        "-i".into(),
        path_str(input)?,
        "-metadata".into(),
        format!("title={}", fields.title),
        "-metadata".into(),
        format!("comment={}", fields.description),
    ];
    if let Some(ref creation_time) = fields.creation_time {
        args.push("-metadata".into());
        args.push(format!("creation_time={}", creation_time));
    }
    args.extend_from_slice(&["-codec".into(), "copy".into()]);
    args.push(path_str(output)?);
    Ok(args)
}

fn path_str(path: &Path) -> Result<String> {
    path.to_str()
        .map(String::from)
        .ok_or_else(|| TakeoutEmbedError::InvalidPath(format!("{}", path.display())))
}

/// ffmpeg prints progress noise before the actual error; keep the last line.
fn last_stderr_line(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("(no output)")
        .to_string()
}

/// Check if ffmpeg is available
pub fn is_available() -> bool {
    tools::is_tool_available("ffmpeg")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_args_with_creation_time() {
        let fields = TranscodeFields {
            title: "Clip".into(),
            description: "Desc".into(),
            creation_time: Some("2020-09-13T12:26:40".into()),
        };
        let args =
            build_transcode_args(Path::new("/d/b.mov"), Path::new("/d/b_withmeta.mp4"), &fields)
                .unwrap();

        assert_eq!(
            args,
            vec![
                "-y",
                "-i",
                "/d/b.mov",
                "-metadata",
                "title=Clip",
                "-metadata",
                "comment=Desc",
                "-metadata",
                "creation_time=2020-09-13T12:26:40",
                "-codec",
                "copy",
                "/d/b_withmeta.mp4",
            ]
        );
    }

    #[test]
    fn test_args_without_creation_time() {
        let fields = TranscodeFields {
            title: String::new(),
            description: String::new(),
            creation_time: None,
        };
        let args =
            build_transcode_args(Path::new("c.mp4"), Path::new("c_withmeta.mp4"), &fields).unwrap();

        assert!(!args.iter().any(|a| a.starts_with("creation_time=")));
        // Streams are copied verbatim
        let codec_pos = args.iter().position(|a| a == "-codec").unwrap();
        assert_eq!(args[codec_pos + 1], "copy");
        assert_eq!(args.last().map(PathBuf::from).unwrap(), PathBuf::from("c_withmeta.mp4"));
    }

    #[test]
    fn test_last_stderr_line() {
        assert_eq!(last_stderr_line("a\nb\n\n"), "b");
        assert_eq!(last_stderr_line(""), "(no output)");
    }
}
