use serde::{Deserialize, Serialize};

/// Per-run encode options supplied by the caller at `start`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscodeOptions {
    /// Target video bitrate, e.g. `"1000k"`. Omitted: engine default.
    pub video_bitrate: Option<String>,
    /// Target audio bitrate, e.g. `"128k"`. Omitted: engine default.
    pub audio_bitrate: Option<String>,
    /// Additional raw arguments inserted before the output name.
    pub extra_args: Vec<String>,
}

impl TranscodeOptions {
    pub fn with_video_bitrate(bitrate: impl Into<String>) -> Self {
        Self {
            video_bitrate: Some(bitrate.into()),
            ..Self::default()
        }
    }

    /// Build the ordered argument list for one invocation: input mapping,
    /// bitrate flags, caller extras, output name last.
    pub fn build_args(&self, input_name: &str, output_name: &str) -> Vec<String> {
        let mut args = Vec::new();

        // Input file
        args.push("-i".to_string());
        args.push(input_name.to_string());

        if let Some(bitrate) = &self.video_bitrate {
            args.push("-b:v".to_string());
            args.push(bitrate.clone());
        }

        if let Some(bitrate) = &self.audio_bitrate {
            args.push("-b:a".to_string());
            args.push(bitrate.clone());
        }

        args.extend(self.extra_args.iter().cloned());

        // Output file
        args.push(output_name.to_string());

        args
    }
}
