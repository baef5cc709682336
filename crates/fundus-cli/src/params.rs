//! Pipeline parameter flags shared by the `process` and `inspect`
//! subcommands.

use clap::{Args, ValueEnum};
use fundus_pipeline::PipelineParameters;

/// Named parameter sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Tuned for DRIVE and STARE resolutions (~600 px).
    Standard,
    /// Tuned for HRF resolution (~3500 px).
    HighResolution,
}

impl Preset {
    #[must_use]
    pub const fn parameters(self) -> PipelineParameters {
        match self {
            Self::Standard => PipelineParameters::standard(),
            Self::HighResolution => PipelineParameters::high_resolution(),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ParameterArgs {
    /// Parameter preset to start from.
    #[arg(long, value_enum, default_value_t = Preset::Standard)]
    pub preset: Preset,

    /// Gaussian kernel size (odd; 1 disables smoothing).
    #[arg(long)]
    pub smoothing_kernel: Option<u32>,

    /// Gaussian sigma (0 derives it from the kernel size).
    #[arg(long)]
    pub smoothing_sigma: Option<f32>,

    /// Diameter of the elliptical black-hat structuring element.
    #[arg(long)]
    pub enhancer_kernel: Option<u32>,

    /// Green-channel intensity above which a pixel is inside the field of view.
    #[arg(long)]
    pub mask_threshold: Option<u8>,

    /// Full parameter set as a JSON string.
    ///
    /// When provided, the preset and all other parameter flags are
    /// ignored. The JSON must be a valid `PipelineParameters`
    /// serialization.
    #[arg(long)]
    pub config_json: Option<String>,
}

impl ParameterArgs {
    /// Build validated parameters: `--config-json` wins outright,
    /// otherwise individual flags override the preset.
    pub fn resolve(&self) -> Result<PipelineParameters, String> {
        if let Some(ref json) = self.config_json {
            return serde_json::from_str(json)
                .map_err(|e| format!("Error parsing --config-json: {e}"));
        }

        let base = self.preset.parameters();
        PipelineParameters::new(
            self.smoothing_kernel.unwrap_or(base.smoothing_kernel_size()),
            self.smoothing_sigma.unwrap_or(base.smoothing_sigma()),
            self.enhancer_kernel.unwrap_or(base.enhancer_kernel_size()),
            self.mask_threshold.unwrap_or(base.mask_threshold()),
        )
        .map_err(|e| e.to_string())
    }
}
