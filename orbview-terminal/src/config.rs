//! Command line and application settings
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use orbview_core::{HitPolicy, LoadOptions, MaterialBinding};

/// How a picking ray chooses among the triangles it crosses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum HitPolicyArg {
    #[value(name = "closest")]
    Closest,
    #[value(name = "first")]
    First,
}

impl std::fmt::Display for HitPolicyArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HitPolicyArg::Closest => write!(f, "closest"),
            HitPolicyArg::First => write!(f, "first"),
        }
    }
}

impl From<HitPolicyArg> for HitPolicy {
    fn from(arg: HitPolicyArg) -> Self {
        match arg {
            HitPolicyArg::Closest => HitPolicy::Closest,
            HitPolicyArg::First => HitPolicy::FirstTested,
        }
    }
}

/// Which `usemtl` name a face group takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BindingArg {
    /// The name active while the faces were read
    #[value(name = "during")]
    During,
    /// The name of the `usemtl` that ends the group
    #[value(name = "closing")]
    Closing,
}

impl std::fmt::Display for BindingArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindingArg::During => write!(f, "during"),
            BindingArg::Closing => write!(f, "closing"),
        }
    }
}

impl From<BindingArg> for MaterialBinding {
    fn from(arg: BindingArg) -> Self {
        match arg {
            BindingArg::During => MaterialBinding::ActiveDuringGroup,
            BindingArg::Closing => MaterialBinding::TerminatingName,
        }
    }
}

/// Terminal viewer for OBJ models.
#[derive(Debug, Parser)]
#[command(name = "orbview", version, about)]
pub struct CliArgs {
    /// OBJ files to show; a demo scene is used when none are given
    pub models: Vec<PathBuf>,

    /// Directory that relative model paths resolve against
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = HitPolicyArg::Closest)]
    pub hit_policy: HitPolicyArg,

    #[arg(long, value_enum, default_value_t = BindingArg::During)]
    pub binding: BindingArg,

    /// Target frame rate
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..=240))]
    pub fps: u32,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Print a summary of the loaded models and exit
    #[arg(long)]
    pub info: bool,
}

/// Resolved settings (constructed from CLI args).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub models: Vec<PathBuf>,
    pub load: LoadOptions,
    pub frame_time: Duration,
    pub verbose: bool,
    pub info_only: bool,
}

impl From<CliArgs> for AppConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            models: args.models,
            load: LoadOptions {
                hit_policy: args.hit_policy.into(),
                binding: args.binding.into(),
                data_dir: args.data_dir,
            },
            frame_time: Duration::from_millis(1000 / args.fps.max(1) as u64),
            verbose: args.verbose,
            info_only: args.info,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            models: Vec::new(),
            load: LoadOptions::default(),
            frame_time: Duration::from_millis(1000 / 30),
            verbose: false,
            info_only: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> AppConfig {
        CliArgs::try_parse_from(args).unwrap().into()
    }

    #[test]
    fn test_defaults() {
        let config = config(&["orbview"]);
        assert!(config.models.is_empty());
        assert_eq!(config.load.hit_policy, HitPolicy::Closest);
        assert_eq!(config.load.binding, MaterialBinding::ActiveDuringGroup);
        assert_eq!(config.load.data_dir, None);
        assert_eq!(config.frame_time, Duration::from_millis(33));
        assert!(!config.verbose && !config.info_only);
    }

    #[test]
    fn test_all_options() {
        let config = config(&[
            "orbview",
            "--data-dir",
            "data",
            "--hit-policy",
            "first",
            "--binding",
            "closing",
            "--fps",
            "10",
            "-v",
            "--info",
            "a.obj",
            "b.obj",
        ]);
        assert_eq!(config.models, vec![PathBuf::from("a.obj"), PathBuf::from("b.obj")]);
        assert_eq!(config.load.data_dir, Some(PathBuf::from("data")));
        assert_eq!(config.load.hit_policy, HitPolicy::FirstTested);
        assert_eq!(config.load.binding, MaterialBinding::TerminatingName);
        assert_eq!(config.frame_time, Duration::from_millis(100));
        assert!(config.verbose && config.info_only);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(CliArgs::try_parse_from(["orbview", "--hit-policy", "nearest"]).is_err());
        assert!(CliArgs::try_parse_from(["orbview", "--fps", "0"]).is_err());
    }

    #[test]
    fn test_value_names_match_display() {
        use clap::ValueEnum;
        for arg in HitPolicyArg::value_variants() {
            let name = arg.to_possible_value().unwrap();
            assert_eq!(name.get_name(), arg.to_string());
        }
        for arg in BindingArg::value_variants() {
            let name = arg.to_possible_value().unwrap();
            assert_eq!(name.get_name(), arg.to_string());
        }
    }
}
