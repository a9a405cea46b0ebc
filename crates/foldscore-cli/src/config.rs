use crate::cli::{CommonArgs, NudgeArgs};
use crate::error::{CliError, Result};
use foldscore::core::forcefield::params::ScoringParams;
use foldscore::engine::config::{self as core_config, NudgeConfig};
use foldscore::workflows::verify;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialScoringConfig {
    params_path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialWeights {
    clash: Option<f64>,
    rama: Option<f64>,
    rotamer: Option<f64>,
    ss: Option<f64>,
    compact: Option<f64>,
    hbond: Option<f64>,
}

impl PartialWeights {
    fn is_empty(&self) -> bool {
        [
            self.clash,
            self.rama,
            self.rotamer,
            self.ss,
            self.compact,
            self.hbond,
        ]
        .iter()
        .all(Option::is_none)
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialNudgeConfig {
    top_k: Option<usize>,
    max_candidates: Option<usize>,
    torsion_steps: Option<Vec<f64>>,
    max_rotamer_alternatives: Option<usize>,
    verify_top: Option<usize>,
    use_model: Option<bool>,
    model_path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialVerifyConfig {
    tolerance: Option<f64>,
}

/// The config file as written, every field optional.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    scoring: Option<PartialScoringConfig>,
    weights: Option<PartialWeights>,
    nudge: Option<PartialNudgeConfig>,
    verify: Option<PartialVerifyConfig>,
}

impl PartialConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Reads the optional config file and applies `-S` overrides.
    pub fn load(args: &CommonArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_set_values(&args.set_values)?;
        Ok(config)
    }

    /// Scoring parameters: the CLI path, else the config file path, else the
    /// built-in defaults; then any weight overrides.
    pub fn scoring_params(&self, cli_params: Option<&Path>) -> Result<Arc<ScoringParams>> {
        let file_path = self.scoring.as_ref().and_then(|s| s.params_path.as_deref());
        let base = match cli_params.or(file_path) {
            Some(path) => {
                debug!("Loading scoring parameters from {:?}", path);
                Arc::new(ScoringParams::load(path)?)
            }
            None => ScoringParams::shared_default(),
        };

        let Some(overrides) = self.weights.as_ref().filter(|w| !w.is_empty()) else {
            return Ok(base);
        };
        let mut params = (*base).clone();
        let weights = &mut params.weights;
        for (slot, value) in [
            (&mut weights.clash, overrides.clash),
            (&mut weights.rama, overrides.rama),
            (&mut weights.rotamer, overrides.rotamer),
            (&mut weights.ss, overrides.ss),
            (&mut weights.compact, overrides.compact),
            (&mut weights.hbond, overrides.hbond),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(CliError::Config(format!(
                        "Weights must be finite and non-negative, got {v}"
                    )));
                }
                *slot = v;
            }
        }
        Ok(Arc::new(params))
    }

    /// Nudge settings: command-line flags over the config file over defaults.
    pub fn nudge_config(&self, args: &NudgeArgs) -> Result<NudgeConfig> {
        let defaults = NudgeConfig::default();
        let file = self.nudge.as_ref();
        let pick = |cli: Option<usize>, from_file: Option<usize>, default: usize| {
            cli.or(from_file).unwrap_or(default)
        };

        core_config::NudgeConfigBuilder::new()
            .top_k(pick(args.top_k, file.and_then(|n| n.top_k), defaults.top_k))
            .max_candidates(pick(
                args.max_candidates,
                file.and_then(|n| n.max_candidates),
                defaults.max_candidates,
            ))
            .torsion_steps(
                file.and_then(|n| n.torsion_steps.clone())
                    .unwrap_or(defaults.torsion_steps),
            )
            .max_rotamer_alternatives(pick(
                None,
                file.and_then(|n| n.max_rotamer_alternatives),
                defaults.max_rotamer_alternatives,
            ))
            .verify_top(pick(
                args.verify_top,
                file.and_then(|n| n.verify_top),
                defaults.verify_top,
            ))
            .use_model(!args.no_model && file.and_then(|n| n.use_model).unwrap_or(true))
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Delta model to load, if any.
    pub fn model_path(&self, args: &NudgeArgs) -> Option<PathBuf> {
        if args.no_model {
            return None;
        }
        args.model
            .clone()
            .or_else(|| self.nudge.as_ref().and_then(|n| n.model_path.clone()))
    }

    pub fn tolerance(&self, cli: Option<f64>) -> f64 {
        cli.or(self.verify.as_ref().and_then(|v| v.tolerance))
            .unwrap_or(verify::DEFAULT_TOLERANCE)
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "scoring.params-path" => {
                    self.scoring.get_or_insert_with(Default::default).params_path =
                        Some(PathBuf::from(value_str));
                }
                "weights.clash" | "weights.rama" | "weights.rotamer" | "weights.ss"
                | "weights.compact" | "weights.hbond" => {
                    let value = Some(parse_value::<f64>(key, value_str)?);
                    let weights = self.weights.get_or_insert_with(Default::default);
                    match key {
                        "weights.clash" => weights.clash = value,
                        "weights.rama" => weights.rama = value,
                        "weights.rotamer" => weights.rotamer = value,
                        "weights.ss" => weights.ss = value,
                        "weights.compact" => weights.compact = value,
                        _ => weights.hbond = value,
                    }
                }
                "nudge.top-k" => {
                    self.nudge.get_or_insert_with(Default::default).top_k =
                        Some(parse_value(key, value_str)?);
                }
                "nudge.max-candidates" => {
                    self.nudge.get_or_insert_with(Default::default).max_candidates =
                        Some(parse_value(key, value_str)?);
                }
                "nudge.max-rotamer-alternatives" => {
                    self.nudge
                        .get_or_insert_with(Default::default)
                        .max_rotamer_alternatives = Some(parse_value(key, value_str)?);
                }
                "nudge.verify-top" => {
                    self.nudge.get_or_insert_with(Default::default).verify_top =
                        Some(parse_value(key, value_str)?);
                }
                "nudge.use-model" => {
                    self.nudge.get_or_insert_with(Default::default).use_model =
                        Some(parse_value(key, value_str)?);
                }
                "nudge.model-path" => {
                    self.nudge.get_or_insert_with(Default::default).model_path =
                        Some(PathBuf::from(value_str));
                }
                "nudge.torsion-steps" => {
                    let steps = value_str
                        .split(',')
                        .map(|s| parse_value::<f64>(key, s.trim()))
                        .collect::<Result<Vec<_>>>()?;
                    self.nudge.get_or_insert_with(Default::default).torsion_steps = Some(steps);
                }
                "verify.tolerance" => {
                    self.verify.get_or_insert_with(Default::default).tolerance =
                        Some(parse_value(key, value_str)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value_str: &str) -> Result<T> {
    value_str.parse().map_err(|_| {
        CliError::Config(format!("Invalid value for {}: {}", key, value_str))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn write_config_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let file_path = dir.path().join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn nudge_args(extra: &[&str]) -> NudgeArgs {
        let mut args = vec!["foldscore", "nudge", "-i", "in.json"];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Nudge(args) => args,
            _ => panic!("Expected 'nudge' subcommand"),
        }
    }

    #[test]
    fn defaults_apply_without_a_config_file() {
        let args = nudge_args(&[]);
        let config = PartialConfig::load(&args.common).unwrap();
        assert_eq!(config.nudge_config(&args).unwrap(), NudgeConfig::default());
        assert!(config.model_path(&args).is_none());
        assert_eq!(config.tolerance(None), verify::DEFAULT_TOLERANCE);
        let params = config.scoring_params(None).unwrap();
        assert!(Arc::ptr_eq(&params, &ScoringParams::shared_default()));
    }

    #[test]
    fn file_values_are_merged_and_cli_flags_win() {
        let dir = tempdir().unwrap();
        let path = write_config_file(
            &dir,
            "config.toml",
            r#"
            [weights]
            clash = 2.0

            [nudge]
            top-k = 4
            max-candidates = 50
            torsion-steps = [3.0]
            verify-top = 2
            model-path = "model.json"

            [verify]
            tolerance = 0.01
            "#,
        );
        let args = nudge_args(&["-c", path.to_str().unwrap(), "--max-candidates", "20"]);
        let config = PartialConfig::load(&args.common).unwrap();

        let nudge = config.nudge_config(&args).unwrap();
        assert_eq!(nudge.top_k, 4);
        assert_eq!(nudge.max_candidates, 20);
        assert_eq!(nudge.torsion_steps, vec![3.0]);
        assert_eq!(nudge.verify_top, 2);
        assert_eq!(config.model_path(&args), Some(PathBuf::from("model.json")));
        assert_eq!(config.tolerance(None), 0.01);
        assert_eq!(config.tolerance(Some(0.5)), 0.5);

        let params = config.scoring_params(None).unwrap();
        assert_eq!(params.weights.clash, 2.0);
        assert_eq!(params.weights.rama, 0.6);
    }

    #[test]
    fn set_values_override_the_file() {
        let dir = tempdir().unwrap();
        let path = write_config_file(&dir, "config.toml", "[nudge]\ntop-k = 4\n");
        let args = nudge_args(&[
            "-c",
            path.to_str().unwrap(),
            "-S",
            "nudge.top-k=7",
            "-S",
            "nudge.torsion-steps=2, 4",
            "-S",
            "weights.hbond=0",
        ]);
        let config = PartialConfig::load(&args.common).unwrap();
        let nudge = config.nudge_config(&args).unwrap();
        assert_eq!(nudge.top_k, 7);
        assert_eq!(nudge.torsion_steps, vec![2.0, 4.0]);
        assert_eq!(config.scoring_params(None).unwrap().weights.hbond, 0.0);
    }

    #[test]
    fn no_model_disables_model_use() {
        let args = nudge_args(&["--no-model", "-S", "nudge.model-path=m.json"]);
        let config = PartialConfig::load(&args.common).unwrap();
        assert!(config.model_path(&args).is_none());
        assert!(!config.nudge_config(&args).unwrap().use_model);
    }

    #[test]
    fn bad_set_values_are_rejected() {
        for bad in ["nudge.top-k", "nudge.top-k=x", "unknown.key=1"] {
            let args = nudge_args(&["-S", bad]);
            assert!(
                matches!(PartialConfig::load(&args.common), Err(CliError::Config(_))),
                "accepted {bad}"
            );
        }
    }

    #[test]
    fn invalid_nudge_values_are_config_errors() {
        let args = nudge_args(&["-k", "0"]);
        let config = PartialConfig::load(&args.common).unwrap();
        assert!(matches!(config.nudge_config(&args), Err(CliError::Config(_))));
    }

    #[test]
    fn negative_weight_is_rejected() {
        let args = nudge_args(&["-S", "weights.clash=-1"]);
        let config = PartialConfig::load(&args.common).unwrap();
        assert!(matches!(config.scoring_params(None), Err(CliError::Config(_))));
    }

    #[test]
    fn unknown_file_keys_are_parse_errors() {
        let dir = tempdir().unwrap();
        let path = write_config_file(&dir, "bad.toml", "[nudge]\ntopk = 3\n");
        assert!(matches!(
            PartialConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));
    }

    #[test]
    fn params_file_is_loaded_from_the_cli_path() {
        let dir = tempdir().unwrap();
        let path = write_config_file(&dir, "params.toml", "[weights]\nrama = 0.9\n");
        let config = PartialConfig::default();
        let params = config.scoring_params(Some(&path)).unwrap();
        assert_eq!(params.weights.rama, 0.9);
    }
}
