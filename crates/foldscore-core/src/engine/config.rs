use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

/// Candidate generation and selection settings for nudge.
#[derive(Debug, Clone, PartialEq)]
pub struct NudgeConfig {
    /// Number of worst-scoring residues to search around.
    pub top_k: usize,
    pub max_candidates: usize,
    /// Torsion step sizes in degrees; each is tried with both signs.
    pub torsion_steps: Vec<f64>,
    pub max_rotamer_alternatives: usize,
    /// How many model-ranked candidates are rescored exactly.
    pub verify_top: usize,
    /// Consult the configured delta model, if any.
    pub use_model: bool,
}

impl Default for NudgeConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            max_candidates: 200,
            torsion_steps: vec![5.0, 10.0],
            max_rotamer_alternatives: 6,
            verify_top: 1,
            use_model: true,
        }
    }
}

#[derive(Default)]
pub struct NudgeConfigBuilder {
    top_k: Option<usize>,
    max_candidates: Option<usize>,
    torsion_steps: Option<Vec<f64>>,
    max_rotamer_alternatives: Option<usize>,
    verify_top: Option<usize>,
    use_model: Option<bool>,
}

impl NudgeConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }
    pub fn max_candidates(mut self, n: usize) -> Self {
        self.max_candidates = Some(n);
        self
    }
    pub fn torsion_steps(mut self, steps: Vec<f64>) -> Self {
        self.torsion_steps = Some(steps);
        self
    }
    pub fn max_rotamer_alternatives(mut self, n: usize) -> Self {
        self.max_rotamer_alternatives = Some(n);
        self
    }
    pub fn verify_top(mut self, n: usize) -> Self {
        self.verify_top = Some(n);
        self
    }
    pub fn use_model(mut self, enabled: bool) -> Self {
        self.use_model = Some(enabled);
        self
    }

    pub fn build(self) -> Result<NudgeConfig, ConfigError> {
        let config = NudgeConfig {
            top_k: self.top_k.ok_or(ConfigError::MissingParameter("top_k"))?,
            max_candidates: self
                .max_candidates
                .ok_or(ConfigError::MissingParameter("max_candidates"))?,
            torsion_steps: self
                .torsion_steps
                .ok_or(ConfigError::MissingParameter("torsion_steps"))?,
            max_rotamer_alternatives: self
                .max_rotamer_alternatives
                .ok_or(ConfigError::MissingParameter("max_rotamer_alternatives"))?,
            verify_top: self.verify_top.unwrap_or(1),
            use_model: self.use_model.unwrap_or(true),
        };
        config.validate()?;
        Ok(config)
    }
}

impl NudgeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::InvalidValue {
                name: "top_k",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_candidates == 0 {
            return Err(ConfigError::InvalidValue {
                name: "max_candidates",
                reason: "must be at least 1".to_string(),
            });
        }
        if let Some(bad) = self
            .torsion_steps
            .iter()
            .find(|s| !s.is_finite() || **s <= 0.0)
        {
            return Err(ConfigError::InvalidValue {
                name: "torsion_steps",
                reason: format!("step {bad} must be a positive number of degrees"),
            });
        }
        if self.verify_top == 0 {
            return Err(ConfigError::InvalidValue {
                name: "verify_top",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
