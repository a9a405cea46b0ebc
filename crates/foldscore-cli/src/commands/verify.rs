use super::read_request;
use crate::cli::VerifyArgs;
use crate::config::PartialConfig;
use crate::error::{CliError, Result};
use foldscore::core::io::payload::ScoreResponse;
use foldscore::workflows::verify;
use tracing::info;

/// Rescores the submission and writes the recomputed breakdown. A mismatch
/// is reported as an error after the breakdown has been written.
pub fn run(args: VerifyArgs) -> Result<()> {
    let config = PartialConfig::load(&args.common)?;
    let params = config.scoring_params(args.common.params.as_deref())?;
    let tolerance = config.tolerance(args.tolerance);
    let request = read_request(&args.common.input)?;

    info!("Invoking verification...");
    let outcome = verify::verify_submission(&request, args.claimed, &params, tolerance)?;
    super::write_response(
        &ScoreResponse::from(&outcome.breakdown),
        args.common.output.as_ref(),
    )?;

    if outcome.accepted {
        info!(score = outcome.recomputed(), "Submission accepted.");
        Ok(())
    } else {
        Err(CliError::Rejected {
            claimed: outcome.claimed,
            recomputed: outcome.recomputed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::commands::score::tests::write_request;
    use clap::Parser;
    use foldscore::core::forcefield::params::ScoringParams;
    use foldscore::core::io::payload::{JsonPayload, ScoreRequest};
    use foldscore::workflows::score;

    fn verify_args(input: &str, output: &str, claimed: f64) -> VerifyArgs {
        let claimed = claimed.to_string();
        let cli = Cli::parse_from([
            "foldscore",
            "verify",
            "-i",
            input,
            "-o",
            output,
            "--claimed",
            claimed.as_str(),
        ]);
        match cli.command {
            Commands::Verify(args) => args,
            _ => panic!("expected verify"),
        }
    }

    #[test]
    fn honest_and_dishonest_claims() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_request(dir.path(), "GAVLIMFW");
        let output = dir.path().join("verified.json");
        let request = ScoreRequest::read_from_path(&input).unwrap();
        let honest = score::run(&request, ScoringParams::shared_default())
            .unwrap()
            .score;

        let (input, output) = (input.to_str().unwrap(), output.to_str().unwrap());
        run(verify_args(input, output, honest)).unwrap();
        assert!(matches!(
            run(verify_args(input, output, honest + 1.0)),
            Err(CliError::Rejected { .. })
        ));
        let written = ScoreResponse::read_from_path(output).unwrap();
        assert!((written.score - honest).abs() < 1e-9);
    }
}
