use super::{read_request, write_response};
use crate::cli::ScoreArgs;
use crate::config::PartialConfig;
use crate::error::Result;
use foldscore::workflows;
use tracing::info;

pub fn run(args: ScoreArgs) -> Result<()> {
    let config = PartialConfig::load(&args.common)?;
    let params = config.scoring_params(args.common.params.as_deref())?;
    let request = read_request(&args.common.input)?;

    info!("Invoking the score workflow...");
    let response = workflows::score::run(&request, params)?;
    info!(
        score = response.score,
        residues = response.per_residue.len(),
        "Score computed."
    );

    write_response(&response, args.common.output.as_ref())
}
