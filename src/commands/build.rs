use anyhow::Result;

use crate::cli::{BuildArgs, Cli};
use crate::commands::config_from_args;
use crate::Engine;

pub fn run(cli: &Cli, args: &BuildArgs) -> Result<()> {
    let config = config_from_args(&args.dataset);

    if cli.verbose > 0 {
        eprintln!(
            "[build] {} -> {}",
            args.geojson.display(),
            config.data_path().display()
        );
    }

    let mut engine = Engine::build(config, &args.geojson)?;
    let zones = engine.load_all()?;
    println!(
        "Built {} with {} timezones",
        engine.config().data_path().display(),
        zones.len()
    );
    engine.close()?;
    Ok(())
}
