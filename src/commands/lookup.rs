use anyhow::Result;

use crate::cli::{Cli, LookupArgs};
use crate::commands::config_from_args;
use crate::{Engine, Error};

pub fn run(cli: &Cli, args: &LookupArgs) -> Result<()> {
    let config = config_from_args(&args.dataset);

    if cli.verbose > 0 {
        eprintln!(
            "[lookup] lat={} lon={} dataset={}",
            args.lat,
            args.lon,
            config.data_path().display()
        );
    }

    let engine = Engine::open(config)?;
    match engine.query(args.lat, args.lon) {
        Ok(tzid) => {
            println!("{tzid}");
            Ok(())
        }
        Err(Error::NotFound) => {
            println!("no timezone found");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
