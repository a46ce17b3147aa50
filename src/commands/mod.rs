pub mod build;
pub mod lookup;

use crate::cli::DatasetArgs;
use crate::Config;

pub(crate) fn config_from_args(args: &DatasetArgs) -> Config {
    Config::new(args.storage.into(), &args.dataset)
        .with_codec(args.codec.into())
        .with_compression(args.compress)
}
