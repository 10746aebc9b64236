pub mod arc;
pub mod lz10;

use argh::FromArgs;

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
pub enum SubCommand {
    Arc(arc::Args),
    Lz10(lz10::Args),
}
