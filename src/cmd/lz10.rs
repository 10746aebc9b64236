use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use argh::FromArgs;

use rvltool::util::{file::map_file, lz10};

#[derive(FromArgs, PartialEq, Debug)]
/// process LZ10 compressed files
#[argh(subcommand, name = "lz10")]
pub struct Args {
    #[argh(subcommand)]
    command: SubCommand,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
enum SubCommand {
    Decompress(DecompressArgs),
}

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// decompress an LZ10 file
#[argh(subcommand, name = "decompress")]
pub struct DecompressArgs {
    #[argh(positional)]
    /// input file
    input: PathBuf,
    #[argh(positional)]
    /// output file
    output: PathBuf,
}

pub fn run(args: Args) -> Result<()> {
    match args.command {
        SubCommand::Decompress(c_args) => decompress(c_args),
    }
}

fn decompress(args: DecompressArgs) -> Result<()> {
    let data = map_file(&args.input)?;
    let out = lz10::decompress(&data)
        .with_context(|| format!("Failed to decompress '{}'", args.input.display()))?;
    fs::write(&args.output, &out)
        .with_context(|| format!("Failed to write output file '{}'", args.output.display()))?;
    log::info!("Decompressed {} bytes to '{}'", out.len(), args.output.display());
    Ok(())
}
