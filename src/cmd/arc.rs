use std::{borrow::Cow, fs, path::PathBuf};

use anyhow::{Context, Result};
use argh::FromArgs;

use rvltool::{
    format::arc::{U8EntryKind, U8View},
    util::{file::map_file, lz10},
};

#[derive(FromArgs, PartialEq, Debug)]
/// process U8 archive files
#[argh(subcommand, name = "arc")]
pub struct Args {
    #[argh(subcommand)]
    command: SubCommand,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
enum SubCommand {
    Extract(ExtractArgs),
    List(ListArgs),
}

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// extract a U8 archive
#[argh(subcommand, name = "extract")]
pub struct ExtractArgs {
    #[argh(positional)]
    /// input file
    input: PathBuf,
    #[argh(positional)]
    /// output directory
    output: PathBuf,
}

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// list the contents of a U8 archive
#[argh(subcommand, name = "list")]
pub struct ListArgs {
    #[argh(positional)]
    /// input file
    input: PathBuf,
}

pub fn run(args: Args) -> Result<()> {
    match args.command {
        SubCommand::Extract(c_args) => extract(c_args),
        SubCommand::List(c_args) => list(c_args),
    }
}

// Archives often ship LZ10-wrapped on disc; unwrap transparently.
fn maybe_decompress(data: &[u8]) -> Result<Cow<'_, [u8]>> {
    if data.first() == Some(&lz10::LZ10_TAG) {
        let out = lz10::decompress(data).context("Failed to decompress LZ10 archive")?;
        Ok(Cow::Owned(out))
    } else {
        Ok(Cow::Borrowed(data))
    }
}

fn extract(args: ExtractArgs) -> Result<()> {
    let map = map_file(&args.input)?;
    let data = maybe_decompress(&map)?;
    let view = U8View::parse(&data)
        .with_context(|| format!("Failed to parse U8 archive '{}'", args.input.display()))?;

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create directory '{}'", args.output.display()))?;
    let mut count = 0usize;
    for entry in view.entries() {
        let path = args.output.join(&entry.path);
        match entry.kind {
            U8EntryKind::Directory => {
                fs::create_dir_all(&path)
                    .with_context(|| format!("Failed to create directory '{}'", path.display()))?;
            }
            U8EntryKind::File => {
                log::debug!("Extracting '{}' ({} bytes)", entry.path.display(), entry.size);
                fs::write(&path, view.file_data(entry))
                    .with_context(|| format!("Failed to write file '{}'", path.display()))?;
                count += 1;
            }
        }
    }
    log::info!("Extracted {} files to '{}'", count, args.output.display());
    Ok(())
}

fn list(args: ListArgs) -> Result<()> {
    let map = map_file(&args.input)?;
    let data = maybe_decompress(&map)?;
    let view = U8View::parse(&data)
        .with_context(|| format!("Failed to parse U8 archive '{}'", args.input.display()))?;
    for entry in view.entries() {
        match entry.kind {
            U8EntryKind::Directory => println!("{}/", entry.path.display()),
            U8EntryKind::File => println!("{} ({} bytes)", entry.path.display(), entry.size),
        }
    }
    Ok(())
}
