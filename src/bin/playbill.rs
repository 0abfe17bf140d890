use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "playbill", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one poster document as a PNG.
    Render(RenderArgs),
    /// Write the built-in fixture posters.
    Fixtures(FixturesArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input poster JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Print per-tier font resolution (family + source path, or fallback).
    #[arg(long)]
    dump_fonts: bool,
}

#[derive(Parser, Debug)]
struct FixturesArgs {
    /// Output directory for the fixture PNGs.
    #[arg(long, default_value = "test-images")]
    out_dir: PathBuf,

    /// Render only the named scenario (e.g. `meeting`).
    #[arg(long)]
    only: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Fixtures(args) => cmd_fixtures(args),
    }
}

fn read_doc_json(path: &Path) -> anyhow::Result<playbill::PosterDoc> {
    let f = File::open(path).with_context(|| format!("open poster '{}'", path.display()))?;
    let doc = playbill::PosterDoc::from_json_reader(BufReader::new(f))
        .with_context(|| format!("read poster '{}'", path.display()))?;
    Ok(doc)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let doc = read_doc_json(&args.in_path)?;
    doc.validate()?;

    let mut generator = playbill::PosterGenerator::new();
    if args.dump_fonts {
        dump_font_diagnostics(&mut generator, &doc.style);
    }

    generator.generate(&doc, &args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_fixtures(args: FixturesArgs) -> anyhow::Result<()> {
    let scenarios = match &args.only {
        Some(name) => {
            let s = playbill::scenarios::find(name)
                .with_context(|| format!("unknown scenario '{name}'"))?;
            vec![s]
        }
        None => playbill::scenarios::all(),
    };

    let mut generator = playbill::PosterGenerator::new();
    for scenario in scenarios {
        let out = args.out_dir.join(scenario.file_name);
        generator.generate(&scenario.doc, &out)?;
        eprintln!("wrote {}", out.display());
    }
    Ok(())
}

fn dump_font_diagnostics(generator: &mut playbill::PosterGenerator, style: &playbill::StyleSheet) {
    let fonts = generator.resolve_fonts(style);
    for (tier, font) in fonts.iter() {
        eprintln!("font[{tier}]: {}", font.describe());
    }
}
