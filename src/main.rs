use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use colored::*;
use novel2book::prompt::{PartialPdfSettings, Prompter};
use novel2book::{describe_segments, BuiltinFont, Downloader, EpubOptions, HttpFetcher};
use std::path::PathBuf;
use std::process;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "novel2book")]
#[command(about = "CLI utility to turn a serialized web novel into EPUB or PDF books for offline reading")]
#[command(version = "0.1.0")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ClapArgs)]
struct CommonArgs {
    /// URL of the table of contents (asked for when omitted)
    url: Option<String>,

    /// Output directory used to save files
    #[arg(short = 'o', long = "outDir", default_value = ".")]
    out_dir: String,

    /// Request timeout in seconds
    #[arg(short = 't', long = "timeout", default_value = "30.0", value_parser = parse_timeout)]
    timeout: f64,

    /// Number of chapters fetched at the same time
    #[arg(short = 'j', long = "concurrency", default_value_t = 4)]
    concurrency: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Build one EPUB per book of a TOC that groups chapters under book headings
    Epub {
        #[command(flatten)]
        common: CommonArgs,

        /// Series title used for book titles and file names
        #[arg(long = "series", default_value = "A Practical Guide To Evil")]
        series: String,

        /// Author written into the EPUB metadata
        #[arg(long = "author", default_value = "ErraticErrata")]
        author: String,

        /// Cover image added to every book
        #[arg(long = "cover")]
        cover: Option<PathBuf>,
    },
    /// Build one PDF per part detected from chapter titles
    Pdf {
        #[command(flatten)]
        common: CommonArgs,

        /// Page width in inches
        #[arg(long = "page-width", value_parser = parse_positive)]
        page_width: Option<f32>,

        /// Page height in inches
        #[arg(long = "page-height", value_parser = parse_positive)]
        page_height: Option<f32>,

        /// Left (and right) margin in inches
        #[arg(long = "margin-left", value_parser = parse_non_negative)]
        margin_left: Option<f32>,

        /// Bottom (and top) margin in inches
        #[arg(long = "margin-bottom", value_parser = parse_non_negative)]
        margin_bottom: Option<f32>,

        /// Font size in points
        #[arg(long = "font-size", value_parser = parse_positive)]
        font_size: Option<f32>,

        /// Font name: Helvetica, Times-Roman or Courier
        #[arg(long = "font")]
        font: Option<BuiltinFont>,
    },
}

fn parse_timeout(s: &str) -> Result<f64, String> {
    let value = s.parse::<f64>().map_err(|_| "Not a number.")?;
    if value < 0.0 {
        return Err("Must be zero or positive number.".to_string());
    }
    Ok(value)
}

fn parse_positive(s: &str) -> Result<f32, String> {
    novel2book::prompt::parse_number(s, false)
}

fn parse_non_negative(s: &str) -> Result<f32, String> {
    novel2book::prompt::parse_number(s, true)
}

fn toc_url(
    given: Option<String>,
    prompter: &mut Prompter<impl std::io::BufRead, impl std::io::Write>,
) -> Result<String> {
    match given {
        Some(url) => Ok(url),
        None => prompter.ask_url(),
    }
}

fn downloader(common: &CommonArgs) -> Result<Downloader<HttpFetcher>> {
    let fetcher = HttpFetcher::new(common.timeout)?;
    Ok(Downloader::new(fetcher, &common.out_dir, common.concurrency))
}

async fn run(command: Commands) -> Result<()> {
    let mut prompter = Prompter::stdio();

    match command {
        Commands::Epub { common, series, author, cover } => {
            let url = toc_url(common.url.clone(), &mut prompter)?;
            let options = EpubOptions { series, author, cover };
            downloader(&common)?.run_epub(&url, &options).await?;
        }
        Commands::Pdf {
            common,
            page_width,
            page_height,
            margin_left,
            margin_bottom,
            font_size,
            font,
        } => {
            let url = toc_url(common.url.clone(), &mut prompter)?;
            let downloader = downloader(&common)?;

            let segments = downloader.collect_segments(&url).await?;
            println!("{}", describe_segments(&segments));

            let given = PartialPdfSettings {
                page_width_in: page_width,
                page_height_in: page_height,
                margin_left_in: margin_left,
                margin_bottom_in: margin_bottom,
                font_size_pt: font_size,
                font,
            };
            let settings = prompter.complete_pdf_settings(given)?;
            info!(
                "Rendering {} parts into {}",
                segments.len(),
                downloader.out_dir().display().to_string().blue()
            );
            downloader.write_pdfs(&segments, &settings).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::from_default_env()
        .add_directive("novel2book=info".parse().unwrap());

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args.command).await {
        error!("{}", format!("Error: {:#}", e).red());
        process::exit(1);
    }
}
