use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gffkit::{
    commands::{gffkit_filter, gffkit_lift, gffkit_rename, gffkit_sort},
    filter::FilterParams,
    gff::hierarchy::LinkagePolicy,
    prelude::*,
    rename::{RenameOptions, DEFAULT_GENE_FORMAT, DEFAULT_GENE_PREFIX},
    Position,
};
use log::{warn, LevelFilter};

const INFO: &str = "\
gffkit: lift, rename, filter and sort GFF3 gene models
usage: gffkit [--help] <subcommand>

Subcommands:

  lift: project features onto another assembly through alignment anchors.
  rename: rename genes and their children with a numbered id template or prefix.
  filter: keep gene models passing CDS count, length and intron heuristics.
  sort: sort gene models by position and renumber them with a locus tag.

";

#[derive(Parser)]
#[clap(name = "gffkit")]
#[clap(about = INFO)]
struct Cli {
    /// log more (-d for info, -dd for debug, -ddd for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    debug: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Lift {
        /// an input GFF3 file (optionally gzip-compressed)
        #[arg(required = true)]
        gff: PathBuf,

        /// the alignment anchor TSV file
        #[arg(long, required = true)]
        anchors: PathBuf,

        /// an optional output file (standard output will be used if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    Rename {
        /// an input GFF3 file (optionally gzip-compressed)
        #[arg(required = true)]
        gff: PathBuf,

        /// the gene id template: the first number is the sequence counter,
        /// the second the gene index within the sequence
        #[arg(long, default_value = DEFAULT_GENE_FORMAT)]
        gene_format: String,

        /// name genes <PREFIX>_<seqid>_<n> with a global counter instead of the
        /// template, with every Parent pointing at the gene (EVM if no value is given)
        #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_GENE_PREFIX)]
        #[arg(conflicts_with = "gene_format")]
        prefix: Option<String>,

        /// abort on an mRNA whose Parent is not the open gene, and drop genes with
        /// mismatching exon/CDS lines
        #[arg(long)]
        strict: bool,

        /// synthesize exons from CDS for transcripts with at least this many CDS and
        /// no exon lines
        #[arg(long, default_value_t = 2)]
        exon_min_cds: usize,

        /// an optional output file (standard output will be used if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    Filter {
        /// an input GFF3 file (optionally gzip-compressed)
        #[arg(required = true)]
        gff: PathBuf,

        /// minimum number of CDS
        #[arg(long, default_value_t = 3)]
        min_cds_count: usize,

        /// minimum total CDS length (bp)
        #[arg(long, default_value_t = 900)]
        min_cds: Position,

        /// maximum total CDS length (bp)
        #[arg(long, default_value_t = 2000)]
        max_cds: Position,

        /// minimum ratio of total CDS length to total exon length
        #[arg(long, default_value_t = 0.6)]
        cds_exon: f64,

        /// maximum intron length (bp)
        #[arg(long, default_value_t = 80)]
        intron: Position,

        /// an optional output file (standard output will be used if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    Sort {
        /// an input GFF3 file (optionally gzip-compressed)
        #[arg(required = true)]
        gff: PathBuf,

        /// renumber genes as <LOCUS_TAG>_00001, ... (original ids are kept otherwise)
        #[arg(long)]
        locus_tag: Option<String>,

        /// synthesize exons from CDS for transcripts with at least this many CDS
        #[arg(long, default_value_t = 1)]
        exon_min_cds: usize,

        /// do not write the ##gff-version 3 header
        #[arg(long)]
        no_header: bool,

        /// an optional output file (standard output will be used if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(debug: u8) {
    let level = match debug {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    pretty_env_logger::formatted_builder()
        .filter_level(level)
        .parse_env("RUST_LOG")
        .init();
}

fn run() -> Result<(), GffError> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let result = match &cli.command {
        Some(Commands::Lift {
            gff,
            anchors,
            output,
        }) => gffkit_lift(gff, anchors, output.as_ref()),
        Some(Commands::Rename {
            gff,
            gene_format,
            prefix,
            strict,
            exon_min_cds,
            output,
        }) => {
            let policy = match prefix {
                Some(prefix) => NamingPolicy::Prefixed(prefix.clone()),
                None => NamingPolicy::Format(gene_format.parse()?),
            };
            let options = RenameOptions {
                attribute_order: policy.attribute_order(),
                policy,
                exon_synthesis: ExonSynthesis::new(*exon_min_cds),
            };
            let linkage = if *strict {
                LinkagePolicy::Strict
            } else {
                LinkagePolicy::Permissive
            };
            gffkit_rename(gff, &options, linkage, output.as_ref())
        }
        Some(Commands::Filter {
            gff,
            min_cds_count,
            min_cds,
            max_cds,
            cds_exon,
            intron,
            output,
        }) => {
            let params = FilterParams {
                min_cds_count: *min_cds_count,
                min_cds_length: *min_cds,
                max_cds_length: *max_cds,
                min_cds_exon_ratio: *cds_exon,
                max_intron: *intron,
            };
            gffkit_filter(gff, &params, output.as_ref())
        }
        Some(Commands::Sort {
            gff,
            locus_tag,
            exon_min_cds,
            no_header,
            output,
        }) => {
            let options = SortOptions {
                locus_tag: locus_tag.clone(),
                exon_synthesis: ExonSynthesis::new(*exon_min_cds),
                header: !*no_header,
            };
            gffkit_sort(gff, &options, output.as_ref())
        }
        None => {
            println!("{}\n", INFO);
            std::process::exit(1);
        }
    };
    let output = result?;
    for entry in output.report.entries() {
        warn!("{}", entry);
    }
    Ok(())
}

fn main() {
    match run() {
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
