//! The command functions behind each `gffkit` subcommand.
//!
//! Every command reads its whole input before writing anything, so a fatal error never
//! leaves partial output behind. Recoverable problems are logged as they occur and
//! summarized in the returned [`Report`].

use log::{debug, info, warn};
use std::io::Write;
use std::path::PathBuf;

use crate::{
    error::GffError,
    filter::{split_transcript_groups, FilterParams, StructuralFilter},
    gff::{
        attributes::CanonicalOrder,
        hierarchy::{HierarchyBuilder, LinkagePolicy},
        record::Record,
        GFF3_HEADER,
    },
    io::{parsers::read_anchor_table, GffIterator, OutputFile},
    lift::{lift_record, LiftOutcome},
    rename::{IdentifierRenamer, RenameOptions},
    reporting::{CommandOutput, Report},
    sort::{sort_gene_models, SortOptions},
    traits::TsvSerialize,
};

const MALFORMED_ATTRIBUTES: &str = "malformed attribute segments were dropped";

fn write_lines(
    output: Option<&PathBuf>,
    header: Option<Vec<String>>,
    lines: &[String],
) -> Result<(), GffError> {
    let output_stream = OutputFile::from_option(output, header);
    let mut writer = output_stream.writer()?;
    for line in lines {
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;
    Ok(())
}

/// Lift every record of a GFF3 file into query coordinates through an anchor table.
pub fn gffkit_lift(
    gff: &PathBuf,
    anchors: &PathBuf,
    output: Option<&PathBuf>,
) -> Result<CommandOutput<()>, GffError> {
    let table = read_anchor_table(anchors)?;
    info!("loaded {} anchors", table.len());

    let mut report = Report::new();
    let mut lines = Vec::new();
    let (mut lifted, mut no_anchors, mut unplaced) = (0, 0, 0);

    let mut records = GffIterator::new(gff)?;
    for record in records.by_ref() {
        let record = match lift_record(&table, record?)? {
            LiftOutcome::Lifted(record) => {
                lifted += 1;
                record
            }
            LiftOutcome::NoAnchors(record) => {
                debug!("no anchors on {}; passing through {}", record.seqid, record.to_tsv());
                no_anchors += 1;
                record
            }
            LiftOutcome::NoContainingAnchor(record) => {
                warn!("no anchor contains {}; passing it through unchanged", record.to_tsv());
                unplaced += 1;
                record
            }
        };
        lines.push(record.to_tsv());
    }
    write_lines(output, None, &lines)?;

    info!("lifted {} features", lifted);
    report.add_count(records.malformed_attributes(), MALFORMED_ATTRIBUTES);
    report.add_count(
        unplaced,
        "features were not contained in any anchor and were passed through unchanged",
    );
    report.add_count(
        no_anchors,
        "features were on sequences without anchors and were passed through unchanged",
    );
    Ok(CommandOutput::new((), report))
}

/// Rebuild gene models and rename them.
pub fn gffkit_rename(
    gff: &PathBuf,
    options: &RenameOptions,
    linkage: LinkagePolicy,
    output: Option<&PathBuf>,
) -> Result<CommandOutput<()>, GffError> {
    let mut records = GffIterator::new(gff)?;
    let hierarchy = HierarchyBuilder::new(linkage).build(records.by_ref())?;
    let mut renamer = IdentifierRenamer::new(options.policy.clone(), options.exon_synthesis);

    let mut report = Report::new();
    let mut lines = Vec::new();
    let (mut invalid, mut extra_transcripts) = (0, 0);

    for group in hierarchy.groups.values() {
        let transcript = match group.coding_transcript() {
            Some(transcript) => transcript,
            None => {
                warn!("gene {} has no mRNA with CDS; skipping", group.gene_id);
                invalid += 1;
                continue;
            }
        };
        if group.transcripts.len() > 1 {
            info!(
                "gene {} has {} transcripts; only the first with CDS is kept",
                group.gene_id,
                group.transcripts.len()
            );
            extra_transcripts += group.transcripts.len() - 1;
        }
        for record in renamer.rename_model(&group.gene_id, &group.gene, transcript) {
            lines.push(record.to_gff_line(options.attribute_order));
        }
    }
    write_lines(output, None, &lines)?;

    info!("renamed {} genes", renamer.emitted());
    let stats = &hierarchy.stats;
    report.add_count(records.malformed_attributes(), MALFORMED_ATTRIBUTES);
    report.add_count(invalid, "genes without an mRNA carrying CDS were skipped");
    report.add_count(extra_transcripts, "additional transcripts were skipped");
    report.add_count(stats.promoted_orphans, "orphan mRNAs were promoted to genes");
    report.add_count(
        stats.aborted_groups,
        "genes were dropped because of a Parent mismatch",
    );
    report.add_count(
        stats.dropped_children,
        "exon/CDS lines were dropped because of a Parent mismatch",
    );
    report.add_count(
        stats.ignored_records,
        "records of other feature types were ignored",
    );
    Ok(CommandOutput::new((), report))
}

/// Keep the transcript groups that pass the structural filter.
pub fn gffkit_filter(
    gff: &PathBuf,
    params: &FilterParams,
    output: Option<&PathBuf>,
) -> Result<CommandOutput<()>, GffError> {
    let mut iter = GffIterator::new(gff)?;
    let records = iter.by_ref().collect::<Result<Vec<Record>, GffError>>()?;
    let filter = StructuralFilter::new(params.clone());

    let mut report = Report::new();
    report.add_count(iter.malformed_attributes(), MALFORMED_ATTRIBUTES);
    let mut lines = Vec::new();
    let (mut kept, mut rejected, mut empty) = (0, 0, 0);

    for group in split_transcript_groups(records) {
        if group.len() <= 1 {
            empty += 1;
            continue;
        }
        match filter.evaluate(&group) {
            Ok(_) => {
                kept += 1;
                lines.extend(group.records.iter().map(|r| r.to_tsv()));
            }
            Err(reason) => {
                warn!("rejecting {}: {}", group.label(), reason);
                rejected += 1;
            }
        }
    }
    write_lines(output, None, &lines)?;

    info!("kept {} transcript groups", kept);
    report.add_count(rejected, "gene models failed the structural filter");
    report.add_count(empty, "groups with at most one line were discarded");
    Ok(CommandOutput::new((), report))
}

/// Sort gene models and renumber them with an optional locus tag prefix.
pub fn gffkit_sort(
    gff: &PathBuf,
    options: &SortOptions,
    output: Option<&PathBuf>,
) -> Result<CommandOutput<()>, GffError> {
    let mut records = GffIterator::new(gff)?;
    let sorted = sort_gene_models(records.by_ref(), options)?;

    if options.locus_tag.is_some() {
        for (old_id, new_id) in &sorted.id_map {
            info!("{}\t{}", old_id, new_id);
        }
    }
    let lines: Vec<String> = sorted
        .records
        .iter()
        .map(|r| r.to_gff_line(CanonicalOrder::IdNameParent))
        .collect();
    let header = options.header.then(|| vec![GFF3_HEADER.to_string()]);
    write_lines(output, header, &lines)?;

    let mut report = Report::new();
    report.add_count(records.malformed_attributes(), MALFORMED_ATTRIBUTES);
    report.add_count(sorted.skipped.len(), "genes without an mRNA or CDS were skipped");
    Ok(CommandOutput::new((), report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rename::{ExonSynthesis, NamingPolicy};
    use crate::test_utilities::temp_file_with;
    use std::fs;

    fn run_to_string<F>(command: F) -> (Vec<String>, Report)
    where
        F: FnOnce(Option<&PathBuf>) -> Result<CommandOutput<()>, GffError>,
    {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.gff3");
        let output = command(Some(&path)).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        (text.lines().map(String::from).collect(), output.report)
    }

    fn example() -> PathBuf {
        PathBuf::from("tests_data/example.gff3")
    }

    #[test]
    fn test_lift() {
        let anchors = PathBuf::from("tests_data/anchors.tsv");
        let (lines, report) = run_to_string(|out| gffkit_lift(&example(), &anchors, out));
        assert_eq!(lines.len(), 15);
        assert_eq!(
            lines[0],
            "chrA\tmaker\tgene\t11000\t12600\t.\t+\t.\tID=geneA;Name=dnaK"
        );
        // reverse anchor: strand flipped, interval reflected
        assert_eq!(
            lines[8],
            "chrC\tmaker\tgene\t22101\t23001\t.\t+\t.\tID=geneB"
        );
        // no anchors on ctg3
        assert!(lines[12].starts_with("ctg3\tmaker\tgene\t100\t400\t"));
        assert_eq!(report.entries().len(), 1);
    }

    #[test]
    fn test_rename() {
        let options = RenameOptions::default();
        let (lines, report) = run_to_string(|out| {
            gffkit_rename(&example(), &options, LinkagePolicy::Permissive, out)
        });
        assert!(report.is_empty());
        assert_eq!(
            lines[0],
            "ctg1\tmaker\tgene\t1000\t2600\t.\t+\t.\tID=CgT1g000010;Name=CgT1g000010"
        );
        assert!(lines[1].ends_with("ID=CgT1g000010.1;Parent=CgT1g000010;Name=CgT1g000010.1"));
        // geneB has two CDS and no exons, so exons are synthesized
        let gene_b: Vec<&String> = lines.iter().filter(|l| l.starts_with("ctg2")).collect();
        assert_eq!(gene_b.len(), 6);
        assert!(gene_b[0].ends_with("ID=CgT2g000010;Name=CgT2g000010"));
        assert!(gene_b[2].contains("\texon\t3500\t3900\t"));
        // geneC has a single CDS: no exon
        let gene_c: Vec<&String> = lines.iter().filter(|l| l.starts_with("ctg3")).collect();
        assert_eq!(gene_c.len(), 3);
        assert!(gene_c[0].ends_with("ID=CgT3g000010;locus_tag=GC01;Name=CgT3g000010"));
    }

    #[test]
    fn test_rename_custom_synthesis() {
        let options = RenameOptions {
            policy: NamingPolicy::Format("gene%d_%03d".parse().unwrap()),
            exon_synthesis: ExonSynthesis::new(1),
            ..Default::default()
        };
        let (lines, _) = run_to_string(|out| {
            gffkit_rename(&example(), &options, LinkagePolicy::Strict, out)
        });
        let gene_c: Vec<&String> = lines.iter().filter(|l| l.starts_with("ctg3")).collect();
        assert_eq!(gene_c.len(), 4);
        assert!(gene_c[2].ends_with("ID=gene3_001.1.exon1;Parent=gene3_001.1"));
    }

    #[test]
    fn test_filter() {
        let (lines, report) =
            run_to_string(|out| gffkit_filter(&example(), &FilterParams::default(), out));
        assert_eq!(lines.len(), 8);
        assert!(lines.iter().all(|l| l.starts_with("ctg1")));
        assert_eq!(report.entries(), &["2 gene models failed the structural filter".to_string()]);
    }

    #[test]
    fn test_filter_discards_lone_gene_line() {
        let gene_a: Vec<String> = fs::read_to_string(example())
            .unwrap()
            .lines()
            .filter(|l| l.starts_with("ctg1"))
            .map(String::from)
            .collect();
        let input = format!(
            "ctg0\tmaker\tgene\t10\t90\t.\t+\t.\tID=lone;loose note\n{}\n",
            gene_a.join("\n")
        );
        let file = temp_file_with(&input);
        let gff = file.path().to_path_buf();

        let (lines, report) =
            run_to_string(|out| gffkit_filter(&gff, &FilterParams::default(), out));
        assert_eq!(lines, gene_a);
        assert_eq!(
            report.entries(),
            &[
                "1 malformed attribute segments were dropped".to_string(),
                "1 groups with at most one line were discarded".to_string(),
            ]
        );
    }

    #[test]
    fn test_sort() {
        let options = SortOptions {
            locus_tag: Some("EX".to_string()),
            ..Default::default()
        };
        let (lines, report) = run_to_string(|out| gffkit_sort(&example(), &options, out));
        assert!(report.is_empty());
        assert_eq!(lines[0], GFF3_HEADER);
        assert!(lines[1].ends_with("\tID=EX_00001;Name=EX_00001"));
        // every CDS gets an exon with the default threshold
        let exons = lines.iter().filter(|l| l.contains("\texon\t")).count();
        let cds = lines.iter().filter(|l| l.contains("\tCDS\t")).count();
        assert_eq!(exons, cds);
        assert_eq!(cds, 6);
        // geneB's CDS come out left to right
        let gene_b_cds: Vec<&String> = lines
            .iter()
            .filter(|l| l.starts_with("ctg2") && l.contains("\tCDS\t"))
            .collect();
        assert!(gene_b_cds[0].contains("\t3000\t3300\t"));
        assert!(gene_b_cds[0].contains("ID=EX_00002.mrna1.CDS1;"));
    }
}
