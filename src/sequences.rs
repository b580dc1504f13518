use std::{
    fs::File,
    io::{BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use log::{debug, info};
use noodles::fasta::{self as fasta, record::Definition, record::Sequence};
use tempfile::NamedTempFile;

use crate::{
    error::{DbError, Result},
    merge::CentroidIndex,
    naming::CentroidToGroupName,
};

pub const FASTA_FILE: &str = "ariba_db.fa";
pub const META_FILE: &str = "ariba_meta.tsv";

// Columns of gene_data.csv.
const CENTROID_FIELD: usize = 2;
const NAME_FIELD: usize = 3;
const SEQUENCE_FIELD: usize = 5;
const MIN_FIELDS: usize = 6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitStats {
    pub rows: u64,
    pub emitted: u64,
    pub skipped: u64,
}

// The Sequences struct writes the ARIBA database. Both outputs go to
// temporary files in the output directory and only replace the real files
// once `finish` is called, so a failed run leaves earlier outputs alone.
pub struct Sequences {
    out_dir: PathBuf,
    fasta_file: NamedTempFile,
    meta_file: NamedTempFile,
    fasta: BufWriter<File>,
    meta: csv::Writer<File>,
    stats: EmitStats,
}

impl Sequences {
    pub fn new(out_dir: &Path) -> Result<Self> {
        let fasta_file = Self::temp_in(out_dir)?;
        let meta_file = Self::temp_in(out_dir)?;
        let fasta = BufWriter::new(fasta_file.as_file().try_clone()?);
        let meta = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(csv::QuoteStyle::Never)
            .has_headers(false)
            .from_writer(meta_file.as_file().try_clone()?);
        Ok(Self {
            out_dir: out_dir.to_path_buf(),
            fasta_file,
            meta_file,
            fasta,
            meta,
            stats: EmitStats::default(),
        })
    }

    // Stream the gene table and write every row whose centroid was grouped.
    // Fields are split on every comma; there is no quoting and no header.
    pub fn extract<R: Read>(
        &mut self,
        gene_data: R,
        names: &CentroidToGroupName,
        index: &CentroidIndex,
    ) -> Result<()> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(gene_data);
        let mut row = csv::StringRecord::new();
        while reader.read_record(&mut row)? {
            self.stats.rows += 1;
            if row.len() < MIN_FIELDS {
                return Err(DbError::Format {
                    line: row.position().map_or(self.stats.rows, |p| p.line()),
                    expected: MIN_FIELDS,
                    found: row.len(),
                });
            }
            let centroid = &row[CENTROID_FIELD];
            let group_name = match names.get(centroid) {
                Some(name) => name,
                None => {
                    self.stats.skipped += 1;
                    continue;
                }
            };
            let seqname = format!("{};{}", &row[NAME_FIELD], centroid);
            let descriptions: Vec<&str> = index
                .descriptions_of(centroid)
                .map(String::as_str)
                .collect();
            // Trailing whitespace of the line is not part of the last field.
            let sequence = match row.len() - 1 {
                SEQUENCE_FIELD => row[SEQUENCE_FIELD].trim_end(),
                _ => &row[SEQUENCE_FIELD],
            };
            self.write(&seqname, sequence, group_name, &descriptions.join(";"))?;
        }
        debug!(
            "Read {} gene rows, {} not in any group",
            self.stats.rows, self.stats.skipped
        );
        Ok(())
    }

    // One FASTA record on two lines, and the matching metadata row.
    fn write(
        &mut self,
        seqname: &str,
        sequence: &str,
        group_name: &str,
        descriptions: &str,
    ) -> Result<()> {
        let definition = Definition::new(seqname.to_string(), None);
        let record = fasta::Record::new(definition, Sequence::from(sequence.as_bytes().to_vec()));
        {
            let mut writer = fasta::writer::Builder::default()
                .set_line_base_count(usize::MAX)
                .build_with_writer(&mut self.fasta);
            writer.write_record(&record)?;
        }
        if sequence.is_empty() {
            // noodles writes no sequence line at all for an empty record.
            self.fasta.write_all(b"\n")?;
        }
        self.meta
            .write_record([seqname, "1", "0", ".", group_name, descriptions])?;
        self.stats.emitted += 1;
        Ok(())
    }

    // Flush both outputs and move them into place.
    pub fn finish(mut self) -> Result<EmitStats> {
        self.fasta.flush()?;
        self.meta.flush()?;
        drop(self.fasta);
        drop(self.meta);
        let fasta_path = self.out_dir.join(FASTA_FILE);
        let meta_path = self.out_dir.join(META_FILE);
        self.fasta_file.persist(&fasta_path).map_err(|e| e.error)?;
        self.meta_file.persist(&meta_path).map_err(|e| e.error)?;
        info!(
            "Wrote {} records to {} and {}",
            self.stats.emitted,
            fasta_path.display(),
            meta_path.display()
        );
        Ok(self.stats)
    }

    fn temp_in(out_dir: &Path) -> Result<NamedTempFile> {
        Ok(tempfile::Builder::new()
            .prefix(".ariba_db")
            .tempfile_in(out_dir)?)
    }
}

/// Write `ariba_db.fa` and `ariba_meta.tsv` for the grouped centroids of
/// `gene_data` into `out_dir`.
pub fn emit(
    gene_data: &Path,
    out_dir: &Path,
    names: &CentroidToGroupName,
    index: &CentroidIndex,
) -> Result<EmitStats> {
    let mut sequences = Sequences::new(out_dir)?;
    sequences.extract(File::open(gene_data)?, names, index)?;
    sequences.finish()
}
