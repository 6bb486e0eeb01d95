//! End-to-end read/convert/write tests across the stream and writer façades

use std::path::PathBuf;
use tempfile::TempDir;
use uniseq::{FormatId, OpenOptions, DbRegistry, SequenceStream, SequenceWriter, WriteConfig};

fn convert(
    dir: &TempDir,
    input: &str,
    in_usa_prefix: Option<&str>,
    out_format: FormatId,
) -> PathBuf {
    let in_path = dir.path().join("in.seq");
    std::fs::write(&in_path, input).unwrap();
    let usa = match in_usa_prefix {
        Some(prefix) => format!("{}::{}", prefix, in_path.display()),
        None => in_path.display().to_string(),
    };

    let out_path = dir.path().join("out.seq");
    let mut stream = SequenceStream::open(&usa).unwrap();
    let mut writer = SequenceWriter::to_path(&out_path, out_format).unwrap();
    while let Some(record) = stream.next_record().unwrap() {
        writer.write(&record).unwrap();
    }
    writer.finish().unwrap();
    out_path
}

#[test]
fn test_fasta_to_embl_and_back() {
    let dir = TempDir::new().unwrap();
    let embl_path = convert(&dir, ">seq1 demo entry\nGATTACAGATTACA\n", None, FormatId::Embl);

    let mut stream = SequenceStream::open(embl_path.to_str().unwrap()).unwrap();
    let record = stream.next_record().unwrap().unwrap();
    assert_eq!(record.format, Some(FormatId::Embl));
    assert_eq!(record.name, "seq1");
    assert_eq!(record.description, "demo entry");
    assert_eq!(
        record.sequence.to_ascii_uppercase(),
        b"GATTACAGATTACA"
    );
}

#[test]
fn test_fasta_to_genbank_and_back() {
    let dir = TempDir::new().unwrap();
    let gb_path = convert(&dir, ">seq1 demo entry\nGATTACAGATTACA\n", None, FormatId::Genbank);

    let mut stream = SequenceStream::open(gb_path.to_str().unwrap()).unwrap();
    let record = stream.next_record().unwrap().unwrap();
    assert_eq!(record.format, Some(FormatId::Genbank));
    assert_eq!(record.name, "seq1");
    assert_eq!(
        record.sequence.to_ascii_uppercase(),
        b"GATTACAGATTACA"
    );
}

#[test]
fn test_multi_record_fasta_to_phylip() {
    let dir = TempDir::new().unwrap();
    let phy_path = convert(
        &dir,
        ">human\nACGTACGT\n>chimp\nACGTACGA\n>mouse\nACTTACGA\n",
        None,
        FormatId::Phylip,
    );

    let mut stream = SequenceStream::open(phy_path.to_str().unwrap()).unwrap();
    let records = stream.read_all().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].format, Some(FormatId::Phylip));
    assert_eq!(records[0].name, "human");
    assert_eq!(records[2].name, "mouse");
    assert_eq!(records[2].sequence, b"ACTTACGA");
}

#[test]
fn test_text_to_fasta() {
    let dir = TempDir::new().unwrap();
    // Numbered, whitespace-laden plain text still reduces to residues
    let fa_path = convert(&dir, "  1 ACGT ACGT\n  9 ACGT\n", Some("text"), FormatId::Fasta);

    let mut stream = SequenceStream::open(fa_path.to_str().unwrap()).unwrap();
    let record = stream.next_record().unwrap().unwrap();
    assert_eq!(record.sequence, b"ACGTACGTACGT");
}

#[test]
fn test_range_applied_before_write() {
    let dir = TempDir::new().unwrap();
    let in_path = dir.path().join("in.fa");
    std::fs::write(&in_path, ">s\nAAAACCCCGGGGTTTT\n").unwrap();
    let out_path = dir.path().join("out.fa");

    let usa = format!("{}[5:8]", in_path.display());
    let mut stream = SequenceStream::open(&usa).unwrap();
    let mut writer = SequenceWriter::to_path(&out_path, FormatId::Fasta).unwrap();
    while let Some(record) = stream.next_record().unwrap() {
        writer.write(&record).unwrap();
    }
    writer.finish().unwrap();

    let written = std::fs::read_to_string(&out_path).unwrap();
    assert_eq!(written, ">s\nCCCC\n");
}

#[test]
fn test_line_width_config() {
    let dir = TempDir::new().unwrap();
    let out_path = dir.path().join("out.fa");
    let mut writer = SequenceWriter::to_path_with(
        &out_path,
        FormatId::Fasta,
        WriteConfig {
            line_width: 4,
            ..WriteConfig::default()
        },
    )
    .unwrap();
    writer
        .write(&uniseq::SeqRecord::new("s", b"ACGTACGTAC".to_vec()))
        .unwrap();
    writer.finish().unwrap();

    let written = std::fs::read_to_string(&out_path).unwrap();
    assert_eq!(written, ">s\nACGT\nACGT\nAC\n");
}

#[test]
fn test_gzip_in_and_out() {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let dir = TempDir::new().unwrap();
    let in_path = dir.path().join("in.fa.gz");
    let file = std::fs::File::create(&in_path).unwrap();
    let mut gz = GzEncoder::new(file, Compression::default());
    gz.write_all(b">zipped\nACGTACGT\n").unwrap();
    gz.finish().unwrap();

    let mut stream = SequenceStream::open(in_path.to_str().unwrap()).unwrap();
    let record = stream.next_record().unwrap().unwrap();
    assert_eq!(record.name, "zipped");
    assert_eq!(record.sequence, b"ACGTACGT");
}

#[test]
fn test_stream_is_an_iterator() {
    let dir = TempDir::new().unwrap();
    let in_path = dir.path().join("in.fa");
    std::fs::write(&in_path, ">a\nAC\n>b\nGT\n").unwrap();

    let stream = SequenceStream::open_with(
        in_path.to_str().unwrap(),
        &DbRegistry::new(),
        OpenOptions::default(),
    )
    .unwrap();
    let names: Vec<String> = stream.map(|r| r.unwrap().name).collect();
    assert_eq!(names, ["a", "b"]);
}
