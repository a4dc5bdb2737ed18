//! Indexed FASTA reference provider
//!
//! Uses the samtools `.fai` index when present and builds the same index by
//! scanning the file otherwise. Gzip-compressed FASTA is not supported.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::CsqError;
use crate::reference::provider::ReferenceProvider;

/// Index entry for a sequence in a FASTA file
#[derive(Debug, Clone, PartialEq, Eq)]
struct FastaIndexEntry {
    name: String,
    length: u64,
    /// Byte offset of the first base
    offset: u64,
    line_bases: u64,
    /// Bytes per line including the newline
    line_bytes: u64,
}

/// FASTA-based reference sequence provider
///
/// Keeps one open file handle, so a provider must not be shared between
/// threads. Open one per worker instead.
pub struct FastaProvider {
    path: PathBuf,
    index: HashMap<String, FastaIndexEntry>,
    handle: RefCell<Option<File>>,
}

impl FastaProvider {
    /// Open a FASTA file, reading `<path>.fai` or indexing the file on the fly
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, CsqError> {
        let path = path.as_ref().to_path_buf();

        if is_gzip_file(&path)? {
            return Err(CsqError::Io {
                msg: format!(
                    "{} is gzip-compressed; decompress it first",
                    path.display()
                ),
            });
        }

        let fai_path = PathBuf::from(format!("{}.fai", path.display()));
        let index = if fai_path.exists() {
            load_fai_index(&fai_path)?
        } else {
            warn!(
                "No index found for {}, scanning the file to build one",
                path.display()
            );
            build_fasta_index(&path)?
        };
        debug!("Indexed {} sequences in {}", index.len(), path.display());

        Ok(Self {
            path,
            index,
            handle: RefCell::new(None),
        })
    }

    /// Look up an index entry, accepting names with or without a `chr` prefix
    fn entry(&self, name: &str) -> Option<&FastaIndexEntry> {
        self.index.get(name).or_else(|| match name.strip_prefix("chr") {
            Some(bare) => self.index.get(bare),
            None => self.index.get(&format!("chr{}", name)),
        })
    }

    /// Whether the FASTA contains a sequence
    pub fn has_sequence(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// All sequence names in the index
    pub fn sequence_names(&self) -> impl Iterator<Item = &String> {
        self.index.keys()
    }

    fn read_region(&self, file_offset: u64, bytes: u64) -> Result<Vec<u8>, CsqError> {
        let mut handle = self.handle.borrow_mut();
        if handle.is_none() {
            *handle = Some(File::open(&self.path)?);
        }
        let file = handle.as_mut().ok_or_else(|| CsqError::Io {
            msg: format!("failed to open {}", self.path.display()),
        })?;
        file.seek(SeekFrom::Start(file_offset))?;
        let mut buffer = Vec::with_capacity(bytes as usize);
        file.take(bytes).read_to_end(&mut buffer)?;
        Ok(buffer)
    }
}

impl ReferenceProvider for FastaProvider {
    fn sequence(&self, chrom: &str, start: u64, length: u64) -> Result<String, CsqError> {
        let not_found = || CsqError::SequenceNotFound {
            chrom: chrom.to_string(),
            start,
            end: start + length.saturating_sub(1),
        };
        let entry = self.entry(chrom).ok_or_else(not_found)?;
        if start == 0 || start > entry.length {
            return Err(not_found());
        }
        if length == 0 {
            return Ok(String::new());
        }

        let begin = start - 1;
        let end = (begin + length).min(entry.length);
        let seq_len = end - begin;

        let line = begin / entry.line_bases;
        let column = begin % entry.line_bases;
        let file_offset = entry.offset + line * entry.line_bytes + column;
        let lines = (seq_len + column).div_ceil(entry.line_bases);
        let to_read = seq_len + lines * (entry.line_bytes - entry.line_bases);

        let buffer = self.read_region(file_offset, to_read)?;
        let sequence: String = buffer
            .iter()
            .filter(|&&b| b != b'\n' && b != b'\r')
            .take(seq_len as usize)
            .map(|&b| b.to_ascii_uppercase() as char)
            .collect();
        Ok(sequence)
    }

    fn contig_length(&self, chrom: &str) -> Option<u64> {
        self.entry(chrom).map(|e| e.length)
    }
}

/// Load a FASTA index (.fai) file
fn load_fai_index(path: &Path) -> Result<HashMap<String, FastaIndexEntry>, CsqError> {
    let reader = BufReader::new(File::open(path)?);
    let mut index = HashMap::new();

    for line in reader.lines() {
        let line = line?;
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 5 {
            continue;
        }
        let name = fields[0].to_string();
        let number = |i: usize, what: &str| -> Result<u64, CsqError> {
            fields[i].parse().map_err(|_| CsqError::Io {
                msg: format!("Invalid {} '{}' in FAI for sequence '{}'", what, fields[i], name),
            })
        };
        let entry = FastaIndexEntry {
            length: number(1, "length")?,
            offset: number(2, "offset")?,
            line_bases: number(3, "line_bases")?,
            line_bytes: number(4, "line_bytes")?,
            name: name.clone(),
        };
        if entry.line_bases == 0 || entry.line_bytes < entry.line_bases {
            return Err(CsqError::Io {
                msg: format!(
                    "Invalid FAI entry for '{}': line_bases={}, line_bytes={}",
                    name, entry.line_bases, entry.line_bytes
                ),
            });
        }
        index.insert(name, entry);
    }

    Ok(index)
}

/// Build a FASTA index by scanning the file
fn build_fasta_index(path: &Path) -> Result<HashMap<String, FastaIndexEntry>, CsqError> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut index = HashMap::new();
    let mut current: Option<FastaIndexEntry> = None;
    let mut position = 0u64;
    let mut first_line = true;
    let mut line = String::new();

    loop {
        let line_start = position;
        line.clear();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            break;
        }
        position += read as u64;

        if let Some(header) = line.strip_prefix('>') {
            if let Some(entry) = current.take() {
                index.insert(entry.name.clone(), entry);
            }
            let name = header.split_whitespace().next().unwrap_or("").to_string();
            current = Some(FastaIndexEntry {
                name,
                length: 0,
                offset: position,
                line_bases: 0,
                line_bytes: 0,
            });
            first_line = true;
        } else if let Some(entry) = current.as_mut() {
            let bases = line.trim_end().len() as u64;
            entry.length += bases;
            if first_line && bases > 0 {
                entry.offset = line_start;
                entry.line_bases = bases;
                entry.line_bytes = read as u64;
                first_line = false;
            }
        }
    }
    if let Some(entry) = current {
        index.insert(entry.name.clone(), entry);
    }

    Ok(index)
}

/// Check for the gzip magic bytes
fn is_gzip_file(path: &Path) -> Result<bool, CsqError> {
    let mut file = File::open(path)?;
    let mut magic = [0u8; 2];
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(magic == [0x1f, 0x8b]),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e.into()),
    }
}
