//! Protein change synthesis
//!
//! Works on the spliced coding sequence in transcript orientation. The
//! reference and mutated sequences are translated from the start codon and
//! compared; the result is an HGVS `p.` description plus the protein-level
//! consequence tags.
//!
//! # Coordinate System
//!
//! | Value | Basis | Notes |
//! |-------|-------|-------|
//! | `CodingEdit.start` | 0-based | Index into the coding sequence |
//! | codon / residue index | 0-based | `k`, `p`, `j` below |
//! | rendered residue number | 1-based | `index + 1` |

use crate::effect::Consequence;
use crate::error::CsqError;
use crate::reference::{ReferenceProvider, Strand, Transcript};
use crate::sequence::{reverse_complement, three_letter_string, AminoAcid, CodonTable};

/// Genomic bases appended after the stop codon when no 3' UTR is modeled
pub const FLANK_WITHOUT_UTR3: u64 = 30;

/// Coding sequence with the 3' UTR (or flank) appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodingSequence {
    /// Coding bases followed by the 3' tail, transcript orientation
    pub bases: Vec<u8>,
    /// Number of coding bases, stop codon included
    pub coding_len: usize,
}

impl CodingSequence {
    /// Extract the coding sequence of a transcript from the reference
    pub fn fetch<P: ReferenceProvider + ?Sized>(
        transcript: &Transcript,
        provider: &P,
    ) -> Result<Self, CsqError> {
        let chrom = transcript.chromosome();
        let spliced = |regions: &[crate::reference::Interval]| -> Result<String, CsqError> {
            let mut seq = String::new();
            for region in regions {
                seq.push_str(&provider.sequence_exact(chrom, region.start, region.len())?);
            }
            Ok(match transcript.strand() {
                Strand::Plus => seq,
                Strand::Minus => reverse_complement(&seq),
            })
        };

        let coding = spliced(transcript.coding_regions())?;
        let tail = if !transcript.utr3_regions().is_empty() {
            spliced(transcript.utr3_regions())?
        } else {
            flank_after_stop(transcript, provider)?
        };

        let coding_len = coding.len();
        let mut bases = coding.into_bytes();
        bases.extend(tail.bytes());
        bases.make_ascii_uppercase();
        Ok(Self { bases, coding_len })
    }
}

fn flank_after_stop<P: ReferenceProvider + ?Sized>(
    transcript: &Transcript,
    provider: &P,
) -> Result<String, CsqError> {
    let Some(end) = transcript.coding_end() else {
        return Ok(String::new());
    };
    let chrom = transcript.chromosome();
    let fetched = match transcript.strand() {
        Strand::Plus => provider.sequence(chrom, end + 1, FLANK_WITHOUT_UTR3),
        Strand::Minus => {
            let start = end.saturating_sub(FLANK_WITHOUT_UTR3).max(1);
            if start >= end {
                return Ok(String::new());
            }
            provider
                .sequence(chrom, start, end - start)
                .map(|s| reverse_complement(&s))
        }
    };
    match fetched {
        Ok(seq) => Ok(seq),
        Err(CsqError::SequenceNotFound { .. }) => Ok(String::new()),
        Err(e) => Err(e),
    }
}

/// A change to the coding sequence in transcript orientation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodingEdit {
    /// First deleted base; for pure insertions the base the insertion precedes
    pub start: usize,
    /// Number of deleted bases
    pub deleted: usize,
    /// Inserted bases
    pub inserted: Vec<u8>,
}

impl CodingEdit {
    fn apply(&self, seq: &[u8]) -> Vec<u8> {
        let mut mutated = Vec::with_capacity(seq.len() + self.inserted.len());
        mutated.extend_from_slice(&seq[..self.start]);
        mutated.extend_from_slice(&self.inserted);
        mutated.extend_from_slice(&seq[self.start + self.deleted..]);
        mutated
    }

    fn net_change(&self) -> i64 {
        self.inserted.len() as i64 - self.deleted as i64
    }

    /// Whether the edit reaches into a trailing partial codon
    fn touches_incomplete_codon(&self, coding_len: usize) -> bool {
        let complete = coding_len - coding_len % 3;
        if complete == coding_len {
            return false;
        }
        let last = if self.deleted == 0 {
            self.start
        } else {
            self.start + self.deleted - 1
        };
        last >= complete
    }
}

/// The `p.` description and protein-level tags of a coding change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProteinChange {
    pub hgvs_p: String,
    pub consequences: Vec<Consequence>,
}

impl ProteinChange {
    fn new(hgvs_p: String, consequences: Vec<Consequence>) -> Self {
        Self {
            hgvs_p,
            consequences,
        }
    }

    /// `p.?` with the given tags
    pub fn unknown(consequences: Vec<Consequence>) -> Self {
        Self::new("p.?".to_string(), consequences)
    }
}

/// Derive the protein change of a coding edit
pub fn protein_change(
    cds: &CodingSequence,
    edit: &CodingEdit,
    table: &CodonTable,
) -> Result<ProteinChange, CsqError> {
    if edit.start + edit.deleted > cds.bases.len() {
        return Err(CsqError::coordinates(format!(
            "coding edit at {} exceeds the coding sequence",
            edit.start + 1
        )));
    }
    if edit.touches_incomplete_codon(cds.coding_len) {
        return Ok(ProteinChange::unknown(vec![
            Consequence::IncompleteTerminalCodonVariant,
        ]));
    }

    let mutated = edit.apply(&cds.bases);
    let codon = edit.start / 3;
    if edit.deleted == 1 && edit.inserted.len() == 1 {
        return substitution(&cds.bases, &mutated, codon, table);
    }

    let ref_prot = table.translate(&cds.bases, true)?;
    let mut_prot = table.translate(&mutated, true)?;
    let net = edit.net_change();

    if codon == 0 && start_lost(&ref_prot, &mut_prot) {
        let mut tags = vec![Consequence::StartLost, Consequence::ProteinAlteringVariant];
        tags.extend(length_tag(net));
        return Ok(ProteinChange::new("p.Met1?".to_string(), tags));
    }

    if net % 3 != 0 {
        frameshift(&mutated, &ref_prot, &mut_prot, codon, table)
    } else {
        in_frame(&ref_prot, &mut_prot, codon, net)
    }
}

fn start_lost(ref_prot: &[AminoAcid], mut_prot: &[AminoAcid]) -> bool {
    ref_prot.first() == Some(&AminoAcid::Met) && mut_prot.first() != Some(&AminoAcid::Met)
}

fn length_tag(net: i64) -> Option<Consequence> {
    match net {
        n if n % 3 != 0 => Some(Consequence::FrameshiftVariant),
        n if n > 0 => Some(Consequence::InframeInsertion),
        n if n < 0 => Some(Consequence::InframeDeletion),
        _ => None,
    }
}

/// Notation for an unchanged residue at 0-based `index`
fn same_residue(aa: AminoAcid, index: usize) -> ProteinChange {
    match aa {
        AminoAcid::Ter => ProteinChange::new(
            format!("p.Ter{}=", index + 1),
            vec![Consequence::StopRetainedVariant],
        ),
        AminoAcid::Met if index == 0 => ProteinChange::new(
            "p.Met1=".to_string(),
            vec![Consequence::StartRetainedVariant],
        ),
        aa => ProteinChange::new(
            format!("p.{}{}=", aa, index + 1),
            vec![Consequence::SynonymousVariant],
        ),
    }
}

/// Notation for an edit at residue `index` that leaves the protein intact
///
/// An edit just past the stop codon keeps the stop.
fn unchanged(ref_prot: &[AminoAcid], index: usize) -> ProteinChange {
    match ref_prot.get(index) {
        Some(&aa) => same_residue(aa, index),
        None if index == ref_prot.len() && ref_prot.last() == Some(&AminoAcid::Ter) => {
            same_residue(AminoAcid::Ter, index - 1)
        }
        None => ProteinChange::unknown(Vec::new()),
    }
}

/// Extension notation for a lost stop codon at residue `index`
fn extension(
    mutated: &[u8],
    new_residue: AminoAcid,
    index: usize,
    table: &CodonTable,
) -> Result<String, CsqError> {
    let next_stop = table.find_stop(mutated, index + 1)?;
    Ok(match next_stop {
        Some(stop) => format!("p.Ter{}{}extTer{}", index + 1, new_residue, stop - index),
        None => format!("p.Ter{}{}extTer?", index + 1, new_residue),
    })
}

fn substitution(
    reference: &[u8],
    mutated: &[u8],
    k: usize,
    table: &CodonTable,
) -> Result<ProteinChange, CsqError> {
    let ref_aa = table.translate_codon(&reference[3 * k..3 * k + 3])?;
    let alt_aa = table.translate_codon(&mutated[3 * k..3 * k + 3])?;
    let n = k + 1;

    let change = match (ref_aa, alt_aa) {
        (r, a) if r == a => same_residue(r, k),
        (AminoAcid::Met, _) if k == 0 => ProteinChange::new(
            "p.Met1?".to_string(),
            vec![Consequence::StartLost, Consequence::ProteinAlteringVariant],
        ),
        (r, AminoAcid::Ter) => ProteinChange::new(
            format!("p.{}{}Ter", r, n),
            vec![Consequence::StopGained, Consequence::ProteinAlteringVariant],
        ),
        (AminoAcid::Ter, a) => ProteinChange::new(
            extension(mutated, a, k, table)?,
            vec![Consequence::StopLost, Consequence::ProteinAlteringVariant],
        ),
        (r, a) => ProteinChange::new(
            format!("p.{}{}{}", r, n, a),
            vec![Consequence::MissenseVariant, Consequence::ProteinAlteringVariant],
        ),
    };
    Ok(change)
}

fn frameshift(
    mutated: &[u8],
    ref_prot: &[AminoAcid],
    mut_prot: &[AminoAcid],
    k: usize,
    table: &CodonTable,
) -> Result<ProteinChange, CsqError> {
    let limit = ref_prot.len().max(mut_prot.len());
    let Some(j) = (k..limit).find(|&i| ref_prot.get(i) != mut_prot.get(i)) else {
        return Ok(unchanged(ref_prot, k));
    };

    let altering = |first: Consequence| {
        vec![
            first,
            Consequence::FrameshiftVariant,
            Consequence::ProteinAlteringVariant,
        ]
    };
    let change = match (ref_prot.get(j), mut_prot.get(j)) {
        (Some(AminoAcid::Ter), Some(&new)) => ProteinChange::new(
            extension(mutated, new, j, table)?,
            altering(Consequence::StopLost),
        ),
        (Some(old), Some(AminoAcid::Ter)) => ProteinChange::new(
            format!("p.{}{}Ter", old, j + 1),
            altering(Consequence::StopGained),
        ),
        (Some(old), Some(new)) => {
            let stop = match mut_prot.last() {
                Some(AminoAcid::Ter) => (mut_prot.len() - j).to_string(),
                _ => "?".to_string(),
            };
            ProteinChange::new(
                format!("p.{}{}{}fsTer{}", old, j + 1, new, stop),
                vec![
                    Consequence::FrameshiftVariant,
                    Consequence::ProteinAlteringVariant,
                ],
            )
        }
        _ => ProteinChange::unknown(vec![Consequence::FrameshiftVariant]),
    };
    Ok(change)
}

fn in_frame(
    ref_prot: &[AminoAcid],
    mut_prot: &[AminoAcid],
    k: usize,
    net: i64,
) -> Result<ProteinChange, CsqError> {
    // Greedy prefix first places the change at its most C-terminal position.
    let p = ref_prot
        .iter()
        .zip(mut_prot)
        .take_while(|(a, b)| a == b)
        .count();
    if p == ref_prot.len() && p == mut_prot.len() {
        return Ok(unchanged(ref_prot, k));
    }

    let tagged = |first: Consequence| {
        let mut tags = vec![first];
        tags.extend(length_tag(net).filter(|tag| *tag != first));
        if first != Consequence::ProteinAlteringVariant {
            tags.push(Consequence::ProteinAlteringVariant);
        }
        tags
    };

    let ref_stop = match ref_prot.last() {
        Some(AminoAcid::Ter) => Some(ref_prot.len() - 1),
        _ => None,
    };
    let mut_stop = match mut_prot.last() {
        Some(AminoAcid::Ter) => Some(mut_prot.len() - 1),
        _ => None,
    };
    let shift = net / 3;

    if let Some(s) = ref_stop {
        let expected = s as i64 + shift;
        match mut_stop {
            Some(t) if (t as i64) < expected => {
                let old = ref_prot.get(p).copied().unwrap_or(AminoAcid::Ter);
                let hgvs_p = if mut_prot.get(p) == Some(&AminoAcid::Ter) {
                    format!("p.{}{}Ter", old, p + 1)
                } else {
                    format!(
                        "p.{}{}delins{}",
                        old,
                        p + 1,
                        three_letter_string(&mut_prot[p..=t])
                    )
                };
                return Ok(ProteinChange::new(hgvs_p, tagged(Consequence::StopGained)));
            }
            Some(t) if (t as i64) == expected => {}
            _ => {
                let hgvs_p = match (p == s, mut_prot.get(s), mut_stop) {
                    (true, Some(&new), Some(t)) => {
                        format!("p.Ter{}{}extTer{}", s + 1, new, t - s)
                    }
                    (true, Some(&new), None) => format!("p.Ter{}{}extTer?", s + 1, new),
                    (false, _, Some(t)) if p < s => format!(
                        "p.{}{}_Ter{}delins{}",
                        ref_prot[p],
                        p + 1,
                        s + 1,
                        three_letter_string(&mut_prot[p..=t])
                    ),
                    _ => "p.?".to_string(),
                };
                return Ok(ProteinChange::new(hgvs_p, tagged(Consequence::StopLost)));
            }
        }
    }

    let rest_ref = &ref_prot[p..];
    let rest_mut = &mut_prot[p..];
    let q = rest_ref
        .iter()
        .rev()
        .zip(rest_mut.iter().rev())
        .take_while(|(a, b)| a == b)
        .count()
        .min(rest_ref.len())
        .min(rest_mut.len());
    let deleted = &rest_ref[..rest_ref.len() - q];
    let inserted = &rest_mut[..rest_mut.len() - q];

    let change = match (deleted.len(), inserted.len()) {
        (0, n) => {
            if p >= n && &ref_prot[p - n..p] == inserted {
                let hgvs_p = if n == 1 {
                    format!("p.{}{}dup", ref_prot[p - 1], p)
                } else {
                    format!("p.{}{}_{}{}dup", ref_prot[p - n], p - n + 1, ref_prot[p - 1], p)
                };
                ProteinChange::new(hgvs_p, tagged(Consequence::InframeInsertion))
            } else {
                match (p.checked_sub(1).and_then(|i| ref_prot.get(i)), ref_prot.get(p)) {
                    (Some(before), Some(after)) => ProteinChange::new(
                        format!(
                            "p.{}{}_{}{}ins{}",
                            before,
                            p,
                            after,
                            p + 1,
                            three_letter_string(inserted)
                        ),
                        tagged(Consequence::InframeInsertion),
                    ),
                    _ => ProteinChange::unknown(tagged(Consequence::InframeInsertion)),
                }
            }
        }
        (m, 0) => {
            let hgvs_p = if m == 1 {
                format!("p.{}{}del", deleted[0], p + 1)
            } else {
                format!("p.{}{}_{}{}del", deleted[0], p + 1, deleted[m - 1], p + m)
            };
            ProteinChange::new(hgvs_p, tagged(Consequence::InframeDeletion))
        }
        (1, 1) => ProteinChange::new(
            format!("p.{}{}{}", deleted[0], p + 1, inserted[0]),
            tagged(Consequence::MissenseVariant),
        ),
        (m, _) => {
            let range = if m == 1 {
                format!("{}{}", deleted[0], p + 1)
            } else {
                format!("{}{}_{}{}", deleted[0], p + 1, deleted[m - 1], p + m)
            };
            let first = if net == 0 {
                Consequence::MissenseVariant
            } else {
                Consequence::ProteinAlteringVariant
            };
            ProteinChange::new(
                format!("p.{}delins{}", range, three_letter_string(inserted)),
                tagged(first),
            )
        }
    };
    Ok(change)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Met Ala Gly Lys Lys Ter + tail
    const CDS: &str = "ATGGCCGGCAAGAAGTAAGCATTTTGAGG";

    fn cds() -> CodingSequence {
        CodingSequence {
            bases: CDS.as_bytes().to_vec(),
            coding_len: 18,
        }
    }

    fn change(start: usize, deleted: usize, inserted: &str) -> ProteinChange {
        let edit = CodingEdit {
            start,
            deleted,
            inserted: inserted.as_bytes().to_vec(),
        };
        protein_change(&cds(), &edit, CodonTable::standard()).unwrap()
    }

    #[test]
    fn test_synonymous() {
        let c = change(5, 1, "T");
        assert_eq!(c.hgvs_p, "p.Ala2=");
        assert_eq!(c.consequences, vec![Consequence::SynonymousVariant]);
    }

    #[test]
    fn test_missense() {
        let c = change(4, 1, "A");
        assert_eq!(c.hgvs_p, "p.Ala2Asp");
        assert!(c.consequences.contains(&Consequence::MissenseVariant));
    }

    #[test]
    fn test_stop_gained() {
        // AAG -> TAG
        let c = change(9, 1, "T");
        assert_eq!(c.hgvs_p, "p.Lys4Ter");
        assert!(c.consequences.contains(&Consequence::StopGained));
    }

    #[test]
    fn test_start_lost_and_retained() {
        assert_eq!(change(2, 1, "A").hgvs_p, "p.Met1?");
        let mito = protein_change(
            &cds(),
            &CodingEdit {
                start: 2,
                deleted: 1,
                inserted: b"A".to_vec(),
            },
            CodonTable::mitochondrial(),
        )
        .unwrap();
        assert_eq!(mito.hgvs_p, "p.Met1=");
        assert_eq!(mito.consequences, vec![Consequence::StartRetainedVariant]);
    }

    #[test]
    fn test_stop_retained() {
        // TAA -> TAG
        let c = change(17, 1, "G");
        assert_eq!(c.hgvs_p, "p.Ter6=");
        assert_eq!(c.consequences, vec![Consequence::StopRetainedVariant]);
    }

    #[test]
    fn test_insertion_after_stop_keeps_stop() {
        // A copy of TAA inserted right after the stop codon
        let c = change(18, 0, "TAA");
        assert_eq!(c.hgvs_p, "p.Ter6=");
        assert_eq!(c.consequences, vec![Consequence::StopRetainedVariant]);
    }

    #[test]
    fn test_stop_lost_extension() {
        // TAA -> CAA (Gln); tail GCA TTT TGA: next stop three codons on
        let c = change(15, 1, "C");
        assert_eq!(c.hgvs_p, "p.Ter6GlnextTer3");
        assert!(c.consequences.contains(&Consequence::StopLost));
    }

    #[test]
    fn test_frameshift() {
        // Delete the first base of codon 3: ATG GCC GCA AGA AGT AAG CAT TTT GAG G
        let c = change(6, 1, "");
        assert_eq!(c.hgvs_p, "p.Gly3AlafsTer?");
        assert!(c.consequences.contains(&Consequence::FrameshiftVariant));
    }

    #[test]
    fn test_frameshift_with_stop() {
        // Insert "T" after codon 2: ATG GCC TGG CAA GAA GTA AGC ATT TTG AGG
        let c = change(6, 0, "T");
        assert_eq!(c.hgvs_p, "p.Gly3TrpfsTer?");
        // Insert "TA" after codon 2: ATG GCC TAG ...
        let c = change(6, 0, "TA");
        assert_eq!(c.hgvs_p, "p.Gly3Ter");
        assert!(c.consequences.contains(&Consequence::StopGained));
    }

    #[test]
    fn test_inframe_deletion_of_repeat() {
        // Delete one AAG of the Lys-Lys repeat; the change lands on the last copy
        let c = change(9, 3, "");
        assert_eq!(c.hgvs_p, "p.Lys5del");
        assert!(c.consequences.contains(&Consequence::InframeDeletion));
    }

    #[test]
    fn test_inframe_duplication() {
        let c = change(12, 0, "AAG");
        assert_eq!(c.hgvs_p, "p.Lys5dup");
        assert!(c.consequences.contains(&Consequence::InframeInsertion));
    }

    #[test]
    fn test_inframe_insertion() {
        let c = change(6, 0, "TGG");
        assert_eq!(c.hgvs_p, "p.Ala2_Gly3insTrp");
    }

    #[test]
    fn test_inframe_delins() {
        // GCC GGC -> TGG: Ala-Gly replaced by Trp
        let c = change(3, 6, "TGG");
        assert_eq!(c.hgvs_p, "p.Ala2_Gly3delinsTrp");
        assert!(c.consequences.contains(&Consequence::InframeDeletion));
    }

    #[test]
    fn test_inframe_stop_deletion() {
        // Delete the stop codon: read-through into GCA TTT TGA
        let c = change(15, 3, "");
        assert_eq!(c.hgvs_p, "p.Ter6AlaextTer2");
        assert!(c.consequences.contains(&Consequence::StopLost));
    }

    #[test]
    fn test_incomplete_terminal_codon() {
        let cds = CodingSequence {
            bases: b"ATGGCCGG".to_vec(),
            coding_len: 8,
        };
        let edit = CodingEdit {
            start: 7,
            deleted: 1,
            inserted: b"A".to_vec(),
        };
        let c = protein_change(&cds, &edit, CodonTable::standard()).unwrap();
        assert_eq!(c.hgvs_p, "p.?");
        assert_eq!(
            c.consequences,
            vec![Consequence::IncompleteTerminalCodonVariant]
        );
    }
}
