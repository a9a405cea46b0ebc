use super::error::PayloadError;
use crate::core::forcefield::scoring::ScoreBreakdown;
use crate::core::forcefield::term::EnergyTerm;
use crate::core::models::builder::{AtomSpec, ConformationBuilder};
use crate::core::models::conformation::{CompactnessMode, Conformation};
use crate::core::models::moves::Move;
use crate::core::rotamers::library::RotamerLibrary;
use nalgebra::Point3;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;

/// Failure to move a payload through a reader or writer.
#[derive(Debug, Error)]
pub enum PayloadIoError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

/// Common reading and writing for the JSON payload records.
pub trait JsonPayload: Serialize + DeserializeOwned {
    /// Parses a payload from a JSON string. Any parse failure is a schema error.
    fn from_json(text: &str) -> Result<Self, PayloadError> {
        Ok(serde_json::from_str(text)?)
    }

    fn to_json(&self) -> Result<String, PayloadError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn read_from(reader: &mut impl Read) -> Result<Self, PayloadIoError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(Self::from_json(&text)?)
    }

    fn write_to(&self, writer: &mut impl Write) -> Result<(), PayloadIoError> {
        serde_json::to_writer_pretty(&mut *writer, self).map_err(PayloadError::from)?;
        writeln!(writer)?;
        Ok(())
    }

    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self, PayloadIoError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), PayloadIoError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// One atom as sent by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AtomRecord {
    pub id: i64,
    pub res: usize,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub elem: String,
}

/// Wire form of a move, tagged by `type`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MoveRecord {
    Phi { delta: f64 },
    Psi { delta: f64 },
    Rotamer { rotamer_id: usize },
    Torsion { d_phi: f64, d_psi: f64 },
}

impl MoveRecord {
    pub fn to_move(self, res_idx: usize) -> Move {
        match self {
            MoveRecord::Phi { delta } => Move::phi(res_idx, delta),
            MoveRecord::Psi { delta } => Move::psi(res_idx, delta),
            MoveRecord::Rotamer { rotamer_id } => Move::rotamer(res_idx, rotamer_id),
            MoveRecord::Torsion { d_phi, d_psi } => Move::Torsion {
                res_idx,
                d_phi,
                d_psi,
            },
        }
    }
}

impl From<&Move> for MoveRecord {
    fn from(mv: &Move) -> Self {
        match *mv {
            Move::Torsion { d_phi, d_psi, .. } if d_psi == 0.0 => MoveRecord::Phi { delta: d_phi },
            Move::Torsion { d_phi, d_psi, .. } if d_phi == 0.0 => MoveRecord::Psi { delta: d_psi },
            Move::Torsion { d_phi, d_psi, .. } => MoveRecord::Torsion { d_phi, d_psi },
            Move::Rotamer { rotamer_id, .. } => MoveRecord::Rotamer { rotamer_id },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiffRecord {
    pub res_idx: usize,
    #[serde(rename = "move")]
    pub mv: MoveRecord,
}

impl DiffRecord {
    pub fn to_move(&self) -> Move {
        self.mv.to_move(self.res_idx)
    }
}

/// A score request: the full conformation plus an optional move to apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoreRequest {
    pub sequence: String,
    pub atoms: Vec<AtomRecord>,
    #[serde(default)]
    pub target_ss: String,
    #[serde(default)]
    pub target_contacts: Vec<[usize; 2]>,
    #[serde(default)]
    pub compactness: CompactnessMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<DiffRecord>,
}

impl JsonPayload for ScoreRequest {}

impl ScoreRequest {
    /// Converts the records into a builder. Fails only on unknown element
    /// symbols; every other check belongs to the builder.
    pub fn to_builder(&self) -> Result<ConformationBuilder, PayloadError> {
        let mut builder = ConformationBuilder::new(&self.sequence);
        for record in &self.atoms {
            let element = record.elem.parse().map_err(|e| {
                PayloadError::Schema(format!("atom {}: {e}", record.id))
            })?;
            builder.atom(AtomSpec::new(
                record.id,
                record.res,
                &record.name,
                element,
                Point3::new(record.x, record.y, record.z),
            ));
        }
        builder
            .target_ss(&self.target_ss)
            .target_contacts(self.target_contacts.iter().map(|&[i, j]| (i, j)))
            .compactness(self.compactness);
        Ok(builder)
    }

    pub fn build_conformation(
        &self,
        library: &RotamerLibrary,
    ) -> Result<Conformation, PayloadError> {
        self.to_builder()?.build(library)
    }

    /// Serializes a conformation back into request form, without a diff.
    pub fn from_conformation(conformation: &Conformation) -> Self {
        let mut atoms: Vec<AtomRecord> = conformation
            .atoms()
            .map(|(_, atom)| AtomRecord {
                id: atom.serial,
                res: atom.residue_index,
                name: atom.name.clone(),
                x: atom.position.x,
                y: atom.position.y,
                z: atom.position.z,
                elem: atom.element.symbol().to_string(),
            })
            .collect();
        atoms.sort_by_key(|a| a.id);

        Self {
            sequence: conformation.sequence().to_string(),
            atoms,
            target_ss: conformation.target_ss().iter().map(|s| s.code()).collect(),
            target_contacts: conformation
                .target_contacts()
                .iter()
                .map(|&(i, j)| [i, j])
                .collect(),
            compactness: conformation.compactness(),
            diff: None,
        }
    }
}

/// The six term values, named as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TermsRecord {
    pub clash: f64,
    pub rama: f64,
    pub rotamer: f64,
    pub ss: f64,
    pub compact: f64,
    pub hbond: f64,
}

impl From<&EnergyTerm> for TermsRecord {
    fn from(t: &EnergyTerm) -> Self {
        Self {
            clash: t.clash,
            rama: t.rama,
            rotamer: t.rotamer,
            ss: t.ss,
            compact: t.compact,
            hbond: t.hbond,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResidueTermsRecord {
    pub i: usize,
    #[serde(flatten)]
    pub terms: TermsRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoreResponse {
    pub score: f64,
    pub terms: TermsRecord,
    pub per_residue: Vec<ResidueTermsRecord>,
}

impl JsonPayload for ScoreResponse {}

impl From<&ScoreBreakdown> for ScoreResponse {
    fn from(breakdown: &ScoreBreakdown) -> Self {
        Self {
            score: breakdown.total,
            terms: TermsRecord::from(&breakdown.terms),
            per_residue: breakdown
                .per_residue
                .iter()
                .enumerate()
                .map(|(i, terms)| ResidueTermsRecord {
                    i,
                    terms: TermsRecord::from(terms),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NudgeResponse {
    pub res_idx: usize,
    #[serde(rename = "move")]
    pub mv: MoveRecord,
    pub expected_delta_score: f64,
    /// Per-term change in raw (unweighted) term values.
    pub explanation: TermsRecord,
    pub model_used: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl JsonPayload for NudgeResponse {}
