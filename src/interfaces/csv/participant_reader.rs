use crate::domain::ids::ParticipantId;
use crate::error::{Result, SettleError};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ParticipantRow {
    pub id: ParticipantId,
    pub name: String,
}

/// Reads `id,name` rows used to fill in display names.
pub struct ParticipantReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ParticipantReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self { reader }
    }

    pub fn participants(self) -> impl Iterator<Item = Result<ParticipantRow>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(SettleError::from))
    }
}
