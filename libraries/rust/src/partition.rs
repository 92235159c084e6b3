use crate::errors::Error;
use crate::symbol::Symbol;

/// Default number of symbols per provider request.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// One provider request worth of symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Position of this batch within its partition, starting at zero.
    pub index: usize,
    pub symbols: Vec<Symbol>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Comma separated symbol list used in multi-symbol lookups.
    pub fn joined(&self) -> String {
        self.symbols
            .iter()
            .map(Symbol::as_str)
            .collect::<Vec<&str>>()
            .join(",")
    }
}

/// Split `symbols` into consecutive batches of at most `batch_size` entries.
///
/// Every batch except the last holds exactly `batch_size` symbols and the
/// concatenation of all batches equals the input.
pub fn partition(symbols: &[Symbol], batch_size: usize) -> Result<Vec<Batch>, Error> {
    if batch_size == 0 {
        return Err(Error::InvalidBatchSize(batch_size));
    }

    let batches = symbols
        .chunks(batch_size)
        .enumerate()
        .map(|(index, chunk)| Batch {
            index,
            symbols: chunk.to_vec(),
        })
        .collect();

    Ok(batches)
}
