use std::io::Read;

use crate::command::OperationKind;
use csv::{DeserializeRecordsIntoIter, Trim};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ScriptRow {
    pub op: OperationKind,
    pub account: Option<String>,
    pub counterparty: Option<String>,
    pub amount: Option<Decimal>,
}

/// Parses an operation script in CSV format, header `op,account,counterparty,amount`.
///
/// Yields every row together with its line number, malformed rows included.
pub struct CsvScriptParser<R> {
    iter: DeserializeRecordsIntoIter<R, ScriptRow>,
}

impl<R> CsvScriptParser<R>
where
    R: Read,
{
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);

        Self {
            iter: reader.into_deserialize(),
        }
    }
}

impl<R> Iterator for CsvScriptParser<R>
where
    R: Read,
{
    type Item = (u64, Result<ScriptRow, csv::Error>);

    fn next(&mut self) -> Option<Self::Item> {
        let curr_line = self.iter.reader().position().line();
        self.iter.next().map(|row| (curr_line, row))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn parse_rows() {
        let script = "op, account, counterparty, amount\n\
                      emit, , , 250\n\
                      open, @alice, ,\n\
                      transfer, emission, @alice, 33.335\n\
                      wire, emission, , 1\n\
                      block, @alice\n";
        let rows: Vec<_> = CsvScriptParser::new(script.as_bytes()).collect();
        assert_eq!(rows.len(), 5);

        let (_, emit) = &rows[0];
        let emit = emit.as_ref().unwrap();
        assert_eq!(emit.op, OperationKind::Emit);
        assert_eq!(emit.account, None);
        assert_eq!(emit.amount, Some(Decimal::from(250)));

        let (_, transfer) = &rows[2];
        let transfer = transfer.as_ref().unwrap();
        assert_eq!(transfer.counterparty.as_deref(), Some("@alice"));
        assert_eq!(transfer.amount, Some(Decimal::from_str("33.335").unwrap()));

        // unknown operation
        assert!(rows[3].1.is_err());

        // trailing columns may be omitted
        let (_, block) = &rows[4];
        let block = block.as_ref().unwrap();
        assert_eq!(block.op, OperationKind::Block);
        assert_eq!(block.account.as_deref(), Some("@alice"));
        assert_eq!(block.amount, None);
    }
}
