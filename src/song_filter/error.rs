//! The parser's error taxonomy (song-filter spec §7). Every parsing
//! path fails through exactly one of these variants; nothing here is
//! produced by matching, which is total and never fails.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ParseError {
    #[error("Unknown filter type: {0}")]
    UnknownFilterType(String),
    #[error("Unknown filter operator: {0}")]
    UnknownOperator(String),
    #[error("Word expected")]
    WordExpected,
    #[error("Quoted value expected")]
    QuotedExpected,
    #[error("Closing quote not found")]
    ClosingQuoteMissing,
    #[error("Quoted value is too long")]
    QuotedTooLong,
    #[error("'{0}' expected")]
    ParenExpected(char),
    #[error("'AND' expected")]
    KeywordExpectedAnd,
    #[error("Bad URI")]
    BadUri,
    #[error("Bad timestamp: {0}")]
    BadTimestamp(String),
    #[error("Bad audio format: {0}")]
    BadAudioFormat(String),
    #[error("Bad priority")]
    BadPriority,
    #[error("Number expected")]
    BadNumber,
    #[error("Unparsed trailing input: {0}")]
    UnparsedTrailing(String),
    #[error("Incorrect number of filter arguments")]
    ArgumentCount,
    #[error("Bad regex: {0}")]
    BadRegex(String),
}
