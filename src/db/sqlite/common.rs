use rust_decimal::Decimal;
use uuid::Uuid;

use crate::db::error::{DbError, DbResult};

/// Parse a UUID from its TEXT column representation.
pub fn parse_uuid(s: &str) -> DbResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| DbError::Internal(format!("Invalid UUID in database: {e}")))
}

/// Parse a decimal stored as TEXT.
pub fn parse_decimal(s: &str) -> DbResult<Decimal> {
    s.parse::<Decimal>()
        .map_err(|e| DbError::Internal(format!("Invalid decimal in database: {e}")))
}

/// Parse an optional decimal column.
pub fn parse_opt_decimal(s: Option<&str>) -> DbResult<Option<Decimal>> {
    s.map(parse_decimal).transpose()
}

/// `?` placeholders for an IN clause of `count` values.
pub fn in_placeholders(count: usize) -> String {
    let mut out = String::with_capacity(count * 2);
    for i in 0..count {
        if i > 0 {
            out.push(',');
        }
        out.push('?');
    }
    out
}
