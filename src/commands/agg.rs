//! The agg command: run the aggregation loop until interrupted.

use crate::agg::Aggregator;
use crate::commands::Session;
use crate::{GatorError, Result};

/// `gator agg <interval>`: poll feeds every `<interval>` (e.g. `1m`, `30s`).
pub async fn agg(session: &Session, args: &[String]) -> Result<()> {
    let [raw] = args else {
        return Err(GatorError::Usage("agg <interval>"));
    };

    let period = humantime::parse_duration(raw)
        .map_err(|e| GatorError::Validation(format!("invalid interval '{raw}': {e}")))?;
    if period.is_zero() {
        return Err(GatorError::Validation(
            "interval must be greater than zero".to_string(),
        ));
    }

    Aggregator::new(&session.db, period)?.run().await
}
