// self
use crate::obs::{OperationKind, OperationOutcome};

/// Counter incremented once per attempt and once per terminal outcome.
pub const OPERATION_COUNTER: &str = "esia_client_operation_total";

/// Bumps [`OPERATION_COUNTER`] with `operation` and `outcome` labels.
///
/// Without the `metrics` feature this compiles to nothing.
pub fn record_operation_outcome(kind: OperationKind, outcome: OperationOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			OPERATION_COUNTER,
			"operation" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn counter_name_is_stable() {
		assert_eq!(OPERATION_COUNTER, "esia_client_operation_total");

		record_operation_outcome(OperationKind::TokenExchange, OperationOutcome::Failure);
	}
}
