use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use payroll_model::{IntegrationKey, ReferenceData, ReferenceDomain};
use tracing::{info, info_span, warn};

use crate::error::{ReferenceError, Result};
use crate::gateway::ReferenceGateway;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetch reference data, giving up after `timeout`.
///
/// The gateway runs on a worker thread. When the deadline passes the call
/// returns [`ReferenceError::Timeout`] and the worker's late result is
/// dropped; the worker is not interrupted, so gateways doing I/O should be
/// given the same deadline (see [`HttpGatewayConfig::with_deadline`]). An
/// empty dataset is an error: nothing could ever match.
///
/// [`HttpGatewayConfig::with_deadline`]: crate::HttpGatewayConfig::with_deadline
pub fn fetch_with_deadline(
    gateway: &Arc<dyn ReferenceGateway>,
    key: &IntegrationKey,
    timeout: Duration,
) -> Result<ReferenceData> {
    let span = info_span!(
        "fetch_reference",
        company_id = key.company_id,
        integration = %key.integration()
    );
    let _guard = span.enter();
    let started = Instant::now();

    let (tx, rx) = mpsc::channel();
    let worker_gateway = Arc::clone(gateway);
    let worker_key = key.clone();
    thread::spawn(move || {
        // The receiver is gone once the deadline passed.
        let _ = tx.send(worker_gateway.fetch(&worker_key));
    });

    let data = match rx.recv_timeout(timeout) {
        Ok(result) => result?,
        Err(RecvTimeoutError::Timeout) => {
            warn!(gateway = %gateway.describe(), "reference fetch timed out");
            return Err(ReferenceError::Timeout {
                company_id: key.company_id,
                timeout_ms: timeout.as_millis(),
            });
        }
        Err(RecvTimeoutError::Disconnected) => {
            return Err(ReferenceError::Aborted {
                company_id: key.company_id,
            });
        }
    };

    if data.is_empty() {
        return Err(ReferenceError::Empty {
            company_id: key.company_id,
        });
    }

    info!(
        employees = data.employees().len(),
        gross_to_net = data.count(ReferenceDomain::GrossToNet),
        type_codes = data.count(ReferenceDomain::TypeCode),
        departments = data.count(ReferenceDomain::Department),
        duration_ms = started.elapsed().as_millis(),
        "reference data loaded"
    );
    Ok(data)
}
