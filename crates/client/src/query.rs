//! Point queries against current ledger state.

use std::sync::Arc;

use chrono::DateTime;
use flowledger_core::{AccountId, Amount, FlowRate, FlowRecord, TokenId};
use flowledger_ports::{FlowReader, GatewayError, RawFlowRecord};
use log::debug;

use crate::error::Result;

/// Authoritative reads of one flow and of an account's net flow.
///
/// Every call goes to the ledger; nothing is cached or derived from the
/// event log.
pub struct FlowStateQuery<G>
where
    G: FlowReader,
{
    gateway: Arc<G>,
}

impl<G> FlowStateQuery<G>
where
    G: FlowReader,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Current record of the (sender, receiver) flow.
    ///
    /// A pair without a flow comes back as the ledger reports it, usually a
    /// zero rate at the epoch.
    pub async fn get_flow(
        &self,
        token: &TokenId,
        sender: &AccountId,
        receiver: &AccountId,
    ) -> Result<FlowRecord> {
        let raw = self.gateway.get_flow(token, sender, receiver).await?;
        debug!(
            "Flow {} -> {} on {}: rate {} since {}",
            sender, receiver, token, raw.flow_rate, raw.timestamp
        );
        Ok(shape_record(raw)?)
    }

    /// Inbound minus outbound rate of `account`; zero for unknown accounts.
    pub async fn get_net_flow(&self, token: &TokenId, account: &AccountId) -> Result<FlowRate> {
        Ok(self.gateway.get_net_flow(token, account).await?)
    }
}

fn shape_record(raw: RawFlowRecord) -> std::result::Result<FlowRecord, GatewayError> {
    let seconds = i64::try_from(raw.timestamp).map_err(|_| {
        GatewayError::MalformedResponse(format!("timestamp {} out of range", raw.timestamp))
    })?;
    let timestamp = DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
        GatewayError::MalformedResponse(format!("timestamp {} out of range", raw.timestamp))
    })?;

    Ok(FlowRecord {
        timestamp,
        flow_rate: raw.flow_rate,
        deposit: amount("deposit", raw.deposit)?,
        owed_deposit: amount("owed_deposit", raw.owed_deposit)?,
    })
}

fn amount(field: &str, value: Amount) -> std::result::Result<Amount, GatewayError> {
    if value.is_sign_negative() || !value.fract().is_zero() {
        return Err(GatewayError::MalformedResponse(format!(
            "{} {} is not a non-negative integer",
            field, value
        )));
    }
    Ok(value.normalize())
}
