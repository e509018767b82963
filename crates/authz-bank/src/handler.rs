//! The `Handler` serving the bank route.

use serde_json::json;
use tracing::info;

use authz_core::traits::{Action, Handler};
use authz_types::{ActionResult, AuthzError, AuthzResult, BlockContext, Event};

use crate::keeper::BankKeeper;
use crate::msgs::{MsgMultiSend, MsgSend, ROUTE};

pub const EVENT_TRANSFER: &str = "transfer";

/// Executes `MsgSend` and `MsgMultiSend` against a `BankKeeper`.
#[derive(Clone)]
pub struct BankHandler {
    keeper: BankKeeper,
}

impl BankHandler {
    pub fn new(keeper: BankKeeper) -> Self {
        Self { keeper }
    }

    fn send(&self, msg: &MsgSend) -> AuthzResult<ActionResult> {
        self.keeper
            .send(&msg.from_address, &msg.to_address, &msg.amount)?;
        info!(
            from = %msg.from_address,
            to = %msg.to_address,
            amount = %msg.amount,
            "bank send executed"
        );
        Ok(ActionResult {
            data: json!({ "sent": msg.amount.to_string() }),
            log: format!("sent {} to {}", msg.amount, msg.to_address),
            events: vec![Event::new(EVENT_TRANSFER)
                .attr("sender", &msg.from_address)
                .attr("recipient", &msg.to_address)
                .attr("amount", &msg.amount)],
        })
    }

    fn multi_send(&self, msg: &MsgMultiSend) -> AuthzResult<ActionResult> {
        self.keeper.multi_send(&msg.inputs, &msg.outputs)?;
        info!(
            inputs = msg.inputs.len(),
            outputs = msg.outputs.len(),
            "bank multi-send executed"
        );
        let events = msg
            .outputs
            .iter()
            .map(|o| {
                Event::new(EVENT_TRANSFER)
                    .attr("recipient", &o.address)
                    .attr("amount", &o.coins)
            })
            .collect();
        Ok(ActionResult {
            data: serde_json::Value::Null,
            log: format!("multi-send to {} recipients", msg.outputs.len()),
            events,
        })
    }
}

impl Handler for BankHandler {
    fn handle(&self, _block: &BlockContext, action: &dyn Action) -> AuthzResult<ActionResult> {
        let any = action.as_any();
        if let Some(msg) = any.downcast_ref::<MsgSend>() {
            self.send(msg)
        } else if let Some(msg) = any.downcast_ref::<MsgMultiSend>() {
            self.multi_send(msg)
        } else {
            Err(AuthzError::UnroutableAction {
                route: format!("{} has no handler for {}", ROUTE, action.type_url()),
            })
        }
    }
}
