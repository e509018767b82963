//! Bank actions: single and multi-party transfers.

use std::any::Any;

use serde::{Deserialize, Serialize};

use authz_core::traits::{Action, Named};
use authz_types::{ActionKind, Address, AuthzError, AuthzResult, BlockContext, Coins, Envelope};

pub const ROUTE: &str = "bank";
pub const TYPE_SEND: &str = "send";
pub const TYPE_MULTI_SEND: &str = "multisend";

fn invalid(reason: impl Into<String>) -> AuthzError {
    AuthzError::InvalidRequest {
        reason: reason.into(),
    }
}

/// Move `amount` from `from_address` to `to_address`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSend {
    pub from_address: Address,
    pub to_address: Address,
    pub amount: Coins,
}

impl MsgSend {
    pub fn new(from_address: Address, to_address: Address, amount: Coins) -> Self {
        Self {
            from_address,
            to_address,
            amount,
        }
    }

    pub fn action_kind() -> ActionKind {
        ActionKind::new(ROUTE, TYPE_SEND)
    }
}

impl Named for MsgSend {
    const TYPE_URL: &'static str = "/bank.MsgSend";
}

impl Action for MsgSend {
    fn type_url(&self) -> &'static str {
        Self::TYPE_URL
    }

    fn kind(&self) -> ActionKind {
        MsgSend::action_kind()
    }

    fn signers(&self) -> Vec<Address> {
        vec![self.from_address.clone()]
    }

    fn validate_basic(&self, _block: &BlockContext) -> AuthzResult<()> {
        if self.from_address.is_empty() {
            return Err(invalid("missing sender address"));
        }
        if self.to_address.is_empty() {
            return Err(invalid("missing recipient address"));
        }
        if self.amount.is_zero() {
            return Err(invalid("send amount must be positive"));
        }
        Ok(())
    }

    fn to_envelope(&self) -> AuthzResult<Envelope> {
        Envelope::pack(Self::TYPE_URL, self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// One side of a multi-send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub address: Address,
    pub coins: Coins,
}

impl Transfer {
    pub fn new(address: Address, coins: Coins) -> Self {
        Self { address, coins }
    }
}

fn total(transfers: &[Transfer]) -> AuthzResult<Coins> {
    transfers.iter().try_fold(Coins::empty(), |sum, t| {
        sum.checked_add(&t.coins)
            .ok_or_else(|| invalid("multi-send total overflows"))
    })
}

/// Debit every input and credit every output; totals must match.
///
/// Signed by every input address. Only a single-input multi-send has the
/// one signer a delegated batch requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgMultiSend {
    pub inputs: Vec<Transfer>,
    pub outputs: Vec<Transfer>,
}

impl Named for MsgMultiSend {
    const TYPE_URL: &'static str = "/bank.MsgMultiSend";
}

impl Action for MsgMultiSend {
    fn type_url(&self) -> &'static str {
        Self::TYPE_URL
    }

    fn kind(&self) -> ActionKind {
        ActionKind::new(ROUTE, TYPE_MULTI_SEND)
    }

    fn signers(&self) -> Vec<Address> {
        self.inputs.iter().map(|i| i.address.clone()).collect()
    }

    fn validate_basic(&self, _block: &BlockContext) -> AuthzResult<()> {
        if self.inputs.is_empty() {
            return Err(invalid("no inputs to multi-send"));
        }
        if self.outputs.is_empty() {
            return Err(invalid("no outputs to multi-send"));
        }
        if self
            .inputs
            .iter()
            .chain(&self.outputs)
            .any(|t| t.address.is_empty() || t.coins.is_zero())
        {
            return Err(invalid("multi-send entries need an address and a positive amount"));
        }
        if total(&self.inputs)? != total(&self.outputs)? {
            return Err(invalid("multi-send inputs and outputs do not balance"));
        }
        Ok(())
    }

    fn to_envelope(&self) -> AuthzResult<Envelope> {
        Envelope::pack(Self::TYPE_URL, self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
