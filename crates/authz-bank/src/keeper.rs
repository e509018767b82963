//! Account balances.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use authz_types::{Address, AuthzError, AuthzResult, Coins};

use crate::msgs::Transfer;

type Balances = BTreeMap<Address, Coins>;

/// Balances per address. Clones share the same ledger.
#[derive(Clone, Default)]
pub struct BankKeeper {
    balances: Arc<Mutex<Balances>>,
}

impl BankKeeper {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AuthzResult<MutexGuard<'_, Balances>> {
        self.balances.lock().map_err(|e| AuthzError::ExecutionFailed {
            reason: format!("bank ledger lock poisoned: {}", e),
        })
    }

    pub fn set_balance(&self, address: &Address, coins: Coins) -> AuthzResult<()> {
        let mut balances = self.lock()?;
        if coins.is_zero() {
            balances.remove(address);
        } else {
            balances.insert(address.clone(), coins);
        }
        Ok(())
    }

    pub fn balance(&self, address: &Address) -> AuthzResult<Coins> {
        Ok(self.lock()?.get(address).cloned().unwrap_or_default())
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// Returns `ExecutionFailed` and leaves both balances untouched if `from`
    /// cannot cover the amount.
    pub fn send(&self, from: &Address, to: &Address, amount: &Coins) -> AuthzResult<()> {
        let mut balances = self.lock()?;
        debit(&mut balances, from, amount)?;
        credit(&mut balances, to, amount)?;
        debug!(from = %from, to = %to, amount = %amount, "coins sent");
        Ok(())
    }

    /// Apply every input and output, or none of them.
    pub fn multi_send(&self, inputs: &[Transfer], outputs: &[Transfer]) -> AuthzResult<()> {
        let mut balances = self.lock()?;
        let mut next = balances.clone();
        for input in inputs {
            debit(&mut next, &input.address, &input.coins)?;
        }
        for output in outputs {
            credit(&mut next, &output.address, &output.coins)?;
        }
        *balances = next;
        Ok(())
    }
}

fn debit(balances: &mut Balances, address: &Address, amount: &Coins) -> AuthzResult<()> {
    let held = balances.get(address).cloned().unwrap_or_default();
    let left = held
        .checked_sub(amount)
        .ok_or_else(|| AuthzError::ExecutionFailed {
            reason: format!("insufficient funds: {} holds {}, needs {}", address, held, amount),
        })?;
    if left.is_zero() {
        balances.remove(address);
    } else {
        balances.insert(address.clone(), left);
    }
    Ok(())
}

fn credit(balances: &mut Balances, address: &Address, amount: &Coins) -> AuthzResult<()> {
    let held = balances.get(address).cloned().unwrap_or_default();
    let sum = held
        .checked_add(amount)
        .ok_or_else(|| AuthzError::ExecutionFailed {
            reason: format!("balance of {} overflows", address),
        })?;
    balances.insert(address.clone(), sum);
    Ok(())
}
