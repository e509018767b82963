//! Scenario scripts: accounts, then a list of steps run against a `SimApp`.
//!
//! Each step names an action, optionally advances the block clock by
//! `advance` seconds, and states the outcome it expects (`ok` by default).
//! A step whose outcome differs from its expectation fails the script.

use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use tracing::debug;

use authz_bank::{MsgSend, SendCapability, SimApp};
use authz_core::{
    traits::{Action, Capability},
    AuthzConfig, GenericCapability, MsgGrant, MsgRevoke,
};
use authz_types::{
    ActionKind, Address, AuthzError, AuthzResult, BlockContext, Coins, Expiration,
};

#[derive(Debug, Deserialize)]
pub struct Account {
    pub name: String,
    #[serde(default)]
    pub balance: Coins,
}

#[derive(Debug, Deserialize)]
pub struct SendSpec {
    pub from: String,
    pub to: String,
    pub amount: Coins,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Step {
    /// A spend limit makes a `SendCapability`; otherwise `kind` makes an
    /// unrestricted grant.
    Grant {
        granter: String,
        grantee: String,
        #[serde(default)]
        spend_limit: Option<Coins>,
        #[serde(default)]
        kind: Option<String>,
        #[serde(default)]
        expiration: Option<DateTime<Utc>>,
    },
    Revoke {
        granter: String,
        grantee: String,
        kind: String,
    },
    /// A direct, self-signed transfer.
    Send(SendSpec),
    /// A delegated batch of transfers.
    Exec {
        grantee: String,
        sends: Vec<SendSpec>,
    },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Expect {
    #[default]
    Ok,
    Unauthorized,
    NotFound,
    Invalid,
    Failed,
}

impl Expect {
    fn of(result: &AuthzResult<()>) -> Self {
        match result {
            Ok(()) => Expect::Ok,
            Err(AuthzError::Unauthorized { .. }) => Expect::Unauthorized,
            Err(AuthzError::NotFound { .. }) => Expect::NotFound,
            Err(AuthzError::InvalidGrant { .. } | AuthzError::InvalidRequest { .. }) => {
                Expect::Invalid
            }
            Err(_) => Expect::Failed,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ScriptStep {
    #[serde(flatten)]
    pub step: Step,
    /// Seconds to move the block clock forward before this step.
    #[serde(default)]
    pub advance: i64,
    #[serde(default)]
    pub expect: Expect,
}

#[derive(Debug, Deserialize)]
pub struct Script {
    pub name: String,
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub config: AuthzConfig,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

/// What a finished script leaves behind.
#[derive(Debug)]
pub struct Outcome {
    pub steps: usize,
    pub balances: Vec<(String, Coins)>,
    pub state_hash: String,
}

fn address(name: &str) -> Address {
    Address::from(name)
}

fn parse_kind(kind: &str) -> AuthzResult<ActionKind> {
    kind.split_once('/')
        .map(|(route, name)| ActionKind::new(route, name))
        .ok_or_else(|| AuthzError::ConfigError {
            reason: format!("action kind '{}' must look like 'route/name'", kind),
        })
}

impl Script {
    pub fn from_toml_str(s: &str) -> AuthzResult<Self> {
        toml::from_str(s).map_err(|e| AuthzError::ConfigError {
            reason: format!("failed to parse scenario: {}", e),
        })
    }

    pub fn from_file(path: &Path) -> AuthzResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| AuthzError::ConfigError {
            reason: format!("failed to read scenario '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Run every step, printing one line per step.
    pub fn run(&self) -> AuthzResult<Outcome> {
        let app = SimApp::new(&self.config)?;
        for account in &self.accounts {
            app.bank()
                .set_balance(&address(&account.name), account.balance.clone())?;
        }

        let mut time = self.start;
        let mut height = 1;
        for (index, scripted) in self.steps.iter().enumerate() {
            time = TimeDelta::try_seconds(scripted.advance)
                .and_then(|delta| time.checked_add_signed(delta))
                .ok_or_else(|| AuthzError::ConfigError {
                    reason: format!(
                        "step {}: advance of {} seconds out of range",
                        index + 1,
                        scripted.advance
                    ),
                })?;
            let block = BlockContext::new("authz-demo", height, time);
            height += 1;

            let result = run_step(&app, &block, &scripted.step);
            let got = Expect::of(&result);
            let detail = match &result {
                Ok(()) => "ok".to_string(),
                Err(e) => e.to_string(),
            };
            println!(
                "  [{}] {:<40} {}",
                index + 1,
                describe(&scripted.step),
                detail
            );
            if got != scripted.expect {
                return Err(AuthzError::ExecutionFailed {
                    reason: format!(
                        "step {} expected {:?}, got {:?} ({})",
                        index + 1,
                        scripted.expect,
                        got,
                        detail
                    ),
                });
            }
        }

        let mut names: Vec<String> = self.accounts.iter().map(|a| a.name.clone()).collect();
        for scripted in &self.steps {
            let mut touched: Vec<&str> = Vec::new();
            match &scripted.step {
                Step::Send(send) => touched.push(&send.to),
                Step::Exec { sends, .. } => touched.extend(sends.iter().map(|s| s.to.as_str())),
                _ => {}
            }
            for name in touched {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        let balances = names
            .into_iter()
            .map(|name| {
                let coins = app.bank().balance(&address(&name))?;
                Ok((name, coins))
            })
            .collect::<AuthzResult<Vec<_>>>()?;

        Ok(Outcome {
            steps: self.steps.len(),
            balances,
            state_hash: app.state_hash(),
        })
    }
}

fn run_step(app: &SimApp, block: &BlockContext, step: &Step) -> AuthzResult<()> {
    debug!(height = block.height, step = %describe(step), "running step");
    match step {
        Step::Grant {
            granter,
            grantee,
            spend_limit,
            kind,
            expiration,
        } => {
            let capability: Box<dyn Capability> = match (spend_limit, kind) {
                (Some(limit), _) => Box::new(SendCapability::new(limit.clone())),
                (None, Some(kind)) => Box::new(GenericCapability::new(parse_kind(kind)?)),
                (None, None) => {
                    return Err(AuthzError::ConfigError {
                        reason: "grant needs a spend_limit or a kind".to_string(),
                    })
                }
            };
            let expiration = expiration.map(Expiration::at).unwrap_or(Expiration::NEVER);
            let msg = MsgGrant::new(
                address(granter),
                address(grantee),
                capability.as_ref(),
                expiration,
            )?;
            app.deliver(block, &msg).map(|_| ())
        }
        Step::Revoke {
            granter,
            grantee,
            kind,
        } => {
            let msg = MsgRevoke {
                granter: address(granter),
                grantee: address(grantee),
                action_kind: parse_kind(kind)?,
            };
            app.deliver(block, &msg).map(|_| ())
        }
        Step::Send(send) => app.deliver(block, &to_msg(send)).map(|_| ()),
        Step::Exec { grantee, sends } => {
            let msgs: Vec<MsgSend> = sends.iter().map(to_msg).collect();
            let actions: Vec<&dyn Action> = msgs.iter().map(|m| m as &dyn Action).collect();
            app.exec(block, &address(grantee), &actions).map(|_| ())
        }
    }
}

fn to_msg(send: &SendSpec) -> MsgSend {
    MsgSend::new(address(&send.from), address(&send.to), send.amount.clone())
}

fn describe(step: &Step) -> String {
    match step {
        Step::Grant {
            granter,
            grantee,
            spend_limit,
            kind,
            ..
        } => match spend_limit {
            Some(limit) => format!("grant {} -> {} limit {}", granter, grantee, limit),
            None => format!(
                "grant {} -> {} {}",
                granter,
                grantee,
                kind.as_deref().unwrap_or("?")
            ),
        },
        Step::Revoke {
            granter,
            grantee,
            kind,
        } => format!("revoke {} -> {} {}", granter, grantee, kind),
        Step::Send(send) => format!("send {} {} -> {}", send.amount, send.from, send.to),
        Step::Exec { grantee, sends } => {
            let parts: Vec<String> = sends
                .iter()
                .map(|s| format!("{} {}->{}", s.amount, s.from, s.to))
                .collect();
            format!("exec by {}: {}", grantee, parts.join(", "))
        }
    }
}
