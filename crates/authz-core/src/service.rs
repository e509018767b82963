//! The message service: the handler for the authorization route.
//!
//! Turns `MsgGrant`, `MsgRevoke` and `MsgExec` into engine and dispatcher
//! calls, runs message-level validation first, and emits one event per
//! message.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use authz_types::{
    event::{
        ATTRIBUTE_ACTION_KIND, ATTRIBUTE_GRANTEE, ATTRIBUTE_GRANTER, ATTRIBUTE_MODULE,
        EVENT_EXECUTE_AUTHORIZATION, EVENT_GRANT_AUTHORIZATION, EVENT_REVOKE_AUTHORIZATION,
    },
    ActionKind, ActionResult, Address, AuthzError, AuthzResult, BlockContext, Event, Expiration,
};

use crate::{
    dispatcher::Dispatcher,
    engine::AuthzEngine,
    msg::{MsgExec, MsgGrant, MsgRevoke, ROUTER_KEY},
    traits::{Action, Handler},
};

/// A stored grant rendered for queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrantView {
    pub type_url: String,
    pub capability: serde_json::Value,
    pub expiration: Expiration,
}

/// Serves the authorization route.
pub struct AuthzService {
    dispatcher: Arc<Dispatcher>,
}

impl AuthzService {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    fn engine(&self) -> &AuthzEngine {
        self.dispatcher.engine()
    }

    /// Read a grant as stored, without triggering expiry cleanup.
    pub fn query_grant(
        &self,
        granter: &Address,
        grantee: &Address,
        kind: &ActionKind,
    ) -> AuthzResult<Option<GrantView>> {
        let Some(record) = self.engine().grant_record(grantee, granter, kind)? else {
            return Ok(None);
        };
        let capability = serde_json::from_slice(&record.capability.value)
            .map_err(AuthzError::codec)?;
        Ok(Some(GrantView {
            type_url: record.capability.type_url,
            capability,
            expiration: record.expiration,
        }))
    }

    fn handle_grant(&self, block: &BlockContext, msg: &MsgGrant) -> AuthzResult<ActionResult> {
        let capability = self
            .engine()
            .registry()
            .decode_capability(&msg.capability)
            .map_err(|e| AuthzError::InvalidGrant {
                reason: e.to_string(),
            })?;
        self.engine()
            .grant(&msg.granter, &msg.grantee, capability.as_ref(), msg.expiration)?;

        let event = Event::new(EVENT_GRANT_AUTHORIZATION)
            .attr(ATTRIBUTE_MODULE, ROUTER_KEY)
            .parties(&msg.grantee, &msg.granter)
            .attr(ATTRIBUTE_ACTION_KIND, capability.action_kind());
        debug!(height = block.height, "grant message handled");
        Ok(ActionResult {
            data: serde_json::Value::Null,
            log: format!("granted {} to {}", capability.action_kind(), msg.grantee),
            events: vec![event],
        })
    }

    fn handle_revoke(&self, msg: &MsgRevoke) -> AuthzResult<ActionResult> {
        self.engine()
            .revoke(&msg.grantee, &msg.granter, &msg.action_kind)?;

        let event = Event::new(EVENT_REVOKE_AUTHORIZATION)
            .attr(ATTRIBUTE_MODULE, ROUTER_KEY)
            .parties(&msg.grantee, &msg.granter)
            .attr(ATTRIBUTE_ACTION_KIND, &msg.action_kind);
        Ok(ActionResult {
            data: serde_json::Value::Null,
            log: format!("revoked {} from {}", msg.action_kind, msg.grantee),
            events: vec![event],
        })
    }

    fn handle_exec(&self, block: &BlockContext, msg: &MsgExec) -> AuthzResult<ActionResult> {
        let registry = self.engine().registry();
        let actions = msg
            .actions
            .iter()
            .map(|envelope| registry.decode_action(envelope))
            .collect::<AuthzResult<Vec<Box<dyn Action>>>>()?;

        // Every inner action is validated before the first one runs.
        for action in &actions {
            action.validate_basic(block)?;
        }

        let results = self.dispatcher.dispatch(block, &msg.grantee, &actions)?;

        let mut events = Vec::with_capacity(results.len() + 1);
        let mut data = Vec::with_capacity(results.len());
        let mut granters: Vec<Address> = Vec::new();
        for action in &actions {
            for signer in action.signers() {
                if signer != msg.grantee && !granters.contains(&signer) {
                    granters.push(signer);
                }
            }
        }
        let mut exec_event = Event::new(EVENT_EXECUTE_AUTHORIZATION)
            .attr(ATTRIBUTE_MODULE, ROUTER_KEY)
            .attr(ATTRIBUTE_GRANTEE, &msg.grantee);
        for granter in &granters {
            exec_event = exec_event.attr(ATTRIBUTE_GRANTER, granter);
        }
        events.push(exec_event);
        for result in results {
            data.push(result.data);
            events.extend(result.events);
        }

        info!(
            grantee = %msg.grantee,
            actions = actions.len(),
            granters = granters.len(),
            "delegated batch executed"
        );
        Ok(ActionResult {
            data: serde_json::Value::Array(data),
            log: format!("executed {} actions for {}", actions.len(), msg.grantee),
            events,
        })
    }
}

impl Handler for AuthzService {
    fn handle(&self, block: &BlockContext, action: &dyn Action) -> AuthzResult<ActionResult> {
        action.validate_basic(block)?;

        let any = action.as_any();
        if let Some(msg) = any.downcast_ref::<MsgGrant>() {
            self.handle_grant(block, msg)
        } else if let Some(msg) = any.downcast_ref::<MsgRevoke>() {
            self.handle_revoke(msg)
        } else if let Some(msg) = any.downcast_ref::<MsgExec>() {
            self.handle_exec(block, msg)
        } else {
            Err(AuthzError::UnroutableAction {
                route: format!("{} ({})", action.kind(), action.type_url()),
            })
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use authz_types::{
        event::{EVENT_EXECUTE_AUTHORIZATION, EVENT_GRANT_AUTHORIZATION},
        ActionKind, ActionResult, Address, AuthzError, AuthzResult, BlockContext, Envelope,
        Expiration,
    };

    use crate::dispatcher::Dispatcher;
    use crate::engine::AuthzEngine;
    use crate::mock::{block_at, registry, MockAction, MockStore, QuotaCapability, NOW};
    use crate::msg::{MsgExec, MsgGrant, MsgRevoke};
    use crate::router::ActionRouter;
    use crate::traits::{Action, Handler};

    use super::AuthzService;

    fn alice() -> Address {
        Address::from("alice")
    }

    fn bob() -> Address {
        Address::from("bob")
    }

    fn service() -> (AuthzService, Arc<Mutex<u32>>) {
        let store = Arc::new(MockStore::default());
        let engine = Arc::new(AuthzEngine::new(store, registry()));
        let paid = Arc::new(Mutex::new(0u32));
        let counter = paid.clone();
        let router = ActionRouter::new().add_route(
            "mock",
            Arc::new(
                move |_block: &BlockContext, action: &dyn Action| -> AuthzResult<ActionResult> {
                    let pay = action.as_any().downcast_ref::<MockAction>().unwrap();
                    *counter.lock().unwrap() += pay.amount;
                    Ok(ActionResult {
                        data: serde_json::json!({ "paid": pay.amount }),
                        ..ActionResult::default()
                    })
                },
            ),
        );
        let dispatcher = Arc::new(Dispatcher::new(engine, Arc::new(router)));
        (AuthzService::new(dispatcher), paid)
    }

    fn grant_quota(service: &AuthzService, amount: u32) {
        let msg = MsgGrant::new(alice(), bob(), &QuotaCapability::new(amount), Expiration(NOW + 60))
            .unwrap();
        service.handle(&block_at(NOW), &msg).unwrap();
    }

    #[test]
    fn test_grant_message_stores_grant_and_emits_event() {
        let (service, _) = service();
        let msg = MsgGrant::new(alice(), bob(), &QuotaCapability::new(8), Expiration::NEVER).unwrap();

        let result = service.handle(&block_at(NOW), &msg).unwrap();

        assert_eq!(result.events.len(), 1);
        assert_eq!(result.events[0].kind, EVENT_GRANT_AUTHORIZATION);
        assert_eq!(result.events[0].get("action_kind"), Some("mock/pay"));

        let view = service
            .query_grant(&alice(), &bob(), &ActionKind::new("mock", "pay"))
            .unwrap()
            .unwrap();
        assert_eq!(view.type_url, "/mock.QuotaCapability");
        assert_eq!(view.capability["remaining"], 8);
    }

    #[test]
    fn test_expired_grant_message_is_rejected_before_storage() {
        let (service, _) = service();
        let msg = MsgGrant::new(alice(), bob(), &QuotaCapability::new(8), Expiration(NOW - 10))
            .unwrap();

        assert!(matches!(
            service.handle(&block_at(NOW), &msg),
            Err(AuthzError::InvalidGrant { .. })
        ));
        assert!(service
            .query_grant(&alice(), &bob(), &ActionKind::new("mock", "pay"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_grant_with_unknown_capability_type_is_invalid() {
        let (service, _) = service();
        let msg = MsgGrant {
            granter: alice(),
            grantee: bob(),
            capability: Envelope {
                type_url: "/unknown.Cap".to_string(),
                value: b"{}".to_vec(),
            },
            expiration: Expiration::NEVER,
        };
        assert!(matches!(
            service.handle(&block_at(NOW), &msg),
            Err(AuthzError::InvalidGrant { .. })
        ));
    }

    #[test]
    fn test_exec_message_runs_delegated_actions() {
        let (service, paid) = service();
        grant_quota(&service, 10);

        let first = MockAction::pay(&alice(), 4);
        let second = MockAction::pay(&alice(), 1);
        let exec = MsgExec::new(bob(), &[&first, &second]).unwrap();

        let result = service.handle(&block_at(NOW), &exec).unwrap();

        assert_eq!(*paid.lock().unwrap(), 5);
        assert_eq!(result.events[0].kind, EVENT_EXECUTE_AUTHORIZATION);
        assert_eq!(result.events[0].get("granter"), Some(alice().to_hex().as_str()));
        assert_eq!(result.data, serde_json::json!([{ "paid": 4 }, { "paid": 1 }]));

        let view = service
            .query_grant(&alice(), &bob(), &ActionKind::new("mock", "pay"))
            .unwrap()
            .unwrap();
        assert_eq!(view.capability["remaining"], 5);
        assert_eq!(view.expiration, Expiration(NOW + 60));
    }

    #[test]
    fn test_exec_with_undecodable_action_runs_nothing() {
        let (service, paid) = service();
        grant_quota(&service, 10);

        let good = MockAction::pay(&alice(), 4).to_envelope().unwrap();
        let exec = MsgExec {
            grantee: bob(),
            actions: vec![
                good,
                Envelope {
                    type_url: "/unknown.Action".to_string(),
                    value: vec![],
                },
            ],
        };

        assert!(matches!(
            service.handle(&block_at(NOW), &exec),
            Err(AuthzError::UnknownType { .. })
        ));
        assert_eq!(*paid.lock().unwrap(), 0);
    }

    #[test]
    fn test_revoke_message_then_exec_is_unauthorized() {
        let (service, paid) = service();
        grant_quota(&service, 10);

        let revoke = MsgRevoke {
            granter: alice(),
            grantee: bob(),
            action_kind: ActionKind::new("mock", "pay"),
        };
        service.handle(&block_at(NOW), &revoke).unwrap();
        assert!(matches!(
            service.handle(&block_at(NOW), &revoke),
            Err(AuthzError::NotFound { .. })
        ));

        let pay = MockAction::pay(&alice(), 1);
        let exec = MsgExec::new(bob(), &[&pay]).unwrap();
        assert!(matches!(
            service.handle(&block_at(NOW), &exec),
            Err(AuthzError::Unauthorized { .. })
        ));
        assert_eq!(*paid.lock().unwrap(), 0);
    }

    #[test]
    fn test_foreign_action_is_unroutable() {
        let (service, _) = service();
        let pay = MockAction::pay(&alice(), 1);
        assert!(matches!(
            service.handle(&block_at(NOW), &pay),
            Err(AuthzError::UnroutableAction { .. })
        ));
    }
}
