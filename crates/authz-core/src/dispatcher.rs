//! The dispatcher: runs a grantee's batch of actions.
//!
//! Per action, in batch order:
//!
//!   Signers → [self-signed? skip] → Engine::accept → Router → Handler
//!
//! The handler is never reached for a delegated action unless the engine
//! allowed it, and the engine has already persisted the narrowed or deleted
//! grant by the time the handler runs. The first failure aborts the batch.
//! Actions routed before the failure are not rolled back; the host's
//! transaction boundary decides what happens to their effects.

use std::sync::Arc;

use tracing::{debug, info, warn};

use authz_types::{ActionResult, Address, AuthzError, AuthzResult, BlockContext};

use crate::{
    engine::AuthzEngine,
    traits::{Action, Router},
};

/// Executes delegated batches against one engine and one router.
pub struct Dispatcher {
    engine: Arc<AuthzEngine>,
    router: Arc<dyn Router>,
}

impl Dispatcher {
    pub fn new(engine: Arc<AuthzEngine>, router: Arc<dyn Router>) -> Self {
        Self { engine, router }
    }

    pub fn engine(&self) -> &AuthzEngine {
        &self.engine
    }

    /// Execute `actions` on behalf of `grantee`.
    ///
    /// # Errors
    ///
    /// - `MultiSignerUnsupported` if an action does not have exactly one signer
    /// - `Unauthorized` if a delegated action has no live grant or the grant
    ///   rejects it
    /// - `UnroutableAction` if no handler serves the action's route
    /// - `HandlerFailure` wrapping whatever the handler returned
    pub fn dispatch(
        &self,
        block: &BlockContext,
        grantee: &Address,
        actions: &[Box<dyn Action>],
    ) -> AuthzResult<Vec<ActionResult>> {
        debug!(
            grantee = %grantee,
            actions = actions.len(),
            height = block.height,
            "dispatch starting"
        );

        let mut results = Vec::with_capacity(actions.len());
        for (index, action) in actions.iter().enumerate() {
            let result = self.dispatch_one(block, grantee, index, action.as_ref())?;
            results.push(result);
        }

        info!(grantee = %grantee, actions = results.len(), "dispatch complete");
        Ok(results)
    }

    fn dispatch_one(
        &self,
        block: &BlockContext,
        grantee: &Address,
        index: usize,
        action: &dyn Action,
    ) -> AuthzResult<ActionResult> {
        let kind = action.kind();

        // ── Step 1: exactly one signer ───────────────────────────────────────
        let signers = action.signers();
        let [granter] = signers.as_slice() else {
            warn!(index, kind = %kind, signers = signers.len(), "action must have exactly one signer");
            return Err(AuthzError::MultiSignerUnsupported {
                action: kind.to_string(),
                signers: signers.len(),
            });
        };

        // ── Step 2/3: self-signed actions skip the engine ────────────────────
        if granter != grantee {
            let allowed = self.engine.accept(block, grantee, granter, action)?;
            if !allowed {
                warn!(
                    index,
                    grantee = %grantee,
                    granter = %granter,
                    kind = %kind,
                    "delegated action not authorized"
                );
                return Err(AuthzError::unauthorized(format!(
                    "no authorization from {} to {} for '{}'",
                    granter, grantee, kind
                )));
            }
        } else {
            debug!(index, kind = %kind, "self-signed action, skipping authorization");
        }

        // ── Step 4: route and execute ────────────────────────────────────────
        let handler = self
            .router
            .route(&kind.route)
            .ok_or_else(|| AuthzError::UnroutableAction {
                route: kind.route.clone(),
            })?;

        handler
            .handle(block, action)
            .map_err(|source| {
                warn!(index, kind = %kind, error = %source, "handler failed");
                AuthzError::HandlerFailure {
                    index,
                    action: action.type_url().to_string(),
                    source: Box::new(source),
                }
            })
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use authz_types::{
        ActionResult, Address, AuthzError, AuthzResult, BlockContext, Expiration,
    };

    use crate::capability::GenericCapability;
    use crate::engine::AuthzEngine;
    use crate::mock::{block_at, registry, MockAction, MockStore, QuotaCapability, NOW};
    use crate::router::ActionRouter;
    use crate::traits::{Action, Handler};

    use super::Dispatcher;

    /// A handler that records the amount of every action it executes and
    /// fails on a configured amount.
    struct RecordingHandler {
        executed: Arc<Mutex<Vec<u32>>>,
        fail_on: Option<u32>,
    }

    impl Handler for RecordingHandler {
        fn handle(&self, _block: &BlockContext, action: &dyn Action) -> AuthzResult<ActionResult> {
            let pay = action.as_any().downcast_ref::<MockAction>().unwrap();
            if Some(pay.amount) == self.fail_on {
                return Err(AuthzError::ExecutionFailed {
                    reason: format!("refusing amount {}", pay.amount),
                });
            }
            self.executed.lock().unwrap().push(pay.amount);
            Ok(ActionResult {
                log: format!("paid {}", pay.amount),
                ..ActionResult::default()
            })
        }
    }

    struct Fixture {
        dispatcher: Dispatcher,
        store: Arc<MockStore>,
        executed: Arc<Mutex<Vec<u32>>>,
    }

    fn fixture(fail_on: Option<u32>) -> Fixture {
        let store = Arc::new(MockStore::default());
        let engine = Arc::new(AuthzEngine::new(store.clone(), registry()));
        let executed = Arc::new(Mutex::new(vec![]));
        let router = ActionRouter::new().add_route(
            "mock",
            Arc::new(RecordingHandler {
                executed: executed.clone(),
                fail_on,
            }),
        );
        Fixture {
            dispatcher: Dispatcher::new(engine, Arc::new(router)),
            store,
            executed,
        }
    }

    fn alice() -> Address {
        Address::from("alice")
    }

    fn bob() -> Address {
        Address::from("bob")
    }

    fn batch(actions: Vec<MockAction>) -> Vec<Box<dyn Action>> {
        actions
            .into_iter()
            .map(|a| Box::new(a) as Box<dyn Action>)
            .collect()
    }

    #[test]
    fn test_self_signed_action_bypasses_store() {
        let f = fixture(None);

        let results = f
            .dispatcher
            .dispatch(&block_at(NOW), &bob(), &batch(vec![MockAction::pay(&bob(), 9)]))
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].log, "paid 9");
        assert_eq!(f.store.accesses(), 0, "self-signed dispatch must not touch the store");
        assert_eq!(*f.executed.lock().unwrap(), vec![9]);
    }

    #[test]
    fn test_delegated_action_without_grant_is_unauthorized() {
        let f = fixture(None);

        let result = f
            .dispatcher
            .dispatch(&block_at(NOW), &bob(), &batch(vec![MockAction::pay(&alice(), 2)]));

        assert!(matches!(result, Err(AuthzError::Unauthorized { .. })));
        assert!(f.executed.lock().unwrap().is_empty(), "handler must not run");
    }

    #[test]
    fn test_multi_signer_action_is_rejected_before_store_access() {
        let f = fixture(None);
        let action = MockAction::pay(&alice(), 1).with_signers(vec![alice(), bob()]);

        match f.dispatcher.dispatch(&block_at(NOW), &bob(), &batch(vec![action])) {
            Err(AuthzError::MultiSignerUnsupported { signers, .. }) => assert_eq!(signers, 2),
            other => panic!("expected MultiSignerUnsupported, got {:?}", other),
        }
        assert_eq!(f.store.accesses(), 0);
    }

    #[test]
    fn test_action_without_signers_is_rejected() {
        let f = fixture(None);
        let action = MockAction::pay(&alice(), 1).with_signers(vec![]);

        assert!(matches!(
            f.dispatcher.dispatch(&block_at(NOW), &bob(), &batch(vec![action])),
            Err(AuthzError::MultiSignerUnsupported { signers: 0, .. })
        ));
    }

    #[test]
    fn test_unknown_route_is_unroutable() {
        let f = fixture(None);
        let action = MockAction::pay(&bob(), 1).with_route("nowhere");

        match f.dispatcher.dispatch(&block_at(NOW), &bob(), &batch(vec![action])) {
            Err(AuthzError::UnroutableAction { route }) => assert_eq!(route, "nowhere"),
            other => panic!("expected UnroutableAction, got {:?}", other),
        }
    }

    #[test]
    fn test_delegated_batch_narrows_grant_per_action() {
        let f = fixture(None);
        f.dispatcher
            .engine()
            .grant(&alice(), &bob(), &QuotaCapability::new(10), Expiration::NEVER)
            .unwrap();

        let results = f
            .dispatcher
            .dispatch(
                &block_at(NOW),
                &bob(),
                &batch(vec![MockAction::pay(&alice(), 3), MockAction::pay(&alice(), 7)]),
            )
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(*f.executed.lock().unwrap(), vec![3, 7]);
        assert_eq!(f.store.len(), 0, "quota of 10 is fully consumed by 3 + 7");
    }

    #[test]
    fn test_first_failure_aborts_and_earlier_actions_stay_applied() {
        let f = fixture(None);
        f.dispatcher
            .engine()
            .grant(&alice(), &bob(), &QuotaCapability::new(5), Expiration::NEVER)
            .unwrap();

        let result = f.dispatcher.dispatch(
            &block_at(NOW),
            &bob(),
            &batch(vec![
                MockAction::pay(&alice(), 2),
                MockAction::pay(&alice(), 4),
                MockAction::pay(&alice(), 1),
            ]),
        );

        assert!(matches!(result, Err(AuthzError::Unauthorized { .. })));
        assert_eq!(*f.executed.lock().unwrap(), vec![2]);
        let (cap, _) = f
            .dispatcher
            .engine()
            .lookup(&block_at(NOW), &bob(), &alice(), &MockAction::pay(&alice(), 0).kind)
            .unwrap()
            .unwrap();
        assert_eq!(cap.as_any().downcast_ref::<QuotaCapability>().unwrap().remaining, 3);
    }

    #[test]
    fn test_handler_failure_is_wrapped_with_index() {
        let f = fixture(Some(4));
        f.dispatcher
            .engine()
            .grant(
                &alice(),
                &bob(),
                &GenericCapability::new(MockAction::pay(&alice(), 0).kind),
                Expiration::NEVER,
            )
            .unwrap();

        let result = f.dispatcher.dispatch(
            &block_at(NOW),
            &bob(),
            &batch(vec![
                MockAction::pay(&bob(), 1),
                MockAction::pay(&alice(), 4),
                MockAction::pay(&alice(), 5),
            ]),
        );

        match result {
            Err(AuthzError::HandlerFailure { index, action, source }) => {
                assert_eq!(index, 1);
                assert_eq!(action, "/mock.MockAction");
                assert!(matches!(*source, AuthzError::ExecutionFailed { .. }));
            }
            other => panic!("expected HandlerFailure, got {:?}", other),
        }
        assert_eq!(*f.executed.lock().unwrap(), vec![1], "action 2 must never run");
    }

    #[test]
    fn test_closure_handlers_can_be_routed() {
        let store = Arc::new(MockStore::default());
        let engine = Arc::new(AuthzEngine::new(store, registry()));
        let router = ActionRouter::new().add_route(
            "mock",
            Arc::new(
                |_block: &BlockContext, _action: &dyn Action| -> AuthzResult<ActionResult> {
                    Ok(ActionResult {
                        log: "closure".to_string(),
                        ..ActionResult::default()
                    })
                },
            ),
        );
        let dispatcher = Dispatcher::new(engine, Arc::new(router));

        let results = dispatcher
            .dispatch(&block_at(NOW), &bob(), &batch(vec![MockAction::pay(&bob(), 1)]))
            .unwrap();
        assert_eq!(results[0].log, "closure");
    }

    #[test]
    fn test_empty_batch_succeeds_with_no_results() {
        let f = fixture(None);
        let results = f.dispatcher.dispatch(&block_at(NOW), &bob(), &[]).unwrap();
        assert!(results.is_empty());
    }
}
