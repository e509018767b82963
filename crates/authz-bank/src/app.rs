//! A minimal host wiring the bank and authorization modules together.
//!
//! `SimApp` owns one root `MemoryStore` (the authorization module writes
//! through a `PrefixStore` scoped to its namespace), a `BankKeeper`, and two
//! routers:
//!
//!   app router:   bank → BankHandler, msg_authorization → AuthzService
//!   inner router: bank → BankHandler
//!
//! Delegated batches dispatch through the inner router only, so a `MsgExec`
//! cannot smuggle another grant, revoke or exec through a grantee.
//!
//! Signatures are not checked: an action delivered here is treated as
//! signed by its declared signers.

use std::sync::Arc;

use tracing::debug;

use authz_core::{
    init_genesis,
    msg::ROUTER_KEY,
    traits::{Action, Handler, Router},
    ActionRouter, AuthzConfig, AuthzEngine, AuthzService, Dispatcher, MsgExec, TypeRegistry,
};
use authz_store::{MemoryStore, PrefixStore};
use authz_types::{ActionResult, Address, AuthzError, AuthzResult, BlockContext};

use crate::{handler::BankHandler, keeper::BankKeeper, msgs::ROUTE};

pub struct SimApp {
    root: MemoryStore,
    bank: BankKeeper,
    engine: Arc<AuthzEngine>,
    service: Arc<AuthzService>,
    router: ActionRouter,
}

impl SimApp {
    /// Build the app and install `config.genesis`.
    pub fn new(config: &AuthzConfig) -> AuthzResult<Self> {
        let mut registry = TypeRegistry::new();
        authz_core::register_types(&mut registry);
        crate::register_types(&mut registry);

        let root = MemoryStore::new();
        let scoped = PrefixStore::new(Arc::new(root.clone()), &config.namespace);
        let engine = Arc::new(AuthzEngine::new(Arc::new(scoped), Arc::new(registry)));
        init_genesis(&engine, &config.genesis)?;

        let bank = BankKeeper::new();
        let bank_handler: Arc<dyn Handler> = Arc::new(BankHandler::new(bank.clone()));
        let inner = ActionRouter::new().add_route(ROUTE, bank_handler.clone());
        let dispatcher = Arc::new(Dispatcher::new(engine.clone(), Arc::new(inner)));
        let service = Arc::new(AuthzService::new(dispatcher));

        let router = ActionRouter::new()
            .add_route(ROUTE, bank_handler)
            .add_route(ROUTER_KEY, service.clone());

        Ok(Self {
            root,
            bank,
            engine,
            service,
            router,
        })
    }

    pub fn bank(&self) -> &BankKeeper {
        &self.bank
    }

    pub fn engine(&self) -> &AuthzEngine {
        &self.engine
    }

    pub fn service(&self) -> &AuthzService {
        &self.service
    }

    /// The root store, including every module namespace.
    pub fn store(&self) -> &MemoryStore {
        &self.root
    }

    pub fn state_hash(&self) -> String {
        self.root.state_hash()
    }

    /// Validate and route one top-level action.
    pub fn deliver(&self, block: &BlockContext, action: &dyn Action) -> AuthzResult<ActionResult> {
        action.validate_basic(block)?;
        let kind = action.kind();
        let handler = self
            .router
            .route(&kind.route)
            .ok_or_else(|| AuthzError::UnroutableAction {
                route: kind.route.clone(),
            })?;
        debug!(kind = %kind, height = block.height, "delivering action");
        handler.handle(block, action)
    }

    /// Wrap `actions` in a `MsgExec` from `grantee` and deliver it.
    pub fn exec(
        &self,
        block: &BlockContext,
        grantee: &Address,
        actions: &[&dyn Action],
    ) -> AuthzResult<ActionResult> {
        let msg = MsgExec::new(grantee.clone(), actions)?;
        self.deliver(block, &msg)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
