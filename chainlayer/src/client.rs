// Client: provider registry and method-resolution engine.
//
// The client owns an ordered stack of providers. Insertion order defines
// priority: the most recently added provider is consulted first when no
// requestor constrains the search. Registration happens at setup time,
// before any operation is invoked; the lock around the stack exists because
// `Sync` demands one, not to support concurrent mutation, which remains a
// documented precondition of the caller.

use std::sync::{Arc, RwLock, RwLockReadGuard, Weak};

use log::{debug, warn};
use serde_json::Value;

use crate::error::Error;
use crate::provider::{Method, Provider, ProviderKind};
use crate::schema::{hex_regex, Schema, SchemaValidator};

struct ClientState {
    /// Target protocol version consulted by version-gating providers.
    version: String,
    block_validator: SchemaValidator,
    transaction_validator: SchemaValidator,
    providers: RwLock<Vec<Arc<dyn Provider>>>,
}

/// The chain-abstraction client facade.
///
/// Cloning is cheap and shares the underlying provider stack.
#[derive(Clone)]
pub struct Client {
    state: Arc<ClientState>,
}

/// Non-owning back-reference handed to providers at bind time. Providers use
/// it to delegate calls back through the resolver (passing themselves as the
/// requestor) without creating an ownership cycle.
#[derive(Clone)]
pub struct WeakClient(Weak<ClientState>);

impl WeakClient {
    /// Upgrades to a full client handle. Returns `None` once the owning
    /// client has been dropped.
    pub fn upgrade(&self) -> Option<Client> {
        self.0.upgrade().map(|state| Client { state })
    }
}

impl std::fmt::Debug for WeakClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WeakClient")
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("version", &self.state.version)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client with the baseline block/transaction schemas.
    pub fn new(version: impl Into<String>) -> Self {
        Self::with_schemas(
            version,
            &Schema::block_default(),
            &Schema::transaction_default(),
        )
    }

    /// Creates a client compiling the externally supplied schema
    /// definitions into its two structural validators.
    pub fn with_schemas(version: impl Into<String>, block: &Schema, transaction: &Schema) -> Self {
        Client {
            state: Arc::new(ClientState {
                version: version.into(),
                block_validator: SchemaValidator::compile(block),
                transaction_validator: SchemaValidator::compile(transaction),
                providers: RwLock::new(Vec::new()),
            }),
        }
    }

    /// The target version string used for version gating.
    pub fn version(&self) -> &str {
        &self.state.version
    }

    /// A non-owning handle suitable for handing to providers.
    pub fn downgrade(&self) -> WeakClient {
        WeakClient(Arc::downgrade(&self.state))
    }

    // The stack lock is never held across an await point; resolution clones
    // the matched Arc out before any provider call.
    fn stack(&self) -> RwLockReadGuard<'_, Vec<Arc<dyn Provider>>> {
        self.state
            .providers
            .read()
            .expect("provider stack lock poisoned")
    }

    /// Registers a provider at the top of the stack (highest priority).
    ///
    /// Fails with [`Error::InvalidProvider`] if the provider does not declare
    /// the bind capability and with [`Error::DuplicateProvider`] if one of
    /// the same kind is already present. On success the provider is bound
    /// with a back-reference to this client and appended. Returns `&self`
    /// for chaining.
    pub fn register(&self, provider: Arc<dyn Provider>) -> Result<&Self, Error> {
        if !provider.capabilities().contains(&Method::Bind) {
            return Err(Error::InvalidProvider);
        }
        let mut stack = self
            .state
            .providers
            .write()
            .expect("provider stack lock poisoned");
        let kind = provider.kind();
        if stack.iter().any(|p| p.kind() == kind) {
            return Err(Error::DuplicateProvider(kind));
        }
        provider.bind(self.downgrade());
        debug!("registered provider `{}` at priority {}", kind, stack.len());
        stack.push(provider);
        Ok(self)
    }

    /// Finds the provider that executes `method`.
    ///
    /// With a `requestor`, the search window is every provider added
    /// strictly earlier than the requestor's position, so a decorator
    /// delegating downward can never re-select itself or anything stacked
    /// above it. The window is scanned backward (latest-added first) for the
    /// first provider declaring the capability; if that match declares a
    /// version gate and reports the operation unsupported at the client's
    /// target version, resolution fails immediately rather than continuing
    /// to earlier providers.
    pub fn resolve_provider(
        &self,
        method: Method,
        requestor: Option<ProviderKind>,
    ) -> Result<Arc<dyn Provider>, Error> {
        let stack = self.stack();
        if stack.is_empty() {
            return Err(Error::NoProvider(method));
        }

        // There is at most one occurrence of any kind; a requestor kind that
        // is not in the stack leaves an empty window.
        let window_end = match requestor {
            None => stack.len(),
            Some(kind) => stack.iter().rposition(|p| p.kind() == kind).unwrap_or(0),
        };

        let provider = stack[..window_end]
            .iter()
            .rev()
            .find(|p| p.capabilities().contains(&method))
            .cloned()
            .ok_or(Error::UnimplementedMethod(method))?;

        if provider.capabilities().contains(&Method::VersionGate)
            && !provider.supports_method(method, &self.state.version)
        {
            warn!(
                "provider `{}` rejected `{}` at version {}",
                provider.kind(),
                method,
                self.state.version
            );
            return Err(Error::UnsupportedMethod {
                method,
                kind: provider.kind(),
                version: self.state.version.clone(),
            });
        }

        debug!("resolved `{}` to provider `{}`", method, provider.kind());
        Ok(provider)
    }

    // --- Output-contract helpers shared by the facade modules ---

    /// Validates a provider-returned block against the compiled schema.
    pub(crate) fn check_block(&self, block: Value) -> Result<Value, Error> {
        self.state.block_validator.validate(&block)?;
        Ok(block)
    }

    /// Validates a provider-returned transaction against the compiled schema.
    pub(crate) fn check_transaction(&self, transaction: Value) -> Result<Value, Error> {
        self.state.transaction_validator.validate(&transaction)?;
        Ok(transaction)
    }
}

/// Numeric output contract (balances, heights).
pub(crate) fn expect_number(value: &Value, path: &str) -> Result<u64, Error> {
    value
        .as_u64()
        .ok_or_else(|| Error::invalid_response(path, "expected a non-negative number"))
}

/// String output contract (transaction ids, scripts).
pub(crate) fn expect_string(value: &Value, path: &str) -> Result<String, Error> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| Error::invalid_response(path, "expected a string"))
}

/// Hexadecimal-string output contract (revealed secrets, lock txids).
pub(crate) fn expect_hex_string(value: &Value, path: &str) -> Result<String, Error> {
    let s = expect_string(value, path)?;
    if hex_regex().is_match(&s) {
        Ok(s)
    } else {
        Err(Error::invalid_response(path, "not a hexadecimal string"))
    }
}

/// Array-of-hex-hash output contract (block generation).
pub(crate) fn expect_hash_array(value: &Value, path: &str) -> Result<Vec<String>, Error> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::invalid_response(path, "expected an array of block hashes"))?;
    let mut hashes = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        hashes.push(expect_hex_string(item, &format!("{path}.{index}"))?);
    }
    Ok(hashes)
}

/// Presence-only passthrough contract (address listing, signing, wallet
/// info): the result is returned unchecked beyond not being null.
pub(crate) fn expect_present(value: Value, path: &str) -> Result<Value, Error> {
    if value.is_null() {
        Err(Error::invalid_response(path, "provider returned null"))
    } else {
        Ok(value)
    }
}
