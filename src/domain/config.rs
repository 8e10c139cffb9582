/// What to do with a successful purchase whose local signature check failed.
///
/// The store is expected to auto-refund unverified purchases server-side
/// within a bounded window, so denying locally does not strand the user's
/// money. Kept configurable rather than hardcoded in the dispatch branch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnverifiedPolicy {
    /// Log and stop; nothing is consumed or granted.
    #[default]
    Deny,
    /// Trust the gateway anyway: consume and grant without server verification.
    GrantAnyway,
    /// Re-fetch the latest purchase record for the sku from the gateway and
    /// run it through the ordinary verify-then-consume path. Denies when the
    /// gateway has no record.
    DeferToServer,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinatorConfig {
    pub unverified_policy: UnverifiedPolicy,
}
