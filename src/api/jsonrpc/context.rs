#![forbid(unsafe_code)]

use crate::nftmarketd::Nftmarketd;

use super::registry::MethodRegistry;

/// Shared per-method state: the daemon handle plus the registry backing
/// `system.help`.
#[derive(Clone)]
pub struct RpcContext {
    pub state: Nftmarketd,
    pub methods: MethodRegistry,
}
