// # Address Resolver Trait
//
// Defines the interface for discovering the caller's public addresses.
//
// ## Implementations
//
// - HTTP lookup services (ipify-compatible): `ipwatch-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ipwatch_core::AddressResolver;
//
// #[tokio::main]
// async fn main() -> ipwatch_core::Result<()> {
//     let resolver = /* AddressResolver implementation */;
//
//     let candidate = resolver.resolve().await?;
//     println!("IPv4: {:?}, IPv6: {:?}", candidate.ipv4, candidate.ipv6);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::snapshot::AddressCandidate;

/// Trait for address resolver implementations
///
/// Resolvers are **observers**, not decision-makers: they report what the
/// outside world sees and nothing else.
///
/// # Contract
///
/// - Each family is looked up independently; a failure for one family
///   becomes `None` for that field and does not affect the other.
/// - Implementations should reduce their own failures to `None` fields.
///   An `Err` is still tolerated: the detector treats it the same as a
///   missing IPv4 address.
/// - No retries and no caching. The next trigger is the retry.
/// - The returned strings are stored verbatim, so implementations must not
///   reformat addresses between calls.
///
/// Callers bound `resolve()` with a timeout; implementations do not need to
/// enforce an overall deadline themselves.
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Look up the current public addresses
    ///
    /// # Returns
    ///
    /// - `Ok(AddressCandidate)`: Best-effort result, fields independently optional
    /// - `Err(Error)`: Lookup could not run at all
    async fn resolve(&self) -> Result<AddressCandidate, crate::Error>;

    /// Get the resolver name (for logging/debugging)
    fn resolver_name(&self) -> &'static str;
}
