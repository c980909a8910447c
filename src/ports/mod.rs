//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the use-case layer requires
//! from the outside world. Adapters implement these traits; tests
//! replace them with `mockall` mocks.
//!
//! Port categories:
//! - `PositionSource`: redeemable-position discovery
//! - `ChainConnector` / `ChainRpc`: Polygon JSON-RPC access
//! - `SignerLoader` / `TransactionSigner`: owner key and signing

pub mod chain_client;
pub mod position_source;
pub mod signer;
