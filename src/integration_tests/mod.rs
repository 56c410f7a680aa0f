//! End-to-end scenarios that drive a real FriendFi instance against a live
//! chain node and IPFS daemon.
//!
//! The harness assumes a local auto-mining devnet (anvil or hardhat with the
//! standard test mnemonic) with the chat contract deployed by the first
//! funded account, and a Kubo daemon on its default ports. Scenarios are
//! registered in [`registry`] and run through the `integration_test` binary.

pub mod core;
pub mod registry;
pub mod scenarios;
pub mod test_cases;
