//! # Transfer Engine Module
//!
//! Orchestrates media migration between cloud photo providers.
//!
//! ## Overview
//!
//! This module drives a complete library migration, including:
//! - Paging through the source library via `MediaSource`
//! - Mirroring the source album set into the destination
//! - Staging media locally between download and upload
//! - Reusing photos the destination already holds instead of re-uploading
//! - Tracking per-run phase progression and counters
//!
//! ## Components
//!
//! - **Batch Fetcher** (`fetcher`): Cap-aware source paging with inter-page pacing
//! - **Album Reconciler** (`album_sync`): Idempotent album mirroring and ID mapping
//! - **Item Synchronizer** (`item_sync`): Single-item download, stage, upload, cleanup
//! - **Album Linker** (`linker`): Membership replication with duplicate avoidance
//! - **Transfer Coordinator** (`coordinator`): Orchestrates the phased run end to end

pub mod album_sync;
pub mod coordinator;
pub mod error;
pub mod fetcher;
pub mod item_sync;
pub mod linker;
pub mod stats;

pub use album_sync::{AlbumMapping, AlbumReconciler};
pub use coordinator::{TransferConfig, TransferCoordinator};
pub use error::{Result, TransferError};
pub use fetcher::BatchFetcher;
pub use item_sync::ItemSynchronizer;
pub use linker::AlbumLinker;
pub use stats::{RunId, RunPhase, TransferRun, TransferStats};
