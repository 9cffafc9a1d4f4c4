//! SeaORM repository implementations
//!
//! Repositories work across SQLite and PostgreSQL. `SeaOrmCollectionStore`
//! composes them behind the `CollectionStore` trait used by the ingestor.

pub mod channel;
pub mod epg_program;
pub mod store;
pub mod stream_url;
pub mod traits;

// Re-export for convenience
pub use channel::ChannelSeaOrmRepository;
pub use epg_program::EpgProgramSeaOrmRepository;
pub use store::SeaOrmCollectionStore;
pub use stream_url::StreamUrlSeaOrmRepository;
pub use traits::CollectionStore;
