pub use super::channels::Entity as Channels;
pub use super::epg_programs::Entity as EpgPrograms;
pub use super::stream_urls::Entity as StreamUrls;
