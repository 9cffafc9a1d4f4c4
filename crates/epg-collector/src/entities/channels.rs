use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "channels")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub external_id: String,
    pub name: String,
    pub icon_url: String,
    pub category: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::stream_urls::Entity")]
    StreamUrls,
    #[sea_orm(has_many = "super::epg_programs::Entity")]
    EpgPrograms,
}

impl Related<super::stream_urls::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StreamUrls.def()
    }
}

impl Related<super::epg_programs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EpgPrograms.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
