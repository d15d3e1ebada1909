mod container;
mod engine;
mod equipment;
mod error;
mod persistence;
mod tables;
mod types;

pub use container::{
    BareIdContainer, BareIdEntry, KindedContainer, KindedEntry, MutableItemContainer,
};
pub use engine::{
    ContainerSlot, overview, reference_counts, remove_objects, remove_or_replace, replace_objects,
};
pub use equipment::{add_to_random_stations, remove_equipment, replace_equipment};
pub use error::{CoreError, CoreErrorCode};
pub use persistence::{
    BACKUP_FOLDER, BACKUP_TIMESTAMP_FORMAT, DEFAULT_MOD_SUBFOLDER, DEFAULT_SAVE_DIR,
    ManagerConfig, NO_BACKUP, NO_SAVES_FOUND, OperationGuard, SAVE_FILE_EXTENSION,
    SAVE_FILE_PREFIX, SAVES_LIST_ERROR, SaveManager, TEMP_FILENAME, decode_state, encode_state,
    is_save_file_name,
};
pub use tables::{
    GameTables, InMemoryTables, LangTextSection, add_to_effects_text, next_equipment_id,
    next_item_id,
};
pub use types::{
    Attempt, ContainerClass, ContainerSite, MutationReport, MutationRequest, OperationMode,
    RequestScope, SaveOverview, SiteCount, classify, subset_of_kind,
};
