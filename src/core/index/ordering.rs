use crate::core::model::ModRecord;

/// A record together with the file it came from.
#[derive(Debug, Clone)]
pub struct FetchedMod {
    pub file_name: String,
    pub record: ModRecord,
}

/// Order a version's mods by `name` (byte-wise, case-sensitive), falling
/// back to the source file name so equal names still sort deterministically.
pub fn sort_mods(mut mods: Vec<FetchedMod>) -> Vec<ModRecord> {
    mods.sort_by(|a, b| {
        a.record
            .name
            .cmp(&b.record.name)
            .then_with(|| a.file_name.cmp(&b.file_name))
    });
    mods.into_iter().map(|m| m.record).collect()
}
