// ─── Mod Index Core ───
// Builds the version-keyed index of mod metadata.
//
// Architecture:
//   core/
//     config     — Run configuration + optional settings file
//     http       — Shared authenticated HTTP client
//     remote/    — Directory listings + mod document fetches
//     model      — ModRecord + ModIndex
//     cache      — Timestamped snapshot with TTL freshness
//     index/     — Builder: discovery, bounded fan-out, ordering
//     writer     — index.json output
//     fs         — Temp-file-and-rename writes
//     pipeline   — One run end to end

pub mod cache;
pub mod config;
pub mod error;
pub mod fs;
pub mod http;
pub mod index;
pub mod model;
pub mod pipeline;
pub mod remote;
pub mod writer;

#[cfg(test)]
pub(crate) mod testing;
