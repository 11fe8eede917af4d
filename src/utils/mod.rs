//! Internal helpers shared by the disk facade, resolver and backends.

pub(crate) mod path;
